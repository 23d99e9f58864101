//! Primary key derivation for admin API objects.

use sha2::{Digest, Sha256};

/// Number of digest bytes kept in a derived ID (16 hex characters).
const ID_BYTES: usize = 8;

/// Derive a stable admin API ID from a resource name.
///
/// The same name always maps to the same ID, which makes `Get` by name and
/// repeated `PUT`s for the same Kubernetes object address one remote key.
/// An empty name yields an empty ID.
pub fn gen_id(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    digest_id(&[raw.as_bytes()])
}

/// Derive a content-addressed ID over several byte strings.
///
/// Parts are length-prefixed so `("ab", "c")` and `("a", "bc")` differ.
pub fn content_id(parts: &[&[u8]]) -> String {
    digest_id(parts)
}

fn digest_id(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    let digest = hasher.finalize();
    hex::encode(&digest[..ID_BYTES])
}
