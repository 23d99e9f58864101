//! Cache error types.

use gwadmin_core::ResourceKind;
use thiserror::Error;

/// Cache operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },

    #[error("{kind} {id} is still referenced by a {dependent}")]
    StillInUse {
        kind: ResourceKind,
        id: String,
        dependent: ResourceKind,
    },

    #[error("{0} without an id cannot be cached")]
    MissingId(ResourceKind),
}

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;
