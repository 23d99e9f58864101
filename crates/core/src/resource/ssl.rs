use super::{Resource, ResourceKind};
use crate::id::content_id;
use crate::labels::Labels;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A TLS certificate bound to one or more SNIs.
///
/// The ID is derived from the certificate and key material, so writing the
/// same certificate twice addresses the same remote object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ssl {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snis: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cert: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ssl {
    pub fn new(snis: Vec<String>, cert: impl Into<String>, key: impl Into<String>) -> Self {
        let mut ssl = Self {
            snis,
            cert: cert.into(),
            key: key.into(),
            ..Default::default()
        };
        ssl.id = ssl.content_id();
        ssl
    }

    /// ID computed from the certificate and key.
    pub fn content_id(&self) -> String {
        content_id(&[self.cert.as_bytes(), self.key.as_bytes()])
    }
}

impl Resource for Ssl {
    const KIND: ResourceKind = ResourceKind::Ssl;

    fn id(&self) -> &str {
        &self.id
    }

    fn labels(&self) -> Option<&Labels> {
        Some(&self.labels)
    }

    fn prepare(&mut self) -> crate::Result<()> {
        if self.id.is_empty() {
            self.id = self.content_id();
        }
        Ok(())
    }
}
