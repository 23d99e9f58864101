use super::{Resource, ResourceKind};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Plugin-wide metadata, keyed by plugin name.
///
/// On the wire the body is the metadata object itself; the name lives only
/// in the URL and in the envelope key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub name: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl PluginMetadata {
    pub fn new(name: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            metadata,
        }
    }
}

impl Resource for PluginMetadata {
    const KIND: ResourceKind = ResourceKind::PluginMetadata;

    fn id(&self) -> &str {
        &self.name
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn to_body(&self) -> Result<Value> {
        Ok(Value::Object(self.metadata.clone()))
    }

    fn from_item(key: &str, value: Value) -> Result<Self> {
        let Value::Object(mut metadata) = value else {
            return Err(Error::InvalidResource {
                kind: "plugin metadata",
                reason: format!("expected an object for {key}"),
            });
        };
        metadata.remove("id");
        let name = key.rsplit('/').next().unwrap_or(key).to_string();
        Ok(Self { name, metadata })
    }
}
