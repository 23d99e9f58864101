use super::{Resource, ResourceKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON schema published by the gateway, e.g. `plugins/limit-count` or `route`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    /// Raw schema document as returned by the gateway.
    pub content: String,
}

impl Schema {
    /// Lookup key of a plugin's schema.
    pub fn plugin_key(plugin: &str) -> String {
        format!("plugins/{plugin}")
    }
}

impl Resource for Schema {
    const KIND: ResourceKind = ResourceKind::Schema;

    fn id(&self) -> &str {
        &self.name
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn to_body(&self) -> crate::Result<Value> {
        Ok(serde_json::from_str(&self.content)?)
    }

    fn from_item(key: &str, value: Value) -> crate::Result<Self> {
        Ok(Self {
            name: key.to_string(),
            content: value.to_string(),
        })
    }
}
