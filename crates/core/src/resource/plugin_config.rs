use super::{Plugins, Resource, ResourceKind};
use crate::id::gen_id;
use crate::labels::Labels;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A reusable plugin set that routes can reference.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    #[serde(default)]
    pub plugins: Plugins,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PluginConfig {
    /// Plugin config whose ID is derived from `name`.
    pub fn named(name: &str) -> Self {
        Self {
            id: gen_id(name),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

impl Resource for PluginConfig {
    const KIND: ResourceKind = ResourceKind::PluginConfig;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn labels(&self) -> Option<&Labels> {
        Some(&self.labels)
    }

    fn lookup_id(key: &str) -> String {
        gen_id(key)
    }
}
