use super::{Plugins, Reference, Resource, ResourceKind};
use crate::id::gen_id;
use crate::labels::Labels;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An HTTP route.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vars: Option<Value>,
    #[serde(default, skip_serializing_if = "Plugins::is_empty")]
    pub plugins: Plugins,
    /// Upstream this route forwards to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_config_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_websocket: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u8>,
    /// Fields not modelled above, kept as returned by the gateway.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Route {
    /// Route whose ID is derived from `name`.
    pub fn named(name: &str) -> Self {
        Self {
            id: gen_id(name),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

impl Resource for Route {
    const KIND: ResourceKind = ResourceKind::Route;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn labels(&self) -> Option<&Labels> {
        Some(&self.labels)
    }

    fn references(&self) -> Vec<(Reference, &str)> {
        let mut refs = Vec::new();
        if let Some(id) = self.upstream_id.as_deref().filter(|id| !id.is_empty()) {
            refs.push((Reference::Upstream, id));
        }
        if let Some(id) = self.plugin_config_id.as_deref().filter(|id| !id.is_empty()) {
            refs.push((Reference::PluginConfig, id));
        }
        refs
    }

    fn lookup_id(key: &str) -> String {
        gen_id(key)
    }
}
