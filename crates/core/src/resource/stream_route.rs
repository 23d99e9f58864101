use super::{Plugins, Reference, Resource, ResourceKind};
use crate::id::gen_id;
use crate::labels::Labels;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An L4 (TCP/UDP) route.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamRoute {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_id: Option<String>,
    #[serde(default, skip_serializing_if = "Plugins::is_empty")]
    pub plugins: Plugins,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StreamRoute {
    /// Stream route whose ID is derived from `name`.
    pub fn named(name: &str) -> Self {
        Self {
            id: gen_id(name),
            ..Default::default()
        }
    }
}

impl Resource for StreamRoute {
    const KIND: ResourceKind = ResourceKind::StreamRoute;

    fn id(&self) -> &str {
        &self.id
    }

    fn labels(&self) -> Option<&Labels> {
        Some(&self.labels)
    }

    fn references(&self) -> Vec<(Reference, &str)> {
        match self.upstream_id.as_deref() {
            Some(id) if !id.is_empty() => vec![(Reference::Upstream, id)],
            _ => Vec::new(),
        }
    }

    fn lookup_id(key: &str) -> String {
        gen_id(key)
    }
}
