use super::{Resource, ResourceKind};
use crate::id::gen_id;
use crate::labels::Labels;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A backend address of an upstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamNode {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub weight: u32,
}

/// An upstream (the gateway-side "service" routes forward to).
///
/// Routes and stream routes reference it by ID; it cannot be deleted while
/// such a reference exists in the cache.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    /// Load balancing algorithm, e.g. `roundrobin` or `chash`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub lb_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nodes")]
    pub nodes: Vec<UpstreamNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Upstream {
    /// Upstream whose ID is derived from `name`.
    pub fn named(name: &str) -> Self {
        Self {
            id: gen_id(name),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

impl Resource for Upstream {
    const KIND: ResourceKind = ResourceKind::Upstream;

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

/// Nodes arrive either as a list of objects or, when written by other
/// tools, as a `"host:port": weight` map.
fn deserialize_nodes<'de, D>(deserializer: D) -> Result<Vec<UpstreamNode>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Nodes {
        List(Vec<UpstreamNode>),
        Map(BTreeMap<String, u32>),
    }

    match Nodes::deserialize(deserializer)? {
        Nodes::List(nodes) => Ok(nodes),
        Nodes::Map(map) => map
            .into_iter()
            .map(|(addr, weight)| {
                let (host, port) = addr
                    .rsplit_once(':')
                    .ok_or_else(|| serde::de::Error::custom(format!("node without port: {addr}")))?;
                let port = port
                    .parse()
                    .map_err(|_| serde::de::Error::custom(format!("invalid node port: {addr}")))?;
                Ok(UpstreamNode {
                    host: host.to_string(),
                    port,
                    weight,
                })
            })
            .collect(),
    }
}
