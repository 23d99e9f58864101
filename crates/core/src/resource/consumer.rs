use super::{Plugins, Resource, ResourceKind};
use crate::labels::Labels;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An API consumer, keyed by username rather than a generated ID.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Consumer {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "Plugins::is_empty")]
    pub plugins: Plugins,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Consumer {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }
}

impl Resource for Consumer {
    const KIND: ResourceKind = ResourceKind::Consumer;

    fn id(&self) -> &str {
        &self.username
    }

    fn labels(&self) -> Option<&Labels> {
        Some(&self.labels)
    }
}
