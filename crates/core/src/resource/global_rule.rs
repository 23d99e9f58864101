use super::{Plugins, Resource, ResourceKind};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Plugins applied to every request.
///
/// The admin API expects the ID to equal the name of the first plugin.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalRule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub plugins: Plugins,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GlobalRule {
    pub fn new(plugins: Plugins) -> Self {
        Self {
            plugins,
            ..Default::default()
        }
    }
}

impl Resource for GlobalRule {
    const KIND: ResourceKind = ResourceKind::GlobalRule;

    fn id(&self) -> &str {
        &self.id
    }

    fn prepare(&mut self) -> Result<()> {
        let first = self
            .plugins
            .keys()
            .next()
            .ok_or_else(|| Error::InvalidResource {
                kind: "global rule",
                reason: "at least one plugin is required".to_string(),
            })?;
        self.id = first.clone();
        Ok(())
    }
}
