//! Typed admin API resources and the capability trait shared by all of them.

mod consumer;
mod global_rule;
mod plugin_config;
mod plugin_metadata;
mod route;
mod schema;
mod ssl;
mod stream_route;
mod upstream;

pub use consumer::Consumer;
pub use global_rule::GlobalRule;
pub use plugin_config::PluginConfig;
pub use plugin_metadata::PluginMetadata;
pub use route::Route;
pub use schema::Schema;
pub use ssl::Ssl;
pub use stream_route::StreamRoute;
pub use upstream::{Upstream, UpstreamNode};

use crate::config::AdminApiVersion;
use crate::error::Result;
use crate::labels::{Labels, OwnerRef};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Plugin configuration keyed by plugin name.
///
/// Ordered so that "the first plugin" is well defined.
pub type Plugins = BTreeMap<String, Value>;

/// The nine resource kinds managed through the admin API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Route,
    Upstream,
    Ssl,
    StreamRoute,
    GlobalRule,
    Consumer,
    PluginConfig,
    Schema,
    PluginMetadata,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 9] = [
        ResourceKind::Route,
        ResourceKind::Upstream,
        ResourceKind::Ssl,
        ResourceKind::StreamRoute,
        ResourceKind::GlobalRule,
        ResourceKind::Consumer,
        ResourceKind::PluginConfig,
        ResourceKind::Schema,
        ResourceKind::PluginMetadata,
    ];

    /// Short name used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::Upstream => "upstream",
            Self::Ssl => "ssl",
            Self::StreamRoute => "stream_route",
            Self::GlobalRule => "global_rule",
            Self::Consumer => "consumer",
            Self::PluginConfig => "plugin_config",
            Self::Schema => "schema",
            Self::PluginMetadata => "plugin_metadata",
        }
    }

    /// Collection path below the admin API base URL.
    pub fn path(self, version: AdminApiVersion) -> &'static str {
        match (self, version) {
            (Self::Route, _) => "routes",
            (Self::Upstream, _) => "upstreams",
            (Self::Ssl, AdminApiVersion::V2) => "ssl",
            (Self::Ssl, AdminApiVersion::V3) => "ssls",
            (Self::StreamRoute, _) => "stream_routes",
            (Self::GlobalRule, _) => "global_rules",
            (Self::Consumer, _) => "consumers",
            (Self::PluginConfig, _) => "plugin_configs",
            (Self::Schema, _) => "schema",
            (Self::PluginMetadata, _) => "plugin_metadata",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A foreign key from one resource to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reference {
    Upstream,
    PluginConfig,
}

impl Reference {
    /// Kind of the referenced resource.
    pub fn target(self) -> ResourceKind {
        match self {
            Self::Upstream => ResourceKind::Upstream,
            Self::PluginConfig => ResourceKind::PluginConfig,
        }
    }
}

/// Capability set every cached, remotely managed resource provides.
pub trait Resource:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: ResourceKind;

    /// Primary key in the admin API.
    fn id(&self) -> &str;

    /// Locally unique name, if the kind has one.
    fn name(&self) -> Option<&str> {
        None
    }

    fn labels(&self) -> Option<&Labels> {
        None
    }

    /// Foreign keys held by this object.
    fn references(&self) -> Vec<(Reference, &str)> {
        Vec::new()
    }

    /// Map a caller-supplied lookup key to the primary key.
    fn lookup_id(key: &str) -> String {
        key.to_string()
    }

    /// Normalize and validate before a remote write.
    fn prepare(&mut self) -> Result<()> {
        Ok(())
    }

    /// JSON body sent with `PUT`.
    fn to_body(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Build the object from an envelope's key and value.
    fn from_item(_key: &str, value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// The Kubernetes object this resource was created for.
    fn owner(&self) -> Option<OwnerRef> {
        self.labels().and_then(OwnerRef::from_labels)
    }
}
