//! Stand-in returned for names that are not registered.

use crate::cluster::Cluster;
use crate::error::{Error, Result};
use crate::resource::{ListOptions, ResourceApi};
use async_trait::async_trait;
use gwadmin_core::{
    Consumer, GlobalRule, PluginConfig, PluginMetadata, Resource, Route, Schema, Ssl, StreamRoute,
    Upstream,
};
use std::fmt;

/// Every operation fails with [`Error::ClusterNotExist`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NonExistentCluster;

#[async_trait]
impl<T: Resource> ResourceApi<T> for NonExistentCluster {
    async fn get(&self, _key: &str) -> Result<T> {
        Err(Error::ClusterNotExist)
    }

    async fn list(&self, _opts: &ListOptions) -> Result<Vec<T>> {
        Err(Error::ClusterNotExist)
    }

    async fn create(&self, _obj: &T) -> Result<T> {
        Err(Error::ClusterNotExist)
    }

    async fn update(&self, _obj: &T) -> Result<T> {
        Err(Error::ClusterNotExist)
    }

    async fn delete(&self, _obj: &T) -> Result<()> {
        Err(Error::ClusterNotExist)
    }
}

impl fmt::Display for NonExistentCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("non-existent cluster")
    }
}

#[async_trait]
impl Cluster for NonExistentCluster {
    fn name(&self) -> &str {
        ""
    }

    fn route(&self) -> &dyn ResourceApi<Route> {
        self
    }

    fn upstream(&self) -> &dyn ResourceApi<Upstream> {
        self
    }

    fn ssl(&self) -> &dyn ResourceApi<Ssl> {
        self
    }

    fn stream_route(&self) -> &dyn ResourceApi<StreamRoute> {
        self
    }

    fn global_rule(&self) -> &dyn ResourceApi<GlobalRule> {
        self
    }

    fn consumer(&self) -> &dyn ResourceApi<Consumer> {
        self
    }

    fn plugin_config(&self) -> &dyn ResourceApi<PluginConfig> {
        self
    }

    fn schema(&self) -> &dyn ResourceApi<Schema> {
        self
    }

    fn plugin_metadata(&self) -> &dyn ResourceApi<PluginMetadata> {
        self
    }

    async fn has_synced(&self) -> Result<()> {
        Err(Error::ClusterNotExist)
    }

    async fn health_check(&self) -> Result<()> {
        Err(Error::ClusterNotExist)
    }
}
