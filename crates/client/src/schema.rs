//! Read-only access to the gateway's JSON schemas.

use crate::error::{Error, Result};
use crate::resource::{ClusterContext, ListOptions, ResourceApi};
use async_trait::async_trait;
use gwadmin_cache::{CacheError, Index};
use gwadmin_core::{ResourceKind, Schema};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Schemas are served raw under `schema/{name}` and cannot be written.
pub struct SchemaClient {
    ctx: Arc<ClusterContext>,
}

impl SchemaClient {
    pub(crate) fn new(ctx: Arc<ClusterContext>) -> Self {
        Self { ctx }
    }

    async fn fetch(&self, name: &str) -> Result<Schema> {
        let value = self
            .ctx
            .transport
            .get_json(ResourceKind::Schema, &format!("schema/{name}"))
            .await?;
        Ok(Schema {
            name: name.to_string(),
            content: value.to_string(),
        })
    }

    /// Names of the plugins the gateway has loaded.
    async fn plugin_names(&self) -> Result<Vec<String>> {
        let value = self
            .ctx
            .transport
            .get_json(ResourceKind::Schema, "plugins/list")
            .await?;
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(name) => Ok(name),
                    other => Err(Error::Decode(format!("plugin name is not a string: {other}"))),
                })
                .collect(),
            other => Err(Error::Decode(format!("plugin list is not an array: {other}"))),
        }
    }

    /// Refetch every plugin schema into the cache. Returns how many were stored.
    pub async fn sync(&self) -> Result<usize> {
        let schemas = self.list(&ListOptions::remote()).await?;
        info!(cluster = %self.ctx.name, count = schemas.len(), "plugin schemas synced");
        Ok(schemas.len())
    }
}

#[async_trait]
impl ResourceApi<Schema> for SchemaClient {
    async fn get(&self, key: &str) -> Result<Schema> {
        match self.ctx.cache.get::<Schema>(key) {
            Ok(schema) => return Ok(schema),
            Err(CacheError::NotFound { .. }) => {
                debug!(cluster = %self.ctx.name, %key, "schema cache miss");
            }
            Err(err) => {
                warn!(cluster = %self.ctx.name, %key, error = %err, "schema cache lookup failed");
            }
        }
        let schema = self.fetch(key).await?;
        if let Err(err) = self.ctx.cache.insert(&schema) {
            error!(cluster = %self.ctx.name, %key, error = %err, "failed to cache fetched schema");
        }
        Ok(schema)
    }

    async fn list(&self, opts: &ListOptions) -> Result<Vec<Schema>> {
        if opts.from_cache {
            return Ok(self.ctx.cache.list(Index::All));
        }

        let mut schemas = Vec::new();
        for plugin in self.plugin_names().await? {
            let schema = self.fetch(&Schema::plugin_key(&plugin)).await?;
            self.ctx.cache.insert(&schema)?;
            schemas.push(schema);
        }
        Ok(schemas)
    }

    async fn create(&self, _obj: &Schema) -> Result<Schema> {
        Err(Error::ReadOnly(ResourceKind::Schema))
    }

    async fn update(&self, _obj: &Schema) -> Result<Schema> {
        Err(Error::ReadOnly(ResourceKind::Schema))
    }

    async fn delete(&self, _obj: &Schema) -> Result<()> {
        Err(Error::ReadOnly(ResourceKind::Schema))
    }
}
