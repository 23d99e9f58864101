//! Per-kind resource clients composing the cache and the admin API.

use crate::error::Result;
use crate::metrics;
use crate::sync::SyncState;
use crate::transport::Transport;
use async_trait::async_trait;
use gwadmin_cache::{Cache, CacheError, Cached, Index};
use gwadmin_core::{OwnerRef, Resource};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Source selection for [`ResourceApi::list`].
#[derive(Clone, Debug, Default)]
pub struct ListOptions {
    /// Read the local cache instead of the remote collection.
    pub from_cache: bool,
    /// Keep only objects carrying this owner's labels.
    pub owner: Option<OwnerRef>,
}

impl ListOptions {
    /// The full remote collection.
    pub fn remote() -> Self {
        Self::default()
    }

    /// Cached objects created for `owner`.
    pub fn owned_by(owner: OwnerRef) -> Self {
        Self {
            from_cache: true,
            owner: Some(owner),
        }
    }
}

/// Get/List/Create/Update/Delete for one resource kind on one cluster.
#[async_trait]
pub trait ResourceApi<T: Resource>: Send + Sync {
    /// Look `key` up in the cache, falling back to the admin API on a miss.
    async fn get(&self, key: &str) -> Result<T>;

    async fn list(&self, opts: &ListOptions) -> Result<Vec<T>>;

    /// Write `obj` remotely and cache the object the gateway confirmed.
    async fn create(&self, obj: &T) -> Result<T>;

    async fn update(&self, obj: &T) -> Result<T>;

    async fn delete(&self, obj: &T) -> Result<()>;
}

/// State shared by every resource client of one cluster.
pub(crate) struct ClusterContext {
    pub name: String,
    pub transport: Transport,
    pub cache: Cache,
    pub sync: SyncState,
    pub sync_comparison: bool,
}

impl ClusterContext {
    /// Fetch and decode the full remote collection of `T`.
    pub async fn list_remote<T: Resource>(&self) -> Result<Vec<T>> {
        self.transport
            .list_items(T::KIND)
            .await?
            .into_iter()
            .map(|item| item.decode())
            .collect()
    }
}

/// The [`ResourceApi`] of a live cluster.
pub struct ResourceClient<T> {
    ctx: Arc<ClusterContext>,
    /// Last object submitted per ID, for sync comparison.
    submitted: Mutex<HashMap<String, T>>,
}

impl<T: Cached> ResourceClient<T> {
    pub(crate) fn new(ctx: Arc<ClusterContext>) -> Self {
        Self {
            ctx,
            submitted: Mutex::new(HashMap::new()),
        }
    }

    /// Cached confirmation of an identical earlier write, if any.
    fn unchanged(&self, obj: &T) -> Option<T> {
        if !self.ctx.sync_comparison {
            return None;
        }
        let submitted = self.submitted.lock();
        if submitted.get(obj.id()) != Some(obj) {
            return None;
        }
        self.ctx.cache.get::<T>(obj.id()).ok()
    }

    async fn put(&self, obj: &T, operation: &'static str) -> Result<T> {
        let mut obj = obj.clone();
        obj.prepare()?;

        if let Some(cached) = self.unchanged(&obj) {
            debug!(cluster = %self.ctx.name, kind = %T::KIND, id = %obj.id(), "unchanged, skipping write");
            metrics::record_sync_operation(&self.ctx.name, T::KIND, "skipped");
            return Ok(cached);
        }

        self.ctx.sync.wait().await?;

        let body = obj.to_body()?;
        let confirmed: T = match self
            .ctx
            .transport
            .put_item(T::KIND, obj.id(), &body)
            .await
            .and_then(|item| item.decode())
        {
            Ok(confirmed) => confirmed,
            Err(err) => {
                error!(cluster = %self.ctx.name, kind = %T::KIND, id = %obj.id(), operation, error = %err, "remote write failed");
                metrics::record_sync_operation(&self.ctx.name, T::KIND, "failure");
                return Err(err);
            }
        };
        metrics::record_sync_operation(&self.ctx.name, T::KIND, "success");

        self.ctx.cache.insert(&confirmed)?;
        if self.ctx.sync_comparison {
            self.submitted.lock().insert(obj.id().to_string(), obj);
        }
        Ok(confirmed)
    }
}

#[async_trait]
impl<T: Cached> ResourceApi<T> for ResourceClient<T> {
    async fn get(&self, key: &str) -> Result<T> {
        let id = T::lookup_id(key);
        match self.ctx.cache.get::<T>(&id) {
            Ok(obj) => return Ok(obj),
            Err(CacheError::NotFound { .. }) => {
                debug!(cluster = %self.ctx.name, kind = %T::KIND, %key, "cache miss");
            }
            Err(err) => {
                warn!(cluster = %self.ctx.name, kind = %T::KIND, %key, error = %err, "cache lookup failed");
            }
        }

        let obj: T = self.ctx.transport.get_item(T::KIND, &id).await?.decode()?;
        if let Err(err) = self.ctx.cache.insert(&obj) {
            error!(cluster = %self.ctx.name, kind = %T::KIND, %key, error = %err, "failed to cache fetched object");
        }
        Ok(obj)
    }

    async fn list(&self, opts: &ListOptions) -> Result<Vec<T>> {
        if opts.from_cache {
            return Ok(match &opts.owner {
                Some(owner) => self.ctx.cache.list(Index::Owner(owner)),
                None => self.ctx.cache.list(Index::All),
            });
        }

        let mut objs = self.ctx.list_remote::<T>().await?;
        if let Some(owner) = &opts.owner {
            objs.retain(|obj| obj.owner().as_ref() == Some(owner));
        }
        Ok(objs)
    }

    async fn create(&self, obj: &T) -> Result<T> {
        self.put(obj, "create").await
    }

    async fn update(&self, obj: &T) -> Result<T> {
        self.put(obj, "update").await
    }

    async fn delete(&self, obj: &T) -> Result<()> {
        if let Err(err) = self.ctx.cache.check_references(obj) {
            warn!(cluster = %self.ctx.name, kind = %T::KIND, id = %obj.id(), error = %err, "refusing to delete referenced object");
            return Err(err.into());
        }

        self.ctx.sync.wait().await?;

        if let Err(err) = self.ctx.transport.delete(T::KIND, obj.id()).await {
            metrics::record_sync_operation(&self.ctx.name, T::KIND, "failure");
            return Err(err);
        }
        metrics::record_sync_operation(&self.ctx.name, T::KIND, "success");

        match self.ctx.cache.delete(obj) {
            Ok(()) | Err(CacheError::NotFound { .. }) => {}
            // The remote object is gone; a dependent cached while the request
            // was in flight must not keep it alive locally.
            Err(err) => {
                warn!(cluster = %self.ctx.name, kind = %T::KIND, id = %obj.id(), error = %err, "dropping deleted object still referenced in cache");
                self.ctx.cache.remove::<T>(obj.id());
            }
        }
        self.submitted.lock().remove(obj.id());
        Ok(())
    }
}
