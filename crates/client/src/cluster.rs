//! One admin API endpoint: its cache, resource clients and background tasks.

use crate::error::{Error, Result};
use crate::metrics;
use crate::resource::{ClusterContext, ListOptions, ResourceApi, ResourceClient};
use crate::retry::retry_with_backoff;
use crate::schema::SchemaClient;
use crate::sync::SyncState;
use crate::transport::Transport;
use async_trait::async_trait;
use gwadmin_cache::Cache;
use gwadmin_core::{
    BackoffConfig, ClusterOptions, Consumer, GlobalRule, OwnerRef, PluginConfig, PluginMetadata,
    Resource, Route, Schema, Ssl, StreamRoute, Upstream,
};
use parking_lot::Mutex;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Operations available on a cluster, whether or not it exists.
#[async_trait]
pub trait Cluster: fmt::Display + Send + Sync {
    fn name(&self) -> &str;

    fn route(&self) -> &dyn ResourceApi<Route>;

    fn upstream(&self) -> &dyn ResourceApi<Upstream>;

    fn ssl(&self) -> &dyn ResourceApi<Ssl>;

    fn stream_route(&self) -> &dyn ResourceApi<StreamRoute>;

    fn global_rule(&self) -> &dyn ResourceApi<GlobalRule>;

    fn consumer(&self) -> &dyn ResourceApi<Consumer>;

    fn plugin_config(&self) -> &dyn ResourceApi<PluginConfig>;

    fn schema(&self) -> &dyn ResourceApi<Schema>;

    fn plugin_metadata(&self) -> &dyn ResourceApi<PluginMetadata>;

    /// Wait for the warm-sync to finish and return its outcome.
    async fn has_synced(&self) -> Result<()>;

    /// Check that the admin API accepts TCP connections.
    async fn health_check(&self) -> Result<()>;

    /// Delete every cached object labelled with `owner`, dependents first.
    ///
    /// Returns the number of objects deleted.
    async fn delete_owned(&self, owner: &OwnerRef) -> Result<usize> {
        let opts = ListOptions::owned_by(owner.clone());
        let mut deleted = 0;
        deleted += delete_listed(self.route(), &opts).await?;
        deleted += delete_listed(self.stream_route(), &opts).await?;
        deleted += delete_listed(self.plugin_config(), &opts).await?;
        deleted += delete_listed(self.upstream(), &opts).await?;
        deleted += delete_listed(self.ssl(), &opts).await?;
        deleted += delete_listed(self.consumer(), &opts).await?;
        Ok(deleted)
    }
}

async fn delete_listed<T: Resource>(api: &dyn ResourceApi<T>, opts: &ListOptions) -> Result<usize> {
    let objs = api.list(opts).await?;
    for obj in &objs {
        api.delete(obj).await?;
    }
    Ok(objs.len())
}

/// A cluster backed by a live admin API.
pub struct AdminCluster {
    opts: ClusterOptions,
    admin_addr: String,
    ctx: Arc<ClusterContext>,
    route: ResourceClient<Route>,
    upstream: ResourceClient<Upstream>,
    ssl: ResourceClient<Ssl>,
    stream_route: ResourceClient<StreamRoute>,
    global_rule: ResourceClient<GlobalRule>,
    consumer: ResourceClient<Consumer>,
    plugin_config: ResourceClient<PluginConfig>,
    schema: SchemaClient,
    plugin_metadata: ResourceClient<PluginMetadata>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl AdminCluster {
    /// Build the cluster and start its background tasks.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(opts: ClusterOptions) -> Result<Self> {
        opts.validate().map_err(|e| match e {
            gwadmin_core::Error::Config(msg) => Error::Config(msg),
            other => Error::Resource(other),
        })?;
        let admin_addr = admin_addr(&opts.base_url)?;

        let ctx = Arc::new(ClusterContext {
            name: opts.name.clone(),
            transport: Transport::new(&opts)?,
            cache: Cache::new(),
            sync: SyncState::new(opts.sync_cache),
            sync_comparison: opts.sync_comparison,
        });

        let cluster = Self {
            admin_addr,
            route: ResourceClient::new(ctx.clone()),
            upstream: ResourceClient::new(ctx.clone()),
            ssl: ResourceClient::new(ctx.clone()),
            stream_route: ResourceClient::new(ctx.clone()),
            global_rule: ResourceClient::new(ctx.clone()),
            consumer: ResourceClient::new(ctx.clone()),
            plugin_config: ResourceClient::new(ctx.clone()),
            schema: SchemaClient::new(ctx.clone()),
            plugin_metadata: ResourceClient::new(ctx.clone()),
            tasks: Mutex::new(Vec::new()),
            ctx,
            opts,
        };

        let mut tasks = Vec::new();
        if cluster.opts.sync_cache {
            let ctx = cluster.ctx.clone();
            let backoff = cluster.opts.sync_backoff.clone();
            tasks.push(tokio::spawn(warm_sync(ctx, backoff)));
        }
        if let Some(interval) = cluster.opts.schema_sync_interval() {
            let schema = SchemaClient::new(cluster.ctx.clone());
            tasks.push(tokio::spawn(schema_sync(schema, interval)));
        }
        *cluster.tasks.lock() = tasks;

        info!(cluster = %cluster.opts.name, base_url = %cluster.opts.base_url, "cluster added");
        Ok(cluster)
    }

    pub fn options(&self) -> &ClusterOptions {
        &self.opts
    }

    /// Stop the background tasks. Idempotent.
    ///
    /// A warm-sync still in flight is finished with [`Error::ClusterShutdown`]
    /// so callers holding this cluster stop waiting on it.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        if self.opts.sync_cache && self.ctx.sync.finish_if_pending(Err(Error::ClusterShutdown)) {
            warn!(cluster = %self.opts.name, "cache warm-sync abandoned by shutdown");
        }
    }
}

impl Drop for AdminCluster {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Display for AdminCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.opts.name)
    }
}

#[async_trait]
impl Cluster for AdminCluster {
    fn name(&self) -> &str {
        &self.opts.name
    }

    fn route(&self) -> &dyn ResourceApi<Route> {
        &self.route
    }

    fn upstream(&self) -> &dyn ResourceApi<Upstream> {
        &self.upstream
    }

    fn ssl(&self) -> &dyn ResourceApi<Ssl> {
        &self.ssl
    }

    fn stream_route(&self) -> &dyn ResourceApi<StreamRoute> {
        &self.stream_route
    }

    fn global_rule(&self) -> &dyn ResourceApi<GlobalRule> {
        &self.global_rule
    }

    fn consumer(&self) -> &dyn ResourceApi<Consumer> {
        &self.consumer
    }

    fn plugin_config(&self) -> &dyn ResourceApi<PluginConfig> {
        &self.plugin_config
    }

    fn schema(&self) -> &dyn ResourceApi<Schema> {
        &self.schema
    }

    fn plugin_metadata(&self) -> &dyn ResourceApi<PluginMetadata> {
        &self.plugin_metadata
    }

    async fn has_synced(&self) -> Result<()> {
        self.ctx.sync.wait().await
    }

    async fn health_check(&self) -> Result<()> {
        let timeout = self.opts.connect_timeout();
        retry_with_backoff(&self.opts.health_check_backoff, "health check", || {
            dial(&self.admin_addr, timeout)
        })
        .await
        .inspect_err(|e| error!(cluster = %self.opts.name, error = %e, "health check failed"))
    }
}

/// `host:port` of the admin API, defaulting the port from the scheme.
fn admin_addr(base_url: &str) -> Result<String> {
    let url = reqwest::Url::parse(base_url)
        .map_err(|e| Error::Config(format!("invalid base url {base_url}: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| Error::Config(format!("base url {base_url} has no host")))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| Error::Config(format!("base url {base_url} has no port")))?;
    Ok(format!("{host}:{port}"))
}

async fn dial(addr: &str, timeout: Duration) -> Result<()> {
    let source = match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => return Ok(()),
        Ok(Err(e)) => e,
        Err(_) => io::Error::new(io::ErrorKind::TimedOut, "connect timed out"),
    };
    Err(Error::HealthCheck {
        addr: addr.to_string(),
        source,
    })
}

/// Fetch the bootstrap kinds and load them into the cache.
///
/// All four collections are fetched before anything is inserted, so a failed
/// attempt leaves the cache untouched.
async fn sync_once(ctx: &ClusterContext) -> Result<usize> {
    let routes = ctx.list_remote::<Route>().await?;
    let ssls = ctx.list_remote::<Ssl>().await?;
    let global_rules = ctx.list_remote::<GlobalRule>().await?;
    let consumers = ctx.list_remote::<Consumer>().await?;

    for route in &routes {
        ctx.cache.insert(route)?;
    }
    for ssl in &ssls {
        ctx.cache.insert(ssl)?;
    }
    for rule in &global_rules {
        ctx.cache.insert(rule)?;
    }
    for consumer in &consumers {
        ctx.cache.insert(consumer)?;
    }
    Ok(routes.len() + ssls.len() + global_rules.len() + consumers.len())
}

async fn warm_sync(ctx: Arc<ClusterContext>, backoff: BackoffConfig) {
    let result = retry_with_backoff(&backoff, "cache warm-sync", || sync_once(&ctx)).await;
    metrics::record_cache_sync(&ctx.name, result.is_ok());

    let outcome = match result {
        Ok(count) => {
            info!(cluster = %ctx.name, objects = count, "cache warm-sync finished");
            Ok(())
        }
        Err(err) => {
            error!(cluster = %ctx.name, error = %err, "cache warm-sync gave up");
            Err(err)
        }
    };
    if let Err(err) = ctx.sync.finish(outcome) {
        error!(cluster = %ctx.name, error = %err, "failed to record cache sync outcome");
    }
}

async fn schema_sync(schema: SchemaClient, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(err) = schema.sync().await {
            warn!(error = %err, "plugin schema sync failed");
        }
    }
}
