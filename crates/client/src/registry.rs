//! Name-indexed set of clusters.

use crate::cluster::{AdminCluster, Cluster};
use crate::error::{Error, Result};
use crate::metrics;
use crate::null::NonExistentCluster;
use gwadmin_core::{ClusterOptions, RegistryConfig};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Registry of admin API clusters, safe to share between tasks.
pub struct ClusterRegistry {
    clusters: RwLock<HashMap<String, Arc<AdminCluster>>>,
    missing: Arc<NonExistentCluster>,
}

impl Default for ClusterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterRegistry {
    pub fn new() -> Self {
        metrics::register_metrics();
        Self {
            clusters: RwLock::new(HashMap::new()),
            missing: Arc::new(NonExistentCluster),
        }
    }

    /// Register every cluster in `config`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let registry = Self::new();
        for opts in &config.clusters {
            registry.add_cluster(opts.clone())?;
        }
        Ok(registry)
    }

    /// Build and register a cluster, starting its warm-sync if enabled.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn add_cluster(&self, opts: ClusterOptions) -> Result<()> {
        if self.clusters.read().contains_key(&opts.name) {
            return Err(Error::DuplicatedCluster(opts.name));
        }
        let cluster = Arc::new(AdminCluster::new(opts)?);

        let mut clusters = self.clusters.write();
        // Checked again: another caller may have won the race while building.
        if clusters.contains_key(cluster.name()) {
            return Err(Error::DuplicatedCluster(cluster.name().to_string()));
        }
        clusters.insert(cluster.name().to_string(), cluster);
        Ok(())
    }

    /// Replace a registered cluster with one built from `opts`.
    ///
    /// The previous cluster's cache and background tasks are discarded.
    pub fn update_cluster(&self, opts: ClusterOptions) -> Result<()> {
        if !self.clusters.read().contains_key(&opts.name) {
            return Err(Error::ClusterNotExist);
        }
        let cluster = Arc::new(AdminCluster::new(opts)?);
        let previous = self
            .clusters
            .write()
            .insert(cluster.name().to_string(), cluster);
        if let Some(previous) = previous {
            previous.shutdown();
            info!(cluster = %previous, "cluster replaced");
        }
        Ok(())
    }

    /// Remove a cluster and stop its background tasks.
    pub fn delete_cluster(&self, name: &str) -> Result<()> {
        let removed = self.clusters.write().remove(name);
        match removed {
            Some(cluster) => {
                cluster.shutdown();
                info!(cluster = %cluster, "cluster deleted");
                Ok(())
            }
            None => Err(Error::ClusterNotExist),
        }
    }

    /// The cluster registered as `name`, or a stand-in whose every
    /// operation fails with [`Error::ClusterNotExist`].
    pub fn cluster(&self, name: &str) -> Arc<dyn Cluster> {
        match self.clusters.read().get(name) {
            Some(cluster) => cluster.clone() as Arc<dyn Cluster>,
            None => self.missing.clone(),
        }
    }

    /// Every registered cluster, ordered by name.
    pub fn list_clusters(&self) -> Vec<Arc<dyn Cluster>> {
        let mut clusters: Vec<Arc<AdminCluster>> = self.clusters.read().values().cloned().collect();
        clusters.sort_by(|a, b| a.name().cmp(b.name()));
        clusters
            .into_iter()
            .map(|cluster| cluster as Arc<dyn Cluster>)
            .collect()
    }
}
