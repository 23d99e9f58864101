//! Multi-cluster client for the gateway admin API.
//!
//! Each registered cluster owns a local cache that is warmed from the admin
//! API at startup and kept in step with every write made through this crate:
//! - Reads go to the cache first and fall back to the admin API on a miss
//! - Writes wait for the warm-sync, go to the admin API, then update the cache
//! - Deletes of objects still referenced in the cache are refused locally
//!
//! Unknown cluster names resolve to a stand-in whose operations all fail with
//! [`Error::ClusterNotExist`].

pub mod cluster;
pub mod envelope;
pub mod error;
pub mod metrics;
pub mod null;
pub mod registry;
pub mod resource;
pub mod retry;
pub mod schema;
pub mod sync;
pub mod transport;

pub use cluster::{AdminCluster, Cluster};
pub use error::{Error, Result};
pub use null::NonExistentCluster;
pub use registry::ClusterRegistry;
pub use resource::{ListOptions, ResourceApi, ResourceClient};
pub use schema::SchemaClient;
