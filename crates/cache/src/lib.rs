//! Local mirror of admin API resources for one cluster.
//!
//! The cache keeps one table per resource kind with:
//! - a unique primary index by ID
//! - a unique, optional name index
//! - an ownership index over the `k8s/kind`, `k8s/namespace`, `k8s/name` labels
//! - foreign-key indexes (route -> upstream, route -> plugin config,
//!   stream route -> upstream) used to refuse deletes that would leave
//!   dangling references
//!
//! Reads return owned copies; nothing handed out aliases cache state.

pub mod error;
pub mod store;
pub mod table;

pub use error::{CacheError, CacheResult};
pub use store::{Cache, Cached, Database};
pub use table::{Index, Table};
