//! Core resource model for the gateway admin client.
//!
//! This crate defines the types shared by the cache and the HTTP client:
//! - Resource kinds and their admin API collection paths
//! - Typed resources (routes, upstreams, SSL certificates, ...)
//! - ID derivation from names and certificate content
//! - Ownership labels linking resources to Kubernetes objects
//! - Cluster and registry configuration

pub mod config;
pub mod error;
pub mod id;
pub mod labels;
pub mod resource;

pub use config::{AdminApiVersion, BackoffConfig, ClusterOptions, RegistryConfig};
pub use error::{Error, Result};
pub use id::gen_id;
pub use labels::{Labels, OwnerRef};
pub use resource::{
    Consumer, GlobalRule, PluginConfig, PluginMetadata, Plugins, Reference, Resource, ResourceKind,
    Route, Schema, Ssl, StreamRoute, Upstream, UpstreamNode,
};
