//! Client error types.

use gwadmin_cache::CacheError;
use gwadmin_core::ResourceKind;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by clusters, resource clients and the registry.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cluster does not exist")]
    ClusterNotExist,

    #[error("duplicated cluster: {0}")]
    DuplicatedCluster(String),

    /// The gateway reported the feature behind this endpoint as disabled.
    #[error("function disabled")]
    FunctionDisabled,

    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },

    #[error("{kind} {id} is still in use by a {dependent}")]
    StillInUse {
        kind: ResourceKind,
        id: String,
        dependent: ResourceKind,
    },

    #[error("{0} is read-only")]
    ReadOnly(ResourceKind),

    #[error("unexpected status {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Resource(#[from] gwadmin_core::Error),

    #[error("cache error: {0}")]
    Cache(CacheError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("health check of {addr} failed: {source}")]
    HealthCheck {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Terminal warm-sync failure, shared by every caller of `has_synced`.
    #[error("cache sync failed: {0}")]
    SyncFailed(Arc<Error>),

    /// The cluster was replaced or removed before its warm-sync finished.
    #[error("cluster shut down")]
    ClusterShutdown,

    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<CacheError> for Error {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::NotFound { kind, id } => Self::NotFound { kind, id },
            CacheError::StillInUse {
                kind,
                id,
                dependent,
            } => Self::StillInUse {
                kind,
                id,
                dependent,
            },
            other => Self::Cache(other),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
