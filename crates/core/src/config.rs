//! Configuration types for clusters and the cluster registry.

use crate::error::{Error, Result};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "GWADMIN_";

/// Admin API generation spoken by a cluster.
///
/// The two generations differ in envelope shape and in the SSL collection path.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdminApiVersion {
    V2,
    #[default]
    V3,
}

/// Bounded exponential backoff.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BackoffConfig {
    /// Total attempts, including the first one. Must be at least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound for a single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
}

impl BackoffConfig {
    /// Cache warm-sync retry budget: five attempts two seconds apart.
    pub fn warm_sync() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 2_000,
            max_delay_ms: 2_000,
            backoff_multiplier: 1.0,
        }
    }

    /// Health check retry budget: three attempts five seconds apart.
    pub fn health_check() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 5_000,
            max_delay_ms: 5_000,
            backoff_multiplier: 1.0,
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Options for one admin API endpoint.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterOptions {
    /// Unique cluster name within a registry.
    pub name: String,
    /// Admin API base URL, e.g. `http://127.0.0.1:9180/apisix/admin`.
    pub base_url: String,
    /// Static key sent as `X-API-Key`.
    #[serde(default)]
    pub admin_key: Option<String>,
    #[serde(default)]
    pub admin_api_version: AdminApiVersion,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// TCP connect timeout in seconds, also used by the health check.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Disable TLS certificate verification. Has no default on purpose.
    pub skip_tls_verify: bool,
    /// Warm the cache at startup and hold writes until it is done.
    #[serde(default = "default_sync_cache")]
    pub sync_cache: bool,
    /// Skip writes whose body matches the last one submitted for that ID.
    #[serde(default)]
    pub sync_comparison: bool,
    /// Refresh plugin schemas on this interval when set.
    #[serde(default)]
    pub schema_sync_interval_secs: Option<u64>,
    #[serde(default = "BackoffConfig::warm_sync")]
    pub sync_backoff: BackoffConfig,
    #[serde(default = "BackoffConfig::health_check")]
    pub health_check_backoff: BackoffConfig,
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    3
}

fn default_sync_cache() -> bool {
    true
}

impl ClusterOptions {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        skip_tls_verify: bool,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            admin_key: None,
            admin_api_version: AdminApiVersion::default(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            skip_tls_verify,
            sync_cache: default_sync_cache(),
            sync_comparison: false,
            schema_sync_interval_secs: None,
            sync_backoff: BackoffConfig::warm_sync(),
            health_check_backoff: BackoffConfig::health_check(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn schema_sync_interval(&self) -> Option<Duration> {
        self.schema_sync_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Check the options that cannot be defaulted.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Config("cluster name is empty".to_string()));
        }
        if self.base_url.is_empty() {
            return Err(Error::Config(format!(
                "cluster {}: empty base url",
                self.name
            )));
        }
        for (what, backoff) in [
            ("sync_backoff", &self.sync_backoff),
            ("health_check_backoff", &self.health_check_backoff),
        ] {
            if backoff.max_attempts == 0 {
                return Err(Error::Config(format!(
                    "cluster {}: {what}.max_attempts must be at least 1",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ClusterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterOptions")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("admin_key", &self.admin_key.as_ref().map(|_| "<redacted>"))
            .field("admin_api_version", &self.admin_api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("skip_tls_verify", &self.skip_tls_verify)
            .field("sync_cache", &self.sync_cache)
            .field("sync_comparison", &self.sync_comparison)
            .field("schema_sync_interval_secs", &self.schema_sync_interval_secs)
            .finish_non_exhaustive()
    }
}

/// Top-level configuration consumed when building a cluster registry.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RegistryConfig {
    #[serde(default)]
    pub clusters: Vec<ClusterOptions>,
}

impl RegistryConfig {
    /// Load from an optional TOML file, then `GWADMIN_*` environment variables.
    ///
    /// Nested keys use `__` as separator, e.g. `GWADMIN_CLUSTERS`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Parse from an in-memory TOML document.
    pub fn from_toml(doc: &str) -> Result<Self> {
        Self::extract(Figment::from(Toml::string(doc)))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        for cluster in &config.clusters {
            cluster.validate()?;
        }
        Ok(config)
    }
}
