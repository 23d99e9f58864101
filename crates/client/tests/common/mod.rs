//! Shared helpers for client integration tests.

use gwadmin_core::{BackoffConfig, ClusterOptions};
use httpmock::MockServer;
use serde_json::{Value, json};
use std::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Admin API prefix served by the mock gateway.
pub const ADMIN_PREFIX: &str = "/apisix/admin";

/// Install a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

#[allow(dead_code)]
pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Path of `suffix` below the admin prefix.
#[allow(dead_code)]
pub fn admin_path(suffix: &str) -> String {
    format!("{ADMIN_PREFIX}/{suffix}")
}

/// Millisecond backoff so retry paths finish quickly.
#[allow(dead_code)]
pub fn fast_backoff(max_attempts: u32) -> BackoffConfig {
    BackoffConfig {
        max_attempts,
        initial_delay_ms: 5,
        max_delay_ms: 5,
        backoff_multiplier: 1.0,
    }
}

/// Options pointing at `server` with warm-sync disabled.
#[allow(dead_code)]
pub fn options(name: &str, server: &MockServer) -> ClusterOptions {
    let mut opts = ClusterOptions::new(name, server.url(ADMIN_PREFIX), false);
    opts.sync_cache = false;
    opts.sync_backoff = fast_backoff(3);
    opts.health_check_backoff = fast_backoff(2);
    opts.connect_timeout_secs = 1;
    opts
}

/// A v3 single-object envelope.
#[allow(dead_code)]
pub fn item(key: &str, value: Value) -> Value {
    json!({ "key": key, "value": value })
}

/// A v3 list envelope with a string total, as the gateway sends it.
#[allow(dead_code)]
pub fn list(items: Vec<Value>) -> Value {
    json!({ "total": items.len().to_string(), "list": items })
}

/// An empty v3 list, encoded the way the gateway encodes empty arrays.
#[allow(dead_code)]
pub fn empty_list() -> Value {
    json!({ "total": 0, "list": {} })
}
