//! Prometheus metrics for admin API traffic and cache synchronization.
//!
//! Metrics live in a crate-owned [`REGISTRY`]. The embedding process decides
//! whether and where to expose them; [`encode_metrics`] renders the text
//! exposition format for that purpose.

use gwadmin_core::ResourceKind;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{LazyLock, Once};
use std::time::Duration;

/// Registry holding every metric of this crate.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static ADMIN_API_STATUS_CODES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "gwadmin_admin_api_status_codes_total",
            "Admin API responses by cluster, resource kind and status code",
        ),
        &["cluster", "resource", "code"],
    )
    .expect("metric creation failed")
});

pub static ADMIN_API_LATENCY: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "gwadmin_admin_api_latency_seconds",
            "Admin API request latency by cluster and operation",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["cluster", "operation"],
    )
    .expect("metric creation failed")
});

pub static SYNC_OPERATIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "gwadmin_sync_operations_total",
            "Remote writes by cluster, resource kind and outcome",
        ),
        &["cluster", "resource", "result"],
    )
    .expect("metric creation failed")
});

pub static CACHE_SYNC: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "gwadmin_cache_sync_total",
            "Cache warm-sync attempts by cluster and outcome",
        ),
        &["cluster", "result"],
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with [`REGISTRY`]. Idempotent.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(ADMIN_API_STATUS_CODES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ADMIN_API_LATENCY.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SYNC_OPERATIONS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(CACHE_SYNC.clone()))
            .expect("metric registration failed");
    });
}

/// Render [`REGISTRY`] in the Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

pub fn record_status(cluster: &str, kind: ResourceKind, code: u16) {
    ADMIN_API_STATUS_CODES
        .with_label_values(&[cluster, kind.as_str(), &code.to_string()])
        .inc();
}

pub fn record_latency(cluster: &str, operation: &str, elapsed: Duration) {
    ADMIN_API_LATENCY
        .with_label_values(&[cluster, operation])
        .observe(elapsed.as_secs_f64());
}

pub fn record_sync_operation(cluster: &str, kind: ResourceKind, result: &str) {
    SYNC_OPERATIONS
        .with_label_values(&[cluster, kind.as_str(), result])
        .inc();
}

pub fn record_cache_sync(cluster: &str, success: bool) {
    let result = if success { "success" } else { "failure" };
    CACHE_SYNC.with_label_values(&[cluster, result]).inc();
}
