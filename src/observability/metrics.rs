//! # Metrics
//!
//! Prometheus export for the cache and RPC series recorded with the
//! `metrics` macros across the crate.

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use tracing::info;

use crate::core::config::ObservabilityConfig;
use crate::core::error::{ProxyError, ProxyResult};

/// Latency buckets for upstream round trips, in seconds.
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Install the Prometheus recorder and its scrape listener.
pub fn install_prometheus(config: &ObservabilityConfig) -> ProxyResult<()> {
    let addr: SocketAddr = config.metrics_address.parse().map_err(|e| {
        ProxyError::config(format!("Invalid metrics address '{}': {}", config.metrics_address, e))
    })?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full("places_rpc_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )
        .map_err(|e| ProxyError::config(format!("Failed to set histogram buckets: {}", e)))?
        .install()
        .map_err(|e| ProxyError::config(format!("Failed to install metrics exporter: {}", e)))?;

    describe_metrics();
    info!(%addr, "Prometheus exporter listening");
    Ok(())
}

/// Register help text for every series.
pub fn describe_metrics() {
    describe_counter!("places_cache_hits_total", "Lookups answered from the cache");
    describe_counter!("places_cache_misses_total", "Lookups that fell through to the loader");
    describe_counter!(
        "places_cache_store_errors_total",
        "Cache backend failures absorbed as a miss or dropped write"
    );
    describe_counter!(
        "places_singleflight_shared_total",
        "Callers that joined a load already in flight"
    );
    describe_counter!("places_rpc_requests_total", "Places requests by method and status");
    describe_gauge!("places_rpc_inflight_requests", "Places requests currently running");
    describe_histogram!(
        "places_rpc_request_duration_seconds",
        Unit::Seconds,
        "Places request latency"
    );
}
