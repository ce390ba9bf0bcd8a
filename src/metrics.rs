// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the hairpin-proxy controller.
//!
//! All metrics use the `hairpin_proxy_` prefix and are exposed on `/metrics` by
//! [`serve_metrics`] when enabled.
//!
//! # Example
//!
//! ```rust,no_run
//! use hairpin_proxy::metrics::record_cycle_success;
//!
//! record_cycle_success("coredns", std::time::Duration::from_millis(40), 3);
//! ```

use crate::constants::{METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PATH};
use axum::{http::StatusCode, routing::get, Router};
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{error, info};

/// Namespace prefix for all metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "hairpin_proxy";

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of reconciliation cycles
///
/// Labels:
/// - `mode`: `coredns` or `hosts_file`
/// - `status`: `success` or `error`
pub static CYCLES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_cycles_total"),
        "Total number of reconciliation cycles by mode and outcome",
    );
    let counter = CounterVec::new(opts, &["mode", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliation cycles in seconds
pub static CYCLE_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_cycle_duration_seconds"),
        "Duration of reconciliation cycles in seconds by mode",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["mode"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Total number of artifact writes
pub static ARTIFACT_UPDATES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_artifact_updates_total"),
        "Total number of times the Corefile or hosts file was rewritten",
    );
    let counter = CounterVec::new(opts, &["mode"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Number of hosts currently hairpinned
pub static HAIRPINNED_HOSTS: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_hosts"),
        "Number of TLS Ingress hosts currently hairpinned",
    );
    let gauge = GaugeVec::new(opts, &["mode"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Total number of errors by kind
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of reconciliation errors by mode and error kind",
    );
    let counter = CounterVec::new(opts, &["mode", "error_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Record a successful cycle and the size of its host set
pub fn record_cycle_success(mode: &str, duration: Duration, host_count: usize) {
    CYCLES_TOTAL.with_label_values(&[mode, "success"]).inc();
    CYCLE_DURATION_SECONDS
        .with_label_values(&[mode])
        .observe(duration.as_secs_f64());
    #[allow(clippy::cast_precision_loss)]
    HAIRPINNED_HOSTS
        .with_label_values(&[mode])
        .set(host_count as f64);
}

/// Record a failed cycle
pub fn record_cycle_error(mode: &str, duration: Duration, error_type: &str) {
    CYCLES_TOTAL.with_label_values(&[mode, "error"]).inc();
    CYCLE_DURATION_SECONDS
        .with_label_values(&[mode])
        .observe(duration.as_secs_f64());
    ERRORS_TOTAL.with_label_values(&[mode, error_type]).inc();
}

/// Record an artifact write
pub fn record_artifact_updated(mode: &str) {
    ARTIFACT_UPDATES_TOTAL.with_label_values(&[mode]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

async fn metrics_handler() -> (StatusCode, String) {
    match gather_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Router serving the metrics endpoint
pub fn metrics_router() -> Router {
    Router::new().route(METRICS_SERVER_PATH, get(metrics_handler))
}

/// Serve `/metrics` on `port` until the task is dropped.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve_metrics(port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind((METRICS_SERVER_BIND_ADDRESS, port)).await?;
    info!(
        "Metrics server listening on {}:{}{}",
        METRICS_SERVER_BIND_ADDRESS, port, METRICS_SERVER_PATH
    );
    axum::serve(listener, metrics_router()).await
}
