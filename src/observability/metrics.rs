//! Metrics collection and exposition.
//!
//! # Metrics
//! - `multirest_batches_total` (counter): batch calls by outer status
//! - `multirest_batch_size` (histogram): sub-requests per batch
//! - `multirest_batch_duration_seconds` (histogram): whole-batch latency
//! - `multirest_sub_requests_total` (counter): sub-requests by method, status

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics exporter"),
    }
}

/// Record one completed (or rejected) batch call.
pub fn record_batch(size: usize, status: u16, start: Instant) {
    metrics::counter!("multirest_batches_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("multirest_batch_size").record(size as f64);
    metrics::histogram!("multirest_batch_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one sub-request outcome.
pub fn record_sub_request(method: &str, status: u16) {
    metrics::counter!(
        "multirest_sub_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
