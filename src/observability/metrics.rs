//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by outcome and status
//! - `relay_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Outcome labels mirror the relay error taxonomy
//! - Exposition endpoint is optional and off by default

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its exposition endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(error) => tracing::error!(%error, "Failed to install metrics exporter"),
    }
}

/// Record one relay request outcome.
pub fn record_relay(outcome: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "relay_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "relay_request_duration_seconds",
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}
