//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_routes_registered` (gauge): routes in the active table
//! - `api_requests_total` (counter): dispatched requests by handler, status
//! - `api_request_duration_seconds` (histogram): dispatch latency
//!
//! # Design Decisions
//! - Recording is a no-op until `init_metrics` installs the exporter
//! - Unmatched requests are labelled with handler `none`

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_routes_registered(count: usize) {
    metrics::gauge!("api_routes_registered").set(count as f64);
}

pub fn record_request(handler: &str, status: u16, start: Instant) {
    metrics::counter!(
        "api_requests_total",
        "handler" => handler.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("api_request_duration_seconds", "handler" => handler.to_string())
        .record(start.elapsed().as_secs_f64());
}
