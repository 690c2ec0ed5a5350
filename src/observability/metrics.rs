//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): forwarded requests by outcome
//! - `router_request_duration_seconds` (histogram): end-to-end routing latency
//! - `router_attempt_failures_total` (counter): failed attempts by host
//! - `router_host_healthy` (gauge): 1=healthy, 0=unhealthy
//! - `router_health_transitions_total` (counter): committed health changes
//!
//! Recording without an installed recorder is a no-op, so tests need no setup.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one routed request.
pub fn record_request(outcome: &'static str, start: Instant) {
    counter!("router_requests_total", "outcome" => outcome).increment(1);
    histogram!("router_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record one failed forwarding attempt.
pub fn record_attempt_failure(host: &str) {
    counter!("router_attempt_failures_total", "host" => host.to_string()).increment(1);
}

/// Publish the current health flag of a host.
pub fn record_host_health(host: &str, healthy: bool) {
    gauge!("router_host_healthy", "host" => host.to_string()).set(if healthy { 1.0 } else { 0.0 });
}

/// Zero the health gauge of a host that left the pool.
pub fn clear_host_health(host: &str) {
    gauge!("router_host_healthy", "host" => host.to_string()).set(0.0);
}

/// Count a committed health transition.
pub fn record_health_transition(host: &str, healthy: bool) {
    let to = if healthy { "healthy" } else { "unhealthy" };
    counter!("router_health_transitions_total", "host" => host.to_string(), "to" => to).increment(1);
}
