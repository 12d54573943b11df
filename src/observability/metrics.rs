//! Metrics collection and exposition.
//!
//! # Metrics
//! - `hopechain_requests_total` (counter): HTTP requests by method, route, status
//! - `hopechain_request_duration_seconds` (histogram): HTTP latency
//! - `hopechain_horizon_calls_total` (counter): Horizon calls by operation, outcome
//! - `hopechain_horizon_call_duration_seconds` (histogram): Horizon latency
//! - `hopechain_donations_total` (counter): donation attempts by outcome
//! - `hopechain_session_events_total` (counter): connect / disconnect

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled HTTP request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "hopechain_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("hopechain_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record one Horizon call.
pub fn record_horizon_call(operation: &'static str, ok: bool, start: Instant) {
    let outcome = if ok { "ok" } else { "error" };
    counter!(
        "hopechain_horizon_calls_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    histogram!("hopechain_horizon_call_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

/// Record a donation attempt outcome (`submitted`, `rejected`, `failed`).
pub fn record_donation(outcome: &'static str) {
    counter!("hopechain_donations_total", "outcome" => outcome).increment(1);
}

/// Record a session transition (`connect`, `disconnect`).
pub fn record_session_event(event: &'static str) {
    counter!("hopechain_session_events_total", "event" => event).increment(1);
}
