//! Metrics collection and exposition.
//!
//! # Metrics
//! - `request_mark_requests_total` (counter): requests by outcome (marked, unmarked)
//! - `request_mark_refresh_total` (counter): refresh cycles by outcome (ok, error)
//! - `request_mark_parse_failures_total` (counter): rule records skipped
//! - `request_mark_active_rules` (gauge): rules in the active snapshot

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(marked: bool) {
    let outcome = if marked { "marked" } else { "unmarked" };
    counter!("request_mark_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_refresh(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("request_mark_refresh_total", "outcome" => outcome).increment(1);
}

pub fn record_parse_failure() {
    counter!("request_mark_parse_failures_total").increment(1);
}

pub fn record_active_rules(count: usize) {
    gauge!("request_mark_active_rules").set(count as f64);
}
