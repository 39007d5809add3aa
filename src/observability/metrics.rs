//! Metrics collection and exposition.
//!
//! # Metrics
//! - `legacy_gate_requests_total` (counter): gate decisions by version and decision
//! - `legacy_gate_blocked_total` (counter): rejections by blocked version
//! - `legacy_gate_upstream_errors_total` (counter): failed forwards
//! - `legacy_gate_policy_generation` (gauge): active configuration generation
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are bounded (protocol versions, fixed decision names)

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(version: &'static str, allowed: bool) {
    let decision = if allowed { "allow" } else { "reject" };
    counter!("legacy_gate_requests_total", "version" => version, "decision" => decision)
        .increment(1);
    if !allowed {
        counter!("legacy_gate_blocked_total", "version" => version).increment(1);
    }
}

pub fn record_upstream_error() {
    counter!("legacy_gate_upstream_errors_total").increment(1);
}

pub fn record_generation(generation: u64) {
    gauge!("legacy_gate_policy_generation").set(generation as f64);
}
