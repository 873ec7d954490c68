//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lb_bridge_route_updates_total` (counter): registry events by kind
//! - `lb_bridge_flushes_total` (counter): snapshot flushes by result
//! - `lb_bridge_flush_duration_seconds` (histogram): render + write time
//! - `lb_bridge_route_configs` (gauge): entries in the last flushed model
//! - `lb_bridge_rules` (gauge): rules in the last flushed model
//! - `lb_bridge_reconciler_exits_total` (counter): reconciler exits by kind

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_route_update(event: &'static str) {
    counter!("lb_bridge_route_updates_total", "event" => event).increment(1);
}

pub fn record_flush(success: bool, duration: Duration) {
    let result = if success { "ok" } else { "error" };
    counter!("lb_bridge_flushes_total", "result" => result).increment(1);
    histogram!("lb_bridge_flush_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_model_size(route_configs: usize, rules: usize) {
    gauge!("lb_bridge_route_configs").set(route_configs as f64);
    gauge!("lb_bridge_rules").set(rules as f64);
}

pub fn record_reconciler_exit(kind: &'static str) {
    counter!("lb_bridge_reconciler_exits_total", "kind" => kind).increment(1);
}
