//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lb_selections_total` (counter): selections by outcome (selected/none)
//! - `backend_connections_total` (counter): accepted connections per port
//! - `backend_connection_errors_total` (counter): failed connections by port, kind
//! - `backend_active_connections` (gauge): in-flight handlers per port
//!
//! Recording is a no-op until [`init_metrics`] installs an exporter.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_selection(found: bool) {
    let outcome = if found { "selected" } else { "none" };
    counter!("lb_selections_total", "outcome" => outcome).increment(1);
}

pub fn record_connection(port: u16) {
    counter!("backend_connections_total", "port" => port.to_string()).increment(1);
}

pub fn record_connection_error(port: u16, kind: &'static str) {
    counter!("backend_connection_errors_total", "port" => port.to_string(), "kind" => kind).increment(1);
}

pub fn set_active_connections(port: u16, active: u64) {
    gauge!("backend_active_connections", "port" => port.to_string()).set(active as f64);
}
