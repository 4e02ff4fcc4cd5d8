//! Prometheus metrics for monitoring server health and game activity.
//!
//! Metrics are exported in Prometheus text format by a dedicated listener
//! when `METRICS_BIND` is configured. Without an installed recorder every
//! call here is a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use lcr_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/games", 200);
//! metrics::games_created_total();
//! ```

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::{net::SocketAddr, time::Instant};

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

/// Route-level middleware recording request counts and latency, labelled by
/// route template rather than raw URI.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_string(), |p| p.as_str().to_string());
    let method = request.method().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    http_requests_total(&method, &path, response.status().as_u16());
    http_request_duration_ms(&method, &path, start.elapsed().as_secs_f64() * 1000.0);
    response
}

// ============================================================================
// Game Metrics
// ============================================================================

/// Increment games created counter.
pub fn games_created_total() {
    metrics::counter!("games_created_total").increment(1);
}

/// Add to the turns played counter.
pub fn turns_played_total(turns: u64) {
    metrics::counter!("turns_played_total").increment(turns);
}

/// Increment games completed counter.
pub fn games_completed_total() {
    metrics::counter!("games_completed_total").increment(1);
}

/// Set current live session count.
pub fn active_sessions(count: usize) {
    metrics::gauge!("active_sessions").set(count as f64);
}
