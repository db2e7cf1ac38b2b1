//! `/metrics` HTTP endpoint.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use packet_sd_metrics::{SdMetrics, render_prometheus};

/// Router serving the agent's own metrics.
pub fn metrics_router(metrics: SdMetrics) -> Router {
    Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(metrics)
}

/// GET /metrics
async fn prometheus_metrics(State(metrics): State<SdMetrics>) -> impl IntoResponse {
    let body = render_prometheus(&metrics.snapshot(), env!("CARGO_PKG_VERSION"));
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

/// Accept Go-style `:port` listen addresses by binding every interface.
pub fn bind_address(listen_address: &str) -> String {
    match listen_address.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => listen_address.to_string(),
    }
}
