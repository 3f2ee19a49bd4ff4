// SPDX-License-Identifier: BUSL-1.1
//! # brewline-api - HTTP Front Door for the Bottling Pipeline
//!
//! ## Routes
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | POST | `/bottles` | Queue a bottle (202) |
//! | GET | `/v1/lines` | Status of every line |
//! | GET | `/v1/lines/:key` | Status of one line |
//! | GET | `/health/liveness` | Process is up |
//! | GET | `/health/readiness` | Pipeline accepts bottles |
//! | GET | `/metrics` | Prometheus exposition |
//! | GET | `/openapi.json` | OpenAPI document |
//!
//! No authentication: the service is expected to sit behind the plant
//! network boundary.

pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(prometheus_metrics))
        .merge(routes::bottles::router())
        .merge(routes::lines::router())
        .merge(openapi::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 503 once shutdown has begun.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if state.shutdown().is_triggered() {
        return (StatusCode::SERVICE_UNAVAILABLE, "shutting down");
    }
    (StatusCode::OK, "ready")
}

/// GET /metrics. Refreshes the queue-depth gauges, then encodes.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    state.bottling.observe_depths();
    match state.metrics().render() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode Prometheus metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
