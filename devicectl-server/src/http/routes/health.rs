//! Readiness endpoint
//!
//! Reports 200 while storage answers, 503 otherwise.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::http::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: &'static str,
    pub version: &'static str,
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let (status, body_status, storage) = match state.devices.ping().await {
        Ok(()) => (StatusCode::OK, "ok", "up"),
        Err(e) => {
            tracing::error!(error = %e, "storage readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable", "down")
        }
    };

    (
        status,
        Json(HealthResponse {
            status: body_status,
            storage,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
