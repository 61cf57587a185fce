use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Which store backend this process was started with.
    pub store: &'static str,
    /// Whether the backing store answers.
    pub store_healthy: bool,
}

/// GET /health
///
/// Answers 503 while the store is unreachable, since no slot or swap
/// operation can succeed then.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let health = &state.stores.health;
    let store_healthy = match health.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(store = health.backend(), error = %e, "Store health check failed");
            false
        }
    };

    let (code, status) = if store_healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            store: health.backend(),
            store_healthy,
        }),
    )
}

/// Mount health check routes (root level, not under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
