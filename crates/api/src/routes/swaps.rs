use axum::routing::{get, post};
use axum::Router;

use crate::handlers::swaps;
use crate::state::AppState;

/// Swap request routes.
///
/// ```text
/// GET  /swap-requests                -> list_swap_requests
/// POST /swap-requests                -> create_swap_request
/// POST /swap-requests/{id}/response  -> respond_to_swap_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/swap-requests",
            get(swaps::list_swap_requests).post(swaps::create_swap_request),
        )
        .route(
            "/swap-requests/{id}/response",
            post(swaps::respond_to_swap_request),
        )
}
