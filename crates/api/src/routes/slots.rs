use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::slots;
use crate::state::AppState;

/// Slot routes.
///
/// ```text
/// GET   /slots            -> list_slots
/// POST  /slots            -> create_slot
/// PATCH /slots/{id}       -> update_slot_status
/// GET   /swappable-slots  -> list_swappable
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/slots", get(slots::list_slots).post(slots::create_slot))
        .route("/slots/{id}", patch(slots::update_slot_status))
        .route("/swappable-slots", get(slots::list_swappable))
}
