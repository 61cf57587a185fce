//! Handlers for swap requests: propose, list and respond.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use slotswap_core::swap::{ProposeSwap, RespondToSwap};
use slotswap_core::types::DbId;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/swap-requests
///
/// Lock both slots and open a `PENDING` request. A 409 means another
/// request won the race (or this exact proposal is already pending). A 400
/// `NOT_ELIGIBLE` for a slot that is no longer `SWAPPABLE` can also mean the
/// race was lost before this call read it. Either way, re-query before
/// retrying.
pub async fn create_swap_request(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<ProposeSwap>,
) -> AppResult<impl IntoResponse> {
    let (my_slot_id, their_slot_id) = input.validate()?;
    let request = state
        .engine
        .propose_swap(auth.user_id, my_slot_id, their_slot_id)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/swap-requests
///
/// Requests where the caller is requester or target, oldest first.
pub async fn list_swap_requests(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let requests = state.engine.list_requests(auth.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/swap-requests/{id}/response
///
/// Only the target user may respond, and only once.
pub async fn respond_to_swap_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    AppJson(input): AppJson<RespondToSwap>,
) -> AppResult<impl IntoResponse> {
    let decision = input.validate()?;
    let request = state
        .engine
        .respond_to_swap(auth.user_id, request_id, decision)
        .await?;
    Ok(Json(DataResponse { data: request }))
}
