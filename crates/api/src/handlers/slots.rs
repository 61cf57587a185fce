//! Handlers for slots owned by the caller and the swappable marketplace.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use slotswap_core::error::CoreError;
use slotswap_core::slot::{parse_slot_status, CreateSlot};
use slotswap_core::types::DbId;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PATCH /slots/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateSlotStatus {
    pub status: Option<String>,
}

/// GET /api/slots
pub async fn list_slots(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let slots = state.engine.list_owned(auth.user_id).await?;
    Ok(Json(DataResponse { data: slots }))
}

/// POST /api/slots
///
/// Status defaults to `BUSY` when omitted.
pub async fn create_slot(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateSlot>,
) -> AppResult<impl IntoResponse> {
    let slot = state.engine.create_slot(auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: slot })))
}

/// PATCH /api/slots/{id}
///
/// Toggle between `BUSY` and `SWAPPABLE`. Slots locked by a pending swap
/// answer 409.
pub async fn update_slot_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slot_id): Path<DbId>,
    AppJson(input): AppJson<UpdateSlotStatus>,
) -> AppResult<impl IntoResponse> {
    let raw = input
        .status
        .as_deref()
        .ok_or_else(|| CoreError::Validation("status is required".into()))?;
    let status = parse_slot_status(raw)?;

    let slot = state
        .engine
        .set_slot_availability(auth.user_id, slot_id, status)
        .await?;
    Ok(Json(DataResponse { data: slot }))
}

/// GET /api/swappable-slots
///
/// Other users' `SWAPPABLE` slots with owner name and email.
pub async fn list_swappable(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let slots = state.engine.list_swappable(auth.user_id).await?;
    Ok(Json(DataResponse { data: slots }))
}
