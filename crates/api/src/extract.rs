//! Request body extraction with the API's error envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::error::AppError;

/// Drop-in replacement for [`axum::Json`] as a request extractor.
///
/// A body that is not JSON, or whose fields have the wrong type, is rejected
/// as [`AppError::BadRequest`] (400 with `{ "error", "code" }`) instead of
/// axum's plain-text 4xx.
///
/// ```ignore
/// async fn create(AppJson(input): AppJson<CreateSlot>) -> AppResult<...>
/// ```
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
