//! Handlers for the `/auth` resource (signup, login, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use slotswap_core::error::{CoreError, StoreError};
use slotswap_core::user::{normalize_email, validate_signup, NewUser, UserProfile};

use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`. Missing fields deserialize as empty
/// strings and are rejected by validation.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Successful authentication response returned by signup and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn issue(state: &AppState, user: UserProfile) -> AppResult<AuthResponse> {
    let token = generate_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthResponse { token, user })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/signup
///
/// Register a new account and return a session token.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    validate_signup(&input.name, &input.email, &input.password)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let account = state
        .stores
        .users
        .create(NewUser {
            name: input.name.trim().to_string(),
            email: normalize_email(&input.email),
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => {
                AppError::Core(CoreError::Conflict("User already exists".into()))
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = account.id, "User signed up");

    let response = issue(&state, account.profile())?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login
///
/// Authenticate with email + password. Unknown email and wrong password
/// produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    if input.email.trim().is_empty() || input.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".into()));
    }

    let account = state
        .stores
        .users
        .find_by_email(&input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    let password_valid = verify_password(&input.password, &account.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(user_id = account.id, "Failed login attempt");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    tracing::info!(user_id = account.id, "User logged in");

    Ok(Json(issue(&state, account.profile())?))
}

/// GET /api/auth/me
///
/// Profile of the authenticated caller.
pub async fn me(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let profile = state
        .stores
        .users
        .find_profiles(&[auth.user_id])
        .await?
        .remove(&auth.user_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    Ok(Json(DataResponse { data: profile }))
}
