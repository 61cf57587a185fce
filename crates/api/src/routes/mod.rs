pub mod auth;
pub mod health;
pub mod slots;
pub mod swaps;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/signup                      signup (public)
/// /auth/login                       login (public)
/// /auth/me                          current user
///
/// /slots                            list own, create
/// /slots/{id}                       set availability (PATCH)
/// /swappable-slots                  other users' swappable slots
///
/// /swap-requests                    list mine, propose
/// /swap-requests/{id}/response      accept or reject (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(slots::router())
        .merge(swaps::router())
}
