#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use slotswap_api::auth::jwt::{generate_token, JwtConfig};
use slotswap_api::config::ServerConfig;
use slotswap_api::router::build_app_router;
use slotswap_api::state::AppState;
use slotswap_core::memory::MemoryStore;
use slotswap_core::ports::Stores;
use slotswap_core::types::DbId;
use slotswap_core::user::NewUser;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-long-enough";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
        db_max_connections: 1,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            expiry_hours: 1,
        },
    }
}

/// Fresh in-memory stores for one test.
pub fn test_stores() -> Stores {
    Stores::from_backend(MemoryStore::new())
}

/// Build the full application router with all middleware layers over the
/// given stores, exactly as `main.rs` does.
pub fn build_test_app(stores: Stores) -> Router {
    let config = test_config();
    let state = AppState::new(stores, config.clone());
    build_app_router(state, &config)
}

/// Insert a user directly and mint a token for them, skipping password
/// hashing.
pub async fn seed_user(stores: &Stores, name: &str) -> (DbId, String) {
    let account = stores
        .users
        .create(NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "unused".to_string(),
        })
        .await
        .expect("seeding a user should succeed");
    let token = generate_token(account.id, &test_config().jwt).expect("token generation");
    (account.id, token)
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// POST a raw body with an explicit content type.
pub async fn post_raw_auth(
    app: Router,
    uri: &str,
    content_type: &str,
    body: &str,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}
