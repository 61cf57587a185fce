//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{body_json, get};
use slotswap_core::error::StoreError;
use slotswap_core::ports::{StoreHealth, StoreResult};

/// Health source for a database that stopped answering.
struct UnreachableStore;

#[async_trait]
impl StoreHealth for UnreachableStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> StoreResult<()> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = common::build_test_app(common::test_stores());
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["store_healthy"], true);
    assert_eq!(json["store"], "memory");
}

#[tokio::test]
async fn health_check_reports_unreachable_store_as_503() {
    let mut stores = common::test_stores();
    stores.health = Arc::new(UnreachableStore);
    let app = common::build_test_app(stores);

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["store"], "postgres");
    assert_eq!(json["store_healthy"], false);
}

#[tokio::test]
async fn client_request_id_is_echoed() {
    let app = common::build_test_app(common::test_stores());
    let response = tower::ServiceExt::oneshot(
        app,
        axum::http::Request::builder()
            .uri("/health")
            .header("x-request-id", "client-7")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.headers()["x-request-id"], "client-7");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app(common::test_stores());
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app(common::test_stores());
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");

    // UUID v4: 36 chars with hyphens.
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = common::build_test_app(common::test_stores());

    for uri in ["/api/slots", "/api/swappable-slots", "/api/swap-requests", "/api/auth/me"] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let json = body_json(response).await;
        assert_eq!(json["code"], "UNAUTHORIZED");
    }
}
