//! HTTP-level integration tests for slot creation, availability toggling and
//! the swappable listing.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, patch_json_auth, post_json_auth, post_raw_auth, seed_user};
use serde_json::{json, Value};

async fn create_slot(app: axum::Router, token: &str, body: Value) -> Value {
    let response = post_json_auth(app, "/api/slots", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

fn standup() -> Value {
    json!({
        "title": "Standup",
        "startTime": "2024-01-01T09:00",
        "endTime": "2024-01-01T09:30",
    })
}

#[tokio::test]
async fn test_create_slot_defaults_to_busy_and_lists_for_owner() {
    let stores = common::test_stores();
    let app = common::build_test_app(stores.clone());
    let (u1, token) = seed_user(&stores, "Ann").await;

    let slot = create_slot(app.clone(), &token, standup()).await;
    assert_eq!(slot["status"], "BUSY");
    assert_eq!(slot["title"], "Standup");
    assert_eq!(slot["ownerId"], u1);

    let listed = body_json(get_auth(app, "/api/slots", &token).await).await;
    let listed = listed["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], slot["id"]);
}

#[tokio::test]
async fn test_create_slot_validation() {
    let stores = common::test_stores();
    let app = common::build_test_app(stores.clone());
    let (_, token) = seed_user(&stores, "Ann").await;

    let cases = [
        json!({ "startTime": "2024-01-01T09:00", "endTime": "2024-01-01T09:30" }),
        json!({ "title": "   ", "startTime": "2024-01-01T09:00", "endTime": "2024-01-01T09:30" }),
        json!({ "title": "Backwards", "startTime": "2024-01-01T10:00", "endTime": "2024-01-01T09:00" }),
        json!({ "title": "Garbled", "startTime": "yesterday", "endTime": "2024-01-01T09:00" }),
        json!({ "title": "Locked", "startTime": "2024-01-01T09:00", "endTime": "2024-01-01T09:30", "status": "SWAP_PENDING" }),
    ];
    for body in cases {
        let response = post_json_auth(app.clone(), "/api/slots", body.clone(), &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }

    let listed = body_json(get_auth(app, "/api/slots", &token).await).await;
    assert!(listed["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_toggle_availability() {
    let stores = common::test_stores();
    let app = common::build_test_app(stores.clone());
    let (_, token) = seed_user(&stores, "Ann").await;
    let slot = create_slot(app.clone(), &token, standup()).await;
    let uri = format!("/api/slots/{}", slot["id"]);

    let response = patch_json_auth(app.clone(), &uri, json!({ "status": "SWAPPABLE" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "SWAPPABLE");

    // Same status again is a no-op.
    let response = patch_json_auth(app.clone(), &uri, json!({ "status": "SWAPPABLE" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = patch_json_auth(app.clone(), &uri, json!({ "status": "BUSY" }), &token).await;
    assert_eq!(body_json(response).await["data"]["status"], "BUSY");

    let response = patch_json_auth(app.clone(), &uri, json!({ "status": "SWAP_PENDING" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json_auth(app, &uri, json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_someone_elses_slot_is_not_found() {
    let stores = common::test_stores();
    let app = common::build_test_app(stores.clone());
    let (_, ann) = seed_user(&stores, "Ann").await;
    let (_, bob) = seed_user(&stores, "Bob").await;
    let slot = create_slot(app.clone(), &ann, standup()).await;

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/slots/{}", slot["id"]),
        json!({ "status": "SWAPPABLE" }),
        &bob,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = patch_json_auth(app, "/api/slots/424242", json!({ "status": "SWAPPABLE" }), &ann).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_swappable_listing_excludes_own_and_busy_slots() {
    let stores = common::test_stores();
    let app = common::build_test_app(stores.clone());
    let (_, ann) = seed_user(&stores, "Ann").await;
    let (_, bob) = seed_user(&stores, "Bob").await;

    let mut open = standup();
    open["status"] = json!("SWAPPABLE");
    create_slot(app.clone(), &ann, open.clone()).await;
    let bobs_open = create_slot(app.clone(), &bob, open).await;
    create_slot(app.clone(), &bob, standup()).await;

    let json = body_json(get_auth(app, "/api/swappable-slots", &ann).await).await;
    let listed = json["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], bobs_open["id"]);
    assert_eq!(listed[0]["owner"]["name"], "Bob");
    assert_eq!(listed[0]["owner"]["email"], "bob@example.com");
}

#[tokio::test]
async fn test_mistyped_slot_body_is_a_bad_request() {
    let stores = common::test_stores();
    let app = common::build_test_app(stores.clone());
    let (_, token) = seed_user(&stores, "Ann").await;

    let response = post_json_auth(
        app.clone(),
        "/api/slots",
        json!({ "title": 5, "startTime": "2024-01-01T09:00", "endTime": "2024-01-01T09:30" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().is_some_and(|m| m.contains("title")));

    let response = post_raw_auth(app.clone(), "/api/slots", "text/plain", "Standup", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let slot = create_slot(app.clone(), &token, standup()).await;
    let response = patch_json_auth(
        app.clone(),
        &format!("/api/slots/{}", slot["id"]),
        json!({ "status": 2 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    let listed = body_json(get_auth(app, "/api/slots", &token).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}
