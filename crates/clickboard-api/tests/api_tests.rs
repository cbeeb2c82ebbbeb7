//! Integration tests for the REST endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic, routing, and
//! error mapping without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use clickboard_api::router::build_router;
use clickboard_api::state::AppState;
use clickboard_db::{JsonFileStore, MemoryStore};
use serde_json::Value;
use tower::ServiceExt;

fn make_test_state() -> Arc<AppState<MemoryStore>> {
    Arc::new(AppState::with_defaults(MemoryStore::new()))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_register_succeeds_once() {
    let router = build_router(make_test_state());

    let (status, json) =
        post_json(&router, "/register", serde_json::json!({"username": "alice"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "User registered successfully");

    let (status, json) =
        post_json(&router, "/register", serde_json::json!({"username": "alice"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("already taken"));
    assert_eq!(json["detail"], json["error"]);
}

#[tokio::test]
async fn test_register_accepts_legacy_score_field() {
    let router = build_router(make_test_state());

    let (status, _) = post_json(
        &router,
        "/register",
        serde_json::json!({"username": "alice", "score": 500}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = get_json(&router, "/user/alice").await;
    assert_eq!(json["score"], 0);
}

#[tokio::test]
async fn test_register_rejects_blank_username() {
    let router = build_router(make_test_state());

    let (status, json) =
        post_json(&router, "/register", serde_json::json!({"username": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_click_scores_and_ranks() {
    let router = build_router(make_test_state());

    post_json(&router, "/register", serde_json::json!({"username": "alice"})).await;
    let (status, json) = post_json(
        &router,
        "/click",
        serde_json::json!({"username": "alice", "is_drag": false}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["new_score"], 1);
    assert_eq!(json["position"], 1);

    post_json(&router, "/register", serde_json::json!({"username": "bob"})).await;
    let (status, json) = post_json(
        &router,
        "/click",
        serde_json::json!({"username": "bob", "is_drag": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["new_score"], 10);
    assert_eq!(json["position"], 1);
    assert_eq!(
        json["leaderboard"],
        serde_json::json!([
            {"username": "bob", "score": 10, "position": 1},
            {"username": "alice", "score": 1, "position": 2}
        ])
    );

    let (status, json) = get_json(&router, "/user/alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({"username": "alice", "score": 1, "position": 2})
    );
}

#[tokio::test]
async fn test_malformed_body_is_json_400() {
    let router = build_router(make_test_state());

    let (status, json) = post_json(&router, "/click", serde_json::json!({"is_drag": true})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_click_defaults_to_tap() {
    let router = build_router(make_test_state());

    post_json(&router, "/register", serde_json::json!({"username": "alice"})).await;
    let (status, json) =
        post_json(&router, "/click", serde_json::json!({"username": "alice"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["new_score"], 1);
}

#[tokio::test]
async fn test_click_unknown_user_is_404() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));

    let (status, json) = post_json(
        &router,
        "/click",
        serde_json::json!({"username": "carol", "is_drag": true}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
    assert_eq!(state.service.user_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_leaderboard_returns_top_ten() {
    let router = build_router(make_test_state());

    for i in 0..12 {
        let name = format!("user{i:02}");
        post_json(&router, "/register", serde_json::json!({"username": name})).await;
        for _ in 0..i {
            post_json(&router, "/click", serde_json::json!({"username": name})).await;
        }
    }

    let (status, json) = get_json(&router, "/leaderboard").await;
    assert_eq!(status, StatusCode::OK);
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 10);
    let first = entries.first().unwrap();
    assert_eq!(first["username"], "user11");
    assert_eq!(first["position"], 1);
    let last = entries.last().unwrap();
    assert_eq!(last["username"], "user02");
    assert_eq!(last["position"], 10);
}

#[tokio::test]
async fn test_leaderboard_empty() {
    let router = build_router(make_test_state());

    let (status, json) = get_json(&router, "/leaderboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn test_get_user_not_found() {
    let router = build_router(make_test_state());

    let (status, json) = get_json(&router, "/user/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_health_reports_counts() {
    let state = make_test_state();
    let router = build_router(Arc::clone(&state));
    state.service.register("alice").await.unwrap();
    let (_id, _rx) = state.service.connect_personal("alice").await;

    let (status, json) = get_json(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["users"], 1);
    assert_eq!(json["personal_connections"], 1);
    assert_eq!(json["leaderboard_subscribers"], 0);
}

#[tokio::test]
async fn test_json_file_backend_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.json");
    let store = JsonFileStore::open(&path).await.unwrap();
    let router = build_router(Arc::new(AppState::with_defaults(store)));

    post_json(&router, "/register", serde_json::json!({"username": "alice"})).await;
    let (status, _) = post_json(
        &router,
        "/click",
        serde_json::json!({"username": "alice", "is_drag": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let on_disk: Value =
        serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
    assert_eq!(on_disk["users"]["alice"]["score"], 10);
}

#[tokio::test]
async fn test_store_write_failure_is_500_and_keeps_score() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.json");
    let store = JsonFileStore::open(&path).await.unwrap();
    let router = build_router(Arc::new(AppState::with_defaults(store)));
    post_json(&router, "/register", serde_json::json!({"username": "alice"})).await;

    // A directory where the temp file goes makes every write fail.
    tokio::fs::create_dir(dir.path().join("database.json.tmp"))
        .await
        .unwrap();

    let (status, json) = post_json(
        &router,
        "/click",
        serde_json::json!({"username": "alice", "is_drag": true}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["status"], 500);
    assert!(json["error"].as_str().unwrap().starts_with("internal error"));
    assert_eq!(json["detail"], json["error"]);

    let (status, json) = get_json(&router, "/user/alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["score"], 0);

    let on_disk: Value =
        serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
    assert_eq!(on_disk["users"]["alice"]["score"], 0);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/api/nothing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
