//! Integration tests for gatelog-svc API endpoints
//!
//! Covers:
//! - health endpoint
//! - UI serving
//! - identity create/update: success, missing fields, malformed body
//! - roster listing

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use gatelog_common::events::{EventBus, GatelogEvent};
use gatelog_common::ManualClock;
use gatelog_svc::attendance::AttendanceLog;
use gatelog_svc::store::IdentityStore;
use gatelog_svc::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: build app state over a temp data dir
fn setup_state(dir: &TempDir) -> AppState {
    let store = Arc::new(IdentityStore::new(dir.path().join("users")));
    store.load().expect("store load");
    let log = Arc::new(AttendanceLog::new(dir.path().join("attendance.csv")));
    AppState::new(
        store,
        log,
        EventBus::new(16),
        Arc::new(ManualClock::new(0)),
        dir.path().to_path_buf(),
    )
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

async fn body_json(body: Body) -> Value {
    serde_json::from_str(&body_text(body).await).expect("parse JSON")
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = TempDir::new().unwrap();
    let app = build_router(setup_state(&dir));

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "gatelog-svc");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_index_serves_html() {
    let dir = TempDir::new().unwrap();
    let app = build_router(setup_state(&dir));

    let response = app.oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response.into_body()).await;
    assert!(body.contains("<!doctype html>"));
    assert!(body.contains("gatelog"));
}

#[tokio::test]
async fn test_add_identity_success() {
    let dir = TempDir::new().unwrap();
    let state = setup_state(&dir);
    let app = build_router(state.clone());

    let response = app
        .oneshot(post_json(
            "/api/identity",
            json!({"uid": "04a1b2c3", "name": "José"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response.into_body()).await, "identity saved");

    // uid is normalized to uppercase; store and file both updated
    assert_eq!(state.store.lookup("04A1B2C3").as_deref(), Some("José"));
    assert!(dir.path().join("users").join("04A1B2C3.json").exists());
}

#[tokio::test]
async fn test_add_identity_emits_event() {
    let dir = TempDir::new().unwrap();
    let state = setup_state(&dir);
    let mut rx = state.events.subscribe();
    let app = build_router(state);

    app.oneshot(post_json(
        "/api/identity",
        json!({"uid": "AA11", "name": "Alice"}),
    ))
    .await
    .unwrap();

    match rx.recv().await.unwrap() {
        GatelogEvent::IdentityUpserted { uid, name } => {
            assert_eq!(uid, "AA11");
            assert_eq!(name, "Alice");
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_add_identity_missing_name_rejected() {
    let dir = TempDir::new().unwrap();
    let state = setup_state(&dir);
    let mut rx = state.events.subscribe();
    let app = build_router(state.clone());

    let response = app
        .oneshot(post_json("/api/identity", json!({"uid": "AA11", "name": ""})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    // No partial write, no side effects
    assert!(state.store.is_empty());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_add_identity_blank_uid_rejected() {
    let dir = TempDir::new().unwrap();
    let state = setup_state(&dir);
    let app = build_router(state.clone());

    let response = app
        .oneshot(post_json(
            "/api/identity",
            json!({"uid": "   ", "name": "Alice"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.store.is_empty());
}

#[tokio::test]
async fn test_add_identity_non_hex_uid_rejected() {
    let dir = TempDir::new().unwrap();
    let state = setup_state(&dir);
    let app = build_router(state.clone());

    let response = app
        .oneshot(post_json(
            "/api/identity",
            json!({"uid": "../escape", "name": "Alice"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.store.is_empty());
}

#[tokio::test]
async fn test_add_identity_malformed_json_rejected() {
    let dir = TempDir::new().unwrap();
    let state = setup_state(&dir);
    let app = build_router(state.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/identity")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.store.is_empty());
}

#[tokio::test]
async fn test_list_identities() {
    let dir = TempDir::new().unwrap();
    let state = setup_state(&dir);
    state.store.upsert("BB22", "Bob").unwrap();
    state.store.upsert("AA11", "Alice").unwrap();
    let app = build_router(state);

    let response = app.oneshot(get_request("/api/identities")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    let identities = body["identities"].as_array().unwrap();
    assert_eq!(identities.len(), 2);
    assert_eq!(identities[0]["uid"], "AA11");
    assert_eq!(identities[0]["name"], "Alice");
    assert_eq!(identities[1]["uid"], "BB22");
}

#[tokio::test]
async fn test_files_route_serves_data_dir_readonly() {
    let dir = TempDir::new().unwrap();
    let state = setup_state(&dir);
    state.log.ensure_initialized().unwrap();
    let app = build_router(state);

    let response = app
        .oneshot(get_request("/files/attendance.csv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response.into_body()).await;
    assert!(body.contains("timestamp,uid,name,method"));
}
