//! Integration tests for the workspace endpoint
//!
//! Drives the full router against the in-memory engine and checks the status
//! codes and bodies clients depend on.

mod common;

use axum::http::StatusCode;
use devspace_api::error::ErrorResponse;
use devspace_api::routes::workspaces::{WorkspaceCreatedResponse, WorkspaceStatusResponse};
use devspace_engine::mock::MockEngine;
use devspace_engine::EngineError;
use devspace_orchestrator::UrlMode;
use serde_json::Value;

#[tokio::test]
async fn test_first_request_creates_then_reports_running() {
    let app = common::create_test_app(MockEngine::new(), UrlMode::Local);

    let response = app.post("/api/v1/workspace", Some("42")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: WorkspaceCreatedResponse = common::extract_json_body(response).await;
    assert_eq!(created.url, "http://localhost:41000");
    assert_eq!(created.port, 41000);
    assert_eq!(created.msg, "Workspace created successfully.");
    assert!(app.volume_root.path().join("42").is_dir());

    let response = app.post("/api/v1/workspace", Some("42")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let running: WorkspaceStatusResponse = common::extract_json_body(response).await;
    assert_eq!(running.url, "http://localhost:41000");
    assert_eq!(running.port, 41000);
    assert_eq!(running.status, "running");

    assert_eq!(app.engine().containers_created(), 1);
}

#[tokio::test]
async fn test_stopped_workspace_reports_started() {
    let engine = MockEngine::new().with_container("workspace_5", false, 8080, 45000);
    let app = common::create_test_app(engine, UrlMode::Local);

    let response = app.post("/api/v1/workspace", Some("5")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: WorkspaceStatusResponse = common::extract_json_body(response).await;
    assert_eq!(body.status, "started");
    assert_eq!(body.port, 45000);
    assert_eq!(body.url, "http://localhost:45000");
    assert!(app.engine().is_running("workspace_5"));
}

#[tokio::test]
async fn test_public_mode_uses_hostname() {
    let app = common::create_test_app(MockEngine::new(), UrlMode::Public);

    let response = app.post("/api/v1/workspace", Some("42")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: WorkspaceCreatedResponse = common::extract_json_body(response).await;
    assert_eq!(body.url, "http://workspace-42.apranova.com");
    assert_eq!(body.port, 41000);
}

#[tokio::test]
async fn test_legacy_paths_are_served() {
    let app = common::create_test_app(MockEngine::new(), UrlMode::Local);

    let response = app.post("/users/workspace/create/", Some("7")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.post("/users/workspace/create", Some("7")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unreachable_engine_returns_503() {
    let app = common::create_unreachable_app();

    let response = app.post("/api/v1/workspace", Some("42")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: ErrorResponse = common::extract_json_body(response).await;
    assert_eq!(body.error, "Workspace feature not available");
    assert!(body.message.is_some());
    assert!(body.details.unwrap().contains("administrator"));
    assert!(!app.volume_root.path().join("42").exists());
}

#[tokio::test]
async fn test_missing_image_returns_build_instructions() {
    let engine = MockEngine::new().fail_create(EngineError::ImageMissing("x".to_string()));
    let app = common::create_test_app(engine, UrlMode::Local);

    let response = app.post("/api/v1/workspace", Some("42")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: ErrorResponse = common::extract_json_body(response).await;
    assert_eq!(body.error, "Workspace image not found");
    assert_eq!(
        body.message.as_deref(),
        Some("The apra-nova-code-server:latest image needs to be built first.")
    );
    assert_eq!(
        body.details.as_deref(),
        Some("Run: docker build -t apra-nova-code-server:latest ./backend/apra-nova-code-server")
    );
}

#[tokio::test]
async fn test_other_engine_failure_returns_raw_message() {
    let engine =
        MockEngine::new().fail_create(EngineError::Unknown("network apranova_network not found".to_string()));
    let app = common::create_test_app(engine, UrlMode::Local);

    let response = app.post("/api/v1/workspace", Some("42")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = common::extract_json_body(response).await;
    assert_eq!(body, serde_json::json!({ "error": "network apranova_network not found" }));
}

#[tokio::test]
async fn test_concurrent_requests_share_one_container() {
    let app = common::create_test_app(MockEngine::new().gate_lookups(2), UrlMode::Local);

    let (a, b) = tokio::join!(
        app.post("/api/v1/workspace", Some("42")),
        app.post("/api/v1/workspace", Some("42"))
    );

    assert!(a.status().is_success());
    assert!(b.status().is_success());

    let a: Value = common::extract_json_body(a).await;
    let b: Value = common::extract_json_body(b).await;
    assert_eq!(a["port"], b["port"]);
    assert_eq!(app.engine().containers_created(), 1);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = common::create_test_app(MockEngine::new(), UrlMode::Local);

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = common::extract_json_body(response).await;
    assert_eq!(body["status"], "ok");

    let response = app.get("/health/ready").await;
    let body: Value = common::extract_json_body(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["engine"], "connected");
    assert_eq!(body["url_mode"], "local");

    let unreachable = common::create_unreachable_app();
    let response = unreachable.get("/health/ready").await;
    let body: Value = common::extract_json_body(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["engine"], "unreachable");
}

#[tokio::test]
async fn test_openapi_document_lists_workspace_route() {
    let app = common::create_test_app(MockEngine::new(), UrlMode::Local);

    let response = app.get("/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc: Value = common::extract_json_body(response).await;
    assert!(doc["paths"]["/api/v1/workspace"]["post"].is_object());
}
