//! Tests for identity extraction in front of the workspace routes

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use devspace_api::error::ErrorResponse;
use devspace_engine::mock::MockEngine;
use devspace_orchestrator::UrlMode;
use tower::ServiceExt;

#[tokio::test]
async fn test_missing_identity_is_rejected() {
    let app = common::create_test_app(MockEngine::new(), UrlMode::Local);

    let response = app.post("/api/v1/workspace", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: ErrorResponse = common::extract_json_body(response).await;
    assert!(body.error.contains("not provided"));
    // Nothing reached the engine.
    assert_eq!(app.engine().total_calls(), 0);
}

#[tokio::test]
async fn test_blank_identity_is_rejected() {
    let app = common::create_test_app(MockEngine::new(), UrlMode::Local);

    let response = app.post("/api/v1/workspace", Some("   ")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unsafe_identity_is_a_bad_request() {
    let app = common::create_test_app(MockEngine::new(), UrlMode::Local);

    for id in ["../etc", "a_b", "trailing-"] {
        let response = app.post("/api/v1/workspace", Some(id)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "id {} accepted", id);
    }
    assert_eq!(app.engine().total_calls(), 0);
    assert!(std::fs::read_dir(app.volume_root.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_forwarded_user_header_is_accepted() {
    let app = common::create_test_app(MockEngine::new(), UrlMode::Local);

    for header in ["x-forwarded-user", "x-user"] {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/workspace")
            .header(header, "77")
            .body(Body::empty())
            .unwrap();

        let response = app.app.clone().oneshot(request).await.unwrap();
        assert!(response.status().is_success(), "header {} rejected", header);
    }

    assert!(app.engine().exists("workspace_77"));
    assert_eq!(app.engine().containers_created(), 1);
}

#[tokio::test]
async fn test_health_does_not_require_identity() {
    let app = common::create_test_app(MockEngine::new(), UrlMode::Local);

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}
