//! Common test utilities and helpers for devspace-api tests
//!
//! Builds the router around an in-memory engine and a predictable port
//! allocator so responses can be asserted exactly.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use axum::{body::Body, http::Request, Router};
use devspace_api::{create_app, AppState, Config};
use devspace_engine::mock::MockEngine;
use devspace_engine::EngineAdapter;
use devspace_orchestrator::{UrlMode, WorkspaceController};
use devspace_ports::PortAllocator;
use tempfile::TempDir;

/// Allocator returning consecutive ports from a fixed start.
pub struct FixedAllocator {
    next: AtomicU16,
}

impl FixedAllocator {
    pub fn starting_at(port: u16) -> Arc<Self> {
        Arc::new(Self {
            next: AtomicU16::new(port),
        })
    }
}

impl PortAllocator for FixedAllocator {
    fn allocate(&self) -> anyhow::Result<u16> {
        Ok(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

/// Router plus everything it borrows from the test.
pub struct TestApp {
    pub app: Router,
    pub engine: Option<Arc<MockEngine>>,
    pub volume_root: TempDir,
}

pub fn test_config(volume_root: &TempDir, mode: UrlMode) -> Config {
    Config {
        url_mode: mode,
        workspace_base_path: volume_root.path().to_path_buf(),
        engine_timeout_secs: 5,
        ..Config::default()
    }
}

/// App backed by `engine`, handing out ports from 41000 upwards.
pub fn create_test_app(engine: MockEngine, mode: UrlMode) -> TestApp {
    let volume_root = tempfile::tempdir().expect("Failed to create volume root");
    let config = test_config(&volume_root, mode);
    let engine = Arc::new(engine);

    let controller = WorkspaceController::new(
        EngineAdapter::Connected(engine.clone()),
        FixedAllocator::starting_at(41000),
        config.namer(),
        config.template(),
    );

    TestApp {
        app: create_app(AppState::with_controller(config, controller)),
        engine: Some(engine),
        volume_root,
    }
}

/// App whose engine could not be reached at start-up.
pub fn create_unreachable_app() -> TestApp {
    let volume_root = tempfile::tempdir().expect("Failed to create volume root");
    let config = test_config(&volume_root, UrlMode::Local);
    let engine = EngineAdapter::unreachable("docker executable not found");

    TestApp {
        app: create_app(AppState::new(config, engine)),
        engine: None,
        volume_root,
    }
}

impl TestApp {
    /// POST with the given user header, if any.
    pub async fn post(&self, uri: &str, user: Option<&str>) -> axum::response::Response {
        use tower::ServiceExt;

        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user);
        }
        let request = builder.body(Body::empty()).unwrap();

        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> axum::response::Response {
        use tower::ServiceExt;

        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        self.app.clone().oneshot(request).await.unwrap()
    }

    pub fn engine(&self) -> &MockEngine {
        self.engine.as_deref().expect("app has no mock engine")
    }
}

/// Helper to extract JSON body from axum response
pub async fn extract_json_body<T>(response: axum::response::Response) -> T
where
    T: serde::de::DeserializeOwned,
{
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&body).expect("Failed to deserialize JSON")
}
