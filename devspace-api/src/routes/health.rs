use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is alive")))]
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "devspace-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Reports whether workspace provisioning is possible at all.
#[utoipa::path(get, path = "/health/ready", tag = "health", responses((status = 200, description = "Readiness report")))]
pub async fn readiness_check(State(state): State<AppState>) -> Json<Value> {
    let engine_ok = state.controller.engine().is_reachable();

    Json(json!({
        "status": if engine_ok { "ready" } else { "degraded" },
        "service": "devspace-api",
        "version": env!("CARGO_PKG_VERSION"),
        "engine": if engine_ok { "connected" } else { "unreachable" },
        "url_mode": state.config.url_mode,
    }))
}
