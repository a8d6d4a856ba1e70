use crate::{auth::AuthenticatedUser, error::ApiError, state::AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use devspace_orchestrator::WorkspacePhase;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/workspace", post(ensure_workspace))
        // Paths the existing front end posts to.
        .route("/users/workspace/create", post(ensure_workspace))
        .route("/users/workspace/create/", post(ensure_workspace))
}

/// Body for a workspace that already existed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkspaceStatusResponse {
    pub url: String,
    pub port: u16,
    /// `running` or `started`
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkspaceCreatedResponse {
    pub url: String,
    pub port: u16,
    pub msg: String,
}

/// Ensures the caller has exactly one running workspace and returns its URL.
#[utoipa::path(
    post,
    path = "/api/v1/workspace",
    tag = "workspaces",
    responses(
        (status = 200, description = "Workspace was running or has been started", body = WorkspaceStatusResponse),
        (status = 201, description = "Workspace created", body = WorkspaceCreatedResponse),
        (status = 401, description = "No authenticated identity", body = crate::error::ErrorResponse),
        (status = 500, description = "Image missing or engine failure", body = crate::error::ErrorResponse),
        (status = 503, description = "Container engine unreachable", body = crate::error::ErrorResponse)
    )
)]
pub async fn ensure_workspace(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Response, ApiError> {
    let identity = user.identity;

    let workspace = state
        .controller
        .ensure_workspace_with_deadline(
            identity.clone(),
            state.config.url_mode,
            state.config.engine_timeout(),
        )
        .await
        .map_err(|e| {
            error!(identity = %identity, "Workspace provisioning failed: {}", e);
            ApiError::from_orchestrator(e, &state.config.image_build_context)
        })?;

    info!(
        identity = %identity,
        port = workspace.port,
        phase = ?workspace.phase,
        "Workspace ready"
    );

    let response = match workspace.phase {
        WorkspacePhase::Created => (
            StatusCode::CREATED,
            Json(WorkspaceCreatedResponse {
                url: workspace.url,
                port: workspace.port,
                msg: "Workspace created successfully.".to_string(),
            }),
        )
            .into_response(),
        WorkspacePhase::AlreadyRunning | WorkspacePhase::Started => {
            let status = if workspace.phase == WorkspacePhase::Started {
                "started"
            } else {
                "running"
            };
            (
                StatusCode::OK,
                Json(WorkspaceStatusResponse {
                    url: workspace.url,
                    port: workspace.port,
                    status: status.to_string(),
                }),
            )
                .into_response()
        }
    };

    Ok(response)
}
