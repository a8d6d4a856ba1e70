use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use devspace_orchestrator::OrchestratorError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    fn plain(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            details: None,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    /// Container engine unreachable; operators must grant runtime access.
    EngineUnavailable,
    /// Workspace image has to be built out-of-band.
    ImageMissing { image: String, build_context: String },
    Internal(String),
}

impl ApiError {
    /// Maps a controller failure onto an HTTP error. `build_context` only
    /// feeds the build instructions of the missing-image response.
    pub fn from_orchestrator(err: OrchestratorError, build_context: &str) -> Self {
        match err {
            OrchestratorError::EngineUnavailable(_) => ApiError::EngineUnavailable,
            OrchestratorError::ImageMissing { image } => ApiError::ImageMissing {
                image,
                build_context: build_context.to_string(),
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ErrorResponse::plain(msg)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::plain(msg)),
            ApiError::EngineUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse {
                    error: "Workspace feature not available".to_string(),
                    message: Some(
                        "The container engine is not accessible from the backend. This feature requires access to the Docker daemon with proper permissions."
                            .to_string(),
                    ),
                    details: Some(
                        "Please contact your administrator to enable workspace provisioning."
                            .to_string(),
                    ),
                },
            ),
            ApiError::ImageMissing {
                image,
                build_context,
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Workspace image not found".to_string(),
                    message: Some(format!("The {} image needs to be built first.", image)),
                    details: Some(format!("Run: docker build -t {} {}", image, build_context)),
                },
            ),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::plain(msg))
            }
        };

        (status, Json(body)).into_response()
    }
}
