use crate::error::ErrorResponse;
use crate::routes::workspaces::{WorkspaceCreatedResponse, WorkspaceStatusResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::health::readiness_check,
        crate::routes::workspaces::ensure_workspace,
    ),
    components(
        schemas(
            WorkspaceStatusResponse,
            WorkspaceCreatedResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "devspace-api", description = "Per-user workspace provisioning API")
    )
)]
pub struct ApiDoc;
