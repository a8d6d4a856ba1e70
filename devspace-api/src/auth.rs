use crate::error::ApiError;
use axum::{extract::Request, middleware::Next, response::Response};
use devspace_orchestrator::Identity;

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub identity: Identity,
}

/// Auth middleware - takes the user id from the upstream token validator.
///
/// Bearer tokens are checked before requests reach this service; the
/// validating proxy forwards the user id in `x-user-id`. `x-forwarded-user`
/// (oauth2-proxy) and `x-user` (local development) are accepted as well.
pub async fn auth_middleware(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let user_id = req
        .headers()
        .get("x-user-id")
        .or_else(|| req.headers().get("x-forwarded-user"))
        .or_else(|| req.headers().get("x-user"))
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ApiError::Unauthorized("Authentication credentials were not provided.".to_string())
        })?;

    let identity = Identity::parse(&user_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    req.extensions_mut().insert(AuthenticatedUser { identity });

    Ok(next.run(req).await)
}
