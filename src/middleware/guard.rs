use axum::{extract::Request, middleware::Next, response::Response};

use super::auth::CallerContext;
use crate::error::ApiError;

/// Route guard for `/api/v1/journal/**` and `/api/v1/user/**`: any
/// authenticated caller passes; anonymous requests are rejected here, after
/// the fail-open authenticator has had its say.
pub async fn require_user(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<CallerContext>().is_none() {
        return Err(ApiError::unauthorized("Authentication required"));
    }

    Ok(next.run(request).await)
}

/// Route guard for `/api/v1/admin/**`. Anonymous callers get 401; callers
/// authenticated without the ADMIN role get 403.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let caller = request
        .extensions()
        .get::<CallerContext>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !caller.is_admin() {
        tracing::warn!("admin route refused for '{}'", caller.username);
        return Err(ApiError::forbidden("Admin role required"));
    }

    Ok(next.run(request).await)
}
