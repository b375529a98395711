use axum::extract::{Extension, Json, State};
use chrono::Utc;
use serde::Deserialize;

use super::caller_identity;
use crate::auth::hash_password;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CallerContext};
use crate::state::AppState;
use crate::store::models::IdentityProfile;
use crate::store::IdentityStore;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// GET /api/v1/user - the caller's own profile.
pub async fn profile(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
) -> ApiResult<IdentityProfile> {
    let identity = caller_identity(&state, &caller).await?;
    Ok(ApiResponse::success(IdentityProfile::from(&identity)))
}

/// PUT /api/v1/user - change username and/or password. Blank or missing
/// fields are left untouched. A renamed account invalidates outstanding
/// tokens naturally: their subject no longer resolves to an identity.
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<IdentityProfile> {
    let mut identity = caller_identity(&state, &caller).await?;
    let mut changed = false;

    if let Some(username) = payload.username.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        if username != identity.username {
            if state.identities.find_by_username(username).await?.is_some() {
                return Err(ApiError::conflict("username already taken"));
            }
            tracing::info!("renaming user '{}' to '{}'", identity.username, username);
            identity.username = username.to_string();
            changed = true;
        }
    }

    if let Some(password) = payload.password.as_deref().filter(|p| !p.trim().is_empty()) {
        identity.password_hash = hash_password(password)?;
        tracing::info!("password changed for '{}'", identity.username);
        changed = true;
    }

    if changed {
        identity.updated_at = Utc::now();
        state.identities.save(&identity).await?;
    }

    Ok(ApiResponse::success(IdentityProfile::from(&identity)))
}
