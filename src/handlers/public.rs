use axum::extract::{Json, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::store::models::{Identity, IdentityProfile, ROLE_USER};
use crate::store::IdentityStore;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: IdentityProfile,
}

pub async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Journal API",
            "version": version,
            "description": "Personal journaling backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/api/v1/signup, /api/v1/login (public - token acquisition)",
                "journal": "/api/v1/journal[/all | /id/:id] (authenticated)",
                "user": "/api/v1/user (authenticated)",
                "admin": "/api/v1/admin/all-users (ADMIN role)",
            }
        }
    }))
}

pub async fn health() -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": Utc::now()
        }
    }))
}

/// POST /api/v1/signup - create an account with role USER and a hashed
/// password. The plaintext password is never stored or logged.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<IdentityProfile> {
    let username = payload.username.trim();
    if username.is_empty() || payload.password.trim().is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    if state.identities.find_by_username(username).await?.is_some() {
        return Err(ApiError::conflict("username already taken"));
    }

    let identity = Identity::new(
        username.to_string(),
        hash_password(&payload.password)?,
        vec![ROLE_USER.to_string()],
    );

    // The store enforces uniqueness too; a racing signup still maps to 409.
    state.identities.save(&identity).await?;

    tracing::info!("new user signed up: {}", identity.username);
    Ok(ApiResponse::created(IdentityProfile::from(&identity)))
}

/// POST /api/v1/login - verify credentials and issue a bearer token. Unknown
/// usernames and wrong passwords get the same response, so the endpoint does
/// not reveal which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let invalid = || ApiError::unauthorized("Invalid username or password");

    let identity = state
        .identities
        .find_by_username(payload.username.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &identity.password_hash)? {
        tracing::warn!("failed login attempt for '{}'", identity.username);
        return Err(invalid());
    }

    let token = state.codec.issue(&identity.username)?;

    tracing::info!("issued token for '{}'", identity.username);
    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_in: state.codec.ttl_secs(),
        user: IdentityProfile::from(&identity),
    }))
}
