use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::store::models::IdentityProfile;
use crate::store::IdentityStore;

/// GET /api/v1/admin/all-users - every registered identity, without password
/// hashes. An empty system yields an empty list, not an error.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<IdentityProfile>> {
    let identities = state.identities.list_all().await?;

    tracing::info!("admin listing returned {} users", identities.len());
    Ok(ApiResponse::success(
        identities.iter().map(IdentityProfile::from).collect(),
    ))
}
