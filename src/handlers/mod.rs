// Route handlers, grouped by security tier: public (token acquisition),
// journal/user (authenticated), admin (ADMIN role).

pub mod admin;
pub mod journal;
pub mod public;
pub mod user;

use crate::error::ApiError;
use crate::middleware::CallerContext;
use crate::state::AppState;
use crate::store::models::Identity;
use crate::store::IdentityStore;

/// Re-fetch the caller's identity from the store. Ownership and profile data
/// are always read fresh here rather than trusted from the caller context,
/// since both can change between token issuance and request time.
pub(crate) async fn caller_identity(
    state: &AppState,
    caller: &CallerContext,
) -> Result<Identity, ApiError> {
    state
        .identities
        .find_by_username(&caller.username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))
}
