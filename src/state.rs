use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::services::media::MediaHost;
use crate::store::{IdentityStore, JournalStore};

/// Shared application state: the token codec plus the external collaborators.
/// Everything here is read-only or internally synchronized; requests share
/// nothing else.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub identities: Arc<dyn IdentityStore>,
    pub journals: Arc<dyn JournalStore>,
    pub media: Arc<dyn MediaHost>,
}
