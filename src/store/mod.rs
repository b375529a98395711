// Persistence collaborators. The auth core and the handlers only ever see
// these traits; Postgres backs them in production and an in-memory map backs
// them in tests.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use self::models::{Identity, Journal};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already taken")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => StoreError::Conflict,
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Query(err.to_string()),
        }
    }
}

/// Identity store collaborator: `find_by_username` and `save` are the only
/// contract the auth core needs; `list_all` serves the admin listing.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError>;

    /// Upsert keyed by id. Fails with [`StoreError::Conflict`] if the
    /// username is held by a different identity.
    async fn save(&self, identity: &Identity) -> Result<(), StoreError>;

    async fn list_all(&self) -> Result<Vec<Identity>, StoreError>;
}

#[async_trait]
pub trait JournalStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Journal>, StoreError>;

    /// Resolve an ownership set to its entries; ids without a backing entry
    /// are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Journal>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Journal>, StoreError>;

    /// Upsert keyed by id.
    async fn save(&self, journal: &Journal) -> Result<(), StoreError>;

    /// Returns false if the entry was already absent.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
