use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Identity, Journal};
use super::{IdentityStore, JournalStore, StoreError};

/// In-memory store used by the integration tests. Mirrors the Postgres
/// implementation's contract, including the username uniqueness conflict.
#[derive(Default)]
pub struct MemoryStore {
    identities: RwLock<HashMap<Uuid, Identity>>,
    journals: RwLock<HashMap<Uuid, Journal>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        let identities = self.identities.read().await;
        Ok(identities.values().find(|i| i.username == username).cloned())
    }

    async fn save(&self, identity: &Identity) -> Result<(), StoreError> {
        let mut identities = self.identities.write().await;

        let taken = identities
            .values()
            .any(|i| i.username == identity.username && i.id != identity.id);
        if taken {
            return Err(StoreError::Conflict);
        }

        identities.insert(identity.id, identity.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Identity>, StoreError> {
        let identities = self.identities.read().await;
        let mut all: Vec<Identity> = identities.values().cloned().collect();
        all.sort_by_key(|i| i.created_at);
        Ok(all)
    }
}

#[async_trait]
impl JournalStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Journal>, StoreError> {
        let journals = self.journals.read().await;
        Ok(journals.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Journal>, StoreError> {
        let journals = self.journals.read().await;
        let mut found: Vec<Journal> = ids.iter().filter_map(|id| journals.get(id).cloned()).collect();
        found.sort_by_key(|j| j.created_at);
        Ok(found)
    }

    async fn find_all(&self) -> Result<Vec<Journal>, StoreError> {
        let journals = self.journals.read().await;
        let mut all: Vec<Journal> = journals.values().cloned().collect();
        all.sort_by_key(|j| j.created_at);
        Ok(all)
    }

    async fn save(&self, journal: &Journal) -> Result<(), StoreError> {
        let mut journals = self.journals.write().await;
        journals.insert(journal.id, journal.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut journals = self.journals.write().await;
        Ok(journals.remove(&id).is_some())
    }
}
