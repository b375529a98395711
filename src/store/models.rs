use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLE_USER: &str = "USER";
pub const ROLE_ADMIN: &str = "ADMIN";

/// Persisted account record. `journal_ids` is the ownership set: the journal
/// entries this identity is allowed to mutate. The password hash never leaves
/// the store layer; API responses use [`IdentityProfile`].
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub journal_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(username: String, password_hash: String, roles: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            roles,
            journal_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ROLE_ADMIN)
    }

    pub fn owns(&self, journal_id: Uuid) -> bool {
        self.journal_ids.contains(&journal_id)
    }
}

/// Client-facing view of an identity, without the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub journal_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Identity> for IdentityProfile {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            roles: identity.roles.clone(),
            journal_ids: identity.journal_ids.clone(),
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        }
    }
}

/// A journal entry. `image_url` points at the external media host when an
/// image was attached at create/update time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Journal {
    pub fn new(title: String, content: String, category: Option<String>, image_url: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            category,
            image_url,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_detection() {
        let mut identity = Identity::new("ops".into(), "hash".into(), vec![ROLE_USER.to_string()]);
        assert!(!identity.is_admin());

        identity.roles.push(ROLE_ADMIN.to_string());
        assert!(identity.is_admin());
    }

    #[test]
    fn ownership_set_membership() {
        let mut identity = Identity::new("alice".into(), "hash".into(), vec![ROLE_USER.to_string()]);
        let journal = Journal::new("day one".into(), "...".into(), None, None);

        assert!(!identity.owns(journal.id));
        identity.journal_ids.push(journal.id);
        assert!(identity.owns(journal.id));
    }
}
