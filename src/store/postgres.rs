use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use super::models::{Identity, Journal};
use super::{IdentityStore, JournalStore, StoreError};
use crate::config::DatabaseConfig;

/// Postgres-backed identity and journal stores sharing one pool. All waits
/// are bounded by the pool's acquire timeout.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Bootstrap DDL, idempotent. Runs at startup so a fresh database works
    /// without external migration tooling.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                roles TEXT[] NOT NULL,
                journal_ids UUID[] NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS journals (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                category TEXT,
                image_url TEXT,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn identity_from_row(row: &PgRow) -> Identity {
    Identity {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        roles: row.get("roles"),
        journal_ids: row.get("journal_ids"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn journal_from_row(row: &PgRow) -> Journal {
    Journal {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        category: row.get("category"),
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, roles, journal_ids, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(identity_from_row))
    }

    async fn save(&self, identity: &Identity) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, roles, journal_ids, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                password_hash = EXCLUDED.password_hash,
                roles = EXCLUDED.roles,
                journal_ids = EXCLUDED.journal_ids,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(identity.id)
        .bind(&identity.username)
        .bind(&identity.password_hash)
        .bind(&identity.roles)
        .bind(&identity.journal_ids)
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Identity>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, password_hash, roles, journal_ids, created_at, updated_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(identity_from_row).collect())
    }
}

#[async_trait]
impl JournalStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Journal>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, content, category, image_url, created_at, updated_at
            FROM journals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(journal_from_row))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Journal>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, category, image_url, created_at, updated_at
            FROM journals
            WHERE id = ANY($1)
            ORDER BY created_at
            "#,
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(journal_from_row).collect())
    }

    async fn find_all(&self) -> Result<Vec<Journal>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, category, image_url, created_at, updated_at
            FROM journals
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(journal_from_row).collect())
    }

    async fn save(&self, journal: &Journal) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO journals (id, title, content, category, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                content = EXCLUDED.content,
                category = EXCLUDED.category,
                image_url = EXCLUDED.image_url,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(journal.id)
        .bind(&journal.title)
        .bind(&journal.content)
        .bind(&journal.category)
        .bind(&journal.image_url)
        .bind(journal.created_at)
        .bind(journal.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM journals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
