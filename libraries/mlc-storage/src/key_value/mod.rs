//! Key-value store backed by the `key_value` table
//!
//! Plays the role of browser local storage: the controller keeps its raw
//! manifest snapshot here under [`mlc_core::SOUND_MAP_KEY`].

use async_trait::async_trait;
use mlc_core::KeyValueStore;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::Result;

/// `SQLite` implementation of [`KeyValueStore`]
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// Wrap a migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// All keys currently stored, sorted
    pub async fn keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM key_value ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("key").map_err(Into::into))
            .collect()
    }

    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM key_value WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO key_value (key, value, updated_at)
             VALUES (?, ?, strftime('%s', 'now'))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn remove_value(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM key_value WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> mlc_core::Result<Option<String>> {
        Ok(self.get_value(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> mlc_core::Result<()> {
        Ok(self.set_value(key, value).await?)
    }

    async fn remove(&self, key: &str) -> mlc_core::Result<()> {
        Ok(self.remove_value(key).await?)
    }
}
