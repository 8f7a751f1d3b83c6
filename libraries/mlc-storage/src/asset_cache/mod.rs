//! Named response caches for the offline worker
//!
//! Each row in `asset_caches` is one cache generation (for example
//! `mlc-soundboard-v1`); `asset_cache_entries` holds its responses keyed by
//! request URL. Lookups search every generation, oldest first, the way a
//! browser `CacheStorage.match` does.

use async_trait::async_trait;
use bytes::Bytes;
use mlc_core::{AssetRequest, AssetResponse, CacheStorage, ResponseKind};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use crate::error::{Result, StorageError};

/// `SQLite` implementation of [`CacheStorage`]
#[derive(Debug, Clone)]
pub struct SqliteCacheStorage {
    pool: SqlitePool,
}

impl SqliteCacheStorage {
    /// Wrap a migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Number of entries in one cache
    pub async fn entry_count(&self, cache_name: &str) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM asset_cache_entries WHERE cache_name = ?")
            .bind(cache_name)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count as usize)
    }

    async fn ensure_cache(tx: &mut Transaction<'_, Sqlite>, cache_name: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO asset_caches (name) VALUES (?)")
            .bind(cache_name)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn insert_entry(
        tx: &mut Transaction<'_, Sqlite>,
        cache_name: &str,
        request: &AssetRequest,
        response: &AssetResponse,
    ) -> Result<()> {
        let headers = serde_json::to_string(&response.headers)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO asset_cache_entries
                (cache_name, request_key, method, status, kind, headers, body, stored_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, strftime('%s', 'now'))
             ON CONFLICT(cache_name, request_key) DO UPDATE SET
                method = excluded.method,
                status = excluded.status,
                kind = excluded.kind,
                headers = excluded.headers,
                body = excluded.body,
                stored_at = excluded.stored_at",
        )
        .bind(cache_name)
        .bind(request.cache_key())
        .bind(&request.method)
        .bind(i64::from(response.status))
        .bind(response.kind.as_str())
        .bind(headers)
        .bind(response.body.as_ref())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    fn row_to_response(row: &SqliteRow) -> Result<AssetResponse> {
        let status: i64 = row.try_get("status")?;
        let kind: String = row.try_get("kind")?;
        let headers: String = row.try_get("headers")?;
        let body: Vec<u8> = row.try_get("body")?;

        let status = u16::try_from(status)
            .map_err(|_| StorageError::SerializationError(format!("Invalid status {}", status)))?;
        let kind = kind
            .parse::<ResponseKind>()
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        let headers: Vec<(String, String)> = serde_json::from_str(&headers)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        Ok(AssetResponse {
            status,
            kind,
            headers,
            body: Bytes::from(body),
        })
    }

    async fn cache_names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM asset_caches ORDER BY created_at, rowid")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(Into::into))
            .collect()
    }

    async fn open_cache(&self, cache_name: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Self::ensure_cache(&mut tx, cache_name).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_cache(&self, cache_name: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM asset_cache_entries WHERE cache_name = ?")
            .bind(cache_name)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM asset_caches WHERE name = ?")
            .bind(cache_name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(cache = %cache_name, "Deleted asset cache");
        }
        Ok(deleted)
    }

    async fn put_entries(
        &self,
        cache_name: &str,
        entries: &[(AssetRequest, AssetResponse)],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Self::ensure_cache(&mut tx, cache_name).await?;
        for (request, response) in entries {
            Self::insert_entry(&mut tx, cache_name, request, response).await?;
        }
        tx.commit().await?;

        debug!(cache = %cache_name, entries = entries.len(), "Stored cache entries");
        Ok(())
    }

    async fn find(&self, request: &AssetRequest) -> Result<Option<AssetResponse>> {
        let row = sqlx::query(
            "SELECT e.status, e.kind, e.headers, e.body
             FROM asset_cache_entries e
             JOIN asset_caches c ON c.name = e.cache_name
             WHERE e.request_key = ? AND e.method = ?
             ORDER BY c.created_at, c.rowid
             LIMIT 1",
        )
        .bind(request.cache_key())
        .bind(&request.method)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_response).transpose()
    }
}

#[async_trait]
impl CacheStorage for SqliteCacheStorage {
    async fn open(&self, cache_name: &str) -> mlc_core::Result<()> {
        Ok(self.open_cache(cache_name).await?)
    }

    async fn keys(&self) -> mlc_core::Result<Vec<String>> {
        Ok(self.cache_names().await?)
    }

    async fn delete(&self, cache_name: &str) -> mlc_core::Result<bool> {
        Ok(self.delete_cache(cache_name).await?)
    }

    async fn put(
        &self,
        cache_name: &str,
        request: &AssetRequest,
        response: &AssetResponse,
    ) -> mlc_core::Result<()> {
        Ok(self
            .put_entries(cache_name, &[(request.clone(), response.clone())])
            .await?)
    }

    async fn put_all(
        &self,
        cache_name: &str,
        entries: &[(AssetRequest, AssetResponse)],
    ) -> mlc_core::Result<()> {
        Ok(self.put_entries(cache_name, entries).await?)
    }

    async fn match_request(
        &self,
        request: &AssetRequest,
    ) -> mlc_core::Result<Option<AssetResponse>> {
        if !request.is_cacheable_method() {
            return Ok(None);
        }
        Ok(self.find(request).await?)
    }
}
