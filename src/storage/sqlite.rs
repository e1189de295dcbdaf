//! SQLite storage backend.
//!
//! One database file holds all three partitions in a single `kv_entries`
//! table keyed by `(partition, key)`. The file survives process restarts;
//! this is what makes the pending-action queue durable.
//!
//! ```sql
//! CREATE TABLE kv_entries (
//!   partition TEXT NOT NULL,  -- 'vehicles' | 'pending_actions' | 'cache'
//!   key       TEXT NOT NULL,
//!   value     TEXT NOT NULL,  -- JSON as text
//!   PRIMARY KEY (partition, key)
//! )
//! ```
//!
//! Iteration order is rowid order. Upserts keep the existing rowid, so an
//! overwritten key keeps its original position.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info};

use super::traits::{KeyValueStore, Partition, StorageError};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub async fn open(
        path: impl AsRef<Path>,
        max_connections: u32,
    ) -> Result<Self, StorageError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        info!(path = %path_str, "Opening offline store database");

        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let store = Self { pool };
        store.enable_wal_mode().await?;
        store.init_schema().await?;
        Ok(store)
    }

    /// Enable WAL journal mode: readers don't block the coordinator's
    /// writes, and a single fsync per commit keeps enqueue latency low.
    async fn enable_wal_mode(&self) -> Result<(), StorageError> {
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to enable WAL mode: {e}")))?;

        // WAL mode is safe with NORMAL; FULL only adds latency here.
        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to set synchronous mode: {e}")))?;

        Ok(())
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                partition TEXT NOT NULL,
                key       TEXT NOT NULL,
                value     TEXT NOT NULL,
                PRIMARY KEY (partition, key)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, partition: Partition, key: &str) -> Result<Option<Value>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE partition = ? AND key = ?")
            .bind(partition.as_str())
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        match row {
            Some(row) => {
                let raw: String = row
                    .try_get("value")
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
                let value = serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        partition: Partition,
        key: &str,
        value: &Value,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        sqlx::query(
            r#"
            INSERT INTO kv_entries (partition, key, value) VALUES (?, ?, ?)
            ON CONFLICT (partition, key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(partition.as_str())
        .bind(key)
        .bind(raw)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        debug!(partition = %partition, key, "Entry written");
        Ok(())
    }

    async fn remove(&self, partition: Partition, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_entries WHERE partition = ? AND key = ?")
            .bind(partition.as_str())
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn entries(&self, partition: Partition) -> Result<Vec<(String, Value)>, StorageError> {
        let rows =
            sqlx::query("SELECT key, value FROM kv_entries WHERE partition = ? ORDER BY rowid")
                .bind(partition.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let key: String = row
                .try_get("key")
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            let raw: String = row
                .try_get("value")
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            let value = serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                key: key.clone(),
                reason: e.to_string(),
            })?;
            entries.push((key, value));
        }
        Ok(entries)
    }

    async fn clear(&self, partition: Partition) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_entries WHERE partition = ?")
            .bind(partition.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        debug!(partition = %partition, "Partition cleared");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        debug!("Offline store database closed");
    }
}
