//! The offline store context object.
//!
//! One [`OfflineStore`] is constructed at process start and passed by
//! reference to everything that needs local storage — there is no global
//! mutable state. It owns the three partition views (response cache,
//! vehicle mirror, pending queue) over a single [`KeyValueStore`] handle
//! and exposes the operations the UI layer calls.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::action::{CacheEntry, PendingAction};
use crate::cache::{ResponseCache, VehicleMirror};
use crate::config::OfflineSyncConfig;
use crate::queue::PendingQueue;
use crate::storage::memory::InMemoryStore;
use crate::storage::sqlite::SqliteStore;
use crate::storage::traits::{KeyValueStore, Partition, StorageError};

pub struct OfflineStore {
    store: Arc<dyn KeyValueStore>,
    cache: ResponseCache,
    vehicles: VehicleMirror,
    queue: PendingQueue,
}

impl OfflineStore {
    /// Build the context over an already-constructed backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            cache: ResponseCache::new(store.clone()),
            vehicles: VehicleMirror::new(store.clone()),
            queue: PendingQueue::new(store.clone()),
            store,
        }
    }

    /// Open the backend the config selects: SQLite when `db_path` is set,
    /// in-memory otherwise.
    pub async fn open(config: &OfflineSyncConfig) -> Result<Self, StorageError> {
        let store: Arc<dyn KeyValueStore> = match &config.db_path {
            Some(path) => Arc::new(SqliteStore::open(path, config.max_connections).await?),
            None => {
                info!("No db_path configured, offline store is in-memory only");
                Arc::new(InMemoryStore::new())
            }
        };
        Ok(Self::new(store))
    }

    /// In-memory context, mainly for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    // ===== Response cache =====

    pub async fn cache_response(&self, url: &str, data: Value) -> Result<(), StorageError> {
        self.cache.cache_response(url, data).await
    }

    pub async fn cached_response(&self, url: &str) -> Result<Option<CacheEntry>, StorageError> {
        self.cache.cached_response(url).await
    }

    // ===== Vehicle mirror =====

    pub async fn save_vehicle_snapshot(
        &self,
        vehicle_id: &str,
        vehicle: &Value,
    ) -> Result<(), StorageError> {
        self.vehicles.save_snapshot(vehicle_id, vehicle).await
    }

    pub async fn vehicle_snapshots(&self) -> Result<Vec<Value>, StorageError> {
        self.vehicles.snapshots().await
    }

    // ===== Pending-action queue =====

    pub async fn enqueue_pending_action(&self, action: &PendingAction) -> Result<(), StorageError> {
        self.queue.enqueue(action).await
    }

    /// Queued actions in replay order (ascending `enqueued_at`).
    pub async fn list_pending_actions(&self) -> Result<Vec<PendingAction>, StorageError> {
        self.queue.list_all().await
    }

    pub async fn remove_pending_action(&self, id: &str) -> Result<(), StorageError> {
        self.queue.remove(id).await
    }

    // ===== Maintenance =====

    /// Empty all three partitions. Used on logout.
    pub async fn clear_all(&self) -> Result<(), StorageError> {
        for partition in Partition::ALL {
            self.store.clear(partition).await?;
        }
        info!("Offline store cleared");
        Ok(())
    }

    /// Release the underlying storage handles.
    pub async fn close(&self) {
        self.store.close().await;
    }
}
