//! Cache-aside layer over the `cache` and `vehicles` partitions.
//!
//! Reads consult these when a network read is unavailable; writes happen
//! whenever a network read succeeds. Neither view enforces a TTL: staleness
//! judgment is the caller's, who has the capture timestamp.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::action::{now_millis, CacheEntry};
use crate::storage::traits::{KeyValueStore, Partition, StorageError};

/// Last-known server payloads keyed by request URL.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Write `{data, cached_at: now}` under `url`, overwriting any prior
    /// entry. Storage failures propagate; a silently dropped write would
    /// leave the caller believing the fallback exists.
    pub async fn cache_response(&self, url: &str, data: Value) -> Result<(), StorageError> {
        let entry = CacheEntry {
            data,
            cached_at: now_millis(),
        };
        let value = serde_json::to_value(&entry).map_err(|e| StorageError::Serialization {
            key: url.to_string(),
            reason: e.to_string(),
        })?;
        self.store.set(Partition::Cache, url, &value).await?;
        debug!(url, "Response cached");
        Ok(())
    }

    /// The stored entry, or `None` when the URL was never cached.
    pub async fn cached_response(&self, url: &str) -> Result<Option<CacheEntry>, StorageError> {
        match self.store.get(Partition::Cache, url).await? {
            Some(value) => {
                let entry =
                    serde_json::from_value(value).map_err(|e| StorageError::Corrupt {
                        key: url.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }
}

/// Locally mirrored vehicle records, keyed by stringified vehicle id.
///
/// The mirror only stores what it is given; vehicle business state is
/// computed elsewhere.
#[derive(Clone)]
pub struct VehicleMirror {
    store: Arc<dyn KeyValueStore>,
}

impl VehicleMirror {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrite the snapshot for one vehicle.
    pub async fn save_snapshot(&self, vehicle_id: &str, vehicle: &Value) -> Result<(), StorageError> {
        self.store.set(Partition::Vehicles, vehicle_id, vehicle).await
    }

    /// Every mirrored vehicle record.
    pub async fn snapshots(&self) -> Result<Vec<Value>, StorageError> {
        let entries = self.store.entries(Partition::Vehicles).await?;
        Ok(entries.into_iter().map(|(_, value)| value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryStore;
    use serde_json::json;

    fn cache() -> ResponseCache {
        ResponseCache::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn test_cache_roundtrip() {
        let cache = cache();
        let before = now_millis();

        cache
            .cache_response("/api/vehicles", json!([{"id": 1}, {"id": 2}]))
            .await
            .unwrap();

        let entry = cache.cached_response("/api/vehicles").await.unwrap().unwrap();
        assert_eq!(entry.data, json!([{"id": 1}, {"id": 2}]));
        assert!(entry.cached_at >= before);
        assert!(entry.cached_at <= now_millis());
    }

    #[tokio::test]
    async fn test_uncached_url_is_none() {
        let cache = cache();
        assert!(cache.cached_response("/api/parking").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_write_overwrites() {
        let cache = cache();

        cache.cache_response("/api/vehicles", json!({"rev": 1})).await.unwrap();
        cache.cache_response("/api/vehicles", json!({"rev": 2})).await.unwrap();

        let entry = cache.cached_response("/api/vehicles").await.unwrap().unwrap();
        assert_eq!(entry.data, json!({"rev": 2}));
    }

    #[tokio::test]
    async fn test_vehicle_mirror_overwrites_by_id() {
        let mirror = VehicleMirror::new(Arc::new(InMemoryStore::new()));

        mirror.save_snapshot("5", &json!({"id": 5, "status": "available"})).await.unwrap();
        mirror.save_snapshot("7", &json!({"id": 7, "status": "rented"})).await.unwrap();
        mirror.save_snapshot("5", &json!({"id": 5, "status": "maintenance"})).await.unwrap();

        let snapshots = mirror.snapshots().await.unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0], json!({"id": 5, "status": "maintenance"}));
    }
}
