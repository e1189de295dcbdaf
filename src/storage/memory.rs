use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;

use super::traits::{KeyValueStore, Partition, StorageError};

/// Non-durable store backed by concurrent maps, one per partition.
///
/// Entries carry an insertion sequence number so [`KeyValueStore::entries`]
/// reports them in insertion order. Overwriting a key keeps its original
/// position, matching the durable backend's upsert behavior.
pub struct InMemoryStore {
    partitions: [DashMap<String, (u64, Value)>; 3],
    seq: AtomicU64,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            partitions: [DashMap::new(), DashMap::new(), DashMap::new()],
            seq: AtomicU64::new(0),
        }
    }

    /// Entry count of one partition.
    #[must_use]
    pub fn len(&self, partition: Partition) -> usize {
        self.partitions[partition.index()].len()
    }

    #[must_use]
    pub fn is_empty(&self, partition: Partition) -> bool {
        self.partitions[partition.index()].is_empty()
    }

    fn map(&self, partition: Partition) -> &DashMap<String, (u64, Value)> {
        &self.partitions[partition.index()]
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, partition: Partition, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.map(partition).get(key).map(|r| r.value().1.clone()))
    }

    async fn set(
        &self,
        partition: Partition,
        key: &str,
        value: &Value,
    ) -> Result<(), StorageError> {
        match self.map(partition).entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().1 = value.clone();
            }
            Entry::Vacant(vacant) => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                vacant.insert((seq, value.clone()));
            }
        }
        Ok(())
    }

    async fn remove(&self, partition: Partition, key: &str) -> Result<(), StorageError> {
        self.map(partition).remove(key);
        Ok(())
    }

    async fn entries(&self, partition: Partition) -> Result<Vec<(String, Value)>, StorageError> {
        let mut rows: Vec<(u64, String, Value)> = self
            .map(partition)
            .iter()
            .map(|r| (r.value().0, r.key().clone(), r.value().1.clone()))
            .collect();
        rows.sort_by_key(|(seq, _, _)| *seq);
        Ok(rows.into_iter().map(|(_, key, value)| (key, value)).collect())
    }

    async fn clear(&self, partition: Partition) -> Result<(), StorageError> {
        self.map(partition).clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = InMemoryStore::new();
        for partition in Partition::ALL {
            assert!(store.is_empty(partition));
            assert_eq!(store.len(partition), 0);
        }
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryStore::new();
        store
            .set(Partition::Cache, "/api/vehicles", &json!({"count": 3}))
            .await
            .unwrap();

        let value = store.get(Partition::Cache, "/api/vehicles").await.unwrap();
        assert_eq!(value, Some(json!({"count": 3})));
    }

    #[tokio::test]
    async fn test_get_absent_returns_none() {
        let store = InMemoryStore::new();
        let value = store.get(Partition::Vehicles, "17").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_in_place() {
        let store = InMemoryStore::new();
        store.set(Partition::Vehicles, "1", &json!({"v": 1})).await.unwrap();
        store.set(Partition::Vehicles, "2", &json!({"v": 2})).await.unwrap();
        store.set(Partition::Vehicles, "1", &json!({"v": 3})).await.unwrap();

        assert_eq!(store.len(Partition::Vehicles), 2);

        // Overwrite keeps the original insertion position.
        let entries = store.entries(Partition::Vehicles).await.unwrap();
        assert_eq!(entries[0], ("1".to_string(), json!({"v": 3})));
        assert_eq!(entries[1], ("2".to_string(), json!({"v": 2})));
    }

    #[tokio::test]
    async fn test_remove_absent_is_ok() {
        let store = InMemoryStore::new();
        store.remove(Partition::PendingActions, "missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_entries_in_insertion_order() {
        let store = InMemoryStore::new();
        for i in 0..10 {
            store
                .set(Partition::PendingActions, &format!("a{i}"), &json!(i))
                .await
                .unwrap();
        }

        let entries = store.entries(Partition::PendingActions).await.unwrap();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, (0..10).map(|i| format!("a{i}")).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_partitions_are_independent() {
        let store = InMemoryStore::new();
        store.set(Partition::Vehicles, "k", &json!(1)).await.unwrap();
        store.set(Partition::Cache, "k", &json!(2)).await.unwrap();

        store.clear(Partition::Vehicles).await.unwrap();

        assert!(store.get(Partition::Vehicles, "k").await.unwrap().is_none());
        assert_eq!(store.get(Partition::Cache, "k").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_concurrent_writers() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryStore::new());
        let mut handles = vec![];

        for batch in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..10 {
                    store
                        .set(Partition::Cache, &format!("{batch}-{i}"), &json!(i))
                        .await
                        .unwrap();
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len(Partition::Cache), 100);
    }
}
