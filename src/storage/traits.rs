use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("stored value for '{key}' could not be decoded: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("value for '{key}' could not be encoded: {reason}")]
    Serialization { key: String, reason: String },
}

/// Logical namespace within the store.
///
/// Partitions are independent: entries in one never reference entries in
/// another, and clearing one leaves the others untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Locally mirrored vehicle records, keyed by stringified vehicle id.
    Vehicles,
    /// Durable FIFO log of deferred mutations, keyed by action id.
    PendingActions,
    /// Last-known server payloads, keyed by request URL.
    Cache,
}

impl Partition {
    pub const ALL: [Partition; 3] = [
        Partition::Vehicles,
        Partition::PendingActions,
        Partition::Cache,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vehicles => "vehicles",
            Self::PendingActions => "pending_actions",
            Self::Cache => "cache",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Vehicles => 0,
            Self::PendingActions => 1,
            Self::Cache => 2,
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asynchronous, partitioned key-value storage.
///
/// Operations may suspend on storage I/O but never block other tasks.
/// Errors from the underlying medium propagate as [`StorageError`]; the
/// adapter does not retry internally.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, partition: Partition, key: &str) -> Result<Option<Value>, StorageError>;

    /// Insert or overwrite. At most one entry exists per key.
    async fn set(&self, partition: Partition, key: &str, value: &Value)
        -> Result<(), StorageError>;

    /// Delete a single entry. Removing an absent key is not an error.
    async fn remove(&self, partition: Partition, key: &str) -> Result<(), StorageError>;

    /// Visit every stored entry of a partition, in the backend's insertion
    /// order. Callers that need strict FIFO must sort by their own
    /// timestamp field; the partition itself makes no ordering guarantee.
    async fn entries(&self, partition: Partition) -> Result<Vec<(String, Value)>, StorageError>;

    /// Remove every entry of a partition.
    async fn clear(&self, partition: Partition) -> Result<(), StorageError>;

    /// Release any open storage handles. Further calls are undefined.
    async fn close(&self) {}
}
