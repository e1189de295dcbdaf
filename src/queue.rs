//! Durable FIFO log of deferred mutations.
//!
//! Actions live in the `pending_actions` partition keyed by id and stay
//! there until the coordinator confirms a successful remote replay. No size
//! bound is enforced; unbounded growth while the app is offline
//! indefinitely is an accepted tradeoff, not a bug.

use std::sync::Arc;

use tracing::debug;

use crate::action::PendingAction;
use crate::storage::traits::{KeyValueStore, Partition, StorageError};

#[derive(Clone)]
pub struct PendingQueue {
    store: Arc<dyn KeyValueStore>,
}

impl PendingQueue {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist an action. The caller guarantees `action.id` is unique among
    /// currently queued actions; a repeated id overwrites (last write wins).
    /// Storage failures propagate — losing a mutation silently would break
    /// the durability contract.
    pub async fn enqueue(&self, action: &PendingAction) -> Result<(), StorageError> {
        let value = serde_json::to_value(action).map_err(|e| StorageError::Serialization {
            key: action.id.clone(),
            reason: e.to_string(),
        })?;
        self.store
            .set(Partition::PendingActions, &action.id, &value)
            .await?;
        debug!(id = %action.id, method = %action.method, url = %action.url, "Pending action enqueued");
        Ok(())
    }

    /// All queued actions in replay order.
    ///
    /// The partition's iteration order is not trusted for FIFO; actions are
    /// sorted ascending by `enqueued_at` (stable, so backend insertion
    /// order breaks ties).
    pub async fn list_all(&self) -> Result<Vec<PendingAction>, StorageError> {
        let entries = self.store.entries(Partition::PendingActions).await?;

        let mut actions = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let action =
                serde_json::from_value(value).map_err(|e| StorageError::Corrupt {
                    key,
                    reason: e.to_string(),
                })?;
            actions.push(action);
        }
        actions.sort_by_key(|a: &PendingAction| a.enqueued_at);
        Ok(actions)
    }

    /// Delete one entry. Removing an absent id is a no-op.
    pub async fn remove(&self, id: &str) -> Result<(), StorageError> {
        self.store.remove(Partition::PendingActions, id).await
    }

    /// Number of queued actions.
    pub async fn len(&self) -> Result<usize, StorageError> {
        Ok(self.store.entries(Partition::PendingActions).await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len().await? == 0)
    }
}
