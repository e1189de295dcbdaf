//! Key-value storage backends.
//!
//! All backends expose the same three namespaced partitions through the
//! [`traits::KeyValueStore`] trait: `vehicles`, `pending_actions`, `cache`.

pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{KeyValueStore, Partition, StorageError};
