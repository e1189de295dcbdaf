//! # Fleet Offline Sync
//!
//! Offline cache and sync core for the fleet manager application.
//!
//! The crate gives a UI layer three durable, independently namespaced
//! key-value partitions plus a coordinator that replays deferred mutations
//! against the remote HTTP API:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Caller (UI)                         │
//! │  • reads fall back to the response cache when offline       │
//! │  • failed/skipped mutations are enqueued as PendingActions  │
//! └─────────────────────────────────────────────────────────────┘
//!                │                               │
//!                ▼                               ▼
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │       OfflineStore       │   │       SyncCoordinator        │
//! │  vehicles / cache /      │◄──┤  drains the pending queue    │
//! │  pending-action          │   │  on offline→online or flush  │
//! │  partitions              │   │  (2xx removes, else keep)    │
//! └──────────────────────────┘   └──────────────────────────────┘
//!                │                               │
//!                ▼                               ▼
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │      KeyValueStore       │   │          Transport           │
//! │  SQLite (durable) or     │   │  HTTP with JSON bodies,      │
//! │  in-memory (tests)       │   │  fakeable for tests          │
//! └──────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use fleet_offline_sync::{
//!     ConnectivityMonitor, HttpTransport, Method, OfflineStore,
//!     OfflineSyncConfig, PendingAction, SyncCoordinator,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OfflineSyncConfig::default();
//!     let store = Arc::new(OfflineStore::open(&config).await.expect("open store"));
//!     let connectivity = ConnectivityMonitor::default();
//!     let transport = Arc::new(HttpTransport::new(&config).expect("build transport"));
//!
//!     let coordinator = Arc::new(SyncCoordinator::new(
//!         store.clone(),
//!         transport,
//!         connectivity.subscribe(),
//!     ));
//!     let _watcher = coordinator.spawn();
//!
//!     // A mutation issued while offline is queued for later replay.
//!     connectivity.set_offline();
//!     let action = PendingAction::new(
//!         "a1",
//!         "/api/vehicles/5",
//!         Method::Put,
//!         json!({"status": "rented"}),
//!     );
//!     store.enqueue_pending_action(&action).await.expect("enqueue");
//!
//!     // Back online: the coordinator replays the queue in FIFO order.
//!     connectivity.set_online();
//! }
//! ```
//!
//! ## Modules
//!
//! - [`store`]: The [`OfflineStore`] context object owning all partitions
//! - [`coordinator`]: The [`SyncCoordinator`] draining the pending queue
//! - [`storage`]: Key-value backends (SQLite, in-memory) behind one trait
//! - [`queue`]: Durable FIFO log of pending mutations
//! - [`cache`]: Response cache and vehicle snapshot mirror
//! - [`connectivity`]: Online/offline signal with subscription support
//! - [`transport`]: HTTP boundary, fakeable for tests

pub mod action;
pub mod cache;
pub mod config;
pub mod connectivity;
pub mod coordinator;
pub mod queue;
pub mod storage;
pub mod store;
pub mod transport;

pub use action::{CacheEntry, Method, PendingAction};
pub use cache::{ResponseCache, VehicleMirror};
pub use config::OfflineSyncConfig;
pub use connectivity::ConnectivityMonitor;
pub use coordinator::{DrainOutcome, DrainReport, SyncCoordinator, SyncState};
pub use queue::PendingQueue;
pub use storage::memory::InMemoryStore;
pub use storage::sqlite::SqliteStore;
pub use storage::traits::{KeyValueStore, Partition, StorageError};
pub use store::OfflineStore;
pub use transport::{HttpTransport, NetworkError, Transport};
