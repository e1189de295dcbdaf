//! Configuration for the offline sync layer.
//!
//! # Example
//!
//! ```
//! use fleet_offline_sync::OfflineSyncConfig;
//!
//! // Minimal config (uses defaults; no db_path means in-memory storage)
//! let config = OfflineSyncConfig::default();
//! assert!(config.db_path.is_none());
//!
//! // Full config
//! let config = OfflineSyncConfig {
//!     db_path: Some("./offline.db".into()),
//!     base_url: "https://fleet.example.com".into(),
//!     request_timeout_ms: 5_000,
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;

/// Configuration for the offline store and sync coordinator.
///
/// All fields have working defaults. Set `db_path` for durable storage;
/// without it the store lives in memory and pending actions do not survive
/// a restart.
#[derive(Debug, Clone, Deserialize)]
pub struct OfflineSyncConfig {
    /// SQLite file path. `None` selects the in-memory backend.
    #[serde(default)]
    pub db_path: Option<String>,

    /// Base URL of the remote API, prefixed to every action's path.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout during drain cycles.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// SQLite connection pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}
fn default_max_connections() -> u32 {
    5
}

impl Default for OfflineSyncConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            max_connections: default_max_connections(),
        }
    }
}
