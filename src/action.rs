//! Pending action and cache entry data structures.
//!
//! A [`PendingAction`] is the durable record of one not-yet-confirmed
//! mutation. It is created when a network call fails or is skipped because
//! the system is known offline, and destroyed only after the coordinator
//! confirms a successful remote replay.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP verb of a deferred mutation.
///
/// Serialized as the uppercase verb string so queue entries written by
/// older clients stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Post,
    Put,
    Patch,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A durable record of one not-yet-confirmed mutation.
///
/// # Example
///
/// ```
/// use fleet_offline_sync::{Method, PendingAction};
/// use serde_json::json;
///
/// let action = PendingAction::new(
///     "a1",
///     "/api/vehicles/5",
///     Method::Put,
///     json!({"status": "rented"}),
/// );
///
/// assert_eq!(action.id, "a1");
/// assert!(action.enqueued_at > 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAction {
    /// Opaque unique id, assigned by the caller at enqueue time.
    /// Uniqueness among queued actions is the caller's responsibility;
    /// a repeated id overwrites the earlier entry (last write wins).
    pub id: String,
    /// Target resource path (e.g. `/api/vehicles/5`).
    pub url: String,
    /// HTTP verb to replay with.
    pub method: Method,
    /// Request body, opaque to the queue.
    pub payload: Value,
    /// Epoch milliseconds at enqueue. Used for the FIFO sort before replay
    /// and diagnostics only, never for expiry.
    pub enqueued_at: i64,
}

impl PendingAction {
    /// Create an action stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        method: Method,
        payload: Value,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            method,
            payload,
            enqueued_at: now_millis(),
        }
    }
}

/// A cached read response, keyed by its request URL.
///
/// At most one entry exists per key; a new write overwrites the old one.
/// Staleness judgment is left to the caller, who has `cached_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Last-known response body.
    pub data: Value,
    /// Epoch milliseconds at capture.
    pub cached_at: i64,
}

/// Current wall-clock time as epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_action_is_stamped() {
        let before = now_millis();
        let action = PendingAction::new("a1", "/api/vehicles/5", Method::Put, json!({}));
        let after = now_millis();

        assert_eq!(action.id, "a1");
        assert_eq!(action.url, "/api/vehicles/5");
        assert_eq!(action.method, Method::Put);
        assert!(action.enqueued_at >= before);
        assert!(action.enqueued_at <= after);
    }

    #[test]
    fn test_method_serializes_as_uppercase_verb() {
        assert_eq!(serde_json::to_string(&Method::Post).unwrap(), "\"POST\"");
        assert_eq!(serde_json::to_string(&Method::Delete).unwrap(), "\"DELETE\"");

        let parsed: Method = serde_json::from_str("\"PATCH\"").unwrap();
        assert_eq!(parsed, Method::Patch);
    }

    #[test]
    fn test_method_display_matches_wire_form() {
        assert_eq!(Method::Put.to_string(), "PUT");
        assert_eq!(Method::Post.to_string(), "POST");
    }

    #[test]
    fn test_action_roundtrip() {
        let action = PendingAction::new(
            "a2",
            "/api/vehicles",
            Method::Post,
            json!({"plate": "AB-123-CD", "spot": 7}),
        );

        let encoded = serde_json::to_string(&action).unwrap();
        let decoded: PendingAction = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.id, action.id);
        assert_eq!(decoded.method, action.method);
        assert_eq!(decoded.payload, action.payload);
        assert_eq!(decoded.enqueued_at, action.enqueued_at);
    }

    #[test]
    fn test_cache_entry_roundtrip() {
        let entry = CacheEntry {
            data: json!([{"id": 1}, {"id": 2}]),
            cached_at: 1_700_000_000_000,
        };

        let encoded = serde_json::to_value(&entry).unwrap();
        let decoded: CacheEntry = serde_json::from_value(encoded).unwrap();

        assert_eq!(decoded.data, entry.data);
        assert_eq!(decoded.cached_at, entry.cached_at);
    }
}
