//! Client session tracking for incremental catalog delivery.
//!
//! A session is an opaque client-supplied key mapped to the set of entry ids
//! that client has already received in full. The set only ever grows; whole
//! sessions are swept away once idle past the retention window.

mod sqlite;

pub use sqlite::SqliteSessionStore;

use std::collections::HashSet;

use chrono::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Database error: {0}")]
    Database(String),
}

/// Trait for session storage backends.
///
/// Failures here must never fail a catalog request: callers treat a load
/// error as a fresh, empty session and swallow store errors.
pub trait SessionStore: Send + Sync {
    /// Ids already delivered to this session key. Unknown keys yield an
    /// empty set.
    fn known_ids(&self, key: &str) -> Result<HashSet<i64>, SessionError>;

    /// Upsert the known set for a key, refreshing its last-update time.
    fn store_known_ids(&self, key: &str, ids: &HashSet<i64>) -> Result<(), SessionError>;

    /// Delete sessions idle longer than `retention`. Returns how many were
    /// removed.
    fn cleanup_expired(&self, retention: Duration) -> Result<usize, SessionError>;

    /// Total stored sessions (admin stats).
    fn session_count(&self) -> Result<i64, SessionError>;

    /// Sessions touched within `window` (admin stats).
    fn active_session_count(&self, window: Duration) -> Result<i64, SessionError>;
}
