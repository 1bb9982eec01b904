//! SQLite-backed session store.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use rusqlite::{params, Connection};

use super::{SessionError, SessionStore};

/// SQLite-backed session store.
///
/// Known ids are stored as a sorted JSON array; timestamps are RFC 3339
/// strings, which this store always writes itself, so lexicographic
/// comparison in SQL is sound.
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    pub fn new(path: &Path) -> Result<Self, SessionError> {
        let conn = Connection::open(path).map_err(|e| SessionError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, SessionError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SessionError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), SessionError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS catalog_sessions (
                session_key TEXT PRIMARY KEY,
                known_ids TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_catalog_sessions_updated
                ON catalog_sessions(updated_at);
            "#,
        )
        .map_err(|e| SessionError::Database(e.to_string()))?;

        Ok(())
    }

    #[cfg(test)]
    fn backdate(&self, key: &str, timestamp: &str) {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE catalog_sessions SET updated_at = ? WHERE session_key = ?",
            params![timestamp, key],
        )
        .unwrap();
    }
}

impl SessionStore for SqliteSessionStore {
    fn known_ids(&self, key: &str) -> Result<HashSet<i64>, SessionError> {
        if key.is_empty() {
            return Ok(HashSet::new());
        }

        let conn = self.conn.lock().unwrap();
        let stored: Option<String> = conn
            .query_row(
                "SELECT known_ids FROM catalog_sessions WHERE session_key = ?",
                params![key],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                _ => Err(SessionError::Database(e.to_string())),
            })?;

        let Some(raw) = stored else {
            return Ok(HashSet::new());
        };

        // A corrupted row degrades to an empty session rather than an error.
        let ids: Vec<i64> = serde_json::from_str(&raw).unwrap_or_default();
        Ok(ids.into_iter().collect())
    }

    fn store_known_ids(&self, key: &str, ids: &HashSet<i64>) -> Result<(), SessionError> {
        if key.is_empty() {
            return Ok(());
        }

        let mut sorted: Vec<i64> = ids.iter().copied().collect();
        sorted.sort_unstable();
        let raw = serde_json::to_string(&sorted).map_err(|e| SessionError::Database(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO catalog_sessions (session_key, known_ids, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(session_key) DO UPDATE SET
                known_ids = excluded.known_ids,
                updated_at = excluded.updated_at",
            params![key, raw, now],
        )
        .map_err(|e| SessionError::Database(e.to_string()))?;

        Ok(())
    }

    fn cleanup_expired(&self, retention: Duration) -> Result<usize, SessionError> {
        let cutoff = (Utc::now() - retention).to_rfc3339();
        let conn = self.conn.lock().unwrap();
        let removed = conn
            .execute(
                "DELETE FROM catalog_sessions WHERE updated_at < ?",
                params![cutoff],
            )
            .map_err(|e| SessionError::Database(e.to_string()))?;

        if removed > 0 {
            tracing::debug!("Removed {} expired catalog sessions", removed);
        }
        Ok(removed)
    }

    fn session_count(&self) -> Result<i64, SessionError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM catalog_sessions", [], |row| row.get(0))
            .map_err(|e| SessionError::Database(e.to_string()))
    }

    fn active_session_count(&self, window: Duration) -> Result<i64, SessionError> {
        let cutoff = (Utc::now() - window).to_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM catalog_sessions WHERE updated_at > ?",
            params![cutoff],
            |row| row.get(0),
        )
        .map_err(|e| SessionError::Database(e.to_string()))
    }
}
