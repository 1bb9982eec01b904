//! SQLite-backed telemetry store.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection};

use super::{
    AppHitCount, ClientHitCount, DownloadRecord, DownloadStats, TelemetryError, TelemetryStore,
    UpdateCheckRecord, UpdateStats,
};

/// Buckets user agents into the client platforms the reports page shows.
const CLIENT_CLASS_SQL: &str = "CASE
    WHEN user_agent LIKE '%Windows 10%' THEN 'Windows 10'
    WHEN user_agent LIKE '%Windows 7%' THEN 'Windows 7'
    WHEN user_agent LIKE '%Linux x86_64%' THEN 'Linux PC'
    WHEN user_agent LIKE '%Smart TV%' THEN 'Linux Smart TV'
    WHEN user_agent LIKE '%ChromeOS%' THEN 'ChromeOS'
    WHEN user_agent LIKE '%Mac%' THEN 'Mac'
    WHEN user_agent LIKE '%Android%' THEN 'Android'
    WHEN user_agent LIKE '%iPhone%' THEN 'iPhone'
    WHEN user_agent LIKE '%webOS%' OR user_agent LIKE '%hpwOS%' THEN 'webOS'
    WHEN user_agent LIKE '%LuneOS%' THEN 'LuneOS'
    ELSE 'Other'
END";

pub struct SqliteTelemetryStore {
    conn: Mutex<Connection>,
}

impl SqliteTelemetryStore {
    pub fn new(path: &Path) -> Result<Self, TelemetryError> {
        let conn = Connection::open(path).map_err(|e| TelemetryError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, TelemetryError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TelemetryError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TelemetryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS download_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                app_id INTEGER,
                app_identifier TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT 'app',
                ip_address TEXT,
                user_agent TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_download_logs_identifier
                ON download_logs(app_identifier);

            CREATE TABLE IF NOT EXISTS update_checks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                app_name TEXT NOT NULL,
                device_info TEXT,
                client_id TEXT,
                ip_address TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_update_checks_app
                ON update_checks(app_name);
            "#,
        )
        .map_err(|e| TelemetryError::Database(e.to_string()))?;

        Ok(())
    }
}

impl TelemetryStore for SqliteTelemetryStore {
    fn log_download(&self, record: &DownloadRecord) -> Result<(), TelemetryError> {
        // Numeric identifiers also populate app_id for joins in reporting.
        let app_id: Option<i64> = record.app_identifier.parse().ok();
        let now = Utc::now().to_rfc3339();

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO download_logs
                (app_id, app_identifier, source, ip_address, user_agent, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                app_id,
                record.app_identifier,
                record.source,
                record.ip_address,
                record.user_agent,
                now,
            ],
        )
        .map_err(|e| TelemetryError::Database(e.to_string()))?;

        Ok(())
    }

    fn log_update_check(&self, record: &UpdateCheckRecord) -> Result<(), TelemetryError> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO update_checks (app_name, device_info, client_id, ip_address, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                record.app_name,
                record.device_info,
                record.client_id,
                record.ip_address,
                now,
            ],
        )
        .map_err(|e| TelemetryError::Database(e.to_string()))?;

        Ok(())
    }

    fn download_stats(&self) -> Result<DownloadStats, TelemetryError> {
        let conn = self.conn.lock().unwrap();

        let (first_date, last_date, total_downloads) = conn
            .query_row(
                "SELECT MIN(created_at), MAX(created_at), COUNT(*) FROM download_logs",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(|e| TelemetryError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT app_identifier, COUNT(*) as count
                 FROM download_logs
                 GROUP BY app_identifier
                 ORDER BY count DESC
                 LIMIT 20",
            )
            .map_err(|e| TelemetryError::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(AppHitCount {
                    app_identifier: row.get(0)?,
                    count: row.get(1)?,
                })
            })
            .map_err(|e| TelemetryError::Database(e.to_string()))?;
        let mut top_apps = Vec::new();
        for row in rows {
            top_apps.push(row.map_err(|e| TelemetryError::Database(e.to_string()))?);
        }

        let sql = format!(
            "SELECT {CLIENT_CLASS_SQL} as client_type, COUNT(*) as count
             FROM download_logs
             WHERE user_agent IS NOT NULL
             GROUP BY client_type
             ORDER BY count DESC
             LIMIT 10"
        );
        let mut stmt = stmt_prepare(&conn, &sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ClientHitCount {
                    client: row.get(0)?,
                    count: row.get(1)?,
                })
            })
            .map_err(|e| TelemetryError::Database(e.to_string()))?;
        let mut top_clients = Vec::new();
        for row in rows {
            top_clients.push(row.map_err(|e| TelemetryError::Database(e.to_string()))?);
        }

        Ok(DownloadStats {
            first_date,
            last_date,
            total_downloads,
            top_apps,
            top_clients,
        })
    }

    fn update_stats(&self) -> Result<UpdateStats, TelemetryError> {
        let conn = self.conn.lock().unwrap();

        let (first_date, last_date, total_checks) = conn
            .query_row(
                "SELECT MIN(created_at), MAX(created_at), COUNT(*) FROM update_checks",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(|e| TelemetryError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT app_name, COUNT(*) as count
                 FROM update_checks
                 GROUP BY app_name
                 ORDER BY count DESC
                 LIMIT 20",
            )
            .map_err(|e| TelemetryError::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(AppHitCount {
                    app_identifier: row.get(0)?,
                    count: row.get(1)?,
                })
            })
            .map_err(|e| TelemetryError::Database(e.to_string()))?;
        let mut top_apps = Vec::new();
        for row in rows {
            top_apps.push(row.map_err(|e| TelemetryError::Database(e.to_string()))?);
        }

        let distinct_clients = conn
            .query_row(
                "SELECT COUNT(DISTINCT client_id) FROM update_checks WHERE client_id IS NOT NULL",
                [],
                |row| row.get(0),
            )
            .map_err(|e| TelemetryError::Database(e.to_string()))?;

        Ok(UpdateStats {
            first_date,
            last_date,
            total_checks,
            top_apps,
            distinct_clients,
        })
    }
}

fn stmt_prepare<'a>(
    conn: &'a Connection,
    sql: &str,
) -> Result<rusqlite::Statement<'a>, TelemetryError> {
    conn.prepare(sql)
        .map_err(|e| TelemetryError::Database(e.to_string()))
}
