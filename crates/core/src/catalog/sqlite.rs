//! SQLite-backed app catalog implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use super::{AdminQuery, CatalogEntry, CatalogError, CatalogStore, Category, EntryStatus};

/// Column list shared by every query that materializes a [`CatalogEntry`].
/// Keep in sync with [`row_to_entry`].
const ENTRY_COLUMNS: &str = "a.id, a.title, a.author, a.summary, a.app_icon, a.app_icon_big, \
     c.name, a.vendor_id, a.pixi, a.pre, a.pre2, a.pre3, a.veer, a.touchpad, \
     a.touchpad_exclusive, a.luneos, a.adult, a.recommendation_order, \
     a.in_revisionist_history, a.in_curators_choice, a.status";

static SEARCH_SCRUB: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9 ]+").unwrap());

/// Strip a search term down to lowercase alphanumerics and spaces.
pub fn sanitize_search(term: &str) -> String {
    let lowered = term.to_lowercase();
    SEARCH_SCRUB.replace_all(&lowered, "").trim().to_string()
}

/// SQLite-backed app catalog.
pub struct SqliteCatalogStore {
    conn: Mutex<Connection>,
}

impl SqliteCatalogStore {
    /// Open (creating tables if needed) against a database file.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                display_order INTEGER NOT NULL DEFAULT 0
            );

            -- One row per archived application
            CREATE TABLE IF NOT EXISTS apps (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT NOT NULL DEFAULT '',
                summary TEXT NOT NULL DEFAULT '',
                app_icon TEXT NOT NULL DEFAULT '',
                app_icon_big TEXT NOT NULL DEFAULT '',
                category_id INTEGER REFERENCES categories(id),
                vendor_id TEXT,
                pixi INTEGER NOT NULL DEFAULT 0,
                pre INTEGER NOT NULL DEFAULT 0,
                pre2 INTEGER NOT NULL DEFAULT 0,
                pre3 INTEGER NOT NULL DEFAULT 0,
                veer INTEGER NOT NULL DEFAULT 0,
                touchpad INTEGER NOT NULL DEFAULT 0,
                touchpad_exclusive INTEGER NOT NULL DEFAULT 0,
                luneos INTEGER NOT NULL DEFAULT 0,
                adult INTEGER NOT NULL DEFAULT 0,
                recommendation_order INTEGER NOT NULL DEFAULT 0,
                in_revisionist_history INTEGER NOT NULL DEFAULT 0,
                in_curators_choice INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'active',
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_apps_title ON apps(title);
            CREATE INDEX IF NOT EXISTS idx_apps_status ON apps(status);
            CREATE INDEX IF NOT EXISTS idx_apps_vendor ON apps(vendor_id);
            "#,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    /// Resolve a category name to its id, creating the row on first use.
    fn category_id(conn: &Connection, name: &str) -> Result<Option<i64>, CatalogError> {
        if name.is_empty() {
            return Ok(None);
        }
        conn.execute(
            "INSERT OR IGNORE INTO categories (name) VALUES (?)",
            params![name],
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;
        let id = conn
            .query_row(
                "SELECT id FROM categories WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        Ok(Some(id))
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<CatalogEntry> {
        let category: Option<String> = row.get(6)?;
        let status: String = row.get(20)?;

        Ok(CatalogEntry {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            summary: row.get(3)?,
            app_icon: row.get(4)?,
            app_icon_big: row.get(5)?,
            category: category.unwrap_or_default(),
            vendor_id: row.get(7)?,
            pixi: row.get(8)?,
            pre: row.get(9)?,
            pre2: row.get(10)?,
            pre3: row.get(11)?,
            veer: row.get(12)?,
            touchpad: row.get(13)?,
            touchpad_exclusive: row.get(14)?,
            luneos: row.get(15)?,
            adult: row.get(16)?,
            recommendation_order: row.get(17)?,
            in_revisionist_history: row.get(18)?,
            in_curators_choice: row.get(19)?,
            status: EntryStatus::parse(&status),
        })
    }

    fn collect_entries(
        conn: &Connection,
        sql: &str,
        sql_params: Vec<Value>,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(sql_params), Self::row_to_entry)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(entries)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn master_view(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT {ENTRY_COLUMNS}
             FROM apps a
             LEFT JOIN categories c ON a.category_id = c.id
             WHERE a.status IN ('active', 'missing')
             ORDER BY a.id"
        );
        Self::collect_entries(&conn, &sql, Vec::new())
    }

    fn get(&self, id: i64) -> Result<Option<CatalogEntry>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT {ENTRY_COLUMNS}
             FROM apps a
             LEFT JOIN categories c ON a.category_id = c.id
             WHERE a.id = ?"
        );
        let mut entries = Self::collect_entries(&conn, &sql, vec![Value::Integer(id)])?;
        Ok(entries.pop())
    }

    fn search_by_title(
        &self,
        term: &str,
        adult: bool,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let term = sanitize_search(term);
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock().unwrap();
        let id_match: i64 = term.parse().unwrap_or(0);
        let pattern = format!("%{}%", term);
        let stripped_pattern = format!("%{}%", term.replace(' ', ""));

        let mut sql = format!(
            "SELECT {ENTRY_COLUMNS}
             FROM apps a
             LEFT JOIN categories c ON a.category_id = c.id
             WHERE a.status IN ('active', 'missing')
               AND (
                   LOWER(a.title) = ?1
                   OR a.id = ?2
                   OR LOWER(a.title) LIKE ?3
                   OR LOWER(REPLACE(a.title, ' ', '')) LIKE ?4
               )"
        );
        if !adult {
            sql.push_str(" AND a.adult = 0");
        }
        // Relevance: exact title, then id match, then substring.
        sql.push_str(
            " ORDER BY CASE
                 WHEN LOWER(a.title) = ?1 THEN 1
                 WHEN a.id = ?2 THEN 2
                 ELSE 3
             END, a.title",
        );

        Self::collect_entries(
            &conn,
            &sql,
            vec![
                Value::Text(term.clone()),
                Value::Integer(id_match),
                Value::Text(pattern),
                Value::Text(stripped_pattern),
            ],
        )
    }

    fn search_by_author(
        &self,
        term: &str,
        adult: bool,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let term = sanitize_search(term);
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock().unwrap();
        let pattern = format!("%{}%", term);
        let stripped = term.replace(' ', "");
        let stripped_pattern = format!("%{}%", stripped);

        let mut sql = format!(
            "SELECT {ENTRY_COLUMNS}
             FROM apps a
             LEFT JOIN categories c ON a.category_id = c.id
             WHERE a.status IN ('active', 'missing')
               AND (
                   LOWER(a.author) = ?1
                   OR LOWER(a.author) LIKE ?2
                   OR LOWER(REPLACE(a.author, ' ', '')) = ?3
                   OR LOWER(REPLACE(a.author, ' ', '')) LIKE ?4
               )"
        );
        if !adult {
            sql.push_str(" AND a.adult = 0");
        }
        sql.push_str(" ORDER BY a.title");

        Self::collect_entries(
            &conn,
            &sql,
            vec![
                Value::Text(term),
                Value::Text(pattern),
                Value::Text(stripped),
                Value::Text(stripped_pattern),
            ],
        )
    }

    fn resolve_identifier(&self, needle: &str) -> Result<Option<i64>, CatalogError> {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }
        let id_match: i64 = needle.parse().unwrap_or(-1);

        let conn = self.conn.lock().unwrap();
        let result = conn
            .query_row(
                "SELECT id FROM apps
                 WHERE status IN ('active', 'missing')
                   AND (LOWER(title) = ?1 OR id = ?2)
                 ORDER BY CASE WHEN id = ?2 THEN 1 ELSE 2 END
                 LIMIT 1",
                params![needle, id_match],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                _ => Err(CatalogError::Database(e.to_string())),
            })?;
        Ok(result)
    }

    fn create(&self, entry: &CatalogEntry) -> Result<(), CatalogError> {
        let conn = self.conn.lock().unwrap();
        let category_id = Self::category_id(&conn, &entry.category)?;
        let now = Utc::now().to_rfc3339();

        let result = conn.execute(
            "INSERT INTO apps (
                id, title, author, summary, app_icon, app_icon_big,
                category_id, vendor_id, pixi, pre, pre2, pre3, veer,
                touchpad, touchpad_exclusive, luneos, adult,
                recommendation_order, in_revisionist_history, in_curators_choice,
                status, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.id,
                entry.title,
                entry.author,
                entry.summary,
                entry.app_icon,
                entry.app_icon_big,
                category_id,
                entry.vendor_id,
                entry.pixi,
                entry.pre,
                entry.pre2,
                entry.pre3,
                entry.veer,
                entry.touchpad,
                entry.touchpad_exclusive,
                entry.luneos,
                entry.adult,
                entry.recommendation_order,
                entry.in_revisionist_history,
                entry.in_curators_choice,
                entry.status.as_str(),
                now,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(CatalogError::AlreadyExists(entry.id))
            }
            Err(e) => Err(CatalogError::Database(e.to_string())),
        }
    }

    fn update(&self, entry: &CatalogEntry) -> Result<(), CatalogError> {
        let conn = self.conn.lock().unwrap();
        let category_id = Self::category_id(&conn, &entry.category)?;
        let now = Utc::now().to_rfc3339();

        let affected = conn
            .execute(
                "UPDATE apps SET
                    title = ?, author = ?, summary = ?, app_icon = ?, app_icon_big = ?,
                    category_id = ?, vendor_id = ?, pixi = ?, pre = ?, pre2 = ?, pre3 = ?,
                    veer = ?, touchpad = ?, touchpad_exclusive = ?, luneos = ?, adult = ?,
                    recommendation_order = ?, in_revisionist_history = ?,
                    in_curators_choice = ?, status = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    entry.title,
                    entry.author,
                    entry.summary,
                    entry.app_icon,
                    entry.app_icon_big,
                    category_id,
                    entry.vendor_id,
                    entry.pixi,
                    entry.pre,
                    entry.pre2,
                    entry.pre3,
                    entry.veer,
                    entry.touchpad,
                    entry.touchpad_exclusive,
                    entry.luneos,
                    entry.adult,
                    entry.recommendation_order,
                    entry.in_revisionist_history,
                    entry.in_curators_choice,
                    entry.status.as_str(),
                    now,
                    entry.id,
                ],
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if affected == 0 {
            return Err(CatalogError::NotFound(entry.id));
        }
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<(), CatalogError> {
        let conn = self.conn.lock().unwrap();
        let affected = conn
            .execute("DELETE FROM apps WHERE id = ?", params![id])
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if affected == 0 {
            return Err(CatalogError::NotFound(id));
        }
        Ok(())
    }

    fn admin_list(&self, query: &AdminQuery) -> Result<Vec<CatalogEntry>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let (where_sql, mut sql_params) = admin_where_clause(query);

        let page = query.page.max(1);
        let per_page = query.per_page.max(1);
        let offset = (page - 1) * per_page;

        let sql = format!(
            "SELECT {ENTRY_COLUMNS}
             FROM apps a
             LEFT JOIN categories c ON a.category_id = c.id
             WHERE 1=1{where_sql}
             ORDER BY a.title
             LIMIT ? OFFSET ?"
        );
        sql_params.push(Value::Integer(per_page));
        sql_params.push(Value::Integer(offset));

        Self::collect_entries(&conn, &sql, sql_params)
    }

    fn admin_count(&self, query: &AdminQuery) -> Result<i64, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let (where_sql, sql_params) = admin_where_clause(query);

        let sql = format!(
            "SELECT COUNT(*)
             FROM apps a
             LEFT JOIN categories c ON a.category_id = c.id
             WHERE 1=1{where_sql}"
        );

        conn.query_row(&sql, params_from_iter(sql_params), |row| row.get(0))
            .map_err(|e| CatalogError::Database(e.to_string()))
    }

    fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, display_order FROM categories ORDER BY display_order, name",
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    display_order: row.get(2)?,
                })
            })
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(categories)
    }
}

fn admin_where_clause(query: &AdminQuery) -> (String, Vec<Value>) {
    let mut sql = String::new();
    let mut sql_params = Vec::new();

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        sql.push_str(" AND (a.title LIKE ? OR a.author LIKE ? OR a.id = ?)");
        let pattern = format!("%{}%", search);
        sql_params.push(Value::Text(pattern.clone()));
        sql_params.push(Value::Text(pattern));
        sql_params.push(Value::Integer(search.parse().unwrap_or(0)));
    }
    if let Some(status) = query.status {
        sql.push_str(" AND a.status = ?");
        sql_params.push(Value::Text(status.as_str().to_string()));
    }
    if let Some(category) = query.category.as_deref().filter(|s| !s.is_empty()) {
        sql.push_str(" AND c.name = ?");
        sql_params.push(Value::Text(category.to_string()));
    }

    (sql, sql_params)
}
