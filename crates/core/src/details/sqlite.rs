//! SQLite-backed detail metadata store.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use super::{AppDetails, AppImage, DetailsError, DetailsStore, VersionInfo};

pub struct SqliteDetailsStore {
    conn: Mutex<Connection>,
}

impl SqliteDetailsStore {
    pub fn new(path: &Path) -> Result<Self, DetailsError> {
        let conn = Connection::open(path).map_err(|e| DetailsError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, DetailsError> {
        let conn =
            Connection::open_in_memory().map_err(|e| DetailsError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DetailsError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS app_metadata (
                app_id INTEGER PRIMARY KEY,
                public_application_id TEXT,
                description TEXT,
                version TEXT,
                version_note TEXT,
                home_url TEXT,
                support_url TEXT,
                cust_support_email TEXT,
                cust_support_phone TEXT,
                copyright TEXT,
                license_url TEXT,
                locale TEXT NOT NULL DEFAULT 'en_US',
                app_size INTEGER,
                install_size INTEGER,
                is_encrypted INTEGER NOT NULL DEFAULT 0,
                adult_rating INTEGER NOT NULL DEFAULT 0,
                is_location_based INTEGER NOT NULL DEFAULT 0,
                last_modified_time TEXT,
                media_link TEXT,
                media_icon TEXT,
                attributes TEXT,
                price REAL NOT NULL DEFAULT 0,
                currency TEXT NOT NULL DEFAULT 'USD',
                is_advertized INTEGER NOT NULL DEFAULT 0,
                filename TEXT,
                free INTEGER NOT NULL DEFAULT 1,
                touchpad_exclusive INTEGER NOT NULL DEFAULT 0,
                original_filename TEXT,
                star_rating INTEGER
            );

            CREATE TABLE IF NOT EXISTS app_images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                app_id INTEGER NOT NULL REFERENCES app_metadata(app_id) ON DELETE CASCADE,
                image_order INTEGER NOT NULL,
                screenshot_path TEXT,
                thumbnail_path TEXT,
                orientation TEXT,
                device TEXT,
                UNIQUE(app_id, image_order)
            );

            CREATE INDEX IF NOT EXISTS idx_app_images_app ON app_images(app_id);
            "#,
        )
        .map_err(|e| DetailsError::Database(e.to_string()))?;

        Ok(())
    }

    fn load_images(
        conn: &Connection,
        app_id: i64,
    ) -> Result<BTreeMap<String, AppImage>, DetailsError> {
        let mut stmt = conn
            .prepare(
                "SELECT image_order, screenshot_path, thumbnail_path, orientation, device
                 FROM app_images WHERE app_id = ? ORDER BY image_order",
            )
            .map_err(|e| DetailsError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![app_id], |row| {
                let order: i64 = row.get(0)?;
                Ok((
                    order.to_string(),
                    AppImage {
                        screenshot: row.get(1)?,
                        thumbnail: row.get(2)?,
                        orientation: row.get(3)?,
                        device: row.get(4)?,
                    },
                ))
            })
            .map_err(|e| DetailsError::Database(e.to_string()))?;

        let mut images = BTreeMap::new();
        for row in rows {
            let (key, image) = row.map_err(|e| DetailsError::Database(e.to_string()))?;
            images.insert(key, image);
        }
        Ok(images)
    }

    fn row_to_details(row: &rusqlite::Row) -> rusqlite::Result<AppDetails> {
        let attributes: Option<String> = row.get(20)?;
        let attributes = attributes
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));

        Ok(AppDetails {
            public_application_id: row.get(1)?,
            description: row.get(2)?,
            version: row.get(3)?,
            version_note: row.get(4)?,
            home_url: row.get(5)?,
            support_url: row.get(6)?,
            support_email: row.get(7)?,
            support_phone: row.get(8)?,
            copyright: row.get(9)?,
            license_url: row.get(10)?,
            locale: row.get(11)?,
            app_size: row.get(12)?,
            install_size: row.get(13)?,
            is_encrypted: row.get(14)?,
            adult_rating: row.get(15)?,
            is_location_based: row.get(16)?,
            last_modified_time: row.get(17)?,
            media_link: row.get(18)?,
            media_icon: row.get(19)?,
            attributes,
            price: row.get(21)?,
            currency: row.get(22)?,
            is_advertized: row.get(23)?,
            filename: row.get(24)?,
            free: row.get(25)?,
            touchpad_exclusive: row.get(26)?,
            images: BTreeMap::new(), // loaded separately
            original_filename: row.get(27)?,
            star_rating: row.get(28)?,
        })
    }
}

impl DetailsStore for SqliteDetailsStore {
    fn details(&self, app_id: i64) -> Result<Option<AppDetails>, DetailsError> {
        let conn = self.conn.lock().unwrap();

        let details = conn
            .query_row(
                "SELECT app_id, public_application_id, description, version, version_note,
                        home_url, support_url, cust_support_email, cust_support_phone,
                        copyright, license_url, locale, app_size, install_size,
                        is_encrypted, adult_rating, is_location_based, last_modified_time,
                        media_link, media_icon, attributes, price, currency, is_advertized,
                        filename, free, touchpad_exclusive, original_filename, star_rating
                 FROM app_metadata WHERE app_id = ?",
                params![app_id],
                Self::row_to_details,
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                _ => Err(DetailsError::Database(e.to_string())),
            })?;

        let Some(mut details) = details else {
            return Ok(None);
        };
        details.images = Self::load_images(&conn, app_id)?;
        Ok(Some(details))
    }

    fn version_info(&self, app_id: i64) -> Result<Option<VersionInfo>, DetailsError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT version, version_note, last_modified_time, filename
             FROM app_metadata WHERE app_id = ?",
            params![app_id],
            |row| {
                Ok(VersionInfo {
                    version: row.get(0)?,
                    version_note: row.get(1)?,
                    last_modified_time: row.get(2)?,
                    filename: row.get(3)?,
                })
            },
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            _ => Err(DetailsError::Database(e.to_string())),
        })
    }

    fn upsert(&self, app_id: i64, details: &AppDetails) -> Result<(), DetailsError> {
        let attributes = serde_json::to_string(&details.attributes)
            .map_err(|e| DetailsError::Database(e.to_string()))?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO app_metadata (
                app_id, public_application_id, description, version, version_note,
                home_url, support_url, cust_support_email, cust_support_phone,
                copyright, license_url, locale, app_size, install_size,
                is_encrypted, adult_rating, is_location_based, last_modified_time,
                media_link, media_icon, attributes, price, currency, is_advertized,
                filename, free, touchpad_exclusive, original_filename, star_rating
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(app_id) DO UPDATE SET
                public_application_id = excluded.public_application_id,
                description = excluded.description,
                version = excluded.version,
                version_note = excluded.version_note,
                home_url = excluded.home_url,
                support_url = excluded.support_url,
                cust_support_email = excluded.cust_support_email,
                cust_support_phone = excluded.cust_support_phone,
                copyright = excluded.copyright,
                license_url = excluded.license_url,
                locale = excluded.locale,
                app_size = excluded.app_size,
                install_size = excluded.install_size,
                is_encrypted = excluded.is_encrypted,
                adult_rating = excluded.adult_rating,
                is_location_based = excluded.is_location_based,
                last_modified_time = excluded.last_modified_time,
                media_link = excluded.media_link,
                media_icon = excluded.media_icon,
                attributes = excluded.attributes,
                price = excluded.price,
                currency = excluded.currency,
                is_advertized = excluded.is_advertized,
                filename = excluded.filename,
                free = excluded.free,
                touchpad_exclusive = excluded.touchpad_exclusive,
                original_filename = excluded.original_filename,
                star_rating = excluded.star_rating",
            params![
                app_id,
                details.public_application_id,
                details.description,
                details.version,
                details.version_note,
                details.home_url,
                details.support_url,
                details.support_email,
                details.support_phone,
                details.copyright,
                details.license_url,
                details.locale,
                details.app_size,
                details.install_size,
                details.is_encrypted,
                details.adult_rating,
                details.is_location_based,
                details.last_modified_time,
                details.media_link,
                details.media_icon,
                attributes,
                details.price,
                details.currency,
                details.is_advertized,
                details.filename,
                details.free,
                details.touchpad_exclusive,
                details.original_filename,
                details.star_rating,
            ],
        )
        .map_err(|e| DetailsError::Database(e.to_string()))?;

        // Images are replaced wholesale on every upsert.
        conn.execute("DELETE FROM app_images WHERE app_id = ?", params![app_id])
            .map_err(|e| DetailsError::Database(e.to_string()))?;

        for (order, image) in &details.images {
            let order: i64 = order.parse().unwrap_or(0);
            conn.execute(
                "INSERT INTO app_images
                    (app_id, image_order, screenshot_path, thumbnail_path, orientation, device)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    app_id,
                    order,
                    image.screenshot,
                    image.thumbnail,
                    image.orientation,
                    image.device,
                ],
            )
            .map_err(|e| DetailsError::Database(e.to_string()))?;
        }

        Ok(())
    }

    fn delete(&self, app_id: i64) -> Result<(), DetailsError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM app_images WHERE app_id = ?", params![app_id])
            .map_err(|e| DetailsError::Database(e.to_string()))?;
        let affected = conn
            .execute("DELETE FROM app_metadata WHERE app_id = ?", params![app_id])
            .map_err(|e| DetailsError::Database(e.to_string()))?;

        if affected == 0 {
            return Err(DetailsError::NotFound(app_id));
        }
        Ok(())
    }
}
