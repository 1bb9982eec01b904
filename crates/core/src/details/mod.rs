//! Detail metadata - the full per-app record behind the master listing.

mod sqlite;
mod types;

pub use sqlite::SqliteDetailsStore;
pub use types::*;

/// Trait for detail metadata storage.
pub trait DetailsStore: Send + Sync {
    /// Full detail payload for an app, images included.
    fn details(&self, app_id: i64) -> Result<Option<AppDetails>, DetailsError>;

    /// Just the fields the update-check endpoint needs.
    fn version_info(&self, app_id: i64) -> Result<Option<VersionInfo>, DetailsError>;

    /// Create or replace the metadata row; images are replaced wholesale.
    fn upsert(&self, app_id: i64, details: &AppDetails) -> Result<(), DetailsError>;

    /// Remove metadata and images for an app.
    fn delete(&self, app_id: i64) -> Result<(), DetailsError>;
}
