//! App catalog - the archive's master record of applications.
//!
//! The catalog is effectively read-only from the listing engine's point of
//! view; mutation happens only through the admin surface.

mod sqlite;
mod types;

pub use sqlite::{sanitize_search, SqliteCatalogStore};
pub use types::*;

/// Trait for catalog storage.
pub trait CatalogStore: Send + Sync {
    /// Load the public master view: `active` and `missing` entries in stable
    /// id order. This is the "recent" ordering every listing starts from.
    fn master_view(&self) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Fetch one entry by id, regardless of status.
    fn get(&self, id: i64) -> Result<Option<CatalogEntry>, CatalogError>;

    /// Search by title or numeric id. The term is scrubbed to alphanumerics
    /// first; results come back in relevance order (exact title, id match,
    /// then substring).
    fn search_by_title(&self, term: &str, adult: bool)
        -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Search by author name (exact, substring, and space-stripped variants).
    fn search_by_author(&self, term: &str, adult: bool)
        -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Resolve an app name or numeric id string to an entry id.
    fn resolve_identifier(&self, needle: &str) -> Result<Option<i64>, CatalogError>;

    /// Insert a new entry (admin). The caller supplies the id.
    fn create(&self, entry: &CatalogEntry) -> Result<(), CatalogError>;

    /// Replace an existing entry (admin).
    fn update(&self, entry: &CatalogEntry) -> Result<(), CatalogError>;

    /// Delete an entry (admin).
    fn delete(&self, id: i64) -> Result<(), CatalogError>;

    /// Paged admin listing with search/status/category filters.
    fn admin_list(&self, query: &AdminQuery) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Total count for the admin listing's pagination.
    fn admin_count(&self, query: &AdminQuery) -> Result<i64, CatalogError>;

    /// All known categories.
    fn categories(&self) -> Result<Vec<Category>, CatalogError>;
}
