//! Test fixtures shared by the core unit tests and the server's
//! integration tests.

use crate::catalog::{CatalogEntry, EntryStatus};
use crate::details::AppDetails;

/// A catalog entry with quiet defaults: active, no device flags, category
/// "Utilities". Tests flip the flags they care about.
pub fn entry(id: i64, title: &str) -> CatalogEntry {
    CatalogEntry {
        id,
        title: title.to_string(),
        author: "Example Author".to_string(),
        summary: String::new(),
        app_icon: String::new(),
        app_icon_big: String::new(),
        category: "Utilities".to_string(),
        vendor_id: None,
        pixi: false,
        pre: false,
        pre2: false,
        pre3: false,
        veer: false,
        touchpad: false,
        touchpad_exclusive: false,
        luneos: false,
        adult: false,
        recommendation_order: 0,
        in_revisionist_history: false,
        in_curators_choice: false,
        status: EntryStatus::Active,
    }
}

/// Detail metadata with just a version and package filename set.
pub fn details(version: &str, filename: &str) -> AppDetails {
    AppDetails {
        version: Some(version.to_string()),
        filename: Some(filename.to_string()),
        ..Default::default()
    }
}
