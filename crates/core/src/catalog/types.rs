//! Types for the app catalog.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of a catalog entry.
///
/// `Active` entries are normal archive members, `Missing` entries have no
/// package on file (they still appear in listings unless filtered), and
/// `Archived` entries are retired from the public catalog entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Active,
    Missing,
    Archived,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Active => "active",
            EntryStatus::Missing => "missing",
            EntryStatus::Archived => "archived",
        }
    }

    /// Parse a stored status string; unknown values fall back to `Active`.
    pub fn parse(s: &str) -> Self {
        match s {
            "missing" => EntryStatus::Missing,
            "archived" => EntryStatus::Archived,
            _ => EntryStatus::Active,
        }
    }
}

/// One archived application record.
///
/// Field wire names are pinned to the legacy client format, hence the mixed
/// casing in the serde renames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Stable numeric identifier. Uniqueness is what makes the incremental
    /// session delivery sound.
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "appIcon", default)]
    pub app_icon: String,
    #[serde(rename = "appIconBig", default)]
    pub app_icon_big: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "vendorId", default)]
    pub vendor_id: Option<String>,
    #[serde(rename = "Pixi", default)]
    pub pixi: bool,
    #[serde(rename = "Pre", default)]
    pub pre: bool,
    #[serde(rename = "Pre2", default)]
    pub pre2: bool,
    #[serde(rename = "Pre3", default)]
    pub pre3: bool,
    #[serde(rename = "Veer", default)]
    pub veer: bool,
    #[serde(rename = "TouchPad", default)]
    pub touchpad: bool,
    #[serde(default)]
    pub touchpad_exclusive: bool,
    #[serde(rename = "LuneOS", default)]
    pub luneos: bool,
    #[serde(rename = "Adult", default)]
    pub adult: bool,
    #[serde(rename = "recommendationOrder", default)]
    pub recommendation_order: i64,
    #[serde(rename = "inRevisionistHistory", default)]
    pub in_revisionist_history: bool,
    #[serde(rename = "inCuratorsChoice", default)]
    pub in_curators_choice: bool,
    #[serde(default)]
    pub status: EntryStatus,
}

/// A category row (admin surface).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub display_order: i64,
}

/// Filter for the admin listing.
#[derive(Debug, Clone, Default)]
pub struct AdminQuery {
    /// Substring match against title/author, or an exact id when numeric.
    pub search: Option<String>,
    pub status: Option<EntryStatus>,
    pub category: Option<String>,
    /// 1-based page.
    pub page: i64,
    pub per_page: i64,
}

impl AdminQuery {
    pub fn new() -> Self {
        Self {
            search: None,
            status: None,
            category: None,
            page: 1,
            per_page: 50,
        }
    }
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("App not found: {0}")]
    NotFound(i64),

    #[error("App already exists: {0}")]
    AlreadyExists(i64),
}
