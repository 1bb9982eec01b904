//! Types for the listing engine.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::{CatalogEntry, EntryStatus};

/// Virtual category driven by the `inRevisionistHistory` flag rather than
/// the entry's primary category.
pub const REVISIONIST_HISTORY: &str = "Revisionist History";
/// Virtual category driven by the `inCuratorsChoice` flag.
pub const CURATORS_CHOICE: &str = "Curator's Choice";

/// Sort order for the master view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Underlying catalog order (stable id order).
    #[default]
    Recent,
    /// Case-insensitive title order.
    Alpha,
    /// Recommendation weight descending, then title.
    Recommended,
}

impl SortOrder {
    /// Parse a sort parameter; anything unrecognized is `Recent`.
    pub fn parse(s: &str) -> Self {
        match s {
            "alpha" => SortOrder::Alpha,
            "recommended" => SortOrder::Recommended,
            _ => SortOrder::Recent,
        }
    }
}

/// Device compatibility filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceFilter {
    #[default]
    All,
    Pixi,
    Pre,
    Pre2,
    Pre3,
    Veer,
    TouchPad,
}

impl DeviceFilter {
    /// Parse a device parameter; unrecognized names degrade to `All`.
    pub fn parse(s: &str) -> Self {
        match s {
            "Pixi" => DeviceFilter::Pixi,
            "Pre" => DeviceFilter::Pre,
            "Pre2" => DeviceFilter::Pre2,
            "Pre3" => DeviceFilter::Pre3,
            "Veer" => DeviceFilter::Veer,
            "TouchPad" => DeviceFilter::TouchPad,
            _ => DeviceFilter::All,
        }
    }

    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        match self {
            DeviceFilter::All => true,
            DeviceFilter::Pixi => entry.pixi,
            DeviceFilter::Pre => entry.pre,
            DeviceFilter::Pre2 => entry.pre2,
            DeviceFilter::Pre3 => entry.pre3,
            DeviceFilter::Veer => entry.veer,
            DeviceFilter::TouchPad => entry.touchpad,
        }
    }
}

/// Fully normalized filter parameters. String-typed booleans and
/// comma-separated lists are resolved at the request-parsing boundary; the
/// engine never sees raw strings.
#[derive(Debug, Clone)]
pub struct ListingFilter {
    pub device: DeviceFilter,
    /// "All", a category name, or one of the virtual categories.
    pub category: String,
    /// Free-text query; empty matches everything.
    pub query: String,
    /// Non-empty vendor id switches the engine into vendor mode.
    pub vendor_id: Option<String>,
    /// Entry ids dropped from the listing outright.
    pub excluded_ids: Vec<i64>,
    /// Vendor ids to exclude, unless `ignore_blacklist` is set.
    pub blacklist: Vec<String>,
    pub ignore_blacklist: bool,
    pub hide_missing: bool,
    pub show_only_missing: bool,
    /// Include adult-flagged entries.
    pub adult: bool,
    pub only_luneos: bool,
    pub sort: SortOrder,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            device: DeviceFilter::All,
            category: "All".to_string(),
            query: String::new(),
            vendor_id: None,
            excluded_ids: Vec::new(),
            blacklist: Vec::new(),
            ignore_blacklist: false,
            hide_missing: false,
            show_only_missing: false,
            adult: false,
            only_luneos: false,
            sort: SortOrder::Recent,
        }
    }
}

/// Result of the filter pass: positions into the sorted master view, plus
/// the per-category counting side channel.
#[derive(Debug, Clone, Default)]
pub struct FilteredView {
    pub positions: Vec<usize>,
    pub app_count: BTreeMap<String, i64>,
}

/// How the client addressed the catalog. Precedence is resolved by the
/// caller: explicit ids beat random, random beats the plain window.
#[derive(Debug, Clone)]
pub enum Addressing {
    /// Literal id list; matches come from the full master view in order,
    /// never suppressed by the known set.
    ExplicitIds { requested: Vec<i64> },
    /// One random position was drawn from the filtered list. Delivery runs a
    /// window from there with known-set suppression off, and the chosen item
    /// carries its detail payload.
    Random { offset: usize, count: usize },
    /// Plain offset/window addressing over the filtered list.
    Window { top: usize, count: usize },
}

/// An entry as it appears in a listing response, carrying the
/// archived/`_archived` display pair and, for the random item, its detail
/// payload.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveredEntry {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub archived: bool,
    /// Complement of `archived`: set only for `missing` entries.
    #[serde(rename = "_archived")]
    pub missing_archive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl DeliveredEntry {
    pub fn new(entry: CatalogEntry) -> Self {
        let missing = entry.status == EntryStatus::Missing;
        Self {
            entry,
            archived: !missing,
            missing_archive: missing,
            detail: None,
        }
    }
}

/// Everything the handler needs to assemble a listing response.
#[derive(Debug, Clone, Default)]
pub struct ListingPlan {
    /// Positions within the addressed list.
    pub return_indices: Vec<usize>,
    /// Entry ids corresponding to `return_indices`. Also exactly the set
    /// unioned into the session's known ids afterwards.
    pub ids: Vec<i64>,
    /// Full payloads, or `None` where the client already holds the entry.
    pub items: Vec<Option<DeliveredEntry>>,
    /// First-letter jump table.
    pub first_position: BTreeMap<String, usize>,
    /// Size of the addressed list (filtered size, or requested-id count in
    /// explicit mode).
    pub list_count: usize,
    /// Set in random mode: the drawn position.
    pub random_offset: Option<usize>,
    /// Set in random mode: the id whose detail payload should be attached.
    pub detail_for: Option<i64>,
}
