//! Types for per-app detail metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One screenshot/thumbnail pair attached to an app, keyed by display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppImage {
    #[serde(default)]
    pub screenshot: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub orientation: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
}

/// Full detail metadata for one app. Wire names match the legacy per-app
/// JSON files the clients were built against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppDetails {
    #[serde(rename = "publicApplicationId", default)]
    pub public_application_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "versionNote", default)]
    pub version_note: Option<String>,
    #[serde(rename = "homeURL", default)]
    pub home_url: Option<String>,
    #[serde(rename = "supportURL", default)]
    pub support_url: Option<String>,
    #[serde(rename = "custsupportemail", default)]
    pub support_email: Option<String>,
    #[serde(rename = "custsupportphonenum", default)]
    pub support_phone: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(rename = "licenseURL", default)]
    pub license_url: Option<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(rename = "appSize", default)]
    pub app_size: Option<i64>,
    #[serde(rename = "installSize", default)]
    pub install_size: Option<i64>,
    #[serde(rename = "isEncrypted", default)]
    pub is_encrypted: bool,
    #[serde(rename = "adultRating", default)]
    pub adult_rating: bool,
    #[serde(rename = "islocationbased", default)]
    pub is_location_based: bool,
    #[serde(rename = "lastModifiedTime", default)]
    pub last_modified_time: Option<String>,
    #[serde(rename = "mediaLink", default)]
    pub media_link: Option<String>,
    #[serde(rename = "mediaIcon", default)]
    pub media_icon: Option<String>,
    /// Free-form attribute blob carried through verbatim.
    #[serde(default = "default_attributes")]
    pub attributes: serde_json::Value,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(rename = "isAdvertized", default)]
    pub is_advertized: bool,
    /// Package filename; may already be an absolute URI.
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default = "default_true")]
    pub free: bool,
    #[serde(default)]
    pub touchpad_exclusive: bool,
    #[serde(default)]
    pub images: BTreeMap<String, AppImage>,
    #[serde(rename = "originalFileName", default)]
    pub original_filename: Option<String>,
    #[serde(rename = "starRating", default)]
    pub star_rating: Option<i64>,
}

impl Default for AppDetails {
    fn default() -> Self {
        Self {
            public_application_id: None,
            description: None,
            version: None,
            version_note: None,
            home_url: None,
            support_url: None,
            support_email: None,
            support_phone: None,
            copyright: None,
            license_url: None,
            locale: default_locale(),
            app_size: None,
            install_size: None,
            is_encrypted: false,
            adult_rating: false,
            is_location_based: false,
            last_modified_time: None,
            media_link: None,
            media_icon: None,
            attributes: default_attributes(),
            price: 0.0,
            currency: default_currency(),
            is_advertized: false,
            filename: None,
            free: true,
            touchpad_exclusive: false,
            images: BTreeMap::new(),
            original_filename: None,
            star_rating: None,
        }
    }
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_attributes() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

fn default_true() -> bool {
    true
}

/// The slice of metadata the update-check endpoint needs.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: Option<String>,
    #[serde(rename = "versionNote")]
    pub version_note: Option<String>,
    #[serde(rename = "lastModifiedTime")]
    pub last_modified_time: Option<String>,
    #[serde(skip)]
    pub filename: Option<String>,
}

/// Errors for detail metadata operations.
#[derive(Debug, Error)]
pub enum DetailsError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Metadata not found for app {0}")]
    NotFound(i64),
}
