//! Update-check endpoint.
//!
//! Clients poll this with an app name or id and get back the latest version
//! plus a download URI. Every lookup is also recorded as an update check.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use museum_core::metrics::UPDATE_CHECKS_RECORDED;
use museum_core::UpdateCheckRecord;

use super::telemetry::client_ip;
use super::ErrorResponse;
use crate::state::AppState;

/// Names under which clients historically asked about the catalog app
/// itself; they all resolve to app id 0.
const SELF_ALIASES: &[&str] = &[
    "0",
    "app museum",
    "app museum 2",
    "app museum ii",
    "appmuseum",
    "appmuseum2",
    "appmuseumii",
    "appmuseum.museumapp",
];

const SELF_APP_NAME: &str = "app museum 2";

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: Option<String>,
    #[serde(rename = "versionNote")]
    pub version_note: Option<String>,
    #[serde(rename = "lastModifiedTime")]
    pub last_modified_time: Option<String>,
    #[serde(rename = "downloadURI")]
    pub download_uri: Option<String>,
}

/// GET /api/v1/catalog/version
pub async fn latest_version(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<BTreeMap<String, String>>,
) -> Response {
    let Some(raw) = params.get("app").filter(|v| !v.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Missing app parameter")),
        )
            .into_response();
    };
    let needle = raw.trim().to_lowercase();

    // Device info comes from the explicit parameter, falling back to the
    // user agent (commas stripped to keep log exports parseable).
    let device_info = params.get("device").cloned().or_else(|| {
        headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|ua| ua.replace(',', ""))
    });
    let client_id = params
        .get("client")
        .or_else(|| params.get("clientid"))
        .cloned();

    let app_id = if SELF_ALIASES.contains(&needle.as_str()) {
        log_update_check(&state, SELF_APP_NAME, &device_info, &client_id, &headers);
        Some(0)
    } else {
        log_update_check(&state, &needle, &device_info, &client_id, &headers);
        // A "/1.2.3" version suffix may ride along on the name.
        let base = needle.split('/').next().unwrap_or(&needle);
        match state.catalog().resolve_identifier(base) {
            Ok(found) => found,
            Err(e) => {
                warn!("Identifier resolution failed for {}: {}", base, e);
                None
            }
        }
    };

    let Some(app_id) = app_id else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!(
                "No matching app found for {}",
                needle
            ))),
        )
            .into_response();
    };

    match state.details().version_info(app_id) {
        Ok(Some(info)) => Json(VersionResponse {
            version: info.version,
            version_note: last_version_note(info.version_note.as_deref()),
            last_modified_time: info.last_modified_time,
            download_uri: build_download_uri(state.package_host(), info.filename.as_deref()),
        })
        .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("App not found")),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}

fn log_update_check(
    state: &AppState,
    app_name: &str,
    device_info: &Option<String>,
    client_id: &Option<String>,
    headers: &HeaderMap,
) {
    let record = UpdateCheckRecord {
        app_name: app_name.to_string(),
        device_info: device_info.clone(),
        client_id: client_id.clone(),
        ip_address: client_ip(headers),
    };
    match state.telemetry().log_update_check(&record) {
        Ok(()) => UPDATE_CHECKS_RECORDED.inc(),
        Err(e) => warn!("Unable to log update check: {}", e),
    }
}

/// Version notes accumulate one line per release; clients only show the
/// latest line.
fn last_version_note(note: Option<&str>) -> Option<String> {
    note.map(|n| n.split("\r\n").last().unwrap_or(n).to_string())
}

fn build_download_uri(package_host: &str, filename: Option<&str>) -> Option<String> {
    let filename = filename?;
    if filename.contains("://") || package_host.is_empty() {
        Some(filename.to_string())
    } else {
        Some(format!("http://{}/{}", package_host, filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_version_note_takes_last_line() {
        assert_eq!(
            last_version_note(Some("1.0 initial\r\n1.1 fixes\r\n1.2 polish")),
            Some("1.2 polish".to_string())
        );
        assert_eq!(
            last_version_note(Some("only line")),
            Some("only line".to_string())
        );
        assert_eq!(last_version_note(None), None);
    }

    #[test]
    fn test_build_download_uri_prefixes_host() {
        assert_eq!(
            build_download_uri("packages.example.org", Some("app_1.0.ipk")),
            Some("http://packages.example.org/app_1.0.ipk".to_string())
        );
    }

    #[test]
    fn test_build_download_uri_absolute_passthrough() {
        assert_eq!(
            build_download_uri("packages.example.org", Some("https://cdn.example.org/a.ipk")),
            Some("https://cdn.example.org/a.ipk".to_string())
        );
    }

    #[test]
    fn test_build_download_uri_no_host() {
        assert_eq!(
            build_download_uri("", Some("a.ipk")),
            Some("a.ipk".to_string())
        );
        assert_eq!(build_download_uri("host", None), None);
    }

    #[test]
    fn test_self_aliases() {
        assert!(SELF_ALIASES.contains(&"appmuseum2"));
        assert!(SELF_ALIASES.contains(&"0"));
        assert!(!SELF_ALIASES.contains(&"solitaire"));
    }
}
