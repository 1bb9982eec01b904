//! Download telemetry endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use tracing::warn;

use museum_core::metrics::DOWNLOADS_RECORDED;
use museum_core::{is_probe_attempt, DownloadRecord};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadPayload {
    pub appid: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// POST /api/v1/telemetry/downloads
///
/// Always answers 204: telemetry is fire-and-forget, and probe-looking
/// identifiers are dropped without comment.
pub async fn record_download(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<DownloadPayload>,
) -> StatusCode {
    let appid = payload.appid.trim();
    if appid.is_empty() || is_probe_attempt(appid) {
        return StatusCode::NO_CONTENT;
    }

    let source = payload
        .source
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "app".to_string())
        .replace(',', "");

    let record = DownloadRecord {
        app_identifier: appid.to_string(),
        source,
        ip_address: client_ip(&headers),
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    match state.telemetry().log_download(&record) {
        Ok(()) => DOWNLOADS_RECORDED.inc(),
        Err(e) => warn!("Unable to log download: {}", e),
    }

    StatusCode::NO_CONTENT
}

/// Best-effort client address. The service historically sat behind a CDN,
/// so the forwarding headers take precedence over the socket address.
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<String> {
    for name in ["cf-connecting-ip", "client-ip", "x-forwarded-for"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            let first = value.split(',').next().unwrap_or(value).trim();
            if first.parse::<std::net::IpAddr>().is_ok() {
                return Some(first.to_string());
            }
        }
    }
    None
}
