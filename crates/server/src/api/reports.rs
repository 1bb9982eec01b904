//! Telemetry report endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::ErrorResponse;
use crate::state::AppState;

/// GET /api/v1/reports/downloads
pub async fn download_report(State(state): State<Arc<AppState>>) -> Response {
    match state.telemetry().download_stats() {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}

/// GET /api/v1/reports/updates
pub async fn update_report(State(state): State<Arc<AppState>>) -> Response {
    match state.telemetry().update_stats() {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}
