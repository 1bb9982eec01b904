//! App detail endpoint.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::ErrorResponse;
use crate::state::AppState;

/// GET /api/v1/catalog/details/{id}
pub async fn get_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    // The id arrives as a path segment; anything non-numeric is a client
    // error, not a lookup miss.
    let Ok(id) = id.trim().parse::<i64>() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid or missing app ID")),
        )
            .into_response();
    };

    match state.details().details(id) {
        Ok(Some(details)) => Json(details).into_response(),
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
