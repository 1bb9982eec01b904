//! Admin CRUD endpoints. Everything here sits behind the auth middleware.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use museum_core::{AdminQuery, AppDetails, CatalogEntry, CatalogError, Category, EntryStatus};

use super::{ErrorResponse, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct AdminListResponse {
    pub apps: Vec<CatalogEntry>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct SessionStatsResponse {
    pub total_sessions: i64,
    pub active_last_hour: i64,
}

/// GET /api/v1/admin/apps
pub async fn list_apps(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AdminListParams>,
) -> Response {
    let query = AdminQuery {
        search: params.search.clone().filter(|s| !s.is_empty()),
        status: params
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(EntryStatus::parse),
        category: params.category.clone().filter(|s| !s.is_empty()),
        page: params.page.max(1),
        per_page: params.per_page.clamp(1, 500),
    };

    let apps = match state.catalog().admin_list(&query) {
        Ok(apps) => apps,
        Err(e) => return internal_error(e),
    };
    match state.catalog().admin_count(&query) {
        Ok(total) => Json(AdminListResponse {
            apps,
            total,
            page: query.page,
            per_page: query.per_page,
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// POST /api/v1/admin/apps
pub async fn create_app(
    State(state): State<Arc<AppState>>,
    Json(entry): Json<CatalogEntry>,
) -> Response {
    match state.catalog().create(&entry) {
        Ok(()) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(CatalogError::AlreadyExists(id)) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(format!("App {} already exists", id))),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// PUT /api/v1/admin/apps/{id}
pub async fn update_app(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(mut entry): Json<CatalogEntry>,
) -> Response {
    // The path wins over whatever id rode along in the body.
    entry.id = id;
    match state.catalog().update(&entry) {
        Ok(()) => Json(entry).into_response(),
        Err(CatalogError::NotFound(id)) => not_found(id),
        Err(e) => internal_error(e),
    }
}

/// DELETE /api/v1/admin/apps/{id}
pub async fn delete_app(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    match state.catalog().delete(id) {
        Ok(()) => {
            // Detail metadata goes with the app; absence is fine.
            let _ = state.details().delete(id);
            Json(SuccessResponse {
                message: format!("Deleted app {}", id),
            })
            .into_response()
        }
        Err(CatalogError::NotFound(id)) => not_found(id),
        Err(e) => internal_error(e),
    }
}

/// PUT /api/v1/admin/apps/{id}/details
pub async fn upsert_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(details): Json<AppDetails>,
) -> Response {
    match state.catalog().get(id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(id),
        Err(e) => return internal_error(e),
    }

    match state.details().upsert(id, &details) {
        Ok(()) => Json(SuccessResponse {
            message: format!("Stored metadata for app {}", id),
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/v1/admin/categories
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Response {
    match state.catalog().categories() {
        Ok(categories) => Json(CategoriesResponse { categories }).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/v1/admin/sessions/stats
pub async fn session_stats(State(state): State<Arc<AppState>>) -> Response {
    let total = state.sessions().session_count();
    let active = state
        .sessions()
        .active_session_count(chrono::Duration::hours(1));

    match (total, active) {
        (Ok(total_sessions), Ok(active_last_hour)) => Json(SessionStatsResponse {
            total_sessions,
            active_last_hour,
        })
        .into_response(),
        (Err(e), _) | (_, Err(e)) => internal_error(e),
    }
}

fn not_found(id: i64) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!("App not found: {}", id))),
    )
        .into_response()
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(e.to_string())),
    )
        .into_response()
}
