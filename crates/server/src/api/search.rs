//! Catalog search endpoint.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use museum_core::CatalogEntry;

use super::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search by app title or numeric id.
    #[serde(default)]
    pub app: Option<String>,
    /// Search by author name; wins over `app` when both are present.
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub adult: Option<String>,
    #[serde(rename = "onlyLuneOS", default)]
    pub only_luneos: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub data: Vec<CatalogEntry>,
}

/// GET /api/v1/catalog/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let adult = string_bool(params.adult.as_deref());
    let only_luneos = string_bool(params.only_luneos.as_deref());

    let results = if let Some(author) = params.author.as_deref() {
        state.catalog().search_by_author(author, adult)
    } else if let Some(app) = params.app.as_deref() {
        state.catalog().search_by_title(app, adult)
    } else {
        return Json(SearchResponse { data: Vec::new() }).into_response();
    };

    match results {
        Ok(mut data) => {
            if only_luneos {
                data.retain(|entry| entry.luneos);
            }
            Json(SearchResponse { data }).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}

fn string_bool(value: Option<&str>) -> bool {
    value.map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_bool() {
        assert!(string_bool(Some("true")));
        assert!(string_bool(Some("True")));
        assert!(!string_bool(Some("false")));
        assert!(!string_bool(Some("yes")));
        assert!(!string_bool(None));
    }
}
