//! Master catalog listing endpoint.
//!
//! This is the endpoint legacy clients page the archive through. All
//! parameters arrive as strings (including booleans); normalization into
//! typed values happens here, before any engine logic runs. The engine
//! itself is pure - this handler loads the master view and the session's
//! known set, plans the delivery, attaches the random item's detail payload,
//! then grows the session and runs the retention sweep.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rand::Rng;
use serde::Serialize;
use tracing::warn;

use museum_core::listing::{self, Addressing, DeliveredEntry, DeviceFilter, ListingFilter, SortOrder};
use museum_core::metrics::{
    ENTRIES_DELIVERED, ENTRIES_SUPPRESSED, LISTING_REQUESTS, SESSIONS_EXPIRED,
};

use super::ErrorResponse;
use crate::state::AppState;

/// Raw query parameters, also echoed back verbatim in the response.
pub type RawParams = BTreeMap<String, String>;

#[derive(Debug, Serialize)]
pub struct MasterResponse {
    pub return_indices: Vec<usize>,
    pub indices: Vec<i64>,
    pub data: Vec<Option<DeliveredEntry>>,
    pub first_position: BTreeMap<String, usize>,
    pub request: RawParams,
    #[serde(rename = "extraData")]
    pub extra_data: ExtraData,
    #[serde(rename = "appCount")]
    pub app_count: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct ExtraData {
    #[serde(rename = "listCount")]
    pub list_count: usize,
    #[serde(rename = "randomOffset", skip_serializing_if = "Option::is_none")]
    pub random_offset: Option<usize>,
}

/// Shape of the short-circuit response: just the two empty arrays.
#[derive(Debug, Serialize)]
struct EmptyResponse {
    indices: Vec<i64>,
    data: Vec<Option<DeliveredEntry>>,
}

/// GET /api/v1/catalog/master
pub async fn master_listing(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RawParams>,
) -> Response {
    // A missing/blank session key or a negative page short-circuits to an
    // empty success response. The known set is untouched, but the retention
    // sweep still runs.
    let key = params
        .get("key")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let page: i64 = params
        .get("page")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    if key.is_empty() || page < 0 {
        LISTING_REQUESTS.with_label_values(&["short_circuit"]).inc();
        run_cleanup(&state);
        return Json(EmptyResponse {
            indices: Vec::new(),
            data: Vec::new(),
        })
        .into_response();
    }

    let mut filter = parse_filter(&params);
    if filter.show_only_missing {
        filter.hide_missing = false;
    }

    let use_app_id = parse_bool(&params, "useAppId");
    let app_ids_raw = split_list(&params, "appIds");
    let count: usize = params
        .get("count")
        .and_then(|s| s.parse().ok())
        .filter(|c| *c > 0)
        .unwrap_or_else(|| state.default_page_size());
    let index: Option<i64> = params.get("index").and_then(|s| s.parse().ok());

    // Session-store trouble degrades to a fresh, empty session.
    let known: HashSet<i64> = match state.sessions().known_ids(&key) {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Session load failed for key {}: {}", key, e);
            HashSet::new()
        }
    };

    let mut master = match state.catalog().master_view() {
        Ok(master) => master,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response();
        }
    };
    listing::sort_entries(&mut master, filter.sort);
    let view = listing::build_view(&master, &filter);

    // Addressing precedence: explicit id list, then random, then the window.
    let is_random = app_ids_raw.len() == 1 && app_ids_raw[0] == "random";
    let addressing = if use_app_id && !is_random {
        LISTING_REQUESTS.with_label_values(&["explicit"]).inc();
        Addressing::ExplicitIds {
            requested: app_ids_raw.iter().filter_map(|s| s.parse().ok()).collect(),
        }
    } else if is_random && !view.positions.is_empty() {
        LISTING_REQUESTS.with_label_values(&["random"]).inc();
        let offset = rand::thread_rng().gen_range(0..view.positions.len());
        Addressing::Random { offset, count }
    } else {
        LISTING_REQUESTS.with_label_values(&["window"]).inc();
        let (top, count) = if filter.vendor_id.is_some() {
            // Vendor requests come back in a single page.
            (0, view.positions.len())
        } else if let Some(idx) = index {
            // Explicit single-index override; a negative index yields an
            // empty window.
            (idx.try_into().unwrap_or(usize::MAX), 1)
        } else {
            ((page as usize).saturating_mul(count), count)
        };
        Addressing::Window { top, count }
    };

    let mut plan = listing::plan(&master, &view, &addressing, &known);

    // The random item carries its full detail payload inline.
    if let Some(detail_id) = plan.detail_for {
        attach_detail(&state, &mut plan.items, detail_id);
    }

    let delivered = plan.items.iter().filter(|item| item.is_some()).count();
    ENTRIES_DELIVERED.inc_by(delivered as u64);
    ENTRIES_SUPPRESSED.inc_by((plan.items.len() - delivered) as u64);

    // Union the response's ids into the known set. The set only grows.
    let mut known = known;
    known.extend(plan.ids.iter().copied());
    if let Err(e) = state.sessions().store_known_ids(&key, &known) {
        warn!("Session store failed for key {}: {}", key, e);
    }

    let response = MasterResponse {
        return_indices: plan.return_indices,
        indices: plan.ids,
        data: plan.items,
        first_position: plan.first_position,
        request: params,
        extra_data: ExtraData {
            list_count: plan.list_count,
            random_offset: plan.random_offset,
        },
        app_count: view.app_count,
    };

    run_cleanup(&state);
    Json(response).into_response()
}

fn parse_filter(params: &RawParams) -> ListingFilter {
    ListingFilter {
        device: DeviceFilter::parse(params.get("device").map(String::as_str).unwrap_or("All")),
        category: params
            .get("category")
            .cloned()
            .unwrap_or_else(|| "All".to_string()),
        query: params.get("query").cloned().unwrap_or_default(),
        vendor_id: params.get("vendorId").cloned().filter(|v| !v.is_empty()),
        excluded_ids: split_ids(params, "excluded_appIds"),
        blacklist: split_list(params, "blacklist"),
        ignore_blacklist: parse_bool(params, "ignore_blacklist"),
        hide_missing: parse_bool(params, "hide_missing"),
        show_only_missing: parse_bool(params, "show_only_missing"),
        adult: parse_bool(params, "adult"),
        only_luneos: parse_bool(params, "onlyLuneOS"),
        sort: SortOrder::parse(params.get("sort").map(String::as_str).unwrap_or("recent")),
    }
}

/// Stringly-typed booleans: only a case-insensitive "true" counts.
fn parse_bool(params: &RawParams, name: &str) -> bool {
    params
        .get(name)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn split_list(params: &RawParams, name: &str) -> Vec<String> {
    params
        .get(name)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn split_ids(params: &RawParams, name: &str) -> Vec<i64> {
    split_list(params, name)
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect()
}

fn attach_detail(state: &AppState, items: &mut [Option<DeliveredEntry>], detail_id: i64) {
    match state.details().details(detail_id) {
        Ok(Some(details)) => match serde_json::to_value(&details) {
            Ok(value) => {
                if let Some(item) = items
                    .iter_mut()
                    .flatten()
                    .find(|item| item.entry.id == detail_id)
                {
                    item.detail = Some(value);
                }
            }
            Err(e) => warn!("Detail serialization failed for app {}: {}", detail_id, e),
        },
        Ok(None) => {}
        Err(e) => warn!("Detail lookup failed for app {}: {}", detail_id, e),
    }
}

/// Opportunistic retention sweep; runs on every request, including the
/// short-circuit path. Failures never surface to the client.
fn run_cleanup(state: &AppState) {
    match state.sessions().cleanup_expired(state.session_retention()) {
        Ok(removed) if removed > 0 => SESSIONS_EXPIRED.inc_by(removed as u64),
        Ok(_) => {}
        Err(e) => warn!("Session cleanup failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> RawParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_bool_accepts_true_variants() {
        let p = params(&[("a", "true"), ("b", "TRUE"), ("c", "false"), ("d", "1")]);
        assert!(parse_bool(&p, "a"));
        assert!(parse_bool(&p, "b"));
        assert!(!parse_bool(&p, "c"));
        assert!(!parse_bool(&p, "d"));
        assert!(!parse_bool(&p, "missing"));
    }

    #[test]
    fn test_split_list_drops_empties() {
        let p = params(&[("blacklist", "v-1, v-2,,v-3 ")]);
        assert_eq!(split_list(&p, "blacklist"), vec!["v-1", "v-2", "v-3"]);
        assert!(split_list(&p, "missing").is_empty());

        let p = params(&[("blacklist", "")]);
        assert!(split_list(&p, "blacklist").is_empty());
    }

    #[test]
    fn test_split_ids_skips_non_numeric() {
        let p = params(&[("excluded_appIds", "1,two,3")]);
        assert_eq!(split_ids(&p, "excluded_appIds"), vec![1, 3]);
    }

    #[test]
    fn test_parse_filter_defaults() {
        let filter = parse_filter(&params(&[]));
        assert_eq!(filter.device, DeviceFilter::All);
        assert_eq!(filter.category, "All");
        assert!(filter.query.is_empty());
        assert!(filter.vendor_id.is_none());
        assert_eq!(filter.sort, SortOrder::Recent);
    }

    #[test]
    fn test_parse_filter_blank_vendor_is_none() {
        let filter = parse_filter(&params(&[("vendorId", "")]));
        assert!(filter.vendor_id.is_none());
    }

    #[test]
    fn test_parse_filter_unknown_device_degrades_to_all() {
        let filter = parse_filter(&params(&[("device", "Treo")]));
        assert_eq!(filter.device, DeviceFilter::All);
    }
}
