use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use super::{admin, details, handlers, master, middleware, reports, search, telemetry, version};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/apps", get(admin::list_apps))
        .route("/apps", post(admin::create_app))
        .route("/apps/{id}", put(admin::update_app))
        .route("/apps/{id}", delete(admin::delete_app))
        .route("/apps/{id}/details", put(admin::upsert_details))
        .route("/categories", get(admin::list_categories))
        .route("/sessions/stats", get(admin::session_stats))
        .route_layer(from_fn_with_state(state.clone(), middleware::admin_auth));

    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Catalog browsing
        .route("/catalog/master", get(master::master_listing))
        .route("/catalog/details/{id}", get(details::get_details))
        .route("/catalog/search", get(search::search))
        .route("/catalog/version", get(version::latest_version))
        // Telemetry
        .route("/telemetry/downloads", post(telemetry::record_download))
        .route("/reports/downloads", get(reports::download_report))
        .route("/reports/updates", get(reports::update_report))
        // Admin
        .nest("/admin", admin_routes)
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(from_fn(middleware::metrics_middleware))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
