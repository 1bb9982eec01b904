//! Endpoint tests for the admin CRUD surface and its authentication.

mod common;

use axum::http::StatusCode;
use museum_core::session::SessionStore;
use serde_json::json;

use common::{entry, TestFixture};

fn app_body(id: i64, title: &str, category: &str) -> serde_json::Value {
    let mut entry = entry(id, title);
    entry.category = category.to_string();
    serde_json::to_value(&entry).unwrap()
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_admin_requires_api_key_when_configured() {
    let fixture = TestFixture::with_api_key("top-secret");

    let response = fixture.get("/api/v1/admin/apps").await;
    assert_status!(response, StatusCode::UNAUTHORIZED);

    let response = fixture
        .get_with_headers("/api/v1/admin/apps", &[("X-API-Key", "wrong")])
        .await;
    assert_status!(response, StatusCode::UNAUTHORIZED);

    let response = fixture
        .get_with_headers("/api/v1/admin/apps", &[("X-API-Key", "top-secret")])
        .await;
    assert_status!(response, StatusCode::OK);

    let response = fixture
        .get_with_headers(
            "/api/v1/admin/apps",
            &[("Authorization", "Bearer top-secret")],
        )
        .await;
    assert_status!(response, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_mutations_honor_api_key() {
    let fixture = TestFixture::with_api_key("top-secret");
    let auth = [("X-API-Key", "top-secret")];

    let response = fixture
        .post("/api/v1/admin/apps", app_body(1, "Guarded", "Games"))
        .await;
    assert_status!(response, StatusCode::UNAUTHORIZED);

    let response = fixture
        .post_with_headers("/api/v1/admin/apps", app_body(1, "Guarded", "Games"), &auth)
        .await;
    assert_status!(response, StatusCode::CREATED);

    let response = fixture
        .put_with_headers(
            "/api/v1/admin/apps/1",
            app_body(1, "Guarded v2", "Games"),
            &auth,
        )
        .await;
    assert_status!(response, StatusCode::OK);

    let response = fixture.delete("/api/v1/admin/apps/1").await;
    assert_status!(response, StatusCode::UNAUTHORIZED);

    let response = fixture
        .delete_with_headers("/api/v1/admin/apps/1", &auth)
        .await;
    assert_status!(response, StatusCode::OK);
}

#[tokio::test]
async fn test_public_routes_stay_open_with_api_key_auth() {
    let fixture = TestFixture::with_api_key("top-secret");
    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
}

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
async fn test_create_and_list_apps() {
    let fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/admin/apps", app_body(1, "Solitaire", "Games"))
        .await;
    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["id"], 1);

    let response = fixture.get("/api/v1/admin/apps").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total"], 1);
    assert_eq!(response.body["apps"][0]["title"], "Solitaire");
}

#[tokio::test]
async fn test_create_duplicate_conflicts() {
    let fixture = TestFixture::new();
    fixture.seed_apps(&[entry(1, "Original")]);

    let response = fixture
        .post("/api/v1/admin/apps", app_body(1, "Duplicate", "Games"))
        .await;
    assert_status!(response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_app() {
    let fixture = TestFixture::new();
    fixture.seed_apps(&[entry(1, "Old Title")]);

    let response = fixture
        .put("/api/v1/admin/apps/1", app_body(999, "New Title", "Games"))
        .await;
    assert_status!(response, StatusCode::OK);
    // The path id wins over the body id
    assert_eq!(response.body["id"], 1);
    assert_eq!(response.body["title"], "New Title");

    let listing = fixture.get("/api/v1/admin/apps?search=New").await;
    assert_eq!(listing.body["total"], 1);
}

#[tokio::test]
async fn test_update_unknown_app() {
    let fixture = TestFixture::new();
    let response = fixture
        .put("/api/v1/admin/apps/5", app_body(5, "Ghost", "Games"))
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_app_removes_details_too() {
    let fixture = TestFixture::new();
    fixture.seed_apps(&[entry(1, "Doomed")]);
    fixture.seed_details(1, &common::details("1.0", "doomed.ipk"));

    let response = fixture.delete("/api/v1/admin/apps/1").await;
    assert_status!(response, StatusCode::OK);

    let response = fixture.get("/api/v1/catalog/details/1").await;
    assert_status!(response, StatusCode::NOT_FOUND);

    let response = fixture.delete("/api/v1/admin/apps/1").await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_list_filters() {
    let fixture = TestFixture::new();
    let mut game = entry(1, "Chess");
    game.category = "Games".to_string();
    let mut util = entry(2, "Calculator");
    util.category = "Utilities".to_string();
    fixture.seed_apps(&[game, util]);

    let response = fixture.get("/api/v1/admin/apps?category=Games").await;
    assert_eq!(response.body["total"], 1);
    assert_eq!(response.body["apps"][0]["title"], "Chess");

    let response = fixture.get("/api/v1/admin/apps?search=calc").await;
    assert_eq!(response.body["total"], 1);
    assert_eq!(response.body["apps"][0]["title"], "Calculator");
}

#[tokio::test]
async fn test_upsert_details_via_admin() {
    let fixture = TestFixture::new();
    fixture.seed_apps(&[entry(3, "Weather")]);

    let response = fixture
        .put(
            "/api/v1/admin/apps/3/details",
            json!({
                "version": "1.2",
                "versionNote": "1.2 adds radar",
                "filename": "weather_1.2.ipk",
                "description": "Forecasts"
            }),
        )
        .await;
    assert_status!(response, StatusCode::OK);

    // Visible through the public details endpoint
    let response = fixture.get("/api/v1/catalog/details/3").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["version"], "1.2");
    assert_eq!(response.body["description"], "Forecasts");
}

#[tokio::test]
async fn test_upsert_details_unknown_app() {
    let fixture = TestFixture::new();
    let response = fixture
        .put("/api/v1/admin/apps/9/details", json!({"version": "1.0"}))
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_categories() {
    let fixture = TestFixture::new();
    let mut game = entry(1, "Chess");
    game.category = "Games".to_string();
    fixture.seed_apps(&[game]);

    let response = fixture.get("/api/v1/admin/categories").await;
    assert_status!(response, StatusCode::OK);
    let names: Vec<&str> = response.body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Games"));
}

#[tokio::test]
async fn test_session_stats() {
    let fixture = TestFixture::new();
    fixture.seed_apps(&[entry(1, "App")]);
    fixture.get("/api/v1/catalog/master?key=client-a").await;
    fixture.get("/api/v1/catalog/master?key=client-b").await;

    let response = fixture.get("/api/v1/admin/sessions/stats").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total_sessions"], 2);
    assert_eq!(response.body["active_last_hour"], 2);

    // Direct store agreement
    assert_eq!(fixture.sessions.session_count().unwrap(), 2);
}
