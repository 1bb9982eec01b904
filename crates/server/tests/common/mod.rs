//! Common test utilities for endpoint tests.
//!
//! Builds the full router in-process over in-memory SQLite stores, so tests
//! exercise the real handler/engine/store stack without a network listener.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use museum_core::{
    AppDetails, AuthConfig, AuthMethod, CatalogConfig, CatalogEntry, CatalogStore, Config,
    DatabaseConfig, DetailsStore, ServerConfig, SqliteCatalogStore, SqliteDetailsStore,
    SqliteSessionStore, SqliteTelemetryStore, create_authenticator,
};
use museum_server::state::AppState;

/// Re-export fixtures for test convenience
pub use museum_core::testing::{details, entry};

/// In-process server plus direct handles on the backing stores, for seeding
/// and asserting on persisted state.
pub struct TestFixture {
    pub router: Router,
    pub catalog: Arc<SqliteCatalogStore>,
    pub details: Arc<SqliteDetailsStore>,
    pub sessions: Arc<SqliteSessionStore>,
    pub telemetry: Arc<SqliteTelemetryStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Fixture with open admin routes (auth method "none").
    pub fn new() -> Self {
        Self::with_auth(AuthConfig {
            method: AuthMethod::None,
            api_key: None,
        })
    }

    /// Fixture whose admin routes require the given API key.
    pub fn with_api_key(key: &str) -> Self {
        Self::with_auth(AuthConfig {
            method: AuthMethod::ApiKey,
            api_key: Some(key.to_string()),
        })
    }

    fn with_auth(auth: AuthConfig) -> Self {
        let config = Config {
            auth,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            catalog: CatalogConfig {
                package_host: "packages.test".to_string(),
                ..Default::default()
            },
        };

        let authenticator = Arc::from(create_authenticator(&config.auth).unwrap());

        let catalog = Arc::new(SqliteCatalogStore::in_memory().unwrap());
        let details = Arc::new(SqliteDetailsStore::in_memory().unwrap());
        let sessions = Arc::new(SqliteSessionStore::in_memory().unwrap());
        let telemetry = Arc::new(SqliteTelemetryStore::in_memory().unwrap());

        let state = Arc::new(AppState::new(
            config,
            authenticator,
            Arc::clone(&catalog) as Arc<dyn museum_core::CatalogStore>,
            Arc::clone(&sessions) as Arc<dyn museum_core::SessionStore>,
            Arc::clone(&details) as Arc<dyn museum_core::DetailsStore>,
            Arc::clone(&telemetry) as Arc<dyn museum_core::TelemetryStore>,
        ));

        let router = museum_server::api::create_router(state);

        Self {
            router,
            catalog,
            details,
            sessions,
            telemetry,
        }
    }

    /// Insert catalog entries directly through the store.
    pub fn seed_apps(&self, entries: &[CatalogEntry]) {
        for entry in entries {
            self.catalog.create(entry).unwrap();
        }
    }

    /// Insert detail metadata directly through the store.
    pub fn seed_details(&self, app_id: i64, details: &AppDetails) {
        self.details.upsert(app_id, details).unwrap();
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, &[]).await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request("GET", path, None, headers).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), &[]).await
    }

    /// Send a POST request with JSON body and extra headers.
    pub async fn post_with_headers(
        &self,
        path: &str,
        body: Value,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        self.request("POST", path, Some(body), headers).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body), &[]).await
    }

    /// Send a PUT request with JSON body and extra headers.
    pub async fn put_with_headers(
        &self,
        path: &str,
        body: Value,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        self.request("PUT", path, Some(body), headers).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None, &[]).await
    }

    /// Send a DELETE request with extra headers.
    pub async fn delete_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request("DELETE", path, None, headers).await
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        for (name, value) in headers {
            request_builder = request_builder.header(*name, *value);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
