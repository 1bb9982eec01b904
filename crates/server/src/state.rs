use std::sync::Arc;

use chrono::Duration;
use museum_core::{
    Authenticator, CatalogStore, Config, DetailsStore, SanitizedConfig, SessionStore,
    TelemetryStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    catalog: Arc<dyn CatalogStore>,
    sessions: Arc<dyn SessionStore>,
    details: Arc<dyn DetailsStore>,
    telemetry: Arc<dyn TelemetryStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        catalog: Arc<dyn CatalogStore>,
        sessions: Arc<dyn SessionStore>,
        details: Arc<dyn DetailsStore>,
        telemetry: Arc<dyn TelemetryStore>,
    ) -> Self {
        Self {
            config,
            authenticator,
            catalog,
            sessions,
            details,
            telemetry,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    pub fn details(&self) -> &dyn DetailsStore {
        self.details.as_ref()
    }

    pub fn telemetry(&self) -> &dyn TelemetryStore {
        self.telemetry.as_ref()
    }

    pub fn session_retention(&self) -> Duration {
        Duration::days(self.config.catalog.session_retention_days)
    }

    pub fn default_page_size(&self) -> usize {
        self.config.catalog.default_page_size
    }

    pub fn package_host(&self) -> &str {
        &self.config.catalog.package_host
    }
}
