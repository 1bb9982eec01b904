pub mod auth;
pub mod catalog;
pub mod config;
pub mod details;
pub mod listing;
pub mod metrics;
pub mod session;
pub mod telemetry;
pub mod testing;

pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    NoneAuthenticator,
};
pub use catalog::{
    sanitize_search, AdminQuery, CatalogEntry, CatalogError, CatalogStore, Category, EntryStatus,
    SqliteCatalogStore,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, CatalogConfig,
    Config, ConfigError, DatabaseConfig, SanitizedConfig, ServerConfig,
};
pub use details::{AppDetails, AppImage, DetailsError, DetailsStore, SqliteDetailsStore, VersionInfo};
pub use listing::{
    build_view, plan, sort_entries, Addressing, DeliveredEntry, DeviceFilter, FilteredView,
    ListingFilter, ListingPlan, SortOrder, CURATORS_CHOICE, REVISIONIST_HISTORY,
};
pub use session::{SessionError, SessionStore, SqliteSessionStore};
pub use telemetry::{
    is_probe_attempt, DownloadRecord, DownloadStats, SqliteTelemetryStore, TelemetryError,
    TelemetryStore, UpdateCheckRecord, UpdateStats,
};
