use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use museum_core::{
    create_authenticator, load_config, validate_config, Authenticator, CatalogStore, DetailsStore,
    SessionStore, SqliteCatalogStore, SqliteDetailsStore, SqliteSessionStore,
    SqliteTelemetryStore, TelemetryStore,
};

use museum_server::api::create_router;
use museum_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("MUSEUM_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!("Database path: {:?}", config.database.path);

    // Log a config hash so deploys are traceable in the logs
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Config hash: {}", &config_hash[..16]);

    // Create authenticator for the admin surface
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Create SQLite stores (one database file, one connection per store)
    let catalog: Arc<dyn CatalogStore> = Arc::new(
        SqliteCatalogStore::new(&config.database.path).context("Failed to create catalog store")?,
    );
    info!("Catalog store initialized");

    let sessions: Arc<dyn SessionStore> = Arc::new(
        SqliteSessionStore::new(&config.database.path).context("Failed to create session store")?,
    );
    info!("Session store initialized");

    let details: Arc<dyn DetailsStore> = Arc::new(
        SqliteDetailsStore::new(&config.database.path).context("Failed to create details store")?,
    );
    info!("Details store initialized");

    let telemetry: Arc<dyn TelemetryStore> = Arc::new(
        SqliteTelemetryStore::new(&config.database.path)
            .context("Failed to create telemetry store")?,
    );
    info!("Telemetry store initialized");

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        catalog,
        sessions,
        details,
        telemetry,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
