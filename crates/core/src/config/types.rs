use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration for the admin surface
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Required when method = "api_key"
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("museum.db")
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Catalog service behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Host prepended to package filenames when building download URIs
    /// (e.g. "packages.example.org"). Filenames that already carry a scheme
    /// are passed through untouched.
    #[serde(default)]
    pub package_host: String,
    /// Client sessions idle longer than this are swept away.
    #[serde(default = "default_session_retention_days")]
    pub session_retention_days: i64,
    /// Page size used when the client does not send a count.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            package_host: String::new(),
            session_retention_days: default_session_retention_days(),
            default_page_size: default_page_size(),
        }
    }
}

fn default_session_retention_days() -> i64 {
    2
}

fn default_page_size() -> usize {
    20
}

/// Sanitized config for the public config endpoint (database settings and
/// secrets are never exposed)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
            },
            server: config.server.clone(),
            catalog: config.catalog.clone(),
        }
    }
}
