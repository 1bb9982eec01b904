//! Types and helpers for download/update-check telemetry.

use serde::Serialize;
use thiserror::Error;

/// One recorded package download.
#[derive(Debug, Clone)]
pub struct DownloadRecord {
    /// Raw identifier the client sent (app id or package name).
    pub app_identifier: String,
    /// Where the download came from ("app", "web", ...). Commas are stripped
    /// upstream so log exports stay parseable.
    pub source: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// One recorded update check.
#[derive(Debug, Clone)]
pub struct UpdateCheckRecord {
    pub app_name: String,
    pub device_info: Option<String>,
    pub client_id: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppHitCount {
    pub app_identifier: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientHitCount {
    pub client: String,
    pub count: i64,
}

/// Aggregate download statistics for the reports endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadStats {
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub total_downloads: i64,
    /// Top 20 downloaded identifiers.
    pub top_apps: Vec<AppHitCount>,
    /// Top 10 client platforms, classified from user agents.
    pub top_clients: Vec<ClientHitCount>,
}

/// Aggregate update-check statistics for the reports endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateStats {
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub total_checks: i64,
    pub top_apps: Vec<AppHitCount>,
    pub distinct_clients: i64,
}

/// Errors for telemetry operations.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Database error: {0}")]
    Database(String),
}

/// Identifiers that are vulnerability probes rather than app ids. These are
/// dropped silently instead of polluting the download log.
pub fn is_probe_attempt(app_identifier: &str) -> bool {
    let id = app_identifier.to_lowercase();

    const BLOCKED: &[&str] = &[
        ".env",
        "eval-stdin.php",
        "wp-login.php",
        "wp-admin",
        "xmlrpc.php",
        "admin.php",
        "shell.php",
        "config.php",
        "phpinfo.php",
        "setup.php",
    ];
    if BLOCKED.contains(&id.as_str()) {
        return true;
    }

    // Path traversal
    if id.contains("../") || id.contains("..\\") {
        return true;
    }

    // No legitimate app identifier ends in .php
    if id.ends_with(".php") {
        return true;
    }

    // Script injection
    if id.contains("<script") || id.contains("javascript:") {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_blocked_paths() {
        assert!(is_probe_attempt(".env"));
        assert!(is_probe_attempt("WP-LOGIN.PHP"));
        assert!(is_probe_attempt("xmlrpc.php"));
    }

    #[test]
    fn test_probe_traversal_and_injection() {
        assert!(is_probe_attempt("../../etc/passwd"));
        assert!(is_probe_attempt("..\\windows\\system32"));
        assert!(is_probe_attempt("<script>alert(1)</script>"));
        assert!(is_probe_attempt("javascript:void(0)"));
        assert!(is_probe_attempt("anything.php"));
    }

    #[test]
    fn test_probe_allows_real_identifiers() {
        assert!(!is_probe_attempt("1234"));
        assert!(!is_probe_attempt("com.example.checkbook"));
        assert!(!is_probe_attempt("Angry Birds"));
    }
}
