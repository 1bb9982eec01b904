//! Prometheus metrics for core components.
//!
//! HTTP-level metrics live in the server crate; these counters track the
//! catalog domain itself.

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

/// Listing requests by addressing mode
/// ("window", "explicit", "random", "short_circuit").
pub static LISTING_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "museum_listing_requests_total",
            "Master listing requests by addressing mode",
        ),
        &["mode"],
    )
    .unwrap()
});

/// Entries delivered in full (as opposed to suppressed null placeholders).
pub static ENTRIES_DELIVERED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "museum_entries_delivered_total",
        "Catalog entries delivered in full",
    )
    .unwrap()
});

/// Entries suppressed because the session already held them.
pub static ENTRIES_SUPPRESSED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "museum_entries_suppressed_total",
        "Catalog entries replaced by null placeholders",
    )
    .unwrap()
});

/// Sessions removed by the cleanup sweep.
pub static SESSIONS_EXPIRED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "museum_sessions_expired_total",
        "Client sessions removed by the retention sweep",
    )
    .unwrap()
});

/// Download log records written.
pub static DOWNLOADS_RECORDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "museum_downloads_recorded_total",
        "Download telemetry records written",
    )
    .unwrap()
});

/// Update-check log records written.
pub static UPDATE_CHECKS_RECORDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "museum_update_checks_recorded_total",
        "Update-check telemetry records written",
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(LISTING_REQUESTS.clone()),
        Box::new(ENTRIES_DELIVERED.clone()),
        Box::new(ENTRIES_SUPPRESSED.clone()),
        Box::new(SESSIONS_EXPIRED.clone()),
        Box::new(DOWNLOADS_RECORDED.clone()),
        Box::new(UPDATE_CHECKS_RECORDED.clone()),
    ]
}
