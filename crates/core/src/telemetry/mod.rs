//! Download and update-check telemetry.
//!
//! Writes are fire-and-forget from the handlers' perspective: a failed
//! insert is logged and swallowed, never surfaced to the client.

mod sqlite;
mod types;

pub use sqlite::SqliteTelemetryStore;
pub use types::*;

/// Trait for telemetry storage backends.
pub trait TelemetryStore: Send + Sync {
    fn log_download(&self, record: &DownloadRecord) -> Result<(), TelemetryError>;

    fn log_update_check(&self, record: &UpdateCheckRecord) -> Result<(), TelemetryError>;

    fn download_stats(&self) -> Result<DownloadStats, TelemetryError>;

    fn update_stats(&self) -> Result<UpdateStats, TelemetryError>;
}
