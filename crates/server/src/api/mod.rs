pub mod admin;
pub mod details;
pub mod handlers;
pub mod master;
pub mod middleware;
pub mod reports;
pub mod routes;
pub mod search;
pub mod telemetry;
pub mod version;

pub use routes::create_router;

use serde::Serialize;

/// JSON error body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// JSON success body for admin mutations.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}
