//! HTTP layer for the museum catalog service.
//!
//! Exposed as a library so integration tests can assemble the router
//! in-process; the `museumd` binary is a thin wrapper around this.

pub mod api;
pub mod metrics;
pub mod state;
