//! The listing engine: filter/sort pass, pagination & delivery planning,
//! and the first-letter jump table.
//!
//! Everything here is pure. Stores stay at the edges: the HTTP layer loads
//! the master view and the session's known ids, calls into this module, and
//! writes the grown known set back afterwards. That keeps the incremental
//! delivery protocol - the one stateful contract in this service -
//! deterministic and testable without a database.

pub mod filter;
pub mod planner;
mod types;

pub use filter::{build_view, sort_entries};
pub use planner::plan;
pub use types::*;
