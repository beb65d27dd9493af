//! HTTP surface of the fairload harness.
//!
//! Exposes the run launcher and status reporter from `fairload-runtime`
//! behind the routes the run dashboard polls.

pub mod api_errors;
pub mod api_handlers;
pub mod api_models;
pub mod config;

pub use api_errors::{ApiError, ErrorBody};
pub use api_handlers::{build_router, HarnessApiState};
pub use api_models::{HealthResponse, RunStatusQuery, StartRunResponse, START_DONE};
pub use config::{HarnessConfig, DEFAULT_SERVER_ADDR};
