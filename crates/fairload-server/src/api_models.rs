//! Request and response DTOs for the harness HTTP surface.
//!
//! Field names follow the run dashboard's wire format.

use serde::{Deserialize, Serialize};

use fairload_runtime::LaunchReport;

/// Completion token returned once every submission has been issued.
pub const START_DONE: &str = "Done";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRunResponse {
    pub status: &'static str,
    pub request_id: String,
    #[serde(flatten)]
    pub report: LaunchReport,
}

impl StartRunResponse {
    pub fn done(request_id: String, report: LaunchReport) -> Self {
        Self {
            status: START_DONE,
            request_id,
            report,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatusQuery {
    pub run_prefix: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
