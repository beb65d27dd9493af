//! Batch planning for fairload runs.
//!
//! A run is a batch of short synthetic jobs sharing an identifier prefix. This
//! crate decides the classification of every job (a priority level or a
//! weighted fairness band) and the start delay each submission should request
//! so that the whole batch begins at roughly the same instant.

pub mod classification;
pub mod clock;
pub mod error;
pub mod models;
pub mod planner;
pub mod timing;

pub use classification::{default_bands, priority_for_ordinal, PRIORITY_LEVELS};
pub use clock::{Clock, SystemClock};
pub use error::PlanError;
pub use models::{
    Band, Classification, JobPlanEntry, RunConfig, RunMode, DEFAULT_ID_PREFIX, DEFAULT_JOB_COUNT,
    MAX_JOB_COUNT,
};
pub use planner::{job_id, BatchPlan, BatchPlanner, PlanEntries};
pub use timing::{start_delay, start_window, target_start};
