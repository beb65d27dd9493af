//! Execution-engine facing runtime for fairload runs.
//!
//! [JobLauncher] turns a [fairload_plan::RunConfig] into sequential engine
//! submissions; [StatusReporter] lists a run's jobs back from the engine and
//! aggregates them into per-classification progress summaries.

pub mod aggregator;
pub mod engine;
pub mod launcher;
pub mod memory_engine;
pub mod models;

pub use aggregator::{aggregate_fairness, aggregate_priority, StatusReporter, StepHistogram};
pub use engine::{EngineError, ExecutionEngine};
pub use launcher::{
    JobLauncher, LaunchError, LaunchReport, LauncherConfig, DEFAULT_FAIRNESS_TASK_QUEUE,
    DEFAULT_PRIORITY_TASK_QUEUE,
};
pub use memory_engine::{InMemoryExecutionEngine, DEFAULT_STEP_PAUSE};
pub use models::{
    ActivitySummary, ExecutionHandle, FairnessRunResults, FairnessSummary, JobKind,
    JobStatusRecord, JobSubmission, PriorityRunResults, PrioritySummary, UnclassifiedSummary,
    TOTAL_STEPS,
};
