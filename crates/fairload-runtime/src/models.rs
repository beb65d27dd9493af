//! Engine-facing submission and status models, plus aggregated run results.
//!
//! Result types serialize with the field names the run dashboard reads
//! (`workflowsByPriority`, `totalWorkflowsInTest`, ...).

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of sequential steps every synthetic job runs.
pub const TOTAL_STEPS: u32 = 5;

/// Classification payload for a submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobKind {
    Priority {
        priority: u8,
    },
    Fairness {
        key: String,
        /// Band weight as configured, whether or not fairness is enabled.
        weight: u32,
        /// Whether the engine should apply key/weight to admission.
        fairness_enabled: bool,
    },
}

impl JobKind {
    /// Fairness weight the engine should expose for status queries: the band
    /// weight when fairness is enabled, zero otherwise.
    pub fn reported_weight(&self) -> Option<u32> {
        match self {
            JobKind::Priority { .. } => None,
            JobKind::Fairness {
                weight,
                fairness_enabled,
                ..
            } => Some(if *fairness_enabled { *weight } else { 0 }),
        }
    }
}

/// One submit call against the execution engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobSubmission {
    pub job_id: String,
    pub task_queue: String,
    pub start_delay: Duration,
    pub kind: JobKind,
    /// Initial value of the progress attribute; always zero at submission.
    pub completed_steps: u32,
}

/// Handle returned by the engine for an accepted submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionHandle {
    pub job_id: String,
    pub run_id: String,
}

/// Status of one job as listed by the engine. Attributes are optional because
/// the engine's metadata store does not guarantee their presence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusRecord {
    pub job_id: String,
    pub priority: Option<i64>,
    pub fairness_key: Option<String>,
    pub fairness_weight: Option<i64>,
    pub completed_steps: Option<i64>,
}

impl JobStatusRecord {
    pub fn priority(job_id: impl Into<String>, priority: i64, completed_steps: i64) -> Self {
        Self {
            job_id: job_id.into(),
            priority: Some(priority),
            completed_steps: Some(completed_steps),
            ..Self::default()
        }
    }

    pub fn fairness(
        job_id: impl Into<String>,
        key: impl Into<String>,
        weight: i64,
        completed_steps: i64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            fairness_key: Some(key.into()),
            fairness_weight: Some(weight),
            completed_steps: Some(completed_steps),
            ..Self::default()
        }
    }
}

/// Number of jobs in a group that reached at least `step_number`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    #[serde(rename = "activityNumber")]
    pub step_number: u32,
    pub number_completed: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritySummary {
    #[serde(rename = "workflowPriority")]
    pub priority: u8,
    #[serde(rename = "numberOfWorkflows")]
    pub job_count: u64,
    pub activities: Vec<ActivitySummary>,
}

/// Jobs whose priority attribute was missing or outside 1..=5.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnclassifiedSummary {
    #[serde(rename = "numberOfWorkflows")]
    pub job_count: u64,
    /// Distinct offending values, ascending; a missing priority shows as 0.
    pub observed_priorities: Vec<i64>,
    pub activities: Vec<ActivitySummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityRunResults {
    #[serde(rename = "workflowsByPriority")]
    pub summaries: Vec<PrioritySummary>,
    #[serde(rename = "totalWorkflowsInTest")]
    pub total_jobs_in_test: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unclassified: Option<UnclassifiedSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessSummary {
    pub fairness_key: String,
    pub fairness_weight: i64,
    #[serde(rename = "numberOfWorkflows")]
    pub job_count: u64,
    pub activities: Vec<ActivitySummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessRunResults {
    #[serde(rename = "workflowsByFairness")]
    pub summaries: Vec<FairnessSummary>,
    #[serde(rename = "totalWorkflowsInTest")]
    pub total_jobs_in_test: u64,
}
