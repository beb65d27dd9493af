//! Sequential job launcher.
//!
//! Plans a run and submits its jobs one at a time. Delays are taken from the
//! plan's lazy entry iterator, so each job's delay is measured right before
//! its own submit call; fanning submissions out concurrently would defeat the
//! synchronized start.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use fairload_plan::{
    BatchPlan, BatchPlanner, Classification, JobPlanEntry, PlanError, RunConfig, RunMode,
};

use super::engine::{EngineError, ExecutionEngine};
use super::models::{JobKind, JobSubmission};

/// Task queue for priority jobs when none is configured.
pub const DEFAULT_PRIORITY_TASK_QUEUE: &str = "default";
/// Task queue for fairness jobs when none is configured.
pub const DEFAULT_FAIRNESS_TASK_QUEUE: &str = "fairness-queue";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LauncherConfig {
    pub priority_task_queue: String,
    pub fairness_task_queue: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            priority_task_queue: DEFAULT_PRIORITY_TASK_QUEUE.to_string(),
            fairness_task_queue: DEFAULT_FAIRNESS_TASK_QUEUE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("invalid run config: {0}")]
    Plan(#[from] PlanError),
    /// The engine refused the run's first job, e.g. because the prefix was
    /// already used by an earlier run.
    #[error("run rejected: {0}")]
    Engine(#[from] EngineError),
}

/// Outcome of one launch.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchReport {
    #[serde(rename = "workflowIdPrefix")]
    pub id_prefix: String,
    pub mode: RunMode,
    pub requested_job_count: u32,
    pub effective_job_count: u32,
    /// Explicit band counts replaced the requested job count.
    pub job_count_overridden: bool,
    pub submitted: u32,
    pub failed: u32,
    pub target_start: DateTime<Utc>,
    pub start_window_secs: i64,
}

#[derive(Clone)]
pub struct JobLauncher {
    engine: Arc<dyn ExecutionEngine>,
    planner: BatchPlanner,
    config: LauncherConfig,
}

impl JobLauncher {
    pub fn new(
        engine: Arc<dyn ExecutionEngine>,
        planner: BatchPlanner,
        config: LauncherConfig,
    ) -> Self {
        Self {
            engine,
            planner,
            config,
        }
    }

    pub fn planner(&self) -> &BatchPlanner {
        &self.planner
    }

    /// Plans `run` and submits every job.
    pub async fn launch(&self, run: &RunConfig) -> Result<LaunchReport, LaunchError> {
        let plan = self.planner.plan(run)?;
        self.launch_plan(&plan).await
    }

    /// Submits an existing plan. A failed submission is logged and counted;
    /// the loop moves on to the next job. An `AlreadyExists` rejection of the
    /// first job means the prefix is taken and aborts the launch.
    pub async fn launch_plan(&self, plan: &BatchPlan) -> Result<LaunchReport, LaunchError> {
        let mut submitted = 0u32;
        let mut failed = 0u32;

        for entry in plan.entries(self.planner.clock()) {
            let entry_ordinal = entry.ordinal;
            let submission = self.submission_for(plan, entry);
            log::debug!(
                "fairload_launch submit job_id={} queue={} delay_ms={} kind={:?}",
                submission.job_id,
                submission.task_queue,
                submission.start_delay.as_millis(),
                submission.kind
            );
            let job_id = submission.job_id.clone();
            match self.engine.submit(submission).await {
                Ok(_) => submitted += 1,
                Err(e @ EngineError::AlreadyExists(_)) if entry_ordinal == 1 => {
                    log::warn!(
                        "fairload_launch rejected id_prefix={} job_id={} error={}",
                        plan.id_prefix,
                        job_id,
                        e
                    );
                    return Err(LaunchError::Engine(e));
                }
                Err(e) => {
                    failed += 1;
                    log::warn!(
                        "fairload_launch submit_failed job_id={} error={}",
                        job_id,
                        e
                    );
                }
            }
        }

        log::info!(
            "fairload_launch done id_prefix={} mode={} submitted={} failed={} target_start={}",
            plan.id_prefix,
            plan.mode.as_str(),
            submitted,
            failed,
            plan.target_start.to_rfc3339()
        );

        Ok(LaunchReport {
            id_prefix: plan.id_prefix.clone(),
            mode: plan.mode,
            requested_job_count: plan.requested_job_count,
            effective_job_count: plan.effective_job_count,
            job_count_overridden: plan.job_count_overridden,
            submitted,
            failed,
            target_start: plan.target_start,
            start_window_secs: plan.start_window.num_seconds(),
        })
    }

    fn submission_for(&self, plan: &BatchPlan, entry: JobPlanEntry) -> JobSubmission {
        let (kind, task_queue) = match entry.classification {
            Classification::Priority { priority } => (
                JobKind::Priority { priority },
                self.config.priority_task_queue.clone(),
            ),
            Classification::Fairness { key, weight } => (
                JobKind::Fairness {
                    key,
                    weight,
                    fairness_enabled: plan.fairness_enabled,
                },
                self.config.fairness_task_queue.clone(),
            ),
        };
        JobSubmission {
            job_id: entry.job_id,
            task_queue,
            start_delay: entry.start_delay,
            kind,
            completed_steps: 0,
        }
    }
}
