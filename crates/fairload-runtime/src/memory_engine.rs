//! In-memory execution engine.
//!
//! Accepts submissions and answers prefix listings from a process-local map.
//! In simulated mode every accepted job is driven by a tokio task that waits
//! out its start delay and then completes [TOTAL_STEPS] steps, pausing a
//! fixed time per step. Classifications are recorded but not enforced.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::engine::{EngineError, ExecutionEngine};
use super::models::{ExecutionHandle, JobKind, JobStatusRecord, JobSubmission, TOTAL_STEPS};

/// Default pause per simulated step.
pub const DEFAULT_STEP_PAUSE: Duration = Duration::from_millis(300);

#[derive(Clone, Debug)]
struct StoredJob {
    submission: JobSubmission,
    completed_steps: u32,
}

impl StoredJob {
    fn status(&self) -> JobStatusRecord {
        let mut record = JobStatusRecord {
            job_id: self.submission.job_id.clone(),
            completed_steps: Some(self.completed_steps as i64),
            ..Default::default()
        };
        match &self.submission.kind {
            JobKind::Priority { priority } => record.priority = Some(*priority as i64),
            JobKind::Fairness { key, .. } => {
                record.fairness_key = Some(key.clone());
                record.fairness_weight = self.submission.kind.reported_weight().map(i64::from);
            }
        }
        record
    }
}

type JobTable = Arc<RwLock<BTreeMap<String, StoredJob>>>;

#[derive(Clone)]
pub struct InMemoryExecutionEngine {
    jobs: JobTable,
    step_pause: Option<Duration>,
}

impl InMemoryExecutionEngine {
    /// Records submissions without running them; progress only changes through
    /// [InMemoryExecutionEngine::set_completed_steps].
    pub fn recording() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(BTreeMap::new())),
            step_pause: None,
        }
    }

    /// Runs every accepted job on the tokio runtime with `step_pause` per step.
    pub fn simulated(step_pause: Duration) -> Self {
        Self {
            step_pause: Some(step_pause),
            ..Self::recording()
        }
    }

    /// Accepted submissions in job-id order.
    pub fn submissions(&self) -> Result<Vec<JobSubmission>, EngineError> {
        let jobs = self
            .jobs
            .read()
            .map_err(|e| EngineError::Query(e.to_string()))?;
        Ok(jobs.values().map(|j| j.submission.clone()).collect())
    }

    /// Overwrites the progress attribute of a job.
    pub fn set_completed_steps(&self, job_id: &str, steps: u32) -> Result<(), EngineError> {
        set_progress(&self.jobs, job_id, steps.min(TOTAL_STEPS))
    }
}

impl Default for InMemoryExecutionEngine {
    fn default() -> Self {
        Self::simulated(DEFAULT_STEP_PAUSE)
    }
}

fn set_progress(jobs: &JobTable, job_id: &str, steps: u32) -> Result<(), EngineError> {
    let mut jobs = jobs
        .write()
        .map_err(|e| EngineError::Unavailable(e.to_string()))?;
    let job = jobs
        .get_mut(job_id)
        .ok_or_else(|| EngineError::Query(format!("unknown job: {}", job_id)))?;
    job.completed_steps = steps;
    Ok(())
}

async fn run_job(jobs: JobTable, job_id: String, start_delay: Duration, step_pause: Duration) {
    tokio::time::sleep(start_delay).await;
    log::debug!("fairload_engine job_started job_id={}", job_id);
    for step in 1..=TOTAL_STEPS {
        tokio::time::sleep(step_pause).await;
        log::info!(
            "fairload_engine step_completed job_id={} step={} at={}",
            job_id,
            step,
            Utc::now().to_rfc3339()
        );
        if let Err(e) = set_progress(&jobs, &job_id, step) {
            log::warn!(
                "fairload_engine progress_update_failed job_id={} error={}",
                job_id,
                e
            );
            return;
        }
    }
}

#[async_trait]
impl ExecutionEngine for InMemoryExecutionEngine {
    async fn submit(&self, submission: JobSubmission) -> Result<ExecutionHandle, EngineError> {
        let handle = ExecutionHandle {
            job_id: submission.job_id.clone(),
            run_id: format!("{}-run-{}", submission.job_id, Utc::now().timestamp_micros()),
        };
        let start_delay = submission.start_delay;
        {
            let mut jobs = self
                .jobs
                .write()
                .map_err(|e| EngineError::Unavailable(e.to_string()))?;
            if jobs.contains_key(&submission.job_id) {
                return Err(EngineError::AlreadyExists(submission.job_id));
            }
            let completed_steps = submission.completed_steps.min(TOTAL_STEPS);
            jobs.insert(
                submission.job_id.clone(),
                StoredJob {
                    submission,
                    completed_steps,
                },
            );
        }

        if let Some(step_pause) = self.step_pause {
            tokio::spawn(run_job(
                self.jobs.clone(),
                handle.job_id.clone(),
                start_delay,
                step_pause,
            ));
        }
        Ok(handle)
    }

    async fn list_status(&self, id_prefix: &str) -> Result<Vec<JobStatusRecord>, EngineError> {
        let jobs = self
            .jobs
            .read()
            .map_err(|e| EngineError::Query(e.to_string()))?;
        Ok(jobs
            .iter()
            .filter(|(job_id, _)| job_id.starts_with(id_prefix))
            .map(|(_, job)| job.status())
            .collect())
    }
}
