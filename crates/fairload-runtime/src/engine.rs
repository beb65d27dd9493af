//! Contract for the external job-execution engine.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{ExecutionHandle, JobStatusRecord, JobSubmission};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("job already exists: {0}")]
    AlreadyExists(String),
    #[error("submit failed for {job_id}: {message}")]
    Submit { job_id: String, message: String },
    #[error("status query failed: {0}")]
    Query(String),
    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

/// Execution engine used by the launcher and the status reporter.
///
/// - `submit` is called once per planned job, sequentially, and must not block
///   until the job runs; the engine honours `start_delay` itself.
/// - `list_status` returns every job whose identifier starts with `id_prefix`,
///   in any order, including jobs that are still running.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    async fn submit(&self, submission: JobSubmission) -> Result<ExecutionHandle, EngineError>;

    async fn list_status(&self, id_prefix: &str) -> Result<Vec<JobStatusRecord>, EngineError>;
}
