//! Axum handlers for launching runs and polling their progress.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::{from_fn, Next};
use axum::routing::{get, post};
use axum::{Json, Router};

use fairload_plan::{BatchPlanner, RunConfig};
use fairload_runtime::{
    ExecutionEngine, FairnessRunResults, InMemoryExecutionEngine, JobLauncher, LauncherConfig,
    PriorityRunResults, StatusReporter,
};

use super::api_errors::ApiError;
use super::api_models::{HealthResponse, RunStatusQuery, StartRunResponse};
use super::config::HarnessConfig;

#[derive(Clone)]
pub struct HarnessApiState {
    pub launcher: JobLauncher,
    pub reporter: StatusReporter,
}

impl HarnessApiState {
    pub fn new(
        engine: Arc<dyn ExecutionEngine>,
        planner: BatchPlanner,
        launcher_config: LauncherConfig,
    ) -> Self {
        Self {
            launcher: JobLauncher::new(engine.clone(), planner, launcher_config),
            reporter: StatusReporter::new(engine),
        }
    }

    /// State backed by the bundled in-memory engine.
    pub fn in_memory(config: &HarnessConfig) -> Self {
        let engine = if config.simulate {
            InMemoryExecutionEngine::simulated(config.step_pause)
        } else {
            InMemoryExecutionEngine::recording()
        };
        Self::new(
            Arc::new(engine),
            BatchPlanner::default(),
            config.launcher.clone(),
        )
    }
}

pub fn build_router(state: HarnessApiState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/start-workflows", post(start_workflows))
        .route("/run-status", get(run_status))
        .route("/run-status-fairness", get(run_status_fairness))
        .layer(from_fn(request_log_middleware))
        .with_state(state)
}

const REQUEST_ID_HEADER: &str = "x-request-id";

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Logs the request and pins its request id. A generated id is written into
/// the request headers for the handler and echoed on the response.
async fn request_log_middleware(
    mut request: axum::extract::Request,
    next: Next,
) -> axum::response::Response {
    let rid = request_id(request.headers());
    let header = HeaderValue::from_str(&rid).ok();
    if let Some(value) = &header {
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER, value.clone());
    }
    log::info!(
        "fairload_api_request request_id={} method={} path={}",
        rid,
        request.method(),
        request.uri().path()
    );
    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Decodes a start request. An empty body or a JSON `null` selects the
/// default run (prefix `Testing`, 100 priority jobs).
fn parse_run_config(body: &[u8]) -> Result<RunConfig, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RunConfig::default());
    }
    let config: Option<RunConfig> = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("invalid run config: {}", e)))?;
    Ok(config.unwrap_or_default())
}

fn validate_run_prefix(query: &RunStatusQuery) -> Result<&str, ApiError> {
    match query.run_prefix.as_deref() {
        Some(prefix) if !prefix.trim().is_empty() => Ok(prefix),
        _ => Err(ApiError::bad_request("runPrefix must not be empty")),
    }
}

pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn start_workflows(
    State(state): State<HarnessApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<StartRunResponse>, ApiError> {
    let rid = request_id(&headers);
    let config = parse_run_config(&body).map_err(|e| e.with_request_id(rid.clone()))?;
    log::info!(
        "fairload_start request_id={} id_prefix={} mode={} jobs={} bands={} disable_fairness={}",
        rid,
        config.id_prefix,
        config.mode.as_str(),
        config.job_count,
        config.bands.len(),
        config.disable_fairness
    );

    let report = state.launcher.launch(&config).await.map_err(|e| {
        ApiError::from(e)
            .with_request_id(rid.clone())
            .with_details(serde_json::json!({ "workflowIdPrefix": config.id_prefix }))
    })?;
    Ok(Json(StartRunResponse::done(rid, report)))
}

pub async fn run_status(
    State(state): State<HarnessApiState>,
    headers: HeaderMap,
    Query(query): Query<RunStatusQuery>,
) -> Result<Json<PriorityRunResults>, ApiError> {
    let rid = request_id(&headers);
    let prefix = validate_run_prefix(&query).map_err(|e| e.with_request_id(rid.clone()))?;
    let results = state
        .reporter
        .priority_results(prefix)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(rid.clone()))?;
    log::debug!(
        "fairload_status request_id={} run_prefix={} total={}",
        rid,
        prefix,
        results.total_jobs_in_test
    );
    Ok(Json(results))
}

pub async fn run_status_fairness(
    State(state): State<HarnessApiState>,
    headers: HeaderMap,
    Query(query): Query<RunStatusQuery>,
) -> Result<Json<FairnessRunResults>, ApiError> {
    let rid = request_id(&headers);
    let prefix = validate_run_prefix(&query).map_err(|e| e.with_request_id(rid.clone()))?;
    let results = state
        .reporter
        .fairness_results(prefix)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(rid.clone()))?;
    log::debug!(
        "fairload_status_fairness request_id={} run_prefix={} groups={} total={}",
        rid,
        prefix,
        results.summaries.len(),
        results.total_jobs_in_test
    );
    Ok(Json(results))
}
