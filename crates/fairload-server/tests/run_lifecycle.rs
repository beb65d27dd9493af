use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use fairload_plan::BatchPlanner;
use fairload_runtime::{
    EngineError, ExecutionEngine, ExecutionHandle, InMemoryExecutionEngine, JobStatusRecord,
    JobSubmission, LauncherConfig, TOTAL_STEPS,
};
use fairload_server::{build_router, HarnessApiState, HarnessConfig};

async fn call(router: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn post_start(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/start-workflows")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn completed_counts(activities: &Value) -> Vec<(i64, i64)> {
    activities
        .as_array()
        .unwrap()
        .iter()
        .map(|a| {
            (
                a["activityNumber"].as_i64().unwrap(),
                a["numberCompleted"].as_i64().unwrap(),
            )
        })
        .collect()
}

#[tokio::test]
async fn fairness_run_progress_is_reported_per_band() {
    let engine = InMemoryExecutionEngine::recording();
    let state = HarnessApiState::new(
        Arc::new(engine.clone()),
        BatchPlanner::default(),
        LauncherConfig::default(),
    );
    let router = build_router(state);

    let (status, started) = call(
        &router,
        post_start(json!({
            "workflowIdPrefix": "lifecycle",
            "numberOfWorkflows": 3,
            "mode": "Fairness",
            "bands": [
                { "key": "A", "weight": 5, "count": 2 },
                { "key": "B", "weight": 1, "count": 1 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["status"], "Done");
    assert_eq!(started["mode"], "fairness");
    assert_eq!(started["submitted"], 3);

    let submissions = engine.submissions().unwrap();
    assert!(submissions
        .iter()
        .all(|s| s.task_queue == "fairness-queue" && s.completed_steps == 0));

    let mut a_jobs = Vec::new();
    let mut b_jobs = Vec::new();
    for submission in &submissions {
        match &submission.kind {
            fairload_runtime::JobKind::Fairness { key, .. } if key == "A" => {
                a_jobs.push(submission.job_id.clone())
            }
            _ => b_jobs.push(submission.job_id.clone()),
        }
    }
    engine.set_completed_steps(&a_jobs[0], 3).unwrap();
    engine.set_completed_steps(&a_jobs[1], 5).unwrap();
    engine.set_completed_steps(&b_jobs[0], 1).unwrap();

    let (status, body) = call(&router, get("/run-status-fairness?runPrefix=lifecycle")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalWorkflowsInTest"], 3);
    let groups = body["workflowsByFairness"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["fairnessKey"], "A");
    assert_eq!(groups[0]["fairnessWeight"], 5);
    assert_eq!(groups[0]["numberOfWorkflows"], 2);
    assert_eq!(
        completed_counts(&groups[0]["activities"]),
        vec![(1, 2), (2, 2), (3, 2), (4, 1), (5, 1)]
    );
    assert_eq!(groups[1]["fairnessKey"], "B");
    assert_eq!(completed_counts(&groups[1]["activities"]), vec![(1, 1)]);

    // Priority view of a fairness run: every job lands outside the five buckets.
    let (status, body) = call(&router, get("/run-status?runPrefix=lifecycle")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalWorkflowsInTest"], 3);
    assert_eq!(body["unclassified"]["numberOfWorkflows"], 3);
}

#[tokio::test]
async fn unknown_prefix_reports_empty_groups() {
    let router = build_router(HarnessApiState::new(
        Arc::new(InMemoryExecutionEngine::recording()),
        BatchPlanner::default(),
        LauncherConfig::default(),
    ));
    let (status, body) = call(&router, get("/run-status?runPrefix=nobody")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalWorkflowsInTest"], 0);
    for summary in body["workflowsByPriority"].as_array().unwrap() {
        assert_eq!(summary["numberOfWorkflows"], 0);
        assert!(summary["activities"].as_array().unwrap().is_empty());
    }

    let (status, body) = call(&router, get("/run-status-fairness?runPrefix=nobody")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["workflowsByFairness"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn simulated_engine_runs_jobs_to_completion() {
    let config = HarnessConfig {
        step_pause: Duration::from_millis(1),
        ..HarnessConfig::default()
    };
    let router = build_router(HarnessApiState::in_memory(&config));

    let (status, _) = call(
        &router,
        post_start(json!({ "workflowIdPrefix": "sim", "numberOfWorkflows": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Priority start window for 5 jobs is 5s.
    let mut finished = 0;
    for _ in 0..150 {
        let (_, body) = call(&router, get("/run-status?runPrefix=sim")).await;
        finished = body["workflowsByPriority"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|s| s["activities"].as_array().unwrap().clone())
            .filter(|a| a["activityNumber"] == TOTAL_STEPS)
            .map(|a| a["numberCompleted"].as_i64().unwrap())
            .sum::<i64>();
        if finished == 5 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(finished, 5);
}

struct UnavailableEngine;

#[async_trait]
impl ExecutionEngine for UnavailableEngine {
    async fn submit(&self, submission: JobSubmission) -> Result<ExecutionHandle, EngineError> {
        Err(EngineError::Submit {
            job_id: submission.job_id,
            message: "engine offline".into(),
        })
    }

    async fn list_status(&self, _id_prefix: &str) -> Result<Vec<JobStatusRecord>, EngineError> {
        Err(EngineError::Unavailable("engine offline".into()))
    }
}

#[tokio::test]
async fn engine_failures_surface_in_responses() {
    let router = build_router(HarnessApiState::new(
        Arc::new(UnavailableEngine),
        BatchPlanner::default(),
        LauncherConfig::default(),
    ));

    let (status, started) = call(
        &router,
        post_start(json!({ "workflowIdPrefix": "down", "numberOfWorkflows": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["submitted"], 0);
    assert_eq!(started["failed"], 4);

    let (status, body) = call(&router, get("/run-status?runPrefix=down")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "unavailable");
}
