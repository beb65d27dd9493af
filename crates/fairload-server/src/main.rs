//! Starts the fairload harness server.
//!
//! Reads `FAIRLOAD_*` settings from the environment and logs through
//! `RUST_LOG` (defaults to info for the harness crates).

use fairload_server::{build_router, HarnessApiState, HarnessConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,fairload_runtime=info,fairload_server=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = HarnessConfig::from_env().map_err(anyhow::Error::msg)?;
    let state = HarnessApiState::in_memory(&config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server_addr).await?;
    tracing::info!(
        addr = %config.server_addr,
        simulate = config.simulate,
        step_pause_ms = config.step_pause.as_millis() as u64,
        priority_queue = %config.launcher.priority_task_queue,
        fairness_queue = %config.launcher.fairness_task_queue,
        "fairload harness listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
