//! Process configuration read from the environment.

use std::collections::HashMap;
use std::time::Duration;

use fairload_runtime::{
    LauncherConfig, DEFAULT_FAIRNESS_TASK_QUEUE, DEFAULT_PRIORITY_TASK_QUEUE, DEFAULT_STEP_PAUSE,
};

pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:7080";

const ENV_KEYS: [&str; 5] = [
    "FAIRLOAD_SERVER_ADDR",
    "FAIRLOAD_TASK_QUEUE",
    "FAIRLOAD_FAIRNESS_TASK_QUEUE",
    "FAIRLOAD_STEP_PAUSE_MS",
    "FAIRLOAD_SIMULATE",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    pub server_addr: String,
    pub launcher: LauncherConfig,
    pub step_pause: Duration,
    /// Run accepted jobs in the in-memory engine instead of only recording them.
    pub simulate: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            launcher: LauncherConfig::default(),
            step_pause: DEFAULT_STEP_PAUSE,
            simulate: true,
        }
    }
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self, String> {
        let mut envs = HashMap::new();
        for key in ENV_KEYS {
            if let Ok(value) = std::env::var(key) {
                envs.insert(key.to_string(), value);
            }
        }
        Self::from_env_map(&envs)
    }

    pub fn from_env_map(envs: &HashMap<String, String>) -> Result<Self, String> {
        let non_empty = |key: &str| {
            envs.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let server_addr = non_empty("FAIRLOAD_SERVER_ADDR")
            .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string());
        let priority_task_queue = non_empty("FAIRLOAD_TASK_QUEUE")
            .unwrap_or_else(|| DEFAULT_PRIORITY_TASK_QUEUE.to_string());
        let fairness_task_queue = non_empty("FAIRLOAD_FAIRNESS_TASK_QUEUE")
            .unwrap_or_else(|| DEFAULT_FAIRNESS_TASK_QUEUE.to_string());
        let step_pause = match non_empty("FAIRLOAD_STEP_PAUSE_MS") {
            Some(raw) => Duration::from_millis(raw.parse::<u64>().map_err(|e| {
                format!(
                    "invalid FAIRLOAD_STEP_PAUSE_MS='{}': {}. expected milliseconds",
                    raw, e
                )
            })?),
            None => DEFAULT_STEP_PAUSE,
        };
        let simulate = non_empty("FAIRLOAD_SIMULATE")
            .map(|v| parse_bool(&v))
            .unwrap_or(true);

        Ok(Self {
            server_addr,
            launcher: LauncherConfig {
                priority_task_queue,
                fairness_task_queue,
            },
            step_pause,
            simulate,
        })
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
