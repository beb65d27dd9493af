//! Run configuration and plan domain models.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::classification::{explicit_total, has_explicit_counts};
use crate::error::PlanError;

/// Identifier prefix used when the caller supplies no configuration.
pub const DEFAULT_ID_PREFIX: &str = "Testing";
/// Job count used when the caller supplies no configuration.
pub const DEFAULT_JOB_COUNT: u32 = 100;
/// Largest batch a single run may plan, whether requested directly or reached
/// through explicit band counts.
pub const MAX_JOB_COUNT: u32 = 10_000;

/// Classification scheme for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunMode {
    #[default]
    Priority,
    Fairness,
}

impl RunMode {
    /// Parses a client-supplied mode. Only `fairness` (trimmed, any case) selects
    /// fairness mode; everything else falls back to priority.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("fairness") {
            RunMode::Fairness
        } else {
            RunMode::Priority
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Priority => "priority",
            RunMode::Fairness => "fairness",
        }
    }
}

impl Serialize for RunMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RunMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(RunMode::parse).unwrap_or_default())
    }
}

/// A named fairness class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub key: String,
    #[serde(default)]
    pub weight: u32,
    /// Explicit number of jobs for this band. Any band with a positive count
    /// switches the planner into explicit-distribution mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl Band {
    pub fn new(key: impl Into<String>, weight: u32) -> Self {
        Self {
            key: key.into(),
            weight,
            count: None,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Explicit count, treating an absent count as zero.
    pub fn explicit_count(&self) -> u32 {
        self.count.unwrap_or(0)
    }
}

/// Caller-supplied description of one run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunConfig {
    #[serde(rename = "workflowIdPrefix")]
    pub id_prefix: String,
    #[serde(rename = "numberOfWorkflows")]
    pub job_count: u32,
    pub mode: RunMode,
    pub bands: Vec<Band>,
    pub disable_fairness: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            job_count: DEFAULT_JOB_COUNT,
            mode: RunMode::Priority,
            bands: Vec::new(),
            disable_fairness: false,
        }
    }
}

impl RunConfig {
    pub fn priority(id_prefix: impl Into<String>, job_count: u32) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            job_count,
            ..Self::default()
        }
    }

    pub fn fairness(id_prefix: impl Into<String>, job_count: u32, bands: Vec<Band>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
            job_count,
            mode: RunMode::Fairness,
            bands,
            disable_fairness: false,
        }
    }

    pub fn with_fairness_disabled(mut self) -> Self {
        self.disable_fairness = true;
        self
    }

    /// Checks band invariants and the job count cap. Bands are only
    /// meaningful in fairness mode, so a priority config only checks its count.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.mode != RunMode::Fairness {
            return check_job_count(self.job_count);
        }
        let mut seen = HashSet::new();
        for band in &self.bands {
            if band.key.trim().is_empty() {
                return Err(PlanError::EmptyBandKey);
            }
            if !seen.insert(band.key.as_str()) {
                return Err(PlanError::DuplicateBandKey(band.key.clone()));
            }
        }
        if has_explicit_counts(&self.bands) {
            let total = explicit_total(&self.bands).ok_or(PlanError::JobCountTooLarge {
                max: MAX_JOB_COUNT,
            })?;
            check_job_count(total)
        } else {
            check_job_count(self.job_count)
        }
    }
}

fn check_job_count(job_count: u32) -> Result<(), PlanError> {
    if job_count > MAX_JOB_COUNT {
        return Err(PlanError::JobCountTooLarge { max: MAX_JOB_COUNT });
    }
    Ok(())
}

/// Classification tag attached to a job at submission.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    Priority { priority: u8 },
    Fairness { key: String, weight: u32 },
}

impl Classification {
    /// Grouping key as reported back by the engine.
    pub fn key(&self) -> String {
        match self {
            Classification::Priority { priority } => priority.to_string(),
            Classification::Fairness { key, .. } => key.clone(),
        }
    }
}

/// One planned job, produced in submission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobPlanEntry {
    /// 1-based position in submission order.
    pub ordinal: u32,
    pub job_id: String,
    pub classification: Classification,
    pub start_delay: Duration,
}
