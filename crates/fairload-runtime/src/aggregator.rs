//! Per-classification progress summaries built from engine status records.
//!
//! Aggregation is a pure function of the record set: records may arrive in
//! any order and the output (including ordering) depends only on their
//! contents. Activities are emitted in ascending step order and only for steps
//! at least one job in the group has reached.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::engine::{EngineError, ExecutionEngine};
use super::models::{
    ActivitySummary, FairnessRunResults, FairnessSummary, JobStatusRecord, PriorityRunResults,
    PrioritySummary, UnclassifiedSummary, TOTAL_STEPS,
};

/// Completion counts keyed by step number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepHistogram {
    counts: BTreeMap<u32, u64>,
}

impl StepHistogram {
    /// Counts one job that completed `completed_steps` steps: every step from 1
    /// through `completed_steps` is incremented.
    pub fn record(&mut self, completed_steps: u32) {
        for step in 1..=completed_steps {
            *self.counts.entry(step).or_insert(0) += 1;
        }
    }

    pub fn get(&self, step: u32) -> u64 {
        self.counts.get(&step).copied().unwrap_or(0)
    }

    pub fn to_activities(&self) -> Vec<ActivitySummary> {
        self.counts
            .iter()
            .map(|(step, count)| ActivitySummary {
                step_number: *step,
                number_completed: *count,
            })
            .collect()
    }
}

#[derive(Default)]
struct GroupAccumulator {
    job_count: u64,
    histogram: StepHistogram,
}

impl GroupAccumulator {
    fn add(&mut self, completed_steps: u32) {
        self.job_count += 1;
        self.histogram.record(completed_steps);
    }
}

/// Completed step count for a record: missing or negative reads as zero, and
/// values beyond the job length are capped.
fn completed_steps(record: &JobStatusRecord) -> u32 {
    let raw = record.completed_steps.unwrap_or(0);
    if raw > TOTAL_STEPS as i64 {
        log::warn!(
            "fairload_aggregate completed_steps_capped job_id={} reported={}",
            record.job_id,
            raw
        );
    }
    raw.clamp(0, TOTAL_STEPS as i64) as u32
}

/// Groups records into the fixed five priority buckets.
pub fn aggregate_priority(records: &[JobStatusRecord]) -> PriorityRunResults {
    let levels = fairload_plan::PRIORITY_LEVELS as usize;
    let mut buckets: Vec<GroupAccumulator> = (0..levels).map(|_| Default::default()).collect();
    let mut unclassified = GroupAccumulator::default();
    let mut observed_invalid = BTreeSet::new();

    for record in records {
        let steps = completed_steps(record);
        let priority = record.priority.unwrap_or(0);
        match usize::try_from(priority)
            .ok()
            .filter(|p| (1..=levels).contains(p))
        {
            Some(p) => buckets[p - 1].add(steps),
            None => {
                log::warn!(
                    "fairload_aggregate invalid_priority job_id={} priority={}",
                    record.job_id,
                    priority
                );
                observed_invalid.insert(priority);
                unclassified.add(steps);
            }
        }
    }

    let summaries = buckets
        .into_iter()
        .enumerate()
        .map(|(idx, acc)| PrioritySummary {
            priority: idx as u8 + 1,
            job_count: acc.job_count,
            activities: acc.histogram.to_activities(),
        })
        .collect();
    let unclassified = (unclassified.job_count > 0).then(|| UnclassifiedSummary {
        job_count: unclassified.job_count,
        observed_priorities: observed_invalid.into_iter().collect(),
        activities: unclassified.histogram.to_activities(),
    });

    PriorityRunResults {
        summaries,
        total_jobs_in_test: records.len() as u64,
        unclassified,
    }
}

/// Groups records by `(fairness_key, fairness_weight)`, heaviest weight first
/// and ties broken by key.
pub fn aggregate_fairness(records: &[JobStatusRecord]) -> FairnessRunResults {
    let mut groups: BTreeMap<(Reverse<i64>, String), GroupAccumulator> = BTreeMap::new();
    for record in records {
        let key = record.fairness_key.clone().unwrap_or_default();
        let weight = record.fairness_weight.unwrap_or(0);
        groups
            .entry((Reverse(weight), key))
            .or_default()
            .add(completed_steps(record));
    }

    let summaries = groups
        .into_iter()
        .map(|((Reverse(weight), key), acc)| FairnessSummary {
            fairness_key: key,
            fairness_weight: weight,
            job_count: acc.job_count,
            activities: acc.histogram.to_activities(),
        })
        .collect();

    FairnessRunResults {
        summaries,
        total_jobs_in_test: records.len() as u64,
    }
}

/// Fetches a run's records from the engine and aggregates them. Nothing is
/// cached: every call reflects the engine's current listing.
#[derive(Clone)]
pub struct StatusReporter {
    engine: Arc<dyn ExecutionEngine>,
}

impl StatusReporter {
    pub fn new(engine: Arc<dyn ExecutionEngine>) -> Self {
        Self { engine }
    }

    pub async fn priority_results(&self, id_prefix: &str) -> Result<PriorityRunResults, EngineError> {
        let records = self.engine.list_status(id_prefix).await?;
        log::debug!(
            "fairload_status priority id_prefix={} records={}",
            id_prefix,
            records.len()
        );
        Ok(aggregate_priority(&records))
    }

    pub async fn fairness_results(&self, id_prefix: &str) -> Result<FairnessRunResults, EngineError> {
        let records = self.engine.list_status(id_prefix).await?;
        log::debug!(
            "fairload_status fairness id_prefix={} records={}",
            id_prefix,
            records.len()
        );
        Ok(aggregate_fairness(&records))
    }
}
