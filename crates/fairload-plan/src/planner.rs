//! Batch planner: classification plus synchronized start delays.
//!
//! [BatchPlanner::plan] fixes everything that does not depend on submission
//! progress (effective job count, classification order, target instant).
//! Start delays are produced lazily by [BatchPlan::entries], which reads the
//! clock as each entry is pulled, so the caller must submit an entry before
//! pulling the next one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::classification::{
    band_for_ordinal, effective_bands, has_explicit_counts, priority_for_ordinal,
    shuffled_distribution,
};
use crate::clock::{Clock, SystemClock};
use crate::error::PlanError;
use crate::models::{Classification, JobPlanEntry, RunConfig, RunMode};
use crate::timing::{start_delay, start_window, target_start};

/// Formats the engine identifier for a job.
pub fn job_id(id_prefix: &str, ordinal: u32) -> String {
    format!("{}-{}", id_prefix, ordinal)
}

/// Immutable plan for one run.
#[derive(Clone, Debug)]
pub struct BatchPlan {
    pub id_prefix: String,
    pub mode: RunMode,
    /// Job count from the caller's config.
    pub requested_job_count: u32,
    /// Job count actually planned; differs from the request when explicit
    /// band counts override it.
    pub effective_job_count: u32,
    /// True when explicit band counts replaced a different requested count.
    pub job_count_overridden: bool,
    pub explicit_distribution: bool,
    /// Whether fairness weighting is requested from the engine.
    pub fairness_enabled: bool,
    pub planned_at: DateTime<Utc>,
    pub start_window: chrono::Duration,
    pub target_start: DateTime<Utc>,
    /// Classification per job in submission order.
    assignments: Vec<Classification>,
}

impl BatchPlan {
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn assignments(&self) -> &[Classification] {
        &self.assignments
    }

    /// Plan entries in submission order. Each entry's delay is computed from
    /// `clock` at the moment it is yielded.
    pub fn entries<'a>(&'a self, clock: &'a dyn Clock) -> PlanEntries<'a> {
        PlanEntries {
            plan: self,
            clock,
            next: 0,
        }
    }
}

/// Lazy iterator over [JobPlanEntry] values.
pub struct PlanEntries<'a> {
    plan: &'a BatchPlan,
    clock: &'a dyn Clock,
    next: usize,
}

impl Iterator for PlanEntries<'_> {
    type Item = JobPlanEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let classification = self.plan.assignments.get(self.next)?.clone();
        self.next += 1;
        let ordinal = self.next as u32;
        Some(JobPlanEntry {
            ordinal,
            job_id: job_id(&self.plan.id_prefix, ordinal),
            classification,
            start_delay: start_delay(self.plan.target_start, self.clock.now()),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.plan.assignments.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PlanEntries<'_> {}

/// Builds [BatchPlan] values against a shared clock.
#[derive(Clone)]
pub struct BatchPlanner {
    clock: Arc<dyn Clock>,
}

impl Default for BatchPlanner {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl BatchPlanner {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Plans a run using the thread-local RNG for explicit-count shuffles.
    pub fn plan(&self, config: &RunConfig) -> Result<BatchPlan, PlanError> {
        self.plan_with_rng(config, &mut rand::thread_rng())
    }

    pub fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        config: &RunConfig,
        rng: &mut R,
    ) -> Result<BatchPlan, PlanError> {
        config.validate()?;
        let fairness_enabled = config.mode == RunMode::Fairness && !config.disable_fairness;
        let (assignments, explicit) = match config.mode {
            RunMode::Priority => (priority_assignments(config.job_count), false),
            RunMode::Fairness => fairness_assignments(config, rng),
        };

        let effective_job_count = assignments.len() as u32;
        let job_count_overridden = explicit && effective_job_count != config.job_count;
        if job_count_overridden {
            log::warn!(
                "fairload_plan job_count_overridden id_prefix={} requested={} effective={}",
                config.id_prefix,
                config.job_count,
                effective_job_count
            );
        }

        let planned_at = self.clock.now();
        let window = start_window(config.mode, effective_job_count);
        let plan = BatchPlan {
            id_prefix: config.id_prefix.clone(),
            mode: config.mode,
            requested_job_count: config.job_count,
            effective_job_count,
            job_count_overridden,
            explicit_distribution: explicit,
            fairness_enabled,
            planned_at,
            start_window: window,
            target_start: target_start(planned_at, config.mode, effective_job_count),
            assignments,
        };
        log::info!(
            "fairload_plan planned id_prefix={} mode={} jobs={} window_secs={} explicit={}",
            plan.id_prefix,
            plan.mode.as_str(),
            plan.effective_job_count,
            plan.start_window.num_seconds(),
            plan.explicit_distribution
        );
        Ok(plan)
    }
}

fn priority_assignments(job_count: u32) -> Vec<Classification> {
    (1..=job_count)
        .map(|ordinal| Classification::Priority {
            priority: priority_for_ordinal(ordinal),
        })
        .collect()
}

fn fairness_assignments<R: Rng + ?Sized>(
    config: &RunConfig,
    rng: &mut R,
) -> (Vec<Classification>, bool) {
    let bands = effective_bands(&config.bands);
    let tag = |band: &crate::models::Band| Classification::Fairness {
        key: band.key.clone(),
        weight: band.weight,
    };

    if has_explicit_counts(&bands) {
        let order = shuffled_distribution(&bands, rng);
        return (order.iter().map(tag).collect(), true);
    }

    let assignments = (1..=config.job_count)
        .filter_map(|ordinal| band_for_ordinal(&bands, ordinal).map(tag))
        .collect();
    (assignments, false)
}
