//! Synchronized start-time models.
//!
//! Jobs are submitted one at a time, so a single target instant is computed
//! per batch and every submission asks for `target - now`. Later submissions
//! see a later "now" and therefore a shorter delay, which pulls all starts
//! toward the same instant.
//!
//! The coefficients below were calibrated against a live engine and must not
//! change without re-measuring.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::models::RunMode;

/// Per-job submission cost assumed by the priority model, in seconds.
pub const PRIORITY_SECS_PER_JOB: f64 = 0.05;
/// Fixed buffer added by the priority model, in seconds.
pub const PRIORITY_BUFFER_SECS: f64 = 5.0;

pub const FAIRNESS_SECS_PER_JOB: f64 = 0.15;
pub const FAIRNESS_OFFSET_SECS: f64 = 15.0;
pub const FAIRNESS_MIN_WINDOW_SECS: i64 = 7;
pub const FAIRNESS_MAX_WINDOW_SECS: i64 = 30;

/// Whole seconds needed to submit a priority batch: `trunc(n * 0.05 + 5)`.
pub fn priority_start_window_secs(job_count: u32) -> i64 {
    (job_count as f64 * PRIORITY_SECS_PER_JOB + PRIORITY_BUFFER_SECS) as i64
}

/// Whole seconds needed to submit a fairness batch:
/// `clamp(ceil(0.15 * n - 15), 7, 30)`.
pub fn fairness_start_window_secs(job_count: u32) -> i64 {
    let scaled = (FAIRNESS_SECS_PER_JOB * job_count as f64 - FAIRNESS_OFFSET_SECS).ceil() as i64;
    scaled.clamp(FAIRNESS_MIN_WINDOW_SECS, FAIRNESS_MAX_WINDOW_SECS)
}

/// Start window for a mode. `job_count` is the effective count, i.e. the
/// explicit-count total when band counts override the requested count.
pub fn start_window(mode: RunMode, job_count: u32) -> chrono::Duration {
    let secs = match mode {
        RunMode::Priority => priority_start_window_secs(job_count),
        RunMode::Fairness => fairness_start_window_secs(job_count),
    };
    chrono::Duration::seconds(secs)
}

/// Target instant for a batch planned at `now`.
pub fn target_start(now: DateTime<Utc>, mode: RunMode, job_count: u32) -> DateTime<Utc> {
    now + start_window(mode, job_count)
}

/// Delay from `now` until `target`, clamped to zero once the target has passed.
pub fn start_delay(target: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (target - now).to_std().unwrap_or(Duration::ZERO)
}
