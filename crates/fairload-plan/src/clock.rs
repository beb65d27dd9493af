//! Wall-clock source for start-time planning.

use chrono::{DateTime, Utc};

/// Source of "now". The planner reads it once for the batch target and again
/// for every submitted job.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
