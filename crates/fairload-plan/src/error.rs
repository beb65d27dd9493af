use thiserror::Error;

/// Errors raised while turning a [crate::RunConfig] into a plan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("band key must not be empty")]
    EmptyBandKey,
    #[error("duplicate band key: {0}")]
    DuplicateBandKey(String),
    /// The requested count, or the sum of explicit band counts, is above
    /// [crate::MAX_JOB_COUNT] or does not fit in a `u32`.
    #[error("job count exceeds the maximum of {max}")]
    JobCountTooLarge { max: u32 },
}
