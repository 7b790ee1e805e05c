use thiserror::Error;

/// Configuration errors.
///
/// Only configuration entry points return these. Scroll, measurement and range queries never
/// fail: anomalies there degrade to the best available estimate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WallError {
    #[error("column count must be at least 1 (got {0})")]
    InvalidColumnCount(usize),

    #[error("size estimator field `{field}` must be non-zero")]
    InvalidEstimator { field: &'static str },

    #[error("measurement epsilon must be finite and non-negative")]
    InvalidEpsilon,
}
