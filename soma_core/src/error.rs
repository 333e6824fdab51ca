//! Caller-facing error types.
//!
//! Ordering violations (stale or duplicate timestamps, statistics queried
//! with no observations) are programmer errors and panic at the call site
//! instead of appearing here.

use crate::hand_position::HandPosition;

/// Invalid configuration scalar.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A window duration of zero can never become full.
    #[error("{name} must be a non-zero duration in microseconds")]
    ZeroDuration {
        /// Name of the offending field.
        name: &'static str,
    },

    /// Fullness and certainty thresholds are fractions.
    #[error("{name} must lie in (0, 1], got {value}")]
    ThresholdOutOfRange {
        /// Name of the offending field.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Failure to train or query the hand position classifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PositionError {
    /// Only the four concrete positions can be trained.
    #[error("cannot train the {0} label")]
    UntrainableLabel(HandPosition),

    /// A training batch must contain at least one feature vector.
    #[error("training batch for {0} is empty")]
    EmptyTrainingBatch(HandPosition),

    /// No label has been trained yet.
    #[error("hand position classifier has not been trained")]
    Untrained,

    /// Classification needs at least one feature vector.
    #[error("cannot classify an empty batch of feature vectors")]
    EmptyBatch,
}
