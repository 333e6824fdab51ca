//! Tuning scalars shared by every stateful component.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Window durations (microseconds) and decision thresholds.
///
/// Serde-ready so that whichever collaborator owns a settings file can load
/// it; missing fields fall back to [`SomaConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SomaConfig {
    /// Raw finger-count history used for the majority vote.
    pub finger_window_us: u64,
    /// Recent raw samples kept by the hand shape classifier.
    pub shape_window_us: u64,
    /// Feature vectors scored together by the position classifier.
    pub feature_window_us: u64,
    /// A window must span more than this fraction of its duration before
    /// its contents are trusted.
    pub fullness_threshold: f64,
    /// Minimum share of the window the modal finger count must hold.
    pub certainty_threshold: f64,
}

impl SomaConfig {
    pub const DEFAULT_FINGER_WINDOW_US: u64 = 200_000;
    pub const DEFAULT_SHAPE_WINDOW_US: u64 = 100_000;
    pub const DEFAULT_FEATURE_WINDOW_US: u64 = 500_000;
    pub const DEFAULT_FULLNESS_THRESHOLD: f64 = 0.85;
    pub const DEFAULT_CERTAINTY_THRESHOLD: f64 = 0.8;

    /// Reject zero durations and thresholds outside `(0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, us) in [
            ("finger_window_us", self.finger_window_us),
            ("shape_window_us", self.shape_window_us),
            ("feature_window_us", self.feature_window_us),
        ] {
            if us == 0 {
                return Err(ConfigError::ZeroDuration { name });
            }
        }
        for (name, value) in [
            ("fullness_threshold", self.fullness_threshold),
            ("certainty_threshold", self.certainty_threshold),
        ] {
            // written so that NaN is rejected too
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

impl Default for SomaConfig {
    fn default() -> Self {
        SomaConfig {
            finger_window_us:    Self::DEFAULT_FINGER_WINDOW_US,
            shape_window_us:     Self::DEFAULT_SHAPE_WINDOW_US,
            feature_window_us:   Self::DEFAULT_FEATURE_WINDOW_US,
            fullness_threshold:  Self::DEFAULT_FULLNESS_THRESHOLD,
            certainty_threshold: Self::DEFAULT_CERTAINTY_THRESHOLD,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
