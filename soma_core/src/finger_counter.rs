//! Debounced finger count.
//!
//! Raw per-frame counts flicker whenever the sensor loses or gains a
//! fingertip for a frame or two.  The counter only accepts a new count once
//! two gates pass:
//!
//! 1. **Fullness**: the window of raw counts spans more than
//!    `fullness_threshold` of its duration.
//! 2. **Certainty**: the modal count holds at least `certainty_threshold`
//!    of the samples in the window.
//!
//! A single misdetected frame therefore never flips the reported count.

use tracing::debug;

use crate::config::SomaConfig;
use crate::error::ConfigError;
use crate::stats::mode_of;
use crate::window::SlidingTimeWindow;

#[derive(Clone, Debug)]
pub struct FingerCounter {
    window:              SlidingTimeWindow<u32>,
    fullness_threshold:  f64,
    certainty_threshold: f64,
    /// `None` until the first count is accepted.
    current:             Option<u32>,
    certainty:           f64,
    changed:             bool,
}

impl FingerCounter {
    /// Counter with the default thresholds (0.85 fullness, 0.8 certainty).
    pub fn new(duration: u64) -> Self {
        Self::with_thresholds(
            duration,
            SomaConfig::DEFAULT_FULLNESS_THRESHOLD,
            SomaConfig::DEFAULT_CERTAINTY_THRESHOLD,
        )
    }

    pub fn with_thresholds(duration: u64, fullness_threshold: f64, certainty_threshold: f64) -> Self {
        FingerCounter {
            window: SlidingTimeWindow::new(duration),
            fullness_threshold,
            certainty_threshold,
            current: None,
            certainty: 0.0,
            changed: false,
        }
    }

    pub fn from_config(cfg: &SomaConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::with_thresholds(
            cfg.finger_window_us,
            cfg.fullness_threshold,
            cfg.certainty_threshold,
        ))
    }

    /// Record the raw count for frame `ts` and re-vote if the window is full
    /// enough.
    ///
    /// # Panics
    /// If `ts` is not newer than the previous update.
    pub fn update(&mut self, ts: u64, raw_count: u32) {
        self.changed = false;
        self.window.add(ts, raw_count);

        if self.window.fullness(ts) <= self.fullness_threshold {
            return;
        }
        let Some(modal) = mode_of(self.window.samples().copied()) else {
            return;
        };
        let votes = self.window.samples().filter(|&&c| c == modal).count();
        self.certainty = votes as f64 / self.window.len() as f64;
        if self.certainty < self.certainty_threshold {
            return;
        }

        if self.current != Some(modal) {
            debug!(
                from = ?self.current,
                to = modal,
                certainty = self.certainty,
                "finger count changed"
            );
            self.changed = true;
        }
        self.current = Some(modal);
    }

    /// Last accepted count, or `None` before the first acceptance.
    pub fn count(&self) -> Option<u32> {
        self.current
    }

    /// Share of the window held by the modal count at the last vote.
    pub fn certainty(&self) -> f64 {
        self.certainty
    }

    /// Whether the most recent `update` replaced the accepted count.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Fullness of the raw-count window at `ts`.
    pub fn fullness(&self, ts: u64) -> f64 {
        self.window.fullness(ts)
    }

    /// Forget all history and the accepted count.
    pub fn reset(&mut self) {
        self.window.clear();
        self.current = None;
        self.certainty = 0.0;
        self.changed = false;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FRAME_US: u64 = 10_000;

    fn feed(fc: &mut FingerCounter, start: u64, counts: &[u32]) -> u64 {
        let mut ts = start;
        for &c in counts {
            fc.update(ts, c);
            ts += FRAME_US;
        }
        ts
    }

    #[test]
    fn unknown_before_window_fills() {
        let mut fc = FingerCounter::new(200_000);
        feed(&mut fc, 0, &[3; 10]);
        // 9 frames × 10 ms = 90 ms spanned: not full yet
        assert_eq!(fc.count(), None);
    }

    #[test]
    fn sustained_count_is_accepted() {
        let mut fc = FingerCounter::new(200_000);
        feed(&mut fc, 0, &[3; 100]);
        assert_eq!(fc.count(), Some(3));
        assert_relative_eq!(fc.certainty(), 1.0);
    }

    #[test]
    fn accepted_once_fullness_passes_threshold() {
        let mut fc = FingerCounter::new(200_000);
        // 18 frames span 170 ms = 0.85 exactly, which is not "more than"
        feed(&mut fc, 0, &[2; 18]);
        assert_eq!(fc.count(), None);
        fc.update(180_000, 2);
        assert_eq!(fc.count(), Some(2));
        assert!(fc.is_changed());
    }

    #[test]
    fn single_outlier_does_not_flip_count() {
        let mut fc = FingerCounter::new(200_000);
        let mut counts = vec![3u32; 99];
        counts.insert(60, 7);
        let mut ts = 0;
        for c in counts {
            fc.update(ts, c);
            ts += FRAME_US;
            if fc.count().is_some() {
                assert_eq!(fc.count(), Some(3));
                assert!(fc.certainty() >= 0.8);
            }
        }
        assert_eq!(fc.count(), Some(3));
    }

    #[test]
    fn weak_majority_keeps_previous_count() {
        let mut fc = FingerCounter::new(200_000);
        let ts = feed(&mut fc, 0, &[1; 30]);
        assert_eq!(fc.count(), Some(1));

        // alternate 2/1 for a full window: mode is at most ~55 %
        let flicker: Vec<u32> = (0..30).map(|i| if i % 2 == 0 { 2 } else { 1 }).collect();
        feed(&mut fc, ts, &flicker);
        assert_eq!(fc.count(), Some(1));
        assert!(fc.certainty() < 0.8);
    }

    #[test]
    fn certainty_of_exactly_threshold_is_accepted() {
        let mut fc = FingerCounter::new(200_000);
        let mut counts = vec![1u32; 4];
        counts.extend([3; 16]);
        // 20 frames span 190 ms, all inside the window
        feed(&mut fc, 0, &counts);
        assert_eq!(fc.window.len(), 20);
        assert_eq!(fc.certainty(), 0.8);
        assert_eq!(fc.count(), Some(3));
        assert!(fc.is_changed());
    }

    #[test]
    fn switches_after_sustained_change() {
        let mut fc = FingerCounter::new(200_000);
        let ts = feed(&mut fc, 0, &[1; 30]);
        feed(&mut fc, ts, &[4; 30]);
        assert_eq!(fc.count(), Some(4));
    }

    #[test]
    fn changed_flag_only_on_transition() {
        let mut fc = FingerCounter::new(100_000);
        let ts = feed(&mut fc, 0, &[0; 30]);
        assert!(!fc.is_changed());
        fc.update(ts, 0);
        assert!(!fc.is_changed());
    }

    #[test]
    fn reset_forgets_count() {
        let mut fc = FingerCounter::new(100_000);
        feed(&mut fc, 0, &[5; 30]);
        fc.reset();
        assert_eq!(fc.count(), None);
        assert_eq!(fc.fullness(0), 0.0);
    }

    #[test]
    fn from_config_validates() {
        let bad = SomaConfig { finger_window_us: 0, ..SomaConfig::default() };
        assert!(FingerCounter::from_config(&bad).is_err());
        assert!(FingerCounter::from_config(&SomaConfig::default()).is_ok());
    }
}
