//! Input modes driven by the debounced finger count.
//!
//! | Fingers | Mode                                         |
//! |---------|----------------------------------------------|
//! | 0       | Zero                                         |
//! | 1       | Point, or Click once the position says so    |
//! | 2       | Scroll                                       |
//! | 5       | Center                                       |
//! | other   | Zero                                         |

use std::fmt;

use tracing::debug;

use soma_core::{Finger, HandPosition, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputMode {
    Zero,
    Point,
    Click,
    Scroll,
    Center,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Zero   => "zero",
            InputMode::Point  => "point",
            InputMode::Click  => "click",
            InputMode::Scroll => "scroll",
            InputMode::Center => "center",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PointsTracker — fingertips from frames that agree with the debounced count
// ════════════════════════════════════════════════════════════════════════════

/// Remembers the fingertip positions of the latest frame whose raw finger
/// count matches the debounced count, so a flickering frame never moves the
/// tracked points.
#[derive(Clone, Debug, Default)]
pub struct PointsTracker {
    points: Vec<Vec3>,
}

impl PointsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the frame was accepted.
    pub fn update(&mut self, debounced: Option<u32>, fingers: &[Finger]) -> bool {
        match debounced {
            Some(n) if n as usize == fingers.len() => {
                self.points.clear();
                self.points.extend(fingers.iter().map(|f| f.position));
                true
            }
            _ => false,
        }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Mean of the tracked points.
    pub fn centroid(&self) -> Option<Vec3> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self.points.iter().fold(Vec3::ZERO, |acc, &p| acc + p);
        let n = self.points.len() as f32;
        Some(Vec3::new(sum.x / n, sum.y / n, sum.z / n))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ModeSwitcher
// ════════════════════════════════════════════════════════════════════════════

/// Tracks the active [`InputMode`].
///
/// A single finger points until the position classifier reports
/// [`HandPosition::Clicking`].  Passing no position means "no opinion": the
/// mode stays on whichever of point or click it was on, so callers should
/// withhold the position while the finger count is still settling.
#[derive(Clone, Debug, Default)]
pub struct ModeSwitcher {
    current: Option<InputMode>,
}

impl ModeSwitcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mode `count` maps to from the current state.
    pub fn mode_for(&self, count: u32, position: Option<HandPosition>) -> InputMode {
        match (count, position) {
            (0, _)                            => InputMode::Zero,
            (1, Some(HandPosition::Clicking)) => InputMode::Click,
            (1, Some(_))                      => InputMode::Point,
            (1, None) if self.current == Some(InputMode::Click) => InputMode::Click,
            (1, None)                         => InputMode::Point,
            (2, _)                            => InputMode::Scroll,
            (5, _)                            => InputMode::Center,
            _                                 => InputMode::Zero,
        }
    }

    /// Feed the debounced count.  Returns the new mode when it differs from
    /// the current one; `None` counts leave the mode alone.
    pub fn update(&mut self, count: Option<u32>, position: Option<HandPosition>) -> Option<InputMode> {
        let mode = self.mode_for(count?, position);
        if self.current == Some(mode) {
            return None;
        }
        debug!(from = ?self.current, to = %mode, "input mode switched");
        self.current = Some(mode);
        Some(mode)
    }

    pub fn mode(&self) -> Option<InputMode> {
        self.current
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn finger_at(x: f32) -> Finger {
        Finger::new(Vec3::new(x, 200.0, 0.0), Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn tracker_ignores_disagreeing_frames() {
        let mut t = PointsTracker::new();
        assert!(t.update(Some(2), &[finger_at(-10.0), finger_at(10.0)]));
        assert!(!t.update(Some(2), &[finger_at(50.0)]));
        assert!(!t.update(None, &[finger_at(50.0)]));
        assert_eq!(t.points().len(), 2);
        assert_eq!(t.centroid(), Some(Vec3::new(0.0, 200.0, 0.0)));
    }

    #[test]
    fn empty_tracker_has_no_centroid() {
        let mut t = PointsTracker::new();
        assert!(t.update(Some(0), &[]));
        assert_eq!(t.centroid(), None);
    }

    #[test]
    fn count_to_mode_table() {
        let s = ModeSwitcher::new();
        assert_eq!(s.mode_for(0, None), InputMode::Zero);
        assert_eq!(s.mode_for(1, None), InputMode::Point);
        assert_eq!(s.mode_for(1, Some(HandPosition::Pointing)), InputMode::Point);
        assert_eq!(s.mode_for(1, Some(HandPosition::Clicking)), InputMode::Click);
        assert_eq!(s.mode_for(2, Some(HandPosition::Clicking)), InputMode::Scroll);
        assert_eq!(s.mode_for(3, None), InputMode::Zero);
        assert_eq!(s.mode_for(5, None), InputMode::Center);
        assert_eq!(s.mode_for(7, None), InputMode::Zero);
    }

    #[test]
    fn click_held_without_a_position() {
        let mut s = ModeSwitcher::new();
        assert_eq!(s.update(Some(1), Some(HandPosition::Clicking)), Some(InputMode::Click));
        assert_eq!(s.update(Some(1), None), None);
        assert_eq!(s.mode(), Some(InputMode::Click));
        assert_eq!(s.update(Some(1), Some(HandPosition::Pointing)), Some(InputMode::Point));
    }

    #[test]
    fn switcher_reports_only_transitions() {
        let mut s = ModeSwitcher::new();
        assert_eq!(s.update(None, None), None);
        assert_eq!(s.mode(), None);
        assert_eq!(s.update(Some(1), None), Some(InputMode::Point));
        assert_eq!(s.update(Some(1), None), None);
        assert_eq!(s.update(None, None), None);
        assert_eq!(s.mode(), Some(InputMode::Point));
        assert_eq!(s.update(Some(2), None), Some(InputMode::Scroll));
    }
}
