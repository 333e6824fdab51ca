//! Rule-based hand shape state machine.
//!
//! The debounced finger count settles most shapes on its own:
//!
//! | Debounced count | Shape |
//! |---|---|
//! | none yet | `Unknown` |
//! | 0 | `Zero` |
//! | 1 | `Pointing` |
//! | 2 | `Scrolling` or `Pointing`, by two-finger geometry |
//! | 3 | `Unknown` (ambiguous, left unresolved) |
//! | 4, 5 | `Stopping` |
//! | anything else | `Unknown` |
//!
//! Two level, side-by-side fingers are a scroll; two fingers at an angle are
//! still pointing.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::SomaConfig;
use crate::error::ConfigError;
use crate::finger_counter::FingerCounter;
use crate::hand::Finger;
use crate::vector::Vec3;
use crate::window::SlidingTimeWindow;

/// Maximum XY-plane slope (degrees) between two scrolling fingertips.
pub const SCROLL_MAX_XY_SLOPE_DEG: f32 = 20.0;
/// Maximum XZ-plane slope (degrees) between two scrolling fingertips.
pub const SCROLL_MAX_XZ_SLOPE_DEG: f32 = 15.0;

// ════════════════════════════════════════════════════════════════════════════
// HandShape
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandShape {
    Unknown,
    Zero,
    Pointing,
    Scrolling,
    Stopping,
}

impl HandShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown   => "unknown",
            Self::Zero      => "zero",
            Self::Pointing  => "pointing",
            Self::Scrolling => "scrolling",
            Self::Stopping  => "stopping",
        }
    }
}

impl fmt::Display for HandShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Two-finger geometry
// ════════════════════════════════════════════════════════════════════════════

/// Slope angles (degrees) of the segment between two fingertips, in the XY
/// and XZ planes.  Both are in `[0, 90]`.
pub fn two_finger_slopes(a: Vec3, b: Vec3) -> (f32, f32) {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let dz = (a.z - b.z).abs();
    (dy.atan2(dx).to_degrees(), dz.atan2(dx).to_degrees())
}

/// `Scrolling` when the fingertips are roughly level and roughly coplanar in
/// depth, otherwise `Pointing`.
pub fn two_finger_shape(a: Vec3, b: Vec3) -> HandShape {
    let (xy, xz) = two_finger_slopes(a, b);
    if xy < SCROLL_MAX_XY_SLOPE_DEG && xz < SCROLL_MAX_XZ_SLOPE_DEG {
        HandShape::Scrolling
    } else {
        HandShape::Pointing
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandShapeClassifier
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct HandShapeClassifier {
    counter: FingerCounter,
    recent:  SlidingTimeWindow<Vec<Finger>>,
    current: HandShape,
    changed: bool,
}

impl HandShapeClassifier {
    /// `finger_window` feeds the internal [`FingerCounter`]; `shape_window`
    /// bounds the raw samples kept for inspection.
    pub fn new(finger_window: u64, shape_window: u64) -> Self {
        HandShapeClassifier {
            counter: FingerCounter::new(finger_window),
            recent:  SlidingTimeWindow::new(shape_window),
            current: HandShape::Unknown,
            changed: false,
        }
    }

    pub fn from_config(cfg: &SomaConfig) -> Result<Self, ConfigError> {
        Ok(HandShapeClassifier {
            counter: FingerCounter::from_config(cfg)?,
            recent:  SlidingTimeWindow::new(cfg.shape_window_us),
            current: HandShape::Unknown,
            changed: false,
        })
    }

    /// Feed one frame's fingers: update the debounced count, derive the
    /// shape, and note whether it differs from the previous call.
    ///
    /// # Panics
    /// If `ts` is not newer than the previous call.
    pub fn add(&mut self, ts: u64, fingers: &[Finger]) {
        let last = self.current;
        self.counter.update(ts, fingers.len() as u32);
        self.recent.add(ts, fingers.to_vec());
        self.current = self.classify(fingers);
        self.changed = last != self.current;
        if self.changed {
            debug!(from = %last, to = %self.current, ts, "hand shape changed");
        }
    }

    fn classify(&self, fingers: &[Finger]) -> HandShape {
        match self.counter.count() {
            None         => HandShape::Unknown,
            Some(0)      => HandShape::Zero,
            Some(1)      => HandShape::Pointing,
            Some(2)      => match fingers {
                [a, b] => two_finger_shape(a.position, b.position),
                // the raw frame disagrees with the debounced count; we are
                // mid-transition, so hold the previous shape
                _      => self.current,
            },
            Some(3)      => HandShape::Unknown,
            Some(4 | 5)  => HandShape::Stopping,
            Some(_)      => HandShape::Unknown,
        }
    }

    pub fn shape(&self) -> HandShape {
        self.current
    }

    /// Whether the last [`add`](Self::add) changed the shape.  Reading it
    /// does not clear it.
    pub fn has_changed(&self) -> bool {
        self.changed
    }

    /// Debounced finger count behind the current shape.
    pub fn finger_count(&self) -> Option<u32> {
        self.counter.count()
    }

    pub fn finger_counter(&self) -> &FingerCounter {
        &self.counter
    }

    /// Raw finger sets from the shape window, newest first.
    pub fn recent_samples(&self) -> impl Iterator<Item = (u64, &[Finger])> + '_ {
        self.recent.iter().map(|(ts, f)| (ts, f.as_slice()))
    }

    /// Whether the shape window spans more than `threshold` of its duration.
    pub fn is_settled(&self, ts: u64, threshold: f64) -> bool {
        self.recent.fullness(ts) > threshold
    }

    pub fn reset(&mut self) {
        self.counter.reset();
        self.recent.clear();
        self.current = HandShape::Unknown;
        self.changed = false;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
