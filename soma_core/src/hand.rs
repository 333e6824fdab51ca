//! Raw frames and the fixed five-slot hand built from them.
//!
//! The sensor reports however many fingertips it currently sees.  Feature
//! extraction wants exactly five, so a [`Hand`] always carries five slots:
//! the detected fingers sorted left to right, followed by placeholders drawn
//! from a [`FingerFill`] policy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::vector::Vec3;

/// Number of finger slots in a [`Hand`].
pub const HAND_SLOTS: usize = 5;

// ════════════════════════════════════════════════════════════════════════════
// Finger / Frame
// ════════════════════════════════════════════════════════════════════════════

/// One fingertip descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Finger {
    /// Tip position (mm).
    pub position:  Vec3,
    /// Tip velocity (mm/s).
    pub velocity:  Vec3,
    /// Unit pointing direction.
    pub direction: Vec3,
}

impl Finger {
    pub const fn new(position: Vec3, velocity: Vec3, direction: Vec3) -> Self {
        Finger { position, velocity, direction }
    }
}

/// One timestamped snapshot from the frame source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Sensor timestamp (µs).
    pub timestamp: u64,
    /// Every fingertip the sensor reported, in sensor order.
    pub fingers:   Vec<Finger>,
}

impl Frame {
    pub fn new(timestamp: u64, fingers: Vec<Finger>) -> Self {
        Frame { timestamp, fingers }
    }

    /// Raw, undebounced finger count.
    pub fn finger_count(&self) -> u32 {
        self.fingers.len() as u32
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Fill policy
// ════════════════════════════════════════════════════════════════════════════

/// Supplies a placeholder for every slot the sensor left empty.
pub trait FingerFill {
    fn placeholder(&mut self) -> Finger;
}

impl<F: FnMut() -> Finger> FingerFill for F {
    fn placeholder(&mut self) -> Finger {
        self()
    }
}

/// Bounded random placeholders.
///
/// Position and velocity are uniform in `[-1, 1]^3`; the direction is the
/// same kind of noise pushed 100 units down and normalised, so it points
/// roughly at the floor.  Keeping the placeholders noisy stops an empty slot
/// from collapsing to a zero-variance feature during training.
#[derive(Debug, Clone)]
pub struct NoisyFill<R> {
    rng: R,
}

impl NoisyFill<StdRng> {
    pub fn from_entropy() -> Self {
        NoisyFill { rng: StdRng::from_entropy() }
    }

    /// Reproducible placeholders.
    pub fn seeded(seed: u64) -> Self {
        NoisyFill { rng: StdRng::seed_from_u64(seed) }
    }
}

impl<R: Rng> NoisyFill<R> {
    fn noise(&mut self) -> Vec3 {
        Vec3::new(
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
        )
    }
}

impl<R: Rng> FingerFill for NoisyFill<R> {
    fn placeholder(&mut self) -> Finger {
        let position  = self.noise();
        let velocity  = self.noise();
        let direction = (self.noise() + Vec3::new(0.0, -100.0, 0.0)).normalized();
        Finger { position, velocity, direction }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Hand
// ════════════════════════════════════════════════════════════════════════════

/// Exactly five finger slots.  Slots `0..detected()` hold real fingers
/// ordered by increasing tip x; the rest are placeholders.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    fingers:  [Finger; HAND_SLOTS],
    detected: usize,
}

impl Hand {
    /// Build a hand from at most the first five detected fingers.
    pub fn from_fingers(fingers: &[Finger], fill: &mut impl FingerFill) -> Self {
        let mut real: Vec<Finger> = fingers.iter().take(HAND_SLOTS).copied().collect();
        real.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));

        let detected = real.len();
        let mut slots = [Finger::default(); HAND_SLOTS];
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = match real.get(i) {
                Some(f) => *f,
                None    => fill.placeholder(),
            };
        }
        Hand { fingers: slots, detected }
    }

    pub fn fingers(&self) -> &[Finger; HAND_SLOTS] {
        &self.fingers
    }

    /// How many leading slots hold real fingers.
    pub fn detected(&self) -> usize {
        self.detected
    }

    pub fn is_placeholder(&self, slot: usize) -> bool {
        slot >= self.detected
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
