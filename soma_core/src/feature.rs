//! Fixed-width feature vector derived from a [`Hand`].
//!
//! Layout (all `f64`):
//!
//! | Range | Channels |
//! |---|---|
//! | `0..15`  | tip velocity x/y/z for slots 0–4 |
//! | `15..30` | tip direction x/y/z for slots 0–4 |
//! | `30..34` | distance between neighbouring tips (0–1, 1–2, 2–3, 3–4) |
//! | `34..46` | offset between neighbouring tips, x/y/z |

use std::ops::Deref;

use crate::hand::{Hand, HAND_SLOTS};

/// Velocity channels, zeroed by [`FeatureVector::zero_motion`].
pub const MOTION_DIM: usize = HAND_SLOTS * 3;
const DIRECTION_DIM: usize = HAND_SLOTS * 3;
const GAP_COUNT: usize = HAND_SLOTS - 1;

/// Length of every [`FeatureVector`].
pub const FEATURE_DIM: usize = MOTION_DIM + DIRECTION_DIM + GAP_COUNT + GAP_COUNT * 3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureVector([f64; FEATURE_DIM]);

impl FeatureVector {
    pub fn from_hand(hand: &Hand) -> Self {
        let f = hand.fingers();
        let mut v = [0.0; FEATURE_DIM];
        let mut i = 0;

        let mut push = |x: f32| {
            v[i] = f64::from(x);
            i += 1;
        };
        for finger in f {
            finger.velocity.to_array().into_iter().for_each(&mut push);
        }
        for finger in f {
            finger.direction.to_array().into_iter().for_each(&mut push);
        }
        for pair in f.windows(2) {
            push(pair[0].position.distance_to(pair[1].position));
        }
        for pair in f.windows(2) {
            (pair[0].position - pair[1].position).to_array().into_iter().for_each(&mut push);
        }
        debug_assert_eq!(i, FEATURE_DIM);

        FeatureVector(v)
    }

    /// Same vector with every velocity channel forced to zero, isolating the
    /// static pose from transient movement.
    pub fn zero_motion(&self) -> Self {
        let mut z = self.0;
        z[..MOTION_DIM].fill(0.0);
        FeatureVector(z)
    }

    pub fn as_array(&self) -> &[f64; FEATURE_DIM] {
        &self.0
    }
}

impl From<[f64; FEATURE_DIM]> for FeatureVector {
    fn from(v: [f64; FEATURE_DIM]) -> Self {
        FeatureVector(v)
    }
}

impl Deref for FeatureVector {
    type Target = [f64];
    fn deref(&self) -> &[f64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{Finger, NoisyFill};
    use crate::vector::Vec3;
    use approx::assert_relative_eq;

    fn spread_hand() -> Hand {
        let fingers: Vec<Finger> = (0..5)
            .map(|i| {
                let i = i as f32;
                Finger::new(
                    Vec3::new(i * 10.0, 100.0 + i, 0.0),
                    Vec3::new(1.0 + i, 2.0, 3.0),
                    Vec3::new(0.0, 0.0, -1.0),
                )
            })
            .collect();
        Hand::from_fingers(&fingers, &mut NoisyFill::seeded(0))
    }

    #[test]
    fn dimension_is_forty_six() {
        assert_eq!(FEATURE_DIM, 46);
    }

    #[test]
    fn channel_layout() {
        let fv = FeatureVector::from_hand(&spread_hand());
        // slot 1 velocity
        assert_eq!(fv[3], 2.0);
        assert_eq!(fv[4], 2.0);
        assert_eq!(fv[5], 3.0);
        // slot 0 direction
        assert_eq!(fv[17], -1.0);
        // gap 0–1 distance: sqrt(10² + 1²)
        assert_relative_eq!(fv[30], 101f64.sqrt(), epsilon = 1e-5);
        // gap 0–1 offset
        assert_eq!(fv[34], -10.0);
        assert_eq!(fv[35], -1.0);
        assert_eq!(fv[36], 0.0);
    }

    #[test]
    fn zero_motion_only_touches_velocity() {
        let fv = FeatureVector::from_hand(&spread_hand());
        let z = fv.zero_motion();
        assert!(z[..MOTION_DIM].iter().all(|&x| x == 0.0));
        assert_eq!(z[MOTION_DIM..], fv[MOTION_DIM..]);
    }

    #[test]
    fn placeholder_slots_still_produce_finite_features() {
        let hand = Hand::from_fingers(&[], &mut NoisyFill::seeded(3));
        let fv = FeatureVector::from_hand(&hand);
        assert!(fv.iter().all(|x| x.is_finite()));
    }
}
