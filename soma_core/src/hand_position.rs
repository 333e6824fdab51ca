//! Diagonal-covariance Gaussian hand position classifier.
//!
//! Each trained label keeps a [`RunningStats`] over motion-zeroed feature
//! vectors, treating every dimension as an independent normal distribution.
//! Scoring a batch sums, over all vectors and all dimensions with non-zero
//! variance, the log-likelihood term `−(x − μ)² / 2σ²`; the label with the
//! largest sum wins.
//!
//! Scoring is batch oriented: callers pass a short run of consecutive frames
//! (normally the pipeline's feature window) rather than a single vector, which
//! trades a little latency for robustness to single-frame noise.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::error::PositionError;
use crate::feature::{FeatureVector, FEATURE_DIM};
use crate::stats::RunningStats;

// ════════════════════════════════════════════════════════════════════════════
// HandPosition
// ════════════════════════════════════════════════════════════════════════════

/// Declaration order is the enumeration order used to break score ties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandPosition {
    Unknown,
    Pointing,
    Clicking,
    Scrolling,
    Centering,
}

impl HandPosition {
    /// Every trainable label, in enumeration order.
    pub const LABELS: [HandPosition; 4] = [
        HandPosition::Pointing,
        HandPosition::Clicking,
        HandPosition::Scrolling,
        HandPosition::Centering,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown   => "unknown",
            Self::Pointing  => "pointing",
            Self::Clicking  => "clicking",
            Self::Scrolling => "scrolling",
            Self::Centering => "centering",
        }
    }
}

impl fmt::Display for HandPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Winning label and its accumulated log-likelihood (≤ 0).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Classification {
    pub position: HandPosition,
    pub score:    f64,
}

// ════════════════════════════════════════════════════════════════════════════
// HandPositionClassifier
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct HandPositionClassifier {
    classes: BTreeMap<HandPosition, RunningStats<FEATURE_DIM>>,
}

impl HandPositionClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a labelled batch.  Velocity channels are zeroed first.
    /// Training the same label again extends its statistics.
    pub fn train(&mut self, label: HandPosition, batch: &[FeatureVector]) -> Result<(), PositionError> {
        if label == HandPosition::Unknown {
            return Err(PositionError::UntrainableLabel(label));
        }
        if batch.is_empty() {
            return Err(PositionError::EmptyTrainingBatch(label));
        }

        let stats = self.classes.entry(label).or_default();
        for fv in batch {
            stats.update(fv.zero_motion().as_array());
        }

        for j in 0..FEATURE_DIM {
            trace!(
                label = %label,
                dim = j,
                mean = stats.mean(j),
                std_dev = stats.std_dev(j),
                "trained dimension"
            );
        }
        Ok(())
    }

    pub fn is_trained(&self, label: HandPosition) -> bool {
        self.classes.contains_key(&label)
    }

    /// Number of training vectors seen for `label`.
    pub fn observations(&self, label: HandPosition) -> usize {
        self.classes.get(&label).map_or(0, RunningStats::count)
    }

    /// Accumulated log-likelihood per trained label, in enumeration order.
    pub fn scores(&self, batch: &[FeatureVector]) -> Vec<(HandPosition, f64)> {
        let zeroed: Vec<FeatureVector> = batch.iter().map(FeatureVector::zero_motion).collect();

        self.classes
            .iter()
            .map(|(&label, stats)| {
                let mut ll = 0.0;
                for z in &zeroed {
                    for (j, &x) in z.iter().enumerate() {
                        let v = stats.variance(j);
                        // a constant dimension cannot discriminate
                        if v > 0.0 {
                            let d = x - stats.mean(j);
                            ll -= d * d / (2.0 * v);
                        }
                    }
                }
                (label, ll)
            })
            .collect()
    }

    /// Maximum-likelihood label for the batch.  Ties keep the label that
    /// comes first in enumeration order.
    pub fn classify(&self, batch: &[FeatureVector]) -> Result<Classification, PositionError> {
        if self.classes.is_empty() {
            return Err(PositionError::Untrained);
        }
        if batch.is_empty() {
            return Err(PositionError::EmptyBatch);
        }

        let mut best = Classification { position: HandPosition::Unknown, score: f64::NEG_INFINITY };
        for (label, score) in self.scores(batch) {
            trace!(label = %label, score, "position score");
            if score > best.score {
                best = Classification { position: label, score };
            }
        }
        Ok(best)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::MOTION_DIM;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Vectors scattered ±0.5 around `centre` in every non-motion channel.
    fn cluster(centre: f64, n: usize, seed: u64) -> Vec<FeatureVector> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                let mut v = [0.0; FEATURE_DIM];
                for x in v.iter_mut() {
                    *x = centre + rng.gen_range(-0.5..0.5);
                }
                FeatureVector::from(v)
            })
            .collect()
    }

    fn constant(value: f64) -> FeatureVector {
        FeatureVector::from([value; FEATURE_DIM])
    }

    #[test]
    fn untrained_classifier_errors() {
        let c = HandPositionClassifier::new();
        assert_eq!(c.classify(&[constant(0.0)]), Err(PositionError::Untrained));
    }

    #[test]
    fn empty_batch_errors() {
        let mut c = HandPositionClassifier::new();
        c.train(HandPosition::Pointing, &cluster(0.0, 10, 1)).unwrap();
        assert_eq!(c.classify(&[]), Err(PositionError::EmptyBatch));
    }

    #[test]
    fn unknown_label_and_empty_batch_rejected_for_training() {
        let mut c = HandPositionClassifier::new();
        assert_eq!(
            c.train(HandPosition::Unknown, &[constant(1.0)]),
            Err(PositionError::UntrainableLabel(HandPosition::Unknown))
        );
        assert_eq!(
            c.train(HandPosition::Clicking, &[]),
            Err(PositionError::EmptyTrainingBatch(HandPosition::Clicking))
        );
        assert!(!c.is_trained(HandPosition::Clicking));
    }

    #[test]
    fn centre_of_cluster_classified_as_its_label() {
        let mut c = HandPositionClassifier::new();
        c.train(HandPosition::Pointing, &cluster(0.0, 50, 1)).unwrap();
        c.train(HandPosition::Scrolling, &cluster(10.0, 50, 2)).unwrap();

        let got = c.classify(&[constant(0.0)]).unwrap();
        assert_eq!(got.position, HandPosition::Pointing);
        assert!(got.score <= 0.0);

        let got = c.classify(&[constant(10.0)]).unwrap();
        assert_eq!(got.position, HandPosition::Scrolling);
    }

    #[test]
    fn motion_channels_are_ignored() {
        let mut c = HandPositionClassifier::new();
        c.train(HandPosition::Pointing, &cluster(0.0, 50, 3)).unwrap();
        c.train(HandPosition::Centering, &cluster(5.0, 50, 4)).unwrap();

        // velocities scream "centering", the pose says "pointing"
        let mut v = [0.0; FEATURE_DIM];
        v[..MOTION_DIM].fill(5.0);
        let got = c.classify(&[FeatureVector::from(v)]).unwrap();
        assert_eq!(got.position, HandPosition::Pointing);
    }

    #[test]
    fn zero_variance_dimensions_are_skipped() {
        let mut c = HandPositionClassifier::new();
        c.train(HandPosition::Clicking, &[constant(2.0), constant(2.0)]).unwrap();
        let scores = c.scores(&[constant(100.0)]);
        assert_eq!(scores, vec![(HandPosition::Clicking, 0.0)]);
    }

    #[test]
    fn inexact_constant_dimensions_are_skipped() {
        let mut c = HandPositionClassifier::new();
        c.train(HandPosition::Pointing, &[constant(0.7); 3]).unwrap();
        assert_eq!(c.scores(&[constant(0.9)]), vec![(HandPosition::Pointing, 0.0)]);
    }

    #[test]
    fn ties_go_to_enumeration_order() {
        let mut c = HandPositionClassifier::new();
        // identical statistics for two labels, trained out of order
        c.train(HandPosition::Centering, &cluster(1.0, 20, 9)).unwrap();
        c.train(HandPosition::Clicking, &cluster(1.0, 20, 9)).unwrap();
        let got = c.classify(&[constant(1.3)]).unwrap();
        assert_eq!(got.position, HandPosition::Clicking);
    }

    #[test]
    fn scores_listed_in_enumeration_order() {
        let mut c = HandPositionClassifier::new();
        for (i, label) in HandPosition::LABELS.iter().rev().enumerate() {
            c.train(*label, &cluster(i as f64, 10, i as u64)).unwrap();
        }
        let labels: Vec<HandPosition> = c.scores(&[constant(0.0)]).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, HandPosition::LABELS.to_vec());
    }

    #[test]
    fn batch_scores_accumulate() {
        let mut c = HandPositionClassifier::new();
        c.train(HandPosition::Pointing, &cluster(0.0, 30, 5)).unwrap();
        let one = c.scores(&[constant(0.4)])[0].1;
        let three = c.scores(&[constant(0.4); 3])[0].1;
        assert!((three - 3.0 * one).abs() < 1e-9 * one.abs().max(1.0));
    }

    #[test]
    fn retraining_extends_statistics() {
        let mut c = HandPositionClassifier::new();
        c.train(HandPosition::Scrolling, &cluster(0.0, 10, 6)).unwrap();
        c.train(HandPosition::Scrolling, &cluster(0.0, 15, 7)).unwrap();
        assert_eq!(c.observations(HandPosition::Scrolling), 25);
        assert_eq!(c.observations(HandPosition::Pointing), 0);
    }
}
