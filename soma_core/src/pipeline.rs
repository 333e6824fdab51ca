//! Per-frame classification pipeline.
//!
//! The frame source calls [`SomaPipeline::on_frame`] once per sensor frame,
//! in timestamp order.  All work happens synchronously inside that call.

use rand::rngs::StdRng;
use serde::Serialize;

use crate::config::SomaConfig;
use crate::error::ConfigError;
use crate::feature::FeatureVector;
use crate::frame_counter::FrameCounter;
use crate::hand::{FingerFill, Frame, Hand, NoisyFill};
use crate::hand_position::{Classification, HandPositionClassifier};
use crate::hand_shape::{HandShape, HandShapeClassifier};
use crate::window::SlidingTimeWindow;

/// What the pipeline concluded after one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    pub timestamp:     u64,
    /// Debounced finger count; `None` until the first count is accepted.
    pub finger_count:  Option<u32>,
    /// Share of the finger window agreeing with the count at the last vote.
    pub certainty:     f64,
    pub shape:         HandShape,
    pub shape_changed: bool,
    /// Present once the feature window is full enough and a trained
    /// classifier is attached.
    pub position:      Option<Classification>,
}

pub struct SomaPipeline<F = NoisyFill<StdRng>> {
    config:    SomaConfig,
    fill:      F,
    frames:    FrameCounter,
    shape:     HandShapeClassifier,
    features:  SlidingTimeWindow<FeatureVector>,
    positions: Option<HandPositionClassifier>,
}

impl SomaPipeline {
    /// Pipeline with noisy placeholder fingers seeded from OS entropy.
    pub fn new(config: SomaConfig) -> Result<Self, ConfigError> {
        Self::with_fill(config, NoisyFill::from_entropy())
    }
}

impl<F: FingerFill> SomaPipeline<F> {
    pub fn with_fill(config: SomaConfig, fill: F) -> Result<Self, ConfigError> {
        let shape = HandShapeClassifier::from_config(&config)?;
        Ok(SomaPipeline {
            config,
            fill,
            frames: FrameCounter::new(),
            shape,
            features: SlidingTimeWindow::new(config.feature_window_us),
            positions: None,
        })
    }

    /// Attach a trained position classifier.
    pub fn with_position_classifier(mut self, classifier: HandPositionClassifier) -> Self {
        self.positions = Some(classifier);
        self
    }

    pub fn set_position_classifier(&mut self, classifier: HandPositionClassifier) {
        self.positions = Some(classifier);
    }

    /// Run every component on one frame.
    ///
    /// # Panics
    /// If `frame.timestamp` is not newer than the previous frame's.
    pub fn on_frame(&mut self, frame: &Frame) -> FrameReport {
        let ts = frame.timestamp;
        self.frames.update(ts);

        let hand = Hand::from_fingers(&frame.fingers, &mut self.fill);
        self.features.add(ts, FeatureVector::from_hand(&hand));
        self.shape.add(ts, &frame.fingers);

        let position = match &self.positions {
            Some(classifier) if self.features.fullness(ts) > self.config.fullness_threshold => {
                let batch: Vec<FeatureVector> = self.features.samples().copied().collect();
                classifier.classify(&batch).ok()
            }
            _ => None,
        };

        FrameReport {
            timestamp: ts,
            finger_count: self.shape.finger_count(),
            certainty: self.shape.finger_counter().certainty(),
            shape: self.shape.shape(),
            shape_changed: self.shape.has_changed(),
            position,
        }
    }

    pub fn shape(&self) -> HandShape {
        self.shape.shape()
    }

    pub fn has_changed(&self) -> bool {
        self.shape.has_changed()
    }

    pub fn finger_count(&self) -> Option<u32> {
        self.shape.finger_count()
    }

    /// Feature vectors in the feature window, newest first.  Use these as a
    /// labelled batch for [`HandPositionClassifier::train`].
    pub fn recent_features(&self) -> Vec<FeatureVector> {
        self.features.samples().copied().collect()
    }

    pub fn frame_counter(&self) -> &FrameCounter {
        &self.frames
    }

    pub fn config(&self) -> &SomaConfig {
        &self.config
    }

    /// Drop all history, e.g. after the frame source reconnects with a new
    /// clock.  The attached classifier is kept.
    pub fn reset(&mut self) {
        self.shape.reset();
        self.features.clear();
        self.frames = FrameCounter::new();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::Finger;
    use crate::hand_position::HandPosition;
    use crate::vector::Vec3;

    const FRAME_US: u64 = 10_000;

    fn pipeline() -> SomaPipeline<NoisyFill<StdRng>> {
        SomaPipeline::with_fill(SomaConfig::default(), NoisyFill::seeded(11)).unwrap()
    }

    fn tip(x: f32) -> Finger {
        Finger::new(Vec3::new(x, 180.0, 0.0), Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = SomaConfig { feature_window_us: 0, ..SomaConfig::default() };
        assert!(SomaPipeline::new(cfg).is_err());
    }

    #[test]
    fn report_tracks_shape_transitions() {
        let mut p = pipeline();
        let mut changes = Vec::new();
        let mut ts = 0;
        for fingers in [vec![tip(0.0)], vec![tip(0.0), tip(40.0), tip(80.0), tip(120.0)]] {
            for _ in 0..40 {
                let r = p.on_frame(&Frame::new(ts, fingers.clone()));
                if r.shape_changed {
                    changes.push(r.shape);
                }
                ts += FRAME_US;
            }
        }
        assert_eq!(changes, vec![HandShape::Pointing, HandShape::Stopping]);
        assert_eq!(p.finger_count(), Some(4));
        assert_eq!(p.frame_counter().frames(), 80);
    }

    #[test]
    fn no_position_without_classifier() {
        let mut p = pipeline();
        let mut last = None;
        for i in 0..100 {
            last = Some(p.on_frame(&Frame::new(i * FRAME_US, vec![tip(0.0)])));
        }
        assert_eq!(last.unwrap().position, None);
        // the feature window holds 500 ms of history
        assert_eq!(p.recent_features().len(), 51);
    }

    #[test]
    fn position_reported_once_feature_window_fills() {
        let mut trainer = pipeline();
        for i in 0..60 {
            trainer.on_frame(&Frame::new(i * FRAME_US, vec![tip(0.0)]));
        }
        let mut classifier = HandPositionClassifier::new();
        classifier.train(HandPosition::Pointing, &trainer.recent_features()).unwrap();

        let mut p = pipeline().with_position_classifier(classifier);
        let early = p.on_frame(&Frame::new(0, vec![tip(0.0)]));
        assert_eq!(early.position, None);

        let mut last = early;
        for i in 1..60 {
            last = p.on_frame(&Frame::new(i * FRAME_US, vec![tip(0.0)]));
        }
        assert_eq!(last.position.map(|c| c.position), Some(HandPosition::Pointing));
    }

    #[test]
    fn reset_clears_history() {
        let mut p = pipeline();
        for i in 0..40 {
            p.on_frame(&Frame::new(i * FRAME_US, vec![]));
        }
        assert_eq!(p.shape(), HandShape::Zero);
        p.reset();
        assert_eq!(p.shape(), HandShape::Unknown);
        assert!(p.recent_features().is_empty());
        // timestamps may restart after a reset
        p.on_frame(&Frame::new(0, vec![]));
    }
}
