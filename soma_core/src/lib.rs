//! # soma_core
//!
//! Turns a stream of timestamped hand-pose frames into temporally stable,
//! symbolic state: a debounced finger count, a discrete hand shape and a
//! maximum-likelihood hand position.
//!
//! Everything here is frame-synchronous.  Each component is updated once per
//! incoming frame, in non-decreasing timestamp order, and keeps only a
//! bounded window of history.
//!
//! ## Components (leaf first)
//!
//! | Module | Provides |
//! |---|---|
//! | [`vector`] | [`Vec3`] positions, velocities and directions |
//! | [`hand`] | [`Finger`], [`Frame`], fixed five-slot [`Hand`] + fill policy |
//! | [`feature`] | 46-dimension [`FeatureVector`] and its motion-zeroed form |
//! | [`window`] | [`SlidingTimeWindow`]: bounded-duration FIFO |
//! | [`stats`] | [`RunningStats`] plus `mode` / `average` / `variance` |
//! | [`finger_counter`] | [`FingerCounter`]: fullness + majority-vote debounce |
//! | [`hand_shape`] | [`HandShapeClassifier`]: rule-based shape state machine |
//! | [`hand_position`] | [`HandPositionClassifier`]: diagonal Gaussian ML model |
//! | [`pipeline`] | [`SomaPipeline::on_frame`]: all of the above, per frame |
//!
//! ## Quick start
//!
//! ```rust
//! use soma_core::{Finger, Frame, HandShape, SomaConfig, SomaPipeline, Vec3};
//!
//! let mut soma = SomaPipeline::new(SomaConfig::default()).unwrap();
//! let tip = Finger::new(Vec3::new(0.0, 200.0, 0.0), Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
//!
//! let mut report = None;
//! for i in 0..50u64 {
//!     report = Some(soma.on_frame(&Frame::new(i * 10_000, vec![tip])));
//! }
//! assert_eq!(report.unwrap().shape, HandShape::Pointing);
//! ```

pub mod config;
pub mod error;
pub mod feature;
pub mod finger_counter;
pub mod frame_counter;
pub mod hand;
pub mod hand_position;
pub mod hand_shape;
pub mod pipeline;
pub mod stats;
pub mod vector;
pub mod window;

pub use config::SomaConfig;
pub use error::{ConfigError, PositionError};
pub use feature::{FeatureVector, FEATURE_DIM};
pub use finger_counter::FingerCounter;
pub use frame_counter::FrameCounter;
pub use hand::{Finger, FingerFill, Frame, Hand, NoisyFill, HAND_SLOTS};
pub use hand_position::{Classification, HandPosition, HandPositionClassifier};
pub use hand_shape::{HandShape, HandShapeClassifier};
pub use pipeline::{FrameReport, SomaPipeline};
pub use stats::RunningStats;
pub use vector::Vec3;
pub use window::SlidingTimeWindow;
