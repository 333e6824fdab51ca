//! Top-level controller loop.
//!
//! `AppState` owns the classification pipeline, the points tracker, the mode
//! switcher and the feedback sink.  It consumes one [`Frame`] at a time and
//! tells the run loop whether to keep going.

use std::path::Path;

use rand::rngs::StdRng;
use tracing::info;

use soma_core::{
    Frame, HandPosition, HandPositionClassifier, NoisyFill, SomaConfig, SomaPipeline,
};

use crate::error::AppError;
use crate::feedback::{Feedback, MidiFeedback, NullFeedback};
use crate::mode::{InputMode, ModeSwitcher, PointsTracker};
use crate::source::{spawn_frame_source, SimFrameSource, SimPose, SimStep};

/// Debounced finger count at or above which the controller quits.
pub const QUIT_FINGERS: u32 = 6;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub soma:      SomaConfig,
    /// Play MIDI cues on mode changes.
    pub sound:     bool,
    pub channel:   u8,
    pub velocity:  u8,
    /// Train the position classifier from simulated poses before starting.
    pub calibrate: bool,
    /// Pace simulated frames in real time.
    pub realtime:  bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            soma:      SomaConfig::default(),
            sound:     false,
            channel:   0,
            velocity:  100,
            calibrate: cfg!(not(feature = "leap")),
            realtime:  true,
        }
    }
}

/// Read a JSON [`SomaConfig`]; missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<SomaConfig, AppError> {
    let text = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&text, path)
}

fn parse_config(text: &str, path: &Path) -> Result<SomaConfig, AppError> {
    let cfg: SomaConfig = serde_json::from_str(text).map_err(|source| AppError::ConfigParse {
        path: path.display().to_string(),
        source,
    })?;
    cfg.validate()?;
    info!(path = %path.display(), ?cfg, "loaded config");
    Ok(cfg)
}

// ════════════════════════════════════════════════════════════════════════════
// Calibration
// ════════════════════════════════════════════════════════════════════════════

/// Simulated pose recorded for each trainable position.
pub const CALIBRATION_POSES: [(HandPosition, SimPose); 4] = [
    (HandPosition::Pointing,  SimPose::Point),
    (HandPosition::Clicking,  SimPose::Press),
    (HandPosition::Scrolling, SimPose::Scroll),
    (HandPosition::Centering, SimPose::Spread),
];

/// Train a position classifier by holding each calibration pose for two
/// feature windows and keeping the last full window.
pub fn calibrate(cfg: &SomaConfig, seed: u64) -> Result<HandPositionClassifier, AppError> {
    let mut classifier = HandPositionClassifier::new();
    for (i, (label, pose)) in CALIBRATION_POSES.into_iter().enumerate() {
        let seed = seed.wrapping_add(i as u64);
        let mut sim = SimFrameSource::new(vec![SimStep::new(pose, cfg.feature_window_us * 2)])
            .seeded(seed);
        let mut pipeline = SomaPipeline::with_fill(*cfg, NoisyFill::<StdRng>::seeded(seed))?;
        for frame in sim.frames() {
            pipeline.on_frame(&frame);
        }
        let batch = pipeline.recent_features();
        classifier.train(label, &batch)?;
        info!(position = %label, vectors = batch.len(), "calibrated");
    }
    Ok(classifier)
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control { Continue, Quit }

pub struct AppState<B: Feedback> {
    pipeline:   SomaPipeline,
    points:     PointsTracker,
    modes:      ModeSwitcher,
    feedback:   B,
    pub status: String,
}

impl<B: Feedback> AppState<B> {
    pub fn new(pipeline: SomaPipeline, feedback: B) -> Self {
        AppState {
            pipeline,
            points:   PointsTracker::new(),
            modes:    ModeSwitcher::new(),
            feedback,
            status:   "Ready".to_string(),
        }
    }

    // ── process one Frame ───────────────────────────────────────────────

    pub fn handle_frame(&mut self, frame: &Frame) -> Control {
        let report = self.pipeline.on_frame(frame);

        if report.finger_count.map_or(false, |n| n >= QUIT_FINGERS) {
            self.status = "Quit gesture".to_string();
            info!(fingers = ?report.finger_count, "quit gesture");
            return Control::Quit;
        }

        self.points.update(report.finger_count, &frame.fingers);

        if report.shape_changed {
            info!(shape = %report.shape, "hand shape");
        }

        // the position only counts once the finger window is unanimous
        let position = report.position
            .filter(|_| report.certainty >= 1.0)
            .map(|c| c.position);

        if let Some(mode) = self.modes.update(report.finger_count, position) {
            info!(mode = %mode, shape = %report.shape, centroid = ?self.points.centroid(), "input mode");
            self.status = format!("{mode}  ({} fingers, {})", report.finger_count.unwrap_or(0), report.shape);
            self.feedback.announce(mode);
        }

        Control::Continue
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn pipeline(&self) -> &SomaPipeline   { &self.pipeline }
    pub fn points(&self)   -> &PointsTracker  { &self.points }
    pub fn mode(&self)     -> Option<InputMode> { self.modes.mode() }
    pub fn feedback(&self) -> &B              { &self.feedback }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the controller until the quit gesture or until the frame source
/// disconnects.
///
/// Frames come from the simulator by default and from the LeapMotion
/// hardware with `--features leap`.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let mut pipeline = SomaPipeline::new(cfg.soma)?;
    if cfg.calibrate {
        pipeline.set_position_classifier(calibrate(&cfg.soma, rand::random())?);
    }

    let feedback: Box<dyn Feedback> = if cfg.sound {
        Box::new(MidiFeedback::spawn(cfg.channel, cfg.velocity))
    } else {
        Box::new(NullFeedback)
    };
    let mut app = AppState::new(pipeline, feedback);

    #[cfg(feature = "leap")]
    let frames = spawn_frame_source(crate::source::LeapFrameSource);
    #[cfg(not(feature = "leap"))]
    let frames = spawn_frame_source(
        SimFrameSource::new(SimFrameSource::demo_script()).realtime(cfg.realtime),
    );

    for frame in frames.iter() {
        if app.handle_frame(&frame) == Control::Quit {
            break;
        }
    }

    let counter = app.pipeline().frame_counter();
    match counter.fps() {
        Some(fps) => info!(frames = counter.frames(), fps, "stopped"),
        None      => info!(frames = counter.frames(), "stopped"),
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
