//! Frame sources: LeapMotion hardware and a scripted simulation.
//!
//! The public interface is a stream of [`Frame`]s delivered over an `mpsc`
//! channel.  Consumers don't need to know whether frames came from real
//! hardware or the simulator.  When the source finishes or fails it drops
//! its sender, which the consumer sees as a disconnect.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use soma_core::{Finger, Frame, Vec3};

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`Frame`]s over a channel, in strictly
/// increasing timestamp order.
pub trait FrameSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<Frame>);
}

/// Spawn a frame source on its own thread and return the receiving end.
pub fn spawn_frame_source<S: FrameSource>(source: S) -> Receiver<Frame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// LeapFrameSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Frame source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// Only the first tracked hand is used.  A digit counts as a finger when it
/// is extended, i.e. the straight-line distance from its metacarpal base to
/// its tip is at least [`EXTENDED_STRAIGHTNESS`] of the summed bone lengths.
/// LeapC reports no per-digit velocity, so every finger carries the palm
/// velocity.  Frames are stamped from the sensor's own frame timestamp via
/// [`SensorClock`], so poll jitter never reaches the windows.
#[cfg(feature = "leap")]
pub struct LeapFrameSource;

/// Straightness ratio above which a digit counts as extended.
#[cfg(feature = "leap")]
pub const EXTENDED_STRAIGHTNESS: f32 = 0.9;

#[cfg(feature = "leap")]
macro_rules! v3 {
    ($v:expr) => {{
        let v = $v;
        Vec3::new(v.x, v.y, v.z)
    }};
}

#[cfg(feature = "leap")]
impl FrameSource for LeapFrameSource {
    fn run(self: Box<Self>, tx: Sender<Frame>) {
        use leaprs::*;
        use tracing::error;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                error!(?e, "failed to create LeapC connection");
                return;
            }
        };
        if let Err(e) = connection.open() {
            error!(?e, "failed to open LeapMotion device");
            return;
        }
        info!("LeapMotion connection open");

        let mut clock = SensorClock::new();

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };
            let Event::Tracking(frame) = msg.event() else { continue };

            let fingers: Vec<Finger> = match frame.hands().next() {
                None => Vec::new(),
                Some(hand) => {
                    let velocity = v3!(hand.palm().velocity());
                    hand.digits()
                        .filter_map(|d| {
                            let bones = [d.metacarpal(), d.proximal(), d.intermediate(), d.distal()];
                            let length: f32 = bones.iter()
                                .map(|b| v3!(b.next_joint()).distance_to(v3!(b.prev_joint())))
                                .sum();
                            let base = v3!(d.metacarpal().prev_joint());
                            let tip  = v3!(d.distal().next_joint());
                            if length <= f32::EPSILON
                                || base.distance_to(tip) / length < EXTENDED_STRAIGHTNESS
                            {
                                return None;
                            }
                            let direction = (tip - v3!(d.distal().prev_joint())).normalized();
                            Some(Finger::new(tip, velocity, direction))
                        })
                        .collect()
                }
            };

            let Some(ts) = clock.stamp(frame.info().timestamp) else {
                debug!(raw = frame.info().timestamp, "dropping stale LeapC frame");
                continue;
            };

            if tx.send(Frame::new(ts, fingers)).is_err() {
                return;
            }
        }
    }
}

/// Maps sensor frame timestamps (LeapC µs, arbitrary origin) onto the
/// pipeline's clock: microseconds since the first frame, strictly increasing.
#[derive(Clone, Debug, Default)]
pub struct SensorClock {
    origin: Option<i64>,
    last:   Option<u64>,
}

impl SensorClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` for a frame that is not newer than the last one stamped.
    pub fn stamp(&mut self, raw_us: i64) -> Option<u64> {
        let origin = *self.origin.get_or_insert(raw_us);
        let ts = u64::try_from(raw_us.checked_sub(origin)?).ok()?;
        if self.last.map_or(false, |last| ts <= last) {
            return None;
        }
        self.last = Some(ts);
        Some(ts)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimFrameSource — scripted synthetic hand (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Poses the simulated hand can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimPose {
    /// No fingers extended.
    Fist,
    /// Index finger only.
    Point,
    /// Index finger pushed forward and up, as in a click.
    Press,
    /// Index and middle, level and side by side.
    Scroll,
    /// Index and middle in a V, one tip well above the other.
    Vee,
    /// All five fingers spread.
    Spread,
    /// Six tips, as two overlapping hands look. The quit signal.
    Overflow,
}

impl SimPose {
    /// Nominal fingertip positions (mm) for the pose.
    pub fn tips(&self) -> Vec<Vec3> {
        match self {
            SimPose::Fist     => vec![],
            SimPose::Point    => vec![Vec3::new(0.0, 220.0, -10.0)],
            SimPose::Press    => vec![Vec3::new(0.0, 232.0, -42.0)],
            SimPose::Scroll   => vec![Vec3::new(-12.0, 210.0, -20.0), Vec3::new(12.0, 212.0, -22.0)],
            SimPose::Vee      => vec![Vec3::new(-10.0, 200.0, -15.0), Vec3::new(15.0, 240.0, -25.0)],
            SimPose::Spread   => (0..5)
                .map(|i| Vec3::new(-60.0 + 30.0 * i as f32, 190.0 + 8.0 * i as f32, -15.0))
                .collect(),
            SimPose::Overflow => (0..6)
                .map(|i| Vec3::new(-90.0 + 35.0 * i as f32, 200.0, -15.0))
                .collect(),
        }
    }
}

/// One segment of the simulation script.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimStep {
    pub pose:        SimPose,
    pub duration_us: u64,
    /// Probability that any given frame loses one fingertip.
    pub dropout:     f64,
}

impl SimStep {
    pub fn new(pose: SimPose, duration_us: u64) -> Self {
        SimStep { pose, duration_us, dropout: 0.0 }
    }

    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout.clamp(0.0, 1.0);
        self
    }
}

/// Plays a script of poses as frames with positional jitter and occasional
/// fingertip dropouts.
pub struct SimFrameSource {
    pub script:    Vec<SimStep>,
    /// Frame period (µs).
    pub frame_us:  u64,
    /// Sleep one frame period between frames.
    pub realtime:  bool,
    /// Tip position jitter (± mm).
    pub jitter_mm: f32,
    rng:           StdRng,
}

impl SimFrameSource {
    pub const DEFAULT_FRAME_US: u64 = 9_000;

    pub fn new(script: Vec<SimStep>) -> Self {
        SimFrameSource {
            script,
            frame_us:  Self::DEFAULT_FRAME_US,
            realtime:  true,
            jitter_mm: 1.0,
            rng:       StdRng::from_entropy(),
        }
    }

    /// Reproducible jitter and dropouts.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// A tour through every pose, a little flicker included, ending with
    /// the quit signal.
    pub fn demo_script() -> Vec<SimStep> {
        vec![
            SimStep::new(SimPose::Fist,     800_000),
            SimStep::new(SimPose::Point,  1_500_000).with_dropout(0.05),
            SimStep::new(SimPose::Press,  1_000_000),
            SimStep::new(SimPose::Scroll, 1_500_000).with_dropout(0.05),
            SimStep::new(SimPose::Vee,    1_000_000),
            SimStep::new(SimPose::Spread, 1_000_000).with_dropout(0.05),
            SimStep::new(SimPose::Fist,     800_000),
            SimStep::new(SimPose::Overflow, 600_000),
        ]
    }

    fn jittered(&mut self, v: Vec3, mm: f32) -> Vec3 {
        Vec3::new(
            v.x + self.rng.gen_range(-mm..=mm),
            v.y + self.rng.gen_range(-mm..=mm),
            v.z + self.rng.gen_range(-mm..=mm),
        )
    }

    fn fingers(&mut self, step: &SimStep) -> Vec<Finger> {
        let jitter = self.jitter_mm;
        let mut fingers: Vec<Finger> = step.pose.tips()
            .into_iter()
            .map(|tip| {
                let position  = self.jittered(tip, jitter);
                let velocity  = self.jittered(Vec3::ZERO, 20.0);
                let direction = self.jittered(Vec3::new(0.0, 0.3, -1.0), 0.05).normalized();
                Finger::new(position, velocity, direction)
            })
            .collect();
        if !fingers.is_empty() && self.rng.gen_bool(step.dropout) {
            let victim = self.rng.gen_range(0..fingers.len());
            fingers.remove(victim);
        }
        fingers
    }

    /// Every frame of the script, with timestamps starting at 0.
    pub fn frames(&mut self) -> Vec<Frame> {
        let mut out = Vec::new();
        let mut ts = 0;
        let script = self.script.clone();
        for step in &script {
            let end = ts + step.duration_us;
            while ts < end {
                let fingers = self.fingers(step);
                out.push(Frame::new(ts, fingers));
                ts += self.frame_us.max(1);
            }
        }
        out
    }
}

impl FrameSource for SimFrameSource {
    fn run(mut self: Box<Self>, tx: Sender<Frame>) {
        let frames = self.frames();
        info!(frames = frames.len(), "simulated hand starting");
        for frame in frames {
            if tx.send(frame).is_err() {
                debug!("frame consumer went away");
                return;
            }
            if self.realtime {
                thread::sleep(Duration::from_micros(self.frame_us));
            }
        }
        info!("simulated hand finished");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
