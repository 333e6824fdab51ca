//! Audible feedback on mode changes.
//!
//! Each [`InputMode`] has a short cue played on a MIDI output port from a
//! dedicated thread, so the frame loop never blocks on a note.
//!
//! | Mode   | Cue                     |
//! |--------|-------------------------|
//! | Zero   | G2                      |
//! | Point  | C4                      |
//! | Click  | G4                      |
//! | Scroll | C5                      |
//! | Center | C4 pulsed three times   |

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{info, warn};

use crate::mode::InputMode;

/// Anything that can announce a mode change to the user.
pub trait Feedback {
    fn announce(&mut self, mode: InputMode);
}

impl<T: Feedback + ?Sized> Feedback for Box<T> {
    fn announce(&mut self, mode: InputMode) {
        (**self).announce(mode)
    }
}

/// Silent feedback, for when sound is off.
pub struct NullFeedback;

impl Feedback for NullFeedback {
    fn announce(&mut self, _mode: InputMode) {}
}

// ════════════════════════════════════════════════════════════════════════════
// Cues
// ════════════════════════════════════════════════════════════════════════════

/// One step of a cue: a MIDI note, or `None` for a rest.
pub type CueStep = Option<u8>;

/// Length of every cue step.
pub const STEP_MS: u64 = 150;

/// The notes played when `mode` becomes active.
pub fn cue(mode: InputMode) -> &'static [CueStep] {
    match mode {
        InputMode::Zero   => &[Some(43)],
        InputMode::Point  => &[Some(60)],
        InputMode::Click  => &[Some(67)],
        InputMode::Scroll => &[Some(72)],
        InputMode::Center => &[Some(60), None, Some(60), None, Some(60)],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null
// ════════════════════════════════════════════════════════════════════════════

trait MidiOut: Send {
    fn note_on(&mut self,  channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note, velocity]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note, 0]);
    }
}

struct NullOut;
impl MidiOut for NullOut {
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8) {}
    fn note_off(&mut self, _ch: u8, _n: u8)         {}
}

/// Whether a port name looks like a software synthesiser.
fn is_softsynth(name: &str) -> bool {
    let n = name.to_lowercase();
    ["fluid", "timidity", "microsoft", "gm", "synth"].iter().any(|s| n.contains(s))
}

/// Open the first MIDI output port, preferring a softsynth.  Falls back to
/// `NullOut` with a warning when nothing usable is found.
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("soma_feedback") {
        Ok(m)  => m,
        Err(e) => {
            warn!(%e, "MIDI init failed, feedback is silent");
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        warn!("no MIDI output ports found, feedback is silent (try `timidity -iA` or `fluidsynth`)");
        return Box::new(NullOut);
    }

    let port_idx = ports.iter()
        .position(|p| midi_out.port_name(p).map(|n| is_softsynth(&n)).unwrap_or(false))
        .unwrap_or(0);
    let port = &ports[port_idx];
    let name = midi_out.port_name(port).unwrap_or_else(|_| "Unknown".to_string());
    info!(port = %name, "opening MIDI port");

    match midi_out.connect(port, "soma-feedback") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e)   => {
            warn!(%e, "MIDI connect failed, feedback is silent");
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiFeedback — the playback thread
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the feedback thread.  Dropping it closes the queue and waits
/// for any cues already queued to finish playing.
pub struct MidiFeedback {
    tx:     Option<Sender<InputMode>>,
    handle: Option<JoinHandle<()>>,
}

impl MidiFeedback {
    pub fn spawn(channel: u8, velocity: u8) -> Self {
        Self::spawn_with(open_midi_output, channel, velocity, Duration::from_millis(STEP_MS))
    }

    fn spawn_with<F>(open: F, channel: u8, velocity: u8, step: Duration) -> Self
    where
        F: FnOnce() -> Box<dyn MidiOut> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<InputMode>();
        let handle = thread::spawn(move || feedback_thread(rx, open(), channel, velocity, step));
        MidiFeedback { tx: Some(tx), handle: Some(handle) }
    }
}

impl Feedback for MidiFeedback {
    fn announce(&mut self, mode: InputMode) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(mode);
        }
    }
}

impl Drop for MidiFeedback {
    fn drop(&mut self) {
        // closing the channel ends the thread's receive loop
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("feedback thread panicked");
            }
        }
    }
}

fn feedback_thread(
    rx:       Receiver<InputMode>,
    mut midi: Box<dyn MidiOut>,
    channel:  u8,
    velocity: u8,
    step:     Duration,
) {
    for mode in rx {
        for cue_step in cue(mode) {
            match *cue_step {
                Some(note) => {
                    midi.note_on(channel, note, velocity);
                    thread::sleep(step);
                    midi.note_off(channel, note);
                }
                None => thread::sleep(step),
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
