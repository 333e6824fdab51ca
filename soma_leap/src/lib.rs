//! # soma_leap
//!
//! LeapMotion front end for `soma_core`: turns a stream of tracking frames
//! into input modes and announces each mode change with a short MIDI cue.
//!
//! ## Fingers → Mode mapping
//!
//! | Debounced fingers | Hand position | Mode   | Cue                 |
//! |---|---|---|---|
//! | 0   | any        | Zero   | G2                  |
//! | 1   | any        | Point  | C4                  |
//! | 1   | clicking   | Click  | G4                  |
//! | 2   | any        | Scroll | C5                  |
//! | 5   | any        | Center | C4 ×3               |
//! | 6+  | any        | quit   |                     |
//!
//! The hand position only decides between point and click, and only while
//! the finger-count window is unanimous.
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: a scripted synthetic hand tours every
//!   pose, with jitter and occasional fingertip dropouts.  The position
//!   classifier is calibrated from the same simulated poses.
//! * `leap`: **Hardware mode**: polls a real LeapMotion controller via LeapC.

pub mod app;
pub mod error;
pub mod feedback;
pub mod mode;
pub mod source;

pub use app::{run, AppConfig};
pub use error::AppError;
