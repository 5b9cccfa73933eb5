//! # hand_tone
//!
//! Hand-tracking audio controller: a smoothed hand cursor steers a looping
//! clip's filter, playback rate and volume through screen-corner hotspots,
//! and pinch / fist gestures drive the transport.
//!
//! ## Hand → Action mapping
//!
//! | Input | Condition | Action |
//! |---|---|---|
//! | Cursor in bottom-left hotspot | `filter` strategy | Lowpass, 2000 Hz at the inner corner, closing toward the screen corner |
//! | Cursor in top-right hotspot | `filter` strategy | Highpass, 0 Hz at the inner corner, opening toward the screen corner |
//! | Cursor in top-left hotspot | `tempo` strategy | Playback rate 1.0 → 2.0 |
//! | Cursor in bottom-right hotspot | `volume` strategy | Volume +5 → −30 dB |
//! | Cursor anywhere else | — | Parameter returns to its "off" value |
//! | Pinch | transport not running | Start / resume playback, pointer turns green |
//! | Fist | transport running | Pause playback, pointer turns red |
//!
//! The cursor is the midpoint of landmarks 3 and 7, smoothed by an
//! exponential moving average (`α = 0.85`).
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the mouse is the hand.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! A recorded session (`--replay file.jsonl`) works in either mode.
//!
//! ### Simulation controls
//!
//! | Key | Gesture |
//! |---|---|
//! | mouse | Move the hand |
//! | `P` (hold) | Pinch |
//! | `F` (hold) | Fist |
//! | `H` | Toggle hand presence |
//! | `Q` / `Esc` | Quit |

pub mod tracking;
pub mod transport;
pub mod controller;
pub mod player;
pub mod overlay;
pub mod visualizer;
pub mod app;
