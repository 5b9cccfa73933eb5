//! # cursor_ema
//!
//! Jitter reduction for hand-tracking cursors.
//!
//! A tracker reports landmark positions in normalized `[0,1]²` screen space
//! once per inference frame.  Frame-to-frame noise makes a raw cursor
//! wobble, so every sample goes through an exponential moving average:
//!
//! ```text
//! v' = value                      (first sample)
//! v' = v·(1 − α) + value·α        (every later sample)
//! ```
//!
//! No external crates are required.
//!
//! ## Quick start
//!
//! ```rust
//! use cursor_ema::{ExponentialCoordinateAverage, cursor_from_landmarks};
//!
//! let mut pos = ExponentialCoordinateAverage::new(0.85);
//!
//! let mut landmarks = vec![[0.0_f32, 0.0]; 21];
//! landmarks[3] = [0.40, 0.50];
//! landmarks[7] = [0.60, 0.50];
//!
//! let cursor = cursor_from_landmarks(&landmarks).unwrap();
//! assert_eq!(pos.add(cursor), [0.5, 0.5]);
//! ```

pub mod ema;
pub mod landmarks;

pub use ema::{ExponentialCoordinateAverage, ExponentialMovingAverage};
pub use landmarks::{
    cursor_from_landmarks, CURSOR_LANDMARKS, HAND_CONNECTIONS, LANDMARK_COUNT,
};
