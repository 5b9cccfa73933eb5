//! Hand landmark layout and cursor derivation.
//!
//! Landmarks follow the common 21-point hand model:
//!
//! ```text
//!  0        wrist
//!  1 ..  4  thumb   (base → tip)
//!  5 ..  8  index
//!  9 .. 12  middle
//! 13 .. 16  ring
//! 17 .. 20  pinky
//! ```

/// Number of landmarks a full hand frame carries.
pub const LANDMARK_COUNT: usize = 21;

/// The two landmarks whose midpoint is the cursor: the upper thumb joint
/// and the upper index joint.  Pinching brings them together, so the
/// cursor stays put while the pinch closes.
pub const CURSOR_LANDMARKS: (usize, usize) = (3, 7);

/// Skeleton edges drawn between landmarks.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),          // thumb
    (0, 5), (5, 6), (6, 7), (7, 8),          // index
    (5, 9), (9, 10), (10, 11), (11, 12),     // middle
    (9, 13), (13, 14), (14, 15), (15, 16),   // ring
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20), // pinky + palm
];

/// Cursor position for one frame: the midpoint of [`CURSOR_LANDMARKS`].
///
/// Returns `None` when the frame is too short to contain both landmarks.
pub fn cursor_from_landmarks(coords: &[[f32; 2]]) -> Option<[f32; 2]> {
    let (a, b) = CURSOR_LANDMARKS;
    let pa = coords.get(a)?;
    let pb = coords.get(b)?;
    Some([(pa[0] + pb[0]) / 2.0, (pa[1] + pb[1]) / 2.0])
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
