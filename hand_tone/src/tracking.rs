//! Hand-tracking sources: simulated, replayed from disk, and (with the
//! `leap` feature) real LeapMotion hardware.
//!
//! The public interface is [`TrackingEvent`] delivered over a `mpsc`
//! channel.  Consumers don't need to know where the frames came from.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use cursor_ema::{CURSOR_LANDMARKS, LANDMARK_COUNT};
use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// TrackingFrame
// ════════════════════════════════════════════════════════════════════════════

/// Pose classifier output for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseProbabilities {
    #[serde(rename = "pinchProb")]
    pub pinch: f32,
    #[serde(rename = "fistProb")]
    pub fist:  f32,
}

/// One tracker result.  `coordinates` are 21 landmarks in normalized
/// `[0,1]²` space (`y` down).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingFrame {
    pub coordinates:          Vec<[f32; 2]>,
    pub is_hand_present_prob: f32,
    pub poses:                PoseProbabilities,
}

impl TrackingFrame {
    /// A frame reporting no hand.
    pub fn empty() -> Self { TrackingFrame::default() }
}

/// Probabilities above these values count as "present" / "pinching" /
/// "fist".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub is_hand_present: f32,
    pub pinch:           f32,
    pub fist:            f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds { is_hand_present: 0.5, pinch: 0.5, fist: 0.5 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameTransform — mirror and border padding
// ════════════════════════════════════════════════════════════════════════════

/// The tracker sees a frame cropped by `padding` on every side; this undoes
/// the crop and optionally mirrors `x` so the cursor follows the hand like
/// a mirror would.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTransform {
    pub mirror_x: bool,
    pub padding:  f32,
}

impl FrameTransform {
    pub const IDENTITY: FrameTransform = FrameTransform { mirror_x: false, padding: 0.0 };

    pub fn apply(&self, p: [f32; 2]) -> [f32; 2] {
        let span = 1.0 - 2.0 * self.padding;
        let expand = |v: f32| if span > 0.0 { (v - self.padding) / span } else { v };
        let x = expand(p[0]);
        let y = expand(p[1]);
        [if self.mirror_x { 1.0 - x } else { x }, y]
    }

    pub fn apply_all(&self, coords: &[[f32; 2]]) -> Vec<[f32; 2]> {
        coords.iter().map(|&p| self.apply(p)).collect()
    }
}

impl Default for FrameTransform {
    fn default() -> Self { FrameTransform { mirror_x: true, padding: 0.01 } }
}

// ════════════════════════════════════════════════════════════════════════════
// Events and errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum TrackingEvent {
    Frame(TrackingFrame),
    /// The source could not start.  Shown once; never retried.
    Error(SourceError),
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("You denied tracking input access. Restart if this was a mistake and you'd like to try again.")]
    NotAllowed,

    #[error("No tracking input found. For the handtracking to work you need to connect a tracking device. Restart to try again.")]
    NotFound,

    #[error("Something went wrong when trying to access your tracking input ({0}). You may try again by restarting.")]
    Other(String),
}

impl SourceError {
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound         => SourceError::NotFound,
            io::ErrorKind::PermissionDenied => SourceError::NotAllowed,
            _                               => SourceError::Other(err.to_string()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingSource trait — unified interface for hw, replay and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`TrackingEvent`]s over a channel.
pub trait TrackingSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<TrackingEvent>);
}

/// Spawn a tracking source on its own thread and return the receiving end.
pub fn spawn_tracking_source<S: TrackingSource>(source: S) -> Receiver<TrackingEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimTrackingSource — mouse + keyboard (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the visualizer window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Mouse position in normalized window coordinates.
    Pointer { x: f32, y: f32 },
    /// The mouse left the window.
    NoPointer,
    KeyDown(SimKey),
    KeyUp(SimKey),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Pinch,      // P (held)
    Fist,       // F (held)
    ToggleHand, // H
    Quit,       // Q
}

/// Simulated hand state, updated from [`SimInput`]s.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimHand {
    pub pointer: Option<[f32; 2]>,
    pub pinch:   bool,
    pub fist:    bool,
    pub visible: bool,
}

impl Default for SimHand {
    fn default() -> Self {
        SimHand { pointer: None, pinch: false, fist: false, visible: true }
    }
}

impl SimHand {
    /// Fold one input into the state.  Returns `false` on quit.
    pub fn apply(&mut self, input: SimInput) -> bool {
        match input {
            SimInput::Pointer { x, y }           => self.pointer = Some([x, y]),
            SimInput::NoPointer                  => self.pointer = None,
            SimInput::KeyDown(SimKey::Pinch)     => self.pinch = true,
            SimInput::KeyUp(SimKey::Pinch)       => self.pinch = false,
            SimInput::KeyDown(SimKey::Fist)      => self.fist = true,
            SimInput::KeyUp(SimKey::Fist)        => self.fist = false,
            SimInput::KeyDown(SimKey::ToggleHand) => self.visible = !self.visible,
            SimInput::KeyDown(SimKey::Quit)      => return false,
            SimInput::KeyUp(_)                   => {}
        }
        true
    }

    pub fn frame(&self) -> TrackingFrame {
        match self.pointer {
            Some(center) if self.visible => TrackingFrame {
                coordinates:          synthetic_hand(center, self.pinch, self.fist),
                is_hand_present_prob: 1.0,
                poses: PoseProbabilities {
                    pinch: if self.pinch { 1.0 } else { 0.0 },
                    fist:  if self.fist  { 1.0 } else { 0.0 },
                },
            },
            _ => TrackingFrame::empty(),
        }
    }
}

/// Open right hand, palm facing the viewer, in offsets from the wrist.
const OPEN_HAND: [[f32; 2]; LANDMARK_COUNT] = [
    [ 0.000,  0.000],
    [-0.035, -0.020], [-0.060, -0.045], [-0.075, -0.070], [-0.085, -0.095],
    [-0.025, -0.090], [-0.030, -0.130], [-0.032, -0.155], [-0.034, -0.180],
    [ 0.000, -0.095], [ 0.000, -0.140], [ 0.000, -0.168], [ 0.000, -0.195],
    [ 0.022, -0.088], [ 0.025, -0.128], [ 0.027, -0.152], [ 0.028, -0.175],
    [ 0.042, -0.075], [ 0.048, -0.105], [ 0.051, -0.123], [ 0.053, -0.140],
];

/// A plausible 21-point hand whose cursor (midpoint of the two
/// [`CURSOR_LANDMARKS`]) sits exactly on `center`.
pub fn synthetic_hand(center: [f32; 2], pinch: bool, fist: bool) -> Vec<[f32; 2]> {
    let mut pts = OPEN_HAND;

    if fist {
        // Pull every finger joint back toward its knuckle.
        for i in 5..LANDMARK_COUNT {
            let base = (i - 5) / 4 * 4 + 5;
            if i != base {
                pts[i][0] = pts[base][0] + (pts[i][0] - pts[base][0]) * 0.3;
                pts[i][1] = pts[base][1] + (pts[i][1] - pts[base][1]) * 0.3;
            }
        }
    }
    if pinch {
        // Bring thumb and index tips together.
        let tip = [(pts[4][0] + pts[8][0]) / 2.0, (pts[4][1] + pts[8][1]) / 2.0];
        pts[4] = tip;
        pts[8] = tip;
    }

    let (a, b) = CURSOR_LANDMARKS;
    let mid = [(pts[a][0] + pts[b][0]) / 2.0, (pts[a][1] + pts[b][1]) / 2.0];
    let dx = center[0] - mid[0];
    let dy = center[1] - mid[1];
    pts.iter().map(|p| [p[0] + dx, p[1] + dy]).collect()
}

/// Tracking source driven by [`SimInput`] events from the visualizer
/// window.  Every input produces one frame.
pub struct SimTrackingSource {
    pub rx: Receiver<SimInput>,
}

impl TrackingSource for SimTrackingSource {
    fn run(self: Box<Self>, tx: Sender<TrackingEvent>) {
        let mut hand = SimHand::default();
        for input in self.rx {
            if !hand.apply(input) {
                let _ = tx.send(TrackingEvent::Quit);
                return;
            }
            if tx.send(TrackingEvent::Frame(hand.frame())).is_err() { return; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplayTrackingSource — JSON-lines recordings
// ════════════════════════════════════════════════════════════════════════════

/// Parse JSON-lines frames.  Blank lines are ignored; malformed lines are
/// logged and skipped.
pub fn parse_frames<R: BufRead>(reader: R) -> io::Result<Vec<TrackingFrame>> {
    let mut frames = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() { continue; }
        match serde_json::from_str::<TrackingFrame>(line) {
            Ok(f)  => frames.push(f),
            Err(e) => log::warn!("replay line {}: {}", lineno + 1, e),
        }
    }
    Ok(frames)
}

pub fn load_frames(path: impl AsRef<Path>) -> Result<Vec<TrackingFrame>, SourceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SourceError::from_io(&e))?;
    let frames = parse_frames(BufReader::new(file)).map_err(|e| SourceError::from_io(&e))?;
    if frames.is_empty() {
        return Err(SourceError::Other(format!("{} holds no frames", path.display())));
    }
    log::info!("loaded {} frames from {}", frames.len(), path.display());
    Ok(frames)
}

/// Plays a recorded session at a fixed frame rate.
pub struct ReplayTrackingSource {
    pub path:    PathBuf,
    pub fps:     f32,
    pub looping: bool,
}

impl ReplayTrackingSource {
    pub fn new(path: impl Into<PathBuf>, fps: f32) -> Self {
        ReplayTrackingSource { path: path.into(), fps, looping: false }
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Slowest pacing a recording is replayed at.
    pub const MIN_FPS: f32 = 0.1;

    fn frame_interval(&self) -> Duration {
        let fps = if self.fps.is_finite() && self.fps > 0.0 { self.fps.max(Self::MIN_FPS) } else { 30.0 };
        Duration::from_secs_f32(1.0 / fps)
    }
}

impl TrackingSource for ReplayTrackingSource {
    fn run(self: Box<Self>, tx: Sender<TrackingEvent>) {
        let frames = match load_frames(&self.path) {
            Ok(f)  => f,
            Err(e) => {
                log::error!("replay {}: {}", self.path.display(), e);
                let _ = tx.send(TrackingEvent::Error(e));
                return;
            }
        };
        let interval = self.frame_interval();
        loop {
            for frame in &frames {
                if tx.send(TrackingEvent::Frame(frame.clone())).is_err() { return; }
                thread::sleep(interval);
            }
            if !self.looping { break; }
        }
        log::info!("replay finished");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapTrackingSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Tracking source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// The first hand in each frame is projected onto the `x`/`y` plane of the
/// interaction box and normalized into `[0,1]²`.
#[cfg(feature = "leap")]
pub struct LeapTrackingSource;

#[cfg(feature = "leap")]
impl LeapTrackingSource {
    // Interaction box, mm, relative to the device.
    const X_RANGE: (f32, f32) = (-200.0, 200.0);
    const Y_RANGE: (f32, f32) = (100.0, 500.0);

    fn normalize(x: f32, y: f32) -> [f32; 2] {
        let (x0, x1) = Self::X_RANGE;
        let (y0, y1) = Self::Y_RANGE;
        // Leap y grows upward; screen y grows downward.
        [(x - x0) / (x1 - x0), 1.0 - (y - y0) / (y1 - y0)]
    }

    fn landmarks(hand: &leaprs::Hand) -> Vec<[f32; 2]> {
        let palm = hand.palm().position();
        let mut pts = vec![Self::normalize(palm.x, palm.y)];
        for digit in hand.digits() {
            for joint in [
                digit.metacarpal().next_joint(),
                digit.proximal().next_joint(),
                digit.intermediate().next_joint(),
                digit.distal().next_joint(),
            ] {
                pts.push(Self::normalize(joint.x, joint.y));
            }
        }
        pts
    }
}

#[cfg(feature = "leap")]
impl TrackingSource for LeapTrackingSource {
    fn run(self: Box<Self>, tx: Sender<TrackingEvent>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                let _ = tx.send(TrackingEvent::Error(SourceError::Other(format!("{:?}", e))));
                return;
            }
        };
        if let Err(e) = connection.open() {
            log::error!("LeapC open failed: {:?}", e);
            let _ = tx.send(TrackingEvent::Error(SourceError::NotFound));
            return;
        }
        log::info!("LeapC connection open");

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };
            if let Event::Tracking(frame) = msg.event() {
                let event = match frame.hands().next() {
                    Some(hand) => TrackingFrame {
                        coordinates:          Self::landmarks(&hand),
                        is_hand_present_prob: 1.0,
                        poses: PoseProbabilities {
                            pinch: hand.pinch_strength(),
                            fist:  hand.grab_strength(),
                        },
                    },
                    None => TrackingFrame::empty(),
                };
                if tx.send(TrackingEvent::Frame(event)).is_err() { return; }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use cursor_ema::cursor_from_landmarks;
    use std::io::Write;

    fn close(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-5 && (a[1] - b[1]).abs() < 1e-5
    }

    // ── TrackingFrame JSON ────────────────────────────────────────────────
    #[test]
    fn frame_json_uses_tracker_field_names() {
        let json = r#"{"coordinates":[[0.1,0.2]],"isHandPresentProb":0.9,
                       "poses":{"pinchProb":0.7,"fistProb":0.1}}"#;
        let f: TrackingFrame = serde_json::from_str(json).unwrap();
        assert_eq!(f.coordinates, vec![[0.1, 0.2]]);
        assert_eq!(f.is_hand_present_prob, 0.9);
        assert_eq!(f.poses, PoseProbabilities { pinch: 0.7, fist: 0.1 });

        let out = serde_json::to_string(&f).unwrap();
        assert!(out.contains("isHandPresentProb"));
        assert!(out.contains("pinchProb"));
    }

    // ── FrameTransform ────────────────────────────────────────────────────
    #[test]
    fn padding_expands_cropped_window() {
        let t = FrameTransform { mirror_x: false, padding: 0.1 };
        assert!(close(t.apply([0.1, 0.9]), [0.0, 1.0]));
        assert!(close(t.apply([0.5, 0.5]), [0.5, 0.5]));
    }

    #[test]
    fn mirror_flips_x_only() {
        let t = FrameTransform { mirror_x: true, padding: 0.0 };
        assert!(close(t.apply([0.2, 0.3]), [0.8, 0.3]));
    }

    #[test]
    fn identity_is_noop() {
        assert_eq!(FrameTransform::IDENTITY.apply([0.3, 0.7]), [0.3, 0.7]);
    }

    #[test]
    fn degenerate_padding_leaves_coordinates() {
        let t = FrameTransform { mirror_x: false, padding: 0.5 };
        assert_eq!(t.apply([0.3, 0.7]), [0.3, 0.7]);
    }

    // ── SourceError ───────────────────────────────────────────────────────
    #[test]
    fn io_errors_map_to_source_errors() {
        let nf = io::Error::new(io::ErrorKind::NotFound, "x");
        let pd = io::Error::new(io::ErrorKind::PermissionDenied, "x");
        let ot = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(SourceError::from_io(&nf), SourceError::NotFound);
        assert_eq!(SourceError::from_io(&pd), SourceError::NotAllowed);
        assert!(matches!(SourceError::from_io(&ot), SourceError::Other(m) if m.contains("boom")));
    }

    // ── Sim ───────────────────────────────────────────────────────────────
    #[test]
    fn synthetic_hand_cursor_lands_on_center() {
        for &(pinch, fist) in &[(false, false), (true, false), (false, true), (true, true)] {
            let pts = synthetic_hand([0.4, 0.6], pinch, fist);
            assert_eq!(pts.len(), LANDMARK_COUNT);
            let c = cursor_from_landmarks(&pts).unwrap();
            assert!(close(c, [0.4, 0.6]), "{:?} pinch={} fist={}", c, pinch, fist);
        }
    }

    #[test]
    fn sim_hand_follows_inputs() {
        let mut h = SimHand::default();
        assert_eq!(h.frame().is_hand_present_prob, 0.0);

        h.apply(SimInput::Pointer { x: 0.5, y: 0.5 });
        h.apply(SimInput::KeyDown(SimKey::Pinch));
        let f = h.frame();
        assert_eq!(f.is_hand_present_prob, 1.0);
        assert_eq!(f.poses.pinch, 1.0);
        assert_eq!(f.poses.fist, 0.0);

        h.apply(SimInput::KeyUp(SimKey::Pinch));
        assert_eq!(h.frame().poses.pinch, 0.0);

        h.apply(SimInput::KeyDown(SimKey::ToggleHand));
        assert!(h.frame().coordinates.is_empty());
        assert!(!h.apply(SimInput::KeyDown(SimKey::Quit)));
    }

    #[test]
    fn sim_source_emits_frames_then_quit() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let rx = spawn_tracking_source(SimTrackingSource { rx: sim_rx });
        sim_tx.send(SimInput::Pointer { x: 0.2, y: 0.8 }).unwrap();
        sim_tx.send(SimInput::KeyDown(SimKey::Quit)).unwrap();

        match rx.recv().unwrap() {
            TrackingEvent::Frame(f) => assert_eq!(f.is_hand_present_prob, 1.0),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(rx.recv().unwrap(), TrackingEvent::Quit);
    }

    // ── Replay ────────────────────────────────────────────────────────────
    #[test]
    fn parse_skips_bad_and_blank_lines() {
        let text = concat!(
            r#"{"coordinates":[],"isHandPresentProb":0.0,"poses":{"pinchProb":0,"fistProb":0}}"#, "\n",
            "\n",
            "not json\n",
            r#"{"coordinates":[[0.5,0.5]],"isHandPresentProb":1.0,"poses":{"pinchProb":1,"fistProb":0}}"#, "\n",
        );
        let frames = parse_frames(text.as_bytes()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].poses.pinch, 1.0);
    }

    #[test]
    fn missing_recording_is_not_found() {
        assert_eq!(load_frames("/no/such/recording.jsonl").err(), Some(SourceError::NotFound));
    }

    #[test]
    fn empty_recording_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(load_frames(file.path()), Err(SourceError::Other(_))));
    }

    #[test]
    fn replay_plays_every_frame_then_disconnects() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let frame = TrackingFrame {
            coordinates:          vec![[0.5, 0.5]; LANDMARK_COUNT],
            is_hand_present_prob: 1.0,
            poses:                PoseProbabilities::default(),
        };
        for _ in 0..3 {
            writeln!(file, "{}", serde_json::to_string(&frame).unwrap()).unwrap();
        }
        let rx = spawn_tracking_source(ReplayTrackingSource::new(file.path(), 1000.0));
        let got: Vec<TrackingEvent> = rx.iter().collect();
        assert_eq!(got.len(), 3);
        assert!(got.iter().all(|e| *e == TrackingEvent::Frame(frame.clone())));
    }

    #[test]
    fn slow_replay_rates_are_clamped() {
        let slow = ReplayTrackingSource::new("unused.jsonl", 1e-30);
        assert_eq!(slow.frame_interval(), Duration::from_secs_f32(1.0 / ReplayTrackingSource::MIN_FPS));
        assert_eq!(ReplayTrackingSource::new("unused.jsonl", f32::NAN).frame_interval(),
                   Duration::from_secs_f32(1.0 / 30.0));
        assert_eq!(ReplayTrackingSource::new("unused.jsonl", -5.0).frame_interval(),
                   Duration::from_secs_f32(1.0 / 30.0));
    }

    #[test]
    fn looping_replay_repeats_in_order_until_receiver_drops() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..3 {
            let frame = TrackingFrame {
                coordinates:          vec![],
                is_hand_present_prob: i as f32 / 10.0,
                poses:                PoseProbabilities::default(),
            };
            writeln!(file, "{}", serde_json::to_string(&frame).unwrap()).unwrap();
        }

        let source = ReplayTrackingSource::new(file.path(), 1000.0).looping(true);
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || Box::new(source).run(tx));

        let seen: Vec<f32> = rx.iter().take(7).map(|e| match e {
            TrackingEvent::Frame(f) => f.is_hand_present_prob,
            other => panic!("unexpected {:?}", other),
        }).collect();
        assert_eq!(seen, vec![0.0, 0.1, 0.2, 0.0, 0.1, 0.2, 0.0]);

        drop(rx);
        handle.join().unwrap();
    }

    #[test]
    fn source_errors_read_like_user_messages() {
        assert!(SourceError::NotAllowed.to_string().starts_with("You denied"));
        assert!(SourceError::NotFound.to_string().contains("need to connect"));
        assert!(SourceError::Other("busy".into()).to_string().contains("(busy)"));
    }

    #[test]
    fn replay_reports_missing_file() {
        let rx = spawn_tracking_source(ReplayTrackingSource::new("/no/such/file.jsonl", 30.0));
        assert_eq!(rx.recv().unwrap(), TrackingEvent::Error(SourceError::NotFound));
    }
}
