//! Per-frame controller: tracking frame in, player commands and overlay
//! state out.
//!
//! The controller is pure state.  It never blocks and never talks to a
//! device; [`FrameOutcome::commands`] is forwarded to the player by the
//! caller.

use std::time::Instant;

use cursor_ema::{cursor_from_landmarks, ExponentialCoordinateAverage};
use hotspot_map::{ControlParam, ControlSet};

use crate::player::PlayerCommand;
use crate::tracking::{FrameTransform, Thresholds, TrackingFrame};
use crate::transport::Transport;

/// Smoothing factor for the cursor.
pub const DEFAULT_ALPHA: f32 = 0.85;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerColor { Blue, Green, Red }

impl PointerColor {
    pub fn argb(self) -> u32 {
        match self {
            PointerColor::Blue  => 0xFF2060FF,
            PointerColor::Green => 0xFF20D040,
            PointerColor::Red   => 0xFFE02020,
        }
    }
}

/// Everything the overlay and the player need from one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutcome {
    /// Smoothed cursor; `None` when no hand is present.
    pub cursor:    Option<[f32; 2]>,
    pub pointer:   PointerColor,
    /// Transformed landmarks, empty when no hand is present.
    pub landmarks: Vec<[f32; 2]>,
    pub commands:  Vec<PlayerCommand>,
    pub readouts:  Vec<(&'static str, String)>,
}

fn command_for(param: &ControlParam) -> Option<PlayerCommand> {
    match *param {
        ControlParam::Filter(_)       => param.effective_filter().map(PlayerCommand::SetFilter),
        ControlParam::PlaybackRate(_) => param.effective_rate().map(PlayerCommand::SetRate),
        ControlParam::Volume(_)       => param.effective_volume().map(PlayerCommand::SetVolume),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Controller
// ════════════════════════════════════════════════════════════════════════════

pub struct Controller {
    smoother:    ExponentialCoordinateAverage,
    controls:    ControlSet,
    transport:   Transport,
    thresholds:  Thresholds,
    transform:   FrameTransform,
    last_params: Vec<ControlParam>,
}

impl Controller {
    pub fn new(
        controls:   ControlSet,
        alpha:      f32,
        thresholds: Thresholds,
        transform:  FrameTransform,
    ) -> Self {
        let last_params = controls.all_off();
        Controller {
            smoother: ExponentialCoordinateAverage::new(alpha),
            controls,
            transport: Transport::new(),
            thresholds,
            transform,
            last_params,
        }
    }

    pub fn controls(&self)  -> &ControlSet { &self.controls }
    pub fn transport(&self) -> &Transport  { &self.transport }
    pub fn params(&self)    -> &[ControlParam] { &self.last_params }

    /// Process one tracker result.
    pub fn on_frame(&mut self, frame: &TrackingFrame, now: Instant) -> FrameOutcome {
        let mut commands = Vec::new();
        let mut pointer  = PointerColor::Blue;
        let mut cursor   = None;
        let mut landmarks = Vec::new();

        let present = frame.is_hand_present_prob > self.thresholds.is_hand_present;
        let coords  = self.transform.apply_all(&frame.coordinates);

        if let (true, Some(raw)) = (present, cursor_from_landmarks(&coords)) {
            let [x, y] = self.smoother.add(raw);
            cursor = Some([x, y]);

            let params = self.controls.map_all(x, y);
            for (new, old) in params.iter().zip(self.last_params.iter()) {
                if new != old {
                    commands.extend(command_for(new));
                }
            }
            self.last_params = params;

            if frame.poses.pinch > self.thresholds.pinch {
                pointer = PointerColor::Green;
                if self.transport.start(now) {
                    log::debug!("transport start");
                    commands.push(PlayerCommand::Play);
                }
            }
            if frame.poses.fist > self.thresholds.fist {
                pointer = PointerColor::Red;
                if self.transport.pause(now) {
                    log::debug!("transport pause");
                    commands.push(PlayerCommand::Pause);
                }
            }
            landmarks = coords;
        }

        FrameOutcome { cursor, pointer, landmarks, commands, readouts: self.readouts(now) }
    }

    /// Parameter readouts followed by the transport clock.
    pub fn readouts(&self, now: Instant) -> Vec<(&'static str, String)> {
        let mut out: Vec<_> = self.last_params.iter().flat_map(|p| p.readouts()).collect();
        out.push(("transport", format!("{:.2}", self.transport.seconds(now))));
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{synthetic_hand, PoseProbabilities};
    use hotspot_map::{FilterKind, FilterSetting};
    use std::time::Duration;

    fn controller(alpha: f32) -> Controller {
        Controller::new(
            ControlSet::from_names(&["filter", "tempo", "volume"]).unwrap(),
            alpha,
            Thresholds::default(),
            FrameTransform::IDENTITY,
        )
    }

    fn hand(at: [f32; 2], pinch: f32, fist: f32) -> TrackingFrame {
        TrackingFrame {
            coordinates:          synthetic_hand(at, false, false),
            is_hand_present_prob: 0.9,
            poses:                PoseProbabilities { pinch, fist },
        }
    }

    fn close(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-4 && (a[1] - b[1]).abs() < 1e-4
    }

    #[test]
    fn centre_hand_changes_nothing() {
        let mut c = controller(DEFAULT_ALPHA);
        let out = c.on_frame(&hand([0.5, 0.5], 0.0, 0.0), Instant::now());
        assert!(close(out.cursor.unwrap(), [0.5, 0.5]));
        assert_eq!(out.pointer, PointerColor::Blue);
        assert_eq!(out.landmarks.len(), 21);
        assert!(out.commands.is_empty());
    }

    #[test]
    fn entering_lowpass_sends_filter_once() {
        let mut c = controller(1.0);
        let t = Instant::now();
        let out = c.on_frame(&hand([0.2, 0.72], 0.0, 0.0), t);
        assert_eq!(out.commands.len(), 1);
        match out.commands[0] {
            PlayerCommand::SetFilter(f) => {
                assert_eq!(f.kind, FilterKind::Lowpass);
                assert!(f.frequency > 1700.0 && f.frequency < 1900.0, "{}", f.frequency);
            }
            other => panic!("unexpected {:?}", other),
        }
        // Same position again: no change, no command.
        let again = c.on_frame(&hand([0.2, 0.72], 0.0, 0.0), t);
        assert!(again.commands.is_empty());
    }

    #[test]
    fn leaving_region_sends_off_value() {
        let mut c = controller(1.0);
        let t = Instant::now();
        c.on_frame(&hand([0.9, 0.9], 0.0, 0.0), t);
        let out = c.on_frame(&hand([0.5, 0.5], 0.0, 0.0), t);
        assert_eq!(out.commands, vec![PlayerCommand::SetVolume(5.0)]);
    }

    #[test]
    fn pinch_starts_transport_once() {
        let mut c = controller(DEFAULT_ALPHA);
        let t = Instant::now();
        let out = c.on_frame(&hand([0.5, 0.5], 0.9, 0.0), t);
        assert_eq!(out.pointer, PointerColor::Green);
        assert_eq!(out.commands, vec![PlayerCommand::Play]);
        let out = c.on_frame(&hand([0.5, 0.5], 0.9, 0.0), t);
        assert!(out.commands.is_empty());
        assert!(c.transport().is_started());
    }

    #[test]
    fn fist_pauses_only_when_started() {
        let mut c = controller(DEFAULT_ALPHA);
        let t = Instant::now();
        let out = c.on_frame(&hand([0.5, 0.5], 0.0, 0.9), t);
        assert_eq!(out.pointer, PointerColor::Red);
        assert!(out.commands.is_empty());

        c.on_frame(&hand([0.5, 0.5], 0.9, 0.0), t);
        let out = c.on_frame(&hand([0.5, 0.5], 0.0, 0.9), t);
        assert_eq!(out.commands, vec![PlayerCommand::Pause]);
    }

    #[test]
    fn fist_wins_colour_over_pinch() {
        let mut c = controller(DEFAULT_ALPHA);
        let out = c.on_frame(&hand([0.5, 0.5], 0.9, 0.9), Instant::now());
        assert_eq!(out.pointer, PointerColor::Red);
        assert_eq!(out.commands, vec![PlayerCommand::Play, PlayerCommand::Pause]);
    }

    #[test]
    fn thresholds_are_strict() {
        let mut c = controller(DEFAULT_ALPHA);
        let mut f = hand([0.5, 0.5], 0.5, 0.0);
        f.is_hand_present_prob = 0.5;
        let out = c.on_frame(&f, Instant::now());
        assert_eq!(out.cursor, None);
        assert!(out.landmarks.is_empty());
    }

    #[test]
    fn absent_hand_keeps_smoother_and_params() {
        let mut c = controller(0.5);
        let t = Instant::now();
        c.on_frame(&hand([0.2, 0.72], 0.0, 0.0), t);
        let before = c.params().to_vec();

        let out = c.on_frame(&TrackingFrame::empty(), t);
        assert_eq!(out.cursor, None);
        assert!(out.commands.is_empty());
        assert_eq!(c.params(), &before[..]);

        // Smoother resumes from the old estimate rather than jumping.
        let out = c.on_frame(&hand([0.4, 0.72], 0.0, 0.0), t);
        assert!(close(out.cursor.unwrap(), [0.3, 0.72]));
    }

    #[test]
    fn readouts_cover_every_param_and_transport() {
        let mut c = controller(1.0);
        let t0 = Instant::now();
        c.on_frame(&hand([0.5, 0.5], 0.9, 0.0), t0);
        let r = c.readouts(t0 + Duration::from_millis(1250));
        let labels: Vec<_> = r.iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["lowpass", "highpass", "rate", "volume", "transport"]);
        assert!(r[..4].iter().all(|(_, v)| v == "off"));
        assert_eq!(r[4].1, "1.25");
    }

    #[test]
    fn transform_is_applied_before_mapping() {
        let mut c = Controller::new(
            ControlSet::default(),
            1.0,
            Thresholds::default(),
            FrameTransform { mirror_x: true, padding: 0.0 },
        );
        // Mirrored: a hand on the right lands in the bottom-left lowpass.
        let out = c.on_frame(&hand([0.8, 0.72], 0.0, 0.0), Instant::now());
        assert!(close(out.cursor.unwrap(), [0.2, 0.72]));
        assert!(matches!(
            out.commands[..],
            [PlayerCommand::SetFilter(FilterSetting { kind: FilterKind::Lowpass, .. })]
        ));
    }
}
