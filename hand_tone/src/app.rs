//! Top-level application state and the main loop.
//!
//! `AppState` owns the `Controller`, the `Overlay` and the `Player`.  It
//! processes `TrackingEvent`s and feeds the visualizer each frame.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use hotspot_map::ControlSet;

use crate::controller::{Controller, DEFAULT_ALPHA};
use crate::overlay::Overlay;
use crate::player::{OutputKind, Player};
use crate::tracking::{
    spawn_tracking_source, FrameTransform, ReplayTrackingSource, SimInput, Thresholds,
    TrackingEvent,
};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Strategy names, see [`ControlSet::from_names`].
    pub strategies:  Vec<String>,
    pub alpha:       f32,
    pub thresholds:  Thresholds,
    /// Applied to camera-like sources (replay, hardware); the mouse
    /// simulation is already in screen space.
    pub transform:   FrameTransform,
    pub output:      OutputKind,
    /// WAV clip looped by the audio backend.
    pub audio:       Option<PathBuf>,
    /// JSON-lines recording to play instead of live input.
    pub replay:      Option<PathBuf>,
    pub replay_fps:  f32,
    pub replay_loop: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            strategies:  vec!["filter".to_string()],
            alpha:       DEFAULT_ALPHA,
            thresholds:  Thresholds::default(),
            transform:   FrameTransform::default(),
            output:      OutputKind::Audio,
            audio:       None,
            replay:      None,
            replay_fps:  30.0,
            replay_loop: false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    controller:  Controller,
    overlay:     Overlay,
    player:      Player,
    source_done: bool,
}

impl AppState {
    pub fn new(cfg: &AppConfig, transform: FrameTransform, player: Player) -> anyhow::Result<Self> {
        let controls = ControlSet::from_names(&cfg.strategies[..])?;
        log::info!("control strategies: {}", controls.names().join(", "));
        let overlay = Overlay::new(&controls);
        Ok(AppState {
            controller: Controller::new(controls, cfg.alpha, cfg.thresholds, transform),
            overlay,
            player,
            source_done: false,
        })
    }

    /// Process one tracking event.  Returns `false` on quit.
    pub fn handle_event(&mut self, event: TrackingEvent, now: Instant) -> bool {
        match event {
            TrackingEvent::Frame(frame) => {
                let outcome = self.controller.on_frame(&frame, now);
                for cmd in &outcome.commands {
                    self.player.send(*cmd);
                }
                self.overlay.update(&outcome, now);
            }
            TrackingEvent::Error(e) => {
                log::error!("tracking source: {}", e);
                self.overlay.error = Some(e.to_string());
            }
            TrackingEvent::Quit => return false,
        }
        true
    }

    /// The tracking source hung up (end of a recording, or a failed start).
    pub fn source_finished(&mut self) {
        if self.source_done { return; }
        self.source_done = true;
        self.overlay.status = "Tracking input ended. Press Q to quit.".to_string();
    }

    /// Per-frame refresh of time-dependent readouts.
    pub fn tick(&mut self, now: Instant) {
        self.overlay.readouts = self.controller.readouts(now);
    }

    pub fn overlay(&self) -> &Overlay { &self.overlay }
    pub fn overlay_mut(&mut self) -> &mut Overlay { &mut self.overlay }
}

// ════════════════════════════════════════════════════════════════════════════
// Source selection
// ════════════════════════════════════════════════════════════════════════════

/// Pick the tracking source: a recording if one was given, otherwise live
/// input.  Returns the event channel, the transform for its frames and a
/// status line.
fn open_source(
    cfg:    &AppConfig,
    sim_rx: Receiver<SimInput>,
) -> (Receiver<TrackingEvent>, FrameTransform, String) {
    if let Some(path) = &cfg.replay {
        let source = ReplayTrackingSource::new(path.clone(), cfg.replay_fps).looping(cfg.replay_loop);
        let status = format!("Replaying {}", path.display());
        return (spawn_tracking_source(source), cfg.transform, status);
    }
    open_live_source(cfg, sim_rx)
}

#[cfg(feature = "leap")]
fn open_live_source(
    cfg:     &AppConfig,
    _sim_rx: Receiver<SimInput>,
) -> (Receiver<TrackingEvent>, FrameTransform, String) {
    let rx = spawn_tracking_source(crate::tracking::LeapTrackingSource);
    (rx, cfg.transform, "LeapMotion tracking".to_string())
}

#[cfg(not(feature = "leap"))]
fn open_live_source(
    _cfg:   &AppConfig,
    sim_rx: Receiver<SimInput>,
) -> (Receiver<TrackingEvent>, FrameTransform, String) {
    let rx = spawn_tracking_source(crate::tracking::SimTrackingSource { rx: sim_rx });
    (rx, FrameTransform::IDENTITY, "Simulation: move the mouse over the stage".to_string())
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the visualizer, the tracking source and the player, then drives
/// the event/render loop at ~60 fps until the window closes or the user
/// quits.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let mut vis = Visualizer::new(sim_tx)?;

    let (events, transform, status) = open_source(&cfg, sim_rx);
    let player = Player::spawn(cfg.output, cfg.audio.clone());
    let mut app = AppState::new(&cfg, transform, player)?;
    app.overlay_mut().status = status;

    while vis.is_open() {
        if !vis.poll_input() { break; }

        let now = Instant::now();
        loop {
            match events.try_recv() {
                Ok(ev) => {
                    if !app.handle_event(ev, now) { return Ok(()); }
                }
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => { app.source_finished(); break; }
            }
        }

        app.tick(now);
        vis.render(app.overlay())?;
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::PointerColor;
    use crate::player::NullOut;
    use crate::tracking::{synthetic_hand, PoseProbabilities, SourceError, TrackingFrame};

    fn make_app(cfg: &AppConfig) -> AppState {
        let player = Player::with_backend(|| Box::new(NullOut));
        AppState::new(cfg, FrameTransform::IDENTITY, player).unwrap()
    }

    fn pinch_at(at: [f32; 2]) -> TrackingEvent {
        TrackingEvent::Frame(TrackingFrame {
            coordinates:          synthetic_hand(at, true, false),
            is_hand_present_prob: 1.0,
            poses:                PoseProbabilities { pinch: 1.0, fist: 0.0 },
        })
    }

    #[test]
    fn default_config_matches_demo_constants() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.alpha, 0.85);
        assert_eq!(cfg.transform, FrameTransform { mirror_x: true, padding: 0.01 });
        assert_eq!(cfg.strategies, vec!["filter"]);
    }

    #[test]
    fn unknown_strategy_fails_startup() {
        let cfg = AppConfig { strategies: vec!["reverb".into()], ..AppConfig::default() };
        let player = Player::with_backend(|| Box::new(NullOut));
        assert!(AppState::new(&cfg, FrameTransform::IDENTITY, player).is_err());
    }

    #[test]
    fn frame_updates_overlay() {
        let mut app = make_app(&AppConfig::default());
        assert!(app.handle_event(pinch_at([0.5, 0.5]), Instant::now()));
        let o = app.overlay();
        assert!(o.point.position.is_some());
        assert_eq!(o.point.color, PointerColor::Green);
        assert_eq!(o.landmarks.coordinates.len(), 21);
        assert_eq!(o.fps.fps(), 1);
    }

    #[test]
    fn error_is_shown_as_static_text() {
        let mut app = make_app(&AppConfig::default());
        assert!(app.handle_event(TrackingEvent::Error(SourceError::NotFound), Instant::now()));
        assert_eq!(app.overlay().error, Some(SourceError::NotFound.to_string()));
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut app = make_app(&AppConfig::default());
        assert!(!app.handle_event(TrackingEvent::Quit, Instant::now()));
    }

    #[test]
    fn tick_refreshes_transport_readout() {
        let mut app = make_app(&AppConfig::default());
        let t0 = Instant::now();
        app.handle_event(pinch_at([0.5, 0.5]), t0);
        app.tick(t0 + std::time::Duration::from_millis(500));
        let last = app.overlay().readouts.last().cloned().unwrap();
        assert_eq!(last, ("transport", "0.50".to_string()));
    }

    #[test]
    fn source_finished_sets_status_once() {
        let mut app = make_app(&AppConfig::default());
        app.source_finished();
        let s = app.overlay().status.clone();
        app.overlay_mut().status = "changed".into();
        app.source_finished();
        assert_eq!(app.overlay().status, "changed");
        assert!(s.contains("ended"));
    }
}
