//! Playback thread.
//!
//! The controller never touches an audio device directly: it sends
//! [`PlayerCommand`]s to a thread that owns one [`AudioOut`] backend.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use hotspot_map::FilterSetting;

pub mod cpal_out;
pub mod dsp;
pub mod midi_out;

pub use cpal_out::CpalOut;
pub use midi_out::MidiControlOut;

// ════════════════════════════════════════════════════════════════════════════
// PlayerCommand — sent to the playback thread
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerCommand {
    /// Start or resume the loop.
    Play,
    Pause,
    SetFilter(FilterSetting),
    /// Playback rate multiplier (1.0 = native speed).
    SetRate(f32),
    /// Volume in dB.
    SetVolume(f32),
    /// Terminate the thread.
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerError {
    #[error("no audio clip given (pass --audio <file.wav>)")]
    NoClip,
    #[error("no audio output device")]
    NoDevice,
    #[error("no MIDI output ports found")]
    NoMidiPorts,
}

/// Which backend the playback thread should try to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputKind {
    /// Loop a WAV clip on the default audio device.
    Audio,
    /// Send control changes to the first MIDI output port.
    Midi,
    /// Discard everything.
    Null,
}

// ════════════════════════════════════════════════════════════════════════════
// AudioOut — abstraction over cpal / midir / null
// ════════════════════════════════════════════════════════════════════════════

/// A sink for transport and parameter changes.
///
/// Backends are created on the playback thread, so they need not be `Send`.
pub trait AudioOut {
    fn play(&mut self);
    fn pause(&mut self);
    fn set_filter(&mut self, filter: FilterSetting);
    fn set_rate(&mut self, rate: f32);
    fn set_volume(&mut self, db: f32);
}

// ── null backend (used when nothing else opens) ───────────────────────────

pub struct NullOut;

impl AudioOut for NullOut {
    fn play(&mut self)                       {}
    fn pause(&mut self)                      {}
    fn set_filter(&mut self, _f: FilterSetting) {}
    fn set_rate(&mut self, _r: f32)          {}
    fn set_volume(&mut self, _db: f32)       {}
}

// ════════════════════════════════════════════════════════════════════════════
// open_output — pick a backend, fall back to null
// ════════════════════════════════════════════════════════════════════════════

/// Open the requested backend.  Falls back to [`NullOut`] with a warning
/// if it cannot be opened.
pub fn open_output(kind: OutputKind, clip: Option<PathBuf>) -> Box<dyn AudioOut> {
    let opened: anyhow::Result<Box<dyn AudioOut>> = match kind {
        OutputKind::Null  => return Box::new(NullOut),
        OutputKind::Midi  => MidiControlOut::open().map(|o| Box::new(o) as Box<dyn AudioOut>),
        OutputKind::Audio => match clip {
            Some(path) => CpalOut::open(&path).map(|o| Box::new(o) as Box<dyn AudioOut>),
            None       => Err(PlayerError::NoClip.into()),
        },
    };
    match opened {
        Ok(out) => out,
        Err(e) => {
            log::warn!("{:?} output unavailable: {:#}; using null output", kind, e);
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Player — the playback thread
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the playback thread.  Dropping it stops the thread.
pub struct Player {
    cmd_tx: Sender<PlayerCommand>,
    handle: Option<JoinHandle<()>>,
}

impl Player {
    pub fn spawn(kind: OutputKind, clip: Option<PathBuf>) -> Self {
        Self::with_backend(move || open_output(kind, clip))
    }

    /// Spawn the thread with a custom backend factory.  The factory runs on
    /// the playback thread.
    pub fn with_backend<F>(make: F) -> Self
    where
        F: FnOnce() -> Box<dyn AudioOut> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayerCommand>();
        let handle = thread::spawn(move || player_thread(make(), cmd_rx));
        Player { cmd_tx, handle: Some(handle) }
    }

    pub fn send(&self, cmd: PlayerCommand) { let _ = self.cmd_tx.send(cmd); }

    pub fn play(&self)  { self.send(PlayerCommand::Play);  }
    pub fn pause(&self) { self.send(PlayerCommand::Pause); }
}

impl Drop for Player {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Quit);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

fn player_thread(mut out: Box<dyn AudioOut>, cmd_rx: Receiver<PlayerCommand>) {
    for cmd in cmd_rx {
        match cmd {
            PlayerCommand::Play          => out.play(),
            PlayerCommand::Pause         => out.pause(),
            PlayerCommand::SetFilter(f)  => out.set_filter(f),
            PlayerCommand::SetRate(r)    => out.set_rate(r),
            PlayerCommand::SetVolume(db) => out.set_volume(db),
            PlayerCommand::Quit          => return,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingOut(Arc<Mutex<Vec<String>>>);

    impl AudioOut for RecordingOut {
        fn play(&mut self)  { self.0.lock().unwrap().push("play".into()); }
        fn pause(&mut self) { self.0.lock().unwrap().push("pause".into()); }
        fn set_filter(&mut self, f: FilterSetting) {
            self.0.lock().unwrap().push(format!("{} {}", f.kind.name(), f.frequency));
        }
        fn set_rate(&mut self, r: f32)    { self.0.lock().unwrap().push(format!("rate {}", r)); }
        fn set_volume(&mut self, db: f32) { self.0.lock().unwrap().push(format!("volume {}", db)); }
    }

    #[test]
    fn commands_reach_backend_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let player = Player::with_backend(move || Box::new(RecordingOut(sink)));

        player.play();
        player.send(PlayerCommand::SetFilter(FilterSetting::lowpass(1200.0)));
        player.send(PlayerCommand::SetRate(1.5));
        player.send(PlayerCommand::SetVolume(-6.0));
        player.pause();
        drop(player);

        assert_eq!(*log.lock().unwrap(), vec![
            "play", "lowpass 1200", "rate 1.5", "volume -6", "pause",
        ]);
    }

    #[test]
    fn nothing_after_quit() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let player = Player::with_backend(move || Box::new(RecordingOut(sink)));
        player.send(PlayerCommand::Quit);
        player.play();
        drop(player);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn null_output_opens() {
        // Must not panic or block.
        let mut out = open_output(OutputKind::Null, None);
        out.play();
        out.set_filter(FilterSetting::OFF);
    }

    #[test]
    fn audio_without_clip_falls_back() {
        let mut out = open_output(OutputKind::Audio, None);
        out.set_volume(0.0);
    }
}
