//! Control-change output for an external synth via `midir`.
//!
//! | Parameter | Message |
//! |---|---|
//! | lowpass cutoff  | CC 74 |
//! | highpass cutoff | CC 81 |
//! | volume          | CC 7  |
//! | playback rate   | CC 76 |
//! | play / pause    | Start (first time) or Continue / Stop |

use anyhow::Context;
use hotspot_map::{FilterKind, FilterSetting};

use super::{AudioOut, PlayerError};

pub const CC_LOWPASS:  u8 = 74;
pub const CC_HIGHPASS: u8 = 81;
pub const CC_VOLUME:   u8 = 7;
pub const CC_RATE:     u8 = 76;

const MIDI_START:    u8 = 0xFA;
const MIDI_CONTINUE: u8 = 0xFB;
const MIDI_STOP:     u8 = 0xFC;

const MIN_HZ: f32 = 20.0;
const MAX_HZ: f32 = 20_000.0;
const MIN_DB: f32 = -40.0;
const MAX_DB: f32 = 6.0;
const MAX_RATE: f32 = 2.0;

// ════════════════════════════════════════════════════════════════════════════
// Value scaling
// ════════════════════════════════════════════════════════════════════════════

fn unit_to_cc(t: f32) -> u8 {
    if t.is_nan() { return 0; }
    (t.clamp(0.0, 1.0) * 127.0).round() as u8
}

/// Cutoff on a log scale: 20 Hz → 0, 20 kHz → 127.  Anything at or below
/// 20 Hz (including the 0 Hz "closed" / "bypassed" settings) is 0.
pub fn hz_to_cc(hz: f32) -> u8 {
    if hz <= MIN_HZ { return 0; }
    unit_to_cc((hz / MIN_HZ).ln() / (MAX_HZ / MIN_HZ).ln())
}

pub fn rate_to_cc(rate: f32) -> u8 { unit_to_cc(rate / MAX_RATE) }

pub fn db_to_cc(db: f32) -> u8 { unit_to_cc((db - MIN_DB) / (MAX_DB - MIN_DB)) }

// ════════════════════════════════════════════════════════════════════════════
// MidiControlOut
// ════════════════════════════════════════════════════════════════════════════

/// Raw byte sink, so message generation can be tested without a port.
pub trait RawMidi {
    fn send(&mut self, bytes: &[u8]);
}

impl RawMidi for midir::MidiOutputConnection {
    fn send(&mut self, bytes: &[u8]) {
        if let Err(e) = midir::MidiOutputConnection::send(self, bytes) {
            log::warn!("MIDI send failed: {}", e);
        }
    }
}

pub struct MidiControlOut {
    conn:    Box<dyn RawMidi>,
    channel: u8,
    started: bool,
}

impl MidiControlOut {
    pub fn new(conn: Box<dyn RawMidi>, channel: u8) -> Self {
        MidiControlOut { conn, channel: channel & 0x0F, started: false }
    }

    /// Connect to the first available MIDI output port, preferring
    /// anything that looks like a softsynth.
    pub fn open() -> anyhow::Result<Self> {
        let midi_out = midir::MidiOutput::new("hand_tone").context("MIDI init")?;

        let ports = midi_out.ports();
        if ports.is_empty() {
            log::warn!("install a MIDI synthesiser (e.g. `fluidsynth` or `timidity -iA`) to hear the controls");
            return Err(PlayerError::NoMidiPorts.into());
        }

        let port_idx = ports.iter()
            .position(|p| {
                midi_out.port_name(p).map(|n| {
                    let n = n.to_lowercase();
                    n.contains("fluid") || n.contains("timidity") || n.contains("synth")
                }).unwrap_or(false)
            })
            .unwrap_or(0);

        let port = &ports[port_idx];
        let name = midi_out.port_name(port).unwrap_or_else(|_| "Unknown".to_string());
        log::info!("opening MIDI port: {}", name);

        let conn = midi_out.connect(port, "hand-tone-control")
            .map_err(|e| anyhow::anyhow!("connecting to {}: {}", name, e))?;
        Ok(MidiControlOut::new(Box::new(conn), 0))
    }

    fn cc(&mut self, controller: u8, value: u8) {
        self.conn.send(&[0xB0 | self.channel, controller, value.min(127)]);
    }
}

impl AudioOut for MidiControlOut {
    fn play(&mut self) {
        let byte = if self.started { MIDI_CONTINUE } else { MIDI_START };
        self.started = true;
        self.conn.send(&[byte]);
    }

    fn pause(&mut self) { self.conn.send(&[MIDI_STOP]); }

    fn set_filter(&mut self, filter: FilterSetting) {
        // Only one filter is engaged at a time; open the other one fully.
        match filter.kind {
            FilterKind::Lowpass => {
                self.cc(CC_HIGHPASS, 0);
                self.cc(CC_LOWPASS, hz_to_cc(filter.frequency));
            }
            FilterKind::Highpass => {
                self.cc(CC_LOWPASS, 127);
                self.cc(CC_HIGHPASS, hz_to_cc(filter.frequency));
            }
        }
    }

    fn set_rate(&mut self, rate: f32) { self.cc(CC_RATE, rate_to_cc(rate)); }

    fn set_volume(&mut self, db: f32) { self.cc(CC_VOLUME, db_to_cc(db)); }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
