//! Sample-level processing for the loop player: a second-order Butterworth
//! filter, dB→gain conversion, WAV loading, and the looping [`Voice`].

use std::f32::consts::PI;
use std::path::Path;

use anyhow::Context;
use hotspot_map::{FilterKind, FilterSetting, DEFAULT_RATE, DEFAULT_VOLUME_DB};

// ════════════════════════════════════════════════════════════════════════════
// Butterworth biquad
// ════════════════════════════════════════════════════════════════════════════

/// Two-pole Butterworth low/high-pass section (direct form II).
#[derive(Clone, Debug, Default)]
pub struct Biquad {
    kind: Option<FilterKind>,
    a:  f32,
    d1: f32,
    d2: f32,
    w1: f32,
    w2: f32,
}

impl Biquad {
    /// Recompute coefficients for `kind` at `cutoff_hz`.  The delay line is
    /// kept so sweeping the cutoff does not click.
    pub fn set(&mut self, kind: FilterKind, cutoff_hz: f32, sample_rate_hz: f32) {
        // Keep the cutoff strictly inside (0, Nyquist) so tan() stays finite.
        let nyquist = sample_rate_hz / 2.0;
        let cutoff  = cutoff_hz.clamp(1.0, nyquist * 0.99);
        let a  = (PI * cutoff / sample_rate_hz).tan();
        let a2 = a * a;
        let r  = (PI / 4.0).sin();
        let s  = a2 + 2.0 * a * r + 1.0;
        self.a = match kind {
            FilterKind::Lowpass  => a2 / s,
            FilterKind::Highpass => 1.0 / s,
        };
        self.d1 = 2.0 * (1.0 - a2) / s;
        self.d2 = -(a2 - 2.0 * a * r + 1.0) / s;
        self.kind = Some(kind);
    }

    pub fn run(&mut self, sample: f32) -> f32 {
        let kind = match self.kind {
            Some(k) => k,
            None    => return sample,
        };
        let w0 = self.d1 * self.w1 + self.d2 * self.w2 + sample;
        let out = match kind {
            FilterKind::Lowpass  => self.a * (w0 + 2.0 * self.w1 + self.w2),
            FilterKind::Highpass => self.a * (w0 - 2.0 * self.w1 + self.w2),
        };
        self.w2 = self.w1;
        self.w1 = w0;
        out
    }

    pub fn reset(&mut self) {
        self.w1 = 0.0;
        self.w2 = 0.0;
    }
}

pub fn db_to_gain(db: f32) -> f32 { 10f32.powf(db / 20.0) }

// ════════════════════════════════════════════════════════════════════════════
// WAV loading
// ════════════════════════════════════════════════════════════════════════════

/// Mono clip plus its native sample rate.
#[derive(Clone, Debug, Default)]
pub struct Clip {
    pub samples:        Vec<f32>,
    pub sample_rate_hz: u32,
}

/// Read a WAV file and average its channels down to mono `f32`.
pub fn read_wav_mono(path: impl AsRef<Path>) -> anyhow::Result<Clip> {
    let path = path.as_ref();
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .with_context(|| format!("decoding {}", path.display()))?,
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_value))
                .collect::<Result<_, _>>()
                .with_context(|| format!("decoding {}", path.display()))?
        }
    };

    let samples = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    Ok(Clip { samples, sample_rate_hz: spec.sample_rate })
}

// ════════════════════════════════════════════════════════════════════════════
// Voice — looping clip with rate, filter and gain
// ════════════════════════════════════════════════════════════════════════════

/// Everything the audio callback needs to render the next sample.
#[derive(Debug)]
pub struct Voice {
    clip:      Clip,
    out_rate:  f32,
    cursor:    f64,
    playing:   bool,
    rate:      f32,
    gain:      f32,
    filter:    FilterSetting,
    biquad:    Biquad,
}

impl Voice {
    pub fn new(clip: Clip, out_rate_hz: u32) -> Self {
        Voice {
            clip,
            out_rate: out_rate_hz.max(1) as f32,
            cursor:   0.0,
            playing:  false,
            rate:     DEFAULT_RATE,
            gain:     db_to_gain(DEFAULT_VOLUME_DB),
            filter:   FilterSetting::OFF,
            biquad:   Biquad::default(),
        }
    }

    pub fn set_playing(&mut self, playing: bool) { self.playing = playing; }
    pub fn is_playing(&self) -> bool { self.playing }

    pub fn set_rate(&mut self, rate: f32) { self.rate = rate.max(0.0); }

    pub fn set_volume_db(&mut self, db: f32) { self.gain = db_to_gain(db); }

    pub fn set_filter(&mut self, filter: FilterSetting) {
        self.filter = filter;
        if filter.frequency > 0.0 {
            self.biquad.set(filter.kind, filter.frequency, self.out_rate);
        } else {
            self.biquad.reset();
        }
    }

    /// Position in the clip, in seconds.
    pub fn position_secs(&self) -> f64 {
        self.cursor / self.clip.sample_rate_hz.max(1) as f64
    }

    /// Render one output sample and advance the loop.
    pub fn next_sample(&mut self) -> f32 {
        let len = self.clip.samples.len();
        if !self.playing || len == 0 {
            return 0.0;
        }

        // Linear interpolation between neighbouring clip samples.
        let i    = self.cursor as usize % len;
        let j    = (i + 1) % len;
        let frac = (self.cursor - self.cursor.floor()) as f32;
        let raw  = self.clip.samples[i] * (1.0 - frac) + self.clip.samples[j] * frac;

        let step = self.rate as f64 * self.clip.sample_rate_hz as f64 / self.out_rate as f64;
        self.cursor = (self.cursor + step) % len as f64;

        let filtered = match (self.filter.kind, self.filter.frequency > 0.0) {
            // A lowpass closed all the way down passes nothing.
            (FilterKind::Lowpass, false)  => 0.0,
            // A highpass at 0 Hz passes everything.
            (FilterKind::Highpass, false) => raw,
            (_, true)                     => self.biquad.run(raw),
        };
        filtered * self.gain
    }

    pub fn fill(&mut self, out: &mut [f32], channels: usize) {
        for frame in out.chunks_mut(channels.max(1)) {
            let s = self.next_sample();
            for element in frame {
                *element = s;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
