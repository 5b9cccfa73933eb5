//! Loop player on the default `cpal` output device.

use std::path::Path;
use std::sync::{Arc, Mutex};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    OutputCallbackInfo, Stream, StreamConfig,
};
use hotspot_map::FilterSetting;

use super::dsp::{read_wav_mono, Voice};
use super::{AudioOut, PlayerError};

pub struct CpalOut {
    voice: Arc<Mutex<Voice>>,
    #[allow(unused)]
    stream: Stream,
}

impl CpalOut {
    /// Load `clip` and start a (silent, paused) output stream.
    pub fn open(clip: &Path) -> anyhow::Result<Self> {
        let clip = read_wav_mono(clip)?;
        log::info!("clip: {} samples at {} Hz", clip.samples.len(), clip.sample_rate_hz);

        let host = cpal::default_host();
        log::info!("cpal host: {}", host.id().name());
        let device = host.default_output_device().ok_or(PlayerError::NoDevice)?;
        if let Ok(name) = device.name() {
            log::info!("cpal device: {}", name);
        }
        let config = device.default_output_config()?;
        log::info!("sample rate: {}", config.sample_rate().0);
        log::info!("num channels: {}", config.channels());
        let config = StreamConfig::from(config);

        let channels = config.channels as usize;
        let voice = Arc::new(Mutex::new(Voice::new(clip, config.sample_rate.0)));
        let voice_for_cpal_thread = Arc::clone(&voice);
        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &OutputCallbackInfo| {
                match voice_for_cpal_thread.lock() {
                    Ok(mut v) => v.fill(data, channels),
                    Err(_)    => data.fill(0.0),
                }
            },
            |err| log::error!("stream error: {}", err),
            None,
        )?;
        stream.play()?;

        Ok(CpalOut { voice, stream })
    }

    fn with_voice(&self, f: impl FnOnce(&mut Voice)) {
        match self.voice.lock() {
            Ok(mut v) => f(&mut v),
            Err(_)    => log::error!("audio voice lock poisoned"),
        }
    }
}

impl AudioOut for CpalOut {
    fn play(&mut self)  { self.with_voice(|v| v.set_playing(true)); }
    fn pause(&mut self) { self.with_voice(|v| v.set_playing(false)); }

    fn set_filter(&mut self, filter: FilterSetting) {
        self.with_voice(|v| v.set_filter(filter));
    }

    fn set_rate(&mut self, rate: f32) { self.with_voice(|v| v.set_rate(rate)); }

    fn set_volume(&mut self, db: f32) { self.with_voice(|v| v.set_volume_db(db)); }
}
