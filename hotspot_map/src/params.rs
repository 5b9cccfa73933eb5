//! Audio control parameters produced by the hotspot strategies.

/// Playback rate applied when the cursor is outside the tempo hotspot.
pub const DEFAULT_RATE:      f32 = 1.0;
/// Volume (dB) applied when the cursor is outside the volume hotspot.
pub const DEFAULT_VOLUME_DB: f32 = 5.0;

const OFF: &str = "off";

// ════════════════════════════════════════════════════════════════════════════
// Filter
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Lowpass,
    Highpass,
}

impl FilterKind {
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Lowpass  => "lowpass",
            FilterKind::Highpass => "highpass",
        }
    }
}

/// Filter type plus cutoff frequency in Hz.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterSetting {
    pub kind:      FilterKind,
    pub frequency: f32,
}

impl FilterSetting {
    /// A high-pass at 0 Hz lets everything through.
    pub const OFF: FilterSetting = FilterSetting { kind: FilterKind::Highpass, frequency: 0.0 };

    pub fn lowpass(frequency: f32)  -> Self { FilterSetting { kind: FilterKind::Lowpass,  frequency } }
    pub fn highpass(frequency: f32) -> Self { FilterSetting { kind: FilterKind::Highpass, frequency } }
}

// ════════════════════════════════════════════════════════════════════════════
// ControlParam
// ════════════════════════════════════════════════════════════════════════════

/// One strategy's output for one cursor position.
///
/// `None` is the "off" sentinel: the cursor is outside every region the
/// strategy owns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlParam {
    Filter(Option<FilterSetting>),
    PlaybackRate(Option<f32>),
    /// Volume in dB.
    Volume(Option<f32>),
}

impl ControlParam {
    pub fn is_off(&self) -> bool {
        match self {
            ControlParam::Filter(s)       => s.is_none(),
            ControlParam::PlaybackRate(r) => r.is_none(),
            ControlParam::Volume(v)       => v.is_none(),
        }
    }

    /// The filter to apply, with the sentinel resolved.  `None` for
    /// non-filter parameters.
    pub fn effective_filter(&self) -> Option<FilterSetting> {
        match *self {
            ControlParam::Filter(s) => Some(s.unwrap_or(FilterSetting::OFF)),
            _                       => None,
        }
    }

    pub fn effective_rate(&self) -> Option<f32> {
        match *self {
            ControlParam::PlaybackRate(r) => Some(r.unwrap_or(DEFAULT_RATE)),
            _                             => None,
        }
    }

    pub fn effective_volume(&self) -> Option<f32> {
        match *self {
            ControlParam::Volume(v) => Some(v.unwrap_or(DEFAULT_VOLUME_DB)),
            _                       => None,
        }
    }

    /// Text readouts as `(label, value)` pairs.
    ///
    /// A filter always reports both `lowpass` and `highpass`; only the
    /// engaged kind carries a number, the other reads `off`.
    pub fn readouts(&self) -> Vec<(&'static str, String)> {
        match *self {
            ControlParam::Filter(s) => {
                let text = |kind: FilterKind| match s {
                    Some(f) if f.kind == kind => format!("{:.2}", f.frequency),
                    _                         => OFF.to_string(),
                };
                vec![
                    (FilterKind::Lowpass.name(),  text(FilterKind::Lowpass)),
                    (FilterKind::Highpass.name(), text(FilterKind::Highpass)),
                ]
            }
            ControlParam::PlaybackRate(r) => vec![("rate",   fmt_or_off(r))],
            ControlParam::Volume(v)       => vec![("volume", fmt_or_off(v))],
        }
    }
}

fn fmt_or_off(v: Option<f32>) -> String {
    match v {
        Some(x) => format!("{:.2}", x),
        None    => OFF.to_string(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_filter_resolves_to_transparent_highpass() {
        let p = ControlParam::Filter(None);
        assert!(p.is_off());
        assert_eq!(p.effective_filter(), Some(FilterSetting::OFF));
        assert_eq!(p.effective_rate(), None);
    }

    #[test]
    fn off_rate_and_volume_resolve_to_defaults() {
        assert_eq!(ControlParam::PlaybackRate(None).effective_rate(), Some(DEFAULT_RATE));
        assert_eq!(ControlParam::Volume(None).effective_volume(), Some(DEFAULT_VOLUME_DB));
        assert_eq!(ControlParam::Volume(Some(-6.0)).effective_volume(), Some(-6.0));
    }

    #[test]
    fn lowpass_readouts() {
        let r = ControlParam::Filter(Some(FilterSetting::lowpass(1234.5))).readouts();
        assert_eq!(r, vec![
            ("lowpass",  "1234.50".to_string()),
            ("highpass", "off".to_string()),
        ]);
    }

    #[test]
    fn engaged_highpass_at_zero_still_shows_number() {
        let r = ControlParam::Filter(Some(FilterSetting::highpass(0.0))).readouts();
        assert_eq!(r[0].1, "off");
        assert_eq!(r[1].1, "0.00");
    }

    #[test]
    fn off_readouts() {
        let r = ControlParam::Filter(None).readouts();
        assert!(r.iter().all(|(_, v)| v == "off"));
        assert_eq!(ControlParam::PlaybackRate(None).readouts()[0].1, "off");
        assert_eq!(ControlParam::Volume(Some(2.5)).readouts()[0], ("volume", "2.50".to_string()));
    }
}
