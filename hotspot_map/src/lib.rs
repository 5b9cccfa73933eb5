//! # hotspot_map
//!
//! Turn a normalized cursor position into audio control parameters.
//!
//! The screen is `[0,1]²` with `y` growing downward.  A **hotspot** is a
//! fixed rectangle; while the cursor is inside it, a distance metric
//! measured from the hotspot's inner corner is remapped onto a parameter
//! range.  Outside every hotspot the parameter falls back to its "off"
//! value.
//!
//! ```text
//! (0,0) ┌──────────┬──────────────────────┬──────────┐
//!       │  tempo   │                      │ highpass │
//!       │  ·──────►│                      │◄──────·  │
//!       ├──────────┘                      └──────────┤ y = H
//!       │                                            │
//!       ├──────────┐                      ┌──────────┤ y = 1 − H
//!       │ lowpass  │                      │  volume  │
//!       │          │                      │          │
//!       └──────────┴──────────────────────┴──────────┘ (1,1)
//!               x = W                  x = 1 − W
//! ```
//!
//! ## Built-in strategies
//!
//! | Strategy | Region | Metric | Output |
//! |---|---|---|---|
//! | [`FilterHotspots`] | bottom-left / top-right | bilinear area | lowpass 2000→0 Hz / highpass 0→4000 Hz |
//! | [`TempoHotspot`]   | top-left                 | linear distance | playback rate 1.0→2.0 |
//! | [`VolumeHotspot`]  | bottom-right             | linear distance | volume +5→−30 dB |
//!
//! Every strategy implements [`ControlMap`]; new formulas slot in without
//! touching the callers.
//!
//! ## Quick start
//!
//! ```rust
//! use hotspot_map::{ControlMap, ControlParam, FilterHotspots};
//!
//! let filter = FilterHotspots::default();
//! // Centre of the screen: outside both hotspots.
//! assert_eq!(filter.map(0.5, 0.5), ControlParam::Filter(None));
//! ```

pub mod geometry;
pub mod params;
pub mod strategy;

pub use geometry::{Corner, Hotspot, Rect, HOTSPOT_HEIGHT, HOTSPOT_WIDTH};
pub use params::{
    ControlParam, FilterKind, FilterSetting, DEFAULT_RATE, DEFAULT_VOLUME_DB,
};
pub use strategy::{
    ControlMap, ControlSet, FilterHotspots, HotspotRule, Metric, TempoHotspot,
    VolumeHotspot,
};

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HotspotError {
    #[error("invalid hotspot rectangle ({x0}, {y0})–({x1}, {y1}): bounds must satisfy 0 ≤ min < max ≤ 1")]
    InvalidRect { x0: f32, y0: f32, x1: f32, y1: f32 },

    #[error("unknown control strategy \"{0}\" (expected filter, tempo or volume)")]
    UnknownStrategy(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Range remapping
// ════════════════════════════════════════════════════════════════════════════

/// Linearly remap `v` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// The result is not clamped: inputs past `in_max` extrapolate.  A
/// degenerate input range maps everything to `out_min`.
///
/// ```rust
/// use hotspot_map::map_range;
/// assert_eq!(map_range(0.5, 0.0, 1.0, 0.0, 4000.0), 2000.0);
/// assert_eq!(map_range(2.0, 0.0, 1.0, 2000.0, -2000.0), -6000.0);
/// ```
pub fn map_range(v: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 { return out_min; }
    (v - in_min) * (out_max - out_min) / span + out_min
}

/// A stored [`map_range`] with an optional lower bound on the output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeMap {
    pub in_min:  f32,
    pub in_max:  f32,
    pub out_min: f32,
    pub out_max: f32,
    /// Outputs below this value are raised to it (frequencies stop at 0 Hz).
    pub floor:   Option<f32>,
}

impl RangeMap {
    pub fn new(in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> Self {
        RangeMap { in_min, in_max, out_min, out_max, floor: None }
    }

    pub fn with_floor(mut self, floor: f32) -> Self {
        self.floor = Some(floor);
        self
    }

    pub fn apply(&self, v: f32) -> f32 {
        let out = map_range(v, self.in_min, self.in_max, self.out_min, self.out_max);
        match self.floor {
            Some(f) if out < f => f,
            _                  => out,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_range_endpoints() {
        assert_eq!(map_range(0.0,  0.0, 0.05, 2000.0, -2000.0), 2000.0);
        assert_eq!(map_range(0.05, 0.0, 0.05, 2000.0, -2000.0), -2000.0);
        assert_eq!(map_range(1.0,  0.0, 2.0,  10.0, 20.0), 15.0);
    }

    #[test]
    fn map_range_degenerate_input() {
        assert_eq!(map_range(3.0, 1.0, 1.0, 7.0, 9.0), 7.0);
    }

    #[test]
    fn range_map_floor() {
        let rm = RangeMap::new(0.0, 0.05, 2000.0, -2000.0).with_floor(0.0);
        assert_eq!(rm.apply(0.0), 2000.0);
        assert_eq!(rm.apply(0.03), 0.0);
        assert_eq!(rm.apply(0.2), 0.0);
    }

    #[test]
    fn range_map_without_floor_extrapolates() {
        let rm = RangeMap::new(0.0, 1.0, 0.0, 10.0);
        assert_eq!(rm.apply(2.0), 20.0);
        assert_eq!(rm.apply(-1.0), -10.0);
    }

    #[test]
    fn error_messages() {
        let e = HotspotError::UnknownStrategy("reverb".into());
        assert!(e.to_string().contains("reverb"));
    }
}
