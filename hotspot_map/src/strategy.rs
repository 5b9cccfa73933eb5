//! Hotspot → parameter strategies.
//!
//! A strategy owns one or more [`HotspotRule`]s.  Each rule is
//! *region → metric → range*: if the cursor is inside the region, measure
//! it against the region's anchor and remap the measurement.

use crate::geometry::{Corner, Hotspot, HOTSPOT_HEIGHT, HOTSPOT_WIDTH};
use crate::params::{ControlParam, FilterSetting, DEFAULT_RATE, DEFAULT_VOLUME_DB};
use crate::{HotspotError, RangeMap};

/// Area below which the bilinear filter metric spans its whole range.
const FILTER_AREA_SPAN: f32 = 0.05;

// ════════════════════════════════════════════════════════════════════════════
// Metric
// ════════════════════════════════════════════════════════════════════════════

/// How far the cursor is "into" a hotspot, measured from its anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    /// Bilinear product distance `|(x − ax)·(y − ay)|`: the area of the
    /// rectangle spanned by the anchor and the cursor.  Zero anywhere along
    /// the two inner edges.
    Area,
    /// Straight-line distance to the anchor.
    Linear,
}

impl Metric {
    pub fn measure(self, p: [f32; 2], anchor: [f32; 2]) -> f32 {
        let dx = p[0] - anchor[0];
        let dy = p[1] - anchor[1];
        match self {
            Metric::Area   => (dx * dy).abs(),
            Metric::Linear => (dx * dx + dy * dy).sqrt(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HotspotRule
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HotspotRule {
    pub hotspot: Hotspot,
    pub metric:  Metric,
    pub range:   RangeMap,
}

impl HotspotRule {
    pub fn new(hotspot: Hotspot, metric: Metric, range: RangeMap) -> Self {
        HotspotRule { hotspot, metric, range }
    }

    /// The mapped value, or `None` if `(x, y)` is outside the region.
    pub fn evaluate(&self, x: f32, y: f32) -> Option<f32> {
        if !self.hotspot.contains(x, y) { return None; }
        let m = self.metric.measure([x, y], self.hotspot.anchor_point());
        Some(self.range.apply(m))
    }

    /// Largest metric value inside the region: the far corner.
    pub fn max_metric(hotspot: &Hotspot, metric: Metric) -> f32 {
        let far = match hotspot.anchor {
            Corner::TopLeft     => Corner::BottomRight,
            Corner::TopRight    => Corner::BottomLeft,
            Corner::BottomLeft  => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        };
        metric.measure(hotspot.rect.corner(far), hotspot.anchor_point())
    }
}

/// Pull a raw cursor coordinate into the unit square.  NaN stays NaN so it
/// falls outside every region.
fn clamp_unit(v: f32) -> f32 { v.clamp(0.0, 1.0) }

// ════════════════════════════════════════════════════════════════════════════
// ControlMap — the replaceable strategy
// ════════════════════════════════════════════════════════════════════════════

/// Maps a normalized cursor position to one audio parameter.
pub trait ControlMap: Send {
    /// Short identifier, as accepted by [`ControlSet::from_names`].
    fn name(&self) -> &'static str;

    /// Regions this strategy reacts to (drawn as guides by the overlay).
    fn hotspots(&self) -> Vec<Hotspot>;

    fn map(&self, x: f32, y: f32) -> ControlParam;
}

// ════════════════════════════════════════════════════════════════════════════
// FilterHotspots — bilinear lowpass / highpass corners
// ════════════════════════════════════════════════════════════════════════════

/// Two filter hotspots:
///
/// * bottom-left → **lowpass**, 2000 Hz at the inner corner, closing to
///   0 Hz as the area metric reaches 0.025;
/// * top-right → **highpass**, 0 Hz at the inner corner, opening by
///   4000 Hz per 0.05 of area.
///
/// # Example
/// ```rust
/// use hotspot_map::{ControlMap, ControlParam, FilterHotspots, FilterSetting};
/// use hotspot_map::{HOTSPOT_WIDTH as W, HOTSPOT_HEIGHT as H};
///
/// let f = FilterHotspots::default();
/// assert_eq!(f.map(W, 1.0 - H), ControlParam::Filter(Some(FilterSetting::lowpass(2000.0))));
/// assert_eq!(f.map(1.0 - W, H), ControlParam::Filter(Some(FilterSetting::highpass(0.0))));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FilterHotspots {
    pub lowpass:  HotspotRule,
    pub highpass: HotspotRule,
}

impl FilterHotspots {
    pub fn new(width: f32, height: f32) -> Result<Self, HotspotError> {
        let low  = Hotspot::in_screen_corner(Corner::BottomLeft, width, height)?;
        let high = Hotspot::in_screen_corner(Corner::TopRight,   width, height)?;
        Ok(Self::from_hotspots(low, high))
    }

    fn from_hotspots(low: Hotspot, high: Hotspot) -> Self {
        FilterHotspots {
            lowpass: HotspotRule::new(
                low, Metric::Area,
                RangeMap::new(0.0, FILTER_AREA_SPAN, 2000.0, -2000.0).with_floor(0.0),
            ),
            highpass: HotspotRule::new(
                high, Metric::Area,
                RangeMap::new(0.0, FILTER_AREA_SPAN, 0.0, 4000.0).with_floor(0.0),
            ),
        }
    }
}

impl Default for FilterHotspots {
    fn default() -> Self {
        Self::from_hotspots(
            Hotspot::in_screen_corner_unchecked(Corner::BottomLeft, HOTSPOT_WIDTH, HOTSPOT_HEIGHT),
            Hotspot::in_screen_corner_unchecked(Corner::TopRight,   HOTSPOT_WIDTH, HOTSPOT_HEIGHT),
        )
    }
}

impl ControlMap for FilterHotspots {
    fn name(&self) -> &'static str { "filter" }

    fn hotspots(&self) -> Vec<Hotspot> {
        vec![self.lowpass.hotspot, self.highpass.hotspot]
    }

    fn map(&self, x: f32, y: f32) -> ControlParam {
        let (x, y) = (clamp_unit(x), clamp_unit(y));
        if let Some(f) = self.lowpass.evaluate(x, y) {
            ControlParam::Filter(Some(FilterSetting::lowpass(f)))
        } else if let Some(f) = self.highpass.evaluate(x, y) {
            ControlParam::Filter(Some(FilterSetting::highpass(f)))
        } else {
            ControlParam::Filter(None)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TempoHotspot / VolumeHotspot — linear distance corners
// ════════════════════════════════════════════════════════════════════════════

/// Top-left hotspot: playback rate rises from 1.0 at the inner corner to
/// 2.0 at the screen corner.
#[derive(Clone, Debug, PartialEq)]
pub struct TempoHotspot {
    pub rule: HotspotRule,
}

impl TempoHotspot {
    pub fn new(width: f32, height: f32) -> Result<Self, HotspotError> {
        Ok(Self::from_hotspot(Hotspot::in_screen_corner(Corner::TopLeft, width, height)?))
    }

    fn from_hotspot(spot: Hotspot) -> Self {
        let max = HotspotRule::max_metric(&spot, Metric::Linear);
        TempoHotspot {
            rule: HotspotRule::new(spot, Metric::Linear, RangeMap::new(0.0, max, DEFAULT_RATE, 2.0)),
        }
    }
}

impl Default for TempoHotspot {
    fn default() -> Self {
        Self::from_hotspot(Hotspot::in_screen_corner_unchecked(
            Corner::TopLeft, HOTSPOT_WIDTH, HOTSPOT_HEIGHT,
        ))
    }
}

impl ControlMap for TempoHotspot {
    fn name(&self) -> &'static str { "tempo" }
    fn hotspots(&self) -> Vec<Hotspot> { vec![self.rule.hotspot] }
    fn map(&self, x: f32, y: f32) -> ControlParam {
        ControlParam::PlaybackRate(self.rule.evaluate(clamp_unit(x), clamp_unit(y)))
    }
}

/// Bottom-right hotspot: volume falls from +5 dB at the inner corner to
/// −30 dB at the screen corner.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeHotspot {
    pub rule: HotspotRule,
}

impl VolumeHotspot {
    pub fn new(width: f32, height: f32) -> Result<Self, HotspotError> {
        Ok(Self::from_hotspot(Hotspot::in_screen_corner(Corner::BottomRight, width, height)?))
    }

    fn from_hotspot(spot: Hotspot) -> Self {
        let max = HotspotRule::max_metric(&spot, Metric::Linear);
        VolumeHotspot {
            rule: HotspotRule::new(spot, Metric::Linear, RangeMap::new(0.0, max, DEFAULT_VOLUME_DB, -30.0)),
        }
    }
}

impl Default for VolumeHotspot {
    fn default() -> Self {
        Self::from_hotspot(Hotspot::in_screen_corner_unchecked(
            Corner::BottomRight, HOTSPOT_WIDTH, HOTSPOT_HEIGHT,
        ))
    }
}

impl ControlMap for VolumeHotspot {
    fn name(&self) -> &'static str { "volume" }
    fn hotspots(&self) -> Vec<Hotspot> { vec![self.rule.hotspot] }
    fn map(&self, x: f32, y: f32) -> ControlParam {
        ControlParam::Volume(self.rule.evaluate(clamp_unit(x), clamp_unit(y)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ControlSet — the strategies active in one session
// ════════════════════════════════════════════════════════════════════════════

/// Ordered collection of strategies, evaluated together every frame.
pub struct ControlSet {
    maps: Vec<Box<dyn ControlMap>>,
}

impl ControlSet {
    pub fn new() -> Self { ControlSet { maps: Vec::new() } }

    pub fn with(mut self, map: impl ControlMap + 'static) -> Self {
        self.maps.push(Box::new(map));
        self
    }

    pub fn push(&mut self, map: Box<dyn ControlMap>) { self.maps.push(map); }

    /// Build from strategy names (`filter`, `tempo`, `volume`), using the
    /// default hotspot size.  Names are case-insensitive.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, HotspotError> {
        let mut set = ControlSet::new();
        for n in names {
            let n = n.as_ref().trim();
            let map: Box<dyn ControlMap> = match n.to_ascii_lowercase().as_str() {
                "filter" => Box::new(FilterHotspots::default()),
                "tempo"  => Box::new(TempoHotspot::default()),
                "volume" => Box::new(VolumeHotspot::default()),
                _        => return Err(HotspotError::UnknownStrategy(n.to_string())),
            };
            set.push(map);
        }
        Ok(set)
    }

    /// One parameter per strategy, in insertion order.
    pub fn map_all(&self, x: f32, y: f32) -> Vec<ControlParam> {
        self.maps.iter().map(|m| m.map(x, y)).collect()
    }

    /// "Off" output of every strategy, for frames without a hand.
    pub fn all_off(&self) -> Vec<ControlParam> {
        self.map_all(f32::NAN, f32::NAN)
    }

    pub fn hotspots(&self) -> Vec<Hotspot> {
        self.maps.iter().flat_map(|m| m.hotspots()).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.maps.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize { self.maps.len() }
    pub fn is_empty(&self) -> bool { self.maps.is_empty() }
}

impl Default for ControlSet {
    fn default() -> Self { ControlSet::new().with(FilterHotspots::default()) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
