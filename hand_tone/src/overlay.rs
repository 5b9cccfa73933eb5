//! Overlay state: what the visualizer draws on top of the background.
//!
//! Every layer is plain data in normalized `[0,1]²` coordinates; the
//! visualizer scales them to pixels.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use hotspot_map::ControlSet;

use crate::controller::{FrameOutcome, PointerColor};

// ════════════════════════════════════════════════════════════════════════════
// PointLayer — the cursor disc
// ════════════════════════════════════════════════════════════════════════════

pub const POINT_RADIUS: usize = 8;

#[derive(Clone, Debug, PartialEq)]
pub struct PointLayer {
    pub position: Option<[f32; 2]>,
    pub color:    PointerColor,
    pub radius:   usize,
}

impl Default for PointLayer {
    fn default() -> Self {
        PointLayer { position: None, color: PointerColor::Blue, radius: POINT_RADIUS }
    }
}

impl PointLayer {
    pub fn draw_point(&mut self, x: f32, y: f32) { self.position = Some([x, y]); }
    pub fn set_color(&mut self, color: PointerColor) { self.color = color; }
    pub fn clear(&mut self) { self.position = None; }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkLayer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkLayer {
    pub coordinates: Vec<[f32; 2]>,
}

impl LandmarkLayer {
    pub fn draw(&mut self, coordinates: &[[f32; 2]]) {
        self.coordinates.clear();
        self.coordinates.extend_from_slice(coordinates);
    }

    pub fn clear(&mut self) { self.coordinates.clear(); }

    /// Skeleton segments whose endpoints are both present.
    pub fn segments(&self) -> impl Iterator<Item = ([f32; 2], [f32; 2])> + '_ {
        cursor_ema::HAND_CONNECTIONS.iter().filter_map(move |&(a, b)| {
            Some((*self.coordinates.get(a)?, *self.coordinates.get(b)?))
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FpsCounter
// ════════════════════════════════════════════════════════════════════════════

/// Counts calls over the last second.
#[derive(Clone, Debug, Default)]
pub struct FpsCounter {
    calls: VecDeque<Instant>,
}

impl FpsCounter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn register_call(&mut self, now: Instant) {
        self.calls.push_back(now);
        while let Some(&t) = self.calls.front() {
            if now.saturating_duration_since(t) >= Self::WINDOW {
                self.calls.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn fps(&self) -> usize { self.calls.len() }
}

// ════════════════════════════════════════════════════════════════════════════
// PathLayer — hotspot guide lines
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathLayer {
    paths:   Vec<Vec<[f32; 2]>>,
    current: Vec<[f32; 2]>,
}

impl PathLayer {
    pub fn add_node(&mut self, x: f32, y: f32) { self.current.push([x, y]); }

    /// Close the current polyline.  A path needs at least two nodes to be
    /// kept.
    pub fn end_path(&mut self) {
        let path = std::mem::take(&mut self.current);
        if path.len() >= 2 {
            self.paths.push(path);
        }
    }

    pub fn paths(&self) -> &[Vec<[f32; 2]>] { &self.paths }
}

/// One guide per inner edge of every hotspot, drawn from the screen edge to
/// the anchor corner.
pub fn hotspot_guides(controls: &ControlSet) -> PathLayer {
    let mut layer = PathLayer::default();
    for spot in controls.hotspots() {
        for (anchor, outer) in spot.inner_edges() {
            layer.add_node(outer[0], outer[1]);
            layer.add_node(anchor[0], anchor[1]);
            layer.end_path();
        }
    }
    layer
}

// ════════════════════════════════════════════════════════════════════════════
// Overlay — all layers plus the text panel
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct Overlay {
    pub point:     PointLayer,
    pub landmarks: LandmarkLayer,
    pub fps:       FpsCounter,
    pub guides:    PathLayer,
    pub readouts:  Vec<(&'static str, String)>,
    /// Static error line (tracking source failures).
    pub error:     Option<String>,
    pub status:    String,
}

impl Overlay {
    pub fn new(controls: &ControlSet) -> Self {
        Overlay { guides: hotspot_guides(controls), ..Overlay::default() }
    }

    /// Fold one controller result into the layers.
    pub fn update(&mut self, outcome: &FrameOutcome, now: Instant) {
        self.fps.register_call(now);
        match outcome.cursor {
            Some([x, y]) => {
                self.point.draw_point(x, y);
                self.point.set_color(outcome.pointer);
                self.landmarks.draw(&outcome.landmarks);
            }
            None => {
                self.point.clear();
                self.landmarks.clear();
            }
        }
        self.readouts = outcome.readouts.clone();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
