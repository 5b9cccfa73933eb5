//! Normalized screen rectangles and hotspot placement.

use crate::HotspotError;

/// Default hotspot width as a fraction of the screen.
pub const HOTSPOT_WIDTH:  f32 = 0.25;
/// Default hotspot height as a fraction of the screen.
pub const HOTSPOT_HEIGHT: f32 = 0.33;

// ════════════════════════════════════════════════════════════════════════════
// Corner
// ════════════════════════════════════════════════════════════════════════════

/// A rectangle corner.  Screen space: `y` grows downward, so "top" is the
/// smaller `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

// ════════════════════════════════════════════════════════════════════════════
// Rect
// ════════════════════════════════════════════════════════════════════════════

/// Axis-aligned rectangle in `[0,1]²`, closed on every side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    /// Validated constructor: `0 ≤ x0 < x1 ≤ 1` and `0 ≤ y0 < y1 ≤ 1`.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Result<Self, HotspotError> {
        let ok = |lo: f32, hi: f32| 0.0 <= lo && lo < hi && hi <= 1.0;
        if ok(x0, x1) && ok(y0, y1) {
            Ok(Rect { x0, y0, x1, y1 })
        } else {
            Err(HotspotError::InvalidRect { x0, y0, x1, y1 })
        }
    }

    /// Closed containment.  NaN is never inside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    pub fn corner(&self, c: Corner) -> [f32; 2] {
        match c {
            Corner::TopLeft     => [self.x0, self.y0],
            Corner::TopRight    => [self.x1, self.y0],
            Corner::BottomLeft  => [self.x0, self.y1],
            Corner::BottomRight => [self.x1, self.y1],
        }
    }

    pub fn width(&self)  -> f32 { self.x1 - self.x0 }
    pub fn height(&self) -> f32 { self.y1 - self.y0 }
}

// ════════════════════════════════════════════════════════════════════════════
// Hotspot
// ════════════════════════════════════════════════════════════════════════════

/// A screen region plus the corner its metric is measured from.
///
/// The anchor is the inner corner, the one facing the screen centre, so the
/// metric is zero where the cursor first enters the region diagonally and
/// grows toward the screen edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hotspot {
    pub rect:   Rect,
    pub anchor: Corner,
}

impl Hotspot {
    pub fn new(rect: Rect, anchor: Corner) -> Self {
        Hotspot { rect, anchor }
    }

    /// Hotspot tucked into the screen corner `at`, `w × h` in size, with
    /// the anchor on the opposite (inner) corner.
    pub fn in_screen_corner(at: Corner, w: f32, h: f32) -> Result<Self, HotspotError> {
        let spot = Self::in_screen_corner_unchecked(at, w, h);
        let r = spot.rect;
        Rect::new(r.x0, r.y0, r.x1, r.y1)?;
        Ok(spot)
    }

    /// Same as [`Hotspot::in_screen_corner`] for sizes known to be valid.
    pub(crate) fn in_screen_corner_unchecked(at: Corner, w: f32, h: f32) -> Self {
        let (x0, y0, x1, y1, anchor) = match at {
            Corner::TopLeft     => (0.0,     0.0,     w,   h,   Corner::BottomRight),
            Corner::TopRight    => (1.0 - w, 0.0,     1.0, h,   Corner::BottomLeft),
            Corner::BottomLeft  => (0.0,     1.0 - h, w,   1.0, Corner::TopRight),
            Corner::BottomRight => (1.0 - w, 1.0 - h, 1.0, 1.0, Corner::TopLeft),
        };
        Hotspot { rect: Rect { x0, y0, x1, y1 }, anchor }
    }

    pub fn anchor_point(&self) -> [f32; 2] { self.rect.corner(self.anchor) }

    pub fn contains(&self, x: f32, y: f32) -> bool { self.rect.contains(x, y) }

    /// The two edges that face the screen centre, as line segments.
    ///
    /// These are the guide lines the overlay draws so the user can see where
    /// each hotspot begins.
    pub fn inner_edges(&self) -> [([f32; 2], [f32; 2]); 2] {
        let a = self.anchor_point();
        let (vertical_end, horizontal_end) = match self.anchor {
            Corner::TopLeft     => (self.rect.corner(Corner::BottomLeft),  self.rect.corner(Corner::TopRight)),
            Corner::TopRight    => (self.rect.corner(Corner::BottomRight), self.rect.corner(Corner::TopLeft)),
            Corner::BottomLeft  => (self.rect.corner(Corner::TopLeft),     self.rect.corner(Corner::BottomRight)),
            Corner::BottomRight => (self.rect.corner(Corner::TopRight),    self.rect.corner(Corner::BottomLeft)),
        };
        [(a, vertical_end), (a, horizontal_end)]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
