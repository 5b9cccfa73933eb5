//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌────────────────────────────────────────────┬──────────────┐
//! │ FPS 60                                     │  LOWPASS     │
//! │ ──────┐                          ┌──────── │  1800.00     │
//! │       │        o  (landmarks)    │         │  HIGHPASS    │
//! │       │          ●  cursor       │         │  OFF         │
//! │ ──────┘                          └──────── │  ...         │
//! │                                            │  TRANSPORT   │
//! │ error / status line                        │              │
//! └────────────────────────────────────────────┴──────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::Context;
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use crate::overlay::Overlay;
use crate::tracking::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 960;
pub const WIN_H:     usize = 540;
const PANEL_W:       usize = 220;
pub const STAGE_W:   usize = WIN_W - PANEL_W;
pub const STAGE_H:   usize = WIN_H;
const STATUS_Y:      usize = WIN_H - 40;
const BG_COLOR:      u32   = 0xFF101018;
const PANEL_BG:      u32   = 0xFF16213E;
const GUIDE_COLOR:   u32   = 0xFFFFFFFF;
const LANDMARK_COLOR: u32  = 0xFFFFFFFF;
const LABEL_COLOR:   u32   = 0xFF8899BB;
const VALUE_COLOR:   u32   = 0xFFEEEEEE;
const ERROR_COLOR:   u32   = 0xFFFF5555;
const TEXT_SCALE:    usize = 2;

/// Normalized coordinates outside this band are never drawn.
const DRAW_BAND: (f32, f32) = (-1.0, 2.0);

/// Normalized stage coordinates → pixel coordinates.  Input is clamped to
/// [`DRAW_BAND`] so a stray point can't produce an unbounded line.
pub fn to_px(p: [f32; 2]) -> (isize, isize) {
    let (lo, hi) = DRAW_BAND;
    let clamp = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(lo, hi) };
    (
        (clamp(p[0]) * (STAGE_W - 1) as f32).round() as isize,
        (clamp(p[1]) * (STAGE_H - 1) as f32).round() as isize,
    )
}

/// `true` for finite points within [`DRAW_BAND`] on both axes.
fn drawable(p: [f32; 2]) -> bool {
    let (lo, hi) = DRAW_BAND;
    p.iter().all(|&v| v.is_finite() && (lo..=hi).contains(&v))
}

/// Pixel coordinates → normalized stage coordinates, `None` off-stage.
pub fn from_px(x: f32, y: f32) -> Option<[f32; 2]> {
    if x < 0.0 || y < 0.0 || x >= STAGE_W as f32 || y >= STAGE_H as f32 {
        return None;
    }
    Some([x / (STAGE_W - 1) as f32, y / (STAGE_H - 1) as f32])
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — the pixel buffer and drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub buf: Vec<u32>,
    pub w:   usize,
    pub h:   usize,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Canvas { buf: vec![BG_COLOR; w * h], w, h }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.w && y < self.h { Some(self.buf[y * self.w + x]) } else { None }
    }

    pub fn fill(&mut self, color: u32) { self.buf.fill(color); }

    pub fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.buf[y as usize * self.w + x as usize] = color;
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    /// Bresenham line, both endpoints inclusive.
    pub fn draw_line(&mut self, from: (isize, isize), to: (isize, isize), color: u32) {
        let (mut x, mut y) = from;
        let dx =  (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x, y, color);
            if x == to.0 && y == to.1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    pub fn fill_circle(&mut self, cx: isize, cy: isize, r: usize, color: u32) {
        let r = r as isize;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Minimal 3×5 bitmap font, scaled by `scale`.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch.to_ascii_lowercase());
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > self.w { break; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    sim_tx: Sender<SimInput>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Hand Tone",
            WIN_W, WIN_H,
            WindowOptions { resize: false, ..WindowOptions::default() },
        ).context("opening visualizer window")?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer { window, canvas: Canvas::new(WIN_W, WIN_H), sim_tx })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll mouse and keys and forward them as [`SimInput`]s.  Returns
    /// `false` when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        if self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::Quit));
            return false;
        }

        for (key, sim) in [(Key::P, SimKey::Pinch), (Key::F, SimKey::Fist)] {
            if self.window.is_key_pressed(key, KeyRepeat::No) {
                let _ = self.sim_tx.send(SimInput::KeyDown(sim));
            }
            if self.window.is_key_released(key) {
                let _ = self.sim_tx.send(SimInput::KeyUp(sim));
            }
        }
        if self.window.is_key_pressed(Key::H, KeyRepeat::No) {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::ToggleHand));
        }

        let pointer = self.window
            .get_mouse_pos(MouseMode::Discard)
            .and_then(|(x, y)| from_px(x, y));
        let _ = self.sim_tx.send(match pointer {
            Some([x, y]) => SimInput::Pointer { x, y },
            None         => SimInput::NoPointer,
        });

        true
    }

    pub fn render(&mut self, overlay: &Overlay) -> anyhow::Result<()> {
        draw_overlay(&mut self.canvas, overlay);
        self.window
            .update_with_buffer(&self.canvas.buf, WIN_W, WIN_H)
            .context("presenting frame")
    }
}

/// Paint one full frame.
pub fn draw_overlay(c: &mut Canvas, overlay: &Overlay) {
    c.fill(BG_COLOR);

    // ── Guides ────────────────────────────────────────────────────────────
    for path in overlay.guides.paths() {
        for pair in path.windows(2) {
            c.draw_line(to_px(pair[0]), to_px(pair[1]), GUIDE_COLOR);
        }
    }

    // ── Landmarks ─────────────────────────────────────────────────────────
    for (a, b) in overlay.landmarks.segments().filter(|&(a, b)| drawable(a) && drawable(b)) {
        c.draw_line(to_px(a), to_px(b), LANDMARK_COLOR);
    }
    for &p in overlay.landmarks.coordinates.iter().filter(|&&p| drawable(p)) {
        let (x, y) = to_px(p);
        c.fill_circle(x, y, 2, LANDMARK_COLOR);
    }

    // ── Cursor ────────────────────────────────────────────────────────────
    if let Some(p) = overlay.point.position {
        let (x, y) = to_px(p);
        c.fill_circle(x, y, overlay.point.radius, overlay.point.color.argb());
    }

    // ── FPS ───────────────────────────────────────────────────────────────
    c.draw_label(&format!("FPS {}", overlay.fps.fps()), 8, 8, TEXT_SCALE, VALUE_COLOR);

    // ── Readout panel ─────────────────────────────────────────────────────
    c.fill_rect(STAGE_W, 0, PANEL_W, WIN_H, PANEL_BG);
    let mut y = 16;
    for (label, value) in &overlay.readouts {
        c.draw_label(label, STAGE_W + 12, y, TEXT_SCALE, LABEL_COLOR);
        c.draw_label(value, STAGE_W + 12, y + 14, TEXT_SCALE + 1, VALUE_COLOR);
        y += 44;
    }

    // ── Status / error line ───────────────────────────────────────────────
    match &overlay.error {
        Some(msg) => c.draw_label(msg, 8, STATUS_Y, TEXT_SCALE, ERROR_COLOR),
        None      => c.draw_label(&overlay.status, 8, STATUS_Y, TEXT_SCALE, VALUE_COLOR),
    }
    c.draw_label("mouse=move  P=pinch  F=fist  H=hand  Q=quit", 8, WIN_H - 14, 1, LABEL_COLOR);
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

/// Glyph for a lowercase letter, digit or the punctuation our messages use.
fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::PointerColor;
    use hotspot_map::ControlSet;

    #[test]
    fn pixel_mapping_round_trips_corners() {
        assert_eq!(to_px([0.0, 0.0]), (0, 0));
        assert_eq!(to_px([1.0, 1.0]), ((STAGE_W - 1) as isize, (STAGE_H - 1) as isize));
        assert_eq!(from_px(0.0, 0.0), Some([0.0, 0.0]));
        assert_eq!(from_px((STAGE_W - 1) as f32, 0.0), Some([1.0, 0.0]));
        assert_eq!(from_px(STAGE_W as f32 + 5.0, 10.0), None); // over the panel
        assert_eq!(from_px(-1.0, 10.0), None);
    }

    #[test]
    fn line_hits_both_endpoints() {
        let mut c = Canvas::new(20, 20);
        c.draw_line((2, 3), (15, 9), 0xFF00FF00);
        assert_eq!(c.get(2, 3), Some(0xFF00FF00));
        assert_eq!(c.get(15, 9), Some(0xFF00FF00));
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let mut c = Canvas::new(10, 10);
        c.fill_circle(-3, 5, 4, 0xFFFF0000);
        c.draw_line((-5, -5), (20, 20), 0xFFFF0000);
        c.fill_rect(8, 8, 10, 10, 0xFFFF0000);
        assert_eq!(c.get(9, 9), Some(0xFFFF0000));
    }

    #[test]
    fn cursor_disc_uses_pointer_colour() {
        let mut o = Overlay::new(&ControlSet::default());
        o.point.draw_point(0.5, 0.5);
        o.point.set_color(PointerColor::Red);
        let mut c = Canvas::new(WIN_W, WIN_H);
        draw_overlay(&mut c, &o);
        let (x, y) = to_px([0.5, 0.5]);
        assert_eq!(c.get(x as usize, y as usize), Some(PointerColor::Red.argb()));
    }

    #[test]
    fn guides_are_drawn() {
        let o = Overlay::new(&ControlSet::default());
        let mut c = Canvas::new(WIN_W, WIN_H);
        draw_overlay(&mut c, &o);
        let anchor = to_px([hotspot_map::HOTSPOT_WIDTH, 1.0 - hotspot_map::HOTSPOT_HEIGHT]);
        assert_eq!(c.get(anchor.0 as usize, anchor.1 as usize), Some(GUIDE_COLOR));
    }

    #[test]
    fn stray_landmarks_are_skipped() {
        let mut o = Overlay::new(&ControlSet::default());
        let mut pts = vec![[0.5, 0.5]; 21];
        pts[3] = [1e7, 1e7];
        pts[8] = [f32::NAN, 0.5];
        pts[12] = [f32::INFINITY, -1e30];
        o.landmarks.draw(&pts);
        let mut c = Canvas::new(WIN_W, WIN_H);
        draw_overlay(&mut c, &o);
        let (x, y) = to_px([0.5, 0.5]);
        assert_eq!(c.get(x as usize, y as usize), Some(LANDMARK_COLOR));
        assert_eq!(c.get(STAGE_W + 1, 1), Some(PANEL_BG));
    }

    #[test]
    fn far_points_map_to_bounded_pixels() {
        let far = to_px([1e7, -1e7]);
        assert_eq!(far, (2 * (STAGE_W - 1) as isize, -((STAGE_H - 1) as isize)));
        assert_eq!(to_px([f32::NAN, 0.0]), (0, 0));
        let mut c = Canvas::new(WIN_W, WIN_H);
        c.draw_line(to_px([0.5, 0.5]), to_px([1e7, 0.5]), 0xFFFF0000);
        let (_, y) = to_px([0.5, 0.5]);
        assert_eq!(c.get(WIN_W - 1, y as usize), Some(0xFFFF0000));
    }

    #[test]
    fn label_sets_some_pixels() {
        let mut c = Canvas::new(40, 10);
        c.draw_label("off", 0, 0, 1, 0xFFFFFFFF);
        assert!(c.buf.iter().any(|&p| p == 0xFFFFFFFF));
    }
}
