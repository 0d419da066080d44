//! Software-rendered preview using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  MODE CAPTION                                            │
//! │                                                          │
//! │                    ·  ✦  ·                               │
//! │                 ·  ● ■ ●  ·     particles, far → near    │
//! │               ●  ·  ▮  ·  ●                              │
//! │                                                          │
//! │  status bar: gesture · hand · particles · input          │
//! │  key legend                                              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Also the keyboard/mouse front end of the hand simulator: every call to
//! [`Preview::poll_input`] sends the current simulated hand to the
//! [`SimCamera`](crate::sim::SimCamera).

use std::f32::consts::FRAC_PI_2;
use std::sync::mpsc::Sender;

use glam::Vec3;
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use tracing::debug;

use hand_gesture::{Gesture, HandPose, HandShape};
use particle_field::{palette, ParticleSet};

use crate::driver::FramePayload;
use crate::error::{Result, SceneError};
use crate::mode::AppMode;
use crate::sampler::InputStatus;
use crate::sim::SimFrame;
use crate::sink::{build_visuals, RenderSink, SwatchResolver, Visual};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:      usize = 960;
pub const WIN_H:      usize = 720;
const STATUS_Y:       usize = WIN_H - 44;
const FONT_SCALE:     usize = 2;
const BG_COLOR:       u32   = 0xFF050805;
const TEXT_BG:        u32   = 0xFF0B1A10;
const CAPTION_COLOR:  u32   = palette::METALLIC_GOLD;
const LEGEND_COLOR:   u32   = 0xFF888888;

/// Vertical field of view.
const FOV_Y:          f32   = 45.0 * std::f32::consts::PI / 180.0;
/// Closer than this to the camera is not drawn.
const NEAR:           f32   = 0.3;
/// Side of a photo frame in world units at scale 1.
const PHOTO_SIZE:     f32   = 0.6;
/// Half-length of a cane at scale 1.
const CANE_HALF:      f32   = 0.6;

/// Tilt change per `[` / `]` press.
const TILT_STEP:      f32   = 0.15;

// ════════════════════════════════════════════════════════════════════════════
// HUD / input
// ════════════════════════════════════════════════════════════════════════════

/// Text state shown in the overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    pub mode:         AppMode,
    pub gesture:      Gesture,
    pub hand_visible: bool,
    pub particles:    usize,
    pub photos:       usize,
    pub input:        InputStatus,
}

impl Default for Hud {
    fn default() -> Self {
        Hud {
            mode:         AppMode::Tree,
            gesture:      Gesture::None,
            hand_visible: false,
            particles:    0,
            photos:       0,
            input:        InputStatus::Starting,
        }
    }
}

/// One-shot requests from the keyboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreviewInput {
    pub quit:      bool,
    pub add_image: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Preview
// ════════════════════════════════════════════════════════════════════════════

pub struct Preview {
    window:  Window,
    buf:     Vec<u32>,
    sim_tx:  Sender<SimFrame>,
    visuals: Vec<Visual>,
    hud:     Hud,
    tilt:    f32,
    focal:   f32,
}

impl Preview {
    pub fn new(sim_tx: Sender<SimFrame>) -> Result<Self> {
        let mut window = Window::new(
            "Particle Tree — hand gesture preview",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| SceneError::Window(e.to_string()))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Preview {
            window,
            buf:     vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            visuals: Vec::new(),
            hud:     Hud::default(),
            tilt:    0.0,
            focal:   (WIN_H as f32 / 2.0) / (FOV_Y / 2.0).tan(),
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    pub fn set_hud(&mut self, hud: Hud) { self.hud = hud; }

    /// Read keyboard and mouse, send the simulated hand, and report
    /// one-shot requests.
    pub fn poll_input(&mut self) -> PreviewInput {
        let mut input = PreviewInput::default();
        if !self.window.is_open() {
            input.quit = true;
            return input;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        input.quit = one_shot(Key::Q) || one_shot(Key::Escape);
        input.add_image = one_shot(Key::U);
        let tilt_left  = self.window.is_key_pressed(Key::LeftBracket,  KeyRepeat::Yes);
        let tilt_right = self.window.is_key_pressed(Key::RightBracket, KeyRepeat::Yes);
        if tilt_left  { self.tilt -= TILT_STEP; }
        if tilt_right { self.tilt += TILT_STEP; }

        let held = |k: Key| self.window.is_key_down(k);
        let shape = if held(Key::P) {
            HandShape::Pinch
        } else if held(Key::F) {
            HandShape::Fist
        } else if held(Key::O) {
            HandShape::OpenPalm
        } else {
            HandShape::Relaxed
        };

        // The hand is "in view" while the mouse is over the window.
        let hand = self.window.get_mouse_pos(MouseMode::Discard).map(|(mx, my)| HandPose {
            shape,
            center:    (mx / WIN_W as f32, my / WIN_H as f32),
            direction: -FRAC_PI_2 + self.tilt,
            scale:     1.0,
        });
        // Nobody listens when hardware input is in use.
        let _ = self.sim_tx.send(hand);

        input
    }

    // ── projection ────────────────────────────────────────────────────────

    /// Screen position and pixels-per-unit of a world point, or `None` if it
    /// is behind the near plane.
    fn project(&self, world: Vec3, camera_distance: f32) -> Option<(f32, f32, f32)> {
        let depth = camera_distance - world.z;
        if depth < NEAR {
            return None;
        }
        let k = self.focal / depth;
        Some((WIN_W as f32 / 2.0 + world.x * k, WIN_H as f32 / 2.0 - world.y * k, k))
    }

    // ── frame ─────────────────────────────────────────────────────────────

    fn render(&mut self, frame: &FramePayload) {
        self.buf.fill(BG_COLOR);
        let visuals = std::mem::take(&mut self.visuals);

        let group = frame.orientation;
        let mut order: Vec<(f32, usize)> = frame.particles.iter()
            .enumerate()
            .map(|(k, t)| ((group * t.position).z, k))
            .collect();
        // Far first.
        order.sort_by(|a, b| a.0.total_cmp(&b.0));

        for &(_, k) in &order {
            let t = frame.particles[k];
            let Some(visual) = visuals.get(t.index) else { continue };
            let center = group * t.position;
            let rot = group * t.rotation;
            let Some((sx, sy, ppu)) = self.project(center, frame.camera_distance) else { continue };

            match *visual {
                Visual::Sphere { color } => {
                    self.fill_sphere(sx, sy, t.scale * ppu, color);
                }
                Visual::Cube { color } => {
                    let corners = self.face_corners(center, rot, t.scale * 0.5, frame.camera_distance);
                    if let Some(c) = corners {
                        let facing = (rot * Vec3::Z).z.abs();
                        self.fill_quad(&c, palette::shade(color, 0.55 + 0.45 * facing));
                    }
                }
                Visual::Cane => {
                    let axis = rot * Vec3::Y * (CANE_HALF * t.scale);
                    let a = self.project(center - axis, frame.camera_distance);
                    let b = self.project(center + axis, frame.camera_distance);
                    if let (Some(a), Some(b)) = (a, b) {
                        let width = (0.08 * t.scale * ppu).max(1.5);
                        self.draw_cane((a.0, a.1), (b.0, b.1), width);
                    }
                }
                Visual::Photo { swatch, .. } => {
                    self.draw_photo(center, rot, t.scale, frame.camera_distance, swatch);
                }
                Visual::Placeholder => {
                    self.draw_photo(center, rot, t.scale, frame.camera_distance, palette::GREEN_DARK);
                }
            }
        }

        self.visuals = visuals;
        self.draw_overlay();
        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    fn draw_overlay(&mut self) {
        let hud = self.hud;
        self.draw_label(hud.mode.caption(), 16, 16, CAPTION_COLOR);

        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        let hand = if hud.hand_visible { "in view" } else { "none" };
        let status = format!(
            "gesture: {}   hand: {}   particles: {}   photos: {}   input: {}",
            hud.gesture.as_str(), hand, hud.particles, hud.photos, hud.input.as_str(),
        );
        self.draw_label(&status, 10, STATUS_Y + 6, 0xFFEEEEEE);
        self.draw_label(
            "hold F=fist O=open P=pinch  mouse=hand  [ ]=tilt  U=add photo  Q=quit",
            10, WIN_H - 16, LEGEND_COLOR,
        );
    }

    // ── shapes ────────────────────────────────────────────────────────────

    /// Projected corners of a square of half-size `half` in the particle's
    /// local XY plane.
    fn face_corners(&self, center: Vec3, rot: glam::Quat, half: f32, cam: f32) -> Option<[(f32, f32); 4]> {
        let x = rot * Vec3::X * half;
        let y = rot * Vec3::Y * half;
        let mut out = [(0.0, 0.0); 4];
        for (slot, corner) in out.iter_mut().zip([-x - y, x - y, x + y, -x + y]) {
            let (sx, sy, _) = self.project(center + corner, cam)?;
            *slot = (sx, sy);
        }
        Some(out)
    }

    fn draw_photo(&mut self, center: Vec3, rot: glam::Quat, scale: f32, cam: f32, swatch: u32) {
        let half = PHOTO_SIZE * scale * 0.5;
        if let Some(frame) = self.face_corners(center, rot, half * 1.12, cam) {
            self.fill_quad(&frame, palette::WHITE);
        }
        if let Some(inner) = self.face_corners(center, rot, half, cam) {
            self.fill_quad(&inner, swatch);
        }
    }

    fn fill_sphere(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let r = r.max(1.0);
        let x0 = (cx - r).floor().max(0.0) as usize;
        let y0 = (cy - r).floor().max(0.0) as usize;
        let x1 = ((cx + r).ceil().max(0.0) as usize).min(WIN_W);
        let y1 = ((cy + r).ceil().max(0.0) as usize).min(WIN_H);
        // Light from the upper left.
        let (lx, ly) = (cx - r * 0.35, cy - r * 0.35);
        for y in y0..y1 {
            for x in x0..x1 {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let d2 = ((px - cx).powi(2) + (py - cy).powi(2)) / (r * r);
                if d2 > 1.0 { continue; }
                let l2 = ((px - lx).powi(2) + (py - ly).powi(2)) / (r * r);
                let lit = (1.0 - 0.6 * l2).clamp(0.35, 1.0);
                self.buf[y * WIN_W + x] = palette::shade(color, lit);
            }
        }
    }

    fn draw_cane(&mut self, a: (f32, f32), b: (f32, f32), width: f32) {
        let len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
        let steps = (len.ceil() as usize).max(1);
        let stripe = (len / 6.0).max(2.0);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let (x, y) = (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
            let color = if ((t * len / stripe) as usize) % 2 == 0 {
                palette::CHRISTMAS_RED
            } else {
                palette::WHITE
            };
            self.fill_disc(x, y, width / 2.0, color);
        }
    }

    // ── primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn fill_disc(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let ri = r.ceil() as isize;
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if (dx * dx + dy * dy) as f32 <= r * r + 0.5 {
                    self.set_pixel(cx as isize + dx, cy as isize + dy, color);
                }
            }
        }
    }

    /// Fill a convex quad of either winding.
    fn fill_quad(&mut self, pts: &[(f32, f32); 4], color: u32) {
        let min_x = pts.iter().map(|p| p.0).fold(f32::INFINITY, f32::min).floor().max(0.0) as usize;
        let max_x = pts.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max).ceil().max(0.0) as usize;
        let min_y = pts.iter().map(|p| p.1).fold(f32::INFINITY, f32::min).floor().max(0.0) as usize;
        let max_y = pts.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max).ceil().max(0.0) as usize;

        for y in min_y..max_y.min(WIN_H) {
            for x in min_x..max_x.min(WIN_W) {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let mut pos = false;
                let mut neg = false;
                for i in 0..4 {
                    let (ax, ay) = pts[i];
                    let (bx, by) = pts[(i + 1) % 4];
                    let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
                    if cross > 0.0 { pos = true; }
                    if cross < 0.0 { neg = true; }
                }
                if !(pos && neg) {
                    self.buf[y * WIN_W + x] = color;
                }
            }
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    /// Minimal bitmap font — 3×5 glyphs drawn at `FONT_SCALE`.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let advance = 4 * FONT_SCALE;
        let mut cx = x;
        for ch in text.chars() {
            if cx + advance > WIN_W { break; }
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) == 0 { continue; }
                    let px = cx + col * FONT_SCALE;
                    let py = y + row * FONT_SCALE;
                    self.fill_rect(px, py, FONT_SCALE, FONT_SCALE, color);
                }
            }
            cx += advance;
        }
    }
}

impl RenderSink for Preview {
    fn bind_field(&mut self, field: &ParticleSet) -> Vec<usize> {
        self.visuals = build_visuals(field, &SwatchResolver);
        debug!(particles = self.visuals.len(), "preview visuals built");
        (0..self.visuals.len()).collect()
    }

    fn present(&mut self, frame: &FramePayload) {
        self.render(frame);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
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
        'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}
