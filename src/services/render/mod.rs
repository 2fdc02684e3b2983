//! Drawing primitives and colours used to paint the calendar grid.
//!
//! The grid is painted through [`DrawSurface`], so any backend that can fill
//! rectangles, draw lines and place text can host it.

pub mod palette;

use serde::{Deserialize, Serialize};

use crate::services::layout::Rect;

pub use palette::GridPalette;

/// Straight RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Faded variant used for events the user declined.
    ///
    /// Each channel is halved and lifted by 0x7F, keeping alpha.
    pub fn declined(self) -> Self {
        Self {
            r: (self.r >> 1) + 0x7F,
            g: (self.g >> 1) + 0x7F,
            b: (self.b >> 1) + 0x7F,
            a: self.a,
        }
    }

    /// Saturated, darker shade for event outlines.
    pub fn border(self) -> Self {
        let (hue, _, value) = self.to_hsv();
        let (r, g, b) = hsv_to_rgb(hue, 1.0, value * 0.75);
        Self { r, g, b, a: self.a }
    }

    fn to_hsv(self) -> (f32, f32, f32) {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let hue = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let saturation = if max == 0.0 { 0.0 } else { delta / max };
        (hue, saturation, max)
    }
}

fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> (u8, u8, u8) {
    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = value - c;
    let (r, g, b) = match (hue / 60.0) as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_byte = |channel: f32| ((channel + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

/// Parse a hex color string.
///
/// Accepts "#RRGGBB", "RRGGBB" and the short "#RGB" form. Returns `None` for
/// empty or malformed input.
pub fn parse_color(hex: &str) -> Option<Rgba> {
    let hex = hex.trim().trim_start_matches('#');
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();

    match hex.len() {
        6 => Some(Rgba::rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            Some(Rgba::rgb(expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Rgba,
    pub align: TextAlign,
    pub bold: bool,
}

/// Backend the grid paints into.
pub trait DrawSurface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba, corner_radius: f32);

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, corner_radius: f32);

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba);

    /// Draw a single line of text with its baseline at `baseline_y`.
    fn text(&mut self, x: f32, baseline_y: f32, text: &str, style: TextStyle);

    /// Restrict subsequent drawing to `clip`, or lift the restriction.
    fn set_clip(&mut self, clip: Option<Rect>);
}

/// Off-screen surface bookkeeping for the scrollable grid.
///
/// The surface only grows; smaller views reuse it and just mark it dirty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OffscreenSurface {
    pub width: i32,
    pub height: i32,
    pub dirty: bool,
    /// Number of times the backing store had to be reallocated.
    pub allocations: u32,
}

impl OffscreenSurface {
    /// Make room for `width` x `height`. Returns whether a new backing store
    /// was needed.
    pub fn ensure(&mut self, width: i32, height: i32) -> bool {
        self.dirty = true;
        if width <= 0 || height <= 0 {
            return false;
        }
        if self.height < height || self.width < width {
            self.width = self.width.max(width);
            self.height = self.height.max(height);
            self.allocations += 1;
            return true;
        }
        false
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

/// Surface that records draw calls, for tests and diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill(Rect, Rgba),
    Stroke(Rect, Rgba),
    Line((f32, f32), (f32, f32), Rgba),
    Text(f32, f32, String, TextStyle),
    Clip(Option<Rect>),
}

impl RecordingSurface {
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(_, _, text, _) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn fills_with(&self, color: Rgba) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Fill(rect, c) if *c == color => Some(*rect),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba, _corner_radius: f32) {
        self.ops.push(DrawOp::Fill(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, _corner_radius: f32) {
        self.ops.push(DrawOp::Stroke(rect, color));
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba) {
        self.ops.push(DrawOp::Line(from, to, color));
    }

    fn text(&mut self, x: f32, baseline_y: f32, text: &str, style: TextStyle) {
        self.ops.push(DrawOp::Text(x, baseline_y, text.to_string(), style));
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.ops.push(DrawOp::Clip(clip));
    }
}
