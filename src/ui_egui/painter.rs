//! egui backends for the grid's drawing and text measuring seams.

use egui::{Align2, Color32, FontId, Pos2, Stroke};

use crate::services::layout::Rect;
use crate::services::render::{DrawSurface, Rgba, TextAlign, TextStyle};
use crate::services::text::TextMeasure;

/// Share of the row height above the baseline, used when egui does not
/// report an ascent.
const ASCENT_RATIO: f32 = 0.8;

pub fn to_color32(color: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Paints grid coordinates into an egui painter whose grid origin is
/// `origin`.
pub struct EguiSurface {
    painter: egui::Painter,
    origin: Pos2,
    bounds: egui::Rect,
}

impl EguiSurface {
    pub fn new(painter: egui::Painter, bounds: egui::Rect) -> Self {
        let painter = painter.with_clip_rect(bounds);
        Self {
            painter,
            origin: bounds.min,
            bounds,
        }
    }

    fn to_screen(&self, rect: Rect) -> egui::Rect {
        egui::Rect::from_min_max(
            self.origin + egui::vec2(rect.left as f32, rect.top as f32),
            self.origin + egui::vec2(rect.right as f32, rect.bottom as f32),
        )
    }

    fn point(&self, (x, y): (f32, f32)) -> Pos2 {
        self.origin + egui::vec2(x, y)
    }
}

impl DrawSurface for EguiSurface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba, corner_radius: f32) {
        self.painter
            .rect_filled(self.to_screen(rect), corner_radius, to_color32(color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, corner_radius: f32) {
        self.painter.rect_stroke(
            self.to_screen(rect),
            corner_radius,
            Stroke::new(1.0, to_color32(color)),
        );
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba) {
        self.painter.line_segment(
            [self.point(from), self.point(to)],
            Stroke::new(1.0, to_color32(color)),
        );
    }

    fn text(&mut self, x: f32, baseline_y: f32, text: &str, style: TextStyle) {
        let anchor = match style.align {
            TextAlign::Left => Align2::LEFT_TOP,
            TextAlign::Center => Align2::CENTER_TOP,
            TextAlign::Right => Align2::RIGHT_TOP,
        };
        let top = baseline_y - style.size * ASCENT_RATIO;
        let font = FontId::proportional(style.size);
        let color = to_color32(style.color);
        let pos = self.point((x, top));
        self.painter.text(pos, anchor, text, font.clone(), color);
        if style.bold {
            // No bold face in the default fonts: overstrike by one pixel.
            self.painter
                .text(pos + egui::vec2(1.0, 0.0), anchor, text, font, color);
        }
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        let clip = match clip {
            Some(rect) => self.to_screen(rect).intersect(self.bounds),
            None => self.bounds,
        };
        self.painter.set_clip_rect(clip);
    }
}

/// Measures text with the fonts egui will render it in.
pub struct EguiTextMeasure {
    ctx: egui::Context,
    font: FontId,
}

impl EguiTextMeasure {
    pub fn new(ctx: &egui::Context, size: f32) -> Self {
        Self {
            ctx: ctx.clone(),
            font: FontId::proportional(size),
        }
    }
}

impl TextMeasure for EguiTextMeasure {
    fn char_width(&self, c: char) -> f32 {
        self.ctx.fonts(|fonts| fonts.glyph_width(&self.font, c))
    }

    fn line_height(&self) -> f32 {
        self.ctx.fonts(|fonts| fonts.row_height(&self.font))
    }

    fn ascent(&self) -> f32 {
        self.line_height() * ASCENT_RATIO
    }

    fn text_width(&self, text: &str) -> f32 {
        self.ctx
            .fonts(|fonts| text.chars().map(|c| fonts.glyph_width(&self.font, c)).sum())
    }
}
