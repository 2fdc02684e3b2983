// Painting the grid through a DrawSurface.

use chrono::{DateTime, Datelike, TimeZone, Weekday};

use crate::models::event::Event;
use crate::services::layout::Rect;
use crate::services::render::{
    parse_color, DrawSurface, GridPalette, Rgba, TextAlign, TextStyle,
};
use crate::services::text::{line_pitch, wrap_event_text, TextMeasure};
use crate::utils::date::{
    date_from_julian_day, format_day_header, format_hour_label, julian_day_of,
    minutes_since_midnight, HOURS_PER_DAY, MINUTES_PER_HOUR,
};

use super::CalendarView;

impl<Tz: TimeZone> CalendarView<Tz> {
    /// Paint the whole view. `now` places the current-time line.
    pub fn render(
        &mut self,
        surface: &mut dyn DrawSurface,
        measure: &dyn TextMeasure,
        palette: &GridPalette,
        now: &DateTime<Tz>,
    ) {
        let full = Rect::new(0, 0, self.width, self.height);
        surface.set_clip(None);
        surface.fill_rect(full, palette.grid_background, 0.0);

        let first_cell = self.first_cell();
        surface.set_clip(Some(Rect::new(0, first_cell, self.width, self.height)));
        self.draw_grid(surface, palette);
        self.draw_timed_events(surface, measure, palette);
        self.draw_current_time_line(surface, palette, now);
        self.draw_hour_labels(surface, palette);

        surface.set_clip(Some(Rect::new(0, 0, self.width, first_cell)));
        surface.fill_rect(Rect::new(0, 0, self.width, first_cell), palette.gutter_background, 0.0);
        if self.num_days > 1 {
            self.draw_day_headers(surface, palette, julian_day_of(now));
        }
        if self.all_day_rows > 0 {
            self.draw_all_day_events(surface, measure, palette);
        }
        surface.set_clip(None);

        self.surface.mark_clean();
    }

    /// Offset from content coordinates to screen coordinates.
    fn content_offset(&self) -> (i32, i32) {
        (
            -self.view_start_x,
            self.first_cell() - self.viewport.view_start_y(),
        )
    }

    fn draw_grid(&self, surface: &mut dyn DrawSurface, palette: &GridPalette) {
        let (dx, dy) = self.content_offset();
        let row = self.viewport.row_height();
        let right = self.day_left(self.num_days as i32) as f32;
        let hours_width = self.metrics.hours_width as f32;

        for hour in 0..=HOURS_PER_DAY {
            let y = (hour * row + dy) as f32;
            surface.line((hours_width, y), (right, y), palette.grid_line);
        }

        let bottom = (self.viewport.content_height() + dy) as f32;
        for day in 1..self.num_days as i32 {
            let x = (self.day_left(day) - self.config.day_gap + dx) as f32;
            surface.line((x, dy as f32), (x, bottom), palette.grid_line);
        }

        if self.selection.is_visible() && !self.selection.all_day {
            let top = self.selection.hour * row + self.config.hour_gap;
            let left = self.day_left(self.selection.day - self.first_day);
            let cell = Rect::new(left, top, left + self.cell_width, top + self.viewport.cell_height());
            surface.fill_rect(cell.translate(dx, dy), palette.selection_background, 0.0);
        }
    }

    fn draw_hour_labels(&self, surface: &mut dyn DrawSurface, palette: &GridPalette) {
        let (_, dy) = self.content_offset();
        let gutter = Rect::new(0, self.first_cell(), self.metrics.hours_width, self.height);
        surface.fill_rect(gutter, palette.gutter_background, 0.0);

        let style = TextStyle {
            size: self.config.hours_font_size,
            color: palette.text_primary,
            align: TextAlign::Right,
            bold: true,
        };
        let x = (self.metrics.hours_width - self.config.hours_right_margin) as f32;
        let row = self.viewport.row_height();
        for hour in 0..HOURS_PER_DAY {
            let baseline = hour * row + self.config.hour_gap + self.metrics.hours_text_height + dy;
            let label = format_hour_label(hour, self.use_24_hour_time);
            surface.text(x, baseline as f32, &label, style);
        }
    }

    fn draw_day_headers(&self, surface: &mut dyn DrawSurface, palette: &GridPalette, today: i32) {
        let baseline = (self.config.banner_margin / 2 + self.metrics.banner_text_height) as f32;
        for daynum in 0..self.num_days as i32 {
            let day = self.first_day + daynum;
            let weekend = date_from_julian_day(day)
                .is_some_and(|date| matches!(date.weekday(), Weekday::Sat | Weekday::Sun));
            let color = if day == today {
                palette.today_header
            } else if weekend {
                palette.text_weekend
            } else {
                palette.text_primary
            };
            let style = TextStyle {
                size: self.config.normal_font_size,
                color,
                align: TextAlign::Center,
                bold: day == today,
            };
            let x = (self.day_left(daynum) + self.cell_width / 2 - self.view_start_x) as f32;
            surface.text(x, baseline, &format_day_header(day), style);
        }
    }

    fn draw_timed_events(
        &self,
        surface: &mut dyn DrawSurface,
        measure: &dyn TextMeasure,
        palette: &GridPalette,
    ) {
        let (dx, dy) = self.content_offset();
        let top_margin = self.config.normal_text_top_margin;

        for daynum in 0..self.num_days as i32 {
            let day = self.first_day + daynum;
            for slot in 0..self.events.len() {
                if let Some(rect) = self.timed_rect(slot, day) {
                    let rect = rect.translate(dx, dy);
                    self.draw_event(surface, measure, palette, &self.events[slot], rect, false, top_margin);
                }
            }
        }

        // The selected event goes on top of everything else.
        if self.selection.is_visible() && !self.selection.all_day {
            if let Some(slot) = self.selection.selected_event {
                if let Some(rect) = self.timed_rect(slot, self.selection.day) {
                    let rect = rect.translate(dx, dy);
                    self.draw_event(surface, measure, palette, &self.events[slot], rect, true, top_margin);
                }
            }
        }
    }

    fn draw_all_day_events(
        &self,
        surface: &mut dyn DrawSurface,
        measure: &dyn TextMeasure,
        palette: &GridPalette,
    ) {
        let dx = -self.view_start_x;
        let top_margin = self.config.all_day_text_top_margin;
        for slot in 0..self.events.len() {
            if let Some(rect) = self.all_day_rect(slot) {
                let rect = rect.translate(dx, 0);
                self.draw_event(surface, measure, palette, &self.events[slot], rect, false, top_margin);
            }
        }

        if !(self.selection.is_visible() && self.selection.all_day) {
            return;
        }
        if let Some(slot) = self.selection.selected_event {
            if let Some(rect) = self.all_day_rect(slot) {
                let rect = rect.translate(dx, 0);
                self.draw_event(surface, measure, palette, &self.events[slot], rect, true, top_margin);
            }
        }

        let left = self.day_left(self.selection.day - self.first_day) + 1 + dx;
        let top = self.banner_height + 1;
        let highlight = Rect::new(
            left,
            top,
            left + self.cell_width + self.config.day_gap - 1,
            top + self.all_day_height + self.config.all_day_top_margin - 1,
        );
        surface.stroke_rect(highlight, palette.today_header, 0.0);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_event(
        &self,
        surface: &mut dyn DrawSurface,
        measure: &dyn TextMeasure,
        palette: &GridPalette,
        event: &Event,
        rect: Rect,
        selected: bool,
        text_top_margin: i32,
    ) {
        let base = event
            .color
            .as_deref()
            .and_then(parse_color)
            .unwrap_or(palette.default_event);
        let fill = match (selected, event.is_declined()) {
            (true, _) => palette.selected_event,
            (false, true) => base.declined(),
            (false, false) => base,
        };
        let radius = self.config.small_round_radius;
        surface.fill_rect(rect, fill, radius);
        if !selected {
            surface.stroke_rect(rect, base.border(), radius);
        }

        let text_color = if event.is_declined() && !selected {
            palette.event_text.declined()
        } else {
            palette.event_text
        };
        self.draw_event_text(surface, measure, event, rect, text_color, text_top_margin);
    }

    fn draw_event_text(
        &self,
        surface: &mut dyn DrawSurface,
        measure: &dyn TextMeasure,
        event: &Event,
        rect: Rect,
        color: Rgba,
        top_margin: i32,
    ) {
        let inner_width = (rect.width() - 4) as f32;
        let inner_height = (rect.height() - top_margin) as f32;
        let lines = wrap_event_text(
            &event.title_and_location(),
            inner_width,
            inner_height,
            self.config.min_cell_width_for_text as f32,
            measure,
        );
        if lines.is_empty() {
            return;
        }

        let style = TextStyle {
            size: self.config.event_text_font_size,
            color,
            align: TextAlign::Left,
            bold: false,
        };
        let pitch = line_pitch(measure);
        let x = (rect.left + 2) as f32;
        let mut baseline = (rect.top + top_margin) as f32 + measure.ascent();
        for line in &lines {
            surface.text(x, baseline, line, style);
            baseline += pitch;
        }
    }

    fn draw_current_time_line(
        &self,
        surface: &mut dyn DrawSurface,
        palette: &GridPalette,
        now: &DateTime<Tz>,
    ) {
        let daynum = julian_day_of(now) - self.first_day;
        if daynum < 0 || daynum >= self.num_days as i32 {
            return;
        }
        let minute = minutes_since_midnight(now.time());
        let hour = minute / MINUTES_PER_HOUR;
        let cell = self.viewport.cell_height();
        let y = hour * self.viewport.row_height()
            + (minute % MINUTES_PER_HOUR) * cell / MINUTES_PER_HOUR
            + 1;

        let (dx, dy) = self.content_offset();
        let buffer = self.config.current_time_line_side_buffer;
        let left = self.day_left(daynum) + buffer;
        let line = Rect::new(
            left,
            y,
            left + self.cell_width - 2 * buffer,
            y + self.config.current_time_line_height,
        );
        surface.fill_rect(line.translate(dx, dy), palette.current_time_line, 0.0);
    }
}
