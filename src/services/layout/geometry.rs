//! Pixel geometry for timed events.
//!
//! Maps an event's minutes on one day into a rectangle inside that day's
//! column, and answers hit-test queries against those rectangles.

use crate::models::event::Event;
use crate::utils::date::{MINUTES_PER_DAY, MINUTES_PER_HOUR};

use super::config::LayoutConfig;
use super::EventLayout;

/// Integer pixel rectangle; `right` and `bottom` are exclusive edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> i32 {
        (self.left + self.right) / 2
    }

    pub fn center_y(&self) -> i32 {
        (self.top + self.bottom) / 2
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Strict overlap test; rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }
}

/// Maps event times to rectangles for one hour height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventGeometry {
    hour_height: i32,
    hour_gap: i32,
    min_event_height: i32,
    cell_margin: i32,
}

impl EventGeometry {
    pub fn new(config: &LayoutConfig, hour_height: i32) -> Self {
        Self {
            hour_height: hour_height.max(0),
            hour_gap: config.hour_gap,
            min_event_height: config.min_event_height,
            cell_margin: config.cell_margin,
        }
    }

    pub fn hour_height(&self) -> i32 {
        self.hour_height
    }

    pub fn set_hour_height(&mut self, hour_height: i32) {
        self.hour_height = hour_height.max(0);
    }

    /// Rectangle of `event` inside the column for `day`.
    ///
    /// `left`/`top` locate hour 0 of the column. Returns `None` for all-day
    /// events, events not on `day`, and multi-day events whose part on `day`
    /// is empty (ending exactly at its midnight). Zero-length events are kept
    /// and get the minimum height.
    pub fn compute_event_rect(
        &self,
        day: i32,
        left: i32,
        top: i32,
        cell_width: i32,
        event: &Event,
        layout: &EventLayout,
    ) -> Option<Rect> {
        if event.all_day || event.start_day > day || event.end_day < day {
            return None;
        }

        let mut start_time = event.start_time;
        let mut end_time = event.end_time;
        if event.start_day < day {
            start_time = 0;
            if event.end_day == day && end_time <= 0 {
                return None;
            }
        }
        if event.end_day > day {
            end_time = MINUTES_PER_DAY;
        }
        let start_time = start_time.clamp(0, MINUTES_PER_DAY);
        let end_time = end_time.clamp(0, MINUTES_PER_DAY);

        let start_hour = start_time / MINUTES_PER_HOUR;
        let mut end_hour = end_time / MINUTES_PER_HOUR;
        // An end on the hour belongs to the row above it.
        if end_hour * MINUTES_PER_HOUR == end_time && end_hour > start_hour {
            end_hour -= 1;
        }

        let minute_height = self.hour_height as f32 / MINUTES_PER_HOUR as f32;
        let rect_top =
            top + (start_time as f32 * minute_height) as i32 + start_hour * self.hour_gap;
        let mut rect_bottom =
            top + (end_time as f32 * minute_height) as i32 + end_hour * self.hour_gap;
        if rect_bottom < rect_top + self.min_event_height {
            rect_bottom = rect_top + self.min_event_height;
        }

        let max_columns = layout.max_columns.max(1) as i32;
        let column = layout.column as i32;
        let col_width = ((cell_width - 2 * self.cell_margin) / max_columns).max(1);
        let rect_left = left + self.cell_margin + column * col_width;

        Some(Rect::new(rect_left, rect_top, rect_left + col_width, rect_bottom))
    }

    /// Whether an event rectangle touches the selection region.
    pub fn event_intersects_selection(rect: &Rect, region: &Rect) -> bool {
        rect.left < region.right
            && rect.right >= region.left
            && rect.top < region.bottom
            && rect.bottom >= region.top
    }

    /// Distance from a point to the nearest edge of `rect`, zero inside it.
    pub fn point_to_event(x: f32, y: f32, rect: &Rect) -> f32 {
        let left = rect.left as f32;
        let right = rect.right as f32;
        let top = rect.top as f32;
        let bottom = rect.bottom as f32;

        let dx = if x < left {
            left - x
        } else if x > right {
            x - right
        } else {
            0.0
        };
        let dy = if y < top {
            top - y
        } else if y > bottom {
            y - bottom
        } else {
            0.0
        };

        match (dx > 0.0, dy > 0.0) {
            (true, true) => dx.hypot(dy),
            (true, false) => dx,
            (false, true) => dy,
            (false, false) => 0.0,
        }
    }
}
