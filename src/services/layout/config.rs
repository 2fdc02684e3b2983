//! Density-scaled layout constants.
//!
//! Built once from the display density and handed to every component that
//! measures or positions anything. Nothing here changes after construction.

use crate::models::settings::Settings;

/// Pixel constants for the grid, already multiplied by the display density.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub density: f32,
    /// Horizontal gap between day columns.
    pub day_gap: i32,
    /// Vertical gap between hour rows.
    pub hour_gap: i32,
    /// Inset applied on both sides of a day column before splitting it.
    pub cell_margin: i32,
    pub min_event_height: i32,
    /// Short events are stretched to this many minutes when packing so that
    /// their floored rectangles never collide.
    pub overlap_margin_minutes: i32,

    pub single_all_day_height: i32,
    pub max_all_day_height: i32,
    pub all_day_top_margin: i32,
    pub max_all_day_event_height: i32,

    pub normal_font_size: f32,
    pub event_text_font_size: f32,
    pub hours_font_size: f32,
    pub min_cell_width_for_text: i32,
    pub normal_text_top_margin: i32,
    pub all_day_text_top_margin: i32,
    pub hours_left_margin: i32,
    pub hours_right_margin: i32,
    /// Space above the day headers in multi-day views.
    pub banner_margin: i32,

    pub horizontal_scroll_threshold: i32,
    /// Half-size of the square probed around a tap when hit-testing events.
    pub touch_slop: i32,
    pub small_round_radius: f32,

    pub current_time_line_height: i32,
    pub current_time_line_border_width: i32,
    pub current_time_line_side_buffer: i32,
}

impl LayoutConfig {
    pub fn from_density(density: f32) -> Self {
        let density = if density.is_finite() && density > 0.0 {
            density
        } else {
            1.0
        };
        let px = |value: f32| (value * density) as i32;

        Self {
            density,
            day_gap: 1,
            hour_gap: 1,
            cell_margin: 1,
            min_event_height: px(15.0),
            overlap_margin_minutes: 15,

            single_all_day_height: px(20.0),
            max_all_day_height: px(72.0),
            all_day_top_margin: px(3.0),
            max_all_day_event_height: px(18.0),

            normal_font_size: 12.0 * density,
            event_text_font_size: 12.0 * density,
            hours_font_size: 12.0 * density,
            min_cell_width_for_text: px(27.0),
            normal_text_top_margin: 2,
            all_day_text_top_margin: 0,
            hours_left_margin: 2,
            hours_right_margin: 4,
            banner_margin: 14,

            horizontal_scroll_threshold: px(50.0),
            touch_slop: 10,
            small_round_radius: 3.0 * density,

            current_time_line_height: px(2.0),
            current_time_line_border_width: px(1.0),
            current_time_line_side_buffer: px(1.0),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            overlap_margin_minutes: settings.overlap_margin_minutes.max(0),
            ..Self::from_density(settings.density)
        }
    }

    /// Height of the all-day lane for the given number of rows.
    pub fn all_day_lane_height(&self, rows: usize) -> i32 {
        match rows {
            0 => 0,
            1 => self.single_all_day_height,
            n => (n as i32)
                .saturating_mul(self.max_all_day_event_height)
                .min(self.max_all_day_height),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::from_density(1.0)
    }
}
