// Settings module
// User-tunable configuration for the calendar grid, persisted as TOML.

use serde::{Deserialize, Serialize};

/// Number of days shown by the day view.
pub const DAY_VIEW_DAYS: u32 = 1;
/// Number of days shown by the week view.
pub const WEEK_VIEW_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display density; every pixel constant is multiplied by it.
    pub density: f32,
    /// Days shown side by side (1 = day view, 7 = week view).
    pub num_days: u32,
    /// Hour rows visible at once inside the scrollable grid.
    pub visible_hours: u32,
    /// 0 = Sunday, 1 = Monday, etc.
    pub first_day_of_week: u8,
    pub use_24_hour_time: bool,
    /// Center-key hold time that turns a press into a long press.
    pub long_press_millis: u64,
    /// Short events are treated as this long when packing columns.
    pub overlap_margin_minutes: i32,
    /// Optional JSON file of events loaded by the demo application.
    pub events_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            density: 1.0,
            num_days: WEEK_VIEW_DAYS,
            visible_hours: 10,
            first_day_of_week: 0, // Sunday
            use_24_hour_time: false,
            long_press_millis: 500,
            overlap_margin_minutes: 15,
            events_file: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err("Density must be a positive number".to_string());
        }

        if self.num_days == 0 || self.num_days > WEEK_VIEW_DAYS {
            return Err(format!(
                "Number of days must be between 1 and {}",
                WEEK_VIEW_DAYS
            ));
        }

        if self.visible_hours < 4 || self.visible_hours > 24 {
            return Err("Visible hours must be between 4 and 24".to_string());
        }

        if self.first_day_of_week > 6 {
            return Err("First day of week must be between 0 and 6".to_string());
        }

        if self.overlap_margin_minutes < 0 {
            return Err("Overlap margin cannot be negative".to_string());
        }

        Ok(())
    }

    pub fn is_day_view(&self) -> bool {
        self.num_days == DAY_VIEW_DAYS
    }
}
