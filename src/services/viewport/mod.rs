//! Scrollable 24-hour viewport.
//!
//! The timed grid is laid out on a content surface tall enough for all 24
//! hour rows; only `grid_area_height` pixels of it are visible at a time,
//! starting at `view_start_y`.

pub mod free_spin;

use std::time::Instant;

use crate::utils::date::HOURS_PER_DAY;

use super::layout::LayoutConfig;

pub use free_spin::FreeSpin;

/// Outcome of moving the selected hour with the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourSelection {
    pub hour: i32,
    /// The selection moved up into the all-day lane.
    pub enter_all_day: bool,
}

/// What the selected day looks like, for deciding when moving up should
/// enter the all-day lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayContext {
    pub has_all_day_lane: bool,
    /// Earliest hour a timed event starts on the selected day, 25 if none.
    pub earliest_start_hour: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    hour_gap: i32,
    num_hours: i32,
    cell_height: i32,
    grid_area_height: i32,
    content_height: i32,
    view_start_y: i32,
    max_view_start_y: i32,
    first_hour: Option<i32>,
    first_hour_offset: i32,
}

impl Viewport {
    pub fn new(config: &LayoutConfig, num_hours: u32) -> Self {
        Self {
            hour_gap: config.hour_gap,
            num_hours: (num_hours as i32).clamp(1, HOURS_PER_DAY),
            cell_height: 0,
            grid_area_height: 0,
            content_height: 0,
            view_start_y: 0,
            max_view_start_y: 0,
            first_hour: None,
            first_hour_offset: 0,
        }
    }

    pub fn view_start_y(&self) -> i32 {
        self.view_start_y
    }

    pub fn max_view_start_y(&self) -> i32 {
        self.max_view_start_y
    }

    pub fn first_hour(&self) -> i32 {
        self.first_hour.unwrap_or(0)
    }

    pub fn first_hour_offset(&self) -> i32 {
        self.first_hour_offset
    }

    pub fn cell_height(&self) -> i32 {
        self.cell_height
    }

    pub fn num_hours(&self) -> i32 {
        self.num_hours
    }

    pub fn grid_area_height(&self) -> i32 {
        self.grid_area_height
    }

    pub fn content_height(&self) -> i32 {
        self.content_height
    }

    /// Pixel pitch of one hour row including its gap.
    pub fn row_height(&self) -> i32 {
        self.cell_height + self.hour_gap
    }

    /// Content-space top of an hour row.
    pub fn hour_top(&self, hour: i32) -> i32 {
        hour * self.row_height()
    }

    /// Recompute cell and content sizes for a new visible grid height.
    ///
    /// On the first call the first visible hour is centred on
    /// `selection_hour`; afterwards the current scroll position is kept.
    pub fn remeasure(&mut self, grid_area_height: i32, selection_hour: i32) {
        let gap = self.hour_gap;
        let n = self.num_hours;
        self.grid_area_height = grid_area_height.max(0);
        self.cell_height = ((self.grid_area_height - (n + 1) * gap) / n).max(1);

        let used = self.row_height() * n + gap;
        let bottom_space = (self.grid_area_height - used).max(0);
        self.content_height = gap + HOURS_PER_DAY * self.row_height() + bottom_space;
        self.max_view_start_y = (self.content_height - self.grid_area_height).max(0);

        if self.first_hour.is_none() {
            self.init_first_hour(selection_hour);
            self.first_hour_offset = 0;
        }

        if self.first_hour_offset >= self.row_height() {
            self.first_hour_offset = self.row_height() - 1;
        }
        self.view_start_y = (self.first_hour() * self.row_height() - self.first_hour_offset)
            .clamp(0, self.max_view_start_y);
        log::debug!(
            "viewport remeasured: cell {}px, content {}px, max scroll {}px",
            self.cell_height,
            self.content_height,
            self.max_view_start_y
        );
    }

    /// Put `hour` in the middle of the visible window where possible.
    pub fn init_first_hour(&mut self, hour: i32) {
        let first = (hour - self.num_hours / 2).clamp(0, HOURS_PER_DAY - self.num_hours);
        self.first_hour = Some(first);
    }

    /// Derive the first fully visible hour and its pixel offset from the
    /// scroll position.
    pub fn compute_first_hour(&mut self) {
        let row = self.row_height().max(1);
        let first = (self.view_start_y + row - 1) / row;
        self.first_hour = Some(first);
        self.first_hour_offset = first * row - self.view_start_y;
    }

    /// Scroll to an absolute offset, clamped to the content.
    pub fn scroll_to(&mut self, y: i32) -> i32 {
        self.view_start_y = y.clamp(0, self.max_view_start_y);
        self.compute_first_hour();
        self.view_start_y
    }

    pub fn scroll_by(&mut self, delta: i32) -> i32 {
        self.scroll_to(self.view_start_y.saturating_add(delta))
    }

    /// Run one free-spin tick. Returns whether the spin keeps going.
    pub fn apply_free_spin(&mut self, spin: &mut FreeSpin, now: Instant) -> bool {
        let target = self.view_start_y.saturating_add(spin.step(now));
        if target < 0 || target > self.max_view_start_y {
            spin.halt();
        }
        self.scroll_to(target);
        spin.reschedule(now)
    }

    /// Keep a keyboard-moved hour inside the window, scrolling one row at a
    /// time near the edges.
    pub fn adjust_hour_selection(&mut self, hour: i32, day: DayContext) -> HourSelection {
        let mut hour = hour;
        let mut enter_all_day = false;
        if hour < 0 {
            hour = 0;
            enter_all_day = day.has_all_day_lane;
        }
        if hour > HOURS_PER_DAY - 1 {
            hour = HOURS_PER_DAY - 1;
        }

        let first = self.first_hour();
        let row = self.row_height();

        if hour < first + 1 {
            // Stop in the all-day lane once no earlier timed events remain,
            // unless midnight or 8am is still to come.
            if day.has_all_day_lane && day.earliest_start_hour > hour && first > 0 && first < 8 {
                return HourSelection {
                    hour: first + 1,
                    enter_all_day: true,
                };
            }

            if first > 0 {
                self.first_hour = Some(first - 1);
                self.view_start_y = (self.view_start_y - row).max(0);
                return HourSelection {
                    hour,
                    enter_all_day,
                };
            }
        }

        if hour > first + self.num_hours - 3 {
            if first < HOURS_PER_DAY - self.num_hours {
                self.first_hour = Some(first + 1);
                self.view_start_y = (self.view_start_y + row).min(self.max_view_start_y);
            } else if first == HOURS_PER_DAY - self.num_hours && self.first_hour_offset > 0 {
                self.scroll_to(self.max_view_start_y);
            }
        }

        HourSelection {
            hour,
            enter_all_day,
        }
    }

    /// Pull the selected hour back inside the window after a scroll.
    /// Returns the new hour when it had to move.
    pub fn reset_selected_hour(&self, hour: i32) -> Option<i32> {
        let first = self.first_hour();
        if hour < first + 1 {
            Some(first + 1)
        } else if hour > first + self.num_hours - 3 {
            Some(first + self.num_hours - 3)
        } else {
            None
        }
    }
}
