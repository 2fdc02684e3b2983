// Input handling for the calendar grid: keys, touch gestures and taps.

use std::time::{Duration, Instant};

use chrono::TimeZone;

use crate::services::layout::{EventGeometry, Rect};
use crate::services::selection::{
    InputEvent, InteractionResult, Key, Point, SelectionMode, TouchMode, ViewCommand,
};
use crate::services::viewport::FreeSpin;
use crate::utils::date::{HOURS_PER_DAY, MINUTES_PER_HOUR};

use super::CalendarView;

impl<Tz: TimeZone> CalendarView<Tz> {
    /// Feed one input event to the view.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> InteractionResult {
        let result = match event {
            InputEvent::KeyDown(key) => self.key_down(key),
            InputEvent::KeyUp { key, held } => self.key_up(key, held),
            InputEvent::TouchDown(_) => self.touch_down(),
            InputEvent::Scroll { start, current } => self.scroll(start, current),
            InputEvent::Fling {
                start,
                end,
                velocity_y,
                ..
            } => self.fling(start, end, velocity_y, now),
            InputEvent::SingleTapUp(point) => self.single_tap_up(point),
            InputEvent::LongPress(point) => self.long_press(point),
            InputEvent::TouchUp => self.touch_up(),
            InputEvent::TouchCancel => {
                self.scrolling = false;
                self.touch_mode = TouchMode::Initial;
                self.reset_selected_hour();
                InteractionResult::handled()
            }
        };
        self.refresh_selection();
        result
    }

    fn key_down(&mut self, key: Key) -> InteractionResult {
        if self.selection.mode == SelectionMode::Hidden {
            // The first key press only reveals the selection.
            if key.is_arrow() || key == Key::Enter {
                self.selection.mode = SelectionMode::Selected;
                return InteractionResult::handled();
            }
            if key == Key::Center {
                self.selection.mode = SelectionMode::Pressed;
                return InteractionResult::handled();
            }
        }

        self.selection.mode = SelectionMode::Selected;
        self.scrolling = false;

        match key {
            // Committed on key up.
            Key::Center => InteractionResult::handled(),
            Key::Enter => self.switch_views(true),
            Key::Delete => match self.selection.selected_event {
                Some(slot) => {
                    let event = &self.events[slot];
                    InteractionResult::handled().with_command(ViewCommand::DeleteEvent {
                        id: event.id,
                        start_millis: event.start_millis,
                        end_millis: event.end_millis,
                    })
                }
                None => InteractionResult::ignored(),
            },
            Key::Up | Key::Down | Key::Left | Key::Right => self.move_selection(key),
        }
    }

    fn key_up(&mut self, key: Key, held: Duration) -> InteractionResult {
        if key != Key::Center {
            return InteractionResult::ignored();
        }
        match self.selection.mode {
            SelectionMode::Hidden => InteractionResult::ignored(),
            SelectionMode::Pressed => {
                self.selection.mode = SelectionMode::Selected;
                InteractionResult::handled()
            }
            _ if held < self.long_press => self.switch_views(true),
            _ => {
                self.selection.mode = SelectionMode::LongPress;
                InteractionResult::handled().with_command(self.context_menu_command())
            }
        }
    }

    /// Follow the selected event's link in the key's direction, or move the
    /// selection cell when there is none.
    fn move_selection(&mut self, key: Key) -> InteractionResult {
        let previous = self.previous_selection();
        let history_box = self.history_box();

        let link = self.selection.selected_event.and_then(|slot| {
            let links = self.selection.links.get(slot);
            match key {
                Key::Up => links.up,
                Key::Down => links.down,
                Key::Left => links.left,
                Key::Right => links.right,
                _ => None,
            }
        });
        self.selection.selected_event = link;
        if link.is_some() {
            return InteractionResult::handled();
        }

        self.selection.previous = previous;
        self.selection.prev_box = history_box;

        let mut day = self.selection.day;
        match key {
            Key::Left => day -= 1,
            Key::Right => day += 1,
            Key::Up => {
                if !self.selection.all_day {
                    self.adjust_hour_selection(self.selection.hour - 1);
                }
            }
            Key::Down => {
                if self.selection.all_day {
                    self.selection.all_day = false;
                } else {
                    self.adjust_hour_selection(self.selection.hour + 1);
                }
            }
            _ => {}
        }

        if day < self.first_day || day > self.last_day() {
            return self.shift_page(day > self.last_day(), day);
        }
        self.selection.day = day;
        self.selection.invalidate_working_set();
        InteractionResult::handled()
    }

    fn touch_down(&mut self) -> InteractionResult {
        self.touch_mode = TouchMode::Down;
        self.view_start_x = 0;
        self.fling_called = false;
        self.free_spin = None;
        InteractionResult {
            handled: true,
            ..InteractionResult::default()
        }
    }

    fn scroll(&mut self, start: Point, current: Point) -> InteractionResult {
        let distance_x = (start.x - current.x) as i32;
        let distance_y = (start.y - current.y) as i32;

        match self.touch_mode {
            TouchMode::Down => {
                self.scroll_start_y = self.viewport.view_start_y();
                if distance_x.abs() >= 2 * distance_y.abs() {
                    self.touch_mode = TouchMode::HorizontalScroll;
                    self.view_start_x = distance_x;
                } else {
                    self.touch_mode = TouchMode::VerticalScroll;
                }
            }
            TouchMode::HorizontalScroll => self.view_start_x = distance_x,
            _ => {}
        }

        if self.touch_mode == TouchMode::VerticalScroll {
            self.viewport
                .scroll_to(self.scroll_start_y.saturating_add(distance_y));
        }

        self.scrolling = true;
        self.selection.mode = SelectionMode::Hidden;
        InteractionResult::handled()
    }

    fn fling(&mut self, start: Point, end: Point, velocity_y: f32, now: Instant) -> InteractionResult {
        self.touch_mode = TouchMode::Initial;
        self.selection.mode = SelectionMode::Hidden;
        self.fling_called = true;

        let delta_x = (end.x - start.x) as i32;
        let delta_y = (end.y - start.y) as i32;
        if delta_x.abs() >= self.config.horizontal_scroll_threshold
            && delta_x.abs() > delta_y.abs()
        {
            let forward = delta_x < 0;
            self.scrolling = false;
            return self.shift_page(forward, self.page_target(forward));
        }

        let spin = FreeSpin::from_velocity(velocity_y, now);
        if spin.is_running() {
            self.free_spin = Some(spin);
        } else {
            self.free_spin = None;
            self.settle_scroll();
        }
        InteractionResult::handled()
    }

    fn touch_up(&mut self) -> InteractionResult {
        if self.fling_called {
            return InteractionResult::handled();
        }

        if self.touch_mode == TouchMode::HorizontalScroll {
            self.touch_mode = TouchMode::Initial;
            if self.view_start_x.abs() > self.config.horizontal_scroll_threshold {
                let forward = self.view_start_x > 0;
                return self.shift_page(forward, self.page_target(forward));
            }
            self.view_start_x = 0;
            return InteractionResult::handled();
        }
        self.touch_mode = TouchMode::Initial;

        if self.scrolling {
            self.settle_scroll();
            return InteractionResult::handled();
        }
        InteractionResult::ignored()
    }

    fn single_tap_up(&mut self, point: Point) -> InteractionResult {
        let previous_day = self.selection.day;
        let previous_hour = self.selection.hour;
        let previous_all_day = self.selection.all_day;

        if !self.set_selection_from_position(point.x, point.y) {
            return InteractionResult::ignored();
        }
        self.selection.mode = SelectionMode::Selected;

        let same_cell = previous_day == self.selection.day
            && previous_hour == self.selection.hour
            && previous_all_day == self.selection.all_day;
        if self.selection.selected_event.is_some() || same_cell {
            return self.switch_views(false);
        }
        InteractionResult::handled()
    }

    fn long_press(&mut self, point: Point) -> InteractionResult {
        if !self.set_selection_from_position(point.x, point.y) {
            return InteractionResult::ignored();
        }
        self.selection.mode = SelectionMode::LongPress;
        InteractionResult::handled().with_command(self.context_menu_command())
    }

    fn context_menu_command(&self) -> ViewCommand {
        ViewCommand::ShowContextMenu {
            millis: self.selected_time_millis(),
            event: self.selected_event().map(|event| event.id),
        }
    }

    /// Selection day after paging one page in the given direction.
    fn page_target(&self, forward: bool) -> i32 {
        let step = self.num_days as i32;
        self.selection.day + if forward { step } else { -step }
    }

    /// Move the selection to the cell under a view position. Returns false
    /// for positions in the hour label column.
    pub fn set_selection_from_position(&mut self, x: f32, y: f32) -> bool {
        let hours_width = self.metrics.hours_width as f32;
        if x < hours_width {
            return false;
        }

        let pitch = (self.cell_width + self.config.day_gap) as f32;
        let daynum = (((x - hours_width) / pitch) as i32).min(self.num_days as i32 - 1);
        self.selection.day = self.first_day + daynum;

        let grid_top = (self.first_cell() + self.viewport.first_hour_offset()) as f32;
        if y < grid_top {
            self.selection.all_day = self.all_day_rows > 0;
        } else {
            let row = self.viewport.row_height().max(1) as f32;
            let hour = ((y - grid_top) / row) as i32 + self.viewport.first_hour();
            self.selection.hour = hour.clamp(0, HOURS_PER_DAY - 1);
            self.selection.all_day = false;
        }

        self.selection.previous = None;
        self.find_selected_event(x, y);
        true
    }

    /// Select the event nearest to a tap in the selected cell and pull the
    /// selected day and hour inside it.
    fn find_selected_event(&mut self, x: f32, y: f32) {
        self.selection.selected_event = None;
        self.selection.selected_events.clear();
        self.selection.compute_selected_events = false;
        let day = self.selection.day;

        if self.selection.all_day {
            let mut closest = None;
            let mut min_distance = f32::MAX;
            for slot in 0..self.events.len() {
                let event = &self.events[slot];
                if !event.all_day || event.start_day > day || event.end_day < day {
                    continue;
                }
                let Some(rect) = self.all_day_rect(slot) else {
                    continue;
                };
                self.selection.selected_events.push(slot);

                let (top, bottom) = (rect.top as f32, rect.bottom as f32);
                if y >= top && y <= bottom {
                    closest = Some(slot);
                    break;
                }
                let distance = if y < top { top - y } else { y - bottom };
                if distance < min_distance {
                    min_distance = distance;
                    closest = Some(slot);
                }
            }
            self.selection.selected_event = closest;
        } else {
            let content_y = y + (self.viewport.view_start_y() - self.first_cell()) as f32;
            let slop = self.config.touch_slop;
            let region = Rect::new(
                x as i32 - slop,
                content_y as i32 - slop,
                x as i32 + slop,
                content_y as i32 + slop,
            );

            let mut min_distance = f32::MAX;
            for slot in 0..self.events.len() {
                let Some(rect) = self.timed_rect(slot, day) else {
                    continue;
                };
                if !EventGeometry::event_intersects_selection(&rect, &region) {
                    continue;
                }
                self.selection.selected_events.push(slot);
                let distance = EventGeometry::point_to_event(x, content_y, &rect);
                if distance < min_distance {
                    min_distance = distance;
                    self.selection.selected_event = Some(slot);
                }
            }
        }

        let Some(slot) = self.selection.selected_event else {
            return;
        };
        let event = &self.events[slot];
        let day = day.clamp(event.start_day, event.end_day);
        self.selection.day = day.clamp(self.first_day, self.last_day());

        if !self.selection.all_day {
            let start_hour = event.start_time / MINUTES_PER_HOUR;
            let end_hour = if event.start_time < event.end_time {
                (event.end_time - 1) / MINUTES_PER_HOUR
            } else {
                event.end_time / MINUTES_PER_HOUR
            };
            let day = self.selection.day;
            if self.selection.hour < start_hour && day == event.start_day {
                self.selection.hour = start_hour;
            } else if self.selection.hour > end_hour && day == event.end_day {
                self.selection.hour = end_hour;
            }
        }

        // Link the tapped cell so the keyboard can carry on from here.
        self.resolve_neighbors(true);
    }
}
