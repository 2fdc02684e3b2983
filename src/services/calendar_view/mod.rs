//! The day/week grid controller.
//!
//! `CalendarView` owns the loaded events for one page of days together with
//! their layout side table, the scroll viewport and the selection. Hosts feed
//! it sizes, loaded events and input, ask it to paint through a
//! [`DrawSurface`](crate::services::render::DrawSurface), and carry out the
//! [`ViewCommand`]s it emits.

mod input;
mod render;

use std::time::{Duration, Instant};

use chrono::TimeZone;

use crate::models::event::Event;
use crate::models::settings::{Settings, WEEK_VIEW_DAYS};
use crate::services::layout::{
    neighbors, pack_columns, Candidate, EventGeometry, EventLayout, LayoutConfig,
    PreviousSelection, Rect,
};
use crate::services::loader::{EventLoader, LoadError, LoadOutcome, LoadTicket};
use crate::services::render::OffscreenSurface;
use crate::services::selection::{
    InteractionResult, SelectionMode, SelectionState, TouchMode, ViewCommand,
};
use crate::services::text::{MonospaceMeasure, TextMeasure};
use crate::services::viewport::{DayContext, FreeSpin, Viewport};
use crate::utils::date::{
    day_hour_to_millis, format_hour_label, utc_day_start_millis, week_start, HOURS_PER_DAY,
    MILLIS_PER_HOUR, MINUTES_PER_DAY, MINUTES_PER_HOUR,
};

/// Text sizes the grid layout depends on, measured once per font change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMetrics {
    /// Width of the hour label column.
    pub hours_width: i32,
    pub banner_text_height: i32,
    /// Baseline offset of an hour label below its grid line.
    pub hours_text_height: i32,
    pub event_text_ascent: i32,
    pub event_text_height: i32,
}

impl TextMetrics {
    pub fn measure(config: &LayoutConfig, measure: &dyn TextMeasure, use_24_hour: bool) -> Self {
        let widest = (0..HOURS_PER_DAY)
            .map(|hour| measure.text_width(&format_hour_label(hour, use_24_hour)))
            .fold(0.0_f32, f32::max);
        let line_height = measure.line_height().ceil() as i32;
        let ascent = measure.ascent().ceil() as i32;

        Self {
            hours_width: (widest + 0.5) as i32 + config.hours_left_margin + config.hours_right_margin,
            banner_text_height: line_height,
            hours_text_height: ascent,
            event_text_ascent: ascent,
            event_text_height: line_height,
        }
    }

    /// Metrics of a plain fixed-width font, used until the host measures
    /// its real font.
    pub fn headless(config: &LayoutConfig, use_24_hour: bool) -> Self {
        let measure = MonospaceMeasure {
            advance: 7.0 * config.density,
            height: 14.0 * config.density,
        };
        Self::measure(config, &measure, use_24_hour)
    }
}

pub struct CalendarView<Tz: TimeZone> {
    tz: Tz,
    config: LayoutConfig,
    num_days: u32,
    first_day_of_week: u8,
    use_24_hour_time: bool,
    long_press: Duration,

    /// Julian day of the leftmost column.
    first_day: i32,
    width: i32,
    height: i32,
    metrics: TextMetrics,
    cell_width: i32,
    banner_height: i32,
    all_day_rows: usize,
    all_day_height: i32,
    has_all_day: Vec<bool>,
    earliest_start_hour: Vec<i32>,

    viewport: Viewport,
    geometry: EventGeometry,
    events: Vec<Event>,
    layouts: Vec<EventLayout>,
    selection: SelectionState,

    touch_mode: TouchMode,
    scrolling: bool,
    fling_called: bool,
    /// Minimum duration the current layouts were packed with.
    packed_min_duration: i32,
    view_start_x: i32,
    scroll_start_y: i32,
    free_spin: Option<FreeSpin>,

    pending_load: Option<LoadTicket>,
    last_reload_day: Option<i32>,
    surface: OffscreenSurface,
}

impl<Tz: TimeZone> CalendarView<Tz> {
    /// Create a view showing the page that contains `selection_day`.
    pub fn new(settings: &Settings, tz: Tz, selection_day: i32, selection_hour: i32) -> Self {
        let config = LayoutConfig::from_settings(settings);
        let num_days = settings.num_days.clamp(1, WEEK_VIEW_DAYS);
        let metrics = TextMetrics::headless(&config, settings.use_24_hour_time);

        Self {
            tz,
            first_day: page_start(selection_day, num_days, settings.first_day_of_week),
            num_days,
            first_day_of_week: settings.first_day_of_week,
            use_24_hour_time: settings.use_24_hour_time,
            long_press: Duration::from_millis(settings.long_press_millis),
            width: 0,
            height: 0,
            metrics,
            cell_width: 0,
            banner_height: 0,
            all_day_rows: 0,
            all_day_height: 0,
            has_all_day: vec![false; num_days as usize],
            earliest_start_hour: vec![25; num_days as usize],
            viewport: Viewport::new(&config, settings.visible_hours),
            geometry: EventGeometry::new(&config, 0),
            events: Vec::new(),
            layouts: Vec::new(),
            selection: SelectionState::new(selection_day, selection_hour),
            touch_mode: TouchMode::Initial,
            scrolling: false,
            fling_called: false,
            packed_min_duration: 0,
            view_start_x: 0,
            scroll_start_y: 0,
            free_spin: None,
            pending_load: None,
            last_reload_day: None,
            surface: OffscreenSurface::default(),
            config,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn time_zone(&self) -> &Tz {
        &self.tz
    }

    pub fn num_days(&self) -> u32 {
        self.num_days
    }

    pub fn first_day(&self) -> i32 {
        self.first_day
    }

    pub fn last_day(&self) -> i32 {
        self.first_day + self.num_days as i32 - 1
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn layouts(&self) -> &[EventLayout] {
        &self.layouts
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// The selected event, if any.
    pub fn selected_event(&self) -> Option<&Event> {
        self.selection.selected_event.and_then(|slot| self.events.get(slot))
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn metrics(&self) -> &TextMetrics {
        &self.metrics
    }

    pub fn cell_width(&self) -> i32 {
        self.cell_width
    }

    pub fn all_day_height(&self) -> i32 {
        self.all_day_height
    }

    pub fn all_day_rows(&self) -> usize {
        self.all_day_rows
    }

    pub fn touch_mode(&self) -> TouchMode {
        self.touch_mode
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Horizontal drag offset of the current paging gesture.
    pub fn view_start_x(&self) -> i32 {
        self.view_start_x
    }

    pub fn pending_load(&self) -> Option<LoadTicket> {
        self.pending_load
    }

    pub fn surface(&self) -> &OffscreenSurface {
        &self.surface
    }

    /// Screen y of the first timed grid row.
    pub fn first_cell(&self) -> i32 {
        if self.all_day_rows > 0 {
            self.banner_height + self.all_day_height + self.config.all_day_top_margin
        } else {
            self.banner_height
        }
    }

    /// Left edge of day column `daynum`.
    pub fn day_left(&self, daynum: i32) -> i32 {
        self.metrics.hours_width + daynum * (self.cell_width + self.config.day_gap)
    }

    pub fn set_text_metrics(&mut self, metrics: TextMetrics) {
        if metrics != self.metrics {
            self.metrics = metrics;
            self.remeasure();
        }
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.remeasure();
        self.refresh_selection();
    }

    /// Switch between the day and week layouts around `selection_day`.
    pub fn set_num_days(&mut self, num_days: u32, selection_day: i32) -> Option<ViewCommand> {
        self.num_days = num_days.clamp(1, WEEK_VIEW_DAYS);
        self.first_day = page_start(selection_day, self.num_days, self.first_day_of_week);
        self.selection.day = selection_day;
        self.selection.forget_events();
        self.repack();
        self.clear_cached_events();
        self.remeasure();
        self.refresh_selection();
        self.reload_events()
    }

    /// Replace the loaded events. Every slot reference into the previous
    /// list is dropped.
    pub fn set_events(&mut self, mut events: Vec<Event>) {
        events.sort_by(|a, b| a.display_cmp(b));
        self.events = events;
        self.repack();
        self.selection.forget_events();
        self.remeasure();
        self.refresh_selection();
        log::debug!(
            "Loaded {} events for days {}..={}",
            self.events.len(),
            self.first_day,
            self.last_day()
        );
    }

    /// Ask for the current page to be loaded, unless it already was.
    pub fn reload_events(&mut self) -> Option<ViewCommand> {
        self.selection.forget_events();
        if self.last_reload_day == Some(self.first_day) {
            return None;
        }
        self.last_reload_day = Some(self.first_day);
        Some(ViewCommand::ReloadEvents {
            first_day: self.first_day,
            num_days: self.num_days,
        })
    }

    /// Forget which page was loaded so the next reload goes through.
    pub fn clear_cached_events(&mut self) {
        self.last_reload_day = None;
    }

    /// Request the current page from `loader`. Only the newest ticket is
    /// ever applied.
    pub fn begin_load(&mut self, loader: &EventLoader) -> Result<LoadTicket, LoadError> {
        let ticket = loader.request(self.first_day, self.num_days)?;
        self.pending_load = Some(ticket);
        Ok(ticket)
    }

    pub fn cancel_load(&mut self, loader: &EventLoader) {
        loader.cancel_all();
        if self.pending_load.take().is_some() {
            self.clear_cached_events();
        }
    }

    /// Apply a loader outcome. Returns whether the events changed.
    pub fn apply_load(&mut self, outcome: LoadOutcome) -> bool {
        let ticket = outcome.ticket();
        if self.pending_load != Some(ticket) {
            log::debug!("Dropping outcome of superseded load {}", ticket);
            return false;
        }
        self.pending_load = None;

        match outcome {
            LoadOutcome::Loaded {
                first_day, events, ..
            } if first_day == self.first_day => {
                self.set_events(events);
                true
            }
            LoadOutcome::Loaded { first_day, .. } => {
                log::debug!("Dropping events loaded for old page {}", first_day);
                self.clear_cached_events();
                false
            }
            LoadOutcome::Cancelled { .. } => {
                self.clear_cached_events();
                false
            }
            LoadOutcome::Failed { error, .. } => {
                log::warn!("Could not load events: {}", error);
                self.clear_cached_events();
                false
            }
        }
    }

    /// Shortest duration, in minutes, the packer treats an event as having.
    /// A floored rectangle of `min_event_height` pixels spans this much time
    /// at the current hour height, so packed columns never draw overlapping.
    pub fn min_duration_minutes(&self) -> i32 {
        let cell_height = self.viewport.cell_height();
        if cell_height <= 0 {
            return self.config.overlap_margin_minutes;
        }
        let floored = (self.config.min_event_height * MINUTES_PER_HOUR + cell_height - 1) / cell_height;
        floored.max(self.config.overlap_margin_minutes)
    }

    fn repack(&mut self) {
        let min_duration = self.min_duration_minutes();
        self.layouts = pack_columns(&self.events, self.first_day, self.last_day(), min_duration);
        self.packed_min_duration = min_duration;
        log::debug!(
            "Packed {} events with a {} minute floor",
            self.events.len(),
            min_duration
        );
    }

    /// Recompute everything that depends on the view size or the events.
    pub fn remeasure(&mut self) {
        let num_days = self.num_days as usize;
        let first = self.first_day;
        let last = self.last_day();
        self.has_all_day = vec![false; num_days];
        self.earliest_start_hour = vec![25; num_days];

        let mut rows = 0;
        for (event, layout) in self.events.iter().zip(&self.layouts) {
            if event.start_day > last || event.end_day < first {
                continue;
            }
            if event.all_day {
                rows = rows.max(layout.column + 1);
                for day in event.start_day.max(first)..=event.end_day.min(last) {
                    self.has_all_day[(day - first) as usize] = true;
                }
            } else {
                let start = event.start_day - first;
                if start >= 0 {
                    let slot = &mut self.earliest_start_hour[start as usize];
                    *slot = (*slot).min(event.start_time / MINUTES_PER_HOUR);
                }
                // Multi-day events also count on the day they end.
                let end = event.end_day - first;
                if (0..num_days as i32).contains(&end) {
                    let slot = &mut self.earliest_start_hour[end as usize];
                    *slot = (*slot).min(event.end_time / MINUTES_PER_HOUR);
                }
            }
        }

        self.all_day_rows = rows;
        if rows == 0 {
            self.selection.all_day = false;
        }
        self.all_day_height = self.config.all_day_lane_height(rows);
        self.banner_height = if self.num_days > 1 {
            self.metrics.banner_text_height + self.config.banner_margin
        } else {
            0
        };

        let n = self.num_days as i32;
        self.cell_width = ((self.width - self.metrics.hours_width - n * self.config.day_gap) / n).max(1);

        self.viewport
            .remeasure((self.height - self.first_cell()).max(0), self.selection.hour);
        self.geometry.set_hour_height(self.viewport.cell_height());
        if self.min_duration_minutes() != self.packed_min_duration {
            // Only timed columns depend on the duration, so the all-day
            // rows measured above stay valid.
            self.repack();
        }

        if self.surface.ensure(self.width, self.viewport.content_height()) {
            log::debug!(
                "Grid surface grown to {}x{}",
                self.surface.width,
                self.surface.height
            );
        }
        self.selection.invalidate_working_set();
    }

    /// Whether moving up from `hour` on the selection day should enter the
    /// all-day lane.
    fn day_context(&self) -> DayContext {
        let daynum = (self.selection.day - self.first_day).clamp(0, self.num_days as i32 - 1);
        DayContext {
            has_all_day_lane: self.all_day_rows > 0,
            earliest_start_hour: self.earliest_start_hour.get(daynum as usize).copied().unwrap_or(25),
        }
    }

    /// Cell the selection is in, in content coordinates, including the gaps
    /// on its bottom and right.
    pub fn current_selection_box(&self) -> Rect {
        let row = self.viewport.row_height();
        let top = self.selection.hour * row;
        let left = self.day_left(self.selection.day - self.first_day);
        Rect::new(
            left,
            top,
            left + self.cell_width + self.config.day_gap,
            top + row,
        )
    }

    /// Cell events must touch to join the timed working set.
    fn selection_area(&self, day: i32, hour: i32) -> Rect {
        let top = self.config.hour_gap + hour * self.viewport.row_height();
        let left = self.day_left(day - self.first_day);
        Rect::new(left, top, left + self.cell_width, top + self.viewport.cell_height())
    }

    /// Rectangle of a timed event in the column for `day`.
    fn timed_rect(&self, slot: usize, day: i32) -> Option<Rect> {
        let daynum = day - self.first_day;
        if daynum < 0 || daynum >= self.num_days as i32 {
            return None;
        }
        self.geometry.compute_event_rect(
            day,
            self.day_left(daynum),
            self.config.hour_gap,
            self.cell_width,
            &self.events[slot],
            &self.layouts[slot],
        )
    }

    /// Screen rectangle of an all-day bar, clipped to the visible days.
    fn all_day_rect(&self, slot: usize) -> Option<Rect> {
        let event = &self.events[slot];
        if !event.all_day || self.all_day_rows == 0 {
            return None;
        }
        let start = event.start_day.max(self.first_day);
        let end = event.end_day.min(self.last_day());
        if start > end {
            return None;
        }

        let row_height = (self.all_day_height as f32 / self.all_day_rows as f32)
            .min(self.config.max_all_day_event_height as f32);
        let y = (self.banner_height + self.config.all_day_top_margin) as f32;
        let pitch = self.cell_width + self.config.day_gap;
        let left = self.metrics.hours_width + (start - self.first_day) * pitch + 2;
        let right = self.metrics.hours_width + (end - self.first_day) * pitch + self.cell_width - 1;
        let top = y + row_height * self.layouts[slot].column as f32;
        let bottom = top + row_height * 0.9;
        Some(Rect::new(left, top as i32, right, bottom as i32))
    }

    /// Slots of the events touching the selected cell, in list order.
    fn working_set(&self) -> Vec<usize> {
        let day = self.selection.day;
        if self.selection.all_day {
            return (0..self.events.len())
                .filter(|&slot| {
                    let event = &self.events[slot];
                    event.all_day
                        && event.start_day.max(self.first_day) <= day
                        && event.end_day.min(self.last_day()) >= day
                })
                .collect();
        }

        let area = self.selection_area(day, self.selection.hour);
        (0..self.events.len())
            .filter(|&slot| {
                self.timed_rect(slot, day)
                    .is_some_and(|rect| EventGeometry::event_intersects_selection(&rect, &area))
            })
            .collect()
    }

    fn candidates(&self, slots: &[usize]) -> Vec<Candidate> {
        let day = self.selection.day;
        slots
            .iter()
            .filter_map(|&slot| {
                let event = &self.events[slot];
                let rect = if event.all_day {
                    self.all_day_rect(slot)
                } else {
                    self.timed_rect(slot, day)
                }?;
                let start_time = if event.start_day < day { 0 } else { event.start_time };
                let end_time = if event.end_day > day {
                    MINUTES_PER_DAY
                } else {
                    event.end_time
                };
                Some(Candidate {
                    slot,
                    rect,
                    start_time,
                    end_time,
                    column: self.layouts[slot].column,
                })
            })
            .collect()
    }

    /// Link the working set and, unless an event is already selected, pick
    /// the event to select.
    fn resolve_neighbors(&mut self, keep_selected: bool) {
        let candidates = self.candidates(&self.selection.selected_events);
        let resolution = if self.selection.all_day {
            neighbors::resolve_all_day(&candidates, self.selection.previous.as_ref())
        } else {
            neighbors::resolve_timed(
                &candidates,
                self.selection.previous.as_ref(),
                self.selection.prev_box,
                self.current_selection_box(),
            )
        };
        if !keep_selected {
            self.selection.selected_event = resolution.start;
        }
        self.selection.links = resolution.links;
    }

    /// Layout pass run after every state change: refresh the event
    /// rectangles, rebuild the working set when it is stale and resolve the
    /// selection inside it.
    pub fn refresh_selection(&mut self) {
        let day = self.selection.day;
        for slot in 0..self.events.len() {
            let rect = if self.events[slot].all_day {
                self.all_day_rect(slot)
            } else {
                self.timed_rect(slot, day)
            };
            self.layouts[slot].rect = rect;
        }

        if self.selection.compute_selected_events {
            self.selection.selected_events = self.working_set();
            self.selection.compute_selected_events = false;
        }

        if self.selection.mode == SelectionMode::Hidden
            || self.selection.selected_events.is_empty()
            || self.selection.selected_event.is_some()
        {
            return;
        }
        self.resolve_neighbors(false);
        log::debug!(
            "Selection entered day {} hour {}: {:?} of {} events",
            day,
            self.selection.hour,
            self.selection.selected_event,
            self.selection.selected_events.len()
        );
    }

    /// Snapshot of the selected event for arrival-side decisions after the
    /// selection leaves its cell.
    fn previous_selection(&self) -> Option<PreviousSelection> {
        let slot = self.selection.selected_event?;
        let rect = self.layouts.get(slot)?.rect?;
        Some(PreviousSelection {
            slot,
            rect,
            all_day: self.events[slot].all_day,
            column: self.layouts[slot].column,
        })
    }

    /// Selection cell to remember when moving away from it. Leaving the
    /// all-day lane remembers a flat box at the top of the visible grid so
    /// that the timed grid is entered from above.
    fn history_box(&self) -> Rect {
        let current = self.current_selection_box();
        if self.selection.all_day {
            let top = self.viewport.view_start_y();
            Rect::new(current.left, top, current.right, top)
        } else {
            current
        }
    }

    /// Move the selected hour, scrolling one row at a time near the edges.
    fn adjust_hour_selection(&mut self, hour: i32) {
        let context = self.day_context();
        let adjusted = self.viewport.adjust_hour_selection(hour, context);
        self.selection.hour = adjusted.hour;
        if adjusted.enter_all_day {
            self.selection.all_day = true;
            self.selection.previous = None;
        }
    }

    /// End a scroll or fling: the selected hour is pulled back into view and
    /// the selection shown again.
    fn settle_scroll(&mut self) {
        self.scrolling = false;
        self.reset_selected_hour();
        self.selection.mode = SelectionMode::Selected;
    }

    /// Pull the selected hour back into view after scrolling.
    fn reset_selected_hour(&mut self) {
        if let Some(hour) = self.viewport.reset_selected_hour(self.selection.hour) {
            self.selection.hour = hour;
            self.selection.selected_event = None;
            self.selection.invalidate_working_set();
        }
    }

    /// Epoch millis of the selected day and hour (midnight for the all-day
    /// lane) in the view's time zone.
    pub fn selected_time_millis(&self) -> i64 {
        let hour = if self.selection.all_day {
            0
        } else {
            self.selection.hour
        };
        day_hour_to_millis(&self.tz, self.selection.day, hour).unwrap_or_else(|| {
            utc_day_start_millis(self.selection.day) + hour as i64 * MILLIS_PER_HOUR
        })
    }

    fn open_event_command(&self, slot: usize) -> ViewCommand {
        let event = &self.events[slot];
        ViewCommand::OpenEvent {
            id: event.id,
            start_millis: event.start_millis,
            end_millis: event.end_millis,
        }
    }

    /// Command that creates an hour-long event in the selected slot.
    pub fn new_event_command(&self) -> ViewCommand {
        let start_millis = self.selected_time_millis();
        ViewCommand::CreateEvent {
            start_millis,
            end_millis: start_millis + MILLIS_PER_HOUR,
            all_day: self.selection.all_day,
        }
    }

    /// Commit the selection: open or create an event, or drill into a day.
    fn switch_views(&mut self, trackball: bool) -> InteractionResult {
        let command = if self.num_days > 1 && !trackball {
            match self.selection.selected_events.as_slice() {
                [only] => self.open_event_command(*only),
                _ => ViewCommand::OpenDay {
                    millis: self.selected_time_millis(),
                },
            }
        } else {
            match self.selection.selected_event {
                Some(slot) => self.open_event_command(slot),
                None => self.new_event_command(),
            }
        };
        InteractionResult::handled().with_command(command)
    }

    /// Move the page by `num_days` with the selection landing on
    /// `selection_day`.
    fn shift_page(&mut self, forward: bool, selection_day: i32) -> InteractionResult {
        let step = self.num_days as i32;
        self.first_day += if forward { step } else { -step };
        self.selection.day = selection_day.clamp(self.first_day, self.last_day());
        self.selection.forget_events();
        self.free_spin = None;
        self.view_start_x = 0;
        self.touch_mode = TouchMode::Initial;
        self.repack();
        self.remeasure();
        log::debug!(
            "Switched {} to days {}..={}",
            if forward { "forward" } else { "back" },
            self.first_day,
            self.last_day()
        );

        let mut result = InteractionResult::handled().with_command(ViewCommand::SwitchPage {
            forward,
            selection_day: self.selection.day,
        });
        if let Some(reload) = self.reload_events() {
            result.push(reload);
        }
        result
    }

    /// When the running fling wants its next tick.
    pub fn next_tick_at(&self) -> Option<Instant> {
        self.free_spin.as_ref().and_then(FreeSpin::next_tick_at)
    }

    /// Advance the fling animation. Returns whether the grid moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(spin) = self.free_spin.as_mut() else {
            return false;
        };
        if !spin.is_due(now) {
            return false;
        }
        if !self.viewport.apply_free_spin(spin, now) {
            self.free_spin = None;
            self.settle_scroll();
        }
        self.refresh_selection();
        true
    }
}

/// First day of the page containing `day`.
fn page_start(day: i32, num_days: u32, first_day_of_week: u8) -> i32 {
    if num_days == WEEK_VIEW_DAYS {
        week_start(day, first_day_of_week)
    } else {
        day
    }
}

#[cfg(test)]
mod tests;
