//! Selection state for the calendar grid.
//!
//! Tracks the selected cell (day, hour or all-day lane), the event selected
//! within it, and how the selection is currently shown.

pub mod commands;
pub mod input;

use crate::services::layout::{NeighborMap, PreviousSelection, Rect};

pub use commands::{InteractionResult, ViewCommand};
pub use input::{InputEvent, Key, Point};

/// How the selection is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Not drawn, e.g. while scrolling.
    #[default]
    Hidden,
    /// Center key is down on a newly revealed selection.
    Pressed,
    Selected,
    /// Held long enough to open the context menu.
    LongPress,
}

/// Phase of the current touch gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchMode {
    #[default]
    Initial,
    /// Finger down, direction not decided yet.
    Down,
    VerticalScroll,
    HorizontalScroll,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    /// Julian day of the selected cell.
    pub day: i32,
    pub hour: i32,
    pub all_day: bool,
    /// Slot of the selected event in the loaded list.
    pub selected_event: Option<usize>,
    pub mode: SelectionMode,
    /// Slots of the events touching the selected cell.
    pub selected_events: Vec<usize>,
    /// The working set must be rebuilt before it is used again.
    pub compute_selected_events: bool,
    pub previous: Option<PreviousSelection>,
    /// Selection cell as it was before the latest move.
    pub prev_box: Rect,
    pub links: NeighborMap,
}

impl SelectionState {
    pub fn new(day: i32, hour: i32) -> Self {
        Self {
            day,
            hour: hour.clamp(0, 23),
            all_day: false,
            selected_event: None,
            mode: SelectionMode::Hidden,
            selected_events: Vec::new(),
            compute_selected_events: true,
            previous: None,
            prev_box: Rect::default(),
            links: NeighborMap::new(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.mode != SelectionMode::Hidden
    }

    /// Forget every slot reference, e.g. when the event list is replaced.
    pub fn forget_events(&mut self) {
        self.selected_event = None;
        self.previous = None;
        self.selected_events.clear();
        self.links.clear();
        self.compute_selected_events = true;
    }

    /// Rebuild the working set on the next layout pass.
    pub fn invalidate_working_set(&mut self) {
        self.selected_events.clear();
        self.compute_selected_events = true;
    }
}
