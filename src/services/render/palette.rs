//! Colour palette for the calendar grid.

use serde::{Deserialize, Serialize};

use super::Rgba;

/// All colours the grid painter uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPalette {
    /// Whether this is a dark palette
    pub is_dark: bool,

    /// Grid background
    pub grid_background: Rgba,

    /// Background of the hour label column and all-day lane
    pub gutter_background: Rgba,

    /// Hour and day separator lines
    pub grid_line: Rgba,

    /// Hour labels and day headers
    pub text_primary: Rgba,

    /// Weekend day headers
    pub text_weekend: Rgba,

    /// Today's day header
    pub today_header: Rgba,

    /// Highlight behind the selected hour cell
    pub selection_background: Rgba,

    /// Fill used for the selected event
    pub selected_event: Rgba,

    /// Fallback colour for events without their own
    pub default_event: Rgba,

    /// Event title text
    pub event_text: Rgba,

    /// Current time indicator
    pub current_time_line: Rgba,
}

impl GridPalette {
    pub fn light() -> Self {
        Self {
            is_dark: false,
            grid_background: Rgba::rgb(255, 255, 255),
            gutter_background: Rgba::rgb(245, 245, 245),
            grid_line: Rgba::rgb(220, 220, 220),
            text_primary: Rgba::rgb(40, 40, 40),
            text_weekend: Rgba::rgb(100, 100, 100),
            today_header: Rgba::rgb(100, 150, 255),
            selection_background: Rgba::rgb(230, 240, 255),
            selected_event: Rgba::rgb(255, 180, 60),
            default_event: Rgba::rgb(66, 133, 244),
            event_text: Rgba::rgb(255, 255, 255),
            current_time_line: Rgba::rgb(220, 50, 50),
        }
    }

    pub fn dark() -> Self {
        Self {
            is_dark: true,
            grid_background: Rgba::rgb(40, 40, 40),
            gutter_background: Rgba::rgb(30, 30, 30),
            grid_line: Rgba::rgb(60, 60, 60),
            text_primary: Rgba::rgb(240, 240, 240),
            text_weekend: Rgba::rgb(170, 170, 170),
            today_header: Rgba::rgb(100, 150, 255),
            selection_background: Rgba::rgb(50, 60, 80),
            selected_event: Rgba::rgb(230, 150, 40),
            default_event: Rgba::rgb(70, 110, 190),
            event_text: Rgba::rgb(240, 240, 240),
            current_time_line: Rgba::rgb(255, 90, 90),
        }
    }
}

impl Default for GridPalette {
    fn default() -> Self {
        Self::light()
    }
}
