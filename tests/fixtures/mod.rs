// Test fixtures - reusable test data
// Provides consistent events and views across the integration tests

#![allow(dead_code)]

use calendar_grid::models::event::Event;
use calendar_grid::models::settings::Settings;
use calendar_grid::services::calendar_view::CalendarView;
use chrono::Utc;

/// Julian days of the week of Sunday 3 March 2024
pub mod days {
    pub const SUNDAY: i32 = 2_460_373;
    pub const WEDNESDAY: i32 = SUNDAY + 3;
    pub const SATURDAY: i32 = SUNDAY + 6;
}

/// View size giving 100px day columns and 60px hour rows in the week view
pub const WEEK_WIDTH: i32 = 741;
pub const WEEK_HEIGHT: i32 = 639;

/// Timed event on one day, times in minutes after midnight
pub fn timed(id: i64, day: i32, start: i32, end: i32) -> Event {
    Event::builder()
        .id(id)
        .title(format!("Event {}", id))
        .span(day, start, day, end)
        .build()
        .unwrap()
}

/// Week view in UTC selecting Wednesday at `hour`
pub fn week_view(hour: i32) -> CalendarView<Utc> {
    view_with(&Settings::default(), days::WEDNESDAY, hour)
}

pub fn view_with(settings: &Settings, day: i32, hour: i32) -> CalendarView<Utc> {
    let mut view = CalendarView::new(settings, Utc, day, hour);
    view.set_size(WEEK_WIDTH, WEEK_HEIGHT);
    view
}

/// Events file content with one timed, one all-day and one broken record
pub const EVENTS_JSON: &str = r#"[
    {
        "id": 1,
        "title": "Standup",
        "location": "Room 2",
        "start": "2024-03-06T09:00:00",
        "end": "2024-03-06T09:30:00"
    },
    {
        "id": 2,
        "title": "Conference",
        "start": "2024-03-07T00:00:00",
        "end": "2024-03-09T00:00:00",
        "all_day": true
    },
    {
        "id": 3,
        "title": "Backwards",
        "start": "2024-03-06T12:00:00",
        "end": "2024-03-06T11:00:00"
    }
]"#;
