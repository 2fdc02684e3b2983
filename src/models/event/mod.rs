// Event module
// Immutable calendar event instance as consumed by the grid layout engine.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::utils::date::{
    julian_day, julian_day_of, minutes_since_midnight, utc_day_start_millis, MINUTES_PER_DAY,
    MILLIS_PER_MINUTE,
};

/// Opaque event identifier. Instances of a repeating event share one id.
pub type EventId = i64;

pub const NO_TITLE_LABEL: &str = "(No title)";

/// The viewing user's response to an event invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendeeStatus {
    #[default]
    None,
    Accepted,
    Declined,
    Invited,
    Tentative,
}

/// One event instance on the calendar.
///
/// Day placement uses the Julian day fields, vertical placement the
/// minute-of-day fields, and commands carry the UTC millisecond fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub color: Option<String>,
    pub start_day: i32,
    pub end_day: i32,
    pub start_time: i32,
    pub end_time: i32,
    pub start_millis: i64,
    pub end_millis: i64,
    #[serde(default)]
    pub self_attendee_status: AttendeeStatus,
    #[serde(default)]
    pub has_alarm: bool,
    #[serde(default)]
    pub is_repeating: bool,
    #[serde(default)]
    pub guests_can_modify: bool,
    #[serde(default)]
    pub organizer: Option<String>,
}

impl Event {
    /// Create a builder for constructing events with optional fields
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    /// Validate the event
    pub fn validate(&self) -> Result<(), String> {
        if (self.end_day, self.end_time) < (self.start_day, self.start_time) {
            return Err("Event end must not be before its start".to_string());
        }

        if self.end_millis < self.start_millis {
            return Err("Event end time must not be before start time".to_string());
        }

        if !(0..=MINUTES_PER_DAY).contains(&self.start_time)
            || !(0..=MINUTES_PER_DAY).contains(&self.end_time)
        {
            return Err("Event minutes must lie within one day".to_string());
        }

        // Validate color format if present (should be hex color)
        if let Some(ref color) = self.color {
            if !color.starts_with('#') || (color.len() != 7 && color.len() != 4) {
                return Err("Color must be in hex format (#RRGGBB or #RGB)".to_string());
            }
        }

        Ok(())
    }

    pub fn is_declined(&self) -> bool {
        self.self_attendee_status == AttendeeStatus::Declined
    }

    /// Whether the event occupies any of `[start_minute, end_minute]` on `julian_day`.
    ///
    /// An event ending exactly at `start_minute` does not intersect, unless it
    /// is a zero-length event on a single day.
    pub fn intersects(&self, julian_day: i32, start_minute: i32, end_minute: i32) -> bool {
        if self.end_day < julian_day || self.start_day > julian_day {
            return false;
        }

        if self.end_day == julian_day {
            if self.end_time < start_minute {
                return false;
            }
            let zero_length =
                self.start_time == self.end_time && self.start_day == self.end_day;
            if self.end_time == start_minute && !zero_length {
                return false;
            }
        }

        !(self.start_day == julian_day && self.start_time > end_minute)
    }

    /// Title followed by ", location" unless the title already ends with it.
    pub fn title_and_location(&self) -> String {
        let mut text = self.title.clone();
        if let Some(location) = self.location.as_deref() {
            let location = location.trim();
            if !location.is_empty() && !text.ends_with(location) {
                text.push_str(", ");
                text.push_str(location);
            }
        }
        text
    }

    /// Ordering used for the loaded event list.
    ///
    /// Earlier starts first, longer events first on equal starts, all-day
    /// before timed, then modifiable, then by descriptive text.
    pub fn display_cmp(&self, other: &Event) -> Ordering {
        self.start_day
            .cmp(&other.start_day)
            .then(self.start_time.cmp(&other.start_time))
            .then(other.end_day.cmp(&self.end_day))
            .then(other.end_time.cmp(&self.end_time))
            .then(other.all_day.cmp(&self.all_day))
            .then(other.guests_can_modify.cmp(&self.guests_can_modify))
            .then_with(|| self.title.cmp(&other.title))
            .then_with(|| self.location.cmp(&other.location))
            .then_with(|| self.organizer.cmp(&other.organizer))
    }

    /// Absolute start in minutes, used to sweep events across day boundaries.
    pub fn absolute_start_minute(&self) -> i64 {
        self.start_day as i64 * MINUTES_PER_DAY as i64 + self.start_time as i64
    }

    pub fn absolute_end_minute(&self) -> i64 {
        self.end_day as i64 * MINUTES_PER_DAY as i64 + self.end_time as i64
    }
}

/// One endpoint of an event in all three time representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Endpoint {
    day: i32,
    minute: i32,
    millis: i64,
}

impl Endpoint {
    fn from_datetime<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self {
            day: julian_day_of(instant),
            minute: minutes_since_midnight(instant.time()),
            millis: instant.timestamp_millis(),
        }
    }

    /// Endpoint given in day/minute form; millis are derived as if the
    /// wall clock were UTC.
    fn from_day_minute(day: i32, minute: i32) -> Self {
        Self {
            day,
            minute,
            millis: utc_day_start_millis(day) + minute as i64 * MILLIS_PER_MINUTE,
        }
    }
}

/// Builder for creating events with optional fields
pub struct EventBuilder {
    id: EventId,
    title: Option<String>,
    location: Option<String>,
    all_day: bool,
    color: Option<String>,
    start: Option<Endpoint>,
    end: Option<Endpoint>,
    self_attendee_status: AttendeeStatus,
    has_alarm: bool,
    is_repeating: bool,
    guests_can_modify: bool,
    organizer: Option<String>,
}

impl EventBuilder {
    /// Create a new event builder
    pub fn new() -> Self {
        Self {
            id: 0,
            title: None,
            location: None,
            all_day: false,
            color: None,
            start: None,
            end: None,
            self_attendee_status: AttendeeStatus::None,
            has_alarm: false,
            is_repeating: false,
            guests_can_modify: false,
            organizer: None,
        }
    }

    pub fn id(mut self, id: EventId) -> Self {
        self.id = id;
        self
    }

    /// Set the event title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the event location
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the event color (hex format)
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the start from a zoned timestamp
    pub fn start<Tz: TimeZone>(mut self, start: &DateTime<Tz>) -> Self {
        self.start = Some(Endpoint::from_datetime(start));
        self
    }

    /// Set the end from a zoned timestamp
    pub fn end<Tz: TimeZone>(mut self, end: &DateTime<Tz>) -> Self {
        self.end = Some(Endpoint::from_datetime(end));
        self
    }

    /// Set start and end directly as Julian day plus minute of day.
    pub fn span(mut self, start_day: i32, start_time: i32, end_day: i32, end_time: i32) -> Self {
        self.start = Some(Endpoint::from_day_minute(start_day, start_time));
        self.end = Some(Endpoint::from_day_minute(end_day, end_time));
        self
    }

    /// Mark as an all-day event covering `first..=last`.
    pub fn all_day_span(mut self, first: NaiveDate, last: NaiveDate) -> Self {
        self.all_day = true;
        self.start = Some(Endpoint::from_day_minute(julian_day(first), 0));
        self.end = Some(Endpoint::from_day_minute(julian_day(last), MINUTES_PER_DAY));
        self
    }

    /// Set as all-day event
    pub fn all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    pub fn attendee_status(mut self, status: AttendeeStatus) -> Self {
        self.self_attendee_status = status;
        self
    }

    pub fn has_alarm(mut self, has_alarm: bool) -> Self {
        self.has_alarm = has_alarm;
        self
    }

    pub fn repeating(mut self, is_repeating: bool) -> Self {
        self.is_repeating = is_repeating;
        self
    }

    pub fn guests_can_modify(mut self, guests_can_modify: bool) -> Self {
        self.guests_can_modify = guests_can_modify;
        self
    }

    pub fn organizer(mut self, organizer: impl Into<String>) -> Self {
        self.organizer = Some(organizer.into());
        self
    }

    /// Build the event
    pub fn build(self) -> Result<Event, String> {
        let start = self.start.ok_or("Event start time is required")?;
        let end = self.end.ok_or("Event end time is required")?;
        let title = match self.title {
            Some(title) if !title.trim().is_empty() => title,
            _ => NO_TITLE_LABEL.to_string(),
        };

        let event = Event {
            id: self.id,
            title,
            location: self.location,
            all_day: self.all_day,
            color: self.color,
            start_day: start.day,
            end_day: end.day,
            start_time: start.minute,
            end_time: end.minute,
            start_millis: start.millis,
            end_millis: end.millis,
            self_attendee_status: self.self_attendee_status,
            has_alarm: self.has_alarm,
            is_repeating: self.is_repeating,
            guests_can_modify: self.guests_can_modify,
            organizer: self.organizer,
        };

        event.validate()?;
        Ok(event)
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}
