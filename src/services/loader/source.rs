use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::event::{AttendeeStatus, Event, EventId};

/// Anything that can produce the events of a day range.
///
/// Implementations run on the loader's worker thread.
pub trait EventSource: Send + 'static {
    fn load(&mut self, start_day: i32, num_days: u32) -> Result<Vec<Event>>;
}

/// In-memory source, used by tests and the demo application.
#[derive(Debug, Clone, Default)]
pub struct StaticEventSource {
    events: Vec<Event>,
}

impl StaticEventSource {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }
}

impl EventSource for StaticEventSource {
    fn load(&mut self, _start_day: i32, _num_days: u32) -> Result<Vec<Event>> {
        Ok(self.events.clone())
    }
}

/// One event as stored in a JSON events file, in local wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    pub start: NaiveDateTime,
    /// Exclusive end. All-day events end at midnight after their last day.
    pub end: NaiveDateTime,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub attendee_status: AttendeeStatus,
    #[serde(default)]
    pub repeating: bool,
    #[serde(default)]
    pub guests_can_modify: bool,
}

impl EventRecord {
    pub fn to_event<Tz: TimeZone>(&self, tz: &Tz) -> Result<Event> {
        let mut builder = Event::builder()
            .id(self.id)
            .title(self.title.clone())
            .attendee_status(self.attendee_status)
            .repeating(self.repeating)
            .guests_can_modify(self.guests_can_modify);
        if let Some(location) = &self.location {
            builder = builder.location(location.clone());
        }
        if let Some(color) = &self.color {
            builder = builder.color(color.clone());
        }

        builder = if self.all_day {
            let first = self.start.date();
            let mut last = self.end.date();
            if last > first && self.end.time() == NaiveTime::MIN {
                last -= Duration::days(1);
            }
            builder.all_day_span(first, last.max(first))
        } else {
            let start = tz
                .from_local_datetime(&self.start)
                .earliest()
                .ok_or_else(|| anyhow!("event {} starts at a nonexistent local time", self.id))?;
            let end = tz
                .from_local_datetime(&self.end)
                .earliest()
                .ok_or_else(|| anyhow!("event {} ends at a nonexistent local time", self.id))?;
            builder.start(&start).end(&end)
        };

        let event = builder
            .build()
            .map_err(|e| anyhow!("invalid event {}: {}", self.id, e))?;
        Ok(event)
    }
}

/// Reads events from a JSON array of [`EventRecord`]s on every load.
pub struct JsonEventSource<Tz: TimeZone> {
    path: PathBuf,
    tz: Tz,
}

impl<Tz: TimeZone> JsonEventSource<Tz> {
    pub fn new(path: impl Into<PathBuf>, tz: Tz) -> Self {
        Self {
            path: path.into(),
            tz,
        }
    }
}

impl<Tz> EventSource for JsonEventSource<Tz>
where
    Tz: TimeZone + Send + 'static,
{
    fn load(&mut self, _start_day: i32, _num_days: u32) -> Result<Vec<Event>> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read events from {}", self.path.display()))?;
        let records: Vec<EventRecord> = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse events in {}", self.path.display()))?;

        let mut events = Vec::with_capacity(records.len());
        for record in &records {
            match record.to_event(&self.tz) {
                Ok(event) => events.push(event),
                Err(err) => log::warn!("Skipping event: {:#}", err),
            }
        }
        log::info!(
            "Read {} of {} events from {}",
            events.len(),
            records.len(),
            self.path.display()
        );
        Ok(events)
    }
}
