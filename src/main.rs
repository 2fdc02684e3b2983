// Calendar grid demo
// Main entry point

use calendar_grid::models::event::{AttendeeStatus, Event};
use calendar_grid::models::settings::Settings;
use calendar_grid::services::loader::{JsonEventSource, StaticEventSource};
use calendar_grid::services::settings::SettingsService;
use calendar_grid::ui_egui::CalendarGridApp;
use calendar_grid::utils::date::{date_from_julian_day, julian_day_of};
use chrono::Local;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::init();

    log::info!("Starting calendar grid");

    let settings_service = SettingsService::new(SettingsService::default_path());
    let settings = match settings_service.load() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load settings, using defaults: {:#}", e);
            Settings::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Calendar Grid")
            .with_inner_size([1000.0, 720.0])
            .with_min_inner_size([360.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Calendar Grid",
        options,
        Box::new(move |cc| {
            let app = match settings.events_file.clone() {
                Some(path) => {
                    log::info!("Reading events from {}", path);
                    CalendarGridApp::new(cc, settings, JsonEventSource::new(path, Local))
                }
                None => CalendarGridApp::new(cc, settings, StaticEventSource::new(sample_events())),
            };
            Ok(Box::new(app))
        }),
    )
}

/// A few events around today so the grid has something to show.
fn sample_events() -> Vec<Event> {
    let today = julian_day_of(&Local::now());
    let spans = [
        (1, "Standup", 0, 9 * 60, 9 * 60 + 15),
        (2, "Design review", 0, 10 * 60, 11 * 60 + 30),
        (3, "Pairing", 0, 10 * 60 + 30, 12 * 60),
        (4, "Lunch", 1, 12 * 60, 13 * 60),
        (5, "Planning", -1, 14 * 60, 15 * 60),
        (6, "Late call", 2, 22 * 60, 24 * 60 + 60),
    ];

    let mut events: Vec<Event> = spans
        .iter()
        .filter_map(|&(id, title, offset, start, end)| {
            let day = today + offset;
            Event::builder()
                .id(id)
                .title(title)
                .span(day, start, day + end / 1440, end % 1440)
                .build()
                .map_err(|e| log::warn!("Skipping sample event {}: {}", id, e))
                .ok()
        })
        .collect();

    if let Ok(declined) = Event::builder()
        .id(7)
        .title("Optional sync")
        .location("Room 4")
        .color("#E67C73")
        .span(today, 16 * 60, today, 17 * 60)
        .attendee_status(AttendeeStatus::Declined)
        .build()
    {
        events.push(declined);
    }

    if let Some(date) = date_from_julian_day(today + 1) {
        if let Ok(holiday) = Event::builder()
            .id(8)
            .title("Team offsite")
            .color("#33B679")
            .all_day_span(date, date)
            .build()
        {
            events.push(holiday);
        }
    }
    events
}
