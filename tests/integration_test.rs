// Integration tests for settings persistence, event loading and the grid view
mod fixtures;

use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use calendar_grid::models::settings::Settings;
use calendar_grid::services::calendar_view::CalendarView;
use calendar_grid::services::loader::{EventLoader, JsonEventSource};
use calendar_grid::services::render::{parse_color, Rgba};
use calendar_grid::services::selection::{InputEvent, Key, Point, ViewCommand};
use calendar_grid::services::settings::SettingsService;
use calendar_grid::utils::date::{day_hour_to_millis, format_hour_label, julian_day};
use chrono::{NaiveDate, TimeZone, Utc};
use fixtures::days::{SATURDAY, SUNDAY, WEDNESDAY};
use fixtures::{timed, view_with, week_view, EVENTS_JSON};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use test_case::test_case;

fn wait_for_events(view: &mut CalendarView<Utc>, loader: &EventLoader) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while view.pending_load().is_some() {
        if let Some(outcome) = loader.poll() {
            view.apply_load(outcome);
            continue;
        }
        assert!(Instant::now() < deadline, "events never arrived");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_settings_persistence() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let service = SettingsService::new(dir.path().join("config").join("settings.toml"));

    // First launch: nothing saved yet
    let mut settings = service.load().expect("Failed to load defaults");
    assert_eq!(settings, Settings::default());

    settings.num_days = 1;
    settings.visible_hours = 12;
    settings.use_24_hour_time = true;
    service.save(&settings).expect("Failed to save settings");

    let loaded = service.load().expect("Failed to reload settings");
    assert_eq!(loaded, settings);

    let view = view_with(&loaded, WEDNESDAY, 9);
    assert_eq!(view.num_days(), 1);
    assert_eq!(view.first_day(), WEDNESDAY);
    assert_eq!(view.viewport().num_hours(), 12);
}

#[test]
fn test_events_file_loads_into_view() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("events.json");
    fs::write(&path, EVENTS_JSON).expect("Failed to write events");

    let loader = EventLoader::spawn(JsonEventSource::new(&path, Utc));
    let mut view = week_view(9);

    let reload = view.reload_events();
    assert_eq!(
        reload,
        Some(ViewCommand::ReloadEvents {
            first_day: SUNDAY,
            num_days: 7,
        })
    );
    view.begin_load(&loader).expect("Loader stopped");
    wait_for_events(&mut view, &loader);

    let mut ids: Vec<_> = view.events().iter().map(|e| e.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(view.all_day_rows(), 1);

    let conference = view.events().iter().find(|e| e.id == 2).unwrap();
    assert_eq!(conference.start_day, WEDNESDAY + 1);
    assert_eq!(conference.end_day, WEDNESDAY + 2);

    // Tap inside the standup on Wednesday
    let row = view.viewport().row_height();
    let x = view.day_left(WEDNESDAY - view.first_day()) + view.cell_width() / 2;
    let y = view.first_cell() + 9 * row + 10 - view.viewport().view_start_y();
    let result = view.handle_input(
        InputEvent::SingleTapUp(Point::new(x as f32, y as f32)),
        Instant::now(),
    );
    assert!(matches!(
        result.commands.as_slice(),
        [ViewCommand::OpenEvent { id: 1, .. }]
    ));
}

#[test]
fn test_overlapping_events_share_columns() {
    let mut view = week_view(9);
    view.set_events(vec![
        timed(3, WEDNESDAY, 600, 660),
        timed(1, WEDNESDAY, 540, 600),
        timed(2, WEDNESDAY, 570, 630),
    ]);

    let placed: Vec<_> = view
        .events()
        .iter()
        .zip(view.layouts())
        .map(|(event, layout)| (event.id, layout.column, layout.max_columns))
        .collect();
    assert_eq!(placed, vec![(1, 0, 2), (2, 1, 2), (3, 0, 2)]);
}

#[test]
fn test_keyboard_walks_back_a_week() {
    let mut view = view_with(&Settings::default(), SUNDAY, 9);
    let now = Instant::now();
    view.handle_input(InputEvent::KeyDown(Key::Left), now);

    let result = view.handle_input(InputEvent::KeyDown(Key::Left), now);
    assert_eq!(
        result.commands,
        vec![
            ViewCommand::SwitchPage {
                forward: false,
                selection_day: SUNDAY - 1,
            },
            ViewCommand::ReloadEvents {
                first_day: SUNDAY - 7,
                num_days: 7,
            },
        ]
    );
    assert_eq!(view.last_day(), SATURDAY - 7);
}

#[test]
fn test_enter_in_day_view_opens_event() {
    let settings = Settings {
        num_days: 1,
        ..Settings::default()
    };
    let mut view = view_with(&settings, WEDNESDAY, 9);
    view.set_events(vec![timed(5, WEDNESDAY, 540, 600)]);
    let now = Instant::now();
    view.handle_input(InputEvent::KeyDown(Key::Enter), now);

    let result = view.handle_input(InputEvent::KeyDown(Key::Enter), now);
    assert!(matches!(
        result.commands.as_slice(),
        [ViewCommand::OpenEvent { id: 5, .. }]
    ));
}

#[test_case(0, false, "12am" ; "midnight")]
#[test_case(12, false, "12pm" ; "noon")]
#[test_case(13, false, "1pm" ; "afternoon")]
#[test_case(13, true, "13:00" ; "twenty four hour")]
#[test_case(7, true, "07:00" ; "padded morning")]
fn test_hour_labels(hour: i32, use_24_hour: bool, expected: &str) {
    assert_eq!(format_hour_label(hour, use_24_hour), expected);
}

#[test_case("#FF0000", Some(Rgba::rgb(255, 0, 0)) ; "long form")]
#[test_case("33B679", Some(Rgba::rgb(0x33, 0xB6, 0x79)) ; "without hash")]
#[test_case("#0F0", Some(Rgba::rgb(0, 255, 0)) ; "short form")]
#[test_case("#12345", None ; "wrong length")]
#[test_case("#GG0000", None ; "not hex")]
fn test_event_colors(input: &str, expected: Option<Rgba>) {
    assert_eq!(parse_color(input), expected);
}

#[test_case(1, 6 ; "before the gap")]
#[test_case(2, 7 ; "inside the gap")]
#[test_case(3, 7 ; "after the gap")]
fn test_hour_millis_across_spring_forward(hour: i32, utc_hour: u32) {
    let day = julian_day(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    let expected = Utc
        .with_ymd_and_hms(2024, 3, 10, utc_hour, 0, 0)
        .unwrap()
        .timestamp_millis();
    assert_eq!(
        day_hour_to_millis(&chrono_tz::America::New_York, day, hour),
        Some(expected)
    );
}
