use std::thread;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;

use super::*;
use crate::models::event::AttendeeStatus;
use crate::services::loader::StaticEventSource;
use crate::services::render::{parse_color, GridPalette, RecordingSurface};
use crate::services::selection::{InputEvent, Key, Point};
use crate::services::text::MonospaceMeasure;
use crate::utils::date::julian_day;

/// Sunday 2024-03-03, the first day of the test week.
const SUN: i32 = 2_460_373;
const TUE: i32 = SUN + 2;
const WED: i32 = SUN + 3;
const SAT: i32 = SUN + 6;

fn week_view(hour: i32) -> CalendarView<Utc> {
    let mut view = CalendarView::new(&Settings::default(), Utc, WED, hour);
    // 34px hour labels, seven 100px columns, 28px banner, ten 60px rows.
    view.set_size(741, 639);
    view
}

fn timed(id: i64, day: i32, start: i32, end: i32) -> Event {
    Event::builder()
        .id(id)
        .title(format!("Event {}", id))
        .span(day, start, day, end)
        .build()
        .unwrap()
}

fn all_day(id: i64, day: i32) -> Event {
    let date = crate::utils::date::date_from_julian_day(day).unwrap();
    Event::builder()
        .id(id)
        .title("Holiday")
        .all_day_span(date, date)
        .build()
        .unwrap()
}

fn send(view: &mut CalendarView<Utc>, event: InputEvent) -> InteractionResult {
    view.handle_input(event, Instant::now())
}

fn press(view: &mut CalendarView<Utc>, key: Key) -> InteractionResult {
    send(view, InputEvent::KeyDown(key))
}

/// Screen position of a content-space point in the given day column.
fn screen_point(view: &CalendarView<Utc>, day: i32, content_y: i32) -> Point {
    let x = view.day_left(day - view.first_day()) + view.cell_width() / 2;
    let y = view.first_cell() + content_y - view.viewport().view_start_y();
    Point::new(x as f32, y as f32)
}

fn hour_millis(day: i32, hour: i32) -> i64 {
    day_hour_to_millis(&Utc, day, hour).unwrap()
}

#[test]
fn test_week_layout_geometry() {
    let view = week_view(9);
    assert_eq!(julian_day(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()), WED);
    assert_eq!(view.first_day(), SUN);
    assert_eq!(view.last_day(), SAT);
    assert_eq!(view.metrics().hours_width, 34);
    assert_eq!(view.cell_width(), 100);
    assert_eq!(view.first_cell(), 28);
    assert_eq!(view.viewport().cell_height(), 60);
    assert_eq!(view.viewport().first_hour(), 4);
    assert_eq!(view.viewport().view_start_y(), 244);
}

#[test]
fn test_day_view_has_no_banner() {
    let settings = Settings {
        num_days: 1,
        ..Settings::default()
    };
    let mut view = CalendarView::new(&settings, Utc, WED, 9);
    view.set_size(234, 611);
    assert_eq!(view.first_day(), WED);
    assert_eq!(view.first_cell(), 0);
    assert_eq!(view.cell_width(), 199);
}

#[test]
fn test_first_key_only_reveals_selection() {
    let mut view = week_view(9);
    let result = press(&mut view, Key::Right);
    assert!(result.handled);
    assert!(result.commands.is_empty());
    assert_eq!(view.selection().mode, SelectionMode::Selected);
    assert_eq!(view.selection().day, WED);
}

#[test]
fn test_enter_on_empty_slot_creates_hour_long_event() {
    let mut view = week_view(9);
    press(&mut view, Key::Enter);
    let result = press(&mut view, Key::Enter);

    let start = hour_millis(WED, 9);
    assert_eq!(
        result.commands,
        vec![ViewCommand::CreateEvent {
            start_millis: start,
            end_millis: start + 3_600_000,
            all_day: false,
        }]
    );
}

#[test]
fn test_enter_opens_selected_event() {
    let mut view = week_view(9);
    let event = timed(42, WED, 540, 600);
    let (start_millis, end_millis) = (event.start_millis, event.end_millis);
    view.set_events(vec![event]);

    press(&mut view, Key::Down);
    assert_eq!(view.selected_event().map(|e| e.id), Some(42));

    let result = press(&mut view, Key::Enter);
    assert_eq!(
        result.commands,
        vec![ViewCommand::OpenEvent {
            id: 42,
            start_millis,
            end_millis,
        }]
    );
}

#[test]
fn test_delete_key_requests_deletion() {
    let mut view = week_view(9);
    view.set_events(vec![timed(7, WED, 540, 600)]);
    press(&mut view, Key::Up);

    let result = press(&mut view, Key::Delete);
    assert!(matches!(
        result.commands.as_slice(),
        [ViewCommand::DeleteEvent { id: 7, .. }]
    ));
}

#[test]
fn test_delete_without_event_is_ignored() {
    let mut view = week_view(9);
    press(&mut view, Key::Up);
    let result = press(&mut view, Key::Delete);
    assert!(!result.handled);
}

#[test]
fn test_arrow_past_last_day_switches_page() {
    let mut view = CalendarView::new(&Settings::default(), Utc, SAT, 9);
    view.set_size(741, 639);
    press(&mut view, Key::Right);

    let result = press(&mut view, Key::Right);
    assert_eq!(
        result.commands,
        vec![
            ViewCommand::SwitchPage {
                forward: true,
                selection_day: SAT + 1,
            },
            ViewCommand::ReloadEvents {
                first_day: SAT + 1,
                num_days: 7,
            },
        ]
    );
    assert_eq!(view.first_day(), SAT + 1);
    assert_eq!(view.selection().day, SAT + 1);
}

#[test]
fn test_from_left_arrival_selects_vertically_closest() {
    let mut view = week_view(9);
    view.set_events(vec![
        timed(10, TUE, 585, 615),
        timed(1, WED, 540, 555),
        timed(2, WED, 560, 575),
        timed(3, WED, 580, 595),
    ]);
    view.selection.day = TUE;
    view.selection.invalidate_working_set();

    press(&mut view, Key::Right);
    assert_eq!(view.selected_event().map(|e| e.id), Some(10));

    press(&mut view, Key::Right);
    assert_eq!(view.selection().day, WED);
    assert_eq!(view.selection().selected_events.len(), 3);
    assert_eq!(view.selected_event().map(|e| e.id), Some(3));
}

#[test]
fn test_down_follows_neighbor_links() {
    let mut view = week_view(9);
    view.set_events(vec![
        timed(1, WED, 540, 555),
        timed(2, WED, 560, 575),
        timed(3, WED, 580, 595),
    ]);
    press(&mut view, Key::Up);
    assert_eq!(view.selected_event().map(|e| e.id), Some(1));

    press(&mut view, Key::Down);
    assert_eq!(view.selected_event().map(|e| e.id), Some(2));
    press(&mut view, Key::Down);
    assert_eq!(view.selected_event().map(|e| e.id), Some(3));
    assert_eq!(view.selection().hour, 9);

    // No link below the last event: the selection moves to the next hour.
    press(&mut view, Key::Down);
    assert_eq!(view.selection().hour, 10);
    assert_eq!(view.selected_event(), None);
}

#[test]
fn test_up_enters_all_day_lane_and_down_leaves_it() {
    let mut view = week_view(9);
    view.set_events(vec![all_day(5, WED), timed(6, WED, 720, 780)]);
    assert_eq!(view.first_cell(), 28 + 20 + 3);
    assert_eq!(view.viewport().first_hour(), 4);

    press(&mut view, Key::Up);
    for _ in 0..5 {
        press(&mut view, Key::Up);
    }
    assert!(view.selection().all_day);
    assert_eq!(view.selected_event().map(|e| e.id), Some(5));

    press(&mut view, Key::Down);
    assert!(!view.selection().all_day);
    assert_eq!(view.selection().hour, 5);
    assert_eq!(view.selected_event(), None);
}

#[test]
fn test_tap_on_event_opens_it_in_week_view() {
    let mut view = week_view(9);
    view.set_events(vec![timed(42, WED, 540, 600)]);

    let point = screen_point(&view, WED, 580);
    let result = send(&mut view, InputEvent::SingleTapUp(point));

    assert_eq!(view.selection().hour, 9);
    assert!(matches!(
        result.commands.as_slice(),
        [ViewCommand::OpenEvent { id: 42, .. }]
    ));
}

#[test]
fn test_second_tap_on_empty_cell_opens_day() {
    let mut view = week_view(9);
    let point = screen_point(&view, WED, 12 * 61 + 30);

    let first = send(&mut view, InputEvent::SingleTapUp(point));
    assert!(first.commands.is_empty());
    assert_eq!(view.selection().hour, 12);
    assert_eq!(view.selection().mode, SelectionMode::Selected);

    let second = send(&mut view, InputEvent::SingleTapUp(point));
    assert_eq!(
        second.commands,
        vec![ViewCommand::OpenDay {
            millis: hour_millis(WED, 12),
        }]
    );
}

#[test]
fn test_tap_in_hour_labels_is_ignored() {
    let mut view = week_view(9);
    let result = send(&mut view, InputEvent::SingleTapUp(Point::new(10.0, 300.0)));
    assert!(!result.handled);
}

#[test]
fn test_long_press_shows_context_menu() {
    let mut view = week_view(9);
    view.set_events(vec![timed(42, WED, 540, 600)]);

    let point = screen_point(&view, WED, 580);
    let result = send(&mut view, InputEvent::LongPress(point));

    assert_eq!(view.selection().mode, SelectionMode::LongPress);
    assert_eq!(
        result.commands,
        vec![ViewCommand::ShowContextMenu {
            millis: hour_millis(WED, 9),
            event: Some(42),
        }]
    );
}

#[test]
fn test_center_key_press_and_hold() {
    let mut view = week_view(9);
    press(&mut view, Key::Center);
    assert_eq!(view.selection().mode, SelectionMode::Pressed);

    let release = |held| InputEvent::KeyUp {
        key: Key::Center,
        held: Duration::from_millis(held),
    };
    send(&mut view, release(50));
    assert_eq!(view.selection().mode, SelectionMode::Selected);

    press(&mut view, Key::Center);
    let result = send(&mut view, release(800));
    assert_eq!(view.selection().mode, SelectionMode::LongPress);
    assert!(matches!(
        result.commands.as_slice(),
        [ViewCommand::ShowContextMenu { event: None, .. }]
    ));

    press(&mut view, Key::Center);
    let result = send(&mut view, release(100));
    assert!(matches!(
        result.commands.as_slice(),
        [ViewCommand::CreateEvent { .. }]
    ));
}

#[test]
fn test_vertical_scroll_hides_selection_and_clamps() {
    let mut view = week_view(9);
    press(&mut view, Key::Up);

    send(&mut view, InputEvent::TouchDown(Point::new(400.0, 300.0)));
    send(
        &mut view,
        InputEvent::Scroll {
            start: Point::new(400.0, 300.0),
            current: Point::new(400.0, -5000.0),
        },
    );
    assert_eq!(view.touch_mode(), TouchMode::VerticalScroll);
    assert_eq!(view.selection().mode, SelectionMode::Hidden);
    assert!(view.is_scrolling());
    assert_eq!(view.viewport().view_start_y(), view.viewport().max_view_start_y());
    assert_eq!(view.viewport().view_start_y(), 854);

    send(&mut view, InputEvent::TouchUp);
    assert!(!view.is_scrolling());
    assert_eq!(view.selection().hour, 15);
    assert_eq!(view.selection().mode, SelectionMode::Selected);
}

#[test]
fn test_horizontal_drag_switches_page_on_release() {
    let mut view = week_view(9);
    send(&mut view, InputEvent::TouchDown(Point::new(400.0, 300.0)));
    send(
        &mut view,
        InputEvent::Scroll {
            start: Point::new(400.0, 300.0),
            current: Point::new(300.0, 305.0),
        },
    );
    assert_eq!(view.touch_mode(), TouchMode::HorizontalScroll);
    assert_eq!(view.view_start_x(), 100);

    let result = send(&mut view, InputEvent::TouchUp);
    assert_eq!(
        result.commands[0],
        ViewCommand::SwitchPage {
            forward: true,
            selection_day: WED + 7,
        }
    );
    assert_eq!(view.first_day(), SUN + 7);
    assert_eq!(view.view_start_x(), 0);
}

#[test]
fn test_short_horizontal_drag_snaps_back() {
    let mut view = week_view(9);
    send(&mut view, InputEvent::TouchDown(Point::new(400.0, 300.0)));
    send(
        &mut view,
        InputEvent::Scroll {
            start: Point::new(400.0, 300.0),
            current: Point::new(370.0, 300.0),
        },
    );
    let result = send(&mut view, InputEvent::TouchUp);
    assert!(result.commands.is_empty());
    assert_eq!(view.view_start_x(), 0);
    assert_eq!(view.first_day(), SUN);
}

#[test]
fn test_horizontal_fling_switches_page_back() {
    let mut view = week_view(9);
    send(&mut view, InputEvent::TouchDown(Point::new(300.0, 300.0)));
    let result = send(
        &mut view,
        InputEvent::Fling {
            start: Point::new(300.0, 300.0),
            end: Point::new(420.0, 310.0),
            velocity_x: 2000.0,
            velocity_y: 50.0,
        },
    );
    assert_eq!(
        result.commands[0],
        ViewCommand::SwitchPage {
            forward: false,
            selection_day: WED - 7,
        }
    );
    assert!(view.next_tick_at().is_none());
}

#[test]
fn test_vertical_fling_spins_to_rest() {
    let mut view = week_view(9);
    let start = Instant::now();
    view.handle_input(InputEvent::TouchDown(Point::new(400.0, 500.0)), start);
    view.handle_input(
        InputEvent::Scroll {
            start: Point::new(400.0, 500.0),
            current: Point::new(400.0, 450.0),
        },
        start,
    );
    view.handle_input(
        InputEvent::Fling {
            start: Point::new(400.0, 500.0),
            end: Point::new(400.0, 200.0),
            velocity_x: 0.0,
            velocity_y: -1200.0,
        },
        start,
    );
    view.handle_input(InputEvent::TouchUp, start);
    assert_eq!(view.next_tick_at(), Some(start));
    assert!(view.is_scrolling());
    assert_eq!(view.selection().mode, SelectionMode::Hidden);

    let mut ticks = 0;
    while let Some(at) = view.next_tick_at() {
        assert!(view.tick(at));
        ticks += 1;
        assert!(ticks < 100, "free spin did not stop");
    }

    // Coming to rest settles the scroll and shows the selection again.
    assert!(!view.is_scrolling());
    assert_eq!(view.selection().mode, SelectionMode::Selected);

    let y = view.viewport().view_start_y();
    assert!(y > 244);
    assert!(y <= view.viewport().max_view_start_y());
    assert!(view.selection().hour > view.viewport().first_hour());

    // Touching the grid stops a running spin.
    view.handle_input(
        InputEvent::Fling {
            start: Point::new(400.0, 200.0),
            end: Point::new(400.0, 500.0),
            velocity_x: 0.0,
            velocity_y: 1200.0,
        },
        start,
    );
    assert!(view.next_tick_at().is_some());
    view.handle_input(InputEvent::TouchDown(Point::new(400.0, 500.0)), start);
    assert!(view.next_tick_at().is_none());
}

#[test]
fn test_slow_fling_settles_immediately() {
    let mut view = week_view(9);
    press(&mut view, Key::Up);
    send(&mut view, InputEvent::TouchDown(Point::new(400.0, 500.0)));
    send(
        &mut view,
        InputEvent::Scroll {
            start: Point::new(400.0, 500.0),
            current: Point::new(400.0, 480.0),
        },
    );
    send(
        &mut view,
        InputEvent::Fling {
            start: Point::new(400.0, 500.0),
            end: Point::new(400.0, 480.0),
            velocity_x: 0.0,
            velocity_y: 0.0,
        },
    );
    send(&mut view, InputEvent::TouchUp);

    assert!(view.next_tick_at().is_none());
    assert!(!view.is_scrolling());
    assert_eq!(view.selection().mode, SelectionMode::Selected);
}

/// Packed rectangles in the same column of `day` must not overlap.
fn assert_no_shared_column_overlap(view: &CalendarView<Utc>, day: i32) {
    let left = view.day_left(day - view.first_day());
    let rects: Vec<_> = view
        .events()
        .iter()
        .zip(view.layouts())
        .filter_map(|(event, layout)| {
            view.geometry
                .compute_event_rect(day, left, 0, view.cell_width(), event, layout)
                .map(|rect| (layout.column, rect))
        })
        .collect();
    for (i, (column_a, a)) in rects.iter().enumerate() {
        for (column_b, b) in &rects[i + 1..] {
            if column_a == column_b {
                assert!(
                    a.bottom <= b.top || b.bottom <= a.top,
                    "{:?} and {:?} overlap in column {}",
                    a,
                    b,
                    column_a
                );
            }
        }
    }
}

#[test]
fn test_short_hours_pack_with_floored_height() {
    let mut view = week_view(9);
    view.set_events(vec![timed(1, WED, 540, 545), timed(2, WED, 560, 600)]);
    // At 60px per hour a floored 15px event covers 15 minutes.
    assert_eq!(view.min_duration_minutes(), 15);
    let columns: Vec<_> = view.layouts().iter().map(|l| l.column).collect();
    assert_eq!(columns, vec![0, 0]);

    // Shrinking the window re-packs: 15px now spans 45 minutes.
    view.set_size(741, 239);
    assert_eq!(view.viewport().cell_height(), 20);
    assert_eq!(view.min_duration_minutes(), 45);
    let columns: Vec<_> = view.layouts().iter().map(|l| l.column).collect();
    assert_eq!(columns, vec![0, 1]);
    assert_no_shared_column_overlap(&view, WED);

    view.set_size(741, 639);
    let columns: Vec<_> = view.layouts().iter().map(|l| l.column).collect();
    assert_eq!(columns, vec![0, 0]);
    assert_no_shared_column_overlap(&view, WED);
}

#[test]
fn test_reload_skips_already_loaded_page() {
    let mut view = week_view(9);
    assert_eq!(
        view.reload_events(),
        Some(ViewCommand::ReloadEvents {
            first_day: SUN,
            num_days: 7,
        })
    );
    assert_eq!(view.reload_events(), None);

    view.clear_cached_events();
    assert!(view.reload_events().is_some());
}

#[test]
fn test_set_events_clears_stale_selection() {
    let mut view = week_view(9);
    view.set_events(vec![timed(1, WED, 540, 600)]);
    press(&mut view, Key::Up);
    assert!(view.selected_event().is_some());

    view.set_events(vec![timed(2, WED, 600, 660)]);
    assert_eq!(view.selection().selected_event, None);
    assert!(view.selection().previous.is_none());
}

#[test]
fn test_outcome_without_pending_ticket_is_dropped() {
    let mut view = week_view(9);
    let applied = view.apply_load(LoadOutcome::Loaded {
        ticket: 3,
        first_day: SUN,
        num_days: 7,
        events: vec![timed(1, WED, 540, 600)],
    });
    assert!(!applied);
    assert!(view.events().is_empty());
}

#[test]
fn test_only_newest_load_is_applied() {
    let mut view = week_view(9);
    let loader = EventLoader::spawn(StaticEventSource::new(vec![
        timed(1, WED, 540, 600),
        timed(2, SUN - 1, 540, 600),
    ]));

    let first = view.begin_load(&loader).unwrap();
    let second = view.begin_load(&loader).unwrap();
    assert!(second > first);

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(outcome) = loader.poll() {
            let ticket = outcome.ticket();
            let applied = view.apply_load(outcome);
            assert_eq!(applied, ticket == second);
            if applied {
                break;
            }
        }
        assert!(Instant::now() < deadline, "load never finished");
        thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(view.pending_load(), None);
    let ids: Vec<_> = view.events().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1]);
}

#[test]
fn test_render_paints_headers_labels_and_selection() {
    let mut view = week_view(9);
    let mut declined = timed(2, TUE, 600, 660);
    declined.color = Some("#FF0000".to_string());
    declined.self_attendee_status = AttendeeStatus::Declined;
    view.set_events(vec![timed(1, WED, 540, 600), declined]);
    press(&mut view, Key::Up);

    let palette = GridPalette::light();
    let measure = MonospaceMeasure {
        advance: 7.0,
        height: 14.0,
    };
    let mut surface = RecordingSurface::default();
    let now = Utc.with_ymd_and_hms(2024, 3, 6, 9, 30, 0).unwrap();
    view.render(&mut surface, &measure, &palette, &now);

    let texts = surface.texts();
    assert!(texts.contains(&"Wed 6"));
    assert!(texts.contains(&"9am"));
    assert!(texts.contains(&"Event 1"));
    assert!(!surface.fills_with(palette.selected_event).is_empty());
    assert!(!surface.fills_with(palette.current_time_line).is_empty());

    let faded = parse_color("#FF0000").unwrap().declined();
    assert_eq!(surface.fills_with(faded).len(), 1);
    assert!(!view.surface().dirty);
}
