// Property-based tests for column packing, event geometry, scrolling and
// neighbour links

use std::time::{Duration, Instant};

use calendar_grid::models::event::Event;
use calendar_grid::services::layout::{
    neighbors, pack_columns, Candidate, EventGeometry, EventLayout, LayoutConfig, Rect,
};
use calendar_grid::services::viewport::{FreeSpin, Viewport};
use proptest::prelude::*;

const DAY: i32 = 2_460_376;

fn event_strategy() -> impl Strategy<Value = (i32, i32)> {
    (0..1440i32, 0..240i32).prop_map(|(start, length)| (start, (start + length).min(1440)))
}

fn build_events(spans: &[(i32, i32)]) -> Vec<Event> {
    spans
        .iter()
        .enumerate()
        .map(|(id, &(start, end))| {
            Event::builder()
                .id(id as i64)
                .title("Generated")
                .span(DAY, start, DAY, end)
                .build()
                .unwrap()
        })
        .collect()
}

proptest! {
    /// Property: events that overlap in time never share a column
    #[test]
    fn prop_overlapping_events_get_distinct_columns(
        spans in prop::collection::vec(event_strategy(), 1..25),
        margin in 0..30i32,
    ) {
        let events = build_events(&spans);
        let layouts = pack_columns(&events, DAY, DAY, margin);

        for (i, a) in events.iter().enumerate() {
            prop_assert!(layouts[i].column < layouts[i].max_columns);
            for (j, b) in events.iter().enumerate().skip(i + 1) {
                let a_end = a.start_time + (a.end_time - a.start_time).max(margin);
                let b_end = b.start_time + (b.end_time - b.start_time).max(margin);
                let overlap = a.start_time < b_end && b.start_time < a_end;
                if overlap {
                    prop_assert_ne!(layouts[i].column, layouts[j].column);
                }
            }
        }
    }

    /// Property: every timed rectangle is at least the minimum height and
    /// stays inside its day column
    #[test]
    fn prop_event_rect_is_tall_enough_and_in_column(
        (start, end) in event_strategy(),
        hour_height in 5..120i32,
        cell_width in 10..300i32,
        columns in 1..5usize,
    ) {
        let config = LayoutConfig::default();
        let geometry = EventGeometry::new(&config, hour_height);
        let event = build_events(&[(start, end)]).remove(0);
        let layout = EventLayout {
            column: columns - 1,
            max_columns: columns,
            rect: None,
        };

        let rect = geometry
            .compute_event_rect(DAY, 100, 1, cell_width, &event, &layout)
            .unwrap();
        prop_assert!(rect.height() >= config.min_event_height);
        prop_assert!(rect.left >= 100);
        prop_assert!(rect.right <= 100 + cell_width.max(2 * config.cell_margin + columns as i32));
    }

    /// Property: scrolling never leaves the content
    #[test]
    fn prop_scroll_stays_in_bounds(
        grid_height in 100..2000i32,
        hours in 4..=24u32,
        target in -5000..5000i32,
    ) {
        let mut viewport = Viewport::new(&LayoutConfig::default(), hours);
        viewport.remeasure(grid_height, 12);
        let y = viewport.scroll_to(target);
        prop_assert!(y >= 0);
        prop_assert!(y <= viewport.max_view_start_y());
        prop_assert!(viewport.first_hour() * viewport.row_height() >= y);
    }

    /// Property: a free spin always comes to rest
    #[test]
    fn prop_free_spin_terminates(
        velocity in -10_000.0..10_000.0f32,
        start_y in 0..900i32,
    ) {
        let mut viewport = Viewport::new(&LayoutConfig::default(), 10);
        viewport.remeasure(611, 12);
        viewport.scroll_to(start_y);

        let mut now = Instant::now();
        let mut spin = FreeSpin::from_velocity(velocity, now);
        let mut ticks = 0;
        while spin.is_running() {
            viewport.apply_free_spin(&mut spin, now);
            now += Duration::from_millis(30);
            ticks += 1;
            prop_assert!(ticks < 200);
        }
        prop_assert!(viewport.view_start_y() <= viewport.max_view_start_y());
    }

    /// Property: up and down links point at events that end before or start
    /// after the linked event, and the start event is in the working set
    #[test]
    fn prop_vertical_links_respect_time_order(
        spans in prop::collection::vec(event_strategy(), 1..12),
    ) {
        let candidates: Vec<Candidate> = spans
            .iter()
            .enumerate()
            .map(|(slot, &(start, end))| Candidate {
                slot,
                rect: Rect::new(10, start, 110, end.max(start + 15)),
                start_time: start,
                end_time: end,
                column: 0,
            })
            .collect();
        let current_box = Rect::new(0, 0, 120, 1500);
        let resolution = neighbors::resolve_timed(&candidates, None, current_box, current_box);

        let start = resolution.start.unwrap();
        prop_assert!(start < candidates.len());
        for candidate in &candidates {
            let links = resolution.links.get(candidate.slot);
            if let Some(up) = links.up {
                prop_assert!(candidates[up].end_time <= candidate.start_time);
            }
            if let Some(down) = links.down {
                prop_assert!(candidates[down].start_time >= candidate.end_time);
            }
            prop_assert_eq!(links.left, None);
            prop_assert_eq!(links.right, None);
        }
    }

    /// Property: left and right links point at events lying entirely on
    /// that side, up and down links overlap horizontally, and a side link
    /// exists whenever some event lies on that side
    #[test]
    fn prop_neighbor_links_are_geometrically_consistent(
        boxes in prop::collection::vec(
            (event_strategy(), 0..600i32, 5..200i32),
            1..12,
        ),
    ) {
        let candidates: Vec<Candidate> = boxes
            .iter()
            .enumerate()
            .map(|(slot, &((start, end), left, width))| Candidate {
                slot,
                rect: Rect::new(left, start, left + width, end.max(start + 15)),
                start_time: start,
                end_time: end,
                column: 0,
            })
            .collect();
        let current_box = Rect::new(0, 0, 800, 1500);
        let resolution = neighbors::resolve_timed(&candidates, None, current_box, current_box);

        for candidate in &candidates {
            let rect = candidate.rect;
            let links = resolution.links.get(candidate.slot);
            let others = || candidates.iter().filter(move |c| c.slot != candidate.slot);

            match links.right {
                Some(right) => prop_assert!(candidates[right].rect.left >= rect.right),
                None => prop_assert!(others().all(|c| c.rect.left < rect.right)),
            }
            match links.left {
                Some(left) => prop_assert!(candidates[left].rect.right <= rect.left),
                None => prop_assert!(others().all(|c| c.rect.right > rect.left)),
            }
            for vertical in [links.up, links.down].into_iter().flatten() {
                let other = candidates[vertical].rect;
                prop_assert!(other.left < rect.right && other.right > rect.left);
            }
        }
    }
}
