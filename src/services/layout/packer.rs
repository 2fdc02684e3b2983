//! Column assignment for overlapping events.
//!
//! Timed events are swept in start order; each takes the lowest column not
//! held by an event that is still running. All-day events are placed into
//! per-day lanes, first fit across every day they cover.

use crate::models::event::Event;

use super::EventLayout;

/// Assign columns to every event in `events` for the visible days
/// `first_day..=last_day`.
///
/// The result is parallel to `events`. Events outside the range keep a
/// single full-width column.
pub fn pack_columns(
    events: &[Event],
    first_day: i32,
    last_day: i32,
    min_duration_minutes: i32,
) -> Vec<EventLayout> {
    let mut layouts = vec![EventLayout::single(); events.len()];
    if last_day < first_day {
        return layouts;
    }

    pack_timed(events, first_day, last_day, min_duration_minutes, &mut layouts);
    pack_all_day(events, first_day, last_day, &mut layouts);

    log::debug!(
        "packed {} events into columns for days {}..={}",
        events.len(),
        first_day,
        last_day
    );
    layouts
}

/// Length used when deciding whether an event still occupies its column.
fn effective_duration(event: &Event, min_duration_minutes: i32) -> i64 {
    let duration = event.absolute_end_minute() - event.absolute_start_minute();
    duration.max(min_duration_minutes as i64)
}

fn pack_timed(
    events: &[Event],
    first_day: i32,
    last_day: i32,
    min_duration_minutes: i32,
    layouts: &mut [EventLayout],
) {
    let mut order: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.all_day && e.start_day <= last_day && e.end_day >= first_day)
        .map(|(slot, _)| slot)
        .collect();
    order.sort_by_key(|&slot| events[slot].absolute_start_minute());

    let mut active: Vec<usize> = Vec::new();
    let mut occupied: Vec<bool> = Vec::new();
    let mut cluster: Vec<usize> = Vec::new();
    let mut peak = 0;

    for &slot in &order {
        let start = events[slot].absolute_start_minute();

        active.retain(|&other| {
            let event = &events[other];
            let still_running =
                event.absolute_start_minute() + effective_duration(event, min_duration_minutes)
                    > start;
            if !still_running {
                occupied[layouts[other].column] = false;
            }
            still_running
        });

        // Nothing running: the previous cluster is complete.
        if active.is_empty() {
            close_cluster(&mut cluster, peak, layouts);
            peak = 0;
            occupied.clear();
        }

        let column = match occupied.iter().position(|taken| !taken) {
            Some(free) => {
                occupied[free] = true;
                free
            }
            None => {
                occupied.push(true);
                occupied.len() - 1
            }
        };
        layouts[slot].column = column;

        active.push(slot);
        cluster.push(slot);
        peak = peak.max(active.len());
    }

    close_cluster(&mut cluster, peak, layouts);
}

fn close_cluster(cluster: &mut Vec<usize>, peak: usize, layouts: &mut [EventLayout]) {
    for slot in cluster.drain(..) {
        layouts[slot].max_columns = peak.max(1);
    }
}

fn pack_all_day(events: &[Event], first_day: i32, last_day: i32, layouts: &mut [EventLayout]) {
    let num_days = (last_day - first_day + 1) as usize;
    let mut lanes: Vec<Vec<bool>> = vec![Vec::new(); num_days];

    let mut order: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.all_day && e.start_day <= last_day && e.end_day >= first_day)
        .map(|(slot, _)| slot)
        .collect();
    order.sort_by_key(|&slot| events[slot].absolute_start_minute());

    let span_of = |event: &Event| {
        let first = (event.start_day.max(first_day) - first_day) as usize;
        let last = (event.end_day.min(last_day) - first_day) as usize;
        first..=last.max(first)
    };

    for &slot in &order {
        let span = span_of(&events[slot]);
        let mut column = 0;
        while span
            .clone()
            .any(|day| lanes[day].get(column).copied().unwrap_or(false))
        {
            column += 1;
        }

        for day in span {
            let lane = &mut lanes[day];
            if lane.len() <= column {
                lane.resize(column + 1, false);
            }
            lane[column] = true;
        }
        layouts[slot].column = column;
    }

    for &slot in &order {
        let peak = span_of(&events[slot])
            .map(|day| lanes[day].iter().filter(|taken| **taken).count())
            .max()
            .unwrap_or(1);
        let layout = &mut layouts[slot];
        layout.max_columns = peak.max(layout.column + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DAY: i32 = 2_460_000;

    fn timed(start: i32, end: i32) -> Event {
        Event::builder()
            .title("Timed")
            .span(DAY, start, DAY, end)
            .build()
            .unwrap()
    }

    fn all_day(first: i32, last: i32) -> Event {
        let mut event = Event::builder()
            .title("All day")
            .span(first, 0, last, 1440)
            .build()
            .unwrap();
        event.all_day = true;
        event
    }

    fn columns(layouts: &[EventLayout]) -> Vec<(usize, usize)> {
        layouts.iter().map(|l| (l.column, l.max_columns)).collect()
    }

    #[test]
    fn test_short_events_use_overlap_margin() {
        // A 09:00-09:05, B 09:03-10:00, C 09:00-09:30
        let events = vec![timed(540, 545), timed(543, 600), timed(540, 570)];
        let layouts = pack_columns(&events, DAY, DAY, 15);

        let mut assigned: Vec<usize> = layouts.iter().map(|l| l.column).collect();
        assigned.sort_unstable();
        assert_eq!(assigned, vec![0, 1, 2]);
        assert!(layouts.iter().all(|l| l.max_columns == 3));
    }

    #[test]
    fn test_back_to_back_events_share_column() {
        let events = vec![timed(540, 600), timed(600, 660)];
        let layouts = pack_columns(&events, DAY, DAY, 15);
        assert_eq!(columns(&layouts), vec![(0, 1), (0, 1)]);
    }

    #[test]
    fn test_margin_separates_short_neighbours() {
        let events = vec![timed(540, 545), timed(550, 600)];
        let layouts = pack_columns(&events, DAY, DAY, 15);
        assert_eq!(columns(&layouts), vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn test_freed_column_is_reused() {
        let events = vec![timed(540, 600), timed(540, 720), timed(600, 660)];
        let layouts = pack_columns(&events, DAY, DAY, 15);
        assert_eq!(columns(&layouts), vec![(0, 2), (1, 2), (0, 2)]);
    }

    #[test]
    fn test_separate_clusters_get_own_width() {
        let events = vec![timed(540, 600), timed(550, 600), timed(720, 780)];
        let layouts = pack_columns(&events, DAY, DAY, 15);
        assert_eq!(columns(&layouts), vec![(0, 2), (1, 2), (0, 1)]);
    }

    #[test]
    fn test_out_of_range_events_untouched() {
        let events = vec![timed(540, 600), timed(540, 600)];
        let layouts = pack_columns(&events, DAY + 1, DAY + 3, 15);
        assert_eq!(columns(&layouts), vec![(0, 1), (0, 1)]);
    }

    #[test]
    fn test_all_day_first_fit_across_span() {
        let events = vec![
            all_day(DAY, DAY + 2),
            all_day(DAY + 1, DAY + 1),
            all_day(DAY + 2, DAY + 3),
            all_day(DAY + 3, DAY + 3),
        ];
        let layouts = pack_columns(&events, DAY, DAY + 6, 15);
        assert_eq!(columns(&layouts), vec![(0, 2), (1, 2), (1, 2), (0, 2)]);
    }

    #[test]
    fn test_all_day_clipped_to_visible_range() {
        let events = vec![all_day(DAY - 5, DAY), all_day(DAY, DAY)];
        let layouts = pack_columns(&events, DAY, DAY + 6, 15);
        assert_eq!(columns(&layouts), vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn test_timed_and_all_day_are_independent() {
        let events = vec![all_day(DAY, DAY), timed(540, 600)];
        let layouts = pack_columns(&events, DAY, DAY, 15);
        assert_eq!(columns(&layouts), vec![(0, 1), (0, 1)]);
    }
}
