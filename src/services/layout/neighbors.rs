//! Directional neighbour links for keyboard traversal.
//!
//! The working set is every event touching the selection cell. Each one is
//! linked to its nearest neighbour above, below, left and right, and the
//! event to select first is chosen from the side the selection arrived from.
//!
//! Every comparison is strict, so on exact ties the candidate that appears
//! first in the working set wins.

use std::collections::HashMap;

use super::geometry::Rect;

/// Larger than any distance the grid can produce.
const FAR_AWAY: i32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalSide {
    None,
    FromAbove,
    FromBelow,
    FromLeft,
    FromRight,
}

/// Links out of one event. Values are slots into the loaded event list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Neighbors {
    pub up: Option<usize>,
    pub down: Option<usize>,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

/// Slot to links, rebuilt whenever the working set changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborMap {
    links: HashMap<usize, Neighbors>,
}

impl NeighborMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: usize) -> Neighbors {
        self.links.get(&slot).copied().unwrap_or_default()
    }

    pub fn insert(&mut self, slot: usize, neighbors: Neighbors) {
        self.links.insert(slot, neighbors);
    }

    pub fn clear(&mut self) {
        self.links.clear();
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// The selection as it was before the latest move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviousSelection {
    pub slot: usize,
    pub rect: Rect,
    pub all_day: bool,
    pub column: usize,
}

/// One member of the working set.
///
/// `start_time`/`end_time` are minutes already clamped to the selection day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub slot: usize,
    pub rect: Rect,
    pub start_time: i32,
    pub end_time: i32,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Event to select on entering the cell.
    pub start: Option<usize>,
    pub arrival: ArrivalSide,
    pub links: NeighborMap,
}

/// Where the previous selection sits relative to `current_box`, and the
/// midpoint of its extent along the perpendicular axis.
pub fn arrival_side(
    previous: Option<&PreviousSelection>,
    prev_box: &Rect,
    current_box: &Rect,
) -> (ArrivalSide, i32, Rect) {
    let prev = match previous.filter(|p| !p.all_day) {
        Some(p) if p.rect.intersects(prev_box) => Rect::new(
            p.rect.left,
            p.rect.top.max(prev_box.top),
            p.rect.right,
            p.rect.bottom.min(prev_box.bottom),
        ),
        _ => *prev_box,
    };

    let (side, center) = if prev.left >= current_box.right {
        (ArrivalSide::FromRight, prev.center_y())
    } else if prev.right <= current_box.left {
        (ArrivalSide::FromLeft, prev.center_y())
    } else if prev.bottom <= current_box.top {
        (ArrivalSide::FromAbove, prev.center_x())
    } else if prev.top >= current_box.bottom {
        (ArrivalSide::FromBelow, prev.center_x())
    } else {
        (ArrivalSide::None, 0)
    };
    (side, center, prev)
}

/// Offset of `center` from the span `low..high`, zero when inside it.
fn offset_outside(center: i32, low: i32, high: i32) -> i32 {
    if low >= center {
        low - center
    } else if high <= center {
        center - high
    } else {
        0
    }
}

/// Link the timed working set and pick the event to select on entry.
pub fn resolve_timed(
    candidates: &[Candidate],
    previous: Option<&PreviousSelection>,
    prev_box: Rect,
    current_box: Rect,
) -> Resolution {
    let (arrival, prev_center, prev) = arrival_side(previous, &prev_box, &current_box);
    let mut links = NeighborMap::new();

    let mut start = candidates.first().map(|c| c.slot);
    let mut best_primary = FAR_AWAY;
    let mut best_secondary = FAR_AWAY;

    for (i, current) in candidates.iter().enumerate() {
        let left = current.rect.left;
        let right = current.rect.right;
        let top = current.rect.top.max(current_box.top);
        let bottom = current.rect.bottom.min(current_box.bottom);

        let (primary, secondary) = match arrival {
            ArrivalSide::FromAbove => (offset_outside(prev_center, left, right), top - prev.bottom),
            ArrivalSide::FromBelow => (offset_outside(prev_center, left, right), prev.top - bottom),
            ArrivalSide::FromLeft => (offset_outside(prev_center, top, bottom), left - prev.right),
            ArrivalSide::FromRight => (offset_outside(prev_center, top, bottom), prev.left - right),
            ArrivalSide::None => (0, 0),
        };
        if primary < best_primary || (primary == best_primary && secondary < best_secondary) {
            start = Some(current.slot);
            best_primary = primary;
            best_secondary = secondary;
        }

        let mut up: Option<&Candidate> = None;
        let mut down: Option<&Candidate> = None;
        let mut left_of: Option<&Candidate> = None;
        let mut right_of: Option<&Candidate> = None;
        let mut up_min = FAR_AWAY;
        let mut down_min = FAR_AWAY;
        let mut left_min = FAR_AWAY;
        let mut right_min = FAR_AWAY;

        let center_x = (left + right) / 2;
        let center_y = (top + bottom) / 2;

        for (j, neighbor) in candidates.iter().enumerate() {
            if i == j {
                continue;
            }
            let n_left = neighbor.rect.left;
            let n_right = neighbor.rect.right;
            let overlaps_horizontally = n_left < right && n_right > left;

            if neighbor.end_time <= current.start_time {
                if overlaps_horizontally {
                    let distance = current.start_time - neighbor.end_time;
                    if distance < up_min {
                        up_min = distance;
                        up = Some(neighbor);
                    } else if distance == up_min && closer_horizontally(center_x, neighbor, up) {
                        up = Some(neighbor);
                    }
                }
            } else if neighbor.start_time >= current.end_time && overlaps_horizontally {
                let distance = neighbor.start_time - current.end_time;
                if distance < down_min {
                    down_min = distance;
                    down = Some(neighbor);
                } else if distance == down_min && closer_horizontally(center_x, neighbor, down) {
                    down = Some(neighbor);
                }
            }

            if n_left >= right {
                let distance = offset_outside(center_y, neighbor.rect.top, neighbor.rect.bottom);
                if distance < right_min {
                    right_min = distance;
                    right_of = Some(neighbor);
                } else if distance == right_min {
                    if let Some(best) = right_of {
                        if n_left - right < best.rect.left - right {
                            right_of = Some(neighbor);
                        }
                    }
                }
            } else if n_right <= left {
                let distance = offset_outside(center_y, neighbor.rect.top, neighbor.rect.bottom);
                if distance < left_min {
                    left_min = distance;
                    left_of = Some(neighbor);
                } else if distance == left_min {
                    if let Some(best) = left_of {
                        if left - n_right < left - best.rect.right {
                            left_of = Some(neighbor);
                        }
                    }
                }
            }
        }

        links.insert(
            current.slot,
            Neighbors {
                up: up.map(|c| c.slot),
                down: down.map(|c| c.slot),
                left: left_of.map(|c| c.slot),
                right: right_of.map(|c| c.slot),
            },
        );
    }

    Resolution {
        start,
        arrival,
        links,
    }
}

/// Whether `neighbor` is strictly nearer to `center_x` than the current best.
fn closer_horizontally(center_x: i32, neighbor: &Candidate, best: Option<&Candidate>) -> bool {
    let Some(best) = best else {
        return true;
    };
    let neighbor_distance = offset_outside(center_x, neighbor.rect.left, neighbor.rect.right);
    let best_distance = offset_outside(center_x, best.rect.left, best.rect.right);
    neighbor_distance < best_distance
}

/// Link all-day events by lane row.
///
/// The start event keeps the row of a previous all-day selection; without
/// one it is the event in the lowest row.
pub fn resolve_all_day(candidates: &[Candidate], previous: Option<&PreviousSelection>) -> Resolution {
    let wanted_row = previous.filter(|p| p.all_day).map(|p| p.column);
    let mut links = NeighborMap::new();

    let mut same_row: Option<usize> = None;
    let mut lowest: Option<(usize, usize)> = None;

    for (i, current) in candidates.iter().enumerate() {
        let row = current.column;
        if Some(row) == wanted_row {
            same_row = Some(current.slot);
        } else if lowest.map_or(true, |(best_row, _)| row > best_row) {
            lowest = Some((row, current.slot));
        }

        let mut neighbors = Neighbors::default();
        for (j, other) in candidates.iter().enumerate() {
            if i == j {
                continue;
            }
            if row > 0 && other.column == row - 1 {
                neighbors.up = Some(other.slot);
            } else if other.column == row + 1 {
                neighbors.down = Some(other.slot);
            }
        }
        links.insert(current.slot, neighbors);
    }

    Resolution {
        start: same_row.or(lowest.map(|(_, slot)| slot)),
        arrival: ArrivalSide::None,
        links,
    }
}
