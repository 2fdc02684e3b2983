//! Event layout: density constants, column packing, pixel geometry and
//! directional neighbour links.

pub mod config;
pub mod geometry;
pub mod neighbors;
pub mod packer;

pub use config::LayoutConfig;
pub use geometry::{EventGeometry, Rect};
pub use neighbors::{
    ArrivalSide, Candidate, NeighborMap, Neighbors, PreviousSelection, Resolution,
};
pub use packer::pack_columns;

/// Layout annotations for one loaded event, kept beside the immutable event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLayout {
    /// Column (timed) or lane row (all-day) assigned by the packer.
    pub column: usize,
    /// Width of the cluster the event was packed into.
    pub max_columns: usize,
    /// Last rectangle computed for the event on the selection day or in the
    /// all-day lane.
    pub rect: Option<Rect>,
}

impl EventLayout {
    /// Full-width, unpositioned layout.
    pub fn single() -> Self {
        Self {
            column: 0,
            max_columns: 1,
            rect: None,
        }
    }
}

impl Default for EventLayout {
    fn default() -> Self {
        Self::single()
    }
}
