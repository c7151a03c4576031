//! # Aggregate Occupancy Statistics
//!
//! Rolls a set of rooms up into counts by status plus bed totals, overall and
//! per floor. Everything is computed in one pass over the rooms handed in;
//! callers filter first and pass the survivors.

use std::collections::BTreeMap;

use hallbridge_core::Floor;
use serde::{Deserialize, Serialize};

use crate::room::{Room, RoomStatus};

/// Room and bed counts for a set of rooms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyStats {
    pub total_rooms: usize,
    pub vacant: usize,
    pub partial: usize,
    pub occupied: usize,
    pub maintenance: usize,
    pub total_beds: usize,
    pub occupied_beds: usize,
    /// Empty beds in rooms that are not under maintenance.
    pub available_beds: usize,
}

impl OccupancyStats {
    /// Aggregate an iterator of rooms.
    pub fn from_rooms<'a, I>(rooms: I) -> Self
    where
        I: IntoIterator<Item = &'a Room>,
    {
        let mut stats = Self::default();
        for room in rooms {
            stats.add(room);
        }
        stats
    }

    /// Fold one room into the totals.
    pub fn add(&mut self, room: &Room) {
        self.total_rooms += 1;
        match room.status {
            RoomStatus::Vacant => self.vacant += 1,
            RoomStatus::Partial => self.partial += 1,
            RoomStatus::Occupied => self.occupied += 1,
            RoomStatus::Maintenance => self.maintenance += 1,
        }
        self.total_beds += room.beds.len();
        self.occupied_beds += room.occupied_beds();
        self.available_beds += room.available_beds();
    }

    /// Number of rooms in `status`.
    pub fn count(&self, status: RoomStatus) -> usize {
        match status {
            RoomStatus::Vacant => self.vacant,
            RoomStatus::Partial => self.partial,
            RoomStatus::Occupied => self.occupied,
            RoomStatus::Maintenance => self.maintenance,
        }
    }

    /// Fraction of beds occupied, `0.0` for an empty set.
    pub fn occupancy_rate(&self) -> f64 {
        if self.total_beds == 0 {
            0.0
        } else {
            self.occupied_beds as f64 / self.total_beds as f64
        }
    }
}

/// Statistics for a single floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorOccupancy {
    pub floor: Floor,
    pub stats: OccupancyStats,
}

/// Overall statistics plus a per-floor breakdown, floors ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyReport {
    pub overall: OccupancyStats,
    pub floors: Vec<FloorOccupancy>,
}

impl OccupancyReport {
    /// Build the report in a single pass.
    pub fn from_rooms<'a, I>(rooms: I) -> Self
    where
        I: IntoIterator<Item = &'a Room>,
    {
        let mut overall = OccupancyStats::default();
        let mut by_floor: BTreeMap<Floor, OccupancyStats> = BTreeMap::new();
        for room in rooms {
            overall.add(room);
            by_floor.entry(room.floor).or_default().add(room);
        }
        Self {
            overall,
            floors: by_floor
                .into_iter()
                .map(|(floor, stats)| FloorOccupancy { floor, stats })
                .collect(),
        }
    }
}
