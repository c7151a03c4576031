//! Room list filtering shared by listings and statistics.

use hallbridge_core::Floor;
use serde::{Deserialize, Serialize};

use crate::room::{Room, RoomStatus};

/// Optional floor, status and free-text constraints. An empty filter
/// matches every room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomFilter {
    pub floor: Option<Floor>,
    pub status: Option<RoomStatus>,
    pub search: Option<String>,
}

impl RoomFilter {
    /// Whether `room` satisfies every constraint that is set.
    pub fn matches(&self, room: &Room) -> bool {
        self.floor.map_or(true, |f| room.floor == f)
            && self.status.map_or(true, |s| room.status == s)
            && self
                .search
                .as_deref()
                .map_or(true, |needle| room.matches_search(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hallbridge_core::{default_amenities, Capacity, RoomNumber};

    fn room(floor: i64, number: &str) -> Room {
        Room::new(
            Floor::new(floor).unwrap(),
            RoomNumber::new(number).unwrap(),
            Capacity::default(),
            default_amenities(),
        )
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(RoomFilter::default().matches(&room(1, "101")));
    }

    #[test]
    fn constraints_combine() {
        let r = room(3, "305");
        let by_floor = RoomFilter {
            floor: Some(Floor::new(3).unwrap()),
            ..Default::default()
        };
        assert!(by_floor.matches(&r));

        let wrong_status = RoomFilter {
            floor: Some(Floor::new(3).unwrap()),
            status: Some(RoomStatus::Occupied),
            ..Default::default()
        };
        assert!(!wrong_status.matches(&r));

        let by_search = RoomFilter {
            search: Some("05".to_string()),
            ..Default::default()
        };
        assert!(by_search.matches(&r));
    }
}
