//! # Room Inventory
//!
//! The indexed collection of every room in the hall. It owns three maps:
//!
//! - `RoomId → Room`, the primary store;
//! - `(Floor, RoomNumber) → RoomId`, a unique index so no two rooms share a
//!   label on the same floor;
//! - `StudentId → BedRef`, a unique index so a student holds at most one bed
//!   anywhere in the hall.
//!
//! Every mutator validates against the indexes and the room's own guards
//! before changing anything, then updates room and indexes together. The
//! API holds its write lock for the duration of a call, which turns each
//! allocation into a single check-and-set on the bed.

use std::collections::HashMap;

use hallbridge_core::{BedNumber, Floor, RoomId, RoomNumber, StudentId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::RoomFilter;
use crate::provision::{BulkOutcome, InitializePlan, RangePlan, RoomBlueprint};
use crate::room::{Occupant, Room, RoomError, RoomStatus};
use crate::stats::OccupancyReport;

/// Location of an allocated bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BedRef {
    pub room_id: RoomId,
    pub bed_number: BedNumber,
}

/// A student's current bed, resolved to display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub student_id: StudentId,
    pub room_id: RoomId,
    pub floor: Floor,
    pub room_number: RoomNumber,
    pub bed_number: BedNumber,
}

/// Errors raised by inventory operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// A room with the same label already exists on the floor.
    #[error("room {room_number} already exists on floor {floor}")]
    DuplicateKey { floor: Floor, room_number: RoomNumber },

    #[error("{student_id} already occupies bed {bed} in room {room_number}")]
    StudentAlreadyAllocated {
        student_id: StudentId,
        room_number: RoomNumber,
        bed: BedNumber,
    },

    /// A stored room failed its structural checks and was not loaded.
    #[error("room {0} is inconsistent")]
    InconsistentRoom(RoomId),

    #[error(transparent)]
    Room(#[from] RoomError),
}

/// Indexed, in-memory room collection.
#[derive(Debug, Default)]
pub struct RoomInventory {
    rooms: HashMap<RoomId, Room>,
    by_location: HashMap<(Floor, RoomNumber), RoomId>,
    by_student: HashMap<StudentId, BedRef>,
}

impl RoomInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Rooms matching `filter`, ordered by floor then room number.
    pub fn list(&self, filter: &RoomFilter) -> Vec<Room> {
        let mut out: Vec<Room> = self
            .rooms
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            (a.floor, &a.room_number).cmp(&(b.floor, &b.room_number))
        });
        out
    }

    /// Occupancy report over the rooms matching `filter`.
    pub fn report(&self, filter: &RoomFilter) -> OccupancyReport {
        OccupancyReport::from_rooms(self.rooms.values().filter(|r| filter.matches(r)))
    }

    /// Add an existing room, e.g. one loaded from storage.
    ///
    /// Rejects a duplicate location, a room that fails
    /// [`Room::is_consistent`], and any occupant who already holds a bed.
    pub fn insert(&mut self, room: Room) -> Result<Room, InventoryError> {
        if !room.is_consistent() {
            return Err(InventoryError::InconsistentRoom(room.id));
        }
        let key = (room.floor, room.room_number.clone());
        if self.by_location.contains_key(&key) || self.rooms.contains_key(&room.id) {
            return Err(InventoryError::DuplicateKey {
                floor: room.floor,
                room_number: room.room_number,
            });
        }
        let mut seen = Vec::new();
        for bed in &room.beds {
            if let Some(student_id) = bed.student_id() {
                if self.by_student.contains_key(&student_id) || seen.contains(&student_id) {
                    return Err(InventoryError::StudentAlreadyAllocated {
                        student_id,
                        room_number: room.room_number.clone(),
                        bed: bed.bed_number,
                    });
                }
                seen.push(student_id);
            }
        }

        self.index(&room);
        self.by_location.insert(key, room.id);
        self.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    /// Build and insert a vacant room from a blueprint.
    pub fn create(&mut self, blueprint: &RoomBlueprint) -> Result<Room, InventoryError> {
        if self
            .by_location
            .contains_key(&(blueprint.floor, blueprint.room_number.clone()))
        {
            return Err(InventoryError::DuplicateKey {
                floor: blueprint.floor,
                room_number: blueprint.room_number.clone(),
            });
        }
        self.insert(blueprint.build())
    }

    /// Place a student in a bed.
    ///
    /// The room's own guards run first (bed exists, not under maintenance,
    /// bed empty), then the one-bed-per-student index. Nothing changes
    /// unless every check passes.
    pub fn allocate(
        &mut self,
        room_id: RoomId,
        bed_number: BedNumber,
        occupant: Occupant,
    ) -> Result<Room, InventoryError> {
        let mut candidate = self
            .rooms
            .get(&room_id)
            .ok_or(InventoryError::RoomNotFound(room_id))?
            .clone();
        let student_id = occupant.student_id;
        candidate.allocate(bed_number, occupant)?;

        if let Some(existing) = self.by_student.get(&student_id) {
            let room_number = self
                .rooms
                .get(&existing.room_id)
                .map_or_else(|| candidate.room_number.clone(), |r| r.room_number.clone());
            return Err(InventoryError::StudentAlreadyAllocated {
                student_id,
                room_number,
                bed: existing.bed_number,
            });
        }

        self.by_student.insert(
            student_id,
            BedRef {
                room_id,
                bed_number,
            },
        );
        self.rooms.insert(room_id, candidate.clone());
        Ok(candidate)
    }

    /// Empty a bed. Returns the updated room and the student removed, if any.
    pub fn release(
        &mut self,
        room_id: RoomId,
        bed_number: BedNumber,
    ) -> Result<(Room, Option<Occupant>), InventoryError> {
        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or(InventoryError::RoomNotFound(room_id))?;
        let removed = room.release(bed_number)?;
        let snapshot = room.clone();
        if let Some(occupant) = &removed {
            self.by_student.remove(&occupant.student_id);
        }
        Ok((snapshot, removed))
    }

    /// Apply a guarded status change. Returns the room and whether it changed.
    pub fn set_status(
        &mut self,
        room_id: RoomId,
        target: RoomStatus,
    ) -> Result<(Room, bool), InventoryError> {
        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or(InventoryError::RoomNotFound(room_id))?;
        let changed = room.set_status(target)?;
        Ok((room.clone(), changed))
    }

    /// Where a student currently sleeps.
    pub fn assignment_of(&self, student_id: StudentId) -> Option<Assignment> {
        let bed_ref = self.by_student.get(&student_id)?;
        let room = self.rooms.get(&bed_ref.room_id)?;
        Some(Assignment {
            student_id,
            room_id: room.id,
            floor: room.floor,
            room_number: room.room_number.clone(),
            bed_number: bed_ref.bed_number,
        })
    }

    /// Put back a previous version of a room, re-indexing its occupants.
    ///
    /// Used to undo an in-memory mutation whose write-through failed.
    pub fn restore(&mut self, previous: Room) {
        if let Some(current) = self.rooms.get(&previous.id) {
            let stale: Vec<StudentId> = current.beds.iter().filter_map(|b| b.student_id()).collect();
            for student_id in stale {
                self.by_student.remove(&student_id);
            }
        }
        self.index(&previous);
        self.by_location
            .insert((previous.floor, previous.room_number.clone()), previous.id);
        self.rooms.insert(previous.id, previous);
    }

    /// Remove a single room and its index entries.
    pub fn discard(&mut self, room_id: RoomId) -> Option<Room> {
        let room = self.rooms.remove(&room_id)?;
        self.by_location
            .remove(&(room.floor, room.room_number.clone()));
        for student_id in room.beds.iter().filter_map(|b| b.student_id()) {
            self.by_student.remove(&student_id);
        }
        Some(room)
    }

    /// Remove every room. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.rooms.len();
        self.rooms.clear();
        self.by_location.clear();
        self.by_student.clear();
        removed
    }

    /// Build the whole hall.
    ///
    /// An already provisioned inventory is left alone unless the plan is
    /// forced, in which case every room is removed first.
    pub fn initialize(&mut self, plan: &InitializePlan) -> Result<BulkOutcome, crate::ProvisionError> {
        let blueprints = plan.blueprints()?;
        if !self.is_empty() && !plan.force {
            return Ok(BulkOutcome::skipped(self.len()));
        }
        let mut outcome = BulkOutcome {
            removed: if plan.force { self.clear() } else { 0 },
            ..BulkOutcome::default()
        };
        self.create_all(&blueprints, &mut outcome);
        Ok(outcome)
    }

    /// Build a range of rooms on one floor. Existing rooms are reported as
    /// per-item failures and the rest are created.
    pub fn provision_range(&mut self, plan: &RangePlan) -> Result<BulkOutcome, crate::ProvisionError> {
        let blueprints = plan.blueprints()?;
        let mut outcome = BulkOutcome::default();
        self.create_all(&blueprints, &mut outcome);
        Ok(outcome)
    }

    fn create_all(&mut self, blueprints: &[RoomBlueprint], outcome: &mut BulkOutcome) {
        for blueprint in blueprints {
            match self.create(blueprint) {
                Ok(room) => outcome.record_created(room),
                Err(e) => outcome.record_failure(
                    blueprint.floor,
                    blueprint.room_number.clone(),
                    e.to_string(),
                ),
            }
        }
    }

    fn index(&mut self, room: &Room) {
        for bed in &room.beds {
            if let Some(student_id) = bed.student_id() {
                self.by_student.insert(
                    student_id,
                    BedRef {
                        room_id: room.id,
                        bed_number: bed.bed_number,
                    },
                );
            }
        }
    }
}
