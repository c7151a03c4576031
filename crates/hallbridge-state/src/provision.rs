//! # Bulk Provisioning
//!
//! Plans for constructing many rooms at once, and the outcome record that
//! reports what happened to each one.
//!
//! Two shapes are supported:
//!
//! - [`InitializePlan`]: the whole building, every floor from 1 up to
//!   `floors` with `rooms_per_floor` rooms each. Applying it to a non-empty
//!   inventory is a no-op that reports the existing rooms as skipped, unless
//!   `force` is set, in which case every existing room is deleted first.
//!
//! - [`RangePlan`]: rooms `start..=end` on one floor, capped at
//!   [`MAX_BATCH_ROOMS`] per call. Each room is created independently; a room
//!   that already exists is recorded as a failure and the rest proceed.
//!
//! Plans are validated when constructed, so an oversized or malformed
//! request is rejected before any room is written.

use std::collections::BTreeSet;

use hallbridge_core::{
    default_amenities, Amenity, Capacity, Floor, RoomNumber, ValidationError, MAX_ROOM_INDEX,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::room::Room;

/// Most rooms a single range request may create.
pub const MAX_BATCH_ROOMS: u16 = 50;

/// Rejection of a provisioning plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    /// A floor, capacity or room index was out of range.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The range end precedes its start.
    #[error("room range {start}..={end} is empty")]
    EmptyRange { start: u16, end: u16 },

    /// The range covers more rooms than one call may create.
    #[error("room range covers {requested} rooms; at most {max} may be created per request")]
    BatchTooLarge { requested: u16, max: u16 },
}

/// The shape of one room to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomBlueprint {
    pub floor: Floor,
    pub room_number: RoomNumber,
    pub capacity: Capacity,
    pub amenities: BTreeSet<Amenity>,
}

impl RoomBlueprint {
    /// Materialize a vacant room from the blueprint.
    pub fn build(&self) -> Room {
        Room::new(
            self.floor,
            self.room_number.clone(),
            self.capacity,
            self.amenities.clone(),
        )
    }
}

fn room_index(value: i64) -> Result<u16, ValidationError> {
    if (1..=i64::from(MAX_ROOM_INDEX)).contains(&value) {
        Ok(value as u16)
    } else {
        Err(ValidationError::InvalidRoomIndex(value))
    }
}

// ─── Building-wide plan ──────────────────────────────────────────────

/// Construct every room of the building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializePlan {
    /// Top floor; floors `1..=floors` are built.
    pub floors: Floor,
    pub rooms_per_floor: u16,
    pub capacity: Capacity,
    pub amenities: BTreeSet<Amenity>,
    /// Delete every existing room before building.
    pub force: bool,
}

impl InitializePlan {
    /// Validate a building plan with the default amenity set.
    pub fn new(floors: i64, rooms_per_floor: i64, beds_per_room: i64) -> Result<Self, ProvisionError> {
        Ok(Self {
            floors: Floor::new(floors)?,
            rooms_per_floor: room_index(rooms_per_floor)?,
            capacity: Capacity::new(beds_per_room)?,
            amenities: default_amenities(),
            force: false,
        })
    }

    /// Replace the amenity set.
    pub fn with_amenities(mut self, amenities: BTreeSet<Amenity>) -> Self {
        self.amenities = amenities;
        self
    }

    /// Set the destructive rebuild flag.
    pub fn forced(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Number of rooms the plan creates.
    pub fn room_count(&self) -> usize {
        usize::from(self.floors.get()) * usize::from(self.rooms_per_floor)
    }

    /// Every room of the plan, floor by floor.
    pub fn blueprints(&self) -> Result<Vec<RoomBlueprint>, ProvisionError> {
        let mut out = Vec::with_capacity(self.room_count());
        for floor in Floor::up_to(self.floors) {
            for index in 1..=self.rooms_per_floor {
                out.push(RoomBlueprint {
                    floor,
                    room_number: RoomNumber::derive(floor, index)?,
                    capacity: self.capacity,
                    amenities: self.amenities.clone(),
                });
            }
        }
        Ok(out)
    }
}

// ─── Single-floor range plan ─────────────────────────────────────────

/// Construct rooms `start..=end` on a single floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePlan {
    pub floor: Floor,
    pub start: u16,
    pub end: u16,
    pub capacity: Capacity,
    pub amenities: BTreeSet<Amenity>,
}

impl RangePlan {
    /// Validate a range plan with the default amenity set.
    pub fn new(floor: i64, start: i64, end: i64, beds_per_room: i64) -> Result<Self, ProvisionError> {
        let floor = Floor::new(floor)?;
        let start = room_index(start)?;
        let end = room_index(end)?;
        if end < start {
            return Err(ProvisionError::EmptyRange { start, end });
        }
        let requested = end - start + 1;
        if requested > MAX_BATCH_ROOMS {
            return Err(ProvisionError::BatchTooLarge {
                requested,
                max: MAX_BATCH_ROOMS,
            });
        }
        Ok(Self {
            floor,
            start,
            end,
            capacity: Capacity::new(beds_per_room)?,
            amenities: default_amenities(),
        })
    }

    /// Replace the amenity set.
    pub fn with_amenities(mut self, amenities: BTreeSet<Amenity>) -> Self {
        self.amenities = amenities;
        self
    }

    /// Number of rooms the plan creates.
    pub fn room_count(&self) -> usize {
        usize::from(self.end - self.start + 1)
    }

    /// Every room of the range in ascending order.
    pub fn blueprints(&self) -> Result<Vec<RoomBlueprint>, ProvisionError> {
        (self.start..=self.end)
            .map(|index| {
                Ok(RoomBlueprint {
                    floor: self.floor,
                    room_number: RoomNumber::derive(self.floor, index)?,
                    capacity: self.capacity,
                    amenities: self.amenities.clone(),
                })
            })
            .collect()
    }
}

// ─── Outcome ─────────────────────────────────────────────────────────

/// A room that could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub floor: Floor,
    pub room_number: RoomNumber,
    pub reason: String,
}

/// Per-item result of a bulk operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub created: usize,
    /// Rooms left alone because the inventory was already provisioned.
    pub skipped: usize,
    pub failed: usize,
    /// Rooms deleted by a forced rebuild before construction.
    pub removed: usize,
    pub rooms: Vec<Room>,
    pub failures: Vec<ItemFailure>,
}

impl BulkOutcome {
    /// Outcome of a no-op run over an already provisioned inventory.
    pub fn skipped(existing: usize) -> Self {
        Self {
            skipped: existing,
            ..Self::default()
        }
    }

    /// Record a successfully created room.
    pub fn record_created(&mut self, room: Room) {
        self.created += 1;
        self.rooms.push(room);
    }

    /// Record a room that failed, with the reason shown to the caller.
    pub fn record_failure(&mut self, floor: Floor, room_number: RoomNumber, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push(ItemFailure {
            floor,
            room_number,
            reason: reason.into(),
        });
    }

    /// Turn a created room into a failure, e.g. when it could not be persisted.
    pub fn demote(&mut self, room_id: hallbridge_core::RoomId, reason: impl Into<String>) {
        if let Some(pos) = self.rooms.iter().position(|r| r.id == room_id) {
            let room = self.rooms.remove(pos);
            self.created -= 1;
            self.record_failure(room.floor, room.room_number, reason);
        }
    }
}
