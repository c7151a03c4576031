//! # Hall Layout Primitives
//!
//! Validated newtypes for the physical shape of a residence hall: which floor
//! a room is on, its number, how many beds it holds, and which bed slot a
//! student occupies.
//!
//! All four types reject out-of-range values at construction, and their serde
//! implementations route through the same constructors, so a deserialized
//! value is always a valid one.
//!
//! ## Room numbering
//!
//! Provisioned rooms are numbered by concatenating the floor with the
//! zero-padded per-floor index: floor 2, index 3 becomes `"203"`, floor 2,
//! index 20 becomes `"220"`. Individually created rooms may use any short
//! alphanumeric label.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Highest floor in the building.
pub const MAX_FLOOR: u8 = 8;

/// Maximum number of beds a single room may hold.
pub const MAX_CAPACITY: u8 = 10;

/// Bed count used when a request does not specify one.
pub const DEFAULT_CAPACITY: u8 = 4;

/// Highest per-floor room index (two-digit zero padding).
pub const MAX_ROOM_INDEX: u16 = 99;

/// Maximum length of a room number label.
const MAX_ROOM_NUMBER_LEN: usize = 8;

// ─── Floor ───────────────────────────────────────────────────────────

/// A floor of the building, `1..=MAX_FLOOR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Floor(u8);

impl Floor {
    /// Validate and construct a floor.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (1..=i64::from(MAX_FLOOR)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::InvalidFloor(value))
        }
    }

    /// The floor number.
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Every floor from 1 up to and including `top`.
    pub fn up_to(top: Floor) -> impl Iterator<Item = Floor> {
        (1..=top.0).map(Floor)
    }
}

impl TryFrom<i64> for Floor {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Floor> for i64 {
    fn from(floor: Floor) -> Self {
        i64::from(floor.0)
    }
}

impl std::fmt::Display for Floor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Capacity ────────────────────────────────────────────────────────

/// Number of beds in a room, `1..=MAX_CAPACITY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Capacity(u8);

impl Capacity {
    /// Validate and construct a capacity.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (1..=i64::from(MAX_CAPACITY)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::InvalidCapacity(value))
        }
    }

    /// The bed count.
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Bed numbers `1..=capacity` in order.
    pub fn bed_numbers(&self) -> impl Iterator<Item = BedNumber> {
        (1..=self.0).map(BedNumber)
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self(DEFAULT_CAPACITY)
    }
}

impl TryFrom<i64> for Capacity {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Capacity> for i64 {
    fn from(capacity: Capacity) -> Self {
        i64::from(capacity.0)
    }
}

// ─── BedNumber ───────────────────────────────────────────────────────

/// A bed slot within a room, numbered from 1.
///
/// Only the absolute range is checked here. Whether the bed exists in a
/// particular room depends on that room's capacity and is checked by the
/// room itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct BedNumber(u8);

impl BedNumber {
    /// Validate and construct a bed number.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (1..=i64::from(MAX_CAPACITY)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::InvalidBedNumber(value))
        }
    }

    /// The bed number.
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for BedNumber {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BedNumber> for i64 {
    fn from(bed: BedNumber) -> Self {
        i64::from(bed.0)
    }
}

impl std::fmt::Display for BedNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── RoomNumber ──────────────────────────────────────────────────────

/// A room label, unique per floor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomNumber(String);

impl RoomNumber {
    /// Validate a free-form room label.
    ///
    /// Surrounding whitespace is trimmed. The result must be 1 to 8 ASCII
    /// alphanumeric characters.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.len() > MAX_ROOM_NUMBER_LEN
            || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ValidationError::InvalidRoomNumber(s));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derive the provisioned room number for `index` on `floor`.
    pub fn derive(floor: Floor, index: u16) -> Result<Self, ValidationError> {
        if index == 0 || index > MAX_ROOM_INDEX {
            return Err(ValidationError::InvalidRoomIndex(i64::from(index)));
        }
        Ok(Self(format!("{}{:02}", floor.get(), index)))
    }

    /// The room number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomNumber> for String {
    fn from(number: RoomNumber) -> Self {
        number.0
    }
}

impl std::fmt::Display for RoomNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for RoomNumber {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
