//! # Validation Errors
//!
//! Errors raised when a layout primitive or vocabulary value is constructed
//! from untrusted input. Every variant carries the offending value so the
//! API layer can return it verbatim in a 422 response.

use thiserror::Error;

/// Rejection of an out-of-range or malformed input value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Floor outside `1..=MAX_FLOOR`.
    #[error("floor {0} is out of range (expected 1..={max})", max = crate::MAX_FLOOR)]
    InvalidFloor(i64),

    /// Bed count outside `1..=MAX_CAPACITY`.
    #[error("capacity {0} is out of range (expected 1..={max})", max = crate::MAX_CAPACITY)]
    InvalidCapacity(i64),

    /// Bed number below 1 or above the supported maximum.
    #[error("bed number {0} is out of range (expected 1..={max})", max = crate::MAX_CAPACITY)]
    InvalidBedNumber(i64),

    /// Room index (the per-floor slot used to derive a room number) out of range.
    #[error("room index {0} is out of range (expected 1..={max})", max = crate::MAX_ROOM_INDEX)]
    InvalidRoomIndex(i64),

    /// Room number is empty, too long, or contains non-alphanumeric characters.
    #[error("invalid room number: {0:?}")]
    InvalidRoomNumber(String),

    /// Amenity outside the fixed vocabulary.
    #[error("unknown amenity: {0:?}")]
    UnknownAmenity(String),

    /// Room status outside `vacant`, `partial`, `occupied`, `maintenance`.
    #[error("unknown room status: {0:?}")]
    UnknownStatus(String),
}
