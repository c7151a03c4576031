//! # hallbridge-core: Foundational Types for HallBridge
//!
//! Leaf crate of the workspace. Defines the primitives every other crate
//! builds on; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `RoomId` and `StudentId` are
//!    distinct types, so a student id can never be passed where a room id is
//!    expected.
//!
//! 2. **Validated layout primitives.** `Floor`, `RoomNumber`, `Capacity` and
//!    `BedNumber` can only be constructed through checked constructors. Out of
//!    range values are rejected at the boundary with a [`ValidationError`].
//!
//! 3. **Closed amenity vocabulary.** [`Amenity`] is an enum; unknown amenity
//!    strings fail to parse instead of being stored verbatim.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `hallbridge-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod amenity;
pub mod error;
pub mod identity;
pub mod layout;

pub use amenity::{default_amenities, Amenity};
pub use error::ValidationError;
pub use identity::{RoomId, StudentId};
pub use layout::{
    BedNumber, Capacity, Floor, RoomNumber, DEFAULT_CAPACITY, MAX_CAPACITY, MAX_FLOOR,
    MAX_ROOM_INDEX,
};
