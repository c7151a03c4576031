//! # hallbridge-state: Room/Bed Occupancy Model
//!
//! Pure domain logic for the residence hall inventory. Nothing in this crate
//! performs I/O; the API crate owns locking and persistence and calls into
//! these types while holding its write lock.
//!
//! ## Components
//!
//! - **Room** (`room.rs`): the Room/Bed entity, the [`RoomStatus`] state
//!   machine (`vacant`, `partial`, `occupied`, plus the manual `maintenance`
//!   override), and the allocate/release mutators.
//!
//! - **Statistics** (`stats.rs`): single-pass roll-up of rooms and beds by
//!   status, overall and per floor.
//!
//! - **Provisioning** (`provision.rs`): building-wide and per-floor-range
//!   room construction plans with partial-failure outcomes.
//!
//! - **Inventory** (`inventory.rs`): the indexed room collection enforcing
//!   `(floor, room_number)` uniqueness and one bed per student.
//!
//! ## Status model
//!
//! ```text
//!            allocate / release (derived)
//!   vacant ◀──────────▶ partial ◀──────────▶ occupied
//!     │  ▲
//!     │  │ leave maintenance (recomputed from beds)
//!     ▼  │
//!   maintenance      (entry only when no bed is occupied)
//! ```

pub mod filter;
pub mod inventory;
pub mod provision;
pub mod room;
pub mod stats;

pub use filter::RoomFilter;
pub use inventory::{Assignment, BedRef, InventoryError, RoomInventory};
pub use provision::{
    BulkOutcome, InitializePlan, ItemFailure, ProvisionError, RangePlan, RoomBlueprint,
    MAX_BATCH_ROOMS,
};
pub use room::{Bed, Occupant, Room, RoomError, RoomStatus, StatusChange, MAX_STATUS_LOG};
pub use stats::{FloorOccupancy, OccupancyReport, OccupancyStats};
