//! # API Route Modules
//!
//! - `rooms`: room inventory, provisioning, status changes and bed
//!   allocation.
//! - `students`: the student directory and each student's bed assignment.
//! - `settings`: hall cutoffs and fees.

pub mod rooms;
pub mod settings;
pub mod students;
