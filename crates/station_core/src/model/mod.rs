//! Station domain model.
//!
//! # Responsibility
//! - Define the records returned by station lookups.
//! - Define validated lookup input.
//!
//! # Invariants
//! - Records are read-only snapshots; core never mutates persisted state.

pub mod station;
