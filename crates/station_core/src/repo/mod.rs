//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the station lookup contract used by services.
//! - Isolate SQLite query, retry and cancellation details from callers.
//!
//! # Invariants
//! - Repositories are read-only over station data.
//! - Repository APIs return semantic errors (`TimedOut`, `RetriesExhausted`)
//!   in addition to DB transport errors.

pub mod cancel;
mod retry;
pub mod station_repo;
