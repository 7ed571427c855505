//! Core use-case services.
//!
//! # Responsibility
//! - Turn raw caller input into validated repository calls.
//! - Keep request boundaries (CLI, HTTP) decoupled from storage details.

pub mod station_service;
