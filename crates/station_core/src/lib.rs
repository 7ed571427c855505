//! Core lookup logic for monitoring stations.
//! This crate owns input validation, store access and the error taxonomy.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, RetryPolicy, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::station::{CountryName, CountryValidationError, Station, StationId};
pub use repo::cancel::CancelToken;
pub use repo::station_repo::{RepoError, RepoResult, SqliteStationRepository, StationRepository};
pub use service::station_service::{ErrorKind, StationQueryService, StationServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
