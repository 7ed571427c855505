//! Station lookup use-case service.
//!
//! # Responsibility
//! - Validate and normalize caller-supplied country names.
//! - Delegate lookups to a `StationRepository`.
//! - Classify failures into caller-safe error kinds.
//!
//! # Invariants
//! - Invalid input never reaches the repository.
//! - Repository failures are propagated unchanged; no retry at this layer.
//! - Error kinds never carry raw store error text.

use crate::db::DbError;
use crate::model::station::{CountryName, CountryValidationError, Station};
use crate::repo::cancel::CancelToken;
use crate::repo::station_repo::{RepoError, StationRepository};
use log::{debug, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-visible classification of a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidCountry,
    StoreUnavailable,
    StoreBusy,
    QueryFailed,
    QueryTimeout,
    QueryCancelled,
    InvalidData,
}

impl ErrorKind {
    /// Stable snake_case identifier, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCountry => "invalid_country",
            Self::StoreUnavailable => "store_unavailable",
            Self::StoreBusy => "store_busy",
            Self::QueryFailed => "query_failed",
            Self::QueryTimeout => "query_timeout",
            Self::QueryCancelled => "query_cancelled",
            Self::InvalidData => "invalid_data",
        }
    }

    /// HTTP status a request boundary should answer with.
    ///
    /// - validation failures -> `400`
    /// - data-access failures -> `500`
    pub fn status_code(self) -> u16 {
        match self {
            Self::InvalidCountry => 400,
            _ => 500,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service error for station lookups.
#[derive(Debug)]
pub enum StationServiceError {
    /// Caller input rejected before any store access.
    Validation(CountryValidationError),
    /// Repository failure, unchanged.
    DataAccess(RepoError),
}

impl StationServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::InvalidCountry,
            Self::DataAccess(err) => classify_repo_error(err),
        }
    }
}

impl Display for StationServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DataAccess(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StationServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::DataAccess(err) => Some(err),
        }
    }
}

impl From<CountryValidationError> for StationServiceError {
    fn from(value: CountryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StationServiceError {
    fn from(value: RepoError) -> Self {
        Self::DataAccess(value)
    }
}

/// Station lookup facade over repository implementations.
pub struct StationQueryService<R: StationRepository> {
    repo: R,
}

impl<R: StationRepository> StationQueryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns stations located in `raw_country`.
    ///
    /// # Contract
    /// - Surrounding whitespace is trimmed; casing is preserved.
    /// - Empty/whitespace-only input fails with `Validation`.
    /// - No match is `Ok(vec![])`.
    pub fn find_by_country(&self, raw_country: &str) -> Result<Vec<Station>, StationServiceError> {
        self.find_by_country_cancellable(raw_country, &CancelToken::new())
    }

    /// Same as `find_by_country`, aborting when `cancel` is signalled.
    pub fn find_by_country_cancellable(
        &self,
        raw_country: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<Station>, StationServiceError> {
        let country = CountryName::parse(raw_country).map_err(|err| {
            warn!("event=station_lookup module=service status=rejected error_code=invalid_country");
            err
        })?;

        debug!(
            "event=station_lookup module=service status=start country_len={}",
            country.char_len()
        );
        Ok(self
            .repo
            .find_by_country_cancellable(country.as_str(), cancel)?)
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }
}

fn classify_repo_error(err: &RepoError) -> ErrorKind {
    match err {
        RepoError::Db(db_err) | RepoError::RetriesExhausted { source: db_err, .. } => {
            classify_db_error(db_err)
        }
        RepoError::TimedOut => ErrorKind::QueryTimeout,
        RepoError::Cancelled => ErrorKind::QueryCancelled,
        RepoError::MissingRequiredTable(_) | RepoError::MissingRequiredColumn { .. } => {
            ErrorKind::QueryFailed
        }
        RepoError::InvalidData(_) => ErrorKind::InvalidData,
    }
}

fn classify_db_error(err: &DbError) -> ErrorKind {
    match err {
        DbError::Open { .. } => ErrorKind::StoreUnavailable,
        DbError::Sqlite(_) if err.is_contention() => ErrorKind::StoreBusy,
        DbError::Sqlite(_) if err.is_transient() => ErrorKind::StoreUnavailable,
        DbError::Sqlite(_) => ErrorKind::QueryFailed,
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, StationQueryService, StationServiceError};
    use crate::db::DbError;
    use crate::model::station::{CountryValidationError, Station};
    use crate::repo::cancel::CancelToken;
    use crate::repo::station_repo::{RepoError, RepoResult, StationRepository};
    use rusqlite::ffi;
    use std::cell::RefCell;
    use std::path::PathBuf;

    struct FakeRepository {
        calls: RefCell<Vec<String>>,
        fail_with: Option<fn() -> RepoError>,
    }

    impl FakeRepository {
        fn ok() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_with: None,
            }
        }

        fn failing(make: fn() -> RepoError) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_with: Some(make),
            }
        }
    }

    impl StationRepository for FakeRepository {
        fn find_by_country_cancellable(
            &self,
            country: &str,
            _cancel: &CancelToken,
        ) -> RepoResult<Vec<Station>> {
            self.calls.borrow_mut().push(country.to_string());
            if let Some(make) = self.fail_with {
                return Err(make());
            }
            Ok(vec![Station {
                station_id: 1,
                name: "Boulder".to_string(),
                country: country.to_string(),
                latitude: 40.0,
                longitude: -105.3,
                elevation: Some(1655.0),
            }])
        }
    }

    fn busy_exhausted() -> RepoError {
        RepoError::RetriesExhausted {
            attempts: 3,
            source: DbError::Sqlite(rusqlite::Error::SqliteFailure(
                ffi::Error::new(ffi::SQLITE_BUSY),
                None,
            )),
        }
    }

    fn open_exhausted() -> RepoError {
        RepoError::RetriesExhausted {
            attempts: 3,
            source: DbError::Open {
                path: PathBuf::from("/missing/stations.db"),
                source: rusqlite::Error::SqliteFailure(ffi::Error::new(ffi::SQLITE_CANTOPEN), None),
            },
        }
    }

    #[test]
    fn blank_input_never_reaches_repository() {
        let service = StationQueryService::new(FakeRepository::ok());
        for raw in ["", "   ", "\t\n"] {
            let err = service.find_by_country(raw).unwrap_err();
            assert!(matches!(
                err,
                StationServiceError::Validation(CountryValidationError::Empty)
            ));
            assert_eq!(err.kind(), ErrorKind::InvalidCountry);
            assert_eq!(err.kind().status_code(), 400);
        }
        assert!(service.repository().calls.borrow().is_empty());
    }

    #[test]
    fn input_is_trimmed_but_case_is_kept() {
        let service = StationQueryService::new(FakeRepository::ok());
        let stations = service.find_by_country("  new Zealand ").unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(
            *service.repository().calls.borrow(),
            vec!["new Zealand".to_string()]
        );
    }

    #[test]
    fn repository_failures_propagate_unchanged_without_retry() {
        let service = StationQueryService::new(FakeRepository::failing(busy_exhausted));
        let err = service.find_by_country("USA").unwrap_err();
        assert!(matches!(
            err,
            StationServiceError::DataAccess(RepoError::RetriesExhausted { attempts: 3, .. })
        ));
        assert_eq!(err.kind(), ErrorKind::StoreBusy);
        assert_eq!(err.kind().status_code(), 500);
        assert_eq!(service.repository().calls.borrow().len(), 1);
    }

    fn timed_out() -> RepoError {
        RepoError::TimedOut
    }

    fn cancelled() -> RepoError {
        RepoError::Cancelled
    }

    fn missing_table() -> RepoError {
        RepoError::MissingRequiredTable("Stations")
    }

    fn syntax_error() -> RepoError {
        RepoError::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_ERROR),
            None,
        )))
    }

    #[test]
    fn error_kinds_cover_data_access_variants() {
        let cases: [(fn() -> RepoError, ErrorKind); 5] = [
            (open_exhausted, ErrorKind::StoreUnavailable),
            (timed_out, ErrorKind::QueryTimeout),
            (cancelled, ErrorKind::QueryCancelled),
            (missing_table, ErrorKind::QueryFailed),
            (syntax_error, ErrorKind::QueryFailed),
        ];

        for (make, expected) in cases {
            let err = StationServiceError::DataAccess(make());
            assert_eq!(err.kind(), expected);
            assert_eq!(err.kind().status_code(), 500);
        }
    }

    #[test]
    fn error_kind_serializes_as_snake_case() {
        let json = serde_json::to_value(ErrorKind::QueryTimeout).unwrap();
        assert_eq!(json, "query_timeout");
        assert_eq!(ErrorKind::QueryTimeout.to_string(), "query_timeout");
    }
}
