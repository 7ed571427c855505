//! Station repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Look up stations by exact country match with a bound query parameter.
//! - Own the connection lifecycle: one read-only connection per attempt,
//!   released on every exit path.
//! - Absorb transient lock contention within a bounded retry budget.
//!
//! # Invariants
//! - Country text is only ever bound as `?1`, never spliced into SQL.
//! - Zero matching rows is `Ok(vec![])`, not an error.
//! - Rows are returned in the store's natural order (`rowid` ascending).
//! - Read paths reject invalid persisted state instead of masking it.

use super::cancel::CancelToken;
use super::retry::run_with_retry;
use crate::config::StoreConfig;
use crate::db::{open_db_read_only, DbError};
use crate::model::station::{Station, StationValidationError};
use log::{error, info};
use rusqlite::{Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Table holding station rows.
pub const STATIONS_TABLE: &str = "Stations";

/// Columns required for a full-row projection, in select order.
pub const STATION_COLUMNS: &[&str] = &[
    "StationId",
    "Name",
    "Country",
    "Latitude",
    "Longitude",
    "Elevation",
];

const STATION_BY_COUNTRY_SQL: &str = "SELECT
    StationId,
    Name,
    Country,
    Latitude,
    Longitude,
    Elevation
FROM Stations
WHERE Country = ?1
ORDER BY rowid ASC;";

// SQLite VM instructions between cancellation/timeout checks.
const PROGRESS_CHECK_OPS: i32 = 64;

pub type RepoResult<T> = Result<T, RepoError>;

/// Data-access failure for station lookups.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Transient failures persisted past the retry budget.
    RetriesExhausted {
        attempts: u32,
        source: DbError,
    },
    /// Statement ran longer than the configured query timeout.
    TimedOut,
    /// Caller cancelled the lookup.
    Cancelled,
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(StationValidationError),
}

impl RepoError {
    /// Stable metadata-only code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Db(err) => err.code(),
            Self::RetriesExhausted { .. } => "retries_exhausted",
            Self::TimedOut => "query_timeout",
            Self::Cancelled => "query_cancelled",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::MissingRequiredColumn { .. } => "missing_column",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::RetriesExhausted { attempts, source } => {
                write!(f, "station store still failing after {attempts} attempt(s): {source}")
            }
            Self::TimedOut => write!(f, "station query exceeded its timeout"),
            Self::Cancelled => write!(f, "station query was cancelled"),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
            Self::InvalidData(err) => write!(f, "invalid persisted station data: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::RetriesExhausted { source, .. } => Some(source),
            Self::InvalidData(err) => Some(err),
            Self::TimedOut
            | Self::Cancelled
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<StationValidationError> for RepoError {
    fn from(value: StationValidationError) -> Self {
        Self::InvalidData(value)
    }
}

/// Repository interface for station lookups.
pub trait StationRepository {
    /// Returns stations whose country equals `country` exactly.
    fn find_by_country(&self, country: &str) -> RepoResult<Vec<Station>> {
        self.find_by_country_cancellable(country, &CancelToken::new())
    }

    /// Same as `find_by_country`, aborting when `cancel` is signalled.
    fn find_by_country_cancellable(
        &self,
        country: &str,
        cancel: &CancelToken,
    ) -> RepoResult<Vec<Station>>;
}

/// SQLite-backed station repository.
///
/// Holds only immutable configuration; every lookup opens and drops its
/// own connection, so one instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct SqliteStationRepository {
    config: StoreConfig,
}

impl SqliteStationRepository {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn query_once(&self, country: &str, cancel: &CancelToken) -> RepoResult<Vec<Station>> {
        let conn = open_db_read_only(self.config.db_path(), self.config.busy_timeout())?;
        ensure_station_table_ready(&conn)?;
        let deadline = self
            .config
            .query_timeout()
            .map(|timeout| Instant::now() + timeout);
        select_with_abort(&conn, country, cancel, deadline)
    }
}

impl StationRepository for SqliteStationRepository {
    fn find_by_country_cancellable(
        &self,
        country: &str,
        cancel: &CancelToken,
    ) -> RepoResult<Vec<Station>> {
        let started_at = Instant::now();
        let result = run_with_retry(self.config.retry(), cancel, |_| {
            self.query_once(country, cancel)
        });

        match result {
            Ok(outcome) => {
                info!(
                    "event=station_query module=repo status=ok country_len={} rows={} attempts={} duration_ms={}",
                    country.chars().count(),
                    outcome.value.len(),
                    outcome.attempts,
                    started_at.elapsed().as_millis()
                );
                Ok(outcome.value)
            }
            Err(err) => {
                error!(
                    "event=station_query module=repo status=error country_len={} duration_ms={} error_code={}",
                    country.chars().count(),
                    started_at.elapsed().as_millis(),
                    err.code()
                );
                Err(err)
            }
        }
    }
}

/// Verifies the `Stations` table exposes every projected column.
pub fn ensure_station_table_ready(conn: &Connection) -> RepoResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([STATIONS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable(STATIONS_TABLE));
    }

    for required in STATION_COLUMNS {
        if !columns.iter().any(|name| name.eq_ignore_ascii_case(required)) {
            return Err(RepoError::MissingRequiredColumn {
                table: STATIONS_TABLE,
                column: required,
            });
        }
    }

    Ok(())
}

fn install_abort_handler(conn: &Connection, cancel: &CancelToken, deadline: Option<Instant>) {
    let cancelled = cancel.shared_flag();
    conn.progress_handler(
        PROGRESS_CHECK_OPS,
        Some(move || {
            cancelled.load(std::sync::atomic::Ordering::SeqCst)
                || deadline.is_some_and(|deadline| Instant::now() >= deadline)
        }),
    );
}

/// Runs the lookup statement, interrupting it once `cancel` fires or
/// `deadline` passes.
fn select_with_abort(
    conn: &Connection,
    country: &str,
    cancel: &CancelToken,
    deadline: Option<Instant>,
) -> RepoResult<Vec<Station>> {
    install_abort_handler(conn, cancel, deadline);

    match select_by_country(conn, country) {
        Err(RepoError::Db(err)) if err.is_interrupted() => {
            if cancel.is_cancelled() {
                Err(RepoError::Cancelled)
            } else {
                Err(RepoError::TimedOut)
            }
        }
        other => other,
    }
}

fn select_by_country(conn: &Connection, country: &str) -> RepoResult<Vec<Station>> {
    let mut stmt = conn.prepare(STATION_BY_COUNTRY_SQL)?;
    let mut rows = stmt.query([country])?;
    let mut stations = Vec::new();

    while let Some(row) = rows.next()? {
        stations.push(parse_station_row(row)?);
    }

    Ok(stations)
}

fn parse_station_row(row: &Row<'_>) -> RepoResult<Station> {
    let station = Station {
        station_id: row.get("StationId")?,
        name: row.get("Name")?,
        country: row.get("Country")?,
        latitude: row.get("Latitude")?,
        longitude: row.get("Longitude")?,
        elevation: row.get("Elevation")?,
    };
    station.validate()?;
    Ok(station)
}
