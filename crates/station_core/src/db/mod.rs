//! SQLite connection bootstrap for the station store.
//!
//! # Responsibility
//! - Open read-only SQLite connections scoped to a single lookup.
//! - Classify SQLite failures into transient vs permanent conditions.
//!
//! # Invariants
//! - Core code never opens the station store for writing.
//! - A connection returned by this module is owned by exactly one call.

use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;

pub use open::open_db_read_only;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The store file could not be opened or configured.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    Sqlite(rusqlite::Error),
}

impl DbError {
    /// Returns whether retrying the same operation may succeed.
    ///
    /// Busy/locked stores and open failures are treated as transient; the
    /// caller bounds how often they are retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Open { .. } => true,
            Self::Sqlite(err) => matches!(
                sqlite_error_code(err),
                Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen)
            ),
        }
    }

    /// Returns whether the statement was aborted through the progress handler.
    pub fn is_interrupted(&self) -> bool {
        match self {
            Self::Open { .. } => false,
            Self::Sqlite(err) => {
                matches!(sqlite_error_code(err), Some(ErrorCode::OperationInterrupted))
            }
        }
    }

    /// Returns whether the store reported lock contention.
    pub fn is_contention(&self) -> bool {
        match self {
            Self::Open { .. } => false,
            Self::Sqlite(err) => matches!(
                sqlite_error_code(err),
                Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            ),
        }
    }

    /// Stable metadata-only code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "db_open_failed",
            Self::Sqlite(_) if self.is_contention() => "db_busy",
            Self::Sqlite(_) if self.is_interrupted() => "db_interrupted",
            Self::Sqlite(_) => "db_query_failed",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "failed to open station store `{}`: {source}", path.display())
            }
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

fn sqlite_error_code(err: &rusqlite::Error) -> Option<ErrorCode> {
    match err {
        rusqlite::Error::SqliteFailure(inner, _) => Some(inner.code),
        _ => None,
    }
}
