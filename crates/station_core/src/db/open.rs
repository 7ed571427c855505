//! Read-only connection bootstrap for the station store.
//!
//! # Invariants
//! - Returned connections are opened with `SQLITE_OPEN_READ_ONLY` and run
//!   with `query_only=ON`.
//! - A missing store file is an open failure; it is never created.

use super::{DbError, DbResult};
use log::{debug, warn};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the station store read-only and applies per-connection settings.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_read_only(path: impl AsRef<Path>, busy_timeout: Duration) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    debug!("event=db_open module=db status=start mode=read_only");

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_NO_MUTEX
        | OpenFlags::SQLITE_OPEN_URI;
    let conn = match Connection::open_with_flags(path, flags) {
        Ok(conn) => conn,
        Err(err) => {
            warn!(
                "event=db_open module=db status=error mode=read_only duration_ms={} error_code=db_open_failed",
                started_at.elapsed().as_millis()
            );
            return Err(DbError::Open {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };

    if let Err(err) = configure_connection(&conn, busy_timeout) {
        warn!(
            "event=db_open module=db status=error mode=read_only duration_ms={} error_code=db_configure_failed",
            started_at.elapsed().as_millis()
        );
        return Err(DbError::Sqlite(err));
    }

    debug!(
        "event=db_open module=db status=ok mode=read_only duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn configure_connection(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA query_only = ON;")?;
    Ok(())
}
