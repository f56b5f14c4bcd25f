//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file-backed SQLite connections.
//! - Configure the concurrency/durability pragmas required under test load.
//!
//! # Invariants
//! - Pragma failures are logged and never abort the open.
//! - Opening never creates or alters schema; see `schema::ensure_schema`.

use super::DbResult;
use log::{debug, error, warn};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Default wait before a locked write gives up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Per-connection tuning applied on every open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbOptions {
    /// How long a statement blocks on lock contention before failing.
    pub busy_timeout: Duration,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

/// Opens a SQLite database file and applies connection pragmas.
///
/// # Side effects
/// - Creates the file when it does not exist.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>, options: &DbOptions) -> DbResult<Connection> {
    let started_at = Instant::now();
    let path = path.as_ref();

    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error path={} duration_ms={} error_code=db_open_failed error={}",
                path.display(),
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    apply_pragmas(&conn, options);
    debug!(
        "event=db_open module=db status=ok path={} duration_ms={}",
        path.display(),
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

// Busy timeout goes first so the journal-mode switch itself waits out
// contention from concurrent opens.
fn apply_pragmas(conn: &Connection, options: &DbOptions) {
    if let Err(err) = conn.busy_timeout(options.busy_timeout) {
        warn!("event=db_pragma module=db status=error pragma=busy_timeout error={err}");
    }

    match conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
        row.get::<_, String>(0)
    }) {
        Ok(mode) if mode.eq_ignore_ascii_case("wal") => {}
        Ok(mode) => warn!(
            "event=db_pragma module=db status=degraded pragma=journal_mode requested=wal actual={mode}"
        ),
        Err(err) => warn!(
            "event=db_pragma module=db status=error pragma=journal_mode error={err}"
        ),
    }

    if let Err(err) = conn.pragma_update(None, "synchronous", "NORMAL") {
        warn!("event=db_pragma module=db status=error pragma=synchronous error={err}");
    }
}
