//! SQLite storage bootstrap, scoped handles and schema entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for supplier storage.
//! - Expose async execute/fetch primitives over one scoped connection.
//! - Translate raw driver failures into typed storage errors.
//!
//! # Invariants
//! - Every connection gets WAL, busy-timeout and `synchronous=NORMAL` applied
//!   before first use (best-effort).
//! - Unique-constraint failures surface as `DbError::UniqueViolation`, never as
//!   free-text driver errors.

use rusqlite::ffi;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod handle;
mod open;
pub mod schema;

pub use handle::{Datastore, DatastoreHandle, ExecOutcome};
pub use open::{open_db, DbOptions, DEFAULT_BUSY_TIMEOUT};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A write collided with a `UNIQUE` constraint on `table.column`.
    UniqueViolation {
        table: String,
        column: String,
    },
    /// Lock contention outlasted the busy timeout.
    Busy(rusqlite::Error),
    /// The handle was used after `close()`.
    Closed,
    /// A write reported success but its row could not be read back.
    MissingAfterWrite {
        table: &'static str,
        id: i64,
    },
    /// The blocking worker running the statement panicked or was cancelled.
    TaskJoin(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UniqueViolation { table, column } => {
                write!(f, "unique constraint failed: {table}.{column}")
            }
            Self::Busy(err) => write!(f, "database busy: {err}"),
            Self::Closed => write!(f, "datastore handle already closed"),
            Self::MissingAfterWrite { table, id } => {
                write!(f, "row `{table}` id={id} missing right after write")
            }
            Self::TaskJoin(message) => write!(f, "storage worker failed: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Busy(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        let rusqlite::Error::SqliteFailure(failure, message) = &value else {
            return Self::Sqlite(value);
        };

        if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE {
            if let Some((table, column)) = message.as_deref().and_then(parse_unique_target) {
                return Self::UniqueViolation { table, column };
            }
        }

        match failure.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => Self::Busy(value),
            _ => Self::Sqlite(value),
        }
    }
}

/// Extracts the first `table.column` pair from SQLite's
/// `UNIQUE constraint failed: t.a, t.b` message.
fn parse_unique_target(message: &str) -> Option<(String, String)> {
    let targets = message.strip_prefix("UNIQUE constraint failed:")?;
    let first = targets.split(',').next()?.trim();
    let (table, column) = first.split_once('.')?;
    Some((table.to_string(), column.to_string()))
}
