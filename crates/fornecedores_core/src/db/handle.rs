//! Async datastore access over short-lived SQLite connections.
//!
//! # Responsibility
//! - `Datastore` is the injectable factory: it knows the file and the pragma
//!   options, and opens one `DatastoreHandle` per logical operation.
//! - `DatastoreHandle` owns exactly one connection and runs each statement on
//!   the blocking pool, so callers suspend only at storage I/O.
//!
//! # Invariants
//! - A handle never outlives the operation that opened it; `close()` is the
//!   normal release path and dropping the last clone releases it otherwise.
//! - Statements issued through one handle run sequentially, never in parallel.

use super::open::{open_db, DbOptions};
use super::{DbError, DbResult};
use log::warn;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Outcome of a mutating statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Rows inserted, updated or deleted.
    pub changes: usize,
    /// Rowid of the most recent successful insert on this connection.
    pub last_insert_id: i64,
}

/// Connection factory for one SQLite file.
#[derive(Debug, Clone)]
pub struct Datastore {
    path: Arc<PathBuf>,
    options: DbOptions,
}

impl Datastore {
    pub fn new(path: impl Into<PathBuf>, options: DbOptions) -> Self {
        Self {
            path: Arc::new(path.into()),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub fn options(&self) -> DbOptions {
        self.options
    }

    /// Opens a fresh connection with pragmas applied.
    pub async fn open(&self) -> DbResult<DatastoreHandle> {
        let path = Arc::clone(&self.path);
        let options = self.options;
        let conn = run_blocking(move || open_db(path.as_path(), &options)).await?;
        Ok(DatastoreHandle {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Opens a connection, runs `f` against it on the blocking pool, then
    /// closes it. Used for bootstrap work that is not statement-shaped.
    pub async fn with_connection<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let handle = self.open().await?;
        let result = handle.with_conn(f).await;
        handle.release().await;
        result
    }
}

/// One open connection, scoped to a single repository operation.
#[derive(Debug, Clone)]
pub struct DatastoreHandle {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl DatastoreHandle {
    /// Runs a mutating statement.
    pub async fn execute(&self, sql: &'static str, params: Vec<Value>) -> DbResult<ExecOutcome> {
        self.with_conn(move |conn| {
            let changes = conn.execute(sql, params_from_iter(params))?;
            Ok(ExecOutcome {
                changes,
                last_insert_id: conn.last_insert_rowid(),
            })
        })
        .await
    }

    /// Runs a read expected to match zero or one row.
    pub async fn fetch_one<T, F>(
        &self,
        sql: &'static str,
        params: Vec<Value>,
        map: F,
    ) -> DbResult<Option<T>>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.with_conn(move |conn| {
            let row = conn
                .query_row(sql, params_from_iter(params), map)
                .optional()?;
            Ok(row)
        })
        .await
    }

    /// Runs a read and collects every row.
    pub async fn fetch_many<T, F>(
        &self,
        sql: &'static str,
        params: Vec<Value>,
        mut map: F,
    ) -> DbResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(sql)?;
            let mut rows = stmt.query(params_from_iter(params))?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(map(row)?);
            }
            Ok(items)
        })
        .await
    }

    /// Releases the connection. Later calls on any clone fail with `Closed`.
    pub async fn close(&self) -> DbResult<()> {
        let conn = Arc::clone(&self.conn);
        run_blocking(move || {
            let Some(conn) = conn.blocking_lock().take() else {
                return Ok(());
            };
            conn.close().map_err(|(_, err)| DbError::from(err))
        })
        .await
    }

    /// Closes the handle, logging instead of returning a close failure.
    ///
    /// The connection is gone either way; a failed close must not mask the
    /// result of the operation that used it.
    pub async fn release(&self) {
        if let Err(err) = self.close().await {
            warn!("event=db_close module=db status=error error={err}");
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.conn.lock().await.is_none()
    }

    async fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        run_blocking(move || {
            let guard = conn.blocking_lock();
            let conn = guard.as_ref().ok_or(DbError::Closed)?;
            f(conn)
        })
        .await
    }
}

async fn run_blocking<F, T>(f: F) -> DbResult<T>
where
    F: FnOnce() -> DbResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| DbError::TaskJoin(err.to_string()))?
}
