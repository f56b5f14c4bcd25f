//! Supplier table layout.
//!
//! # Responsibility
//! - Create the `fornecedores` table on first setup.
//! - Verify an existing file exposes the layout the service and external
//!   inspection tools depend on.
//!
//! # Invariants
//! - Column names and constraints are stable: external test tooling queries
//!   this table directly.
//! - `id` uses `AUTOINCREMENT`, so ids are never reused after deletion.

use super::{Datastore, DbError, DbResult};
use log::info;
use rusqlite::Connection;
use std::time::Instant;

pub const SUPPLIER_TABLE: &str = "fornecedores";

pub const SUPPLIER_COLUMNS: &[&str] = &[
    "id",
    "nome",
    "email",
    "telefone",
    "endereco",
    "cnpj",
    "ativo",
    "created_at",
    "updated_at",
];

const CREATE_SUPPLIERS_SQL: &str = "CREATE TABLE IF NOT EXISTS fornecedores (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nome TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    telefone TEXT,
    endereco TEXT,
    cnpj TEXT UNIQUE,
    ativo BOOLEAN NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);";

/// Creates and verifies the supplier table over a scoped connection.
///
/// Run once at process start (`setup`); request paths assume the table exists.
pub async fn setup(datastore: &Datastore) -> DbResult<()> {
    let started_at = Instant::now();
    datastore
        .with_connection(|conn| {
            ensure_schema(conn)?;
            verify_schema(conn)
        })
        .await?;
    info!(
        "event=db_setup module=db status=ok path={} duration_ms={}",
        datastore.path().display(),
        started_at.elapsed().as_millis()
    );
    Ok(())
}

/// Creates the supplier table when absent. Safe to call repeatedly.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(CREATE_SUPPLIERS_SQL)?;
    Ok(())
}

/// Fails when the supplier table or any of its columns is missing.
pub fn verify_schema(conn: &Connection) -> DbResult<()> {
    if !table_exists(conn, SUPPLIER_TABLE)? {
        return Err(DbError::MissingRequiredTable(SUPPLIER_TABLE));
    }

    for column in SUPPLIER_COLUMNS {
        if !table_has_column(conn, SUPPLIER_TABLE, column)? {
            return Err(DbError::MissingRequiredColumn {
                table: SUPPLIER_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
