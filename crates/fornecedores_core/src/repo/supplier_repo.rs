//! Supplier repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/list/update/delete plus fixture clear/bulk-insert
//!   over the `fornecedores` table.
//! - Keep SQL details inside the persistence boundary.
//! - Translate unique-constraint failures into `RepoError::Conflict`.
//!
//! # Invariants
//! - Write paths normalize and validate drafts before any storage access.
//! - Each operation opens one scoped `DatastoreHandle` and releases it on
//!   every exit path.
//! - Multi-statement operations (insert + re-fetch, bulk insert) are not
//!   transactional; each statement commits on its own.

use crate::db::schema::SUPPLIER_TABLE;
use crate::db::{Datastore, DatastoreHandle, DbError};
use crate::model::supplier::{Supplier, SupplierDraft, SupplierId, SupplierValidationError};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::Row;
use std::error::Error;
use std::fmt::{Display, Formatter};

macro_rules! supplier_select {
    ($tail:literal) => {
        concat!(
            "SELECT
    id,
    nome,
    email,
    telefone,
    endereco,
    cnpj,
    ativo,
    created_at,
    updated_at
FROM fornecedores",
            $tail
        )
    };
}

const SELECT_BY_ID_SQL: &str = supplier_select!("\nWHERE id = ?1;");

const SELECT_ALL_SQL: &str = supplier_select!("\nORDER BY created_at DESC, id DESC;");

const INSERT_SQL: &str = "INSERT INTO fornecedores (
    nome,
    email,
    telefone,
    endereco,
    cnpj
) VALUES (?1, ?2, ?3, ?4, ?5);";

// `updated_at` moves to now, or 1ms past its previous value when the clock
// has not advanced, so it is strictly increasing per row.
const UPDATE_SQL: &str = "UPDATE fornecedores
SET
    nome = ?1,
    email = ?2,
    telefone = ?3,
    endereco = ?4,
    cnpj = ?5,
    ativo = ?6,
    updated_at = CASE
        WHEN strftime('%Y-%m-%dT%H:%M:%fZ', 'now') > updated_at
            THEN strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        ELSE strftime('%Y-%m-%dT%H:%M:%fZ', updated_at, '+0.001 seconds')
    END
WHERE id = ?7;";

const DELETE_SQL: &str = "DELETE FROM fornecedores WHERE id = ?1;";

const CLEAR_SQL: &str = "DELETE FROM fornecedores;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Column guarded by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    TaxId,
}

impl UniqueField {
    pub fn column(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::TaxId => "cnpj",
        }
    }

    /// Human-facing field label used in conflict messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::TaxId => "CNPJ",
        }
    }

    fn from_column(column: &str) -> Option<Self> {
        match column {
            "email" => Some(Self::Email),
            "cnpj" => Some(Self::TaxId),
            _ => None,
        }
    }
}

/// Repository error for supplier persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Required input missing; raised before storage is touched.
    Validation(SupplierValidationError),
    /// A unique column already holds this value on another row.
    Conflict(UniqueField),
    NotFound(SupplierId),
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict(field) => write!(f, "{} already in use", field.column()),
            Self::NotFound(id) => write!(f, "supplier not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Conflict(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<SupplierValidationError> for RepoError {
    fn from(value: SupplierValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        if let DbError::UniqueViolation { table, column } = &value {
            if table == SUPPLIER_TABLE {
                if let Some(field) = UniqueField::from_column(column) {
                    return Self::Conflict(field);
                }
            }
        }
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::from(DbError::from(value))
    }
}

/// Repository interface for supplier operations.
#[async_trait]
pub trait SupplierRepository: Send + Sync {
    /// Inserts a supplier and returns the stored row. `active` always starts
    /// as the store default (`true`).
    async fn create(&self, draft: &SupplierDraft) -> RepoResult<Supplier>;
    async fn get_by_id(&self, id: SupplierId) -> RepoResult<Supplier>;
    /// Returns every supplier, most recently created first.
    async fn list_all(&self) -> RepoResult<Vec<Supplier>>;
    /// Replaces every mutable field and refreshes `updated_at`.
    async fn update(&self, id: SupplierId, draft: &SupplierDraft) -> RepoResult<Supplier>;
    async fn delete(&self, id: SupplierId) -> RepoResult<()>;
    /// Removes all suppliers. Returns the number of removed rows.
    async fn clear(&self) -> RepoResult<usize>;
    /// Inserts drafts in order; stops at the first failure without undoing
    /// earlier inserts. Returns the number of inserted rows.
    async fn bulk_insert(&self, drafts: &[SupplierDraft]) -> RepoResult<usize>;
}

/// SQLite-backed supplier repository.
#[derive(Debug, Clone)]
pub struct SqliteSupplierRepository {
    datastore: Datastore,
}

impl SqliteSupplierRepository {
    pub fn new(datastore: Datastore) -> Self {
        Self { datastore }
    }
}

#[async_trait]
impl SupplierRepository for SqliteSupplierRepository {
    async fn create(&self, draft: &SupplierDraft) -> RepoResult<Supplier> {
        let draft = prepare_draft(draft)?;

        let handle = self.datastore.open().await?;
        let result = insert_and_fetch(&handle, &draft).await;
        handle.release().await;
        result
    }

    async fn get_by_id(&self, id: SupplierId) -> RepoResult<Supplier> {
        let handle = self.datastore.open().await?;
        let result = fetch_required(&handle, id).await;
        handle.release().await;
        result
    }

    async fn list_all(&self) -> RepoResult<Vec<Supplier>> {
        let handle = self.datastore.open().await?;
        let result = handle
            .fetch_many(SELECT_ALL_SQL, Vec::new(), parse_supplier_row)
            .await
            .map_err(RepoError::from);
        handle.release().await;
        result
    }

    async fn update(&self, id: SupplierId, draft: &SupplierDraft) -> RepoResult<Supplier> {
        let draft = prepare_draft(draft)?;

        let handle = self.datastore.open().await?;
        let result = update_and_fetch(&handle, id, &draft).await;
        handle.release().await;
        result
    }

    async fn delete(&self, id: SupplierId) -> RepoResult<()> {
        let handle = self.datastore.open().await?;
        let result = handle.execute(DELETE_SQL, vec![Value::Integer(id)]).await;
        handle.release().await;

        if result?.changes == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    async fn clear(&self) -> RepoResult<usize> {
        let handle = self.datastore.open().await?;
        let result = handle.execute(CLEAR_SQL, Vec::new()).await;
        handle.release().await;
        Ok(result?.changes)
    }

    async fn bulk_insert(&self, drafts: &[SupplierDraft]) -> RepoResult<usize> {
        let drafts = drafts
            .iter()
            .map(prepare_draft)
            .collect::<RepoResult<Vec<_>>>()?;

        let handle = self.datastore.open().await?;
        let result = insert_all(&handle, &drafts).await;
        handle.release().await;
        result
    }
}

fn prepare_draft(draft: &SupplierDraft) -> RepoResult<SupplierDraft> {
    let draft = draft.clone().normalized();
    draft.validate()?;
    Ok(draft)
}

async fn insert_and_fetch(handle: &DatastoreHandle, draft: &SupplierDraft) -> RepoResult<Supplier> {
    let outcome = handle.execute(INSERT_SQL, insert_params(draft)).await?;
    let id = outcome.last_insert_id;
    handle
        .fetch_one(SELECT_BY_ID_SQL, vec![Value::Integer(id)], parse_supplier_row)
        .await?
        .ok_or(RepoError::Db(DbError::MissingAfterWrite {
            table: SUPPLIER_TABLE,
            id,
        }))
}

async fn update_and_fetch(
    handle: &DatastoreHandle,
    id: SupplierId,
    draft: &SupplierDraft,
) -> RepoResult<Supplier> {
    let mut params = insert_params(draft);
    params.push(Value::Integer(bool_to_int(draft.active)));
    params.push(Value::Integer(id));

    let outcome = handle.execute(UPDATE_SQL, params).await?;
    if outcome.changes == 0 {
        return Err(RepoError::NotFound(id));
    }
    fetch_required(handle, id).await
}

async fn insert_all(handle: &DatastoreHandle, drafts: &[SupplierDraft]) -> RepoResult<usize> {
    let mut inserted = 0;
    for draft in drafts {
        handle.execute(INSERT_SQL, insert_params(draft)).await?;
        inserted += 1;
    }
    Ok(inserted)
}

async fn fetch_required(handle: &DatastoreHandle, id: SupplierId) -> RepoResult<Supplier> {
    handle
        .fetch_one(SELECT_BY_ID_SQL, vec![Value::Integer(id)], parse_supplier_row)
        .await?
        .ok_or(RepoError::NotFound(id))
}

fn insert_params(draft: &SupplierDraft) -> Vec<Value> {
    vec![
        Value::Text(draft.name.clone()),
        Value::Text(draft.email.clone()),
        optional_text(draft.phone.as_deref()),
        optional_text(draft.address.as_deref()),
        optional_text(draft.tax_id.as_deref()),
    ]
}

fn parse_supplier_row(row: &Row<'_>) -> rusqlite::Result<Supplier> {
    Ok(Supplier {
        id: row.get("id")?,
        name: row.get("nome")?,
        email: row.get("email")?,
        phone: row.get("telefone")?,
        address: row.get("endereco")?,
        tax_id: row.get("cnpj")?,
        active: row.get::<_, i64>("ativo")? != 0,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_string()))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
