//! Supplier domain model.
//!
//! # Responsibility
//! - Define the persisted supplier record and the caller-supplied draft used
//!   by create/update.
//! - Own input normalization and required-field validation.
//!
//! # Invariants
//! - `id`, `created_at` and `updated_at` are store-assigned; drafts never
//!   carry them.
//! - A valid draft has non-empty `name` and `email` after trimming.
//! - Blank optional text is normalized to `None`.
//!
//! # Wire format
//! JSON field names follow the table columns (`nome`, `telefone`, `endereco`,
//! `cnpj`, `ativo`). `ativo` is written as `0`/`1` and read from a boolean,
//! number or string (see `ActiveFlag`).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-generated supplier identifier (`INTEGER PRIMARY KEY AUTOINCREMENT`).
pub type SupplierId = i64;

/// A persisted supplier row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    #[serde(rename = "endereco")]
    pub address: Option<String>,
    /// Brazilian company tax id (CNPJ). Unique when present.
    #[serde(rename = "cnpj")]
    pub tax_id: Option<String>,
    #[serde(rename = "ativo", with = "active_flag")]
    pub active: bool,
    /// UTC, `YYYY-MM-DDTHH:MM:SS.sssZ`.
    pub created_at: String,
    /// UTC, `YYYY-MM-DDTHH:MM:SS.sssZ`. Strictly increases on every update.
    pub updated_at: String,
}

/// Mutable supplier fields, as supplied by a caller.
///
/// Update uses full-replace semantics: every field here overwrites the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub active: bool,
}

impl SupplierDraft {
    /// Creates an active draft with only the required fields set.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            address: None,
            tax_id: None,
            active: true,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Trims text fields and drops blank optional values.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: non_blank(self.phone),
            address: non_blank(self.address),
            tax_id: non_blank(self.tax_id),
            active: self.active,
        }
    }

    /// Validates required fields.
    ///
    /// # Errors
    /// - `MissingName` when `name` is blank.
    /// - `MissingEmail` when `email` is blank.
    pub fn validate(&self) -> Result<(), SupplierValidationError> {
        if self.name.trim().is_empty() {
            return Err(SupplierValidationError::MissingName);
        }
        if self.email.trim().is_empty() {
            return Err(SupplierValidationError::MissingEmail);
        }
        Ok(())
    }
}

/// Request body accepted by create/update before validation.
///
/// Every field is optional at this layer so that missing values surface as a
/// `SupplierValidationError` instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SupplierPayload {
    #[serde(default, rename = "nome")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "telefone")]
    pub phone: Option<String>,
    #[serde(default, rename = "endereco")]
    pub address: Option<String>,
    #[serde(default, rename = "cnpj")]
    pub tax_id: Option<String>,
    #[serde(default, rename = "ativo")]
    pub active: Option<ActiveFlag>,
}

impl SupplierPayload {
    /// Converts into a normalized, validated draft.
    ///
    /// A missing `ativo` defaults to active.
    pub fn into_draft(self) -> Result<SupplierDraft, SupplierValidationError> {
        let draft = SupplierDraft {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone,
            address: self.address,
            tax_id: self.tax_id,
            active: self.active.map_or(true, bool::from),
        }
        .normalized();
        draft.validate()?;
        Ok(draft)
    }
}

/// Boolean flag as sent by clients.
///
/// Browser forms and scripts send booleans, integers, floats or strings;
/// all are read with JavaScript truthiness (`0`, `0.0`, `NaN` and `""` are
/// false, any other string is true).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ActiveFlag {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<ActiveFlag> for bool {
    fn from(value: ActiveFlag) -> Self {
        match value {
            ActiveFlag::Bool(flag) => flag,
            ActiveFlag::Int(number) => number != 0,
            ActiveFlag::Float(number) => number != 0.0 && !number.is_nan(),
            ActiveFlag::Text(text) => !text.is_empty(),
        }
    }
}

/// Required-field failures detected before storage is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplierValidationError {
    MissingName,
    MissingEmail,
}

impl Display for SupplierValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "required field `nome` is missing or empty"),
            Self::MissingEmail => write!(f, "required field `email` is missing or empty"),
        }
    }
}

impl Error for SupplierValidationError {}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

mod active_flag {
    use super::ActiveFlag;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        ActiveFlag::deserialize(deserializer).map(bool::from)
    }
}
