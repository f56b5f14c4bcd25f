//! HTTP error mapping.
//!
//! # Responsibility
//! - Turn repository and request-parsing failures into status codes and
//!   `{ "error": "<message>" }` bodies.
//!
//! # Invariants
//! - Storage failures never leak driver text to clients; details go to logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fornecedores_core::{RepoError, SupplierValidationError, UniqueField};
use log::{error, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const NOT_FOUND_MESSAGE: &str = "Fornecedor não encontrado";
pub const REQUIRED_FIELDS_MESSAGE: &str = "Nome e email são obrigatórios";
pub const INVALID_BODY_MESSAGE: &str = "Corpo da requisição inválido";
pub const INTERNAL_ERROR_MESSAGE: &str = "Erro interno do servidor";

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Client-visible failure of one request.
#[derive(Debug)]
pub enum ApiError {
    Validation(SupplierValidationError),
    Conflict(UniqueField),
    NotFound,
    /// Body was not JSON or did not match the expected shape.
    InvalidBody,
    Internal,
}

impl ApiError {
    /// Maps a repository failure and logs it under `event`.
    ///
    /// Expected outcomes log at `warn`; storage failures log at `error` with
    /// the full cause chain.
    pub fn from_repo(event: &'static str, err: RepoError) -> Self {
        match err {
            RepoError::Validation(inner) => {
                warn!("event={event} module=api status=rejected error_code=validation error={inner}");
                Self::Validation(inner)
            }
            RepoError::Conflict(field) => {
                warn!(
                    "event={event} module=api status=rejected error_code=conflict field={}",
                    field.column()
                );
                Self::Conflict(field)
            }
            RepoError::NotFound(id) => {
                warn!("event={event} module=api status=rejected error_code=not_found id={id}");
                Self::NotFound
            }
            RepoError::Db(inner) => {
                let cause = inner
                    .source()
                    .map(|source| source.to_string())
                    .unwrap_or_else(|| "none".to_string());
                error!(
                    "event={event} module=api status=error error_code=storage error={inner} cause={cause}"
                );
                Self::Internal
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) | Self::InvalidBody => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Validation(_) => REQUIRED_FIELDS_MESSAGE.to_string(),
            Self::Conflict(field) => format!("{} já está em uso", field.label()),
            Self::NotFound => NOT_FOUND_MESSAGE.to_string(),
            Self::InvalidBody => INVALID_BODY_MESSAGE.to_string(),
            Self::Internal => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status().as_u16(), self.message())
    }
}

impl Error for ApiError {}

impl From<SupplierValidationError> for ApiError {
    fn from(value: SupplierValidationError) -> Self {
        Self::Validation(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
