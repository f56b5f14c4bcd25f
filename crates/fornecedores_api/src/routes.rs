//! Supplier and fixture HTTP handlers.
//!
//! # Responsibility
//! - Decode requests, call the supplier/fixture services and encode results.
//! - Emit one `event=... module=api` log line per handled request.
//!
//! # Invariants
//! - A path id that is not an integer is treated as an unknown supplier.
//! - Malformed bodies are rejected before any storage access.

use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use fornecedores_core::{Supplier, SupplierDraft, SupplierId, SupplierPayload};
use log::{debug, info};
use serde::Serialize;
use std::time::Instant;

pub const DELETED_MESSAGE: &str = "Fornecedor removido com sucesso";
pub const RESET_MESSAGE: &str = "Database resetado com sucesso";
pub const SEEDED_MESSAGE: &str = "Dados de teste inseridos com sucesso";

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SeedBody {
    pub message: &'static str,
    pub count: usize,
}

/// Supplier CRUD and fixture routes, unprefixed.
pub fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/fornecedores",
            get(list_suppliers).post(create_supplier),
        )
        .route(
            "/fornecedores/{id}",
            get(get_supplier)
                .put(update_supplier)
                .delete(delete_supplier),
        )
        .route("/reset-database", post(reset_database))
        .route("/seed-database", post(seed_database))
}

async fn list_suppliers(State(state): State<AppState>) -> Result<Json<Vec<Supplier>>, ApiError> {
    let started_at = Instant::now();
    let suppliers = state
        .suppliers
        .list_suppliers()
        .await
        .map_err(|err| ApiError::from_repo("supplier_list", err))?;
    info!(
        "event=supplier_list module=api status=ok count={} duration_ms={}",
        suppliers.len(),
        started_at.elapsed().as_millis()
    );
    Ok(Json(suppliers))
}

async fn get_supplier(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Supplier>, ApiError> {
    let id = parse_id("supplier_get", &raw_id)?;
    let supplier = state
        .suppliers
        .get_supplier(id)
        .await
        .map_err(|err| ApiError::from_repo("supplier_get", err))?;
    debug!("event=supplier_get module=api status=ok id={id}");
    Ok(Json(supplier))
}

async fn create_supplier(
    State(state): State<AppState>,
    payload: Result<Json<SupplierPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Supplier>), ApiError> {
    let started_at = Instant::now();
    let draft = parse_draft("supplier_create", payload)?;
    let created = state
        .suppliers
        .create_supplier(&draft)
        .await
        .map_err(|err| ApiError::from_repo("supplier_create", err))?;
    info!(
        "event=supplier_create module=api status=ok id={} duration_ms={}",
        created.id,
        started_at.elapsed().as_millis()
    );
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_supplier(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<SupplierPayload>, JsonRejection>,
) -> Result<Json<Supplier>, ApiError> {
    let started_at = Instant::now();
    let id = parse_id("supplier_update", &raw_id)?;
    let draft = parse_draft("supplier_update", payload)?;
    let updated = state
        .suppliers
        .update_supplier(id, &draft)
        .await
        .map_err(|err| ApiError::from_repo("supplier_update", err))?;
    info!(
        "event=supplier_update module=api status=ok id={id} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(Json(updated))
}

async fn delete_supplier(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = parse_id("supplier_delete", &raw_id)?;
    state
        .suppliers
        .delete_supplier(id)
        .await
        .map_err(|err| ApiError::from_repo("supplier_delete", err))?;
    info!("event=supplier_delete module=api status=ok id={id}");
    Ok(Json(MessageBody {
        message: DELETED_MESSAGE,
    }))
}

async fn reset_database(State(state): State<AppState>) -> Result<Json<MessageBody>, ApiError> {
    let cleared = state
        .fixtures
        .reset()
        .await
        .map_err(|err| ApiError::from_repo("fixture_reset", err))?;
    info!("event=fixture_reset module=api status=ok cleared={cleared}");
    Ok(Json(MessageBody {
        message: RESET_MESSAGE,
    }))
}

async fn seed_database(State(state): State<AppState>) -> Result<Json<SeedBody>, ApiError> {
    let report = state
        .fixtures
        .seed()
        .await
        .map_err(|err| ApiError::from_repo("fixture_seed", err))?;
    info!(
        "event=fixture_seed module=api status=ok inserted={}",
        report.inserted
    );
    Ok(Json(SeedBody {
        message: SEEDED_MESSAGE,
        count: report.inserted,
    }))
}

fn parse_id(event: &'static str, raw: &str) -> Result<SupplierId, ApiError> {
    raw.trim().parse::<SupplierId>().map_err(|_| {
        debug!("event={event} module=api status=rejected error_code=invalid_id");
        ApiError::NotFound
    })
}

fn parse_draft(
    event: &'static str,
    payload: Result<Json<SupplierPayload>, JsonRejection>,
) -> Result<SupplierDraft, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        debug!(
            "event={event} module=api status=rejected error_code=invalid_body error={}",
            rejection.body_text()
        );
        ApiError::InvalidBody
    })?;
    Ok(payload.into_draft()?)
}
