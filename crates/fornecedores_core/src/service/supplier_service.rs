//! Supplier use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for boundary callers (HTTP handlers).
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::supplier::{Supplier, SupplierDraft, SupplierId};
use crate::repo::supplier_repo::{RepoResult, SupplierRepository};

/// Use-case service wrapper for supplier CRUD operations.
#[derive(Debug, Clone)]
pub struct SupplierService<R: SupplierRepository> {
    repo: R,
}

impl<R: SupplierRepository> SupplierService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new supplier and returns it with store-assigned fields.
    pub async fn create_supplier(&self, draft: &SupplierDraft) -> RepoResult<Supplier> {
        self.repo.create(draft).await
    }

    /// Gets one supplier by id; `NotFound` when absent.
    pub async fn get_supplier(&self, id: SupplierId) -> RepoResult<Supplier> {
        self.repo.get_by_id(id).await
    }

    /// Lists all suppliers, newest first.
    pub async fn list_suppliers(&self) -> RepoResult<Vec<Supplier>> {
        self.repo.list_all().await
    }

    /// Replaces a supplier's mutable fields.
    ///
    /// Returns repository-level not-found, validation and conflict errors
    /// unchanged.
    pub async fn update_supplier(
        &self,
        id: SupplierId,
        draft: &SupplierDraft,
    ) -> RepoResult<Supplier> {
        self.repo.update(id, draft).await
    }

    /// Permanently removes a supplier.
    pub async fn delete_supplier(&self, id: SupplierId) -> RepoResult<()> {
        self.repo.delete(id).await
    }
}
