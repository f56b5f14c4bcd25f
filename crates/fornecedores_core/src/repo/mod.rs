//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `SupplierDraft::validate()` before
//!   persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to storage errors.

pub mod supplier_repo;
