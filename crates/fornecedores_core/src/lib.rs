//! Core domain logic for the supplier registry.
//! This crate is the single source of truth for supplier invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{Datastore, DatastoreHandle, DbError, DbOptions, DbResult, ExecOutcome};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::supplier::{
    ActiveFlag, Supplier, SupplierDraft, SupplierId, SupplierPayload, SupplierValidationError,
};
pub use repo::supplier_repo::{
    RepoError, RepoResult, SqliteSupplierRepository, SupplierRepository, UniqueField,
};
pub use service::fixture_service::{seed_suppliers, FixtureService, SeedReport};
pub use service::supplier_service::SupplierService;
