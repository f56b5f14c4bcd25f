//! Test-fixture operations: reset and seed.
//!
//! # Responsibility
//! - Bring the supplier table to a known state for automated test runs.
//!
//! # Invariants
//! - `seed` always starts from an empty table and inserts the same records in
//!   the same order.
//! - Neither operation is transactional: a failure mid-seed leaves the rows
//!   inserted so far. Recover by running `reset` then `seed` again.

use crate::model::supplier::SupplierDraft;
use crate::repo::supplier_repo::{RepoResult, SupplierRepository};
use log::info;

/// Result of a completed seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Rows removed by the preceding clear.
    pub cleared: usize,
    /// Rows inserted from the fixture list.
    pub inserted: usize,
}

/// Fixed sample suppliers inserted by `seed`.
pub fn seed_suppliers() -> Vec<SupplierDraft> {
    vec![
        SupplierDraft::new("Tech Solutions LTDA", "contato@techsolutions.com")
            .with_phone("(11) 99999-1111")
            .with_address("Rua das Flores, 123 - São Paulo, SP")
            .with_tax_id("12.345.678/0001-90"),
        SupplierDraft::new("Inovação Digital", "vendas@inovacao.com")
            .with_phone("(21) 88888-2222")
            .with_address("Av. Copacabana, 456 - Rio de Janeiro, RJ")
            .with_tax_id("98.765.432/0001-10"),
        SupplierDraft::new("Sistemas Avançados", "info@sistemasavancados.com")
            .with_phone("(31) 77777-3333")
            .with_address("Rua Ouro Preto, 789 - Belo Horizonte, MG")
            .with_tax_id("11.222.333/0001-44"),
    ]
}

/// Reset/seed entry points used by the test harness.
#[derive(Debug, Clone)]
pub struct FixtureService<R: SupplierRepository> {
    repo: R,
}

impl<R: SupplierRepository> FixtureService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Removes every supplier. Returns the number of removed rows.
    pub async fn reset(&self) -> RepoResult<usize> {
        let cleared = self.repo.clear().await?;
        info!("event=fixture_reset module=service status=ok cleared={cleared}");
        Ok(cleared)
    }

    /// Clears the table, then inserts `seed_suppliers()`.
    pub async fn seed(&self) -> RepoResult<SeedReport> {
        let cleared = self.repo.clear().await?;
        let inserted = self.repo.bulk_insert(&seed_suppliers()).await?;
        info!(
            "event=fixture_seed module=service status=ok cleared={cleared} inserted={inserted}"
        );
        Ok(SeedReport { cleared, inserted })
    }
}
