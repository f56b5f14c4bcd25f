//! Supplier domain model.
//!
//! # Responsibility
//! - Define the single business entity managed by the registry.
//!
//! # Invariants
//! - Deletion is physical; `active` is a business flag, not a tombstone.

pub mod supplier;
