//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the HTTP/CLI layers decoupled from storage details.

pub mod fixture_service;
pub mod supplier_service;
