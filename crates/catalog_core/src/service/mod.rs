//! Service layer: use-case orchestration over repositories.
//!
//! # Responsibility
//! - Own transaction boundaries for catalog writes.
//! - Expose read-only audit and hierarchy queries.

pub mod audit_trail;
pub mod hierarchy_service;
pub mod mutation_engine;
