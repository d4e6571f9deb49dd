//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-collection data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repositories never validate field rules or hierarchy shape; the mutation
//!   engine does both before any write.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Every repository borrows a connection (or transaction) and never opens
//!   or commits one itself.

pub mod audit_repo;
pub mod author_repo;
pub mod book_author_repo;
pub mod book_repo;
pub mod category_repo;
pub mod error;
mod support;

pub use error::{RepoError, RepoResult};
