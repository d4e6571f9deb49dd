//! Core data-management logic for the library catalog.
//! This crate is the single source of truth for catalog invariants:
//! category acyclicity, atomic deletion cascades and the audit trail.

pub mod db;
pub mod hierarchy;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use db::{open_db, open_db_in_memory, open_db_with_options, DbError, DbOptions};
pub use hierarchy::{CategoryForest, HierarchyError, HierarchyResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::audit::{AuditAction, AuditLog, AuditLogId, AuditSnapshot, EntityType};
pub use model::author::{Author, AuthorId};
pub use model::book::{Book, BookAuthor, BookAuthorId, BookId, BookStatus};
pub use model::category::{Category, CategoryId};
pub use repo::audit_repo::{AuditListQuery, AuditRepository, SqliteAuditRepository};
pub use repo::author_repo::{AuthorListQuery, AuthorRepository, SqliteAuthorRepository};
pub use repo::book_author_repo::{BookAuthorRepository, SqliteBookAuthorRepository};
pub use repo::book_repo::{BookListQuery, BookRepository, SqliteBookRepository};
pub use repo::category_repo::{CategoryListQuery, CategoryRepository, SqliteCategoryRepository};
pub use repo::{RepoError, RepoResult};
pub use service::audit_trail::AuditTrail;
pub use service::hierarchy_service::HierarchyService;
pub use service::mutation_engine::{
    CategoryDeleteReport, MutationEngine, MutationError, MutationResult,
};
pub use validation::{CatalogRules, Candidate, ValidationGate, ValidationOutcome};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
