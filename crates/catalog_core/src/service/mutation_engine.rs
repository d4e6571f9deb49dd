//! Transactional mutation engine.
//!
//! # Responsibility
//! - Run every catalog write as one all-or-nothing store transaction.
//! - Enforce field rules (via the validation gate), referential checks,
//!   uniqueness, category acyclicity and the category-deletion cascade.
//! - Append exactly one audit entry per successful mutation, inside the same
//!   transaction as the writes it describes.
//!
//! # Invariants
//! - Each public call opens a `BEGIN IMMEDIATE` transaction and commits or
//!   rolls it back before returning. A dropped transaction rolls back.
//! - A rejected call leaves the store byte-for-byte unchanged.
//! - Lock timeouts surface as [`MutationError::StoreUnavailable`].

use crate::db::DbError;
use crate::hierarchy::{parent_walk, CategoryForest};
use crate::model::audit::{AuditAction, AuditSnapshot, EntityType, NewAuditEntry};
use crate::model::author::{Author, AuthorId};
use crate::model::book::{Book, BookAuthor, BookAuthorId, BookId, BookStatus};
use crate::model::category::{Category, CategoryId};
use crate::model::now_epoch_ms;
use crate::repo::audit_repo::{AuditRepository, SqliteAuditRepository};
use crate::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use crate::repo::book_author_repo::{BookAuthorRepository, SqliteBookAuthorRepository};
use crate::repo::book_repo::{BookRepository, SqliteBookRepository};
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::{RepoError, RepoResult};
use crate::validation::{CatalogRules, Candidate, ValidationGate};
use log::{debug, error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

pub type MutationResult<T> = Result<T, MutationError>;

/// Typed failure of one mutation call.
#[derive(Debug)]
pub enum MutationError {
    /// Candidate record failed the validation gate.
    Validation { kind: EntityType, reason: String },
    /// Referenced entity is absent or soft-deleted.
    NotFound { kind: EntityType, id: Uuid },
    /// No link exists between the book and the author.
    LinkNotFound { book_id: BookId, author_id: AuthorId },
    /// A record with this id already exists.
    DuplicateId { kind: EntityType, id: Uuid },
    /// Another active book already uses this physical id.
    DuplicatePhysicalId(String),
    /// The book and author are already linked.
    DuplicateLink { book_id: BookId, author_id: AuthorId },
    /// Re-parenting would make the category its own ancestor.
    Cycle {
        category_id: CategoryId,
        parent_id: CategoryId,
    },
    /// Domain policy blocks the operation.
    BusinessRule(String),
    /// Store lock could not be acquired in time; safe to retry.
    StoreUnavailable(DbError),
    /// Any other repository failure.
    Repo(RepoError),
    /// Audit snapshot serialization failed.
    Snapshot(serde_json::Error),
}

impl MutationError {
    /// Stable machine-readable code for logs and callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::LinkNotFound { .. } => "link_not_found",
            Self::DuplicateId { .. } => "duplicate_id",
            Self::DuplicatePhysicalId(_) => "duplicate_physical_id",
            Self::DuplicateLink { .. } => "duplicate_link",
            Self::Cycle { .. } => "cycle_detected",
            Self::BusinessRule(_) => "business_rule_violation",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Repo(_) => "repo_failure",
            Self::Snapshot(_) => "snapshot_failed",
        }
    }

    /// Whether the same call may succeed if simply retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Whether the call was refused by a rule rather than failing in the store.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            Self::StoreUnavailable(_) | Self::Repo(_) | Self::Snapshot(_)
        )
    }
}

impl Display for MutationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { kind, reason } => {
                write!(f, "invalid {}: {reason}", kind.as_str())
            }
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            Self::LinkNotFound { book_id, author_id } => {
                write!(f, "author {author_id} is not linked to book {book_id}")
            }
            Self::DuplicateId { kind, id } => {
                write!(f, "{} already exists: {id}", kind.as_str())
            }
            Self::DuplicatePhysicalId(physical_id) => {
                write!(f, "physical id already in use: {physical_id}")
            }
            Self::DuplicateLink { book_id, author_id } => {
                write!(f, "author {author_id} is already linked to book {book_id}")
            }
            Self::Cycle {
                category_id,
                parent_id,
            } => write!(
                f,
                "moving category {category_id} under {parent_id} would create a cycle"
            ),
            Self::BusinessRule(message) => write!(f, "{message}"),
            Self::StoreUnavailable(err) => write!(f, "store unavailable: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "failed to serialize audit snapshot: {err}"),
        }
    }
}

impl Error for MutationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MutationError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(err) if err.is_busy() => Self::StoreUnavailable(err),
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Repo(other),
        }
    }
}

impl From<rusqlite::Error> for MutationError {
    fn from(value: rusqlite::Error) -> Self {
        RepoError::from(value).into()
    }
}

impl From<serde_json::Error> for MutationError {
    fn from(value: serde_json::Error) -> Self {
        Self::Snapshot(value)
    }
}

/// Outcome of a category deletion cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDeleteReport {
    pub category_id: CategoryId,
    /// Categories soft-deleted, root included.
    pub categories_deleted: usize,
    pub books_soft_deleted: usize,
    /// Books moved to "uncategorized".
    pub books_uncategorized: usize,
}

/// Repositories bound to one open transaction.
struct TxRepos<'t> {
    categories: SqliteCategoryRepository<'t>,
    books: SqliteBookRepository<'t>,
    authors: SqliteAuthorRepository<'t>,
    links: SqliteBookAuthorRepository<'t>,
    audit: SqliteAuditRepository<'t>,
}

impl<'t> TxRepos<'t> {
    fn bind(conn: &'t Connection) -> RepoResult<Self> {
        Ok(Self {
            categories: SqliteCategoryRepository::try_new(conn)?,
            books: SqliteBookRepository::try_new(conn)?,
            authors: SqliteAuthorRepository::try_new(conn)?,
            links: SqliteBookAuthorRepository::try_new(conn)?,
            audit: SqliteAuditRepository::try_new(conn)?,
        })
    }

    fn active_category(&self, id: CategoryId) -> MutationResult<Category> {
        self.categories
            .get_category(id, false)?
            .ok_or(MutationError::NotFound {
                kind: EntityType::Category,
                id,
            })
    }

    fn active_book(&self, id: BookId) -> MutationResult<Book> {
        self.books.get_book(id, false)?.ok_or(MutationError::NotFound {
            kind: EntityType::Book,
            id,
        })
    }

    fn active_author(&self, id: AuthorId) -> MutationResult<Author> {
        self.authors
            .get_author(id, false)?
            .ok_or(MutationError::NotFound {
                kind: EntityType::Author,
                id,
            })
    }

    /// Rejects `physical_id` if an active book other than `owner` holds it.
    fn ensure_physical_id_free(
        &self,
        physical_id: &str,
        owner: Option<BookId>,
    ) -> MutationResult<()> {
        match self.books.find_active_by_physical_id(physical_id)? {
            Some(holder) if Some(holder.id) != owner => {
                Err(MutationError::DuplicatePhysicalId(physical_id.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Walks the ancestors of `parent_id`; one point lookup per level.
    fn ensure_acyclic(&self, category_id: CategoryId, parent_id: CategoryId) -> MutationResult<()> {
        if parent_walk::would_create_cycle(&self.categories, category_id, Some(parent_id))? {
            return Err(MutationError::Cycle {
                category_id,
                parent_id,
            });
        }
        Ok(())
    }

    fn record<T: Serialize>(&self, change: Change<'_, T>) -> MutationResult<()> {
        let entry = NewAuditEntry {
            entity_type: change.entity_type,
            entity_id: change.entity_id,
            action: change.action,
            before_snapshot: change.before.map(AuditSnapshot::capture).transpose()?,
            after_snapshot: change.after.map(AuditSnapshot::capture).transpose()?,
            actor_id: change.actor.map(str::to_string),
            timestamp: change.at,
        };
        self.audit.append(&entry)?;
        Ok(())
    }
}

/// One audited change.
struct Change<'a, T> {
    entity_type: EntityType,
    entity_id: Uuid,
    action: AuditAction,
    before: Option<&'a T>,
    after: Option<&'a T>,
    actor: Option<&'a str>,
    at: i64,
}

/// Mutation entry points over one explicitly opened store connection.
pub struct MutationEngine<'conn, G: ValidationGate = CatalogRules> {
    conn: &'conn Connection,
    gate: G,
}

impl<'conn> MutationEngine<'conn, CatalogRules> {
    /// Creates an engine using the default catalog rules.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_gate(conn, CatalogRules)
    }
}

impl<'conn, G: ValidationGate> MutationEngine<'conn, G> {
    /// Creates an engine using a custom validation gate.
    pub fn with_gate(conn: &'conn Connection, gate: G) -> Self {
        Self { conn, gate }
    }

    /// Creates a category; returns its id.
    ///
    /// # Errors
    /// - `Validation` for a rejected name.
    /// - `DuplicateId` when the id is already used (even by a deleted row).
    /// - `NotFound` when the parent is absent or soft-deleted.
    /// - `Cycle` when the category would be its own parent.
    pub fn insert_category(
        &self,
        category: &Category,
        actor: Option<&str>,
    ) -> MutationResult<CategoryId> {
        self.run_in_transaction("insert_category", |repos| {
            self.check(Candidate::Category(category))?;
            if repos.categories.get_category(category.id, true)?.is_some() {
                return Err(MutationError::DuplicateId {
                    kind: EntityType::Category,
                    id: category.id,
                });
            }
            if let Some(parent_id) = category.parent_id {
                if parent_id == category.id {
                    return Err(MutationError::Cycle {
                        category_id: category.id,
                        parent_id,
                    });
                }
                repos.active_category(parent_id)?;
                repos.ensure_acyclic(category.id, parent_id)?;
            }

            let now = now_epoch_ms();
            let row = Category {
                is_deleted: false,
                deleted_at: None,
                created_at: now,
                updated_at: now,
                ..category.clone()
            };
            repos.categories.insert_category(&row)?;
            repos.record(Change {
                entity_type: EntityType::Category,
                entity_id: row.id,
                action: AuditAction::Insert,
                before: None,
                after: Some(&row),
                actor,
                at: now,
            })?;
            Ok(row.id)
        })
    }

    /// Updates name, description and parent of an active category.
    ///
    /// Creation and deletion fields of the stored row are preserved.
    pub fn update_category(
        &self,
        category: &Category,
        actor: Option<&str>,
    ) -> MutationResult<Category> {
        self.run_in_transaction("update_category", |repos| {
            let existing = repos.active_category(category.id)?;
            self.check(Candidate::Category(category))?;
            if category.parent_id != existing.parent_id {
                if let Some(parent_id) = category.parent_id {
                    if parent_id != category.id {
                        repos.active_category(parent_id)?;
                    }
                    repos.ensure_acyclic(category.id, parent_id)?;
                }
            }

            let now = now_epoch_ms();
            let updated = Category {
                name: category.name.clone(),
                description: category.description.clone(),
                parent_id: category.parent_id,
                updated_at: now,
                ..existing.clone()
            };
            repos.categories.update_category(&updated)?;
            repos.record(Change {
                entity_type: EntityType::Category,
                entity_id: updated.id,
                action: AuditAction::Update,
                before: Some(&existing),
                after: Some(&updated),
                actor,
                at: now,
            })?;
            Ok(updated)
        })
    }

    /// Soft-deletes a category and its whole active subtree.
    ///
    /// Active books filed anywhere in the subtree are soft-deleted when
    /// `cascade_delete_books` is set, otherwise moved to "uncategorized".
    /// One `SOFT_DELETE` audit entry is written, for the root category.
    ///
    /// # Errors
    /// - `NotFound` when the category is absent or already soft-deleted.
    /// - `BusinessRule` when any book in the subtree is borrowed; nothing is
    ///   written.
    pub fn delete_category(
        &self,
        category_id: CategoryId,
        cascade_delete_books: bool,
        actor: Option<&str>,
    ) -> MutationResult<CategoryDeleteReport> {
        self.run_in_transaction("delete_category", |repos| {
            let existing = repos.active_category(category_id)?;
            let forest = CategoryForest::load(&repos.categories)?;
            let subtree: Vec<CategoryId> =
                forest.descendants(category_id, true).into_iter().collect();

            let books = repos.books.list_active_in_categories(&subtree)?;
            if books.iter().any(|book| book.status == BookStatus::Borrowed) {
                return Err(MutationError::BusinessRule(
                    "cannot delete category while books are borrowed".to_string(),
                ));
            }
            let book_ids: Vec<BookId> = books.iter().map(|book| book.id).collect();

            let now = now_epoch_ms();
            let mut report = CategoryDeleteReport {
                category_id,
                categories_deleted: 0,
                books_soft_deleted: 0,
                books_uncategorized: 0,
            };
            if cascade_delete_books {
                report.books_soft_deleted = repos.books.soft_delete_books(&book_ids, now)?;
            } else {
                report.books_uncategorized = repos.books.clear_category(&book_ids, now)?;
            }
            report.categories_deleted = repos.categories.soft_delete_categories(&subtree, now)?;

            let mut deleted = existing.clone();
            deleted.soft_delete(now);
            deleted.updated_at = now;
            repos.record(Change {
                entity_type: EntityType::Category,
                entity_id: category_id,
                action: AuditAction::SoftDelete,
                before: Some(&existing),
                after: Some(&deleted),
                actor,
                at: now,
            })?;

            debug!(
                "event=category_cascade module=service status=ok categories={} books_soft_deleted={} books_uncategorized={}",
                report.categories_deleted, report.books_soft_deleted, report.books_uncategorized
            );
            Ok(report)
        })
    }

    /// Creates a book; returns its id.
    ///
    /// # Errors
    /// - `Validation` for rejected title, physical id or ISBN.
    /// - `DuplicateId` / `DuplicatePhysicalId` on uniqueness conflicts.
    /// - `NotFound` when the category is absent or soft-deleted.
    pub fn insert_book(&self, book: &Book, actor: Option<&str>) -> MutationResult<BookId> {
        self.run_in_transaction("insert_book", |repos| {
            self.check(Candidate::Book(book))?;
            if repos.books.get_book(book.id, true)?.is_some() {
                return Err(MutationError::DuplicateId {
                    kind: EntityType::Book,
                    id: book.id,
                });
            }
            if let Some(category_id) = book.category_id {
                repos.active_category(category_id)?;
            }
            repos.ensure_physical_id_free(&book.physical_id, None)?;

            let now = now_epoch_ms();
            let row = Book {
                is_deleted: false,
                deleted_at: None,
                created_at: now,
                updated_at: now,
                ..book.clone()
            };
            repos.books.insert_book(&row)?;
            repos.record(Change {
                entity_type: EntityType::Book,
                entity_id: row.id,
                action: AuditAction::Insert,
                before: None,
                after: Some(&row),
                actor,
                at: now,
            })?;
            Ok(row.id)
        })
    }

    /// Updates the mutable fields of an active book.
    pub fn update_book(&self, book: &Book, actor: Option<&str>) -> MutationResult<Book> {
        self.run_in_transaction("update_book", |repos| {
            let existing = repos.active_book(book.id)?;
            self.check(Candidate::Book(book))?;
            if book.category_id != existing.category_id {
                if let Some(category_id) = book.category_id {
                    repos.active_category(category_id)?;
                }
            }
            if book.physical_id != existing.physical_id {
                repos.ensure_physical_id_free(&book.physical_id, Some(book.id))?;
            }

            let now = now_epoch_ms();
            let updated = Book {
                title: book.title.clone(),
                physical_id: book.physical_id.clone(),
                isbn: book.isbn.clone(),
                publisher: book.publisher.clone(),
                status: book.status,
                category_id: book.category_id,
                updated_at: now,
                ..existing.clone()
            };
            repos.books.update_book(&updated)?;
            repos.record(Change {
                entity_type: EntityType::Book,
                entity_id: updated.id,
                action: AuditAction::Update,
                before: Some(&existing),
                after: Some(&updated),
                actor,
                at: now,
            })?;
            Ok(updated)
        })
    }

    /// Soft-deletes one active book. Circulation status is kept.
    pub fn soft_delete_book(&self, book_id: BookId, actor: Option<&str>) -> MutationResult<()> {
        self.run_in_transaction("soft_delete_book", |repos| {
            let existing = repos.active_book(book_id)?;
            let now = now_epoch_ms();
            repos.books.soft_delete_books(&[book_id], now)?;

            let mut deleted = existing.clone();
            deleted.soft_delete(now);
            deleted.updated_at = now;
            repos.record(Change {
                entity_type: EntityType::Book,
                entity_id: book_id,
                action: AuditAction::SoftDelete,
                before: Some(&existing),
                after: Some(&deleted),
                actor,
                at: now,
            })
        })
    }

    /// Physically removes a book, active or soft-deleted.
    ///
    /// Its author links are removed by the store's foreign-key cascade and
    /// are covered by the book's single `DELETE` audit entry.
    pub fn purge_book(&self, book_id: BookId, actor: Option<&str>) -> MutationResult<()> {
        self.run_in_transaction("purge_book", |repos| {
            let existing = repos
                .books
                .get_book(book_id, true)?
                .ok_or(MutationError::NotFound {
                    kind: EntityType::Book,
                    id: book_id,
                })?;
            repos.books.delete_book(book_id)?;
            repos.record(Change {
                entity_type: EntityType::Book,
                entity_id: book_id,
                action: AuditAction::Delete,
                before: Some(&existing),
                after: None,
                actor,
                at: now_epoch_ms(),
            })
        })
    }

    /// Creates an author; returns its id.
    pub fn insert_author(&self, author: &Author, actor: Option<&str>) -> MutationResult<AuthorId> {
        self.run_in_transaction("insert_author", |repos| {
            self.check(Candidate::Author(author))?;
            if repos.authors.get_author(author.id, true)?.is_some() {
                return Err(MutationError::DuplicateId {
                    kind: EntityType::Author,
                    id: author.id,
                });
            }

            let now = now_epoch_ms();
            let row = Author {
                is_deleted: false,
                deleted_at: None,
                created_at: now,
                updated_at: now,
                ..author.clone()
            };
            repos.authors.insert_author(&row)?;
            repos.record(Change {
                entity_type: EntityType::Author,
                entity_id: row.id,
                action: AuditAction::Insert,
                before: None,
                after: Some(&row),
                actor,
                at: now,
            })?;
            Ok(row.id)
        })
    }

    /// Updates name, email and biography of an active author.
    pub fn update_author(&self, author: &Author, actor: Option<&str>) -> MutationResult<Author> {
        self.run_in_transaction("update_author", |repos| {
            let existing = repos.active_author(author.id)?;
            self.check(Candidate::Author(author))?;

            let now = now_epoch_ms();
            let updated = Author {
                name: author.name.clone(),
                email: author.email.clone(),
                biography: author.biography.clone(),
                updated_at: now,
                ..existing.clone()
            };
            repos.authors.update_author(&updated)?;
            repos.record(Change {
                entity_type: EntityType::Author,
                entity_id: updated.id,
                action: AuditAction::Update,
                before: Some(&existing),
                after: Some(&updated),
                actor,
                at: now,
            })?;
            Ok(updated)
        })
    }

    /// Soft-deletes one active author. Existing book links are kept.
    pub fn soft_delete_author(
        &self,
        author_id: AuthorId,
        actor: Option<&str>,
    ) -> MutationResult<()> {
        self.run_in_transaction("soft_delete_author", |repos| {
            let existing = repos.active_author(author_id)?;
            let now = now_epoch_ms();
            let mut deleted = existing.clone();
            deleted.soft_delete(now);
            deleted.updated_at = now;
            repos.authors.update_author(&deleted)?;
            repos.record(Change {
                entity_type: EntityType::Author,
                entity_id: author_id,
                action: AuditAction::SoftDelete,
                before: Some(&existing),
                after: Some(&deleted),
                actor,
                at: now,
            })
        })
    }

    /// Links an active author to an active book; returns the link id.
    ///
    /// # Errors
    /// - `NotFound` when either side is absent or soft-deleted.
    /// - `DuplicateLink` when the pair is already linked.
    pub fn add_author_to_book(
        &self,
        book_id: BookId,
        author_id: AuthorId,
        actor: Option<&str>,
    ) -> MutationResult<BookAuthorId> {
        self.run_in_transaction("add_author_to_book", |repos| {
            repos.active_book(book_id)?;
            repos.active_author(author_id)?;
            if repos.links.find_link(book_id, author_id)?.is_some() {
                return Err(MutationError::DuplicateLink { book_id, author_id });
            }

            let link = BookAuthor::new(book_id, author_id);
            repos.links.insert_link(&link)?;
            repos.record(Change {
                entity_type: EntityType::BookAuthor,
                entity_id: link.id,
                action: AuditAction::Insert,
                before: None,
                after: Some(&link),
                actor,
                at: now_epoch_ms(),
            })?;
            Ok(link.id)
        })
    }

    /// Removes the link between a book and an author.
    ///
    /// # Errors
    /// - `LinkNotFound` when the pair is not linked.
    pub fn remove_author_from_book(
        &self,
        book_id: BookId,
        author_id: AuthorId,
        actor: Option<&str>,
    ) -> MutationResult<()> {
        self.run_in_transaction("remove_author_from_book", |repos| {
            let link = repos
                .links
                .find_link(book_id, author_id)?
                .ok_or(MutationError::LinkNotFound { book_id, author_id })?;
            repos.links.delete_link(link.id)?;
            repos.record(Change {
                entity_type: EntityType::BookAuthor,
                entity_id: link.id,
                action: AuditAction::Delete,
                before: Some(&link),
                after: None,
                actor,
                at: now_epoch_ms(),
            })
        })
    }

    fn check(&self, candidate: Candidate<'_>) -> MutationResult<()> {
        let outcome = self.gate.validate(&candidate);
        if outcome.valid {
            return Ok(());
        }
        Err(MutationError::Validation {
            kind: candidate.kind(),
            reason: outcome.reason,
        })
    }

    fn run_in_transaction<T>(
        &self,
        op: &'static str,
        work: impl FnOnce(&TxRepos<'_>) -> MutationResult<T>,
    ) -> MutationResult<T> {
        let started_at = Instant::now();
        let result = self.execute(work);
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(_) => info!(
                "event=mutation module=service status=ok op={op} duration_ms={duration_ms}"
            ),
            Err(err) if err.is_rejection() => warn!(
                "event=mutation module=service status=rejected op={op} duration_ms={duration_ms} error_code={}",
                err.error_code()
            ),
            Err(err) => error!(
                "event=mutation module=service status=error op={op} duration_ms={duration_ms} error_code={} error={err}",
                err.error_code()
            ),
        }
        result
    }

    fn execute<T>(
        &self,
        work: impl FnOnce(&TxRepos<'_>) -> MutationResult<T>,
    ) -> MutationResult<T> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let outcome = TxRepos::bind(&tx)
            .map_err(MutationError::from)
            .and_then(|repos| work(&repos));
        match outcome {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event=rollback module=service status=error error_code=rollback_failed error={rollback_err}"
                    );
                }
                Err(err)
            }
        }
    }
}
