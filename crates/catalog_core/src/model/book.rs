//! Book and book-author association records.
//!
//! # Responsibility
//! - Define the physical-copy book record and its circulation status.
//! - Define the many-to-many `BookAuthor` link.
//!
//! # Invariants
//! - `physical_id` is unique among active books.
//! - `category_id = None` means "uncategorized".
//! - A `(book_id, author_id)` pair appears at most once.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::author::AuthorId;
use super::category::CategoryId;
use super::now_epoch_ms;

/// Stable book identifier.
pub type BookId = Uuid;

/// Stable book-author link identifier.
pub type BookAuthorId = Uuid;

/// Circulation state of one physical copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    /// On the shelf.
    Available,
    /// Lent out. Blocks category deletion cascades.
    Borrowed,
    /// Temporarily out of circulation.
    Maintenance,
    /// Withdrawn from the collection.
    Deleted,
}

impl BookStatus {
    /// Stable storage/wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Borrowed => "borrowed",
            Self::Maintenance => "maintenance",
            Self::Deleted => "deleted",
        }
    }

    /// Parses a status string, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "available" => Some(Self::Available),
            "borrowed" => Some(Self::Borrowed),
            "maintenance" => Some(Self::Maintenance),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// One physical copy held by the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    /// Identifier of the physical copy (label/barcode).
    pub physical_id: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub status: BookStatus,
    pub category_id: Option<CategoryId>,
    pub is_deleted: bool,
    pub deleted_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Book {
    /// Creates an available, uncategorized book with a generated stable ID.
    pub fn new(title: impl Into<String>, physical_id: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            physical_id: physical_id.into(),
            isbn: None,
            publisher: None,
            status: BookStatus::Available,
            category_id: None,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Places the book in `category_id`.
    pub fn in_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_status(mut self, status: BookStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    /// Marks this book as softly deleted at `at` (epoch ms).
    ///
    /// Circulation `status` is left untouched.
    pub fn soft_delete(&mut self, at: i64) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Association between one book and one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAuthor {
    pub id: BookAuthorId,
    pub book_id: BookId,
    pub author_id: AuthorId,
}

impl BookAuthor {
    pub fn new(book_id: BookId, author_id: AuthorId) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            author_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Book, BookStatus};

    #[test]
    fn status_parse_accepts_known_values_case_insensitively() {
        assert_eq!(BookStatus::parse("Borrowed"), Some(BookStatus::Borrowed));
        assert_eq!(BookStatus::parse(" maintenance "), Some(BookStatus::Maintenance));
        assert_eq!(BookStatus::parse("lost"), None);
        for status in [
            BookStatus::Available,
            BookStatus::Borrowed,
            BookStatus::Maintenance,
            BookStatus::Deleted,
        ] {
            assert_eq!(BookStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn soft_delete_keeps_circulation_status() {
        let mut book = Book::new("Dune", "PID-001").with_status(BookStatus::Maintenance);
        book.soft_delete(42);
        assert!(!book.is_active());
        assert_eq!(book.deleted_at, Some(42));
        assert_eq!(book.status, BookStatus::Maintenance);
    }
}
