//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist book rows, including soft-delete and category reassignment.
//! - Answer the set-membership scans used by category cascades.
//!
//! # Invariants
//! - Only active (`is_deleted=0`) rows are returned unless asked otherwise.
//! - Listing is deterministic: `title ASC, book_uuid ASC`.
//! - `physical_id` is unique among active rows (partial unique index).

use super::error::{RepoError, RepoResult};
use super::support::{
    bool_to_int, ensure_table_ready, like_contains_pattern, parse_flag, parse_optional_uuid,
    parse_uuid,
};
use crate::model::audit::EntityType;
use crate::model::book::{Book, BookId, BookStatus};
use crate::model::category::CategoryId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const BOOK_SELECT_SQL: &str = "SELECT
    book_uuid,
    title,
    isbn,
    publisher,
    physical_id,
    status,
    category_uuid,
    is_deleted,
    deleted_at,
    created_at,
    updated_at
FROM books";

const BOOK_COLUMNS: &[&str] = &[
    "book_uuid",
    "title",
    "isbn",
    "publisher",
    "physical_id",
    "status",
    "category_uuid",
    "is_deleted",
    "deleted_at",
    "created_at",
    "updated_at",
];

// Stays well below SQLITE_MAX_VARIABLE_NUMBER on every supported build.
const IN_CLAUSE_CHUNK: usize = 500;

/// Query options for listing books.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookListQuery {
    /// Exact category filter (direct membership only).
    pub category_id: Option<CategoryId>,
    /// Only books without a category.
    pub uncategorized_only: bool,
    pub status: Option<BookStatus>,
    /// Case-insensitive substring match on `title`.
    pub title_contains: Option<String>,
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for book rows.
pub trait BookRepository {
    fn insert_book(&self, book: &Book) -> RepoResult<()>;
    /// Overwrites every stored field of an existing row.
    fn update_book(&self, book: &Book) -> RepoResult<()>;
    fn get_book(&self, id: BookId, include_deleted: bool) -> RepoResult<Option<Book>>;
    fn find_active_by_physical_id(&self, physical_id: &str) -> RepoResult<Option<Book>>;
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>>;
    /// Returns active books whose category is one of `category_ids`.
    fn list_active_in_categories(&self, category_ids: &[CategoryId]) -> RepoResult<Vec<Book>>;
    fn soft_delete_books(&self, ids: &[BookId], deleted_at: i64) -> RepoResult<usize>;
    /// Moves the given active books to "uncategorized".
    fn clear_category(&self, ids: &[BookId], updated_at: i64) -> RepoResult<usize>;
    /// Physically removes one row; association rows cascade.
    fn delete_book(&self, id: BookId) -> RepoResult<()>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "books", BOOK_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn insert_book(&self, book: &Book) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO books (
                book_uuid,
                title,
                isbn,
                publisher,
                physical_id,
                status,
                category_uuid,
                is_deleted,
                deleted_at,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                book.id.to_string(),
                book.title.as_str(),
                book.isbn.as_deref(),
                book.publisher.as_deref(),
                book.physical_id.as_str(),
                book.status.as_str(),
                book.category_id.map(|value| value.to_string()),
                bool_to_int(book.is_deleted),
                book.deleted_at,
                book.created_at,
                book.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update_book(&self, book: &Book) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE books
             SET
                title = ?2,
                isbn = ?3,
                publisher = ?4,
                physical_id = ?5,
                status = ?6,
                category_uuid = ?7,
                is_deleted = ?8,
                deleted_at = ?9,
                updated_at = ?10
             WHERE book_uuid = ?1;",
            params![
                book.id.to_string(),
                book.title.as_str(),
                book.isbn.as_deref(),
                book.publisher.as_deref(),
                book.physical_id.as_str(),
                book.status.as_str(),
                book.category_id.map(|value| value.to_string()),
                bool_to_int(book.is_deleted),
                book.deleted_at,
                book.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityType::Book,
                id: book.id,
            });
        }
        Ok(())
    }

    fn get_book(&self, id: BookId, include_deleted: bool) -> RepoResult<Option<Book>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOOK_SELECT_SQL}
             WHERE book_uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(row)?));
        }
        Ok(None)
    }

    fn find_active_by_physical_id(&self, physical_id: &str) -> RepoResult<Option<Book>> {
        let book_uuid: Option<String> = self
            .conn
            .query_row(
                "SELECT book_uuid
                 FROM books
                 WHERE physical_id = ?1
                   AND is_deleted = 0;",
                [physical_id],
                |row| row.get(0),
            )
            .optional()?;
        match book_uuid {
            Some(text) => self.get_book(parse_uuid(&text, "books.book_uuid")?, false),
            None => Ok(None),
        }
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        let mut sql = format!("{BOOK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }
        if let Some(category_id) = query.category_id {
            sql.push_str(" AND category_uuid = ?");
            bind_values.push(Value::Text(category_id.to_string()));
        } else if query.uncategorized_only {
            sql.push_str(" AND category_uuid IS NULL");
        }
        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(text) = query.title_contains.as_deref() {
            sql.push_str(" AND title LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(like_contains_pattern(text)));
        }

        sql.push_str(" ORDER BY title ASC, book_uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ? OFFSET ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            bind_values.push(Value::Integer(i64::from(query.offset)));
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }

    fn list_active_in_categories(&self, category_ids: &[CategoryId]) -> RepoResult<Vec<Book>> {
        let mut books = Vec::new();
        for chunk in category_ids.chunks(IN_CLAUSE_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "{BOOK_SELECT_SQL}
                 WHERE is_deleted = 0
                   AND category_uuid IN ({placeholders})
                 ORDER BY title ASC, book_uuid ASC;"
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter().map(|id| id.to_string())))?;
            while let Some(row) = rows.next()? {
                books.push(parse_book_row(row)?);
            }
        }
        Ok(books)
    }

    fn soft_delete_books(&self, ids: &[BookId], deleted_at: i64) -> RepoResult<usize> {
        let mut stmt = self.conn.prepare(
            "UPDATE books
             SET is_deleted = 1,
                 deleted_at = ?2,
                 updated_at = ?2
             WHERE book_uuid = ?1
               AND is_deleted = 0;",
        )?;
        let mut changed = 0;
        for id in ids {
            changed += stmt.execute(params![id.to_string(), deleted_at])?;
        }
        Ok(changed)
    }

    fn clear_category(&self, ids: &[BookId], updated_at: i64) -> RepoResult<usize> {
        let mut stmt = self.conn.prepare(
            "UPDATE books
             SET category_uuid = NULL,
                 updated_at = ?2
             WHERE book_uuid = ?1
               AND is_deleted = 0;",
        )?;
        let mut changed = 0;
        for id in ids {
            changed += stmt.execute(params![id.to_string(), updated_at])?;
        }
        Ok(changed)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM books WHERE book_uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityType::Book,
                id,
            });
        }
        Ok(())
    }
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let id_text: String = row.get("book_uuid")?;
    let status_text: String = row.get("status")?;
    let status = BookStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid book status `{status_text}` in books.status"))
    })?;

    Ok(Book {
        id: parse_uuid(&id_text, "books.book_uuid")?,
        title: row.get("title")?,
        physical_id: row.get("physical_id")?,
        isbn: row.get("isbn")?,
        publisher: row.get("publisher")?,
        status,
        category_id: parse_optional_uuid(row.get("category_uuid")?, "books.category_uuid")?,
        is_deleted: parse_flag(row.get("is_deleted")?, "books.is_deleted")?,
        deleted_at: row.get("deleted_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
