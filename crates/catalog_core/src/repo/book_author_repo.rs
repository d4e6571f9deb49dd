//! Book-author association repository.
//!
//! # Invariants
//! - `(book_uuid, author_uuid)` is unique.
//! - Links are physically deleted, never soft-deleted; hard removal of a
//!   book or author cascades to its links through foreign keys.

use super::error::{RepoError, RepoResult};
use super::support::{ensure_table_ready, parse_uuid};
use crate::model::audit::EntityType;
use crate::model::author::AuthorId;
use crate::model::book::{BookAuthor, BookAuthorId, BookId};
use rusqlite::{params, Connection, Row};

const LINK_COLUMNS: &[&str] = &["link_uuid", "book_uuid", "author_uuid"];

/// Repository interface for book-author links.
pub trait BookAuthorRepository {
    fn insert_link(&self, link: &BookAuthor) -> RepoResult<()>;
    fn find_link(&self, book_id: BookId, author_id: AuthorId) -> RepoResult<Option<BookAuthor>>;
    fn delete_link(&self, id: BookAuthorId) -> RepoResult<()>;
    fn list_links_for_book(&self, book_id: BookId) -> RepoResult<Vec<BookAuthor>>;
    fn list_links_for_author(&self, author_id: AuthorId) -> RepoResult<Vec<BookAuthor>>;
}

/// SQLite-backed link repository.
pub struct SqliteBookAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookAuthorRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "book_authors", LINK_COLUMNS)?;
        Ok(Self { conn })
    }

    fn list_where(&self, column: &str, id: uuid::Uuid) -> RepoResult<Vec<BookAuthor>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT link_uuid, book_uuid, author_uuid
             FROM book_authors
             WHERE {column} = ?1
             ORDER BY link_uuid ASC;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(parse_link_row(row)?);
        }
        Ok(links)
    }
}

impl BookAuthorRepository for SqliteBookAuthorRepository<'_> {
    fn insert_link(&self, link: &BookAuthor) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO book_authors (link_uuid, book_uuid, author_uuid)
             VALUES (?1, ?2, ?3);",
            params![
                link.id.to_string(),
                link.book_id.to_string(),
                link.author_id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn find_link(&self, book_id: BookId, author_id: AuthorId) -> RepoResult<Option<BookAuthor>> {
        let mut stmt = self.conn.prepare(
            "SELECT link_uuid, book_uuid, author_uuid
             FROM book_authors
             WHERE book_uuid = ?1
               AND author_uuid = ?2;",
        )?;
        let mut rows = stmt.query(params![book_id.to_string(), author_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_link_row(row)?));
        }
        Ok(None)
    }

    fn delete_link(&self, id: BookAuthorId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM book_authors WHERE link_uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityType::BookAuthor,
                id,
            });
        }
        Ok(())
    }

    fn list_links_for_book(&self, book_id: BookId) -> RepoResult<Vec<BookAuthor>> {
        self.list_where("book_uuid", book_id)
    }

    fn list_links_for_author(&self, author_id: AuthorId) -> RepoResult<Vec<BookAuthor>> {
        self.list_where("author_uuid", author_id)
    }
}

fn parse_link_row(row: &Row<'_>) -> RepoResult<BookAuthor> {
    let link_text: String = row.get("link_uuid")?;
    let book_text: String = row.get("book_uuid")?;
    let author_text: String = row.get("author_uuid")?;
    Ok(BookAuthor {
        id: parse_uuid(&link_text, "book_authors.link_uuid")?,
        book_id: parse_uuid(&book_text, "book_authors.book_uuid")?,
        author_id: parse_uuid(&author_text, "book_authors.author_uuid")?,
    })
}
