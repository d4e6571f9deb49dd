//! Author repository contract and SQLite implementation.
//!
//! # Invariants
//! - Only active (`is_deleted=0`) rows are returned unless asked otherwise.
//! - Listing is deterministic: `name ASC, author_uuid ASC`.

use super::error::{RepoError, RepoResult};
use super::support::{
    bool_to_int, ensure_table_ready, like_contains_pattern, parse_flag, parse_uuid,
};
use crate::model::audit::EntityType;
use crate::model::author::{Author, AuthorId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const AUTHOR_SELECT_SQL: &str = "SELECT
    author_uuid,
    name,
    email,
    biography,
    is_deleted,
    deleted_at,
    created_at,
    updated_at
FROM authors";

const AUTHOR_COLUMNS: &[&str] = &[
    "author_uuid",
    "name",
    "email",
    "biography",
    "is_deleted",
    "deleted_at",
    "created_at",
    "updated_at",
];

/// Query options for listing authors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorListQuery {
    /// Case-insensitive substring match on `name`.
    pub name_contains: Option<String>,
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for author rows.
pub trait AuthorRepository {
    fn insert_author(&self, author: &Author) -> RepoResult<()>;
    /// Overwrites every stored field of an existing row.
    fn update_author(&self, author: &Author) -> RepoResult<()>;
    fn get_author(&self, id: AuthorId, include_deleted: bool) -> RepoResult<Option<Author>>;
    fn list_authors(&self, query: &AuthorListQuery) -> RepoResult<Vec<Author>>;
}

/// SQLite-backed author repository.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "authors", AUTHOR_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn insert_author(&self, author: &Author) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO authors (
                author_uuid,
                name,
                email,
                biography,
                is_deleted,
                deleted_at,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                author.id.to_string(),
                author.name.as_str(),
                author.email.as_deref(),
                author.biography.as_deref(),
                bool_to_int(author.is_deleted),
                author.deleted_at,
                author.created_at,
                author.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update_author(&self, author: &Author) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE authors
             SET
                name = ?2,
                email = ?3,
                biography = ?4,
                is_deleted = ?5,
                deleted_at = ?6,
                updated_at = ?7
             WHERE author_uuid = ?1;",
            params![
                author.id.to_string(),
                author.name.as_str(),
                author.email.as_deref(),
                author.biography.as_deref(),
                bool_to_int(author.is_deleted),
                author.deleted_at,
                author.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityType::Author,
                id: author.id,
            });
        }
        Ok(())
    }

    fn get_author(&self, id: AuthorId, include_deleted: bool) -> RepoResult<Option<Author>> {
        let mut stmt = self.conn.prepare(&format!(
            "{AUTHOR_SELECT_SQL}
             WHERE author_uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_author_row(row)?));
        }
        Ok(None)
    }

    fn list_authors(&self, query: &AuthorListQuery) -> RepoResult<Vec<Author>> {
        let mut sql = format!("{AUTHOR_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }
        if let Some(text) = query.name_contains.as_deref() {
            sql.push_str(" AND name LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(like_contains_pattern(text)));
        }

        sql.push_str(" ORDER BY name ASC, author_uuid ASC");

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
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(parse_author_row(row)?);
        }
        Ok(authors)
    }
}

fn parse_author_row(row: &Row<'_>) -> RepoResult<Author> {
    let id_text: String = row.get("author_uuid")?;
    Ok(Author {
        id: parse_uuid(&id_text, "authors.author_uuid")?,
        name: row.get("name")?,
        email: row.get("email")?,
        biography: row.get("biography")?,
        is_deleted: parse_flag(row.get("is_deleted")?, "authors.is_deleted")?,
        deleted_at: row.get("deleted_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
