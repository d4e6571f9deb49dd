//! Category repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist category rows and their parent links.
//! - Provide the full-collection scan the hierarchy view is rebuilt from.
//!
//! # Invariants
//! - Only active (`is_deleted=0`) rows are returned unless asked otherwise.
//! - Listing is deterministic: `name ASC, category_uuid ASC`.
//! - The repository never checks hierarchy shape; cycle safety is enforced
//!   above it by the mutation engine.

use super::error::{RepoError, RepoResult};
use super::support::{
    bool_to_int, ensure_table_ready, like_contains_pattern, parse_flag, parse_optional_uuid,
    parse_uuid,
};
use crate::model::audit::EntityType;
use crate::model::category::{Category, CategoryId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT
    category_uuid,
    name,
    description,
    parent_uuid,
    is_deleted,
    deleted_at,
    created_at,
    updated_at
FROM categories";

const CATEGORY_COLUMNS: &[&str] = &[
    "category_uuid",
    "name",
    "description",
    "parent_uuid",
    "is_deleted",
    "deleted_at",
    "created_at",
    "updated_at",
];

/// Query options for listing categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryListQuery {
    /// Case-insensitive substring match on `name`.
    pub name_contains: Option<String>,
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for category rows.
pub trait CategoryRepository {
    fn insert_category(&self, category: &Category) -> RepoResult<()>;
    /// Overwrites every stored field of an existing row.
    fn update_category(&self, category: &Category) -> RepoResult<()>;
    fn get_category(&self, id: CategoryId, include_deleted: bool)
        -> RepoResult<Option<Category>>;
    fn list_categories(&self, query: &CategoryListQuery) -> RepoResult<Vec<Category>>;
    /// Soft-deletes the given active categories; returns the number flipped.
    fn soft_delete_categories(&self, ids: &[CategoryId], deleted_at: i64) -> RepoResult<usize>;

    /// Returns every active category in one scan.
    fn scan_active_categories(&self) -> RepoResult<Vec<Category>> {
        self.list_categories(&CategoryListQuery::default())
    }
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "categories", CATEGORY_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn insert_category(&self, category: &Category) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO categories (
                category_uuid,
                name,
                description,
                parent_uuid,
                is_deleted,
                deleted_at,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                category.id.to_string(),
                category.name.as_str(),
                category.description.as_deref(),
                category.parent_id.map(|value| value.to_string()),
                bool_to_int(category.is_deleted),
                category.deleted_at,
                category.created_at,
                category.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update_category(&self, category: &Category) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE categories
             SET
                name = ?2,
                description = ?3,
                parent_uuid = ?4,
                is_deleted = ?5,
                deleted_at = ?6,
                updated_at = ?7
             WHERE category_uuid = ?1;",
            params![
                category.id.to_string(),
                category.name.as_str(),
                category.description.as_deref(),
                category.parent_id.map(|value| value.to_string()),
                bool_to_int(category.is_deleted),
                category.deleted_at,
                category.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityType::Category,
                id: category.id,
            });
        }
        Ok(())
    }

    fn get_category(
        &self,
        id: CategoryId,
        include_deleted: bool,
    ) -> RepoResult<Option<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL}
             WHERE category_uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn list_categories(&self, query: &CategoryListQuery) -> RepoResult<Vec<Category>> {
        let mut sql = format!("{CATEGORY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }
        if let Some(text) = query.name_contains.as_deref() {
            sql.push_str(" AND name LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(like_contains_pattern(text)));
        }

        sql.push_str(" ORDER BY name ASC, category_uuid ASC");

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
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn soft_delete_categories(&self, ids: &[CategoryId], deleted_at: i64) -> RepoResult<usize> {
        let mut stmt = self.conn.prepare(
            "UPDATE categories
             SET is_deleted = 1,
                 deleted_at = ?2,
                 updated_at = ?2
             WHERE category_uuid = ?1
               AND is_deleted = 0;",
        )?;
        let mut changed = 0;
        for id in ids {
            changed += stmt.execute(params![id.to_string(), deleted_at])?;
        }
        Ok(changed)
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let id_text: String = row.get("category_uuid")?;
    Ok(Category {
        id: parse_uuid(&id_text, "categories.category_uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        parent_id: parse_optional_uuid(row.get("parent_uuid")?, "categories.parent_uuid")?,
        is_deleted: parse_flag(row.get("is_deleted")?, "categories.is_deleted")?,
        deleted_at: row.get("deleted_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
