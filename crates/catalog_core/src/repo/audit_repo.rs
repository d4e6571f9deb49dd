//! Audit log repository.
//!
//! # Responsibility
//! - Append mutation entries inside the caller's transaction.
//! - Serve filtered, paginated reads and the retention purge.
//!
//! # Invariants
//! - Rows are never updated; `purge_before` is the only delete path.
//! - Listing is ordered `timestamp DESC, log_id DESC`.
//! - Snapshots round-trip verbatim.

use super::error::{RepoError, RepoResult};
use super::support::{ensure_table_ready, parse_uuid};
use crate::model::audit::{
    AuditAction, AuditLog, AuditLogId, AuditSnapshot, EntityType, NewAuditEntry,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

pub const AUDIT_DEFAULT_LIMIT: u32 = 50;
pub const AUDIT_MAX_LIMIT: u32 = 500;

const AUDIT_COLUMNS: &[&str] = &[
    "log_id",
    "entity_type",
    "entity_id",
    "action",
    "before_snapshot",
    "after_snapshot",
    "actor_id",
    "timestamp",
];

/// Filter and page options for audit reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditListQuery {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<Uuid>,
    /// Defaults to 50, clamped to `1..=500`.
    pub limit: Option<u32>,
    pub offset: u32,
}

impl AuditListQuery {
    pub fn for_entity_type(entity_type: EntityType) -> Self {
        Self {
            entity_type: Some(entity_type),
            ..Self::default()
        }
    }

    pub fn for_entity(entity_type: EntityType, entity_id: Uuid) -> Self {
        Self {
            entity_type: Some(entity_type),
            entity_id: Some(entity_id),
            ..Self::default()
        }
    }
}

/// Clamps a requested page size into the supported range.
pub fn normalize_audit_limit(limit: Option<u32>) -> u32 {
    limit
        .unwrap_or(AUDIT_DEFAULT_LIMIT)
        .clamp(1, AUDIT_MAX_LIMIT)
}

/// Repository interface for audit entries.
pub trait AuditRepository {
    fn append(&self, entry: &NewAuditEntry) -> RepoResult<AuditLogId>;
    fn list(&self, query: &AuditListQuery) -> RepoResult<Vec<AuditLog>>;
    /// Deletes entries with `timestamp < cutoff`; returns the number removed.
    fn purge_before(&self, cutoff: i64) -> RepoResult<usize>;
}

/// SQLite-backed audit repository.
pub struct SqliteAuditRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuditRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "audit_logs", AUDIT_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl AuditRepository for SqliteAuditRepository<'_> {
    fn append(&self, entry: &NewAuditEntry) -> RepoResult<AuditLogId> {
        self.conn.execute(
            "INSERT INTO audit_logs (
                entity_type,
                entity_id,
                action,
                before_snapshot,
                after_snapshot,
                actor_id,
                timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                entry.entity_type.as_str(),
                entry.entity_id.to_string(),
                entry.action.as_str(),
                entry.before_snapshot.as_ref().map(AuditSnapshot::as_str),
                entry.after_snapshot.as_ref().map(AuditSnapshot::as_str),
                entry.actor_id.as_deref(),
                entry.timestamp,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list(&self, query: &AuditListQuery) -> RepoResult<Vec<AuditLog>> {
        let mut sql = String::from(
            "SELECT
                log_id,
                entity_type,
                entity_id,
                action,
                before_snapshot,
                after_snapshot,
                actor_id,
                timestamp
             FROM audit_logs
             WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(entity_type) = query.entity_type {
            sql.push_str(" AND entity_type = ?");
            bind_values.push(Value::Text(entity_type.as_str().to_string()));
        }
        if let Some(entity_id) = query.entity_id {
            sql.push_str(" AND entity_id = ?");
            bind_values.push(Value::Text(entity_id.to_string()));
        }

        sql.push_str(" ORDER BY timestamp DESC, log_id DESC LIMIT ? OFFSET ?;");
        bind_values.push(Value::Integer(i64::from(normalize_audit_limit(query.limit))));
        bind_values.push(Value::Integer(i64::from(query.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_audit_row(row)?);
        }
        Ok(entries)
    }

    fn purge_before(&self, cutoff: i64) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM audit_logs WHERE timestamp < ?1;", [cutoff])?;
        Ok(removed)
    }
}

fn parse_audit_row(row: &Row<'_>) -> RepoResult<AuditLog> {
    let type_text: String = row.get("entity_type")?;
    let entity_type = EntityType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid entity type `{type_text}` in audit_logs.entity_type"
        ))
    })?;
    let action_text: String = row.get("action")?;
    let action = AuditAction::parse(&action_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid action `{action_text}` in audit_logs.action"))
    })?;
    let entity_text: String = row.get("entity_id")?;
    let before: Option<String> = row.get("before_snapshot")?;
    let after: Option<String> = row.get("after_snapshot")?;

    Ok(AuditLog {
        id: row.get("log_id")?,
        entity_type,
        entity_id: parse_uuid(&entity_text, "audit_logs.entity_id")?,
        action,
        before_snapshot: before.map(AuditSnapshot::from_raw),
        after_snapshot: after.map(AuditSnapshot::from_raw),
        actor_id: row.get("actor_id")?,
        timestamp: row.get("timestamp")?,
    })
}

#[cfg(test)]
mod tests {
    use super::{normalize_audit_limit, AUDIT_DEFAULT_LIMIT, AUDIT_MAX_LIMIT};

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(normalize_audit_limit(None), AUDIT_DEFAULT_LIMIT);
        assert_eq!(normalize_audit_limit(Some(0)), 1);
        assert_eq!(normalize_audit_limit(Some(20)), 20);
        assert_eq!(normalize_audit_limit(Some(10_000)), AUDIT_MAX_LIMIT);
    }
}
