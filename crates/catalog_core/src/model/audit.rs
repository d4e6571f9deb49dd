//! Audit log records.
//!
//! # Responsibility
//! - Define the append-only mutation log entry.
//! - Carry before/after entity state as an opaque serialized payload.
//!
//! # Invariants
//! - Entries are never mutated; only a retention purge removes them.
//! - Snapshots are stored and returned verbatim; the audit layer never
//!   interprets their structure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Auto-incrementing audit log identifier.
pub type AuditLogId = i64;

/// Kind of entity an audit entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Book,
    Author,
    Category,
    BookAuthor,
}

impl EntityType {
    /// Stable storage string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Book => "Book",
            Self::Author => "Author",
            Self::Category => "Category",
            Self::BookAuthor => "BookAuthor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Book" => Some(Self::Book),
            "Author" => Some(Self::Author),
            "Category" => Some(Self::Category),
            "BookAuthor" => Some(Self::BookAuthor),
            _ => None,
        }
    }
}

/// Mutation kind recorded by an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Insert,
    Update,
    /// Physical removal.
    Delete,
    /// Tombstone flag flipped.
    SoftDelete,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::SoftDelete => "SOFT_DELETE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "SOFT_DELETE" => Some(Self::SoftDelete),
            _ => None,
        }
    }
}

/// Opaque serialized entity state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditSnapshot(String);

impl AuditSnapshot {
    /// Serializes one record into a JSON snapshot.
    pub fn capture<T: Serialize>(record: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_string(record).map(Self)
    }

    /// Wraps an already-serialized payload without inspecting it.
    pub fn from_raw(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Entry to append; the store assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub before_snapshot: Option<AuditSnapshot>,
    pub after_snapshot: Option<AuditSnapshot>,
    pub actor_id: Option<String>,
    /// Epoch ms.
    pub timestamp: i64,
}

/// Persisted audit log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub action: AuditAction,
    pub before_snapshot: Option<AuditSnapshot>,
    pub after_snapshot: Option<AuditSnapshot>,
    pub actor_id: Option<String>,
    pub timestamp: i64,
}
