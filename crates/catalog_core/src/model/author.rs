//! Author domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_epoch_ms;

/// Stable author identifier.
pub type AuthorId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub email: Option<String>,
    pub biography: Option<String>,
    pub is_deleted: bool,
    pub deleted_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Author {
    /// Creates a new author with a generated stable ID.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            biography: None,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Marks this author as softly deleted at `at` (epoch ms).
    pub fn soft_delete(&mut self, at: i64) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}
