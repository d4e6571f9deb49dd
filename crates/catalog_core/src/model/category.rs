//! Category domain model.
//!
//! # Responsibility
//! - Define the self-referential category record.
//! - Provide lifecycle helpers for soft-delete semantics.
//!
//! # Invariants
//! - `parent_id = None` marks a root category.
//! - Restricted to active categories, parent links form a forest: no
//!   category is its own ancestor.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_epoch_ms;

/// Stable category identifier.
pub type CategoryId = Uuid;

/// Node of the category hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    /// Parent category. `None` means root-level category.
    pub parent_id: Option<CategoryId>,
    /// Soft delete tombstone.
    pub is_deleted: bool,
    /// Epoch ms of the soft delete, set together with `is_deleted`.
    pub deleted_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Category {
    /// Creates a root category with a generated stable ID.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            parent_id: None,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a category placed under `parent_id`.
    pub fn child_of(parent_id: CategoryId, name: impl Into<String>) -> Self {
        let mut category = Self::new(name);
        category.parent_id = Some(parent_id);
        category
    }

    /// Sets the optional description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks this category as softly deleted at `at` (epoch ms).
    pub fn soft_delete(&mut self, at: i64) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
    }

    /// Returns whether this category should be considered visible/active.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}
