//! Read-only category hierarchy queries for external callers.
//!
//! Each call rebuilds the forest from one category scan, so results reflect
//! a single consistent snapshot and never a stale cache.

use crate::hierarchy::{CategoryForest, HierarchyError, HierarchyResult};
use crate::model::book::Book;
use crate::model::category::{Category, CategoryId};
use crate::repo::book_repo::BookRepository;
use crate::repo::category_repo::CategoryRepository;
use std::collections::BTreeSet;

/// Category hierarchy service facade.
pub struct HierarchyService<R: CategoryRepository> {
    repo: R,
}

impl<R: CategoryRepository> HierarchyService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Loads a fresh forest snapshot.
    pub fn snapshot(&self) -> HierarchyResult<CategoryForest> {
        Ok(CategoryForest::load(&self.repo)?)
    }

    pub fn descendants(
        &self,
        category_id: CategoryId,
        include_root: bool,
    ) -> HierarchyResult<BTreeSet<CategoryId>> {
        let forest = self.snapshot()?;
        ensure_present(&forest, category_id)?;
        Ok(forest.descendants(category_id, include_root))
    }

    pub fn ancestor_path(&self, category_id: CategoryId) -> HierarchyResult<Vec<Category>> {
        self.snapshot()?.ancestor_path(category_id)
    }

    /// Direct children, or root categories when `parent` is `None`.
    pub fn children(&self, parent: Option<CategoryId>) -> HierarchyResult<BTreeSet<CategoryId>> {
        let forest = self.snapshot()?;
        if let Some(parent_id) = parent {
            ensure_present(&forest, parent_id)?;
        }
        Ok(forest.children(parent))
    }

    /// # Errors
    /// - `NotFound` when either category is absent or soft-deleted.
    pub fn would_create_cycle(
        &self,
        category_id: CategoryId,
        new_parent: Option<CategoryId>,
    ) -> HierarchyResult<bool> {
        let forest = self.snapshot()?;
        ensure_present(&forest, category_id)?;
        if let Some(parent_id) = new_parent {
            ensure_present(&forest, parent_id)?;
        }
        Ok(forest.would_create_cycle(category_id, new_parent))
    }

    /// Active books filed under `category_id` or any of its descendants,
    /// ordered by title then id.
    ///
    /// # Errors
    /// - `NotFound` when the category is absent or soft-deleted.
    pub fn books_in_subtree<B: BookRepository + ?Sized>(
        &self,
        books: &B,
        category_id: CategoryId,
    ) -> HierarchyResult<Vec<Book>> {
        let subtree: Vec<CategoryId> = self
            .descendants(category_id, true)?
            .into_iter()
            .collect();
        let mut found = books.list_active_in_categories(&subtree)?;
        found.sort_by(|left, right| {
            left.title
                .cmp(&right.title)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(found)
    }

    /// Integrity scan: every active category lying on a parent-link cycle.
    pub fn detect_all_cycles(&self) -> HierarchyResult<BTreeSet<CategoryId>> {
        Ok(self.snapshot()?.detect_all_cycles())
    }
}

fn ensure_present(forest: &CategoryForest, id: CategoryId) -> HierarchyResult<()> {
    if forest.contains(id) {
        Ok(())
    } else {
        Err(HierarchyError::NotFound(id))
    }
}
