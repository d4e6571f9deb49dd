//! Cycle checks that follow parent links through point lookups.
//!
//! Used on the write path, where loading the whole forest would cost a full
//! category scan under the write lock. Cost is one lookup per ancestor.

use super::cycle;
use crate::model::category::CategoryId;
use crate::repo::category_repo::CategoryRepository;
use crate::repo::RepoResult;

/// Whether re-parenting `id` under `new_parent` would close a cycle.
///
/// Soft-deleted or missing ancestors end the walk, matching how the forest
/// view treats them as roots.
pub fn would_create_cycle<R: CategoryRepository + ?Sized>(
    repo: &R,
    id: CategoryId,
    new_parent: Option<CategoryId>,
) -> RepoResult<bool> {
    cycle::try_would_create_cycle(id, new_parent, |current| {
        Ok(repo
            .get_category(current, false)?
            .and_then(|category| category.parent_id))
    })
}
