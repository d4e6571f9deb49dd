//! In-memory category forest.
//!
//! # Invariants
//! - Only active categories are present.
//! - A category whose parent is absent or soft-deleted is a root of the view.
//! - `children` and `roots` together index every node exactly once, unless
//!   persisted links are cyclic (cyclic nodes have no root).

use super::cycle;
use super::{HierarchyError, HierarchyResult};
use crate::model::category::{Category, CategoryId};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::RepoResult;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Snapshot of the active category hierarchy.
#[derive(Debug, Clone, Default)]
pub struct CategoryForest {
    nodes: BTreeMap<CategoryId, Category>,
    children: BTreeMap<CategoryId, BTreeSet<CategoryId>>,
    roots: BTreeSet<CategoryId>,
}

impl CategoryForest {
    /// Builds the view from category rows; soft-deleted rows are skipped.
    pub fn from_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        let nodes: BTreeMap<CategoryId, Category> = categories
            .into_iter()
            .filter(Category::is_active)
            .map(|category| (category.id, category))
            .collect();

        let mut children: BTreeMap<CategoryId, BTreeSet<CategoryId>> = BTreeMap::new();
        let mut roots = BTreeSet::new();
        for category in nodes.values() {
            match category.parent_id {
                Some(parent_id) if nodes.contains_key(&parent_id) => {
                    children.entry(parent_id).or_default().insert(category.id);
                }
                _ => {
                    roots.insert(category.id);
                }
            }
        }

        Self {
            nodes,
            children,
            roots,
        }
    }

    /// Rebuilds the view from one scan of `repo`.
    pub fn load<R: CategoryRepository + ?Sized>(repo: &R) -> RepoResult<Self> {
        Ok(Self::from_categories(repo.scan_active_categories()?))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.nodes.get(&id)
    }

    /// Parent inside the view; `None` for roots and unknown ids.
    pub fn parent_of(&self, id: CategoryId) -> Option<CategoryId> {
        self.nodes
            .get(&id)
            .and_then(|category| category.parent_id)
            .filter(|parent_id| self.nodes.contains_key(parent_id))
    }

    /// Direct children of `parent`, or the roots when `parent` is `None`.
    pub fn children(&self, parent: Option<CategoryId>) -> BTreeSet<CategoryId> {
        match parent {
            Some(parent_id) => self.children.get(&parent_id).cloned().unwrap_or_default(),
            None => self.roots.clone(),
        }
    }

    /// All categories reachable from `id` through child links.
    ///
    /// Unknown ids yield an empty set.
    pub fn descendants(&self, id: CategoryId, include_root: bool) -> BTreeSet<CategoryId> {
        if !self.contains(id) {
            return BTreeSet::new();
        }

        let mut visited = BTreeSet::from([id]);
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if let Some(kids) = self.children.get(&current) {
                for kid in kids {
                    if visited.insert(*kid) {
                        queue.push_back(*kid);
                    }
                }
            }
        }

        if !include_root {
            visited.remove(&id);
        }
        visited
    }

    /// Categories from `id` up to its root, starting with `id` itself.
    pub fn ancestor_path(&self, id: CategoryId) -> HierarchyResult<Vec<Category>> {
        if !self.contains(id) {
            return Err(HierarchyError::NotFound(id));
        }

        let mut seen = BTreeSet::new();
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if !seen.insert(current) {
                break;
            }
            let Some(category) = self.nodes.get(&current) else {
                break;
            };
            path.push(category.clone());
            cursor = self.parent_of(current);
        }
        Ok(path)
    }

    /// Whether re-parenting `id` under `new_parent` would close a cycle.
    pub fn would_create_cycle(&self, id: CategoryId, new_parent: Option<CategoryId>) -> bool {
        cycle::would_create_cycle(id, new_parent, |current| self.parent_of(current))
    }

    /// Every category lying on a cycle of parent links.
    pub fn detect_all_cycles(&self) -> BTreeSet<CategoryId> {
        cycle::detect_cycles(self.nodes.keys().copied(), |current| {
            self.children
                .get(&current)
                .into_iter()
                .flatten()
                .copied()
                .collect::<Vec<_>>()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::CategoryForest;
    use crate::model::category::Category;
    use std::collections::BTreeSet;

    #[test]
    fn orphaned_and_deleted_parents_make_roots() {
        let mut gone = Category::new("Gone");
        gone.soft_delete(1);
        let under_gone = Category::child_of(gone.id, "Orphan");
        let root = Category::new("Root");
        let leaf = Category::child_of(root.id, "Leaf");

        let forest = CategoryForest::from_categories(vec![
            gone.clone(),
            under_gone.clone(),
            root.clone(),
            leaf.clone(),
        ]);

        assert_eq!(forest.len(), 3);
        assert!(!forest.is_empty());
        assert!(CategoryForest::from_categories(vec![gone.clone()]).is_empty());
        assert!(!forest.contains(gone.id));
        assert_eq!(
            forest.children(None),
            BTreeSet::from([under_gone.id, root.id])
        );
        assert_eq!(forest.parent_of(under_gone.id), None);
        assert_eq!(forest.children(Some(root.id)), BTreeSet::from([leaf.id]));
    }

    #[test]
    fn descendants_respect_include_root() {
        let a = Category::new("A");
        let b = Category::child_of(a.id, "B");
        let c = Category::child_of(b.id, "C");
        let forest = CategoryForest::from_categories(vec![a.clone(), b.clone(), c.clone()]);

        assert_eq!(
            forest.descendants(a.id, true),
            BTreeSet::from([a.id, b.id, c.id])
        );
        assert_eq!(forest.descendants(a.id, false), BTreeSet::from([b.id, c.id]));
        assert!(forest.descendants(uuid::Uuid::new_v4(), true).is_empty());
    }

    #[test]
    fn ancestor_path_runs_leaf_to_root() {
        let a = Category::new("A");
        let b = Category::child_of(a.id, "B");
        let c = Category::child_of(b.id, "C");
        let forest = CategoryForest::from_categories(vec![a.clone(), b.clone(), c.clone()]);

        let ids: Vec<_> = forest
            .ancestor_path(c.id)
            .unwrap()
            .into_iter()
            .map(|category| category.id)
            .collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
        assert!(forest.ancestor_path(uuid::Uuid::new_v4()).is_err());
    }

    #[test]
    fn cyclic_rows_terminate_and_are_reported() {
        let mut x = Category::new("X");
        let mut y = Category::new("Y");
        x.parent_id = Some(y.id);
        y.parent_id = Some(x.id);
        let forest = CategoryForest::from_categories(vec![x.clone(), y.clone()]);

        assert!(forest.children(None).is_empty());
        assert_eq!(forest.ancestor_path(x.id).unwrap().len(), 2);
        assert_eq!(forest.detect_all_cycles(), BTreeSet::from([x.id, y.id]));
        assert!(forest.would_create_cycle(Category::new("Z").id, Some(x.id)));
    }
}
