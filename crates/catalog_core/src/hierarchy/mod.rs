//! Category hierarchy view and cycle detection.
//!
//! # Responsibility
//! - Derive parent/child structure from category rows.
//! - Answer descendant, ancestor-path, children and cycle-safety queries.
//!
//! # Invariants
//! - The view holds no independent truth; it is rebuilt from one scan.
//! - Write-path cycle checks walk parent links with point lookups instead.
//! - Traversals are iterative with explicit visited sets, so deep or
//!   corrupted (cyclic) data terminates without exhausting the call stack.

pub mod cycle;
pub mod forest;
pub mod parent_walk;

pub use forest::CategoryForest;

use crate::model::category::CategoryId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Errors from hierarchy queries.
#[derive(Debug)]
pub enum HierarchyError {
    /// Category does not exist or is soft-deleted.
    NotFound(CategoryId),
    /// Loading the category snapshot failed.
    Repo(RepoError),
}

impl Display for HierarchyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "Category not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HierarchyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for HierarchyError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
