//! Catalog domain model.
//!
//! # Responsibility
//! - Define the canonical records owned by the catalog core.
//! - Provide lifecycle helpers for soft-delete semantics.
//!
//! # Invariants
//! - Every catalog entity is identified by a stable UUID surrogate key.
//! - Deletion of categories, books and authors is a soft-delete tombstone;
//!   only `BookAuthor` links are physically removed.
//! - Timestamps are Unix epoch milliseconds.

pub mod audit;
pub mod author;
pub mod book;
pub mod category;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Falls back to `0` if the system clock is set before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
