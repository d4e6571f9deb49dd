//! SQLite record store bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the catalog core.
//! - Apply schema migrations in deterministic order.
//! - Classify store failures that callers may retry.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write catalog data before migrations succeed.
//! - Connections are explicit handles owned by the caller; there is no
//!   process-wide store singleton.

use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_with_options};

pub type DbResult<T> = Result<T, DbError>;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection tuning applied by [`open_db_with_options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbOptions {
    /// How long a writer waits for the database lock before the call fails
    /// with a retryable store-unavailable error.
    pub busy_timeout: Duration,
    /// Switch file databases to WAL so readers never block on the writer.
    /// Ignored for in-memory databases.
    pub wal: bool,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            wal: true,
        }
    }
}

impl DbOptions {
    /// Returns options with a different lock wait budget.
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Returns whether the failure came from lock contention (busy/locked),
    /// i.e. the store was temporarily unavailable and the call can be retried.
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{DbError, DbOptions};
    use rusqlite::ffi;
    use std::time::Duration;

    #[test]
    fn busy_and_locked_failures_are_retryable() {
        let busy = DbError::Sqlite(rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_BUSY),
            None,
        ));
        let locked = DbError::Sqlite(rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_LOCKED),
            None,
        ));
        let constraint = DbError::Sqlite(rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_CONSTRAINT),
            None,
        ));

        assert!(busy.is_busy());
        assert!(locked.is_busy());
        assert!(!constraint.is_busy());
        assert!(!DbError::UnsupportedSchemaVersion {
            db_version: 9,
            latest_supported: 1
        }
        .is_busy());
    }

    #[test]
    fn default_options_enable_wal_with_bounded_wait() {
        let options = DbOptions::default();
        assert!(options.wal);
        assert_eq!(options.busy_timeout, Duration::from_secs(5));

        let tuned = options.with_busy_timeout(Duration::from_millis(20));
        assert_eq!(tuned.busy_timeout, Duration::from_millis(20));
    }
}
