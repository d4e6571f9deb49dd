//! Read-only audit trail facade and retention purge.
//!
//! # Invariants
//! - Reads never mutate entries.
//! - Retention purge runs as its own statement, never inside a business
//!   mutation.

use crate::model::audit::{AuditLog, EntityType};
use crate::repo::audit_repo::{AuditListQuery, AuditRepository};
use crate::repo::RepoResult;
use log::{error, info};
use std::time::Instant;
use uuid::Uuid;

/// Audit trail service facade.
pub struct AuditTrail<R: AuditRepository> {
    repo: R,
}

impl<R: AuditRepository> AuditTrail<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists entries newest first.
    pub fn list(&self, query: &AuditListQuery) -> RepoResult<Vec<AuditLog>> {
        self.repo.list(query)
    }

    /// First page of entries for one entity type.
    pub fn by_entity_type(&self, entity_type: EntityType) -> RepoResult<Vec<AuditLog>> {
        self.repo.list(&AuditListQuery::for_entity_type(entity_type))
    }

    /// First page of entries for one entity.
    pub fn by_entity(&self, entity_type: EntityType, entity_id: Uuid) -> RepoResult<Vec<AuditLog>> {
        self.repo
            .list(&AuditListQuery::for_entity(entity_type, entity_id))
    }

    /// Deletes entries older than `cutoff_ms` (epoch ms); returns the count.
    pub fn purge_older_than(&self, cutoff_ms: i64) -> RepoResult<usize> {
        let started_at = Instant::now();
        match self.repo.purge_before(cutoff_ms) {
            Ok(removed) => {
                info!(
                    "event=audit_purge module=service status=ok removed={removed} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(removed)
            }
            Err(err) => {
                error!(
                    "event=audit_purge module=service status=error duration_ms={} error_code=audit_purge_failed error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }
}
