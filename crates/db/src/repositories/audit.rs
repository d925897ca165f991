//! Audit log store.
//!
//! The production implementation of the append-only audit sink. Posting
//! and close paths write their audit rows inside the same transaction as
//! the domain write; this store serves the API layer's request-scoped
//! appends and the audit log query surface.

use async_trait::async_trait;
use meridian_shared::audit::{AuditRecord, AuditSink, AuditSinkError};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::audit_log;

/// Database-backed audit sink and query surface.
#[derive(Debug, Clone)]
pub struct AuditLogStore {
    db: DatabaseConnection,
}

impl AuditLogStore {
    /// Creates a new audit log store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists an organization's audit records, newest first.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn list(
        &self,
        organization_id: Uuid,
        limit: u64,
    ) -> Result<Vec<audit_log::Model>, DbErr> {
        audit_log::Entity::find()
            .filter(audit_log::Column::OrganizationId.eq(organization_id))
            .order_by_desc(audit_log::Column::RecordedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }
}

#[async_trait]
impl AuditSink for AuditLogStore {
    async fn append(&self, record: AuditRecord) -> Result<(), AuditSinkError> {
        let model = audit_log::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(record.organization_id),
            actor_id: Set(record.actor_id),
            action: Set(record.action),
            entity_type: Set(record.entity_type),
            entity_id: Set(record.entity_id),
            details: Set(record.details),
            recorded_at: Set(record.recorded_at.into()),
        };
        model
            .insert(&self.db)
            .await
            .map_err(|e| AuditSinkError(e.to_string()))?;
        Ok(())
    }
}
