//! Append-only audit sink abstraction.
//!
//! Every durable mutation appends an `AuditRecord` through an `AuditSink`.
//! The sink is an interface: the database layer provides the production
//! implementation, while tests use the in-memory sink. Sink failures never
//! roll back the domain write that preceded them; callers surface them as
//! infrastructure errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A single audit trail record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Organization the action happened in.
    pub organization_id: Uuid,
    /// The acting user, if any (system actions carry none).
    pub actor_id: Option<Uuid>,
    /// Action name, e.g. `journal_entry:post`.
    pub action: String,
    /// Entity type the action targeted.
    pub entity_type: String,
    /// Entity id the action targeted.
    pub entity_id: Uuid,
    /// Structured details (amounts, status transitions).
    pub details: serde_json::Value,
    /// When the action happened.
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(
        organization_id: Uuid,
        actor_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Uuid,
        details: serde_json::Value,
    ) -> Self {
        Self {
            organization_id,
            actor_id,
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id,
            details,
            recorded_at: Utc::now(),
        }
    }
}

/// Error returned by audit sinks.
#[derive(Debug, thiserror::Error)]
#[error("Audit sink failure: {0}")]
pub struct AuditSinkError(pub String);

/// Append-only sink for audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Appends a record. Implementations must never mutate prior records.
    async fn append(&self, record: AuditRecord) -> Result<(), AuditSinkError>;
}

/// In-memory sink used by tests and local tooling.
#[derive(Default)]
pub struct InMemoryAuditSink {
    records: RwLock<Vec<AuditRecord>>,
}

impl InMemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all appended records.
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn append(&self, record: AuditRecord) -> Result<(), AuditSinkError> {
        self.records.write().await.push(record);
        Ok(())
    }
}
