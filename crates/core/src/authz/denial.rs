//! Denial records and the append-only denial sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::engine::Decision;
use super::types::AccessRequest;

/// A record of a denied request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenialRecord {
    /// Organization the denial happened in.
    pub organization_id: Uuid,
    /// The denied user.
    pub user_id: Uuid,
    /// The attempted action.
    pub action: String,
    /// The resource type.
    pub resource_type: String,
    /// The resource id, when known.
    pub resource_id: Option<Uuid>,
    /// Every policy that matched during evaluation.
    pub matched_policy_ids: Vec<Uuid>,
    /// Caller IP.
    pub ip_address: Option<String>,
    /// Caller user agent.
    pub user_agent: Option<String>,
    /// When the denial happened.
    pub denied_at: DateTime<Utc>,
}

impl DenialRecord {
    /// Builds a record from a denied evaluation.
    #[must_use]
    pub fn from_decision(
        organization_id: Uuid,
        request: &AccessRequest,
        decision: &Decision,
    ) -> Self {
        Self {
            organization_id,
            user_id: request.subject.user_id,
            action: request.action.clone(),
            resource_type: request.resource.resource_type.clone(),
            resource_id: request.resource.resource_id,
            matched_policy_ids: decision.matched_policy_ids.clone(),
            ip_address: request.environment.ip_address.map(|ip| ip.to_string()),
            user_agent: request.environment.user_agent.clone(),
            denied_at: request.environment.timestamp,
        }
    }
}

/// Append-only sink for denial records.
#[async_trait]
pub trait DenialSink: Send + Sync {
    /// Appends a denial record. Failures are logged by callers; they never
    /// flip a deny into an allow.
    async fn record(&self, denial: DenialRecord);
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct InMemoryDenialSink {
    denials: RwLock<Vec<DenialRecord>>,
}

impl InMemoryDenialSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded denials.
    pub async fn denials(&self) -> Vec<DenialRecord> {
        self.denials.read().await.clone()
    }
}

#[async_trait]
impl DenialSink for InMemoryDenialSink {
    async fn record(&self, denial: DenialRecord) {
        self.denials.write().await.push(denial);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::engine::Decision;
    use crate::authz::types::{
        Effect, RequestEnvironment, ResourceAttributes, Subject,
    };

    #[tokio::test]
    async fn test_denial_record_captures_request_attributes() {
        let org = Uuid::new_v4();
        let user = Uuid::new_v4();
        let policy = Uuid::new_v4();
        let entry = Uuid::new_v4();

        let request = AccessRequest {
            subject: Subject {
                user_id: user,
                roles: vec!["accountant".to_string()],
            },
            action: "journal_entry:post".to_string(),
            resource: ResourceAttributes {
                resource_type: "journal_entry".to_string(),
                resource_id: Some(entry),
                ..ResourceAttributes::default()
            },
            environment: RequestEnvironment {
                ip_address: Some("10.1.2.3".parse().unwrap()),
                user_agent: Some("meridian-cli/0.1".to_string()),
                timestamp: Utc::now(),
                timezone: None,
            },
        };
        let decision = Decision {
            effect: Effect::Deny,
            matched_policy_ids: vec![policy],
            deciding_policy_id: Some(policy),
        };

        let record = DenialRecord::from_decision(org, &request, &decision);
        assert_eq!(record.user_id, user);
        assert_eq!(record.action, "journal_entry:post");
        assert_eq!(record.resource_type, "journal_entry");
        assert_eq!(record.resource_id, Some(entry));
        assert_eq!(record.matched_policy_ids, vec![policy]);
        assert_eq!(record.ip_address.as_deref(), Some("10.1.2.3"));

        let sink = InMemoryDenialSink::new();
        sink.record(record).await;
        assert_eq!(sink.denials().await.len(), 1);
    }
}
