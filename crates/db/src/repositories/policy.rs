//! Policy repository and authorization service.
//!
//! Policies are evaluated against an immutable snapshot captured per
//! request; the snapshot cache invalidates on every policy write, so a
//! write publishes a new snapshot atomically.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use meridian_core::authz::{
    self, AccessRequest, AuthorizationEngine, AuthzError, Decision, DenialRecord, Effect,
    Policy, PolicySnapshot,
};
use moka::sync::Cache;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::warn;
use uuid::Uuid;

use crate::entities::{authorization_denials, policies, sea_orm_active_enums::PolicyEffect};

/// TTL backstop for cached snapshots (writes invalidate eagerly).
const SNAPSHOT_TTL_SECS: u64 = 60;

/// Error types for policy operations.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// Domain rule violation.
    #[error(transparent)]
    Domain(#[from] AuthzError),

    /// A condition payload failed to parse.
    #[error("Invalid policy condition payload: {0}")]
    InvalidPayload(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PolicyError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Domain(err) => err.tag(),
            Self::InvalidPayload(_) => "InvalidPolicyConditionError",
            Self::Database(_) => "InternalServerError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Domain(err) => err.status_code(),
            Self::InvalidPayload(_) => 400,
            Self::Database(_) => 500,
        }
    }
}

/// Input for creating a policy.
#[derive(Debug, Clone)]
pub struct CreatePolicyInput {
    /// Organization scope.
    pub organization_id: Uuid,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Subject condition.
    pub subject: authz::SubjectCondition,
    /// Resource condition.
    pub resource: authz::ResourceCondition,
    /// Action condition.
    pub action: authz::ActionCondition,
    /// Environment condition.
    pub environment: Option<authz::EnvironmentCondition>,
    /// Allow or deny.
    pub effect: Effect,
    /// Priority (custom ≤ 899, system 900..=1000).
    pub priority: u16,
    /// System flag.
    pub is_system: bool,
    /// Creator.
    pub created_by: Option<Uuid>,
}

/// Policy repository and evaluation facade.
#[derive(Clone)]
pub struct PolicyRepository {
    db: DatabaseConnection,
    snapshots: Cache<Uuid, Arc<PolicySnapshot>>,
}

impl PolicyRepository {
    /// Creates a new policy repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            snapshots: Cache::builder()
                .time_to_live(Duration::from_secs(SNAPSHOT_TTL_SECS))
                .max_capacity(1_000)
                .build(),
        }
    }

    /// Creates a policy and publishes a fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns `PolicyPriorityOutOfRangeError` on a bad priority.
    pub async fn create(&self, input: CreatePolicyInput) -> Result<policies::Model, PolicyError> {
        authz::types::validate_priority(input.is_system, input.priority)?;

        let now = Utc::now().into();
        let model = policies::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(input.organization_id),
            name: Set(input.name),
            description: Set(input.description),
            subject: Set(to_json(&input.subject)?),
            resource: Set(to_json(&input.resource)?),
            action: Set(to_json(&input.action)?),
            environment: Set(match &input.environment {
                Some(env) => Some(to_json(env)?),
                None => None,
            }),
            effect: Set(input.effect.into()),
            priority: Set(i16::try_from(input.priority).unwrap_or(0)),
            is_system: Set(input.is_system),
            is_active: Set(true),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(&self.db).await?;
        self.snapshots.invalidate(&input.organization_id);
        Ok(created)
    }

    /// Deactivates a custom policy.
    ///
    /// # Errors
    ///
    /// Returns `SystemPolicyImmutableError` for system policies.
    pub async fn deactivate(&self, id: Uuid) -> Result<policies::Model, PolicyError> {
        let policy = self.get(id).await?;
        if policy.is_system {
            return Err(AuthzError::SystemPolicyImmutable.into());
        }
        let organization_id = policy.organization_id;
        let mut active: policies::ActiveModel = policy.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&self.db).await?;
        self.snapshots.invalidate(&organization_id);
        Ok(updated)
    }

    /// Deletes a custom policy.
    ///
    /// # Errors
    ///
    /// Returns `SystemPolicyImmutableError` for system policies.
    pub async fn delete(&self, id: Uuid) -> Result<(), PolicyError> {
        let policy = self.get(id).await?;
        if policy.is_system {
            return Err(AuthzError::SystemPolicyImmutable.into());
        }
        let organization_id = policy.organization_id;
        policies::Entity::delete_by_id(id).exec(&self.db).await?;
        self.snapshots.invalidate(&organization_id);
        Ok(())
    }

    /// Fetches a policy by id.
    ///
    /// # Errors
    ///
    /// Returns `PolicyNotFoundError` when it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<policies::Model, PolicyError> {
        policies::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AuthzError::PolicyNotFound(id).into())
    }

    /// Lists an organization's policies, priority-descending.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<policies::Model>, PolicyError> {
        Ok(policies::Entity::find()
            .filter(policies::Column::OrganizationId.eq(organization_id))
            .order_by_desc(policies::Column::Priority)
            .order_by_asc(policies::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Returns the organization's current policy snapshot (cached).
    ///
    /// # Errors
    ///
    /// Returns database errors or payload parse failures.
    pub async fn snapshot(
        &self,
        organization_id: Uuid,
    ) -> Result<Arc<PolicySnapshot>, PolicyError> {
        if let Some(snapshot) = self.snapshots.get(&organization_id) {
            return Ok(snapshot);
        }

        let models = self.list(organization_id).await?;
        let mut domain = Vec::with_capacity(models.len());
        for model in models {
            domain.push(to_domain_policy(model)?);
        }
        let snapshot = Arc::new(PolicySnapshot::new(organization_id, domain));
        self.snapshots.insert(organization_id, Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Evaluates a request against the snapshot, appending a denial
    /// record when the outcome is deny.
    ///
    /// A denial-sink failure is logged and surfaced separately; it never
    /// flips the decision.
    ///
    /// # Errors
    ///
    /// Returns database errors from snapshot loading.
    pub async fn evaluate(
        &self,
        organization_id: Uuid,
        request: &AccessRequest,
    ) -> Result<Decision, PolicyError> {
        let snapshot = self.snapshot(organization_id).await?;
        let decision = AuthorizationEngine::evaluate(&snapshot, request);

        if decision.effect == Effect::Deny {
            let record = DenialRecord::from_decision(organization_id, request, &decision);
            if let Err(error) = self.record_denial(&record).await {
                warn!(error = %error, "Failed to append authorization denial record");
            }
        }

        Ok(decision)
    }

    /// Appends a denial record.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn record_denial(&self, record: &DenialRecord) -> Result<(), PolicyError> {
        let model = authorization_denials::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(record.organization_id),
            user_id: Set(record.user_id),
            action: Set(record.action.clone()),
            resource_type: Set(record.resource_type.clone()),
            resource_id: Set(record.resource_id),
            matched_policy_ids: Set(serde_json::to_value(&record.matched_policy_ids)
                .unwrap_or(serde_json::Value::Null)),
            ip_address: Set(record.ip_address.clone()),
            user_agent: Set(record.user_agent.clone()),
            denied_at: Set(record.denied_at.into()),
        };
        model.insert(&self.db).await?;
        Ok(())
    }

    /// Lists an organization's denial records, newest first.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn list_denials(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<authorization_denials::Model>, PolicyError> {
        Ok(authorization_denials::Entity::find()
            .filter(authorization_denials::Column::OrganizationId.eq(organization_id))
            .order_by_desc(authorization_denials::Column::DeniedAt)
            .all(&self.db)
            .await?)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, PolicyError> {
    serde_json::to_value(value).map_err(|e| PolicyError::InvalidPayload(e.to_string()))
}

/// Maps a stored policy into the core domain type.
///
/// # Errors
///
/// Returns `InvalidPayload` when a condition column fails to parse.
pub fn to_domain_policy(model: policies::Model) -> Result<Policy, PolicyError> {
    Ok(Policy {
        id: model.id,
        organization_id: model.organization_id,
        name: model.name,
        description: model.description,
        subject: serde_json::from_value(model.subject)
            .map_err(|e| PolicyError::InvalidPayload(e.to_string()))?,
        resource: serde_json::from_value(model.resource)
            .map_err(|e| PolicyError::InvalidPayload(e.to_string()))?,
        action: serde_json::from_value(model.action)
            .map_err(|e| PolicyError::InvalidPayload(e.to_string()))?,
        environment: match model.environment {
            Some(env) => Some(
                serde_json::from_value(env)
                    .map_err(|e| PolicyError::InvalidPayload(e.to_string()))?,
            ),
            None => None,
        },
        effect: match model.effect {
            PolicyEffect::Allow => Effect::Allow,
            PolicyEffect::Deny => Effect::Deny,
        },
        priority: u16::try_from(model.priority).unwrap_or(0),
        is_system: model.is_system,
        is_active: model.is_active,
        created_at: model.created_at.into(),
    })
}
