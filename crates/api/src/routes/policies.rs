//! Authorization policy routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use meridian_core::authz::{
    AccessRequest, ActionCondition, AuthorizationEngine, Effect, EnvironmentCondition,
    RequestEnvironment, ResourceAttributes, ResourceCondition, Subject, SubjectCondition,
};
use meridian_db::repositories::policy::{CreatePolicyInput, PolicyRepository};

use crate::error::error_response;
use crate::middleware::AuthUser;
use crate::AppState;

/// Creates the policy routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/policies", get(list_policies))
        .route("/organizations/{org_id}/policies", post(create_policy))
        .route("/policies/{policy_id}", delete(delete_policy))
        .route("/policies/{policy_id}/deactivate", post(deactivate_policy))
        .route("/organizations/{org_id}/policies/test", post(test_policies))
}

/// Request body for creating a policy.
#[derive(Debug, Deserialize)]
pub struct CreatePolicyRequest {
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Subject condition.
    #[serde(default)]
    pub subject: SubjectCondition,
    /// Resource condition.
    #[serde(default)]
    pub resource: ResourceCondition,
    /// Action condition.
    #[serde(default)]
    pub action: ActionCondition,
    /// Environment condition.
    pub environment: Option<EnvironmentCondition>,
    /// Allow or deny.
    pub effect: Effect,
    /// Priority (custom policies cap at 899).
    pub priority: u16,
}

/// Request body for a dry-run policy evaluation.
#[derive(Debug, Deserialize)]
pub struct TestPolicyRequest {
    /// The subject user to evaluate as.
    pub user_id: Uuid,
    /// The subject's roles.
    #[serde(default)]
    pub roles: Vec<String>,
    /// The action, e.g. "journal_entry:post".
    pub action: String,
    /// The resource type.
    pub resource_type: String,
    /// Resource creator, for `isOwnEntry` conditions.
    pub created_by: Option<Uuid>,
}

async fn list_policies(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.policies.list(org_id).await {
        Ok(policies) => (StatusCode::OK, Json(json!(policies))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn create_policy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreatePolicyRequest>,
) -> impl IntoResponse {
    let repo: &PolicyRepository = &state.policies;
    match repo
        .create(CreatePolicyInput {
            organization_id: org_id,
            name: payload.name,
            description: payload.description,
            subject: payload.subject,
            resource: payload.resource,
            action: payload.action,
            environment: payload.environment,
            effect: payload.effect,
            priority: payload.priority,
            // Custom policies only; system policies ship with migrations.
            is_system: false,
            created_by: Some(auth.user_id()),
        })
        .await
    {
        Ok(policy) => (StatusCode::CREATED, Json(json!(policy))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn delete_policy(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(policy_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.policies.delete(policy_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn deactivate_policy(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(policy_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.policies.deactivate(policy_id).await {
        Ok(policy) => (StatusCode::OK, Json(json!(policy))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

/// Dry-run evaluation: returns the decision without recording a denial.
async fn test_policies(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<TestPolicyRequest>,
) -> impl IntoResponse {
    let snapshot = match state.policies.snapshot(org_id).await {
        Ok(snapshot) => snapshot,
        Err(e) => return error_response(e.status_code(), e.tag(), &e.to_string()),
    };

    let request = AccessRequest {
        subject: Subject {
            user_id: payload.user_id,
            roles: payload.roles,
        },
        action: payload.action,
        resource: ResourceAttributes {
            resource_type: payload.resource_type,
            created_by: payload.created_by,
            ..ResourceAttributes::default()
        },
        environment: RequestEnvironment::now(),
    };
    let decision = AuthorizationEngine::evaluate(&snapshot, &request);

    (
        StatusCode::OK,
        Json(json!({
            "effect": decision.effect,
            "matched_policy_ids": decision.matched_policy_ids,
            "deciding_policy_id": decision.deciding_policy_id,
        })),
    )
        .into_response()
}
