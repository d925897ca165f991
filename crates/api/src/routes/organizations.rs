//! Organization, membership, audit log, and denial routes.

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

use meridian_db::repositories::organization::{CreateOrganizationInput, OrganizationRepository};

use crate::error::error_response;
use crate::middleware::AuthUser;
use crate::AppState;

/// Creates the organization routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations", post(create_organization))
        .route("/organizations/{org_id}", get(get_organization))
        .route("/organizations/{org_id}", delete(delete_organization))
        .route("/organizations/{org_id}/members", post(add_member))
        .route("/organizations/{org_id}/audit-log", get(list_audit_log))
        .route("/organizations/{org_id}/denials", get(list_denials))
}

/// Request body for creating an organization.
#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    /// Display name.
    pub name: String,
    /// Reporting currency (ISO 4217).
    pub reporting_currency: String,
    /// Locale tag.
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_locale() -> String {
    "en-US".to_string()
}

/// Request body for adding a member.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// The user to add.
    pub user_id: Uuid,
    /// Role name.
    pub role: meridian_db::entities::sea_orm_active_enums::UserRole,
}

async fn create_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateOrganizationRequest>,
) -> impl IntoResponse {
    let repo = OrganizationRepository::new(state.db.clone());
    match repo
        .create(CreateOrganizationInput {
            name: payload.name,
            reporting_currency: payload.reporting_currency,
            locale: payload.locale,
            owner_user_id: auth.user_id(),
        })
        .await
    {
        Ok(organization) => (StatusCode::CREATED, Json(json!(organization))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn get_organization(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = OrganizationRepository::new(state.db.clone());
    match repo.get(org_id).await {
        Ok(organization) => (StatusCode::OK, Json(json!(organization))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn delete_organization(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = OrganizationRepository::new(state.db.clone());
    match repo.delete(org_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn add_member(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> impl IntoResponse {
    let repo = OrganizationRepository::new(state.db.clone());
    match repo.add_member(org_id, payload.user_id, payload.role).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn list_audit_log(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.audit.list(org_id, 200).await {
        Ok(records) => (StatusCode::OK, Json(json!(records))).into_response(),
        Err(e) => error_response(500, "AuditLogError", &e.to_string()),
    }
}

async fn list_denials(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.policies.list_denials(org_id).await {
        Ok(denials) => (StatusCode::OK, Json(json!(denials))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}
