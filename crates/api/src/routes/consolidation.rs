//! Consolidation group, rule, and run routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use meridian_core::consolidation::{AccountSelector, RunOptions};
use meridian_core::consolidation::types::TriggerCondition;
use meridian_core::fiscal::FiscalPeriodRef;
use meridian_db::entities::sea_orm_active_enums::{ConsolidationMethod, EliminationRuleType};
use meridian_db::repositories::consolidation::{
    AddMemberInput, ConsolidationRepository, CreateGroupInput, CreateRuleInput,
};

use crate::error::error_response;
use crate::middleware::AuthUser;
use crate::AppState;

/// Creates the consolidation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/consolidation-groups", get(list_groups))
        .route("/organizations/{org_id}/consolidation-groups", post(create_group))
        .route("/consolidation-groups/{group_id}/members", post(add_member))
        .route("/consolidation-groups/{group_id}/rules", get(list_rules))
        .route("/consolidation-groups/{group_id}/rules", post(create_rule))
        .route("/consolidation-groups/{group_id}/runs", post(initiate_run))
        .route("/consolidation-runs/{run_id}", get(get_run))
        .route("/consolidation-runs/{run_id}/cancel", post(cancel_run))
}

/// Request body for creating a group.
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    /// Display name.
    pub name: String,
    /// Reporting currency.
    pub reporting_currency: String,
    /// The parent company.
    pub parent_company_id: Uuid,
}

/// Request body for adding a member.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// The member company.
    pub company_id: Uuid,
    /// Parent ownership percentage (decimal string, 0..=100).
    pub ownership_percentage: Decimal,
    /// Consolidation method.
    pub method: ConsolidationMethod,
    /// Acquisition date.
    pub acquisition_date: Option<NaiveDate>,
    /// Goodwill at acquisition.
    #[serde(default)]
    pub goodwill: Decimal,
    /// Variable-interest-entity flag.
    #[serde(default)]
    pub is_vie: bool,
}

/// Request body for creating an elimination rule.
#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    /// Display name.
    pub name: String,
    /// The debit/credit pattern.
    pub rule_type: EliminationRuleType,
    /// Gating conditions.
    #[serde(default)]
    pub trigger_conditions: Vec<TriggerCondition>,
    /// Source-side selectors.
    #[serde(default)]
    pub source_selectors: Vec<AccountSelector>,
    /// Target-side selectors.
    #[serde(default)]
    pub target_selectors: Vec<AccountSelector>,
    /// Explicit debit account for deferral rules.
    pub debit_account_id: Option<Uuid>,
    /// Explicit credit account for deferral rules.
    pub credit_account_id: Option<Uuid>,
    /// Evaluation order, ascending.
    #[serde(default = "default_priority")]
    pub priority: u16,
}

fn default_priority() -> u16 {
    100
}

/// Request body for initiating a run.
#[derive(Debug, Deserialize)]
pub struct InitiateRunRequest {
    /// Fiscal year of the consolidated period.
    pub fiscal_year: i32,
    /// Period number.
    pub period_number: u8,
    /// Balance cut-off date.
    pub as_of_date: NaiveDate,
    /// Skip the closed-period check.
    #[serde(default)]
    pub skip_validation: bool,
    /// Continue when Validate records warnings.
    #[serde(default)]
    pub continue_on_warnings: bool,
    /// Restart from step 1 even if steps completed earlier.
    #[serde(default)]
    pub force_regeneration: bool,
}

async fn list_groups(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ConsolidationRepository::new(state.db.clone());
    match repo.list_groups(org_id).await {
        Ok(groups) => (StatusCode::OK, Json(json!(groups))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn create_group(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreateGroupRequest>,
) -> impl IntoResponse {
    let repo = ConsolidationRepository::new(state.db.clone());
    match repo
        .create_group(CreateGroupInput {
            organization_id: org_id,
            name: payload.name,
            reporting_currency: payload.reporting_currency,
            parent_company_id: payload.parent_company_id,
        })
        .await
    {
        Ok(group) => (StatusCode::CREATED, Json(json!(group))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn add_member(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> impl IntoResponse {
    let repo = ConsolidationRepository::new(state.db.clone());
    match repo
        .add_member(AddMemberInput {
            group_id,
            company_id: payload.company_id,
            ownership_percentage: payload.ownership_percentage,
            method: payload.method,
            acquisition_date: payload.acquisition_date,
            goodwill: payload.goodwill,
            is_vie: payload.is_vie,
        })
        .await
    {
        Ok(member) => (StatusCode::CREATED, Json(json!(member))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn list_rules(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ConsolidationRepository::new(state.db.clone());
    match repo.list_rules(group_id).await {
        Ok(rules) => (StatusCode::OK, Json(json!(rules))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn create_rule(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<CreateRuleRequest>,
) -> impl IntoResponse {
    let repo = ConsolidationRepository::new(state.db.clone());
    match repo
        .create_rule(CreateRuleInput {
            group_id,
            name: payload.name,
            rule_type: payload.rule_type,
            trigger_conditions: payload.trigger_conditions,
            source_selectors: payload.source_selectors,
            target_selectors: payload.target_selectors,
            debit_account_id: payload.debit_account_id,
            credit_account_id: payload.credit_account_id,
            priority: payload.priority,
        })
        .await
    {
        Ok(rule) => (StatusCode::CREATED, Json(json!(rule))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn initiate_run(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<InitiateRunRequest>,
) -> impl IntoResponse {
    let repo = ConsolidationRepository::new(state.db.clone());
    match repo
        .initiate_run(
            group_id,
            FiscalPeriodRef {
                year: payload.fiscal_year,
                period: payload.period_number,
            },
            payload.as_of_date,
            RunOptions {
                skip_validation: payload.skip_validation,
                continue_on_warnings: payload.continue_on_warnings,
                force_regeneration: payload.force_regeneration,
            },
            auth.user_id(),
        )
        .await
    {
        Ok(run) => (StatusCode::CREATED, Json(json!(run))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn get_run(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(run_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ConsolidationRepository::new(state.db.clone());
    match repo.get_run(run_id).await {
        Ok(run) => (StatusCode::OK, Json(json!(run))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn cancel_run(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(run_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ConsolidationRepository::new(state.db.clone());
    match repo.cancel_run(run_id).await {
        Ok(run) => (StatusCode::OK, Json(json!(run))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}
