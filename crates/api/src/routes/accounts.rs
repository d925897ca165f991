//! Chart of accounts routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use meridian_core::account::{AccountType, CoaTemplate};
use meridian_db::repositories::account::{AccountRepository, CreateAccountInput};

use crate::error::error_response;
use crate::middleware::AuthUser;
use crate::AppState;

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/accounts", get(list_accounts))
        .route("/companies/{company_id}/accounts", post(create_account))
        .route(
            "/companies/{company_id}/accounts/template",
            post(apply_template),
        )
        .route("/accounts/{account_id}", get(get_account))
        .route("/accounts/{account_id}/reparent", post(reparent_account))
        .route("/accounts/{account_id}/deactivate", post(deactivate_account))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// 4-digit number.
    pub number: String,
    /// Display name.
    pub name: String,
    /// Fundamental type.
    pub account_type: AccountType,
    /// Reporting category.
    pub category: String,
    /// Optional parent account.
    pub parent_account_id: Option<Uuid>,
    /// Whether lines may post here directly.
    #[serde(default = "default_true")]
    pub is_postable: bool,
    /// Cash flow classification ("operating" | "investing" | "financing").
    pub cash_flow_category: Option<String>,
    /// Intercompany flag.
    #[serde(default)]
    pub is_intercompany: bool,
    /// Counterparty company for intercompany accounts.
    pub intercompany_partner_id: Option<Uuid>,
    /// Restricts postings to one currency.
    pub currency_restriction: Option<String>,
    /// Marks the retained earnings account.
    #[serde(default)]
    pub is_retained_earnings: bool,
}

fn default_true() -> bool {
    true
}

/// Request body for applying a template.
#[derive(Debug, Deserialize)]
pub struct ApplyTemplateRequest {
    /// Template name.
    pub template: CoaTemplate,
}

/// Request body for reparenting an account.
#[derive(Debug, Deserialize)]
pub struct ReparentRequest {
    /// The new parent, or none for a root account.
    pub parent_account_id: Option<Uuid>,
}

async fn list_accounts(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = AccountRepository::new(state.db.clone());
    match repo.list(company_id).await {
        Ok(accounts) => (StatusCode::OK, Json(json!(accounts))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn create_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let repo = AccountRepository::new(state.db.clone());
    match repo
        .create(CreateAccountInput {
            company_id,
            number: payload.number,
            name: payload.name,
            account_type: payload.account_type,
            category: payload.category,
            parent_account_id: payload.parent_account_id,
            is_postable: payload.is_postable,
            cash_flow_category: payload.cash_flow_category,
            is_intercompany: payload.is_intercompany,
            intercompany_partner_id: payload.intercompany_partner_id,
            currency_restriction: payload.currency_restriction,
            is_retained_earnings: payload.is_retained_earnings,
        })
        .await
    {
        Ok(account) => (StatusCode::CREATED, Json(json!(account))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn apply_template(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<ApplyTemplateRequest>,
) -> impl IntoResponse {
    let repo = AccountRepository::new(state.db.clone());
    match repo.apply_template(company_id, payload.template).await {
        Ok(accounts) => (StatusCode::CREATED, Json(json!(accounts))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn get_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(account_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = AccountRepository::new(state.db.clone());
    match repo.get(account_id).await {
        Ok(account) => (StatusCode::OK, Json(json!(account))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn reparent_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<ReparentRequest>,
) -> impl IntoResponse {
    let repo = AccountRepository::new(state.db.clone());
    match repo.reparent(account_id, payload.parent_account_id).await {
        Ok(account) => (StatusCode::OK, Json(json!(account))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn deactivate_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(account_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = AccountRepository::new(state.db.clone());
    match repo.deactivate(account_id).await {
        Ok(account) => (StatusCode::OK, Json(json!(account))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}
