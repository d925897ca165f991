//! Company routes.

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

use meridian_core::authz::ResourceAttributes;
use meridian_db::repositories::company::{CompanyRepository, CreateCompanyInput};

use crate::error::error_response;
use crate::middleware::{require, AuthUser};
use crate::AppState;

/// Creates the company routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/companies", get(list_companies))
        .route("/organizations/{org_id}/companies", post(create_company))
        .route("/companies/{company_id}", get(get_company))
        .route("/companies/{company_id}/deactivate", post(deactivate_company))
        .route(
            "/companies/{company_id}/retained-earnings-account",
            post(set_retained_earnings),
        )
}

/// Request body for creating a company.
#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    /// Display name.
    pub name: String,
    /// Jurisdiction (country code).
    pub jurisdiction: String,
    /// Functional currency.
    pub functional_currency: String,
    /// Reporting currency.
    pub reporting_currency: String,
    /// Fiscal year end month (1-12).
    #[serde(default = "default_fye_month")]
    pub fiscal_year_end_month: i16,
    /// Fiscal year end day.
    #[serde(default = "default_fye_day")]
    pub fiscal_year_end_day: i16,
}

fn default_fye_month() -> i16 {
    12
}

fn default_fye_day() -> i16 {
    31
}

/// Request body for pointing at the retained earnings account.
#[derive(Debug, Deserialize)]
pub struct SetRetainedEarningsRequest {
    /// The equity account.
    pub account_id: Uuid,
}

async fn list_companies(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CompanyRepository::new(state.db.clone());
    match repo.list(org_id).await {
        Ok(companies) => (StatusCode::OK, Json(json!(companies))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn create_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreateCompanyRequest>,
) -> impl IntoResponse {
    if let Err(response) = require(
        &state,
        &auth,
        "company:create",
        ResourceAttributes {
            resource_type: "company".to_string(),
            ..ResourceAttributes::default()
        },
    )
    .await
    {
        return response;
    }

    let repo = CompanyRepository::new(state.db.clone());
    match repo
        .create(CreateCompanyInput {
            organization_id: org_id,
            name: payload.name,
            jurisdiction: payload.jurisdiction,
            functional_currency: payload.functional_currency,
            reporting_currency: payload.reporting_currency,
            fiscal_year_end_month: payload.fiscal_year_end_month,
            fiscal_year_end_day: payload.fiscal_year_end_day,
        })
        .await
    {
        Ok(company) => (StatusCode::CREATED, Json(json!(company))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn get_company(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CompanyRepository::new(state.db.clone());
    match repo.get(company_id).await {
        Ok(company) => (StatusCode::OK, Json(json!(company))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn deactivate_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require(
        &state,
        &auth,
        "company:deactivate",
        ResourceAttributes {
            resource_type: "company".to_string(),
            resource_id: Some(company_id),
            ..ResourceAttributes::default()
        },
    )
    .await
    {
        return response;
    }

    let repo = CompanyRepository::new(state.db.clone());
    match repo.deactivate(company_id).await {
        Ok(company) => (StatusCode::OK, Json(json!(company))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn set_retained_earnings(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<SetRetainedEarningsRequest>,
) -> impl IntoResponse {
    let repo = CompanyRepository::new(state.db.clone());
    match repo
        .set_retained_earnings_account(company_id, payload.account_id)
        .await
    {
        Ok(company) => (StatusCode::OK, Json(json!(company))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}
