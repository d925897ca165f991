//! Fiscal year and period routes, including year-end close.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use meridian_core::authz::ResourceAttributes;
use meridian_db::repositories::fiscal::FiscalRepository;
use meridian_db::repositories::year_end::YearEndRepository;

use crate::error::error_response;
use crate::middleware::{require, AuthUser};
use crate::AppState;

/// Creates the fiscal calendar routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/fiscal-years", post(create_year))
        .route(
            "/companies/{company_id}/fiscal-years/{year}/preview-close",
            get(preview_close),
        )
        .route(
            "/companies/{company_id}/fiscal-years/{year}/close",
            post(close_year),
        )
        .route(
            "/companies/{company_id}/fiscal-years/{year}/reopen",
            post(reopen_year),
        )
        .route("/fiscal-periods/{period_id}/close", post(close_period))
        .route("/fiscal-periods/{period_id}/open", post(open_period))
        .route(
            "/fiscal-periods/{period_id}/reopen-history",
            get(reopen_history),
        )
        .route(
            "/companies/{company_id}/fiscal-periods/resolve/{date}",
            get(resolve_period),
        )
}

/// Request body for creating a fiscal year.
#[derive(Debug, Deserialize)]
pub struct CreateYearRequest {
    /// Year number (e.g. 2025).
    pub year: i32,
    /// First day of the fiscal year.
    pub start_date: NaiveDate,
    /// Whether to append a 13th adjustment period.
    #[serde(default)]
    pub with_adjustment_period: bool,
}

/// Request body for reopening.
#[derive(Debug, Default, Deserialize)]
pub struct ReopenRequest {
    /// Optional justification, logged in the reopen history.
    pub reason: Option<String>,
}

async fn create_year(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<CreateYearRequest>,
) -> impl IntoResponse {
    let repo = FiscalRepository::new(state.db.clone());
    match repo
        .create_year(
            company_id,
            payload.year,
            payload.start_date,
            payload.with_adjustment_period,
        )
        .await
    {
        Ok((year, periods)) => (
            StatusCode::CREATED,
            Json(json!({ "year": year, "periods": periods })),
        )
            .into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn preview_close(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((company_id, year)): Path<(Uuid, i32)>,
) -> impl IntoResponse {
    let repo = YearEndRepository::new(state.db.clone());
    match repo.preview(company_id, year).await {
        Ok(preview) => (
            StatusCode::OK,
            Json(json!({
                "net_income": preview.net_income.to_string(),
                "total_revenue": preview.total_revenue.to_string(),
                "total_expenses": preview.total_expenses.to_string(),
                "retained_earnings_account_id": preview.retained_earnings_account_id,
                "blockers": preview.blockers,
                "can_close": preview.can_close(),
            })),
        )
            .into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn close_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((company_id, year)): Path<(Uuid, i32)>,
) -> impl IntoResponse {
    if let Err(response) = require(
        &state,
        &auth,
        "fiscal_year:close",
        ResourceAttributes {
            resource_type: "fiscal_year".to_string(),
            ..ResourceAttributes::default()
        },
    )
    .await
    {
        return response;
    }

    let repo = YearEndRepository::new(state.db.clone());
    match repo.close_year(company_id, year, auth.user_id()).await {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "closing_entry_ids": result.closing_entry_ids,
                "net_income": result.net_income.to_string(),
                "periods_closed": result.periods_closed,
            })),
        )
            .into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn reopen_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((company_id, year)): Path<(Uuid, i32)>,
    Json(payload): Json<ReopenRequest>,
) -> impl IntoResponse {
    if let Err(response) = require(
        &state,
        &auth,
        "fiscal_year:reopen",
        ResourceAttributes {
            resource_type: "fiscal_year".to_string(),
            ..ResourceAttributes::default()
        },
    )
    .await
    {
        return response;
    }

    let repo = YearEndRepository::new(state.db.clone());
    match repo
        .reopen_year(company_id, year, auth.user_id(), payload.reason)
        .await
    {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "reversing_entry_ids": result.reversing_entry_ids,
                "periods_reopened": result.periods_reopened,
            })),
        )
            .into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn close_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(period_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require(
        &state,
        &auth,
        "fiscal_period:manage",
        ResourceAttributes {
            resource_type: "fiscal_period".to_string(),
            resource_id: Some(period_id),
            ..ResourceAttributes::default()
        },
    )
    .await
    {
        return response;
    }

    let repo = FiscalRepository::new(state.db.clone());
    match repo.close_period(period_id, auth.user_id()).await {
        Ok(period) => (StatusCode::OK, Json(json!(period))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn open_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(period_id): Path<Uuid>,
    Json(payload): Json<ReopenRequest>,
) -> impl IntoResponse {
    if let Err(response) = require(
        &state,
        &auth,
        "fiscal_period:manage",
        ResourceAttributes {
            resource_type: "fiscal_period".to_string(),
            resource_id: Some(period_id),
            ..ResourceAttributes::default()
        },
    )
    .await
    {
        return response;
    }

    let repo = FiscalRepository::new(state.db.clone());
    match repo
        .open_period(period_id, auth.user_id(), payload.reason)
        .await
    {
        Ok(period) => (StatusCode::OK, Json(json!(period))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn reopen_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(period_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = FiscalRepository::new(state.db.clone());
    match repo.reopen_history(period_id).await {
        Ok(history) => (StatusCode::OK, Json(json!(history))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn resolve_period(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((company_id, date)): Path<(Uuid, NaiveDate)>,
) -> impl IntoResponse {
    let repo = FiscalRepository::new(state.db.clone());
    match repo.resolve_period_for_date(company_id, date).await {
        Ok(period) => (StatusCode::OK, Json(json!(period))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}
