//! Report routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use meridian_core::reports::{CashFlowMethod, ReportService};
use meridian_db::repositories::company::CompanyRepository;
use meridian_db::repositories::consolidation::ConsolidationRepository;
use meridian_db::repositories::journal::JournalRepository;

use crate::error::error_response;
use crate::middleware::AuthUser;
use crate::AppState;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/reports/trial-balance", get(trial_balance))
        .route("/companies/{company_id}/reports/balance-sheet", get(balance_sheet))
        .route(
            "/companies/{company_id}/reports/income-statement",
            get(income_statement),
        )
        .route("/companies/{company_id}/reports/cash-flow", get(cash_flow))
        .route("/companies/{company_id}/reports/equity", get(equity_statement))
        .route(
            "/consolidation-runs/{run_id}/reports/trial-balance",
            get(consolidated_trial_balance),
        )
        .route(
            "/consolidation-runs/{run_id}/reports/balance-sheet",
            get(consolidated_balance_sheet),
        )
}

/// Point-in-time query.
#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    /// The reporting date; defaults to today.
    pub as_of: Option<NaiveDate>,
}

/// Period query.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
}

/// Cash flow query.
#[derive(Debug, Deserialize)]
pub struct CashFlowQuery {
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
    /// Presentation method.
    #[serde(default = "default_method")]
    pub method: CashFlowMethod,
}

fn default_method() -> CashFlowMethod {
    CashFlowMethod::Indirect
}

async fn trial_balance(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<AsOfQuery>,
) -> impl IntoResponse {
    let as_of = query.as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let companies = CompanyRepository::new(state.db.clone());
    let company = match companies.get(company_id).await {
        Ok(company) => company,
        Err(e) => return error_response(e.status_code(), e.tag(), &e.to_string()),
    };

    let journal = JournalRepository::new(state.db.clone());
    match journal.balance_rows(company_id, as_of).await {
        Ok(rows) => {
            let report =
                ReportService::trial_balance(rows, as_of, &company.functional_currency);
            (StatusCode::OK, Json(json!(report))).into_response()
        }
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn balance_sheet(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<AsOfQuery>,
) -> impl IntoResponse {
    let as_of = query.as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let companies = CompanyRepository::new(state.db.clone());
    let company = match companies.get(company_id).await {
        Ok(company) => company,
        Err(e) => return error_response(e.status_code(), e.tag(), &e.to_string()),
    };

    let journal = JournalRepository::new(state.db.clone());
    match journal.balance_rows(company_id, as_of).await {
        Ok(rows) => {
            let report =
                ReportService::balance_sheet(&rows, as_of, &company.functional_currency);
            (StatusCode::OK, Json(json!(report))).into_response()
        }
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn income_statement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<PeriodQuery>,
) -> impl IntoResponse {
    let companies = CompanyRepository::new(state.db.clone());
    let company = match companies.get(company_id).await {
        Ok(company) => company,
        Err(e) => return error_response(e.status_code(), e.tag(), &e.to_string()),
    };

    let journal = JournalRepository::new(state.db.clone());
    match journal
        .movements(company_id, query.period_start, query.period_end)
        .await
    {
        Ok(movements) => {
            // Income statement rows come from the period's movements on
            // revenue and expense accounts.
            let rows: Vec<meridian_core::reports::AccountBalanceRow> = movements
                .iter()
                .map(|m| meridian_core::reports::AccountBalanceRow {
                    account_id: Uuid::nil(),
                    account_number: m.account_number.clone(),
                    account_name: m.account_name.clone(),
                    account_type: m.account_type,
                    category: String::new(),
                    cash_flow_category: m.cash_flow_category,
                    debit_total: m.movement.max(rust_decimal::Decimal::ZERO),
                    credit_total: (-m.movement).max(rust_decimal::Decimal::ZERO),
                })
                .collect();
            let report = ReportService::income_statement(
                &rows,
                query.period_start,
                query.period_end,
                &company.functional_currency,
            );
            (StatusCode::OK, Json(json!(report))).into_response()
        }
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn cash_flow(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<CashFlowQuery>,
) -> impl IntoResponse {
    let companies = CompanyRepository::new(state.db.clone());
    let company = match companies.get(company_id).await {
        Ok(company) => company,
        Err(e) => return error_response(e.status_code(), e.tag(), &e.to_string()),
    };

    let journal = JournalRepository::new(state.db.clone());
    let movements = match journal
        .movements(company_id, query.period_start, query.period_end)
        .await
    {
        Ok(movements) => movements,
        Err(e) => return error_response(e.status_code(), e.tag(), &e.to_string()),
    };

    // Net income over the period from income statement movements.
    let net_income = -movements
        .iter()
        .filter(|m| m.account_type.is_income_statement())
        .map(|m| m.movement)
        .sum::<rust_decimal::Decimal>();

    let report = ReportService::cash_flow(
        &movements,
        net_income,
        query.method,
        query.period_start,
        query.period_end,
        &company.functional_currency,
    );
    (StatusCode::OK, Json(json!(report))).into_response()
}

async fn equity_statement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<PeriodQuery>,
) -> impl IntoResponse {
    let companies = CompanyRepository::new(state.db.clone());
    let company = match companies.get(company_id).await {
        Ok(company) => company,
        Err(e) => return error_response(e.status_code(), e.tag(), &e.to_string()),
    };

    let journal = JournalRepository::new(state.db.clone());
    let movements = match journal
        .movements(company_id, query.period_start, query.period_end)
        .await
    {
        Ok(movements) => movements,
        Err(e) => return error_response(e.status_code(), e.tag(), &e.to_string()),
    };

    let net_income = -movements
        .iter()
        .filter(|m| m.account_type.is_income_statement())
        .map(|m| m.movement)
        .sum::<rust_decimal::Decimal>();

    let report = ReportService::equity_statement(
        &movements,
        net_income,
        query.period_start,
        query.period_end,
        &company.functional_currency,
    );
    (StatusCode::OK, Json(json!(report))).into_response()
}

async fn consolidated_trial_balance(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(run_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ConsolidationRepository::new(state.db.clone());
    let run = match repo.get_run(run_id).await {
        Ok(run) => run,
        Err(e) => return error_response(e.status_code(), e.tag(), &e.to_string()),
    };
    match ReportService::consolidated_trial_balance(&run) {
        Ok(tb) => (StatusCode::OK, Json(json!(tb))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn consolidated_balance_sheet(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(run_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ConsolidationRepository::new(state.db.clone());
    let run = match repo.get_run(run_id).await {
        Ok(run) => run,
        Err(e) => return error_response(e.status_code(), e.tag(), &e.to_string()),
    };
    match ReportService::consolidated_balance_sheet(&run, run.as_of_date) {
        Ok(report) => (StatusCode::OK, Json(json!(report))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}
