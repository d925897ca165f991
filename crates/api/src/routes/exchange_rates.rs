//! Exchange rate routes.

use axum::{
    extract::{Path, Query, State},
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

use meridian_core::fx::RateType;
use meridian_db::repositories::exchange_rate::{CreateRateInput, ExchangeRateRepository};

use crate::error::error_response;
use crate::middleware::AuthUser;
use crate::AppState;

/// Creates the exchange rate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/exchange-rates", post(create_rate))
        .route(
            "/organizations/{org_id}/exchange-rates/bulk",
            post(bulk_create_rates),
        )
        .route(
            "/organizations/{org_id}/exchange-rates/lookup",
            get(lookup_rate),
        )
        .route("/organizations/{org_id}/exchange-rates", get(list_rates))
}

/// Request body for creating a rate.
#[derive(Debug, Deserialize)]
pub struct CreateRateRequest {
    /// Source currency.
    pub from_currency: String,
    /// Target currency.
    pub to_currency: String,
    /// Effective date.
    pub effective_date: NaiveDate,
    /// Rate kind.
    #[serde(default = "default_rate_type")]
    pub rate_type: RateType,
    /// Units of target per unit of source (decimal string).
    pub rate: Decimal,
    /// Provider name or "manual".
    pub source: Option<String>,
}

fn default_rate_type() -> RateType {
    RateType::Spot
}

/// Request body for the atomic bulk upload.
#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    /// The rates; either every row is inserted or none.
    pub rates: Vec<CreateRateRequest>,
}

/// Query parameters for rate lookup.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// Source currency.
    pub from: String,
    /// Target currency.
    pub to: String,
    /// Rate kind.
    #[serde(default = "default_rate_type")]
    pub rate_type: RateType,
    /// Lookup date; the closest rate on or before it wins. Defaults to
    /// today, making the lookup equivalent to "latest".
    pub date: Option<NaiveDate>,
}

/// Query parameters for listing a pair.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Source currency.
    pub from: String,
    /// Target currency.
    pub to: String,
}

fn to_input(org_id: Uuid, actor: Uuid, request: CreateRateRequest) -> CreateRateInput {
    CreateRateInput {
        organization_id: org_id,
        from_currency: request.from_currency,
        to_currency: request.to_currency,
        effective_date: request.effective_date,
        rate_type: request.rate_type,
        rate: request.rate,
        source: request.source,
        created_by: Some(actor),
    }
}

async fn create_rate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreateRateRequest>,
) -> impl IntoResponse {
    let repo = ExchangeRateRepository::new(state.db.clone());
    match repo.create(to_input(org_id, auth.user_id(), payload)).await {
        Ok(rate) => (StatusCode::CREATED, Json(json!(rate))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn bulk_create_rates(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<BulkCreateRequest>,
) -> impl IntoResponse {
    let repo = ExchangeRateRepository::new(state.db.clone());
    let inputs = payload
        .rates
        .into_iter()
        .map(|r| to_input(org_id, auth.user_id(), r))
        .collect();
    match repo.bulk_create(inputs).await {
        Ok(rates) => (StatusCode::CREATED, Json(json!(rates))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn lookup_rate(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<LookupQuery>,
) -> impl IntoResponse {
    let repo = ExchangeRateRepository::new(state.db.clone());
    let date = query.date.unwrap_or_else(|| chrono::Utc::now().date_naive());
    match repo
        .get_closest(org_id, &query.from, &query.to, query.rate_type, date)
        .await
    {
        Ok(Some((rate, effective_date))) => (
            StatusCode::OK,
            Json(json!({
                "from_currency": query.from.to_uppercase(),
                "to_currency": query.to.to_uppercase(),
                "rate": rate.to_string(),
                "effective_date": effective_date,
            })),
        )
            .into_response(),
        Ok(None) => error_response(
            404,
            "ExchangeRateNotFoundError",
            &format!(
                "No exchange rate found for {}/{} on or before {date}",
                query.from.to_uppercase(),
                query.to.to_uppercase()
            ),
        ),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn list_rates(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let repo = ExchangeRateRepository::new(state.db.clone());
    match repo.list_pair(org_id, &query.from, &query.to).await {
        Ok(rates) => (StatusCode::OK, Json(json!(rates))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}
