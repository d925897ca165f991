//! Intercompany transaction routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use meridian_db::entities::sea_orm_active_enums::IcTransactionType;
use meridian_db::repositories::intercompany::{
    CreateIntercompanyInput, IcSide, IntercompanyRepository,
};

use crate::error::error_response;
use crate::middleware::AuthUser;
use crate::AppState;

/// Creates the intercompany routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/intercompany", get(list_transactions))
        .route("/organizations/{org_id}/intercompany", post(create_transaction))
        .route("/intercompany/{tx_id}", get(get_transaction))
        .route("/intercompany/{tx_id}", delete(delete_transaction))
        .route("/intercompany/{tx_id}/link", post(link_entry))
        .route("/intercompany/{tx_id}/unlink", post(unlink_entry))
        .route("/intercompany/{tx_id}/approve-variance", post(approve_variance))
}

/// Request body for creating an intercompany transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// The originating company.
    pub from_company_id: Uuid,
    /// The counterparty company.
    pub to_company_id: Uuid,
    /// Transaction kind.
    pub transaction_type: IcTransactionType,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Agreed amount (decimal string).
    pub amount: Decimal,
    /// Currency of the amount.
    pub currency: String,
}

/// Which side a link/unlink request targets.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideRequest {
    /// The originating company's entry.
    From,
    /// The counterparty's entry.
    To,
}

impl From<SideRequest> for IcSide {
    fn from(value: SideRequest) -> Self {
        match value {
            SideRequest::From => Self::From,
            SideRequest::To => Self::To,
        }
    }
}

/// Request body for linking a journal entry.
#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    /// Which side to link.
    pub side: SideRequest,
    /// The journal entry.
    pub journal_entry_id: Uuid,
}

/// Request body for unlinking a side.
#[derive(Debug, Deserialize)]
pub struct UnlinkRequest {
    /// Which side to unlink.
    pub side: SideRequest,
}

/// Request body for approving a variance.
#[derive(Debug, Deserialize)]
pub struct ApproveVarianceRequest {
    /// Reviewer explanation (required).
    pub explanation: String,
}

async fn list_transactions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = IntercompanyRepository::new(state.db.clone());
    match repo.list(org_id).await {
        Ok(transactions) => (StatusCode::OK, Json(json!(transactions))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn create_transaction(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    let repo = IntercompanyRepository::new(state.db.clone());
    match repo
        .create(CreateIntercompanyInput {
            organization_id: org_id,
            from_company_id: payload.from_company_id,
            to_company_id: payload.to_company_id,
            transaction_type: payload.transaction_type,
            transaction_date: payload.transaction_date,
            amount: payload.amount,
            currency: payload.currency,
        })
        .await
    {
        Ok(transaction) => (StatusCode::CREATED, Json(json!(transaction))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn get_transaction(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(tx_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = IntercompanyRepository::new(state.db.clone());
    match repo.get(tx_id).await {
        Ok(transaction) => (StatusCode::OK, Json(json!(transaction))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn delete_transaction(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(tx_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = IntercompanyRepository::new(state.db.clone());
    match repo.delete(tx_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn link_entry(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(tx_id): Path<Uuid>,
    Json(payload): Json<LinkRequest>,
) -> impl IntoResponse {
    let repo = IntercompanyRepository::new(state.db.clone());
    match repo
        .link_entry(tx_id, payload.side.into(), payload.journal_entry_id)
        .await
    {
        Ok(transaction) => (StatusCode::OK, Json(json!(transaction))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn unlink_entry(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(tx_id): Path<Uuid>,
    Json(payload): Json<UnlinkRequest>,
) -> impl IntoResponse {
    let repo = IntercompanyRepository::new(state.db.clone());
    match repo.unlink_entry(tx_id, payload.side.into()).await {
        Ok(transaction) => (StatusCode::OK, Json(json!(transaction))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn approve_variance(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(tx_id): Path<Uuid>,
    Json(payload): Json<ApproveVarianceRequest>,
) -> impl IntoResponse {
    let repo = IntercompanyRepository::new(state.db.clone());
    match repo.approve_variance(tx_id, payload.explanation).await {
        Ok(transaction) => (StatusCode::OK, Json(json!(transaction))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}
