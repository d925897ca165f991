//! Journal entry lifecycle routes.

use std::collections::BTreeMap;

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
use tracing::info;
use uuid::Uuid;

use meridian_core::authz::ResourceAttributes;
use meridian_core::journal::{
    CreateEntryInput, EntryType, JournalLineInput, LineSide, SourceModule,
};
use meridian_db::repositories::journal::{EntryWithLines, JournalRepository};

use crate::error::error_response;
use crate::middleware::{require, AuthUser};
use crate::AppState;

/// Creates the journal entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/journal-entries", get(list_entries))
        .route("/companies/{company_id}/journal-entries", post(create_entry))
        .route("/journal-entries/{entry_id}", get(get_entry))
        .route("/journal-entries/{entry_id}", delete(delete_entry))
        .route("/journal-entries/{entry_id}/submit", post(submit_entry))
        .route("/journal-entries/{entry_id}/approve", post(approve_entry))
        .route("/journal-entries/{entry_id}/reject", post(reject_entry))
        .route("/journal-entries/{entry_id}/post", post(post_entry))
        .route("/journal-entries/{entry_id}/reverse", post(reverse_entry))
}

/// Request body for a journal line.
#[derive(Debug, Deserialize)]
pub struct LineRequest {
    /// The account to post to.
    pub account_id: Uuid,
    /// Debit or credit.
    pub side: LineSide,
    /// Amount in transaction currency (decimal string).
    pub amount: Decimal,
    /// Transaction currency.
    pub currency: String,
    /// Exchange rate captured at creation.
    pub exchange_rate: Option<Decimal>,
    /// Optional memo.
    pub memo: Option<String>,
    /// Reporting dimensions.
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
    /// Counterparty company for intercompany lines.
    pub intercompany_partner_id: Option<Uuid>,
    /// Matched line on the counterparty's books.
    pub matching_line_id: Option<Uuid>,
}

/// Request body for creating a journal entry.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    /// Entry type.
    #[serde(default = "default_entry_type")]
    pub entry_type: EntryType,
    /// Originating module.
    #[serde(default = "default_source_module")]
    pub source_module: SourceModule,
    /// Economic date of the transaction.
    pub transaction_date: NaiveDate,
    /// Date on the source document.
    pub document_date: Option<NaiveDate>,
    /// Overrides period resolution when set.
    pub posting_date: Option<NaiveDate>,
    /// Description.
    pub description: String,
    /// External reference.
    pub reference: Option<String>,
    /// The lines (at least 2).
    pub lines: Vec<LineRequest>,
}

fn default_entry_type() -> EntryType {
    EntryType::Standard
}

fn default_source_module() -> SourceModule {
    SourceModule::GeneralLedger
}

/// Request body for rejecting an entry.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Why the entry was rejected.
    pub reason: String,
}

/// Request body for reversing an entry.
#[derive(Debug, Deserialize)]
pub struct ReverseRequest {
    /// The date the reversal posts on; must fall in an open period.
    pub reversal_date: NaiveDate,
}

fn entry_response(status: StatusCode, result: &EntryWithLines) -> axum::response::Response {
    (
        status,
        Json(json!({
            "entry": result.entry,
            "lines": result.lines,
        })),
    )
        .into_response()
}

impl CreateEntryRequest {
    fn into_input(self, company_id: Uuid, created_by: Uuid) -> CreateEntryInput {
        CreateEntryInput {
            company_id,
            entry_type: self.entry_type,
            source_module: self.source_module,
            transaction_date: self.transaction_date,
            document_date: self.document_date,
            posting_date: self.posting_date,
            description: self.description,
            reference: self.reference,
            lines: self
                .lines
                .into_iter()
                .map(|line| JournalLineInput {
                    account_id: line.account_id,
                    side: line.side,
                    amount: line.amount,
                    currency: line.currency,
                    exchange_rate: line.exchange_rate,
                    memo: line.memo,
                    dimensions: line.dimensions,
                    intercompany_partner_id: line.intercompany_partner_id,
                    matching_line_id: line.matching_line_id,
                })
                .collect(),
            created_by,
        }
    }
}

async fn list_entries(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = JournalRepository::new(state.db.clone());
    match repo.list(company_id, None).await {
        Ok(entries) => (StatusCode::OK, Json(json!(entries))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn create_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<CreateEntryRequest>,
) -> impl IntoResponse {
    if let Err(response) = require(
        &state,
        &auth,
        "journal_entry:create",
        ResourceAttributes {
            resource_type: "journal_entry".to_string(),
            journal_entry_type: Some(payload.entry_type),
            ..ResourceAttributes::default()
        },
    )
    .await
    {
        return response;
    }

    let repo = JournalRepository::new(state.db.clone());
    match repo
        .create_entry(payload.into_input(company_id, auth.user_id()))
        .await
    {
        Ok(result) => entry_response(StatusCode::CREATED, &result),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn get_entry(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = JournalRepository::new(state.db.clone());
    match repo.get_entry(entry_id).await {
        Ok(result) => entry_response(StatusCode::OK, &result),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn delete_entry(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = JournalRepository::new(state.db.clone());
    match repo.delete_entry(entry_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn submit_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = JournalRepository::new(state.db.clone());
    match repo.submit(entry_id, auth.user_id()).await {
        Ok(entry) => (StatusCode::OK, Json(json!(entry))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn approve_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require(
        &state,
        &auth,
        "journal_entry:approve",
        ResourceAttributes {
            resource_type: "journal_entry".to_string(),
            resource_id: Some(entry_id),
            ..ResourceAttributes::default()
        },
    )
    .await
    {
        return response;
    }

    let repo = JournalRepository::new(state.db.clone());
    match repo.approve(entry_id, auth.user_id()).await {
        Ok(entry) => (StatusCode::OK, Json(json!(entry))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn reject_entry(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> impl IntoResponse {
    let repo = JournalRepository::new(state.db.clone());
    match repo.reject(entry_id, payload.reason).await {
        Ok(entry) => (StatusCode::OK, Json(json!(entry))).into_response(),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn post_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> impl IntoResponse {
    // Posting your own entry can be denied by an isOwnEntry policy.
    let repo = JournalRepository::new(state.db.clone());
    let created_by = match repo.get_entry(entry_id).await {
        Ok(result) => result.entry.created_by,
        Err(e) => return error_response(e.status_code(), e.tag(), &e.to_string()),
    };

    if let Err(response) = require(
        &state,
        &auth,
        "journal_entry:post",
        ResourceAttributes {
            resource_type: "journal_entry".to_string(),
            resource_id: Some(entry_id),
            created_by: Some(created_by),
            ..ResourceAttributes::default()
        },
    )
    .await
    {
        return response;
    }

    match repo.post_entry(entry_id, auth.user_id()).await {
        Ok(result) => {
            info!(entry_id = %entry_id, "Journal entry posted via API");
            entry_response(StatusCode::OK, &result)
        }
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}

async fn reverse_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<ReverseRequest>,
) -> impl IntoResponse {
    if let Err(response) = require(
        &state,
        &auth,
        "journal_entry:reverse",
        ResourceAttributes {
            resource_type: "journal_entry".to_string(),
            resource_id: Some(entry_id),
            ..ResourceAttributes::default()
        },
    )
    .await
    {
        return response;
    }

    let repo = JournalRepository::new(state.db.clone());
    match repo
        .reverse_entry(entry_id, auth.user_id(), payload.reversal_date)
        .await
    {
        Ok(result) => entry_response(StatusCode::CREATED, &result),
        Err(e) => error_response(e.status_code(), e.tag(), &e.to_string()),
    }
}
