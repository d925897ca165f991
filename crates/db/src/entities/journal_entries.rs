//! `SeaORM` entity for the journal entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{EntryStatus, EntryType, SourceModule};

/// A journal entry header.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Monotonic per-company number, assigned at posting.
    pub entry_number: Option<i64>,
    /// Lifecycle status.
    pub status: EntryStatus,
    /// Entry type.
    pub entry_type: EntryType,
    /// Originating module.
    pub source_module: SourceModule,
    /// Economic date of the transaction.
    pub transaction_date: Date,
    /// Date on the source document.
    pub document_date: Option<Date>,
    /// Overrides period resolution when set.
    pub posting_date: Option<Date>,
    /// The resolved fiscal period, set at posting.
    pub fiscal_period_id: Option<Uuid>,
    /// Description.
    pub description: String,
    /// External reference.
    pub reference: Option<String>,
    /// Total functional debits, set at posting.
    pub total_debit: Decimal,
    /// Total functional credits, set at posting.
    pub total_credit: Decimal,
    /// The company's functional currency at posting time.
    pub functional_currency: String,
    /// Creator.
    pub created_by: Uuid,
    /// Submitter.
    pub submitted_by: Option<Uuid>,
    /// Submission time.
    pub submitted_at: Option<DateTimeWithTimeZone>,
    /// Approver.
    pub approved_by: Option<Uuid>,
    /// Approval time.
    pub approved_at: Option<DateTimeWithTimeZone>,
    /// Poster.
    pub posted_by: Option<Uuid>,
    /// Posting time.
    pub posted_at: Option<DateTimeWithTimeZone>,
    /// Last rejection reason.
    pub rejection_reason: Option<String>,
    /// The entry this one reverses.
    pub reversed_entry_id: Option<Uuid>,
    /// The entry reversing this one.
    pub reversing_entry_id: Option<Uuid>,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Last update time.
    pub updated_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
