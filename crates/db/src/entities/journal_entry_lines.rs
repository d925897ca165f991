//! `SeaORM` entity for the journal entry lines table.
//!
//! Lines carry both transaction-currency and functional-currency amounts
//! plus the captured exchange rate, so posted entries stay re-derivable
//! without consulting the mutable rate store. `company_id`,
//! `transaction_date`, and `is_posted` are denormalized from the header
//! for balance queries.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::NormalBalance;

/// A journal entry line.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entry_lines")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning entry.
    pub entry_id: Uuid,
    /// Owning company (denormalized).
    pub company_id: Uuid,
    /// 1-based position within the entry.
    pub line_number: i32,
    /// The account posted to.
    pub account_id: Uuid,
    /// Side of the line ("debit" uses the debit column).
    pub side: NormalBalance,
    /// Amount in transaction currency.
    pub amount: Decimal,
    /// Transaction currency code.
    pub currency: String,
    /// Captured exchange rate (transaction → functional).
    pub exchange_rate: Decimal,
    /// Functional currency code.
    pub functional_currency: String,
    /// Amount in functional currency.
    pub functional_amount: Decimal,
    /// Functional debit (zero for credit lines).
    pub debit: Decimal,
    /// Functional credit (zero for debit lines).
    pub credit: Decimal,
    /// Optional memo.
    pub memo: Option<String>,
    /// Free-form reporting dimensions.
    pub dimensions: Json,
    /// Counterparty company for intercompany lines.
    pub intercompany_partner_id: Option<Uuid>,
    /// Matched line on the counterparty's books.
    pub matching_line_id: Option<Uuid>,
    /// Transaction date (denormalized).
    pub transaction_date: Date,
    /// True once the entry is posted (denormalized).
    pub is_posted: bool,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
