//! Intercompany transaction types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of intercompany transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntercompanyTransactionType {
    /// Intra-group sale of goods or services.
    Sale,
    /// Intra-group loan.
    Loan,
    /// Dividend paid up the chain.
    Dividend,
    /// Management or service fee.
    ManagementFee,
    /// Cost allocation.
    Allocation,
    /// Intra-group asset transfer.
    AssetTransfer,
}

/// Matching status of an intercompany transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingStatus {
    /// Neither side is linked to a journal entry.
    Unmatched,
    /// Exactly one side is linked.
    PartiallyMatched,
    /// Both sides linked within tolerance.
    Matched,
    /// A reviewer explicitly approved an out-of-tolerance variance.
    /// Sticky until a side is unlinked.
    VarianceApproved,
}

/// An intercompany transaction between two group companies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntercompanyTransaction {
    /// Unique identifier.
    pub id: Uuid,
    /// Organization scope.
    pub organization_id: Uuid,
    /// The selling/lending company.
    pub from_company_id: Uuid,
    /// The buying/borrowing company.
    pub to_company_id: Uuid,
    /// Transaction kind.
    pub transaction_type: IntercompanyTransactionType,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Agreed amount.
    pub amount: Decimal,
    /// Currency of the agreed amount.
    pub currency: String,
    /// The originating company's journal entry, once booked.
    pub from_journal_entry_id: Option<Uuid>,
    /// The counterparty's journal entry, once booked.
    pub to_journal_entry_id: Option<Uuid>,
    /// Current matching status.
    pub matching_status: MatchingStatus,
    /// Absolute difference between the two booked sides.
    pub variance: Decimal,
    /// Reviewer explanation for an approved variance.
    pub variance_explanation: Option<String>,
}
