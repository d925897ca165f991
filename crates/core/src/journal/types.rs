//! Journal entry domain types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Journal entry status in the workflow lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Entry is being drafted and can be modified.
    Draft,
    /// Entry has been submitted for approval.
    PendingApproval,
    /// Entry has been approved and is ready for posting.
    Approved,
    /// Entry has been posted to the ledger (immutable).
    Posted,
    /// Entry has been reversed by a reversing entry (immutable).
    Reversed,
}

impl EntryStatus {
    /// Returns true if the entry can be modified or deleted.
    #[must_use]
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the entry is immutable.
    #[must_use]
    pub fn is_immutable(self) -> bool {
        matches!(self, Self::Posted | Self::Reversed)
    }
}

/// Journal entry type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Regular journal entry.
    Standard,
    /// Period-end adjusting entry.
    Adjusting,
    /// Opening balance entry.
    Opening,
    /// System-generated year-end closing entry.
    Closing,
    /// System-generated reversal of a posted entry.
    Reversing,
    /// Entry carrying intercompany balances.
    Intercompany,
}

impl EntryType {
    /// System-generated entries may post into periods the open-period gate
    /// would otherwise reject (closing entries target the year being
    /// closed).
    #[must_use]
    pub fn is_system_generated(self) -> bool {
        matches!(self, Self::Closing | Self::Reversing)
    }
}

/// Where a journal entry originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceModule {
    /// Manually entered in the general ledger.
    GeneralLedger,
    /// Sourced from accounts payable.
    AccountsPayable,
    /// Sourced from accounts receivable.
    AccountsReceivable,
    /// Created by intercompany processing.
    Intercompany,
    /// Created by a consolidation run.
    Consolidation,
    /// Created by the system (closing, reversal).
    System,
}

/// The side of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSide {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

impl LineSide {
    /// Returns the opposite side.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// Input for a single journal line.
///
/// Exactly one side carries a positive amount in the transaction currency;
/// functional amounts are resolved at posting time.
#[derive(Debug, Clone)]
pub struct JournalLineInput {
    /// The account to post to.
    pub account_id: Uuid,
    /// Debit or credit.
    pub side: LineSide,
    /// Amount in transaction currency (must be positive).
    pub amount: Decimal,
    /// Transaction currency code (ISO 4217).
    pub currency: String,
    /// Exchange rate captured at creation; looked up at posting when absent.
    pub exchange_rate: Option<Decimal>,
    /// Optional memo.
    pub memo: Option<String>,
    /// Free-form reporting dimensions.
    pub dimensions: BTreeMap<String, String>,
    /// Counterparty company for intercompany lines.
    pub intercompany_partner_id: Option<Uuid>,
    /// The matched line on the counterparty's books.
    pub matching_line_id: Option<Uuid>,
}

/// Input for creating a journal entry.
#[derive(Debug, Clone)]
pub struct CreateEntryInput {
    /// The company this entry belongs to.
    pub company_id: Uuid,
    /// Entry type.
    pub entry_type: EntryType,
    /// Originating module.
    pub source_module: SourceModule,
    /// Economic date of the transaction.
    pub transaction_date: NaiveDate,
    /// Date on the source document, if different.
    pub document_date: Option<NaiveDate>,
    /// Overrides the period resolution date when set.
    pub posting_date: Option<NaiveDate>,
    /// Description of the entry.
    pub description: String,
    /// External reference (document number).
    pub reference: Option<String>,
    /// The lines (at least 2).
    pub lines: Vec<JournalLineInput>,
    /// The user creating the entry.
    pub created_by: Uuid,
}

impl CreateEntryInput {
    /// Returns the date used for fiscal period resolution.
    #[must_use]
    pub fn period_date(&self) -> NaiveDate {
        self.posting_date.unwrap_or(self.transaction_date)
    }
}

/// Account attributes needed for line validation.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: Uuid,
    /// The company the account belongs to.
    pub company_id: Uuid,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether lines may post here directly.
    pub is_postable: bool,
    /// Restricts postings to one currency when set.
    pub currency_restriction: Option<String>,
}

/// A line with resolved exchange rate and functional amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLine {
    /// 1-based position within the entry.
    pub line_number: u32,
    /// The account posted to.
    pub account_id: Uuid,
    /// Debit or credit.
    pub side: LineSide,
    /// Amount in transaction currency.
    pub amount: Decimal,
    /// Transaction currency code.
    pub currency: String,
    /// The exchange rate applied (transaction → functional).
    pub exchange_rate: Decimal,
    /// Functional currency code.
    pub functional_currency: String,
    /// Amount in functional currency.
    pub functional_amount: Decimal,
    /// Debit amount in functional currency (0 if credit).
    pub debit: Decimal,
    /// Credit amount in functional currency (0 if debit).
    pub credit: Decimal,
    /// Optional memo.
    pub memo: Option<String>,
    /// Reporting dimensions.
    pub dimensions: BTreeMap<String, String>,
    /// Counterparty company for intercompany lines.
    pub intercompany_partner_id: Option<Uuid>,
    /// The matched line on the counterparty's books.
    pub matching_line_id: Option<Uuid>,
}

/// Functional-currency totals of an entry.
#[derive(Debug, Clone)]
pub struct EntryTotals {
    /// Total debit amount in functional currency.
    pub functional_debit: Decimal,
    /// Total credit amount in functional currency.
    pub functional_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub fn new(functional_debit: Decimal, functional_credit: Decimal) -> Self {
        Self {
            functional_debit,
            functional_credit,
            is_balanced: functional_debit == functional_credit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_editability() {
        assert!(EntryStatus::Draft.is_editable());
        assert!(!EntryStatus::PendingApproval.is_editable());
        assert!(!EntryStatus::Approved.is_editable());
        assert!(!EntryStatus::Posted.is_editable());
        assert!(!EntryStatus::Reversed.is_editable());
    }

    #[test]
    fn test_status_immutability() {
        assert!(EntryStatus::Posted.is_immutable());
        assert!(EntryStatus::Reversed.is_immutable());
        assert!(!EntryStatus::Approved.is_immutable());
    }

    #[test]
    fn test_system_generated_types() {
        assert!(EntryType::Closing.is_system_generated());
        assert!(EntryType::Reversing.is_system_generated());
        assert!(!EntryType::Standard.is_system_generated());
        assert!(!EntryType::Adjusting.is_system_generated());
    }

    #[test]
    fn test_line_side_flip() {
        assert_eq!(LineSide::Debit.flipped(), LineSide::Credit);
        assert_eq!(LineSide::Credit.flipped(), LineSide::Debit);
    }

    #[test]
    fn test_period_date_prefers_posting_date() {
        let mut input = CreateEntryInput {
            company_id: Uuid::new_v4(),
            entry_type: EntryType::Standard,
            source_module: SourceModule::GeneralLedger,
            transaction_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            document_date: None,
            posting_date: None,
            description: "Test".to_string(),
            reference: None,
            lines: vec![],
            created_by: Uuid::new_v4(),
        };
        assert_eq!(input.period_date(), input.transaction_date);

        input.posting_date = NaiveDate::from_ymd_opt(2025, 7, 1);
        assert_eq!(input.period_date(), input.posting_date.unwrap());
    }
}
