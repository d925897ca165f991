//! Year-end close types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::AccountType;
use crate::journal::CreateEntryInput;

/// A revenue or expense balance entering the close.
///
/// Balances are natural-signed: positive means the balance sits on the
/// account's normal side (credit for revenue, debit for expense).
#[derive(Debug, Clone)]
pub struct AccountClosingBalance {
    /// The account.
    pub account_id: Uuid,
    /// Its fundamental type.
    pub account_type: AccountType,
    /// Natural-signed balance in functional currency.
    pub balance: Decimal,
}

/// Conditions blocking a year-end close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CloseBlocker {
    /// Draft, pending, or approved entries still exist in the year.
    UnpostedEntries {
        /// How many entries are not posted.
        count: u64,
    },
    /// The year's trial balance does not balance.
    TrialBalanceNotBalanced {
        /// Total debit balances, serialized as a decimal string.
        debits: String,
        /// Total credit balances, serialized as a decimal string.
        credits: String,
    },
    /// No retained earnings account is configured.
    RetainedEarningsNotConfigured,
}

/// Result of a close preview.
#[derive(Debug, Clone)]
pub struct ClosePreview {
    /// Net income for the year (revenue − expenses).
    pub net_income: Decimal,
    /// Total revenue balances.
    pub total_revenue: Decimal,
    /// Total expense balances.
    pub total_expenses: Decimal,
    /// The retained earnings account the close will offset into.
    pub retained_earnings_account_id: Option<Uuid>,
    /// Conditions that will block the close.
    pub blockers: Vec<CloseBlocker>,
}

impl ClosePreview {
    /// Returns true when the year can be closed.
    #[must_use]
    pub fn can_close(&self) -> bool {
        self.blockers.is_empty()
    }
}

/// The entries and figures produced by a close.
#[derive(Debug)]
pub struct CloseOutcome {
    /// System-generated closing entries, ready for posting.
    pub closing_entries: Vec<CreateEntryInput>,
    /// Net income rolled into retained earnings.
    pub net_income: Decimal,
    /// Total revenue closed out.
    pub total_revenue: Decimal,
    /// Total expenses closed out.
    pub total_expenses: Decimal,
}
