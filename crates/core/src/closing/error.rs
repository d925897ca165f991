//! Year-end close error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during year-end close operations.
#[derive(Debug, Error)]
pub enum ClosingError {
    /// The company has no retained earnings account configured.
    #[error("Company has no retained earnings account configured")]
    RetainedEarningsNotConfigured,

    /// Close requires an Open year.
    #[error("Fiscal year is not open")]
    YearNotOpen,

    /// Reopen requires a Closed year.
    #[error("Fiscal year is not closed")]
    YearNotClosed,

    /// Unposted entries block the close.
    #[error("{count} unposted journal entries exist in the fiscal year")]
    UnpostedEntriesExist {
        /// Number of entries not yet posted.
        count: u64,
    },

    /// The trial balance does not balance.
    #[error("Trial balance is not balanced: debits {debits} != credits {credits}")]
    TrialBalanceNotBalanced {
        /// Total debit balances.
        debits: Decimal,
        /// Total credit balances.
        credits: Decimal,
    },

    /// Reopen requires the closing entries of a prior close.
    #[error("Fiscal year has no closing entries to reverse")]
    NoClosingEntries,
}

impl ClosingError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::RetainedEarningsNotConfigured => "RetainedEarningsNotConfiguredError",
            Self::YearNotOpen | Self::YearNotClosed => "InvalidYearStatusTransitionError",
            Self::UnpostedEntriesExist { .. } => "UnpostedEntriesExistError",
            Self::TrialBalanceNotBalanced { .. } => "TrialBalanceNotBalancedError",
            Self::NoClosingEntries => "NoClosingEntriesError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        422
    }
}
