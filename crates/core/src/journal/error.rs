//! Journal engine error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::EntryStatus;

/// Errors that can occur during journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// An entry needs at least two lines.
    #[error("Journal entry must have at least 2 lines")]
    InsufficientLines,

    /// Debits and credits do not match.
    #[error("Journal entry is unbalanced: debits {total_debits} != credits {total_credits}")]
    Unbalanced {
        /// Total debits.
        total_debits: Decimal,
        /// Total credits.
        total_credits: Decimal,
        /// The currency the totals are expressed in.
        currency: String,
    },

    /// Line amount cannot be zero.
    #[error("Line amount cannot be zero")]
    ZeroAmount,

    /// Line amount cannot be negative.
    #[error("Line amount cannot be negative")]
    NegativeAmount,

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account is inactive.
    #[error("Account {0} is inactive")]
    AccountInactive(Uuid),

    /// Account does not allow direct posting.
    #[error("Account {0} is not postable")]
    AccountNotPostable(Uuid),

    /// Account belongs to a different company than the entry.
    #[error("Account {0} belongs to a different company")]
    AccountCompanyMismatch(Uuid),

    /// Line currency violates the account's currency restriction.
    #[error("Account {account_id} only accepts {restricted_to}, got {currency}")]
    CurrencyRestricted {
        /// The restricted account.
        account_id: Uuid,
        /// The offending currency.
        currency: String,
        /// The only currency the account accepts.
        restricted_to: String,
    },

    /// No exchange rate available for a line.
    #[error("No exchange rate found for {from} to {to} on {date}")]
    NoExchangeRate {
        /// Source currency code.
        from: String,
        /// Target currency code.
        to: String,
        /// The lookup date.
        date: NaiveDate,
    },

    /// The entry is not in the right status for the requested action.
    #[error("Journal entry is {current:?}; cannot {action}")]
    InvalidStatus {
        /// Current entry status.
        current: EntryStatus,
        /// The attempted action.
        action: &'static str,
    },

    /// Approver must differ from the creator when SoD is enabled.
    #[error("Approver must be different from the entry creator")]
    SelfApprovalNotAllowed,

    /// Rejection requires a reason.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    NotFound(Uuid),

    /// Entry was already reversed.
    #[error("Journal entry {0} has already been reversed")]
    AlreadyReversed(Uuid),

    /// The target fiscal period is closed.
    #[error("Fiscal period for {0} is closed")]
    FiscalPeriodClosed(NaiveDate),

    /// No fiscal period covers the date.
    #[error("No fiscal period found for date {0}")]
    NoFiscalPeriod(NaiveDate),
}

impl JournalError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "InsufficientJournalLinesError",
            Self::Unbalanced { .. } => "UnbalancedJournalEntryError",
            Self::ZeroAmount => "ZeroAmountError",
            Self::NegativeAmount => "NegativeAmountError",
            Self::AccountNotFound(_) => "AccountNotFoundError",
            Self::AccountInactive(_) => "AccountInactiveError",
            Self::AccountNotPostable(_) => "AccountNotPostableError",
            Self::AccountCompanyMismatch(_) => "AccountCompanyMismatchError",
            Self::CurrencyRestricted { .. } => "CurrencyRestrictedError",
            Self::NoExchangeRate { .. } => "ExchangeRateNotFoundError",
            Self::InvalidStatus { .. } => "JournalEntryStatusError",
            Self::SelfApprovalNotAllowed => "SelfApprovalNotAllowedError",
            Self::RejectionReasonRequired => "RejectionReasonRequiredError",
            Self::NotFound(_) => "JournalEntryNotFoundError",
            Self::AlreadyReversed(_) => "JournalEntryAlreadyReversedError",
            Self::FiscalPeriodClosed(_) => "FiscalPeriodClosedError",
            Self::NoFiscalPeriod(_) => "FiscalPeriodNotFoundForDateError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InsufficientLines
            | Self::Unbalanced { .. }
            | Self::ZeroAmount
            | Self::NegativeAmount
            | Self::RejectionReasonRequired => 400,
            Self::AccountNotFound(_) | Self::NotFound(_) | Self::NoFiscalPeriod(_) => 404,
            Self::InvalidStatus { .. } | Self::AlreadyReversed(_) => 409,
            Self::AccountInactive(_)
            | Self::AccountNotPostable(_)
            | Self::AccountCompanyMismatch(_)
            | Self::CurrencyRestricted { .. }
            | Self::NoExchangeRate { .. }
            | Self::SelfApprovalNotAllowed
            | Self::FiscalPeriodClosed(_) => 422,
        }
    }
}
