//! Account error types.

use meridian_shared::types::AccountId;
use thiserror::Error;

/// Errors that can occur during chart-of-accounts operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Account number already exists in the company.
    #[error("Account number {number} already exists in this company")]
    NumberAlreadyExists {
        /// The conflicting 4-digit account number.
        number: String,
    },

    /// Account numbers are exactly four digits.
    #[error("Account number must be exactly 4 digits: {0}")]
    InvalidNumber(String),

    /// Parent account not found.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountId),

    /// Parent must belong to the same company.
    #[error("Parent account belongs to a different company")]
    ParentCompanyMismatch,

    /// Reparenting would create a cycle in the hierarchy.
    #[error("Assigning this parent would create a cycle in the account hierarchy")]
    CircularHierarchy,

    /// The hierarchy is limited to a fixed depth.
    #[error("Account hierarchy cannot exceed {max} levels")]
    HierarchyTooDeep {
        /// The maximum number of levels.
        max: usize,
    },

    /// Deactivation is blocked by active children.
    #[error("Account has active child accounts and cannot be deactivated")]
    HasActiveChildAccounts,

    /// Deactivation is blocked by posted lines.
    #[error("Account has posted journal lines and cannot be deactivated")]
    HasPostedLines,

    /// Account is inactive.
    #[error("Account {0} is inactive")]
    Inactive(AccountId),

    /// Only equity accounts can be flagged as retained earnings.
    #[error("Retained earnings flag requires an equity account")]
    RetainedEarningsNotEquity,

    /// At most one retained-earnings account per company.
    #[error("Company already has a retained earnings account")]
    RetainedEarningsAlreadyConfigured,

    /// Templates can only be applied to an empty chart of accounts.
    #[error("Company already has accounts; template cannot be applied")]
    CompanyAlreadyHasAccounts,
}

impl AccountError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "AccountNotFoundError",
            Self::NumberAlreadyExists { .. } => "AccountNumberAlreadyExistsError",
            Self::InvalidNumber(_) => "InvalidAccountNumberError",
            Self::ParentNotFound(_) => "ParentAccountNotFoundError",
            Self::ParentCompanyMismatch => "ParentCompanyMismatchError",
            Self::CircularHierarchy => "CircularAccountHierarchyError",
            Self::HierarchyTooDeep { .. } => "AccountHierarchyTooDeepError",
            Self::HasActiveChildAccounts => "HasActiveChildAccountsError",
            Self::HasPostedLines => "AccountHasPostedLinesError",
            Self::Inactive(_) => "AccountInactiveError",
            Self::RetainedEarningsNotEquity => "RetainedEarningsNotEquityError",
            Self::RetainedEarningsAlreadyConfigured => "RetainedEarningsAlreadyConfiguredError",
            Self::CompanyAlreadyHasAccounts => "CompanyAlreadyHasAccountsError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::ParentNotFound(_) => 404,
            Self::InvalidNumber(_) => 400,
            Self::NumberAlreadyExists { .. }
            | Self::RetainedEarningsAlreadyConfigured
            | Self::CompanyAlreadyHasAccounts => 409,
            Self::ParentCompanyMismatch
            | Self::CircularHierarchy
            | Self::HierarchyTooDeep { .. }
            | Self::HasActiveChildAccounts
            | Self::HasPostedLines
            | Self::Inactive(_)
            | Self::RetainedEarningsNotEquity => 422,
        }
    }
}
