//! Account domain types.

use meridian_shared::types::{AccountId, CompanyId};
use serde::{Deserialize, Serialize};

/// The five fundamental account types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned by the company.
    Asset,
    /// Obligations owed to others.
    Liability,
    /// Residual interest of the owners.
    Equity,
    /// Income earned from operations.
    Revenue,
    /// Costs incurred in operations.
    Expense,
}

impl AccountType {
    /// Returns the normal balance side for this account type.
    ///
    /// Assets and expenses increase with debits; liabilities, equity, and
    /// revenue increase with credits.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Returns true for income statement accounts (revenue and expense).
    #[must_use]
    pub const fn is_income_statement(self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }

    /// Returns true for balance sheet accounts.
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        !self.is_income_statement()
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        };
        write!(f, "{s}")
    }
}

/// The side on which an account's balance normally sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal account.
    Debit,
    /// Credit-normal account.
    Credit,
}

/// Cash flow statement classification (ASC 230).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowCategory {
    /// Operating activities.
    Operating,
    /// Investing activities.
    Investing,
    /// Financing activities.
    Financing,
}

/// A node in a company's chart of accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Company this account belongs to.
    pub company_id: CompanyId,
    /// 4-digit account number, unique per company.
    pub number: String,
    /// Display name.
    pub name: String,
    /// Fundamental account type.
    pub account_type: AccountType,
    /// Reporting category (e.g. "current_asset", "operating_expense").
    pub category: String,
    /// Normal balance side.
    pub normal_balance: NormalBalance,
    /// Optional parent account in the same company.
    pub parent_account_id: Option<AccountId>,
    /// Depth in the hierarchy (root accounts are level 1).
    pub hierarchy_level: u8,
    /// Whether journal lines may post directly to this account.
    pub is_postable: bool,
    /// Cash flow statement classification, if relevant.
    pub cash_flow_category: Option<CashFlowCategory>,
    /// Whether this account carries intercompany balances.
    pub is_intercompany: bool,
    /// The counterparty company for intercompany accounts.
    pub intercompany_partner_id: Option<CompanyId>,
    /// Restricts postings to a single currency when set.
    pub currency_restriction: Option<String>,
    /// Whether this is the company's retained earnings account.
    pub is_retained_earnings: bool,
    /// Whether the account is active.
    pub is_active: bool,
}

impl Account {
    /// Returns true if lines tagged with this account feed the cash flow
    /// statement.
    #[must_use]
    pub const fn is_cash_flow_relevant(&self) -> bool {
        self.cash_flow_category.is_some()
    }
}

/// Validates that an account number is exactly four ASCII digits.
///
/// # Errors
///
/// Returns `AccountError::InvalidNumber` otherwise.
pub fn validate_number(number: &str) -> Result<(), super::error::AccountError> {
    if number.len() == 4 && number.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(super::error::AccountError::InvalidNumber(number.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AccountType::Asset, NormalBalance::Debit)]
    #[case(AccountType::Expense, NormalBalance::Debit)]
    #[case(AccountType::Liability, NormalBalance::Credit)]
    #[case(AccountType::Equity, NormalBalance::Credit)]
    #[case(AccountType::Revenue, NormalBalance::Credit)]
    fn test_normal_balance_by_type(
        #[case] account_type: AccountType,
        #[case] expected: NormalBalance,
    ) {
        assert_eq!(account_type.normal_balance(), expected);
    }

    #[test]
    fn test_income_statement_split() {
        assert!(AccountType::Revenue.is_income_statement());
        assert!(AccountType::Expense.is_income_statement());
        assert!(AccountType::Asset.is_balance_sheet());
        assert!(AccountType::Liability.is_balance_sheet());
        assert!(AccountType::Equity.is_balance_sheet());
    }

    #[rstest]
    #[case("1000", true)]
    #[case("9999", true)]
    #[case("100", false)]
    #[case("10000", false)]
    #[case("10a0", false)]
    #[case("", false)]
    fn test_validate_number(#[case] number: &str, #[case] valid: bool) {
        assert_eq!(validate_number(number).is_ok(), valid);
    }
}
