//! Report types.
//!
//! Input rows carry signed balances (positive = net debit); reports
//! present amounts on the side a reader expects (assets debit-positive,
//! liabilities and equity credit-positive).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::{AccountType, CashFlowCategory};

/// One account's balances entering a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalanceRow {
    /// The account.
    pub account_id: Uuid,
    /// 4-digit account number.
    pub account_number: String,
    /// Account name.
    pub account_name: String,
    /// Fundamental type.
    pub account_type: AccountType,
    /// Reporting category.
    pub category: String,
    /// Cash flow classification, when tagged.
    pub cash_flow_category: Option<CashFlowCategory>,
    /// Sum of posted debits.
    pub debit_total: Decimal,
    /// Sum of posted credits.
    pub credit_total: Decimal,
}

impl AccountBalanceRow {
    /// Signed balance: positive = net debit.
    #[must_use]
    pub fn signed_balance(&self) -> Decimal {
        self.debit_total - self.credit_total
    }

    /// Balance on the account's natural side (positive when the balance
    /// sits where the account type expects it).
    #[must_use]
    pub fn natural_balance(&self) -> Decimal {
        match self.account_type.normal_balance() {
            crate::account::NormalBalance::Debit => self.signed_balance(),
            crate::account::NormalBalance::Credit => -self.signed_balance(),
        }
    }
}

/// An account's signed balance change over a period, for cash flow and
/// equity statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMovement {
    /// 4-digit account number.
    pub account_number: String,
    /// Account name.
    pub account_name: String,
    /// Fundamental type.
    pub account_type: AccountType,
    /// Cash flow classification, when tagged.
    pub cash_flow_category: Option<CashFlowCategory>,
    /// True for cash and cash-equivalent accounts.
    pub is_cash: bool,
    /// Signed balance at period start (positive = debit).
    pub beginning_balance: Decimal,
    /// Signed balance change over the period (positive = debit).
    pub movement: Decimal,
}

/// A presented report line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLine {
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub account_name: String,
    /// Presented amount.
    pub amount: Decimal,
}

/// One row of a trial balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub account_name: String,
    /// Fundamental type.
    pub account_type: AccountType,
    /// Debit-side balance (zero when the balance is a credit).
    pub debit_balance: Decimal,
    /// Credit-side balance (zero when the balance is a debit).
    pub credit_balance: Decimal,
}

/// Trial balance totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Sum of debit balances.
    pub total_debits: Decimal,
    /// Sum of credit balances.
    pub total_credits: Decimal,
    /// Whether the two sides agree.
    pub is_balanced: bool,
}

/// A trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// The reported date.
    pub as_of: NaiveDate,
    /// Statement currency.
    pub currency: String,
    /// Rows sorted by account number.
    pub rows: Vec<TrialBalanceRow>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

/// One balance sheet section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceSheetSection {
    /// Section lines.
    pub accounts: Vec<ReportLine>,
    /// Section total.
    pub total: Decimal,
}

/// A balance sheet (ASC 210 presentation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// The reported date.
    pub as_of: NaiveDate,
    /// Statement currency.
    pub currency: String,
    /// Assets, debit-positive.
    pub assets: BalanceSheetSection,
    /// Liabilities, credit-positive.
    pub liabilities: BalanceSheetSection,
    /// Equity, credit-positive, including current-year earnings.
    pub equity: BalanceSheetSection,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Total equity.
    pub total_equity: Decimal,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Decimal,
    /// Assets = liabilities + equity.
    pub is_balanced: bool,
}

/// One income statement section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeStatementSection {
    /// Section lines.
    pub accounts: Vec<ReportLine>,
    /// Section total.
    pub total: Decimal,
}

/// An income statement (ASC 220 presentation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatementReport {
    /// Period start.
    pub period_start: NaiveDate,
    /// Period end.
    pub period_end: NaiveDate,
    /// Statement currency.
    pub currency: String,
    /// Revenue, credit-positive.
    pub revenue: IncomeStatementSection,
    /// Cost of goods sold.
    pub cost_of_goods_sold: IncomeStatementSection,
    /// Revenue − COGS.
    pub gross_profit: Decimal,
    /// Operating expenses.
    pub operating_expenses: IncomeStatementSection,
    /// Gross profit − operating expenses.
    pub operating_income: Decimal,
    /// Other income and expense.
    pub other_income_expense: IncomeStatementSection,
    /// Bottom line.
    pub net_income: Decimal,
}

/// A current-vs-prior comparative income statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparativeIncomeStatement {
    /// The current period.
    pub current: IncomeStatementReport,
    /// The comparative period.
    pub prior: IncomeStatementReport,
    /// Net income change between the periods.
    pub net_income_change: Decimal,
}

/// Cash flow presentation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlowMethod {
    /// Operating section lists gross receipts and payments.
    Direct,
    /// Operating section starts from net income and adjusts.
    Indirect,
}

/// One cash flow section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashFlowSection {
    /// Section lines (adjustments or gross flows).
    pub lines: Vec<ReportLine>,
    /// Section net cash flow.
    pub total: Decimal,
}

/// A statement of cash flows (ASC 230).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowReport {
    /// Period start.
    pub period_start: NaiveDate,
    /// Period end.
    pub period_end: NaiveDate,
    /// Statement currency.
    pub currency: String,
    /// Presentation method.
    pub method: CashFlowMethod,
    /// Net income the indirect method starts from.
    pub net_income: Decimal,
    /// Operating activities.
    pub operating: CashFlowSection,
    /// Investing activities.
    pub investing: CashFlowSection,
    /// Financing activities.
    pub financing: CashFlowSection,
    /// Sum of the three sections.
    pub net_change_in_cash: Decimal,
    /// Cash at period start.
    pub beginning_cash: Decimal,
    /// Cash at period end.
    pub ending_cash: Decimal,
}

/// One row of the statement of changes in equity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityChangeRow {
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub account_name: String,
    /// Credit-positive balance at period start.
    pub beginning_balance: Decimal,
    /// Credit-positive change over the period.
    pub change: Decimal,
    /// Credit-positive balance at period end.
    pub ending_balance: Decimal,
}

/// A statement of changes in equity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityStatementReport {
    /// Period start.
    pub period_start: NaiveDate,
    /// Period end.
    pub period_end: NaiveDate,
    /// Statement currency.
    pub currency: String,
    /// Per-account rows, plus the current-year earnings row.
    pub rows: Vec<EquityChangeRow>,
    /// Total ending equity.
    pub total_ending_equity: Decimal,
}
