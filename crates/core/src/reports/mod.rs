//! Financial statement generation.
//!
//! Reports are pure functions of ledger state at an instant: trial
//! balance, balance sheet, income statement (with comparative support),
//! cash flow (direct and indirect per ASC 230), and statement of changes
//! in equity. Consolidated variants read a completed run's trial balance.

pub mod error;
pub mod service;
pub mod types;

pub use error::ReportError;
pub use service::ReportService;
pub use types::{
    AccountBalanceRow, AccountMovement, BalanceSheetReport, BalanceSheetSection,
    CashFlowMethod, CashFlowReport, CashFlowSection, ComparativeIncomeStatement,
    EquityChangeRow, EquityStatementReport, IncomeStatementReport, IncomeStatementSection,
    ReportLine, TrialBalanceReport, TrialBalanceRow, TrialBalanceTotals,
};
