//! Database enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a user within an organization.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Organization owner.
    #[sea_orm(string_value = "owner")]
    Owner,
    /// Administrator.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Accountant.
    #[sea_orm(string_value = "accountant")]
    Accountant,
    /// Approver.
    #[sea_orm(string_value = "approver")]
    Approver,
    /// Read-only viewer.
    #[sea_orm(string_value = "viewer")]
    Viewer,
}

impl UserRole {
    /// The role name as used in policy subject conditions.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Accountant => "accountant",
            Self::Approver => "approver",
            Self::Viewer => "viewer",
        }
    }
}

/// Lifecycle status of a company.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "company_status")]
#[serde(rename_all = "snake_case")]
pub enum CompanyStatus {
    /// Company is active.
    #[sea_orm(string_value = "active")]
    Active,
    /// Company is soft-deactivated.
    #[sea_orm(string_value = "deactivated")]
    Deactivated,
}

/// Fundamental account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Asset.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Revenue.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Normal balance side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "normal_balance")]
#[serde(rename_all = "snake_case")]
pub enum NormalBalance {
    /// Debit-normal.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit-normal.
    #[sea_orm(string_value = "credit")]
    Credit,
}

/// Fiscal year status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "fiscal_year_status")]
#[serde(rename_all = "snake_case")]
pub enum FiscalYearStatus {
    /// Open.
    #[sea_orm(string_value = "open")]
    Open,
    /// Closed.
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// Fiscal period status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "fiscal_period_status")]
#[serde(rename_all = "snake_case")]
pub enum FiscalPeriodStatus {
    /// Open.
    #[sea_orm(string_value = "open")]
    Open,
    /// Closed.
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// Journal entry lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Draft.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Submitted for approval.
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    /// Approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Posted to the ledger.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Reversed by a reversing entry.
    #[sea_orm(string_value = "reversed")]
    Reversed,
}

/// Journal entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_type")]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Regular entry.
    #[sea_orm(string_value = "standard")]
    Standard,
    /// Adjusting entry.
    #[sea_orm(string_value = "adjusting")]
    Adjusting,
    /// Opening balance entry.
    #[sea_orm(string_value = "opening")]
    Opening,
    /// Year-end closing entry.
    #[sea_orm(string_value = "closing")]
    Closing,
    /// Reversing entry.
    #[sea_orm(string_value = "reversing")]
    Reversing,
    /// Intercompany entry.
    #[sea_orm(string_value = "intercompany")]
    Intercompany,
}

/// Where an entry originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "source_module")]
#[serde(rename_all = "snake_case")]
pub enum SourceModule {
    /// General ledger.
    #[sea_orm(string_value = "general_ledger")]
    GeneralLedger,
    /// Accounts payable.
    #[sea_orm(string_value = "accounts_payable")]
    AccountsPayable,
    /// Accounts receivable.
    #[sea_orm(string_value = "accounts_receivable")]
    AccountsReceivable,
    /// Intercompany processing.
    #[sea_orm(string_value = "intercompany")]
    Intercompany,
    /// Consolidation.
    #[sea_orm(string_value = "consolidation")]
    Consolidation,
    /// System (closing, reversal).
    #[sea_orm(string_value = "system")]
    System,
}

/// Exchange rate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "rate_type")]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    /// Spot.
    #[sea_orm(string_value = "spot")]
    Spot,
    /// Period average.
    #[sea_orm(string_value = "average")]
    Average,
    /// Historical.
    #[sea_orm(string_value = "historical")]
    Historical,
    /// Period closing.
    #[sea_orm(string_value = "closing")]
    Closing,
}

/// Policy effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "policy_effect")]
#[serde(rename_all = "snake_case")]
pub enum PolicyEffect {
    /// Allow.
    #[sea_orm(string_value = "allow")]
    Allow,
    /// Deny.
    #[sea_orm(string_value = "deny")]
    Deny,
}

/// Intercompany matching status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "matching_status")]
#[serde(rename_all = "snake_case")]
pub enum MatchingStatus {
    /// Neither side linked.
    #[sea_orm(string_value = "unmatched")]
    Unmatched,
    /// One side linked.
    #[sea_orm(string_value = "partially_matched")]
    PartiallyMatched,
    /// Both sides linked within tolerance.
    #[sea_orm(string_value = "matched")]
    Matched,
    /// Out-of-tolerance variance explicitly approved.
    #[sea_orm(string_value = "variance_approved")]
    VarianceApproved,
}

/// Intercompany transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ic_transaction_type")]
#[serde(rename_all = "snake_case")]
pub enum IcTransactionType {
    /// Intra-group sale.
    #[sea_orm(string_value = "sale")]
    Sale,
    /// Intra-group loan.
    #[sea_orm(string_value = "loan")]
    Loan,
    /// Dividend.
    #[sea_orm(string_value = "dividend")]
    Dividend,
    /// Management fee.
    #[sea_orm(string_value = "management_fee")]
    ManagementFee,
    /// Cost allocation.
    #[sea_orm(string_value = "allocation")]
    Allocation,
    /// Asset transfer.
    #[sea_orm(string_value = "asset_transfer")]
    AssetTransfer,
}

/// Consolidation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "consolidation_method")]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationMethod {
    /// Full line-by-line consolidation.
    #[sea_orm(string_value = "full_consolidation")]
    FullConsolidation,
    /// Equity method.
    #[sea_orm(string_value = "equity_method")]
    EquityMethod,
}

/// Elimination rule type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "elimination_rule_type")]
#[serde(rename_all = "snake_case")]
pub enum EliminationRuleType {
    /// Debit IC payables, credit IC receivables.
    #[sea_orm(string_value = "intercompany_receivable_payable")]
    IntercompanyReceivablePayable,
    /// Debit IC revenue, credit IC expense.
    #[sea_orm(string_value = "intercompany_revenue_expense")]
    IntercompanyRevenueExpense,
    /// Eliminate dividend income against subsidiary retained earnings.
    #[sea_orm(string_value = "intercompany_dividend")]
    IntercompanyDividend,
    /// Eliminate parent investment against subsidiary equity.
    #[sea_orm(string_value = "intercompany_investment")]
    IntercompanyInvestment,
    /// Defer unrealized profit in inventory.
    #[sea_orm(string_value = "unrealized_profit_inventory")]
    UnrealizedProfitInventory,
    /// Defer unrealized profit on fixed assets.
    #[sea_orm(string_value = "unrealized_profit_fixed_assets")]
    UnrealizedProfitFixedAssets,
}

/// Consolidation run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "run_status")]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Queued.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Executing.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Completed.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Failed.
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}
