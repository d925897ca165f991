//! Conversions between database enums and core domain enums.

use crate::entities::sea_orm_active_enums as db;
use meridian_core::account::AccountType;
use meridian_core::authz::Effect;
use meridian_core::consolidation::ConsolidationMethod;
use meridian_core::consolidation::EliminationRuleType;
use meridian_core::consolidation::RunStatus;
use meridian_core::fiscal::{FiscalPeriodStatus, FiscalYearStatus};
use meridian_core::intercompany::{IntercompanyTransactionType, MatchingStatus};
use meridian_core::journal::{EntryStatus, EntryType, LineSide, SourceModule};

impl From<db::AccountType> for AccountType {
    fn from(value: db::AccountType) -> Self {
        match value {
            db::AccountType::Asset => Self::Asset,
            db::AccountType::Liability => Self::Liability,
            db::AccountType::Equity => Self::Equity,
            db::AccountType::Revenue => Self::Revenue,
            db::AccountType::Expense => Self::Expense,
        }
    }
}

impl From<AccountType> for db::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<db::EntryStatus> for EntryStatus {
    fn from(value: db::EntryStatus) -> Self {
        match value {
            db::EntryStatus::Draft => Self::Draft,
            db::EntryStatus::PendingApproval => Self::PendingApproval,
            db::EntryStatus::Approved => Self::Approved,
            db::EntryStatus::Posted => Self::Posted,
            db::EntryStatus::Reversed => Self::Reversed,
        }
    }
}

impl From<EntryStatus> for db::EntryStatus {
    fn from(value: EntryStatus) -> Self {
        match value {
            EntryStatus::Draft => Self::Draft,
            EntryStatus::PendingApproval => Self::PendingApproval,
            EntryStatus::Approved => Self::Approved,
            EntryStatus::Posted => Self::Posted,
            EntryStatus::Reversed => Self::Reversed,
        }
    }
}

impl From<db::EntryType> for EntryType {
    fn from(value: db::EntryType) -> Self {
        match value {
            db::EntryType::Standard => Self::Standard,
            db::EntryType::Adjusting => Self::Adjusting,
            db::EntryType::Opening => Self::Opening,
            db::EntryType::Closing => Self::Closing,
            db::EntryType::Reversing => Self::Reversing,
            db::EntryType::Intercompany => Self::Intercompany,
        }
    }
}

impl From<EntryType> for db::EntryType {
    fn from(value: EntryType) -> Self {
        match value {
            EntryType::Standard => Self::Standard,
            EntryType::Adjusting => Self::Adjusting,
            EntryType::Opening => Self::Opening,
            EntryType::Closing => Self::Closing,
            EntryType::Reversing => Self::Reversing,
            EntryType::Intercompany => Self::Intercompany,
        }
    }
}

impl From<db::SourceModule> for SourceModule {
    fn from(value: db::SourceModule) -> Self {
        match value {
            db::SourceModule::GeneralLedger => Self::GeneralLedger,
            db::SourceModule::AccountsPayable => Self::AccountsPayable,
            db::SourceModule::AccountsReceivable => Self::AccountsReceivable,
            db::SourceModule::Intercompany => Self::Intercompany,
            db::SourceModule::Consolidation => Self::Consolidation,
            db::SourceModule::System => Self::System,
        }
    }
}

impl From<SourceModule> for db::SourceModule {
    fn from(value: SourceModule) -> Self {
        match value {
            SourceModule::GeneralLedger => Self::GeneralLedger,
            SourceModule::AccountsPayable => Self::AccountsPayable,
            SourceModule::AccountsReceivable => Self::AccountsReceivable,
            SourceModule::Intercompany => Self::Intercompany,
            SourceModule::Consolidation => Self::Consolidation,
            SourceModule::System => Self::System,
        }
    }
}

impl From<db::NormalBalance> for LineSide {
    fn from(value: db::NormalBalance) -> Self {
        match value {
            db::NormalBalance::Debit => Self::Debit,
            db::NormalBalance::Credit => Self::Credit,
        }
    }
}

impl From<LineSide> for db::NormalBalance {
    fn from(value: LineSide) -> Self {
        match value {
            LineSide::Debit => Self::Debit,
            LineSide::Credit => Self::Credit,
        }
    }
}

impl From<db::FiscalYearStatus> for FiscalYearStatus {
    fn from(value: db::FiscalYearStatus) -> Self {
        match value {
            db::FiscalYearStatus::Open => Self::Open,
            db::FiscalYearStatus::Closed => Self::Closed,
        }
    }
}

impl From<FiscalYearStatus> for db::FiscalYearStatus {
    fn from(value: FiscalYearStatus) -> Self {
        match value {
            FiscalYearStatus::Open => Self::Open,
            FiscalYearStatus::Closed => Self::Closed,
        }
    }
}

impl From<db::FiscalPeriodStatus> for FiscalPeriodStatus {
    fn from(value: db::FiscalPeriodStatus) -> Self {
        match value {
            db::FiscalPeriodStatus::Open => Self::Open,
            db::FiscalPeriodStatus::Closed => Self::Closed,
        }
    }
}

impl From<FiscalPeriodStatus> for db::FiscalPeriodStatus {
    fn from(value: FiscalPeriodStatus) -> Self {
        match value {
            FiscalPeriodStatus::Open => Self::Open,
            FiscalPeriodStatus::Closed => Self::Closed,
        }
    }
}

impl From<db::PolicyEffect> for Effect {
    fn from(value: db::PolicyEffect) -> Self {
        match value {
            db::PolicyEffect::Allow => Self::Allow,
            db::PolicyEffect::Deny => Self::Deny,
        }
    }
}

impl From<Effect> for db::PolicyEffect {
    fn from(value: Effect) -> Self {
        match value {
            Effect::Allow => Self::Allow,
            Effect::Deny => Self::Deny,
        }
    }
}

impl From<db::MatchingStatus> for MatchingStatus {
    fn from(value: db::MatchingStatus) -> Self {
        match value {
            db::MatchingStatus::Unmatched => Self::Unmatched,
            db::MatchingStatus::PartiallyMatched => Self::PartiallyMatched,
            db::MatchingStatus::Matched => Self::Matched,
            db::MatchingStatus::VarianceApproved => Self::VarianceApproved,
        }
    }
}

impl From<MatchingStatus> for db::MatchingStatus {
    fn from(value: MatchingStatus) -> Self {
        match value {
            MatchingStatus::Unmatched => Self::Unmatched,
            MatchingStatus::PartiallyMatched => Self::PartiallyMatched,
            MatchingStatus::Matched => Self::Matched,
            MatchingStatus::VarianceApproved => Self::VarianceApproved,
        }
    }
}

impl From<db::IcTransactionType> for IntercompanyTransactionType {
    fn from(value: db::IcTransactionType) -> Self {
        match value {
            db::IcTransactionType::Sale => Self::Sale,
            db::IcTransactionType::Loan => Self::Loan,
            db::IcTransactionType::Dividend => Self::Dividend,
            db::IcTransactionType::ManagementFee => Self::ManagementFee,
            db::IcTransactionType::Allocation => Self::Allocation,
            db::IcTransactionType::AssetTransfer => Self::AssetTransfer,
        }
    }
}

impl From<IntercompanyTransactionType> for db::IcTransactionType {
    fn from(value: IntercompanyTransactionType) -> Self {
        match value {
            IntercompanyTransactionType::Sale => Self::Sale,
            IntercompanyTransactionType::Loan => Self::Loan,
            IntercompanyTransactionType::Dividend => Self::Dividend,
            IntercompanyTransactionType::ManagementFee => Self::ManagementFee,
            IntercompanyTransactionType::Allocation => Self::Allocation,
            IntercompanyTransactionType::AssetTransfer => Self::AssetTransfer,
        }
    }
}

impl From<db::ConsolidationMethod> for ConsolidationMethod {
    fn from(value: db::ConsolidationMethod) -> Self {
        match value {
            db::ConsolidationMethod::FullConsolidation => Self::FullConsolidation,
            db::ConsolidationMethod::EquityMethod => Self::EquityMethod,
        }
    }
}

impl From<ConsolidationMethod> for db::ConsolidationMethod {
    fn from(value: ConsolidationMethod) -> Self {
        match value {
            ConsolidationMethod::FullConsolidation => Self::FullConsolidation,
            ConsolidationMethod::EquityMethod => Self::EquityMethod,
        }
    }
}

impl From<db::EliminationRuleType> for EliminationRuleType {
    fn from(value: db::EliminationRuleType) -> Self {
        match value {
            db::EliminationRuleType::IntercompanyReceivablePayable => {
                Self::IntercompanyReceivablePayable
            }
            db::EliminationRuleType::IntercompanyRevenueExpense => {
                Self::IntercompanyRevenueExpense
            }
            db::EliminationRuleType::IntercompanyDividend => Self::IntercompanyDividend,
            db::EliminationRuleType::IntercompanyInvestment => Self::IntercompanyInvestment,
            db::EliminationRuleType::UnrealizedProfitInventory => {
                Self::UnrealizedProfitInventory
            }
            db::EliminationRuleType::UnrealizedProfitFixedAssets => {
                Self::UnrealizedProfitFixedAssets
            }
        }
    }
}

impl From<EliminationRuleType> for db::EliminationRuleType {
    fn from(value: EliminationRuleType) -> Self {
        match value {
            EliminationRuleType::IntercompanyReceivablePayable => {
                Self::IntercompanyReceivablePayable
            }
            EliminationRuleType::IntercompanyRevenueExpense => Self::IntercompanyRevenueExpense,
            EliminationRuleType::IntercompanyDividend => Self::IntercompanyDividend,
            EliminationRuleType::IntercompanyInvestment => Self::IntercompanyInvestment,
            EliminationRuleType::UnrealizedProfitInventory => Self::UnrealizedProfitInventory,
            EliminationRuleType::UnrealizedProfitFixedAssets => {
                Self::UnrealizedProfitFixedAssets
            }
        }
    }
}

impl From<db::RunStatus> for RunStatus {
    fn from(value: db::RunStatus) -> Self {
        match value {
            db::RunStatus::Pending => Self::Pending,
            db::RunStatus::InProgress => Self::InProgress,
            db::RunStatus::Completed => Self::Completed,
            db::RunStatus::Failed => Self::Failed,
            db::RunStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<RunStatus> for db::RunStatus {
    fn from(value: RunStatus) -> Self {
        match value {
            RunStatus::Pending => Self::Pending,
            RunStatus::InProgress => Self::InProgress,
            RunStatus::Completed => Self::Completed,
            RunStatus::Failed => Self::Failed,
            RunStatus::Cancelled => Self::Cancelled,
        }
    }
}
