//! Consolidation domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::AccountType;
use crate::fiscal::FiscalPeriodRef;

/// How a member company is consolidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationMethod {
    /// Line-by-line consolidation with NCI for partial ownership.
    FullConsolidation,
    /// Single-line equity pickup; underlying accounts are not aggregated.
    EquityMethod,
}

/// A member company of a consolidation group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    /// The member company.
    pub company_id: Uuid,
    /// Parent ownership percentage, 0..=100.
    pub ownership_percentage: Decimal,
    /// Consolidation method for this member.
    pub method: ConsolidationMethod,
    /// When the parent acquired the member.
    pub acquisition_date: Option<NaiveDate>,
    /// Goodwill recognized at acquisition, in reporting currency.
    pub goodwill: Decimal,
    /// Variable-interest-entity flag.
    pub is_vie: bool,
}

impl GroupMember {
    /// The non-controlling percentage (100 − ownership).
    #[must_use]
    pub fn nci_percentage(&self) -> Decimal {
        Decimal::ONE_HUNDRED - self.ownership_percentage
    }
}

/// A consolidation group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationGroup {
    /// Unique identifier.
    pub id: Uuid,
    /// Organization scope.
    pub organization_id: Uuid,
    /// Display name.
    pub name: String,
    /// Currency consolidated statements are presented in.
    pub reporting_currency: String,
    /// The parent company.
    pub parent_company_id: Uuid,
    /// Member companies (the parent is also a member, at 100%).
    pub members: Vec<GroupMember>,
    /// Whether the group can run consolidations.
    pub is_active: bool,
}

impl ConsolidationGroup {
    /// Finds a member by company.
    #[must_use]
    pub fn member(&self, company_id: Uuid) -> Option<&GroupMember> {
        self.members.iter().find(|m| m.company_id == company_id)
    }

    /// Returns true when both companies belong to the group.
    #[must_use]
    pub fn contains_pair(&self, a: Uuid, b: Uuid) -> bool {
        self.member(a).is_some() && self.member(b).is_some()
    }
}

/// Selects accounts for elimination rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountSelector {
    /// A specific account by id.
    ById {
        /// The account id.
        account_id: Uuid,
    },
    /// Every account whose number falls in the inclusive range.
    ByRange {
        /// Lower bound.
        from: String,
        /// Upper bound.
        to: String,
    },
    /// Every account with the given category.
    ByCategory {
        /// The category name.
        category: String,
    },
}

/// The built-in elimination rule types and their debit/credit patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationRuleType {
    /// Debit IC payables, credit IC receivables.
    IntercompanyReceivablePayable,
    /// Debit IC revenue, credit IC expense.
    IntercompanyRevenueExpense,
    /// Eliminate dividend income against subsidiary retained earnings.
    IntercompanyDividend,
    /// Eliminate the parent's investment against subsidiary equity.
    IntercompanyInvestment,
    /// Defer intra-group profit left in inventory.
    UnrealizedProfitInventory,
    /// Defer intra-group profit on transferred fixed assets.
    UnrealizedProfitFixedAssets,
}

/// Extra conditions gating a rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerCondition {
    /// Minimum amount below which the rule does not fire.
    pub minimum_amount: Option<Decimal>,
    /// Explicit amount for deferral rules (unrealized profit), where the
    /// amount is not derivable from the trial balance.
    pub amount: Option<Decimal>,
}

/// An elimination rule attached to a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EliminationRule {
    /// Unique identifier.
    pub id: Uuid,
    /// The group this rule belongs to.
    pub group_id: Uuid,
    /// Display name.
    pub name: String,
    /// The debit/credit pattern.
    pub rule_type: EliminationRuleType,
    /// Gating conditions.
    #[serde(default)]
    pub trigger_conditions: Vec<TriggerCondition>,
    /// Accounts on the source side of the pattern.
    #[serde(default)]
    pub source_selectors: Vec<AccountSelector>,
    /// Accounts on the target side of the pattern.
    #[serde(default)]
    pub target_selectors: Vec<AccountSelector>,
    /// Explicit debit account for deferral rules.
    pub debit_account_id: Option<Uuid>,
    /// Explicit credit account for deferral rules.
    pub credit_account_id: Option<Uuid>,
    /// Automatic rules run in every consolidation.
    pub is_automatic: bool,
    /// Evaluation order, ascending (lower runs first).
    pub priority: u16,
    /// Inactive rules never fire.
    pub is_active: bool,
}

/// One account balance of a member trial balance.
///
/// `balance` is signed: positive = net debit, negative = net credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberBalance {
    /// The member's account id.
    pub account_id: Uuid,
    /// 4-digit account number.
    pub account_number: String,
    /// Account name.
    pub account_name: String,
    /// Fundamental type.
    pub account_type: AccountType,
    /// Reporting category.
    pub category: String,
    /// Intercompany flag.
    pub is_intercompany: bool,
    /// Signed balance (positive = debit).
    pub balance: Decimal,
}

/// A member company's frozen trial balance entering a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberTrialBalance {
    /// The member company.
    pub company_id: Uuid,
    /// Company display name.
    pub company_name: String,
    /// The currency the balances are stated in.
    pub currency: String,
    /// Account balances.
    pub rows: Vec<MemberBalance>,
}

impl MemberTrialBalance {
    /// Signed sum over all rows; zero for a balanced trial balance.
    #[must_use]
    pub fn imbalance(&self) -> Decimal {
        self.rows.iter().map(|r| r.balance).sum()
    }

    /// Net income: revenue credits minus expense debits.
    ///
    /// Revenue rows carry negative (credit) balances, expense rows
    /// positive, so net income = −Σ(income statement rows).
    #[must_use]
    pub fn net_income(&self) -> Decimal {
        -self
            .rows
            .iter()
            .filter(|r| r.account_type.is_income_statement())
            .map(|r| r.balance)
            .sum::<Decimal>()
    }

    /// Equity plus current income, credit-positive.
    #[must_use]
    pub fn equity_and_income(&self) -> Decimal {
        -self
            .rows
            .iter()
            .filter(|r| {
                r.account_type == AccountType::Equity || r.account_type.is_income_statement()
            })
            .map(|r| r.balance)
            .sum::<Decimal>()
    }
}

/// Per-member translation rates resolved before the Translate step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRates {
    /// Period average rate (income statement accounts).
    pub average: Decimal,
    /// Period closing rate (assets and liabilities).
    pub closing: Decimal,
    /// Historical rate (equity).
    pub historical: Decimal,
}

/// One aggregated balance across members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedBalance {
    /// Account number key.
    pub account_number: String,
    /// Representative account name.
    pub account_name: String,
    /// Fundamental type.
    pub account_type: AccountType,
    /// Reporting category.
    pub category: String,
    /// Whether any contributing account was intercompany-flagged.
    pub is_intercompany: bool,
    /// Signed aggregated balance (positive = debit).
    pub amount: Decimal,
    /// How many member accounts contributed.
    pub member_count: u32,
}

/// One line of a synthetic elimination entry (signed, positive = debit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliminationLine {
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub account_name: String,
    /// Fundamental type.
    pub account_type: AccountType,
    /// Reporting category.
    pub category: String,
    /// Signed amount (positive = debit).
    pub amount: Decimal,
}

/// A synthetic elimination entry scoped to a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EliminationEntry {
    /// Identifier within the run.
    pub id: Uuid,
    /// The rule that generated the entry.
    pub rule_id: Uuid,
    /// The rule's type.
    pub rule_type: EliminationRuleType,
    /// Human-readable description.
    pub description: String,
    /// Balanced signed lines.
    pub lines: Vec<EliminationLine>,
}

impl EliminationEntry {
    /// Signed sum of lines; always zero for a valid entry.
    #[must_use]
    pub fn imbalance(&self) -> Decimal {
        self.lines.iter().map(|l| l.amount).sum()
    }
}

/// A draft pairing produced by the MatchIntercompany step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EliminationPairDraft {
    /// The matched intercompany transaction.
    pub transaction_id: Uuid,
    /// Originating company.
    pub from_company_id: Uuid,
    /// Counterparty company.
    pub to_company_id: Uuid,
    /// The matched amount.
    pub amount: Decimal,
    /// Variance between the booked sides.
    pub variance: Decimal,
}

/// Per-member NCI allocation figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NciAllocation {
    /// The partially-owned member.
    pub company_id: Uuid,
    /// Non-controlling percentage.
    pub nci_percentage: Decimal,
    /// NCI share of the member's net assets.
    pub share_of_net_assets: Decimal,
    /// NCI share of the member's net income.
    pub share_of_net_income: Decimal,
}

/// Output of the NCI step: adjustment rows plus allocation figures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NciResult {
    /// Signed adjustment per account number; sums to zero.
    pub adjustments: Vec<EliminationLine>,
    /// Per-member allocations.
    pub allocations: Vec<NciAllocation>,
    /// Equity-method pickup rows (also part of `adjustments`).
    pub equity_pickups: Vec<NciAllocation>,
}

/// One row of the consolidated trial balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRow {
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub account_name: String,
    /// Fundamental type.
    pub account_type: AccountType,
    /// Reporting category.
    pub category: String,
    /// Aggregated signed balance before adjustments.
    pub aggregated_balance: Decimal,
    /// Signed elimination effect.
    pub elimination_amount: Decimal,
    /// Signed NCI effect.
    pub nci_amount: Decimal,
    /// aggregated + elimination + nci.
    pub consolidated_balance: Decimal,
}

/// The consolidated trial balance produced by the final step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatedTrialBalance {
    /// Rows sorted by account number.
    pub rows: Vec<ConsolidatedRow>,
    /// Sum of debit-side consolidated balances.
    pub total_debits: Decimal,
    /// Sum of credit-side consolidated balances.
    pub total_credits: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
    /// The reporting currency.
    pub currency: String,
}

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    /// Fails the run unless `continue_on_warnings` applies.
    Error,
    /// Recorded; fails the run only without `continue_on_warnings`.
    Warning,
}

/// A single validation finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Severity.
    pub severity: IssueSeverity,
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// The Validate step's report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All findings.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when any error-severity issue exists.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Error)
    }

    /// Returns true when any warning-severity issue exists.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Warning)
    }
}

/// The seven pipeline steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationStep {
    /// Step 1: structural validation.
    Validate,
    /// Step 2: ASC 830 currency translation.
    Translate,
    /// Step 3: aggregation across members.
    Aggregate,
    /// Step 4: intercompany transaction pairing.
    MatchIntercompany,
    /// Step 5: elimination rule evaluation.
    Eliminate,
    /// Step 6: non-controlling interest allocation.
    NonControllingInterest,
    /// Step 7: consolidated trial balance generation.
    GenerateTrialBalance,
}

impl ConsolidationStep {
    /// All steps in execution order.
    pub const ALL: [Self; 7] = [
        Self::Validate,
        Self::Translate,
        Self::Aggregate,
        Self::MatchIntercompany,
        Self::Eliminate,
        Self::NonControllingInterest,
        Self::GenerateTrialBalance,
    ];

    /// 1-based position in the pipeline.
    #[must_use]
    pub fn order(self) -> u8 {
        match self {
            Self::Validate => 1,
            Self::Translate => 2,
            Self::Aggregate => 3,
            Self::MatchIntercompany => 4,
            Self::Eliminate => 5,
            Self::NonControllingInterest => 6,
            Self::GenerateTrialBalance => 7,
        }
    }
}

/// Status of one pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not started.
    Pending,
    /// Currently executing.
    InProgress,
    /// Finished successfully; trusted on resume.
    Completed,
    /// Failed; the run fails with it.
    Failed,
    /// Skipped because the run was cancelled.
    Skipped,
}

/// Persisted state of one pipeline step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepState {
    /// Which step.
    pub step: ConsolidationStep,
    /// Current status.
    pub status: StepStatus,
    /// When execution started.
    pub started_at: Option<DateTime<Utc>>,
    /// When execution finished.
    pub completed_at: Option<DateTime<Utc>>,
    /// Wall-clock duration.
    pub duration_ms: Option<i64>,
    /// Failure message, if failed.
    pub error_message: Option<String>,
    /// Step-specific details (counts, warnings).
    #[serde(default)]
    pub details: serde_json::Value,
}

impl StepState {
    /// A fresh pending step.
    #[must_use]
    pub fn pending(step: ConsolidationStep) -> Self {
        Self {
            step,
            status: StepStatus::Pending,
            started_at: None,
            completed_at: None,
            duration_ms: None,
            error_message: None,
            details: serde_json::Value::Null,
        }
    }
}

/// Status of a consolidation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Queued, waiting for a worker.
    Pending,
    /// A worker is driving the pipeline.
    InProgress,
    /// All steps completed.
    Completed,
    /// A step failed.
    Failed,
    /// Cancelled by a user; partial output is discarded.
    Cancelled,
}

/// Options controlling a run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RunOptions {
    /// Skip the closed-period check in Validate.
    #[serde(default)]
    pub skip_validation: bool,
    /// Continue when Validate records warnings.
    #[serde(default)]
    pub continue_on_warnings: bool,
    /// Restart from step 1 even if steps completed earlier.
    #[serde(default)]
    pub force_regeneration: bool,
}

/// A durable consolidation run.
///
/// Intermediate step outputs are persisted on the run so that a resumed
/// run trusts completed steps instead of recomputing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationRun {
    /// Unique identifier.
    pub id: Uuid,
    /// The group being consolidated.
    pub group_id: Uuid,
    /// The fiscal period consolidated.
    pub period: FiscalPeriodRef,
    /// The balance cut-off date.
    pub as_of_date: NaiveDate,
    /// Run status.
    pub status: RunStatus,
    /// The seven step states, in order.
    pub steps: Vec<StepState>,
    /// Options.
    pub options: RunOptions,
    /// Validate's report.
    pub validation: Option<ValidationReport>,
    /// Translate's output.
    pub translated: Option<Vec<MemberTrialBalance>>,
    /// Aggregate's output.
    pub aggregated: Option<Vec<AggregatedBalance>>,
    /// MatchIntercompany's output.
    pub ic_drafts: Option<Vec<EliminationPairDraft>>,
    /// Eliminate's output.
    pub elimination_entries: Vec<EliminationEntry>,
    /// NonControllingInterest's output.
    pub nci: Option<NciResult>,
    /// GenerateTrialBalance's output.
    pub trial_balance: Option<ConsolidatedTrialBalance>,
    /// Who initiated the run.
    pub initiated_by: Uuid,
    /// When it was initiated.
    pub initiated_at: DateTime<Utc>,
    /// When the first step started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the run finished.
    pub completed_at: Option<DateTime<Utc>>,
    /// Total duration.
    pub duration_ms: Option<i64>,
    /// Failure message, if failed.
    pub error_message: Option<String>,
}

impl ConsolidationRun {
    /// Creates a pending run with seven pending steps.
    #[must_use]
    pub fn new(
        group_id: Uuid,
        period: FiscalPeriodRef,
        as_of_date: NaiveDate,
        options: RunOptions,
        initiated_by: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            period,
            as_of_date,
            status: RunStatus::Pending,
            steps: ConsolidationStep::ALL.iter().map(|s| StepState::pending(*s)).collect(),
            options,
            validation: None,
            translated: None,
            aggregated: None,
            ic_drafts: None,
            elimination_entries: Vec::new(),
            nci: None,
            trial_balance: None,
            initiated_by,
            initiated_at: Utc::now(),
            started_at: None,
            completed_at: None,
            duration_ms: None,
            error_message: None,
        }
    }

    /// The first non-completed step, if any.
    #[must_use]
    pub fn next_step(&self) -> Option<ConsolidationStep> {
        self.steps
            .iter()
            .find(|s| s.status != StepStatus::Completed)
            .map(|s| s.step)
    }

    /// Mutable state of a given step.
    ///
    /// # Panics
    ///
    /// Never panics for runs created through [`ConsolidationRun::new`],
    /// which always carry all seven steps.
    #[must_use]
    pub fn step_mut(&mut self, step: ConsolidationStep) -> &mut StepState {
        self.steps
            .iter_mut()
            .find(|s| s.step == step)
            .expect("run carries all seven steps")
    }

    /// Resets every step and intermediate output (forceRegeneration).
    pub fn reset(&mut self) {
        self.steps = ConsolidationStep::ALL.iter().map(|s| StepState::pending(*s)).collect();
        self.validation = None;
        self.translated = None;
        self.aggregated = None;
        self.ic_drafts = None;
        self.elimination_entries = Vec::new();
        self.nci = None;
        self.trial_balance = None;
        self.error_message = None;
        self.completed_at = None;
        self.duration_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_step_order_is_strict() {
        for (index, step) in ConsolidationStep::ALL.iter().enumerate() {
            assert_eq!(step.order() as usize, index + 1);
        }
    }

    #[test]
    fn test_new_run_has_seven_pending_steps() {
        let run = ConsolidationRun::new(
            Uuid::new_v4(),
            FiscalPeriodRef { year: 2025, period: 6 },
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            RunOptions::default(),
            Uuid::new_v4(),
        );
        assert_eq!(run.status, RunStatus::Pending);
        assert_eq!(run.steps.len(), 7);
        assert!(run.steps.iter().all(|s| s.status == StepStatus::Pending));
        assert_eq!(run.next_step(), Some(ConsolidationStep::Validate));
    }

    #[test]
    fn test_next_step_skips_completed() {
        let mut run = ConsolidationRun::new(
            Uuid::new_v4(),
            FiscalPeriodRef { year: 2025, period: 6 },
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            RunOptions::default(),
            Uuid::new_v4(),
        );
        run.step_mut(ConsolidationStep::Validate).status = StepStatus::Completed;
        run.step_mut(ConsolidationStep::Translate).status = StepStatus::Completed;
        assert_eq!(run.next_step(), Some(ConsolidationStep::Aggregate));
    }

    #[test]
    fn test_nci_percentage() {
        let member = GroupMember {
            company_id: Uuid::new_v4(),
            ownership_percentage: dec!(80),
            method: ConsolidationMethod::FullConsolidation,
            acquisition_date: None,
            goodwill: Decimal::ZERO,
            is_vie: false,
        };
        assert_eq!(member.nci_percentage(), dec!(20));
    }

    #[test]
    fn test_member_tb_net_income() {
        let tb = MemberTrialBalance {
            company_id: Uuid::new_v4(),
            company_name: "Sub".to_string(),
            currency: "USD".to_string(),
            rows: vec![
                MemberBalance {
                    account_id: Uuid::new_v4(),
                    account_number: "4000".to_string(),
                    account_name: "Revenue".to_string(),
                    account_type: AccountType::Revenue,
                    category: "operating_revenue".to_string(),
                    is_intercompany: false,
                    balance: dec!(-1000), // credit
                },
                MemberBalance {
                    account_id: Uuid::new_v4(),
                    account_number: "6000".to_string(),
                    account_name: "Expenses".to_string(),
                    account_type: AccountType::Expense,
                    category: "operating_expense".to_string(),
                    is_intercompany: false,
                    balance: dec!(600), // debit
                },
            ],
        };
        assert_eq!(tb.net_income(), dec!(400));
    }
}
