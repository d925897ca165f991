//! The consolidation pipeline driver.
//!
//! `ConsolidationPipeline` advances a run one step at a time. Each call
//! loads the first non-completed step, executes it against the frozen
//! `RunInputs`, and records the outcome on the run. The caller (the
//! worker's runner) persists the run between steps and re-checks the
//! cancellation flag, so a crash resumes from the last completed step and
//! a cancelled run stops at the next step boundary.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::fiscal::FiscalPeriodStatus;
use crate::intercompany::types::IntercompanyTransaction;

use super::aggregate::aggregate;
use super::eliminate::{eliminate, match_intercompany};
use super::error::ConsolidationError;
use super::nci::allocate_nci;
use super::translate::translate_member;
use super::trial_balance::generate_trial_balance;
use super::types::{
    ConsolidationGroup, ConsolidationRun, ConsolidationStep, EliminationRule,
    MemberTrialBalance, RunStatus, StepStatus, TranslationRates,
};
use super::validate::{validate, MemberCompanyInfo};

/// The frozen inputs of a consolidation run.
///
/// Everything the seven steps consume is loaded once, before the first
/// step executes; determinism across restarts follows from the steps
/// being pure functions of these inputs.
#[derive(Debug, Clone)]
pub struct RunInputs {
    /// The group being consolidated.
    pub group: ConsolidationGroup,
    /// Member company attributes for validation.
    pub companies: Vec<MemberCompanyInfo>,
    /// Frozen per-member trial balances in functional currency.
    pub member_tbs: Vec<MemberTrialBalance>,
    /// Translation rates per member company needing translation.
    pub rates: BTreeMap<Uuid, TranslationRates>,
    /// The group's elimination rules.
    pub rules: Vec<EliminationRule>,
    /// Intercompany transactions of the organization.
    pub ic_transactions: Vec<IntercompanyTransaction>,
    /// Account id → number index for `ById` selectors.
    pub account_numbers: BTreeMap<Uuid, String>,
    /// Status of the consolidated fiscal period.
    pub period_status: Option<FiscalPeriodStatus>,
    /// First day of the consolidated period.
    pub period_start: NaiveDate,
    /// Last day of the consolidated period.
    pub period_end: NaiveDate,
    /// Intercompany variance tolerance.
    pub ic_tolerance: Decimal,
}

/// Drives runs through the pipeline.
pub struct ConsolidationPipeline;

impl ConsolidationPipeline {
    /// Executes the first non-completed step of the run.
    ///
    /// Returns the step that ran, or `None` when the run just completed.
    /// On step failure the run transitions to Failed and the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// - `InvalidRunStatus` when the run is not Pending or InProgress.
    /// - The step's own error on failure.
    pub fn execute_next_step(
        run: &mut ConsolidationRun,
        inputs: &RunInputs,
    ) -> Result<Option<ConsolidationStep>, ConsolidationError> {
        match run.status {
            RunStatus::Pending => {
                run.status = RunStatus::InProgress;
                run.started_at = Some(Utc::now());
                if run.options.force_regeneration {
                    run.reset();
                }
            }
            RunStatus::InProgress => {}
            status => {
                return Err(ConsolidationError::InvalidRunStatus {
                    current: status,
                    action: "execute",
                });
            }
        }

        let Some(step) = run.next_step() else {
            Self::finish(run);
            return Ok(None);
        };

        let started = Utc::now();
        {
            let state = run.step_mut(step);
            state.status = StepStatus::InProgress;
            state.started_at = Some(started);
        }

        let outcome = Self::run_step(run, step, inputs);

        let completed = Utc::now();
        match outcome {
            Ok(details) => {
                let state = run.step_mut(step);
                state.status = StepStatus::Completed;
                state.completed_at = Some(completed);
                state.duration_ms = Some((completed - started).num_milliseconds());
                state.details = details;
                if run.next_step().is_none() {
                    Self::finish(run);
                }
                Ok(Some(step))
            }
            Err(error) => {
                let message = error.to_string();
                let state = run.step_mut(step);
                state.status = StepStatus::Failed;
                state.completed_at = Some(completed);
                state.duration_ms = Some((completed - started).num_milliseconds());
                state.error_message = Some(message.clone());
                run.status = RunStatus::Failed;
                run.error_message = Some(message);
                run.completed_at = Some(completed);
                Err(error)
            }
        }
    }

    /// Drives the run until it completes or fails.
    ///
    /// # Errors
    ///
    /// Propagates the first step failure.
    pub fn run_to_completion(
        run: &mut ConsolidationRun,
        inputs: &RunInputs,
    ) -> Result<(), ConsolidationError> {
        while matches!(run.status, RunStatus::Pending | RunStatus::InProgress) {
            if Self::execute_next_step(run, inputs)?.is_none() {
                break;
            }
        }
        Ok(())
    }

    /// Cancels a run.
    ///
    /// Allowed only for Pending and InProgress runs; any InProgress step
    /// becomes Skipped and partial output is never surfaced as a report.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRunStatus` for completed, failed, or already
    /// cancelled runs.
    pub fn cancel(run: &mut ConsolidationRun) -> Result<(), ConsolidationError> {
        match run.status {
            RunStatus::Pending | RunStatus::InProgress => {
                run.status = RunStatus::Cancelled;
                run.completed_at = Some(Utc::now());
                for state in &mut run.steps {
                    if state.status == StepStatus::InProgress {
                        state.status = StepStatus::Skipped;
                    }
                }
                // Discard partial output so cancelled runs never report.
                run.trial_balance = None;
                Ok(())
            }
            status => Err(ConsolidationError::InvalidRunStatus {
                current: status,
                action: "cancel",
            }),
        }
    }

    fn finish(run: &mut ConsolidationRun) {
        run.status = RunStatus::Completed;
        let completed = Utc::now();
        run.completed_at = Some(completed);
        if let Some(started) = run.started_at {
            run.duration_ms = Some((completed - started).num_milliseconds());
        }
    }

    fn run_step(
        run: &mut ConsolidationRun,
        step: ConsolidationStep,
        inputs: &RunInputs,
    ) -> Result<serde_json::Value, ConsolidationError> {
        match step {
            ConsolidationStep::Validate => {
                let report = validate(
                    &inputs.group,
                    &inputs.companies,
                    &inputs.member_tbs,
                    inputs.period_status,
                    run.options,
                )?;
                let details = serde_json::json!({
                    "warnings": report.issues.len(),
                });
                run.validation = Some(report);
                Ok(details)
            }
            ConsolidationStep::Translate => {
                let mut translated = Vec::with_capacity(inputs.member_tbs.len());
                for tb in &inputs.member_tbs {
                    if tb.currency.eq_ignore_ascii_case(&inputs.group.reporting_currency) {
                        translated.push(translate_member(
                            tb,
                            &inputs.group.reporting_currency,
                            &TranslationRates {
                                average: Decimal::ONE,
                                closing: Decimal::ONE,
                                historical: Decimal::ONE,
                            },
                        ));
                        continue;
                    }
                    let rates = inputs.rates.get(&tb.company_id).ok_or(
                        ConsolidationError::MissingTranslationRate {
                            company_id: tb.company_id,
                            kind: "closing",
                        },
                    )?;
                    for (kind, value) in [
                        ("average", rates.average),
                        ("closing", rates.closing),
                        ("historical", rates.historical),
                    ] {
                        if value <= Decimal::ZERO {
                            return Err(ConsolidationError::MissingTranslationRate {
                                company_id: tb.company_id,
                                kind,
                            });
                        }
                    }
                    translated.push(translate_member(
                        tb,
                        &inputs.group.reporting_currency,
                        rates,
                    ));
                }
                let details = serde_json::json!({ "members": translated.len() });
                run.translated = Some(translated);
                Ok(details)
            }
            ConsolidationStep::Aggregate => {
                let translated = run.translated.as_ref().ok_or(
                    ConsolidationError::MissingStepOutput { step },
                )?;
                let (rows, warnings) = aggregate(&inputs.group, translated);
                let details = serde_json::json!({
                    "rows": rows.len(),
                    "warnings": warnings.len(),
                });
                if let Some(report) = run.validation.as_mut() {
                    report.issues.extend(warnings);
                }
                run.aggregated = Some(rows);
                Ok(details)
            }
            ConsolidationStep::MatchIntercompany => {
                let (drafts, warnings) = match_intercompany(
                    &inputs.group,
                    &inputs.ic_transactions,
                    inputs.period_start,
                    inputs.period_end,
                    inputs.ic_tolerance,
                );
                let details = serde_json::json!({
                    "pairs": drafts.len(),
                    "warnings": warnings.len(),
                });
                if let Some(report) = run.validation.as_mut() {
                    report.issues.extend(warnings);
                }
                run.ic_drafts = Some(drafts);
                Ok(details)
            }
            ConsolidationStep::Eliminate => {
                let aggregated = run.aggregated.as_ref().ok_or(
                    ConsolidationError::MissingStepOutput { step },
                )?;
                let entries = eliminate(&inputs.rules, aggregated, &inputs.account_numbers)?;
                let details = serde_json::json!({ "entries": entries.len() });
                run.elimination_entries = entries;
                Ok(details)
            }
            ConsolidationStep::NonControllingInterest => {
                let translated = run.translated.as_ref().ok_or(
                    ConsolidationError::MissingStepOutput { step },
                )?;
                let result = allocate_nci(&inputs.group, translated);
                let details = serde_json::json!({
                    "allocations": result.allocations.len(),
                    "equity_pickups": result.equity_pickups.len(),
                });
                run.nci = Some(result);
                Ok(details)
            }
            ConsolidationStep::GenerateTrialBalance => {
                let aggregated = run.aggregated.as_ref().ok_or(
                    ConsolidationError::MissingStepOutput { step },
                )?;
                let nci = run.nci.clone().unwrap_or_default();
                let tb = generate_trial_balance(
                    aggregated,
                    &run.elimination_entries,
                    &nci,
                    &inputs.group.reporting_currency,
                )?;
                let details = serde_json::json!({
                    "rows": tb.rows.len(),
                    "total_debits": tb.total_debits.to_string(),
                });
                run.trial_balance = Some(tb);
                Ok(details)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use crate::consolidation::types::{
        AccountSelector, ConsolidationMethod, EliminationRuleType, GroupMember, MemberBalance,
        RunOptions,
    };
    use crate::fiscal::FiscalPeriodRef;
    use rust_decimal_macros::dec;

    fn row(number: &str, account_type: AccountType, balance: Decimal) -> MemberBalance {
        MemberBalance {
            account_id: Uuid::new_v4(),
            account_number: number.to_string(),
            account_name: format!("Account {number}"),
            account_type,
            category: "test".to_string(),
            is_intercompany: matches!(number, "4200" | "5200"),
            balance,
        }
    }

    fn by_range(from: &str, to: &str) -> AccountSelector {
        AccountSelector::ByRange {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    fn rule(
        group_id: Uuid,
        rule_type: EliminationRuleType,
        priority: u16,
        sources: Vec<AccountSelector>,
        targets: Vec<AccountSelector>,
    ) -> EliminationRule {
        EliminationRule {
            id: Uuid::new_v4(),
            group_id,
            name: format!("{rule_type:?}"),
            rule_type,
            trigger_conditions: vec![],
            source_selectors: sources,
            target_selectors: targets,
            debit_account_id: None,
            credit_account_id: None,
            is_automatic: true,
            priority,
            is_active: true,
        }
    }

    /// Parent P (100% owner of Sub S, both USD): P carries an investment
    /// in S and intercompany revenue; S carries matching equity and
    /// intercompany expense.
    fn scenario_inputs() -> (RunInputs, Uuid, Uuid) {
        let parent = Uuid::new_v4();
        let sub = Uuid::new_v4();

        let group = ConsolidationGroup {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            name: "Group".to_string(),
            reporting_currency: "USD".to_string(),
            parent_company_id: parent,
            members: vec![
                GroupMember {
                    company_id: parent,
                    ownership_percentage: dec!(100),
                    method: ConsolidationMethod::FullConsolidation,
                    acquisition_date: None,
                    goodwill: Decimal::ZERO,
                    is_vie: false,
                },
                GroupMember {
                    company_id: sub,
                    ownership_percentage: dec!(100),
                    method: ConsolidationMethod::FullConsolidation,
                    acquisition_date: None,
                    goodwill: Decimal::ZERO,
                    is_vie: false,
                },
            ],
            is_active: true,
        };

        let parent_tb = MemberTrialBalance {
            company_id: parent,
            company_name: "Parent".to_string(),
            currency: "USD".to_string(),
            rows: vec![
                row("1400", AccountType::Asset, dec!(1000)),
                row("4200", AccountType::Revenue, dec!(-500)),
                row("3000", AccountType::Equity, dec!(-500)),
            ],
        };
        let sub_tb = MemberTrialBalance {
            company_id: sub,
            company_name: "Sub".to_string(),
            currency: "USD".to_string(),
            rows: vec![
                row("3000", AccountType::Equity, dec!(-1000)),
                row("5200", AccountType::Expense, dec!(500)),
                row("1010", AccountType::Asset, dec!(500)),
            ],
        };

        let rules = vec![
            rule(
                group.id,
                EliminationRuleType::IntercompanyInvestment,
                10,
                vec![by_range("1400", "1499")],
                vec![by_range("3000", "3099")],
            ),
            rule(
                group.id,
                EliminationRuleType::IntercompanyRevenueExpense,
                20,
                vec![by_range("4200", "4299")],
                vec![by_range("5200", "5299")],
            ),
        ];

        let companies = vec![
            MemberCompanyInfo {
                company_id: parent,
                name: "Parent".to_string(),
                is_active: true,
            },
            MemberCompanyInfo {
                company_id: sub,
                name: "Sub".to_string(),
                is_active: true,
            },
        ];

        let inputs = RunInputs {
            group,
            companies,
            member_tbs: vec![parent_tb, sub_tb],
            rates: BTreeMap::new(),
            rules,
            ic_transactions: vec![],
            account_numbers: BTreeMap::new(),
            period_status: Some(FiscalPeriodStatus::Closed),
            period_start: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            ic_tolerance: dec!(0.01),
        };
        (inputs, parent, sub)
    }

    fn make_run(group_id: Uuid, options: RunOptions) -> ConsolidationRun {
        ConsolidationRun::new(
            group_id,
            FiscalPeriodRef {
                year: 2025,
                period: 6,
            },
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            options,
            Uuid::new_v4(),
        )
    }

    #[test]
    fn test_full_pipeline_eliminates_investment_and_ic_trading() {
        let (inputs, _, _) = scenario_inputs();
        // The parent's IC revenue has no offsetting member expense row on
        // its own books, so the group-level IC warning gate is waived.
        let mut run = make_run(
            inputs.group.id,
            RunOptions {
                continue_on_warnings: true,
                ..RunOptions::default()
            },
        );

        ConsolidationPipeline::run_to_completion(&mut run, &inputs).unwrap();

        assert_eq!(run.status, RunStatus::Completed);
        assert!(run.steps.iter().all(|s| s.status == StepStatus::Completed));
        assert_eq!(run.elimination_entries.len(), 2);

        let tb = run.trial_balance.as_ref().unwrap();
        assert!(tb.is_balanced);
        assert_eq!(tb.total_debits, tb.total_credits);

        let consolidated = |number: &str| {
            tb.rows
                .iter()
                .filter(|r| r.account_number == number)
                .map(|r| r.consolidated_balance)
                .sum::<Decimal>()
        };
        assert_eq!(consolidated("1400"), Decimal::ZERO); // investment gone
        assert_eq!(consolidated("4200"), Decimal::ZERO); // IC revenue gone
        assert_eq!(consolidated("5200"), Decimal::ZERO); // IC expense gone
        assert_eq!(consolidated("3000"), dec!(-500)); // parent equity remains
        assert_eq!(consolidated("1010"), dec!(500)); // sub cash remains
    }

    #[test]
    fn test_steps_execute_in_order() {
        let (inputs, _, _) = scenario_inputs();
        let mut run = make_run(
            inputs.group.id,
            RunOptions {
                continue_on_warnings: true,
                ..RunOptions::default()
            },
        );

        let mut executed = Vec::new();
        while matches!(run.status, RunStatus::Pending | RunStatus::InProgress) {
            match ConsolidationPipeline::execute_next_step(&mut run, &inputs).unwrap() {
                Some(step) => executed.push(step),
                None => break,
            }
        }
        assert_eq!(executed, ConsolidationStep::ALL.to_vec());
    }

    #[test]
    fn test_resume_after_crash_is_deterministic() {
        let (inputs, _, _) = scenario_inputs();
        let options = RunOptions {
            continue_on_warnings: true,
            ..RunOptions::default()
        };

        // Uninterrupted reference run.
        let mut reference = make_run(inputs.group.id, options);
        ConsolidationPipeline::run_to_completion(&mut reference, &inputs).unwrap();

        // Crash after three steps: the persisted run record is all that
        // survives; the worker reloads and continues.
        let mut run = make_run(inputs.group.id, options);
        for _ in 0..3 {
            ConsolidationPipeline::execute_next_step(&mut run, &inputs).unwrap();
        }
        let mut resumed = run.clone();
        ConsolidationPipeline::run_to_completion(&mut resumed, &inputs).unwrap();

        let reference_tb = reference.trial_balance.unwrap();
        let resumed_tb = resumed.trial_balance.unwrap();
        assert_eq!(reference_tb.rows, resumed_tb.rows);
        assert_eq!(reference_tb.total_debits, resumed_tb.total_debits);
    }

    #[test]
    fn test_validation_failure_fails_the_run() {
        let (mut inputs, _, _) = scenario_inputs();
        inputs.group.is_active = false;
        let mut run = make_run(inputs.group.id, RunOptions::default());

        let err = ConsolidationPipeline::execute_next_step(&mut run, &inputs).unwrap_err();
        assert!(matches!(err, ConsolidationError::ValidationFailed { .. }));
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.error_message.is_some());
        let validate_state = &run.steps[0];
        assert_eq!(validate_state.status, StepStatus::Failed);
    }

    #[test]
    fn test_cancel_pending_and_in_progress() {
        let (inputs, _, _) = scenario_inputs();
        let options = RunOptions {
            continue_on_warnings: true,
            ..RunOptions::default()
        };

        let mut pending = make_run(inputs.group.id, options);
        ConsolidationPipeline::cancel(&mut pending).unwrap();
        assert_eq!(pending.status, RunStatus::Cancelled);

        let mut in_progress = make_run(inputs.group.id, options);
        ConsolidationPipeline::execute_next_step(&mut in_progress, &inputs).unwrap();
        // Simulate a step stuck mid-flight at cancel time.
        in_progress.step_mut(ConsolidationStep::Translate).status = StepStatus::InProgress;
        ConsolidationPipeline::cancel(&mut in_progress).unwrap();
        assert_eq!(in_progress.status, RunStatus::Cancelled);
        assert_eq!(
            in_progress.step_mut(ConsolidationStep::Translate).status,
            StepStatus::Skipped
        );
        assert!(in_progress.trial_balance.is_none());

        // Executing a cancelled run is rejected.
        assert!(matches!(
            ConsolidationPipeline::execute_next_step(&mut in_progress, &inputs),
            Err(ConsolidationError::InvalidRunStatus { .. })
        ));
    }

    #[test]
    fn test_cancel_completed_run_is_rejected() {
        let (inputs, _, _) = scenario_inputs();
        let mut run = make_run(
            inputs.group.id,
            RunOptions {
                continue_on_warnings: true,
                ..RunOptions::default()
            },
        );
        ConsolidationPipeline::run_to_completion(&mut run, &inputs).unwrap();
        assert!(matches!(
            ConsolidationPipeline::cancel(&mut run),
            Err(ConsolidationError::InvalidRunStatus {
                current: RunStatus::Completed,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_translation_rate_fails_translate() {
        let (mut inputs, _, sub) = scenario_inputs();
        // Make the sub a EUR company with no rates provided.
        for tb in &mut inputs.member_tbs {
            if tb.company_id == sub {
                tb.currency = "EUR".to_string();
            }
        }
        let mut run = make_run(
            inputs.group.id,
            RunOptions {
                continue_on_warnings: true,
                ..RunOptions::default()
            },
        );

        // Validate succeeds, Translate fails.
        ConsolidationPipeline::execute_next_step(&mut run, &inputs).unwrap();
        let err = ConsolidationPipeline::execute_next_step(&mut run, &inputs).unwrap_err();
        assert!(matches!(
            err,
            ConsolidationError::MissingTranslationRate { company_id, .. } if company_id == sub
        ));
        assert_eq!(run.status, RunStatus::Failed);
    }

    #[test]
    fn test_translated_group_consolidates_in_reporting_currency() {
        let (mut inputs, _, sub) = scenario_inputs();
        for tb in &mut inputs.member_tbs {
            if tb.company_id == sub {
                tb.currency = "EUR".to_string();
            }
        }
        inputs.rates.insert(
            sub,
            TranslationRates {
                average: dec!(1.10),
                closing: dec!(1.20),
                historical: dec!(1.00),
            },
        );
        let mut run = make_run(
            inputs.group.id,
            RunOptions {
                continue_on_warnings: true,
                ..RunOptions::default()
            },
        );

        ConsolidationPipeline::run_to_completion(&mut run, &inputs).unwrap();
        let tb = run.trial_balance.as_ref().unwrap();
        assert!(tb.is_balanced);
        assert_eq!(tb.currency, "USD");
        // The CTA row appears for the translated member.
        assert!(tb.rows.iter().any(|r| r.account_number == "3900"));
    }

    #[test]
    fn test_force_regeneration_restarts_from_step_one() {
        let (inputs, _, _) = scenario_inputs();
        let mut run = make_run(
            inputs.group.id,
            RunOptions {
                continue_on_warnings: true,
                ..RunOptions::default()
            },
        );
        ConsolidationPipeline::run_to_completion(&mut run, &inputs).unwrap();

        // Re-queue with force_regeneration: all steps reset and re-run.
        run.status = RunStatus::Pending;
        run.options.force_regeneration = true;
        let step = ConsolidationPipeline::execute_next_step(&mut run, &inputs).unwrap();
        assert_eq!(step, Some(ConsolidationStep::Validate));
    }
}
