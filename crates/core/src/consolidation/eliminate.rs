//! Steps 4 and 5: intercompany matching and elimination.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::intercompany::types::IntercompanyTransaction;

use super::error::ConsolidationError;
use super::types::{
    AccountSelector, AggregatedBalance, ConsolidationGroup, EliminationEntry, EliminationLine,
    EliminationPairDraft, EliminationRule, EliminationRuleType, IssueSeverity, ValidationIssue,
};

/// Step 4: pairs intercompany transactions between group members.
///
/// A transaction qualifies when both companies are group members, its date
/// falls inside the consolidated period, and both journal entries are
/// linked. Matches within tolerance become elimination pair drafts;
/// out-of-tolerance pairs are reported as warnings.
#[must_use]
pub fn match_intercompany(
    group: &ConsolidationGroup,
    transactions: &[IntercompanyTransaction],
    period_start: NaiveDate,
    period_end: NaiveDate,
    tolerance: Decimal,
) -> (Vec<EliminationPairDraft>, Vec<ValidationIssue>) {
    let mut drafts = Vec::new();
    let mut warnings = Vec::new();

    for tx in transactions {
        if !group.contains_pair(tx.from_company_id, tx.to_company_id) {
            continue;
        }
        if tx.transaction_date < period_start || tx.transaction_date > period_end {
            continue;
        }
        if tx.from_journal_entry_id.is_none() || tx.to_journal_entry_id.is_none() {
            warnings.push(ValidationIssue {
                severity: IssueSeverity::Warning,
                code: "ic_unlinked".to_string(),
                message: format!(
                    "Intercompany transaction {} has unlinked journal entries",
                    tx.id
                ),
            });
            continue;
        }
        if tx.variance.abs() < tolerance {
            drafts.push(EliminationPairDraft {
                transaction_id: tx.id,
                from_company_id: tx.from_company_id,
                to_company_id: tx.to_company_id,
                amount: tx.amount,
                variance: tx.variance,
            });
        } else {
            warnings.push(ValidationIssue {
                severity: IssueSeverity::Warning,
                code: "ic_variance".to_string(),
                message: format!(
                    "Intercompany transaction {} variance {} exceeds tolerance {}",
                    tx.id, tx.variance, tolerance
                ),
            });
        }
    }

    (drafts, warnings)
}

/// Step 5: evaluates elimination rules against the aggregated balances.
///
/// Rules run by priority ascending (lower first). Each firing rule yields
/// one synthetic elimination entry whose lines offset the selected
/// balances; every entry is validated to balance before it is accepted.
///
/// # Errors
///
/// Returns `UnbalancedElimination` if a generated entry does not balance
/// (a construction bug, never silently swallowed).
pub fn eliminate(
    rules: &[EliminationRule],
    aggregated: &[AggregatedBalance],
    account_numbers: &BTreeMap<Uuid, String>,
) -> Result<Vec<EliminationEntry>, ConsolidationError> {
    let mut ordered: Vec<&EliminationRule> =
        rules.iter().filter(|r| r.is_active).collect();
    ordered.sort_by_key(|r| (r.priority, r.name.clone()));

    let mut entries = Vec::new();
    for rule in ordered {
        if let Some(entry) = apply_rule(rule, aggregated, account_numbers) {
            let imbalance = entry.imbalance();
            if !imbalance.is_zero() {
                return Err(ConsolidationError::UnbalancedElimination {
                    rule_id: rule.id,
                    imbalance,
                });
            }
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn apply_rule(
    rule: &EliminationRule,
    aggregated: &[AggregatedBalance],
    account_numbers: &BTreeMap<Uuid, String>,
) -> Option<EliminationEntry> {
    let sources = select_rows(&rule.source_selectors, aggregated, account_numbers);
    let targets = select_rows(&rule.target_selectors, aggregated, account_numbers);

    let lines = match rule.rule_type {
        // Credit the receivable balances away, debit the payables.
        EliminationRuleType::IntercompanyReceivablePayable => {
            let amount = debit_total(&sources).min(credit_total(&targets));
            pair_offsets(&sources, &targets, amount, true)
        }
        // Debit the intercompany revenue away, credit the expense.
        EliminationRuleType::IntercompanyRevenueExpense => {
            let amount = credit_total(&sources).min(debit_total(&targets));
            pair_offsets(&targets, &sources, amount, true)
        }
        // Debit dividend income away; restore subsidiary retained earnings
        // with the offsetting credit.
        EliminationRuleType::IntercompanyDividend => {
            let amount = credit_total(&sources);
            if amount <= Decimal::ZERO || targets.is_empty() {
                return None;
            }
            let mut lines = Vec::new();
            let mut remaining = amount;
            for row in &sources {
                if remaining <= Decimal::ZERO {
                    break;
                }
                let available = (-row.amount).max(Decimal::ZERO);
                if available.is_zero() {
                    continue;
                }
                let take = available.min(remaining);
                lines.push(line_from(row, take));
                remaining -= take;
            }
            lines.push(line_from(targets[0], -amount));
            lines
        }
        // Debit subsidiary equity, credit the parent's investment.
        EliminationRuleType::IntercompanyInvestment => {
            let amount = debit_total(&sources).min(credit_total(&targets));
            pair_offsets(&sources, &targets, amount, true)
        }
        // Deferral rules carry an explicit amount and explicit accounts.
        EliminationRuleType::UnrealizedProfitInventory
        | EliminationRuleType::UnrealizedProfitFixedAssets => {
            let amount: Decimal = rule
                .trigger_conditions
                .iter()
                .filter_map(|c| c.amount)
                .sum();
            if amount <= Decimal::ZERO {
                return None;
            }
            let debit_row = rule
                .debit_account_id
                .and_then(|id| row_by_id(id, aggregated, account_numbers))?;
            let credit_row = rule
                .credit_account_id
                .and_then(|id| row_by_id(id, aggregated, account_numbers))?;
            vec![
                line_from(debit_row, amount),
                line_from(credit_row, -amount),
            ]
        }
    };

    if lines.is_empty() {
        return None;
    }

    let total: Decimal = lines.iter().map(|l| l.amount.abs()).sum::<Decimal>() / Decimal::TWO;
    let minimum = rule
        .trigger_conditions
        .iter()
        .filter_map(|c| c.minimum_amount)
        .max();
    if let Some(minimum) = minimum {
        if total < minimum {
            return None;
        }
    }

    Some(EliminationEntry {
        id: Uuid::new_v4(),
        rule_id: rule.id,
        rule_type: rule.rule_type,
        description: rule.name.clone(),
        lines,
    })
}

/// Builds offsetting lines: credit `credit_side` rows (which carry debit
/// balances) and debit `debit_side` rows (which carry credit balances),
/// each consuming up to `amount` in account-number order.
///
/// `strict` rules return no lines when the amount is zero.
fn pair_offsets(
    credit_side: &[&AggregatedBalance],
    debit_side: &[&AggregatedBalance],
    amount: Decimal,
    strict: bool,
) -> Vec<EliminationLine> {
    if strict && amount <= Decimal::ZERO {
        return Vec::new();
    }

    let mut lines = Vec::new();

    let mut remaining = amount;
    for row in credit_side {
        if remaining <= Decimal::ZERO {
            break;
        }
        let available = row.amount.max(Decimal::ZERO);
        if available.is_zero() {
            continue;
        }
        let take = available.min(remaining);
        lines.push(line_from(row, -take));
        remaining -= take;
    }

    let mut remaining = amount;
    for row in debit_side {
        if remaining <= Decimal::ZERO {
            break;
        }
        let available = (-row.amount).max(Decimal::ZERO);
        if available.is_zero() {
            continue;
        }
        let take = available.min(remaining);
        lines.push(line_from(row, take));
        remaining -= take;
    }

    lines
}

fn select_rows<'a>(
    selectors: &[AccountSelector],
    aggregated: &'a [AggregatedBalance],
    account_numbers: &BTreeMap<Uuid, String>,
) -> Vec<&'a AggregatedBalance> {
    let mut rows: Vec<&AggregatedBalance> = aggregated
        .iter()
        .filter(|row| {
            selectors.iter().any(|selector| match selector {
                AccountSelector::ById { account_id } => account_numbers
                    .get(account_id)
                    .is_some_and(|number| *number == row.account_number),
                AccountSelector::ByRange { from, to } => {
                    row.account_number.as_str() >= from.as_str()
                        && row.account_number.as_str() <= to.as_str()
                }
                AccountSelector::ByCategory { category } => row.category == *category,
            })
        })
        .collect();
    rows.sort_by(|a, b| a.account_number.cmp(&b.account_number));
    rows
}

fn row_by_id<'a>(
    account_id: Uuid,
    aggregated: &'a [AggregatedBalance],
    account_numbers: &BTreeMap<Uuid, String>,
) -> Option<&'a AggregatedBalance> {
    let number = account_numbers.get(&account_id)?;
    aggregated.iter().find(|r| r.account_number == *number)
}

fn line_from(row: &AggregatedBalance, amount: Decimal) -> EliminationLine {
    EliminationLine {
        account_number: row.account_number.clone(),
        account_name: row.account_name.clone(),
        account_type: row.account_type,
        category: row.category.clone(),
        amount,
    }
}

fn debit_total(rows: &[&AggregatedBalance]) -> Decimal {
    rows.iter().map(|r| r.amount.max(Decimal::ZERO)).sum()
}

fn credit_total(rows: &[&AggregatedBalance]) -> Decimal {
    rows.iter().map(|r| (-r.amount).max(Decimal::ZERO)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use crate::consolidation::types::TriggerCondition;
    use rust_decimal_macros::dec;

    fn agg(number: &str, account_type: AccountType, category: &str, amount: Decimal) -> AggregatedBalance {
        AggregatedBalance {
            account_number: number.to_string(),
            account_name: format!("Account {number}"),
            account_type,
            category: category.to_string(),
            is_intercompany: category == "intercompany",
            amount,
            member_count: 1,
        }
    }

    fn rule(
        rule_type: EliminationRuleType,
        priority: u16,
        sources: Vec<AccountSelector>,
        targets: Vec<AccountSelector>,
    ) -> EliminationRule {
        EliminationRule {
            id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
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

    fn by_range(from: &str, to: &str) -> AccountSelector {
        AccountSelector::ByRange {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn test_receivable_payable_elimination() {
        let aggregated = vec![
            agg("1600", AccountType::Asset, "intercompany", dec!(300)),
            agg("2600", AccountType::Liability, "intercompany", dec!(-300)),
        ];
        let r = rule(
            EliminationRuleType::IntercompanyReceivablePayable,
            10,
            vec![by_range("1600", "1699")],
            vec![by_range("2600", "2699")],
        );

        let entries = eliminate(&[r], &aggregated, &BTreeMap::new()).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert!(entry.imbalance().is_zero());
        // Receivable credited away, payable debited away.
        let receivable = entry.lines.iter().find(|l| l.account_number == "1600").unwrap();
        assert_eq!(receivable.amount, dec!(-300));
        let payable = entry.lines.iter().find(|l| l.account_number == "2600").unwrap();
        assert_eq!(payable.amount, dec!(300));
    }

    #[test]
    fn test_revenue_expense_elimination() {
        let aggregated = vec![
            agg("4200", AccountType::Revenue, "intercompany", dec!(-500)),
            agg("5200", AccountType::Expense, "intercompany", dec!(500)),
        ];
        let r = rule(
            EliminationRuleType::IntercompanyRevenueExpense,
            20,
            vec![by_range("4200", "4299")],
            vec![by_range("5200", "5299")],
        );

        let entries = eliminate(&[r], &aggregated, &BTreeMap::new()).unwrap();
        let entry = &entries[0];
        let revenue = entry.lines.iter().find(|l| l.account_number == "4200").unwrap();
        assert_eq!(revenue.amount, dec!(500)); // debit removes the credit
        let expense = entry.lines.iter().find(|l| l.account_number == "5200").unwrap();
        assert_eq!(expense.amount, dec!(-500));
    }

    #[test]
    fn test_investment_elimination() {
        let aggregated = vec![
            agg("1400", AccountType::Asset, "investment", dec!(1000)),
            agg("3000", AccountType::Equity, "contributed_capital", dec!(-1000)),
        ];
        let r = rule(
            EliminationRuleType::IntercompanyInvestment,
            5,
            vec![by_range("1400", "1499")],
            vec![by_range("3000", "3099")],
        );

        let entries = eliminate(&[r], &aggregated, &BTreeMap::new()).unwrap();
        let entry = &entries[0];
        assert!(entry.imbalance().is_zero());
        let investment = entry.lines.iter().find(|l| l.account_number == "1400").unwrap();
        assert_eq!(investment.amount, dec!(-1000));
        let equity = entry.lines.iter().find(|l| l.account_number == "3000").unwrap();
        assert_eq!(equity.amount, dec!(1000));
    }

    #[test]
    fn test_dividend_elimination_restores_retained_earnings() {
        let aggregated = vec![
            agg("4100", AccountType::Revenue, "other_revenue", dec!(-200)),
            agg("3100", AccountType::Equity, "retained_earnings", dec!(-900)),
        ];
        let r = rule(
            EliminationRuleType::IntercompanyDividend,
            30,
            vec![by_range("4100", "4199")],
            vec![by_range("3100", "3199")],
        );

        let entries = eliminate(&[r], &aggregated, &BTreeMap::new()).unwrap();
        let entry = &entries[0];
        assert!(entry.imbalance().is_zero());
        let income = entry.lines.iter().find(|l| l.account_number == "4100").unwrap();
        assert_eq!(income.amount, dec!(200)); // debit removes dividend income
        let re = entry.lines.iter().find(|l| l.account_number == "3100").unwrap();
        assert_eq!(re.amount, dec!(-200)); // credit restores subsidiary RE
    }

    #[test]
    fn test_partial_elimination_caps_at_smaller_side() {
        // Receivable 300 vs payable 200: only 200 eliminates.
        let aggregated = vec![
            agg("1600", AccountType::Asset, "intercompany", dec!(300)),
            agg("2600", AccountType::Liability, "intercompany", dec!(-200)),
        ];
        let r = rule(
            EliminationRuleType::IntercompanyReceivablePayable,
            10,
            vec![by_range("1600", "1699")],
            vec![by_range("2600", "2699")],
        );

        let entries = eliminate(&[r], &aggregated, &BTreeMap::new()).unwrap();
        let entry = &entries[0];
        let receivable = entry.lines.iter().find(|l| l.account_number == "1600").unwrap();
        assert_eq!(receivable.amount, dec!(-200));
    }

    #[test]
    fn test_rule_without_matching_balances_is_silent() {
        let aggregated = vec![agg("1010", AccountType::Asset, "current_asset", dec!(100))];
        let r = rule(
            EliminationRuleType::IntercompanyReceivablePayable,
            10,
            vec![by_range("1600", "1699")],
            vec![by_range("2600", "2699")],
        );
        let entries = eliminate(&[r], &aggregated, &BTreeMap::new()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_inactive_rules_are_skipped() {
        let aggregated = vec![
            agg("1600", AccountType::Asset, "intercompany", dec!(300)),
            agg("2600", AccountType::Liability, "intercompany", dec!(-300)),
        ];
        let mut r = rule(
            EliminationRuleType::IntercompanyReceivablePayable,
            10,
            vec![by_range("1600", "1699")],
            vec![by_range("2600", "2699")],
        );
        r.is_active = false;
        let entries = eliminate(&[r], &aggregated, &BTreeMap::new()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_rules_run_in_priority_order() {
        let aggregated = vec![
            agg("1600", AccountType::Asset, "intercompany", dec!(100)),
            agg("2600", AccountType::Liability, "intercompany", dec!(-100)),
            agg("4200", AccountType::Revenue, "intercompany", dec!(-50)),
            agg("5200", AccountType::Expense, "intercompany", dec!(50)),
        ];
        let high = rule(
            EliminationRuleType::IntercompanyRevenueExpense,
            90,
            vec![by_range("4200", "4299")],
            vec![by_range("5200", "5299")],
        );
        let low = rule(
            EliminationRuleType::IntercompanyReceivablePayable,
            10,
            vec![by_range("1600", "1699")],
            vec![by_range("2600", "2699")],
        );

        let entries = eliminate(&[high, low], &aggregated, &BTreeMap::new()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].rule_type,
            EliminationRuleType::IntercompanyReceivablePayable
        );
        assert_eq!(
            entries[1].rule_type,
            EliminationRuleType::IntercompanyRevenueExpense
        );
    }

    #[test]
    fn test_by_id_selector_resolves_through_index() {
        let account_id = Uuid::new_v4();
        let mut index = BTreeMap::new();
        index.insert(account_id, "1600".to_string());

        let aggregated = vec![
            agg("1600", AccountType::Asset, "intercompany", dec!(120)),
            agg("2600", AccountType::Liability, "intercompany", dec!(-120)),
        ];
        let r = rule(
            EliminationRuleType::IntercompanyReceivablePayable,
            10,
            vec![AccountSelector::ById { account_id }],
            vec![by_range("2600", "2699")],
        );
        let entries = eliminate(&[r], &aggregated, &index).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_unrealized_profit_uses_explicit_amount_and_minimum() {
        let debit_id = Uuid::new_v4();
        let credit_id = Uuid::new_v4();
        let mut index = BTreeMap::new();
        index.insert(debit_id, "5000".to_string());
        index.insert(credit_id, "1200".to_string());

        let aggregated = vec![
            agg("5000", AccountType::Expense, "cost_of_goods_sold", dec!(700)),
            agg("1200", AccountType::Asset, "current_asset", dec!(400)),
        ];
        let mut r = rule(EliminationRuleType::UnrealizedProfitInventory, 50, vec![], vec![]);
        r.debit_account_id = Some(debit_id);
        r.credit_account_id = Some(credit_id);
        r.trigger_conditions = vec![TriggerCondition {
            minimum_amount: Some(dec!(100)),
            amount: Some(dec!(150)),
        }];

        let entries = eliminate(&[r.clone()], &aggregated, &index).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lines[0].amount, dec!(150));
        assert_eq!(entries[0].lines[1].amount, dec!(-150));

        // Below the minimum, the rule stays silent.
        r.trigger_conditions = vec![TriggerCondition {
            minimum_amount: Some(dec!(500)),
            amount: Some(dec!(150)),
        }];
        let entries = eliminate(&[r], &aggregated, &index).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_match_intercompany_drafts_and_warnings() {
        use crate::intercompany::types::{IntercompanyTransactionType, MatchingStatus};

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let group = ConsolidationGroup {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            name: "G".to_string(),
            reporting_currency: "USD".to_string(),
            parent_company_id: a,
            members: vec![
                crate::consolidation::types::GroupMember {
                    company_id: a,
                    ownership_percentage: dec!(100),
                    method: crate::consolidation::types::ConsolidationMethod::FullConsolidation,
                    acquisition_date: None,
                    goodwill: Decimal::ZERO,
                    is_vie: false,
                },
                crate::consolidation::types::GroupMember {
                    company_id: b,
                    ownership_percentage: dec!(100),
                    method: crate::consolidation::types::ConsolidationMethod::FullConsolidation,
                    acquisition_date: None,
                    goodwill: Decimal::ZERO,
                    is_vie: false,
                },
            ],
            is_active: true,
        };

        let make_tx = |from: Uuid, to: Uuid, variance: Decimal, linked: bool| {
            IntercompanyTransaction {
                id: Uuid::new_v4(),
                organization_id: group.organization_id,
                from_company_id: from,
                to_company_id: to,
                transaction_type: IntercompanyTransactionType::Sale,
                transaction_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
                amount: dec!(500),
                currency: "USD".to_string(),
                from_journal_entry_id: linked.then(Uuid::new_v4),
                to_journal_entry_id: linked.then(Uuid::new_v4),
                matching_status: MatchingStatus::Matched,
                variance,
                variance_explanation: None,
            }
        };

        let outsider = Uuid::new_v4();
        let transactions = vec![
            make_tx(a, b, dec!(0), true),          // drafts
            make_tx(a, b, dec!(5), true),          // variance warning
            make_tx(a, b, dec!(0), false),         // unlinked warning
            make_tx(a, outsider, dec!(0), true),   // not in group, ignored
        ];

        let (drafts, warnings) = match_intercompany(
            &group,
            &transactions,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            dec!(0.01),
        );
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].amount, dec!(500));
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_match_intercompany_filters_by_period() {
        use crate::intercompany::types::{IntercompanyTransactionType, MatchingStatus};

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let group = ConsolidationGroup {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            name: "G".to_string(),
            reporting_currency: "USD".to_string(),
            parent_company_id: a,
            members: vec![
                crate::consolidation::types::GroupMember {
                    company_id: a,
                    ownership_percentage: dec!(100),
                    method: crate::consolidation::types::ConsolidationMethod::FullConsolidation,
                    acquisition_date: None,
                    goodwill: Decimal::ZERO,
                    is_vie: false,
                },
                crate::consolidation::types::GroupMember {
                    company_id: b,
                    ownership_percentage: dec!(100),
                    method: crate::consolidation::types::ConsolidationMethod::FullConsolidation,
                    acquisition_date: None,
                    goodwill: Decimal::ZERO,
                    is_vie: false,
                },
            ],
            is_active: true,
        };

        let tx = IntercompanyTransaction {
            id: Uuid::new_v4(),
            organization_id: group.organization_id,
            from_company_id: a,
            to_company_id: b,
            transaction_type: IntercompanyTransactionType::Sale,
            transaction_date: NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(),
            amount: dec!(500),
            currency: "USD".to_string(),
            from_journal_entry_id: Some(Uuid::new_v4()),
            to_journal_entry_id: Some(Uuid::new_v4()),
            matching_status: MatchingStatus::Matched,
            variance: Decimal::ZERO,
            variance_explanation: None,
        };

        let (drafts, warnings) = match_intercompany(
            &group,
            &[tx],
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            dec!(0.01),
        );
        assert!(drafts.is_empty());
        assert!(warnings.is_empty());
    }
}
