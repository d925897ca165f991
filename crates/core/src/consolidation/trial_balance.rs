//! Step 7: consolidated trial balance generation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::error::ConsolidationError;
use super::types::{
    AggregatedBalance, ConsolidatedRow, ConsolidatedTrialBalance, EliminationEntry, NciResult,
};

/// Combines aggregated balances, elimination effects, and NCI adjustments
/// into the consolidated trial balance.
///
/// Rows key on (account number, type, category); eliminations and NCI
/// adjustments land on the matching row, creating one when no aggregated
/// balance exists for the key (e.g. a fresh NCI row). The result must
/// balance in reporting currency.
///
/// # Errors
///
/// Returns `NotBalanced` when consolidated debits differ from credits.
pub fn generate_trial_balance(
    aggregated: &[AggregatedBalance],
    eliminations: &[EliminationEntry],
    nci: &NciResult,
    reporting_currency: &str,
) -> Result<ConsolidatedTrialBalance, ConsolidationError> {
    let mut rows: BTreeMap<(String, String, String), ConsolidatedRow> = BTreeMap::new();

    for balance in aggregated {
        let key = (
            balance.account_number.clone(),
            balance.account_type.to_string(),
            balance.category.clone(),
        );
        rows.insert(
            key,
            ConsolidatedRow {
                account_number: balance.account_number.clone(),
                account_name: balance.account_name.clone(),
                account_type: balance.account_type,
                category: balance.category.clone(),
                aggregated_balance: balance.amount,
                elimination_amount: Decimal::ZERO,
                nci_amount: Decimal::ZERO,
                consolidated_balance: Decimal::ZERO,
            },
        );
    }

    for entry in eliminations {
        for line in &entry.lines {
            let key = (
                line.account_number.clone(),
                line.account_type.to_string(),
                line.category.clone(),
            );
            let row = rows.entry(key).or_insert_with(|| ConsolidatedRow {
                account_number: line.account_number.clone(),
                account_name: line.account_name.clone(),
                account_type: line.account_type,
                category: line.category.clone(),
                aggregated_balance: Decimal::ZERO,
                elimination_amount: Decimal::ZERO,
                nci_amount: Decimal::ZERO,
                consolidated_balance: Decimal::ZERO,
            });
            row.elimination_amount += line.amount;
        }
    }

    for line in &nci.adjustments {
        let key = (
            line.account_number.clone(),
            line.account_type.to_string(),
            line.category.clone(),
        );
        let row = rows.entry(key).or_insert_with(|| ConsolidatedRow {
            account_number: line.account_number.clone(),
            account_name: line.account_name.clone(),
            account_type: line.account_type,
            category: line.category.clone(),
            aggregated_balance: Decimal::ZERO,
            elimination_amount: Decimal::ZERO,
            nci_amount: Decimal::ZERO,
            consolidated_balance: Decimal::ZERO,
        });
        row.nci_amount += line.amount;
    }

    let mut total_debits = Decimal::ZERO;
    let mut total_credits = Decimal::ZERO;
    let rows: Vec<ConsolidatedRow> = rows
        .into_values()
        .map(|mut row| {
            row.consolidated_balance =
                row.aggregated_balance + row.elimination_amount + row.nci_amount;
            if row.consolidated_balance > Decimal::ZERO {
                total_debits += row.consolidated_balance;
            } else {
                total_credits += -row.consolidated_balance;
            }
            row
        })
        .collect();

    if total_debits != total_credits {
        return Err(ConsolidationError::NotBalanced {
            debits: total_debits,
            credits: total_credits,
        });
    }

    Ok(ConsolidatedTrialBalance {
        rows,
        total_debits,
        total_credits,
        is_balanced: true,
        currency: reporting_currency.to_uppercase(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use crate::consolidation::types::{EliminationLine, EliminationRuleType};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn agg(number: &str, account_type: AccountType, amount: Decimal) -> AggregatedBalance {
        AggregatedBalance {
            account_number: number.to_string(),
            account_name: format!("Account {number}"),
            account_type,
            category: "test".to_string(),
            is_intercompany: false,
            amount,
            member_count: 1,
        }
    }

    fn line(number: &str, account_type: AccountType, amount: Decimal) -> EliminationLine {
        EliminationLine {
            account_number: number.to_string(),
            account_name: format!("Account {number}"),
            account_type,
            category: "test".to_string(),
            amount,
        }
    }

    fn entry(lines: Vec<EliminationLine>) -> EliminationEntry {
        EliminationEntry {
            id: Uuid::new_v4(),
            rule_id: Uuid::new_v4(),
            rule_type: EliminationRuleType::IntercompanyReceivablePayable,
            description: "test".to_string(),
            lines,
        }
    }

    #[test]
    fn test_consolidated_balance_combines_columns() {
        let aggregated = vec![
            agg("1600", AccountType::Asset, dec!(300)),
            agg("2600", AccountType::Liability, dec!(-300)),
        ];
        let eliminations = vec![entry(vec![
            line("1600", AccountType::Asset, dec!(-300)),
            line("2600", AccountType::Liability, dec!(300)),
        ])];

        let tb = generate_trial_balance(
            &aggregated,
            &eliminations,
            &NciResult::default(),
            "usd",
        )
        .unwrap();

        assert!(tb.is_balanced);
        assert_eq!(tb.currency, "USD");
        for row in &tb.rows {
            assert_eq!(row.consolidated_balance, Decimal::ZERO);
            assert_eq!(
                row.consolidated_balance,
                row.aggregated_balance + row.elimination_amount + row.nci_amount
            );
        }
    }

    #[test]
    fn test_adjustment_creates_missing_row() {
        let aggregated = vec![
            agg("1010", AccountType::Asset, dec!(100)),
            agg("3000", AccountType::Equity, dec!(-100)),
        ];
        let nci = NciResult {
            adjustments: vec![
                line("3000", AccountType::Equity, dec!(20)),
                line("3500", AccountType::Equity, dec!(-20)),
            ],
            ..NciResult::default()
        };

        let tb = generate_trial_balance(&aggregated, &[], &nci, "USD").unwrap();
        let nci_row = tb.rows.iter().find(|r| r.account_number == "3500").unwrap();
        assert_eq!(nci_row.aggregated_balance, Decimal::ZERO);
        assert_eq!(nci_row.nci_amount, dec!(-20));
        assert_eq!(nci_row.consolidated_balance, dec!(-20));
    }

    #[test]
    fn test_unbalanced_output_is_rejected() {
        let aggregated = vec![agg("1010", AccountType::Asset, dec!(100))];
        let err = generate_trial_balance(
            &aggregated,
            &[],
            &NciResult::default(),
            "USD",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConsolidationError::NotBalanced { debits, credits }
                if debits == dec!(100) && credits == Decimal::ZERO
        ));
    }

    #[test]
    fn test_rows_sorted_by_account_number() {
        let aggregated = vec![
            agg("4000", AccountType::Revenue, dec!(-50)),
            agg("1010", AccountType::Asset, dec!(50)),
        ];
        let tb = generate_trial_balance(
            &aggregated,
            &[],
            &NciResult::default(),
            "USD",
        )
        .unwrap();
        let numbers: Vec<&str> = tb.rows.iter().map(|r| r.account_number.as_str()).collect();
        assert_eq!(numbers, vec!["1010", "4000"]);
    }

    #[test]
    fn test_totals_split_debit_and_credit_sides() {
        let aggregated = vec![
            agg("1010", AccountType::Asset, dec!(250)),
            agg("2010", AccountType::Liability, dec!(-100)),
            agg("3000", AccountType::Equity, dec!(-150)),
        ];
        let tb = generate_trial_balance(
            &aggregated,
            &[],
            &NciResult::default(),
            "USD",
        )
        .unwrap();
        assert_eq!(tb.total_debits, dec!(250));
        assert_eq!(tb.total_credits, dec!(250));
    }
}
