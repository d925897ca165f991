//! Property-based tests for posting resolution and reversal.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::posting::PostingService;
use super::reversal::{ReversalInput, ReversalService};
use super::types::{CreateEntryInput, EntryType, JournalLineInput, LineSide, SourceModule};

/// Strategy producing positive two-decimal amounts.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy producing a balanced set of same-currency line inputs: each
/// amount appears once as a debit and once as a credit.
fn balanced_lines() -> impl Strategy<Value = Vec<JournalLineInput>> {
    prop::collection::vec(positive_amount(), 1..8).prop_map(|amounts| {
        let mut lines = Vec::with_capacity(amounts.len() * 2);
        for amount in amounts {
            for side in [LineSide::Debit, LineSide::Credit] {
                lines.push(JournalLineInput {
                    account_id: Uuid::new_v4(),
                    side,
                    amount,
                    currency: "USD".to_string(),
                    exchange_rate: None,
                    memo: None,
                    dimensions: BTreeMap::new(),
                    intercompany_partner_id: None,
                    matching_line_id: None,
                });
            }
        }
        lines
    })
}

fn make_input(lines: Vec<JournalLineInput>) -> CreateEntryInput {
    CreateEntryInput {
        company_id: Uuid::new_v4(),
        entry_type: EntryType::Standard,
        source_module: SourceModule::GeneralLedger,
        transaction_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        document_date: None,
        posting_date: None,
        description: "prop entry".to_string(),
        reference: None,
        lines,
        created_by: Uuid::new_v4(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Posting a balanced entry yields equal functional debits and credits.
    #[test]
    fn prop_resolved_entries_balance(lines in balanced_lines()) {
        let input = make_input(lines);
        let (resolved, totals) =
            PostingService::resolve_lines(&input, "USD", |_, _| None).unwrap();

        prop_assert!(totals.is_balanced);
        let debit: Decimal = resolved.iter().map(|l| l.debit).sum();
        let credit: Decimal = resolved.iter().map(|l| l.credit).sum();
        prop_assert_eq!(debit, credit);
    }

    /// Line numbers are 1-based, dense, and ordered.
    #[test]
    fn prop_line_numbers_are_dense(lines in balanced_lines()) {
        let input = make_input(lines);
        let (resolved, _) =
            PostingService::resolve_lines(&input, "USD", |_, _| None).unwrap();
        for (index, line) in resolved.iter().enumerate() {
            prop_assert_eq!(line.line_number as usize, index + 1);
        }
    }

    /// Reverse ∘ post nets to zero per account in functional currency.
    #[test]
    fn prop_reversal_nets_to_zero(lines in balanced_lines()) {
        let input = make_input(lines);
        let (resolved, _) =
            PostingService::resolve_lines(&input, "USD", |_, _| None).unwrap();

        let reversal_input = ReversalInput {
            original_entry_id: Uuid::new_v4(),
            company_id: input.company_id,
            original_lines: resolved.clone(),
            reversal_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            original_description: "prop entry".to_string(),
            reversed_by: Uuid::new_v4(),
        };
        let reversal = ReversalService::build_reversal(&reversal_input).unwrap();
        let (reversal_resolved, _) =
            PostingService::resolve_lines(&reversal, "USD", |_, _| None).unwrap();

        // Net signed effect per account is zero.
        let mut net: BTreeMap<Uuid, Decimal> = BTreeMap::new();
        for line in resolved.iter().chain(&reversal_resolved) {
            *net.entry(line.account_id).or_default() += line.debit - line.credit;
        }
        for (account, effect) in net {
            prop_assert_eq!(effect, Decimal::ZERO, "account {} not neutral", account);
        }
    }
}
