//! Balance and postability validation for journal entries.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::JournalError;
use super::types::{CreateEntryInput, JournalLineInput, LineSide};

/// Validates the structural rules of an entry's lines.
///
/// Checks, in order:
/// 1. at least 2 lines,
/// 2. every amount positive and non-zero,
/// 3. every account exists, is active, postable, belongs to the entry's
///    company, and accepts the line currency,
/// 4. debits equal credits per transaction currency.
///
/// # Errors
///
/// Returns the first violated rule as a `JournalError`.
pub fn validate_entry<A>(input: &CreateEntryInput, account_info: A) -> Result<(), JournalError>
where
    A: Fn(Uuid) -> Option<super::types::AccountInfo>,
{
    if input.lines.len() < 2 {
        return Err(JournalError::InsufficientLines);
    }

    for line in &input.lines {
        validate_line(line, input.company_id, &account_info)?;
    }

    validate_transaction_balance(&input.lines)
}

fn validate_line<A>(
    line: &JournalLineInput,
    company_id: Uuid,
    account_info: &A,
) -> Result<(), JournalError>
where
    A: Fn(Uuid) -> Option<super::types::AccountInfo>,
{
    if line.amount.is_zero() {
        return Err(JournalError::ZeroAmount);
    }
    if line.amount < Decimal::ZERO {
        return Err(JournalError::NegativeAmount);
    }

    let info = account_info(line.account_id)
        .ok_or(JournalError::AccountNotFound(line.account_id))?;
    if info.company_id != company_id {
        return Err(JournalError::AccountCompanyMismatch(line.account_id));
    }
    if !info.is_active {
        return Err(JournalError::AccountInactive(line.account_id));
    }
    if !info.is_postable {
        return Err(JournalError::AccountNotPostable(line.account_id));
    }
    if let Some(restricted) = &info.currency_restriction {
        if !restricted.eq_ignore_ascii_case(&line.currency) {
            return Err(JournalError::CurrencyRestricted {
                account_id: line.account_id,
                currency: line.currency.to_uppercase(),
                restricted_to: restricted.clone(),
            });
        }
    }

    Ok(())
}

/// Verifies that debits equal credits in every transaction currency.
///
/// # Errors
///
/// Returns `Unbalanced` carrying the first failing currency's totals.
pub fn validate_transaction_balance(lines: &[JournalLineInput]) -> Result<(), JournalError> {
    let mut per_currency: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();

    for line in lines {
        let totals = per_currency.entry(line.currency.as_str()).or_default();
        match line.side {
            LineSide::Debit => totals.0 += line.amount,
            LineSide::Credit => totals.1 += line.amount,
        }
    }

    for (currency, (debits, credits)) in per_currency {
        if debits != credits {
            return Err(JournalError::Unbalanced {
                total_debits: debits,
                total_credits: credits,
                currency: currency.to_uppercase(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::types::{AccountInfo, EntryType, SourceModule};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn make_line(side: LineSide, amount: Decimal, currency: &str) -> JournalLineInput {
        JournalLineInput {
            account_id: Uuid::new_v4(),
            side,
            amount,
            currency: currency.to_string(),
            exchange_rate: None,
            memo: None,
            dimensions: BTreeMap::new(),
            intercompany_partner_id: None,
            matching_line_id: None,
        }
    }

    fn make_input(company_id: Uuid, lines: Vec<JournalLineInput>) -> CreateEntryInput {
        CreateEntryInput {
            company_id,
            entry_type: EntryType::Standard,
            source_module: SourceModule::GeneralLedger,
            transaction_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            document_date: None,
            posting_date: None,
            description: "Test entry".to_string(),
            reference: None,
            lines,
            created_by: Uuid::new_v4(),
        }
    }

    fn ok_info(company_id: Uuid) -> impl Fn(Uuid) -> Option<AccountInfo> {
        move |id| {
            Some(AccountInfo {
                id,
                company_id,
                is_active: true,
                is_postable: true,
                currency_restriction: None,
            })
        }
    }

    #[test]
    fn test_balanced_entry_passes() {
        let company = Uuid::new_v4();
        let input = make_input(
            company,
            vec![
                make_line(LineSide::Debit, dec!(100), "USD"),
                make_line(LineSide::Credit, dec!(100), "USD"),
            ],
        );
        assert!(validate_entry(&input, ok_info(company)).is_ok());
    }

    #[test]
    fn test_single_line_rejected() {
        let company = Uuid::new_v4();
        let input = make_input(company, vec![make_line(LineSide::Debit, dec!(100), "USD")]);
        assert!(matches!(
            validate_entry(&input, ok_info(company)),
            Err(JournalError::InsufficientLines)
        ));
    }

    #[test]
    fn test_unbalanced_reports_totals() {
        let company = Uuid::new_v4();
        let input = make_input(
            company,
            vec![
                make_line(LineSide::Debit, dec!(100.00), "USD"),
                make_line(LineSide::Credit, dec!(99.99), "USD"),
            ],
        );
        match validate_entry(&input, ok_info(company)) {
            Err(JournalError::Unbalanced {
                total_debits,
                total_credits,
                currency,
            }) => {
                assert_eq!(total_debits, dec!(100.00));
                assert_eq!(total_credits, dec!(99.99));
                assert_eq!(currency, "USD");
            }
            other => panic!("expected Unbalanced, got {other:?}"),
        }
    }

    #[test]
    fn test_balance_is_per_currency() {
        let company = Uuid::new_v4();
        // Balanced in EUR and in USD separately.
        let input = make_input(
            company,
            vec![
                make_line(LineSide::Debit, dec!(100), "EUR"),
                make_line(LineSide::Credit, dec!(100), "EUR"),
                make_line(LineSide::Debit, dec!(50), "USD"),
                make_line(LineSide::Credit, dec!(50), "USD"),
            ],
        );
        assert!(validate_entry(&input, ok_info(company)).is_ok());

        // EUR debits offsetting USD credits are not balanced.
        let input = make_input(
            company,
            vec![
                make_line(LineSide::Debit, dec!(100), "EUR"),
                make_line(LineSide::Credit, dec!(100), "USD"),
            ],
        );
        assert!(matches!(
            validate_entry(&input, ok_info(company)),
            Err(JournalError::Unbalanced { .. })
        ));
    }

    #[test]
    fn test_zero_and_negative_amounts() {
        let company = Uuid::new_v4();
        let input = make_input(
            company,
            vec![
                make_line(LineSide::Debit, dec!(0), "USD"),
                make_line(LineSide::Credit, dec!(100), "USD"),
            ],
        );
        assert!(matches!(
            validate_entry(&input, ok_info(company)),
            Err(JournalError::ZeroAmount)
        ));

        let input = make_input(
            company,
            vec![
                make_line(LineSide::Debit, dec!(-5), "USD"),
                make_line(LineSide::Credit, dec!(100), "USD"),
            ],
        );
        assert!(matches!(
            validate_entry(&input, ok_info(company)),
            Err(JournalError::NegativeAmount)
        ));
    }

    #[test]
    fn test_unknown_account_rejected() {
        let company = Uuid::new_v4();
        let input = make_input(
            company,
            vec![
                make_line(LineSide::Debit, dec!(100), "USD"),
                make_line(LineSide::Credit, dec!(100), "USD"),
            ],
        );
        assert!(matches!(
            validate_entry(&input, |_| None),
            Err(JournalError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_account_company_mismatch() {
        let company = Uuid::new_v4();
        let other_company = Uuid::new_v4();
        let input = make_input(
            company,
            vec![
                make_line(LineSide::Debit, dec!(100), "USD"),
                make_line(LineSide::Credit, dec!(100), "USD"),
            ],
        );
        assert!(matches!(
            validate_entry(&input, ok_info(other_company)),
            Err(JournalError::AccountCompanyMismatch(_))
        ));
    }

    #[test]
    fn test_inactive_and_nonpostable_accounts() {
        let company = Uuid::new_v4();
        let input = make_input(
            company,
            vec![
                make_line(LineSide::Debit, dec!(100), "USD"),
                make_line(LineSide::Credit, dec!(100), "USD"),
            ],
        );

        let inactive = |id: Uuid| {
            Some(AccountInfo {
                id,
                company_id: company,
                is_active: false,
                is_postable: true,
                currency_restriction: None,
            })
        };
        assert!(matches!(
            validate_entry(&input, inactive),
            Err(JournalError::AccountInactive(_))
        ));

        let summary_only = |id: Uuid| {
            Some(AccountInfo {
                id,
                company_id: company,
                is_active: true,
                is_postable: false,
                currency_restriction: None,
            })
        };
        assert!(matches!(
            validate_entry(&input, summary_only),
            Err(JournalError::AccountNotPostable(_))
        ));
    }

    #[test]
    fn test_currency_restriction() {
        let company = Uuid::new_v4();
        let input = make_input(
            company,
            vec![
                make_line(LineSide::Debit, dec!(100), "EUR"),
                make_line(LineSide::Credit, dec!(100), "EUR"),
            ],
        );
        let usd_only = |id: Uuid| {
            Some(AccountInfo {
                id,
                company_id: company,
                is_active: true,
                is_postable: true,
                currency_restriction: Some("USD".to_string()),
            })
        };
        assert!(matches!(
            validate_entry(&input, usd_only),
            Err(JournalError::CurrencyRestricted { .. })
        ));
    }
}
