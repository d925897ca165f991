//! Step 2: ASC 830 currency translation.
//!
//! Income statement accounts translate at the period average rate, assets
//! and liabilities at the period closing rate, and equity at historical
//! rates. The residual lands in an Accumulated OCI row as the cumulative
//! translation adjustment, which keeps each translated trial balance at
//! zero.

use meridian_shared::types::money::bankers_round;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::account::AccountType;

use super::types::{MemberBalance, MemberTrialBalance, TranslationRates};

/// Scale of translated balances in reporting currency.
const TRANSLATION_SCALE: u32 = 2;

/// Account number of the synthetic cumulative-translation-adjustment row.
pub const CTA_ACCOUNT_NUMBER: &str = "3900";
/// Name of the synthetic CTA row.
pub const CTA_ACCOUNT_NAME: &str = "Accumulated Other Comprehensive Income";

/// Translates one member trial balance into the reporting currency.
///
/// Members already stated in the reporting currency pass through
/// unchanged. Otherwise each row translates by its ASC 830 rate and the
/// residual is plugged into the Accumulated OCI row.
#[must_use]
pub fn translate_member(
    tb: &MemberTrialBalance,
    reporting_currency: &str,
    rates: &TranslationRates,
) -> MemberTrialBalance {
    if tb.currency.eq_ignore_ascii_case(reporting_currency) {
        return MemberTrialBalance {
            currency: reporting_currency.to_uppercase(),
            ..tb.clone()
        };
    }

    let mut rows: Vec<MemberBalance> = tb
        .rows
        .iter()
        .map(|row| {
            let rate = rate_for(row.account_type, rates);
            MemberBalance {
                balance: bankers_round(row.balance * rate, TRANSLATION_SCALE),
                ..row.clone()
            }
        })
        .collect();

    // The translation difference accumulates in OCI (equity).
    let residual: Decimal = rows.iter().map(|r| r.balance).sum();
    if !residual.is_zero() {
        if let Some(cta) = rows.iter_mut().find(|r| r.account_number == CTA_ACCOUNT_NUMBER) {
            cta.balance -= residual;
        } else {
            rows.push(MemberBalance {
                account_id: Uuid::new_v4(),
                account_number: CTA_ACCOUNT_NUMBER.to_string(),
                account_name: CTA_ACCOUNT_NAME.to_string(),
                account_type: AccountType::Equity,
                category: "accumulated_oci".to_string(),
                is_intercompany: false,
                balance: -residual,
            });
        }
    }

    MemberTrialBalance {
        company_id: tb.company_id,
        company_name: tb.company_name.clone(),
        currency: reporting_currency.to_uppercase(),
        rows,
    }
}

/// The ASC 830 rate for an account type.
fn rate_for(account_type: AccountType, rates: &TranslationRates) -> Decimal {
    match account_type {
        AccountType::Revenue | AccountType::Expense => rates.average,
        AccountType::Asset | AccountType::Liability => rates.closing,
        AccountType::Equity => rates.historical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(
        number: &str,
        account_type: AccountType,
        balance: Decimal,
    ) -> MemberBalance {
        MemberBalance {
            account_id: Uuid::new_v4(),
            account_number: number.to_string(),
            account_name: format!("Account {number}"),
            account_type,
            category: "test".to_string(),
            is_intercompany: false,
            balance,
        }
    }

    fn make_tb(currency: &str, rows: Vec<MemberBalance>) -> MemberTrialBalance {
        MemberTrialBalance {
            company_id: Uuid::new_v4(),
            company_name: "Sub GmbH".to_string(),
            currency: currency.to_string(),
            rows,
        }
    }

    fn rates() -> TranslationRates {
        TranslationRates {
            average: dec!(1.10),
            closing: dec!(1.20),
            historical: dec!(1.00),
        }
    }

    #[test]
    fn test_same_currency_passes_through() {
        let tb = make_tb(
            "USD",
            vec![
                row("1010", AccountType::Asset, dec!(100)),
                row("3000", AccountType::Equity, dec!(-100)),
            ],
        );
        let translated = translate_member(&tb, "USD", &rates());
        assert_eq!(translated.rows, tb.rows);
    }

    #[test]
    fn test_rates_by_account_type() {
        let tb = make_tb(
            "EUR",
            vec![
                row("1010", AccountType::Asset, dec!(100)),
                row("2010", AccountType::Liability, dec!(-50)),
                row("3000", AccountType::Equity, dec!(-30)),
                row("4000", AccountType::Revenue, dec!(-40)),
                row("6000", AccountType::Expense, dec!(20)),
            ],
        );
        let translated = translate_member(&tb, "USD", &rates());

        let by_number = |n: &str| {
            translated
                .rows
                .iter()
                .find(|r| r.account_number == n)
                .unwrap()
                .balance
        };
        assert_eq!(by_number("1010"), dec!(120.00)); // closing 1.20
        assert_eq!(by_number("2010"), dec!(-60.00)); // closing
        assert_eq!(by_number("3000"), dec!(-30.00)); // historical 1.00
        assert_eq!(by_number("4000"), dec!(-44.00)); // average 1.10
        assert_eq!(by_number("6000"), dec!(22.00)); // average
    }

    #[test]
    fn test_cta_plug_keeps_balance_at_zero() {
        let tb = make_tb(
            "EUR",
            vec![
                row("1010", AccountType::Asset, dec!(100)),
                row("3000", AccountType::Equity, dec!(-100)),
            ],
        );
        assert!(tb.imbalance().is_zero());

        let translated = translate_member(&tb, "USD", &rates());
        // Asset at 1.20 = 120, equity at 1.00 = -100: residual 20 goes to
        // OCI as a credit.
        assert!(translated.imbalance().is_zero());
        let cta = translated
            .rows
            .iter()
            .find(|r| r.account_number == CTA_ACCOUNT_NUMBER)
            .unwrap();
        assert_eq!(cta.balance, dec!(-20.00));
        assert_eq!(cta.account_type, AccountType::Equity);
    }

    #[test]
    fn test_existing_oci_row_absorbs_residual() {
        let tb = make_tb(
            "EUR",
            vec![
                row("1010", AccountType::Asset, dec!(100)),
                row(CTA_ACCOUNT_NUMBER, AccountType::Equity, dec!(-100)),
            ],
        );
        let translated = translate_member(&tb, "USD", &rates());
        assert!(translated.imbalance().is_zero());
        // Only the pre-existing OCI row, no duplicate.
        assert_eq!(
            translated
                .rows
                .iter()
                .filter(|r| r.account_number == CTA_ACCOUNT_NUMBER)
                .count(),
            1
        );
    }

    #[test]
    fn test_translation_is_deterministic() {
        let tb = make_tb(
            "EUR",
            vec![
                row("1010", AccountType::Asset, dec!(123.45)),
                row("3000", AccountType::Equity, dec!(-123.45)),
            ],
        );
        let a = translate_member(&tb, "USD", &rates());
        let b = translate_member(&tb, "USD", &rates());
        assert_eq!(a.rows, b.rows);
    }
}
