//! Posting resolution.
//!
//! Posting turns validated line inputs into resolved lines carrying the
//! applied exchange rate and functional-currency amounts, gates on the
//! fiscal period, and re-verifies the balance invariant in functional
//! currency. Entry number assignment and the atomic write live in the
//! repository; everything here is pure.

use chrono::NaiveDate;
use meridian_shared::types::money::{bankers_round, CONVERSION_SCALE};
use rust_decimal::Decimal;

use crate::fiscal::{resolve_period_for_date, FiscalPeriod};

use super::error::JournalError;
use super::types::{CreateEntryInput, EntryTotals, EntryType, LineSide, ResolvedLine};

/// Stateless posting resolution service.
pub struct PostingService;

impl PostingService {
    /// Resolves every line of an entry into functional-currency amounts.
    ///
    /// The rate captured at creation wins; for non-functional currencies
    /// without a captured rate, `spot_rate` is consulted for the
    /// transaction date. Functional amounts use Banker's Rounding at 4
    /// decimal places.
    ///
    /// # Errors
    ///
    /// - `NoExchangeRate` when a non-functional line has no rate.
    /// - `Unbalanced` when the resolved entry does not balance in
    ///   functional currency.
    pub fn resolve_lines<R>(
        input: &CreateEntryInput,
        functional_currency: &str,
        spot_rate: R,
    ) -> Result<(Vec<ResolvedLine>, EntryTotals), JournalError>
    where
        R: Fn(&str, NaiveDate) -> Option<Decimal>,
    {
        let mut resolved = Vec::with_capacity(input.lines.len());

        for (index, line) in input.lines.iter().enumerate() {
            let rate = if line.currency.eq_ignore_ascii_case(functional_currency) {
                Decimal::ONE
            } else if let Some(captured) = line.exchange_rate {
                captured
            } else {
                spot_rate(&line.currency, input.transaction_date).ok_or_else(|| {
                    JournalError::NoExchangeRate {
                        from: line.currency.to_uppercase(),
                        to: functional_currency.to_uppercase(),
                        date: input.transaction_date,
                    }
                })?
            };

            let functional_amount = bankers_round(line.amount * rate, CONVERSION_SCALE);
            let (debit, credit) = match line.side {
                LineSide::Debit => (functional_amount, Decimal::ZERO),
                LineSide::Credit => (Decimal::ZERO, functional_amount),
            };

            resolved.push(ResolvedLine {
                line_number: u32::try_from(index + 1).unwrap_or(u32::MAX),
                account_id: line.account_id,
                side: line.side,
                amount: line.amount,
                currency: line.currency.to_uppercase(),
                exchange_rate: rate,
                functional_currency: functional_currency.to_uppercase(),
                functional_amount,
                debit,
                credit,
                memo: line.memo.clone(),
                dimensions: line.dimensions.clone(),
                intercompany_partner_id: line.intercompany_partner_id,
                matching_line_id: line.matching_line_id,
            });
        }

        let totals = Self::totals(&resolved);
        if !totals.is_balanced {
            return Err(JournalError::Unbalanced {
                total_debits: totals.functional_debit,
                total_credits: totals.functional_credit,
                currency: functional_currency.to_uppercase(),
            });
        }

        Ok((resolved, totals))
    }

    /// Sums functional debits and credits over resolved lines.
    #[must_use]
    pub fn totals(lines: &[ResolvedLine]) -> EntryTotals {
        let debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = lines.iter().map(|l| l.credit).sum();
        EntryTotals::new(debit, credit)
    }

    /// Resolves the fiscal period an entry posts into and enforces the
    /// open-period gate.
    ///
    /// System-generated entries (closing, reversal of closing) bypass the
    /// gate; everything else requires an Open period.
    ///
    /// # Errors
    ///
    /// - `NoFiscalPeriod` when no period covers the date.
    /// - `FiscalPeriodClosed` when the period is closed for a
    ///   non-system-generated entry.
    pub fn resolve_period<'a>(
        periods: &'a [FiscalPeriod],
        period_date: NaiveDate,
        entry_type: EntryType,
    ) -> Result<&'a FiscalPeriod, JournalError> {
        let period = resolve_period_for_date(periods, period_date)
            .map_err(|_| JournalError::NoFiscalPeriod(period_date))?;

        if !period.status.allows_posting() && !entry_type.is_system_generated() {
            return Err(JournalError::FiscalPeriodClosed(period_date));
        }

        Ok(period)
    }

    /// Computes the signed balance effect of a resolved line on an
    /// account, given the account's normal balance side.
    ///
    /// A debit increases a debit-normal balance and decreases a
    /// credit-normal balance, and vice versa.
    #[must_use]
    pub fn balance_effect(
        line_side: LineSide,
        functional_amount: Decimal,
        normal_balance: crate::account::NormalBalance,
    ) -> Decimal {
        use crate::account::NormalBalance;
        match (line_side, normal_balance) {
            (LineSide::Debit, NormalBalance::Debit)
            | (LineSide::Credit, NormalBalance::Credit) => functional_amount,
            _ => -functional_amount,
        }
    }
}
