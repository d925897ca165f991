//! Year-end close computation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::account::AccountType;
use crate::fiscal::FiscalYearStatus;
use crate::journal::{
    CreateEntryInput, EntryType, JournalLineInput, LineSide, SourceModule,
};

use super::error::ClosingError;
use super::types::{AccountClosingBalance, CloseBlocker, CloseOutcome, ClosePreview};

/// Stateless year-end close service.
pub struct ClosingService;

impl ClosingService {
    /// Computes the close preview: net income, totals, and blockers.
    #[must_use]
    pub fn preview(
        balances: &[AccountClosingBalance],
        retained_earnings_account_id: Option<Uuid>,
        unposted_entry_count: u64,
        trial_balance_totals: (Decimal, Decimal),
    ) -> ClosePreview {
        let total_revenue = Self::total_of(balances, AccountType::Revenue);
        let total_expenses = Self::total_of(balances, AccountType::Expense);

        let mut blockers = Vec::new();
        if unposted_entry_count > 0 {
            blockers.push(CloseBlocker::UnpostedEntries {
                count: unposted_entry_count,
            });
        }
        let (debits, credits) = trial_balance_totals;
        if debits != credits {
            blockers.push(CloseBlocker::TrialBalanceNotBalanced {
                debits: debits.to_string(),
                credits: credits.to_string(),
            });
        }
        if retained_earnings_account_id.is_none() {
            blockers.push(CloseBlocker::RetainedEarningsNotConfigured);
        }

        ClosePreview {
            net_income: total_revenue - total_expenses,
            total_revenue,
            total_expenses,
            retained_earnings_account_id,
            blockers,
        }
    }

    /// Builds the closing entry for a fiscal year.
    ///
    /// Revenue accounts (credit-normal) are debited down to zero, expense
    /// accounts (debit-normal) are credited down to zero, and the net
    /// difference offsets against retained earnings. Contra balances flip
    /// sides. The entry posts on `closing_date` (the adjustment period's
    /// day, or the last day of period 12).
    ///
    /// # Errors
    ///
    /// - `YearNotOpen` unless the year is Open.
    /// - `RetainedEarningsNotConfigured` without a retained earnings
    ///   account.
    /// - `UnpostedEntriesExist` / `TrialBalanceNotBalanced` when preview
    ///   blockers remain.
    pub fn build_close(
        year_status: FiscalYearStatus,
        balances: &[AccountClosingBalance],
        retained_earnings_account_id: Option<Uuid>,
        unposted_entry_count: u64,
        trial_balance_totals: (Decimal, Decimal),
        functional_currency: &str,
        closing_date: NaiveDate,
        closed_by: Uuid,
        company_id: Uuid,
    ) -> Result<CloseOutcome, ClosingError> {
        if year_status != FiscalYearStatus::Open {
            return Err(ClosingError::YearNotOpen);
        }
        let retained_earnings =
            retained_earnings_account_id.ok_or(ClosingError::RetainedEarningsNotConfigured)?;
        if unposted_entry_count > 0 {
            return Err(ClosingError::UnpostedEntriesExist {
                count: unposted_entry_count,
            });
        }
        let (tb_debits, tb_credits) = trial_balance_totals;
        if tb_debits != tb_credits {
            return Err(ClosingError::TrialBalanceNotBalanced {
                debits: tb_debits,
                credits: tb_credits,
            });
        }

        let total_revenue = Self::total_of(balances, AccountType::Revenue);
        let total_expenses = Self::total_of(balances, AccountType::Expense);
        let net_income = total_revenue - total_expenses;

        let mut lines = Vec::new();
        for balance in balances {
            if balance.balance.is_zero() {
                continue;
            }
            let side = match balance.account_type {
                // Zeroing a credit-normal balance takes a debit, and vice
                // versa; contra balances (negative) flip.
                AccountType::Revenue => {
                    if balance.balance > Decimal::ZERO {
                        LineSide::Debit
                    } else {
                        LineSide::Credit
                    }
                }
                AccountType::Expense => {
                    if balance.balance > Decimal::ZERO {
                        LineSide::Credit
                    } else {
                        LineSide::Debit
                    }
                }
                _ => continue,
            };
            lines.push(Self::closing_line(
                balance.account_id,
                side,
                balance.balance.abs(),
                functional_currency,
                "Year-end close",
            ));
        }

        if !net_income.is_zero() {
            let side = if net_income > Decimal::ZERO {
                LineSide::Credit
            } else {
                LineSide::Debit
            };
            lines.push(Self::closing_line(
                retained_earnings,
                side,
                net_income.abs(),
                functional_currency,
                "Net income to retained earnings",
            ));
        }

        let closing_entries = if lines.is_empty() {
            Vec::new()
        } else {
            vec![CreateEntryInput {
                company_id,
                entry_type: EntryType::Closing,
                source_module: SourceModule::System,
                transaction_date: closing_date,
                document_date: None,
                posting_date: None,
                description: "Year-end closing entry".to_string(),
                reference: None,
                lines,
                created_by: closed_by,
            }]
        };

        Ok(CloseOutcome {
            closing_entries,
            net_income,
            total_revenue,
            total_expenses,
        })
    }

    /// Validates that a closed year can be reopened.
    ///
    /// # Errors
    ///
    /// - `YearNotClosed` unless the year is Closed.
    /// - `NoClosingEntries` when no closing entries exist to reverse.
    pub fn validate_reopen(
        year_status: FiscalYearStatus,
        closing_entry_count: usize,
    ) -> Result<(), ClosingError> {
        if year_status != FiscalYearStatus::Closed {
            return Err(ClosingError::YearNotClosed);
        }
        if closing_entry_count == 0 {
            return Err(ClosingError::NoClosingEntries);
        }
        Ok(())
    }

    fn total_of(balances: &[AccountClosingBalance], account_type: AccountType) -> Decimal {
        balances
            .iter()
            .filter(|b| b.account_type == account_type)
            .map(|b| b.balance)
            .sum()
    }

    fn closing_line(
        account_id: Uuid,
        side: LineSide,
        amount: Decimal,
        currency: &str,
        memo: &str,
    ) -> JournalLineInput {
        JournalLineInput {
            account_id,
            side,
            amount,
            currency: currency.to_string(),
            exchange_rate: Some(Decimal::ONE),
            memo: Some(memo.to_string()),
            dimensions: std::collections::BTreeMap::new(),
            intercompany_partner_id: None,
            matching_line_id: None,
        }
    }
}
