//! Report builders.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::account::AccountType;
use crate::consolidation::types::{ConsolidatedTrialBalance, ConsolidationRun, RunStatus};

use super::error::ReportError;
use super::types::{
    AccountBalanceRow, AccountMovement, BalanceSheetReport, BalanceSheetSection,
    CashFlowMethod, CashFlowReport, CashFlowSection, ComparativeIncomeStatement,
    EquityChangeRow, EquityStatementReport, IncomeStatementReport, IncomeStatementSection,
    ReportLine, TrialBalanceReport, TrialBalanceRow, TrialBalanceTotals,
};

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Generates a trial balance from account balances.
    #[must_use]
    pub fn trial_balance(
        mut rows: Vec<AccountBalanceRow>,
        as_of: NaiveDate,
        currency: &str,
    ) -> TrialBalanceReport {
        rows.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        let mut total_debits = Decimal::ZERO;
        let mut total_credits = Decimal::ZERO;
        let rows: Vec<TrialBalanceRow> = rows
            .into_iter()
            .map(|row| {
                let signed = row.signed_balance();
                let (debit, credit) = if signed >= Decimal::ZERO {
                    (signed, Decimal::ZERO)
                } else {
                    (Decimal::ZERO, -signed)
                };
                total_debits += debit;
                total_credits += credit;
                TrialBalanceRow {
                    account_number: row.account_number,
                    account_name: row.account_name,
                    account_type: row.account_type,
                    debit_balance: debit,
                    credit_balance: credit,
                }
            })
            .collect();

        TrialBalanceReport {
            as_of,
            currency: currency.to_uppercase(),
            rows,
            totals: TrialBalanceTotals {
                total_debits,
                total_credits,
                is_balanced: total_debits == total_credits,
            },
        }
    }

    /// Generates a balance sheet.
    ///
    /// Revenue and expense balances fold into a "Current Year Earnings"
    /// equity line so the statement balances before year-end close.
    #[must_use]
    pub fn balance_sheet(
        rows: &[AccountBalanceRow],
        as_of: NaiveDate,
        currency: &str,
    ) -> BalanceSheetReport {
        let mut assets = BalanceSheetSection::default();
        let mut liabilities = BalanceSheetSection::default();
        let mut equity = BalanceSheetSection::default();
        let mut net_income = Decimal::ZERO;

        let mut sorted: Vec<&AccountBalanceRow> = rows.iter().collect();
        sorted.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        for row in sorted {
            let signed = row.signed_balance();
            match row.account_type {
                AccountType::Asset => {
                    Self::push_line(&mut assets, row, signed);
                }
                AccountType::Liability => {
                    Self::push_line(&mut liabilities, row, -signed);
                }
                AccountType::Equity => {
                    Self::push_line(&mut equity, row, -signed);
                }
                AccountType::Revenue => net_income += -signed,
                AccountType::Expense => net_income -= signed,
            }
        }

        if !net_income.is_zero() {
            equity.accounts.push(ReportLine {
                account_number: String::new(),
                account_name: "Current Year Earnings".to_string(),
                amount: net_income,
            });
            equity.total += net_income;
        }

        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total;
        let liabilities_and_equity = total_liabilities + total_equity;

        BalanceSheetReport {
            as_of,
            currency: currency.to_uppercase(),
            assets,
            liabilities,
            equity,
            total_assets,
            total_liabilities,
            total_equity,
            liabilities_and_equity,
            is_balanced: total_assets == liabilities_and_equity,
        }
    }

    /// Generates an income statement for a period.
    #[must_use]
    pub fn income_statement(
        rows: &[AccountBalanceRow],
        period_start: NaiveDate,
        period_end: NaiveDate,
        currency: &str,
    ) -> IncomeStatementReport {
        let mut revenue = IncomeStatementSection::default();
        let mut cogs = IncomeStatementSection::default();
        let mut operating_expenses = IncomeStatementSection::default();
        let mut other = IncomeStatementSection::default();

        let mut sorted: Vec<&AccountBalanceRow> = rows.iter().collect();
        sorted.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        for row in sorted {
            let natural = row.natural_balance();
            match (row.account_type, row.category.as_str()) {
                (AccountType::Revenue, _) => {
                    Self::push_income_line(&mut revenue, row, natural);
                }
                (AccountType::Expense, "cost_of_goods_sold" | "cost_of_services") => {
                    Self::push_income_line(&mut cogs, row, natural);
                }
                (AccountType::Expense, "operating_expense") => {
                    Self::push_income_line(&mut operating_expenses, row, natural);
                }
                (AccountType::Expense, _) => {
                    Self::push_income_line(&mut other, row, natural);
                }
                _ => {}
            }
        }

        let gross_profit = revenue.total - cogs.total;
        let operating_income = gross_profit - operating_expenses.total;
        let net_income = operating_income - other.total;

        IncomeStatementReport {
            period_start,
            period_end,
            currency: currency.to_uppercase(),
            revenue,
            cost_of_goods_sold: cogs,
            gross_profit,
            operating_expenses,
            operating_income,
            other_income_expense: other,
            net_income,
        }
    }

    /// Generates a comparative income statement for two periods.
    #[must_use]
    pub fn comparative_income_statement(
        current_rows: &[AccountBalanceRow],
        current_period: (NaiveDate, NaiveDate),
        prior_rows: &[AccountBalanceRow],
        prior_period: (NaiveDate, NaiveDate),
        currency: &str,
    ) -> ComparativeIncomeStatement {
        let current = Self::income_statement(
            current_rows,
            current_period.0,
            current_period.1,
            currency,
        );
        let prior =
            Self::income_statement(prior_rows, prior_period.0, prior_period.1, currency);
        let net_income_change = current.net_income - prior.net_income;
        ComparativeIncomeStatement {
            current,
            prior,
            net_income_change,
        }
    }

    /// Generates a statement of cash flows.
    ///
    /// The indirect method starts from net income and adjusts for
    /// movements on cash-flow-relevant non-cash accounts; the direct
    /// method lists the same flows as gross lines. Both methods agree on
    /// section totals and tie out to the cash movement.
    #[must_use]
    pub fn cash_flow(
        movements: &[AccountMovement],
        net_income: Decimal,
        method: CashFlowMethod,
        period_start: NaiveDate,
        period_end: NaiveDate,
        currency: &str,
    ) -> CashFlowReport {
        use crate::account::CashFlowCategory;

        let mut operating = CashFlowSection::default();
        let mut investing = CashFlowSection::default();
        let mut financing = CashFlowSection::default();
        let mut beginning_cash = Decimal::ZERO;
        let mut cash_movement = Decimal::ZERO;

        let mut sorted: Vec<&AccountMovement> = movements.iter().collect();
        sorted.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        for movement in sorted {
            if movement.is_cash {
                beginning_cash += movement.beginning_balance;
                cash_movement += movement.movement;
                continue;
            }
            let Some(category) = movement.cash_flow_category else {
                continue;
            };
            // A debit movement (asset build-up) consumes cash; a credit
            // movement releases it.
            let cash_effect = -movement.movement;
            if cash_effect.is_zero() {
                continue;
            }
            let section = match category {
                CashFlowCategory::Operating => &mut operating,
                CashFlowCategory::Investing => &mut investing,
                CashFlowCategory::Financing => &mut financing,
            };
            section.lines.push(ReportLine {
                account_number: movement.account_number.clone(),
                account_name: match method {
                    CashFlowMethod::Indirect
                        if category == CashFlowCategory::Operating =>
                    {
                        format!("Change in {}", movement.account_name)
                    }
                    _ => movement.account_name.clone(),
                },
                amount: cash_effect,
            });
            section.total += cash_effect;
        }

        if method == CashFlowMethod::Indirect {
            operating.lines.insert(
                0,
                ReportLine {
                    account_number: String::new(),
                    account_name: "Net income".to_string(),
                    amount: net_income,
                },
            );
        }
        operating.total += net_income;

        let net_change_in_cash = operating.total + investing.total + financing.total;

        CashFlowReport {
            period_start,
            period_end,
            currency: currency.to_uppercase(),
            method,
            net_income,
            operating,
            investing,
            financing,
            net_change_in_cash,
            beginning_cash,
            ending_cash: beginning_cash + cash_movement,
        }
    }

    /// Generates a statement of changes in equity.
    #[must_use]
    pub fn equity_statement(
        movements: &[AccountMovement],
        net_income: Decimal,
        period_start: NaiveDate,
        period_end: NaiveDate,
        currency: &str,
    ) -> EquityStatementReport {
        let mut rows: Vec<EquityChangeRow> = movements
            .iter()
            .filter(|m| m.account_type == AccountType::Equity)
            .map(|m| {
                // Equity is credit-normal: flip the signed amounts.
                let beginning = -m.beginning_balance;
                let change = -m.movement;
                EquityChangeRow {
                    account_number: m.account_number.clone(),
                    account_name: m.account_name.clone(),
                    beginning_balance: beginning,
                    change,
                    ending_balance: beginning + change,
                }
            })
            .collect();
        rows.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        if !net_income.is_zero() {
            rows.push(EquityChangeRow {
                account_number: String::new(),
                account_name: "Current Year Earnings".to_string(),
                beginning_balance: Decimal::ZERO,
                change: net_income,
                ending_balance: net_income,
            });
        }

        let total_ending_equity = rows.iter().map(|r| r.ending_balance).sum();

        EquityStatementReport {
            period_start,
            period_end,
            currency: currency.to_uppercase(),
            rows,
            total_ending_equity,
        }
    }

    /// Extracts the trial balance of a completed consolidation run.
    ///
    /// # Errors
    ///
    /// - `RunNotCompleted` unless the run is Completed.
    /// - `MissingTrialBalance` when the run has no stored result.
    pub fn consolidated_trial_balance(
        run: &ConsolidationRun,
    ) -> Result<&ConsolidatedTrialBalance, ReportError> {
        if run.status != RunStatus::Completed {
            return Err(ReportError::RunNotCompleted {
                run_id: run.id,
                status: run.status,
            });
        }
        run.trial_balance
            .as_ref()
            .ok_or(ReportError::MissingTrialBalance(run.id))
    }

    /// Builds a balance sheet from a completed run's trial balance.
    ///
    /// # Errors
    ///
    /// Propagates [`ReportService::consolidated_trial_balance`] errors.
    pub fn consolidated_balance_sheet(
        run: &ConsolidationRun,
        as_of: NaiveDate,
    ) -> Result<BalanceSheetReport, ReportError> {
        let tb = Self::consolidated_trial_balance(run)?;
        let rows = Self::consolidated_rows(tb);
        Ok(Self::balance_sheet(&rows, as_of, &tb.currency))
    }

    /// Builds an income statement from a completed run's trial balance.
    ///
    /// # Errors
    ///
    /// Propagates [`ReportService::consolidated_trial_balance`] errors.
    pub fn consolidated_income_statement(
        run: &ConsolidationRun,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<IncomeStatementReport, ReportError> {
        let tb = Self::consolidated_trial_balance(run)?;
        let rows = Self::consolidated_rows(tb);
        Ok(Self::income_statement(&rows, period_start, period_end, &tb.currency))
    }

    fn consolidated_rows(tb: &ConsolidatedTrialBalance) -> Vec<AccountBalanceRow> {
        tb.rows
            .iter()
            .map(|row| {
                let signed = row.consolidated_balance;
                let (debit, credit) = if signed >= Decimal::ZERO {
                    (signed, Decimal::ZERO)
                } else {
                    (Decimal::ZERO, -signed)
                };
                AccountBalanceRow {
                    account_id: Uuid::nil(),
                    account_number: row.account_number.clone(),
                    account_name: row.account_name.clone(),
                    account_type: row.account_type,
                    category: row.category.clone(),
                    cash_flow_category: None,
                    debit_total: debit,
                    credit_total: credit,
                }
            })
            .collect()
    }

    fn push_line(section: &mut BalanceSheetSection, row: &AccountBalanceRow, amount: Decimal) {
        if amount.is_zero() {
            return;
        }
        section.accounts.push(ReportLine {
            account_number: row.account_number.clone(),
            account_name: row.account_name.clone(),
            amount,
        });
        section.total += amount;
    }

    fn push_income_line(
        section: &mut IncomeStatementSection,
        row: &AccountBalanceRow,
        amount: Decimal,
    ) {
        if amount.is_zero() {
            return;
        }
        section.accounts.push(ReportLine {
            account_number: row.account_number.clone(),
            account_name: row.account_name.clone(),
            amount,
        });
        section.total += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::CashFlowCategory;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn balance(
        number: &str,
        account_type: AccountType,
        category: &str,
        debit: Decimal,
        credit: Decimal,
    ) -> AccountBalanceRow {
        AccountBalanceRow {
            account_id: Uuid::new_v4(),
            account_number: number.to_string(),
            account_name: format!("Account {number}"),
            account_type,
            category: category.to_string(),
            cash_flow_category: None,
            debit_total: debit,
            credit_total: credit,
        }
    }

    fn sample_rows() -> Vec<AccountBalanceRow> {
        vec![
            balance("1010", AccountType::Asset, "current_asset", dec!(5000), dec!(1000)),
            balance("2010", AccountType::Liability, "current_liability", dec!(200), dec!(1200)),
            balance("3000", AccountType::Equity, "contributed_capital", Decimal::ZERO, dec!(1000)),
            balance("4000", AccountType::Revenue, "operating_revenue", Decimal::ZERO, dec!(10000)),
            balance("5000", AccountType::Expense, "cost_of_goods_sold", dec!(4000), Decimal::ZERO),
            balance("6010", AccountType::Expense, "operating_expense", dec!(4000), Decimal::ZERO),
        ]
    }

    #[test]
    fn test_trial_balance_balances() {
        let report = ReportService::trial_balance(sample_rows(), date(2025, 6, 30), "usd");
        assert_eq!(report.currency, "USD");
        assert!(report.totals.is_balanced);
        assert_eq!(report.totals.total_debits, dec!(12000));
        assert_eq!(report.totals.total_credits, dec!(12000));
        // Rows are number-sorted and single-sided.
        assert_eq!(report.rows[0].account_number, "1010");
        assert_eq!(report.rows[0].debit_balance, dec!(4000));
        assert_eq!(report.rows[0].credit_balance, Decimal::ZERO);
    }

    #[test]
    fn test_balance_sheet_includes_current_year_earnings() {
        let report = ReportService::balance_sheet(&sample_rows(), date(2025, 6, 30), "USD");
        // Net income = 10000 − 8000 = 2000.
        let earnings = report
            .equity
            .accounts
            .iter()
            .find(|l| l.account_name == "Current Year Earnings")
            .unwrap();
        assert_eq!(earnings.amount, dec!(2000));

        assert_eq!(report.total_assets, dec!(4000));
        assert_eq!(report.total_liabilities, dec!(1000));
        assert_eq!(report.total_equity, dec!(3000));
        assert!(report.is_balanced);
    }

    #[test]
    fn test_income_statement_sections() {
        let report = ReportService::income_statement(
            &sample_rows(),
            date(2025, 1, 1),
            date(2025, 6, 30),
            "USD",
        );
        assert_eq!(report.revenue.total, dec!(10000));
        assert_eq!(report.cost_of_goods_sold.total, dec!(4000));
        assert_eq!(report.gross_profit, dec!(6000));
        assert_eq!(report.operating_expenses.total, dec!(4000));
        assert_eq!(report.operating_income, dec!(2000));
        assert_eq!(report.net_income, dec!(2000));
    }

    #[test]
    fn test_comparative_income_statement() {
        let prior = vec![balance(
            "4000",
            AccountType::Revenue,
            "operating_revenue",
            Decimal::ZERO,
            dec!(7000),
        )];
        let report = ReportService::comparative_income_statement(
            &sample_rows(),
            (date(2025, 1, 1), date(2025, 6, 30)),
            &prior,
            (date(2024, 1, 1), date(2024, 6, 30)),
            "USD",
        );
        assert_eq!(report.current.net_income, dec!(2000));
        assert_eq!(report.prior.net_income, dec!(7000));
        assert_eq!(report.net_income_change, dec!(-5000));
    }

    fn sample_movements() -> Vec<AccountMovement> {
        vec![
            AccountMovement {
                account_number: "1010".to_string(),
                account_name: "Cash".to_string(),
                account_type: AccountType::Asset,
                cash_flow_category: Some(CashFlowCategory::Operating),
                is_cash: true,
                beginning_balance: dec!(1000),
                movement: dec!(1400),
            },
            AccountMovement {
                account_number: "1100".to_string(),
                account_name: "Accounts Receivable".to_string(),
                account_type: AccountType::Asset,
                cash_flow_category: Some(CashFlowCategory::Operating),
                is_cash: false,
                beginning_balance: dec!(500),
                movement: dec!(300), // AR grew: consumes cash
            },
            AccountMovement {
                account_number: "1500".to_string(),
                account_name: "Fixed Assets".to_string(),
                account_type: AccountType::Asset,
                cash_flow_category: Some(CashFlowCategory::Investing),
                is_cash: false,
                beginning_balance: dec!(2000),
                movement: dec!(500), // purchase
            },
            AccountMovement {
                account_number: "2500".to_string(),
                account_name: "Long-Term Debt".to_string(),
                account_type: AccountType::Liability,
                cash_flow_category: Some(CashFlowCategory::Financing),
                is_cash: false,
                beginning_balance: dec!(-1000),
                movement: dec!(-200), // borrowing
            },
        ]
    }

    #[test]
    fn test_indirect_cash_flow_ties_to_cash_movement() {
        let net_income = dec!(2000);
        let report = ReportService::cash_flow(
            &sample_movements(),
            net_income,
            CashFlowMethod::Indirect,
            date(2025, 1, 1),
            date(2025, 6, 30),
            "USD",
        );

        assert_eq!(report.operating.lines[0].account_name, "Net income");
        assert_eq!(report.operating.total, dec!(1700)); // 2000 − 300 AR build-up
        assert_eq!(report.investing.total, dec!(-500));
        assert_eq!(report.financing.total, dec!(200));
        assert_eq!(report.net_change_in_cash, dec!(1400));
        // Ties to the cash account movement.
        assert_eq!(report.ending_cash - report.beginning_cash, dec!(1400));
    }

    #[test]
    fn test_direct_and_indirect_agree_on_totals() {
        let net_income = dec!(2000);
        let indirect = ReportService::cash_flow(
            &sample_movements(),
            net_income,
            CashFlowMethod::Indirect,
            date(2025, 1, 1),
            date(2025, 6, 30),
            "USD",
        );
        let direct = ReportService::cash_flow(
            &sample_movements(),
            net_income,
            CashFlowMethod::Direct,
            date(2025, 1, 1),
            date(2025, 6, 30),
            "USD",
        );
        assert_eq!(indirect.operating.total, direct.operating.total);
        assert_eq!(indirect.net_change_in_cash, direct.net_change_in_cash);
        // The direct method carries no "Net income" line.
        assert!(direct.operating.lines.iter().all(|l| l.account_name != "Net income"));
    }

    #[test]
    fn test_equity_statement_rolls_forward() {
        let movements = vec![AccountMovement {
            account_number: "3000".to_string(),
            account_name: "Contributed Capital".to_string(),
            account_type: AccountType::Equity,
            cash_flow_category: Some(CashFlowCategory::Financing),
            is_cash: false,
            beginning_balance: dec!(-1000), // credit 1000
            movement: dec!(-500),           // additional contribution
        }];
        let report = ReportService::equity_statement(
            &movements,
            dec!(2000),
            date(2025, 1, 1),
            date(2025, 6, 30),
            "USD",
        );

        let capital = &report.rows[0];
        assert_eq!(capital.beginning_balance, dec!(1000));
        assert_eq!(capital.change, dec!(500));
        assert_eq!(capital.ending_balance, dec!(1500));

        let earnings = report.rows.last().unwrap();
        assert_eq!(earnings.account_name, "Current Year Earnings");
        assert_eq!(earnings.ending_balance, dec!(2000));

        assert_eq!(report.total_ending_equity, dec!(3500));
    }

    #[test]
    fn test_consolidated_reports_require_completed_run() {
        use crate::consolidation::types::{RunOptions};
        use crate::fiscal::FiscalPeriodRef;

        let run = ConsolidationRun::new(
            Uuid::new_v4(),
            FiscalPeriodRef { year: 2025, period: 6 },
            date(2025, 6, 30),
            RunOptions::default(),
            Uuid::new_v4(),
        );
        assert!(matches!(
            ReportService::consolidated_trial_balance(&run),
            Err(ReportError::RunNotCompleted { .. })
        ));
    }
}
