//! Year-end close repository.
//!
//! Orchestrates the close: computes the year's revenue and expense
//! balances, lets the core closing service build the closing entries,
//! posts them into the adjustment period (or the last regular period),
//! and closes every period plus the year — all in one transaction.
//! Reopen reverses the closing entries and reopens the calendar.

use chrono::{NaiveDate, Utc};
use meridian_core::closing::{AccountClosingBalance, ClosePreview, ClosingError, ClosingService};
use meridian_core::journal::{JournalError, ReversalInput, ReversalService};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{
    companies, fiscal_period_reopen_log, fiscal_periods, fiscal_years, journal_entries,
    journal_entry_lines,
    sea_orm_active_enums::{
        EntryStatus, EntryType, FiscalPeriodStatus, FiscalYearStatus,
    },
};
use crate::repositories::journal::{to_resolved_line, JournalRepoError, JournalRepository};

/// Error types for year-end close operations.
#[derive(Debug, thiserror::Error)]
pub enum YearEndError {
    /// Domain rule violation.
    #[error(transparent)]
    Domain(#[from] ClosingError),

    /// Journal-side failure while posting closing entries.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// Fiscal year not found.
    #[error("Fiscal year not found")]
    YearNotFound,

    /// Company not found.
    #[error("Company not found: {0}")]
    CompanyNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<JournalRepoError> for YearEndError {
    fn from(value: JournalRepoError) -> Self {
        match value {
            JournalRepoError::Domain(err) => Self::Journal(err),
            JournalRepoError::Database(err) => Self::Database(err),
        }
    }
}

impl YearEndError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Domain(err) => err.tag(),
            Self::Journal(err) => err.tag(),
            Self::YearNotFound => "FiscalYearNotFoundError",
            Self::CompanyNotFound(_) => "CompanyNotFoundError",
            Self::Database(_) => "InternalServerError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Domain(err) => err.status_code(),
            Self::Journal(err) => err.status_code(),
            Self::YearNotFound => 404,
            Self::CompanyNotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }
}

/// Result of a year-end close.
#[derive(Debug)]
pub struct CloseYearResult {
    /// The posted closing entries.
    pub closing_entry_ids: Vec<Uuid>,
    /// Net income rolled into retained earnings.
    pub net_income: Decimal,
    /// How many periods were closed.
    pub periods_closed: usize,
}

/// Result of a year reopen.
#[derive(Debug)]
pub struct ReopenYearResult {
    /// The posted reversing entries.
    pub reversing_entry_ids: Vec<Uuid>,
    /// How many periods were reopened.
    pub periods_reopened: usize,
}

/// Year-end close repository.
#[derive(Debug, Clone)]
pub struct YearEndRepository {
    db: DatabaseConnection,
}

impl YearEndRepository {
    /// Creates a new year-end repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Computes the close preview: net income, totals, blockers.
    ///
    /// # Errors
    ///
    /// Returns `YearNotFound` / `CompanyNotFound` and database errors.
    pub async fn preview(
        &self,
        company_id: Uuid,
        year: i32,
    ) -> Result<ClosePreview, YearEndError> {
        let (company, fiscal_year) = self.load_company_year(company_id, year).await?;

        let balances = self
            .income_statement_balances(company_id, fiscal_year.start_date, fiscal_year.end_date)
            .await?;
        let journal = JournalRepository::new(self.db.clone());
        let unposted = journal
            .unposted_entry_count(company_id, fiscal_year.start_date, fiscal_year.end_date)
            .await?;
        let tb_totals = self.trial_balance_totals(company_id, fiscal_year.end_date).await?;

        Ok(ClosingService::preview(
            &balances,
            company.retained_earnings_account_id,
            unposted,
            tb_totals,
        ))
    }

    /// Closes a fiscal year atomically.
    ///
    /// # Errors
    ///
    /// Surfaces preview blockers (`RetainedEarningsNotConfiguredError`,
    /// `TrialBalanceNotBalancedError`, unposted entries) and status
    /// violations; the transaction rolls back on any of them.
    pub async fn close_year(
        &self,
        company_id: Uuid,
        year: i32,
        actor: Uuid,
    ) -> Result<CloseYearResult, YearEndError> {
        let (company, fiscal_year) = self.load_company_year(company_id, year).await?;

        let balances = self
            .income_statement_balances(company_id, fiscal_year.start_date, fiscal_year.end_date)
            .await?;
        let journal = JournalRepository::new(self.db.clone());
        let unposted = journal
            .unposted_entry_count(company_id, fiscal_year.start_date, fiscal_year.end_date)
            .await?;
        let tb_totals = self.trial_balance_totals(company_id, fiscal_year.end_date).await?;

        let txn = self.db.begin().await?;

        let periods = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::FiscalYearId.eq(fiscal_year.id))
            .order_by_asc(fiscal_periods::Column::PeriodNumber)
            .all(&txn)
            .await?;

        // Closing entries post into period 13 (adjustment) or the last
        // regular period.
        let target_period = periods
            .iter()
            .rev()
            .find(|p| p.is_adjustment)
            .or_else(|| periods.last())
            .ok_or(YearEndError::YearNotFound)?;
        let closing_date = target_period.end_date;
        let target_period_id = target_period.id;

        let outcome = ClosingService::build_close(
            fiscal_year.status.into(),
            &balances,
            company.retained_earnings_account_id,
            unposted,
            tb_totals,
            &company.functional_currency,
            closing_date,
            actor,
            company_id,
        )?;

        let mut closing_entry_ids = Vec::with_capacity(outcome.closing_entries.len());
        for input in &outcome.closing_entries {
            let entry_id = JournalRepository::post_system_entry(
                &txn,
                company_id,
                &company.functional_currency,
                input,
                target_period_id,
                None,
            )
            .await?;
            closing_entry_ids.push(entry_id);
        }

        let now = Utc::now();
        let mut periods_closed = 0usize;
        for period in periods {
            if period.status == FiscalPeriodStatus::Open {
                let mut active: fiscal_periods::ActiveModel = period.into();
                active.status = Set(FiscalPeriodStatus::Closed);
                active.closed_by = Set(Some(actor));
                active.closed_at = Set(Some(now.into()));
                active.updated_at = Set(now.into());
                active.update(&txn).await?;
                periods_closed += 1;
            }
        }

        let fiscal_year_id = fiscal_year.id;
        let mut active: fiscal_years::ActiveModel = fiscal_year.into();
        active.status = Set(FiscalYearStatus::Closed);
        active.closed_by = Set(Some(actor));
        active.closed_at = Set(Some(now.into()));
        active.update(&txn).await?;

        JournalRepository::append_audit(
            &txn,
            company.organization_id,
            Some(actor),
            "fiscal_year:close",
            "fiscal_year",
            fiscal_year_id,
            serde_json::json!({
                "year": year,
                "net_income": outcome.net_income.to_string(),
                "closing_entries": closing_entry_ids,
            }),
        )
        .await?;

        txn.commit().await?;
        info!(company_id = %company_id, year, periods_closed, "Fiscal year closed");

        Ok(CloseYearResult {
            closing_entry_ids,
            net_income: outcome.net_income,
            periods_closed,
        })
    }

    /// Reopens a closed fiscal year: reverses every closing entry, then
    /// reopens the year and all periods. A subsequent close produces
    /// fresh closing entries.
    ///
    /// # Errors
    ///
    /// Returns `InvalidYearStatusTransitionError` for a year that is not
    /// closed and `NoClosingEntriesError` when nothing can be reversed.
    pub async fn reopen_year(
        &self,
        company_id: Uuid,
        year: i32,
        actor: Uuid,
        reason: Option<String>,
    ) -> Result<ReopenYearResult, YearEndError> {
        let (company, fiscal_year) = self.load_company_year(company_id, year).await?;

        let txn = self.db.begin().await?;

        let closing_entries = journal_entries::Entity::find()
            .filter(journal_entries::Column::CompanyId.eq(company_id))
            .filter(journal_entries::Column::EntryType.eq(EntryType::Closing))
            .filter(journal_entries::Column::Status.eq(EntryStatus::Posted))
            .filter(
                journal_entries::Column::TransactionDate
                    .between(fiscal_year.start_date, fiscal_year.end_date),
            )
            .all(&txn)
            .await?;
        ClosingService::validate_reopen(fiscal_year.status.into(), closing_entries.len())?;

        let periods = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::FiscalYearId.eq(fiscal_year.id))
            .order_by_asc(fiscal_periods::Column::PeriodNumber)
            .all(&txn)
            .await?;
        let target_period = periods
            .iter()
            .rev()
            .find(|p| p.is_adjustment)
            .or_else(|| periods.last())
            .ok_or(YearEndError::YearNotFound)?;
        let target_period_id = target_period.id;
        let reversal_date = target_period.end_date;

        let now = Utc::now();
        let mut reversing_entry_ids = Vec::with_capacity(closing_entries.len());
        for entry in closing_entries {
            let lines = journal_entry_lines::Entity::find()
                .filter(journal_entry_lines::Column::EntryId.eq(entry.id))
                .order_by_asc(journal_entry_lines::Column::LineNumber)
                .all(&txn)
                .await?;

            let reversal_input = ReversalService::build_reversal(&ReversalInput {
                original_entry_id: entry.id,
                company_id,
                original_lines: lines.iter().map(to_resolved_line).collect(),
                reversal_date,
                original_description: entry.description.clone(),
                reversed_by: actor,
            })?;

            let reversal_id = JournalRepository::post_system_entry(
                &txn,
                company_id,
                &company.functional_currency,
                &reversal_input,
                target_period_id,
                Some(entry.id),
            )
            .await?;
            reversing_entry_ids.push(reversal_id);

            let mut active: journal_entries::ActiveModel = entry.into();
            active.status = Set(EntryStatus::Reversed);
            active.reversing_entry_id = Set(Some(reversal_id));
            active.updated_at = Set(now.into());
            active.update(&txn).await?;
        }

        let mut periods_reopened = 0usize;
        for period in periods {
            if period.status == FiscalPeriodStatus::Closed {
                let period_id = period.id;
                let mut active: fiscal_periods::ActiveModel = period.into();
                active.status = Set(FiscalPeriodStatus::Open);
                active.updated_at = Set(now.into());
                active.update(&txn).await?;

                Self::append_reopen_log(&txn, period_id, actor, reason.clone()).await?;
                periods_reopened += 1;
            }
        }

        let fiscal_year_id = fiscal_year.id;
        let mut active: fiscal_years::ActiveModel = fiscal_year.into();
        active.status = Set(FiscalYearStatus::Open);
        active.closed_by = Set(None);
        active.closed_at = Set(None);
        active.update(&txn).await?;

        JournalRepository::append_audit(
            &txn,
            company.organization_id,
            Some(actor),
            "fiscal_year:reopen",
            "fiscal_year",
            fiscal_year_id,
            serde_json::json!({
                "year": year,
                "reversing_entries": reversing_entry_ids,
            }),
        )
        .await?;

        txn.commit().await?;
        info!(company_id = %company_id, year, periods_reopened, "Fiscal year reopened");

        Ok(ReopenYearResult {
            reversing_entry_ids,
            periods_reopened,
        })
    }

    async fn load_company_year(
        &self,
        company_id: Uuid,
        year: i32,
    ) -> Result<(companies::Model, fiscal_years::Model), YearEndError> {
        let company = companies::Entity::find_by_id(company_id)
            .one(&self.db)
            .await?
            .ok_or(YearEndError::CompanyNotFound(company_id))?;
        let fiscal_year = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::CompanyId.eq(company_id))
            .filter(fiscal_years::Column::Year.eq(year))
            .one(&self.db)
            .await?
            .ok_or(YearEndError::YearNotFound)?;
        Ok((company, fiscal_year))
    }

    /// Natural-signed revenue and expense balances accumulated in the
    /// year (posted lines within the year's date range).
    async fn income_statement_balances(
        &self,
        company_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AccountClosingBalance>, YearEndError> {
        use meridian_core::account::AccountType;
        use std::collections::HashMap;

        let accounts = crate::entities::accounts::Entity::find()
            .filter(crate::entities::accounts::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await?;
        let lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::CompanyId.eq(company_id))
            .filter(journal_entry_lines::Column::IsPosted.eq(true))
            .filter(journal_entry_lines::Column::TransactionDate.between(start, end))
            .all(&self.db)
            .await?;

        let mut signed: HashMap<Uuid, Decimal> = HashMap::new();
        for line in lines {
            *signed.entry(line.account_id).or_default() += line.debit - line.credit;
        }

        Ok(accounts
            .into_iter()
            .filter_map(|account| {
                let account_type: AccountType = account.account_type.into();
                if !account_type.is_income_statement() {
                    return None;
                }
                let balance_signed = signed.get(&account.id).copied().unwrap_or_default();
                // Natural sign: credit-positive for revenue, debit-positive
                // for expenses.
                let natural = match account_type {
                    AccountType::Revenue => -balance_signed,
                    _ => balance_signed,
                };
                Some(AccountClosingBalance {
                    account_id: account.id,
                    account_type,
                    balance: natural,
                })
            })
            .collect())
    }

    async fn trial_balance_totals(
        &self,
        company_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<(Decimal, Decimal), YearEndError> {
        let lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::CompanyId.eq(company_id))
            .filter(journal_entry_lines::Column::IsPosted.eq(true))
            .filter(journal_entry_lines::Column::TransactionDate.lte(as_of))
            .all(&self.db)
            .await?;
        let debit = lines.iter().map(|l| l.debit).sum();
        let credit = lines.iter().map(|l| l.credit).sum();
        Ok((debit, credit))
    }

    async fn append_reopen_log(
        txn: &DatabaseTransaction,
        period_id: Uuid,
        actor: Uuid,
        reason: Option<String>,
    ) -> Result<(), YearEndError> {
        let log = fiscal_period_reopen_log::ActiveModel {
            id: Set(Uuid::now_v7()),
            fiscal_period_id: Set(period_id),
            reopened_by: Set(actor),
            reopened_at: Set(Utc::now().into()),
            reason: Set(reason),
        };
        log.insert(txn).await?;
        Ok(())
    }
}
