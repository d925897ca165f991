//! Fiscal calendar repository.

use chrono::{NaiveDate, Utc};
use meridian_core::fiscal::{self, FiscalError};
use meridian_shared::types::{CompanyId, FiscalPeriodId, FiscalYearId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    fiscal_period_reopen_log, fiscal_periods, fiscal_years,
    sea_orm_active_enums::{FiscalPeriodStatus, FiscalYearStatus},
};

/// Error types for fiscal calendar operations.
#[derive(Debug, thiserror::Error)]
pub enum FiscalRepoError {
    /// Domain rule violation.
    #[error(transparent)]
    Domain(#[from] FiscalError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl FiscalRepoError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Domain(err) => err.tag(),
            Self::Database(_) => "InternalServerError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Domain(err) => err.status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Fiscal calendar repository.
#[derive(Debug, Clone)]
pub struct FiscalRepository {
    db: DatabaseConnection,
}

impl FiscalRepository {
    /// Creates a new fiscal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a fiscal year and synthesizes its periods atomically.
    ///
    /// # Errors
    ///
    /// Surfaces `YearAlreadyExists` / `YearOverlaps` and database errors.
    pub async fn create_year(
        &self,
        company_id: Uuid,
        year: i32,
        start_date: NaiveDate,
        with_adjustment: bool,
    ) -> Result<(fiscal_years::Model, Vec<fiscal_periods::Model>), FiscalRepoError> {
        let specs = fiscal::generate_periods(year, start_date, with_adjustment)?;
        let end_date = specs
            .iter()
            .filter(|s| !s.is_adjustment)
            .map(|s| s.end_date)
            .max()
            .ok_or(FiscalError::InvalidDateRange {
                start: start_date,
                end: start_date,
            })?;

        let existing = self.years_domain(company_id).await?;
        fiscal::validate_new_year(year, start_date, end_date, &existing)?;

        let txn = self.db.begin().await?;
        let now = Utc::now().into();
        let year_id = Uuid::now_v7();

        let year_model = fiscal_years::ActiveModel {
            id: Set(year_id),
            company_id: Set(company_id),
            year: Set(year),
            start_date: Set(start_date),
            end_date: Set(end_date),
            status: Set(FiscalYearStatus::Open),
            closed_by: Set(None),
            closed_at: Set(None),
            created_at: Set(now),
        };
        let year_model = year_model.insert(&txn).await?;

        let mut periods = Vec::with_capacity(specs.len());
        for spec in specs {
            let period = fiscal_periods::ActiveModel {
                id: Set(Uuid::now_v7()),
                fiscal_year_id: Set(year_id),
                company_id: Set(company_id),
                period_number: Set(i16::from(spec.period_number)),
                name: Set(spec.name),
                start_date: Set(spec.start_date),
                end_date: Set(spec.end_date),
                is_adjustment: Set(spec.is_adjustment),
                status: Set(FiscalPeriodStatus::Open),
                closed_by: Set(None),
                closed_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };
            periods.push(period.insert(&txn).await?);
        }

        txn.commit().await?;
        Ok((year_model, periods))
    }

    /// Fetches a fiscal year.
    ///
    /// # Errors
    ///
    /// Returns `YearNotFound` when it does not exist.
    pub async fn get_year(&self, id: Uuid) -> Result<fiscal_years::Model, FiscalRepoError> {
        fiscal_years::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| FiscalError::YearNotFound.into())
    }

    /// Fetches a company's fiscal year by number.
    ///
    /// # Errors
    ///
    /// Returns `YearNotFound` when it does not exist.
    pub async fn get_year_by_number(
        &self,
        company_id: Uuid,
        year: i32,
    ) -> Result<fiscal_years::Model, FiscalRepoError> {
        fiscal_years::Entity::find()
            .filter(fiscal_years::Column::CompanyId.eq(company_id))
            .filter(fiscal_years::Column::Year.eq(year))
            .one(&self.db)
            .await?
            .ok_or_else(|| FiscalError::YearNotFound.into())
    }

    /// Lists the periods of a fiscal year, number-ordered.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn periods_of_year(
        &self,
        fiscal_year_id: Uuid,
    ) -> Result<Vec<fiscal_periods::Model>, FiscalRepoError> {
        Ok(fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::FiscalYearId.eq(fiscal_year_id))
            .order_by_asc(fiscal_periods::Column::PeriodNumber)
            .all(&self.db)
            .await?)
    }

    /// Lists every period of a company as core domain values.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn company_periods(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<fiscal::FiscalPeriod>, FiscalRepoError> {
        let models = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::CompanyId.eq(company_id))
            .order_by_asc(fiscal_periods::Column::StartDate)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(to_domain_period).collect())
    }

    /// Resolves the unique period containing a date.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFoundForDate` when no period covers the date.
    pub async fn resolve_period_for_date(
        &self,
        company_id: Uuid,
        date: NaiveDate,
    ) -> Result<fiscal_periods::Model, FiscalRepoError> {
        fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::CompanyId.eq(company_id))
            .filter(fiscal_periods::Column::IsAdjustment.eq(false))
            .filter(fiscal_periods::Column::StartDate.lte(date))
            .filter(fiscal_periods::Column::EndDate.gte(date))
            .one(&self.db)
            .await?
            .ok_or_else(|| FiscalError::PeriodNotFoundForDate(date).into())
    }

    /// Closes an open period, recording the actor and timestamp.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriodTransition` unless the period is Open.
    pub async fn close_period(
        &self,
        period_id: Uuid,
        closed_by: Uuid,
    ) -> Result<fiscal_periods::Model, FiscalRepoError> {
        let period = self.get_period(period_id).await?;
        let close = fiscal::close_period(
            period.status.into(),
            UserId::from_uuid(closed_by),
        )?;

        let mut active: fiscal_periods::ActiveModel = period.into();
        active.status = Set(FiscalPeriodStatus::Closed);
        active.closed_by = Set(Some(close.closed_by.into_inner()));
        active.closed_at = Set(Some(close.closed_at.into()));
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Reopens a closed period, appending to the reopen history.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriodTransition` unless the period is Closed.
    pub async fn open_period(
        &self,
        period_id: Uuid,
        reopened_by: Uuid,
        reason: Option<String>,
    ) -> Result<fiscal_periods::Model, FiscalRepoError> {
        let period = self.get_period(period_id).await?;
        fiscal::open_period(period.status.into())?;

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let mut active: fiscal_periods::ActiveModel = period.into();
        active.status = Set(FiscalPeriodStatus::Open);
        active.updated_at = Set(now.into());
        let updated = active.update(&txn).await?;

        let log = fiscal_period_reopen_log::ActiveModel {
            id: Set(Uuid::now_v7()),
            fiscal_period_id: Set(period_id),
            reopened_by: Set(reopened_by),
            reopened_at: Set(now.into()),
            reason: Set(reason),
        };
        log.insert(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Fetches a period by id.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound` when it does not exist.
    pub async fn get_period(&self, id: Uuid) -> Result<fiscal_periods::Model, FiscalRepoError> {
        fiscal_periods::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| FiscalError::PeriodNotFound.into())
    }

    /// Returns a period's reopen history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn reopen_history(
        &self,
        period_id: Uuid,
    ) -> Result<Vec<fiscal_period_reopen_log::Model>, FiscalRepoError> {
        Ok(fiscal_period_reopen_log::Entity::find()
            .filter(fiscal_period_reopen_log::Column::FiscalPeriodId.eq(period_id))
            .order_by_asc(fiscal_period_reopen_log::Column::ReopenedAt)
            .all(&self.db)
            .await?)
    }

    async fn years_domain(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<fiscal::FiscalYear>, FiscalRepoError> {
        let models = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await?;
        Ok(models
            .into_iter()
            .map(|m| fiscal::FiscalYear {
                id: FiscalYearId::from_uuid(m.id),
                company_id: CompanyId::from_uuid(m.company_id),
                year: m.year,
                start_date: m.start_date,
                end_date: m.end_date,
                status: m.status.into(),
                closed_by: m.closed_by.map(UserId::from_uuid),
                closed_at: m.closed_at.map(Into::into),
            })
            .collect())
    }
}

/// Maps a period row into the core domain type.
#[must_use]
pub fn to_domain_period(model: fiscal_periods::Model) -> fiscal::FiscalPeriod {
    fiscal::FiscalPeriod {
        id: FiscalPeriodId::from_uuid(model.id),
        fiscal_year_id: FiscalYearId::from_uuid(model.fiscal_year_id),
        company_id: CompanyId::from_uuid(model.company_id),
        period_number: u8::try_from(model.period_number).unwrap_or(0),
        name: model.name,
        start_date: model.start_date,
        end_date: model.end_date,
        is_adjustment: model.is_adjustment,
        status: model.status.into(),
        closed_by: model.closed_by.map(UserId::from_uuid),
        closed_at: model.closed_at.map(Into::into),
    }
}
