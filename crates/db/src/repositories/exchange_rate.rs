//! Exchange rate repository.
//!
//! Stores effective-dated rates and answers lookups by delegating the
//! selection semantics to `meridian_core::fx` over fetched candidates.
//! Closest-rate lookups go through a read-mostly moka cache with a short
//! TTL; writes invalidate the pair's cached answers.

use std::time::Duration;

use chrono::NaiveDate;
use meridian_core::fx::{self, FxError};
use meridian_shared::types::{ExchangeRateId, OrganizationId};
use moka::sync::Cache;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{exchange_rates, sea_orm_active_enums::RateType};

/// TTL of cached rate lookups.
const CACHE_TTL_SECS: u64 = 300;

/// Error types for exchange rate operations.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeRateError {
    /// Domain rule violation.
    #[error(transparent)]
    Domain(#[from] FxError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ExchangeRateError {
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

/// Input for creating an exchange rate.
#[derive(Debug, Clone)]
pub struct CreateRateInput {
    /// Organization scope.
    pub organization_id: Uuid,
    /// Source currency.
    pub from_currency: String,
    /// Target currency.
    pub to_currency: String,
    /// Effective date.
    pub effective_date: NaiveDate,
    /// Rate kind.
    pub rate_type: fx::RateType,
    /// Units of target per unit of source.
    pub rate: Decimal,
    /// Provider name or "manual".
    pub source: Option<String>,
    /// Creator.
    pub created_by: Option<Uuid>,
}

/// Exchange rate repository.
#[derive(Clone)]
pub struct ExchangeRateRepository {
    db: DatabaseConnection,
    cache: Cache<String, Option<(Decimal, NaiveDate)>>,
}

impl ExchangeRateRepository {
    /// Creates a new exchange rate repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            cache: Cache::builder()
                .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
                .max_capacity(10_000)
                .support_invalidation_closures()
                .build(),
        }
    }

    /// Creates a rate.
    ///
    /// # Errors
    ///
    /// - `SameCurrencyExchangeRateError` when from == to.
    /// - `ExchangeRateAlreadyExistsError` on a duplicate unique key.
    pub async fn create(
        &self,
        input: CreateRateInput,
    ) -> Result<exchange_rates::Model, ExchangeRateError> {
        fx::validate_new_rate(&input.from_currency, &input.to_currency, input.rate)?;

        let from = input.from_currency.to_uppercase();
        let to = input.to_currency.to_uppercase();
        let rate_type = to_db_rate_type(input.rate_type);

        let existing = exchange_rates::Entity::find()
            .filter(exchange_rates::Column::OrganizationId.eq(input.organization_id))
            .filter(exchange_rates::Column::FromCurrency.eq(&from))
            .filter(exchange_rates::Column::ToCurrency.eq(&to))
            .filter(exchange_rates::Column::EffectiveDate.eq(input.effective_date))
            .filter(exchange_rates::Column::RateType.eq(rate_type))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(FxError::RateAlreadyExists {
                from,
                to,
                date: input.effective_date,
            }
            .into());
        }

        let model = exchange_rates::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(input.organization_id),
            from_currency: Set(from.clone()),
            to_currency: Set(to.clone()),
            effective_date: Set(input.effective_date),
            rate_type: Set(rate_type),
            rate: Set(input.rate),
            source: Set(input.source),
            created_by: Set(input.created_by),
            created_at: Set(chrono::Utc::now().into()),
        };
        let inserted = model.insert(&self.db).await?;

        self.invalidate_pair(input.organization_id, &from, &to);
        Ok(inserted)
    }

    /// Inserts many rates atomically: either all rows land or none.
    ///
    /// # Errors
    ///
    /// Any validation failure or duplicate rolls the whole batch back.
    pub async fn bulk_create(
        &self,
        inputs: Vec<CreateRateInput>,
    ) -> Result<Vec<exchange_rates::Model>, ExchangeRateError> {
        let txn = self.db.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());

        for input in inputs {
            fx::validate_new_rate(&input.from_currency, &input.to_currency, input.rate)?;
            let from = input.from_currency.to_uppercase();
            let to = input.to_currency.to_uppercase();
            let rate_type = to_db_rate_type(input.rate_type);

            let existing = exchange_rates::Entity::find()
                .filter(exchange_rates::Column::OrganizationId.eq(input.organization_id))
                .filter(exchange_rates::Column::FromCurrency.eq(&from))
                .filter(exchange_rates::Column::ToCurrency.eq(&to))
                .filter(exchange_rates::Column::EffectiveDate.eq(input.effective_date))
                .filter(exchange_rates::Column::RateType.eq(rate_type))
                .one(&txn)
                .await?;
            if existing.is_some() {
                return Err(FxError::RateAlreadyExists {
                    from,
                    to,
                    date: input.effective_date,
                }
                .into());
            }

            let model = exchange_rates::ActiveModel {
                id: Set(Uuid::now_v7()),
                organization_id: Set(input.organization_id),
                from_currency: Set(from.clone()),
                to_currency: Set(to.clone()),
                effective_date: Set(input.effective_date),
                rate_type: Set(rate_type),
                rate: Set(input.rate),
                source: Set(input.source),
                created_by: Set(input.created_by),
                created_at: Set(chrono::Utc::now().into()),
            };
            created.push(model.insert(&txn).await?);
            self.invalidate_pair(input.organization_id, &from, &to);
        }

        txn.commit().await?;
        Ok(created)
    }

    /// Exact effective-date lookup.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn get_for_date(
        &self,
        organization_id: Uuid,
        from: &str,
        to: &str,
        rate_type: fx::RateType,
        date: NaiveDate,
    ) -> Result<Option<fx::ExchangeRate>, ExchangeRateError> {
        let candidates = self.candidates(organization_id, from, to).await?;
        Ok(fx::rate_for_date(&candidates, rate_type, date).cloned())
    }

    /// Maximum-effective-date lookup.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn get_latest(
        &self,
        organization_id: Uuid,
        from: &str,
        to: &str,
        rate_type: fx::RateType,
    ) -> Result<Option<fx::ExchangeRate>, ExchangeRateError> {
        let candidates = self.candidates(organization_id, from, to).await?;
        Ok(fx::latest(&candidates, rate_type).cloned())
    }

    /// Closest-on-or-before lookup, cached.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn get_closest(
        &self,
        organization_id: Uuid,
        from: &str,
        to: &str,
        rate_type: fx::RateType,
        date: NaiveDate,
    ) -> Result<Option<(Decimal, NaiveDate)>, ExchangeRateError> {
        let key = format!(
            "{organization_id}:{}:{}:{rate_type:?}:{date}",
            from.to_uppercase(),
            to.to_uppercase()
        );
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let candidates = self.candidates(organization_id, from, to).await?;
        let result = fx::closest_on_or_before(&candidates, rate_type, date)
            .map(|r| (r.rate, r.effective_date));
        self.cache.insert(key, result);
        Ok(result)
    }

    /// Period average: stored Average inside the period, else the mean of
    /// Spot rates within it.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn get_period_average(
        &self,
        organization_id: Uuid,
        from: &str,
        to: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Option<Decimal>, ExchangeRateError> {
        let candidates = self.candidates(organization_id, from, to).await?;
        Ok(fx::period_average(&candidates, period_start, period_end))
    }

    /// Period closing: latest Closing ≤ period end, else latest Spot.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn get_period_closing(
        &self,
        organization_id: Uuid,
        from: &str,
        to: &str,
        period_end: NaiveDate,
    ) -> Result<Option<Decimal>, ExchangeRateError> {
        let candidates = self.candidates(organization_id, from, to).await?;
        Ok(fx::period_closing(&candidates, period_end).map(|r| r.rate))
    }

    /// Lists every rate of a currency pair, date-ordered.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn list_pair(
        &self,
        organization_id: Uuid,
        from: &str,
        to: &str,
    ) -> Result<Vec<exchange_rates::Model>, ExchangeRateError> {
        Ok(exchange_rates::Entity::find()
            .filter(exchange_rates::Column::OrganizationId.eq(organization_id))
            .filter(exchange_rates::Column::FromCurrency.eq(from.to_uppercase()))
            .filter(exchange_rates::Column::ToCurrency.eq(to.to_uppercase()))
            .order_by_asc(exchange_rates::Column::EffectiveDate)
            .all(&self.db)
            .await?)
    }

    async fn candidates(
        &self,
        organization_id: Uuid,
        from: &str,
        to: &str,
    ) -> Result<Vec<fx::ExchangeRate>, ExchangeRateError> {
        let models = self.list_pair(organization_id, from, to).await?;
        Ok(models.into_iter().map(to_domain_rate).collect())
    }

    fn invalidate_pair(&self, organization_id: Uuid, from: &str, to: &str) {
        // Cheap prefix invalidation: cached keys for the pair share this
        // prefix; moka supports predicate invalidation.
        let prefix = format!("{organization_id}:{from}:{to}:");
        let _ = self
            .cache
            .invalidate_entries_if(move |key, _| key.starts_with(&prefix));
    }
}

/// Maps a stored rate into the core domain type.
#[must_use]
pub fn to_domain_rate(model: exchange_rates::Model) -> fx::ExchangeRate {
    fx::ExchangeRate {
        id: ExchangeRateId::from_uuid(model.id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        from_currency: model.from_currency,
        to_currency: model.to_currency,
        effective_date: model.effective_date,
        rate_type: match model.rate_type {
            RateType::Spot => fx::RateType::Spot,
            RateType::Average => fx::RateType::Average,
            RateType::Historical => fx::RateType::Historical,
            RateType::Closing => fx::RateType::Closing,
        },
        rate: model.rate,
        source: model.source,
        created_at: model.created_at.into(),
    }
}

fn to_db_rate_type(value: fx::RateType) -> RateType {
    match value {
        fx::RateType::Spot => RateType::Spot,
        fx::RateType::Average => RateType::Average,
        fx::RateType::Historical => RateType::Historical,
        fx::RateType::Closing => RateType::Closing,
    }
}
