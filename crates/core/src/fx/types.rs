//! Exchange rate types.

use chrono::{DateTime, NaiveDate, Utc};
use meridian_shared::types::{ExchangeRateId, OrganizationId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of rate stored for a currency pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateType {
    /// Daily spot rate.
    Spot,
    /// Period average rate, used for income statement translation.
    Average,
    /// Historical rate, used for equity translation.
    Historical,
    /// Period closing rate, used for balance sheet translation.
    Closing,
}

/// An effective-dated exchange rate.
///
/// The unique key is (organization, from, to, effective date, rate type).
/// Posted journal lines capture the applied rate, so stored rates stay
/// logically immutable once referenced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Unique identifier.
    pub id: ExchangeRateId,
    /// Organization scope.
    pub organization_id: OrganizationId,
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// The date this rate takes effect.
    pub effective_date: NaiveDate,
    /// The kind of rate.
    pub rate_type: RateType,
    /// Units of target currency per unit of source currency.
    pub rate: Decimal,
    /// Where the rate came from (provider name, "manual").
    pub source: Option<String>,
    /// Row creation time; tie-breaker for same-day rates.
    pub created_at: DateTime<Utc>,
}
