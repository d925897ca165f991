//! Effective-date rate selection.
//!
//! All functions operate on candidate slices already scoped to one
//! (organization, from, to) pair; the repository fetches candidates and
//! delegates here so the semantics stay unit-testable.

use chrono::NaiveDate;
use meridian_shared::types::money::bankers_round;
use rust_decimal::Decimal;

use super::error::FxError;
use super::types::{ExchangeRate, RateType};

/// Scale applied to computed (averaged) rates.
const RATE_SCALE: u32 = 6;

/// Returns the rate with an exact effective-date match.
#[must_use]
pub fn rate_for_date<'a>(
    rates: &'a [ExchangeRate],
    rate_type: RateType,
    date: NaiveDate,
) -> Option<&'a ExchangeRate> {
    rates
        .iter()
        .filter(|r| r.rate_type == rate_type && r.effective_date == date)
        .max_by_key(|r| r.created_at)
}

/// Returns the rate with the greatest effective date.
#[must_use]
pub fn latest<'a>(rates: &'a [ExchangeRate], rate_type: RateType) -> Option<&'a ExchangeRate> {
    rates
        .iter()
        .filter(|r| r.rate_type == rate_type)
        .max_by_key(|r| (r.effective_date, r.created_at))
}

/// Returns the rate with effective date ≤ `date` closest to `date`.
///
/// Ties on the same effective date are broken by the greatest `created_at`.
#[must_use]
pub fn closest_on_or_before<'a>(
    rates: &'a [ExchangeRate],
    rate_type: RateType,
    date: NaiveDate,
) -> Option<&'a ExchangeRate> {
    rates
        .iter()
        .filter(|r| r.rate_type == rate_type && r.effective_date <= date)
        .max_by_key(|r| (r.effective_date, r.created_at))
}

/// Returns the average rate for a period.
///
/// Prefers a stored `Average` rate whose effective date falls inside the
/// period (the latest one, if several were uploaded). Absent that, computes
/// the unweighted mean of `Spot` rates within the period, rounded with
/// Banker's Rounding at rate scale.
#[must_use]
pub fn period_average(
    rates: &[ExchangeRate],
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> Option<Decimal> {
    let stored = rates
        .iter()
        .filter(|r| {
            r.rate_type == RateType::Average
                && r.effective_date >= period_start
                && r.effective_date <= period_end
        })
        .max_by_key(|r| (r.effective_date, r.created_at));
    if let Some(rate) = stored {
        return Some(rate.rate);
    }

    let spots: Vec<Decimal> = rates
        .iter()
        .filter(|r| {
            r.rate_type == RateType::Spot
                && r.effective_date >= period_start
                && r.effective_date <= period_end
        })
        .map(|r| r.rate)
        .collect();
    if spots.is_empty() {
        return None;
    }

    let sum: Decimal = spots.iter().copied().sum();
    Some(bankers_round(sum / Decimal::from(spots.len()), RATE_SCALE))
}

/// Returns the closing rate for a period ending on `period_end`.
///
/// The latest `Closing` rate on or before the period end wins; failing
/// that, the latest `Spot` rate on or before the period end.
#[must_use]
pub fn period_closing<'a>(
    rates: &'a [ExchangeRate],
    period_end: NaiveDate,
) -> Option<&'a ExchangeRate> {
    closest_on_or_before(rates, RateType::Closing, period_end)
        .or_else(|| closest_on_or_before(rates, RateType::Spot, period_end))
}

/// Validates a rate before insertion.
///
/// # Errors
///
/// - `SameCurrency` when from == to (case-insensitive).
/// - `NonPositiveRate` when the rate is zero or negative.
pub fn validate_new_rate(from: &str, to: &str, rate: Decimal) -> Result<(), FxError> {
    if from.eq_ignore_ascii_case(to) {
        return Err(FxError::SameCurrency(from.to_uppercase()));
    }
    if rate <= Decimal::ZERO {
        return Err(FxError::NonPositiveRate);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use meridian_shared::types::{ExchangeRateId, OrganizationId};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_rate(rate_type: RateType, effective: NaiveDate, rate: Decimal) -> ExchangeRate {
        ExchangeRate {
            id: ExchangeRateId::new(),
            organization_id: OrganizationId::new(),
            from_currency: "EUR".to_string(),
            to_currency: "USD".to_string(),
            effective_date: effective,
            rate_type,
            rate,
            source: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_rate_for_date_exact_match_only() {
        let rates = vec![
            make_rate(RateType::Spot, date(2025, 6, 10), dec!(1.10)),
            make_rate(RateType::Spot, date(2025, 6, 11), dec!(1.11)),
        ];
        assert_eq!(
            rate_for_date(&rates, RateType::Spot, date(2025, 6, 10)).unwrap().rate,
            dec!(1.10)
        );
        assert!(rate_for_date(&rates, RateType::Spot, date(2025, 6, 12)).is_none());
        assert!(rate_for_date(&rates, RateType::Closing, date(2025, 6, 10)).is_none());
    }

    #[test]
    fn test_latest_picks_max_effective_date() {
        let rates = vec![
            make_rate(RateType::Spot, date(2025, 6, 10), dec!(1.10)),
            make_rate(RateType::Spot, date(2025, 6, 20), dec!(1.20)),
            make_rate(RateType::Spot, date(2025, 6, 15), dec!(1.15)),
        ];
        assert_eq!(latest(&rates, RateType::Spot).unwrap().rate, dec!(1.20));
    }

    #[test]
    fn test_closest_on_or_before() {
        let rates = vec![
            make_rate(RateType::Spot, date(2025, 6, 1), dec!(1.01)),
            make_rate(RateType::Spot, date(2025, 6, 10), dec!(1.10)),
            make_rate(RateType::Spot, date(2025, 6, 20), dec!(1.20)),
        ];
        assert_eq!(
            closest_on_or_before(&rates, RateType::Spot, date(2025, 6, 15)).unwrap().rate,
            dec!(1.10)
        );
        assert!(closest_on_or_before(&rates, RateType::Spot, date(2025, 5, 31)).is_none());
    }

    #[test]
    fn test_closest_ties_break_by_created_at() {
        let mut earlier = make_rate(RateType::Spot, date(2025, 6, 10), dec!(1.10));
        earlier.created_at = Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap();
        let mut later = make_rate(RateType::Spot, date(2025, 6, 10), dec!(1.12));
        later.created_at = earlier.created_at + Duration::hours(2);

        let rates = vec![earlier, later];
        assert_eq!(
            closest_on_or_before(&rates, RateType::Spot, date(2025, 6, 10)).unwrap().rate,
            dec!(1.12)
        );
    }

    #[test]
    fn test_period_average_prefers_stored_average() {
        let rates = vec![
            make_rate(RateType::Average, date(2025, 6, 30), dec!(1.15)),
            make_rate(RateType::Spot, date(2025, 6, 10), dec!(1.00)),
            make_rate(RateType::Spot, date(2025, 6, 20), dec!(2.00)),
        ];
        assert_eq!(
            period_average(&rates, date(2025, 6, 1), date(2025, 6, 30)),
            Some(dec!(1.15))
        );
    }

    #[test]
    fn test_period_average_falls_back_to_spot_mean() {
        let rates = vec![
            make_rate(RateType::Spot, date(2025, 6, 10), dec!(1.10)),
            make_rate(RateType::Spot, date(2025, 6, 20), dec!(1.20)),
            // Outside the period, ignored.
            make_rate(RateType::Spot, date(2025, 5, 20), dec!(9.99)),
        ];
        assert_eq!(
            period_average(&rates, date(2025, 6, 1), date(2025, 6, 30)),
            Some(dec!(1.150000))
        );
    }

    #[test]
    fn test_period_average_empty() {
        assert_eq!(period_average(&[], date(2025, 6, 1), date(2025, 6, 30)), None);
    }

    #[test]
    fn test_period_closing_prefers_closing_rate() {
        let rates = vec![
            make_rate(RateType::Closing, date(2025, 6, 30), dec!(1.18)),
            make_rate(RateType::Spot, date(2025, 6, 30), dec!(1.17)),
        ];
        assert_eq!(period_closing(&rates, date(2025, 6, 30)).unwrap().rate, dec!(1.18));
    }

    #[test]
    fn test_period_closing_falls_back_to_spot() {
        let rates = vec![make_rate(RateType::Spot, date(2025, 6, 28), dec!(1.17))];
        assert_eq!(period_closing(&rates, date(2025, 6, 30)).unwrap().rate, dec!(1.17));
        assert!(period_closing(&rates, date(2025, 6, 27)).is_none());
    }

    #[test]
    fn test_validate_new_rate() {
        assert!(validate_new_rate("EUR", "USD", dec!(1.1)).is_ok());
        assert!(matches!(
            validate_new_rate("usd", "USD", dec!(1.1)),
            Err(FxError::SameCurrency(_))
        ));
        assert!(matches!(
            validate_new_rate("EUR", "USD", dec!(0)),
            Err(FxError::NonPositiveRate)
        ));
        assert!(matches!(
            validate_new_rate("EUR", "USD", dec!(-1)),
            Err(FxError::NonPositiveRate)
        ));
    }
}
