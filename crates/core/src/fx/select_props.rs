//! Property-based tests for rate selection.

use chrono::{NaiveDate, TimeZone, Utc};
use meridian_shared::types::{ExchangeRateId, OrganizationId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::select::{closest_on_or_before, latest, period_average};
use super::types::{ExchangeRate, RateType};

/// Strategy producing dates within 2025.
fn day_of_2025() -> impl Strategy<Value = NaiveDate> {
    (0u64..365).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .checked_add_days(chrono::Days::new(offset))
            .unwrap()
    })
}

/// Strategy producing positive rates with 4 decimal places.
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn make_rate(effective: NaiveDate, rate: Decimal, seq: u32) -> ExchangeRate {
    ExchangeRate {
        id: ExchangeRateId::new(),
        organization_id: OrganizationId::new(),
        from_currency: "EUR".to_string(),
        to_currency: "USD".to_string(),
        effective_date: effective,
        rate_type: RateType::Spot,
        rate,
        source: None,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::seconds(i64::from(seq)),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// `closest_on_or_before(d)` never returns a rate dated after `d`, and
    /// always returns the maximum qualifying effective date.
    #[test]
    fn prop_closest_returns_max_on_or_before(
        days in prop::collection::vec((day_of_2025(), positive_rate()), 1..20),
        query in day_of_2025(),
    ) {
        let rates: Vec<ExchangeRate> = days
            .iter()
            .enumerate()
            .map(|(i, (d, r))| make_rate(*d, *r, u32::try_from(i).unwrap()))
            .collect();

        let result = closest_on_or_before(&rates, RateType::Spot, query);
        let best = rates
            .iter()
            .filter(|r| r.effective_date <= query)
            .map(|r| r.effective_date)
            .max();

        match (result, best) {
            (Some(found), Some(max_date)) => prop_assert_eq!(found.effective_date, max_date),
            (None, None) => {}
            (found, expected) => prop_assert!(
                false,
                "mismatch: found={:?} expected-date={:?}",
                found.map(|r| r.effective_date),
                expected
            ),
        }
    }

    /// `latest()` equals `closest_on_or_before(max stored date)`.
    #[test]
    fn prop_latest_equals_closest_at_horizon(
        days in prop::collection::vec((day_of_2025(), positive_rate()), 1..20),
    ) {
        let rates: Vec<ExchangeRate> = days
            .iter()
            .enumerate()
            .map(|(i, (d, r))| make_rate(*d, *r, u32::try_from(i).unwrap()))
            .collect();

        let horizon = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let by_latest = latest(&rates, RateType::Spot).map(|r| r.id);
        let by_closest = closest_on_or_before(&rates, RateType::Spot, horizon).map(|r| r.id);
        prop_assert_eq!(by_latest, by_closest);
    }

    /// The spot-mean fallback lies between the minimum and maximum spot rate.
    #[test]
    fn prop_period_average_is_bounded(
        days in prop::collection::vec((day_of_2025(), positive_rate()), 1..20),
    ) {
        let rates: Vec<ExchangeRate> = days
            .iter()
            .enumerate()
            .map(|(i, (d, r))| make_rate(*d, *r, u32::try_from(i).unwrap()))
            .collect();

        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let average = period_average(&rates, start, end).unwrap();

        let min = rates.iter().map(|r| r.rate).min().unwrap();
        let max = rates.iter().map(|r| r.rate).max().unwrap();
        // Rounding at scale 6 cannot push the mean outside by more than half
        // a unit in the last place.
        let ulp = Decimal::new(5, 7);
        prop_assert!(average >= min - ulp && average <= max + ulp);
    }
}
