//! Fiscal year synthesis and period resolution.

use chrono::{Datelike, Days, NaiveDate, Utc};
use meridian_shared::types::UserId;

use super::error::FiscalError;
use super::types::{FiscalPeriod, FiscalPeriodStatus, FiscalYear, FiscalYearStatus};

/// Specification for a period produced by [`generate_periods`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSpec {
    /// Period number (1-12, 13 for adjustment).
    pub period_number: u8,
    /// Period name (e.g. "2025-06" or "2025-ADJ").
    pub name: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// True for the adjustment period.
    pub is_adjustment: bool,
}

/// Adds calendar months to a date, clamping the day to the target month.
fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let zero_based = date.month0() + months;
    let year = date.year() + i32::try_from(zero_based / 12).unwrap_or(0);
    let month = zero_based % 12 + 1;
    let mut day = date.day();
    loop {
        if let Some(result) = NaiveDate::from_ymd_opt(year, month, day) {
            return result;
        }
        day -= 1;
    }
}

/// Synthesizes the monthly periods of a fiscal year.
///
/// Twelve periods are generated starting at `start_date`; the year ends the
/// day before `start_date + 12 months`. When `with_adjustment` is set, a
/// 13th single-day adjustment period is appended on the year's last day.
/// Adjustment periods never participate in date resolution.
///
/// # Errors
///
/// Returns `InvalidDateRange` for degenerate inputs (this cannot happen for
/// month-based generation but guards against future calendar shapes).
pub fn generate_periods(
    year: i32,
    start_date: NaiveDate,
    with_adjustment: bool,
) -> Result<Vec<PeriodSpec>, FiscalError> {
    let mut periods = Vec::with_capacity(if with_adjustment { 13 } else { 12 });

    for number in 1..=12u8 {
        let start = add_months(start_date, u32::from(number) - 1);
        let end = add_months(start_date, u32::from(number))
            .checked_sub_days(Days::new(1))
            .ok_or(FiscalError::InvalidDateRange {
                start: start_date,
                end: start_date,
            })?;
        periods.push(PeriodSpec {
            period_number: number,
            name: format!("{}-{:02}", year, start.month()),
            start_date: start,
            end_date: end,
            is_adjustment: false,
        });
    }

    if with_adjustment {
        let year_end = periods[11].end_date;
        periods.push(PeriodSpec {
            period_number: 13,
            name: format!("{year}-ADJ"),
            start_date: year_end,
            end_date: year_end,
            is_adjustment: true,
        });
    }

    Ok(periods)
}

/// Validates a new fiscal year against the company's existing years.
///
/// # Errors
///
/// - `YearAlreadyExists` when the year number is taken.
/// - `YearOverlaps` when the date ranges intersect.
/// - `InvalidDateRange` when the end is not after the start.
pub fn validate_new_year(
    year: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    existing: &[FiscalYear],
) -> Result<(), FiscalError> {
    if end_date <= start_date {
        return Err(FiscalError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }

    for other in existing {
        if other.year == year {
            return Err(FiscalError::YearAlreadyExists { year });
        }
        if start_date <= other.end_date && end_date >= other.start_date {
            return Err(FiscalError::YearOverlaps { year: other.year });
        }
    }

    Ok(())
}

/// Resolves the unique non-adjustment period containing `date`.
///
/// # Errors
///
/// Returns `PeriodNotFoundForDate` if no period contains the date.
pub fn resolve_period_for_date(
    periods: &[FiscalPeriod],
    date: NaiveDate,
) -> Result<&FiscalPeriod, FiscalError> {
    periods
        .iter()
        .find(|p| !p.is_adjustment && p.contains_date(date))
        .ok_or(FiscalError::PeriodNotFoundForDate(date))
}

/// The result of closing a fiscal period.
#[derive(Debug, Clone)]
pub struct PeriodClose {
    /// The new status (always Closed).
    pub status: FiscalPeriodStatus,
    /// Actor recorded on the period.
    pub closed_by: UserId,
    /// Timestamp recorded on the period.
    pub closed_at: chrono::DateTime<Utc>,
}

/// Closes an open period.
///
/// # Errors
///
/// Returns `InvalidPeriodTransition` unless the period is Open.
pub fn close_period(
    current: FiscalPeriodStatus,
    closed_by: UserId,
) -> Result<PeriodClose, FiscalError> {
    match current {
        FiscalPeriodStatus::Open => Ok(PeriodClose {
            status: FiscalPeriodStatus::Closed,
            closed_by,
            closed_at: Utc::now(),
        }),
        FiscalPeriodStatus::Closed => Err(FiscalError::InvalidPeriodTransition {
            from: current,
            to: FiscalPeriodStatus::Closed,
        }),
    }
}

/// Reopens a closed period. Callers append the reopen history entry.
///
/// # Errors
///
/// Returns `InvalidPeriodTransition` unless the period is Closed.
pub fn open_period(current: FiscalPeriodStatus) -> Result<FiscalPeriodStatus, FiscalError> {
    match current {
        FiscalPeriodStatus::Closed => Ok(FiscalPeriodStatus::Open),
        FiscalPeriodStatus::Open => Err(FiscalError::InvalidPeriodTransition {
            from: current,
            to: FiscalPeriodStatus::Open,
        }),
    }
}

/// Transitions a fiscal year's status.
///
/// # Errors
///
/// Returns `InvalidYearStatusTransition` unless the transition is
/// Open → Closed or Closed → Open.
pub fn transition_year(
    current: FiscalYearStatus,
    target: FiscalYearStatus,
) -> Result<FiscalYearStatus, FiscalError> {
    if current == target {
        return Err(FiscalError::InvalidYearStatusTransition {
            from: current,
            to: target,
        });
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_shared::types::{CompanyId, FiscalPeriodId, FiscalYearId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_period(spec: &PeriodSpec) -> FiscalPeriod {
        FiscalPeriod {
            id: FiscalPeriodId::new(),
            fiscal_year_id: FiscalYearId::new(),
            company_id: CompanyId::new(),
            period_number: spec.period_number,
            name: spec.name.clone(),
            start_date: spec.start_date,
            end_date: spec.end_date,
            is_adjustment: spec.is_adjustment,
            status: FiscalPeriodStatus::Open,
            closed_by: None,
            closed_at: None,
        }
    }

    #[test]
    fn test_generate_calendar_year_periods() {
        let periods = generate_periods(2025, date(2025, 1, 1), false).unwrap();
        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].start_date, date(2025, 1, 1));
        assert_eq!(periods[0].end_date, date(2025, 1, 31));
        assert_eq!(periods[1].start_date, date(2025, 2, 1));
        assert_eq!(periods[1].end_date, date(2025, 2, 28));
        assert_eq!(periods[11].start_date, date(2025, 12, 1));
        assert_eq!(periods[11].end_date, date(2025, 12, 31));
    }

    #[test]
    fn test_generate_periods_with_adjustment() {
        let periods = generate_periods(2025, date(2025, 1, 1), true).unwrap();
        assert_eq!(periods.len(), 13);
        let adj = &periods[12];
        assert!(adj.is_adjustment);
        assert_eq!(adj.period_number, 13);
        assert_eq!(adj.start_date, date(2025, 12, 31));
        assert_eq!(adj.end_date, date(2025, 12, 31));
        assert_eq!(adj.name, "2025-ADJ");
    }

    #[test]
    fn test_generate_periods_offset_fiscal_year() {
        // Fiscal year starting April 1st (common for subsidiaries abroad).
        let periods = generate_periods(2025, date(2025, 4, 1), false).unwrap();
        assert_eq!(periods[0].start_date, date(2025, 4, 1));
        assert_eq!(periods[0].end_date, date(2025, 4, 30));
        assert_eq!(periods[11].start_date, date(2026, 3, 1));
        assert_eq!(periods[11].end_date, date(2026, 3, 31));
    }

    #[test]
    fn test_generate_periods_mid_month_start() {
        let periods = generate_periods(2025, date(2025, 1, 30), false).unwrap();
        // Day clamps to the shorter month.
        assert_eq!(periods[0].end_date, date(2025, 2, 27));
        assert_eq!(periods[1].start_date, date(2025, 2, 28));
    }

    #[test]
    fn test_periods_are_contiguous() {
        let periods = generate_periods(2025, date(2025, 7, 1), false).unwrap();
        for pair in periods.windows(2) {
            assert_eq!(
                pair[0].end_date.succ_opt().unwrap(),
                pair[1].start_date,
                "gap between {} and {}",
                pair[0].name,
                pair[1].name
            );
        }
    }

    #[test]
    fn test_resolve_period_for_date() {
        let specs = generate_periods(2025, date(2025, 1, 1), true).unwrap();
        let periods: Vec<FiscalPeriod> = specs.iter().map(make_period).collect();

        let resolved = resolve_period_for_date(&periods, date(2025, 6, 15)).unwrap();
        assert_eq!(resolved.period_number, 6);

        // The year's last day resolves to period 12, never the adjustment
        // period that shares the date.
        let resolved = resolve_period_for_date(&periods, date(2025, 12, 31)).unwrap();
        assert_eq!(resolved.period_number, 12);
    }

    #[test]
    fn test_resolve_period_outside_year() {
        let specs = generate_periods(2025, date(2025, 1, 1), false).unwrap();
        let periods: Vec<FiscalPeriod> = specs.iter().map(make_period).collect();
        assert!(matches!(
            resolve_period_for_date(&periods, date(2026, 1, 1)),
            Err(FiscalError::PeriodNotFoundForDate(_))
        ));
    }

    #[test]
    fn test_validate_new_year_uniqueness_and_overlap() {
        let existing = FiscalYear {
            id: FiscalYearId::new(),
            company_id: CompanyId::new(),
            year: 2025,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 12, 31),
            status: FiscalYearStatus::Open,
            closed_by: None,
            closed_at: None,
        };

        assert!(validate_new_year(
            2026,
            date(2026, 1, 1),
            date(2026, 12, 31),
            std::slice::from_ref(&existing)
        )
        .is_ok());

        assert!(matches!(
            validate_new_year(
                2025,
                date(2026, 1, 1),
                date(2026, 12, 31),
                std::slice::from_ref(&existing)
            ),
            Err(FiscalError::YearAlreadyExists { year: 2025 })
        ));

        assert!(matches!(
            validate_new_year(
                2026,
                date(2025, 12, 1),
                date(2026, 11, 30),
                std::slice::from_ref(&existing)
            ),
            Err(FiscalError::YearOverlaps { year: 2025 })
        ));
    }

    #[test]
    fn test_validate_new_year_degenerate_range() {
        assert!(matches!(
            validate_new_year(2025, date(2025, 1, 1), date(2025, 1, 1), &[]),
            Err(FiscalError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_close_and_open_period() {
        let user = UserId::new();
        let close = close_period(FiscalPeriodStatus::Open, user).unwrap();
        assert_eq!(close.status, FiscalPeriodStatus::Closed);
        assert_eq!(close.closed_by, user);

        assert!(matches!(
            close_period(FiscalPeriodStatus::Closed, user),
            Err(FiscalError::InvalidPeriodTransition { .. })
        ));

        assert_eq!(
            open_period(FiscalPeriodStatus::Closed).unwrap(),
            FiscalPeriodStatus::Open
        );
        assert!(matches!(
            open_period(FiscalPeriodStatus::Open),
            Err(FiscalError::InvalidPeriodTransition { .. })
        ));
    }

    #[test]
    fn test_year_transitions() {
        assert_eq!(
            transition_year(FiscalYearStatus::Open, FiscalYearStatus::Closed).unwrap(),
            FiscalYearStatus::Closed
        );
        assert_eq!(
            transition_year(FiscalYearStatus::Closed, FiscalYearStatus::Open).unwrap(),
            FiscalYearStatus::Open
        );
        assert!(matches!(
            transition_year(FiscalYearStatus::Open, FiscalYearStatus::Open),
            Err(FiscalError::InvalidYearStatusTransition { .. })
        ));
    }
}
