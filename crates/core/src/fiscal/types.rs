//! Fiscal calendar types.

use chrono::{DateTime, NaiveDate, Utc};
use meridian_shared::types::{CompanyId, FiscalPeriodId, FiscalYearId, UserId};
use serde::{Deserialize, Serialize};

/// Status of a fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalYearStatus {
    /// Year is open; periods may accept postings.
    Open,
    /// Year is closed by the year-end close.
    Closed,
}

/// Status of a fiscal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalPeriodStatus {
    /// Period is open for posting.
    Open,
    /// Period is closed; no posting allowed.
    Closed,
}

impl FiscalPeriodStatus {
    /// Returns true if the period accepts postings.
    #[must_use]
    pub fn allows_posting(self) -> bool {
        self == Self::Open
    }
}

/// A fiscal year of a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalYear {
    /// Unique identifier.
    pub id: FiscalYearId,
    /// Company this fiscal year belongs to.
    pub company_id: CompanyId,
    /// Year number, unique per company (e.g. 2025).
    pub year: i32,
    /// First day of the fiscal year.
    pub start_date: NaiveDate,
    /// Last day of the fiscal year.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: FiscalYearStatus,
    /// Who closed the year, once closed.
    pub closed_by: Option<UserId>,
    /// When the year was closed.
    pub closed_at: Option<DateTime<Utc>>,
}

/// A fiscal period within a fiscal year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Fiscal year this period belongs to.
    pub fiscal_year_id: FiscalYearId,
    /// Company this period belongs to.
    pub company_id: CompanyId,
    /// Period number within the year (1-12, 13 for adjustment).
    pub period_number: u8,
    /// Period name (e.g. "2025-06").
    pub name: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// True for the 13th adjustment period.
    pub is_adjustment: bool,
    /// Current status.
    pub status: FiscalPeriodStatus,
    /// Who closed the period, once closed.
    pub closed_by: Option<UserId>,
    /// When the period was closed.
    pub closed_at: Option<DateTime<Utc>>,
}

impl FiscalPeriod {
    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns the (year, period) reference for this period.
    ///
    /// `year` here is the fiscal year number the period belongs to.
    #[must_use]
    pub fn to_ref(&self, year: i32) -> FiscalPeriodRef {
        FiscalPeriodRef {
            year,
            period: self.period_number,
        }
    }
}

/// A (year, period number) reference carried on journal entries and
/// consolidation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiscalPeriodRef {
    /// Fiscal year number.
    pub year: i32,
    /// Period number within the year (1-13).
    pub period: u8,
}

impl std::fmt::Display for FiscalPeriodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-P{:02}", self.year, self.period)
    }
}

/// One append-only entry in a period's reopen history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodReopenEntry {
    /// The period that was reopened.
    pub fiscal_period_id: FiscalPeriodId,
    /// Who reopened it.
    pub reopened_by: UserId,
    /// When it was reopened.
    pub reopened_at: DateTime<Utc>,
    /// Optional justification.
    pub reason: Option<String>,
}
