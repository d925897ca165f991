//! Fiscal calendar error types.

use chrono::NaiveDate;
use thiserror::Error;

use super::types::{FiscalPeriodStatus, FiscalYearStatus};

/// Errors that can occur during fiscal calendar operations.
#[derive(Debug, Error)]
pub enum FiscalError {
    /// A fiscal year with this number already exists for the company.
    #[error("Fiscal year {year} already exists for this company")]
    YearAlreadyExists {
        /// The conflicting year number.
        year: i32,
    },

    /// The new year's date range overlaps an existing year.
    #[error("Fiscal year date range overlaps fiscal year {year}")]
    YearOverlaps {
        /// The overlapped year number.
        year: i32,
    },

    /// End date must be after start date.
    #[error("Fiscal year end date {end} is not after start date {start}")]
    InvalidDateRange {
        /// Start of the invalid range.
        start: NaiveDate,
        /// End of the invalid range.
        end: NaiveDate,
    },

    /// Fiscal year not found.
    #[error("Fiscal year not found")]
    YearNotFound,

    /// Fiscal period not found.
    #[error("Fiscal period not found")]
    PeriodNotFound,

    /// No fiscal period contains the given date.
    #[error("No fiscal period found for date {0}")]
    PeriodNotFoundForDate(NaiveDate),

    /// The fiscal period is closed.
    #[error("Fiscal period is closed")]
    PeriodClosed,

    /// Illegal period status transition.
    #[error("Invalid fiscal period transition: {from:?} -> {to:?}")]
    InvalidPeriodTransition {
        /// Current status.
        from: FiscalPeriodStatus,
        /// Requested status.
        to: FiscalPeriodStatus,
    },

    /// Illegal year status transition.
    #[error("Invalid fiscal year transition: {from:?} -> {to:?}")]
    InvalidYearStatusTransition {
        /// Current status.
        from: FiscalYearStatus,
        /// Requested status.
        to: FiscalYearStatus,
    },
}

impl FiscalError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::YearAlreadyExists { .. } => "FiscalYearAlreadyExistsError",
            Self::YearOverlaps { .. } => "FiscalYearOverlapsError",
            Self::InvalidDateRange { .. } => "InvalidFiscalDateRangeError",
            Self::YearNotFound => "FiscalYearNotFoundError",
            Self::PeriodNotFound => "FiscalPeriodNotFoundError",
            Self::PeriodNotFoundForDate(_) => "FiscalPeriodNotFoundForDateError",
            Self::PeriodClosed => "FiscalPeriodClosedError",
            Self::InvalidPeriodTransition { .. } => "InvalidPeriodTransitionError",
            Self::InvalidYearStatusTransition { .. } => "InvalidYearStatusTransitionError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::YearAlreadyExists { .. } | Self::YearOverlaps { .. } => 409,
            Self::InvalidDateRange { .. } => 400,
            Self::YearNotFound | Self::PeriodNotFound | Self::PeriodNotFoundForDate(_) => 404,
            Self::PeriodClosed
            | Self::InvalidPeriodTransition { .. }
            | Self::InvalidYearStatusTransition { .. } => 422,
        }
    }
}
