//! Fiscal calendar generation and period gating.
//!
//! - Fiscal year synthesis (12 monthly periods plus an optional adjustment
//!   period)
//! - Period resolution for a transaction date
//! - The Open ⇄ Closed status machine for periods and years

pub mod calendar;
pub mod error;
pub mod types;

pub use calendar::{
    close_period, generate_periods, open_period, resolve_period_for_date, transition_year,
    validate_new_year, PeriodClose, PeriodSpec,
};
pub use error::FiscalError;
pub use types::{
    FiscalPeriod, FiscalPeriodRef, FiscalPeriodStatus, FiscalYear, FiscalYearStatus,
    PeriodReopenEntry,
};
