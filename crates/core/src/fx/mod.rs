//! Exchange rate selection semantics.
//!
//! The rate store itself lives in the database layer; this module owns the
//! effective-date selection rules so they are testable against plain slices:
//! exact-date lookup, latest, closest-on-or-before, period averages, and
//! period closing rates.

pub mod error;
pub mod select;
pub mod types;

#[cfg(test)]
mod select_props;

pub use error::FxError;
pub use select::{
    closest_on_or_before, latest, period_average, period_closing, rate_for_date,
    validate_new_rate,
};
pub use types::{ExchangeRate, RateType};
