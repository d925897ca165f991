//! Exchange rate error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during exchange rate operations.
#[derive(Debug, Error)]
pub enum FxError {
    /// From and to currencies must be different.
    #[error("From and to currencies must be different: {0}")]
    SameCurrency(String),

    /// Exchange rate must be positive.
    #[error("Exchange rate must be positive")]
    NonPositiveRate,

    /// No rate found for the pair.
    #[error("No exchange rate found for {from}/{to} on or before {date}")]
    RateNotFound {
        /// Source currency code.
        from: String,
        /// Target currency code.
        to: String,
        /// The requested date.
        date: NaiveDate,
    },

    /// A rate with the same unique key already exists.
    #[error("Exchange rate for {from}/{to} on {date} already exists")]
    RateAlreadyExists {
        /// Source currency code.
        from: String,
        /// Target currency code.
        to: String,
        /// The effective date.
        date: NaiveDate,
    },
}

impl FxError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::SameCurrency(_) => "SameCurrencyExchangeRateError",
            Self::NonPositiveRate => "NonPositiveExchangeRateError",
            Self::RateNotFound { .. } => "ExchangeRateNotFoundError",
            Self::RateAlreadyExists { .. } => "ExchangeRateAlreadyExistsError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::SameCurrency(_) | Self::NonPositiveRate => 400,
            Self::RateNotFound { .. } => 404,
            Self::RateAlreadyExists { .. } => 409,
        }
    }
}
