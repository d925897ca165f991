//! Money type with decimal precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision and tags
//! every amount with its ISO 4217 currency code. Arithmetic across different
//! currencies is rejected instead of silently coerced.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places used when converting between currencies.
pub const CONVERSION_SCALE: u32 = 4;

/// Errors produced by money arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Attempted arithmetic between two different currencies.
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch {
        /// Currency of the left operand.
        left: String,
        /// Currency of the right operand.
        right: String,
    },

    /// Attempted division by zero.
    #[error("Division by zero")]
    DivisionByZero,
}

/// Represents a monetary amount with currency.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
/// Equality requires both the amount (scale-normalized, `Decimal` semantics)
/// and the currency code to match; a zero amount keeps its currency tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The decimal amount.
    pub amount: Decimal,
    /// ISO 4217 currency code, uppercase (e.g., "USD", "EUR").
    pub currency: String,
}

impl Money {
    /// Creates a new Money instance, normalizing the currency to uppercase.
    #[must_use]
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_uppercase(),
        }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub fn zero(currency: &str) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Adds another amount in the same currency.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::CurrencyMismatch` if the currencies differ.
    pub fn add(&self, other: &Self) -> Result<Self, MoneyError> {
        self.require_same_currency(other)?;
        Ok(Self {
            amount: self.amount + other.amount,
            currency: self.currency.clone(),
        })
    }

    /// Subtracts another amount in the same currency.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::CurrencyMismatch` if the currencies differ.
    pub fn subtract(&self, other: &Self) -> Result<Self, MoneyError> {
        self.require_same_currency(other)?;
        Ok(Self {
            amount: self.amount - other.amount,
            currency: self.currency.clone(),
        })
    }

    /// Negates the amount, keeping the currency tag.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            amount: -self.amount,
            currency: self.currency.clone(),
        }
    }

    /// Multiplies by a scalar, preserving the currency.
    #[must_use]
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self {
            amount: self.amount * factor,
            currency: self.currency.clone(),
        }
    }

    /// Divides by a scalar, preserving the currency.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::DivisionByZero` if the divisor is zero.
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(Self {
            amount: self.amount / divisor,
            currency: self.currency.clone(),
        })
    }

    /// Converts to another currency using an explicit exchange rate.
    ///
    /// The result is rounded to 4 decimal places with Banker's Rounding
    /// (`MidpointNearestEven`).
    #[must_use]
    pub fn convert(&self, rate: Decimal, target_currency: &str) -> Self {
        Self::new(bankers_round(self.amount * rate, CONVERSION_SCALE), target_currency)
    }

    /// Rounds the amount to the given number of decimal places using
    /// Banker's Rounding.
    #[must_use]
    pub fn round(&self, decimal_places: u32) -> Self {
        Self {
            amount: bankers_round(self.amount, decimal_places),
            currency: self.currency.clone(),
        }
    }

    /// Compares two amounts in the same currency.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::CurrencyMismatch` if the currencies differ.
    pub fn compare(&self, other: &Self) -> Result<std::cmp::Ordering, MoneyError> {
        self.require_same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    fn require_same_currency(&self, other: &Self) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            })
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Rounds a decimal using Banker's Rounding (`MidpointNearestEven`).
///
/// - 2.5 → 2 (to nearest even)
/// - 3.5 → 4 (to nearest even)
/// - 2.25 → 2.2 (to nearest even at 1 decimal)
#[must_use]
pub fn bankers_round(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}
