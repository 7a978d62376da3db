//! Single-currency money in minor units.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Largest charge the provider accepts, in minor units.
pub const MAX_MINOR_UNITS: i64 = 99_999_999;

/// ISO-4217 currency code, stored lowercase as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "expected a three letter ISO code",
            ));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    pub fn usd() -> Self {
        Self("usd".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Currency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.0
    }
}

/// An amount of money in minor units (cents for USD).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    minor_units: i64,
    currency: Currency,
}

impl Money {
    /// Converts a caller-supplied major-unit amount (dollars) into minor units.
    ///
    /// The amount must be finite and positive; fractional cents are rounded
    /// to the nearest minor unit.
    pub fn from_major(amount: f64, currency: Currency) -> Result<Self, ValidationError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ValidationError::invalid_format(
                "amount",
                "must be a positive number",
            ));
        }
        let minor = (amount * 100.0).round();
        if minor < 1.0 || minor > MAX_MINOR_UNITS as f64 {
            return Err(ValidationError::out_of_range(
                "amount",
                1,
                MAX_MINOR_UNITS,
                minor as i64,
            ));
        }
        Ok(Self {
            minor_units: minor as i64,
            currency,
        })
    }

    /// Wraps an amount already expressed in minor units, as reported by the provider.
    pub fn from_minor(minor_units: i64, currency: Currency) -> Result<Self, ValidationError> {
        if minor_units < 0 {
            return Err(ValidationError::out_of_range(
                "amount",
                0,
                MAX_MINOR_UNITS,
                minor_units,
            ));
        }
        Ok(Self {
            minor_units,
            currency,
        })
    }

    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Whole major units (dollars), truncating any cents.
    pub fn major_units(&self) -> i64 {
        self.minor_units / 100
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.minor_units / 100,
            self.minor_units % 100,
            self.currency.as_str().to_uppercase()
        )
    }
}
