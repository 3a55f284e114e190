//! Sales amounts.
//!
//! Amounts are finite `f64` values. Parsing rejects `NaN` and infinities, and
//! addition is checked so that no ledger operation can ever produce one.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing an [`Amount`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseAmountError {
    /// Not a number at all
    #[error("'{value}' is not a number: {source}")]
    Invalid {
        value: String,
        source: ParseFloatError,
    },

    /// `NaN` or an infinity, or a literal too large for `f64`
    #[error("'{0}' is not a finite amount")]
    NotFinite(String),
}

/// A sales amount.
///
/// Any finite real value is accepted, negative ones included. Values print in
/// the shortest form that parses back to the same amount, switching to
/// exponent notation for very large or very small magnitudes.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use sales_ledger::Amount;
///
/// let a = Amount::from_str("50.0").unwrap();
/// let b = a.checked_add(Amount::from_str("25").unwrap()).unwrap();
/// assert_eq!(b.to_string(), "75.0");
/// assert_eq!(Amount::from_str("1.0E30").unwrap().to_string(), "1e30");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Amount(f64);

impl Amount {
    /// Zero value.
    pub const ZERO: Self = Amount(0.0);

    /// Wraps `value`, or returns `None` if it is `NaN` or infinite.
    pub fn from_f64(value: f64) -> Option<Self> {
        value.is_finite().then_some(Amount(value))
    }

    /// Adds two amounts, or returns `None` if the sum leaves the `f64` range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Amount::from_f64(self.0 + rhs.0)
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = f64::from_str(trimmed).map_err(|source| ParseAmountError::Invalid {
            value: trimmed.to_string(),
            source,
        })?;
        Amount::from_f64(value).ok_or_else(|| ParseAmountError::NotFinite(trimmed.to_string()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug keeps a trailing ".0" and uses exponents at the extremes.
        write!(f, "{:?}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}
