//! Exact rational money and percentage values.
//!
//! `Money` is an arbitrary-precision fraction. Prices and discount fractions
//! are combined with `add`/`subtract`/`multiply` only, so every intermediate
//! result stays exact. Rounding happens in exactly one place,
//! [`Money::to_minor_units`], and is reported to the caller.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Minor units per major unit (cents per dollar, and hundredths for percentages).
const MINOR_UNITS: i64 = 100;

/// Exact rational amount.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(BigRational);

impl ValueObject for Money {}

/// Result of converting an exact amount into integer minor units.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MinorUnits {
    /// The amount was a whole number of minor units; nothing was lost.
    Exact(i64),
    /// The amount had a fractional minor unit and was rounded to the nearest
    /// one (halves away from zero).
    Rounded(i64),
}

impl MinorUnits {
    pub fn value(self) -> i64 {
        match self {
            MinorUnits::Exact(v) | MinorUnits::Rounded(v) => v,
        }
    }

    pub fn is_exact(self) -> bool {
        matches!(self, MinorUnits::Exact(_))
    }
}

impl Money {
    /// `amount / 100`, e.g. `from_minor_units(10000)` is 100.00.
    pub fn from_minor_units(amount: i64) -> Self {
        Self(BigRational::new(BigInt::from(amount), BigInt::from(MINOR_UNITS)))
    }

    /// Percentage as a fraction: `percent(10)` is `10/100`.
    pub fn percent(percent: i64) -> Self {
        Self::from_minor_units(percent)
    }

    pub fn from_fraction(numerator: i64, denominator: i64) -> DomainResult<Self> {
        if denominator == 0 {
            return Err(DomainError::InvalidFraction);
        }
        Ok(Self(BigRational::new(
            BigInt::from(numerator),
            BigInt::from(denominator),
        )))
    }

    pub fn from_rational(value: BigRational) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn one() -> Self {
        Self(BigRational::one())
    }

    pub fn add(&self, other: &Money) -> Money {
        Money(&self.0 + &other.0)
    }

    pub fn subtract(&self, other: &Money) -> Money {
        Money(&self.0 - &other.0)
    }

    pub fn multiply(&self, other: &Money) -> Money {
        Money(&self.0 * &other.0)
    }

    /// Sign relative to zero.
    pub fn sign(&self) -> Ordering {
        if self.0.is_positive() {
            Ordering::Greater
        } else if self.0.is_negative() {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn numerator(&self) -> &BigInt {
        self.0.numer()
    }

    /// Always positive.
    pub fn denominator(&self) -> &BigInt {
        self.0.denom()
    }

    pub fn as_rational(&self) -> &BigRational {
        &self.0
    }

    /// Reduced `(numerator, denominator)` when both fit in an `i64`.
    pub fn to_i64_fraction(&self) -> Option<(i64, i64)> {
        Some((self.0.numer().to_i64()?, self.0.denom().to_i64()?))
    }

    /// Convert to integer minor units (cents), the only lossy operation on `Money`.
    ///
    /// Whole-cent amounts convert exactly. Anything else is rounded to the
    /// nearest cent, halves away from zero, and flagged as
    /// [`MinorUnits::Rounded`].
    pub fn to_minor_units(&self) -> DomainResult<MinorUnits> {
        let cents = &self.0 * BigRational::from_integer(BigInt::from(MINOR_UNITS));
        if cents.is_integer() {
            let value = cents
                .to_integer()
                .to_i64()
                .ok_or_else(|| DomainError::invalid_amount(format!("{self} does not fit in i64 minor units")))?;
            return Ok(MinorUnits::Exact(value));
        }

        let value = cents
            .round()
            .to_integer()
            .to_i64()
            .ok_or_else(|| DomainError::invalid_amount(format!("{self} does not fit in i64 minor units")))?;
        Ok(MinorUnits::Rounded(value))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    /// Accepts `"n/d"` or a plain integer `"n"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = BigRational::from_str(s.trim())
            .map_err(|e| DomainError::invalid_amount(format!("'{s}': {e}")))?;
        Ok(Self(value))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
