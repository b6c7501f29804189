//! Amount type for handling non-negative CHF values.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include a `CHF` prefix and thousands separators.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// The currency every amount is recorded in.
pub const CURRENCY: &str = "CHF";

/// The largest amount accepted, in whole francs. Sums over any realistic number of records stay
/// far below the range of `Decimal`, so adding amounts cannot overflow.
pub const MAX_FRANCS: i64 = 1_000_000_000_000;

/// Represents a CHF amount with two-decimal precision. An `Amount` is never negative.
///
/// `Display` produces the persisted form, e.g. `1234.50`. Use `Amount::chf` for the human
/// readable form.
///
/// # Examples
///
/// ```
/// # use vehicle_costs::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("CHF 1'234.5").unwrap();
/// assert_eq!(amount.to_string(), "1234.50");
/// assert_eq!(amount.chf(), "CHF 1,234.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates an `Amount`, rounding to two decimals. Fails if `value` is negative or larger
    /// than `MAX_FRANCS`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        let rounded = value.round_dp(2);
        if rounded.is_zero() {
            return Ok(Amount::ZERO);
        }
        if rounded.is_sign_negative() {
            return Err(AmountError::Negative(value));
        }
        if rounded > Decimal::from(MAX_FRANCS) {
            return Err(AmountError::TooLarge(value));
        }
        Ok(Self(rounded))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Formats the amount for people, with currency and thousands separators: `CHF 1,234.50`.
    pub fn chf(&self) -> String {
        format!(
            "{CURRENCY} {}",
            format_num::format_num!(",.2", self.0.to_f64().unwrap_or_default())
        )
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub enum AmountError {
    Parse(rust_decimal::Error),
    Negative(Decimal),
    TooLarge(Decimal),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Parse(e) => Debug::fmt(e, f),
            AmountError::Negative(d) => write!(f, "Negative({d})"),
            AmountError::TooLarge(d) => write!(f, "TooLarge({d})"),
        }
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Parse(e) => Display::fmt(e, f),
            AmountError::Negative(d) => write!(f, "An amount cannot be negative, got {d}"),
            AmountError::TooLarge(d) => {
                write!(f, "An amount cannot exceed {CURRENCY} {MAX_FRANCS}, got {d}")
            }
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AmountError::Parse(e) => Some(e),
            AmountError::Negative(_) | AmountError::TooLarge(_) => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let without_currency = trimmed
            .strip_prefix(CURRENCY)
            .map(str::trim_start)
            .unwrap_or(trimmed);

        // Empty cells are zero
        if without_currency.is_empty() {
            return Ok(Amount::ZERO);
        }

        // Both ',' and the Swiss apostrophe are used as thousands separators
        let digits: String = without_currency
            .chars()
            .filter(|c| *c != ',' && *c != '\'' && *c != '’')
            .collect();

        let value = Decimal::from_str(&digits).map_err(AmountError::Parse)?;
        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
