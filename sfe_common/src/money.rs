use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

//--------------------------------------       Money        ----------------------------------------------------------

/// A fixed-point monetary amount, stored as an integer number of cents (2 decimal places).
///
/// All prices, line costs and balances in the storefront are represented with this type. It deliberately does not
/// implement any conversion from floating point values; currency must never pass through a binary float.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a money amount: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {} is too large to convert to Money", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    /// Parses a decimal string such as `"199.90"`, `"42"` or `"-0.5"` into a [`Money`] value.
    /// At most two decimal places are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, frac) = match unsigned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (unsigned, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(MoneyConversionError(format!("'{s}' is not a decimal amount")));
        }
        if frac.len() > 2 {
            return Err(MoneyConversionError(format!("'{s}' has more than two decimal places")));
        }
        // Both parts must be bare digit runs; an embedded sign would otherwise parse as a signed integer.
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(MoneyConversionError(format!("'{s}' is not a decimal amount")));
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| MoneyConversionError(format!("'{s}' is not a decimal amount")))?
        };
        let cents: i64 = if frac.is_empty() {
            0
        } else {
            let digits: i64 = frac.parse().map_err(|_| MoneyConversionError(format!("'{s}' is not a decimal amount")))?;
            if frac.len() == 1 {
                digits * 10
            } else {
                digits
            }
        };
        let value = whole * 100 + cents;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl Money {
    /// The raw value in cents.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Builds a [`Money`] amount from a whole number of currency units.
    pub fn from_whole(units: i64) -> Self {
        Self(units * 100)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}
