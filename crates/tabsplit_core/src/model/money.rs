//! Exact two-decimal money representation.
//!
//! # Responsibility
//! - Represent all monetary amounts as integer minor units (cents).
//! - Parse and render decimal strings without binary floating-point drift.
//!
//! # Invariants
//! - Arithmetic is plain integer arithmetic; a cent is never lost or gained
//!   by representation alone.
//! - Wire form is always a two-decimal string (`"12.34"`).

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Monetary amount in minor units (cents) of a single two-decimal currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Money(i64);

/// Parse error for decimal money strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyParseError {
    pub value: String,
}

impl Display for MoneyParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid money amount `{}`; expected a decimal with at most two fraction digits",
            self.value
        )
    }
}

impl Error for MoneyParseError {}

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates an amount from raw minor units.
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates an amount from whole currency units.
    pub const fn from_major(units: i64) -> Self {
        Money(units * 100)
    }

    /// Returns the amount in minor units.
    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute difference in cents between two amounts.
    pub const fn abs_diff_cents(self, other: Money) -> i64 {
        (self.0 - other.0).abs()
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        Money(iter.map(|amount| amount.0).sum())
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    /// Parses `"12"`, `"12.5"` or `"12.34"`, with an optional leading sign.
    ///
    /// Rejects more than two fraction digits instead of rounding, so callers
    /// never feed sub-cent precision into the core silently.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || MoneyParseError {
            value: s.to_string(),
        };

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if unsigned.is_empty() {
            return Err(err());
        }

        let (whole_part, fraction_part) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };
        if whole_part.is_empty() && fraction_part.is_empty() {
            return Err(err());
        }
        if fraction_part.len() > 2 {
            return Err(err());
        }

        let whole: i64 = if whole_part.is_empty() {
            0
        } else {
            whole_part.parse().map_err(|_| err())?
        };
        let fraction: i64 = if fraction_part.is_empty() {
            0
        } else {
            let padded = format!("{fraction_part:0<2}");
            padded.parse().map_err(|_| err())?
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|value| value.checked_add(fraction))
            .ok_or_else(err)?;
        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|_| {
            D::Error::invalid_value(
                serde::de::Unexpected::Str(&raw),
                &"a decimal amount with at most two fraction digits",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Money;

    #[test]
    fn parses_common_decimal_forms() {
        assert_eq!("12".parse::<Money>().unwrap(), Money::from_cents(1200));
        assert_eq!("12.5".parse::<Money>().unwrap(), Money::from_cents(1250));
        assert_eq!("12.34".parse::<Money>().unwrap(), Money::from_cents(1234));
        assert_eq!("0.07".parse::<Money>().unwrap(), Money::from_cents(7));
        assert_eq!("-3.10".parse::<Money>().unwrap(), Money::from_cents(-310));
        assert_eq!(".5".parse::<Money>().unwrap(), Money::from_cents(50));
    }

    #[test]
    fn rejects_sub_cent_precision_and_garbage() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
        assert!("12,34".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn displays_two_fraction_digits() {
        assert_eq!(Money::from_cents(1200).to_string(), "12.00");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
        assert_eq!(Money::from_cents(-310).to_string(), "-3.10");
    }

    #[test]
    fn serde_round_trips_as_decimal_string() {
        let json = serde_json::to_string(&Money::from_cents(2080)).unwrap();
        assert_eq!(json, "\"20.80\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Money::from_cents(2080));
    }
}
