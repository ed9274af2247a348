//! # Money Module
//!
//! Provides the `Money` type for prices and cart totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing float prices:                                                  │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    10 + 20 = 30 cents, printed as "0.30"                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices arrive from the client as JSON numbers or numeric strings and are
//! rounded to the nearest cent on the way in. Totals are checked sums, so an
//! out-of-range total is an error instead of a wrapped value.
//!
//! ## Usage
//! ```rust
//! use shelf_core::money::Money;
//!
//! let price = Money::parse("29.90").unwrap();
//! assert_eq!(price.cents(), 2990);
//! assert_eq!((price + price).to_string(), "59.80");
//! ```

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos).
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic never needs a special case for zero
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - Stored in the database as `price_cents INTEGER`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use shelf_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parses a decimal amount such as `"29.9"`, `"29.90"`, `"30"` or `".5"`.
    ///
    /// ## Rules
    /// - Optional leading sign
    /// - Digits past the second decimal round half away from zero
    /// - No exponents, separators or currency symbols
    ///
    /// Returns `None` when the text is not such an amount.
    ///
    /// ## Example
    /// ```rust
    /// use shelf_core::money::Money;
    ///
    /// assert_eq!(Money::parse("29.9"), Some(Money::from_cents(2990)));
    /// assert_eq!(Money::parse("-1.05"), Some(Money::from_cents(-105)));
    /// assert_eq!(Money::parse("1.999"), Some(Money::from_cents(200)));
    /// assert_eq!(Money::parse("abc"), None);
    /// ```
    pub fn parse(text: &str) -> Option<Money> {
        let text = text.trim();
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }

        let whole_cents = if whole.is_empty() {
            0
        } else {
            whole.parse::<i64>().ok()?.checked_mul(100)?
        };

        // "5" after the point means 50 cents, "05" means 5
        let (cent_digits, rest) = fraction.split_at(fraction.len().min(2));
        let mut fraction_cents = match cent_digits.len() {
            0 => 0,
            1 => cent_digits.parse::<i64>().ok()? * 10,
            _ => cent_digits.parse::<i64>().ok()?,
        };
        if rest.as_bytes().first().is_some_and(|digit| *digit >= b'5') {
            fraction_cents += 1;
        }

        let cents = whole_cents.checked_add(fraction_cents)?;
        Some(Money(if negative { -cents } else { cents }))
    }

    /// Rounds a decimal amount to the nearest cent.
    ///
    /// Returns `None` for NaN, infinities and values outside the `i64` range.
    ///
    /// ## Example
    /// ```rust
    /// use shelf_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(29.999), Some(Money::from_cents(3000)));
    /// assert_eq!(Money::from_decimal(1e-7), Some(Money::zero()));
    /// assert_eq!(Money::from_decimal(f64::NAN), None);
    /// ```
    pub fn from_decimal(value: f64) -> Option<Money> {
        let cents = (value * 100.0).round();
        // i64::MAX as f64 is 2^63, the first value that no longer fits
        if cents.is_finite() && cents.abs() < i64::MAX as f64 {
            Some(Money(cents as i64))
        } else {
            None
        }
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums amounts, returning `None` if the total overflows.
    ///
    /// ## Example
    /// ```rust
    /// use shelf_core::money::Money;
    ///
    /// let prices = [Money::from_cents(10), Money::from_cents(20)];
    /// assert_eq!(Money::checked_sum(prices), Some(Money::from_cents(30)));
    /// assert_eq!(Money::checked_sum([Money::from_cents(i64::MAX), Money::from_cents(1)]), None);
    /// ```
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), Money::checked_add)
    }

    /// The amount as a JSON-friendly decimal number (display only).
    #[inline]
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

/// Serializes money as a decimal number (`29.9`) for the browser client.
///
/// Used with `#[serde(serialize_with = "money::serialize_as_decimal")]`.
pub fn serialize_as_decimal<S>(money: &Money, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(money.as_decimal())
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Two-decimal format without a currency symbol: `59.80`, `-1.05`, `0.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_and_fraction() {
        assert_eq!(Money::parse("30"), Some(Money::from_cents(3000)));
        assert_eq!(Money::parse("29.9"), Some(Money::from_cents(2990)));
        assert_eq!(Money::parse("29.09"), Some(Money::from_cents(2909)));
        assert_eq!(Money::parse(".5"), Some(Money::from_cents(50)));
        assert_eq!(Money::parse("7."), Some(Money::from_cents(700)));
        assert_eq!(Money::parse(" 1.00 "), Some(Money::from_cents(100)));
        assert_eq!(Money::parse("0"), Some(Money::zero()));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Money::parse(""), None);
        assert_eq!(Money::parse("."), None);
        assert_eq!(Money::parse("1e3"), None);
        assert_eq!(Money::parse("1.2x"), None);
        assert_eq!(Money::parse("R$ 10"), None);
        assert_eq!(Money::parse("1,50"), None);
        assert_eq!(Money::parse("--1"), None);
        assert_eq!(Money::parse("99999999999999999999"), None);
    }

    #[test]
    fn test_parse_rounds_to_cents() {
        assert_eq!(Money::parse("29.999"), Some(Money::from_cents(3000)));
        assert_eq!(Money::parse("1.234"), Some(Money::from_cents(123)));
        assert_eq!(Money::parse("1.235"), Some(Money::from_cents(124)));
        assert_eq!(Money::parse("0.0000001"), Some(Money::zero()));
        assert_eq!(Money::parse("-2.005"), Some(Money::from_cents(-201)));
    }

    #[test]
    fn test_from_decimal_rounds_and_bounds() {
        assert_eq!(Money::from_decimal(29.9), Some(Money::from_cents(2990)));
        assert_eq!(Money::from_decimal(29.999), Some(Money::from_cents(3000)));
        assert_eq!(Money::from_decimal(1e3), Some(Money::from_cents(100_000)));
        assert_eq!(Money::from_decimal(1e-7), Some(Money::zero()));
        assert_eq!(Money::from_decimal(f64::INFINITY), None);
        assert_eq!(Money::from_decimal(f64::NAN), None);
        assert_eq!(Money::from_decimal(1e17), None);
    }

    #[test]
    fn test_parse_sign() {
        assert_eq!(Money::parse("-2.5"), Some(Money::from_cents(-250)));
        assert_eq!(Money::parse("+2.5"), Some(Money::from_cents(250)));
        assert!(Money::parse("-2.5").unwrap().is_negative());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-105).to_string(), "-1.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_sum_avoids_float_drift() {
        let prices = [Money::from_cents(10), Money::from_cents(20)];
        let total = Money::checked_sum(prices).unwrap();
        assert_eq!(total.to_string(), "0.30");
    }

    #[test]
    fn test_checked_sum_reports_overflow() {
        let half = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(half.checked_add(half), None);
        assert_eq!(Money::checked_sum([half, half]), None);
        assert_eq!(Money::checked_sum(std::iter::empty()), Some(Money::zero()));
    }

    #[test]
    fn test_serialize_as_decimal() {
        #[derive(Serialize)]
        struct Priced {
            #[serde(serialize_with = "serialize_as_decimal")]
            preco: Money,
        }

        let json = serde_json::to_string(&Priced {
            preco: Money::from_cents(2990),
        })
        .unwrap();
        assert_eq!(json, r#"{"preco":29.9}"#);
    }
}
