//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, and the
//! `MinimumIncrement` that every receipt amount is rounded to.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE RECEIPT RECONCILIATION PROBLEM                                     │
//! │                                                                         │
//! │  A line of 3 units costs 101.00 in total:                               │
//! │    101.00 / 3 = 33.666...  → printed as 33.67 × 3 = 101.01  ❌          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                     │
//! │    10100 / 3 = 3366 remainder 2                                         │
//! │    → 33.66, 33.67, 33.67 = 101.00 exactly                              │
//! │    We KNOW the remainder, and hand it out explicitly                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use receipt_core::money::Money;
//!
//! // Create from minor units (preferred)
//! let price = Money::from_cents(1059); // 10.59
//!
//! // Or parse an exact decimal string coming from the host
//! let parsed = Money::parse_decimal("10.59").unwrap();
//! assert_eq!(price, parsed);
//!
//! // Arithmetic operations
//! let doubled = price * 2;                       // 21.18
//! let total = price + Money::from_cents(500);    // 15.59
//! assert_eq!(doubled.to_string(), "21.18");
//! assert_eq!(total.cents(), 1559);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (kopecks, cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Discounts and differences can go negative mid-calculation
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support, serialized as the integer minor-unit value
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  LineItem.row_total − LineItem.discount ──► nominal line total          │
/// │                                                  │                      │
/// │                          allocate_weighted ◄─────┘                      │
/// │                                  │                                      │
/// │                          allocate_even ──► ReceiptRow.price / .sum      │
/// │                                                                         │
/// │  Order.shipping_amount ──► shipping row ──► Recalculated.grand_sum()    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use receipt_core::money::Money;
    ///
    /// let price = Money::from_cents(1059); // Represents 10.59
    /// assert_eq!(price.cents(), 1059);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use receipt_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 59);
    /// assert_eq!(price.cents(), 1059);
    ///
    /// let negative = Money::from_major_minor(-5, 50);
    /// assert_eq!(negative.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Parses an exact decimal string such as `"10.59"`, `"-3.5"` or `"12"`.
    ///
    /// Fractional digits beyond the second are accepted only when they are
    /// zeros (`"10.5900"`), so no amount is ever silently rounded on input.
    ///
    /// ## Example
    /// ```rust
    /// use receipt_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("378.3").unwrap().cents(), 37830);
    /// assert_eq!(Money::parse_decimal("-0.05").unwrap().cents(), -5);
    /// assert!(Money::parse_decimal("10.599").is_err());
    /// assert!(Money::parse_decimal("ten").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> ValidationResult<Self> {
        let trimmed = input.trim();
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' {}", input, reason),
        };

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("is not a decimal number"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("is not a decimal number"));
        }

        let (kept, dropped) = fraction.split_at(fraction.len().min(2));
        if dropped.chars().any(|c| c != '0') {
            return Err(invalid("has more than two significant fractional digits"));
        }

        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("is out of range"))?
        };
        let minor: i64 = match kept.len() {
            0 => 0,
            1 => kept.parse::<i64>().map_err(|_| invalid("is out of range"))? * 10,
            _ => kept.parse().map_err(|_| invalid("is out of range"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("is out of range"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    ///
    /// ## Example
    /// ```rust
    /// use receipt_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1059).major(), 10);
    /// assert_eq!(Money::from_cents(-550).major(), -5);
    /// ```
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Checked addition. Returns `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use receipt_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1).checked_add(Money::from_cents(2)), Some(Money::from_cents(3)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    /// ```
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use receipt_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1836);
    /// assert_eq!(unit_price.multiply_quantity(12).cents(), 22032);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns true when the amount is a whole number of `increment`s.
    #[inline]
    pub const fn is_multiple_of(&self, increment: MinimumIncrement) -> bool {
        self.0 % increment.cents() == 0
    }

    /// Divides by a quantity, rounding half away from zero to the increment.
    ///
    /// Used for the display price of a row that keeps `quantity > 1`: the
    /// row's `sum` stays exact, only the shown unit price is rounded.
    ///
    /// ## Example
    /// ```rust
    /// use receipt_core::money::{MinimumIncrement, Money};
    ///
    /// let total = Money::from_cents(10100); // 101.00 over 3 units
    /// let price = total.round_div(3, MinimumIncrement::default());
    /// assert_eq!(price.cents(), 3367);
    /// ```
    pub fn round_div(&self, qty: i64, increment: MinimumIncrement) -> Money {
        if qty <= 0 {
            return *self;
        }

        let divisor = qty as i128 * increment.cents() as i128;
        let magnitude = (self.0 as i128).abs();
        let steps = (2 * magnitude + divisor) / (2 * divisor);
        let rounded = (steps * increment.cents() as i128) as i64;

        Money(if self.0 < 0 { -rounded } else { rounded })
    }

    /// Renders the amount as a plain decimal (`10.59`, `-5.50`).
    pub fn to_decimal_string(&self) -> String {
        self.to_string()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering, the form fiscal receipts print.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

/// Default money is zero.
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Minimum Increment
// =============================================================================

/// The smallest representable monetary step used as rounding granularity.
///
/// One minor unit (one kopeck, one cent) by default. Some cash registers
/// only print whole tens of minor units; those configure `10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct MinimumIncrement(i64);

impl MinimumIncrement {
    /// Creates an increment of `cents` minor units.
    ///
    /// ## Example
    /// ```rust
    /// use receipt_core::money::MinimumIncrement;
    ///
    /// assert!(MinimumIncrement::new(1).is_ok());
    /// assert!(MinimumIncrement::new(0).is_err());
    /// ```
    pub fn new(cents: i64) -> ValidationResult<Self> {
        if cents <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "minimum_increment".to_string(),
            });
        }
        Ok(MinimumIncrement(cents))
    }

    /// Returns the increment in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the increment as a `Money` amount.
    #[inline]
    pub const fn as_money(&self) -> Money {
        Money(self.0)
    }
}

impl Default for MinimumIncrement {
    fn default() -> Self {
        MinimumIncrement(1)
    }
}

impl TryFrom<i64> for MinimumIncrement {
    type Error = ValidationError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        MinimumIncrement::new(cents)
    }
}

impl From<MinimumIncrement> for i64 {
    fn from(increment: MinimumIncrement) -> Self {
        increment.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1059);
        assert_eq!(money.cents(), 1059);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 59);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1059).to_string(), "10.59");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("11691").unwrap().cents(), 1_169_100);
        assert_eq!(Money::parse_decimal("378.30").unwrap().cents(), 37830);
        assert_eq!(Money::parse_decimal("10.6").unwrap().cents(), 1060);
        assert_eq!(Money::parse_decimal(".5").unwrap().cents(), 50);
        assert_eq!(Money::parse_decimal("+1.00").unwrap().cents(), 100);
        assert_eq!(Money::parse_decimal("12.3400").unwrap().cents(), 1234);
        assert_eq!(Money::parse_decimal(" 7 ").unwrap().cents(), 700);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(Money::parse_decimal("").is_err());
        assert!(Money::parse_decimal("-").is_err());
        assert!(Money::parse_decimal(".").is_err());
        assert!(Money::parse_decimal("1e3").is_err());
        assert!(Money::parse_decimal("1.2.3").is_err());
        assert!(Money::parse_decimal("0.001").is_err());
        assert!(Money::parse_decimal("99999999999999999999").is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let mut c = a;
        c += b;
        c -= Money::from_cents(1);
        assert_eq!(c.cents(), 1499);
    }

    #[test]
    fn test_sum() {
        let amounts = vec![Money::from_cents(3366), Money::from_cents(3367), Money::from_cents(3367)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.cents(), 10100);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_round_div() {
        let inc = MinimumIncrement::default();
        assert_eq!(Money::from_cents(10100).round_div(3, inc).cents(), 3367);
        assert_eq!(Money::from_cents(10000).round_div(3, inc).cents(), 3333);
        assert_eq!(Money::from_cents(5).round_div(2, inc).cents(), 3);
        assert_eq!(Money::from_cents(-5).round_div(2, inc).cents(), -3);
        assert_eq!(Money::from_cents(1000).round_div(1, inc).cents(), 1000);

        let tens = MinimumIncrement::new(10).unwrap();
        assert_eq!(Money::from_cents(10100).round_div(3, tens).cents(), 3370);
    }

    #[test]
    fn test_multiple_of_increment() {
        let tens = MinimumIncrement::new(10).unwrap();
        assert!(Money::from_cents(1060).is_multiple_of(tens));
        assert!(!Money::from_cents(1059).is_multiple_of(tens));
        assert!(Money::from_cents(1059).is_multiple_of(MinimumIncrement::default()));
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    #[test]
    fn test_increment_serde() {
        let inc: MinimumIncrement = serde_json::from_str("10").unwrap();
        assert_eq!(inc.cents(), 10);
        assert_eq!(serde_json::to_string(&inc).unwrap(), "10");
        assert!(serde_json::from_str::<MinimumIncrement>("0").is_err());
    }
}
