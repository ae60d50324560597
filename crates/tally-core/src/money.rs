//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In the spreadsheet this system replaces:                               │
//! │    69 units × $5.00 shipping showed $344.99 on bad days                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    69 × 500 cents = 34500 cents, every single time                      │
//! │    Rounding happens exactly once, where a percentage is applied         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! // Create from cents (preferred)
//! let rate = Money::from_cents(500); // $5.00 per-unit shipping rate
//!
//! // Arithmetic operations
//! let shipping = rate * 69;                    // $345.00
//! let padded = shipping + Money::from_cents(50); // $345.50
//!
//! // NEVER do this:
//! // let bad = Money::from_float(5.00); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

use crate::types::Percent;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values; a sale where commission and
///   shipping exceed the subtotal produces a negative payable total, and we
///   surface that number instead of hiding it
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.unit_price_cents ──► LineItem.unit_price ──► line total       │
/// │                                                          │              │
/// │                                             subtotal ◄───┘              │
/// │                                                │                        │
/// │            shipping quote ◄── fee settings     │                        │
/// │                   │                            │                        │
/// │                   └──────────┬─────────────────┘                        │
/// │                              ▼                                          │
/// │          payable total = subtotal − shipping − commission + discount   │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let rate = Money::from_cents(1500); // Represents $15.00
    /// assert_eq!(rate.cents(), 1500);
    /// ```
    ///
    /// ## Why Cents?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The table store, calculations, and service layer all use cents.
    /// Only the UI converts to dollars for display.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let rate = Money::from_major_minor(15, 50); // $15.50
    /// assert_eq!(rate.cents(), 1550);
    ///
    /// let shortfall = Money::from_major_minor(-5, 50); // -$5.50
    /// assert_eq!(shortfall.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -$5.50, not -$4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        // Handle sign: if major is negative, minor should subtract
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let total = Money::from_cents(287550);
    /// assert_eq!(total.dollars(), 2875);
    /// ```
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let total = Money::from_cents(287550);
    /// assert_eq!(total.cents_part(), 50);
    ///
    /// let shortfall = Money::from_cents(-550);
    /// assert_eq!(shortfall.cents_part(), 50); // Absolute value
    /// ```
    #[inline]
    pub const fn cents_part(&self) -> i64 {
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

    /// Applies a percentage to this amount, rounding half up to whole cents.
    ///
    /// This is the ONLY place in the crate where a percentage meets money.
    /// Commission math, and anything else that takes a cut of an amount,
    /// must route through here so rounding happens exactly once.
    ///
    /// ## Implementation
    /// Integer math: `(amount_cents * bps + 5000) / 10000`
    /// The +5000 provides rounding (5000/10000 = 0.5)
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::types::Percent;
    ///
    /// let subtotal = Money::from_cents(339_000); // $3,390.00
    /// let rate = Percent::from_bps(500);         // 5%
    ///
    /// let commission = subtotal.apply_percent(rate);
    /// assert_eq!(commission.cents(), 16_950); // $169.50
    /// ```
    ///
    /// ## Rounding Behavior
    /// ```text
    /// $10.00 at 8.25% = $0.825  → $0.83  (half rounds up)
    /// $1.25  at 2.5%  = $0.03125 → $0.03 (below half rounds down)
    /// ```
    pub fn apply_percent(&self, rate: Percent) -> Money {
        // Use i128 to prevent overflow on large amounts
        // rate.bps() is basis points: 825 = 8.25%
        // Formula: (amount_cents * bps + 5000) / 10000
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }
}

// =============================================================================
// Decimal String Parsing
// =============================================================================

/// Error produced when a decimal string cannot become a monetary amount.
///
/// Settings values arrive from the table store as strings, and form input
/// arrives from the UI shell as strings. Both funnel through [`Money::from_str`]
/// so a typo fails loudly instead of becoming a silent zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMoneyError {
    /// Input was empty or contained non-numeric characters.
    #[error("'{0}' is not a valid amount")]
    Invalid(String),

    /// Input had more than two decimal places (sub-cent precision).
    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),

    /// Input overflowed the representable range.
    #[error("'{0}' is out of range")]
    OutOfRange(String),
}

/// Parses `s` as a fixed-point decimal with at most two fraction digits.
///
/// Returns the value in hundredths (cents for money, basis-point-hundredths
/// for percentages are NOT handled here; percent parsing scales separately).
/// `Ok(None)` means "too many decimal places" so callers can report that
/// case distinctly.
pub(crate) fn parse_decimal_hundredths(s: &str) -> Result<Option<i64>, ()> {
    let trimmed = s.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };

    // "5", "5.", ".5" are all accepted; "" and "." are not
    if whole.is_empty() && frac.is_empty() {
        return Err(());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(());
    }
    if frac.len() > 2 {
        return Ok(None);
    }

    let whole_part: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ())?
    };
    let frac_part: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| ())? * 10,
        _ => frac.parse().map_err(|_| ())?,
    };

    let hundredths = whole_part
        .checked_mul(100)
        .and_then(|v| v.checked_add(frac_part))
        .ok_or(())?;

    Ok(Some(if negative { -hundredths } else { hundredths }))
}

/// Parses a decimal dollar string ("15", "15.5", "15.50") into Money.
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
///
/// let rate: Money = "15.50".parse().unwrap();
/// assert_eq!(rate.cents(), 1550);
///
/// assert!("abc".parse::<Money>().is_err());
/// assert!("1.999".parse::<Money>().is_err());
/// ```
impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_decimal_hundredths(s) {
            Ok(Some(cents)) => Ok(Money(cents)),
            Ok(None) => Err(ParseMoneyError::TooPrecise(s.trim().to_string())),
            Err(()) => {
                // Distinguish overflow from garbage for error messages
                let t = s.trim();
                if t.parse::<f64>().is_ok() {
                    Err(ParseMoneyError::OutOfRange(t.to_string()))
                } else {
                    Err(ParseMoneyError::Invalid(t.to_string()))
                }
            }
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for audit strings and logs. Use frontend formatting for actual
/// UI display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Negation (for shortfall reporting).
impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summation (for folding line totals and report columns).
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
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
        let money = Money::from_cents(1550);
        assert_eq!(money.cents(), 1550);
        assert_eq!(money.dollars(), 15);
        assert_eq!(money.cents_part(), 50);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(15, 50);
        assert_eq!(money.cents(), 1550);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
        assert_eq!(format!("{}", Money::from_cents(287550)), "$2875.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = b * 69;
        assert_eq!(result.cents(), 34500);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_apply_percent_basic() {
        // $3,390.00 at 5% = $169.50
        let subtotal = Money::from_cents(339_000);
        let rate = Percent::from_bps(500);
        assert_eq!(subtotal.apply_percent(rate).cents(), 16_950);
    }

    #[test]
    fn test_apply_percent_rounds_half_up() {
        // $10.00 at 8.25% = $0.825 → $0.83
        let amount = Money::from_cents(1000);
        assert_eq!(amount.apply_percent(Percent::from_bps(825)).cents(), 83);

        // $1.25 at 2.5% = $0.03125 → $0.03
        let small = Money::from_cents(125);
        assert_eq!(small.apply_percent(Percent::from_bps(250)).cents(), 3);
    }

    #[test]
    fn test_apply_percent_zero_rate() {
        let subtotal = Money::from_cents(339_000);
        assert_eq!(subtotal.apply_percent(Percent::zero()).cents(), 0);
    }

    #[test]
    fn test_parse_whole_dollars() {
        assert_eq!("15".parse::<Money>().unwrap().cents(), 1500);
        assert_eq!("0".parse::<Money>().unwrap().cents(), 0);
        assert_eq!(" 15 ".parse::<Money>().unwrap().cents(), 1500);
    }

    #[test]
    fn test_parse_decimal_dollars() {
        assert_eq!("15.5".parse::<Money>().unwrap().cents(), 1550);
        assert_eq!("15.50".parse::<Money>().unwrap().cents(), 1550);
        assert_eq!(".5".parse::<Money>().unwrap().cents(), 50);
        assert_eq!("-3.25".parse::<Money>().unwrap().cents(), -325);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "abc".parse::<Money>(),
            Err(ParseMoneyError::Invalid(_))
        ));
        assert!(matches!("".parse::<Money>(), Err(ParseMoneyError::Invalid(_))));
        assert!(matches!(
            ".".parse::<Money>(),
            Err(ParseMoneyError::Invalid(_))
        ));
        assert!(matches!(
            "1,50".parse::<Money>(),
            Err(ParseMoneyError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_rejects_sub_cent_precision() {
        assert!(matches!(
            "1.999".parse::<Money>(),
            Err(ParseMoneyError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(!positive.is_zero());
        assert!(positive.is_positive());
        assert!(!positive.is_negative());

        let negative = Money::from_cents(-100);
        assert!(!negative.is_zero());
        assert!(!negative.is_positive());
        assert!(negative.is_negative());
    }
}
