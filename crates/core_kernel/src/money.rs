//! Money types with precise decimal arithmetic
//!
//! Household bills are denominated in a single currency, so `Money` carries
//! only an amount. Amounts are fixed-point decimals with at most two
//! fractional digits (cents), backed by rust_decimal to avoid floating-point
//! errors.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use thiserror::Error;

/// Number of fractional digits kept for every stored amount
pub const CENT_SCALE: u32 = 2;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount with cent precision
///
/// Values built through [`Money::try_new`] never carry more than two
/// fractional digits. Arithmetic is checked; the operator impls panic on
/// overflow and are intended for sums of already-validated amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    amount: Decimal,
}

impl Money {
    /// Creates a Money value, rejecting amounts finer than one cent
    pub fn try_new(amount: Decimal) -> Result<Self, MoneyError> {
        let normalized = amount.normalize();
        if normalized.scale() > CENT_SCALE {
            return Err(MoneyError::InvalidAmount(format!(
                "{} has more than {} fractional digits",
                amount, CENT_SCALE
            )));
        }
        Ok(Self {
            amount: with_cent_scale(normalized),
        })
    }

    /// Creates Money from an integer amount of cents
    pub fn from_minor(cents: i64) -> Self {
        Self {
            amount: Decimal::new(cents, CENT_SCALE),
        }
    }

    /// Creates a zero amount
    pub fn zero() -> Self {
        Self {
            amount: Decimal::new(0, CENT_SCALE),
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the amount in cents
    pub fn to_minor(&self) -> i128 {
        self.amount.mantissa()
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Checked addition
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.amount
            .checked_add(other.amount)
            .map(|amount| Self { amount })
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.amount
            .checked_sub(other.amount)
            .map(|amount| Self { amount })
            .ok_or(MoneyError::Overflow)
    }

    /// Divides the amount into `parts` equal shares, rounding the share to
    /// the cent with round-half-up
    ///
    /// The remainder is not redistributed: `share * parts` may differ from the
    /// original amount by up to half a cent per part, in either direction.
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_kernel::Money;
    ///
    /// let share = Money::from_minor(10_000).equal_share(3).unwrap();
    /// assert_eq!(share, Money::from_minor(3_333));
    /// ```
    pub fn equal_share(&self, parts: u32) -> Result<Money, MoneyError> {
        if parts == 0 {
            return Err(MoneyError::DivisionByZero);
        }
        let raw = self
            .amount
            .checked_div(Decimal::from(parts))
            .ok_or(MoneyError::Overflow)?;
        Ok(Self {
            amount: round_half_up(raw),
        })
    }
}

/// Rounds to cents, ties away from zero (half-up for positive amounts)
pub fn round_half_up(value: Decimal) -> Decimal {
    with_cent_scale(value.round_dp_with_strategy(CENT_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

fn with_cent_scale(mut value: Decimal) -> Decimal {
    // rescale only pads here; callers guarantee scale <= CENT_SCALE
    value.rescale(CENT_SCALE);
    value
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other).expect("Overflow in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other).expect("Overflow in Money::sub")
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Money::try_new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Decimal {
        money.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_creation() {
        let m = Money::try_new(dec!(100.5)).unwrap();
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.amount().scale(), 2);
    }

    #[test]
    fn test_money_rejects_sub_cent_amounts() {
        let result = Money::try_new(dec!(10.005));
        assert!(matches!(result, Err(MoneyError::InvalidAmount(_))));
    }

    #[test]
    fn test_money_accepts_trailing_zeros() {
        let m = Money::try_new(dec!(10.5000)).unwrap();
        assert_eq!(m, Money::from_minor(1050));
    }

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(10050);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.to_minor(), 10050);
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_minor(10000);
        let b = Money::from_minor(5000);

        assert_eq!((a + b).amount(), dec!(150.00));
        assert_eq!((a - b).amount(), dec!(50.00));
    }

    #[test]
    fn test_equal_share_keeps_rounding_gap() {
        let total = Money::from_minor(10000);
        let share = total.equal_share(3).unwrap();
        assert_eq!(share.amount(), dec!(33.33));

        let sum: Money = std::iter::repeat(share).take(3).sum();
        assert_eq!(sum.amount(), dec!(99.99));
    }

    #[test]
    fn test_equal_share_rounds_half_up() {
        // 0.05 / 2 = 0.025 -> 0.03
        let share = Money::from_minor(5).equal_share(2).unwrap();
        assert_eq!(share, Money::from_minor(3));

        // 100.00 / 6 = 16.666.. -> 16.67
        let share = Money::from_minor(10000).equal_share(6).unwrap();
        assert_eq!(share.amount(), dec!(16.67));
    }

    #[test]
    fn test_equal_share_by_zero() {
        let result = Money::from_minor(100).equal_share(0);
        assert_eq!(result, Err(MoneyError::DivisionByZero));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(123456).to_string(), "1234.56");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn equal_share_is_within_half_a_cent_per_part(
            cents in 1i64..1_000_000_000i64,
            parts in 1u32..100u32
        ) {
            let total = Money::from_minor(cents);
            let share = total.equal_share(parts).unwrap();

            prop_assert!(share.amount().scale() <= CENT_SCALE);
            let exact = total.amount() / Decimal::from(parts);
            prop_assert!((share.amount() - exact).abs() <= Decimal::new(5, 3));
        }

        #[test]
        fn money_addition_is_associative(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64,
            c in -1_000_000i64..1_000_000i64
        ) {
            let ma = Money::from_minor(a);
            let mb = Money::from_minor(b);
            let mc = Money::from_minor(c);

            prop_assert_eq!((ma + mb) + mc, ma + (mb + mc));
        }
    }
}
