//! Money types with precise decimal arithmetic
//!
//! The operator bills and reimburses exclusively in Brazilian reais, so
//! monetary values carry no currency tag. Amounts are fixed-point decimals
//! normalized to two fraction digits. Multiplying by a coverage rate
//! truncates toward zero to the cent: the plan never pays out the fraction
//! of a cent that rounding up would grant.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use thiserror::Error;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Subtraction would go negative: {minuend} - {subtrahend}")]
    NegativeResult {
        minuend: String,
        subtrahend: String,
    },
}

/// A monetary amount in Brazilian reais (BRL)
///
/// Construction normalizes to two decimal places by truncation, so a `Money`
/// value is always an exact number of cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a new Money value, truncating to the cent
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::ToZero))
    }

    /// Creates Money from an integer amount of cents
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// A zero amount
    pub fn zero() -> Self {
        Self(dec!(0))
    }

    /// Returns the amount as a decimal
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Applies a coverage rate, truncating toward zero to the cent
    ///
    /// This is the only multiplication the engine performs on money and its
    /// rounding mode is pinned by tests: `33.33 * 0.60 = 19.99`, never
    /// `20.00`.
    pub fn apply_rate(&self, rate: Rate) -> Money {
        Money::new(self.0 * rate.as_decimal())
    }

    /// Checked subtraction that refuses to go negative
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        if other.0 > self.0 {
            return Err(MoneyError::NegativeResult {
                minuend: self.to_string(),
                subtrahend: other.to_string(),
            });
        }
        Ok(Money(self.0 - other.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// A coverage percentage applied to requested amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.80 for 80%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a decimal value (e.g., 0.80 for 80%)
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate from a percentage (e.g., 80.0 for 80%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation_truncates() {
        let m = Money::new(dec!(100.509));
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_from_cents() {
        let m = Money::from_cents(10050);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(100.00));
        let b = Money::new(dec!(50.00));

        assert_eq!((a + b).amount(), dec!(150.00));
        assert_eq!((a - b).amount(), dec!(50.00));
    }

    #[test]
    fn test_apply_rate_truncates_to_cent() {
        // 33.33 * 0.60 = 19.998 -> 19.99, never rounded up
        let m = Money::new(dec!(33.33));
        assert_eq!(m.apply_rate(Rate::new(dec!(0.60))).amount(), dec!(19.99));

        // exact products stay exact
        let m = Money::new(dec!(400.00));
        assert_eq!(m.apply_rate(Rate::new(dec!(0.80))).amount(), dec!(320.00));
    }

    #[test]
    fn test_checked_sub_refuses_negative() {
        let a = Money::new(dec!(10.00));
        let b = Money::new(dec!(20.00));

        assert!(matches!(
            a.checked_sub(&b),
            Err(MoneyError::NegativeResult { .. })
        ));
        assert_eq!(b.checked_sub(&a).unwrap().amount(), dec!(10.00));
    }

    #[test]
    fn test_money_sum() {
        let total: Money = vec![
            Money::new(dec!(10.10)),
            Money::new(dec!(20.20)),
            Money::new(dec!(0.70)),
        ]
        .into_iter()
        .sum();
        assert_eq!(total.amount(), dec!(31.00));
    }

    #[test]
    fn test_rate_from_percentage() {
        let rate = Rate::from_percentage(dec!(80));
        assert_eq!(rate.as_decimal(), dec!(0.80));
        assert_eq!(rate.to_string(), "80%");
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(dec!(1234.5)).to_string(), "R$ 1234.50");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rate_application_never_exceeds_original(
            cents in 0i64..1_000_000_000i64,
            pct in 0u32..=100u32
        ) {
            let money = Money::from_cents(cents);
            let rate = Rate::from_percentage(Decimal::from(pct));
            let applied = money.apply_rate(rate);

            prop_assert!(applied <= money);
            // still an exact number of cents
            prop_assert_eq!(applied.amount().round_dp(2), applied.amount());
        }

        #[test]
        fn addition_is_commutative(
            a in 0i64..1_000_000i64,
            b in 0i64..1_000_000i64
        ) {
            let ma = Money::from_cents(a);
            let mb = Money::from_cents(b);
            prop_assert_eq!(ma + mb, mb + ma);
        }
    }
}
