//! Money value object.
//!
//! Amounts are exact decimals in rupees. Arithmetic never rounds; rounding to
//! two places happens only when an amount is displayed.

use core::iter::Sum;
use core::ops::{Add, AddAssign, Neg, Sub};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Currency symbol printed in front of formatted amounts.
pub const CURRENCY_SYMBOL: &str = "₹";

/// A rupee amount. May be negative (e.g. a line whose discount exceeds its base).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// `self * quantity`.
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// `self * rate / 100`, unrounded.
    pub fn percent(self, rate: Decimal) -> Self {
        Self(self.0 * rate / Decimal::ONE_HUNDRED)
    }

    /// Display rounding: two places, halves away from zero, no negative zero.
    pub fn rounded(&self) -> Decimal {
        let r = self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if r.is_zero() { Decimal::ZERO } else { r }
    }

    /// Two-decimal rendering without the currency symbol (`1234.50`).
    pub fn fixed2(&self) -> String {
        format!("{:.2}", self.rounded())
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}", CURRENCY_SYMBOL, self.fixed2())
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

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}
