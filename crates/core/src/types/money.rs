//! Monetary amounts using decimal arithmetic.
//!
//! Zentra sells in a single currency (BRL), so [`Money`] is a transparent
//! wrapper over [`Decimal`] rather than an amount/currency pair. Amounts are
//! stored in the currency's standard unit (reais, not centavos).

use core::iter::Sum;
use core::ops::{Add, AddAssign, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in BRL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from an integer number of centavos.
    #[must_use]
    pub fn from_centavos(centavos: i64) -> Self {
        Self(Decimal::new(centavos, 2))
    }

    /// Get the underlying decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line-item quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Whether this amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Format for display in pt-BR convention (e.g., `R$ 19,90`).
    #[must_use]
    pub fn display(&self) -> String {
        let formatted = format!("{:.2}", self.0);
        format!("R$ {}", formatted.replace('.', ","))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn times_scales_by_quantity() {
        let unit = Money::new(dec!(19.90));
        assert_eq!(unit.times(2), Money::new(dec!(39.80)));
        assert_eq!(unit.times(0), Money::ZERO);
    }

    #[test]
    fn sum_over_line_totals() {
        let total: Money = [Money::new(dec!(10.50)), Money::new(dec!(4.25))]
            .into_iter()
            .sum();
        assert_eq!(total, Money::new(dec!(14.75)));
    }

    #[test]
    fn display_uses_pt_br_convention() {
        assert_eq!(Money::new(dec!(19.9)).display(), "R$ 19,90");
        assert_eq!(Money::ZERO.display(), "R$ 0,00");
    }

    #[test]
    fn from_centavos() {
        assert_eq!(Money::from_centavos(1990), Money::new(dec!(19.90)));
    }
}
