//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount with exactly two fractional digits.
///
/// All arithmetic is exact fixed-point decimal; repeated additions never
/// accumulate floating-point drift. Construction rescales the inner
/// [`Decimal`] to scale 2, so `75` becomes `75.00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

// Manual impl so deserialized values are rescaled like constructed ones.
impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Ok(Self::new(amount))
    }
}

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Fixed number of fractional digits.
    pub const SCALE: u32 = 2;

    /// Create a price from a decimal amount, rescaled to two digits.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        let mut amount = amount;
        amount.rescale(Self::SCALE);
        Self(amount)
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_major(units: i64) -> Self {
        Self::new(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Exact line total for this unit price at the given quantity.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Self {
        Self::new(self.0 * Decimal::from(quantity))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

// SQLx support (with postgres feature): stored as NUMERIC.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rescales_to_two_digits() {
        let price = Price::new(Decimal::from(89));
        assert_eq!(price.to_string(), "89.00");
    }

    #[test]
    fn test_line_total_exact() {
        let price = Price::new(Decimal::new(8900, 2)); // 89.00
        assert_eq!(price.line_total(3).to_string(), "267.00");
    }

    #[test]
    fn test_no_drift_across_repeated_additions() {
        // 0.10 added 1000 times must be exactly 100.00
        let dime = Price::new(Decimal::new(10, 2));
        let total: Price = std::iter::repeat_n(dime, 1000).sum();
        assert_eq!(total.to_string(), "100.00");
    }

    #[test]
    fn test_is_negative() {
        assert!(Price::from_major(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
        assert!(!Price::from_major(5).is_negative());
    }

    #[test]
    fn test_serde_accepts_numbers_and_strings() {
        let from_number: Price = serde_json::from_str("75").unwrap();
        let from_string: Price = serde_json::from_str("\"75.00\"").unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn test_serde_serializes_as_string() {
        let price = Price::from_major(120);
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"120.00\"");
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_major(1), Price::from_major(2)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_major(3));
    }
}
