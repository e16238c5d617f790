use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An amount in minor currency units (cents). Kept as an integer so sums
/// compare exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Invalid amount: {0}")]
    Invalid(String),
    #[error("Amount out of range: {0}")]
    OutOfRange(String),
}

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub fn to_cents(self) -> i64 {
        self.0
    }

    pub fn zero() -> Self {
        Money(0)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

/// Renders major units with two decimals and no currency symbol, the form
/// used in exported reports.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_decimal())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        Money(iter.map(|m| m.0).sum())
    }
}

/// Parses a decimal amount in major units ("1,234.56", "$5", "0.01") into
/// cents, rounding half away from zero past the second decimal.
pub fn parse_amount(s: &str) -> Result<Money, AmountError> {
    let cleaned = s.trim().replace([',', '$', ' '], "");
    let dec = Decimal::from_str(&cleaned).map_err(|_| AmountError::Invalid(s.trim().to_string()))?;
    let cents = dec
        .checked_mul(Decimal::from(100))
        .ok_or_else(|| AmountError::OutOfRange(s.trim().to_string()))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| AmountError::OutOfRange(s.trim().to_string()))?;
    Ok(Money(cents))
}

impl FromStr for Money {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_amount(s)
    }
}
