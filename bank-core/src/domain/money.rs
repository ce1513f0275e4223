//! Money value object
//!
//! Amounts are kept as signed integers in minor units (cents). Text parsing
//! and display go through `rust_decimal` so no float ever touches a balance.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::Error;

/// Number of fractional digits carried by minor units
pub const MINOR_UNIT_SCALE: u32 = 2;

/// A monetary amount in minor units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn minor(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Decimal view, e.g. 1234 -> 12.34
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("empty amount"));
        }

        let value = Decimal::from_str(trimmed)
            .map_err(|e| Error::validation(format!("invalid amount '{}': {}", trimmed, e)))?;

        if value.normalize().scale() > MINOR_UNIT_SCALE {
            return Err(Error::validation(format!(
                "amount '{}' has more than {} decimal places",
                trimmed, MINOR_UNIT_SCALE
            )));
        }

        let minor = value
            .checked_mul(Decimal::from(10i64.pow(MINOR_UNIT_SCALE)))
            .and_then(|d| d.to_i64())
            .ok_or_else(|| Error::validation(format!("amount '{}' is out of range", trimmed)))?;

        Ok(Money(minor))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}
