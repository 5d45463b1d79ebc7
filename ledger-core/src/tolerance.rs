//! Numeric tolerance for currency amounts
//!
//! Balances are exact decimals, but any policy that depends on the sign of a
//! balance (who pays, who is settled) goes through [`Tolerance`] so that
//! sub-cent dust never produces a transfer.

use crate::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Largest currency scale accepted
pub const MAX_SCALE: u32 = 8;

/// Settlement threshold and currency precision.
///
/// Always holds a positive epsilon and a scale of at most [`MAX_SCALE`];
/// construction and deserialization both reject anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ToleranceRecord", into = "ToleranceRecord")]
pub struct Tolerance {
    epsilon: Decimal,
    scale: u32,
}

/// Wire shape of a [`Tolerance`]; missing fields take the defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ToleranceRecord {
    epsilon: Decimal,
    scale: u32,
}

impl Default for ToleranceRecord {
    fn default() -> Self {
        Tolerance::default().into()
    }
}

impl TryFrom<ToleranceRecord> for Tolerance {
    type Error = Error;

    fn try_from(record: ToleranceRecord) -> Result<Self> {
        Tolerance::new(record.epsilon, record.scale)
    }
}

impl From<Tolerance> for ToleranceRecord {
    fn from(tolerance: Tolerance) -> Self {
        Self {
            epsilon: tolerance.epsilon,
            scale: tolerance.scale,
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            epsilon: Decimal::new(1, 2), // 0.01
            scale: 2,
        }
    }
}

impl Tolerance {
    /// Create new tolerance, rejecting a non-positive epsilon or a scale
    /// above [`MAX_SCALE`]
    pub fn new(epsilon: Decimal, scale: u32) -> Result<Self> {
        if epsilon <= Decimal::ZERO {
            return Err(Error::Config(format!(
                "epsilon must be positive, got {}",
                epsilon
            )));
        }

        if scale > MAX_SCALE {
            return Err(Error::Config(format!(
                "currency scale {} exceeds maximum {}",
                scale, MAX_SCALE
            )));
        }

        Ok(Self { epsilon, scale })
    }

    /// Magnitude below which a balance counts as settled
    pub fn epsilon(&self) -> Decimal {
        self.epsilon
    }

    /// Decimal places of the smallest currency unit
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Smallest currency unit (0.01 at scale 2)
    pub fn minor_unit(&self) -> Decimal {
        Decimal::new(1, self.scale)
    }

    /// |amount| < epsilon
    pub fn is_settled(&self, amount: Decimal) -> bool {
        amount.abs() < self.epsilon
    }

    /// Owes money to the group
    pub fn is_debtor(&self, amount: Decimal) -> bool {
        amount <= -self.epsilon
    }

    /// Is owed money by the group
    pub fn is_creditor(&self, amount: Decimal) -> bool {
        amount >= self.epsilon
    }

    /// Check that an amount is expressible in whole minor units
    pub fn fits_scale(&self, amount: Decimal) -> bool {
        amount.normalize().scale() <= self.scale
    }

    /// Split an amount into `parts` equal shares.
    ///
    /// Each share is truncated to the currency scale and the leftover minor
    /// units go one each to the leading shares, so the shares always sum to
    /// `amount` exactly and differ from each other by at most one unit.
    ///
    /// ```
    /// use ledger_core::Tolerance;
    /// use rust_decimal::Decimal;
    ///
    /// let shares = Tolerance::default().split_evenly(Decimal::new(100, 0), 3);
    /// assert_eq!(shares, vec![
    ///     Decimal::new(3334, 2),
    ///     Decimal::new(3333, 2),
    ///     Decimal::new(3333, 2),
    /// ]);
    /// ```
    pub fn split_evenly(&self, amount: Decimal, parts: usize) -> Vec<Decimal> {
        if parts == 0 {
            return Vec::new();
        }

        let count = Decimal::from(parts as u64);
        let unit = self.minor_unit();
        let base = (amount / count).round_dp_with_strategy(self.scale, RoundingStrategy::ToZero);

        let mut shares = vec![base; parts];
        let mut leftover = amount - base * count;

        for share in shares.iter_mut() {
            if leftover < unit {
                break;
            }
            *share += unit;
            leftover -= unit;
        }

        // Sub-unit dust only appears when the amount is finer than the scale
        if !leftover.is_zero() {
            shares[0] += leftover;
        }

        shares
    }
}
