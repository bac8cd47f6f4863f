//! Fixed-point percentages with two decimal places.
//!
//! Attendance figures are reported as two-decimal strings (`"66.67"`), and the
//! status thresholds compare against user-entered minimums like `75.00`. Holding
//! the value as whole hundredths keeps those comparisons exact.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// Hundredths per whole percent.
const SCALE: i64 = 100;

/// A percentage stored as hundredths of a percent (`75.00%` is `7500`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percentage(i64);

impl Percentage {
    pub const ZERO: Self = Self(0);
    pub const HUNDRED: Self = Self(100 * SCALE);

    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Convert a value read from a `NUMERIC(5,2)` column, rounding to the
    /// nearest hundredth.
    pub fn from_f64(value: f64) -> Self {
        Self((value * SCALE as f64).round() as i64)
    }

    /// `numerator * 100 / denominator`, rounded half-to-even to two decimals.
    ///
    /// Returns `None` when `denominator <= 0`; callers pick their own default
    /// for the empty case.
    pub fn from_ratio(numerator: i64, denominator: i64) -> Option<Self> {
        if denominator <= 0 {
            return None;
        }
        Some(Self(div_round_half_even(numerator * 100 * SCALE, denominator)))
    }
}

/// Integer division rounding half-to-even. `d` must be positive.
fn div_round_half_even(n: i64, d: i64) -> i64 {
    let q = n.div_euclid(d);
    let r = n.rem_euclid(d);
    match (2 * r).cmp(&d) {
        Ordering::Less => q,
        Ordering::Greater => q + 1,
        Ordering::Equal => {
            if q.rem_euclid(2) == 0 {
                q
            } else {
                q + 1
            }
        }
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{sign}{}.{:02}",
            abs / SCALE as u64,
            abs % SCALE as u64
        )
    }
}

/// Serialized as the two-decimal string (`"75.00"`).
impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
