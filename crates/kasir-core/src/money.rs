//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  OUR SOLUTION: Integer minor units                                  │
//! │    Every price, subtotal and total in the system is an i64 count    │
//! │    of the smallest currency unit (whole rupiah for this catalog).   │
//! │                                                                     │
//! │  The one deliberate exception: weighed goods. A line priced per kg  │
//! │  and sold at 1.5 kg multiplies Money by an f64 weight, rounding     │
//! │  half away from zero back to an integer immediately.                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for adjustments and change math
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Transparent serde**: serializes as a bare JSON number, matching the
///   wire format the catalog and transaction endpoints expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor currency units.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let price = Money::from_minor(20_000);
    /// assert_eq!(price.minor(), 20_000);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor currency units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a discrete quantity.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(2_500);
    /// assert_eq!(unit_price.multiply_quantity(3).minor(), 7_500);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies a per-kilogram price by a weight.
    ///
    /// The product is rounded half away from zero to the nearest minor unit.
    /// This is computed once, at sale time, and the rounded result is what
    /// gets snapshotted into the line item - it is never recomputed.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let per_kg = Money::from_minor(20_000);
    /// assert_eq!(per_kg.multiply_weight(1.5).minor(), 30_000);
    /// ```
    pub fn multiply_weight(&self, weight_kg: f64) -> Self {
        Money((self.0 as f64 * weight_kg).round() as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. API responses carry the raw number.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp{}", sign, self.0.abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(20_000);
        assert_eq!(money.minor(), 20_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_minor(20_000)), "Rp20000");
        assert_eq!(format!("{}", Money::from_minor(-550)), "-Rp550");
        assert_eq!(format!("{}", Money::from_minor(0)), "Rp0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1_000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1_500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3_000);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_minor(2_500);
        assert_eq!(unit_price.multiply_quantity(3).minor(), 7_500);
    }

    #[test]
    fn test_multiply_weight_exact() {
        // Rp20000/kg x 1.5 kg = Rp30000
        let per_kg = Money::from_minor(20_000);
        assert_eq!(per_kg.multiply_weight(1.5).minor(), 30_000);
    }

    #[test]
    fn test_multiply_weight_rounds_to_minor_unit() {
        // Rp3333/kg x 0.1 kg = 333.3 -> rounds to 333
        let per_kg = Money::from_minor(3_333);
        assert_eq!(per_kg.multiply_weight(0.1).minor(), 333);

        // Rp15000/kg x 0.25 kg = 3750 exactly
        let per_kg = Money::from_minor(15_000);
        assert_eq!(per_kg.multiply_weight(0.25).minor(), 3_750);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_negative());
        assert!(Money::from_minor(-100).is_negative());
    }

    #[test]
    fn test_serde_is_transparent_number() {
        let money = Money::from_minor(20_000);
        assert_eq!(serde_json::to_string(&money).unwrap(), "20000");

        let parsed: Money = serde_json::from_str("30000").unwrap();
        assert_eq!(parsed, Money::from_minor(30_000));
    }
}
