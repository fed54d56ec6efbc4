//! Compile-time unit safety for feeder quantities.
//!
//! Fault location mixes lengths, currents and impedances in both physical and
//! per-unit form. Keeping kilometers, amperes and ohms in distinct newtypes stops
//! a fault resistance from being passed where a distance is expected, and makes
//! every conversion into per-unit explicit.
//!
//! All types use `#[repr(transparent)]`, so they share the memory layout of `f64`.
//!
//! # Usage
//!
//! ```
//! use overwatch_core::units::{Kilometers, Ohms};
//!
//! let d = Kilometers(5.0) + Kilometers(0.5);
//! let rf_pu = Ohms(3.48).to_per_unit(Ohms(34.848));
//!
//! // This would NOT compile - different units
//! // let wrong = d + Ohms(1.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Macro to implement common arithmetic operations for unit types
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Absolute value
            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Check if value is finite
            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// Maximum of two values
            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }
    };
}

// =============================================================================
// Length
// =============================================================================

/// Distance along the feeder in kilometers (km), measured from the source
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilometers(pub f64);

impl_unit_ops!(Kilometers, "km");

impl Kilometers {
    /// Convert to meters, the unit field crews report in
    #[inline]
    pub fn to_meters(self) -> f64 {
        self.0 * 1000.0
    }
}

// =============================================================================
// Current
// =============================================================================

/// Current magnitude in amperes (A)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Amperes(pub f64);

impl_unit_ops!(Amperes, "A");

// =============================================================================
// Impedance
// =============================================================================

/// Resistance or impedance magnitude in ohms (Ω)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Ohms(pub f64);

impl_unit_ops!(Ohms, "Ω");

impl Ohms {
    /// Convert to per-unit given the base impedance
    #[inline]
    pub fn to_per_unit(self, base: Ohms) -> f64 {
        if base.0.abs() < 1e-12 {
            0.0
        } else {
            self.0 / base.0
        }
    }
}

// =============================================================================
// Ratings
// =============================================================================

/// Voltage in kilovolts (kV)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilovolts(pub f64);

impl_unit_ops!(Kilovolts, "kV");

/// Apparent power in megavolt-amperes (MVA)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MegavoltAmperes(pub f64);

impl_unit_ops!(MegavoltAmperes, "MVA");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kilometer_arithmetic() {
        let a = Kilometers(3.0);
        let b = Kilometers(1.5);

        assert_eq!((a + b).value(), 4.5);
        assert_eq!((a - b).value(), 1.5);
        assert_eq!((a * 2.0).value(), 6.0);
        assert_eq!(a / b, 2.0);
        assert_eq!(Kilometers(0.25).to_meters(), 250.0);
    }

    #[test]
    fn test_ohms_per_unit() {
        let base = Ohms(34.848);
        assert!((Ohms(34.848).to_per_unit(base) - 1.0).abs() < 1e-12);
        assert_eq!(Ohms(5.0).to_per_unit(Ohms(0.0)), 0.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Kilometers(5.0)), "5.0000 km");
        assert_eq!(format!("{}", Amperes(218.7)), "218.7000 A");
        assert_eq!(format!("{}", Kilovolts(13.2)), "13.2000 kV");
    }
}
