//! # Unit Types
//!
//! Type-safe wrappers for the units the weight model works in. These provide
//! compile-time safety against unit confusion while remaining lightweight
//! (just f64 wrappers).
//!
//! ## Design Philosophy
//!
//! We use simple newtype wrappers rather than a full units library because:
//! - The weight model uses a small, fixed set of metric units
//! - We want JSON serialization to be clean (just numbers)
//! - Minimal runtime overhead
//!
//! Stock lengths and cross-section dimensions are entered in millimeters
//! (that is what material suppliers quote); the closed-form formulas work in
//! meters and kg/m³, so the mm → m conversion lives here and nowhere else.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::units::{Millimeters, Meters};
//!
//! let length = Millimeters(3000.0);
//! let length_m: Meters = length.into();
//! assert_eq!(length_m.0, 3.0);
//! ```

use serde::{Deserialize, Serialize};

/// Length in millimeters (supplier-facing unit)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in meters (formula-facing unit)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

/// Linear mass of a standardized profile (kg per meter of stock)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KgPerMeter(pub f64);

impl KgPerMeter {
    /// Mass of a piece of the given length.
    pub fn for_length(self, length: Millimeters) -> Kilograms {
        let m: Meters = length.into();
        Kilograms(self.0 * m.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mm_to_m() {
        let m: Meters = Millimeters(2500.0).into();
        assert_eq!(m.0, 2.5);

        let mm: Millimeters = Meters(0.04).into();
        assert!((mm.0 - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_kg_per_meter() {
        let kg = KgPerMeter(10.6).for_length(Millimeters(3000.0));
        assert!((kg.0 - 31.8).abs() < 1e-9);
    }
}
