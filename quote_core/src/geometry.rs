//! # Shape Geometry Resolver
//!
//! Maps a shape descriptor plus a piece length to a weight in kilograms.
//! Two resolution paths exist:
//!
//! - **Simple formula**: common stock shapes (bars, tubes, sheet) whose
//!   cross-section area has a closed form; weight = area × length × density.
//! - **Profile table**: standardized structural sections (channels, beams)
//!   whose true mass-per-length cannot be derived from simple geometry and is
//!   instead carried on the descriptor as a `kg_per_meter` dimension.
//!
//! The resolver is a total function: missing shapes, unknown dimension keys
//! and unparseable numbers all yield a weight of 0 rather than an error, so a
//! half-filled row never breaks the running totals.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::geometry::ShapeDescriptor;
//!
//! let bar = ShapeDescriptor::simple("round_bar")
//!     .with_dimension("diameter", "20");
//!
//! // 1 m of 20 mm round bar in mild steel
//! let kg = bar.weight_kg(1000.0);
//! assert!((kg - 2.466).abs() < 0.001);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::units::{Meters, Millimeters};

/// Density used when a material grade is unknown or unspecified (mild steel)
pub const DEFAULT_DENSITY_KG_M3: f64 = 7850.0;

/// Fixed density table, kg/m³, keyed by lowercase material grade.
///
/// Lookups are case-insensitive; anything not listed falls back to
/// [`DEFAULT_DENSITY_KG_M3`].
static DENSITIES: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("s235", 7850.0),
        ("s355", 7850.0),
        ("c45", 7850.0),
        ("42crmo4", 7850.0),
        ("stainless", 8000.0),
        ("1.4301", 8000.0),
        ("1.4404", 8000.0),
        ("aluminium", 2700.0),
        ("aluminum", 2700.0),
        ("brass", 8500.0),
        ("copper", 8960.0),
        ("bronze", 8800.0),
        ("titanium", 4500.0),
        ("cast iron", 7200.0),
        ("pom", 1410.0),
        ("pe", 950.0),
        ("pa6", 1140.0),
    ])
});

/// Look up a material grade density, case-insensitively.
pub fn density_for_grade(grade: &str) -> f64 {
    DENSITIES
        .get(grade.trim().to_lowercase().as_str())
        .copied()
        .unwrap_or(DEFAULT_DENSITY_KG_M3)
}

/// How a descriptor's weight is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Closed-form cross-section formula plus a density lookup
    SimpleFormula,
    /// Standardized section with a per-meter weight carried in the dimensions
    ProfileTable,
}

/// Cross-section geometry of a piece of raw stock.
///
/// `dimensions` is a string → string map because the values arrive as user
/// input; each formula parses what it needs and treats anything unparseable
/// as 0. For `ProfileTable` descriptors the only meaningful key is
/// `kg_per_meter`.
///
/// ## JSON Example
///
/// ```json
/// {
///   "kind": "SimpleFormula",
///   "shape_name": "rectangular_tube",
///   "dimensions": { "width": "40", "height": "20", "wall_thickness": "2", "grade": "S235" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    /// Resolution path for this shape
    pub kind: ShapeKind,

    /// Shape identifier (e.g., "round_bar", "UPN 100"); matched
    /// case-insensitively for simple formulas
    pub shape_name: String,

    /// Dimension values in millimeters, string-encoded, plus the optional
    /// `grade` key used for the density lookup
    pub dimensions: BTreeMap<String, String>,
}

impl ShapeDescriptor {
    /// Create a simple-formula descriptor with no dimensions yet.
    pub fn simple(shape_name: impl Into<String>) -> Self {
        ShapeDescriptor {
            kind: ShapeKind::SimpleFormula,
            shape_name: shape_name.into(),
            dimensions: BTreeMap::new(),
        }
    }

    /// Create a profile-table descriptor with the given per-meter weight.
    pub fn profile(shape_name: impl Into<String>, kg_per_meter: impl Into<String>) -> Self {
        ShapeDescriptor {
            kind: ShapeKind::ProfileTable,
            shape_name: shape_name.into(),
            dimensions: BTreeMap::from([("kg_per_meter".to_string(), kg_per_meter.into())]),
        }
    }

    /// Builder-style dimension setter.
    pub fn with_dimension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(key.into(), value.into());
        self
    }

    /// Parse a dimension value; missing or unparseable values read as 0.
    fn dim(&self, key: &str) -> f64 {
        self.dimensions
            .get(key)
            .and_then(|v| v.trim().replace(',', ".").parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    /// A dimension in millimeters converted to meters.
    fn dim_m(&self, key: &str) -> f64 {
        let m: Meters = Millimeters(self.dim(key)).into();
        m.0
    }

    /// Weight in kilograms of a piece of the given length in millimeters.
    ///
    /// Total over all inputs: unknown shapes, missing dimensions and
    /// unparseable numbers contribute 0, never an error.
    pub fn weight_kg(&self, length_mm: f64) -> f64 {
        if length_mm <= 0.0 {
            return 0.0;
        }
        let length_m: Meters = Millimeters(length_mm).into();
        match self.kind {
            ShapeKind::ProfileTable => self.dim("kg_per_meter") * length_m.0,
            ShapeKind::SimpleFormula => {
                let density = match self.dimensions.get("grade") {
                    Some(grade) => density_for_grade(grade),
                    None => DEFAULT_DENSITY_KG_M3,
                };
                self.cross_section_m2() * length_m.0 * density
            }
        }
    }

    /// Cross-section area in m² for simple-formula shapes.
    ///
    /// Unknown shape names and underspecified dimensions yield 0.
    fn cross_section_m2(&self) -> f64 {
        match Shape::from_name(&self.shape_name) {
            Some(Shape::RoundBar) => {
                let r = self.dim_m("diameter") / 2.0;
                PI * r * r
            }
            Some(Shape::SquareBar) => {
                let side = self.dim_m("side");
                side * side
            }
            Some(Shape::RectangularBar) => self.dim_m("width") * self.dim_m("height"),
            Some(Shape::HexBar) => {
                // Across-flats distance d: A = (3√3/2)·(d/2)²
                let half = self.dim_m("diameter") / 2.0;
                1.5 * 3.0_f64.sqrt() * half * half
            }
            Some(Shape::RoundTube) => {
                let r_out = self.dim_m("diameter") / 2.0;
                let r_in = (r_out - self.dim_m("wall_thickness")).max(0.0);
                PI * (r_out * r_out - r_in * r_in)
            }
            Some(Shape::SquareTube) => {
                let outer = self.dim_m("side");
                let inner = (outer - 2.0 * self.dim_m("wall_thickness")).max(0.0);
                outer * outer - inner * inner
            }
            Some(Shape::RectangularTube) => {
                let w = self.dim_m("width");
                let h = self.dim_m("height");
                let t = self.dim_m("wall_thickness");
                let inner = ((w - 2.0 * t).max(0.0)) * ((h - 2.0 * t).max(0.0));
                w * h - inner
            }
            Some(Shape::Sheet) => self.dim_m("thickness") * self.dim_m("width"),
            None => 0.0,
        }
    }
}

/// Stock shapes with closed-form cross sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    RoundBar,
    SquareBar,
    RectangularBar,
    HexBar,
    RoundTube,
    SquareTube,
    RectangularTube,
    Sheet,
}

impl Shape {
    /// All simple shapes for iteration (e.g., picker population)
    pub const ALL: [Shape; 8] = [
        Shape::RoundBar,
        Shape::SquareBar,
        Shape::RectangularBar,
        Shape::HexBar,
        Shape::RoundTube,
        Shape::SquareTube,
        Shape::RectangularTube,
        Shape::Sheet,
    ];

    /// Parse a shape name, case-insensitively.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "round_bar" | "round bar" => Some(Shape::RoundBar),
            "square_bar" | "square bar" => Some(Shape::SquareBar),
            "rectangular_bar" | "rectangular bar" | "flat_bar" | "flat bar" => {
                Some(Shape::RectangularBar)
            }
            "hex_bar" | "hex bar" | "hexagonal_bar" => Some(Shape::HexBar),
            "round_tube" | "round tube" => Some(Shape::RoundTube),
            "square_tube" | "square tube" => Some(Shape::SquareTube),
            "rectangular_tube" | "rectangular tube" => Some(Shape::RectangularTube),
            "sheet" | "plate" => Some(Shape::Sheet),
            _ => None,
        }
    }

    /// Canonical shape name used in descriptors
    pub fn name(&self) -> &'static str {
        match self {
            Shape::RoundBar => "round_bar",
            Shape::SquareBar => "square_bar",
            Shape::RectangularBar => "rectangular_bar",
            Shape::HexBar => "hex_bar",
            Shape::RoundTube => "round_tube",
            Shape::SquareTube => "square_tube",
            Shape::RectangularTube => "rectangular_tube",
            Shape::Sheet => "sheet",
        }
    }

    /// Dimension keys this shape's formula reads, in display order
    pub fn dimension_keys(&self) -> &'static [&'static str] {
        match self {
            Shape::RoundBar | Shape::HexBar => &["diameter"],
            Shape::SquareBar => &["side"],
            Shape::RectangularBar => &["width", "height"],
            Shape::RoundTube => &["diameter", "wall_thickness"],
            Shape::SquareTube => &["side", "wall_thickness"],
            Shape::RectangularTube => &["width", "height", "wall_thickness"],
            Shape::Sheet => &["thickness", "width"],
        }
    }
}
