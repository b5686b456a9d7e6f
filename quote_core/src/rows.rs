//! # Line Item Rows
//!
//! The smallest units of cost/quantity the user edits: material rows (raw
//! stock, priced per kg or per meter) and component rows (purchased parts,
//! priced per piece). Rows live in ordered lists that are edited by index.
//!
//! Two list invariants hold while a step is active:
//!
//! - the list is never empty: removing the last remaining row resets it to
//!   an empty row instead;
//! - applying a catalog pick reuses the first empty row if one exists,
//!   instead of appending.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "material_id": null,
//!   "material_name": "Flat bar 40x20",
//!   "material_info": {
//!     "kind": "SimpleFormula",
//!     "shape_name": "rectangular_bar",
//!     "dimensions": { "width": "40", "height": "20" }
//!   },
//!   "length_per_piece_mm": 3000.0,
//!   "material_price": 2.5,
//!   "material_price_unit": "PerKg"
//! }
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::ShapeDescriptor;

/// How a price field is quoted.
///
/// For material rows the unit drives the cost formula (per kg needs a
/// computable weight, per meter only a length). For component rows the tag
/// is informational; component cost is always unit price × quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceUnit {
    PerKg,
    PerMeter,
    PerPiece,
}

impl Default for PriceUnit {
    fn default() -> Self {
        PriceUnit::PerKg
    }
}

/// One raw-material line: a stock shape, the stock length consumed per
/// produced piece, and a unit price.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialRow {
    /// Catalog id if the row was seeded from a pick
    pub material_id: Option<Uuid>,

    /// Display name (free text for ad-hoc materials)
    pub material_name: String,

    /// Shape descriptor; weight is only computable when present
    pub material_info: Option<ShapeDescriptor>,

    /// Stock length consumed per piece, millimeters (≥ 0)
    pub length_per_piece_mm: f64,

    /// Unit price in the shop currency
    pub material_price: f64,

    /// Whether `material_price` is per kg or per meter of stock
    pub material_price_unit: PriceUnit,
}

impl MaterialRow {
    /// Weight of the stock consumed per piece, kg.
    ///
    /// 0 unless both a shape descriptor and a positive length are present.
    pub fn weight_kg(&self) -> f64 {
        match &self.material_info {
            Some(info) if self.length_per_piece_mm > 0.0 => {
                info.weight_kg(self.length_per_piece_mm)
            }
            _ => 0.0,
        }
    }

    /// Material cost per produced piece.
    pub fn cost_per_piece(&self) -> f64 {
        match self.material_price_unit {
            PriceUnit::PerKg => self.material_price * self.weight_kg(),
            PriceUnit::PerMeter => self.material_price * (self.length_per_piece_mm / 1000.0),
            // Not a meaningful unit for stock; treat like per-piece flat price
            PriceUnit::PerPiece => self.material_price,
        }
    }
}

/// One purchased-component line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRow {
    /// Catalog id if the row was seeded from a pick
    pub component_id: Option<Uuid>,

    /// Display name
    pub component_name: String,

    /// Components used per produced piece
    pub quantity: f64,

    /// Unit price in the shop currency
    pub component_price: f64,

    /// Informational only; cost is always price × quantity
    pub component_price_unit: PriceUnit,
}

impl Default for ComponentRow {
    fn default() -> Self {
        ComponentRow {
            component_id: None,
            component_name: String::new(),
            quantity: 0.0,
            component_price: 0.0,
            component_price_unit: PriceUnit::PerPiece,
        }
    }
}

impl ComponentRow {
    /// Component cost per produced piece.
    pub fn cost_per_piece(&self) -> f64 {
        self.quantity * self.component_price
    }
}

/// A row that knows whether it still holds only default values.
///
/// List editing uses this to reuse empty slots and to keep lists non-empty.
pub trait EmptyCheck {
    fn is_empty_row(&self) -> bool;
}

impl EmptyCheck for MaterialRow {
    fn is_empty_row(&self) -> bool {
        self.material_id.is_none()
            && self.material_name.is_empty()
            && self.material_info.is_none()
            && self.length_per_piece_mm == 0.0
            && self.material_price == 0.0
    }
}

impl EmptyCheck for ComponentRow {
    fn is_empty_row(&self) -> bool {
        self.component_id.is_none()
            && self.component_name.is_empty()
            && self.quantity == 0.0
            && self.component_price == 0.0
    }
}

/// Append an empty row, or reuse the first empty slot with `seed`.
///
/// Returns the index of the row that now holds `seed`.
pub fn add_row<T: Default + EmptyCheck>(rows: &mut Vec<T>, seed: T) -> usize {
    if let Some(idx) = rows.iter().position(|r| r.is_empty_row()) {
        rows[idx] = seed;
        idx
    } else {
        rows.push(seed);
        rows.len() - 1
    }
}

/// Mutate the row at `index` in place; out-of-range indices are ignored.
pub fn update_row<T>(rows: &mut [T], index: usize, f: impl FnOnce(&mut T)) {
    if let Some(row) = rows.get_mut(index) {
        f(row);
    }
}

/// Remove the row at `index`.
///
/// Removing the last remaining row resets it to an empty row instead; the
/// list never shrinks to zero rows. Out-of-range indices are ignored.
pub fn remove_row<T: Default>(rows: &mut Vec<T>, index: usize) {
    if index >= rows.len() {
        return;
    }
    if rows.len() == 1 {
        rows[0] = T::default();
    } else {
        rows.remove(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ShapeDescriptor;

    fn flat_bar_row() -> MaterialRow {
        MaterialRow {
            material_name: "Flat bar 40x20".to_string(),
            material_info: Some(
                ShapeDescriptor::simple("rectangular_bar")
                    .with_dimension("width", "40")
                    .with_dimension("height", "20"),
            ),
            length_per_piece_mm: 3000.0,
            material_price: 2.5,
            material_price_unit: PriceUnit::PerKg,
            ..Default::default()
        }
    }

    #[test]
    fn test_material_cost_per_kg() {
        let row = flat_bar_row();
        assert!((row.weight_kg() - 18.84).abs() < 1e-9);
        assert!((row.cost_per_piece() - 47.10).abs() < 1e-9);
    }

    #[test]
    fn test_material_cost_per_meter() {
        let row = MaterialRow {
            material_price_unit: PriceUnit::PerMeter,
            material_price: 4.0,
            length_per_piece_mm: 2500.0,
            ..flat_bar_row()
        };
        assert!((row.cost_per_piece() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_weight_needs_descriptor_and_length() {
        let mut row = flat_bar_row();
        row.material_info = None;
        assert_eq!(row.weight_kg(), 0.0);
        assert_eq!(row.cost_per_piece(), 0.0);

        let mut row = flat_bar_row();
        row.length_per_piece_mm = 0.0;
        assert_eq!(row.weight_kg(), 0.0);
    }

    #[test]
    fn test_component_cost() {
        let row = ComponentRow {
            component_name: "M8 insert".to_string(),
            quantity: 4.0,
            component_price: 0.35,
            ..Default::default()
        };
        assert!((row.cost_per_piece() - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_remove_last_row_resets() {
        let mut rows = vec![flat_bar_row()];
        remove_row(&mut rows, 0);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_empty_row());
    }

    #[test]
    fn test_remove_middle_row() {
        let mut rows = vec![flat_bar_row(), MaterialRow::default(), flat_bar_row()];
        remove_row(&mut rows, 1);
        assert_eq!(rows.len(), 2);
        remove_row(&mut rows, 5); // out of range: no-op
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_add_row_reuses_empty_slot() {
        let mut rows = vec![flat_bar_row(), MaterialRow::default()];
        let idx = add_row(
            &mut rows,
            MaterialRow {
                material_name: "Round 20".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(idx, 1);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].material_name, "Round 20");

        // No empty slot left: appends
        let idx = add_row(&mut rows, MaterialRow::default());
        assert_eq!(idx, 2);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_update_row() {
        let mut rows = vec![MaterialRow::default()];
        update_row(&mut rows, 0, |r| r.material_price = 9.9);
        assert_eq!(rows[0].material_price, 9.9);
        update_row(&mut rows, 7, |r| r.material_price = 1.0); // no-op
        assert_eq!(rows[0].material_price, 9.9);
    }

    #[test]
    fn test_row_serialization() {
        let row = flat_bar_row();
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"material_price_unit\":\"PerKg\""));
        let parsed: MaterialRow = serde_json::from_str(&json).unwrap();
        assert_eq!(row, parsed);
    }
}
