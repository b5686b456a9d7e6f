//! # Cost Aggregation
//!
//! Pure fold of a [`CalculationData`] into a totals report. There is no
//! cached or memoized total anywhere in the engine: callers invoke
//! [`totals`] whenever they need figures, and the result is always derived
//! from the current data.
//!
//! Per-piece vs for-quantity: most cost categories are inherently per piece
//! and scale up by the run quantity. Two do not: setup is a one-time cost
//! amortized *down* over the run, and transport is a flat amount added once
//! at the quantity level.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::data::CalculationData;
//! use quote_core::machining::{MachiningKind, OperationEntry};
//! use quote_core::totals::totals;
//!
//! let mut data = CalculationData::empty();
//! data.quantity = 10;
//! data.set_machining(MachiningKind::Setup, OperationEntry::new(1, 30, 40.0));
//!
//! let report = totals(&data);
//! assert_eq!(report.setup.total, 60.0);
//! assert_eq!(report.setup.per_piece, 6.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::data::CalculationData;
use crate::machining::MachiningKind;

/// Cost of one machining kind, both per piece and for the run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MachiningCost {
    pub per_piece: f64,
    pub total: f64,
}

/// The full totals report.
///
/// All amounts are raw numbers in the shop currency; formatting for display
/// is the caller's concern.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub material_cost_per_piece: f64,
    pub material_cost_total: f64,

    pub component_cost_per_piece: f64,
    pub component_cost_total: f64,

    /// One-time cost, amortized over the run (`per_piece = total / quantity`)
    pub setup: MachiningCost,
    pub sawing: MachiningCost,
    pub milling: MachiningCost,
    pub turning: MachiningCost,
    pub welding: MachiningCost,

    pub secondary_ops_per_piece: f64,
    pub secondary_ops_total: f64,

    /// Flat transport cost divided over the run (`0` when quantity is 0)
    pub transport_per_piece: f64,
    /// Flat transport cost, entered once for the whole run
    pub transport_cost: f64,

    pub total_per_piece: f64,
    pub total_for_quantity: f64,

    /// Stock weight per piece, kg (rows without shape/length contribute 0)
    pub weight_per_piece: f64,
    /// Stock weight for the run, kg
    pub total_weight: f64,
}

/// Fold the current calculation data into a totals report.
///
/// Total over all inputs; with `quantity == 0` every total defined as
/// per-piece × quantity is 0, while `total_per_piece` stays unchanged and
/// the one-time costs (setup, transport) still appear once in
/// `total_for_quantity`.
pub fn totals(data: &CalculationData) -> Totals {
    let qty = data.quantity as f64;

    let material_cost_per_piece: f64 = data
        .material_rows
        .iter()
        .map(|row| row.cost_per_piece())
        .sum();
    let component_cost_per_piece: f64 = data
        .component_rows
        .iter()
        .map(|row| row.cost_per_piece())
        .sum();
    let weight_per_piece: f64 = data.material_rows.iter().map(|row| row.weight_kg()).sum();

    // Setup is one-time: entered cost is the run total, amortized down.
    let setup_total = data.machining.get(MachiningKind::Setup).cost();
    let setup = MachiningCost {
        per_piece: if data.quantity > 0 {
            setup_total / qty
        } else {
            0.0
        },
        total: setup_total,
    };

    // The other machining kinds are inherently per piece and scale up.
    let per_piece_machining = |kind: MachiningKind| {
        let per_piece = data.machining.get(kind).cost();
        MachiningCost {
            per_piece,
            total: per_piece * qty,
        }
    };
    let sawing = per_piece_machining(MachiningKind::Sawing);
    let milling = per_piece_machining(MachiningKind::Milling);
    let turning = per_piece_machining(MachiningKind::Turning);
    let welding = per_piece_machining(MachiningKind::Welding);

    let secondary_ops_per_piece: f64 = data
        .secondary_ops
        .iter()
        .map(|op| op.price_per_piece)
        .sum();

    let transport_per_piece = if data.quantity > 0 {
        data.transport_cost / qty
    } else {
        0.0
    };

    let total_per_piece = material_cost_per_piece
        + component_cost_per_piece
        + setup.per_piece
        + sawing.per_piece
        + milling.per_piece
        + turning.per_piece
        + welding.per_piece
        + secondary_ops_per_piece
        + transport_per_piece;

    // Transport is added once, undivided, at the quantity level. This
    // asymmetry against the other categories is intentional accounting,
    // not a rounding shortcut.
    let total_for_quantity = material_cost_per_piece * qty
        + component_cost_per_piece * qty
        + setup.total
        + sawing.total
        + milling.total
        + turning.total
        + welding.total
        + secondary_ops_per_piece * qty
        + data.transport_cost;

    Totals {
        material_cost_per_piece,
        material_cost_total: material_cost_per_piece * qty,
        component_cost_per_piece,
        component_cost_total: component_cost_per_piece * qty,
        setup,
        sawing,
        milling,
        turning,
        welding,
        secondary_ops_per_piece,
        secondary_ops_total: secondary_ops_per_piece * qty,
        transport_per_piece,
        transport_cost: data.transport_cost,
        total_per_piece,
        total_for_quantity,
        weight_per_piece,
        total_weight: weight_per_piece * qty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ShapeDescriptor;
    use crate::machining::{OperationEntry, SecondaryOperation};
    use crate::rows::{ComponentRow, MaterialRow, PriceUnit};

    fn sample_data() -> CalculationData {
        let mut data = CalculationData::empty();
        data.material_rows = vec![MaterialRow {
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
        }];
        data.component_rows = vec![ComponentRow {
            component_name: "M8 insert".to_string(),
            quantity: 4.0,
            component_price: 0.35,
            ..Default::default()
        }];
        data.set_machining(MachiningKind::Setup, OperationEntry::new(1, 30, 40.0));
        data.set_machining(MachiningKind::Milling, OperationEntry::new(0, 12, 50.0));
        data.secondary_ops
            .push(SecondaryOperation::preset("Powder coating", 3.5));
        data.quantity = 10;
        data.transport_cost = 25.0;
        data
    }

    #[test]
    fn test_material_cost_scenario() {
        // 0.04·0.02·3·7850 = 18.84 kg at 2.5 €/kg ⇒ 47.10 per piece
        let report = totals(&sample_data());
        assert!((report.weight_per_piece - 18.84).abs() < 1e-9);
        assert!((report.material_cost_per_piece - 47.10).abs() < 1e-9);
        assert!((report.material_cost_total - 471.0).abs() < 1e-9);
        assert!((report.total_weight - 188.4).abs() < 1e-9);
    }

    #[test]
    fn test_setup_amortization_scenario() {
        let report = totals(&sample_data());
        assert_eq!(report.setup.total, 60.0);
        assert_eq!(report.setup.per_piece, 6.0);
    }

    #[test]
    fn test_per_piece_machining_scales_up() {
        let report = totals(&sample_data());
        assert!((report.milling.per_piece - 10.0).abs() < 1e-9);
        assert!((report.milling.total - 100.0).abs() < 1e-9);
        assert_eq!(report.sawing.per_piece, 0.0);
    }

    #[test]
    fn test_grand_totals() {
        let report = totals(&sample_data());

        let expected_per_piece = 47.10  // material
            + 1.4                       // components
            + 6.0                       // setup amortized
            + 10.0                      // milling
            + 3.5                       // secondary
            + 2.5; // transport / 10
        assert!((report.total_per_piece - expected_per_piece).abs() < 1e-9);

        let expected_for_quantity = 471.0 // material
            + 14.0                        // components
            + 60.0                        // setup once
            + 100.0                       // milling
            + 35.0                        // secondary
            + 25.0; // transport once, undivided
        assert!((report.total_for_quantity - expected_for_quantity).abs() < 1e-9);
    }

    #[test]
    fn test_quantity_zero_degeneracy() {
        let mut data = sample_data();
        let with_qty = totals(&data);
        data.quantity = 0;
        let report = totals(&data);

        // Every per-piece × quantity total collapses to 0
        assert_eq!(report.material_cost_total, 0.0);
        assert_eq!(report.component_cost_total, 0.0);
        assert_eq!(report.milling.total, 0.0);
        assert_eq!(report.secondary_ops_total, 0.0);
        assert_eq!(report.total_weight, 0.0);

        // Setup per-piece and transport per-piece are 0 (no run to amortize
        // over), so total_per_piece differs from the qty>0 case only by
        // those two amortized shares.
        assert_eq!(report.setup.per_piece, 0.0);
        assert_eq!(report.transport_per_piece, 0.0);
        let amortized = with_qty.setup.per_piece + with_qty.transport_per_piece;
        assert!((with_qty.total_per_piece - report.total_per_piece - amortized).abs() < 1e-9);

        // Material/component/machining per-piece figures are untouched
        assert_eq!(
            report.material_cost_per_piece,
            with_qty.material_cost_per_piece
        );
        assert_eq!(report.milling.per_piece, with_qty.milling.per_piece);

        // One-time costs are still paid once
        assert_eq!(report.setup.total, 60.0);
        assert!((report.total_for_quantity - (60.0 + 25.0)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_data_is_all_zero() {
        let report = totals(&CalculationData::empty());
        assert_eq!(report, Totals::default());
    }

    #[test]
    fn test_totals_serialization() {
        let report = totals(&sample_data());
        let json = serde_json::to_string(&report).unwrap();
        let roundtrip: Totals = serde_json::from_str(&json).unwrap();
        assert_eq!(report, roundtrip);
    }
}
