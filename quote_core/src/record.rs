//! # Persisted Record Schema
//!
//! The calculation attached to a part is stored as one JSON value. Two
//! schema generations exist in the wild:
//!
//! - **Modern**: [`CalculationData`] with a `material_rows` list.
//! - **Legacy**: a single-material shape whose material fields live directly
//!   on the record (`material_id`, `material_info`, `length_per_piece_mm`,
//!   `material_price`, `material_price_unit`).
//!
//! Both deserialize into [`CalculationRecord`], and [`CalculationRecord::normalize`]
//! is the single place where the legacy shape is lifted into a one-row
//! list. Business logic only ever sees normalized [`CalculationData`];
//! nothing downstream branches on schema generation.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::data::{CalculationData, MachiningEntries};
use crate::geometry::ShapeDescriptor;
use crate::machining::SecondaryOperation;
use crate::rows::{ComponentRow, MaterialRow, PriceUnit};

/// Versioned union over the two record generations.
///
/// The discriminator is the presence of the `material_rows` key: modern
/// records always carry it, legacy records never do. (An untagged derive
/// would mis-read legacy records as all-default modern ones, since every
/// modern field has a default.)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CalculationRecord {
    Modern(CalculationData),
    Legacy(LegacyCalculation),
}

impl<'de> Deserialize<'de> for CalculationRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.get("material_rows").is_some() {
            CalculationData::deserialize(value)
                .map(CalculationRecord::Modern)
                .map_err(D::Error::custom)
        } else {
            LegacyCalculation::deserialize(value)
                .map(CalculationRecord::Legacy)
                .map_err(D::Error::custom)
        }
    }
}

/// The old single-material record shape.
///
/// Material fields sit directly on the record; everything else matches the
/// modern schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LegacyCalculation {
    #[serde(default)]
    pub material_id: Option<Uuid>,
    #[serde(default)]
    pub material_name: String,
    #[serde(default)]
    pub material_info: Option<ShapeDescriptor>,
    #[serde(default)]
    pub length_per_piece_mm: f64,
    #[serde(default)]
    pub material_price: f64,
    #[serde(default)]
    pub material_price_unit: PriceUnit,

    #[serde(default)]
    pub component_rows: Vec<ComponentRow>,
    #[serde(default)]
    pub machining: MachiningEntries,
    #[serde(default)]
    pub secondary_ops: Vec<SecondaryOperation>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub transport_cost: f64,
}

impl LegacyCalculation {
    /// True when the record carries any of the single-material fields.
    fn has_material(&self) -> bool {
        self.material_id.is_some()
            || !self.material_name.is_empty()
            || self.material_info.is_some()
            || self.length_per_piece_mm != 0.0
            || self.material_price != 0.0
    }
}

impl CalculationRecord {
    /// Lift either record generation into modern [`CalculationData`].
    ///
    /// - A modern record with a non-empty row list passes through unchanged.
    /// - A legacy record's single material wraps into a one-row list.
    /// - A record with neither yields one empty row, so the step-1 list
    ///   invariant holds immediately.
    ///
    /// Idempotent: normalizing already-normalized data returns it unchanged.
    pub fn normalize(self) -> CalculationData {
        match self {
            CalculationRecord::Modern(mut data) => {
                if data.material_rows.is_empty() {
                    data.material_rows.push(MaterialRow::default());
                }
                if data.component_rows.is_empty() {
                    data.component_rows.push(ComponentRow::default());
                }
                data
            }
            CalculationRecord::Legacy(legacy) => {
                let material_rows = if legacy.has_material() {
                    vec![MaterialRow {
                        material_id: legacy.material_id,
                        material_name: legacy.material_name,
                        material_info: legacy.material_info,
                        length_per_piece_mm: legacy.length_per_piece_mm,
                        material_price: legacy.material_price,
                        material_price_unit: legacy.material_price_unit,
                    }]
                } else {
                    vec![MaterialRow::default()]
                };
                let component_rows = if legacy.component_rows.is_empty() {
                    vec![ComponentRow::default()]
                } else {
                    legacy.component_rows
                };
                CalculationData {
                    material_rows,
                    component_rows,
                    machining: legacy.machining,
                    secondary_ops: legacy.secondary_ops,
                    quantity: legacy.quantity,
                    transport_cost: legacy.transport_cost,
                }
            }
        }
    }
}

impl From<CalculationData> for CalculationRecord {
    fn from(data: CalculationData) -> Self {
        CalculationRecord::Modern(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ShapeDescriptor;

    fn legacy_json() -> &'static str {
        r#"{
            "material_name": "Round bar 20",
            "material_info": {
                "kind": "SimpleFormula",
                "shape_name": "round_bar",
                "dimensions": { "diameter": "20" }
            },
            "length_per_piece_mm": 1000.0,
            "material_price": 1.8,
            "material_price_unit": "PerKg",
            "quantity": 5,
            "transport_cost": 12.0
        }"#
    }

    #[test]
    fn test_legacy_record_wraps_into_one_row() {
        let record: CalculationRecord = serde_json::from_str(legacy_json()).unwrap();
        assert!(matches!(record, CalculationRecord::Legacy(_)));

        let data = record.normalize();
        assert_eq!(data.material_rows.len(), 1);
        assert_eq!(data.material_rows[0].material_name, "Round bar 20");
        assert_eq!(data.material_rows[0].length_per_piece_mm, 1000.0);
        assert_eq!(data.quantity, 5);
        assert_eq!(data.transport_cost, 12.0);
        // Legacy records had no component list; the invariant still holds
        assert_eq!(data.component_rows.len(), 1);
    }

    #[test]
    fn test_modern_record_passes_through() {
        let mut data = CalculationData::empty();
        data.material_rows[0].material_name = "Flat bar".to_string();
        data.quantity = 3;

        let record = CalculationRecord::from(data.clone());
        assert_eq!(record.normalize(), data);
    }

    #[test]
    fn test_modern_roundtrip_deserializes_as_modern() {
        let mut data = CalculationData::empty();
        data.material_rows[0].material_info =
            Some(ShapeDescriptor::simple("round_bar").with_dimension("diameter", "20"));
        let json = serde_json::to_string(&CalculationRecord::from(data.clone())).unwrap();
        let parsed: CalculationRecord = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, CalculationRecord::Modern(_)));
        assert_eq!(parsed.normalize(), data);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        // Legacy payload
        let record: CalculationRecord = serde_json::from_str(legacy_json()).unwrap();
        let once = record.normalize();
        let twice = CalculationRecord::from(once.clone()).normalize();
        assert_eq!(once, twice);

        // Blank payload
        let blank = CalculationRecord::Legacy(LegacyCalculation::default()).normalize();
        assert_eq!(blank, CalculationRecord::from(blank.clone()).normalize());
        assert_eq!(blank.material_rows.len(), 1);
    }

    #[test]
    fn test_empty_modern_lists_gain_one_row() {
        let data: CalculationData = serde_json::from_str("{}").unwrap();
        let normalized = CalculationRecord::Modern(data).normalize();
        assert_eq!(normalized.material_rows.len(), 1);
        assert_eq!(normalized.component_rows.len(), 1);
    }

    #[test]
    fn test_blank_json_reads_as_legacy() {
        // No material_rows key ⇒ legacy shape, even when otherwise empty
        let record: CalculationRecord = serde_json::from_str("{}").unwrap();
        assert!(matches!(record, CalculationRecord::Legacy(_)));
        let data = record.normalize();
        assert_eq!(data.material_rows.len(), 1);
        assert!(data.material_rows[0].material_name.is_empty());
    }
}
