//! # Calculation Data
//!
//! `CalculationData` is the root aggregate a calculation session edits and
//! the unit of persistence: everything the totals report derives from lives
//! here, and nothing else does. Ephemeral UI state (search terms, current
//! wizard step) deliberately lives on the session, not on this struct.
//!
//! ## Structure
//!
//! ```text
//! CalculationData
//! ├── material_rows:  Vec<MaterialRow>      (step 1)
//! ├── component_rows: Vec<ComponentRow>     (step 2)
//! ├── machining:      MachiningEntries      (step 3, five fixed slots)
//! ├── secondary_ops:  Vec<SecondaryOperation> (step 4)
//! └── quantity / transport_cost             (step 5)
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::ShapeDescriptor;
use crate::machining::{MachiningKind, OperationEntry, SecondaryOperation};
use crate::rows::{self, ComponentRow, MaterialRow};

/// The five fixed machine-time slots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MachiningEntries {
    pub setup: OperationEntry,
    pub sawing: OperationEntry,
    pub milling: OperationEntry,
    pub turning: OperationEntry,
    pub welding: OperationEntry,
}

impl MachiningEntries {
    /// Entry for a kind.
    pub fn get(&self, kind: MachiningKind) -> &OperationEntry {
        match kind {
            MachiningKind::Setup => &self.setup,
            MachiningKind::Sawing => &self.sawing,
            MachiningKind::Milling => &self.milling,
            MachiningKind::Turning => &self.turning,
            MachiningKind::Welding => &self.welding,
        }
    }

    /// Mutable entry for a kind.
    pub fn get_mut(&mut self, kind: MachiningKind) -> &mut OperationEntry {
        match kind {
            MachiningKind::Setup => &mut self.setup,
            MachiningKind::Sawing => &mut self.sawing,
            MachiningKind::Milling => &mut self.milling,
            MachiningKind::Turning => &mut self.turning,
            MachiningKind::Welding => &mut self.welding,
        }
    }
}

/// Root aggregate for one part's cost calculation.
///
/// Serializes to the record stored on the part. Row lists are kept non-empty
/// while being edited (see [`crate::rows`]); a persisted record may carry
/// populated rows only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationData {
    /// Raw material lines (step 1)
    #[serde(default)]
    pub material_rows: Vec<MaterialRow>,

    /// Purchased component lines (step 2)
    #[serde(default)]
    pub component_rows: Vec<ComponentRow>,

    /// Machine time per operation kind (step 3)
    #[serde(default)]
    pub machining: MachiningEntries,

    /// Ordered list of flat per-piece finishing costs (step 4)
    #[serde(default)]
    pub secondary_ops: Vec<SecondaryOperation>,

    /// Number of pieces in the run (step 5)
    #[serde(default)]
    pub quantity: u32,

    /// Flat transport/logistics cost for the whole run (step 5)
    #[serde(default)]
    pub transport_cost: f64,
}

impl CalculationData {
    /// Fresh calculation: one empty row per list, everything else zero.
    pub fn empty() -> Self {
        CalculationData {
            material_rows: vec![MaterialRow::default()],
            component_rows: vec![ComponentRow::default()],
            machining: MachiningEntries::default(),
            secondary_ops: Vec::new(),
            quantity: 0,
            transport_cost: 0.0,
        }
    }

    /// Calculation pre-seeded from a part's declared materials/components,
    /// one row per declared item. Falls back to [`CalculationData::empty`]
    /// when the part declares nothing.
    pub fn seeded(part: &Part) -> Self {
        let mut data = CalculationData::empty();
        for mat in &part.materials {
            rows::add_row(
                &mut data.material_rows,
                MaterialRow {
                    material_id: mat.id,
                    material_name: mat.name.clone(),
                    material_info: mat.descriptor.clone(),
                    length_per_piece_mm: mat.length_per_piece_mm.unwrap_or(0.0),
                    ..Default::default()
                },
            );
        }
        for comp in &part.components {
            rows::add_row(
                &mut data.component_rows,
                ComponentRow {
                    component_id: comp.id,
                    component_name: comp.name.clone(),
                    quantity: comp.quantity.unwrap_or(0.0),
                    ..Default::default()
                },
            );
        }
        if let Some(qty) = part.default_quantity {
            data.quantity = qty;
        }
        data
    }

    // Row-level editing, index-addressed. These are the only mutation paths
    // the session exposes to its caller.

    /// Add a material row (reusing the first empty slot); returns its index.
    pub fn add_material_row(&mut self, row: MaterialRow) -> usize {
        rows::add_row(&mut self.material_rows, row)
    }

    /// Mutate the material row at `index` in place.
    pub fn update_material_row(&mut self, index: usize, f: impl FnOnce(&mut MaterialRow)) {
        rows::update_row(&mut self.material_rows, index, f);
    }

    /// Remove the material row at `index` (the list never becomes empty).
    pub fn remove_material_row(&mut self, index: usize) {
        rows::remove_row(&mut self.material_rows, index);
    }

    /// Add a component row (reusing the first empty slot); returns its index.
    pub fn add_component_row(&mut self, row: ComponentRow) -> usize {
        rows::add_row(&mut self.component_rows, row)
    }

    /// Mutate the component row at `index` in place.
    pub fn update_component_row(&mut self, index: usize, f: impl FnOnce(&mut ComponentRow)) {
        rows::update_row(&mut self.component_rows, index, f);
    }

    /// Remove the component row at `index` (the list never becomes empty).
    pub fn remove_component_row(&mut self, index: usize) {
        rows::remove_row(&mut self.component_rows, index);
    }

    /// Replace a machine-time slot.
    pub fn set_machining(&mut self, kind: MachiningKind, entry: OperationEntry) {
        *self.machining.get_mut(kind) = entry;
    }

    /// Append a secondary operation; returns its index.
    pub fn add_secondary_op(&mut self, op: SecondaryOperation) -> usize {
        self.secondary_ops.push(op);
        self.secondary_ops.len() - 1
    }

    /// Remove the secondary operation at `index` (this list may be empty).
    pub fn remove_secondary_op(&mut self, index: usize) {
        if index < self.secondary_ops.len() {
            self.secondary_ops.remove(index);
        }
    }
}

impl Default for CalculationData {
    fn default() -> Self {
        CalculationData::empty()
    }
}

/// A material a part declares by default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartMaterial {
    pub id: Option<Uuid>,
    pub name: String,
    pub descriptor: Option<ShapeDescriptor>,
    /// Default stock length per piece, if the part carries one
    pub length_per_piece_mm: Option<f64>,
}

/// A purchased component a part declares by default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartComponent {
    pub id: Option<Uuid>,
    pub name: String,
    /// Default components per piece, if the part carries one
    pub quantity: Option<f64>,
}

/// The produced part a calculation belongs to.
///
/// The part record owns the persisted calculation (keyed by `id`) and seeds
/// fresh sessions with its declared materials and components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub materials: Vec<PartMaterial>,
    #[serde(default)]
    pub components: Vec<PartComponent>,
    #[serde(default)]
    pub default_quantity: Option<u32>,
}

impl Part {
    /// Create a part with no declared defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Part {
            id: Uuid::new_v4(),
            name: name.into(),
            materials: Vec::new(),
            components: Vec::new(),
            default_quantity: None,
        }
    }
}
