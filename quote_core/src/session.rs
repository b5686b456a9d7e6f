//! # Calculation Session
//!
//! A finite-state wizard that owns the mutable [`CalculationData`] for one
//! part. Five data-entry steps feed the aggregate; the terminal `Results`
//! state displays the totals report without freezing anything; `edit()`
//! always drops back to step 5 with the data intact.
//!
//! ```text
//! Materials ⇄ Components ⇄ Machining ⇄ SecondaryOps ⇄ QuantityTransport ⇄ Results
//!     1            2            3            4                5          (terminal)
//! ```
//!
//! The session is the only writer of its data: the UI issues row-level
//! operations through it, catalog picks only land after an explicit apply,
//! and closing without saving discards everything. Search terms are
//! session-local UI state and are never persisted.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::data::Part;
//! use quote_core::session::{CalculationSession, StaticCatalog, Step};
//! use quote_core::store::{MemoryRecordStore, NullNotifier};
//!
//! let part = Part::new("Bracket");
//! let store = MemoryRecordStore::new();
//!
//! let mut session =
//!     CalculationSession::open(part, &store, StaticCatalog::default(), &NullNotifier)
//!         .unwrap();
//! assert_eq!(session.step(), Step::Materials);
//!
//! for _ in 0..5 {
//!     session.next();
//! }
//! assert_eq!(session.step(), Step::Results);
//! let report = session.totals();
//! assert_eq!(report.total_per_piece, 0.0);
//! ```

use uuid::Uuid;

use crate::data::{CalculationData, Part};
use crate::errors::QuoteResult;
use crate::geometry::ShapeDescriptor;
use crate::machining::{MachiningKind, OperationEntry, SecondaryOperation};
use crate::rows::{ComponentRow, MaterialRow};
use crate::store::{Notifier, RecordStore};
use crate::totals::{totals, Totals};

/// Wizard state. The five numbered steps accept mutation; `Results` is the
/// terminal display state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Materials,
    Components,
    Machining,
    SecondaryOps,
    QuantityTransport,
    Results,
}

impl Step {
    /// Step number shown in the wizard header (`None` for `Results`).
    pub fn number(&self) -> Option<u8> {
        match self {
            Step::Materials => Some(1),
            Step::Components => Some(2),
            Step::Machining => Some(3),
            Step::SecondaryOps => Some(4),
            Step::QuantityTransport => Some(5),
            Step::Results => None,
        }
    }

    fn next(self) -> Step {
        match self {
            Step::Materials => Step::Components,
            Step::Components => Step::Machining,
            Step::Machining => Step::SecondaryOps,
            Step::SecondaryOps => Step::QuantityTransport,
            Step::QuantityTransport | Step::Results => Step::Results,
        }
    }

    fn back(self) -> Step {
        match self {
            // No transition backward out of step 1
            Step::Materials | Step::Components => Step::Materials,
            Step::Machining => Step::Components,
            Step::SecondaryOps => Step::Machining,
            Step::QuantityTransport => Step::SecondaryOps,
            Step::Results => Step::QuantityTransport,
        }
    }
}

/// A material candidate returned by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialPick {
    pub id: Uuid,
    pub name: String,
    pub descriptor: Option<ShapeDescriptor>,
}

/// A purchased-component candidate returned by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentPick {
    pub id: Uuid,
    pub name: String,
}

/// Read-only catalog queries.
///
/// Implementations wrap whatever the shop's master data lives in; the
/// session only consumes `{id, name, descriptor?}` shaped candidates and
/// never mutates calculation data from a query result; only an explicit
/// apply does that.
pub trait CatalogRepository {
    fn find_materials(&self, query: &str) -> Vec<MaterialPick>;
    fn find_components(&self, query: &str) -> Vec<ComponentPick>;
}

/// In-memory catalog with case-insensitive substring search. Used by tests
/// and the CLI; production deployments implement [`CatalogRepository`] over
/// the real master data.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    materials: Vec<MaterialPick>,
    components: Vec<ComponentPick>,
}

impl StaticCatalog {
    /// Add a material candidate.
    pub fn with_material(mut self, name: impl Into<String>, descriptor: Option<ShapeDescriptor>) -> Self {
        self.materials.push(MaterialPick {
            id: Uuid::new_v4(),
            name: name.into(),
            descriptor,
        });
        self
    }

    /// Add a component candidate.
    pub fn with_component(mut self, name: impl Into<String>) -> Self {
        self.components.push(ComponentPick {
            id: Uuid::new_v4(),
            name: name.into(),
        });
        self
    }
}

impl CatalogRepository for StaticCatalog {
    fn find_materials(&self, query: &str) -> Vec<MaterialPick> {
        let needle = query.trim().to_lowercase();
        self.materials
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    fn find_components(&self, query: &str) -> Vec<ComponentPick> {
        let needle = query.trim().to_lowercase();
        self.components
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

/// The step-wise data-collection session for one part.
pub struct CalculationSession<C: CatalogRepository> {
    part: Part,
    data: CalculationData,
    step: Step,
    catalog: C,

    // Ephemeral UI state, never persisted
    material_search: String,
    component_search: String,
}

impl<C: CatalogRepository> CalculationSession<C> {
    /// Open a session for a part.
    ///
    /// A previously saved record resumes directly at `Results` (the signal
    /// that a calculation was completed before); otherwise the data is
    /// seeded from the part's declared defaults and the wizard starts at
    /// step 1. A missing record is not an error.
    pub fn open(
        part: Part,
        store: &dyn RecordStore,
        catalog: C,
        notifier: &dyn Notifier,
    ) -> QuoteResult<Self> {
        let loaded = match store.load(part.id) {
            Ok(record) => record,
            Err(e) => {
                notifier.load_failed(part.id, &e);
                return Err(e);
            }
        };

        let (data, step) = match loaded {
            Some(record) => {
                notifier.loaded(part.id);
                (record.normalize(), Step::Results)
            }
            None => (CalculationData::seeded(&part), Step::Materials),
        };

        Ok(CalculationSession {
            part,
            data,
            step,
            catalog,
            material_search: String::new(),
            component_search: String::new(),
        })
    }

    /// The part this session belongs to.
    pub fn part(&self) -> &Part {
        &self.part
    }

    /// Current wizard state.
    pub fn step(&self) -> Step {
        self.step
    }

    /// Read access to the aggregate.
    pub fn data(&self) -> &CalculationData {
        &self.data
    }

    /// Advance the wizard; from step 5 this enters `Results`.
    pub fn next(&mut self) {
        self.step = self.step.next();
    }

    /// Go back one step; from `Results` this returns to step 5. There is no
    /// transition backward out of step 1.
    pub fn back(&mut self) {
        self.step = self.step.back();
    }

    /// From `Results`, re-enable mutation at step 5 without clearing data.
    pub fn edit(&mut self) {
        if self.step == Step::Results {
            self.step = Step::QuantityTransport;
        }
    }

    /// Derive the totals report from the current data. Pure read; nothing
    /// is cached, so the report can never go stale.
    pub fn totals(&self) -> Totals {
        totals(&self.data)
    }

    fn mutable(&self) -> bool {
        self.step != Step::Results
    }

    // Row-level mutation, gated on being in a wizard step. Calls made in
    // `Results` are ignored; `edit()` re-enables them.

    /// Add an empty material row (reusing an empty slot if present).
    pub fn add_material_row(&mut self) {
        if self.mutable() {
            self.data.add_material_row(MaterialRow::default());
        }
    }

    /// Mutate the material row at `index`.
    pub fn update_material_row(&mut self, index: usize, f: impl FnOnce(&mut MaterialRow)) {
        if self.mutable() {
            self.data.update_material_row(index, f);
        }
    }

    /// Remove the material row at `index` (the list never becomes empty).
    pub fn remove_material_row(&mut self, index: usize) {
        if self.mutable() {
            self.data.remove_material_row(index);
        }
    }

    /// Add an empty component row (reusing an empty slot if present).
    pub fn add_component_row(&mut self) {
        if self.mutable() {
            self.data.add_component_row(ComponentRow::default());
        }
    }

    /// Mutate the component row at `index`.
    pub fn update_component_row(&mut self, index: usize, f: impl FnOnce(&mut ComponentRow)) {
        if self.mutable() {
            self.data.update_component_row(index, f);
        }
    }

    /// Remove the component row at `index` (the list never becomes empty).
    pub fn remove_component_row(&mut self, index: usize) {
        if self.mutable() {
            self.data.remove_component_row(index);
        }
    }

    /// Replace a machine-time slot.
    pub fn set_machining(&mut self, kind: MachiningKind, entry: OperationEntry) {
        if self.mutable() {
            self.data.set_machining(kind, entry);
        }
    }

    /// Append a secondary operation.
    pub fn add_secondary_op(&mut self, op: SecondaryOperation) {
        if self.mutable() {
            self.data.add_secondary_op(op);
        }
    }

    /// Remove the secondary operation at `index`.
    pub fn remove_secondary_op(&mut self, index: usize) {
        if self.mutable() {
            self.data.remove_secondary_op(index);
        }
    }

    /// Set the run quantity.
    pub fn set_quantity(&mut self, quantity: u32) {
        if self.mutable() {
            self.data.quantity = quantity;
        }
    }

    /// Set the flat transport cost (clamped to ≥ 0).
    pub fn set_transport_cost(&mut self, cost: f64) {
        if self.mutable() {
            self.data.transport_cost = cost.max(0.0);
        }
    }

    // Catalog search. Queries are read-only; nothing lands in the data
    // until a pick is applied.

    /// Current material search term.
    pub fn material_search(&self) -> &str {
        &self.material_search
    }

    /// Update the material search term.
    pub fn set_material_search(&mut self, term: impl Into<String>) {
        self.material_search = term.into();
    }

    /// Candidate materials for the current search term.
    pub fn find_materials(&self) -> Vec<MaterialPick> {
        self.catalog.find_materials(&self.material_search)
    }

    /// Current component search term.
    pub fn component_search(&self) -> &str {
        &self.component_search
    }

    /// Update the component search term.
    pub fn set_component_search(&mut self, term: impl Into<String>) {
        self.component_search = term.into();
    }

    /// Candidate components for the current search term.
    pub fn find_components(&self) -> Vec<ComponentPick> {
        self.catalog.find_components(&self.component_search)
    }

    /// Apply a material pick: fills the first empty row, or appends.
    /// Returns the row index, or `None` when the session is in `Results`.
    pub fn apply_material_pick(&mut self, pick: &MaterialPick) -> Option<usize> {
        if !self.mutable() {
            return None;
        }
        Some(self.data.add_material_row(MaterialRow {
            material_id: Some(pick.id),
            material_name: pick.name.clone(),
            material_info: pick.descriptor.clone(),
            ..Default::default()
        }))
    }

    /// Apply a component pick: fills the first empty row, or appends.
    /// Returns the row index, or `None` when the session is in `Results`.
    pub fn apply_component_pick(&mut self, pick: &ComponentPick) -> Option<usize> {
        if !self.mutable() {
            return None;
        }
        Some(self.data.add_component_row(ComponentRow {
            component_id: Some(pick.id),
            component_name: pick.name.clone(),
            ..Default::default()
        }))
    }

    /// Persist the current data as the part's record.
    ///
    /// One store call at a time; the outcome is signalled through the
    /// notifier and a failed save leaves the in-memory data untouched. The
    /// store does not retry.
    pub fn save(&self, store: &mut dyn RecordStore, notifier: &dyn Notifier) -> QuoteResult<()> {
        match store.save(self.part.id, &self.data) {
            Ok(()) => {
                notifier.saved(self.part.id);
                Ok(())
            }
            Err(e) => {
                notifier.save_failed(self.part.id, &e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PartMaterial;
    use crate::rows::{EmptyCheck, PriceUnit};
    use crate::store::{MemoryRecordStore, NullNotifier};

    fn catalog() -> StaticCatalog {
        StaticCatalog::default()
            .with_material(
                "Round bar 20 S235",
                Some(ShapeDescriptor::simple("round_bar").with_dimension("diameter", "20")),
            )
            .with_material("Flat bar 40x20 S235", None)
            .with_component("M8 threaded insert")
    }

    fn fresh_session() -> CalculationSession<StaticCatalog> {
        let store = MemoryRecordStore::new();
        CalculationSession::open(Part::new("Bracket"), &store, catalog(), &NullNotifier).unwrap()
    }

    #[test]
    fn test_wizard_walk() {
        let mut session = fresh_session();
        assert_eq!(session.step(), Step::Materials);
        assert_eq!(session.step().number(), Some(1));

        session.back(); // no transition backward out of step 1
        assert_eq!(session.step(), Step::Materials);

        session.next();
        assert_eq!(session.step(), Step::Components);
        session.back();
        assert_eq!(session.step(), Step::Materials);

        for _ in 0..5 {
            session.next();
        }
        assert_eq!(session.step(), Step::Results);
        assert_eq!(session.step().number(), None);

        session.next(); // terminal: stays put
        assert_eq!(session.step(), Step::Results);

        session.back();
        assert_eq!(session.step(), Step::QuantityTransport);
    }

    #[test]
    fn test_edit_reopens_step_five() {
        let mut session = fresh_session();
        session.update_material_row(0, |r| r.material_price = 3.0);
        for _ in 0..5 {
            session.next();
        }
        assert_eq!(session.step(), Step::Results);

        session.edit();
        assert_eq!(session.step(), Step::QuantityTransport);
        // Data survived the round trip through Results
        assert_eq!(session.data().material_rows[0].material_price, 3.0);

        // edit() outside Results is a no-op
        session.edit();
        assert_eq!(session.step(), Step::QuantityTransport);
    }

    #[test]
    fn test_results_state_ignores_mutation() {
        let mut session = fresh_session();
        for _ in 0..5 {
            session.next();
        }
        session.set_quantity(10);
        session.update_material_row(0, |r| r.material_price = 99.0);
        assert_eq!(session.data().quantity, 0);
        assert_eq!(session.data().material_rows[0].material_price, 0.0);

        session.edit();
        session.set_quantity(10);
        assert_eq!(session.data().quantity, 10);
    }

    #[test]
    fn test_catalog_search_and_apply() {
        let mut session = fresh_session();

        session.set_material_search("round");
        let picks = session.find_materials();
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].name, "Round bar 20 S235");
        // Searching alone changed nothing
        assert!(session.data().material_rows[0].is_empty_row());

        // The initial empty row is reused, not appended to
        let idx = session.apply_material_pick(&picks[0].clone()).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(session.data().material_rows.len(), 1);
        assert_eq!(session.data().material_rows[0].material_name, "Round bar 20 S235");

        // A second pick appends
        session.set_material_search("flat");
        let picks = session.find_materials();
        let idx = session.apply_material_pick(&picks[0].clone()).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(session.data().material_rows.len(), 2);

        session.set_component_search("insert");
        let comps = session.find_components();
        assert_eq!(comps.len(), 1);
        let idx = session.apply_component_pick(&comps[0].clone()).unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn test_open_fresh_seeds_from_part() {
        let mut part = Part::new("Shaft");
        part.materials.push(PartMaterial {
            id: None,
            name: "Round bar 25".to_string(),
            descriptor: Some(ShapeDescriptor::simple("round_bar").with_dimension("diameter", "25")),
            length_per_piece_mm: Some(400.0),
        });
        part.default_quantity = Some(20);

        let store = MemoryRecordStore::new();
        let session =
            CalculationSession::open(part, &store, StaticCatalog::default(), &NullNotifier)
                .unwrap();
        assert_eq!(session.step(), Step::Materials);
        assert_eq!(session.data().material_rows[0].material_name, "Round bar 25");
        assert_eq!(session.data().quantity, 20);
    }

    #[test]
    fn test_open_saved_record_resumes_at_results() {
        let part = Part::new("Bracket");
        let mut store = MemoryRecordStore::new();

        let mut first =
            CalculationSession::open(part.clone(), &store, catalog(), &NullNotifier).unwrap();
        first.update_material_row(0, |r| {
            r.material_name = "Flat bar".to_string();
            r.material_info = Some(
                ShapeDescriptor::simple("rectangular_bar")
                    .with_dimension("width", "40")
                    .with_dimension("height", "20"),
            );
            r.length_per_piece_mm = 3000.0;
            r.material_price = 2.5;
            r.material_price_unit = PriceUnit::PerKg;
        });
        first.set_quantity(10);
        first.save(&mut store, &NullNotifier).unwrap();

        let reopened =
            CalculationSession::open(part, &store, catalog(), &NullNotifier).unwrap();
        assert_eq!(reopened.step(), Step::Results);
        assert!((reopened.totals().material_cost_per_piece - 47.10).abs() < 1e-9);
    }

    #[test]
    fn test_close_without_save_discards() {
        let part = Part::new("Bracket");
        let store = MemoryRecordStore::new();

        {
            let mut session =
                CalculationSession::open(part.clone(), &store, catalog(), &NullNotifier).unwrap();
            session.set_quantity(42);
            // dropped without save
        }

        let reopened =
            CalculationSession::open(part, &store, catalog(), &NullNotifier).unwrap();
        assert_eq!(reopened.step(), Step::Materials);
        assert_eq!(reopened.data().quantity, 0);
    }

    #[test]
    fn test_totals_is_a_fresh_read() {
        let mut session = fresh_session();
        session.update_material_row(0, |r| {
            r.material_price = 5.0;
            r.material_price_unit = PriceUnit::PerMeter;
            r.length_per_piece_mm = 2000.0;
        });
        assert!((session.totals().material_cost_per_piece - 10.0).abs() < 1e-9);

        session.update_material_row(0, |r| r.length_per_piece_mm = 3000.0);
        assert!((session.totals().material_cost_per_piece - 15.0).abs() < 1e-9);
    }
}
