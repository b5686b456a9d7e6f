//! # quote_core - Part Cost Estimation Engine
//!
//! `quote_core` estimates the fully-loaded price of a produced part from raw
//! material geometry, purchased components, machine time, finishing
//! operations and logistics. All inputs and outputs are JSON-serializable;
//! the persisted record format is backward compatible with the old
//! single-material schema.
//!
//! ## Design Philosophy
//!
//! - **Stateless math**: weight and totals are pure functions, re-derived on
//!   every read, so no cached figure can go stale
//! - **Total over inputs**: unparseable numbers and unknown shapes read as 0,
//!   never as errors
//! - **JSON-First**: all domain types implement Serialize/Deserialize
//! - **Narrow seams**: catalog, persistence and notifications are traits
//!
//! ## Quick Start
//!
//! ```rust
//! use quote_core::geometry::ShapeDescriptor;
//! use quote_core::data::CalculationData;
//! use quote_core::rows::PriceUnit;
//! use quote_core::totals::totals;
//!
//! let mut data = CalculationData::empty();
//! data.material_rows[0].material_info =
//!     Some(ShapeDescriptor::simple("round_bar").with_dimension("diameter", "20"));
//! data.material_rows[0].length_per_piece_mm = 1000.0;
//! data.material_rows[0].material_price = 1.8;
//! data.material_rows[0].material_price_unit = PriceUnit::PerKg;
//! data.quantity = 25;
//!
//! let report = totals(&data);
//! assert!(report.material_cost_per_piece > 0.0);
//! ```
//!
//! ## Modules
//!
//! - [`geometry`] - Shape descriptors, density table, weight resolution
//! - [`rows`] - Material/component line items and list editing
//! - [`machining`] - Machine time entries and secondary operations
//! - [`data`] - The `CalculationData` root aggregate and part defaults
//! - [`totals`] - Pure cost aggregation into a totals report
//! - [`session`] - The step-wise wizard that drives data entry
//! - [`record`] - Versioned persisted-record schema and normalization
//! - [`store`] - Record persistence with atomic file saves
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod data;
pub mod errors;
pub mod geometry;
pub mod machining;
pub mod record;
pub mod rows;
pub mod session;
pub mod store;
pub mod totals;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use data::{CalculationData, Part};
pub use errors::{QuoteError, QuoteResult};
pub use geometry::{Shape, ShapeDescriptor, ShapeKind};
pub use record::CalculationRecord;
pub use session::{CalculationSession, CatalogRepository, Step};
pub use store::{FileRecordStore, Notifier, RecordStore};
pub use totals::{totals, Totals};
