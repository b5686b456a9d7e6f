//! # Record Persistence
//!
//! Saving and loading the calculation record attached to a part, behind a
//! narrow [`RecordStore`] trait so the engine never knows whether records
//! live in files, a database, or a remote service.
//!
//! [`FileRecordStore`] is the bundled implementation: one JSON file per part
//! id, written atomically (temp file, fsync, rename) so an interrupted save
//! never corrupts an existing record.
//!
//! Persistence outcomes are reported through a [`Notifier`]; the store never
//! retries on its own, and a failed save leaves both the file and the
//! in-memory calculation untouched.
//!
//! ## Example
//!
//! ```rust,no_run
//! use quote_core::data::CalculationData;
//! use quote_core::store::{FileRecordStore, RecordStore};
//! use uuid::Uuid;
//!
//! let mut store = FileRecordStore::new("records");
//! let part_id = Uuid::new_v4();
//!
//! store.save(part_id, &CalculationData::empty())?;
//! let record = store.load(part_id)?;
//! assert!(record.is_some());
//! # Ok::<(), quote_core::errors::QuoteError>(())
//! ```

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::CalculationData;
use crate::errors::{QuoteError, QuoteResult};
use crate::record::CalculationRecord;

/// Current schema version written into record envelopes
pub const SCHEMA_VERSION: &str = "2.0";

/// On-disk wrapper around a record: schema version, owner, timestamp.
///
/// Files written before the envelope existed contain a bare record; loading
/// accepts both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEnvelope {
    /// Schema version (for migration compatibility)
    pub version: String,
    /// The part this calculation belongs to
    pub part_id: Uuid,
    /// When the record was saved
    pub saved_at: DateTime<Utc>,
    /// The calculation itself, modern or legacy shape
    pub calculation: CalculationRecord,
}

/// Storage for the calculation record attached to a part.
///
/// `load` returns `Ok(None)` when no record exists: absence is a normal
/// "start fresh" outcome, never an error. The engine issues at most one
/// store call at a time per session.
pub trait RecordStore {
    /// Load the record for a part, if one was ever saved.
    fn load(&self, part_id: Uuid) -> QuoteResult<Option<CalculationRecord>>;

    /// Save a calculation as the record for a part, replacing any previous
    /// record.
    fn save(&mut self, part_id: Uuid, data: &CalculationData) -> QuoteResult<()>;
}

/// Receives success/failure signals from persistence.
///
/// Implementations surface these to the user (toast, status bar, log); the
/// engine never blocks on or retries through a notifier.
pub trait Notifier {
    fn saved(&self, _part_id: Uuid) {}
    fn save_failed(&self, _part_id: Uuid, _error: &QuoteError) {}
    fn loaded(&self, _part_id: Uuid) {}
    fn load_failed(&self, _part_id: Uuid, _error: &QuoteError) {}
}

/// Notifier that drops every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {}

/// One JSON file per part id under a directory.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    /// Create a store rooted at `dir`. The directory is created on the
    /// first save, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileRecordStore { dir: dir.into() }
    }

    /// Path of the record file for a part.
    pub fn record_path(&self, part_id: Uuid) -> PathBuf {
        self.dir.join(format!("{part_id}.json"))
    }

    fn parse_record(path: &Path, contents: &str) -> QuoteResult<CalculationRecord> {
        let value: serde_json::Value =
            serde_json::from_str(contents).map_err(|e| QuoteError::SerializationError {
                reason: format!("Invalid JSON in {}: {}", path.display(), e),
            })?;

        // Envelope files carry the record under "calculation"; pre-envelope
        // files are the bare record.
        if value.get("calculation").is_some() {
            let envelope: RecordEnvelope = serde_json::from_value(value)?;
            Ok(envelope.calculation)
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self, part_id: Uuid) -> QuoteResult<Option<CalculationRecord>> {
        let path = self.record_path(part_id);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            QuoteError::file_error("read", path.display().to_string(), e.to_string())
        })?;

        Self::parse_record(&path, &contents).map(Some)
    }

    fn save(&mut self, part_id: Uuid, data: &CalculationData) -> QuoteResult<()> {
        let envelope = RecordEnvelope {
            version: SCHEMA_VERSION.to_string(),
            part_id,
            saved_at: Utc::now(),
            calculation: CalculationRecord::from(data.clone()),
        };
        let json = serde_json::to_string_pretty(&envelope)?;

        fs::create_dir_all(&self.dir).map_err(|e| {
            QuoteError::file_error("create dir", self.dir.display().to_string(), e.to_string())
        })?;

        let path = self.record_path(part_id);
        let tmp_path = path.with_extension("json.tmp");

        let mut tmp_file = File::create(&tmp_path).map_err(|e| {
            QuoteError::file_error(
                "create temp file",
                tmp_path.display().to_string(),
                e.to_string(),
            )
        })?;

        tmp_file.write_all(json.as_bytes()).map_err(|e| {
            QuoteError::file_error(
                "write temp file",
                tmp_path.display().to_string(),
                e.to_string(),
            )
        })?;

        tmp_file.sync_all().map_err(|e| {
            QuoteError::file_error(
                "sync temp file",
                tmp_path.display().to_string(),
                e.to_string(),
            )
        })?;

        // Atomic rename
        fs::rename(&tmp_path, &path).map_err(|e| {
            // Clean up temp file if rename fails
            let _ = fs::remove_file(&tmp_path);
            QuoteError::file_error("rename to final", path.display().to_string(), e.to_string())
        })?;

        Ok(())
    }
}

/// In-memory store for tests and previews. Holds the serialized JSON so the
/// round-trip matches what a file store would do.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: HashMap<Uuid, serde_json::Value>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&self, part_id: Uuid) -> QuoteResult<Option<CalculationRecord>> {
        match self.records.get(&part_id) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, part_id: Uuid, data: &CalculationData) -> QuoteResult<()> {
        let value = serde_json::to_value(CalculationRecord::from(data.clone()))?;
        self.records.insert(part_id, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ShapeDescriptor;
    use crate::rows::PriceUnit;

    fn populated_data() -> CalculationData {
        let mut data = CalculationData::empty();
        data.material_rows[0].material_name = "Round bar 20".to_string();
        data.material_rows[0].material_info =
            Some(ShapeDescriptor::simple("round_bar").with_dimension("diameter", "20"));
        data.material_rows[0].length_per_piece_mm = 1000.0;
        data.material_rows[0].material_price = 1.8;
        data.material_rows[0].material_price_unit = PriceUnit::PerKg;
        data.quantity = 5;
        data
    }

    fn temp_store(tag: &str) -> FileRecordStore {
        let dir = std::env::temp_dir().join(format!("quote_store_test_{tag}_{}", Uuid::new_v4()));
        FileRecordStore::new(dir)
    }

    #[test]
    fn test_missing_record_is_none() {
        let store = temp_store("missing");
        assert_eq!(store.load(Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn test_file_roundtrip() {
        let mut store = temp_store("roundtrip");
        let part_id = Uuid::new_v4();
        let data = populated_data();

        store.save(part_id, &data).unwrap();
        let loaded = store.load(part_id).unwrap().unwrap();
        assert_eq!(loaded.normalize(), data);

        // No stray temp file left behind
        assert!(!store
            .record_path(part_id)
            .with_extension("json.tmp")
            .exists());
        store_cleanup(&store);
    }

    #[test]
    fn test_save_replaces_previous_record() {
        let mut store = temp_store("replace");
        let part_id = Uuid::new_v4();

        store.save(part_id, &populated_data()).unwrap();
        let mut updated = populated_data();
        updated.quantity = 99;
        store.save(part_id, &updated).unwrap();

        let loaded = store.load(part_id).unwrap().unwrap();
        assert_eq!(loaded.normalize().quantity, 99);
        store_cleanup(&store);
    }

    #[test]
    fn test_pre_envelope_file_loads() {
        let store = temp_store("bare");
        let part_id = Uuid::new_v4();
        // Write a bare legacy record the way the old code did, no envelope
        fs::create_dir_all(store.record_path(part_id).parent().unwrap()).unwrap();
        fs::write(
            store.record_path(part_id),
            r#"{ "material_name": "Old stock", "material_price": 2.0, "quantity": 3 }"#,
        )
        .unwrap();

        let loaded = store.load(part_id).unwrap().unwrap();
        let data = loaded.normalize();
        assert_eq!(data.material_rows[0].material_name, "Old stock");
        assert_eq!(data.quantity, 3);
        store_cleanup(&store);
    }

    fn store_cleanup(store: &FileRecordStore) {
        let _ = fs::remove_dir_all(&store.dir);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let store = temp_store("corrupt");
        let part_id = Uuid::new_v4();
        fs::create_dir_all(store.record_path(part_id).parent().unwrap()).unwrap();
        fs::write(store.record_path(part_id), "not json at all").unwrap();

        let err = store.load(part_id).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        store_cleanup(&store);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryRecordStore::new();
        let part_id = Uuid::new_v4();
        assert!(store.is_empty());

        store.save(part_id, &populated_data()).unwrap();
        assert_eq!(store.len(), 1);
        let loaded = store.load(part_id).unwrap().unwrap();
        assert_eq!(loaded.normalize(), populated_data());
        assert_eq!(store.load(Uuid::new_v4()).unwrap(), None);
    }
}
