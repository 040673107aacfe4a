//! Reading progress index.
//!
//! Tracks, per file name, the last position a reader reached. The index is split in two:
//!
//! - [`ProgressStore`]: the keyed persistence engine. It stores whole [`ProgressRecord`]s and
//!   knows nothing about defaults.
//! - [`ProgressIndex`]: the get-or-default / upsert semantics layered on top of any store.
//!
//! Two engines ship with the crate: [`YamlProgressStore`] keeps one YAML document per record on
//! disk, and [`MemoryProgressStore`] keeps records in a concurrent map.
//!
//! The index does not check that a file with the given name exists. Keeping records and files
//! in step is the job of [`crate::LibraryService`].

mod memory;
mod yaml;

pub use memory::MemoryProgressStore;
pub use yaml::YamlProgressStore;

use crate::constants::DEFAULT_LAST_READ_POSITION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("failed to create progress directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read progress record: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write progress record: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to delete progress record: {0}")]
    FileDelete(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("failed to delete {} progress records: {}", .failed.len(), .failed.join(", "))]
    BulkDelete { failed: Vec<String> },
}

pub type ProgressResult<T> = std::result::Result<T, ProgressError>;

/// The last-read position for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub file_name: String,
    pub last_read_position: u64,
    /// When the position last changed. Informational only.
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn new(file_name: impl Into<String>, last_read_position: u64) -> Self {
        Self {
            file_name: file_name.into(),
            last_read_position,
            updated_at: Utc::now(),
        }
    }
}

/// Keyed persistence engine for progress records.
///
/// Implementations hold at most one record per file name, and each call must be atomic from
/// the caller's point of view. Implementations must not serialise calls for unrelated names
/// behind a single lock.
pub trait ProgressStore: Send + Sync + std::fmt::Debug {
    /// Returns the record for `file_name`, if one exists.
    fn find(&self, file_name: &str) -> ProgressResult<Option<ProgressRecord>>;

    /// Inserts `record`, replacing any existing record with the same file name.
    fn save(&self, record: &ProgressRecord) -> ProgressResult<()>;

    /// Removes the record for `file_name`. Removing an absent record succeeds.
    fn delete_by_name(&self, file_name: &str) -> ProgressResult<()>;

    /// Removes every record.
    fn delete_all(&self) -> ProgressResult<()>;
}

/// Get-or-default and upsert semantics over a [`ProgressStore`].
#[derive(Clone, Debug)]
pub struct ProgressIndex {
    store: Arc<dyn ProgressStore>,
}

impl ProgressIndex {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// Returns the stored position for `file_name`, or [`DEFAULT_LAST_READ_POSITION`].
    ///
    /// Nothing is persisted for a missing record.
    ///
    /// # Errors
    ///
    /// Only if the underlying store fails; a missing record is not an error.
    pub fn get(&self, file_name: &str) -> ProgressResult<u64> {
        Ok(self
            .store
            .find(file_name)?
            .map(|record| record.last_read_position)
            .unwrap_or(DEFAULT_LAST_READ_POSITION))
    }

    /// Sets the position for `file_name`, creating the record if needed.
    ///
    /// The position is accepted as-is. Setting the value a record already holds writes nothing.
    pub fn upsert(&self, file_name: &str, position: u64) -> ProgressResult<()> {
        let mut record = match self.store.find(file_name)? {
            Some(record) if record.last_read_position == position => return Ok(()),
            Some(record) => record,
            None => ProgressRecord::new(file_name, DEFAULT_LAST_READ_POSITION),
        };

        record.last_read_position = position;
        record.updated_at = Utc::now();
        self.store.save(&record)
    }

    pub fn delete_by_name(&self, file_name: &str) -> ProgressResult<()> {
        self.store.delete_by_name(file_name)
    }

    pub fn delete_all(&self) -> ProgressResult<()> {
        self.store.delete_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_index() -> (ProgressIndex, Arc<MemoryProgressStore>) {
        let store = Arc::new(MemoryProgressStore::new());
        (ProgressIndex::new(store.clone()), store)
    }

    #[test]
    fn test_get_defaults_without_persisting() {
        let (index, store) = memory_index();

        assert_eq!(index.get("unknown.pdf").unwrap(), DEFAULT_LAST_READ_POSITION);
        assert_eq!(index.get("unknown.pdf").unwrap(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_upsert_creates_then_replaces() {
        let (index, store) = memory_index();

        index.upsert("book.pdf", 42).unwrap();
        assert_eq!(index.get("book.pdf").unwrap(), 42);

        index.upsert("book.pdf", 7).unwrap();
        assert_eq!(index.get("book.pdf").unwrap(), 7);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_upsert_accepts_zero_and_large_positions() {
        let (index, _) = memory_index();

        index.upsert("a.pdf", 0).unwrap();
        assert_eq!(index.get("a.pdf").unwrap(), 0);

        index.upsert("a.pdf", u64::MAX).unwrap();
        assert_eq!(index.get("a.pdf").unwrap(), u64::MAX);
    }

    #[test]
    fn test_upsert_same_value_leaves_record_unchanged() {
        let (index, store) = memory_index();

        index.upsert("book.pdf", 5).unwrap();
        let before = store.find("book.pdf").unwrap().unwrap();

        index.upsert("book.pdf", 5).unwrap();
        let after = store.find("book.pdf").unwrap().unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn test_delete_by_name_restores_default() {
        let (index, _) = memory_index();

        index.upsert("book.pdf", 12).unwrap();
        index.delete_by_name("book.pdf").unwrap();
        index.delete_by_name("book.pdf").unwrap();

        assert_eq!(index.get("book.pdf").unwrap(), 1);
    }

    #[test]
    fn test_delete_all() {
        let (index, store) = memory_index();

        index.upsert("a.pdf", 2).unwrap();
        index.upsert("b.pdf", 3).unwrap();
        index.delete_all().unwrap();

        assert!(store.is_empty());
        assert_eq!(index.get("a.pdf").unwrap(), 1);
        assert_eq!(index.get("b.pdf").unwrap(), 1);
    }

    #[test]
    fn test_record_yaml_shape() {
        let record = ProgressRecord {
            file_name: "book.pdf".into(),
            last_read_position: 9,
            updated_at: "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap(),
        };

        let yaml = serde_yaml::to_string(&record).unwrap();
        assert!(yaml.contains("file_name: book.pdf"));
        assert!(yaml.contains("last_read_position: 9"));

        let parsed: ProgressRecord = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, record);
    }
}
