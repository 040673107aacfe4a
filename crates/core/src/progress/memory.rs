use super::{ProgressRecord, ProgressResult, ProgressStore};
use dashmap::DashMap;

/// In-process progress store backed by a sharded concurrent map.
///
/// Nothing survives a restart. Used by tests and by ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: DashMap<String, ProgressRecord>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn find(&self, file_name: &str) -> ProgressResult<Option<ProgressRecord>> {
        Ok(self.records.get(file_name).map(|entry| entry.value().clone()))
    }

    fn save(&self, record: &ProgressRecord) -> ProgressResult<()> {
        self.records
            .insert(record.file_name.clone(), record.clone());
        Ok(())
    }

    fn delete_by_name(&self, file_name: &str) -> ProgressResult<()> {
        self.records.remove(file_name);
        Ok(())
    }

    fn delete_all(&self) -> ProgressResult<()> {
        self.records.clear();
        Ok(())
    }
}
