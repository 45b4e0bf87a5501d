use super::Catalog;
use crate::error::{NeurosiftError, Result};
use crate::types::{
    ImageRecord, InsertOutcome, ModalityLabel, NewImageRecord, RecordFilter, RecordId, RecordKey,
    StorageBackend,
};
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};

/// Catalog held entirely in memory
///
/// Useful for tests and dry runs; contents vanish with the value.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    backend: StorageBackend,
    records: Vec<ImageRecord>,
    index: HashMap<RecordKey, RecordId>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog for the given storage backend
    pub fn new(backend: StorageBackend) -> Self {
        Self {
            backend,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        // ids are assigned densely from 1
        id.checked_sub(1)
            .and_then(|pos| usize::try_from(pos).ok())
            .filter(|&pos| pos < self.records.len())
    }
}

impl Catalog for InMemoryCatalog {
    fn insert_if_absent(&mut self, record: NewImageRecord) -> Result<InsertOutcome> {
        if let Some(&id) = self.index.get(&record.key) {
            return Ok(InsertOutcome {
                id,
                inserted: false,
            });
        }

        let id = self.records.len() as RecordId + 1;
        let storage_key = self.backend.storage_key(&record.key.graphic_id);
        self.records.push(ImageRecord {
            id,
            patient_id: record.key.patient_id.clone(),
            series_id: record.series_id,
            graphic_id: record.key.graphic_id.clone(),
            storage_key,
            caption: record.caption,
            modality: None,
            is_valid: true,
            collected_at: Utc::now(),
        });
        self.index.insert(record.key, id);

        Ok(InsertOutcome { id, inserted: true })
    }

    fn query(&self, filter: &RecordFilter) -> Result<Vec<ImageRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    fn list_distinct_patients(&self) -> Result<BTreeSet<String>> {
        Ok(self.records.iter().map(|r| r.patient_id.clone()).collect())
    }

    fn update_modality(&mut self, id: RecordId, label: ModalityLabel) -> Result<()> {
        let pos = self
            .position(id)
            .ok_or(NeurosiftError::RecordNotFound(id))?;
        self.records[pos].modality = Some(label);
        Ok(())
    }

    fn get(&self, id: RecordId) -> Result<Option<ImageRecord>> {
        Ok(self.position(id).map(|pos| self.records[pos].clone()))
    }
}
