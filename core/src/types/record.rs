use super::ModalityLabel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Surrogate record identity assigned by a catalog on insert
pub type RecordId = i64;

/// Natural deduplication key of a catalog record
///
/// No two records in a catalog share a `RecordKey`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub patient_id: String,
    pub graphic_id: String,
}

impl RecordKey {
    /// Creates a new RecordKey
    pub fn new(patient_id: impl Into<String>, graphic_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            graphic_id: graphic_id.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.patient_id, self.graphic_id)
    }
}

/// Record submitted to [`Catalog::insert_if_absent`](crate::catalog::Catalog::insert_if_absent)
///
/// Identity, storage key, modality and timestamp are assigned by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct NewImageRecord {
    pub key: RecordKey,
    pub series_id: String,
    pub caption: String,
}

impl NewImageRecord {
    /// Creates a new record with an empty caption
    pub fn new(key: RecordKey, series_id: impl Into<String>) -> Self {
        Self {
            key,
            series_id: series_id.into(),
            caption: String::new(),
        }
    }

    /// Builder: set the free-text caption
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }
}

/// One cataloged derived image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: RecordId,
    pub patient_id: String,
    pub series_id: String,
    pub graphic_id: String,
    /// Locator of the derived image, `{backend prefix}/{graphic_id}`
    pub storage_key: String,
    pub caption: String,
    /// `None` until the labeler assigns a label
    pub modality: Option<ModalityLabel>,
    pub is_valid: bool,
    pub collected_at: DateTime<Utc>,
}

impl ImageRecord {
    /// Returns whether the labeler has assigned a label
    pub fn is_labeled(&self) -> bool {
        self.modality.is_some()
    }
}

/// Result of an insert-if-absent call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Id of the stored record, whether new or pre-existing
    pub id: RecordId,
    /// `false` when a record with the same key already existed
    pub inserted: bool,
}
