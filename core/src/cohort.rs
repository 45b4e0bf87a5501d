//! Labeled cohort of one split partition, ready for a training loader

use crate::catalog::Catalog;
use crate::error::Result;
use crate::split::{Partition, SplitAssignment};
use crate::types::{ModalityLabel, RecordFilter, RecordId, StorageBackend, ANATOMICAL_LABELS};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One image of a cohort
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortEntry {
    pub record_id: RecordId,
    pub patient_id: String,
    pub storage_key: String,
    /// Derived image on the processed-file area; `None` for bucket storage
    pub local_path: Option<PathBuf>,
    pub label: ModalityLabel,
    pub class_index: usize,
}

/// Records of one partition restricted to a set of modality classes
///
/// Class indices follow the order of the requested classes, so
/// `[T1, T2, FLAIR]` maps to `0, 1, 2`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortIndex {
    pub partition: String,
    pub class_to_index: BTreeMap<String, usize>,
    pub entries: Vec<CohortEntry>,
}

impl CohortIndex {
    /// Builds the cohort from the catalog and a persisted split
    ///
    /// `classes` defaults to [`ANATOMICAL_LABELS`] when empty; repeated
    /// classes keep their first index. Only records whose patient belongs to
    /// `partition` and whose modality is one of `classes` are included.
    pub fn build<C: Catalog + ?Sized>(
        catalog: &C,
        split: &SplitAssignment,
        partition: Partition,
        classes: &[ModalityLabel],
        backend: &StorageBackend,
        processed_dir: &Path,
    ) -> Result<Self> {
        let classes: Vec<ModalityLabel> = if classes.is_empty() {
            ANATOMICAL_LABELS.to_vec()
        } else {
            let mut unique = Vec::with_capacity(classes.len());
            for label in classes {
                if !unique.contains(label) {
                    unique.push(*label);
                }
            }
            unique
        };

        let filter = RecordFilter::default()
            .with_patients(split.patients(partition).iter().cloned())
            .with_modalities(classes.iter().copied());

        let entries: Vec<CohortEntry> = catalog
            .query(&filter)?
            .into_iter()
            .filter_map(|record| {
                let label = record.modality?;
                let class_index = classes.iter().position(|c| *c == label)?;
                Some(CohortEntry {
                    record_id: record.id,
                    local_path: backend.resolve_local(&record.storage_key, processed_dir),
                    patient_id: record.patient_id,
                    storage_key: record.storage_key,
                    label,
                    class_index,
                })
            })
            .collect();

        info!(
            "Loaded {} images for {} partition",
            entries.len(),
            partition
        );

        Ok(Self {
            partition: partition.to_string(),
            class_to_index: classes
                .iter()
                .enumerate()
                .map(|(i, label)| (label.to_string(), i))
                .collect(),
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries per class index
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.class_to_index.len()];
        for entry in &self.entries {
            counts[entry.class_index] += 1;
        }
        counts
    }
}
