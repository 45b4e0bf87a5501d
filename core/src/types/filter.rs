use crate::types::{ImageRecord, ModalityLabel};
use std::collections::HashSet;

/// Predicates for catalog queries
///
/// Every populated predicate must hold for a record to match. An empty
/// filter matches every record.
///
/// # Example
///
/// ```
/// use neurosift_core::{ModalityLabel, RecordFilter};
///
/// let filter = RecordFilter::default()
///     .with_patients(["UPENN-GBM-00001", "UPENN-GBM-00002"])
///     .with_modalities([ModalityLabel::T1, ModalityLabel::Flair]);
///
/// assert_eq!(filter.patient_ids.unwrap().len(), 2);
/// assert!(!filter.unlabeled_only);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordFilter {
    /// Allowed patient ids. If None, all patients are allowed.
    pub patient_ids: Option<HashSet<String>>,

    /// Allowed modality labels. If None, all labels (and unset) are allowed.
    /// When set, records with no label never match.
    pub modalities: Option<HashSet<ModalityLabel>>,

    /// Only records whose modality is still unset
    pub unlabeled_only: bool,
}

impl RecordFilter {
    /// Builder: restrict to a single patient
    pub fn with_patient(self, patient_id: impl Into<String>) -> Self {
        self.with_patients([patient_id.into()])
    }

    /// Builder: restrict to a set of patients
    pub fn with_patients<I, S>(mut self, patient_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patient_ids = Some(patient_ids.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: restrict to a set of modality labels
    pub fn with_modalities<I>(mut self, modalities: I) -> Self
    where
        I: IntoIterator<Item = ModalityLabel>,
    {
        self.modalities = Some(modalities.into_iter().collect());
        self
    }

    /// Builder: only records without a label
    pub fn unlabeled_only(mut self, unlabeled: bool) -> Self {
        self.unlabeled_only = unlabeled;
        self
    }

    /// Checks a record against every predicate
    pub fn matches(&self, record: &ImageRecord) -> bool {
        if let Some(ref patients) = self.patient_ids {
            if !patients.contains(&record.patient_id) {
                return false;
            }
        }

        if let Some(ref modalities) = self.modalities {
            match record.modality {
                Some(label) if modalities.contains(&label) => {}
                _ => return false,
            }
        }

        !(self.unlabeled_only && record.is_labeled())
    }
}
