//! Metadata catalog of derived images
//!
//! Stages receive a catalog explicitly and never share an ambient
//! connection. Every method is synchronous; each write is all-or-nothing
//! at the single-record granularity.

mod memory;
mod sqlite;

pub use memory::InMemoryCatalog;
pub use sqlite::SqliteCatalog;

use crate::error::Result;
use crate::types::{ImageRecord, InsertOutcome, ModalityLabel, NewImageRecord, RecordFilter, RecordId};
use std::collections::BTreeSet;

/// Durable store of image records
pub trait Catalog {
    /// Stores `record` unless one with the same [`RecordKey`](crate::types::RecordKey) exists
    ///
    /// A new record gets a fresh id, a storage key prefixed per the
    /// catalog's storage backend, an unset modality and the current time.
    /// An existing record is left untouched and `inserted` is `false`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`](crate::NeurosiftError::CatalogError) if the
    /// write fails; nothing from the failed attempt stays visible.
    fn insert_if_absent(&mut self, record: NewImageRecord) -> Result<InsertOutcome>;

    /// Returns records matching every predicate of `filter`, in id order
    fn query(&self, filter: &RecordFilter) -> Result<Vec<ImageRecord>>;

    /// Returns the distinct patient ids present in the catalog
    fn list_distinct_patients(&self) -> Result<BTreeSet<String>>;

    /// Sets the modality of one record
    ///
    /// # Errors
    ///
    /// Returns [`RecordNotFound`](crate::NeurosiftError::RecordNotFound) for an unknown id
    fn update_modality(&mut self, id: RecordId, label: ModalityLabel) -> Result<()>;

    /// Fetches a single record by id
    fn get(&self, id: RecordId) -> Result<Option<ImageRecord>>;
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behavior every catalog backend must share

    use super::*;
    use crate::types::RecordKey;

    fn new_record(patient: &str, graphic: &str) -> NewImageRecord {
        NewImageRecord::new(RecordKey::new(patient, graphic), "1.2.840.99.12345")
            .with_caption("Age: 050Y, Sex: F")
    }

    pub fn insert_is_idempotent(catalog: &mut dyn Catalog) {
        let first = catalog
            .insert_if_absent(new_record("P1", "P1_12345_1.png"))
            .unwrap();
        let second = catalog
            .insert_if_absent(new_record("P1", "P1_12345_1.png"))
            .unwrap();

        assert!(first.inserted);
        assert!(!second.inserted);
        assert_eq!(first.id, second.id);
        assert_eq!(catalog.query(&RecordFilter::default()).unwrap().len(), 1);
    }

    pub fn insert_assigns_defaults(catalog: &mut dyn Catalog, prefix: &str) {
        let outcome = catalog
            .insert_if_absent(new_record("P1", "P1_12345_1.png"))
            .unwrap();
        let record = catalog.get(outcome.id).unwrap().unwrap();

        assert_eq!(record.patient_id, "P1");
        assert_eq!(record.series_id, "1.2.840.99.12345");
        assert_eq!(record.storage_key, format!("{}/P1_12345_1.png", prefix));
        assert_eq!(record.caption, "Age: 050Y, Sex: F");
        assert_eq!(record.modality, None);
        assert!(record.is_valid);
    }

    pub fn same_graphic_different_patient(catalog: &mut dyn Catalog) {
        assert!(catalog.insert_if_absent(new_record("P1", "g.png")).unwrap().inserted);
        assert!(catalog.insert_if_absent(new_record("P2", "g.png")).unwrap().inserted);
        assert_eq!(
            catalog.list_distinct_patients().unwrap().into_iter().collect::<Vec<_>>(),
            vec!["P1".to_string(), "P2".to_string()]
        );
    }

    pub fn update_and_query(catalog: &mut dyn Catalog) {
        let a = catalog.insert_if_absent(new_record("P1", "a.png")).unwrap().id;
        let b = catalog.insert_if_absent(new_record("P1", "b.png")).unwrap().id;
        let c = catalog.insert_if_absent(new_record("P2", "c.png")).unwrap().id;

        catalog.update_modality(a, ModalityLabel::T1).unwrap();
        catalog.update_modality(c, ModalityLabel::Flair).unwrap();

        let t1 = catalog
            .query(&RecordFilter::default().with_modalities([ModalityLabel::T1]))
            .unwrap();
        assert_eq!(t1.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a]);

        let p1 = catalog
            .query(&RecordFilter::default().with_patient("P1"))
            .unwrap();
        assert_eq!(p1.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a, b]);

        let unlabeled = catalog
            .query(&RecordFilter::default().unlabeled_only(true))
            .unwrap();
        assert_eq!(unlabeled.iter().map(|r| r.id).collect::<Vec<_>>(), vec![b]);

        let anatomical_p2 = catalog
            .query(
                &RecordFilter::default()
                    .with_patients(["P2"])
                    .with_modalities([ModalityLabel::T1, ModalityLabel::Flair]),
            )
            .unwrap();
        assert_eq!(anatomical_p2.len(), 1);
        assert_eq!(anatomical_p2[0].modality, Some(ModalityLabel::Flair));
    }

    pub fn update_unknown_id_fails(catalog: &mut dyn Catalog) {
        catalog.insert_if_absent(new_record("P1", "a.png")).unwrap();
        for id in [999, 0, -1, RecordId::MIN, RecordId::MAX] {
            assert!(matches!(
                catalog.update_modality(id, ModalityLabel::T2),
                Err(crate::error::NeurosiftError::RecordNotFound(_))
            ));
            assert_eq!(catalog.get(id).unwrap(), None);
        }
    }

    pub fn empty_membership_matches_nothing(catalog: &mut dyn Catalog) {
        catalog.insert_if_absent(new_record("P1", "a.png")).unwrap();
        let none = catalog
            .query(&RecordFilter::default().with_patients(Vec::<String>::new()))
            .unwrap();
        assert!(none.is_empty());
    }
}
