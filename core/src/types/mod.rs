//! Core type definitions for the ingestion-and-labeling pipeline
//!
//! - [`ModalityLabel`]: closed set of MRI sequence labels
//! - [`ImageRecord`]: one cataloged derived image, keyed by [`RecordKey`]
//! - [`GraphicId`]: naming scheme of derived images
//! - [`RecordFilter`]: predicates for catalog queries
//! - [`StorageBackend`]: storage-key prefix policy

mod filter;
mod graphic_id;
mod modality;
mod record;
mod storage;

pub use filter::RecordFilter;
pub use graphic_id::{series_suffix, GraphicId, DERIVED_EXTENSION, SERIES_SUFFIX_LEN};
pub use modality::{ModalityLabel, ANATOMICAL_LABELS};
pub use record::{ImageRecord, InsertOutcome, NewImageRecord, RecordId, RecordKey};
pub use storage::{StorageBackend, DEFAULT_BUCKET, LOCAL_PREFIX};
