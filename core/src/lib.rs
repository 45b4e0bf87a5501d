pub mod api;
pub mod catalog;
pub mod cli;
pub mod cohort;
pub mod config;
pub mod error;
pub mod extraction;
pub mod ingest;
pub mod label;
pub mod scan;
pub mod split;
pub mod types;
pub mod windowing;

#[cfg(test)]
pub(crate) mod testing;

pub use api::Pipeline;
pub use catalog::{Catalog, InMemoryCatalog, SqliteCatalog};
pub use cohort::{CohortEntry, CohortIndex};
pub use config::PipelineConfig;
pub use error::{NeurosiftError, Result};
pub use extraction::{infer_modality, DicomHeader};
pub use ingest::{DicomIngestor, IngestSummary};
pub use label::{LabelSummary, ModalityLabeler};
pub use split::{Partition, SplitAssignment, SplitBuilder};
pub use types::*;
pub use windowing::{window, PixelSlice, WindowLevel, WindowStrategy};
