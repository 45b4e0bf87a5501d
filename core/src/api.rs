use crate::catalog::{Catalog, SqliteCatalog};
use crate::cohort::CohortIndex;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::ingest::{DicomIngestor, IngestSummary};
use crate::label::{LabelSummary, ModalityLabeler};
use crate::split::{Partition, SplitAssignment, SplitBuilder};
use crate::types::{ImageRecord, ModalityLabel, RecordFilter};
use log::info;
use std::path::PathBuf;

/// Pipeline stages bound to one configuration
///
/// Each stage opens its own catalog connection from
/// [`PipelineConfig::catalog_path`] and drops it before returning, so no
/// connection outlives the operation that needed it.
///
/// # Example
///
/// ```
/// use neurosift_core::{Pipeline, PipelineConfig, RecordFilter};
///
/// let dir = tempfile::tempdir().unwrap();
/// let config = PipelineConfig::default()
///     .with_raw_dir(dir.path().join("raw"))
///     .with_catalog_path(dir.path().join("catalog.db"));
///
/// let pipeline = Pipeline::new(config);
/// let records = pipeline.query(&RecordFilter::default()).unwrap();
/// assert!(records.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Opens the configured SQLite catalog, creating it if needed
    pub fn open_catalog(&self) -> Result<SqliteCatalog> {
        SqliteCatalog::open(&self.config.catalog_path, self.config.storage.clone())
    }

    /// Ingests the raw tree into the processed area and the catalog
    pub fn ingest(&self) -> Result<IngestSummary> {
        let mut catalog = self.open_catalog()?;
        DicomIngestor::from_config(&self.config).run(&mut catalog)
    }

    /// Writes derived images for one patient; the catalog is not touched
    pub fn process_patient(&self, patient_id: &str) -> Result<Vec<PathBuf>> {
        DicomIngestor::from_config(&self.config).process_patient(patient_id)
    }

    /// Back-fills modality labels from the raw series descriptions
    pub fn label(&self) -> Result<LabelSummary> {
        let mut catalog = self.open_catalog()?;
        ModalityLabeler::from_config(&self.config).run(&mut catalog)
    }

    /// Builds the patient split and persists it to the configured path
    pub fn split(&self) -> Result<SplitAssignment> {
        let catalog = self.open_catalog()?;
        let split = SplitBuilder::from_config(&self.config).build(&catalog)?;
        split.save(&self.config.split_path)?;
        info!("Split saved to {}", self.config.split_path.display());
        Ok(split)
    }

    /// Loads the persisted split, failing if it is missing or malformed
    pub fn load_split(&self) -> Result<SplitAssignment> {
        SplitAssignment::load(&self.config.split_path)
    }

    pub fn query(&self, filter: &RecordFilter) -> Result<Vec<ImageRecord>> {
        self.open_catalog()?.query(filter)
    }

    /// Builds the labeled cohort of one partition of the persisted split
    pub fn cohort(&self, partition: Partition, classes: &[ModalityLabel]) -> Result<CohortIndex> {
        let split = self.load_split()?;
        let catalog = self.open_catalog()?;
        CohortIndex::build(
            &catalog,
            &split,
            partition,
            classes,
            &self.config.storage,
            &self.config.processed_dir,
        )
    }
}
