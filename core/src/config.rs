use crate::split::{DEFAULT_SPLIT_SEED, DEFAULT_TRAIN_FRACTION};
use crate::types::StorageBackend;
use crate::windowing::WindowStrategy;
use std::path::PathBuf;

pub const DEFAULT_RAW_DIR: &str = "data/raw/dicom";
pub const DEFAULT_PROCESSED_DIR: &str = "data/raw/processed";
pub const DEFAULT_CATALOG_PATH: &str = "neurosift.db";
pub const DEFAULT_SPLIT_PATH: &str = "data/splits.json";

/// Locations and knobs shared by every pipeline stage
///
/// # Example
///
/// ```
/// use neurosift_core::{PipelineConfig, StorageBackend};
///
/// let config = PipelineConfig::default()
///     .with_raw_dir("/mnt/tcia/dicom")
///     .with_storage(StorageBackend::Bucket("neuro-images".to_string()))
///     .with_seed(7);
///
/// assert_eq!(config.storage.prefix(), "neuro-images");
/// assert_eq!(config.split_seed, 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Root of the raw DICOM tree
    pub raw_dir: PathBuf,

    /// Processed-file area receiving derived PNGs
    pub processed_dir: PathBuf,

    /// SQLite catalog database file
    pub catalog_path: PathBuf,

    /// Persisted train/test split artifact
    pub split_path: PathBuf,

    /// Storage backend, which decides the storage-key prefix
    pub storage: StorageBackend,

    /// Intensity windowing used by the ingestor
    pub window: WindowStrategy,

    /// Seed for the patient shuffle
    pub split_seed: u64,

    /// Share of patients assigned to the train partition
    pub train_fraction: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            split_path: PathBuf::from(DEFAULT_SPLIT_PATH),
            storage: StorageBackend::Local,
            window: WindowStrategy::default(),
            split_seed: DEFAULT_SPLIT_SEED,
            train_fraction: DEFAULT_TRAIN_FRACTION,
        }
    }
}

impl PipelineConfig {
    pub fn with_raw_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.raw_dir = dir.into();
        self
    }

    pub fn with_processed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.processed_dir = dir.into();
        self
    }

    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = path.into();
        self
    }

    pub fn with_split_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.split_path = path.into();
        self
    }

    pub fn with_storage(mut self, storage: StorageBackend) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_window(mut self, window: WindowStrategy) -> Self {
        self.window = window;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.split_seed = seed;
        self
    }

    /// Builder: train share, clamped to `[0, 1]`
    pub fn with_train_fraction(mut self, fraction: f64) -> Self {
        self.train_fraction = fraction.clamp(0.0, 1.0);
        self
    }
}
