pub mod report;

use crate::config::{
    PipelineConfig, DEFAULT_CATALOG_PATH, DEFAULT_PROCESSED_DIR, DEFAULT_RAW_DIR,
    DEFAULT_SPLIT_PATH,
};
use crate::split::Partition;
use crate::types::{ModalityLabel, StorageBackend};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for neurosift
#[derive(Parser, Debug)]
#[command(name = "neurosift")]
#[command(about = "MRI DICOM ingestion, modality labeling and dataset splitting")]
#[command(version)]
pub struct Cli {
    /// Root of the raw DICOM tree
    #[arg(long, global = true, env = "NEUROSIFT_RAW_DIR", default_value = DEFAULT_RAW_DIR)]
    pub raw_dir: PathBuf,

    /// Directory receiving derived PNG images
    #[arg(long, global = true, env = "NEUROSIFT_PROCESSED_DIR", default_value = DEFAULT_PROCESSED_DIR)]
    pub processed_dir: PathBuf,

    /// SQLite catalog database
    #[arg(long, global = true, env = "NEUROSIFT_CATALOG", default_value = DEFAULT_CATALOG_PATH)]
    pub catalog: PathBuf,

    /// Persisted train/test split
    #[arg(long, global = true, env = "NEUROSIFT_SPLIT_FILE", default_value = DEFAULT_SPLIT_PATH)]
    pub split_file: PathBuf,

    /// Object-storage bucket used as the storage-key prefix instead of "local"
    #[arg(long, global = true, env = "NEUROSIFT_BUCKET")]
    pub bucket: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Window every raw slice into a PNG and catalog it
    Ingest,

    /// Write derived images for one patient without cataloging them
    ProcessPatient {
        #[arg(value_name = "PATIENT_ID")]
        patient_id: String,
    },

    /// Label catalog records from the raw series descriptions
    Label,

    /// Build and persist the patient-level train/test split
    Split {
        /// Shuffle seed
        #[arg(long, default_value_t = crate::split::DEFAULT_SPLIT_SEED)]
        seed: u64,

        /// Write the split here instead of --split-file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List catalog records
    Query {
        /// Restrict to these patients
        #[arg(long = "patient")]
        patients: Vec<String>,

        /// Restrict to these modality labels
        #[arg(long = "modality")]
        modalities: Vec<ModalityLabel>,

        /// Only records without a label
        #[arg(long)]
        unlabeled: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the labeled images of one split partition
    Cohort {
        #[arg(long, default_value = "train")]
        partition: Partition,

        /// Classes to keep, in class-index order (default: T1 T2 FLAIR)
        #[arg(long = "class")]
        classes: Vec<ModalityLabel>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the label inferred from a series description
    Infer {
        #[arg(value_name = "DESCRIPTION")]
        description: String,
    },
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

impl Cli {
    /// Pipeline configuration assembled from the global flags
    pub fn config(&self) -> PipelineConfig {
        let storage = match self.bucket {
            Some(ref name) => StorageBackend::Bucket(name.clone()),
            None => StorageBackend::Local,
        };
        PipelineConfig::default()
            .with_raw_dir(&self.raw_dir)
            .with_processed_dir(&self.processed_dir)
            .with_catalog_path(&self.catalog)
            .with_split_path(&self.split_file)
            .with_storage(storage)
    }
}
