//! Deterministic patient-level train/test split

use crate::catalog::Catalog;
use crate::config::PipelineConfig;
use crate::error::{NeurosiftError, Result};
use log::info;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Seed used when none is configured
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Share of patients assigned to `train` by default
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;

/// One side of a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Train,
    Test,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Train => write!(f, "train"),
            Partition::Test => write!(f, "test"),
        }
    }
}

impl FromStr for Partition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "train" => Ok(Partition::Train),
            "test" => Ok(Partition::Test),
            other => Err(format!("unknown partition: {}", other)),
        }
    }
}

/// Train/test assignment of patient ids
///
/// Persisted as `{"train": [...], "test": [...]}`; the two lists are
/// disjoint and together cover every patient known at build time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SplitAssignment {
    pub train: Vec<String>,
    pub test: Vec<String>,
}

impl SplitAssignment {
    /// Patient ids of one partition
    pub fn patients(&self, partition: Partition) -> &[String] {
        match partition {
            Partition::Train => &self.train,
            Partition::Test => &self.test,
        }
    }

    /// Total number of patients across both partitions
    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train.is_empty() && self.test.is_empty()
    }

    /// Writes the artifact as pretty-printed JSON, replacing any previous one
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Loads a persisted artifact, failing closed
    ///
    /// # Errors
    ///
    /// - [`MissingSplit`](NeurosiftError::MissingSplit) if the file is absent
    /// - [`InvalidSplit`](NeurosiftError::InvalidSplit) if it is malformed or
    ///   a patient appears more than once
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NeurosiftError::MissingSplit(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        let split: SplitAssignment = serde_json::from_str(&text)
            .map_err(|e| NeurosiftError::InvalidSplit(format!("{}: {}", path.display(), e)))?;
        split.validate()?;
        Ok(split)
    }

    /// Checks that no patient id appears twice across or within partitions
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for patient in self.train.iter().chain(self.test.iter()) {
            if !seen.insert(patient.as_str()) {
                return Err(NeurosiftError::InvalidSplit(format!(
                    "patient {} assigned more than once",
                    patient
                )));
            }
        }
        Ok(())
    }
}

/// Builds reproducible splits from the catalog's patient population
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitBuilder {
    seed: u64,
    train_fraction: f64,
}

impl Default for SplitBuilder {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SPLIT_SEED,
            train_fraction: DEFAULT_TRAIN_FRACTION,
        }
    }
}

impl SplitBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.split_seed).with_train_fraction(config.train_fraction)
    }

    /// Builder: train share, clamped to `[0, 1]`
    pub fn with_train_fraction(mut self, fraction: f64) -> Self {
        self.train_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Splits the distinct patients currently in `catalog`
    pub fn build<C: Catalog + ?Sized>(&self, catalog: &C) -> Result<SplitAssignment> {
        let patients = catalog.list_distinct_patients()?;
        let split = self.split(patients);
        info!(
            "Split created: {} train patients, {} test patients (seed {})",
            split.train.len(),
            split.test.len(),
            self.seed
        );
        Ok(split)
    }

    /// Splits an arbitrary patient population
    ///
    /// Duplicates are removed and the ids sorted before the seeded shuffle,
    /// so the result depends only on the set of ids and the seed. The first
    /// `floor(train_fraction * n)` shuffled ids form `train`.
    pub fn split<I, S>(&self, patients: I) -> SplitAssignment
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: Vec<String> = patients.into_iter().map(Into::into).collect();
        ids.sort();
        ids.dedup();

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        ids.shuffle(&mut rng);

        let cut = ((self.train_fraction * ids.len() as f64).floor() as usize).min(ids.len());
        let test = ids.split_off(cut);
        SplitAssignment { train: ids, test }
    }
}
