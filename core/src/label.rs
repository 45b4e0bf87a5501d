//! Second pass: series descriptions to catalog modality labels

use crate::catalog::Catalog;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::extraction::tags::PIXEL_DATA;
use crate::extraction::{infer_modality, SeriesHeader};
use crate::scan::collect_dicom_files;
use crate::types::{GraphicId, ModalityLabel, RecordFilter};
use dicom_object::OpenFileOptions;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Inferred label per SeriesInstanceUID, in first-seen order
///
/// Built fresh on every labeling run and never persisted. The first file
/// seen for a series decides its label.
#[derive(Debug, Clone, Default)]
pub struct SeriesLabelMap {
    entries: Vec<(String, ModalityLabel)>,
    index: HashMap<String, usize>,
}

impl SeriesLabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `series_uid` unless already present
    ///
    /// `infer` is only evaluated for unseen series. Returns `true` if the
    /// entry was added.
    pub fn insert_with(&mut self, series_uid: &str, infer: impl FnOnce() -> ModalityLabel) -> bool {
        if self.index.contains_key(series_uid) {
            return false;
        }
        self.index.insert(series_uid.to_string(), self.entries.len());
        self.entries.push((series_uid.to_string(), infer()));
        true
    }

    /// Exact lookup by full series identifier
    pub fn get(&self, series_uid: &str) -> Option<ModalityLabel> {
        self.index.get(series_uid).map(|&i| self.entries[i].1)
    }

    /// Finds the first entry, in insertion order, whose key ends with `suffix`
    ///
    /// Also returns how many entries share that suffix; a count above one
    /// means the match is ambiguous and the first entry won.
    pub fn find_by_suffix(&self, suffix: &str) -> Option<(&str, ModalityLabel, usize)> {
        if suffix.is_empty() {
            return None;
        }
        let mut matches = self
            .entries
            .iter()
            .filter(|(uid, _)| uid.ends_with(suffix));
        let (uid, label) = matches.next()?;
        Some((uid.as_str(), *label, 1 + matches.count()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counters reported by [`ModalityLabeler::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelSummary {
    /// Unique series found in the raw tree
    pub series: usize,
    /// Catalog records examined
    pub records: usize,
    /// Records whose modality changed
    pub updated: usize,
    /// Records with no matching series, an Unknown label, or an unparseable graphic id
    pub unmatched: usize,
    /// Records matched through a suffix shared by several series
    pub ambiguous: usize,
}

/// Back-fills catalog modality labels from raw series descriptions
#[derive(Debug, Clone)]
pub struct ModalityLabeler {
    raw_root: PathBuf,
}

impl ModalityLabeler {
    pub fn new(raw_root: impl Into<PathBuf>) -> Self {
        Self {
            raw_root: raw_root.into(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.raw_dir)
    }

    /// Phase 1: reads every header under the raw root and infers one label per series
    ///
    /// Headers are parsed up to, not including, the pixel data. Files that
    /// fail to parse or carry no SeriesInstanceUID are skipped.
    pub fn build_series_map(&self) -> Result<SeriesLabelMap> {
        let mut map = SeriesLabelMap::new();

        for path in collect_dicom_files(&self.raw_root)? {
            let Some(series) = read_series_header(&path) else {
                continue;
            };
            map.insert_with(&series.series_instance_uid, || {
                infer_modality(series.series_description.as_deref())
            });
        }

        info!("Found {} unique series", map.len());
        Ok(map)
    }

    /// Runs both phases against `catalog`
    ///
    /// Phase 2 matches each record's series suffix (from its graphic id)
    /// against the series map keys by suffix. When several series share the
    /// suffix, the first one seen wins and a warning is logged. Labels equal
    /// to `Unknown` are never written.
    pub fn run<C: Catalog + ?Sized>(&self, catalog: &mut C) -> Result<LabelSummary> {
        let series_map = self.build_series_map()?;
        let records = catalog.query(&RecordFilter::default())?;
        info!("Labeling {} records...", records.len());

        let mut summary = LabelSummary {
            series: series_map.len(),
            records: records.len(),
            ..LabelSummary::default()
        };

        for record in &records {
            let suffix = match GraphicId::parse(&record.graphic_id) {
                Ok(id) => id.series_suffix,
                Err(e) => {
                    debug!("{}", e);
                    summary.unmatched += 1;
                    continue;
                }
            };

            let (series_uid, label) = match series_map.find_by_suffix(&suffix) {
                Some((uid, label, shared)) => {
                    if shared > 1 {
                        warn!(
                            "Series suffix {} of {} matches {} series, using {}",
                            suffix, record.graphic_id, shared, uid
                        );
                        summary.ambiguous += 1;
                    }
                    (uid, label)
                }
                None => {
                    summary.unmatched += 1;
                    continue;
                }
            };

            if label.is_unknown() {
                summary.unmatched += 1;
                continue;
            }

            if record.modality == Some(label) {
                continue;
            }

            match catalog.update_modality(record.id, label) {
                Ok(()) => {
                    debug!("{} -> {} (series {})", record.graphic_id, label, series_uid);
                    summary.updated += 1;
                }
                Err(e) => warn!("Failed to label {}: {}", record.graphic_id, e),
            }
        }

        info!("Updated {} records", summary.updated);
        Ok(summary)
    }
}

/// Header-only read of the series tags
fn read_series_header(path: &Path) -> Option<SeriesHeader> {
    let obj = OpenFileOptions::new()
        .read_until(PIXEL_DATA)
        .open_file(path)
        .ok()?;
    SeriesHeader::extract(&obj)
}
