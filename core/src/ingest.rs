//! DICOM ingestion: raw slices to windowed PNGs plus catalog records

use crate::catalog::Catalog;
use crate::config::PipelineConfig;
use crate::error::{NeurosiftError, Result};
use crate::extraction::DicomHeader;
use crate::scan::{collect_dicom_files, in_patient_subtree};
use crate::types::{GraphicId, NewImageRecord, RecordKey};
use crate::windowing::{window, PixelSlice, WindowStrategy};
use dicom_object::open_file;
use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder};
use image::ImageFormat;
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Files between progress log lines
const PROGRESS_INTERVAL: usize = 50;

/// Counters reported by [`DicomIngestor::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// DICOM files encountered
    pub scanned: usize,
    /// Derived images written to the processed-file area
    pub written: usize,
    /// New catalog records
    pub inserted: usize,
    /// Records already present under the same key
    pub duplicates: usize,
    /// Files skipped after a decode, write or catalog failure
    pub failed: usize,
}

/// A decoded slice and the header fields that came with it
#[derive(Debug, Clone)]
pub struct DecodedSlice {
    pub header: DicomHeader,
    pub pixels: PixelSlice,
}

/// Reads a DICOM file, decodes the first frame and applies the rescale
///
/// RescaleSlope/RescaleIntercept default to 1/0 when absent.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed, the pixel data cannot be
/// decoded, or the image is not single-channel.
pub fn read_dicom(path: &Path) -> Result<DecodedSlice> {
    let obj = open_file(path)?;
    let header = DicomHeader::extract(&obj);

    let pixel_data = obj.decode_pixel_data()?;
    if pixel_data.samples_per_pixel() != 1 {
        return Err(NeurosiftError::PixelDataError(format!(
            "expected single-channel pixel data, found {} samples per pixel",
            pixel_data.samples_per_pixel()
        )));
    }

    let rows = pixel_data.rows();
    let columns = pixel_data.columns();
    let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
    let mut samples: Vec<f32> = pixel_data.to_vec_with_options(&options)?;
    // Keep the first frame only
    samples.truncate(rows as usize * columns as usize);

    let pixels = PixelSlice::new(rows, columns, samples)?
        .rescale(header.rescale_slope, header.rescale_intercept);

    Ok(DecodedSlice { header, pixels })
}

/// Converts raw DICOM slices into derived 8-bit images
///
/// # Example
///
/// ```no_run
/// use neurosift_core::{DicomIngestor, InMemoryCatalog};
///
/// let ingestor = DicomIngestor::new("data/raw/dicom", "data/raw/processed");
/// let mut catalog = InMemoryCatalog::default();
/// let summary = ingestor.run(&mut catalog).unwrap();
/// println!("{} files scanned", summary.scanned);
/// ```
#[derive(Debug, Clone)]
pub struct DicomIngestor {
    raw_root: PathBuf,
    processed_dir: PathBuf,
    strategy: WindowStrategy,
}

impl DicomIngestor {
    pub fn new(raw_root: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_root: raw_root.into(),
            processed_dir: processed_dir.into(),
            strategy: WindowStrategy::default(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.raw_dir, &config.processed_dir).with_strategy(config.window)
    }

    /// Builder: choose the windowing strategy
    pub fn with_strategy(mut self, strategy: WindowStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Ingests every DICOM file under the raw root
    ///
    /// Each file is windowed, written as
    /// `{patient}_{series suffix}_{sequence}.png` where the sequence is the
    /// InstanceNumber (or, when absent, the file's 1-based position in the
    /// sorted scan), and cataloged with an unset modality. Failures on individual files are logged and counted;
    /// the run continues.
    ///
    /// # Errors
    ///
    /// Returns an error only if the raw root is missing or the processed
    /// directory cannot be created.
    pub fn run<C: Catalog + ?Sized>(&self, catalog: &mut C) -> Result<IngestSummary> {
        let files = collect_dicom_files(&self.raw_root)?;
        fs::create_dir_all(&self.processed_dir)?;
        info!(
            "Ingesting {} DICOM files from {}",
            files.len(),
            self.raw_root.display()
        );

        let mut summary = IngestSummary::default();
        for path in &files {
            summary.scanned += 1;
            if summary.scanned % PROGRESS_INTERVAL == 0 {
                info!("Processing image {}...", summary.scanned);
            }

            let decoded = match read_dicom(path) {
                Ok(d) => d,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    summary.failed += 1;
                    continue;
                }
            };

            let header = &decoded.header;
            let graphic_id = GraphicId::new(
                &header.patient_id,
                &header.series_instance_uid,
                sequence(header.instance_number, summary.scanned),
            );
            if let Err(e) = self.write_derived(&decoded.pixels, &graphic_id) {
                error!("Failed to save {}: {}", graphic_id, e);
                summary.failed += 1;
                continue;
            }
            summary.written += 1;

            let record = NewImageRecord::new(
                RecordKey::new(header.patient_id.clone(), graphic_id.filename()),
                header.series_instance_uid.clone(),
            )
            .with_caption(header.caption());

            match catalog.insert_if_absent(record) {
                Ok(outcome) if outcome.inserted => summary.inserted += 1,
                Ok(_) => {
                    debug!("Metadata already exists for {}", graphic_id);
                    summary.duplicates += 1;
                }
                Err(e) => {
                    error!("Error saving metadata for {}: {}", graphic_id, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Total processed: {} ({} inserted, {} duplicates, {} failed)",
            summary.scanned, summary.inserted, summary.duplicates, summary.failed
        );
        Ok(summary)
    }

    /// Writes derived images for one patient without touching a catalog
    ///
    /// Only files below a directory named `patient_id` are considered. The
    /// sequence component is the InstanceNumber, or the running count when
    /// that tag is absent. Returns the paths written.
    pub fn process_patient(&self, patient_id: &str) -> Result<Vec<PathBuf>> {
        let files = collect_dicom_files(&self.raw_root)?;
        fs::create_dir_all(&self.processed_dir)?;

        let mut written = Vec::new();
        let mut count = 0usize;
        for path in files
            .iter()
            .filter(|p| in_patient_subtree(&self.raw_root, p, patient_id))
        {
            count += 1;
            let decoded = match read_dicom(path) {
                Ok(d) => d,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let graphic_id = GraphicId::new(
                patient_id,
                &decoded.header.series_instance_uid,
                sequence(decoded.header.instance_number, count),
            );

            match self.write_derived(&decoded.pixels, &graphic_id) {
                Ok(out_path) => {
                    debug!("Saved {}", out_path.display());
                    written.push(out_path);
                }
                Err(e) => error!("Failed to save {}: {}", graphic_id, e),
            }
        }

        info!("Processed {} images for {}", written.len(), patient_id);
        Ok(written)
    }

    fn write_derived(&self, pixels: &PixelSlice, graphic_id: &GraphicId) -> Result<PathBuf> {
        let out_path = self.processed_dir.join(graphic_id.filename());
        window(pixels, self.strategy).save_with_format(&out_path, ImageFormat::Png)?;
        Ok(out_path)
    }
}

/// Sequence component of a derived filename
///
/// InstanceNumber keeps names stable when files are added to the raw tree;
/// the scan position is only used for slices that lack the tag.
fn sequence(instance_number: Option<i32>, position: usize) -> String {
    instance_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| position.to_string())
}
