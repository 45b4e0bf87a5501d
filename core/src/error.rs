use std::path::PathBuf;
use thiserror::Error;

/// Result type for neurosift operations
pub type Result<T> = std::result::Result<T, NeurosiftError>;

/// Error types for neurosift operations
#[derive(Error, Debug)]
pub enum NeurosiftError {
    /// DICOM reading error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// Pixel data could not be decoded or has an unsupported layout
    #[error("Pixel data error: {0}")]
    PixelDataError(String),

    /// Derived image could not be encoded or written
    #[error("Image error: {0}")]
    ImageError(String),

    /// Catalog persistence failure
    #[error("Catalog error: {0}")]
    CatalogError(String),

    /// Catalog record lookup by id failed
    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    /// Split artifact is absent
    #[error("Split file not found: {}", .0.display())]
    MissingSplit(PathBuf),

    /// Split artifact is present but unusable
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Raw input root does not exist
    #[error("Raw root not found: {}", .0.display())]
    RawRootNotFound(PathBuf),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for NeurosiftError {
    fn from(e: dicom_object::ReadError) -> Self {
        NeurosiftError::DicomError(format!("{}", e))
    }
}

impl From<dicom_pixeldata::Error> for NeurosiftError {
    fn from(e: dicom_pixeldata::Error) -> Self {
        NeurosiftError::PixelDataError(format!("{}", e))
    }
}

impl From<rusqlite::Error> for NeurosiftError {
    fn from(e: rusqlite::Error) -> Self {
        NeurosiftError::CatalogError(format!("{}", e))
    }
}

impl From<image::ImageError> for NeurosiftError {
    fn from(e: image::ImageError) -> Self {
        NeurosiftError::ImageError(format!("{}", e))
    }
}

impl From<walkdir::Error> for NeurosiftError {
    fn from(e: walkdir::Error) -> Self {
        NeurosiftError::IoError(e.into())
    }
}
