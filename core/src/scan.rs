//! Raw-tree traversal

use crate::error::{NeurosiftError, Result};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collects every DICOM file under `root`, sorted by path
///
/// Files with a `.dcm`/`.dicom` extension (any case) are accepted as-is;
/// extensionless files are accepted when they carry the DICOM magic.
///
/// # Errors
///
/// Returns [`RawRootNotFound`](NeurosiftError::RawRootNotFound) if `root`
/// is not a directory. Unreadable subdirectories are skipped.
pub fn collect_dicom_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(NeurosiftError::RawRootNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        match path.extension() {
            Some(ext) => {
                if ext.eq_ignore_ascii_case("dcm") || ext.eq_ignore_ascii_case("dicom") {
                    files.push(path);
                }
            }
            None => {
                if is_dicom_file(&path) {
                    debug!("Found headerless DICOM file: {}", path.display());
                    files.push(path);
                }
            }
        }
    }

    Ok(files)
}

/// Checks if a file has a DICOM header
///
/// DICOM files typically have:
/// - 128-byte preamble
/// - 4-byte "DICM" magic string at offset 128
pub fn is_dicom_file(path: &Path) -> bool {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    // Read first 132 bytes (128-byte preamble + 4-byte "DICM" magic)
    let mut buffer = [0u8; 132];
    match file.read_exact(&mut buffer) {
        Ok(()) => &buffer[128..132] == b"DICM",
        Err(_) => false,
    }
}

/// Checks whether `path`, relative to `root`, lies under a directory named `patient_id`
pub fn in_patient_subtree(root: &Path, path: &Path, patient_id: &str) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .parent()
        .map(|dir| dir.components().any(|c| c.as_os_str() == patient_id))
        .unwrap_or(false)
}
