use dicom_core::Tag;
use dicom_object::InMemDicomObject;

// Core Image Tags
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);

// Image Geometry Tags
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
pub const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

// Modality LUT Tags
pub const RESCALE_INTERCEPT: Tag = Tag(0x0028, 0x1052);
pub const RESCALE_SLOPE: Tag = Tag(0x0028, 0x1053);

// Study/Series Identification Tags
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);

// Description Tags
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);

// Patient Tags
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
pub const PATIENT_SEX: Tag = Tag(0x0010, 0x0040);
pub const PATIENT_AGE: Tag = Tag(0x0010, 0x1010);

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to string.
/// Whitespace and UI null padding are trimmed.
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim_matches(|c: char| c.is_whitespace() || c == '\0').to_string())
}

/// Like [`get_string_value`], but treats blank values as absent
pub fn get_non_empty_string(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    get_string_value(dcm, tag).filter(|s| !s.is_empty())
}

/// Helper to get integer value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to i32
pub fn get_int_value(dcm: &InMemDicomObject, tag: Tag) -> Option<i32> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<i32>().ok())
}

/// Helper to get floating-point value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to f64
pub fn get_float_value(dcm: &InMemDicomObject, tag: Tag) -> Option<f64> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_float64().ok())
}
