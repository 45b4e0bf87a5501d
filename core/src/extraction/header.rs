use dicom_object::InMemDicomObject;

use super::tags::{
    get_float_value, get_int_value, get_non_empty_string, INSTANCE_NUMBER, MODALITY, PATIENT_AGE,
    PATIENT_ID, PATIENT_SEX, RESCALE_INTERCEPT, RESCALE_SLOPE, SERIES_DESCRIPTION,
    SERIES_INSTANCE_UID,
};

/// Fallback for absent textual tags
pub const UNKNOWN_VALUE: &str = "Unknown";

/// Fallback acquisition modality
pub const DEFAULT_MODALITY: &str = "MR";

/// Header fields consumed by the ingestor and the labeler
///
/// Absent tags fall back to documented defaults: slope `1`, intercept `0`,
/// `"Unknown"` for patient and series fields, `"MR"` for modality.
#[derive(Debug, Clone, PartialEq)]
pub struct DicomHeader {
    pub patient_id: String,
    pub patient_sex: String,
    pub patient_age: String,
    pub modality: String,
    pub series_instance_uid: String,
    /// Raw SeriesDescription; `None` when absent or blank
    pub series_description: Option<String>,
    pub instance_number: Option<i32>,
    pub rescale_slope: f64,
    pub rescale_intercept: f64,
}

impl DicomHeader {
    /// Extracts header fields, substituting defaults for absent tags
    pub fn extract(dcm: &InMemDicomObject) -> Self {
        let unknown = || UNKNOWN_VALUE.to_string();

        DicomHeader {
            patient_id: get_non_empty_string(dcm, PATIENT_ID).unwrap_or_else(unknown),
            patient_sex: get_non_empty_string(dcm, PATIENT_SEX).unwrap_or_else(unknown),
            patient_age: get_non_empty_string(dcm, PATIENT_AGE).unwrap_or_else(unknown),
            modality: get_non_empty_string(dcm, MODALITY)
                .unwrap_or_else(|| DEFAULT_MODALITY.to_string()),
            series_instance_uid: get_non_empty_string(dcm, SERIES_INSTANCE_UID)
                .unwrap_or_else(unknown),
            series_description: get_non_empty_string(dcm, SERIES_DESCRIPTION),
            instance_number: get_int_value(dcm, INSTANCE_NUMBER),
            rescale_slope: get_float_value(dcm, RESCALE_SLOPE).unwrap_or(1.0),
            rescale_intercept: get_float_value(dcm, RESCALE_INTERCEPT).unwrap_or(0.0),
        }
    }

    /// Free-text caption stored with each derived image
    pub fn caption(&self) -> String {
        format!("Age: {}, Sex: {}", self.patient_age, self.patient_sex)
    }
}

/// Series-level tags read by the labeler's header-only pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesHeader {
    pub series_instance_uid: String,
    pub series_description: Option<String>,
}

impl SeriesHeader {
    /// Extracts series tags
    ///
    /// Returns `None` when the file carries no SeriesInstanceUID.
    pub fn extract(dcm: &InMemDicomObject) -> Option<Self> {
        let series_instance_uid = get_non_empty_string(dcm, SERIES_INSTANCE_UID)?;
        Some(SeriesHeader {
            series_instance_uid,
            series_description: get_non_empty_string(dcm, SERIES_DESCRIPTION),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};

    #[test]
    fn test_defaults_for_missing_tags() {
        let dcm = InMemDicomObject::new_empty();
        let header = DicomHeader::extract(&dcm);

        assert_eq!(header.patient_id, "Unknown");
        assert_eq!(header.patient_sex, "Unknown");
        assert_eq!(header.patient_age, "Unknown");
        assert_eq!(header.modality, "MR");
        assert_eq!(header.series_instance_uid, "Unknown");
        assert_eq!(header.series_description, None);
        assert_eq!(header.instance_number, None);
        assert_eq!(header.rescale_slope, 1.0);
        assert_eq!(header.rescale_intercept, 0.0);
        assert_eq!(header.caption(), "Age: Unknown, Sex: Unknown");
    }

    #[test]
    fn test_present_tags() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(PATIENT_ID, VR::LO, PrimitiveValue::from("P7")));
        dcm.put(DataElement::new(PATIENT_SEX, VR::CS, PrimitiveValue::from("M")));
        dcm.put(DataElement::new(PATIENT_AGE, VR::AS, PrimitiveValue::from("061Y")));
        dcm.put(DataElement::new(
            RESCALE_INTERCEPT,
            VR::DS,
            PrimitiveValue::from("-1024"),
        ));
        dcm.put(DataElement::new(
            SERIES_DESCRIPTION,
            VR::LO,
            PrimitiveValue::from("Ax T2 FSE"),
        ));

        let header = DicomHeader::extract(&dcm);
        assert_eq!(header.patient_id, "P7");
        assert_eq!(header.rescale_intercept, -1024.0);
        assert_eq!(header.series_description.as_deref(), Some("Ax T2 FSE"));
        assert_eq!(header.caption(), "Age: 061Y, Sex: M");
    }

    #[test]
    fn test_series_header_requires_uid() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            SERIES_DESCRIPTION,
            VR::LO,
            PrimitiveValue::from("FLAIR"),
        ));
        assert_eq!(SeriesHeader::extract(&dcm), None);

        dcm.put(DataElement::new(
            SERIES_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from("1.2.3.4"),
        ));
        let series = SeriesHeader::extract(&dcm).unwrap();
        assert_eq!(series.series_instance_uid, "1.2.3.4");
        assert_eq!(series.series_description.as_deref(), Some("FLAIR"));
    }
}
