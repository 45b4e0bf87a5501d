//! DICOM fixtures synthesized for unit tests

use crate::extraction::tags::*;
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use std::fs;
use std::path::Path;

pub const MR_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.4";
pub const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";

/// One MR slice to be written as a DICOM file
#[derive(Debug, Clone)]
pub struct SliceFixture {
    pub patient_id: String,
    pub series_uid: String,
    pub description: Option<String>,
    pub instance_number: i32,
    pub rows: u16,
    pub columns: u16,
    pub pixels: Vec<u16>,
    pub rescale: Option<(String, String)>,
}

impl SliceFixture {
    /// A 4x4 slice with a zero background border and a bright center
    pub fn new(patient_id: &str, series_uid: &str, description: Option<&str>, instance: i32) -> Self {
        let pixels = vec![
            0, 0, 0, 0, //
            0, 400, 800, 0, //
            0, 1200, 1600 + instance as u16, 0, //
            0, 0, 0, 0,
        ];
        Self {
            patient_id: patient_id.to_string(),
            series_uid: series_uid.to_string(),
            description: description.map(str::to_string),
            instance_number: instance,
            rows: 4,
            columns: 4,
            pixels,
            rescale: None,
        }
    }

    pub fn with_rescale(mut self, slope: &str, intercept: &str) -> Self {
        self.rescale = Some((slope.to_string(), intercept.to_string()));
        self
    }

    /// Writes the fixture as a Part 10 file, creating parent directories
    pub fn write(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }

        let sop_uid = format!("{}.{}", self.series_uid, self.instance_number);
        let mut obj = InMemDicomObject::new_empty();

        obj.put(DataElement::new(SOP_CLASS_UID, VR::UI, PrimitiveValue::from(MR_IMAGE_STORAGE)));
        obj.put(DataElement::new(SOP_INSTANCE_UID, VR::UI, PrimitiveValue::from(sop_uid.as_str())));
        obj.put(DataElement::new(MODALITY, VR::CS, PrimitiveValue::from("MR")));
        obj.put(DataElement::new(PATIENT_ID, VR::LO, PrimitiveValue::from(self.patient_id.as_str())));
        obj.put(DataElement::new(PATIENT_SEX, VR::CS, PrimitiveValue::from("F")));
        obj.put(DataElement::new(PATIENT_AGE, VR::AS, PrimitiveValue::from("045Y")));
        obj.put(DataElement::new(
            SERIES_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from(self.series_uid.as_str()),
        ));
        if let Some(ref description) = self.description {
            obj.put(DataElement::new(
                SERIES_DESCRIPTION,
                VR::LO,
                PrimitiveValue::from(description.as_str()),
            ));
        }
        obj.put(DataElement::new(
            INSTANCE_NUMBER,
            VR::IS,
            PrimitiveValue::from(self.instance_number.to_string()),
        ));
        if let Some((ref slope, ref intercept)) = self.rescale {
            obj.put(DataElement::new(RESCALE_SLOPE, VR::DS, PrimitiveValue::from(slope.as_str())));
            obj.put(DataElement::new(
                RESCALE_INTERCEPT,
                VR::DS,
                PrimitiveValue::from(intercept.as_str()),
            ));
        }

        obj.put(DataElement::new(SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)));
        obj.put(DataElement::new(
            PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from("MONOCHROME2"),
        ));
        obj.put(DataElement::new(ROWS, VR::US, PrimitiveValue::from(self.rows)));
        obj.put(DataElement::new(COLUMNS, VR::US, PrimitiveValue::from(self.columns)));
        obj.put(DataElement::new(BITS_ALLOCATED, VR::US, PrimitiveValue::from(16_u16)));
        obj.put(DataElement::new(BITS_STORED, VR::US, PrimitiveValue::from(16_u16)));
        obj.put(DataElement::new(HIGH_BIT, VR::US, PrimitiveValue::from(15_u16)));
        obj.put(DataElement::new(PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0_u16)));
        obj.put(DataElement::new(
            PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U16(self.pixels.clone().into()),
        ));

        let file_obj = obj
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(EXPLICIT_VR_LE)
                    .media_storage_sop_class_uid(MR_IMAGE_STORAGE)
                    .media_storage_sop_instance_uid(sop_uid.as_str()),
            )
            .unwrap();
        file_obj.write_to_file(path).unwrap();
    }
}

/// Writes a file that has a DICOM extension but no decodable content
pub fn write_corrupt(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"definitely not a DICOM stream").unwrap();
}
