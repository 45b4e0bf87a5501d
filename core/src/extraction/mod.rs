pub mod header;
pub mod modality;
pub mod tags;

pub use header::{DicomHeader, SeriesHeader, DEFAULT_MODALITY, UNKNOWN_VALUE};
pub use modality::infer_modality;
pub use tags::*;
