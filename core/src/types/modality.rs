use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MRI sequence label assigned to a derived image
///
/// `Unknown` means the series carried no usable description and is kept
/// distinct from `Other`, which means a description was present but
/// matched no rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModalityLabel {
    #[serde(rename = "T1")]
    T1,
    #[serde(rename = "T2")]
    T2,
    #[serde(rename = "FLAIR")]
    Flair,
    #[serde(rename = "PERFUSION")]
    Perfusion,
    #[serde(rename = "DTI")]
    Dti,
    Other,
    Unknown,
}

/// Labels a downstream classifier trains on by default
pub const ANATOMICAL_LABELS: [ModalityLabel; 3] =
    [ModalityLabel::T1, ModalityLabel::T2, ModalityLabel::Flair];

impl ModalityLabel {
    /// All labels in declaration order
    pub const ALL: [ModalityLabel; 7] = [
        ModalityLabel::T1,
        ModalityLabel::T2,
        ModalityLabel::Flair,
        ModalityLabel::Perfusion,
        ModalityLabel::Dti,
        ModalityLabel::Other,
        ModalityLabel::Unknown,
    ];

    /// Returns whether this label is unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, ModalityLabel::Unknown)
    }

    /// Returns the canonical catalog spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            ModalityLabel::T1 => "T1",
            ModalityLabel::T2 => "T2",
            ModalityLabel::Flair => "FLAIR",
            ModalityLabel::Perfusion => "PERFUSION",
            ModalityLabel::Dti => "DTI",
            ModalityLabel::Other => "Other",
            ModalityLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ModalityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModalityLabel {
    type Err = String;

    /// Parses the catalog spelling, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        ModalityLabel::ALL
            .iter()
            .find(|label| label.as_str().to_uppercase() == upper)
            .copied()
            .ok_or_else(|| format!("unknown modality label: {}", s))
    }
}
