use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Number of trailing SeriesInstanceUID characters kept in a derived filename
pub const SERIES_SUFFIX_LEN: usize = 5;

/// Extension of every derived image
pub const DERIVED_EXTENSION: &str = "png";

/// Derived-image identifier
///
/// Derived images are named `{patient}_{series suffix}_{sequence}.png`,
/// where the series suffix is the last five characters of the
/// SeriesInstanceUID and the sequence is either the ingestion counter or
/// the InstanceNumber. The filename doubles as the catalog `graphic_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphicId {
    pub patient_id: String,
    pub series_suffix: String,
    pub sequence: String,
}

impl GraphicId {
    /// Builds the identifier for one derived image
    ///
    /// Path separators in any component are replaced with `-`, so the
    /// filename always names a single entry of the processed-file area.
    pub fn new(patient_id: &str, series_uid: &str, sequence: impl fmt::Display) -> Self {
        Self {
            patient_id: path_safe(patient_id),
            series_suffix: path_safe(series_suffix(series_uid)),
            sequence: path_safe(&sequence.to_string()),
        }
    }

    /// Parses a derived filename back into its components
    ///
    /// The patient component may itself contain underscores; the series
    /// suffix is always the second-to-last underscore-delimited token.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not follow the naming scheme
    pub fn parse(s: &str) -> Result<Self, String> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| {
            Regex::new(r"^(?P<patient>.+)_(?P<suffix>[^_]+)_(?P<seq>[^_]+?)(?:\.png)?$")
                .expect("Failed to compile regex")
        });

        let caps = re
            .captures(s)
            .ok_or_else(|| format!("Failed to parse graphic id from '{}'", s))?;

        Ok(GraphicId {
            patient_id: caps["patient"].to_string(),
            series_suffix: caps["suffix"].to_string(),
            sequence: caps["seq"].to_string(),
        })
    }

    /// Returns the filename used on the processed-file area
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GraphicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}.{}",
            self.patient_id, self.series_suffix, self.sequence, DERIVED_EXTENSION
        )
    }
}

fn path_safe(component: &str) -> String {
    component
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '-' } else { c })
        .collect()
}

/// Returns the last [`SERIES_SUFFIX_LEN`] characters of a series identifier
pub fn series_suffix(series_uid: &str) -> &str {
    let count = series_uid.chars().count();
    if count <= SERIES_SUFFIX_LEN {
        return series_uid;
    }
    let start = series_uid
        .char_indices()
        .nth(count - SERIES_SUFFIX_LEN)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    &series_uid[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_suffix() {
        assert_eq!(series_suffix("1.3.6.1.4.1.14519.5.2.1.12345"), "12345");
        assert_eq!(series_suffix("987"), "987");
        assert_eq!(series_suffix(""), "");
    }

    #[test]
    fn test_filename() {
        let id = GraphicId::new("UPENN-GBM-00001", "1.2.840.113619.2.55.3.98765", 12);
        assert_eq!(id.filename(), "UPENN-GBM-00001_98765_12.png");
    }

    #[test]
    fn test_separators_replaced() {
        let id = GraphicId::new("../site/P1", "1.2.3/4567", 2);
        let name = id.filename();
        assert_eq!(name, "..-site-P1_-4567_2.png");
        assert_eq!(std::path::Path::new(&name).components().count(), 1);

        let windows = GraphicId::new("..\\P2", "1.2.3.45678", 1);
        assert_eq!(windows.filename(), "..-P2_45678_1.png");
    }

    #[test]
    fn test_parse_roundtrip_keeps_suffix() {
        let parsed = GraphicId::parse("PAT01_98765_12.png").unwrap();
        assert_eq!(parsed.patient_id, "PAT01");
        assert_eq!(parsed.series_suffix, "98765");
        assert_eq!(parsed.sequence, "12");
    }

    #[test]
    fn test_parse_patient_with_underscore() {
        let parsed = GraphicId::parse("SITE_A_007_43210_3.png").unwrap();
        assert_eq!(parsed.patient_id, "SITE_A_007");
        assert_eq!(parsed.series_suffix, "43210");
        assert_eq!(parsed.sequence, "3");
    }

    #[test]
    fn test_parse_without_extension() {
        let parsed = GraphicId::parse("P1_abcde_9").unwrap();
        assert_eq!(parsed.series_suffix, "abcde");
        assert_eq!(parsed.sequence, "9");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(GraphicId::parse("no-underscores.png").is_err());
        assert!(GraphicId::parse("only_one.png").is_err());
    }
}
