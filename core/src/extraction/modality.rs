use crate::types::ModalityLabel;

/// Infers the MRI sequence label from a SeriesDescription
///
/// # Algorithm
///
/// Absent or blank descriptions yield `Unknown`. Otherwise the description
/// is uppercased and the rules below are tried IN ORDER; the first match
/// wins:
///
/// 1. contains "FLAIR" → FLAIR
/// 2. contains "T1" → T1
/// 3. contains "T2" → T2
/// 4. contains "PERF" or "EP2D" → PERFUSION
/// 5. contains "DTI" → DTI
/// 6. Default → Other
///
/// FLAIR is checked before the coarse T1/T2 substrings, so "T1 FLAIR"
/// resolves to FLAIR.
///
/// # Example
///
/// ```
/// use neurosift_core::{infer_modality, ModalityLabel};
///
/// assert_eq!(infer_modality(Some("Axial T1 FLAIR post-contrast")), ModalityLabel::Flair);
/// assert_eq!(infer_modality(None), ModalityLabel::Unknown);
/// ```
pub fn infer_modality(description: Option<&str>) -> ModalityLabel {
    let desc = match description.map(str::trim) {
        Some(d) if !d.is_empty() => d.to_uppercase(),
        _ => return ModalityLabel::Unknown,
    };

    if desc.contains("FLAIR") {
        return ModalityLabel::Flair;
    }

    if desc.contains("T1") {
        return ModalityLabel::T1;
    }

    if desc.contains("T2") {
        return ModalityLabel::T2;
    }

    if desc.contains("PERF") || desc.contains("EP2D") {
        return ModalityLabel::Perfusion;
    }

    if desc.contains("DTI") {
        return ModalityLabel::Dti;
    }

    ModalityLabel::Other
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Axial T1 FLAIR post-contrast", ModalityLabel::Flair)]
    #[case("T1 MPRAGE", ModalityLabel::T1)]
    #[case("FLAIR axial", ModalityLabel::Flair)]
    #[case("ax t2 fse", ModalityLabel::T2)]
    #[case("EP2D perfusion protocol", ModalityLabel::Perfusion)]
    #[case("ep2d_diff_3scan", ModalityLabel::Perfusion)]
    #[case("DSC perf", ModalityLabel::Perfusion)]
    #[case("DTI 32 directions", ModalityLabel::Dti)]
    #[case("random sequence XYZ", ModalityLabel::Other)]
    fn test_rule_table(#[case] description: &str, #[case] expected: ModalityLabel) {
        assert_eq!(infer_modality(Some(description)), expected);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn test_missing_description_is_unknown(#[case] description: Option<&str>) {
        assert_eq!(infer_modality(description), ModalityLabel::Unknown);
    }

    #[test]
    fn test_t1_preempts_t2_and_perfusion() {
        assert_eq!(infer_modality(Some("T1 T2 mixed")), ModalityLabel::T1);
        assert_eq!(infer_modality(Some("T2* perfusion")), ModalityLabel::T2);
        assert_eq!(infer_modality(Some("DTI ep2d")), ModalityLabel::Perfusion);
    }
}
