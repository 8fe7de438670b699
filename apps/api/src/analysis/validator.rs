//! Code Validator: reports every tag and subject code that is not in the controlled
//! vocabulary. Read-only: the candidate is never modified.

use serde::{Deserialize, Serialize};

use crate::analysis::models::AnalysisResult;
use crate::vocabulary::{Scheme, Vocabulary};

/// Outcome of one validation pass. Lists hold the rejected values in the order they
/// appear in the candidate (main, secondary, related for codes).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub invalid_tags: Vec<String>,
    pub invalid_bisac: Vec<String>,
    pub invalid_thema: Vec<String>,
    pub invalid_ibic: Vec<String>,
}

impl ValidationResult {
    pub fn invalid_codes(&self, scheme: Scheme) -> &[String] {
        match scheme {
            Scheme::Bisac => &self.invalid_bisac,
            Scheme::Thema => &self.invalid_thema,
            Scheme::Ibic => &self.invalid_ibic,
        }
    }

    /// Total number of rejected values across all four lists.
    pub fn rejected_count(&self) -> usize {
        self.invalid_tags.len()
            + self.invalid_bisac.len()
            + self.invalid_thema.len()
            + self.invalid_ibic.len()
    }
}

pub fn detect_invalid_codes(vocabulary: &Vocabulary, candidate: &AnalysisResult) -> ValidationResult {
    let invalid_tags: Vec<String> = candidate
        .tags
        .iter()
        .filter(|tag| !vocabulary.is_valid_tag(tag))
        .cloned()
        .collect();

    let invalid_for = |scheme: Scheme| -> Vec<String> {
        let valid = vocabulary.codes(scheme);
        candidate
            .classifications
            .get(scheme)
            .items()
            .filter(|item| !valid.contains(&item.code))
            .map(|item| item.code.clone())
            .collect()
    };

    let invalid_bisac = invalid_for(Scheme::Bisac);
    let invalid_thema = invalid_for(Scheme::Thema);
    let invalid_ibic = invalid_for(Scheme::Ibic);

    let is_valid = invalid_tags.is_empty()
        && invalid_bisac.is_empty()
        && invalid_thema.is_empty()
        && invalid_ibic.is_empty();

    ValidationResult {
        is_valid,
        invalid_tags,
        invalid_bisac,
        invalid_thema,
        invalid_ibic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::item;
    use crate::vocabulary::sample_vocabulary;

    #[test]
    fn test_reports_invalid_tag_and_bisac_code() {
        let mut candidate = AnalysisResult {
            tags: vec!["novela".to_string(), "poesía".to_string()],
            ..Default::default()
        };
        candidate.classifications.bisac.main = vec![item("FIC999999", "Fake", "x")];

        let result = detect_invalid_codes(&sample_vocabulary(), &candidate);

        assert!(!result.is_valid);
        assert_eq!(result.invalid_tags, vec!["poesía"]);
        assert_eq!(result.invalid_bisac, vec!["FIC999999"]);
        assert!(result.invalid_thema.is_empty());
        assert!(result.invalid_ibic.is_empty());
        assert_eq!(result.rejected_count(), 2);
    }

    #[test]
    fn test_empty_candidate_is_valid() {
        let result = detect_invalid_codes(&sample_vocabulary(), &AnalysisResult::default());
        assert!(result.is_valid);
        assert_eq!(result.rejected_count(), 0);
    }

    #[test]
    fn test_all_valid_codes_pass() {
        let mut candidate = AnalysisResult {
            tags: vec!["thriller".to_string()],
            ..Default::default()
        };
        candidate.classifications.bisac.main = vec![item("FIC031000", "whatever", "a")];
        candidate.classifications.thema.secondary = vec![item("FH", "whatever", "b")];
        candidate.classifications.ibic.related = vec![item("FA", "whatever", "c")];

        assert!(detect_invalid_codes(&sample_vocabulary(), &candidate).is_valid);
    }

    #[test]
    fn test_collects_codes_across_all_tiers_in_order() {
        let mut candidate = AnalysisResult::default();
        candidate.classifications.thema.main = vec![item("XX1", "", ""), item("FB", "", "")];
        candidate.classifications.thema.secondary = vec![item("XX2", "", "")];
        candidate.classifications.thema.related = vec![item("XX3", "", "")];

        let result = detect_invalid_codes(&sample_vocabulary(), &candidate);
        assert_eq!(result.invalid_thema, vec!["XX1", "XX2", "XX3"]);
        assert_eq!(result.invalid_codes(Scheme::Thema), result.invalid_thema.as_slice());
    }

    #[test]
    fn test_code_valid_in_another_scheme_is_still_invalid() {
        let mut candidate = AnalysisResult::default();
        // FB is a THEMA code, not an IBIC one.
        candidate.classifications.ibic.main = vec![item("FB", "", "")];

        let result = detect_invalid_codes(&sample_vocabulary(), &candidate);
        assert_eq!(result.invalid_ibic, vec!["FB"]);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_validation_does_not_touch_candidate() {
        let mut candidate = AnalysisResult {
            tags: vec!["poesía".to_string()],
            ..Default::default()
        };
        candidate.classifications.bisac.main = vec![item("FIC999999", "Fake", "x")];
        let before = candidate.clone();

        let first = detect_invalid_codes(&sample_vocabulary(), &candidate);
        let second = detect_invalid_codes(&sample_vocabulary(), &candidate);

        assert_eq!(candidate, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_validation_result_serializes_camel_case() {
        let value = serde_json::to_value(ValidationResult::default()).unwrap();
        assert_eq!(value["isValid"], false);
        assert!(value["invalidBisac"].is_array());
    }
}
