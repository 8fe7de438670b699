//! Correction Prompt Builder: turns a failed validation into feedback text that is appended
//! to the base prompt for the next attempt.

use std::collections::HashSet;

use crate::analysis::validator::ValidationResult;
use crate::vocabulary::Scheme;

const CORRECTION_HEADER: &str = "CORRECTION REQUIRED: your previous answer used values that \
    do not exist in the controlled lists supplied above. They were rejected.";

const CORRECTION_FOOTER: &str = "Return the complete answer again. Every other field may stay \
    as it was, but tags and codes must be copied verbatim from the lists above. \
    Never invent, abbreviate or modify a code.";

/// Builds one labeled block per non-empty invalid list. Returns an empty string for a
/// valid result.
pub fn build_correction_prompt(validation: &ValidationResult) -> String {
    let mut blocks = Vec::new();

    if !validation.invalid_tags.is_empty() {
        blocks.push(format!(
            "INVALID TAGS: {}\nReplace them with tags taken only from the ALLOWED TAGS list, \
            or leave them out.",
            quoted_list(&validation.invalid_tags)
        ));
    }

    for scheme in Scheme::ALL {
        let invalid = validation.invalid_codes(scheme);
        if invalid.is_empty() {
            continue;
        }
        blocks.push(format!(
            "INVALID {label} CODES: {codes}\nReplace them with codes taken only from the \
            {label} CODES list, using the exact code string.",
            label = scheme.label(),
            codes = quoted_list(invalid)
        ));
    }

    if blocks.is_empty() {
        return String::new();
    }

    format!(
        "\n\n{CORRECTION_HEADER}\n\n{}\n\n{CORRECTION_FOOTER}",
        blocks.join("\n\n")
    )
}

/// `"a", "b"` with repeats removed, first occurrence wins.
fn quoted_list(values: &[String]) -> String {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .map(|v| format!("\"{v}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid(
        tags: &[&str],
        bisac: &[&str],
        thema: &[&str],
        ibic: &[&str],
    ) -> ValidationResult {
        let owned = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        ValidationResult {
            is_valid: false,
            invalid_tags: owned(tags),
            invalid_bisac: owned(bisac),
            invalid_thema: owned(thema),
            invalid_ibic: owned(ibic),
        }
    }

    #[test]
    fn test_contains_every_invalid_bisac_code_verbatim() {
        let validation = invalid(&[], &["FIC999999", "XYZ123456"], &[], &[]);
        let prompt = build_correction_prompt(&validation);

        assert!(prompt.contains("FIC999999"));
        assert!(prompt.contains("XYZ123456"));
        assert!(prompt.contains("INVALID BISAC CODES"));
    }

    #[test]
    fn test_every_non_empty_category_gets_its_own_block() {
        let validation = invalid(&["poesía"], &["FIC999999"], &["FZZ"], &["QQ"]);
        let prompt = build_correction_prompt(&validation);

        for label in [
            "INVALID TAGS",
            "INVALID BISAC CODES",
            "INVALID THEMA CODES",
            "INVALID IBIC CODES",
        ] {
            assert!(prompt.contains(label), "missing block {label}");
        }
        for value in ["poesía", "FIC999999", "FZZ", "QQ"] {
            assert!(prompt.contains(value), "missing value {value}");
        }
    }

    #[test]
    fn test_empty_categories_are_not_mentioned() {
        let prompt = build_correction_prompt(&invalid(&[], &[], &["FZZ"], &[]));

        assert!(prompt.contains("INVALID THEMA CODES"));
        assert!(!prompt.contains("INVALID TAGS"));
        assert!(!prompt.contains("INVALID BISAC CODES"));
        assert!(!prompt.contains("INVALID IBIC CODES"));
    }

    #[test]
    fn test_prompt_is_additive() {
        let prompt = build_correction_prompt(&invalid(&["poesía"], &[], &[], &[]));
        assert!(prompt.starts_with("\n\n"));
        assert!(prompt.contains(CORRECTION_HEADER));
    }

    #[test]
    fn test_repeated_values_listed_once() {
        let prompt = build_correction_prompt(&invalid(&[], &["FIC999999", "FIC999999"], &[], &[]));
        assert_eq!(prompt.matches("FIC999999").count(), 1);
    }

    #[test]
    fn test_valid_result_produces_no_text() {
        let validation = ValidationResult {
            is_valid: true,
            ..Default::default()
        };
        assert!(build_correction_prompt(&validation).is_empty());
    }
}
