//! Result Normalizer: guarantees no tag or code outside the controlled vocabulary reaches
//! a caller, and that every kept code carries its official description.
//!
//! Normalization returns a new result and never mutates its input. It is idempotent and its
//! output always passes `detect_invalid_codes`.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analysis::models::{AnalysisResult, ClassificationItem, SubjectClassification};
use crate::vocabulary::{Scheme, SchemeCodes, Vocabulary};

/// What happens to a classification item whose code is not in its scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeFallback {
    /// Drop the item.
    #[default]
    Drop,
    /// Opt-in: substitute the closest valid ancestor code in the same scheme, dropping
    /// the item when there is none or the ancestor is already assigned.
    NearestAncestor,
}

impl FromStr for CodeFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(CodeFallback::Drop),
            "nearest_ancestor" => Ok(CodeFallback::NearestAncestor),
            other => Err(format!(
                "unknown code fallback '{other}' (expected 'drop' or 'nearest_ancestor')"
            )),
        }
    }
}

/// Drop-policy normalization.
#[allow(dead_code)]
pub fn normalize(vocabulary: &Vocabulary, candidate: &AnalysisResult) -> AnalysisResult {
    normalize_with(vocabulary, candidate, CodeFallback::Drop)
}

pub fn normalize_with(
    vocabulary: &Vocabulary,
    candidate: &AnalysisResult,
    fallback: CodeFallback,
) -> AnalysisResult {
    let mut normalized = candidate.clone();

    normalized.tags.retain(|tag| vocabulary.is_valid_tag(tag));

    for scheme in Scheme::ALL {
        let source = candidate.classifications.get(scheme);
        *normalized.classifications.get_mut(scheme) =
            normalize_scheme(scheme, vocabulary.codes(scheme), source, fallback);
    }

    normalized
}

fn normalize_scheme(
    scheme: Scheme,
    codes: &SchemeCodes,
    source: &SubjectClassification,
    fallback: CodeFallback,
) -> SubjectClassification {
    // Substitutes must not duplicate a code the model already assigned in this scheme.
    let mut assigned: HashSet<String> = source
        .items()
        .filter(|item| codes.contains(&item.code))
        .map(|item| item.code.clone())
        .collect();

    let mut tier = |items: &[ClassificationItem]| -> Vec<ClassificationItem> {
        items
            .iter()
            .filter_map(|item| match codes.description(&item.code) {
                Some(description) => Some(ClassificationItem {
                    code: item.code.clone(),
                    description: description.to_string(),
                    justification: item.justification.clone(),
                }),
                None if fallback == CodeFallback::NearestAncestor => {
                    let ancestor = ancestor_codes(scheme, &item.code)
                        .into_iter()
                        .find(|code| codes.contains(code))?;
                    if !assigned.insert(ancestor.clone()) {
                        return None;
                    }
                    Some(ClassificationItem {
                        description: codes.description(&ancestor)?.to_string(),
                        code: ancestor,
                        justification: item.justification.clone(),
                    })
                }
                None => None,
            })
            .collect()
    };

    SubjectClassification {
        main: tier(&source.main),
        secondary: tier(&source.secondary),
        related: tier(&source.related),
    }
}

/// Candidate ancestors of `code`, closest first.
///
/// BISAC codes are three letters plus six digits; the parent of `FIC031010` is `FIC031000`
/// and the root is `FIC000000`. THEMA and IBIC are prefix hierarchies: `FBAN` → `FBA` → `FB` → `F`.
fn ancestor_codes(scheme: Scheme, code: &str) -> Vec<String> {
    match scheme {
        Scheme::Bisac => {
            if code.len() != 9 || !code.is_ascii() {
                return Vec::new();
            }
            let (prefix, digits) = code.split_at(3);
            let mut ancestors = Vec::with_capacity(2);
            for keep in [3, 0] {
                let candidate = format!("{prefix}{}{}", &digits[..keep], "0".repeat(6 - keep));
                if candidate != code && !ancestors.contains(&candidate) {
                    ancestors.push(candidate);
                }
            }
            ancestors
        }
        Scheme::Thema | Scheme::Ibic => {
            let mut prefixes: Vec<String> = code
                .char_indices()
                .skip(1)
                .map(|(idx, _)| code[..idx].to_string())
                .collect();
            prefixes.reverse();
            prefixes
        }
    }
}
