//! Data model for manuscript analysis results.
//!
//! Field names are camelCase on the wire. Every field is required when a result is
//! parsed from model output; a structurally incomplete answer is a parse failure.

use serde::{Deserialize, Serialize};

use crate::vocabulary::Scheme;

/// One assigned subject code with the model's rationale.
///
/// `description` is model-supplied until normalization overwrites it with the official text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationItem {
    pub code: String,
    pub description: String,
    pub justification: String,
}

/// Three priority tiers of one scheme. Tier sizes are not fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectClassification {
    pub main: Vec<ClassificationItem>,
    pub secondary: Vec<ClassificationItem>,
    pub related: Vec<ClassificationItem>,
}

impl SubjectClassification {
    /// All items, main tier first, then secondary, then related.
    pub fn items(&self) -> impl Iterator<Item = &ClassificationItem> {
        self.main
            .iter()
            .chain(self.secondary.iter())
            .chain(self.related.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classifications {
    pub bisac: SubjectClassification,
    pub thema: SubjectClassification,
    pub ibic: SubjectClassification,
}

impl Classifications {
    pub fn get(&self, scheme: Scheme) -> &SubjectClassification {
        match scheme {
            Scheme::Bisac => &self.bisac,
            Scheme::Thema => &self.thema,
            Scheme::Ibic => &self.ibic,
        }
    }

    pub fn get_mut(&mut self, scheme: Scheme) -> &mut SubjectClassification {
        match scheme {
            Scheme::Bisac => &mut self.bisac,
            Scheme::Thema => &mut self.thema,
            Scheme::Ibic => &mut self.ibic,
        }
    }
}

/// Publishing metadata for one manuscript. As parsed from the model this is a candidate;
/// only normalized results leave the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub title: String,
    pub synopsis: String,
    pub author_bio: String,
    pub citations: Vec<String>,
    pub tags: Vec<String>,
    pub classifications: Classifications,
}

#[cfg(test)]
pub fn item(code: &str, description: &str, justification: &str) -> ClassificationItem {
    ClassificationItem {
        code: code.to_string(),
        description: description.to_string(),
        justification: justification.to_string(),
    }
}
