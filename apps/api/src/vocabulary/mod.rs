//! Controlled Vocabulary Store: the authoritative tag list and the BISAC / THEMA / IBIC
//! code lists with their official descriptions.
//!
//! Built once at startup (embedded lists, or `VOCABULARY_DIR` when configured) and shared
//! read-only as `Arc<Vocabulary>`. There is no reload path: refreshing the lists is a redeploy.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const EMBEDDED_TAGS: &str = include_str!("data/tags.json");
const EMBEDDED_BISAC: &str = include_str!("data/bisac.json");
const EMBEDDED_THEMA: &str = include_str!("data/thema.json");
const EMBEDDED_IBIC: &str = include_str!("data/ibic.json");

const TAGS_FILE: &str = "tags.json";

/// One of the three subject-code schemes a manuscript is classified under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Bisac,
    Thema,
    Ibic,
}

impl Scheme {
    pub const ALL: [Scheme; 3] = [Scheme::Bisac, Scheme::Thema, Scheme::Ibic];

    pub fn label(self) -> &'static str {
        match self {
            Scheme::Bisac => "BISAC",
            Scheme::Thema => "THEMA",
            Scheme::Ibic => "IBIC",
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            Scheme::Bisac => "bisac.json",
            Scheme::Thema => "thema.json",
            Scheme::Ibic => "ibic.json",
        }
    }

    fn embedded(self) -> &'static str {
        match self {
            Scheme::Bisac => EMBEDDED_BISAC,
            Scheme::Thema => EMBEDDED_THEMA,
            Scheme::Ibic => EMBEDDED_IBIC,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A `{code, description}` pair as it appears in the static lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub code: String,
    pub description: String,
}

impl CodeEntry {
    #[allow(dead_code)]
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("Failed to read vocabulary file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {list} vocabulary: {source}")]
    Parse {
        list: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{scheme} vocabulary lists code '{code}' more than once")]
    DuplicateCode { scheme: Scheme, code: String },

    #[error("{list} vocabulary is empty")]
    EmptyList { list: String },
}

/// Valid codes of one scheme, in list order, plus the code → description lookup.
#[derive(Debug, Clone, Default)]
pub struct SchemeCodes {
    entries: Vec<CodeEntry>,
    descriptions: HashMap<String, String>,
}

impl SchemeCodes {
    fn build(scheme: Scheme, entries: Vec<CodeEntry>) -> Result<Self, VocabularyError> {
        let mut descriptions = HashMap::with_capacity(entries.len());
        for entry in &entries {
            if descriptions
                .insert(entry.code.clone(), entry.description.clone())
                .is_some()
            {
                return Err(VocabularyError::DuplicateCode {
                    scheme,
                    code: entry.code.clone(),
                });
            }
        }
        Ok(Self {
            entries,
            descriptions,
        })
    }

    pub fn contains(&self, code: &str) -> bool {
        self.descriptions.contains_key(code)
    }

    /// Official description for `code`, if it belongs to the scheme.
    pub fn description(&self, code: &str) -> Option<&str> {
        self.descriptions.get(code).map(String::as_str)
    }

    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The full controlled vocabulary. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    tags: Vec<String>,
    tag_set: HashSet<String>,
    bisac: SchemeCodes,
    thema: SchemeCodes,
    ibic: SchemeCodes,
}

impl Vocabulary {
    /// Builds a vocabulary from in-memory lists. Duplicate tags collapse to their first
    /// occurrence; duplicate codes within a scheme are rejected.
    pub fn from_lists(
        tags: Vec<String>,
        bisac: Vec<CodeEntry>,
        thema: Vec<CodeEntry>,
        ibic: Vec<CodeEntry>,
    ) -> Result<Self, VocabularyError> {
        let mut tag_set = HashSet::with_capacity(tags.len());
        let tags: Vec<String> = tags
            .into_iter()
            .filter(|tag| tag_set.insert(tag.clone()))
            .collect();

        Ok(Self {
            tags,
            tag_set,
            bisac: SchemeCodes::build(Scheme::Bisac, bisac)?,
            thema: SchemeCodes::build(Scheme::Thema, thema)?,
            ibic: SchemeCodes::build(Scheme::Ibic, ibic)?,
        })
    }

    /// Loads the lists compiled into the binary.
    pub fn embedded() -> Result<Self, VocabularyError> {
        Self::from_sources(EMBEDDED_TAGS, |scheme| Ok(scheme.embedded().to_string()))
    }

    /// Loads `tags.json`, `bisac.json`, `thema.json` and `ibic.json` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, VocabularyError> {
        let tags = read_file(&dir.join(TAGS_FILE))?;
        Self::from_sources(&tags, |scheme| read_file(&dir.join(scheme.file_name())))
    }

    /// Embedded lists unless a directory override is configured.
    pub fn load(dir: Option<&Path>) -> Result<Self, VocabularyError> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::embedded(),
        }
    }

    fn from_sources(
        tags_json: &str,
        mut scheme_source: impl FnMut(Scheme) -> Result<String, VocabularyError>,
    ) -> Result<Self, VocabularyError> {
        let tags: Vec<String> = parse_list("tags", tags_json)?;
        let bisac = parse_list(Scheme::Bisac.label(), &scheme_source(Scheme::Bisac)?)?;
        let thema = parse_list(Scheme::Thema.label(), &scheme_source(Scheme::Thema)?)?;
        let ibic = parse_list(Scheme::Ibic.label(), &scheme_source(Scheme::Ibic)?)?;
        Self::from_lists(tags, bisac, thema, ibic)
    }

    pub fn is_valid_tag(&self, tag: &str) -> bool {
        self.tag_set.contains(tag)
    }

    /// Allowed tags in list order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn codes(&self, scheme: Scheme) -> &SchemeCodes {
        match scheme {
            Scheme::Bisac => &self.bisac,
            Scheme::Thema => &self.thema,
            Scheme::Ibic => &self.ibic,
        }
    }
}

fn read_file(path: &Path) -> Result<String, VocabularyError> {
    std::fs::read_to_string(path).map_err(|source| VocabularyError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse_list<T: serde::de::DeserializeOwned>(
    list: &str,
    json: &str,
) -> Result<Vec<T>, VocabularyError> {
    let items: Vec<T> = serde_json::from_str(json).map_err(|source| VocabularyError::Parse {
        list: list.to_string(),
        source,
    })?;
    if items.is_empty() {
        return Err(VocabularyError::EmptyList {
            list: list.to_string(),
        });
    }
    Ok(items)
}

/// Small synthetic vocabulary shared by unit tests across the crate.
#[cfg(test)]
pub fn sample_vocabulary() -> Vocabulary {
    Vocabulary::from_lists(
        vec!["novela".to_string(), "thriller".to_string()],
        vec![
            CodeEntry::new("FIC000000", "Fiction / General"),
            CodeEntry::new("FIC031000", "Fiction / Thrillers / General"),
        ],
        vec![
            CodeEntry::new("FB", "Fiction: general and literary"),
            CodeEntry::new("FH", "Thriller / suspense fiction"),
        ],
        vec![CodeEntry::new("FA", "Modern & contemporary fiction (post c 1945)")],
    )
    .expect("sample vocabulary is well-formed")
}
