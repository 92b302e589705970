//! Catalog Loader — reads the career catalog and derives the skill vocabulary.
//!
//! The catalog is a JSON array of `{career, skills, links?}` objects. Loading
//! is all-or-nothing: any unreadable file, malformed JSON, or record missing
//! `career`/`skills` aborts with a `CatalogLoadError`.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Catalog record {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Catalog record {index} has a blank career name")]
    EmptyCareer { index: usize },
}

/// A single career as authored in the catalog. Skill order is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerRecord {
    pub career: String,
    pub skills: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

/// Wire shape of a record before required fields are checked.
#[derive(Debug, Deserialize)]
struct RawRecord {
    career: Option<String>,
    skills: Option<Vec<String>>,
    #[serde(default)]
    links: Option<Vec<String>>,
}

impl RawRecord {
    fn into_record(self, index: usize) -> Result<CareerRecord, CatalogLoadError> {
        let career = self.career.ok_or(CatalogLoadError::MissingField {
            index,
            field: "career",
        })?;
        if career.trim().is_empty() {
            return Err(CatalogLoadError::EmptyCareer { index });
        }
        let skills = self.skills.ok_or(CatalogLoadError::MissingField {
            index,
            field: "skills",
        })?;

        Ok(CareerRecord {
            career,
            skills,
            links: self.links.unwrap_or_default(),
        })
    }
}

/// Sorted, deduplicated, lower-cased skill terms with a stable index per term.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn from_records(records: &[CareerRecord]) -> Self {
        let terms: Vec<String> = records
            .iter()
            .flat_map(|r| r.skills.iter())
            .map(|s| s.to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let positions = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        Self { terms, positions }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Exact lookup; `term` must already be lower-cased.
    pub fn position(&self, term: &str) -> Option<usize> {
        self.positions.get(term).copied()
    }
}

/// Career records in catalog order plus the vocabulary derived from them.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub records: Vec<CareerRecord>,
    pub vocabulary: Vocabulary,
}

impl Catalog {
    /// Reads and validates the catalog file at `path`.
    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let raw: Vec<RawRecord> =
            serde_json::from_str(&text).map_err(|source| CatalogLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let records = raw
            .into_iter()
            .enumerate()
            .map(|(index, r)| r.into_record(index))
            .collect::<Result<Vec<_>, _>>()?;

        let catalog = Self::from_records(records);
        info!(
            "Loaded catalog {}: {} careers, {} distinct skills",
            path.display(),
            catalog.records.len(),
            catalog.vocabulary.len()
        );
        Ok(catalog)
    }

    pub fn from_records(records: Vec<CareerRecord>) -> Self {
        let vocabulary = Vocabulary::from_records(&records);
        Self {
            records,
            vocabulary,
        }
    }
}
