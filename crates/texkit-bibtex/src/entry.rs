//! BibTeX entry data structures

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

lazy_static! {
    static ref AUTHOR_SEPARATOR: Regex = Regex::new(r"\s+and\s+").unwrap();
}

/// BibTeX entry type
///
/// Types outside the standard set keep their (lowercased) name so that a
/// rewritten bibliography does not silently turn `@thesis` into `@misc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BibTeXEntryType {
    Article,
    Book,
    Booklet,
    InBook,
    InCollection,
    InProceedings,
    Manual,
    MastersThesis,
    Misc,
    PhdThesis,
    Proceedings,
    TechReport,
    Unpublished,
    Online,
    Software,
    Dataset,
    Other(String),
}

/// Standard entry types and their canonical names
const ENTRY_TYPE_NAMES: &[(BibTeXEntryType, &str)] = &[
    (BibTeXEntryType::Article, "article"),
    (BibTeXEntryType::Book, "book"),
    (BibTeXEntryType::Booklet, "booklet"),
    (BibTeXEntryType::InBook, "inbook"),
    (BibTeXEntryType::InCollection, "incollection"),
    (BibTeXEntryType::InProceedings, "inproceedings"),
    (BibTeXEntryType::Manual, "manual"),
    (BibTeXEntryType::MastersThesis, "mastersthesis"),
    (BibTeXEntryType::Misc, "misc"),
    (BibTeXEntryType::PhdThesis, "phdthesis"),
    (BibTeXEntryType::Proceedings, "proceedings"),
    (BibTeXEntryType::TechReport, "techreport"),
    (BibTeXEntryType::Unpublished, "unpublished"),
    (BibTeXEntryType::Online, "online"),
    (BibTeXEntryType::Software, "software"),
    (BibTeXEntryType::Dataset, "dataset"),
];

impl BibTeXEntryType {
    /// Parse an entry type from a string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        let lower = s.to_lowercase();
        ENTRY_TYPE_NAMES
            .iter()
            .find(|(_, name)| *name == lower)
            .map(|(kind, _)| kind.clone())
            .unwrap_or(Self::Other(lower))
    }

    /// Canonical lowercase name, as written after `@`
    pub fn as_str(&self) -> &str {
        if let Self::Other(name) = self {
            return name;
        }
        ENTRY_TYPE_NAMES
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, name)| *name)
            .unwrap_or("misc")
    }
}

/// A single BibTeX field (key-value pair)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibTeXField {
    pub key: String,
    pub value: String,
}

/// A parsed BibTeX entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibTeXEntry {
    pub cite_key: String,
    pub entry_type: BibTeXEntryType,
    pub fields: Vec<BibTeXField>,
    pub raw_bibtex: Option<String>,
}

impl BibTeXEntry {
    /// Create a new BibTeX entry
    pub fn new(cite_key: String, entry_type: BibTeXEntryType) -> Self {
        Self {
            cite_key,
            entry_type,
            fields: Vec::new(),
            raw_bibtex: None,
        }
    }

    /// Add a field to the entry
    pub fn add_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push(BibTeXField {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Get a field value by key (case-insensitive)
    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key.eq_ignore_ascii_case(key))
            .map(|f| f.value.as_str())
    }

    /// Delete every field whose (lowercased) name is in `names`.
    ///
    /// Returns the number of fields removed.
    pub fn remove_fields(&mut self, names: &HashSet<String>) -> usize {
        let before = self.fields.len();
        self.fields.retain(|f| !names.contains(&f.key.to_lowercase()));
        before - self.fields.len()
    }

    /// Get the title field
    pub fn title(&self) -> Option<&str> {
        self.get_field("title")
    }

    /// Get the raw author field
    pub fn author(&self) -> Option<&str> {
        self.get_field("author")
    }

    /// Individual authors, split on the BibTeX `and` separator.
    ///
    /// Empty when the entry has no author field.
    pub fn authors(&self) -> Vec<String> {
        self.author()
            .map(|field| {
                AUTHOR_SEPARATOR
                    .split(field)
                    .map(|s| collapse_whitespace(s.trim()))
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the year field
    pub fn year(&self) -> Option<&str> {
        self.get_field("year")
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip grouping braces from a field value (`{B}ook` -> `Book`).
pub fn strip_braces(value: &str) -> String {
    value.chars().filter(|c| *c != '{' && *c != '}').collect()
}
