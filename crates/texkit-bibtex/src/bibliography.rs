//! Keyed access to a parsed bibliography
//!
//! A [`Bibliography`] resolves a citation key to its entry (field map, author
//! list and raw source). Entries keep file order; the first definition of a
//! duplicated key wins.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entry::BibTeXEntry;
use crate::parser::parse;

/// Name of the field-removal preset that expands to [`MOST_FIELDS`].
pub const MOST_PRESET: &str = "most";

/// Fields dropped by the `most` preset: bulky or personal metadata that a
/// submission bibliography does not need.
pub const MOST_FIELDS: [&str; 10] = [
    "file", "abstract", "day", "month", "keywords", "urldate", "language", "issn", "note",
    "isbn",
];

/// Errors that can occur while loading a bibliography
#[derive(Debug, Error)]
pub enum BibliographyError {
    /// The bibliography or its cache could not be read or written
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON cache exists but does not hold a bibliography
    #[error("invalid bibliography cache {}: {source}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for bibliography operations
pub type BibliographyResult<T> = Result<T, BibliographyError>;

/// Parsed bibliography indexed by citation key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<BibTeXEntry>", into = "Vec<BibTeXEntry>")]
pub struct Bibliography {
    entries: Vec<BibTeXEntry>,
    index: HashMap<String, usize>,
}

impl Bibliography {
    /// Build a bibliography from entries in file order
    pub fn from_entries(entries: Vec<BibTeXEntry>) -> Self {
        let mut bibliography = Self::default();
        for entry in entries {
            if bibliography.index.contains_key(&entry.cite_key) {
                tracing::warn!("duplicate citation key \"{}\", keeping the first", entry.cite_key);
                continue;
            }
            bibliography
                .index
                .insert(entry.cite_key.clone(), bibliography.entries.len());
            bibliography.entries.push(entry);
        }
        bibliography
    }

    /// Parse BibTeX source text
    pub fn parse(source: &str) -> Self {
        Self::from_entries(parse(source).entries)
    }

    /// Read and parse a `.bib` file
    pub fn from_file(path: impl AsRef<Path>) -> BibliographyResult<Self> {
        let path = path.as_ref();
        tracing::info!("reading bibliography {}", path.display());
        let source = std::fs::read_to_string(path).map_err(|source| BibliographyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bibliography = Self::parse(&source);
        tracing::info!("finished reading {} entries", bibliography.len());
        Ok(bibliography)
    }

    /// Resolve a citation key
    pub fn get(&self, key: &str) -> Option<&BibTeXEntry> {
        self.index.get(key).map(|&idx| &self.entries[idx])
    }

    /// Check if a citation key exists
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in file order
    pub fn entries(&self) -> impl Iterator<Item = &BibTeXEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delete the given fields from every entry; absent fields are ignored.
    ///
    /// Returns the total number of fields removed.
    pub fn remove_fields(&mut self, names: &HashSet<String>) -> usize {
        if names.is_empty() {
            return 0;
        }
        self.entries
            .iter_mut()
            .map(|entry| entry.remove_fields(names))
            .sum()
    }
}

impl From<Vec<BibTeXEntry>> for Bibliography {
    fn from(entries: Vec<BibTeXEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<Bibliography> for Vec<BibTeXEntry> {
    fn from(bibliography: Bibliography) -> Self {
        bibliography.entries
    }
}

/// Expand a user-supplied field list into the set of lowercased field names.
///
/// The `most` preset may be combined with explicit names; blank names are
/// dropped.
pub fn expand_field_selection<S: AsRef<str>>(names: &[S]) -> HashSet<String> {
    let mut fields = HashSet::new();
    for name in names {
        let name = name.as_ref().trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        if name == MOST_PRESET {
            fields.extend(MOST_FIELDS.iter().map(|f| f.to_string()));
        } else {
            fields.insert(name);
        }
    }
    fields
}
