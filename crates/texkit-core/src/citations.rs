//! Citation extraction and usage statistics
//!
//! Keys are found with a single regex built from the configured citation
//! commands. `\nocite`, starred, suffixed (`\citep`, `\citeauthor`) and
//! optional-argument forms all match; `\nocite{*}` never yields a key.
//! Lines are expected to be comment-free already (see
//! [`crate::TexDocument::prepared`]).

use std::collections::{BTreeMap, HashMap, HashSet};

use regex::{Regex, RegexBuilder};
use texkit_bibtex::{strip_braces, BibTeXEntry, Bibliography};

use crate::error::{TexkitError, TexkitResult};
use crate::source::TexDocument;

/// Citation commands recognised when nothing is configured
pub const DEFAULT_CITE_COMMANDS: [&str; 2] = ["autocite", "cite"];

const RULE: &str = "--------------------------------------------------";

/// Finds citation keys in LaTeX lines
#[derive(Debug, Clone)]
pub struct CitationExtractor {
    regex: Regex,
}

impl CitationExtractor {
    /// Build an extractor for the given command names (without backslash)
    pub fn new<S: AsRef<str>>(commands: &[S]) -> TexkitResult<Self> {
        let names: Vec<String> = commands
            .iter()
            .map(|c| c.as_ref().trim().trim_start_matches('\\'))
            .filter(|c| !c.is_empty())
            .map(regex::escape)
            .collect();
        if names.is_empty() {
            return Err(TexkitError::Usage(
                "at least one citation command is required".to_string(),
            ));
        }

        let pattern = format!(
            r"\\(?:no)?(?:{})[\w*.\-|]*(?:\[[^\]]*\])*\{{([^{{}}*][^{{}}]*)\}}",
            names.join("|")
        );
        tracing::debug!("citation pattern: {}", pattern);
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    /// Keys cited on one line, in order of appearance
    pub fn keys_in_line<'a>(&'a self, line: &'a str) -> impl Iterator<Item = String> + 'a {
        self.regex
            .captures_iter(line)
            .filter_map(|caps| caps.get(1))
            .flat_map(|m| m.as_str().split(','))
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }

    /// Every citation in the document, duplicates kept
    pub fn extract(&self, document: &TexDocument) -> Vec<String> {
        document
            .lines()
            .iter()
            .flat_map(|line| self.keys_in_line(line).collect::<Vec<_>>())
            .collect()
    }

    /// Distinct citations in order of first occurrence
    pub fn extract_unique(&self, document: &TexDocument) -> Vec<String> {
        dedup_keys(self.extract(document))
    }
}

impl Default for CitationExtractor {
    fn default() -> Self {
        // the default command names always form a valid pattern
        Self::new(&DEFAULT_CITE_COMMANDS).unwrap()
    }
}

/// Drop repeated keys, keeping first-occurrence order
pub fn dedup_keys(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter()
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

/// Case-insensitive search over entry titles and authors
#[derive(Debug, Clone)]
pub struct MetadataFilter {
    patterns: Vec<Regex>,
}

impl MetadataFilter {
    /// Compile the patterns; one that is not a valid regex is searched for literally
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> TexkitResult<Self> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let regex = match case_insensitive(pattern) {
                Ok(regex) => regex,
                Err(e) => {
                    tracing::warn!("invalid pattern \"{}\" ({}), matching it literally", pattern, e);
                    case_insensitive(&regex::escape(pattern))?
                }
            };
            compiled.push(regex);
        }
        Ok(Self { patterns: compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether any pattern hits the title or one of the authors.
    ///
    /// Entries missing from the bibliography, or lacking both fields, never match.
    pub fn matches(&self, entry: Option<&BibTeXEntry>) -> bool {
        let Some(entry) = entry else {
            return false;
        };
        let title = entry.title().map(strip_braces);
        let authors = entry.authors();

        self.patterns.iter().any(|pattern| {
            title.as_deref().is_some_and(|t| pattern.is_match(t))
                || authors.iter().any(|a| pattern.is_match(a))
        })
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Restrictions applied to the extracted citation list
#[derive(Debug, Clone, Default)]
pub struct CitationFilter {
    /// Keep keys containing any of these substrings
    pub key_filters: Vec<String>,
    /// Keep keys whose bibliography metadata matches any of these patterns
    pub patterns: Vec<String>,
}

impl CitationFilter {
    /// Apply both filters in turn; patterns need a bibliography
    pub fn apply(
        &self,
        keys: Vec<String>,
        bibliography: Option<&Bibliography>,
    ) -> TexkitResult<Vec<String>> {
        let mut keys = keys;
        if !self.key_filters.is_empty() {
            keys.retain(|key| self.key_filters.iter().any(|f| key.contains(f.as_str())));
        }

        if !self.patterns.is_empty() {
            let bibliography = bibliography.ok_or_else(|| {
                TexkitError::Usage(
                    "pattern matching requires a bibliography (--bibliography)".to_string(),
                )
            })?;
            let filter = MetadataFilter::new(&self.patterns)?;
            keys.retain(|key| filter.matches(bibliography.get(key)));
        }
        Ok(keys)
    }
}

/// How often one key is cited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationCount {
    pub key: String,
    pub count: usize,
}

/// Citation counts ordered by descending count, ties by first occurrence
#[derive(Debug, Clone, Default)]
pub struct CitationReport {
    counts: Vec<CitationCount>,
    total: usize,
}

impl CitationReport {
    /// Tally a list of citations (duplicates included)
    pub fn from_keys(keys: &[String]) -> Self {
        let mut counts: Vec<CitationCount> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for key in keys {
            match index.get(key.as_str()) {
                Some(&idx) => counts[idx].count += 1,
                None => {
                    index.insert(key.as_str(), counts.len());
                    counts.push(CitationCount {
                        key: key.clone(),
                        count: 1,
                    });
                }
            }
        }
        // stable sort keeps first-encounter order among equal counts
        counts.sort_by(|a, b| b.count.cmp(&a.count));

        Self {
            counts,
            total: keys.len(),
        }
    }

    pub fn counts(&self) -> &[CitationCount] {
        &self.counts
    }

    /// Number of citations, duplicates included
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct keys
    pub fn unique(&self) -> usize {
        self.counts.len()
    }

    /// `(occurrences, number of keys cited that often)`, most occurrences first
    pub fn histogram(&self) -> Vec<(usize, usize)> {
        let mut table: BTreeMap<usize, usize> = BTreeMap::new();
        for c in &self.counts {
            *table.entry(c.count).or_insert(0) += 1;
        }
        table.into_iter().rev().collect()
    }

    /// Render the printable report; with a bibliography each key is annotated
    pub fn render(&self, bibliography: Option<&Bibliography>) -> String {
        let mut out = String::new();
        out.push('\n');
        out.push_str(RULE);
        out.push('\n');

        match bibliography {
            Some(bib) => {
                out.push_str("\ncitation_key: # occurrences -- reference\n\n");
                for c in &self.counts {
                    match bib.get(&c.key) {
                        Some(entry) => out.push_str(&format!(
                            "{}: {} -- {}\n",
                            c.key,
                            c.count,
                            describe_entry(entry)
                        )),
                        None => {
                            tracing::warn!("could not find key \"{}\" in the bibliography", c.key);
                            out.push_str(&format!("{}: {}\n", c.key, c.count));
                        }
                    }
                }
            }
            None => {
                out.push_str("\ncitation_key: # occurrences\n\n");
                for c in &self.counts {
                    out.push_str(&format!("{}: {}\n", c.key, c.count));
                }
            }
        }

        out.push_str(&format!(
            "\nA total of {} citations found, {} unique.\n",
            self.total,
            self.unique()
        ));
        out.push('\n');
        out.push_str(RULE);
        out.push_str("\n\n# occurrences:# references\n");
        for (occurrences, keys) in self.histogram() {
            out.push_str(&format!("{}:{}\n", occurrences, keys));
        }
        out.push('\n');
        out.push_str(RULE);
        out.push('\n');
        out
    }
}

/// `authors (year) title` for a report line
fn describe_entry(entry: &BibTeXEntry) -> String {
    let title = entry.title().map(strip_braces).unwrap_or_default();
    format!(
        "{} ({}) {}",
        entry.authors().join(", "),
        entry.year().unwrap_or("n.d."),
        title
    )
}
