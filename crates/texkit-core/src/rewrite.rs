//! Trimmed bibliography generation
//!
//! Writes a new `.bib` file holding only the entries a document cites, in
//! order of first citation, with unwanted fields removed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use texkit_bibtex::{expand_field_selection, format_entry, load_bibliography, Bibliography, CachePolicy};

use crate::citations::CitationExtractor;
use crate::error::{TexkitError, TexkitResult};
use crate::source::TexDocument;

/// What a rewrite did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    /// Distinct keys cited by the document
    pub cited: usize,
    /// Entries written to the output
    pub written: usize,
    /// Cited keys absent from the bibliography
    pub missing: Vec<String>,
    /// Fields dropped across the whole bibliography
    pub fields_removed: usize,
}

/// Serialize the entries for `keys` in the given order.
///
/// Keys missing from the bibliography are logged and returned separately.
pub fn trimmed_bibliography(keys: &[String], bibliography: &Bibliography) -> (String, Vec<String>) {
    let mut blocks = Vec::with_capacity(keys.len());
    let mut missing = Vec::new();
    for key in keys {
        match bibliography.get(key) {
            Some(entry) => blocks.push(format_entry(entry)),
            None => {
                tracing::warn!("could not find key \"{}\"", key);
                missing.push(key.clone());
            }
        }
    }

    let mut text = blocks.join("\n\n");
    if !text.is_empty() {
        text.push('\n');
    }
    (text, missing)
}

/// Inputs of [`create_bibliography`]
#[derive(Debug, Clone)]
pub struct RewriteRequest {
    pub tex_path: PathBuf,
    pub bib_path: PathBuf,
    pub output_path: PathBuf,
    /// Field names to drop; may include the `most` preset
    pub remove_fields: Vec<String>,
    pub cache: CachePolicy,
}

/// Rewrite using an already loaded document and bibliography
pub fn rewrite(
    document: &TexDocument,
    extractor: &CitationExtractor,
    bibliography: &mut Bibliography,
    remove_fields: &HashSet<String>,
) -> (String, RewriteSummary) {
    let fields_removed = bibliography.remove_fields(remove_fields);
    let keys = extractor.extract_unique(document);
    let (text, missing) = trimmed_bibliography(&keys, bibliography);

    let summary = RewriteSummary {
        cited: keys.len(),
        written: keys.len() - missing.len(),
        missing,
        fields_removed,
    };
    (text, summary)
}

/// Load the document and bibliography, rewrite, and write the output file
pub fn create_bibliography(
    request: &RewriteRequest,
    extractor: &CitationExtractor,
) -> TexkitResult<RewriteSummary> {
    let document = TexDocument::from_file(&request.tex_path)?.strip_comments();
    let mut bibliography = load_bibliography(&request.bib_path, request.cache)?;
    let remove = expand_field_selection(&request.remove_fields);

    let (text, summary) = rewrite(&document, extractor, &mut bibliography, &remove);
    write_output(&request.output_path, &text)?;
    tracing::info!(
        "wrote {} of {} cited entries to {}",
        summary.written,
        summary.cited,
        request.output_path.display()
    );
    Ok(summary)
}

fn write_output(path: &Path, text: &str) -> TexkitResult<()> {
    std::fs::write(path, text).map_err(|e| TexkitError::io(path, e))
}
