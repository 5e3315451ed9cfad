//! Line-oriented access to LaTeX sources
//!
//! A [`TexDocument`] is just the ordered lines of a `.tex` file. The helpers
//! here strip `%` comments and `%TC:ignore` blocks before the citation
//! extractor or the word counter look at the text.

use std::path::Path;

use crate::error::{TexkitError, TexkitResult};

/// Marker that starts a block excluded from counting (Overleaf/TeXcount syntax)
pub const TC_IGNORE: &str = "%TC:ignore";
/// Marker that ends a `%TC:ignore` block
pub const TC_END_IGNORE: &str = "%TC:endignore";

/// Read a whole `.tex` file into memory
pub fn read_tex_file(path: impl AsRef<Path>) -> TexkitResult<String> {
    let path = path.as_ref();
    tracing::debug!("reading {}", path.display());
    std::fs::read_to_string(path).map_err(|e| TexkitError::io(path, e))
}

/// Cut a line at its first unescaped `%`
pub fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' => idx += 2,
            b'%' => return &line[..idx],
            _ => idx += 1,
        }
    }
    line
}

/// The lines of a LaTeX document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TexDocument {
    lines: Vec<String>,
}

impl TexDocument {
    /// Split source text into lines (line terminators are dropped)
    pub fn from_source(source: &str) -> Self {
        Self {
            lines: source.lines().map(str::to_string).collect(),
        }
    }

    /// Load a `.tex` file
    pub fn from_file(path: impl AsRef<Path>) -> TexkitResult<Self> {
        Ok(Self::from_source(&read_tex_file(path)?))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Remove trailing `%` comments from every line
    pub fn strip_comments(mut self) -> Self {
        for line in &mut self.lines {
            let keep = strip_comment(line).len();
            line.truncate(keep);
        }
        self
    }

    /// Drop every line from a `%TC:ignore` marker through the matching
    /// `%TC:endignore` marker (both marker lines included).
    pub fn strip_tc_ignore(self) -> Self {
        let mut ignoring = false;
        let mut kept = Vec::with_capacity(self.lines.len());
        let mut dropped = 0usize;

        for line in self.lines {
            // `%TC:endignore` does not contain `%TC:ignore`, so the checks are independent
            if line.contains(TC_IGNORE) {
                ignoring = true;
            }
            let ends_block = line.contains(TC_END_IGNORE);
            if ignoring {
                dropped += 1;
            } else {
                kept.push(line);
            }
            if ends_block {
                ignoring = false;
            }
        }

        if dropped > 0 {
            tracing::debug!("ignoring {} lines inside %TC:ignore blocks", dropped);
        }
        Self { lines: kept }
    }

    /// Prepare a document for counting: optional TC-ignore removal, then comments
    pub fn prepared(self, ignore_tc_blocks: bool) -> Self {
        let document = if ignore_tc_blocks {
            self.strip_tc_ignore()
        } else {
            self
        };
        document.strip_comments()
    }

    /// Join a half-open line range back into text
    pub fn span(&self, start: usize, end: usize) -> String {
        self.lines[start..end].join("\n")
    }
}
