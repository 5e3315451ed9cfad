//! BibTeX parsing, formatting and keyed lookup
//!
//! Features:
//! - Nom-based parser with per-entry error recovery
//! - Round-trip formatting of (possibly trimmed) entries
//! - [`Bibliography`]: citation key -> entry, with field removal
//! - Optional JSON sidecar cache for large `.bib` files

mod bibliography;
mod cache;
mod entry;
mod formatter;
pub mod parser;

pub use bibliography::{
    expand_field_selection, Bibliography, BibliographyError, BibliographyResult, MOST_FIELDS,
    MOST_PRESET,
};
pub use cache::{cache_path, load_bibliography, CachePolicy};
pub use entry::{strip_braces, BibTeXEntry, BibTeXEntryType, BibTeXField};
pub use formatter::{format_entries, format_entry};
pub use parser::{parse, parse_entry, BibTeXParseError, BibTeXParseResult, ParseError};
