//! texkit core - plain text, word counts and citation statistics for LaTeX
//!
//! - **Source**: line-oriented documents with comment and `%TC:ignore` stripping
//! - **Sectioning**: the seven LaTeX heading levels with their total order
//! - **Detex**: ordered regex rule table reducing LaTeX to readable text
//! - **Word count**: per-heading local and cumulative counts, CSV export
//! - **Citations**: key extraction, filtering and usage report
//! - **Rewrite**: trimmed bibliography holding only cited entries
//! - **Config**: TOML preferences shared by the `texkit` binary

pub mod citations;
pub mod config;
pub mod csv_export;
pub mod detex;
pub mod error;
pub mod rewrite;
pub mod sectioning;
pub mod source;
pub mod word_count;

pub use citations::*;
pub use config::*;
pub use csv_export::*;
pub use detex::*;
pub use error::*;
pub use rewrite::*;
pub use sectioning::*;
pub use source::*;
pub use word_count::*;

pub use texkit_bibtex;
