//! Error types for texkit operations

use std::path::PathBuf;
use thiserror::Error;

use texkit_bibtex::BibliographyError;

/// Errors that can occur while analysing a LaTeX project
#[derive(Debug, Error)]
pub enum TexkitError {
    /// Reading or writing a file failed
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Missing or contradictory arguments
    #[error("usage error: {0}")]
    Usage(String),

    /// A user-supplied regular expression could not be compiled
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Writing CSV output failed
    #[error("csv output failed: {0}")]
    Csv(#[from] csv::Error),

    /// The configuration file is not valid TOML for [`crate::TexkitConfig`]
    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Loading the bibliography failed
    #[error(transparent)]
    Bibliography(#[from] BibliographyError),
}

impl TexkitError {
    /// Wrap an I/O error with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for texkit operations
pub type TexkitResult<T> = Result<T, TexkitError>;
