//! Configuration for texkit
//!
//! Read from TOML. Lookup order: an explicit path, `./texkit.toml`, then
//! `<config dir>/texkit/config.toml`; without any file the defaults apply.
//! Every key is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::citations::DEFAULT_CITE_COMMANDS;
use crate::csv_export::parse_delimiter;
use crate::error::{TexkitError, TexkitResult};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "texkit.toml";

/// User preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TexkitConfig {
    /// Fields removed by `create-bibliography` when none are given
    pub remove_fields: Vec<String>,
    /// Citation commands, without backslash
    pub cite_commands: Vec<String>,
    /// Delimiter of the word count CSV files
    pub csv_delimiter: String,
    /// Use the JSON sidecar cache of parsed bibliographies
    pub use_cache: bool,
}

impl Default for TexkitConfig {
    fn default() -> Self {
        Self {
            remove_fields: vec!["file".into(), "abstract".into(), "note".into()],
            cite_commands: DEFAULT_CITE_COMMANDS.iter().map(|c| c.to_string()).collect(),
            csv_delimiter: ",".into(),
            use_cache: false,
        }
    }
}

impl TexkitConfig {
    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Read a specific config file
    pub fn from_file(path: impl AsRef<Path>) -> TexkitResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| TexkitError::io(path, e))?;
        let config = Self::from_toml(&contents).map_err(|source| TexkitError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the configuration, honoring an explicit path first.
    ///
    /// An explicit path must exist; the implicit locations are optional.
    pub fn load(explicit: Option<&Path>) -> TexkitResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_locations().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// The CSV delimiter as a byte
    pub fn csv_delimiter_byte(&self) -> TexkitResult<u8> {
        parse_delimiter(&self.csv_delimiter)
    }
}

/// Implicit config file locations, in lookup order
pub fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("texkit").join("config.toml"));
    }
    locations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TexkitConfig::default();
        assert_eq!(config.remove_fields, vec!["file", "abstract", "note"]);
        assert_eq!(config.cite_commands, vec!["autocite", "cite"]);
        assert_eq!(config.csv_delimiter_byte().unwrap(), b',');
        assert!(!config.use_cache);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TexkitConfig::from_toml("cite_commands = [\"parencite\"]\nuse_cache = true\n").unwrap();
        assert_eq!(config.cite_commands, vec!["parencite"]);
        assert!(config.use_cache);
        assert_eq!(config.remove_fields, TexkitConfig::default().remove_fields);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = TexkitConfig {
            csv_delimiter: ";".into(),
            ..Default::default()
        };
        let restored = TexkitConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_explicit_path_must_exist_and_parse() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            TexkitConfig::load(Some(missing.as_path())),
            Err(TexkitError::Io { .. })
        ));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "use_cache = \"maybe\"").unwrap();
        assert!(matches!(
            TexkitConfig::load(Some(broken.as_path())),
            Err(TexkitError::Config { .. })
        ));

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "csv_delimiter = \"\\t\"").unwrap();
        let config = TexkitConfig::load(Some(good.as_path())).unwrap();
        assert_eq!(config.csv_delimiter_byte().unwrap(), b'\t');
    }
}
