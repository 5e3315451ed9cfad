//! JSON sidecar cache for parsed bibliographies
//!
//! Large reference-manager exports are slow to parse on every run. The cache
//! lives next to the `.bib` file as `<name>.bib.json` and is read when
//! present, written when absent or when a refresh is forced. There is no
//! locking: two concurrent runs against the same cache may race.

use std::path::{Path, PathBuf};

use crate::bibliography::{Bibliography, BibliographyError, BibliographyResult};

/// How a bibliography should be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Always parse the `.bib` file; never touch the sidecar
    #[default]
    Disabled,
    /// Use the sidecar if it exists, otherwise parse and write it
    ReadWrite,
    /// Parse the `.bib` file and overwrite the sidecar
    Refresh,
}

/// Sidecar path for a bibliography: `refs.bib` -> `refs.bib.json`
pub fn cache_path(bib_path: &Path) -> PathBuf {
    let mut name = bib_path.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Load a bibliography honoring the cache policy
pub fn load_bibliography(
    bib_path: impl AsRef<Path>,
    policy: CachePolicy,
) -> BibliographyResult<Bibliography> {
    let bib_path = bib_path.as_ref();
    let sidecar = cache_path(bib_path);

    if policy == CachePolicy::ReadWrite && sidecar.exists() {
        tracing::info!("loading cached bibliography {}", sidecar.display());
        return read_cache(&sidecar);
    }

    let bibliography = Bibliography::from_file(bib_path)?;
    if policy != CachePolicy::Disabled {
        write_cache(&sidecar, &bibliography)?;
    }
    Ok(bibliography)
}

fn read_cache(path: &Path) -> BibliographyResult<Bibliography> {
    let contents = std::fs::read_to_string(path).map_err(|source| BibliographyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| BibliographyError::Cache {
        path: path.to_path_buf(),
        source,
    })
}

fn write_cache(path: &Path, bibliography: &Bibliography) -> BibliographyResult<()> {
    let json = serde_json::to_string(bibliography).map_err(|source| BibliographyError::Cache {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| BibliographyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("wrote bibliography cache {}", path.display());
    Ok(())
}
