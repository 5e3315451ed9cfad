//! Test fixture loading utilities

use std::path::{Path, PathBuf};

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a fixture file as a string
#[allow(dead_code)]
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Copy a fixture into `dir` so tests can write files next to it
#[allow(dead_code)]
pub fn copy_fixture(name: &str, dir: &Path) -> PathBuf {
    let target = dir.join(name);
    std::fs::copy(fixture_path(name), &target)
        .unwrap_or_else(|_| panic!("Failed to copy fixture: {}", name));
    target
}
