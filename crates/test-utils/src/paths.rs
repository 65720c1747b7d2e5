//! Path utilities for locating workspace configuration in tests.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
///
/// Walks up from the test-utils manifest directory (`crates/test-utils`).
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// The config directory shipped with the explorer-api service.
///
/// Contains `collections/*.yaml`.
pub fn service_config_dir() -> PathBuf {
    workspace_root()
        .join("services")
        .join("explorer-api")
        .join("config")
}

/// Creates a temporary config directory holding the given collection files.
///
/// Each entry is `(file stem, yaml)`, written to `collections/{stem}.yaml`.
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_config_dir(collections: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::Builder::new()
        .prefix("explorer_config_")
        .tempdir()
        .expect("Failed to create temporary config directory");
    write_collections(dir.path(), collections);
    dir
}

fn write_collections(config_dir: &Path, collections: &[(&str, &str)]) {
    let collections_dir = config_dir.join("collections");
    std::fs::create_dir_all(&collections_dir).expect("Failed to create collections directory");
    for (stem, yaml) in collections {
        std::fs::write(collections_dir.join(format!("{}.yaml", stem)), yaml)
            .expect("Failed to write collection file");
    }
}
