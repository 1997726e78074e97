#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the dataset and its processed outputs.
//!
//! The raw dump is expected somewhere under the project's `data/` directory,
//! in one of the layouts the Yelp download unpacks to.

use std::path::{Path, PathBuf};

use crate::ProcessError;

/// File name of the Yelp business dump.
pub const BUSINESS_JSON: &str = "yelp_academic_dataset_business.json";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the `processed/` output directory under `data_dir`.
#[must_use]
pub fn processed_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("processed")
}

/// Locations searched for the business dump under `base_dir`, most specific
/// first.
#[must_use]
pub fn candidate_paths(base_dir: &Path) -> [PathBuf; 3] {
    [
        base_dir
            .join("Yelp JSON")
            .join("yelp_dataset")
            .join(BUSINESS_JSON),
        base_dir.join("yelp_dataset").join(BUSINESS_JSON),
        base_dir.join(BUSINESS_JSON),
    ]
}

/// Returns the first candidate under `base_dir` that is an existing file.
#[must_use]
pub fn find_business_json(base_dir: &Path) -> Option<PathBuf> {
    candidate_paths(base_dir)
        .into_iter()
        .find(|path| path.is_file())
}

/// Looks for the business dump under `data_dir`, then under its parent.
///
/// # Errors
///
/// Returns [`ProcessError::InputNotFound`] listing every searched path if the
/// dump is in none of them.
pub fn locate_business_json(data_dir: &Path) -> Result<PathBuf, ProcessError> {
    let mut searched = Vec::new();

    for base in std::iter::once(data_dir).chain(data_dir.parent()) {
        if let Some(found) = find_business_json(base) {
            log::debug!("Found business dump at {}", found.display());
            return Ok(found);
        }
        searched.extend(candidate_paths(base));
    }

    Err(ProcessError::InputNotFound {
        file: BUSINESS_JSON,
        searched,
    })
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
