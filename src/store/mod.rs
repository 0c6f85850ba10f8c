// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Zarr v2 directory store.
//!
//! A store is a directory with a `.zgroup` file; each dataset is a
//! sub-directory with `.zarray`, optional `.zattrs`, and chunk files.

pub mod codec;
pub mod dataset;
pub mod metadata;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::{Error, Result};

pub use codec::Compressor;
pub use dataset::{Dataset, DatasetSpec};
pub use metadata::{ArrayMetadata, GroupMetadata};

use metadata::{read_json, write_json, ARRAY_FILE, GROUP_FILE};

/// How to treat an existing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Create if missing; keep existing datasets
    #[default]
    Append,
    /// Remove any existing contents first
    Overwrite,
}

impl OpenMode {
    /// `Append` when `append` is set, else `Overwrite`.
    pub fn from_append(append: bool) -> Self {
        if append {
            OpenMode::Append
        } else {
            OpenMode::Overwrite
        }
    }
}

/// Root group of an on-disk array store.
#[derive(Debug)]
pub struct ArrayStore {
    root: PathBuf,
}

impl ArrayStore {
    /// Open (or create) a store at `path`.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if root.exists() && !root.is_dir() {
            return Err(Error::store(&root, "store path exists and is not a directory"));
        }

        if mode == OpenMode::Overwrite && root.exists() {
            fs::remove_dir_all(&root)
                .map_err(|e| Error::store(&root, format!("Failed to clear store: {e}")))?;
            info!(store = %root.display(), "Cleared existing store");
        }
        fs::create_dir_all(&root)
            .map_err(|e| Error::store(&root, format!("Failed to create store: {e}")))?;

        let group_file = root.join(GROUP_FILE);
        if group_file.exists() {
            let group: GroupMetadata = read_json(&group_file)?;
            if group.zarr_format != metadata::ZARR_FORMAT {
                return Err(Error::store(
                    &root,
                    format!("unsupported zarr_format {}", group.zarr_format),
                ));
            }
        } else {
            write_json(&group_file, &GroupMetadata::default())?;
        }

        debug!(store = %root.display(), ?mode, "Opened array store");
        Ok(Self { root })
    }

    /// Open an existing store without creating anything.
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.join(GROUP_FILE).is_file() {
            return Err(Error::store(&root, "not an array store (missing .zgroup)"));
        }
        Self::open(root, OpenMode::Append)
    }

    /// Store root directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Check if a dataset exists.
    pub fn contains(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.root.join(name).join(ARRAY_FILE).is_file()
    }

    /// Create a new, empty dataset.
    pub fn create_dataset(&self, name: &str, spec: DatasetSpec) -> Result<Dataset> {
        validate_name(name)?;
        let dataset = Dataset::create(name, self.root.join(name), spec)?;
        debug!(
            dataset = name,
            width = spec.width,
            chunk_rows = spec.chunk_rows,
            compressor = %spec.compressor,
            "Created dataset"
        );
        Ok(dataset)
    }

    /// Open an existing dataset.
    pub fn open_dataset(&self, name: &str) -> Result<Dataset> {
        validate_name(name)?;
        if !self.contains(name) {
            return Err(Error::store(self.root.join(name), "dataset does not exist"));
        }
        Dataset::open(name, self.root.join(name))
    }

    /// Names of all datasets, sorted.
    pub fn dataset_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let entries = fs::read_dir(&self.root)
            .map_err(|e| Error::store(&self.root, format!("Failed to list store: {e}")))?;
        for entry in entries {
            let path = entry?.path();
            if !path.join(ARRAY_FILE).is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Check if `name` can name a dataset: a single, non-hidden path component.
pub fn is_valid_dataset_name(name: &str) -> bool {
    validate_name(name).is_ok()
}

/// Dataset names are single path components.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(Error::invalid_argument(
            "dataset name",
            format!("'{name}' is not a valid dataset name"),
        ));
    }
    Ok(())
}
