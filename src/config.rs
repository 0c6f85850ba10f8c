// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Conversion config file (TOML).
//!
//! ```toml
//! [topics]
//! a2d2 = "/hotel/a2d2"
//! depth = "/nav/depth"
//!
//! [convert]
//! chunk_size = 1000
//! append = true
//! fields = "timestamp"
//! compressor = "zstd"
//!
//! [schemas]
//! dirs = ["ds_msgs/ds_hotel_msgs"]
//! ```
//!
//! Only the values of `[topics]` matter; the logical names are labels.
//! Relative schema directories are resolved against the config file's
//! directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::{Error, Result};
use crate::extract::FieldSet;
use crate::io::TopicFilter;
use crate::store::Compressor;

/// The whole config document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Logical name to topic name
    #[serde(default)]
    pub topics: Option<BTreeMap<String, String>>,
    /// Conversion defaults
    #[serde(default)]
    pub convert: ConvertSection,
    /// Message definition directories
    #[serde(default)]
    pub schemas: SchemaSection,
    /// Directory of the file this was loaded from
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// `[convert]` table. Unset keys fall back to the CLI or library defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertSection {
    pub chunk_size: Option<usize>,
    pub append: Option<bool>,
    pub fields: Option<String>,
    pub compressor: Option<String>,
}

/// `[schemas]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaSection {
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
}

impl ConfigFile {
    /// Load and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::config(path, format!("Failed to read config: {e}")))?;
        let mut config = Self::parse(&text).map_err(|e| match e {
            Error::Config { message, .. } => Error::config(path, message),
            other => other,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parse config text not tied to a file.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config("<inline>", e.to_string()))
    }

    /// Topic allowlist. A document without `[topics]` allows nothing.
    pub fn topic_filter(&self) -> TopicFilter {
        match &self.topics {
            Some(topics) => TopicFilter::Include(topics.values().cloned().collect()),
            None => TopicFilter::Include(Vec::new()),
        }
    }

    /// Schema directories, resolved against the config file's directory.
    pub fn schema_dirs(&self) -> Vec<PathBuf> {
        self.schemas
            .dirs
            .iter()
            .map(|dir| match &self.base_dir {
                Some(base) if dir.is_relative() => base.join(dir),
                _ => dir.clone(),
            })
            .collect()
    }
}

impl ConvertSection {
    /// The configured field set, if any.
    pub fn field_set(&self) -> Result<Option<FieldSet>> {
        self.fields.as_deref().map(str::parse).transpose()
    }

    /// The configured compressor, if any.
    pub fn compressor(&self) -> Result<Option<Compressor>> {
        self.compressor.as_deref().map(str::parse).transpose()
    }
}

/// Resolve the topic filter for a run.
///
/// No config path means every topic passes. Otherwise the `[topics]`
/// values form the allowlist, in logical-name order.
pub fn load_topic_filter(config_path: Option<&Path>) -> Result<TopicFilter> {
    match config_path {
        None => Ok(TopicFilter::All),
        Some(path) => Ok(ConfigFile::load(path)?.topic_filter()),
    }
}
