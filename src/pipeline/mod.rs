// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Streaming bag to array store transform.
//!
//! - [`TransformOptions`] - Configuration for a run
//! - [`TransformStats`] - Counters from a run
//! - [`Transformer`] - The engine: one pass over one bag
//! - [`transform`] - Convenience entry that resolves the topic filter from a
//!   config file first
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use bagzarr::pipeline::{transform, TransformOptions};
//! use bagzarr::schema::SchemaRegistry;
//!
//! let registry = SchemaRegistry::new();
//! let stats = transform(
//!     Path::new("dive_001.bag"),
//!     Path::new("dive.zarr"),
//!     Some(Path::new("topics.toml")),
//!     &registry,
//!     TransformOptions::default(),
//! )?;
//! println!("{} records stored", stats.total_records());
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod progress;
pub mod topic;

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{load_topic_filter, ConvertSection};
use crate::core::Result;
use crate::extract::FieldSet;
use crate::schema::SchemaRegistry;
use crate::store::Compressor;

pub use engine::Transformer;
pub use topic::topic_key;

/// Default number of buffered records per topic before a flush.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Options for a transform run.
#[derive(Clone, Debug)]
pub struct TransformOptions {
    /// Records buffered per topic before a flush; also the dataset chunk
    /// length for newly created datasets
    pub chunk_size: usize,

    /// Keep existing datasets and append to them instead of starting over
    pub append: bool,

    /// Which values fill each record
    pub field_set: FieldSet,

    /// Chunk compressor for newly created datasets
    pub compressor: Compressor,

    /// Show a terminal spinner while reading
    pub progress: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            append: true,
            field_set: FieldSet::default(),
            compressor: Compressor::default(),
            progress: false,
        }
    }
}

impl TransformOptions {
    /// Set the flush threshold.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set append (true) or overwrite (false) mode.
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Set the extracted field set.
    pub fn with_field_set(mut self, field_set: FieldSet) -> Self {
        self.field_set = field_set;
        self
    }

    /// Set the chunk compressor.
    pub fn with_compressor(mut self, compressor: Compressor) -> Self {
        self.compressor = compressor;
        self
    }

    /// Enable or disable the spinner.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Overlay the values set in a `[convert]` table.
    pub fn with_config(mut self, section: &ConvertSection) -> Result<Self> {
        if let Some(chunk_size) = section.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(append) = section.append {
            self.append = append;
        }
        if let Some(field_set) = section.field_set()? {
            self.field_set = field_set;
        }
        if let Some(compressor) = section.compressor()? {
            self.compressor = compressor;
        }
        Ok(self)
    }
}

/// Statistics from a transform run.
#[derive(Debug, Clone, Default)]
pub struct TransformStats {
    /// Records stored per topic key
    pub counts: BTreeMap<String, u64>,

    /// Message records read from the bag
    pub records_read: u64,

    /// Records dropped by the topic filter
    pub filtered_out: u64,

    /// Records that failed to deserialize
    pub decode_failures: u64,

    /// Records whose fields could not be extracted
    pub extract_failures: u64,

    /// Records whose timestamp was earlier than the previous one on the
    /// same topic key
    pub disorder_warnings: u64,

    /// Datasets created by this run (not reopened)
    pub datasets_created: u64,

    /// Topics merged into a dataset already fed by another topic
    pub topic_key_collisions: u64,

    /// Records skipped because their topic has no usable dataset name
    pub invalid_topic_keys: u64,
}

impl TransformStats {
    /// Create a new empty statistics struct.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records stored across all topic keys.
    pub fn total_records(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Fold another run's counters into this one.
    pub fn merge(&mut self, other: &TransformStats) {
        for (key, count) in &other.counts {
            *self.counts.entry(key.clone()).or_insert(0) += count;
        }
        self.records_read += other.records_read;
        self.filtered_out += other.filtered_out;
        self.decode_failures += other.decode_failures;
        self.extract_failures += other.extract_failures;
        self.disorder_warnings += other.disorder_warnings;
        self.datasets_created += other.datasets_created;
        self.topic_key_collisions += other.topic_key_collisions;
        self.invalid_topic_keys += other.invalid_topic_keys;
    }
}

/// Convert one bag into an array store.
///
/// The topic filter comes from `config_path`: no config converts every
/// topic, a config without `[topics]` converts none. Only the `[topics]`
/// table is read here; callers wanting the `[convert]` defaults apply them
/// with [`TransformOptions::with_config`].
pub fn transform(
    input: &Path,
    output: &Path,
    config_path: Option<&Path>,
    registry: &SchemaRegistry,
    options: TransformOptions,
) -> Result<TransformStats> {
    let transformer = Transformer::new(registry, options)?;
    let filter = load_topic_filter(config_path)?;
    transformer.run(input, output, &filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;

    #[test]
    fn test_default_options() {
        let options = TransformOptions::default();
        assert_eq!(options.chunk_size, 1000);
        assert!(options.append);
        assert_eq!(options.field_set, FieldSet::Timestamp);
        assert_eq!(options.compressor, Compressor::default());
        assert!(!options.progress);
    }

    #[test]
    fn test_config_overlay() {
        let config = ConfigFile::parse("[convert]\nchunk_size = 25\nfields = \"a2d2\"\n").unwrap();
        let options = TransformOptions::default()
            .with_append(false)
            .with_config(&config.convert)
            .unwrap();
        assert_eq!(options.chunk_size, 25);
        assert!(!options.append);
        assert_eq!(options.field_set, FieldSet::HotelA2d2);
    }

    #[test]
    fn test_config_overlay_rejects_bad_compressor() {
        let config = ConfigFile::parse("[convert]\ncompressor = \"gzip\"\n").unwrap();
        assert!(TransformOptions::default()
            .with_config(&config.convert)
            .is_err());
    }

    #[test]
    fn test_stats_merge() {
        let mut total = TransformStats::new();
        let mut run = TransformStats::new();
        run.counts.insert("a".to_string(), 3);
        run.records_read = 5;
        run.decode_failures = 2;
        run.invalid_topic_keys = 1;
        total.merge(&run);
        total.merge(&run);
        assert_eq!(total.counts["a"], 6);
        assert_eq!(total.records_read, 10);
        assert_eq!(total.decode_failures, 4);
        assert_eq!(total.invalid_topic_keys, 2);
        assert_eq!(total.total_records(), 6);
    }
}
