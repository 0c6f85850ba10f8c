// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # bagzarr
//!
//! Convert ROS1 bag recordings into chunked, compressed Zarr v2 array
//! stores: one `(N, 10)` float64 dataset per topic.
//!
//! ## Architecture
//!
//! - `io/` - Bag reading and writing, log discovery, topic filtering
//! - `schema/` - ROS1 `.msg` parsing and the schema registry
//! - `encoding/` - ROS1 message deserialization
//! - `extract` - Decoded message to fixed-width record
//! - `store/` - Zarr v2 directory store
//! - `config` - TOML conversion config
//! - `pipeline/` - The streaming transform engine
//!
//! ## Example: Converting a bag
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use bagzarr::io::TopicFilter;
//! use bagzarr::pipeline::{TransformOptions, Transformer};
//! use bagzarr::schema::SchemaRegistry;
//!
//! let registry = SchemaRegistry::new();
//! registry.load_directory("msgs")?;
//!
//! let options = TransformOptions::default().with_chunk_size(500);
//! let transformer = Transformer::new(&registry, options)?;
//! let stats = transformer.run(
//!     Path::new("dive_001.bag"),
//!     Path::new("dive.zarr"),
//!     &TopicFilter::include(vec!["/hotel/a2d2".to_string()]),
//! )?;
//! println!("stored {} records", stats.total_records());
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{CodecValue, DecodedMessage, Error, Result};

// Schema parsing and registry
pub mod schema;

// ROS1 deserialization
pub mod encoding;

// Bag I/O and discovery
pub mod io;

// Record extraction
pub mod extract;

// Zarr v2 store
pub mod store;

// Config file
pub mod config;

// Transform engine
pub mod pipeline;

pub use pipeline::{transform, TransformOptions, TransformStats, Transformer};

#[cfg(test)]
mod test_util;
