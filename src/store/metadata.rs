// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Zarr v2 metadata documents (`.zgroup`, `.zarray`).

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Error, Result};
use crate::store::codec::Compressor;

pub const ZARR_FORMAT: u32 = 2;
pub const GROUP_FILE: &str = ".zgroup";
pub const ARRAY_FILE: &str = ".zarray";
pub const ATTRS_FILE: &str = ".zattrs";

/// Little-endian IEEE 754 double.
pub const DTYPE_F64: &str = "<f8";

/// `.zgroup` contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMetadata {
    pub zarr_format: u32,
}

impl Default for GroupMetadata {
    fn default() -> Self {
        Self {
            zarr_format: ZARR_FORMAT,
        }
    }
}

/// `.zarray` contents for a 2-D float64 dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayMetadata {
    pub zarr_format: u32,
    pub shape: Vec<u64>,
    pub chunks: Vec<u64>,
    pub dtype: String,
    pub compressor: Option<Compressor>,
    pub fill_value: Value,
    pub order: String,
    pub filters: Option<Vec<Value>>,
}

impl ArrayMetadata {
    /// Metadata of an empty `(0, width)` array chunked by `chunk_rows`.
    pub fn new(width: usize, chunk_rows: usize, compressor: Compressor) -> Self {
        Self {
            zarr_format: ZARR_FORMAT,
            shape: vec![0, width as u64],
            chunks: vec![chunk_rows as u64, width as u64],
            dtype: DTYPE_F64.to_string(),
            compressor: Some(compressor),
            fill_value: Value::String("NaN".to_string()),
            order: "C".to_string(),
            filters: None,
        }
    }

    /// Check that this crate can read and append to the array.
    pub fn validate(&self, path: &Path) -> Result<()> {
        let problem = if self.zarr_format != ZARR_FORMAT {
            Some(format!("unsupported zarr_format {}", self.zarr_format))
        } else if self.shape.len() != 2 || self.chunks.len() != 2 {
            Some(format!("expected a 2-D array, got shape {:?}", self.shape))
        } else if self.dtype != DTYPE_F64 {
            Some(format!("unsupported dtype '{}'", self.dtype))
        } else if self.order != "C" {
            Some(format!("unsupported order '{}'", self.order))
        } else if self.chunks[0] == 0 || self.chunks[1] != self.shape[1] {
            Some(format!(
                "chunks {:?} must split rows only for shape {:?}",
                self.chunks, self.shape
            ))
        } else if self.filters.as_ref().is_some_and(|f| !f.is_empty()) {
            Some("filters are not supported".to_string())
        } else {
            None
        };
        match problem {
            Some(reason) => Err(Error::store(path, reason)),
            None => Ok(()),
        }
    }

    /// The fill value as a float (NaN when unset or unrecognized).
    pub fn fill_value(&self) -> f64 {
        match &self.fill_value {
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) if s == "Infinity" => f64::INFINITY,
            Value::String(s) if s == "-Infinity" => f64::NEG_INFINITY,
            _ => f64::NAN,
        }
    }
}

/// Read a JSON metadata document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::store(path, format!("Failed to read metadata: {e}")))?;
    serde_json::from_str(&text)
        .map_err(|e| Error::store(path, format!("Invalid metadata: {e}")))
}

/// Write a JSON metadata document.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| Error::store(path, format!("Failed to encode metadata: {e}")))?;
    fs::write(path, text).map_err(|e| Error::store(path, format!("Failed to write metadata: {e}")))
}
