// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! A resizable, chunked 2-D float64 array.
//!
//! Rows are chunked along the first dimension only, so chunk `i` is the
//! file `i.0` holding rows `i * chunk_rows .. (i + 1) * chunk_rows`. Every
//! chunk file holds a full chunk; rows past the array length are fill.

use std::fs;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use serde_json::Value;
use tracing::trace;

use crate::core::{Error, Result};
use crate::store::codec::Compressor;
use crate::store::metadata::{read_json, write_json, ArrayMetadata, ARRAY_FILE, ATTRS_FILE};

/// Layout of a dataset to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSpec {
    /// Values per row
    pub width: usize,
    /// Rows per chunk
    pub chunk_rows: usize,
    /// Chunk compressor
    pub compressor: Compressor,
}

impl DatasetSpec {
    /// Create a spec with the default compressor.
    pub fn new(width: usize, chunk_rows: usize) -> Self {
        Self {
            width,
            chunk_rows,
            compressor: Compressor::default(),
        }
    }

    /// Set the compressor.
    pub fn with_compressor(mut self, compressor: Compressor) -> Self {
        self.compressor = compressor;
        self
    }
}

/// Handle to one array of an [`ArrayStore`](super::ArrayStore).
#[derive(Debug)]
pub struct Dataset {
    name: String,
    path: PathBuf,
    meta: ArrayMetadata,
}

impl Dataset {
    /// Create the array directory and its metadata.
    pub(crate) fn create(name: &str, path: PathBuf, spec: DatasetSpec) -> Result<Self> {
        if spec.width == 0 || spec.chunk_rows == 0 {
            return Err(Error::invalid_argument(
                "dataset spec",
                format!(
                    "width ({}) and chunk rows ({}) must be positive",
                    spec.width, spec.chunk_rows
                ),
            ));
        }
        if path.join(ARRAY_FILE).exists() {
            return Err(Error::store(&path, "dataset already exists"));
        }
        fs::create_dir_all(&path)
            .map_err(|e| Error::store(&path, format!("Failed to create dataset: {e}")))?;

        let meta = ArrayMetadata::new(spec.width, spec.chunk_rows, spec.compressor);
        write_json(&path.join(ARRAY_FILE), &meta)?;
        Ok(Self {
            name: name.to_string(),
            path,
            meta,
        })
    }

    /// Open an existing array.
    pub(crate) fn open(name: &str, path: PathBuf) -> Result<Self> {
        let meta: ArrayMetadata = read_json(&path.join(ARRAY_FILE))?;
        meta.validate(&path)?;
        Ok(Self {
            name: name.to_string(),
            path,
            meta,
        })
    }

    /// Dataset name within the store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dataset directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.meta.shape[0] as usize
    }

    /// Check if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values per row.
    pub fn width(&self) -> usize {
        self.meta.shape[1] as usize
    }

    /// `(rows, width)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.len(), self.width())
    }

    /// Rows per chunk.
    pub fn chunk_rows(&self) -> usize {
        self.meta.chunks[0] as usize
    }

    /// Chunk compressor, if any.
    pub fn compressor(&self) -> Option<Compressor> {
        self.meta.compressor
    }

    /// Append a row-major batch of rows, growing the first dimension.
    ///
    /// `rows.len()` must be a multiple of the width. An empty batch leaves
    /// the dataset untouched. Returns the number of rows appended.
    pub fn append_rows(&mut self, rows: &[f64]) -> Result<usize> {
        let width = self.width();
        if rows.len() % width != 0 {
            return Err(Error::invalid_argument(
                "rows",
                format!(
                    "batch of {} values is not a multiple of width {width}",
                    rows.len()
                ),
            ));
        }
        let count = rows.len() / width;
        if count == 0 {
            return Ok(0);
        }

        let chunk_rows = self.chunk_rows();
        let mut next_row = self.len();
        let mut remaining = rows;
        while !remaining.is_empty() {
            let chunk_index = next_row / chunk_rows;
            let offset = next_row % chunk_rows;
            let mut chunk = if offset == 0 {
                vec![self.meta.fill_value(); chunk_rows * width]
            } else {
                self.read_chunk(chunk_index)?
            };

            let take = (chunk_rows - offset).min(remaining.len() / width);
            let (head, tail) = remaining.split_at(take * width);
            chunk[offset * width..(offset + take) * width].copy_from_slice(head);
            self.write_chunk(chunk_index, &chunk)?;

            next_row += take;
            remaining = tail;
        }

        self.meta.shape[0] = next_row as u64;
        write_json(&self.path.join(ARRAY_FILE), &self.meta)?;
        trace!(dataset = %self.name, rows = count, len = next_row, "Appended rows");
        Ok(count)
    }

    /// Read every row, row-major.
    pub fn read_all(&self) -> Result<Vec<f64>> {
        self.read_rows(0, self.len())
    }

    /// Read one row.
    pub fn read_row(&self, index: usize) -> Result<Vec<f64>> {
        self.read_rows(index, index + 1)
    }

    /// Read rows `start..end`, row-major.
    pub fn read_rows(&self, start: usize, end: usize) -> Result<Vec<f64>> {
        if start > end || end > self.len() {
            return Err(Error::invalid_argument(
                "rows",
                format!("range {start}..{end} outside 0..{}", self.len()),
            ));
        }
        let width = self.width();
        let chunk_rows = self.chunk_rows();
        let mut values = Vec::with_capacity((end - start) * width);
        let mut row = start;
        while row < end {
            let chunk_index = row / chunk_rows;
            let offset = row % chunk_rows;
            let take = (chunk_rows - offset).min(end - row);
            let chunk = self.read_chunk(chunk_index)?;
            values.extend_from_slice(&chunk[offset * width..(offset + take) * width]);
            row += take;
        }
        Ok(values)
    }

    /// Write `.zattrs`.
    pub fn write_attributes(&self, attributes: &Value) -> Result<()> {
        write_json(&self.path.join(ATTRS_FILE), attributes)
    }

    /// Read `.zattrs`, if present.
    pub fn attributes(&self) -> Result<Option<Value>> {
        let path = self.path.join(ATTRS_FILE);
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }

    fn chunk_path(&self, chunk_index: usize) -> PathBuf {
        self.path.join(format!("{chunk_index}.0"))
    }

    /// Read a full chunk; a missing chunk file reads as fill.
    fn read_chunk(&self, chunk_index: usize) -> Result<Vec<f64>> {
        let values = self.chunk_rows() * self.width();
        let path = self.chunk_path(chunk_index);
        if !path.exists() {
            return Ok(vec![self.meta.fill_value(); values]);
        }

        let raw = fs::read(&path)
            .map_err(|e| Error::store(&path, format!("Failed to read chunk: {e}")))?;
        let bytes = match &self.meta.compressor {
            Some(compressor) => compressor
                .decompress(&raw, values * 8)
                .map_err(|e| Error::store(&path, e.to_string()))?,
            None => raw,
        };
        if bytes.len() != values * 8 {
            return Err(Error::store(
                &path,
                format!("chunk is {} bytes, expected {}", bytes.len(), values * 8),
            ));
        }

        let mut chunk = vec![0.0; values];
        LittleEndian::read_f64_into(&bytes, &mut chunk);
        Ok(chunk)
    }

    fn write_chunk(&self, chunk_index: usize, chunk: &[f64]) -> Result<()> {
        let path = self.chunk_path(chunk_index);
        let mut bytes = vec![0u8; chunk.len() * 8];
        LittleEndian::write_f64_into(chunk, &mut bytes);
        let encoded = match &self.meta.compressor {
            Some(compressor) => compressor
                .compress(&bytes)
                .map_err(|e| Error::store(&path, e.to_string()))?,
            None => bytes,
        };
        fs::write(&path, encoded)
            .map_err(|e| Error::store(&path, format!("Failed to write chunk: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::temp_dir;

    fn rows(start: usize, count: usize, width: usize) -> Vec<f64> {
        (start..start + count)
            .flat_map(|r| (0..width).map(move |c| (r * 100 + c) as f64))
            .collect()
    }

    #[test]
    fn test_append_across_chunks() {
        let (dir, _guard) = temp_dir("dataset_across");
        let mut dataset = Dataset::create("a", dir.clone(), DatasetSpec::new(3, 4)).unwrap();

        assert_eq!(dataset.append_rows(&rows(0, 3, 3)).unwrap(), 3);
        assert_eq!(dataset.append_rows(&rows(3, 6, 3)).unwrap(), 6);
        assert_eq!(dataset.shape(), (9, 3));
        assert!(dir.join("0.0").exists());
        assert!(dir.join("2.0").exists());
        assert!(!dir.join("3.0").exists());

        assert_eq!(dataset.read_all().unwrap(), rows(0, 9, 3));
        assert_eq!(dataset.read_row(5).unwrap(), vec![500.0, 501.0, 502.0]);
        assert_eq!(dataset.read_rows(3, 5).unwrap(), rows(3, 2, 3));
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let (dir, _guard) = temp_dir("dataset_reopen");
        let spec = DatasetSpec::new(2, 5).with_compressor(Compressor::Lz4 { acceleration: 1 });
        let mut dataset = Dataset::create("b", dir.clone(), spec).unwrap();
        dataset.append_rows(&rows(0, 7, 2)).unwrap();

        let mut reopened = Dataset::open("b", dir.clone()).unwrap();
        assert_eq!(reopened.len(), 7);
        assert_eq!(reopened.compressor(), Some(Compressor::Lz4 { acceleration: 1 }));
        reopened.append_rows(&rows(7, 2, 2)).unwrap();
        assert_eq!(reopened.read_all().unwrap(), rows(0, 9, 2));
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let (dir, _guard) = temp_dir("dataset_empty");
        let mut dataset = Dataset::create("c", dir.clone(), DatasetSpec::new(10, 8)).unwrap();
        assert_eq!(dataset.append_rows(&[]).unwrap(), 0);
        assert!(dataset.is_empty());
        assert!(!dir.join("0.0").exists());
    }

    #[test]
    fn test_partial_row_rejected() {
        let (dir, _guard) = temp_dir("dataset_partial");
        let mut dataset = Dataset::create("d", dir.clone(), DatasetSpec::new(4, 8)).unwrap();
        let result = dataset.append_rows(&[1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
        assert_eq!(dataset.len(), 0);
    }

    #[test]
    fn test_trailing_rows_are_fill() {
        let (dir, _guard) = temp_dir("dataset_fill");
        let mut dataset = Dataset::create("e", dir.clone(), DatasetSpec::new(1, 4)).unwrap();
        dataset.append_rows(&[1.0]).unwrap();
        let chunk = dataset.read_chunk(0).unwrap();
        assert_eq!(chunk[0], 1.0);
        assert!(chunk[1..].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_out_of_range_read() {
        let (dir, _guard) = temp_dir("dataset_range");
        let dataset = Dataset::create("f", dir.clone(), DatasetSpec::new(1, 4)).unwrap();
        assert!(dataset.read_row(0).is_err());
    }

    #[test]
    fn test_create_twice_fails() {
        let (dir, _guard) = temp_dir("dataset_twice");
        Dataset::create("g", dir.clone(), DatasetSpec::new(1, 4)).unwrap();
        assert!(matches!(
            Dataset::create("g", dir.clone(), DatasetSpec::new(1, 4)),
            Err(Error::Store { .. })
        ));
    }

    #[test]
    fn test_attributes() {
        let (dir, _guard) = temp_dir("dataset_attrs");
        let dataset = Dataset::create("h", dir.clone(), DatasetSpec::new(1, 4)).unwrap();
        assert!(dataset.attributes().unwrap().is_none());
        dataset
            .write_attributes(&serde_json::json!({"topic": "/h"}))
            .unwrap();
        assert_eq!(dataset.attributes().unwrap().unwrap()["topic"], "/h");
    }
}
