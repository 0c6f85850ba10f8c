// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Chunk compressors.
//!
//! Serialized in `.zarray` with the numcodecs ids, so other Zarr v2
//! readers can decode the chunks: `{"id":"zstd","level":3}` and
//! `{"id":"lz4","acceleration":1}` (4-byte little-endian size header
//! followed by an LZ4 block).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Default zstd compression level.
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// Chunk compressor of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "id", rename_all = "lowercase")]
pub enum Compressor {
    /// Zstandard frame per chunk
    Zstd { level: i32 },
    /// LZ4 block with prepended size
    Lz4 { acceleration: i32 },
}

impl Default for Compressor {
    fn default() -> Self {
        Compressor::Zstd {
            level: DEFAULT_ZSTD_LEVEL,
        }
    }
}

impl Compressor {
    /// Compress one chunk.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Compressor::Zstd { level } => zstd::bulk::compress(data, *level)
                .map_err(|e| Error::Io(format!("zstd compression failed: {e}"))),
            Compressor::Lz4 { .. } => Ok(lz4_flex::compress_prepend_size(data)),
        }
    }

    /// Decompress one chunk of `expected_len` bytes.
    pub fn decompress(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        let decoded = match self {
            Compressor::Zstd { .. } => zstd::bulk::decompress(data, expected_len)
                .map_err(|e| Error::Io(format!("zstd decompression failed: {e}")))?,
            Compressor::Lz4 { .. } => lz4_flex::decompress_size_prepended(data)
                .map_err(|e| Error::Io(format!("lz4 decompression failed: {e}")))?,
        };
        if decoded.len() != expected_len {
            return Err(Error::Io(format!(
                "decompressed chunk is {} bytes, expected {expected_len}",
                decoded.len()
            )));
        }
        Ok(decoded)
    }

    /// The numcodecs id.
    pub fn id(&self) -> &'static str {
        match self {
            Compressor::Zstd { .. } => "zstd",
            Compressor::Lz4 { .. } => "lz4",
        }
    }
}

impl fmt::Display for Compressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compressor::Zstd { level } => write!(f, "zstd:{level}"),
            Compressor::Lz4 { .. } => write!(f, "lz4"),
        }
    }
}

impl FromStr for Compressor {
    type Err = Error;

    /// Parse `zstd`, `zstd:<level>` or `lz4`.
    fn from_str(s: &str) -> Result<Self> {
        let (name, level) = match s.split_once(':') {
            Some((name, level)) => (name, Some(level)),
            None => (s, None),
        };
        match (name.trim().to_ascii_lowercase().as_str(), level) {
            ("zstd", None) => Ok(Compressor::default()),
            ("zstd", Some(level)) => {
                let level = level.trim().parse::<i32>().map_err(|e| {
                    Error::invalid_argument("compressor", format!("bad zstd level '{level}': {e}"))
                })?;
                Ok(Compressor::Zstd { level })
            }
            ("lz4", None) => Ok(Compressor::Lz4 { acceleration: 1 }),
            _ => Err(Error::invalid_argument(
                "compressor",
                format!("unknown compressor '{s}' (expected zstd, zstd:<level> or lz4)"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        (0..4096u32).flat_map(|i| ((i % 17) as f64).to_le_bytes()).collect()
    }

    #[test]
    fn test_zstd_and_lz4_restore_chunk() {
        let data = sample();
        for compressor in [Compressor::default(), Compressor::Lz4 { acceleration: 1 }] {
            let packed = compressor.compress(&data).unwrap();
            assert!(packed.len() < data.len(), "{compressor} did not compress");
            assert_eq!(compressor.decompress(&packed, data.len()).unwrap(), data);
        }
    }

    #[test]
    fn test_lz4_size_header() {
        let packed = Compressor::Lz4 { acceleration: 1 }.compress(&[1, 2, 3]).unwrap();
        assert_eq!(&packed[..4], &3u32.to_le_bytes());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let compressor = Compressor::default();
        let packed = compressor.compress(&[0u8; 64]).unwrap();
        assert!(compressor.decompress(&packed, 32).is_err());
    }

    #[test]
    fn test_json_form() {
        let json = serde_json::to_string(&Compressor::Zstd { level: 5 }).unwrap();
        assert_eq!(json, r#"{"id":"zstd","level":5}"#);
        let lz4: Compressor = serde_json::from_str(r#"{"id":"lz4","acceleration":1}"#).unwrap();
        assert_eq!(lz4, Compressor::Lz4 { acceleration: 1 });
    }

    #[test]
    fn test_from_str() {
        assert_eq!("zstd".parse::<Compressor>().unwrap(), Compressor::default());
        assert_eq!(
            "zstd:9".parse::<Compressor>().unwrap(),
            Compressor::Zstd { level: 9 }
        );
        assert_eq!(
            "LZ4".parse::<Compressor>().unwrap(),
            Compressor::Lz4 { acceleration: 1 }
        );
        assert!("blosc".parse::<Compressor>().is_err());
        assert!("zstd:high".parse::<Compressor>().is_err());
    }
}
