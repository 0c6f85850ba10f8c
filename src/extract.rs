// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field extraction: one decoded message to one fixed-width numeric row.
//!
//! Position 0 always holds the message's `header.stamp` in seconds. What
//! fills positions 1 to 9 depends on the [`FieldSet`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::core::{CodecValue, DecodedMessage, Error as CoreError};

/// Values per extracted record.
pub const RECORD_WIDTH: usize = 10;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// One extracted row. Unpopulated positions are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedRecord(pub [f64; RECORD_WIDTH]);

impl ExtractedRecord {
    /// A record with the given timestamp and every other position NaN.
    pub fn from_timestamp(seconds: f64) -> Self {
        let mut values = [f64::NAN; RECORD_WIDTH];
        values[0] = seconds;
        Self(values)
    }

    /// Primary timestamp in seconds.
    pub fn timestamp(&self) -> f64 {
        self.0[0]
    }

    /// All values.
    pub fn values(&self) -> &[f64; RECORD_WIDTH] {
        &self.0
    }
}

/// Which fields populate positions 1 to 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldSet {
    /// Timestamp only; positions 1 to 9 stay NaN
    #[default]
    Timestamp,
    /// `ds_hotel_msgs/A2D2`: header time, `ds_header.orig_stamp`,
    /// `raw[0..4]`, `proc[0..4]`
    HotelA2d2,
}

impl FieldSet {
    /// Column labels, stored with each dataset.
    pub fn labels(&self) -> [&'static str; RECORD_WIDTH] {
        match self {
            FieldSet::Timestamp => [
                "time", "reserved_1", "reserved_2", "reserved_3", "reserved_4", "reserved_5",
                "reserved_6", "reserved_7", "reserved_8", "reserved_9",
            ],
            FieldSet::HotelA2d2 => [
                "time", "ds_time", "raw_0", "raw_1", "raw_2", "raw_3", "proc_0", "proc_1",
                "proc_2", "proc_3",
            ],
        }
    }

    /// Short name, as accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            FieldSet::Timestamp => "timestamp",
            FieldSet::HotelA2d2 => "a2d2",
        }
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldSet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timestamp" => Ok(FieldSet::Timestamp),
            "a2d2" | "hotel_a2d2" => Ok(FieldSet::HotelA2d2),
            _ => Err(CoreError::invalid_argument(
                "fields",
                format!("unknown field set '{s}' (expected timestamp or a2d2)"),
            )),
        }
    }
}

/// Why a message could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("missing field '{path}'")]
    MissingField { path: String },

    #[error("field '{path}' has type {found}, expected {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("array '{path}' has {found} elements, expected at least {expected}")]
    ShortArray {
        path: String,
        expected: usize,
        found: usize,
    },
}

impl ExtractError {
    /// Dotted path of the offending field.
    pub fn path(&self) -> &str {
        match self {
            ExtractError::MissingField { path }
            | ExtractError::TypeMismatch { path, .. }
            | ExtractError::ShortArray { path, .. } => path,
        }
    }
}

/// Extract one record from a decoded message.
pub fn extract(message: &DecodedMessage, field_set: FieldSet) -> Result<ExtractedRecord, ExtractError> {
    let mut record = ExtractedRecord::from_timestamp(time_at(message, "header.stamp")?);

    if field_set == FieldSet::HotelA2d2 {
        record.0[1] = time_at(message, "ds_header.orig_stamp")?;
        let raw = numbers_at::<4>(message, "raw")?;
        let proc = numbers_at::<4>(message, "proc")?;
        record.0[2..6].copy_from_slice(&raw);
        record.0[6..10].copy_from_slice(&proc);
    }

    Ok(record)
}

/// Follow a dotted path through nested structs.
fn lookup<'a>(message: &'a DecodedMessage, path: &str) -> Result<&'a CodecValue, ExtractError> {
    let mut parts = path.split('.');
    let first = parts.next().unwrap_or_default();
    let mut value = message
        .get(first)
        .ok_or_else(|| ExtractError::MissingField {
            path: first.to_string(),
        })?;
    let mut walked = first.to_string();

    for part in parts {
        let fields = value.as_struct().ok_or_else(|| ExtractError::TypeMismatch {
            path: walked.clone(),
            expected: "struct",
            found: value.type_name(),
        })?;
        walked.push('.');
        walked.push_str(part);
        value = fields.get(part).ok_or_else(|| ExtractError::MissingField {
            path: walked.clone(),
        })?;
    }
    Ok(value)
}

/// Read a time value as seconds: whole seconds plus nanoseconds * 1e-9.
///
/// Accepts a decoded `time` or a struct with `secs`/`nsecs` (ROS1) or
/// `sec`/`nanosec` (ROS2) fields.
fn time_at(message: &DecodedMessage, path: &str) -> Result<f64, ExtractError> {
    let value = lookup(message, path)?;
    let (secs, nsecs) = match value {
        CodecValue::Timestamp(ns) => (ns.div_euclid(NANOS_PER_SEC), ns.rem_euclid(NANOS_PER_SEC)),
        CodecValue::Struct(fields) => {
            let secs = fields.get("secs").or_else(|| fields.get("sec"));
            let nsecs = fields.get("nsecs").or_else(|| fields.get("nanosec"));
            match (secs.and_then(CodecValue::as_i64), nsecs.and_then(CodecValue::as_i64)) {
                (Some(secs), Some(nsecs)) => (secs, nsecs),
                _ => {
                    return Err(ExtractError::TypeMismatch {
                        path: path.to_string(),
                        expected: "time",
                        found: "struct",
                    })
                }
            }
        }
        other => {
            return Err(ExtractError::TypeMismatch {
                path: path.to_string(),
                expected: "time",
                found: other.type_name(),
            })
        }
    };
    Ok(secs as f64 + nsecs as f64 * 1e-9)
}

/// Read the first `N` numbers of an array field.
fn numbers_at<const N: usize>(
    message: &DecodedMessage,
    path: &str,
) -> Result<[f64; N], ExtractError> {
    let mut out = [0.0; N];
    match lookup(message, path)? {
        CodecValue::Array(items) => {
            if items.len() < N {
                return Err(ExtractError::ShortArray {
                    path: path.to_string(),
                    expected: N,
                    found: items.len(),
                });
            }
            for (i, (slot, item)) in out.iter_mut().zip(items).enumerate() {
                *slot = item.as_f64().ok_or_else(|| ExtractError::TypeMismatch {
                    path: format!("{path}[{i}]"),
                    expected: "number",
                    found: item.type_name(),
                })?;
            }
        }
        CodecValue::Bytes(bytes) => {
            if bytes.len() < N {
                return Err(ExtractError::ShortArray {
                    path: path.to_string(),
                    expected: N,
                    found: bytes.len(),
                });
            }
            for (slot, byte) in out.iter_mut().zip(bytes) {
                *slot = f64::from(*byte);
            }
        }
        other => {
            return Err(ExtractError::TypeMismatch {
                path: path.to_string(),
                expected: "array",
                found: other.type_name(),
            })
        }
    }
    Ok(out)
}
