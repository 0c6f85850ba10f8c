// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoded value type system.
//!
//! Provides the in-memory representation of a ROS1 message after
//! deserialization. A message is a map of field name to [`CodecValue`];
//! nested messages become [`CodecValue::Struct`].

use std::collections::HashMap;

/// Type alias for decoded message as field name -> value mapping.
pub type DecodedMessage = HashMap<String, CodecValue>;

/// Nanoseconds per second for time/duration conversion.
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Unified value type for decoded ROS1 data.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecValue {
    // Boolean
    Bool(bool),

    // Signed integers
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),

    // Unsigned integers
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),

    // Floating point
    Float32(f32),
    Float64(f64),

    // String (UTF-8)
    String(String),

    // Binary data (uint8[] / byte[] / char[] payloads)
    Bytes(Vec<u8>),

    /// Timestamp as nanoseconds since Unix epoch
    Timestamp(i64),

    /// Duration as nanoseconds (can be negative)
    Duration(i64),

    // Array of values
    Array(Vec<CodecValue>),

    // Nested message
    Struct(DecodedMessage),
}

impl CodecValue {
    /// Try to convert this value to f64 (for numeric values only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CodecValue::Int8(v) => Some(*v as f64),
            CodecValue::Int16(v) => Some(*v as f64),
            CodecValue::Int32(v) => Some(*v as f64),
            CodecValue::Int64(v) => Some(*v as f64),
            CodecValue::UInt8(v) => Some(*v as f64),
            CodecValue::UInt16(v) => Some(*v as f64),
            CodecValue::UInt32(v) => Some(*v as f64),
            CodecValue::UInt64(v) => Some(*v as f64),
            CodecValue::Float32(v) => Some(*v as f64),
            CodecValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to convert this value to i64 (for integer types only).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CodecValue::Int8(v) => Some(*v as i64),
            CodecValue::Int16(v) => Some(*v as i64),
            CodecValue::Int32(v) => Some(*v as i64),
            CodecValue::Int64(v) => Some(*v),
            CodecValue::UInt8(v) => Some(*v as i64),
            CodecValue::UInt16(v) => Some(*v as i64),
            CodecValue::UInt32(v) => Some(*v as i64),
            CodecValue::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CodecValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            CodecValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get the inner struct.
    pub fn as_struct(&self) -> Option<&DecodedMessage> {
        match self {
            CodecValue::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner array.
    pub fn as_array(&self) -> Option<&[CodecValue]> {
        match self {
            CodecValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get the timestamp value as nanoseconds.
    pub fn as_timestamp_nanos(&self) -> Option<i64> {
        match self {
            CodecValue::Timestamp(nanos) => Some(*nanos),
            _ => None,
        }
    }

    /// Get the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            CodecValue::Bool(_) => "bool",
            CodecValue::Int8(_) => "int8",
            CodecValue::Int16(_) => "int16",
            CodecValue::Int32(_) => "int32",
            CodecValue::Int64(_) => "int64",
            CodecValue::UInt8(_) => "uint8",
            CodecValue::UInt16(_) => "uint16",
            CodecValue::UInt32(_) => "uint32",
            CodecValue::UInt64(_) => "uint64",
            CodecValue::Float32(_) => "float32",
            CodecValue::Float64(_) => "float64",
            CodecValue::String(_) => "string",
            CodecValue::Bytes(_) => "bytes",
            CodecValue::Timestamp(_) => "timestamp",
            CodecValue::Duration(_) => "duration",
            CodecValue::Array(_) => "array",
            CodecValue::Struct(_) => "struct",
        }
    }

    /// Create a Timestamp from ROS1 time (secs: u32, nsecs: u32).
    pub fn from_ros1_time(secs: u32, nsecs: u32) -> Self {
        CodecValue::Timestamp(secs as i64 * NANOS_PER_SEC + nsecs as i64)
    }

    /// Create a Duration from ROS1 duration (secs: i32, nsecs: i32).
    pub fn from_ros1_duration(secs: i32, nsecs: i32) -> Self {
        CodecValue::Duration(secs as i64 * NANOS_PER_SEC + nsecs as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_f64() {
        assert_eq!(CodecValue::Int32(-4).as_f64(), Some(-4.0));
        assert_eq!(CodecValue::UInt8(7).as_f64(), Some(7.0));
        assert_eq!(CodecValue::Float32(1.5).as_f64(), Some(1.5));
        assert_eq!(CodecValue::String("x".into()).as_f64(), None);
        assert_eq!(CodecValue::Timestamp(1).as_f64(), None);
    }

    #[test]
    fn test_as_i64_overflow() {
        assert_eq!(CodecValue::UInt64(u64::MAX).as_i64(), None);
        assert_eq!(CodecValue::UInt64(42).as_i64(), Some(42));
    }

    #[test]
    fn test_from_ros1_time() {
        let v = CodecValue::from_ros1_time(1, 500_000_000);
        assert_eq!(v.as_timestamp_nanos(), Some(1_500_000_000));
    }

    #[test]
    fn test_from_ros1_duration_negative() {
        assert_eq!(
            CodecValue::from_ros1_duration(-1, -500),
            CodecValue::Duration(-1_000_000_500)
        );
    }

    #[test]
    fn test_type_name() {
        assert_eq!(CodecValue::Bytes(vec![]).type_name(), "bytes");
        assert_eq!(CodecValue::Struct(DecodedMessage::new()).type_name(), "struct");
    }
}
