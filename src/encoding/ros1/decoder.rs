// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-driven ROS1 message decoder.
//!
//! Walks the registered [`MessageType`] for a connection and reads each
//! field from a [`Ros1Cursor`] in declaration order.

use std::collections::HashMap;

use crate::core::{CodecValue, DecodedMessage, Error, Result};
use crate::schema::{FieldType, MessageType, PrimitiveType, SchemaRegistry};

use super::cursor::Ros1Cursor;

/// Maximum allowed array length to prevent OOM attacks.
const MAX_ARRAY_LENGTH: usize = 10_000_000;

/// Maximum nesting depth of message types.
const MAX_NESTING_DEPTH: usize = 64;

/// ROS1 decoder.
///
/// Stateless apart from its limits; the registry supplies every type.
#[derive(Debug, Clone)]
pub struct Ros1Decoder {
    max_array_length: usize,
}

impl Ros1Decoder {
    /// Create a decoder with the default array length limit.
    pub fn new() -> Self {
        Self {
            max_array_length: MAX_ARRAY_LENGTH,
        }
    }

    /// Override the array length limit.
    pub fn with_max_array_length(mut self, max_array_length: usize) -> Self {
        self.max_array_length = max_array_length;
        self
    }

    /// Decode one serialized message of `type_name`.
    ///
    /// Trailing bytes after the last field are ignored.
    pub fn decode(
        &self,
        registry: &SchemaRegistry,
        type_name: &str,
        data: &[u8],
    ) -> Result<DecodedMessage> {
        let msg_type = registry
            .resolve(type_name)?
            .ok_or_else(|| Error::type_not_found(type_name))?;
        let mut cursor = Ros1Cursor::new(data);
        self.decode_message(registry, &msg_type, &mut cursor, 0)
    }

    fn decode_message(
        &self,
        registry: &SchemaRegistry,
        msg_type: &MessageType,
        cursor: &mut Ros1Cursor<'_>,
        depth: usize,
    ) -> Result<DecodedMessage> {
        if depth > MAX_NESTING_DEPTH {
            return Err(Error::invalid_schema(
                &msg_type.name,
                format!("nesting deeper than {MAX_NESTING_DEPTH} levels"),
            ));
        }

        let mut message = HashMap::with_capacity(msg_type.fields.len());
        for field in &msg_type.fields {
            let value = self.decode_field(registry, &field.type_name, cursor, depth)?;
            message.insert(field.name.clone(), value);
        }
        Ok(message)
    }

    fn decode_field(
        &self,
        registry: &SchemaRegistry,
        field_type: &FieldType,
        cursor: &mut Ros1Cursor<'_>,
        depth: usize,
    ) -> Result<CodecValue> {
        match field_type {
            FieldType::Primitive(prim) => decode_primitive(*prim, cursor),
            FieldType::Nested(name) => {
                let nested = registry
                    .resolve(name)?
                    .ok_or_else(|| Error::type_not_found(name))?;
                Ok(CodecValue::Struct(self.decode_message(
                    registry,
                    &nested,
                    cursor,
                    depth + 1,
                )?))
            }
            FieldType::Array { base_type, size } => {
                let element_size = element_wire_size(base_type);
                let position = cursor.position();
                let count = match size {
                    Some(n) => *n,
                    None => cursor.read_length(element_size)?,
                };
                if count > self.max_array_length {
                    return Err(Error::length_exceeded(count, position, cursor.remaining()));
                }

                if let FieldType::Primitive(prim) = base_type.as_ref() {
                    if prim.is_byte_like() {
                        return Ok(CodecValue::Bytes(cursor.read_bytes(count)?.to_vec()));
                    }
                }

                let mut elements = Vec::with_capacity(count.min(cursor.remaining()));
                for _ in 0..count {
                    elements.push(self.decode_field(registry, base_type, cursor, depth)?);
                }
                Ok(CodecValue::Array(elements))
            }
        }
    }
}

impl Default for Ros1Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimum wire size of one array element, used to sanity-check counts.
fn element_wire_size(field_type: &FieldType) -> usize {
    match field_type {
        FieldType::Primitive(PrimitiveType::String) => 4,
        FieldType::Primitive(prim) => prim.size().unwrap_or(1),
        _ => 0,
    }
}

fn decode_primitive(prim: PrimitiveType, cursor: &mut Ros1Cursor<'_>) -> Result<CodecValue> {
    Ok(match prim {
        PrimitiveType::Bool => CodecValue::Bool(cursor.read_u8()? != 0),
        PrimitiveType::Int8 | PrimitiveType::Byte => CodecValue::Int8(cursor.read_i8()?),
        PrimitiveType::UInt8 | PrimitiveType::Char => CodecValue::UInt8(cursor.read_u8()?),
        PrimitiveType::Int16 => CodecValue::Int16(cursor.read_i16()?),
        PrimitiveType::UInt16 => CodecValue::UInt16(cursor.read_u16()?),
        PrimitiveType::Int32 => CodecValue::Int32(cursor.read_i32()?),
        PrimitiveType::UInt32 => CodecValue::UInt32(cursor.read_u32()?),
        PrimitiveType::Int64 => CodecValue::Int64(cursor.read_i64()?),
        PrimitiveType::UInt64 => CodecValue::UInt64(cursor.read_u64()?),
        PrimitiveType::Float32 => CodecValue::Float32(cursor.read_f32()?),
        PrimitiveType::Float64 => CodecValue::Float64(cursor.read_f64()?),
        PrimitiveType::String => CodecValue::String(cursor.read_string()?),
        PrimitiveType::Time => {
            let secs = cursor.read_u32()?;
            let nsecs = cursor.read_u32()?;
            CodecValue::from_ros1_time(secs, nsecs)
        }
        PrimitiveType::Duration => {
            let secs = cursor.read_i32()?;
            let nsecs = cursor.read_i32()?;
            CodecValue::from_ros1_duration(secs, nsecs)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const A2D2_DEFINITION: &str = "\
Header header
ds_core_msgs/DsHeader ds_header
int16[4] raw
float32[4] proc
===
MSG: std_msgs/Header
uint32 seq
time stamp
string frame_id
===
MSG: ds_core_msgs/DsHeader
time io_time
time orig_stamp
";

    fn push_time(buf: &mut Vec<u8>, secs: u32, nsecs: u32) {
        buf.extend_from_slice(&secs.to_le_bytes());
        buf.extend_from_slice(&nsecs.to_le_bytes());
    }

    fn push_string(buf: &mut Vec<u8>, s: &str) {
        buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
        buf.extend_from_slice(s.as_bytes());
    }

    #[test]
    fn test_decode_a2d2() {
        let registry = SchemaRegistry::new();
        registry
            .register_definition("ds_hotel_msgs/A2D2", A2D2_DEFINITION)
            .unwrap();

        let mut data = Vec::new();
        data.extend_from_slice(&9u32.to_le_bytes());
        push_time(&mut data, 100, 500_000_000);
        push_string(&mut data, "hotel");
        push_time(&mut data, 101, 0);
        push_time(&mut data, 99, 250_000_000);
        for raw in [1i16, -2, 3, -4] {
            data.extend_from_slice(&raw.to_le_bytes());
        }
        for proc in [0.5f32, 1.5, 2.5, 3.5] {
            data.extend_from_slice(&proc.to_le_bytes());
        }

        let decoded = Ros1Decoder::new()
            .decode(&registry, "ds_hotel_msgs/A2D2", &data)
            .unwrap();

        let header = decoded["header"].as_struct().unwrap();
        assert_eq!(header["seq"], CodecValue::UInt32(9));
        assert_eq!(header["stamp"], CodecValue::Timestamp(100_500_000_000));
        assert_eq!(header["frame_id"].as_str(), Some("hotel"));

        let ds_header = decoded["ds_header"].as_struct().unwrap();
        assert_eq!(ds_header["orig_stamp"].as_timestamp_nanos(), Some(99_250_000_000));

        let raw = decoded["raw"].as_array().unwrap();
        assert_eq!(raw.len(), 4);
        assert_eq!(raw[1], CodecValue::Int16(-2));
        let proc = decoded["proc"].as_array().unwrap();
        assert_eq!(proc[3], CodecValue::Float32(3.5));
    }

    #[test]
    fn test_decode_byte_arrays_and_dynamic_arrays() {
        let registry = SchemaRegistry::empty();
        registry
            .register_definition("test/Blob", "uint8[] data\nfloat64[] values\nduration dt\n")
            .unwrap();

        let mut data = Vec::new();
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&[7, 8, 9]);
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&1.0f64.to_le_bytes());
        data.extend_from_slice(&2.0f64.to_le_bytes());
        data.extend_from_slice(&(-1i32).to_le_bytes());
        data.extend_from_slice(&0i32.to_le_bytes());

        let decoded = Ros1Decoder::new().decode(&registry, "test/Blob", &data).unwrap();
        assert_eq!(decoded["data"].as_bytes(), Some(&[7u8, 8, 9][..]));
        assert_eq!(decoded["values"].as_array().unwrap().len(), 2);
        assert_eq!(decoded["dt"], CodecValue::Duration(-1_000_000_000));
    }

    #[test]
    fn test_unknown_type() {
        let registry = SchemaRegistry::new();
        let result = Ros1Decoder::new().decode(&registry, "missing/Type", &[]);
        assert!(matches!(result, Err(Error::TypeNotFound { .. })));
    }

    #[test]
    fn test_unresolved_nested_type() {
        let registry = SchemaRegistry::empty();
        registry
            .register_definition("test/Outer", "test/Inner inner\n")
            .unwrap();
        let result = Ros1Decoder::new().decode(&registry, "test/Outer", &[0u8; 16]);
        assert!(matches!(result, Err(Error::TypeNotFound { .. })));
    }

    #[test]
    fn test_truncated_message() {
        let registry = SchemaRegistry::new();
        registry
            .register_definition("test/Depth", "Header header\nfloat64 depth\n")
            .unwrap();
        let result = Ros1Decoder::new().decode(&registry, "test/Depth", &[0u8; 6]);
        assert!(result.unwrap_err().is_decode_error());
    }

    #[test]
    fn test_array_limit() {
        let registry = SchemaRegistry::empty();
        registry
            .register_definition("test/Fixed", "uint8[16] data\n")
            .unwrap();
        let decoder = Ros1Decoder::new().with_max_array_length(8);
        let result = decoder.decode(&registry, "test/Fixed", &[0u8; 16]);
        assert!(matches!(result, Err(Error::LengthExceeded { length: 16, .. })));
    }
}
