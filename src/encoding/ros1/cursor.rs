// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Cursor over ROS1 serialized message bytes.
//!
//! ROS1 serialization is little-endian with no alignment padding.
//! Strings and dynamic arrays carry a `uint32` length prefix.

use byteorder::{ByteOrder, LittleEndian};

use crate::core::{Error, Result};

/// Read cursor for one ROS1 message payload.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use bagzarr::encoding::ros1::Ros1Cursor;
///
/// let data = [0x2A, 0x00, 0x00, 0x00];
/// let mut cursor = Ros1Cursor::new(&data);
/// assert_eq!(cursor.read_u32()?, 42);
/// assert!(cursor.is_at_end());
/// # Ok(())
/// # }
/// ```
pub struct Ros1Cursor<'a> {
    /// The message payload
    data: &'a [u8],
    /// Current read position
    offset: usize,
}

impl<'a> Ros1Cursor<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Get the current position.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Get the remaining bytes available to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Check if at end of buffer.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Read a byte slice.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::buffer_too_short(
                count,
                self.remaining(),
                self.offset as u64,
            ));
        }
        let start = self.offset;
        self.offset += count;
        Ok(&self.data[start..self.offset])
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read a u16 value.
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.read_bytes(2)?))
    }

    /// Read an i16 value.
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.read_bytes(2)?))
    }

    /// Read a u32 value.
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    /// Read an i32 value.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.read_bytes(4)?))
    }

    /// Read a u64 value.
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.read_bytes(8)?))
    }

    /// Read an i64 value.
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(LittleEndian::read_i64(self.read_bytes(8)?))
    }

    /// Read an f32 value.
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.read_bytes(4)?))
    }

    /// Read an f64 value.
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(LittleEndian::read_f64(self.read_bytes(8)?))
    }

    /// Read a `uint32` length prefix and check it against the remaining
    /// bytes, given the minimum wire size of one element.
    pub fn read_length(&mut self, element_size: usize) -> Result<usize> {
        let position = self.offset;
        let length = self.read_u32()? as usize;
        let needed = length.saturating_mul(element_size.max(1));
        if needed > self.remaining() {
            return Err(Error::length_exceeded(length, position, self.data.len()));
        }
        Ok(length)
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_length(1)?;
        let position = self.offset;
        let bytes = self.read_bytes(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            Error::parse(
                format!("ROS1 string at position {position}"),
                e.to_string(),
            )
        })
    }
}
