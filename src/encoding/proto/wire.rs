// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Proto wire primitives: varints, zigzag mapping, tags, and a
//! bounds-checked reader over a byte slice.

use crate::core::error::{FormatError, FormatResult};

/// Wire type for varint-encoded scalars.
pub const WIRE_VARINT: u8 = 0;
/// Wire type for 8-byte little-endian values.
pub const WIRE_FIXED64: u8 = 1;
/// Wire type for length-delimited records.
pub const WIRE_LEN_DELIMITED: u8 = 2;
/// Wire type for 4-byte little-endian values.
pub const WIRE_FIXED32: u8 = 5;

/// A varint never spans more than 10 bytes of payload.
pub const MAX_VARINT_BYTES: usize = 10;

/// Append a base-128 varint, least significant group first.
pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Append a field tag: varint of `(field_id << 3) | wire_type`.
pub fn write_tag(out: &mut Vec<u8>, field_id: u32, wire_type: u8) {
    write_varint(out, (u64::from(field_id) << 3) | u64::from(wire_type));
}

/// Zigzag-map a signed value so small magnitudes stay small on the wire.
pub fn zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Invert [`zigzag`].
pub fn unzigzag(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Bounds-checked reader over proto wire bytes.
///
/// Every read fails with `FormatError::Malformed` instead of running past
/// the end of the slice.
pub struct ProtoReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ProtoReader<'a> {
    /// Wrap a byte slice for reading from the start.
    pub fn new(data: &'a [u8]) -> Self {
        ProtoReader { data, pos: 0 }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Check whether the reader is exhausted.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Current read position, for error text.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read one varint.
    pub fn read_varint(&mut self) -> FormatResult<u64> {
        let mut result: u64 = 0;
        let mut shift = 0u32;
        let mut consumed = 0usize;

        loop {
            if self.pos >= self.data.len() {
                return Err(FormatError::malformed(
                    "proto",
                    format!("truncated varint at byte {}", self.pos),
                ));
            }
            let byte = self.data[self.pos];
            self.pos += 1;
            consumed += 1;

            result |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }

            shift += 7;
            if consumed >= MAX_VARINT_BYTES {
                return Err(FormatError::malformed(
                    "proto",
                    format!("varint exceeds {MAX_VARINT_BYTES} bytes"),
                ));
            }
        }
    }

    /// Read exactly `len` bytes.
    pub fn read_exact(&mut self, len: usize) -> FormatResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(FormatError::malformed(
                "proto",
                format!(
                    "need {len} bytes at byte {}, {} available",
                    self.pos,
                    self.remaining()
                ),
            ));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Read a varint length prefix followed by that many bytes.
    pub fn read_len_delimited(&mut self) -> FormatResult<&'a [u8]> {
        let len = self.read_varint()? as usize;
        self.read_exact(len)
    }

    /// Bytes consumed since `start`, for capturing skipped payloads.
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.data[start..self.pos]
    }
}
