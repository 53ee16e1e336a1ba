// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! LCM decoder.
//!
//! The leading fingerprint is validated against the target descriptor
//! before any field is read; a mismatch aborts the decode. Fields then
//! arrive in declaration order with no keys and no skip capability, so
//! every declared field is read and becomes present on the message.

use byteorder::{BigEndian, ByteOrder};
use std::sync::Arc;

use crate::core::error::{FormatError, FormatResult};
use crate::core::message::GenericMessage;
use crate::core::value::Value;
use crate::schema::descriptor::{FieldType, MessageDescriptor, SchemaSet};

use super::fingerprint::fingerprint;

/// Big-endian cursor over an LCM payload.
struct LcmReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> LcmReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        LcmReader { data, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_exact(&mut self, len: usize) -> FormatResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(FormatError::malformed(
                "lcm",
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

    fn read_u8(&mut self) -> FormatResult<u8> {
        Ok(self.read_exact(1)?[0])
    }

    fn read_i64(&mut self) -> FormatResult<i64> {
        Ok(BigEndian::read_i64(self.read_exact(8)?))
    }

    /// Read an `i32` length or count, rejecting negatives.
    fn read_len(&mut self) -> FormatResult<usize> {
        let len = BigEndian::read_i32(self.read_exact(4)?);
        usize::try_from(len)
            .map_err(|_| FormatError::malformed("lcm", format!("negative length {len}")))
    }
}

/// Decoder for LCM wire bytes.
pub struct LcmDecoder {
    _private: (),
}

impl LcmDecoder {
    /// Create a new LCM decoder.
    pub fn new() -> Self {
        LcmDecoder { _private: () }
    }

    /// Decode a payload into a message bound to `descriptor`.
    pub fn decode(
        &self,
        data: &[u8],
        descriptor: &Arc<MessageDescriptor>,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<GenericMessage> {
        let mut reader = LcmReader::new(data);
        self.decode_frame(&mut reader, descriptor, scope)
    }

    /// Decode one fingerprint-prefixed frame, consuming the reader fully.
    fn decode_frame(
        &self,
        reader: &mut LcmReader<'_>,
        descriptor: &Arc<MessageDescriptor>,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<GenericMessage> {
        let expected = fingerprint(descriptor, scope)?;
        let found = reader.read_i64()?;
        if found != expected {
            return Err(FormatError::schema_mismatch(
                "lcm",
                hex::encode(expected.to_be_bytes()),
                hex::encode(found.to_be_bytes()),
            ));
        }

        let mut message = GenericMessage::bind(descriptor.clone(), scope.clone());
        for field in descriptor.fields() {
            let value = match field.field_type() {
                FieldType::Sequence(element) => {
                    let count = reader.read_len()?;
                    let mut elems = Vec::new();
                    for _ in 0..count {
                        elems.push(self.read_element(reader, element, scope)?);
                    }
                    Value::Sequence(elems)
                }
                element => self.read_element(reader, element, scope)?,
            };
            message.set(field.id(), value)?;
        }

        if !reader.is_empty() {
            return Err(FormatError::malformed(
                "lcm",
                format!("{} trailing bytes after last field", reader.remaining()),
            ));
        }
        Ok(message)
    }

    fn read_element(
        &self,
        reader: &mut LcmReader<'_>,
        field_type: &FieldType,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<Value> {
        let value = match field_type {
            FieldType::Bool => Value::Bool(reader.read_u8()? != 0),
            FieldType::Char => Value::Char(reader.read_u8()? as char),
            FieldType::Int8 => Value::Int8(reader.read_u8()? as i8),
            FieldType::UInt8 => Value::UInt8(reader.read_u8()?),
            FieldType::Int16 => Value::Int16(BigEndian::read_i16(reader.read_exact(2)?)),
            FieldType::UInt16 => Value::UInt16(BigEndian::read_u16(reader.read_exact(2)?)),
            FieldType::Int32 => Value::Int32(BigEndian::read_i32(reader.read_exact(4)?)),
            FieldType::UInt32 => Value::UInt32(BigEndian::read_u32(reader.read_exact(4)?)),
            FieldType::Int64 => Value::Int64(BigEndian::read_i64(reader.read_exact(8)?)),
            FieldType::UInt64 => Value::UInt64(BigEndian::read_u64(reader.read_exact(8)?)),
            FieldType::Float32 => Value::Float32(BigEndian::read_f32(reader.read_exact(4)?)),
            FieldType::Float64 => Value::Float64(BigEndian::read_f64(reader.read_exact(8)?)),
            FieldType::String => {
                // Declared length covers the trailing NUL.
                let len = reader.read_len()?;
                let bytes = reader.read_exact(len)?;
                let content = match bytes.split_last() {
                    Some((&0, content)) => content,
                    Some(_) => {
                        return Err(FormatError::malformed(
                            "lcm",
                            "string payload not NUL-terminated",
                        ))
                    }
                    None => &[][..],
                };
                let text = std::str::from_utf8(content).map_err(|_| {
                    FormatError::malformed("lcm", "invalid utf-8 in string payload")
                })?;
                Value::String(text.to_string())
            }
            FieldType::Bytes => {
                let len = reader.read_len()?;
                Value::Bytes(reader.read_exact(len)?.to_vec())
            }
            FieldType::Message(reference) => {
                let len = reader.read_len()?;
                let payload = reader.read_exact(len)?;
                let child_descriptor = scope.resolve(reference).ok_or_else(|| {
                    FormatError::unsupported_type("lcm", reference.qualified_name())
                })?;
                let mut sub = LcmReader::new(payload);
                Value::Message(self.decode_frame(&mut sub, child_descriptor, scope)?)
            }
            FieldType::Sequence(_) => {
                return Err(FormatError::unsupported_type(
                    "lcm",
                    field_type.schema_name(),
                ))
            }
        };
        Ok(value)
    }
}

impl Default for LcmDecoder {
    fn default() -> Self {
        Self::new()
    }
}
