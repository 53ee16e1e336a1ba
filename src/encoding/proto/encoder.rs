// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Proto encoder driven by message traversal.
//!
//! The encoder is a [`MessageVisitor`]: nested messages open a fresh
//! buffer frame that is wrapped as a length-delimited record when the
//! matching `EndNested` arrives. Every present field is emitted, including
//! fields equal to their declared default; absent fields produce nothing.

use byteorder::{ByteOrder, LittleEndian};

use crate::core::error::{FormatError, FormatResult};
use crate::core::message::{GenericMessage, MessageVisitor, TraversalEvent, UnknownField};
use crate::core::value::Value;
use crate::schema::descriptor::{FieldDescriptor, FieldType};

use super::wire::{
    write_tag, write_varint, zigzag, WIRE_FIXED32, WIRE_FIXED64, WIRE_LEN_DELIMITED, WIRE_VARINT,
};

/// One open message context: the bytes written so far and the unknown
/// fields to replay when the context closes.
struct Frame {
    field_id: u32,
    buffer: Vec<u8>,
    unknowns: Vec<UnknownField>,
}

/// Visitor that renders a message as proto wire bytes.
pub struct ProtoEncoder {
    stack: Vec<Frame>,
    output: Vec<u8>,
}

impl ProtoEncoder {
    /// Encode a message, unknown fields replayed after declared ones.
    pub fn encode(message: &GenericMessage) -> FormatResult<Vec<u8>> {
        let mut encoder = ProtoEncoder {
            stack: vec![Frame {
                field_id: 0,
                buffer: Vec::new(),
                unknowns: message.unknown_fields().to_vec(),
            }],
            output: Vec::new(),
        };
        message.accept(&mut encoder)?;
        Ok(encoder.output)
    }

    fn top(&mut self) -> FormatResult<&mut Frame> {
        self.stack
            .last_mut()
            .ok_or_else(|| FormatError::malformed("proto", "unbalanced traversal"))
    }

    /// Pop the current frame, replaying its unknown fields first.
    fn pop(&mut self) -> FormatResult<Frame> {
        let mut frame = self
            .stack
            .pop()
            .ok_or_else(|| FormatError::malformed("proto", "unbalanced traversal"))?;
        for unknown in &frame.unknowns {
            write_tag(&mut frame.buffer, unknown.id, unknown.wire_type);
            frame.buffer.extend_from_slice(&unknown.raw);
        }
        Ok(frame)
    }

    fn encode_field(&mut self, field: &FieldDescriptor, value: &Value) -> FormatResult<()> {
        if let Value::Sequence(elements) = value {
            return self.encode_sequence(field, elements);
        }
        let wire_type = wire_type_of(field, value)?;
        let frame = self.top()?;
        write_tag(&mut frame.buffer, field.id(), wire_type);
        write_scalar_payload(&mut frame.buffer, field, value)
    }

    /// Numeric, bool, and char elements pack into one length-delimited
    /// record; string and bytes elements each get their own record. An
    /// empty sequence emits nothing and decodes as absent.
    fn encode_sequence(&mut self, field: &FieldDescriptor, elements: &[Value]) -> FormatResult<()> {
        if elements.is_empty() {
            return Ok(());
        }
        let element_type = field.field_type().element().ok_or_else(|| {
            FormatError::type_mismatch(
                "proto",
                field.name(),
                field.field_type().schema_name(),
                "sequence",
            )
        })?;

        match element_type {
            FieldType::String | FieldType::Bytes => {
                for element in elements {
                    let frame = self.top()?;
                    write_tag(&mut frame.buffer, field.id(), WIRE_LEN_DELIMITED);
                    write_scalar_payload(&mut frame.buffer, field, element)?;
                }
                Ok(())
            }
            FieldType::Message(_) | FieldType::Sequence(_) => Err(FormatError::type_mismatch(
                "proto",
                field.name(),
                field.field_type().schema_name(),
                "unpackable sequence element",
            )),
            _ => {
                let mut packed = Vec::new();
                for element in elements {
                    write_scalar_payload(&mut packed, field, element)?;
                }
                let frame = self.top()?;
                write_tag(&mut frame.buffer, field.id(), WIRE_LEN_DELIMITED);
                write_varint(&mut frame.buffer, packed.len() as u64);
                frame.buffer.extend_from_slice(&packed);
                Ok(())
            }
        }
    }
}

impl MessageVisitor for ProtoEncoder {
    fn visit(&mut self, event: TraversalEvent<'_>) -> FormatResult<()> {
        match event {
            TraversalEvent::BeginMessage { .. } => Ok(()),
            TraversalEvent::Field { field, value } => self.encode_field(field, value),
            TraversalEvent::BeginNested { field, message, .. } => {
                self.stack.push(Frame {
                    field_id: field.id(),
                    buffer: Vec::new(),
                    unknowns: message.unknown_fields().to_vec(),
                });
                Ok(())
            }
            TraversalEvent::EndNested => {
                let frame = self.pop()?;
                let parent = self.top()?;
                write_tag(&mut parent.buffer, frame.field_id, WIRE_LEN_DELIMITED);
                write_varint(&mut parent.buffer, frame.buffer.len() as u64);
                parent.buffer.extend_from_slice(&frame.buffer);
                Ok(())
            }
            TraversalEvent::EndMessage => {
                let frame = self.pop()?;
                self.output = frame.buffer;
                Ok(())
            }
        }
    }
}

fn wire_type_of(field: &FieldDescriptor, value: &Value) -> FormatResult<u8> {
    match value {
        Value::Bool(_)
        | Value::Char(_)
        | Value::Int8(_)
        | Value::Int16(_)
        | Value::Int32(_)
        | Value::Int64(_)
        | Value::UInt8(_)
        | Value::UInt16(_)
        | Value::UInt32(_)
        | Value::UInt64(_) => Ok(WIRE_VARINT),
        Value::Float32(_) => Ok(WIRE_FIXED32),
        Value::Float64(_) => Ok(WIRE_FIXED64),
        Value::String(_) | Value::Bytes(_) => Ok(WIRE_LEN_DELIMITED),
        Value::Message(_) | Value::Sequence(_) => Err(FormatError::type_mismatch(
            "proto",
            field.name(),
            field.field_type().schema_name(),
            value.kind().as_str(),
        )),
    }
}

/// Write one value's payload without a tag. Signed integers zigzag-map
/// before the varint; length-delimited payloads include their length
/// prefix.
fn write_scalar_payload(
    buffer: &mut Vec<u8>,
    field: &FieldDescriptor,
    value: &Value,
) -> FormatResult<()> {
    match value {
        Value::Bool(v) => write_varint(buffer, u64::from(*v)),
        Value::Char(v) => write_varint(buffer, *v as u64),
        Value::Int8(v) => write_varint(buffer, zigzag(i64::from(*v))),
        Value::Int16(v) => write_varint(buffer, zigzag(i64::from(*v))),
        Value::Int32(v) => write_varint(buffer, zigzag(i64::from(*v))),
        Value::Int64(v) => write_varint(buffer, zigzag(*v)),
        Value::UInt8(v) => write_varint(buffer, u64::from(*v)),
        Value::UInt16(v) => write_varint(buffer, u64::from(*v)),
        Value::UInt32(v) => write_varint(buffer, u64::from(*v)),
        Value::UInt64(v) => write_varint(buffer, *v),
        Value::Float32(v) => {
            let mut bytes = [0u8; 4];
            LittleEndian::write_f32(&mut bytes, *v);
            buffer.extend_from_slice(&bytes);
        }
        Value::Float64(v) => {
            let mut bytes = [0u8; 8];
            LittleEndian::write_f64(&mut bytes, *v);
            buffer.extend_from_slice(&bytes);
        }
        Value::String(v) => {
            write_varint(buffer, v.len() as u64);
            buffer.extend_from_slice(v.as_bytes());
        }
        Value::Bytes(v) => {
            write_varint(buffer, v.len() as u64);
            buffer.extend_from_slice(v);
        }
        Value::Message(_) | Value::Sequence(_) => {
            return Err(FormatError::type_mismatch(
                "proto",
                field.name(),
                field.field_type().schema_name(),
                value.kind().as_str(),
            ))
        }
    }
    Ok(())
}
