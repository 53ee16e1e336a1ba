// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! LCM encoder.
//!
//! LCM has no field keys: every declared field occupies a fixed slot in
//! declaration order, so the visitor interleaves fill values for absent
//! fields between the present ones it receives from the traversal.
//! Scalars are big-endian fixed width. Strings carry a trailing NUL
//! inside their length prefix. Nested messages are length-prefixed and
//! start with their own fingerprint.

use std::sync::Arc;

use crate::core::error::{FormatError, FormatResult};
use crate::core::message::{GenericMessage, MessageVisitor, TraversalEvent};
use crate::core::value::Value;
use crate::schema::descriptor::{FieldDescriptor, FieldType, MessageDescriptor, SchemaSet};

use super::fingerprint::fingerprint;

/// One open message context: the bytes written so far and the
/// declaration-order cursor for default catch-up.
struct Frame {
    descriptor: Arc<MessageDescriptor>,
    buffer: Vec<u8>,
    next_field: usize,
}

impl Frame {
    fn open(descriptor: Arc<MessageDescriptor>, fingerprint: i64) -> Self {
        Frame {
            descriptor,
            buffer: fingerprint.to_be_bytes().to_vec(),
            next_field: 0,
        }
    }
}

/// Traversal-driven LCM encoder.
pub struct LcmEncoder {
    stack: Vec<Frame>,
    scope: Arc<SchemaSet>,
    output: Vec<u8>,
}

impl LcmEncoder {
    /// Encode a message into LCM bytes, fingerprint prefix included.
    pub fn encode(message: &GenericMessage) -> FormatResult<Vec<u8>> {
        let scope = message.scope().clone();
        let prefix = fingerprint(message.descriptor(), &scope)?;
        let mut encoder = LcmEncoder {
            stack: vec![Frame::open(message.descriptor().clone(), prefix)],
            scope,
            output: Vec::new(),
        };
        message.accept(&mut encoder)?;
        Ok(encoder.output)
    }

    fn top(&mut self) -> FormatResult<&mut Frame> {
        self.stack
            .last_mut()
            .ok_or_else(|| FormatError::malformed("lcm", "unbalanced traversal"))
    }

    fn pop(&mut self) -> FormatResult<Frame> {
        self.stack
            .pop()
            .ok_or_else(|| FormatError::malformed("lcm", "unbalanced traversal"))
    }
}

impl MessageVisitor for LcmEncoder {
    fn visit(&mut self, event: TraversalEvent<'_>) -> FormatResult<()> {
        match event {
            // The root frame is opened by encode() before traversal starts.
            TraversalEvent::BeginMessage { .. } => Ok(()),
            TraversalEvent::Field { field, value } => {
                let scope = Arc::clone(&self.scope);
                let frame = self.top()?;
                catch_up(frame, field.id(), &scope)?;
                write_value(&mut frame.buffer, value)
            }
            TraversalEvent::BeginNested {
                field,
                message,
                slot,
            } => {
                let scope = Arc::clone(&self.scope);
                {
                    let frame = self.top()?;
                    match slot {
                        None => catch_up(frame, field.id(), &scope)?,
                        Some(slot) if slot.index == 0 => {
                            catch_up(frame, field.id(), &scope)?;
                            put_len(&mut frame.buffer, slot.len)?;
                        }
                        // Later elements of the same sequence: the count
                        // and catch-up already happened at index 0.
                        Some(_) => {}
                    }
                }
                let prefix = fingerprint(message.descriptor(), &scope)?;
                self.stack
                    .push(Frame::open(message.descriptor().clone(), prefix));
                Ok(())
            }
            TraversalEvent::EndNested => {
                let scope = Arc::clone(&self.scope);
                let mut child = self.pop()?;
                fill_remaining(&mut child, &scope)?;
                let parent = self.top()?;
                put_len(&mut parent.buffer, child.buffer.len())?;
                parent.buffer.extend_from_slice(&child.buffer);
                Ok(())
            }
            TraversalEvent::EndMessage => {
                let scope = Arc::clone(&self.scope);
                let mut frame = self.pop()?;
                fill_remaining(&mut frame, &scope)?;
                self.output = frame.buffer;
                Ok(())
            }
        }
    }
}

// =========================================================================
// Declaration-order catch-up
// =========================================================================

/// Fill every declared field before `field_id`, then mark it consumed.
/// A target already behind the cursor is a continuing sequence element.
fn catch_up(frame: &mut Frame, field_id: u32, scope: &SchemaSet) -> FormatResult<()> {
    let descriptor = Arc::clone(&frame.descriptor);
    let target = descriptor
        .fields()
        .iter()
        .position(|f| f.id() == field_id)
        .ok_or_else(|| FormatError::malformed("lcm", "field not declared by open message"))?;
    if target < frame.next_field {
        return Ok(());
    }
    fill_range(frame, target, scope)?;
    frame.next_field = target + 1;
    Ok(())
}

fn fill_remaining(frame: &mut Frame, scope: &SchemaSet) -> FormatResult<()> {
    let len = frame.descriptor.fields().len();
    fill_range(frame, len, scope)
}

fn fill_range(frame: &mut Frame, upto: usize, scope: &SchemaSet) -> FormatResult<()> {
    let descriptor = Arc::clone(&frame.descriptor);
    let fields = descriptor.fields();
    while frame.next_field < upto {
        let field = &fields[frame.next_field];
        let mut chain = vec![descriptor.qualified_name().to_string()];
        write_fill(&mut frame.buffer, field, scope, &mut chain)?;
        frame.next_field += 1;
    }
    Ok(())
}

/// Write the slot of an absent field: its declared default when present,
/// the type's zero value otherwise.
fn write_fill(
    out: &mut Vec<u8>,
    field: &FieldDescriptor,
    scope: &SchemaSet,
    chain: &mut Vec<String>,
) -> FormatResult<()> {
    if let Some(default) = field.default() {
        return write_value(out, default);
    }
    match field.field_type() {
        FieldType::Bool | FieldType::Char | FieldType::Int8 | FieldType::UInt8 => out.push(0),
        FieldType::Int16 | FieldType::UInt16 => out.extend_from_slice(&[0; 2]),
        FieldType::Int32 | FieldType::UInt32 | FieldType::Float32 => {
            out.extend_from_slice(&[0; 4])
        }
        FieldType::Int64 | FieldType::UInt64 | FieldType::Float64 => {
            out.extend_from_slice(&[0; 8])
        }
        FieldType::String => {
            // Empty string: length 1 covering only the NUL.
            put_len(out, 1)?;
            out.push(0);
        }
        FieldType::Bytes | FieldType::Sequence(_) => put_len(out, 0)?,
        FieldType::Message(reference) => {
            let child = scope.resolve(reference).ok_or_else(|| {
                FormatError::unsupported_type("lcm", reference.qualified_name())
            })?;
            if chain.iter().any(|name| name == child.qualified_name()) {
                return Err(FormatError::malformed(
                    "lcm",
                    format!("cannot fill recursive type '{}'", child.qualified_name()),
                ));
            }
            chain.push(child.qualified_name().to_string());
            let mut nested = fingerprint(child, scope)?.to_be_bytes().to_vec();
            for child_field in child.fields() {
                write_fill(&mut nested, child_field, scope, chain)?;
            }
            chain.pop();
            put_len(out, nested.len())?;
            out.extend_from_slice(&nested);
        }
    }
    Ok(())
}

// =========================================================================
// Value writing
// =========================================================================

fn write_value(out: &mut Vec<u8>, value: &Value) -> FormatResult<()> {
    match value {
        Value::Bool(v) => out.push(u8::from(*v)),
        Value::Char(v) => out.push(*v as u8),
        Value::Int8(v) => out.push(*v as u8),
        Value::UInt8(v) => out.push(*v),
        Value::Int16(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::UInt16(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Int32(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::UInt32(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Int64(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::UInt64(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Float32(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Float64(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::String(v) => {
            put_len(out, v.len() + 1)?;
            out.extend_from_slice(v.as_bytes());
            out.push(0);
        }
        Value::Bytes(v) => {
            put_len(out, v.len())?;
            out.extend_from_slice(v);
        }
        Value::Sequence(elems) => {
            put_len(out, elems.len())?;
            for elem in elems {
                write_value(out, elem)?;
            }
        }
        Value::Message(_) => {
            return Err(FormatError::malformed(
                "lcm",
                "message value outside nested traversal",
            ))
        }
    }
    Ok(())
}

fn put_len(out: &mut Vec<u8>, len: usize) -> FormatResult<()> {
    let len = i32::try_from(len)
        .map_err(|_| FormatError::malformed("lcm", "length exceeds i32 range"))?;
    out.extend_from_slice(&len.to_be_bytes());
    Ok(())
}
