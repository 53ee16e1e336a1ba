// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MsgPack encoder.
//!
//! A message becomes a map keyed by field id, each key written in the
//! narrowest unsigned int form. Map and array headers carry their entry
//! count up front, so every open message buffers its entries in a frame
//! and the header is prepended when the frame closes. Absent fields
//! write nothing.

use crate::core::error::{FormatError, FormatResult};
use crate::core::message::{GenericMessage, MessageVisitor, TraversalEvent};
use crate::core::value::Value;

use super::marker::{
    ARRAY16, ARRAY32, BIN16, BIN32, BIN8, FALSE, FIXARRAY, FIXMAP, FIXSTR, FLOAT32, FLOAT64,
    INT16, INT32, INT64, INT8, MAP16, MAP32, POS_FIXINT_MAX, STR16, STR32, STR8, TRUE, UINT16,
    UINT32, UINT64, UINT8,
};

/// One open map: buffered entries and their count, header written on
/// close.
struct Frame {
    buffer: Vec<u8>,
    entries: usize,
}

impl Frame {
    fn new() -> Self {
        Frame {
            buffer: Vec::new(),
            entries: 0,
        }
    }
}

/// Traversal-driven MsgPack encoder.
pub struct MsgPackEncoder {
    stack: Vec<Frame>,
    output: Vec<u8>,
}

impl MsgPackEncoder {
    /// Encode a message into a MsgPack map.
    pub fn encode(message: &GenericMessage) -> FormatResult<Vec<u8>> {
        let mut encoder = MsgPackEncoder {
            stack: vec![Frame::new()],
            output: Vec::new(),
        };
        message.accept(&mut encoder)?;
        Ok(encoder.output)
    }

    fn top(&mut self) -> FormatResult<&mut Frame> {
        self.stack
            .last_mut()
            .ok_or_else(|| FormatError::malformed("msgpack", "unbalanced traversal"))
    }

    fn pop(&mut self) -> FormatResult<Frame> {
        self.stack
            .pop()
            .ok_or_else(|| FormatError::malformed("msgpack", "unbalanced traversal"))
    }
}

impl MessageVisitor for MsgPackEncoder {
    fn visit(&mut self, event: TraversalEvent<'_>) -> FormatResult<()> {
        match event {
            // The root frame is opened by encode() before traversal starts.
            TraversalEvent::BeginMessage { .. } => Ok(()),
            TraversalEvent::Field { field, value } => {
                let frame = self.top()?;
                write_uint(&mut frame.buffer, u64::from(field.id()));
                frame.entries += 1;
                write_value(&mut frame.buffer, value)
            }
            TraversalEvent::BeginNested { field, slot, .. } => {
                {
                    let frame = self.top()?;
                    match slot {
                        None => {
                            write_uint(&mut frame.buffer, u64::from(field.id()));
                            frame.entries += 1;
                        }
                        Some(slot) if slot.index == 0 => {
                            write_uint(&mut frame.buffer, u64::from(field.id()));
                            frame.entries += 1;
                            write_array_header(&mut frame.buffer, slot.len)?;
                        }
                        // Later elements share the key and array header
                        // written at index 0.
                        Some(_) => {}
                    }
                }
                self.stack.push(Frame::new());
                Ok(())
            }
            TraversalEvent::EndNested => {
                let child = self.pop()?;
                let parent = self.top()?;
                write_map_header(&mut parent.buffer, child.entries)?;
                parent.buffer.extend_from_slice(&child.buffer);
                Ok(())
            }
            TraversalEvent::EndMessage => {
                let frame = self.pop()?;
                write_map_header(&mut self.output, frame.entries)?;
                self.output.extend_from_slice(&frame.buffer);
                Ok(())
            }
        }
    }
}

// =========================================================================
// Value writing
// =========================================================================

fn write_value(out: &mut Vec<u8>, value: &Value) -> FormatResult<()> {
    match value {
        Value::Bool(v) => out.push(if *v { TRUE } else { FALSE }),
        Value::Char(v) => {
            let mut buf = [0u8; 4];
            write_str(out, v.encode_utf8(&mut buf))?;
        }
        Value::Int8(v) => write_int(out, i64::from(*v)),
        Value::Int16(v) => write_int(out, i64::from(*v)),
        Value::Int32(v) => write_int(out, i64::from(*v)),
        Value::Int64(v) => write_int(out, *v),
        Value::UInt8(v) => write_uint(out, u64::from(*v)),
        Value::UInt16(v) => write_uint(out, u64::from(*v)),
        Value::UInt32(v) => write_uint(out, u64::from(*v)),
        Value::UInt64(v) => write_uint(out, *v),
        Value::Float32(v) => {
            out.push(FLOAT32);
            out.extend_from_slice(&v.to_be_bytes());
        }
        Value::Float64(v) => {
            out.push(FLOAT64);
            out.extend_from_slice(&v.to_be_bytes());
        }
        Value::String(v) => write_str(out, v)?,
        Value::Bytes(v) => write_bin(out, v)?,
        Value::Sequence(elems) => {
            write_array_header(out, elems.len())?;
            for elem in elems {
                write_value(out, elem)?;
            }
        }
        Value::Message(_) => {
            return Err(FormatError::malformed(
                "msgpack",
                "message value outside nested traversal",
            ))
        }
    }
    Ok(())
}

/// Narrowest unsigned int form. Field keys and all non-negative integer
/// values go through here.
fn write_uint(out: &mut Vec<u8>, value: u64) {
    if value <= u64::from(POS_FIXINT_MAX) {
        out.push(value as u8);
    } else if value <= u64::from(u8::MAX) {
        out.push(UINT8);
        out.push(value as u8);
    } else if value <= u64::from(u16::MAX) {
        out.push(UINT16);
        out.extend_from_slice(&(value as u16).to_be_bytes());
    } else if value <= u64::from(u32::MAX) {
        out.push(UINT32);
        out.extend_from_slice(&(value as u32).to_be_bytes());
    } else {
        out.push(UINT64);
        out.extend_from_slice(&value.to_be_bytes());
    }
}

/// Narrowest signed int form for negative values; non-negative values
/// take the unsigned path.
fn write_int(out: &mut Vec<u8>, value: i64) {
    if value >= 0 {
        write_uint(out, value as u64);
    } else if value >= -32 {
        out.push(value as i8 as u8);
    } else if value >= i64::from(i8::MIN) {
        out.push(INT8);
        out.push(value as i8 as u8);
    } else if value >= i64::from(i16::MIN) {
        out.push(INT16);
        out.extend_from_slice(&(value as i16).to_be_bytes());
    } else if value >= i64::from(i32::MIN) {
        out.push(INT32);
        out.extend_from_slice(&(value as i32).to_be_bytes());
    } else {
        out.push(INT64);
        out.extend_from_slice(&value.to_be_bytes());
    }
}

fn write_str(out: &mut Vec<u8>, text: &str) -> FormatResult<()> {
    let len = check_len(text.len())?;
    if len < 32 {
        out.push(FIXSTR | len as u8);
    } else if len <= u32::from(u8::MAX) {
        out.push(STR8);
        out.push(len as u8);
    } else if len <= u32::from(u16::MAX) {
        out.push(STR16);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        out.push(STR32);
        out.extend_from_slice(&len.to_be_bytes());
    }
    out.extend_from_slice(text.as_bytes());
    Ok(())
}

fn write_bin(out: &mut Vec<u8>, data: &[u8]) -> FormatResult<()> {
    let len = check_len(data.len())?;
    if len <= u32::from(u8::MAX) {
        out.push(BIN8);
        out.push(len as u8);
    } else if len <= u32::from(u16::MAX) {
        out.push(BIN16);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        out.push(BIN32);
        out.extend_from_slice(&len.to_be_bytes());
    }
    out.extend_from_slice(data);
    Ok(())
}

fn write_array_header(out: &mut Vec<u8>, count: usize) -> FormatResult<()> {
    let count = check_len(count)?;
    if count <= 15 {
        out.push(FIXARRAY | count as u8);
    } else if count <= u32::from(u16::MAX) {
        out.push(ARRAY16);
        out.extend_from_slice(&(count as u16).to_be_bytes());
    } else {
        out.push(ARRAY32);
        out.extend_from_slice(&count.to_be_bytes());
    }
    Ok(())
}

fn write_map_header(out: &mut Vec<u8>, count: usize) -> FormatResult<()> {
    let count = check_len(count)?;
    if count <= 15 {
        out.push(FIXMAP | count as u8);
    } else if count <= u32::from(u16::MAX) {
        out.push(MAP16);
        out.extend_from_slice(&(count as u16).to_be_bytes());
    } else {
        out.push(MAP32);
        out.extend_from_slice(&count.to_be_bytes());
    }
    Ok(())
}

fn check_len(len: usize) -> FormatResult<u32> {
    u32::try_from(len).map_err(|_| FormatError::malformed("msgpack", "length exceeds u32 range"))
}
