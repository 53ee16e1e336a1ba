// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MsgPack decoder.
//!
//! Reads the root map and dispatches each entry on the descriptor's
//! declared type for the resolved field id. Keys arrive as any integer
//! form or as a digit string. Entries whose key names no declared field
//! are skipped value-and-all; the markers are self-describing, so a
//! skip never needs the schema.

use byteorder::{BigEndian, ByteOrder};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{FormatError, FormatResult};
use crate::core::message::GenericMessage;
use crate::core::value::Value;
use crate::schema::descriptor::{FieldDescriptor, FieldType, MessageDescriptor, SchemaSet};

use super::marker::{
    ARRAY16, ARRAY32, BIN16, BIN32, BIN8, FALSE, FIXARRAY, FIXARRAY_MAX, FIXMAP, FIXMAP_MAX,
    FIXSTR, FIXSTR_MAX, FLOAT32, FLOAT64, INT16, INT32, INT64, INT8, MAP16, MAP32, NEG_FIXINT,
    NIL, POS_FIXINT_MAX, STR16, STR32, STR8, TRUE, UINT16, UINT32, UINT64, UINT8,
};

/// Bounds-checked reader over msgpack bytes.
struct MsgPackReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MsgPackReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        MsgPackReader { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn read_exact(&mut self, len: usize) -> FormatResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(FormatError::malformed(
                "msgpack",
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

    fn read_u16(&mut self) -> FormatResult<u16> {
        Ok(BigEndian::read_u16(self.read_exact(2)?))
    }

    fn read_u32(&mut self) -> FormatResult<u32> {
        Ok(BigEndian::read_u32(self.read_exact(4)?))
    }

    fn read_u64(&mut self) -> FormatResult<u64> {
        Ok(BigEndian::read_u64(self.read_exact(8)?))
    }

    fn read_i16(&mut self) -> FormatResult<i16> {
        Ok(BigEndian::read_i16(self.read_exact(2)?))
    }

    fn read_i32(&mut self) -> FormatResult<i32> {
        Ok(BigEndian::read_i32(self.read_exact(4)?))
    }

    fn read_i64(&mut self) -> FormatResult<i64> {
        Ok(BigEndian::read_i64(self.read_exact(8)?))
    }

    fn read_f32(&mut self) -> FormatResult<f32> {
        Ok(BigEndian::read_f32(self.read_exact(4)?))
    }

    fn read_f64(&mut self) -> FormatResult<f64> {
        Ok(BigEndian::read_f64(self.read_exact(8)?))
    }
}

/// Decoder for MsgPack maps.
pub struct MsgPackDecoder {
    _private: (),
}

impl MsgPackDecoder {
    /// Create a new MsgPack decoder.
    pub fn new() -> Self {
        MsgPackDecoder { _private: () }
    }

    /// Decode a payload into a message bound to `descriptor`.
    pub fn decode(
        &self,
        data: &[u8],
        descriptor: &Arc<MessageDescriptor>,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<GenericMessage> {
        let mut reader = MsgPackReader::new(data);
        let marker = reader.read_u8()?;
        let count = map_len_body(&mut reader, marker)?.ok_or_else(|| {
            FormatError::malformed(
                "msgpack",
                format!("expected map header, found marker {marker:#04x}"),
            )
        })?;
        let message = self.decode_fields(&mut reader, count, descriptor, scope)?;
        if !reader.is_empty() {
            return Err(FormatError::malformed(
                "msgpack",
                format!("{} trailing bytes after root map", reader.remaining()),
            ));
        }
        Ok(message)
    }

    fn decode_fields(
        &self,
        reader: &mut MsgPackReader<'_>,
        count: usize,
        descriptor: &Arc<MessageDescriptor>,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<GenericMessage> {
        let mut message = GenericMessage::bind(descriptor.clone(), scope.clone());
        for _ in 0..count {
            match read_key(reader)?.and_then(|id| descriptor.field_by_id(id)) {
                Some(field) => {
                    if let Some(value) = self.decode_field(reader, field, scope)? {
                        message.set(field.id(), value)?;
                    }
                }
                None => {
                    debug!(
                        message = descriptor.qualified_name(),
                        "skipping entry with unknown key"
                    );
                    skip_value(reader)?;
                }
            }
        }
        Ok(message)
    }

    fn decode_field(
        &self,
        reader: &mut MsgPackReader<'_>,
        field: &FieldDescriptor,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<Option<Value>> {
        let marker = reader.read_u8()?;
        if marker == NIL {
            // A nil member leaves the field absent, like a missing key.
            return Ok(None);
        }
        check_marker(marker)?;
        match field.field_type() {
            FieldType::Message(reference) => {
                let count = map_len_body(reader, marker)?.ok_or_else(|| mismatch(field, marker))?;
                let child_descriptor = scope.resolve(reference).ok_or_else(|| {
                    FormatError::unsupported_type("msgpack", reference.qualified_name())
                })?;
                let child = self.decode_fields(reader, count, child_descriptor, scope)?;
                Ok(Some(Value::Message(child)))
            }
            FieldType::Sequence(element) => {
                let count =
                    array_len_body(reader, marker)?.ok_or_else(|| mismatch(field, marker))?;
                let mut elements = Vec::new();
                for _ in 0..count {
                    elements.push(self.decode_element(reader, field, element, scope)?);
                }
                Ok(Some(Value::Sequence(elements)))
            }
            scalar => Ok(Some(read_scalar(reader, marker, field, scalar)?)),
        }
    }

    fn decode_element(
        &self,
        reader: &mut MsgPackReader<'_>,
        field: &FieldDescriptor,
        element: &FieldType,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<Value> {
        let marker = reader.read_u8()?;
        check_marker(marker)?;
        match element {
            FieldType::Message(reference) => {
                let count = map_len_body(reader, marker)?.ok_or_else(|| mismatch(field, marker))?;
                let child_descriptor = scope.resolve(reference).ok_or_else(|| {
                    FormatError::unsupported_type("msgpack", reference.qualified_name())
                })?;
                Ok(Value::Message(self.decode_fields(
                    reader,
                    count,
                    child_descriptor,
                    scope,
                )?))
            }
            FieldType::Sequence(_) => Err(FormatError::type_mismatch(
                "msgpack",
                field.name(),
                field.field_type().schema_name(),
                "nested sequence",
            )),
            scalar => read_scalar(reader, marker, field, scalar),
        }
    }
}

impl Default for MsgPackDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Keys and skipping
// =========================================================================

/// Resolve one map key to a field id. Integer keys and digit-string keys
/// both resolve; any other well-formed value is consumed and yields no
/// id, so the caller discards the entry.
fn read_key(reader: &mut MsgPackReader<'_>) -> FormatResult<Option<u32>> {
    let marker = reader.read_u8()?;
    if let Some(raw) = int_body(reader, marker)? {
        return Ok(u32::try_from(raw).ok());
    }
    if let Some(text) = read_str_body(reader, marker)? {
        return Ok(text.parse::<u32>().ok());
    }
    skip_body(reader, marker)?;
    Ok(None)
}

fn skip_value(reader: &mut MsgPackReader<'_>) -> FormatResult<()> {
    let marker = reader.read_u8()?;
    skip_body(reader, marker)
}

fn skip_values(reader: &mut MsgPackReader<'_>, count: usize) -> FormatResult<()> {
    for _ in 0..count {
        skip_value(reader)?;
    }
    Ok(())
}

fn skip_entries(reader: &mut MsgPackReader<'_>, count: usize) -> FormatResult<()> {
    for _ in 0..count {
        skip_value(reader)?;
        skip_value(reader)?;
    }
    Ok(())
}

/// Skip the payload of a value whose marker is already consumed.
fn skip_body(reader: &mut MsgPackReader<'_>, marker: u8) -> FormatResult<()> {
    match marker {
        0x00..=POS_FIXINT_MAX | NEG_FIXINT..=0xFF | NIL | FALSE | TRUE => Ok(()),
        FIXMAP..=FIXMAP_MAX => skip_entries(reader, usize::from(marker & 0x0F)),
        FIXARRAY..=FIXARRAY_MAX => skip_values(reader, usize::from(marker & 0x0F)),
        FIXSTR..=FIXSTR_MAX => reader.read_exact(usize::from(marker & 0x1F)).map(|_| ()),
        BIN8 | STR8 => {
            let len = usize::from(reader.read_u8()?);
            reader.read_exact(len).map(|_| ())
        }
        BIN16 | STR16 => {
            let len = usize::from(reader.read_u16()?);
            reader.read_exact(len).map(|_| ())
        }
        BIN32 | STR32 => {
            let len = reader.read_u32()? as usize;
            reader.read_exact(len).map(|_| ())
        }
        UINT8 | INT8 => reader.read_exact(1).map(|_| ()),
        UINT16 | INT16 => reader.read_exact(2).map(|_| ()),
        UINT32 | INT32 | FLOAT32 => reader.read_exact(4).map(|_| ()),
        UINT64 | INT64 | FLOAT64 => reader.read_exact(8).map(|_| ()),
        ARRAY16 => {
            let count = usize::from(reader.read_u16()?);
            skip_values(reader, count)
        }
        ARRAY32 => {
            let count = reader.read_u32()? as usize;
            skip_values(reader, count)
        }
        MAP16 => {
            let count = usize::from(reader.read_u16()?);
            skip_entries(reader, count)
        }
        MAP32 => {
            let count = reader.read_u32()? as usize;
            skip_entries(reader, count)
        }
        other => Err(FormatError::malformed(
            "msgpack",
            format!("unsupported marker {other:#04x}"),
        )),
    }
}

// =========================================================================
// Typed reads
// =========================================================================

/// Read one scalar value, declared type driving the interpretation.
fn read_scalar(
    reader: &mut MsgPackReader<'_>,
    marker: u8,
    field: &FieldDescriptor,
    declared: &FieldType,
) -> FormatResult<Value> {
    let value = match declared {
        FieldType::Bool => match marker {
            FALSE => Value::Bool(false),
            TRUE => Value::Bool(true),
            _ => return Err(mismatch(field, marker)),
        },
        FieldType::Char => {
            let text = read_str_body(reader, marker)?.ok_or_else(|| mismatch(field, marker))?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => {
                    return Err(FormatError::type_mismatch(
                        "msgpack",
                        field.name(),
                        field.field_type().schema_name(),
                        format!("str of {} bytes", text.len()),
                    ))
                }
            }
        }
        FieldType::Int8 => Value::Int8(narrow(field, read_int(reader, marker, field)?)?),
        FieldType::Int16 => Value::Int16(narrow(field, read_int(reader, marker, field)?)?),
        FieldType::Int32 => Value::Int32(narrow(field, read_int(reader, marker, field)?)?),
        FieldType::Int64 => Value::Int64(narrow(field, read_int(reader, marker, field)?)?),
        FieldType::UInt8 => Value::UInt8(narrow(field, read_int(reader, marker, field)?)?),
        FieldType::UInt16 => Value::UInt16(narrow(field, read_int(reader, marker, field)?)?),
        FieldType::UInt32 => Value::UInt32(narrow(field, read_int(reader, marker, field)?)?),
        FieldType::UInt64 => Value::UInt64(narrow(field, read_int(reader, marker, field)?)?),
        FieldType::Float32 => match marker {
            FLOAT32 => Value::Float32(reader.read_f32()?),
            FLOAT64 => Value::Float32(reader.read_f64()? as f32),
            _ => return Err(mismatch(field, marker)),
        },
        FieldType::Float64 => match marker {
            FLOAT32 => Value::Float64(f64::from(reader.read_f32()?)),
            FLOAT64 => Value::Float64(reader.read_f64()?),
            _ => return Err(mismatch(field, marker)),
        },
        FieldType::String => {
            let text = read_str_body(reader, marker)?.ok_or_else(|| mismatch(field, marker))?;
            Value::String(text.to_string())
        }
        FieldType::Bytes => {
            let data = read_bin_body(reader, marker)?.ok_or_else(|| mismatch(field, marker))?;
            Value::Bytes(data.to_vec())
        }
        FieldType::Message(_) | FieldType::Sequence(_) => {
            return Err(FormatError::malformed(
                "msgpack",
                "composite type in scalar position",
            ))
        }
    };
    Ok(value)
}

/// Integer wire forms widened so every unsigned and signed value fits.
fn int_body(reader: &mut MsgPackReader<'_>, marker: u8) -> FormatResult<Option<i128>> {
    let value = match marker {
        0x00..=POS_FIXINT_MAX => i128::from(marker),
        NEG_FIXINT..=0xFF => i128::from(marker as i8),
        UINT8 => i128::from(reader.read_u8()?),
        UINT16 => i128::from(reader.read_u16()?),
        UINT32 => i128::from(reader.read_u32()?),
        UINT64 => i128::from(reader.read_u64()?),
        INT8 => i128::from(reader.read_u8()? as i8),
        INT16 => i128::from(reader.read_i16()?),
        INT32 => i128::from(reader.read_i32()?),
        INT64 => i128::from(reader.read_i64()?),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn read_int(
    reader: &mut MsgPackReader<'_>,
    marker: u8,
    field: &FieldDescriptor,
) -> FormatResult<i128> {
    int_body(reader, marker)?.ok_or_else(|| mismatch(field, marker))
}

fn narrow<T: TryFrom<i128>>(field: &FieldDescriptor, raw: i128) -> FormatResult<T> {
    T::try_from(raw).map_err(|_| {
        FormatError::type_mismatch(
            "msgpack",
            field.name(),
            field.field_type().schema_name(),
            format!("int {raw}"),
        )
    })
}

fn read_str_body<'a>(
    reader: &mut MsgPackReader<'a>,
    marker: u8,
) -> FormatResult<Option<&'a str>> {
    let len = match marker {
        FIXSTR..=FIXSTR_MAX => usize::from(marker & 0x1F),
        STR8 => usize::from(reader.read_u8()?),
        STR16 => usize::from(reader.read_u16()?),
        STR32 => reader.read_u32()? as usize,
        _ => return Ok(None),
    };
    let bytes = reader.read_exact(len)?;
    std::str::from_utf8(bytes)
        .map(Some)
        .map_err(|_| FormatError::malformed("msgpack", "invalid utf-8 in string payload"))
}

/// Binary payload by marker. Str markers are accepted too; writers from
/// the raw era encode binary as str.
fn read_bin_body<'a>(
    reader: &mut MsgPackReader<'a>,
    marker: u8,
) -> FormatResult<Option<&'a [u8]>> {
    let len = match marker {
        BIN8 | STR8 => usize::from(reader.read_u8()?),
        BIN16 | STR16 => usize::from(reader.read_u16()?),
        BIN32 | STR32 => reader.read_u32()? as usize,
        FIXSTR..=FIXSTR_MAX => usize::from(marker & 0x1F),
        _ => return Ok(None),
    };
    Ok(Some(reader.read_exact(len)?))
}

fn map_len_body(reader: &mut MsgPackReader<'_>, marker: u8) -> FormatResult<Option<usize>> {
    let count = match marker {
        FIXMAP..=FIXMAP_MAX => usize::from(marker & 0x0F),
        MAP16 => usize::from(reader.read_u16()?),
        MAP32 => reader.read_u32()? as usize,
        _ => return Ok(None),
    };
    Ok(Some(count))
}

fn array_len_body(reader: &mut MsgPackReader<'_>, marker: u8) -> FormatResult<Option<usize>> {
    let count = match marker {
        FIXARRAY..=FIXARRAY_MAX => usize::from(marker & 0x0F),
        ARRAY16 => usize::from(reader.read_u16()?),
        ARRAY32 => reader.read_u32()? as usize,
        _ => return Ok(None),
    };
    Ok(Some(count))
}

// Reserved and ext-family markers; this wire contract never writes them.
fn check_marker(marker: u8) -> FormatResult<()> {
    if matches!(marker, 0xC1 | 0xC7..=0xC9 | 0xD4..=0xD8) {
        return Err(FormatError::malformed(
            "msgpack",
            format!("unsupported marker {marker:#04x}"),
        ));
    }
    Ok(())
}

fn mismatch(field: &FieldDescriptor, marker: u8) -> FormatError {
    FormatError::type_mismatch(
        "msgpack",
        field.name(),
        field.field_type().schema_name(),
        format!("marker {marker:#04x}"),
    )
}

#[cfg(test)]
mod tests {
    use super::super::encoder::MsgPackEncoder;
    use super::*;
    use crate::schema::parser::parse_schema;

    fn scope_of(text: &str) -> Arc<SchemaSet> {
        Arc::new(parse_schema(text).unwrap())
    }

    fn decode(scope: &Arc<SchemaSet>, name: &str, data: &[u8]) -> FormatResult<GenericMessage> {
        let descriptor = scope.by_name(name).unwrap().clone();
        MsgPackDecoder::new().decode(data, &descriptor, scope)
    }

    #[test]
    fn test_decode_point_map() {
        let scope = scope_of(
            r#"
            message geo.Point [id = 19] {
                float x = 1;
                float y = 2;
            }
        "#,
        );
        let data = [
            0x82, 0x01, 0xCA, 0x3F, 0xC0, 0x00, 0x00, 0x02, 0xCA, 0xC0, 0x00, 0x00, 0x00,
        ];
        let point = decode(&scope, "geo.Point", &data).unwrap();
        assert_eq!(point.get(1), Some(&Value::Float32(1.5)));
        assert_eq!(point.get(2), Some(&Value::Float32(-2.0)));
    }

    #[test]
    fn test_round_trip_all_field_kinds() {
        let scope = scope_of(
            r#"
            message t.Inner [id = 1] {
                int32 a = 1;
            }
            message t.Mixed [id = 2] {
                bool live = 1;
                char grade = 2;
                int8 tiny = 3;
                int16 short = 4;
                int32 delta = 5;
                int64 wide = 6;
                uint8 level = 7;
                uint16 port = 8;
                uint32 total = 9;
                uint64 stamp = 10;
                float ratio = 11;
                double precise = 12;
                string label = 13;
                bytes blob = 14;
                repeated int32 weights = 15;
                t.Inner inner = 16;
                repeated t.Inner items = 17;
            }
        "#,
        );
        let mut inner = GenericMessage::by_name(&scope, "t.Inner").unwrap();
        inner.set(1, Value::Int32(-40)).unwrap();
        let mut item = GenericMessage::by_name(&scope, "t.Inner").unwrap();
        item.set(1, Value::Int32(99)).unwrap();

        let mut mixed = GenericMessage::by_name(&scope, "t.Mixed").unwrap();
        mixed.set(1, Value::Bool(true)).unwrap();
        mixed.set(2, Value::Char('B')).unwrap();
        mixed.set(3, Value::Int8(-100)).unwrap();
        mixed.set(4, Value::Int16(-30_000)).unwrap();
        mixed.set(5, Value::Int32(123_456)).unwrap();
        mixed.set(6, Value::Int64(-9_876_543_210)).unwrap();
        mixed.set(7, Value::UInt8(200)).unwrap();
        mixed.set(8, Value::UInt16(60_000)).unwrap();
        mixed.set(9, Value::UInt32(4_000_000_000)).unwrap();
        mixed.set(10, Value::UInt64(u64::MAX)).unwrap();
        mixed.set(11, Value::Float32(2.5)).unwrap();
        mixed.set(12, Value::Float64(-0.125)).unwrap();
        mixed.set(13, Value::String("status".to_string())).unwrap();
        mixed.set(14, Value::Bytes(vec![0x00, 0x7F, 0xFF])).unwrap();
        mixed
            .set(
                15,
                Value::Sequence(vec![Value::Int32(-1), Value::Int32(300)]),
            )
            .unwrap();
        mixed.set(16, Value::Message(inner)).unwrap();
        mixed
            .set(17, Value::Sequence(vec![Value::Message(item)]))
            .unwrap();

        let data = MsgPackEncoder::encode(&mixed).unwrap();
        let decoded = decode(&scope, "t.Mixed", &data).unwrap();
        assert_eq!(decoded, mixed);
    }

    #[test]
    fn test_unknown_key_value_discarded() {
        let scope = scope_of("message t.Pair [id = 1] { int32 a = 1; }");
        // Key 99 carries a nested array the schema knows nothing about.
        let data = [
            0x82, // two entries
            0x63, 0x93, 0x01, 0xA2, b'a', b'b', 0x81, 0xA1, b'k', 0xC3, // 99: [1,"ab",{"k":true}]
            0x01, 0x2A, // a: 42
        ];
        let pair = decode(&scope, "t.Pair", &data).unwrap();
        assert_eq!(pair.get(1), Some(&Value::Int32(42)));
        assert_eq!(pair.present_count(), 1);
    }

    #[test]
    fn test_digit_string_key_resolves() {
        let scope = scope_of("message t.Gauge [id = 1] { int32 g = 7; }");
        let data = [0x81, 0xA1, b'7', 0x05];
        let gauge = decode(&scope, "t.Gauge", &data).unwrap();
        assert_eq!(gauge.get(7), Some(&Value::Int32(5)));
    }

    #[test]
    fn test_non_numeric_string_key_discarded() {
        let scope = scope_of("message t.Gauge [id = 1] { int32 g = 7; }");
        let data = [0x81, 0xA1, b'x', 0x05];
        let gauge = decode(&scope, "t.Gauge", &data).unwrap();
        assert_eq!(gauge.present_count(), 0);
    }

    #[test]
    fn test_negative_int_key_discarded() {
        let scope = scope_of("message t.Gauge [id = 1] { int32 g = 7; }");
        let data = [0x81, 0xFF, 0xC3];
        let gauge = decode(&scope, "t.Gauge", &data).unwrap();
        assert_eq!(gauge.present_count(), 0);
    }

    #[test]
    fn test_bool_field_rejects_int_marker() {
        let scope = scope_of("message t.Cell [id = 1] { bool live = 1; }");
        let err = decode(&scope, "t.Cell", &[0x81, 0x01, 0x05]).unwrap_err();
        assert!(matches!(err, FormatError::TypeMismatch { .. }));
        assert!(err.to_string().contains("declared 'bool'"));
        assert!(err.to_string().contains("marker 0x05"));
    }

    #[test]
    fn test_int_out_of_declared_range_rejected() {
        let scope = scope_of("message t.Tiny [id = 1] { int8 v = 1; }");
        let err = decode(&scope, "t.Tiny", &[0x81, 0x01, 0xCD, 0x01, 0x00]).unwrap_err();
        assert!(matches!(err, FormatError::TypeMismatch { .. }));
        assert!(err.to_string().contains("int 256"));
    }

    #[test]
    fn test_unsigned_field_rejects_negative() {
        let scope = scope_of("message t.Port [id = 1] { uint16 port = 1; }");
        let err = decode(&scope, "t.Port", &[0x81, 0x01, 0xFF]).unwrap_err();
        assert!(err.to_string().contains("int -1"));
    }

    #[test]
    fn test_truncated_map_rejected() {
        let scope = scope_of("message t.Pair [id = 1] { int32 a = 1; }");
        let err = decode(&scope, "t.Pair", &[0x82, 0x01]).unwrap_err();
        assert!(matches!(err, FormatError::Malformed { .. }));
    }

    #[test]
    fn test_reserved_marker_rejected() {
        let scope = scope_of("message t.Pair [id = 1] { int32 a = 1; }");
        let err = decode(&scope, "t.Pair", &[0x81, 0x01, 0xC1]).unwrap_err();
        assert!(err.to_string().contains("unsupported marker 0xc1"));
    }

    #[test]
    fn test_nil_member_leaves_field_absent() {
        let scope = scope_of("message t.Pair [id = 1] { int32 a = 1; }");
        let pair = decode(&scope, "t.Pair", &[0x81, 0x01, 0xC0]).unwrap();
        assert_eq!(pair.get(1), None);
        assert_eq!(pair.present_count(), 0);
    }

    #[test]
    fn test_empty_array_is_present_empty_sequence() {
        let scope = scope_of("message t.Row [id = 1] { repeated int16 cells = 1; }");
        let row = decode(&scope, "t.Row", &[0x81, 0x01, 0x90]).unwrap();
        assert_eq!(row.get(1), Some(&Value::Sequence(Vec::new())));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let scope = scope_of("message t.Pair [id = 1] { int32 a = 1; }");
        let err = decode(&scope, "t.Pair", &[0x80, 0x00]).unwrap_err();
        assert!(err.to_string().contains("trailing bytes"));
    }

    #[test]
    fn test_non_map_root_rejected() {
        let scope = scope_of("message t.Pair [id = 1] { int32 a = 1; }");
        let err = decode(&scope, "t.Pair", &[0x2A]).unwrap_err();
        assert!(err.to_string().contains("expected map header"));
    }

    #[test]
    fn test_char_rejects_multibyte_str() {
        let scope = scope_of("message t.Cell [id = 1] { char tag = 1; }");
        let err = decode(&scope, "t.Cell", &[0x81, 0x01, 0xA2, b'a', b'b']).unwrap_err();
        assert!(matches!(err, FormatError::TypeMismatch { .. }));
    }

    #[test]
    fn test_bytes_accepts_str_marker() {
        let scope = scope_of("message t.Blob [id = 1] { bytes data = 1; }");
        let blob = decode(&scope, "t.Blob", &[0x81, 0x01, 0xA2, 0xFF, 0xFE]).unwrap();
        assert_eq!(blob.get(1), Some(&Value::Bytes(vec![0xFF, 0xFE])));
    }

    #[test]
    fn test_float_field_accepts_double_marker() {
        let scope = scope_of("message t.Gauge [id = 1] { float r = 1; }");
        let mut data = vec![0x81, 0x01, 0xCB];
        data.extend_from_slice(&2.5f64.to_be_bytes());
        let gauge = decode(&scope, "t.Gauge", &data).unwrap();
        assert_eq!(gauge.get(1), Some(&Value::Float32(2.5)));
    }

    #[test]
    fn test_int_key_wide_forms_resolve() {
        let scope = scope_of("message t.Gauge [id = 1] { int32 g = 7; }");
        // Field 7 keyed as uint8 and as int8.
        for data in [
            vec![0x81, 0xCC, 0x07, 0x2A],
            vec![0x81, 0xD0, 0x07, 0x2A],
        ] {
            let gauge = decode(&scope, "t.Gauge", &data).unwrap();
            assert_eq!(gauge.get(7), Some(&Value::Int32(42)));
        }
    }
}
