// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Proto decoder.
//!
//! Reads tag/payload records and dispatches on the descriptor's declared
//! type for each field id. Unknown ids are skipped wire-type-aware and
//! retained on the message for pass-through re-encoding. Sequences accept
//! both packed records and repeated per-element records, accumulating in
//! arrival order.

use byteorder::{ByteOrder, LittleEndian};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{FormatError, FormatResult};
use crate::core::message::{GenericMessage, UnknownField};
use crate::core::value::Value;
use crate::schema::descriptor::{FieldDescriptor, FieldType, MessageDescriptor, SchemaSet};

use super::wire::{
    unzigzag, ProtoReader, WIRE_FIXED32, WIRE_FIXED64, WIRE_LEN_DELIMITED, WIRE_VARINT,
};

/// Decoder for proto wire bytes.
pub struct ProtoDecoder {
    _private: (),
}

impl ProtoDecoder {
    /// Create a new proto decoder.
    pub fn new() -> Self {
        ProtoDecoder { _private: () }
    }

    /// Decode a payload into a message bound to `descriptor`.
    pub fn decode(
        &self,
        data: &[u8],
        descriptor: &Arc<MessageDescriptor>,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<GenericMessage> {
        let mut message = GenericMessage::bind(descriptor.clone(), scope.clone());
        let mut reader = ProtoReader::new(data);

        while !reader.is_empty() {
            let tag = reader.read_varint()?;
            let field_id = (tag >> 3) as u32;
            let wire_type = (tag & 0x07) as u8;

            match descriptor.field_by_id(field_id) {
                Some(field) => {
                    self.decode_field(&mut reader, &mut message, field, wire_type, scope)?
                }
                None => {
                    let raw = skip_payload(&mut reader, wire_type, field_id)?;
                    debug!(
                        message = descriptor.qualified_name(),
                        field_id,
                        wire_type,
                        bytes = raw.len(),
                        "retaining unknown field"
                    );
                    message.push_unknown(UnknownField {
                        id: field_id,
                        wire_type,
                        raw,
                    });
                }
            }
        }
        Ok(message)
    }

    fn decode_field(
        &self,
        reader: &mut ProtoReader<'_>,
        message: &mut GenericMessage,
        field: &FieldDescriptor,
        wire_type: u8,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<()> {
        match field.field_type() {
            FieldType::Message(reference) => {
                expect_wire(field, WIRE_LEN_DELIMITED, wire_type)?;
                let payload = reader.read_len_delimited()?;
                let child_descriptor = scope.resolve(reference).ok_or_else(|| {
                    FormatError::unsupported_type("proto", reference.qualified_name())
                })?;
                let child = self.decode(payload, child_descriptor, scope)?;
                message.set(field.id(), Value::Message(child))?;
                Ok(())
            }
            FieldType::Sequence(element) => {
                self.decode_sequence(reader, message, field, element, wire_type, scope)
            }
            scalar => {
                expect_wire(field, scalar_wire(scalar), wire_type)?;
                let value = read_scalar(reader, scalar)?;
                message.set(field.id(), value)?;
                Ok(())
            }
        }
    }

    fn decode_sequence(
        &self,
        reader: &mut ProtoReader<'_>,
        message: &mut GenericMessage,
        field: &FieldDescriptor,
        element: &FieldType,
        wire_type: u8,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<()> {
        let mut elements = match message.clear(field.id()) {
            Some(Value::Sequence(existing)) => existing,
            _ => Vec::new(),
        };

        match element {
            FieldType::Message(reference) => {
                expect_wire(field, WIRE_LEN_DELIMITED, wire_type)?;
                let payload = reader.read_len_delimited()?;
                let child_descriptor = scope.resolve(reference).ok_or_else(|| {
                    FormatError::unsupported_type("proto", reference.qualified_name())
                })?;
                elements.push(Value::Message(self.decode(payload, child_descriptor, scope)?));
            }
            FieldType::String | FieldType::Bytes => {
                expect_wire(field, WIRE_LEN_DELIMITED, wire_type)?;
                elements.push(read_scalar(reader, element)?);
            }
            FieldType::Sequence(_) => {
                return Err(FormatError::type_mismatch(
                    "proto",
                    field.name(),
                    field.field_type().schema_name(),
                    "nested sequence",
                ))
            }
            packable => {
                if wire_type == WIRE_LEN_DELIMITED {
                    // Packed record: concatenated element payloads.
                    let payload = reader.read_len_delimited()?;
                    let mut packed = ProtoReader::new(payload);
                    while !packed.is_empty() {
                        elements.push(read_scalar(&mut packed, packable)?);
                    }
                } else if wire_type == scalar_wire(packable) {
                    elements.push(read_scalar(reader, packable)?);
                } else {
                    return Err(FormatError::type_mismatch(
                        "proto",
                        field.name(),
                        field.field_type().schema_name(),
                        format!("wire type {wire_type}"),
                    ));
                }
            }
        }

        message.set(field.id(), Value::Sequence(elements))?;
        Ok(())
    }
}

impl Default for ProtoDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Natural wire type of a declared scalar type.
fn scalar_wire(field_type: &FieldType) -> u8 {
    match field_type {
        FieldType::Float32 => WIRE_FIXED32,
        FieldType::Float64 => WIRE_FIXED64,
        FieldType::String | FieldType::Bytes => WIRE_LEN_DELIMITED,
        _ => WIRE_VARINT,
    }
}

fn expect_wire(field: &FieldDescriptor, expected: u8, found: u8) -> FormatResult<()> {
    if expected == found {
        return Ok(());
    }
    Err(FormatError::type_mismatch(
        "proto",
        field.name(),
        field.field_type().schema_name(),
        format!("wire type {found}"),
    ))
}

/// Read one scalar payload, declared type driving the interpretation.
/// Signed varints truncate to the declared width before the zigzag
/// inversion.
fn read_scalar(reader: &mut ProtoReader<'_>, field_type: &FieldType) -> FormatResult<Value> {
    let value = match field_type {
        FieldType::Bool => Value::Bool(reader.read_varint()? != 0),
        FieldType::Char => Value::Char((reader.read_varint()? as u8) as char),
        FieldType::Int8 => Value::Int8(unzigzag(reader.read_varint()? & 0xFF) as i8),
        FieldType::Int16 => Value::Int16(unzigzag(reader.read_varint()? & 0xFFFF) as i16),
        FieldType::Int32 => Value::Int32(unzigzag(reader.read_varint()? & 0xFFFF_FFFF) as i32),
        FieldType::Int64 => Value::Int64(unzigzag(reader.read_varint()?)),
        FieldType::UInt8 => Value::UInt8(reader.read_varint()? as u8),
        FieldType::UInt16 => Value::UInt16(reader.read_varint()? as u16),
        FieldType::UInt32 => Value::UInt32(reader.read_varint()? as u32),
        FieldType::UInt64 => Value::UInt64(reader.read_varint()?),
        FieldType::Float32 => Value::Float32(LittleEndian::read_f32(reader.read_exact(4)?)),
        FieldType::Float64 => Value::Float64(LittleEndian::read_f64(reader.read_exact(8)?)),
        FieldType::String => {
            let bytes = reader.read_len_delimited()?;
            let text = std::str::from_utf8(bytes).map_err(|_| {
                FormatError::malformed("proto", "invalid utf-8 in string payload")
            })?;
            Value::String(text.to_string())
        }
        FieldType::Bytes => Value::Bytes(reader.read_len_delimited()?.to_vec()),
        FieldType::Message(_) | FieldType::Sequence(_) => {
            return Err(FormatError::malformed(
                "proto",
                "composite type in scalar position",
            ))
        }
    };
    Ok(value)
}

/// Skip one payload by wire type, returning the raw bytes for
/// unknown-field retention. Length-delimited payloads keep their length
/// prefix.
fn skip_payload(
    reader: &mut ProtoReader<'_>,
    wire_type: u8,
    field_id: u32,
) -> FormatResult<Vec<u8>> {
    let start = reader.position();
    match wire_type {
        WIRE_VARINT => {
            reader.read_varint()?;
        }
        WIRE_FIXED64 => {
            reader.read_exact(8)?;
        }
        WIRE_LEN_DELIMITED => {
            reader.read_len_delimited()?;
        }
        WIRE_FIXED32 => {
            reader.read_exact(4)?;
        }
        other => {
            return Err(FormatError::malformed(
                "proto",
                format!("unsupported wire type {other} on field {field_id}"),
            ))
        }
    }
    Ok(reader.slice_from(start).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::proto::encoder::ProtoEncoder;
    use crate::schema::parser::parse_schema;

    fn geo_scope() -> Arc<SchemaSet> {
        Arc::new(
            parse_schema(
                r#"
                message geo.Point [id = 19] {
                    float x = 1;
                    float y = 2;
                }
                message geo.Line [id = 20] {
                    string label = 1;
                    repeated geo.Point points = 2;
                    geo.Point origin = 3;
                    char tag = 4;
                }
                message geo.Counters [id = 21] {
                    int32 delta = 1;
                    repeated int32 weights = 4;
                }
            "#,
            )
            .unwrap(),
        )
    }

    fn descriptor(scope: &Arc<SchemaSet>, name: &str) -> Arc<MessageDescriptor> {
        scope.by_name(name).unwrap().clone()
    }

    #[test]
    fn test_decode_point_vector() {
        let scope = geo_scope();
        let data = [0x0Du8, 0x00, 0x00, 0xC0, 0x3F, 0x15, 0x00, 0x00, 0x00, 0xC0];

        let point = ProtoDecoder::new()
            .decode(&data, &descriptor(&scope, "geo.Point"), &scope)
            .unwrap();
        assert_eq!(point.get(1), Some(&Value::Float32(1.5)));
        assert_eq!(point.get(2), Some(&Value::Float32(-2.0)));
    }

    #[test]
    fn test_decode_zigzag_signed() {
        let scope = geo_scope();
        // Tag (1 << 3) | 0, zigzag byte 1 = -1.
        let data = [0x08u8, 0x01];

        let counters = ProtoDecoder::new()
            .decode(&data, &descriptor(&scope, "geo.Counters"), &scope)
            .unwrap();
        assert_eq!(counters.get(1), Some(&Value::Int32(-1)));
    }

    #[test]
    fn test_decode_empty_payload() {
        let scope = geo_scope();
        let message = ProtoDecoder::new()
            .decode(&[], &descriptor(&scope, "geo.Point"), &scope)
            .unwrap();
        assert_eq!(message.present_count(), 0);
    }

    #[test]
    fn test_decode_retains_unknown_fields() {
        let scope = geo_scope();
        // Declared field 1 = -1, then unknown field 99 varint 5.
        let data = [0x08u8, 0x02, 0x98, 0x06, 0x05];

        let counters = ProtoDecoder::new()
            .decode(&data, &descriptor(&scope, "geo.Counters"), &scope)
            .unwrap();
        assert_eq!(counters.get(1), Some(&Value::Int32(1)));
        assert_eq!(
            counters.unknown_fields(),
            &[UnknownField {
                id: 99,
                wire_type: 0,
                raw: vec![0x05],
            }]
        );

        // Pass-through: re-encoding replays the unknown field.
        assert_eq!(ProtoEncoder::encode(&counters).unwrap(), data);
    }

    #[test]
    fn test_unknown_length_delimited_keeps_prefix() {
        let scope = geo_scope();
        // Unknown field 9, length-delimited, three bytes.
        let data = [0x4Au8, 0x03, 0xAA, 0xBB, 0xCC];

        let counters = ProtoDecoder::new()
            .decode(&data, &descriptor(&scope, "geo.Counters"), &scope)
            .unwrap();
        assert_eq!(counters.unknown_fields()[0].raw, vec![0x03, 0xAA, 0xBB, 0xCC]);
        assert_eq!(ProtoEncoder::encode(&counters).unwrap(), data);
    }

    #[test]
    fn test_decode_wire_type_mismatch() {
        let scope = geo_scope();
        // Field 1 of geo.Point declares float (fixed32) but wire says varint.
        let data = [0x08u8, 0x01];

        let err = ProtoDecoder::new()
            .decode(&data, &descriptor(&scope, "geo.Point"), &scope)
            .unwrap_err();
        assert!(matches!(err, FormatError::TypeMismatch { .. }));
        assert!(err.to_string().contains("declared 'float'"));
    }

    #[test]
    fn test_decode_truncated_fixed32() {
        let scope = geo_scope();
        let data = [0x0Du8, 0x00, 0x00];

        let err = ProtoDecoder::new()
            .decode(&data, &descriptor(&scope, "geo.Point"), &scope)
            .unwrap_err();
        assert!(matches!(err, FormatError::Malformed { .. }));
    }

    #[test]
    fn test_decode_packed_and_per_element_accumulate() {
        let scope = geo_scope();
        // Packed record [1, 2], then one per-element record 3.
        let data = [0x22u8, 0x02, 0x02, 0x04, 0x20, 0x06];

        let counters = ProtoDecoder::new()
            .decode(&data, &descriptor(&scope, "geo.Counters"), &scope)
            .unwrap();
        assert_eq!(
            counters.get(4),
            Some(&Value::Sequence(vec![
                Value::Int32(1),
                Value::Int32(2),
                Value::Int32(3),
            ]))
        );
    }

    #[test]
    fn test_decode_nested_and_sequence_of_messages() {
        let scope = geo_scope();
        let mut line = GenericMessage::by_name(&scope, "geo.Line").unwrap();
        line.set(1, Value::String("diag".to_string())).unwrap();
        let mut p1 = GenericMessage::by_name(&scope, "geo.Point").unwrap();
        p1.set(1, Value::Float32(1.0)).unwrap();
        let mut p2 = GenericMessage::by_name(&scope, "geo.Point").unwrap();
        p2.set(2, Value::Float32(2.0)).unwrap();
        line.set(
            2,
            Value::Sequence(vec![Value::Message(p1.clone()), Value::Message(p2)]),
        )
        .unwrap();
        line.set(3, Value::Message(p1)).unwrap();
        line.set(4, Value::Char('z')).unwrap();

        let bytes = ProtoEncoder::encode(&line).unwrap();
        let decoded = ProtoDecoder::new()
            .decode(&bytes, &descriptor(&scope, "geo.Line"), &scope)
            .unwrap();
        assert_eq!(decoded, line);
    }

    #[test]
    fn test_decode_invalid_utf8_string() {
        let scope = geo_scope();
        // Field 1 of geo.Line, length 2, invalid UTF-8.
        let data = [0x0Au8, 0x02, 0xFF, 0xFE];

        let err = ProtoDecoder::new()
            .decode(&data, &descriptor(&scope, "geo.Line"), &scope)
            .unwrap_err();
        assert!(err.to_string().contains("invalid utf-8"));
    }

    #[test]
    fn test_decode_group_wire_type_rejected() {
        let scope = geo_scope();
        // Unknown field 7 with deprecated group wire type 3.
        let data = [0x3Bu8];

        let err = ProtoDecoder::new()
            .decode(&data, &descriptor(&scope, "geo.Counters"), &scope)
            .unwrap_err();
        assert!(err.to_string().contains("unsupported wire type 3"));
    }
}
