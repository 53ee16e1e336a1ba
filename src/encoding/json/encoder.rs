// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON encoder.
//!
//! A message becomes an object keyed by field name. Bytes travel as
//! base64 strings, a char as a one-character string, nested messages as
//! nested objects and sequences as arrays. Absent fields write nothing.

use serde_json::{Map, Number, Value as JsonValue};

use crate::core::error::{FormatError, FormatResult};
use crate::core::message::{GenericMessage, MessageVisitor, TraversalEvent};
use crate::core::value::Value;

use super::base64;

/// Where a finished object lands in its parent.
enum Attach {
    Root,
    Field(String),
    Element(String),
}

struct Frame {
    object: Map<String, JsonValue>,
    attach: Attach,
}

impl Frame {
    fn open(attach: Attach) -> Self {
        Frame {
            object: Map::new(),
            attach,
        }
    }
}

/// Traversal-driven JSON encoder.
pub struct JsonEncoder {
    stack: Vec<Frame>,
    output: Vec<u8>,
}

impl JsonEncoder {
    /// Encode a message into a JSON object keyed by field name.
    pub fn encode(message: &GenericMessage) -> FormatResult<Vec<u8>> {
        let mut encoder = JsonEncoder {
            stack: vec![Frame::open(Attach::Root)],
            output: Vec::new(),
        };
        message.accept(&mut encoder)?;
        Ok(encoder.output)
    }

    fn top(&mut self) -> FormatResult<&mut Frame> {
        self.stack
            .last_mut()
            .ok_or_else(|| FormatError::malformed("json", "unbalanced traversal"))
    }

    fn pop(&mut self) -> FormatResult<Frame> {
        self.stack
            .pop()
            .ok_or_else(|| FormatError::malformed("json", "unbalanced traversal"))
    }
}

impl MessageVisitor for JsonEncoder {
    fn visit(&mut self, event: TraversalEvent<'_>) -> FormatResult<()> {
        match event {
            // The root frame is opened by encode() before traversal starts.
            TraversalEvent::BeginMessage { .. } => Ok(()),
            TraversalEvent::Field { field, value } => {
                let member = json_value(value)?;
                let frame = self.top()?;
                frame.object.insert(field.name().to_string(), member);
                Ok(())
            }
            TraversalEvent::BeginNested { field, slot, .. } => {
                let attach = match slot {
                    None => Attach::Field(field.name().to_string()),
                    Some(slot) => {
                        if slot.index == 0 {
                            let frame = self.top()?;
                            frame
                                .object
                                .insert(field.name().to_string(), JsonValue::Array(Vec::new()));
                        }
                        Attach::Element(field.name().to_string())
                    }
                };
                self.stack.push(Frame::open(attach));
                Ok(())
            }
            TraversalEvent::EndNested => {
                let child = self.pop()?;
                let object = JsonValue::Object(child.object);
                let parent = self.top()?;
                match child.attach {
                    Attach::Field(name) => {
                        parent.object.insert(name, object);
                        Ok(())
                    }
                    Attach::Element(name) => match parent.object.get_mut(&name) {
                        Some(JsonValue::Array(elements)) => {
                            elements.push(object);
                            Ok(())
                        }
                        _ => Err(FormatError::malformed("json", "sequence slot missing")),
                    },
                    Attach::Root => Err(FormatError::malformed("json", "unbalanced traversal")),
                }
            }
            TraversalEvent::EndMessage => {
                let frame = self.pop()?;
                self.output = serde_json::to_vec(&JsonValue::Object(frame.object))?;
                Ok(())
            }
        }
    }
}

fn json_value(value: &Value) -> FormatResult<JsonValue> {
    let member = match value {
        Value::Bool(v) => JsonValue::Bool(*v),
        Value::Char(v) => JsonValue::String(v.to_string()),
        Value::Int8(v) => JsonValue::Number(Number::from(*v)),
        Value::Int16(v) => JsonValue::Number(Number::from(*v)),
        Value::Int32(v) => JsonValue::Number(Number::from(*v)),
        Value::Int64(v) => JsonValue::Number(Number::from(*v)),
        Value::UInt8(v) => JsonValue::Number(Number::from(*v)),
        Value::UInt16(v) => JsonValue::Number(Number::from(*v)),
        Value::UInt32(v) => JsonValue::Number(Number::from(*v)),
        Value::UInt64(v) => JsonValue::Number(Number::from(*v)),
        Value::Float32(v) => float_member(f64::from(*v))?,
        Value::Float64(v) => float_member(*v)?,
        Value::String(v) => JsonValue::String(v.clone()),
        Value::Bytes(v) => JsonValue::String(base64::encode(v)),
        Value::Sequence(elems) => {
            let mut members = Vec::with_capacity(elems.len());
            for elem in elems {
                members.push(json_value(elem)?);
            }
            JsonValue::Array(members)
        }
        Value::Message(_) => {
            return Err(FormatError::malformed(
                "json",
                "message value outside nested traversal",
            ))
        }
    };
    Ok(member)
}

fn float_member(value: f64) -> FormatResult<JsonValue> {
    Number::from_f64(value)
        .map(JsonValue::Number)
        .ok_or_else(|| FormatError::malformed("json", "float not representable as JSON number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::descriptor::SchemaSet;
    use crate::schema::parser::parse_schema;
    use serde_json::json;
    use std::sync::Arc;

    fn scope_of(text: &str) -> Arc<SchemaSet> {
        Arc::new(parse_schema(text).unwrap())
    }

    fn encode_json(message: &GenericMessage) -> JsonValue {
        serde_json::from_slice(&JsonEncoder::encode(message).unwrap()).unwrap()
    }

    #[test]
    fn test_encode_point_object() {
        let scope = scope_of(
            r#"
            message geo.Point [id = 19] {
                float x = 1;
                float y = 2;
            }
        "#,
        );
        let mut point = GenericMessage::by_name(&scope, "geo.Point").unwrap();
        point.set(1, Value::Float32(1.5)).unwrap();
        point.set(2, Value::Float32(-2.0)).unwrap();

        assert_eq!(encode_json(&point), json!({"x": 1.5, "y": -2.0}));
    }

    #[test]
    fn test_absent_fields_omitted() {
        let scope = scope_of(
            r#"
            message t.Pair [id = 1] {
                int32 a = 1;
                int32 b = 2;
            }
        "#,
        );
        let mut pair = GenericMessage::by_name(&scope, "t.Pair").unwrap();
        pair.set(2, Value::Int32(7)).unwrap();

        assert_eq!(encode_json(&pair), json!({"b": 7}));
    }

    #[test]
    fn test_bytes_become_base64_member() {
        let scope = scope_of("message t.Blob [id = 1] { bytes data = 1; }");
        let mut blob = GenericMessage::by_name(&scope, "t.Blob").unwrap();
        blob.set(1, Value::Bytes(vec![1, 2, 3])).unwrap();

        assert_eq!(encode_json(&blob), json!({"data": "AQID"}));
    }

    #[test]
    fn test_char_is_one_character_string() {
        let scope = scope_of("message t.Cell [id = 1] { char tag = 1; }");
        let mut cell = GenericMessage::by_name(&scope, "t.Cell").unwrap();
        cell.set(1, Value::Char('A')).unwrap();

        assert_eq!(encode_json(&cell), json!({"tag": "A"}));
    }

    #[test]
    fn test_nested_message_and_sequence() {
        let scope = scope_of(
            r#"
            message geo.Point [id = 19] {
                float x = 1;
            }
            message geo.Track [id = 20] {
                geo.Point origin = 1;
                repeated geo.Point points = 2;
                repeated int32 codes = 3;
            }
        "#,
        );
        let mut origin = GenericMessage::by_name(&scope, "geo.Point").unwrap();
        origin.set(1, Value::Float32(0.5)).unwrap();
        let mut first = GenericMessage::by_name(&scope, "geo.Point").unwrap();
        first.set(1, Value::Float32(1.0)).unwrap();
        let mut second = GenericMessage::by_name(&scope, "geo.Point").unwrap();
        second.set(1, Value::Float32(2.0)).unwrap();

        let mut track = GenericMessage::by_name(&scope, "geo.Track").unwrap();
        track.set(1, Value::Message(origin)).unwrap();
        track
            .set(
                2,
                Value::Sequence(vec![Value::Message(first), Value::Message(second)]),
            )
            .unwrap();
        track
            .set(3, Value::Sequence(vec![Value::Int32(-1), Value::Int32(2)]))
            .unwrap();

        assert_eq!(
            encode_json(&track),
            json!({
                "origin": {"x": 0.5},
                "points": [{"x": 1.0}, {"x": 2.0}],
                "codes": [-1, 2],
            })
        );
    }

    #[test]
    fn test_empty_sequence_is_empty_array() {
        let scope = scope_of("message t.Row [id = 1] { repeated int16 cells = 1; }");
        let mut row = GenericMessage::by_name(&scope, "t.Row").unwrap();
        row.set(1, Value::Sequence(Vec::new())).unwrap();

        assert_eq!(encode_json(&row), json!({"cells": []}));
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let scope = scope_of("message t.Gauge [id = 1] { double r = 1; }");
        let mut gauge = GenericMessage::by_name(&scope, "t.Gauge").unwrap();
        gauge.set(1, Value::Float64(f64::NAN)).unwrap();

        let err = JsonEncoder::encode(&gauge).unwrap_err();
        assert!(err.to_string().contains("not representable"));
    }

    #[test]
    fn test_large_integers_survive() {
        let scope = scope_of(
            r#"
            message t.Wide [id = 1] {
                uint64 stamp = 1;
                int64 offset = 2;
            }
        "#,
        );
        let mut wide = GenericMessage::by_name(&scope, "t.Wide").unwrap();
        wide.set(1, Value::UInt64(u64::MAX)).unwrap();
        wide.set(2, Value::Int64(i64::MIN)).unwrap();

        assert_eq!(
            encode_json(&wide),
            json!({"stamp": u64::MAX, "offset": i64::MIN})
        );
    }
}
