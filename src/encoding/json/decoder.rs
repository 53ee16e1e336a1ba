// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON decoder.
//!
//! Parses the payload into a `serde_json::Value` tree and matches
//! descriptor fields by name. Unknown members are ignored and `null`
//! members leave the field absent, so readers stay compatible across
//! schema revisions in both directions.

use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

use crate::core::error::{FormatError, FormatResult};
use crate::core::message::GenericMessage;
use crate::core::value::Value;
use crate::schema::descriptor::{FieldDescriptor, FieldType, MessageDescriptor, SchemaSet};

use super::base64;

/// Decoder for JSON objects.
pub struct JsonDecoder {
    _private: (),
}

impl JsonDecoder {
    /// Create a new JSON decoder.
    pub fn new() -> Self {
        JsonDecoder { _private: () }
    }

    /// Decode a payload into a message bound to `descriptor`.
    pub fn decode(
        &self,
        data: &[u8],
        descriptor: &Arc<MessageDescriptor>,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<GenericMessage> {
        let root: JsonValue = serde_json::from_slice(data)?;
        let object = root.as_object().ok_or_else(|| {
            FormatError::malformed(
                "json",
                format!("expected object root, found {}", json_kind(&root)),
            )
        })?;
        self.decode_object(object, descriptor, scope)
    }

    fn decode_object(
        &self,
        object: &Map<String, JsonValue>,
        descriptor: &Arc<MessageDescriptor>,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<GenericMessage> {
        let mut message = GenericMessage::bind(descriptor.clone(), scope.clone());
        for field in descriptor.fields() {
            let member = match object.get(field.name()) {
                None | Some(JsonValue::Null) => continue,
                Some(member) => member,
            };
            let value = self.decode_member(member, field, field.field_type(), scope)?;
            message.set(field.id(), value)?;
        }
        Ok(message)
    }

    fn decode_member(
        &self,
        member: &JsonValue,
        field: &FieldDescriptor,
        declared: &FieldType,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<Value> {
        match declared {
            FieldType::Bool => member
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| mismatch(field, member)),
            FieldType::Char => {
                let text = member.as_str().ok_or_else(|| mismatch(field, member))?;
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(FormatError::type_mismatch(
                        "json",
                        field.name(),
                        field.field_type().schema_name(),
                        format!("string of {} characters", text.chars().count()),
                    )),
                }
            }
            FieldType::Int8 => Ok(Value::Int8(narrow(field, int_member(field, member)?)?)),
            FieldType::Int16 => Ok(Value::Int16(narrow(field, int_member(field, member)?)?)),
            FieldType::Int32 => Ok(Value::Int32(narrow(field, int_member(field, member)?)?)),
            FieldType::Int64 => Ok(Value::Int64(narrow(field, int_member(field, member)?)?)),
            FieldType::UInt8 => Ok(Value::UInt8(narrow(field, int_member(field, member)?)?)),
            FieldType::UInt16 => Ok(Value::UInt16(narrow(field, int_member(field, member)?)?)),
            FieldType::UInt32 => Ok(Value::UInt32(narrow(field, int_member(field, member)?)?)),
            FieldType::UInt64 => Ok(Value::UInt64(narrow(field, int_member(field, member)?)?)),
            FieldType::Float32 => {
                let value = member.as_f64().ok_or_else(|| mismatch(field, member))?;
                Ok(Value::Float32(value as f32))
            }
            FieldType::Float64 => {
                let value = member.as_f64().ok_or_else(|| mismatch(field, member))?;
                Ok(Value::Float64(value))
            }
            FieldType::String => member
                .as_str()
                .map(|text| Value::String(text.to_string()))
                .ok_or_else(|| mismatch(field, member)),
            FieldType::Bytes => {
                let text = member.as_str().ok_or_else(|| mismatch(field, member))?;
                base64::decode(text).map(Value::Bytes).ok_or_else(|| {
                    FormatError::malformed(
                        "json",
                        format!("invalid base64 in field '{}'", field.name()),
                    )
                })
            }
            FieldType::Message(reference) => {
                let object = member.as_object().ok_or_else(|| mismatch(field, member))?;
                let child_descriptor = scope.resolve(reference).ok_or_else(|| {
                    FormatError::unsupported_type("json", reference.qualified_name())
                })?;
                Ok(Value::Message(self.decode_object(
                    object,
                    child_descriptor,
                    scope,
                )?))
            }
            FieldType::Sequence(element) => {
                let members = member.as_array().ok_or_else(|| mismatch(field, member))?;
                let mut elements = Vec::with_capacity(members.len());
                for elem in members {
                    elements.push(self.decode_member(elem, field, element, scope)?);
                }
                Ok(Value::Sequence(elements))
            }
        }
    }
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer member widened so every `i64` and `u64` JSON number fits.
fn int_member(field: &FieldDescriptor, member: &JsonValue) -> FormatResult<i128> {
    if let Some(value) = member.as_i64() {
        Ok(i128::from(value))
    } else if let Some(value) = member.as_u64() {
        Ok(i128::from(value))
    } else {
        Err(mismatch(field, member))
    }
}

fn narrow<T: TryFrom<i128>>(field: &FieldDescriptor, raw: i128) -> FormatResult<T> {
    T::try_from(raw).map_err(|_| {
        FormatError::type_mismatch(
            "json",
            field.name(),
            field.field_type().schema_name(),
            format!("number {raw}"),
        )
    })
}

fn json_kind(member: &JsonValue) -> &'static str {
    match member {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn mismatch(field: &FieldDescriptor, member: &JsonValue) -> FormatError {
    FormatError::type_mismatch(
        "json",
        field.name(),
        field.field_type().schema_name(),
        json_kind(member),
    )
}
