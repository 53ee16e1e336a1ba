// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema text regeneration.
//!
//! [`SchemaWriter`] renders descriptors back to the schema language.
//! Output reparses to structurally identical descriptors, so a schema can
//! travel alongside the payloads it describes.

use crate::core::value::Value;
use crate::schema::descriptor::{FieldDescriptor, MessageDescriptor, SchemaSet};

/// Renders message descriptors as schema text, encode-only.
#[derive(Debug, Default)]
pub struct SchemaWriter {
    out: String,
}

impl SchemaWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        SchemaWriter::default()
    }

    /// Append one message block. Consecutive blocks are separated by a
    /// blank line.
    pub fn append(&mut self, descriptor: &MessageDescriptor) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        if descriptor.type_id() != 0 {
            self.out.push_str(&format!(
                "message {} [id = {}] {{\n",
                descriptor.qualified_name(),
                descriptor.type_id()
            ));
        } else {
            self.out
                .push_str(&format!("message {} {{\n", descriptor.qualified_name()));
        }
        for field in descriptor.fields() {
            self.append_field(field);
        }
        self.out.push_str("}\n");
    }

    /// Append every descriptor of a set in declaration order.
    pub fn append_set(&mut self, set: &SchemaSet) {
        for descriptor in set.iter() {
            self.append(descriptor);
        }
    }

    /// Schema text rendered so far.
    pub fn output(&self) -> &str {
        &self.out
    }

    /// Discard the rendered text.
    pub fn clear(&mut self) {
        self.out.clear();
    }

    fn append_field(&mut self, field: &FieldDescriptor) {
        self.out.push_str(&format!(
            "    {} {} = {}",
            field.field_type().schema_name(),
            field.name(),
            field.id()
        ));
        if let Some(literal) = field.default().and_then(render_literal) {
            self.out.push_str(&format!(" default {literal}"));
        }
        if !field.annotations().is_empty() {
            let rendered: Vec<String> = field
                .annotations()
                .iter()
                .map(|(key, value)| format!("{key} = {value}"))
                .collect();
            self.out.push_str(&format!(" [{}]", rendered.join(", ")));
        }
        self.out.push_str(";\n");
    }
}

/// Render a default value as a schema literal. Types the language cannot
/// express a default for yield `None` and the clause is omitted.
fn render_literal(value: &Value) -> Option<String> {
    match value {
        Value::Bool(v) => Some(v.to_string()),
        Value::Char(v) => Some(format!("'{v}'")),
        Value::Int8(v) => Some(v.to_string()),
        Value::Int16(v) => Some(v.to_string()),
        Value::Int32(v) => Some(v.to_string()),
        Value::Int64(v) => Some(v.to_string()),
        Value::UInt8(v) => Some(v.to_string()),
        Value::UInt16(v) => Some(v.to_string()),
        Value::UInt32(v) => Some(v.to_string()),
        Value::UInt64(v) => Some(v.to_string()),
        Value::Float32(v) => Some(v.to_string()),
        Value::Float64(v) => Some(v.to_string()),
        Value::String(v) => Some(format!("\"{v}\"")),
        Value::Bytes(_) | Value::Message(_) | Value::Sequence(_) => None,
    }
}
