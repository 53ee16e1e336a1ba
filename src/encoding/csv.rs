// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CSV exporter.
//!
//! Flattens present scalar fields into delimited rows, one row per
//! appended message. Nested message fields contribute dot-prefixed
//! columns (`frame.x`), bytes and sequence fields are not flattenable
//! and contribute none. Encode-only.

use std::sync::Arc;

use crate::core::error::{FormatError, FormatResult};
use crate::core::message::GenericMessage;
use crate::core::value::Value;
use crate::schema::descriptor::{FieldType, MessageDescriptor, SchemaSet};

/// Row-oriented encoder for spreadsheet-style exports.
///
/// The header is derived from the first appended message's descriptor
/// and emitted once. Every later message must bind the same descriptor
/// so columns stay aligned.
pub struct CsvEncoder {
    delimiter: char,
    with_header: bool,
    bound: Option<String>,
    wrote_header: bool,
    output: String,
}

impl CsvEncoder {
    /// Create an encoder with the default `;` delimiter and a header row.
    pub fn new() -> Self {
        Self::with_options(';', true)
    }

    /// Create an encoder with an explicit delimiter and header switch.
    pub fn with_options(delimiter: char, with_header: bool) -> Self {
        CsvEncoder {
            delimiter,
            with_header,
            bound: None,
            wrote_header: false,
            output: String::new(),
        }
    }

    /// Append one message as a row, writing the header first if enabled.
    pub fn append(&mut self, message: &GenericMessage) -> FormatResult<()> {
        let descriptor = message.descriptor();
        let scope = message.scope();
        match &self.bound {
            Some(bound) if bound != descriptor.qualified_name() => {
                return Err(FormatError::schema_mismatch(
                    "csv",
                    bound.clone(),
                    descriptor.qualified_name(),
                ));
            }
            Some(_) => {}
            None => self.bound = Some(descriptor.qualified_name().to_string()),
        }

        if self.with_header && !self.wrote_header {
            let mut names = Vec::new();
            columns(descriptor, scope, "", &mut names)?;
            self.write_row(&names);
            self.wrote_header = true;
        }

        let mut cells = Vec::new();
        row_cells(Some(message), descriptor, scope, &mut cells)?;
        self.write_row(&cells);
        Ok(())
    }

    /// The accumulated rows.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Drop accumulated rows and rebind on the next `append`.
    pub fn clear(&mut self) {
        self.output.clear();
        self.bound = None;
        self.wrote_header = false;
    }

    fn write_row(&mut self, cells: &[String]) {
        for cell in cells {
            self.output.push_str(cell);
            self.output.push(self.delimiter);
        }
        self.output.push('\n');
    }
}

impl Default for CsvEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect flattenable column names in declaration order.
fn columns(
    descriptor: &Arc<MessageDescriptor>,
    scope: &Arc<SchemaSet>,
    prefix: &str,
    names: &mut Vec<String>,
) -> FormatResult<()> {
    for field in descriptor.fields() {
        match field.field_type() {
            FieldType::Bytes | FieldType::Sequence(_) => continue,
            FieldType::Message(reference) => {
                let child = scope.resolve(reference).ok_or_else(|| {
                    FormatError::unsupported_type("csv", reference.qualified_name())
                })?;
                columns(child, scope, &format!("{prefix}{}.", field.name()), names)?;
            }
            _ => names.push(format!("{prefix}{}", field.name())),
        }
    }
    Ok(())
}

/// Collect one cell per column; `None` fills a whole absent subtree with
/// empty cells so rows stay aligned.
fn row_cells(
    message: Option<&GenericMessage>,
    descriptor: &Arc<MessageDescriptor>,
    scope: &Arc<SchemaSet>,
    cells: &mut Vec<String>,
) -> FormatResult<()> {
    for field in descriptor.fields() {
        match field.field_type() {
            FieldType::Bytes | FieldType::Sequence(_) => continue,
            FieldType::Message(reference) => {
                let child = scope.resolve(reference).ok_or_else(|| {
                    FormatError::unsupported_type("csv", reference.qualified_name())
                })?;
                let nested = message
                    .and_then(|m| m.get(field.id()))
                    .and_then(|value| match value {
                        Value::Message(inner) => Some(inner),
                        _ => None,
                    });
                row_cells(nested, child, scope, cells)?;
            }
            _ => cells.push(match message.and_then(|m| m.get(field.id())) {
                Some(value) => scalar_cell(value),
                None => String::new(),
            }),
        }
    }
    Ok(())
}

fn scalar_cell(value: &Value) -> String {
    match value {
        Value::Bool(v) => v.to_string(),
        Value::Char(v) => v.to_string(),
        Value::Int8(v) => v.to_string(),
        Value::Int16(v) => v.to_string(),
        Value::Int32(v) => v.to_string(),
        Value::Int64(v) => v.to_string(),
        Value::UInt8(v) => v.to_string(),
        Value::UInt16(v) => v.to_string(),
        Value::UInt32(v) => v.to_string(),
        Value::UInt64(v) => v.to_string(),
        Value::Float32(v) => v.to_string(),
        Value::Float64(v) => v.to_string(),
        Value::String(v) => v.clone(),
        // set() keeps composites out of scalar fields.
        Value::Bytes(_) | Value::Sequence(_) | Value::Message(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parser::parse_schema;

    fn scope_of(text: &str) -> Arc<SchemaSet> {
        Arc::new(parse_schema(text).unwrap())
    }

    #[test]
    fn test_rows_with_header() {
        let scope = scope_of(
            r#"
            message geo.Point [id = 19] {
                float x = 1;
                float y = 2;
            }
        "#,
        );
        let mut first = GenericMessage::by_name(&scope, "geo.Point").unwrap();
        first.set(1, Value::Float32(1.5)).unwrap();
        first.set(2, Value::Float32(-2.0)).unwrap();
        let mut second = GenericMessage::by_name(&scope, "geo.Point").unwrap();
        second.set(1, Value::Float32(3.25)).unwrap();
        second.set(2, Value::Float32(4.0)).unwrap();

        let mut encoder = CsvEncoder::new();
        encoder.append(&first).unwrap();
        encoder.append(&second).unwrap();
        assert_eq!(encoder.output(), "x;y;\n1.5;-2;\n3.25;4;\n");
    }

    #[test]
    fn test_nested_fields_dot_prefixed() {
        let scope = scope_of(
            r#"
            message geo.Point [id = 19] {
                float x = 1;
                float y = 2;
            }
            message geo.Pose [id = 20] {
                geo.Point frame = 1;
                uint32 stamp = 2;
            }
        "#,
        );
        let mut frame = GenericMessage::by_name(&scope, "geo.Point").unwrap();
        frame.set(1, Value::Float32(1.0)).unwrap();
        frame.set(2, Value::Float32(2.0)).unwrap();
        let mut pose = GenericMessage::by_name(&scope, "geo.Pose").unwrap();
        pose.set(1, Value::Message(frame)).unwrap();
        pose.set(2, Value::UInt32(7)).unwrap();

        let mut encoder = CsvEncoder::new();
        encoder.append(&pose).unwrap();
        assert_eq!(encoder.output(), "frame.x;frame.y;stamp;\n1;2;7;\n");
    }

    #[test]
    fn test_absent_fields_leave_cells_empty() {
        let scope = scope_of(
            r#"
            message t.Row [id = 1] {
                int32 a = 1;
                int32 b = 2;
                string note = 3;
            }
        "#,
        );
        let mut row = GenericMessage::by_name(&scope, "t.Row").unwrap();
        row.set(1, Value::Int32(5)).unwrap();
        row.set(3, Value::String("ok".to_string())).unwrap();

        let mut encoder = CsvEncoder::new();
        encoder.append(&row).unwrap();
        assert_eq!(encoder.output(), "a;b;note;\n5;;ok;\n");
    }

    #[test]
    fn test_absent_nested_block_keeps_alignment() {
        let scope = scope_of(
            r#"
            message geo.Point [id = 19] {
                float x = 1;
                float y = 2;
            }
            message geo.Pose [id = 20] {
                geo.Point frame = 1;
                uint32 stamp = 2;
            }
        "#,
        );
        let mut pose = GenericMessage::by_name(&scope, "geo.Pose").unwrap();
        pose.set(2, Value::UInt32(7)).unwrap();

        let mut encoder = CsvEncoder::new();
        encoder.append(&pose).unwrap();
        assert_eq!(encoder.output(), "frame.x;frame.y;stamp;\n;;7;\n");
    }

    #[test]
    fn test_bytes_and_sequences_skipped() {
        let scope = scope_of(
            r#"
            message t.Sample [id = 1] {
                bytes blob = 1;
                repeated int32 weights = 2;
                int32 count = 3;
            }
        "#,
        );
        let mut sample = GenericMessage::by_name(&scope, "t.Sample").unwrap();
        sample.set(1, Value::Bytes(vec![1, 2])).unwrap();
        sample
            .set(2, Value::Sequence(vec![Value::Int32(9)]))
            .unwrap();
        sample.set(3, Value::Int32(4)).unwrap();

        let mut encoder = CsvEncoder::new();
        encoder.append(&sample).unwrap();
        assert_eq!(encoder.output(), "count;\n4;\n");
    }

    #[test]
    fn test_custom_delimiter_without_header() {
        let scope = scope_of("message t.Pair [id = 1] { int32 a = 1; int32 b = 2; }");
        let mut pair = GenericMessage::by_name(&scope, "t.Pair").unwrap();
        pair.set(1, Value::Int32(1)).unwrap();
        pair.set(2, Value::Int32(2)).unwrap();

        let mut encoder = CsvEncoder::with_options(',', false);
        encoder.append(&pair).unwrap();
        assert_eq!(encoder.output(), "1,2,\n");
    }

    #[test]
    fn test_strings_written_verbatim() {
        let scope = scope_of("message t.Note [id = 1] { string text = 1; }");
        let mut note = GenericMessage::by_name(&scope, "t.Note").unwrap();
        note.set(1, Value::String("hello world".to_string())).unwrap();

        let mut encoder = CsvEncoder::new();
        encoder.append(&note).unwrap();
        assert_eq!(encoder.output(), "text;\nhello world;\n");
    }

    #[test]
    fn test_append_rejects_other_descriptor() {
        let scope = scope_of(
            r#"
            message t.A [id = 1] { int32 a = 1; }
            message t.B [id = 2] { int32 b = 1; }
        "#,
        );
        let mut a = GenericMessage::by_name(&scope, "t.A").unwrap();
        a.set(1, Value::Int32(1)).unwrap();
        let b = GenericMessage::by_name(&scope, "t.B").unwrap();

        let mut encoder = CsvEncoder::new();
        encoder.append(&a).unwrap();
        let err = encoder.append(&b).unwrap_err();
        assert!(matches!(err, FormatError::SchemaMismatch { format: "csv", .. }));
    }

    #[test]
    fn test_clear_resets_header_and_binding() {
        let scope = scope_of("message t.A [id = 1] { int32 a = 1; }");
        let mut a = GenericMessage::by_name(&scope, "t.A").unwrap();
        a.set(1, Value::Int32(1)).unwrap();

        let mut encoder = CsvEncoder::new();
        encoder.append(&a).unwrap();
        encoder.clear();
        assert_eq!(encoder.output(), "");

        encoder.append(&a).unwrap();
        assert_eq!(encoder.output(), "a;\n1;\n");
    }

    #[test]
    fn test_bool_and_char_cells() {
        let scope = scope_of("message t.Cell [id = 1] { bool live = 1; char grade = 2; }");
        let mut cell = GenericMessage::by_name(&scope, "t.Cell").unwrap();
        cell.set(1, Value::Bool(true)).unwrap();
        cell.set(2, Value::Char('A')).unwrap();

        let mut encoder = CsvEncoder::new();
        encoder.append(&cell).unwrap();
        assert_eq!(encoder.output(), "live;grade;\ntrue;A;\n");
    }
}
