// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message schema language parser using Pest.
//!
//! Parsing runs in two passes. The grammar walk collects raw message and
//! field declarations, then the build pass assigns field ids, checks
//! uniqueness, types default literals, and resolves message-typed fields
//! against the unit itself and an optional ambient scope. Forward
//! references within a unit are allowed.

use pest::error::LineColLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use tracing::debug;

use crate::core::error::{SchemaError, SchemaResult};
use crate::core::value::Value;
use crate::schema::descriptor::{
    FieldDescriptor, FieldType, MessageDescriptor, SchemaSet, TypeRef,
};

/// Pest parser for message schema files.
#[derive(Parser)]
#[grammar = "schema/parser/schema.pest"] // Path relative to src/ directory
pub struct SchemaParser;

/// Parse a schema unit into a validated [`SchemaSet`].
pub fn parse_schema(text: &str) -> SchemaResult<SchemaSet> {
    parse_schema_with_scope(text, &SchemaSet::default())
}

/// Parse a schema unit extending an ambient scope.
///
/// Message-typed fields may reference messages declared in the scope; the
/// returned table contains the scope's descriptors followed by the unit's.
pub fn parse_schema_with_scope(text: &str, scope: &SchemaSet) -> SchemaResult<SchemaSet> {
    let mut pairs = SchemaParser::parse(Rule::schema_file, text).map_err(syntax_error)?;

    let mut package: Option<String> = None;
    let mut imports: Vec<String> = Vec::new();
    let mut raw_messages: Vec<RawMessage> = Vec::new();

    if let Some(file) = pairs.next() {
        for item in file.into_inner() {
            match item.as_rule() {
                Rule::package_decl => package = Some(inner_name(item)),
                Rule::import_decl => imports.push(inner_name(item)),
                Rule::message_decl => {
                    raw_messages.push(collect_message(item, package.as_deref())?)
                }
                Rule::EOI => {}
                _ => {}
            }
        }
    }

    // Name/id pairs of the unit itself, so fields can reference messages
    // declared later in the same text.
    let local: Vec<(String, i32)> = raw_messages
        .iter()
        .map(|m| (m.qualified_name.clone(), m.type_id))
        .collect();

    let mut descriptors = Vec::with_capacity(raw_messages.len());
    for raw in &raw_messages {
        descriptors.push(build_message(raw, package.as_deref(), &local, scope)?);
    }

    debug!(
        context = "schema",
        messages = descriptors.len(),
        imports = imports.len(),
        "parsed schema unit"
    );

    Ok(SchemaSet::with_scope(scope, descriptors)?.with_imports(imports))
}

// ============================================================================
// Grammar walk
// ============================================================================

struct RawMessage {
    qualified_name: String,
    type_id: i32,
    fields: Vec<RawField>,
}

struct RawField {
    repeated: bool,
    type_text: String,
    scalar: Option<FieldType>,
    name: String,
    explicit_id: Option<u32>,
    default: Option<RawLiteral>,
    annotations: Vec<(String, String)>,
}

struct RawLiteral {
    kind: LiteralKind,
    line: usize,
    column: usize,
}

enum LiteralKind {
    Int(i128),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
}

fn syntax_error(error: pest::error::Error<Rule>) -> SchemaError {
    let (line, column) = match error.line_col {
        LineColLocation::Pos((line, column)) => (line, column),
        LineColLocation::Span((line, column), _) => (line, column),
    };
    SchemaError::syntax(line, column, error.variant.message().to_string())
}

fn position(pair: &Pair<Rule>) -> (usize, usize) {
    pair.as_span().start_pos().line_col()
}

/// Extract the qualified name child of a package or import declaration.
fn inner_name(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .find(|part| part.as_rule() == Rule::qualified_name)
        .map(|part| part.as_str().to_string())
        .unwrap_or_default()
}

fn collect_message(pair: Pair<Rule>, package: Option<&str>) -> SchemaResult<RawMessage> {
    let mut name = String::new();
    let mut type_id = 0i32;
    let mut fields = Vec::new();

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::qualified_name => name = part.as_str().to_string(),
            Rule::message_options => {
                for option in part.into_inner() {
                    if option.as_rule() == Rule::natural {
                        type_id = parse_natural_i32(&option)?;
                    }
                }
            }
            Rule::field_decl => fields.push(collect_field(part)?),
            _ => {}
        }
    }

    let qualified_name = match package {
        Some(package) => format!("{package}.{name}"),
        None => name,
    };

    Ok(RawMessage {
        qualified_name,
        type_id,
        fields,
    })
}

fn collect_field(pair: Pair<Rule>) -> SchemaResult<RawField> {
    let mut field = RawField {
        repeated: false,
        type_text: String::new(),
        scalar: None,
        name: String::new(),
        explicit_id: None,
        default: None,
        annotations: Vec::new(),
    };

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::repeated_kw => field.repeated = true,
            Rule::type_name => {
                field.type_text = part.as_str().to_string();
                field.scalar = FieldType::try_from_keyword(&field.type_text);
            }
            Rule::identifier => field.name = part.as_str().to_string(),
            Rule::field_id => {
                for digits in part.into_inner() {
                    if digits.as_rule() == Rule::natural {
                        field.explicit_id = Some(parse_natural_u32(&digits)?);
                    }
                }
            }
            Rule::field_default => {
                for lit in part.into_inner() {
                    if lit.as_rule() == Rule::literal {
                        field.default = Some(collect_literal(lit)?);
                    }
                }
            }
            Rule::annotations => field.annotations = collect_annotations(part),
            _ => {}
        }
    }

    Ok(field)
}

fn collect_literal(pair: Pair<Rule>) -> SchemaResult<RawLiteral> {
    let (line, column) = position(&pair);
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| SchemaError::syntax(line, column, "empty literal"))?;

    let text = inner.as_str();
    let kind = match inner.as_rule() {
        Rule::int_lit => {
            let value = text.parse::<i128>().map_err(|_| {
                SchemaError::syntax(line, column, format!("integer literal '{text}' out of range"))
            })?;
            LiteralKind::Int(value)
        }
        Rule::float_lit => {
            let value = text.parse::<f64>().map_err(|_| {
                SchemaError::syntax(line, column, format!("malformed float literal '{text}'"))
            })?;
            LiteralKind::Float(value)
        }
        Rule::bool_lit => LiteralKind::Bool(text == "true"),
        Rule::char_lit => {
            let ch = text[1..text.len() - 1]
                .chars()
                .next()
                .ok_or_else(|| SchemaError::syntax(line, column, "empty character literal"))?;
            LiteralKind::Char(ch)
        }
        Rule::string_lit => LiteralKind::Str(text[1..text.len() - 1].to_string()),
        _ => {
            return Err(SchemaError::syntax(
                line,
                column,
                format!("unsupported literal '{text}'"),
            ))
        }
    };

    Ok(RawLiteral { kind, line, column })
}

/// Annotation values are kept as raw source text; the codecs never
/// interpret them.
fn collect_annotations(pair: Pair<Rule>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for annotation in pair.into_inner() {
        if annotation.as_rule() != Rule::annotation {
            continue;
        }
        let mut key = String::new();
        let mut value = String::new();
        for part in annotation.into_inner() {
            match part.as_rule() {
                Rule::identifier => key = part.as_str().to_string(),
                Rule::annotation_value => value = part.as_str().to_string(),
                _ => {}
            }
        }
        out.push((key, value));
    }
    out
}

fn parse_natural_i32(pair: &Pair<Rule>) -> SchemaResult<i32> {
    let (line, column) = position(pair);
    pair.as_str().parse::<i32>().map_err(|_| {
        SchemaError::syntax(
            line,
            column,
            format!("message id '{}' out of range", pair.as_str()),
        )
    })
}

fn parse_natural_u32(pair: &Pair<Rule>) -> SchemaResult<u32> {
    let (line, column) = position(pair);
    pair.as_str().parse::<u32>().map_err(|_| {
        SchemaError::syntax(
            line,
            column,
            format!("field id '{}' out of range", pair.as_str()),
        )
    })
}

// ============================================================================
// Build pass
// ============================================================================

fn build_message(
    raw: &RawMessage,
    package: Option<&str>,
    local: &[(String, i32)],
    scope: &SchemaSet,
) -> SchemaResult<MessageDescriptor> {
    let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(raw.fields.len());
    // Position counter for fields without an explicit id; an explicit id
    // does not move the counter.
    let mut counter: u32 = 0;

    for rf in &raw.fields {
        counter += 1;
        let id = rf.explicit_id.unwrap_or(counter);

        if fields.iter().any(|f| f.id() == id) {
            return Err(SchemaError::duplicate_field_id(
                raw.qualified_name.clone(),
                rf.name.clone(),
                id,
            ));
        }
        if fields.iter().any(|f| f.name() == rf.name) {
            return Err(SchemaError::duplicate_field_name(
                raw.qualified_name.clone(),
                rf.name.clone(),
            ));
        }

        let base = match &rf.scalar {
            Some(scalar) => scalar.clone(),
            None => {
                let reference =
                    resolve_type(&rf.type_text, package, local, scope).ok_or_else(|| {
                        SchemaError::unresolved_type(
                            raw.qualified_name.clone(),
                            rf.name.clone(),
                            rf.type_text.clone(),
                        )
                    })?;
                FieldType::Message(reference)
            }
        };
        let field_type = if rf.repeated {
            FieldType::Sequence(Box::new(base))
        } else {
            base
        };

        let mut descriptor = FieldDescriptor::new(id, rf.name.clone(), field_type);
        if let Some(lit) = &rf.default {
            let default = literal_to_value(descriptor.field_type(), lit)?;
            descriptor = descriptor.with_default(default);
        }
        if !rf.annotations.is_empty() {
            descriptor = descriptor.with_annotations(rf.annotations.clone());
        }
        fields.push(descriptor);
    }

    Ok(MessageDescriptor::new(
        raw.qualified_name.clone(),
        raw.type_id,
        fields,
    ))
}

/// Resolve a message type name against the unit, then the ambient scope.
///
/// A name is also tried with the unit's package prefix.
fn resolve_type(
    type_text: &str,
    package: Option<&str>,
    local: &[(String, i32)],
    scope: &SchemaSet,
) -> Option<TypeRef> {
    let mut candidates = vec![type_text.to_string()];
    if let Some(package) = package {
        candidates.push(format!("{package}.{type_text}"));
    }

    for candidate in &candidates {
        if let Some((name, id)) = local.iter().find(|(name, _)| name == candidate) {
            return Some(TypeRef::new(name.clone(), *id));
        }
        if let Some(descriptor) = scope.by_name(candidate) {
            return Some(TypeRef::new(
                descriptor.qualified_name().to_string(),
                descriptor.type_id(),
            ));
        }
    }
    None
}

fn literal_to_value(field_type: &FieldType, lit: &RawLiteral) -> SchemaResult<Value> {
    let mismatch = || {
        SchemaError::syntax(
            lit.line,
            lit.column,
            format!(
                "default literal does not fit type {}",
                field_type.schema_name()
            ),
        )
    };

    let value = match field_type {
        FieldType::Bool => match &lit.kind {
            LiteralKind::Bool(b) => Value::Bool(*b),
            _ => return Err(mismatch()),
        },
        FieldType::Char => match &lit.kind {
            LiteralKind::Char(c) if c.is_ascii() => Value::Char(*c),
            _ => return Err(mismatch()),
        },
        FieldType::Int8 => {
            Value::Int8(int_literal(lit, |v| i8::try_from(v).ok()).ok_or_else(mismatch)?)
        }
        FieldType::Int16 => {
            Value::Int16(int_literal(lit, |v| i16::try_from(v).ok()).ok_or_else(mismatch)?)
        }
        FieldType::Int32 => {
            Value::Int32(int_literal(lit, |v| i32::try_from(v).ok()).ok_or_else(mismatch)?)
        }
        FieldType::Int64 => {
            Value::Int64(int_literal(lit, |v| i64::try_from(v).ok()).ok_or_else(mismatch)?)
        }
        FieldType::UInt8 => {
            Value::UInt8(int_literal(lit, |v| u8::try_from(v).ok()).ok_or_else(mismatch)?)
        }
        FieldType::UInt16 => {
            Value::UInt16(int_literal(lit, |v| u16::try_from(v).ok()).ok_or_else(mismatch)?)
        }
        FieldType::UInt32 => {
            Value::UInt32(int_literal(lit, |v| u32::try_from(v).ok()).ok_or_else(mismatch)?)
        }
        FieldType::UInt64 => {
            Value::UInt64(int_literal(lit, |v| u64::try_from(v).ok()).ok_or_else(mismatch)?)
        }
        FieldType::Float32 => Value::Float32(float_literal(lit).ok_or_else(mismatch)? as f32),
        FieldType::Float64 => Value::Float64(float_literal(lit).ok_or_else(mismatch)?),
        FieldType::String => match &lit.kind {
            LiteralKind::Str(s) => Value::String(s.clone()),
            _ => return Err(mismatch()),
        },
        FieldType::Bytes | FieldType::Message(_) | FieldType::Sequence(_) => {
            return Err(SchemaError::syntax(
                lit.line,
                lit.column,
                format!("default not allowed for type {}", field_type.schema_name()),
            ))
        }
    };
    Ok(value)
}

fn int_literal<T>(lit: &RawLiteral, narrow: impl Fn(i128) -> Option<T>) -> Option<T> {
    match &lit.kind {
        LiteralKind::Int(v) => narrow(*v),
        _ => None,
    }
}

/// Float slots accept integer literals as well.
fn float_literal(lit: &RawLiteral) -> Option<f64> {
    match &lit.kind {
        LiteralKind::Float(v) => Some(*v),
        LiteralKind::Int(v) => Some(*v as f64),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
