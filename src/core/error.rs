// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for buscodec.
//!
//! Errors are split along the three failure domains of the crate:
//! - Schema text parsing and validation ([`SchemaError`])
//! - Value binding against a descriptor ([`TypeMismatch`])
//! - Wire encoding and decoding ([`FormatError`])

use std::fmt;

/// Errors that can occur while parsing schema text into descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Schema text violates the grammar
    Syntax {
        /// Line of the offending token (1-based)
        line: usize,
        /// Column of the offending token (1-based)
        column: usize,
        /// Error message
        message: String,
    },

    /// Two fields of one message carry the same numeric id
    DuplicateFieldId {
        /// Message that declares both fields
        message_name: String,
        /// Name of the later of the two fields
        field_name: String,
        /// The contested id
        field_id: u32,
    },

    /// Two fields of one message carry the same name
    DuplicateFieldName {
        /// Message that declares both fields
        message_name: String,
        /// The contested name
        field_name: String,
    },

    /// Two messages of one unit carry the same numeric id
    DuplicateMessageId {
        /// Name of the later of the two messages
        message_name: String,
        /// The contested id
        message_id: i32,
    },

    /// Two messages of one unit carry the same qualified name
    DuplicateMessageName {
        /// The contested name
        message_name: String,
    },

    /// A message-typed field names a type absent from the unit and its scope
    UnresolvedType {
        /// Message that declares the field
        message_name: String,
        /// Field with the dangling reference
        field_name: String,
        /// The name that did not resolve
        type_name: String,
    },
}

impl SchemaError {
    /// Create a syntax error at a source position.
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        SchemaError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a duplicate field id error.
    pub fn duplicate_field_id(
        message_name: impl Into<String>,
        field_name: impl Into<String>,
        field_id: u32,
    ) -> Self {
        SchemaError::DuplicateFieldId {
            message_name: message_name.into(),
            field_name: field_name.into(),
            field_id,
        }
    }

    /// Create a duplicate field name error.
    pub fn duplicate_field_name(
        message_name: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        SchemaError::DuplicateFieldName {
            message_name: message_name.into(),
            field_name: field_name.into(),
        }
    }

    /// Create a duplicate message id error.
    pub fn duplicate_message_id(message_name: impl Into<String>, message_id: i32) -> Self {
        SchemaError::DuplicateMessageId {
            message_name: message_name.into(),
            message_id,
        }
    }

    /// Create a duplicate message name error.
    pub fn duplicate_message_name(message_name: impl Into<String>) -> Self {
        SchemaError::DuplicateMessageName {
            message_name: message_name.into(),
        }
    }

    /// Create an unresolved type error.
    pub fn unresolved_type(
        message_name: impl Into<String>,
        field_name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        SchemaError::UnresolvedType {
            message_name: message_name.into(),
            field_name: field_name.into(),
            type_name: type_name.into(),
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            SchemaError::Syntax {
                line,
                column,
                message,
            } => vec![
                ("line", line.to_string()),
                ("column", column.to_string()),
                ("message", message.clone()),
            ],
            SchemaError::DuplicateFieldId {
                message_name,
                field_name,
                field_id,
            } => vec![
                ("message", message_name.clone()),
                ("field", field_name.clone()),
                ("id", field_id.to_string()),
            ],
            SchemaError::DuplicateFieldName {
                message_name,
                field_name,
            } => vec![
                ("message", message_name.clone()),
                ("field", field_name.clone()),
            ],
            SchemaError::DuplicateMessageId {
                message_name,
                message_id,
            } => vec![
                ("message", message_name.clone()),
                ("id", message_id.to_string()),
            ],
            SchemaError::DuplicateMessageName { message_name } => {
                vec![("message", message_name.clone())]
            }
            SchemaError::UnresolvedType {
                message_name,
                field_name,
                type_name,
            } => vec![
                ("message", message_name.clone()),
                ("field", field_name.clone()),
                ("type", type_name.clone()),
            ],
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Syntax {
                line,
                column,
                message,
            } => {
                write!(f, "Syntax error at line {line}, column {column}: {message}")
            }
            SchemaError::DuplicateFieldId {
                message_name,
                field_name,
                field_id,
            } => write!(
                f,
                "Duplicate field id {field_id} on '{field_name}' in message '{message_name}'"
            ),
            SchemaError::DuplicateFieldName {
                message_name,
                field_name,
            } => write!(
                f,
                "Duplicate field name '{field_name}' in message '{message_name}'"
            ),
            SchemaError::DuplicateMessageId {
                message_name,
                message_id,
            } => write!(
                f,
                "Duplicate message id {message_id} on message '{message_name}'"
            ),
            SchemaError::DuplicateMessageName { message_name } => {
                write!(f, "Duplicate message name '{message_name}'")
            }
            SchemaError::UnresolvedType {
                message_name,
                field_name,
                type_name,
            } => write!(
                f,
                "Unresolved type '{type_name}' on field '{field_name}' in message '{message_name}'"
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema parsing operations.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// A value whose runtime kind does not match the declared field type.
///
/// Returned when a caller binds a value a descriptor cannot hold, for
/// example a string handed to an `int32` field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("type mismatch on field '{field_name}' (id {field_id}): expected {expected}, got {found}")]
pub struct TypeMismatch {
    /// Numeric id of the rejected field
    pub field_id: u32,
    /// Name of the rejected field
    pub field_name: String,
    /// Declared type, rendered in schema syntax
    pub expected: String,
    /// Kind of the rejected value
    pub found: String,
}

impl TypeMismatch {
    /// Create a type mismatch error.
    pub fn new(
        field_id: u32,
        field_name: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        TypeMismatch {
            field_id,
            field_name: field_name.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("field", self.field_name.clone()),
            ("id", self.field_id.to_string()),
            ("expected", self.expected.clone()),
            ("found", self.found.clone()),
        ]
    }
}

/// Errors that can occur while encoding or decoding wire bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Truncated or structurally invalid byte stream
    Malformed {
        /// Wire format being read or written (e.g., "proto", "lcm")
        format: &'static str,
        /// Error message
        message: String,
    },

    /// Payload was produced from a different schema than the decoder holds
    SchemaMismatch {
        /// Wire format being read
        format: &'static str,
        /// Identity the decoder expected
        expected: String,
        /// Identity found in the stream
        found: String,
    },

    /// Wire content disagrees with the declared type of a field
    TypeMismatch {
        /// Wire format being read
        format: &'static str,
        /// Field whose content disagreed
        field_name: String,
        /// Declared type, rendered in schema syntax
        declared: String,
        /// What the stream actually carried
        found: String,
    },

    /// Declared type has no representation in the requested format
    UnsupportedType {
        /// Wire format that lacks the representation
        format: &'static str,
        /// The unrepresentable type
        type_name: String,
    },
}

impl FormatError {
    /// Create a malformed stream error.
    pub fn malformed(format: &'static str, message: impl Into<String>) -> Self {
        FormatError::Malformed {
            format,
            message: message.into(),
        }
    }

    /// Create a schema mismatch error.
    pub fn schema_mismatch(
        format: &'static str,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        FormatError::SchemaMismatch {
            format,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a wire type mismatch error.
    pub fn type_mismatch(
        format: &'static str,
        field_name: impl Into<String>,
        declared: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        FormatError::TypeMismatch {
            format,
            field_name: field_name.into(),
            declared: declared.into(),
            found: found.into(),
        }
    }

    /// Create an unsupported type error.
    pub fn unsupported_type(format: &'static str, type_name: impl Into<String>) -> Self {
        FormatError::UnsupportedType {
            format,
            type_name: type_name.into(),
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            FormatError::Malformed { format, message } => {
                vec![("format", format.to_string()), ("message", message.clone())]
            }
            FormatError::SchemaMismatch {
                format,
                expected,
                found,
            } => vec![
                ("format", format.to_string()),
                ("expected", expected.clone()),
                ("found", found.clone()),
            ],
            FormatError::TypeMismatch {
                format,
                field_name,
                declared,
                found,
            } => vec![
                ("format", format.to_string()),
                ("field", field_name.clone()),
                ("declared", declared.clone()),
                ("found", found.clone()),
            ],
            FormatError::UnsupportedType { format, type_name } => vec![
                ("format", format.to_string()),
                ("type", type_name.clone()),
            ],
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Malformed { format, message } => {
                write!(f, "Malformed {format} stream: {message}")
            }
            FormatError::SchemaMismatch {
                format,
                expected,
                found,
            } => write!(
                f,
                "Schema mismatch in {format} stream: expected {expected}, found {found}"
            ),
            FormatError::TypeMismatch {
                format,
                field_name,
                declared,
                found,
            } => write!(
                f,
                "Wire type mismatch on field '{field_name}' in {format} stream: declared '{declared}', found {found}"
            ),
            FormatError::UnsupportedType { format, type_name } => {
                write!(f, "Type '{type_name}' has no {format} representation")
            }
        }
    }
}

impl std::error::Error for FormatError {}

impl From<TypeMismatch> for FormatError {
    fn from(err: TypeMismatch) -> Self {
        FormatError::TypeMismatch {
            format: "binding",
            field_name: err.field_name,
            declared: err.expected,
            found: err.found,
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        FormatError::Malformed {
            format: "json",
            message: err.to_string(),
        }
    }
}

/// Result type for wire encode/decode operations.
pub type FormatResult<T> = std::result::Result<T, FormatError>;
