// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Resolved schema descriptors.
//!
//! A parse of schema text yields a [`SchemaSet`]: an immutable table of
//! message descriptors shared for the lifetime of that schema set. A
//! message-typed field holds a [`TypeRef`] (name plus numeric id) that is
//! looked up in the table at bind time, never an ownership edge, so two
//! messages referencing each other cannot form a reference cycle.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::error::{SchemaError, SchemaResult};
use crate::core::value::Value;

/// Reference to a message type by qualified name and numeric id.
///
/// The id is 0 when the referenced message has no assigned id; resolution
/// then falls back to the qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    qualified_name: String,
    type_id: i32,
}

impl TypeRef {
    /// Create a reference to a message type.
    pub fn new(qualified_name: impl Into<String>, type_id: i32) -> Self {
        TypeRef {
            qualified_name: qualified_name.into(),
            type_id,
        }
    }

    /// Qualified name of the referenced message.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Numeric id of the referenced message, 0 if unassigned.
    pub fn type_id(&self) -> i32 {
        self.type_id
    }
}

/// Declared type of a message field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Bool,
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    Bytes,
    /// Nested message, resolved through the enclosing [`SchemaSet`]
    Message(TypeRef),
    /// Homogeneous sequence of a base type
    Sequence(Box<FieldType>),
}

impl FieldType {
    /// Parse a scalar type keyword from schema syntax.
    ///
    /// Message types and sequences are composed by the parser and have no
    /// single keyword.
    pub fn try_from_keyword(s: &str) -> Option<Self> {
        match s {
            "bool" => Some(FieldType::Bool),
            "char" => Some(FieldType::Char),
            "int8" => Some(FieldType::Int8),
            "int16" => Some(FieldType::Int16),
            "int32" => Some(FieldType::Int32),
            "int64" => Some(FieldType::Int64),
            "uint8" => Some(FieldType::UInt8),
            "uint16" => Some(FieldType::UInt16),
            "uint32" => Some(FieldType::UInt32),
            "uint64" => Some(FieldType::UInt64),
            "float" => Some(FieldType::Float32),
            "double" => Some(FieldType::Float64),
            "string" => Some(FieldType::String),
            "bytes" => Some(FieldType::Bytes),
            _ => None,
        }
    }

    /// Render the type in schema syntax.
    pub fn schema_name(&self) -> String {
        match self {
            FieldType::Bool => "bool".to_string(),
            FieldType::Char => "char".to_string(),
            FieldType::Int8 => "int8".to_string(),
            FieldType::Int16 => "int16".to_string(),
            FieldType::Int32 => "int32".to_string(),
            FieldType::Int64 => "int64".to_string(),
            FieldType::UInt8 => "uint8".to_string(),
            FieldType::UInt16 => "uint16".to_string(),
            FieldType::UInt32 => "uint32".to_string(),
            FieldType::UInt64 => "uint64".to_string(),
            FieldType::Float32 => "float".to_string(),
            FieldType::Float64 => "double".to_string(),
            FieldType::String => "string".to_string(),
            FieldType::Bytes => "bytes".to_string(),
            FieldType::Message(r) => r.qualified_name().to_string(),
            FieldType::Sequence(inner) => format!("repeated {}", inner.schema_name()),
        }
    }

    /// Check if this is a message type.
    pub fn is_message(&self) -> bool {
        matches!(self, FieldType::Message(_))
    }

    /// Check if this is a sequence type.
    pub fn is_sequence(&self) -> bool {
        matches!(self, FieldType::Sequence(_))
    }

    /// Get the element type of a sequence.
    pub fn element(&self) -> Option<&FieldType> {
        match self {
            FieldType::Sequence(inner) => Some(inner),
            _ => None,
        }
    }

    /// Get the type reference of a message type.
    pub fn message_ref(&self) -> Option<&TypeRef> {
        match self {
            FieldType::Message(r) => Some(r),
            _ => None,
        }
    }

    /// Check whether a runtime value can occupy a slot of this type.
    ///
    /// Binding is strict: no numeric widening or narrowing is applied.
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Bool, Value::Bool(_)) => true,
            (FieldType::Char, Value::Char(_)) => true,
            (FieldType::Int8, Value::Int8(_)) => true,
            (FieldType::Int16, Value::Int16(_)) => true,
            (FieldType::Int32, Value::Int32(_)) => true,
            (FieldType::Int64, Value::Int64(_)) => true,
            (FieldType::UInt8, Value::UInt8(_)) => true,
            (FieldType::UInt16, Value::UInt16(_)) => true,
            (FieldType::UInt32, Value::UInt32(_)) => true,
            (FieldType::UInt64, Value::UInt64(_)) => true,
            (FieldType::Float32, Value::Float32(_)) => true,
            (FieldType::Float64, Value::Float64(_)) => true,
            (FieldType::String, Value::String(_)) => true,
            (FieldType::Bytes, Value::Bytes(_)) => true,
            (FieldType::Message(r), Value::Message(m)) => {
                m.descriptor().qualified_name() == r.qualified_name()
            }
            (FieldType::Sequence(inner), Value::Sequence(elems)) => {
                elems.iter().all(|e| inner.admits(e))
            }
            _ => false,
        }
    }

    /// Zero value for this type, used when a format needs a concrete value
    /// for an absent field.
    ///
    /// Message types have no free-standing zero value; their empty instance
    /// is built against the enclosing schema set instead.
    pub fn zero_value(&self) -> Option<Value> {
        match self {
            FieldType::Bool => Some(Value::Bool(false)),
            FieldType::Char => Some(Value::Char('\0')),
            FieldType::Int8 => Some(Value::Int8(0)),
            FieldType::Int16 => Some(Value::Int16(0)),
            FieldType::Int32 => Some(Value::Int32(0)),
            FieldType::Int64 => Some(Value::Int64(0)),
            FieldType::UInt8 => Some(Value::UInt8(0)),
            FieldType::UInt16 => Some(Value::UInt16(0)),
            FieldType::UInt32 => Some(Value::UInt32(0)),
            FieldType::UInt64 => Some(Value::UInt64(0)),
            FieldType::Float32 => Some(Value::Float32(0.0)),
            FieldType::Float64 => Some(Value::Float64(0.0)),
            FieldType::String => Some(Value::String(String::new())),
            FieldType::Bytes => Some(Value::Bytes(Vec::new())),
            FieldType::Message(_) => None,
            FieldType::Sequence(_) => Some(Value::Sequence(Vec::new())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.schema_name())
    }
}

/// One field of a message descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    id: u32,
    name: String,
    field_type: FieldType,
    default: Option<Value>,
    annotations: Vec<(String, String)>,
}

impl FieldDescriptor {
    /// Create a field descriptor without a declared default.
    pub fn new(id: u32, name: impl Into<String>, field_type: FieldType) -> Self {
        FieldDescriptor {
            id,
            name: name.into(),
            field_type,
            default: None,
            annotations: Vec::new(),
        }
    }

    /// Attach a declared default value.
    ///
    /// The parser guarantees the default matches the declared type.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Attach free-form annotations from the field's bracket block.
    pub fn with_annotations(mut self, annotations: Vec<(String, String)>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Numeric id, unique within the enclosing message.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Field name, unique within the enclosing message.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Declared default value, if any.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Free-form annotations, uninterpreted by the codecs.
    pub fn annotations(&self) -> &[(String, String)] {
        &self.annotations
    }

    /// Value a format should substitute when this field is absent: the
    /// declared default, else the type's zero value.
    pub fn fill_value(&self) -> Option<Value> {
        match &self.default {
            Some(v) => Some(v.clone()),
            None => self.field_type.zero_value(),
        }
    }
}

/// Immutable definition of one message type.
///
/// Identity is the pair (qualified name, numeric type id). Field order is
/// declaration order from the schema text and fixes traversal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDescriptor {
    qualified_name: String,
    type_id: i32,
    fields: Vec<FieldDescriptor>,
}

impl MessageDescriptor {
    /// Create a message descriptor.
    ///
    /// Field id and name uniqueness is enforced by the parser before
    /// descriptors are constructed.
    pub fn new(qualified_name: impl Into<String>, type_id: i32, fields: Vec<FieldDescriptor>) -> Self {
        MessageDescriptor {
            qualified_name: qualified_name.into(),
            type_id,
            fields,
        }
    }

    /// Package-qualified message name (e.g., "geo.Point").
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Name segment after the last '.', or the whole name if unqualified.
    pub fn short_name(&self) -> &str {
        match self.qualified_name.rfind('.') {
            Some(pos) => &self.qualified_name[pos + 1..],
            None => &self.qualified_name,
        }
    }

    /// Package prefix before the last '.', if any.
    pub fn package(&self) -> Option<&str> {
        self.qualified_name.rfind('.').map(|pos| &self.qualified_name[..pos])
    }

    /// Numeric type id, 0 if unassigned.
    pub fn type_id(&self) -> i32 {
        self.type_id
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by numeric id.
    pub fn field_by_id(&self, id: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Look up a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Reference to this message for use in field types.
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::new(self.qualified_name.clone(), self.type_id)
    }
}

/// Immutable table of message descriptors produced by one parse.
///
/// Iteration order is declaration order. Lookups go by qualified name or,
/// for messages with a nonzero id, by numeric type id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSet {
    descriptors: Vec<Arc<MessageDescriptor>>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<i32, usize>,
    imports: Vec<String>,
}

impl SchemaSet {
    /// Build a table from descriptors, enforcing unit-wide uniqueness of
    /// qualified names and of nonzero type ids.
    pub fn new(descriptors: Vec<MessageDescriptor>) -> SchemaResult<Self> {
        Self::with_scope(&SchemaSet::default(), descriptors)
    }

    /// Build a table extending an ambient scope.
    ///
    /// The scope's descriptors come first in iteration order. Names and
    /// nonzero ids must stay unique across the union.
    pub fn with_scope(scope: &SchemaSet, descriptors: Vec<MessageDescriptor>) -> SchemaResult<Self> {
        let mut set = scope.clone();
        for descriptor in descriptors {
            set.push(Arc::new(descriptor))?;
        }
        Ok(set)
    }

    fn push(&mut self, descriptor: Arc<MessageDescriptor>) -> SchemaResult<()> {
        let name = descriptor.qualified_name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(SchemaError::duplicate_message_name(name));
        }
        let id = descriptor.type_id();
        if id != 0 && self.by_id.contains_key(&id) {
            return Err(SchemaError::duplicate_message_id(name, id));
        }
        let index = self.descriptors.len();
        self.by_name.insert(name, index);
        if id != 0 {
            self.by_id.insert(id, index);
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Number of descriptors in the table.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterate descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<MessageDescriptor>> {
        self.descriptors.iter()
    }

    /// Look up a descriptor by qualified name.
    pub fn by_name(&self, name: &str) -> Option<&Arc<MessageDescriptor>> {
        self.by_name.get(name).map(|&i| &self.descriptors[i])
    }

    /// Look up a descriptor by nonzero type id.
    pub fn by_id(&self, id: i32) -> Option<&Arc<MessageDescriptor>> {
        self.by_id.get(&id).map(|&i| &self.descriptors[i])
    }

    /// Resolve a type reference, by id when assigned, else by name.
    pub fn resolve(&self, r: &TypeRef) -> Option<&Arc<MessageDescriptor>> {
        if r.type_id() != 0 {
            if let Some(d) = self.by_id(r.type_id()) {
                return Some(d);
            }
        }
        self.by_name(r.qualified_name())
    }

    /// Qualified names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.qualified_name()).collect()
    }

    /// Record import declarations from a parsed unit.
    pub fn with_imports(mut self, imports: Vec<String>) -> Self {
        self.imports.extend(imports);
        self
    }

    /// Import declarations recorded from parsed units.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }
}
