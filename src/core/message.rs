// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-typed dynamic message instances.
//!
//! A [`GenericMessage`] is an instance of one message descriptor: a set of
//! typed field slots keyed by field id. Slots are either present (holding a
//! strictly typed [`Value`]) or absent. Format codecs never inspect slots
//! directly; they consume the traversal event stream produced by
//! [`GenericMessage::accept`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::error::{FormatError, FormatResult, TypeMismatch};
use crate::core::value::Value;
use crate::schema::descriptor::{FieldDescriptor, FieldType, MessageDescriptor, SchemaSet};

/// A decoded field the descriptor does not declare.
///
/// Raw bytes are kept exactly as they appeared after the field tag,
/// including any length prefix, so the field can be re-emitted unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownField {
    /// Field id from the wire
    pub id: u32,
    /// Wire type from the wire tag
    pub wire_type: u8,
    /// Payload bytes following the tag
    pub raw: Vec<u8>,
}

/// Position of a nested-message element within a sequence field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceSlot {
    /// Zero-based element index
    pub index: usize,
    /// Total element count of the sequence
    pub len: usize,
}

/// One step of a message traversal.
///
/// `Field` carries every present field whose value a codec can emit
/// directly: scalars, strings, bytes, sequences of those, and empty
/// message sequences. Message-valued content instead arrives bracketed
/// by `BeginNested`/`EndNested`, with the child's own present fields
/// emitted in between.
#[derive(Debug)]
pub enum TraversalEvent<'a> {
    /// Start of the outermost message
    BeginMessage {
        /// Descriptor of the message being traversed
        descriptor: &'a MessageDescriptor,
    },
    /// A present field with a directly emittable value
    Field {
        /// Declaring field descriptor
        field: &'a FieldDescriptor,
        /// Bound value, kind matching the declared type
        value: &'a Value,
    },
    /// Start of a nested message, single-valued or one sequence element
    BeginNested {
        /// Declaring field descriptor
        field: &'a FieldDescriptor,
        /// The nested message instance
        message: &'a GenericMessage,
        /// Element position when the field is a sequence, `None` otherwise
        slot: Option<SequenceSlot>,
    },
    /// End of the most recently begun nested message
    EndNested,
    /// End of the outermost message
    EndMessage,
}

/// Consumer of a message traversal.
///
/// Events arrive in declaration order of the descriptor; absent fields
/// produce no event. Nesting is properly bracketed: every `BeginNested`
/// is closed by a matching `EndNested` before the parent continues.
pub trait MessageVisitor {
    /// Handle one traversal event.
    fn visit(&mut self, event: TraversalEvent<'_>) -> FormatResult<()>;
}

/// Schema-typed dynamic message instance.
///
/// Bound to its descriptor and to the schema set the descriptor came
/// from; the set is consulted when nested type references need resolving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericMessage {
    descriptor: Arc<MessageDescriptor>,
    scope: Arc<SchemaSet>,
    fields: BTreeMap<u32, Value>,
    unknown_fields: Vec<UnknownField>,
}

impl GenericMessage {
    /// Create an empty message bound to a descriptor within its schema set.
    pub fn bind(descriptor: Arc<MessageDescriptor>, scope: Arc<SchemaSet>) -> Self {
        GenericMessage {
            descriptor,
            scope,
            fields: BTreeMap::new(),
            unknown_fields: Vec::new(),
        }
    }

    /// Create an empty message for a named type in a schema set.
    pub fn by_name(scope: &Arc<SchemaSet>, name: &str) -> Option<Self> {
        let descriptor = scope.by_name(name)?.clone();
        Some(Self::bind(descriptor, scope.clone()))
    }

    /// Create an empty message for a nonzero type id in a schema set.
    pub fn by_id(scope: &Arc<SchemaSet>, id: i32) -> Option<Self> {
        let descriptor = scope.by_id(id)?.clone();
        Some(Self::bind(descriptor, scope.clone()))
    }

    /// Descriptor this message is bound to.
    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    /// Schema set the descriptor came from.
    pub fn scope(&self) -> &Arc<SchemaSet> {
        &self.scope
    }

    /// Bind a value to a field slot by id.
    ///
    /// Rejects ids the descriptor does not declare and values whose kind
    /// disagrees with the declared type. Characters must be ASCII so every
    /// wire format can carry them in one byte.
    pub fn set(&mut self, id: u32, value: Value) -> Result<(), TypeMismatch> {
        let field = self.descriptor.field_by_id(id).ok_or_else(|| {
            TypeMismatch::new(
                id,
                "(undeclared)",
                format!("a field declared by {}", self.descriptor.qualified_name()),
                value.kind().as_str(),
            )
        })?;
        if !field.field_type().admits(&value) {
            return Err(TypeMismatch::new(
                id,
                field.name(),
                field.field_type().schema_name(),
                value.kind().as_str(),
            ));
        }
        if !ascii_clean(&value) {
            return Err(TypeMismatch::new(
                id,
                field.name(),
                field.field_type().schema_name(),
                "non-ascii char",
            ));
        }
        self.fields.insert(id, value);
        Ok(())
    }

    /// Bind a value to a field slot by name.
    pub fn set_by_name(&mut self, name: &str, value: Value) -> Result<(), TypeMismatch> {
        let id = match self.descriptor.field_by_name(name) {
            Some(field) => field.id(),
            None => {
                return Err(TypeMismatch::new(
                    0,
                    name,
                    format!("a field declared by {}", self.descriptor.qualified_name()),
                    value.kind().as_str(),
                ))
            }
        };
        self.set(id, value)
    }

    /// Get the value bound to a field, `None` when absent.
    pub fn get(&self, id: u32) -> Option<&Value> {
        self.fields.get(&id)
    }

    /// Get the value bound to a named field, `None` when absent.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let field = self.descriptor.field_by_name(name)?;
        self.fields.get(&field.id())
    }

    /// Remove a field's value, returning it if one was present.
    pub fn clear(&mut self, id: u32) -> Option<Value> {
        self.fields.remove(&id)
    }

    /// Check whether a field currently holds a value.
    pub fn is_present(&self, id: u32) -> bool {
        self.fields.contains_key(&id)
    }

    /// Number of fields currently holding a value.
    pub fn present_count(&self) -> usize {
        self.fields.len()
    }

    /// Fields decoded from the wire that the descriptor does not declare.
    pub fn unknown_fields(&self) -> &[UnknownField] {
        &self.unknown_fields
    }

    pub(crate) fn push_unknown(&mut self, field: UnknownField) {
        self.unknown_fields.push(field);
    }

    /// Walk present fields in declaration order, feeding the visitor.
    pub fn accept<V: MessageVisitor>(&self, visitor: &mut V) -> FormatResult<()> {
        visitor.visit(TraversalEvent::BeginMessage {
            descriptor: &self.descriptor,
        })?;
        self.emit_fields(visitor)?;
        visitor.visit(TraversalEvent::EndMessage)
    }

    fn emit_fields<V: MessageVisitor>(&self, visitor: &mut V) -> FormatResult<()> {
        for field in self.descriptor.fields() {
            let value = match self.fields.get(&field.id()) {
                Some(v) => v,
                None => continue,
            };
            match value {
                Value::Message(child) => {
                    visitor.visit(TraversalEvent::BeginNested {
                        field,
                        message: child,
                        slot: None,
                    })?;
                    child.emit_fields(visitor)?;
                    visitor.visit(TraversalEvent::EndNested)?;
                }
                Value::Sequence(elems)
                    if matches!(field.field_type().element(), Some(FieldType::Message(_)))
                        && !elems.is_empty() =>
                {
                    let len = elems.len();
                    for (index, elem) in elems.iter().enumerate() {
                        let child = elem.as_message().ok_or_else(|| {
                            FormatError::type_mismatch(
                                "traversal",
                                field.name(),
                                field.field_type().schema_name(),
                                elem.kind().as_str(),
                            )
                        })?;
                        visitor.visit(TraversalEvent::BeginNested {
                            field,
                            message: child,
                            slot: Some(SequenceSlot { index, len }),
                        })?;
                        child.emit_fields(visitor)?;
                        visitor.visit(TraversalEvent::EndNested)?;
                    }
                }
                _ => {
                    visitor.visit(TraversalEvent::Field { field, value })?;
                }
            }
        }
        Ok(())
    }
}

fn ascii_clean(value: &Value) -> bool {
    match value {
        Value::Char(c) => c.is_ascii(),
        Value::Sequence(elems) => elems.iter().all(ascii_clean),
        _ => true,
    }
}
