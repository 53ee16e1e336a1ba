// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Type registry mapping numeric message ids to descriptors.
//!
//! The transport layer hands this registry a received type id and gets
//! back the descriptor (with its resolution scope) needed to decode the
//! payload. Registration is thread-safe behind an `RwLock`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::warn;

use crate::core::error::{FormatError, FormatResult};
use crate::core::message::GenericMessage;
use crate::encoding::proto::{ProtoDecoder, ProtoEncoder};
use crate::schema::descriptor::{MessageDescriptor, SchemaSet};

#[derive(Clone)]
struct Binding {
    descriptor: Arc<MessageDescriptor>,
    scope: Arc<SchemaSet>,
}

#[derive(Default)]
struct Tables {
    by_id: HashMap<i32, Binding>,
    by_name: HashMap<String, Binding>,
}

/// Registry of message types keyed by numeric id and qualified name.
#[derive(Default)]
pub struct TypeRegistry {
    tables: RwLock<Tables>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one descriptor together with its resolution scope.
    ///
    /// Types with id 0 are reachable by name only. Registering a second
    /// descriptor under an already-taken id replaces the first and logs
    /// a warning.
    pub fn register(&self, descriptor: Arc<MessageDescriptor>, scope: Arc<SchemaSet>) {
        let binding = Binding { descriptor, scope };
        let mut tables = self.tables.write().unwrap();
        let type_id = binding.descriptor.type_id();
        if type_id != 0 {
            if let Some(previous) = tables.by_id.insert(type_id, binding.clone()) {
                warn!(
                    id = type_id,
                    previous = previous.descriptor.qualified_name(),
                    replacement = binding.descriptor.qualified_name(),
                    "replacing registered type id"
                );
            }
        }
        tables
            .by_name
            .insert(binding.descriptor.qualified_name().to_string(), binding);
    }

    /// Register every descriptor of a parsed schema set.
    pub fn register_schema(&self, scope: &Arc<SchemaSet>) {
        for descriptor in scope.iter() {
            self.register(descriptor.clone(), scope.clone());
        }
    }

    /// Look up a type by numeric id.
    pub fn by_id(&self, type_id: i32) -> Option<(Arc<MessageDescriptor>, Arc<SchemaSet>)> {
        let tables = self.tables.read().unwrap();
        tables
            .by_id
            .get(&type_id)
            .map(|binding| (binding.descriptor.clone(), binding.scope.clone()))
    }

    /// Look up a type by qualified name.
    pub fn by_name(&self, name: &str) -> Option<(Arc<MessageDescriptor>, Arc<SchemaSet>)> {
        let tables = self.tables.read().unwrap();
        tables
            .by_name
            .get(name)
            .map(|binding| (binding.descriptor.clone(), binding.scope.clone()))
    }

    /// Qualified names of all registered types, sorted.
    pub fn names(&self) -> Vec<String> {
        let tables = self.tables.read().unwrap();
        let mut names: Vec<String> = tables.by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        let tables = self.tables.read().unwrap();
        tables.by_name.len()
    }

    /// Whether the registry holds no types.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every registered type.
    pub fn clear(&self) {
        let mut tables = self.tables.write().unwrap();
        tables.by_id.clear();
        tables.by_name.clear();
    }

    /// Encode a message into the proto payload a transport carries.
    pub fn encode_payload(&self, message: &GenericMessage) -> FormatResult<Vec<u8>> {
        ProtoEncoder::encode(message)
    }

    /// Decode a transport payload for a received type id.
    pub fn decode_payload(&self, type_id: i32, data: &[u8]) -> FormatResult<GenericMessage> {
        let (descriptor, scope) = self.by_id(type_id).ok_or_else(|| {
            FormatError::unsupported_type("proto", format!("message id {type_id}"))
        })?;
        ProtoDecoder::new().decode(data, &descriptor, &scope)
    }
}
