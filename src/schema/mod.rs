// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema definition language support.
//!
//! This module parses schema text into immutable descriptors and renders
//! descriptors back to text:
//! - [`descriptor`] - The descriptor model shared by every codec
//! - [`parser`] - Pest grammar and two-pass reference resolution
//! - [`writer`] - Schema text regeneration

pub mod descriptor;
pub mod parser;
pub mod writer;

pub use descriptor::{FieldDescriptor, FieldType, MessageDescriptor, SchemaSet, TypeRef};
pub use parser::{parse_schema, parse_schema_with_scope};
pub use writer::SchemaWriter;
