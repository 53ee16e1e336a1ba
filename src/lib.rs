// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Buscodec
//!
//! Schema-driven message codec engine for microservice buses.
//!
//! One dynamic, schema-bound message value transcodes losslessly between
//! several independent wire formats:
//! - **Proto** varint/zigzag framing in [`encoding::proto`]
//! - **LCM** big-endian framing behind a fingerprint guard in [`encoding::lcm`]
//! - **MsgPack** id-keyed maps in [`encoding::msgpack`]
//! - **JSON** name-keyed objects in [`encoding::json`]
//! - **CSV** row export and schema text regeneration as encode-only leaves
//!
//! ## Architecture
//!
//! The library is organized around the dynamic message value:
//! - `core/` - Value, message, traversal contract, errors, type registry
//! - `schema/` - Schema language parser, descriptor model, text writer
//! - `encoding/` - One codec module per wire format behind a shared trait
//! - `envelope` - Pure-data carrier the transport layer frames and routes
//!
//! Transports, sockets, and recorded-log replay live outside this crate;
//! they move the opaque byte buffers produced here.
//!
//! ## Example: encode and decode a point
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use buscodec::{parse_schema, GenericMessage, MessageCodec, ProtoCodec, Value};
//!
//! let scope = Arc::new(parse_schema(
//!     "message geo.Point [id = 19] { float x = 1; float y = 2; }",
//! )?);
//! let mut point = GenericMessage::by_name(&scope, "geo.Point").ok_or("unknown type")?;
//! point.set(1, Value::Float32(1.5))?;
//! point.set(2, Value::Float32(-2.0))?;
//!
//! let codec = ProtoCodec::new();
//! let bytes = codec.encode(&point)?;
//! let descriptor = scope.by_name("geo.Point").ok_or("unknown type")?.clone();
//! let decoded = codec.decode(&bytes, &descriptor, &scope)?;
//! assert_eq!(decoded, point);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{
    FormatError, FormatResult, GenericMessage, MessageVisitor, SchemaError, SchemaResult,
    SequenceSlot, TraversalEvent, TypeMismatch, TypeRegistry, UnknownField, Value, ValueKind,
};

// Schema language
pub mod schema;

pub use schema::{
    parse_schema, parse_schema_with_scope, FieldDescriptor, FieldType, MessageDescriptor,
    SchemaSet, SchemaWriter, TypeRef,
};

// Wire formats
pub mod encoding;

pub use encoding::{
    codec_for, CsvEncoder, JsonCodec, LcmCodec, MessageCodec, MsgPackCodec, ProtoCodec, WireFormat,
};

// Transport boundary
pub mod envelope;

pub use envelope::{Envelope, Timestamp};
