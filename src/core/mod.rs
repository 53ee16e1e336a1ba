// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout buscodec.
//!
//! This module provides the foundational types for the library:
//! - [`error`] - Error taxonomy across parsing, binding, and wire codecs
//! - [`value`] - Dynamic value over the closed set of field kinds
//! - [`message`] - Schema-bound message value and its traversal contract
//! - [`registry`] - Type-id to descriptor registry for the transport boundary

pub mod error;
pub mod message;
pub mod registry;
pub mod value;

pub use error::{FormatError, FormatResult, SchemaError, SchemaResult, TypeMismatch};
pub use message::{GenericMessage, MessageVisitor, SequenceSlot, TraversalEvent, UnknownField};
pub use registry::TypeRegistry;
pub use value::{Value, ValueKind};
