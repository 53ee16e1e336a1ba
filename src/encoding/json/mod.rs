// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON wire format module.
//!
//! Objects keyed by field name with `bytes` carried as base64 strings,
//! so payloads stay readable and diffable in logs and tooling.

pub mod base64;
pub mod codec;
pub mod decoder;
pub mod encoder;

pub use codec::JsonCodec;
pub use decoder::JsonDecoder;
pub use encoder::JsonEncoder;
