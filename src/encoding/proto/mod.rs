// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Proto wire format module.
//!
//! Varint/zigzag tag-length-value encoding with packed sequences and
//! unknown-field pass-through.

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod wire;

pub use codec::ProtoCodec;
pub use decoder::ProtoDecoder;
pub use encoder::ProtoEncoder;
pub use wire::ProtoReader;
