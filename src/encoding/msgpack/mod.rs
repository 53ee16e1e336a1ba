// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MsgPack wire format module.
//!
//! Maps keyed by field id with self-describing markers, so decoders can
//! skip entries their schema does not declare.

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod marker;

pub use codec::MsgPackCodec;
pub use decoder::MsgPackDecoder;
pub use encoder::MsgPackEncoder;
