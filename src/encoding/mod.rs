// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message encoding/decoding implementations.
//!
//! This module provides codec implementations for the wire formats:
//! - [`proto`] - Protobuf-compatible varint/zigzag encoding/decoding
//! - [`lcm`] - LCM big-endian encoding/decoding behind a fingerprint guard
//! - [`msgpack`] - MessagePack map encoding/decoding
//! - [`json`] - JSON object encoding/decoding
//! - [`csv`] - Delimited row export, encode-only
//! - [`codec`] - Unified codec interface

pub mod codec;
pub mod csv;
pub mod json;
pub mod lcm;
pub mod msgpack;
pub mod proto;

pub use codec::{codec_for, MessageCodec, WireFormat};
pub use csv::CsvEncoder;
pub use json::JsonCodec;
pub use lcm::LcmCodec;
pub use msgpack::MsgPackCodec;
pub use proto::ProtoCodec;
