// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! LCM wire format module.
//!
//! Fingerprint-guarded big-endian encoding with fixed field slots in
//! declaration order.

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod fingerprint;

pub use codec::LcmCodec;
pub use decoder::LcmDecoder;
pub use encoder::LcmEncoder;
pub use fingerprint::fingerprint;
