// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! LCM codec implementation wrapping the encoder and decoder.

use std::sync::Arc;

use crate::core::error::FormatResult;
use crate::core::message::GenericMessage;
use crate::encoding::codec::{MessageCodec, WireFormat};
use crate::schema::descriptor::{MessageDescriptor, SchemaSet};

use super::decoder::LcmDecoder;
use super::encoder::LcmEncoder;

/// LCM codec implementing the unified codec interface.
pub struct LcmCodec {
    decoder: LcmDecoder,
}

impl LcmCodec {
    /// Create a new LCM codec.
    pub fn new() -> Self {
        Self {
            decoder: LcmDecoder::new(),
        }
    }
}

impl Default for LcmCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCodec for LcmCodec {
    fn encode(&self, message: &GenericMessage) -> FormatResult<Vec<u8>> {
        LcmEncoder::encode(message)
    }

    fn decode(
        &self,
        data: &[u8],
        descriptor: &Arc<MessageDescriptor>,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<GenericMessage> {
        self.decoder.decode(data, descriptor, scope)
    }

    fn format(&self) -> WireFormat {
        WireFormat::Lcm
    }
}
