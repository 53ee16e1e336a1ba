// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Proto codec implementation wrapping the encoder and decoder.

use std::sync::Arc;

use crate::core::error::FormatResult;
use crate::core::message::GenericMessage;
use crate::encoding::codec::{MessageCodec, WireFormat};
use crate::schema::descriptor::{MessageDescriptor, SchemaSet};

use super::decoder::ProtoDecoder;
use super::encoder::ProtoEncoder;

/// Proto codec implementing the unified codec interface.
pub struct ProtoCodec {
    decoder: ProtoDecoder,
}

impl ProtoCodec {
    /// Create a new proto codec.
    pub fn new() -> Self {
        Self {
            decoder: ProtoDecoder::new(),
        }
    }
}

impl Default for ProtoCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCodec for ProtoCodec {
    fn encode(&self, message: &GenericMessage) -> FormatResult<Vec<u8>> {
        ProtoEncoder::encode(message)
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
        WireFormat::Proto
    }
}
