// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MsgPack codec implementation wrapping the encoder and decoder.

use std::sync::Arc;

use crate::core::error::FormatResult;
use crate::core::message::GenericMessage;
use crate::encoding::codec::{MessageCodec, WireFormat};
use crate::schema::descriptor::{MessageDescriptor, SchemaSet};

use super::decoder::MsgPackDecoder;
use super::encoder::MsgPackEncoder;

/// MsgPack codec implementing the unified codec interface.
pub struct MsgPackCodec {
    decoder: MsgPackDecoder,
}

impl MsgPackCodec {
    /// Create a new MsgPack codec.
    pub fn new() -> Self {
        Self {
            decoder: MsgPackDecoder::new(),
        }
    }
}

impl Default for MsgPackCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCodec for MsgPackCodec {
    fn encode(&self, message: &GenericMessage) -> FormatResult<Vec<u8>> {
        MsgPackEncoder::encode(message)
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
        WireFormat::MsgPack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;
    use crate::schema::parser::parse_schema;

    #[test]
    fn test_msgpack_codec_round_trip() {
        let scope = Arc::new(
            parse_schema(
                r#"
                message geo.Point [id = 19] {
                    float x = 1;
                    float y = 2;
                }
            "#,
            )
            .unwrap(),
        );
        let mut point = GenericMessage::by_name(&scope, "geo.Point").unwrap();
        point.set(1, Value::Float32(1.5)).unwrap();
        point.set(2, Value::Float32(-2.0)).unwrap();

        let codec = MsgPackCodec::new();
        assert_eq!(codec.format(), WireFormat::MsgPack);

        let bytes = codec.encode(&point).unwrap();
        let descriptor = scope.by_name("geo.Point").unwrap().clone();
        let decoded = codec.decode(&bytes, &descriptor, &scope).unwrap();
        assert_eq!(decoded, point);
    }
}
