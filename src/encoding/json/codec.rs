// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON codec implementation wrapping the encoder and decoder.

use std::sync::Arc;

use crate::core::error::FormatResult;
use crate::core::message::GenericMessage;
use crate::encoding::codec::{MessageCodec, WireFormat};
use crate::schema::descriptor::{MessageDescriptor, SchemaSet};

use super::decoder::JsonDecoder;
use super::encoder::JsonEncoder;

/// JSON codec implementing the unified codec interface.
pub struct JsonCodec {
    decoder: JsonDecoder,
}

impl JsonCodec {
    /// Create a new JSON codec.
    pub fn new() -> Self {
        Self {
            decoder: JsonDecoder::new(),
        }
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCodec for JsonCodec {
    fn encode(&self, message: &GenericMessage) -> FormatResult<Vec<u8>> {
        JsonEncoder::encode(message)
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
        WireFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;
    use crate::schema::parser::parse_schema;

    #[test]
    fn test_json_codec_round_trip() {
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

        let codec = JsonCodec::new();
        assert_eq!(codec.format(), WireFormat::Json);

        let bytes = codec.encode(&point).unwrap();
        let descriptor = scope.by_name("geo.Point").unwrap().clone();
        let decoded = codec.decode(&bytes, &descriptor, &scope).unwrap();
        assert_eq!(decoded, point);
    }
}
