// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Shared codec contract for the wire formats.
//!
//! Every format implements [`MessageCodec`] over the same dynamic message
//! value; callers pick a format at runtime through [`WireFormat`] and
//! [`codec_for`]. Implementations are stateless and mutually unaware.

use std::sync::Arc;

use crate::core::error::{FormatError, FormatResult};
use crate::core::message::GenericMessage;
use crate::schema::descriptor::{MessageDescriptor, SchemaSet};

use super::json::JsonCodec;
use super::lcm::LcmCodec;
use super::msgpack::MsgPackCodec;
use super::proto::ProtoCodec;

// =============================================================================
// Wire format identifier
// =============================================================================

/// Wire format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
    /// Protobuf-compatible binary framing
    Proto,
    /// LCM binary framing with fingerprint guard
    Lcm,
    /// MessagePack binary maps keyed by field id
    MsgPack,
    /// JSON objects keyed by field name
    Json,
}

impl std::str::FromStr for WireFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "proto" | "protobuf" => Ok(WireFormat::Proto),
            "lcm" => Ok(WireFormat::Lcm),
            "msgpack" | "messagepack" => Ok(WireFormat::MsgPack),
            "json" => Ok(WireFormat::Json),
            _ => Err(FormatError::malformed(
                "codec",
                format!("unknown wire format '{s}'"),
            )),
        }
    }
}

impl std::fmt::Display for WireFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            WireFormat::Proto => write!(f, "proto"),
            WireFormat::Lcm => write!(f, "lcm"),
            WireFormat::MsgPack => write!(f, "msgpack"),
            WireFormat::Json => write!(f, "json"),
        }
    }
}

// =============================================================================
// Message codec trait
// =============================================================================

/// Unified codec interface over the dynamic message value.
///
/// `encode` walks the message's present fields; `decode` rebuilds a message
/// bound to the given descriptor and schema scope. The scope carries the
/// descriptor table nested type references resolve through.
pub trait MessageCodec: Send + Sync {
    /// Encode a message into this format's wire bytes.
    fn encode(&self, message: &GenericMessage) -> FormatResult<Vec<u8>>;

    /// Decode wire bytes into a message bound to `descriptor`.
    fn decode(
        &self,
        data: &[u8],
        descriptor: &Arc<MessageDescriptor>,
        scope: &Arc<SchemaSet>,
    ) -> FormatResult<GenericMessage>;

    /// The wire format this codec handles.
    fn format(&self) -> WireFormat;
}

/// Construct the codec for a wire format.
pub fn codec_for(format: WireFormat) -> Box<dyn MessageCodec> {
    match format {
        WireFormat::Proto => Box::new(ProtoCodec::new()),
        WireFormat::Lcm => Box::new(LcmCodec::new()),
        WireFormat::MsgPack => Box::new(MsgPackCodec::new()),
        WireFormat::Json => Box::new(JsonCodec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_from_str() {
        assert_eq!("proto".parse::<WireFormat>().unwrap(), WireFormat::Proto);
        assert_eq!("Protobuf".parse::<WireFormat>().unwrap(), WireFormat::Proto);
        assert_eq!("lcm".parse::<WireFormat>().unwrap(), WireFormat::Lcm);
        assert_eq!("msgpack".parse::<WireFormat>().unwrap(), WireFormat::MsgPack);
        assert_eq!("JSON".parse::<WireFormat>().unwrap(), WireFormat::Json);

        let err = "avro".parse::<WireFormat>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed codec stream: unknown wire format 'avro'"
        );
    }

    #[test]
    fn test_wire_format_display() {
        assert_eq!(WireFormat::Proto.to_string(), "proto");
        assert_eq!(WireFormat::Lcm.to_string(), "lcm");
        assert_eq!(WireFormat::MsgPack.to_string(), "msgpack");
        assert_eq!(WireFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_codec_for_reports_format() {
        for format in [
            WireFormat::Proto,
            WireFormat::Lcm,
            WireFormat::MsgPack,
            WireFormat::Json,
        ] {
            assert_eq!(codec_for(format).format(), format);
        }
    }
}
