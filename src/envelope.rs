// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Transport-boundary carrier for encoded payloads.
//!
//! An [`Envelope`] is pure data: the numeric type id, the proto payload,
//! and timing metadata. Framing, sockets, and retry policy all belong to
//! the transport layer; this crate only packs and opens the payload.

use serde::{Deserialize, Serialize};

use crate::core::error::FormatResult;
use crate::core::message::GenericMessage;
use crate::core::registry::TypeRegistry;
use crate::encoding::proto::ProtoEncoder;

/// Seconds and microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    /// Whole seconds
    pub seconds: i32,
    /// Microseconds within the second
    pub microseconds: i32,
}

impl Timestamp {
    /// Create a timestamp from its parts.
    pub fn new(seconds: i32, microseconds: i32) -> Self {
        Timestamp {
            seconds,
            microseconds,
        }
    }
}

/// One encoded message with its routing and timing metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Numeric id of the carried message type
    pub data_type: i32,
    /// Proto-encoded payload
    pub serialized_data: Vec<u8>,
    /// Sender-chosen discriminator for multiple instances of one type
    pub sender_stamp: u32,
    /// When the sender handed the envelope to the transport
    pub sent: Timestamp,
    /// When the carried sample was taken
    pub sampled: Timestamp,
}

impl Envelope {
    /// Pack a message into an envelope under `type_id`.
    ///
    /// Timing metadata starts zeroed; the transport layer stamps it.
    pub fn pack(type_id: i32, message: &GenericMessage) -> FormatResult<Self> {
        Ok(Envelope {
            data_type: type_id,
            serialized_data: ProtoEncoder::encode(message)?,
            ..Envelope::default()
        })
    }

    /// Decode the carried payload against a registry.
    pub fn open(&self, registry: &TypeRegistry) -> FormatResult<GenericMessage> {
        registry.decode_payload(self.data_type, &self.serialized_data)
    }
}
