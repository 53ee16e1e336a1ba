// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Cross-format round-trip integration tests.
//!
//! Tests cover:
//! - Per-format round trips of a message using every field kind
//! - The pinned point wire bytes for proto and JSON
//! - Zigzag encoding of negative integers
//! - Transcoding one value through every format in sequence

mod common;

use buscodec::{codec_for, parse_schema, GenericMessage, Value, WireFormat};
use common::{geometry_scope, sample_point, sample_status, telemetry_scope};
use std::sync::Arc;

const ALL_FORMATS: [WireFormat; 4] = [
    WireFormat::Proto,
    WireFormat::Lcm,
    WireFormat::MsgPack,
    WireFormat::Json,
];

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_point_round_trips_in_every_format() {
    let scope = geometry_scope();
    let point = sample_point(&scope);
    let descriptor = scope.by_name("geo.Point").unwrap().clone();

    for format in ALL_FORMATS {
        let codec = codec_for(format);
        let bytes = codec.encode(&point).unwrap();
        let decoded = codec.decode(&bytes, &descriptor, &scope).unwrap();
        assert_eq!(decoded, point, "{format} round trip");
    }
}

#[test]
fn test_status_round_trips_in_every_format() {
    let scope = telemetry_scope();
    let status = sample_status(&scope);
    let descriptor = scope.by_name("vehicle.Status").unwrap().clone();

    for format in ALL_FORMATS {
        let codec = codec_for(format);
        let bytes = codec.encode(&status).unwrap();
        let decoded = codec.decode(&bytes, &descriptor, &scope).unwrap();
        assert_eq!(decoded, status, "{format} round trip");
    }
}

#[test]
fn test_transcode_through_every_format() {
    let scope = telemetry_scope();
    let status = sample_status(&scope);
    let descriptor = scope.by_name("vehicle.Status").unwrap().clone();

    let mut current = status.clone();
    for format in ALL_FORMATS {
        let codec = codec_for(format);
        let bytes = codec.encode(&current).unwrap();
        current = codec.decode(&bytes, &descriptor, &scope).unwrap();
    }
    assert_eq!(current, status);
}

// ============================================================================
// Pinned wire vectors
// ============================================================================

#[test]
fn test_point_proto_bytes_pinned() {
    let scope = geometry_scope();
    let point = sample_point(&scope);

    let bytes = codec_for(WireFormat::Proto).encode(&point).unwrap();
    assert_eq!(
        bytes,
        vec![0x0D, 0x00, 0x00, 0xC0, 0x3F, 0x15, 0x00, 0x00, 0x00, 0xC0]
    );
}

#[test]
fn test_point_json_text_pinned() {
    let scope = geometry_scope();
    let point = sample_point(&scope);

    let bytes = codec_for(WireFormat::Json).encode(&point).unwrap();
    assert_eq!(bytes, br#"{"x":1.5,"y":-2.0}"#.to_vec());
}

#[test]
fn test_negative_one_zigzags_to_one() {
    let scope = Arc::new(parse_schema("message t.Delta [id = 1] { int32 n = 1; }").unwrap());
    let mut delta = GenericMessage::by_name(&scope, "t.Delta").unwrap();
    delta.set(1, Value::Int32(-1)).unwrap();

    let codec = codec_for(WireFormat::Proto);
    let bytes = codec.encode(&delta).unwrap();
    assert_eq!(bytes, vec![0x08, 0x01]);

    let descriptor = scope.by_name("t.Delta").unwrap().clone();
    let decoded = codec.decode(&bytes, &descriptor, &scope).unwrap();
    assert_eq!(decoded.get(1), Some(&Value::Int32(-1)));
}

// ============================================================================
// Partial presence
// ============================================================================

#[test]
fn test_sparse_message_survives_sparse_formats() {
    // Proto, msgpack, and JSON keep absent fields absent; LCM fills
    // every slot and is checked separately in its own suite.
    let scope = geometry_scope();
    let mut pose = GenericMessage::by_name(&scope, "geo.Pose").unwrap();
    pose.set(2, Value::Float64(1.5708)).unwrap();
    let descriptor = scope.by_name("geo.Pose").unwrap().clone();

    for format in [WireFormat::Proto, WireFormat::MsgPack, WireFormat::Json] {
        let codec = codec_for(format);
        let bytes = codec.encode(&pose).unwrap();
        let decoded = codec.decode(&bytes, &descriptor, &scope).unwrap();
        assert_eq!(decoded, pose, "{format} sparse round trip");
        assert!(!decoded.is_present(1), "{format} left position absent");
    }
}
