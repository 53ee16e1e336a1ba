// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use buscodec::{parse_schema, GenericMessage, SchemaSet, Value};

// ============================================================================
// Fixture schemas
// ============================================================================

/// Two-message geometry unit with a nested reference.
pub const GEOMETRY_SCHEMA: &str = r#"
message geo.Point [id = 19] {
    float x = 1;
    float y = 2;
}

message geo.Pose [id = 20] {
    geo.Point position = 1;
    double heading = 2;
}
"#;

/// One message of every field kind, including nested and repeated nested.
pub const TELEMETRY_SCHEMA: &str = r#"
package vehicle;

message Axle [id = 30] {
    float load = 1;
    repeated int16 wheelSpeeds = 2;
}

message Status [id = 31] {
    bool engineOn = 1;
    char gear = 2;
    int8 trim = 3;
    int16 rpmDelta = 4;
    int32 odometer = 5;
    int64 epochMicros = 6;
    uint8 fuelPct = 7;
    uint16 voltageMv = 8;
    uint32 frameCount = 9;
    uint64 vinHash = 10;
    float speed = 11;
    double latitude = 12;
    string plate = 13;
    bytes faultMask = 14;
    repeated double samples = 15;
    Axle front = 16;
    repeated Axle rear = 17;
}
"#;

// ============================================================================
// Fixture builders
// ============================================================================

pub fn geometry_scope() -> Arc<SchemaSet> {
    Arc::new(parse_schema(GEOMETRY_SCHEMA).expect("geometry schema parses"))
}

pub fn telemetry_scope() -> Arc<SchemaSet> {
    Arc::new(parse_schema(TELEMETRY_SCHEMA).expect("telemetry schema parses"))
}

/// The pinned `{x: 1.5, y: -2.0}` point.
pub fn sample_point(scope: &Arc<SchemaSet>) -> GenericMessage {
    let mut point = GenericMessage::by_name(scope, "geo.Point").expect("geo.Point declared");
    point.set(1, Value::Float32(1.5)).unwrap();
    point.set(2, Value::Float32(-2.0)).unwrap();
    point
}

fn axle(scope: &Arc<SchemaSet>, load: f32, speeds: &[i16]) -> GenericMessage {
    let mut axle = GenericMessage::by_name(scope, "vehicle.Axle").expect("vehicle.Axle declared");
    axle.set(1, Value::Float32(load)).unwrap();
    axle.set(
        2,
        Value::Sequence(speeds.iter().map(|&v| Value::Int16(v)).collect()),
    )
    .unwrap();
    axle
}

/// A fully populated status sample; every field present so fill-on-encode
/// formats round-trip it unchanged.
pub fn sample_status(scope: &Arc<SchemaSet>) -> GenericMessage {
    let mut status =
        GenericMessage::by_name(scope, "vehicle.Status").expect("vehicle.Status declared");
    status.set(1, Value::Bool(true)).unwrap();
    status.set(2, Value::Char('D')).unwrap();
    status.set(3, Value::Int8(-3)).unwrap();
    status.set(4, Value::Int16(-512)).unwrap();
    status.set(5, Value::Int32(1_234_567)).unwrap();
    status.set(6, Value::Int64(-9_000_000_000)).unwrap();
    status.set(7, Value::UInt8(87)).unwrap();
    status.set(8, Value::UInt16(12_600)).unwrap();
    status.set(9, Value::UInt32(4_000_000_000)).unwrap();
    status.set(10, Value::UInt64(u64::MAX)).unwrap();
    status.set(11, Value::Float32(27.5)).unwrap();
    status.set(12, Value::Float64(57.687_554)).unwrap();
    status
        .set(13, Value::String("ABC 123".to_string()))
        .unwrap();
    status
        .set(14, Value::Bytes(vec![0x00, 0x42, 0xFF]))
        .unwrap();
    status
        .set(
            15,
            Value::Sequence(vec![Value::Float64(0.25), Value::Float64(-0.75)]),
        )
        .unwrap();
    status
        .set(16, Value::Message(axle(scope, 512.5, &[30, 31])))
        .unwrap();
    status
        .set(
            17,
            Value::Sequence(vec![
                Value::Message(axle(scope, 480.0, &[29, 30])),
                Value::Message(axle(scope, 495.25, &[28])),
            ]),
        )
        .unwrap();
    status
}
