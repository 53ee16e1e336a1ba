// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MsgPack marker bytes.
//!
//! One-byte markers classify every value on the wire. The fix-form
//! markers fold small lengths or small integers into the marker byte
//! itself; the remaining families carry an explicit big-endian length
//! or payload after the marker.

/// Largest value a positive fixint marker can hold.
pub const POS_FIXINT_MAX: u8 = 0x7F;
/// First fixmap marker; low nibble is the entry count.
pub const FIXMAP: u8 = 0x80;
/// Last fixmap marker.
pub const FIXMAP_MAX: u8 = 0x8F;
/// First fixarray marker; low nibble is the element count.
pub const FIXARRAY: u8 = 0x90;
/// Last fixarray marker.
pub const FIXARRAY_MAX: u8 = 0x9F;
/// First fixstr marker; low five bits are the byte length.
pub const FIXSTR: u8 = 0xA0;
/// Last fixstr marker.
pub const FIXSTR_MAX: u8 = 0xBF;
/// Nil value.
pub const NIL: u8 = 0xC0;
/// Boolean false.
pub const FALSE: u8 = 0xC2;
/// Boolean true.
pub const TRUE: u8 = 0xC3;
/// Binary payload, u8 length.
pub const BIN8: u8 = 0xC4;
/// Binary payload, u16 length.
pub const BIN16: u8 = 0xC5;
/// Binary payload, u32 length.
pub const BIN32: u8 = 0xC6;
/// IEEE 754 single precision, big-endian.
pub const FLOAT32: u8 = 0xCA;
/// IEEE 754 double precision, big-endian.
pub const FLOAT64: u8 = 0xCB;
/// Unsigned integer, 1 byte.
pub const UINT8: u8 = 0xCC;
/// Unsigned integer, 2 bytes big-endian.
pub const UINT16: u8 = 0xCD;
/// Unsigned integer, 4 bytes big-endian.
pub const UINT32: u8 = 0xCE;
/// Unsigned integer, 8 bytes big-endian.
pub const UINT64: u8 = 0xCF;
/// Signed integer, 1 byte.
pub const INT8: u8 = 0xD0;
/// Signed integer, 2 bytes big-endian.
pub const INT16: u8 = 0xD1;
/// Signed integer, 4 bytes big-endian.
pub const INT32: u8 = 0xD2;
/// Signed integer, 8 bytes big-endian.
pub const INT64: u8 = 0xD3;
/// String, u8 length.
pub const STR8: u8 = 0xD9;
/// String, u16 length.
pub const STR16: u8 = 0xDA;
/// String, u32 length.
pub const STR32: u8 = 0xDB;
/// Array, u16 element count.
pub const ARRAY16: u8 = 0xDC;
/// Array, u32 element count.
pub const ARRAY32: u8 = 0xDD;
/// Map, u16 entry count.
pub const MAP16: u8 = 0xDE;
/// Map, u32 entry count.
pub const MAP32: u8 = 0xDF;
/// First negative fixint marker; the byte IS the value as an `i8`,
/// covering -32 through -1.
pub const NEG_FIXINT: u8 = 0xE0;
