// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema fingerprints for the LCM wire format.
//!
//! The fingerprint is a 64-bit hash over field names, type labels, and
//! dimension counts in declaration order, so any change to the schema
//! shape changes the prefix and decoders can reject stale payloads
//! before touching field data. Message-typed fields contribute their
//! own type's fingerprint by summation before the final rotation.

use crate::core::error::{FormatError, FormatResult};
use crate::schema::descriptor::{FieldType, MessageDescriptor, SchemaSet};

/// Initial hash state.
const HASH_SEED: i64 = 0x1234_5678;

/// Fold one byte into the hash state. The byte is sign-extended before
/// the addition.
fn step(h: i64, byte: u8) -> i64 {
    (h.wrapping_shl(8) ^ (h >> 55)).wrapping_add(i64::from(byte as i8))
}

/// Fold a string: one length byte (saturated at 255), then every byte.
fn mix_str(mut h: i64, text: &str) -> i64 {
    h = step(h, text.len().min(255) as u8);
    for byte in text.bytes() {
        h = step(h, byte);
    }
    h
}

/// Compute the fingerprint of a message type.
///
/// Fails when a message-typed field references a type the scope cannot
/// resolve. Recursive types terminate: a type already on the active
/// chain contributes nothing to its own hash.
pub fn fingerprint(descriptor: &MessageDescriptor, scope: &SchemaSet) -> FormatResult<i64> {
    let mut chain = Vec::new();
    fingerprint_chained(descriptor, scope, &mut chain)
}

fn fingerprint_chained<'a>(
    descriptor: &'a MessageDescriptor,
    scope: &'a SchemaSet,
    chain: &mut Vec<&'a str>,
) -> FormatResult<i64> {
    chain.push(descriptor.qualified_name());

    let mut h = HASH_SEED;
    let mut nested_sum = 0i64;
    for field in descriptor.fields() {
        h = mix_str(h, field.name());

        let (element, dim) = match field.field_type() {
            FieldType::Sequence(element) => (element.as_ref(), 1u8),
            other => (other, 0u8),
        };
        match element {
            FieldType::Message(reference) => {
                let child = scope.resolve(reference).ok_or_else(|| {
                    FormatError::unsupported_type("lcm", reference.qualified_name())
                })?;
                if !chain.iter().any(|name| *name == child.qualified_name()) {
                    nested_sum =
                        nested_sum.wrapping_add(fingerprint_chained(child, scope, chain)?);
                }
            }
            FieldType::Sequence(_) => {
                return Err(FormatError::unsupported_type(
                    "lcm",
                    field.field_type().schema_name(),
                ))
            }
            FieldType::Bool => h = mix_str(h, "boolean"),
            FieldType::Char | FieldType::Int8 | FieldType::UInt8 => h = mix_str(h, "int8_t"),
            FieldType::Int16 | FieldType::UInt16 => h = mix_str(h, "int16_t"),
            FieldType::Int32 | FieldType::UInt32 => h = mix_str(h, "int32_t"),
            FieldType::Int64 | FieldType::UInt64 => h = mix_str(h, "int64_t"),
            FieldType::Float32 => h = mix_str(h, "float"),
            FieldType::Float64 => h = mix_str(h, "double"),
            FieldType::String => h = mix_str(h, "string"),
            FieldType::Bytes => h = mix_str(h, "byte"),
        }
        h = step(h, dim);
    }

    chain.pop();

    let total = h.wrapping_add(nested_sum);
    Ok(total.wrapping_shl(1).wrapping_add((total >> 63) & 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parser::parse_schema;

    fn scope_of(text: &str) -> SchemaSet {
        parse_schema(text).unwrap()
    }

    #[test]
    fn test_fingerprint_known_vectors() {
        let scope = scope_of(
            r#"
            message tiny.Flag [id = 1] { bool on = 1; }
            message geo.Point [id = 19] {
                float x = 1;
                float y = 2;
            }
        "#,
        );

        let flag = scope.by_name("tiny.Flag").unwrap();
        assert_eq!(fingerprint(flag, &scope).unwrap(), 986_350_684_884_472_863);

        let point = scope.by_name("geo.Point").unwrap();
        assert_eq!(fingerprint(point, &scope).unwrap(), -550_829_532_732_650_042);
    }

    #[test]
    fn test_fingerprint_folds_nested_types() {
        let scope = scope_of(
            r#"
            message geo.Point [id = 19] {
                float x = 1;
                float y = 2;
            }
            message geo.Line [id = 20] {
                string label = 1;
                repeated geo.Point points = 2;
                geo.Point origin = 3;
            }
        "#,
        );

        let line = scope.by_name("geo.Line").unwrap();
        assert_eq!(fingerprint(line, &scope).unwrap(), 7_630_620_608_263_315_410);
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let scope = scope_of("message a.M [id = 1] { int32 x = 1; string s = 2; }");
        let descriptor = scope.by_name("a.M").unwrap();
        assert_eq!(
            fingerprint(descriptor, &scope).unwrap(),
            fingerprint(descriptor, &scope).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_changes_with_field_name() {
        let one = scope_of("message a.M [id = 1] { int32 x = 1; }");
        let two = scope_of("message a.M [id = 1] { int32 y = 1; }");
        assert_ne!(
            fingerprint(one.by_name("a.M").unwrap(), &one).unwrap(),
            fingerprint(two.by_name("a.M").unwrap(), &two).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_changes_with_field_type() {
        let one = scope_of("message a.M [id = 1] { int32 x = 1; }");
        let two = scope_of("message a.M [id = 1] { int64 x = 1; }");
        assert_ne!(
            fingerprint(one.by_name("a.M").unwrap(), &one).unwrap(),
            fingerprint(two.by_name("a.M").unwrap(), &two).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_changes_with_field_order() {
        let one = scope_of("message a.M [id = 1] { int32 x = 1; string s = 2; }");
        let two = scope_of("message a.M [id = 1] { string s = 1; int32 x = 2; }");
        assert_ne!(
            fingerprint(one.by_name("a.M").unwrap(), &one).unwrap(),
            fingerprint(two.by_name("a.M").unwrap(), &two).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_distinguishes_scalar_from_sequence() {
        let one = scope_of("message a.M [id = 1] { int32 x = 1; }");
        let two = scope_of("message a.M [id = 1] { repeated int32 x = 1; }");
        assert_ne!(
            fingerprint(one.by_name("a.M").unwrap(), &one).unwrap(),
            fingerprint(two.by_name("a.M").unwrap(), &two).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_field_ids_do_not_matter() {
        // The hash covers names, types, and dimensions; ids are a proto
        // concern and renumbering must not invalidate LCM payloads.
        let one = scope_of("message a.M [id = 1] { int32 x = 1; string s = 2; }");
        let two = scope_of("message a.M [id = 1] { int32 x = 5; string s = 9; }");
        assert_eq!(
            fingerprint(one.by_name("a.M").unwrap(), &one).unwrap(),
            fingerprint(two.by_name("a.M").unwrap(), &two).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_recursive_type_terminates() {
        let scope = scope_of(
            r#"
            message tree.Node [id = 1] {
                int32 value = 1;
                repeated tree.Node kids = 2;
            }
        "#,
        );
        let node = scope.by_name("tree.Node").unwrap();
        assert!(fingerprint(node, &scope).is_ok());
    }

    #[test]
    fn test_fingerprint_unresolved_reference() {
        // Descriptor built by hand so the reference dangles.
        use crate::schema::descriptor::{FieldDescriptor, TypeRef};

        let orphan = MessageDescriptor::new(
            "a.Orphan",
            1,
            vec![FieldDescriptor::new(
                1,
                "ghost",
                FieldType::Message(TypeRef::new("a.Missing", 0)),
            )],
        );
        let scope = SchemaSet::default();
        let err = fingerprint(&orphan, &scope).unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedType { .. }));
    }
}
