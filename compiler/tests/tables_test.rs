#![cfg(test)]

use wdl_tables_compiler::{
    bitfield::{pack_attribute, pack_attribute_forced, select_bits, Attribute, AttributeBitfields},
    enumerate_paths,
    error::CompileError,
    types::{Field, NodeId, Schema},
    version::{extension_offset, extends_chain, resolve},
};
use wdl_tables_schema::Bitfield;

fn flagged(optional: bool, nullable: bool, ephemeral: bool) -> Field {
    Field {
        is_optional: optional,
        is_nullable: nullable,
        is_ephemeral: ephemeral,
        ..Field::default()
    }
}

fn example_trait(schema: &mut Schema, name: &str, number: u32) -> NodeId {
    let t = schema.add_trait("weave.trait.example", name, number);
    schema.add_field(t, "power", 1, Field::default()).unwrap();
    let settings = schema.add_field(t, "settings", 2, Field::default()).unwrap();
    schema.add_field(settings, "timeout", 1, flagged(true, false, false)).unwrap();
    schema.add_field(settings, "level", 2, Field::default()).unwrap();
    schema.add_field(t, "mode", 3, Field::default()).unwrap();
    t
}

#[test]
fn test_example_bitfields() {
    let mut schema = Schema::new();
    let t = example_trait(&mut schema, "ExampleTrait", 1);
    let paths = enumerate_paths(&schema, t).unwrap();

    let bits = AttributeBitfields::pack(&schema, &paths, false);
    assert_eq!(bits.optional.as_ref().map(|b| b.as_bytes().to_vec()), Some(vec![0x04]));
    assert_eq!(bits.dictionary, None);
    assert_eq!(bits.nullable, None);
    assert_eq!(bits.ephemeral, None);
    assert!(bits.get(Attribute::Optional).is_some());
}

#[test]
fn test_absent_is_not_all_zero() {
    let mut schema = Schema::new();
    let t = example_trait(&mut schema, "ExampleTrait", 1);
    let paths = enumerate_paths(&schema, t).unwrap();

    assert_eq!(pack_attribute(&schema, &paths, Attribute::Nullable), None);

    let forced = pack_attribute_forced(&schema, &paths, Attribute::Nullable);
    assert_eq!(forced.as_bytes(), &[0x00]);
    assert_eq!(forced.len(), 5);

    let all = AttributeBitfields::pack(&schema, &paths, true);
    for attribute in Attribute::ALL {
        assert!(all.get(attribute).is_some());
    }
    assert_eq!(all.ephemeral.map(Bitfield::into_bytes), Some(vec![0x00]));
}

#[test]
fn test_bits_follow_path_order_across_bytes() {
    let mut schema = Schema::new();
    let t = schema.add_trait("weave.trait.example", "WideTrait", 1);
    let mut expected = Vec::new();
    for i in 0..11u32 {
        let nullable = i % 3 == 0;
        let ephemeral = i == 10;
        schema
            .add_field(t, &format!("field_{}", i), i + 1, flagged(false, nullable, ephemeral))
            .unwrap();
        expected.push(nullable);
    }
    let paths = enumerate_paths(&schema, t).unwrap();

    let nullable = pack_attribute(&schema, &paths, Attribute::Nullable).unwrap();
    // bits 0, 3, 6, 9
    assert_eq!(nullable.as_bytes(), &[0x49, 0x02]);
    assert_eq!(nullable.unpack(), expected);
    assert_eq!(select_bits(&schema, &paths, Attribute::Nullable), expected);

    let ephemeral = pack_attribute(&schema, &paths, Attribute::Ephemeral).unwrap();
    assert_eq!(ephemeral.as_bytes(), &[0x00, 0x04]);
}

#[test]
fn test_dictionary_bit_marks_map_field() {
    let mut schema = Schema::new();
    let t = schema.add_trait("weave.trait.example", "MapTrait", 1);
    schema.add_field(t, "name", 1, Field::default()).unwrap();
    let map = schema.add_field(t, "entries", 2, Field::default()).unwrap();
    schema.set_map_value(map, "value", flagged(false, true, false)).unwrap();

    let paths = enumerate_paths(&schema, t).unwrap();
    assert_eq!(paths.len(), 3);
    let dict = pack_attribute(&schema, &paths, Attribute::Dictionary).unwrap();
    assert_eq!(dict.as_bytes(), &[0x02]);
    let nullable = pack_attribute(&schema, &paths, Attribute::Nullable).unwrap();
    assert_eq!(nullable.as_bytes(), &[0x04]);
}

#[test]
fn test_extension_offset_without_base() {
    let mut schema = Schema::new();
    let t = example_trait(&mut schema, "ExampleTrait", 1);
    assert_eq!(extension_offset(&schema, t).unwrap(), 2);

    let info = resolve(&schema, t).unwrap();
    assert_eq!(info.extension_offset, 2);
    assert_eq!(info.version_range, None);
    assert_eq!(info.extends, None);
}

#[test]
fn test_extension_offset_counts_base_paths() {
    let mut schema = Schema::new();
    let base = example_trait(&mut schema, "BaseTrait", 1);
    let derived = example_trait(&mut schema, "DerivedTrait", 2);
    schema.add_field(derived, "extra", 4, Field::default()).unwrap();
    schema.set_extends(derived, base).unwrap();
    schema.set_version(derived, 3).unwrap();

    assert_eq!(extension_offset(&schema, derived).unwrap(), 5 + 2);

    let info = resolve(&schema, derived).unwrap();
    let range = info.version_range.unwrap();
    assert_eq!((range.min_version, range.max_version), (1, 3));
    assert_eq!(info.extends.as_deref(), Some("weave.trait.example.BaseTrait"));
    assert_eq!(extends_chain(&schema, derived).unwrap(), vec![base]);
}

#[test]
fn test_extends_cycle_is_rejected() {
    let mut schema = Schema::new();
    let a = schema.add_trait("weave.trait.example", "ATrait", 1);
    let b = schema.add_trait("weave.trait.example", "BTrait", 2);
    schema.set_extends(a, b).unwrap();
    schema.set_extends(b, a).unwrap();

    for id in [a, b] {
        match extension_offset(&schema, id) {
            Err(CompileError::SchemaIntegrity { msg, .. }) => assert!(msg.contains("cyclic")),
            other => panic!("expected SchemaIntegrity, got {:?}", other),
        }
    }
}

#[test]
fn test_self_extension_is_a_cycle() {
    let mut schema = Schema::new();
    let a = schema.add_trait("weave.trait.example", "SelfTrait", 1);
    schema.set_extends(a, a).unwrap();
    assert!(extends_chain(&schema, a).is_err());
}

#[test]
fn test_extending_a_typespace_is_rejected() {
    let mut schema = Schema::new();
    let ts = schema.add_typespace("weave.common", "CommonTypes");
    let t = schema.add_trait("weave.trait.example", "OddTrait", 1);
    schema.set_extends(t, ts).unwrap();
    assert!(matches!(
        resolve(&schema, t),
        Err(CompileError::SchemaIntegrity { .. })
    ));
}

#[test]
fn test_non_trait_units_are_unversioned() {
    let mut schema = Schema::new();
    let ts = schema.add_typespace("weave.common", "CommonTypes");
    schema.set_version(ts, 4).unwrap();
    let info = resolve(&schema, ts).unwrap();
    assert_eq!(info.version_range, None);
    assert_eq!(info.extension_offset, 2);
}
