#![cfg(test)]

use wdl_tables_compiler::{
    enumerate_paths,
    error::CompileError,
    paths::symbol_for,
    types::{Field, NodeId, Schema},
    HandleTable,
};

fn optional() -> Field {
    Field {
        is_optional: true,
        ..Field::default()
    }
}

/// power; settings { timeout (optional), level }; mode
fn example_trait() -> (Schema, NodeId) {
    let mut schema = Schema::new();
    let t = schema.add_trait("weave.trait.example", "ThermostatTrait", 0x0a01);
    schema.add_field(t, "power", 1, Field::default()).unwrap();
    let settings = schema.add_field(t, "settings", 2, Field::default()).unwrap();
    schema.add_field(settings, "timeout", 1, optional()).unwrap();
    schema.add_field(settings, "level", 2, Field::default()).unwrap();
    schema.add_field(t, "mode", 3, Field::default()).unwrap();
    (schema, t)
}

#[test]
fn test_example_rows() {
    let (schema, t) = example_trait();
    let table = HandleTable::build(&schema, t).expect("build failed");
    let rows = table.rows(&schema);

    assert_eq!(rows.len(), 5);
    let handles: Vec<u32> = rows.iter().map(|r| r.handle).collect();
    assert_eq!(handles, vec![2, 3, 4, 5, 6]);

    let symbols: Vec<&str> = rows.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(
        symbols,
        vec!["Power", "Settings", "Settings_Timeout", "Settings_Level", "Mode"]
    );

    let parents: Vec<(&str, u32)> = rows
        .iter()
        .map(|r| (r.parent_symbol.as_str(), r.number))
        .collect();
    assert_eq!(
        parents,
        vec![
            ("Root", 1),
            ("Root", 2),
            ("Settings", 1),
            ("Settings", 2),
            ("Root", 3),
        ]
    );

    assert_eq!(rows[2].parent_handle, 3);
    assert_eq!(rows[4].parent_handle, 1);
    assert_eq!(rows[2].name, "timeout");
    assert_eq!(table.tree_depth(), 2);
}

#[test]
fn test_parent_symbol_defined_earlier() {
    let mut schema = Schema::new();
    let t = schema.add_trait("weave.trait.example", "DeepTrait", 1);
    let a = schema.add_field(t, "outer_config", 1, Field::default()).unwrap();
    let b = schema.add_field(a, "inner_config", 1, Field::default()).unwrap();
    schema.add_field(b, "leaf_value", 1, Field::default()).unwrap();
    schema.add_field(b, "other_leaf", 2, Field::default()).unwrap();
    schema.add_field(a, "sibling", 2, Field::default()).unwrap();
    schema.add_field(t, "tail", 2, Field::default()).unwrap();

    let table = HandleTable::build(&schema, t).unwrap();
    let rows = table.rows(&schema);
    assert_eq!(
        rows.iter().map(|r| r.symbol.as_str()).collect::<Vec<_>>(),
        vec![
            "OuterConfig",
            "OuterConfig_InnerConfig",
            "OuterConfig_InnerConfig_LeafValue",
            "OuterConfig_InnerConfig_OtherLeaf",
            "OuterConfig_Sibling",
            "Tail",
        ]
    );

    for (index, path) in table.paths().iter().enumerate() {
        let row = &rows[index];
        assert_eq!(row.handle, index as u32 + 2);
        match table.parent_index(index) {
            None => {
                assert_eq!(path.len(), 1);
                assert_eq!(row.parent_symbol, "Root");
            }
            Some(parent) => {
                assert!(parent < index);
                assert_eq!(row.parent_symbol, rows[parent].symbol);
                assert_eq!(row.parent_symbol, symbol_for(&schema, path.prefix()));
            }
        }
    }
    assert_eq!(table.tree_depth(), 3);
}

#[test]
fn test_arrays_and_standard_types_are_leaves() {
    let mut schema = Schema::new();
    let t = schema.add_trait("weave.trait.example", "LeafTrait", 1);
    let list = schema
        .add_field(t, "entries", 1, Field { is_array: true, ..Field::default() })
        .unwrap();
    schema.add_field(list, "hidden", 1, Field::default()).unwrap();
    let stamp = schema.add_field(t, "updated_at", 2, Field::default()).unwrap();
    schema.add_field(stamp, "seconds", 1, Field::default()).unwrap();
    schema.set_standard(stamp, true).unwrap();

    let paths = enumerate_paths(&schema, t).unwrap();
    let symbols: Vec<String> = paths.iter().map(|p| p.symbol(&schema)).collect();
    assert_eq!(symbols, vec!["Entries", "UpdatedAt"]);
}

#[test]
fn test_dictionary_value_path_is_deferred() {
    let mut schema = Schema::new();
    let t = schema.add_trait("weave.trait.example", "ScheduleTrait", 1);
    let a = schema.add_field(t, "a", 1, Field::default()).unwrap();
    let value = schema.set_map_value(a, "value", Field::default()).unwrap();
    schema.add_field(value, "x", 1, Field::default()).unwrap();
    let b = schema.add_field(t, "b", 2, Field::default()).unwrap();
    schema.add_field(b, "c", 1, Field::default()).unwrap();

    let table = HandleTable::build(&schema, t).unwrap();
    let rows = table.rows(&schema);
    assert_eq!(
        rows.iter()
            .map(|r| (r.symbol.as_str(), r.parent_symbol.as_str(), r.number))
            .collect::<Vec<_>>(),
        vec![
            ("A", "Root", 1),
            ("B", "Root", 2),
            ("B_C", "B", 1),
            ("A_Value", "A", 0),
            ("A_Value_X", "A_Value", 1),
        ]
    );
}

#[test]
fn test_typespace_has_no_paths() {
    let mut schema = Schema::new();
    let ts = schema.add_typespace("weave.common", "CommonTypes");
    let table = HandleTable::build(&schema, ts).unwrap();
    assert!(table.is_empty());
    assert_eq!(table.tree_depth(), 1);
}

#[test]
fn test_struct_unit_paths() {
    let mut schema = Schema::new();
    let s = schema.add_struct(None, "weave.common", "TimeOfDay", 0).unwrap();
    schema.add_field(s, "hour", 1, Field::default()).unwrap();
    schema.add_field(s, "minute", 2, Field::default()).unwrap();

    let paths = enumerate_paths(&schema, s).unwrap();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[1].dotted(&schema), "minute");
}

#[test]
fn test_colliding_symbols_are_rejected() {
    let mut schema = Schema::new();
    let t = schema.add_trait("weave.trait.example", "CollideTrait", 1);
    schema.add_field(t, "device_id", 1, Field::default()).unwrap();
    schema.add_field(t, "deviceId", 2, Field::default()).unwrap();

    match HandleTable::build(&schema, t) {
        Err(CompileError::AmbiguousName { symbol, first, second, .. }) => {
            assert_eq!(symbol, "DeviceId");
            assert_eq!(first, "device_id");
            assert_eq!(second, "deviceId");
        }
        other => panic!("expected AmbiguousName, got {:?}", other),
    }
}

#[test]
fn test_nested_collision_across_levels() {
    let mut schema = Schema::new();
    let t = schema.add_trait("weave.trait.example", "NestedCollideTrait", 1);
    let a = schema.add_field(t, "a", 1, Field::default()).unwrap();
    schema.add_field(a, "b", 1, Field::default()).unwrap();
    // `a__B` camelizes to `A_B`, the symbol of `a.b`.
    schema.add_field(t, "a__B", 2, Field::default()).unwrap();

    match HandleTable::build(&schema, t) {
        Err(CompileError::AmbiguousName { symbol, first, second, .. }) => {
            assert_eq!(symbol, "A_B");
            assert_eq!(first, "a.b");
            assert_eq!(second, "a__B");
        }
        other => panic!("expected AmbiguousName, got {:?}", other),
    }
}

#[test]
fn test_unpaired_underscores_stay_in_symbols() {
    let mut schema = Schema::new();
    let t = schema.add_trait("weave.trait.example", "UnderscoreTrait", 1);
    let a = schema.add_field(t, "a", 1, Field::default()).unwrap();
    schema.add_field(a, "b", 1, Field::default()).unwrap();
    let trailing = schema.add_field(t, "a_", 2, Field::default()).unwrap();
    schema.add_field(trailing, "b", 1, Field::default()).unwrap();
    schema.add_field(t, "device__id", 3, Field::default()).unwrap();

    let table = HandleTable::build(&schema, t).unwrap();
    let rows = table.rows(&schema);
    assert_eq!(
        rows.iter()
            .map(|r| (r.symbol.as_str(), r.parent_symbol.as_str()))
            .collect::<Vec<_>>(),
        vec![
            ("A", "Root"),
            ("A_B", "A"),
            ("A_", "Root"),
            ("A__B", "A_"),
            ("Device_id", "Root"),
        ]
    );
}

#[test]
fn test_enumerating_a_field_is_an_error() {
    let (schema, t) = example_trait();
    let field = enumerate_paths(&schema, t).unwrap()[0].last();
    assert!(matches!(
        enumerate_paths(&schema, field),
        Err(CompileError::SchemaIntegrity { .. })
    ));
}
