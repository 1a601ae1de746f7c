#![cfg(test)]

use indoc::indoc;
use wdl_tables::{compile_schema, compile_to_json, load_schema, CompileError, CompileOptions, UnitKind};

const SCHEMA: &str = indoc! {r#"
    {
      "typespaces": [{
        "name": "weave.common.CommonTypes",
        "structs": [
          { "name": "Window", "number": 1, "fields": [
            { "name": "begin_at", "number": 1 },
            { "name": "end_at", "number": 2, "optional": true }
          ]}
        ],
        "constant_groups": [{
          "name": "ResourceId",
          "constants": [
            { "name": "RESOURCE_ID_HUB", "number": 1, "value": "DEVICE_18B4300000000001" },
            { "name": "OWNER", "number": 2, "value": "USER_0000000000000042" }
          ]
        }]
      }],
      "traits": [
        {
          "name": "weave.trait.example.ThermostatTrait",
          "number": 2561,
          "version": 2,
          "state": [
            { "name": "power", "number": 1, "type": "bool" },
            { "name": "settings", "number": 2, "type": "struct", "fields": [
              { "name": "timeout", "number": 1, "optional": true },
              { "name": "level", "number": 2 }
            ]},
            { "name": "mode", "number": 3, "type": "enum" }
          ],
          "enums": [
            { "name": "Mode", "number": 1, "values": [
              { "name": "MODE_OFF", "number": 1 },
              { "name": "MODE_HEAT", "number": 2 }
            ]}
          ]
        },
        {
          "name": "weave.trait.example.ScheduleTrait",
          "number": 2562,
          "extends": "weave.trait.example.ThermostatTrait",
          "state": [
            { "name": "power", "number": 1, "type": "bool" },
            { "name": "settings", "number": 2, "type": "struct", "fields": [
              { "name": "timeout", "number": 1, "optional": true },
              { "name": "level", "number": 2 }
            ]},
            { "name": "mode", "number": 3, "type": "enum" },
            { "name": "slots", "number": 4, "map": true, "map_value": {
              "name": "value", "number": 0, "type": "struct", "nullable": true, "fields": [
                { "name": "start", "number": 1 }
              ]
            }}
          ]
        }
      ],
      "structs": [
        { "name": "google.protobuf.Timestamp", "standard": true },
        { "name": "weave.common.TimeOfDay", "fields": [
          { "name": "hour", "number": 1 },
          { "name": "minute", "number": 2 }
        ]}
      ]
    }
"#};

#[test]
fn test_load_and_compile() {
    let schema = load_schema(SCHEMA).expect("load_schema failed");
    // typespace, two traits, two structs
    assert_eq!(schema.roots().len(), 5);

    let tables = compile_schema(&schema, &CompileOptions::default()).expect("compile failed");
    let units: Vec<(&str, UnitKind)> = tables.iter().map(|t| (t.unit.as_str(), t.kind)).collect();
    assert_eq!(
        units,
        vec![
            ("weave.common.CommonTypes", UnitKind::Typespace),
            ("weave.trait.example.ThermostatTrait", UnitKind::Trait),
            ("weave.trait.example.ScheduleTrait", UnitKind::Trait),
            ("weave.common.TimeOfDay", UnitKind::Struct),
        ]
    );

    let common = &tables[0];
    let constants = &common.constant_groups[0].constants;
    assert_eq!(constants[0].symbol, "HUB");
    assert_eq!(constants[0].bytes, vec![0x00, 0x01, 0x18, 0xb4, 0x30, 0x00, 0x00, 0x00, 0x00, 0x01]);
    assert_eq!(constants[1].literal, "0x0000000000000042");

    let thermostat = &tables[1];
    assert_eq!(thermostat.profile_id, Some(2561));
    assert_eq!(thermostat.handle_count, 5);
    assert_eq!(thermostat.is_optional.bytes, vec![0x04]);
    assert!(!thermostat.is_nullable.present);
    assert_eq!(thermostat.version_range.map(|r| r.max_version), Some(2));
    assert_eq!(thermostat.enums[0].values[1].symbol, "ModeHeat");

    let schedule = &tables[2];
    assert_eq!(schedule.extension_offset, 7);
    assert_eq!(schedule.extends.as_deref(), Some("weave.trait.example.ThermostatTrait"));
    assert_eq!(schedule.version_range, None);
    let symbols: Vec<&str> = schedule.properties.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(
        symbols,
        vec![
            "Power",
            "Settings",
            "Settings_Timeout",
            "Settings_Level",
            "Mode",
            "Slots",
            "Slots_Value",
            "Slots_Value_Start",
        ]
    );
    // slots is path 5, its value path 6
    assert_eq!(schedule.is_dictionary.bytes, vec![0x20]);
    assert_eq!(schedule.is_nullable.bytes, vec![0x40]);
    assert_eq!(schedule.last_handle, 9);
    assert_eq!(schedule.tree_depth, 3);
}

#[test]
fn test_compile_to_json() {
    let json = compile_to_json(SCHEMA, &CompileOptions::default()).expect("compile_to_json failed");
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let units = value.as_array().unwrap();
    assert_eq!(units.len(), 4);
    assert_eq!(units[0]["structs"][0]["name"], "Window");
    assert_eq!(units[0]["structs"][0]["fields"][1]["symbol"], "EndAt");
    assert_eq!(units[0]["structs"][0]["fields"][1]["is_optional"], true);
    assert_eq!(units[1]["kind"], "trait");
    assert_eq!(units[1]["properties"][2]["symbol"], "Settings_Timeout");
    assert_eq!(units[1]["properties"][2]["parent_handle"], 3);
    assert_eq!(units[1]["is_nullable"]["present"], false);
    assert_eq!(units[1]["extends"], serde_json::Value::Null);
}

#[test]
fn test_unknown_extends_target() {
    let text = indoc! {r#"
        { "traits": [{ "name": "a.BTrait", "number": 1, "extends": "a.Missing" }] }
    "#};
    match load_schema(text) {
        Err(CompileError::SchemaIntegrity { msg, .. }) => assert!(msg.contains("a.Missing")),
        other => panic!("expected SchemaIntegrity, got {:?}", other.map(|s| s.len())),
    }
}

#[test]
fn test_malformed_document() {
    assert!(matches!(
        compile_to_json("{ \"traits\": [ { \"name\": 3 } ] }", &CompileOptions::default()),
        Err(CompileError::Document(_))
    ));
}
