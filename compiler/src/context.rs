//! The values handed to the renderer for one compiled unit.
//!
//! Everything here is already final: the renderer only interpolates these
//! into text and never computes handles, bits or encodings itself.

use serde::Serialize;
use wdl_tables_schema::{Bitfield, SchemaVersionRange};

use crate::{
    paths::PropertyRow,
    resource_id::ConstantGroupTable,
    types::Importance,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Trait,
    Typespace,
    Struct,
    Enum,
}

/// A bitfield with its presence flag. `present == false` renders as a null
/// table pointer and always has empty `bytes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BitfieldTable {
    pub present: bool,
    pub bytes:   Vec<u8>,
}

impl From<Option<Bitfield>> for BitfieldTable {
    fn from(bits: Option<Bitfield>) -> Self {
        match bits {
            Some(bits) => BitfieldTable {
                present: true,
                bytes:   bits.into_bytes(),
            },
            None => BitfieldTable::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionRange {
    pub min_version: u32,
    pub max_version: u32,
}

impl From<SchemaVersionRange> for VersionRange {
    fn from(range: SchemaVersionRange) -> Self {
        VersionRange {
            min_version: range.min_version,
            max_version: range.max_version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedNumber {
    pub name:   String,
    pub symbol: String,
    pub number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandTable {
    pub name:       String,
    pub number:     u32,
    pub parameters: Vec<NamedNumber>,
    pub response:   Option<ResponseTable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseTable {
    pub name:   String,
    pub fields: Vec<NamedNumber>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumTable {
    pub name:       String,
    pub is_bitmask: bool,
    pub values:     Vec<NamedNumber>,
}

/// One member of a nested struct, with the flags its schema descriptor
/// carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructFieldRow {
    pub name:        String,
    pub symbol:      String,
    pub number:      u32,
    pub is_optional: bool,
    pub is_nullable: bool,
}

/// A struct declared inside a trait or typespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructTable {
    pub name:   String,
    pub number: u32,
    pub fields: Vec<StructFieldRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTable {
    pub name:                        String,
    pub structure_type:              u32,
    pub importance:                  Importance,
    pub data_schema_version:         u32,
    pub min_compatible_data_version: u32,
}

/// Everything computed for one trait, typespace, or standalone struct or
/// enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitTables {
    pub unit:             String,
    pub kind:             UnitKind,
    pub profile_id:       Option<u32>,
    pub properties:       Vec<PropertyRow>,
    pub handle_count:     u32,
    pub last_handle:      u32,
    pub tree_depth:       u32,
    pub extension_offset: u32,
    pub extends:          Option<String>,
    pub version_range:    Option<VersionRange>,
    pub is_dictionary:    BitfieldTable,
    pub is_optional:      BitfieldTable,
    pub is_nullable:      BitfieldTable,
    pub is_ephemeral:     BitfieldTable,
    pub constant_groups:  Vec<ConstantGroupTable>,
    pub commands:         Vec<CommandTable>,
    pub enums:            Vec<EnumTable>,
    pub structs:          Vec<StructTable>,
    pub events:           Vec<EventTable>,
}
