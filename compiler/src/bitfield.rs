use serde::Serialize;
use wdl_tables_schema::Bitfield;

use crate::{
    paths::Path,
    types::{Field, Schema},
};

/// Per-property attributes the runtime reads from bitfields, one bit per
/// handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Dictionary,
    Optional,
    Nullable,
    Ephemeral,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Dictionary,
        Attribute::Optional,
        Attribute::Nullable,
        Attribute::Ephemeral,
    ];

    pub fn select(&self, field: &Field) -> bool {
        match self {
            Attribute::Dictionary => field.is_map,
            Attribute::Optional => field.is_optional,
            Attribute::Nullable => field.is_nullable,
            Attribute::Ephemeral => field.is_ephemeral,
        }
    }
}

/// Evaluate `attribute` on the last field of every path, in order.
pub fn select_bits(schema: &Schema, paths: &[Path], attribute: Attribute) -> Vec<bool> {
    paths
        .iter()
        .map(|path| {
            schema
                .field(path.last())
                .map(|field| attribute.select(field))
                .unwrap_or(false)
        })
        .collect()
}

/// Pack `attribute` over `paths`, or `None` when no path has it.
pub fn pack_attribute(schema: &Schema, paths: &[Path], attribute: Attribute) -> Option<Bitfield> {
    let bits = pack_attribute_forced(schema, paths, attribute);
    if bits.any() {
        Some(bits)
    } else {
        None
    }
}

/// Pack `attribute` over `paths` even when every bit is clear.
pub fn pack_attribute_forced(schema: &Schema, paths: &[Path], attribute: Attribute) -> Bitfield {
    Bitfield::pack(select_bits(schema, paths, attribute))
}

/// The four attribute bitfields of one unit. `None` is the runtime's null
/// table pointer, which is not the same thing as a table of zero bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeBitfields {
    pub dictionary: Option<Bitfield>,
    pub optional:   Option<Bitfield>,
    pub nullable:   Option<Bitfield>,
    pub ephemeral:  Option<Bitfield>,
}

impl AttributeBitfields {
    /// Pack all four. With `force_present`, attributes nobody has still get a
    /// zero-filled table instead of `None`.
    pub fn pack(schema: &Schema, paths: &[Path], force_present: bool) -> AttributeBitfields {
        let pack = |attribute| {
            if force_present {
                Some(pack_attribute_forced(schema, paths, attribute))
            } else {
                pack_attribute(schema, paths, attribute)
            }
        };
        AttributeBitfields {
            dictionary: pack(Attribute::Dictionary),
            optional:   pack(Attribute::Optional),
            nullable:   pack(Attribute::Nullable),
            ephemeral:  pack(Attribute::Ephemeral),
        }
    }

    pub fn get(&self, attribute: Attribute) -> Option<&Bitfield> {
        match attribute {
            Attribute::Dictionary => self.dictionary.as_ref(),
            Attribute::Optional => self.optional.as_ref(),
            Attribute::Nullable => self.nullable.as_ref(),
            Attribute::Ephemeral => self.ephemeral.as_ref(),
        }
    }
}
