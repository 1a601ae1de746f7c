use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    bitfield::AttributeBitfields,
    context::{
        CommandTable, EnumTable, EventTable, NamedNumber, ResponseTable, StructFieldRow,
        StructTable, UnitKind, UnitTables,
    },
    error::CompileError,
    paths::HandleTable,
    resource_id::{encode_constant_groups, RESOURCE_ID_WIDTH},
    types::{Importance, NodeId, NodeKind, Schema, Trait},
    utils::{camelize, underscore},
    verifier::{verify_schema, verify_unit},
    version::{self, extends_chain},
};

/// Knobs of a compilation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Width in bits a resource id's number must fit in.
    pub resource_id_width: u32,
    /// Emit zero-filled bitfields instead of leaving unused ones absent.
    pub force_bitfields:   bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            resource_id_width: RESOURCE_ID_WIDTH,
            force_bitfields:   false,
        }
    }
}

impl CompileOptions {
    pub fn validate(&self) -> Result<(), CompileError> {
        if !(8..=64).contains(&self.resource_id_width) {
            return Err(CompileError::Options(format!(
                "resource id width {} is outside 8..=64 bits",
                self.resource_id_width
            )));
        }
        Ok(())
    }
}

/// Which compiler entry point applies to a node, if any.
///
/// Traits and typespaces are always units. Structs and enums are units only
/// when they stand alone: ones declared inside a trait or typespace are
/// emitted with it, and well-known structs are never emitted.
pub fn classify(schema: &Schema, id: NodeId) -> Option<UnitKind> {
    let node = schema.get(id)?;
    match &node.kind {
        NodeKind::Trait(_) => Some(UnitKind::Trait),
        NodeKind::Typespace(_) => Some(UnitKind::Typespace),
        NodeKind::Struct(s) if node.parent.is_none() && !s.is_standard => Some(UnitKind::Struct),
        NodeKind::Enum(_) if node.parent.is_none() => Some(UnitKind::Enum),
        NodeKind::Struct(_)
        | NodeKind::Enum(_)
        | NodeKind::Command(_)
        | NodeKind::Field(_)
        | NodeKind::ConstantGroup(_)
        | NodeKind::Constant(_) => None,
    }
}

/// Compile a single unit into its tables. Nothing is returned unless every
/// table of the unit could be computed.
pub fn compile_unit(
    schema: &Schema,
    unit: NodeId,
    options: &CompileOptions,
) -> Result<UnitTables, CompileError> {
    options.validate()?;
    let unit_name = schema.full_name(unit);
    let kind = classify(schema, unit).ok_or_else(|| {
        CompileError::integrity(
            unit_name.clone(),
            schema.base_name(unit),
            format!("a nested {} is not a compilation unit", schema.node(unit).kind.label()),
        )
    })?;

    verify_unit(schema, unit)?;

    let (table, bitfields) = match kind {
        UnitKind::Enum => (None, AttributeBitfields::default()),
        _ => {
            let table = HandleTable::build(schema, unit)?;
            let bitfields = AttributeBitfields::pack(schema, table.paths(), options.force_bitfields);
            (Some(table), bitfields)
        }
    };
    let version = version::resolve(schema, unit)?;

    let node = schema.node(unit);
    let (profile_id, constant_groups, commands, enums, structs, events) = match &node.kind {
        NodeKind::Trait(t) => (
            Some(trait_profile_id(schema, unit, t)?),
            encode_constant_groups(schema, &unit_name, &t.constant_group_list, options.resource_id_width)?,
            command_tables(schema, &t.command_list),
            enum_tables(schema, &t.enum_list),
            // fieldless trait structs have no descriptor
            struct_tables(schema, &t.struct_list)
                .into_iter()
                .filter(|s| !s.fields.is_empty())
                .collect::<Vec<_>>(),
            event_tables(schema, &t.event_list, t.version),
        ),
        NodeKind::Typespace(t) => (
            None,
            encode_constant_groups(schema, &unit_name, &t.constant_group_list, options.resource_id_width)?,
            Vec::new(),
            enum_tables(schema, &t.enum_list),
            struct_tables(schema, &t.struct_list),
            Vec::new(),
        ),
        NodeKind::Enum(_) => (None, Vec::new(), Vec::new(), enum_tables(schema, &[unit]), Vec::new(), Vec::new()),
        _ => (None, Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new()),
    };

    let properties = table.as_ref().map(|t| t.rows(schema)).unwrap_or_default();
    let handle_count = properties.len() as u32;
    let tree_depth = table.as_ref().map_or(1, |t| t.tree_depth());

    debug!(
        unit = %unit_name,
        handles = handle_count,
        extension_offset = version.extension_offset,
        "compiled unit"
    );

    Ok(UnitTables {
        unit: unit_name,
        kind,
        profile_id,
        properties,
        handle_count,
        last_handle: wdl_tables_schema::last_handle(handle_count as usize),
        tree_depth,
        extension_offset: version.extension_offset,
        extends: version.extends,
        version_range: version.version_range.map(Into::into),
        is_dictionary: bitfields.dictionary.into(),
        is_optional: bitfields.optional.into(),
        is_nullable: bitfields.nullable.into(),
        is_ephemeral: bitfields.ephemeral.into(),
        constant_groups,
        commands,
        enums,
        structs,
        events,
    })
}

/// Verify the whole schema, then compile every top-level unit.
///
/// Units are grouped by the depth of their extends chain and each group is
/// compiled in parallel once the group before it is done, so a base trait is
/// always finished before anything extending it. The result is in schema
/// order.
pub fn compile_schema(schema: &Schema, options: &CompileOptions) -> Result<Vec<UnitTables>, CompileError> {
    options.validate()?;
    verify_schema(schema)?;

    let mut levels: BTreeMap<usize, Vec<(usize, NodeId)>> = BTreeMap::new();
    for (position, &id) in schema.roots().iter().enumerate() {
        if classify(schema, id).is_none() {
            continue;
        }
        let depth = extends_chain(schema, id)?.len();
        levels.entry(depth).or_default().push((position, id));
    }

    let mut compiled: Vec<(usize, UnitTables)> = Vec::new();
    for (depth, units) in levels {
        debug!(depth, units = units.len(), "compiling extends level");
        let level = units
            .par_iter()
            .map(|&(position, id)| compile_unit(schema, id, options).map(|tables| (position, tables)))
            .collect::<Result<Vec<_>, CompileError>>()?;
        compiled.extend(level);
    }
    compiled.sort_by_key(|(position, _)| *position);

    info!(units = compiled.len(), "schema compiled");
    Ok(compiled.into_iter().map(|(_, tables)| tables).collect())
}

/// `(vendor << 16) | number`. The trait number owns the low 16 bits only.
fn trait_profile_id(schema: &Schema, unit: NodeId, t: &Trait) -> Result<u32, CompileError> {
    let number = schema.node(unit).number;
    if number > u16::MAX as u32 {
        return Err(CompileError::integrity(
            schema.full_name(unit),
            schema.base_name(unit),
            format!("trait number {:#x} does not fit in 16 bits", number),
        ));
    }
    Ok(((t.vendor as u32) << 16) | number)
}

fn field_numbers(schema: &Schema, fields: &[NodeId]) -> Vec<NamedNumber> {
    fields
        .iter()
        .map(|&f| NamedNumber {
            name:   schema.base_name(f).to_string(),
            symbol: camelize(schema.base_name(f)),
            number: schema.node(f).number,
        })
        .collect()
}

fn command_tables(schema: &Schema, commands: &[NodeId]) -> Vec<CommandTable> {
    commands
        .iter()
        .filter_map(|&id| match &schema.node(id).kind {
            NodeKind::Command(c) => Some(CommandTable {
                name:       schema.base_name(id).to_string(),
                number:     schema.node(id).number,
                parameters: field_numbers(schema, &c.parameter_list),
                response:   c.response.and_then(|r| match &schema.node(r).kind {
                    NodeKind::Struct(s) => Some(ResponseTable {
                        name:   schema.base_name(r).to_string(),
                        fields: field_numbers(schema, &s.field_list),
                    }),
                    _ => None,
                }),
            }),
            _ => None,
        })
        .collect()
}

fn enum_tables(schema: &Schema, enums: &[NodeId]) -> Vec<EnumTable> {
    enums
        .iter()
        .filter_map(|&id| match &schema.node(id).kind {
            NodeKind::Enum(e) => Some(EnumTable {
                name:       schema.base_name(id).to_string(),
                is_bitmask: e.is_bitmask,
                values:     e
                    .pair_list
                    .iter()
                    .map(|pair| NamedNumber {
                        name:   pair.base_name.clone(),
                        symbol: camelize(&underscore(&pair.base_name)),
                        number: pair.number,
                    })
                    .collect(),
            }),
            _ => None,
        })
        .collect()
}

fn struct_tables(schema: &Schema, structs: &[NodeId]) -> Vec<StructTable> {
    structs
        .iter()
        .filter_map(|&id| match &schema.node(id).kind {
            NodeKind::Struct(s) if !s.is_standard => Some(StructTable {
                name:   schema.base_name(id).to_string(),
                number: schema.node(id).number,
                fields: s
                    .field_list
                    .iter()
                    .filter_map(|&f| {
                        schema.field(f).map(|field| StructFieldRow {
                            name:        schema.base_name(f).to_string(),
                            symbol:      camelize(schema.base_name(f)),
                            number:      schema.node(f).number,
                            is_optional: field.is_optional,
                            is_nullable: field.is_nullable,
                        })
                    })
                    .collect(),
            }),
            _ => None,
        })
        .collect()
}

fn event_tables(schema: &Schema, events: &[NodeId], version: u32) -> Vec<EventTable> {
    events
        .iter()
        .filter_map(|&id| match &schema.node(id).kind {
            NodeKind::Struct(s) => Some(EventTable {
                name:                        schema.base_name(id).to_string(),
                structure_type:              schema.node(id).number,
                importance:                  s.importance.unwrap_or(Importance::Debug),
                data_schema_version:         version,
                min_compatible_data_version: 1,
            }),
            _ => None,
        })
        .collect()
}
