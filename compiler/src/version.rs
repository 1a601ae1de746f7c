use std::collections::HashSet;

use wdl_tables_schema::{SchemaVersionRange, BASE_EXTENSION_OFFSET};

use crate::{
    error::CompileError,
    paths::enumerate_paths,
    types::{NodeId, NodeKind, Schema},
};

/// Version and inheritance metadata of one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version_range:    Option<SchemaVersionRange>,
    /// First handle past the inherited base's handle range.
    pub extension_offset: u32,
    /// Full name of the extended trait, if any.
    pub extends:          Option<String>,
}

/// Walk the extends chain starting at `id` (exclusive), nearest base first.
///
/// Fails with `SchemaIntegrity` if the chain loops back on itself or reaches
/// something that is not a trait.
pub fn extends_chain(schema: &Schema, id: NodeId) -> Result<Vec<NodeId>, CompileError> {
    let mut seen = HashSet::new();
    seen.insert(id);

    let mut chain = Vec::new();
    let mut current = id;
    while let Some(base) = extends_of(schema, current) {
        if !matches!(schema.get(base).map(|n| &n.kind), Some(NodeKind::Trait(_))) {
            return Err(CompileError::integrity(
                schema.full_name(id),
                schema.full_name(current),
                "extends target is not a trait",
            ));
        }
        if !seen.insert(base) {
            let cycle = std::iter::once(id)
                .chain(chain.iter().copied())
                .chain(std::iter::once(base))
                .map(|n| schema.full_name(n))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(CompileError::integrity(
                schema.full_name(id),
                schema.full_name(current),
                format!("cyclic extends chain {}", cycle),
            ));
        }
        chain.push(base);
        current = base;
    }
    Ok(chain)
}

fn extends_of(schema: &Schema, id: NodeId) -> Option<NodeId> {
    schema.trait_(id).and_then(|t| t.extends)
}

/// Offset at which locally defined handles start: 2 without a base, else the
/// base's path count plus 2.
pub fn extension_offset(schema: &Schema, id: NodeId) -> Result<u32, CompileError> {
    extends_chain(schema, id)?;
    match extends_of(schema, id) {
        None => Ok(BASE_EXTENSION_OFFSET),
        Some(base) => {
            let count = enumerate_paths(schema, base)?.len() as u32;
            Ok(count + BASE_EXTENSION_OFFSET)
        }
    }
}

/// Resolve the version range and extension offset of a unit. Only traits are
/// versioned; everything else gets the base offset and no range.
pub fn resolve(schema: &Schema, id: NodeId) -> Result<VersionInfo, CompileError> {
    let Some(t) = schema.trait_(id) else {
        return Ok(VersionInfo {
            version_range:    None,
            extension_offset: BASE_EXTENSION_OFFSET,
            extends:          None,
        });
    };

    if t.version == 0 {
        return Err(CompileError::integrity(
            schema.full_name(id),
            schema.base_name(id),
            "trait version must be at least 1",
        ));
    }

    Ok(VersionInfo {
        version_range:    SchemaVersionRange::for_version(t.version),
        extension_offset: extension_offset(schema, id)?,
        extends:          t.extends.map(|base| schema.full_name(base)),
    })
}
