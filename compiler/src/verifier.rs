use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::CompileError,
    types::{NodeId, NodeKind, Schema},
    utils::quote,
    version::extends_chain,
};

/// Returns `Ok(())` if every unit of the schema passes verification, or the
/// first failure otherwise.
pub fn verify_schema(schema: &Schema) -> Result<(), CompileError> {
    // 1) Extends graph: every chain acyclic and trait-to-trait. Checked first so
    // no table is ever computed for a trait on a cycle.
    let mut state: HashMap<NodeId, u8> = HashMap::new();
    for &root in schema.roots() {
        check_extends(schema, root, &mut state)?;
    }

    // 2) Per-unit checks
    for &root in schema.roots() {
        verify_unit(schema, root)?;
    }

    debug!(units = schema.roots().len(), "schema verified");
    Ok(())
}

/// Depth-first walk over `extends`; state 1 is "on the current chain", 2 is
/// "fully checked".
fn check_extends(
    schema: &Schema,
    id: NodeId,
    state: &mut HashMap<NodeId, u8>,
) -> Result<(), CompileError> {
    match state.get(&id) {
        Some(1) => {
            return Err(CompileError::integrity(
                schema.full_name(id),
                schema.base_name(id),
                format!("Recursive extends of {} is not allowed", quote(&schema.full_name(id))),
            ))
        }
        Some(2) => return Ok(()),
        _ => {}
    }

    let Some(t) = schema.trait_(id) else {
        return Ok(());
    };
    state.insert(id, 1);
    if let Some(base) = t.extends {
        if schema.trait_(base).is_none() {
            return Err(CompileError::integrity(
                schema.full_name(id),
                schema.base_name(id),
                format!("{} extends {}, which is not a trait", quote(&schema.full_name(id)), quote(&schema.full_name(base))),
            ));
        }
        check_extends(schema, base, state)?;
    }
    state.insert(id, 2);
    Ok(())
}

/// Checks that must hold before any table of `unit` is trusted: an acyclic
/// extends chain, a derived trait keeping its base's fields and numbers, a
/// sane version, and unique names and numbers in every sibling list.
pub fn verify_unit(schema: &Schema, unit: NodeId) -> Result<(), CompileError> {
    let unit_name = schema.full_name(unit);

    if let Some(t) = schema.trait_(unit) {
        if t.version == 0 {
            return Err(CompileError::integrity(
                unit_name,
                schema.base_name(unit),
                "trait version must be at least 1",
            ));
        }
        extends_chain(schema, unit)?;
        if let Some(base) = t.extends {
            verify_extends_fields(schema, unit, base)?;
        }
    }

    verify_siblings(schema, &unit_name, unit)
}

/// A derived trait must carry every field of its base under the same number.
fn verify_extends_fields(schema: &Schema, unit: NodeId, base: NodeId) -> Result<(), CompileError> {
    let (Some(derived), Some(base_trait)) = (schema.trait_(unit), schema.trait_(base)) else {
        return Ok(());
    };

    for &super_field in &base_trait.state_list {
        let name = schema.base_name(super_field);
        let sub_field = derived
            .state_list
            .iter()
            .copied()
            .find(|&f| schema.base_name(f) == name);
        match sub_field {
            None => {
                return Err(CompileError::integrity(
                    schema.full_name(unit),
                    name,
                    format!("extends {}, but is missing field {}", schema.full_name(base), quote(name)),
                ))
            }
            Some(f) if schema.node(f).number != schema.node(super_field).number => {
                return Err(CompileError::integrity(
                    schema.full_name(unit),
                    name,
                    format!("extends {}, but the numbers for field {} do not match", schema.full_name(base), quote(name)),
                ))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Names and numbers are unique within each child list, recursively. Enum
/// pairs are checked the same way.
fn verify_siblings(schema: &Schema, unit: &str, id: NodeId) -> Result<(), CompileError> {
    if let NodeKind::Enum(e) = &schema.node(id).kind {
        let mut names = Vec::new();
        let mut numbers = Vec::new();
        for pair in &e.pair_list {
            if names.contains(&pair.base_name.as_str()) {
                return Err(CompileError::integrity(
                    unit,
                    format!("{}.{}", schema.base_name(id), pair.base_name),
                    format!("The name {} is used twice", quote(&pair.base_name)),
                ));
            }
            if numbers.contains(&pair.number) {
                return Err(CompileError::integrity(
                    unit,
                    format!("{}.{}", schema.base_name(id), pair.base_name),
                    format!("The number {} is used twice", pair.number),
                ));
            }
            names.push(pair.base_name.as_str());
            numbers.push(pair.number);
        }
    }

    for (list, children) in schema.child_lists(id) {
        let mut names: HashMap<&str, NodeId> = HashMap::new();
        let mut numbers: HashMap<u32, NodeId> = HashMap::new();
        for &child in children {
            let node = schema.node(child);
            if node.parent != Some(id) {
                return Err(CompileError::integrity(
                    unit,
                    schema.full_name(child),
                    format!("listed in {} of {} but owned elsewhere", list, schema.base_name(id)),
                ));
            }
            if let Some(&other) = names.get(node.base_name.as_str()) {
                return Err(CompileError::integrity(
                    unit,
                    schema.full_name(child),
                    format!("The name {} is used twice in {} (also {})", quote(&node.base_name), list, schema.full_name(other)),
                ));
            }
            if let Some(&other) = numbers.get(&node.number) {
                return Err(CompileError::integrity(
                    unit,
                    schema.full_name(child),
                    format!("The number {} is used twice in {} (also {})", node.number, list, schema.full_name(other)),
                ));
            }
            names.insert(node.base_name.as_str(), child);
            numbers.insert(node.number, child);

            verify_siblings(schema, unit, child)?;
        }
    }
    Ok(())
}
