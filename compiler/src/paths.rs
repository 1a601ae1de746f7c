//! Property path enumeration and handle assignment.
//!
//! A trait's properties are addressed by small integer handles that the
//! runtime reader derives purely from enumeration order, so the traversal here
//! is part of the wire format. Handles of already deployed schemas only stay
//! stable if fields are appended, never removed or reordered.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use tracing::trace;
use wdl_tables_schema::{handle_for_index, ROOT_HANDLE, ROOT_SYMBOL};

use crate::{
    error::CompileError,
    types::{NodeId, NodeKind, Schema},
    utils::camelize,
};

/// A root-to-node chain of fields. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    fields: Vec<NodeId>,
}

impl Path {
    fn single(field: NodeId) -> Path {
        Path { fields: vec![field] }
    }

    fn child(&self, field: NodeId) -> Path {
        let mut fields = self.fields.clone();
        fields.push(field);
        Path { fields }
    }

    pub fn fields(&self) -> &[NodeId] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The field this path addresses.
    pub fn last(&self) -> NodeId {
        self.fields[self.fields.len() - 1]
    }

    /// Fields of the enclosing path, empty for top-level properties.
    pub fn prefix(&self) -> &[NodeId] {
        &self.fields[..self.fields.len() - 1]
    }

    /// Handle symbol, e.g. `Settings_Timeout` for `settings.timeout`.
    pub fn symbol(&self, schema: &Schema) -> String {
        symbol_for(schema, &self.fields)
    }

    /// Dotted base names, for diagnostics.
    pub fn dotted(&self, schema: &Schema) -> String {
        self.fields
            .iter()
            .map(|&f| schema.base_name(f))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Underscore-joined camelized base names of `fields`; `Root` when empty.
pub fn symbol_for(schema: &Schema, fields: &[NodeId]) -> String {
    if fields.is_empty() {
        return ROOT_SYMBOL.to_string();
    }
    fields
        .iter()
        .map(|&f| camelize(schema.base_name(f)))
        .collect::<Vec<_>>()
        .join("_")
}

/// The fields whose paths a unit's handles start from.
pub fn top_level_fields<'a>(schema: &'a Schema, unit: NodeId) -> Result<&'a [NodeId], CompileError> {
    match &schema.node(unit).kind {
        NodeKind::Trait(t) => Ok(&t.state_list),
        NodeKind::Struct(s) => Ok(&s.field_list),
        NodeKind::Typespace(_) => Ok(&[]),
        other => Err(CompileError::integrity(
            schema.full_name(unit),
            schema.base_name(unit),
            format!("a {} has no property paths", other.label()),
        )),
    }
}

/// Enumerate the handle-bearing paths of a trait, struct or typespace.
///
/// Each top-level field is emitted and then, if it is a struct, its members
/// immediately after it (depth first, in declaration order) before the next
/// sibling. Arrays and well-known types are leaves. A dictionary's value path
/// is queued behind every path still pending at the time the dictionary is
/// emitted.
pub fn enumerate_paths(schema: &Schema, unit: NodeId) -> Result<Vec<Path>, CompileError> {
    let mut queue: VecDeque<Path> = top_level_fields(schema, unit)?
        .iter()
        .map(|&f| Path::single(f))
        .collect();
    let mut out = Vec::new();

    while let Some(path) = queue.pop_front() {
        let last = path.last();
        let field = schema.field(last).ok_or_else(|| {
            CompileError::integrity(
                schema.full_name(unit),
                path.dotted(schema),
                format!("path ends at a {}, not a field", schema.node(last).kind.label()),
            )
        })?;

        if field.is_map {
            if let Some(value) = field.map_value {
                queue.push_back(path.child(value));
            }
        } else if field.is_struct() && !field.is_standard && !field.is_array {
            for &child in field.field_list.iter().rev() {
                queue.push_front(path.child(child));
            }
        }

        trace!(unit = %schema.base_name(unit), path = %path.dotted(schema), "enumerated path");
        out.push(path);
    }

    Ok(out)
}

/// One row of the runtime's property map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyRow {
    pub handle:        u32,
    pub symbol:        String,
    pub parent_symbol: String,
    pub parent_handle: u32,
    pub number:        u32,
    /// Base name of the addressed field, for the renderer's trailing comment.
    pub name:          String,
}

/// Handle table of one unit: the enumerated paths plus an explicit
/// index-to-parent-index map. The runtime only ever sees symbols; the parent
/// indices exist to prove every parent symbol names an earlier row.
#[derive(Debug, Clone)]
pub struct HandleTable {
    paths:   Vec<Path>,
    symbols: Vec<String>,
    parents: Vec<Option<usize>>,
}

impl HandleTable {
    /// Enumerate and check the unit's paths.
    ///
    /// Fails with `SchemaIntegrity` if a path wanders outside `unit` or a
    /// parent symbol does not resolve to an earlier row, and with
    /// `AmbiguousName` if two paths share a symbol.
    pub fn build(schema: &Schema, unit: NodeId) -> Result<HandleTable, CompileError> {
        let paths = enumerate_paths(schema, unit)?;
        let unit_name = schema.full_name(unit);

        let mut symbols = Vec::with_capacity(paths.len());
        let mut parents = Vec::with_capacity(paths.len());
        let mut by_symbol: HashMap<String, usize> = HashMap::new();

        for (index, path) in paths.iter().enumerate() {
            for &field in path.fields() {
                if !schema.is_within(field, unit) {
                    return Err(CompileError::integrity(
                        unit_name.clone(),
                        path.dotted(schema),
                        format!("field {} is outside the compiled unit", schema.full_name(field)),
                    ));
                }
            }

            let symbol = path.symbol(schema);
            if let Some(&earlier) = by_symbol.get(&symbol) {
                return Err(CompileError::AmbiguousName {
                    unit:   unit_name,
                    symbol,
                    first:  paths[earlier].dotted(schema),
                    second: path.dotted(schema),
                });
            }

            let parent = if path.len() == 1 {
                None
            } else {
                let parent_symbol = symbol_for(schema, path.prefix());
                match by_symbol.get(&parent_symbol) {
                    Some(&p) if p < index => Some(p),
                    _ => {
                        return Err(CompileError::integrity(
                            unit_name,
                            path.dotted(schema),
                            format!("parent handle {} is not defined before this property", parent_symbol),
                        ))
                    }
                }
            };

            by_symbol.insert(symbol.clone(), index);
            symbols.push(symbol);
            parents.push(parent);
        }

        Ok(HandleTable {
            paths,
            symbols,
            parents,
        })
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn symbol(&self, index: usize) -> &str {
        &self.symbols[index]
    }

    /// Index of the enclosing path's row, `None` for top-level properties.
    pub fn parent_index(&self, index: usize) -> Option<usize> {
        self.parents[index]
    }

    pub fn handle(&self, index: usize) -> u32 {
        handle_for_index(index)
    }

    /// Length of the longest path; at least 1 even for an empty table.
    pub fn tree_depth(&self) -> u32 {
        self.paths.iter().map(|p| p.len() as u32).max().unwrap_or(1)
    }

    /// Property map rows in handle order.
    pub fn rows(&self, schema: &Schema) -> Vec<PropertyRow> {
        self.paths
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let (parent_symbol, parent_handle) = match self.parents[index] {
                    Some(p) => (self.symbols[p].clone(), handle_for_index(p)),
                    None => (ROOT_SYMBOL.to_string(), ROOT_HANDLE),
                };
                let node = schema.node(path.last());
                PropertyRow {
                    handle: handle_for_index(index),
                    symbol: self.symbols[index].clone(),
                    parent_symbol,
                    parent_handle,
                    number: node.number,
                    name: node.base_name.clone(),
                }
            })
            .collect()
    }
}
