use std::collections::HashMap;
use std::num::IntErrorKind;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::warn;
use wdl_tables_schema::{ResourceId, ResourceType};

use crate::{
    error::CompileError,
    types::{NodeId, NodeKind, Schema},
    utils::{macro_case, quote},
};

/// Default width of a resource id's numeric part.
pub const RESOURCE_ID_WIDTH: u32 = 64;

lazy_static! {
    static ref TYPED_ID: Regex = Regex::new(r"^([A-Z]+)_([0-9A-Fa-f]+)$").unwrap();
    static ref UNTYPED_ID: Regex = Regex::new(r"^(?:0[xX])?([0-9A-Fa-f]+)$").unwrap();
}

/// Parse a constant value such as `DEVICE_18B4300000000001` or
/// `0x18B4300000000001`. The number must fit in `width` bits (8..=64).
pub fn parse_resource_id(
    unit: &str,
    constant: &str,
    value: &str,
    width: u32,
) -> Result<ResourceId, CompileError> {
    let invalid = |msg: String| CompileError::InvalidLiteral {
        unit:     unit.to_string(),
        constant: constant.to_string(),
        value:    quote(value),
        msg,
    };
    let overflow = || CompileError::EncodingOverflow {
        unit:     unit.to_string(),
        constant: constant.to_string(),
        value:    quote(value),
        width,
    };

    if !(8..=64).contains(&width) {
        return Err(invalid(format!("target width {} is outside 8..=64 bits", width)));
    }

    let (resource_type, digits) = if let Some(caps) = TYPED_ID.captures(value) {
        let name = caps.get(1).map_or("", |m| m.as_str());
        let ty = ResourceType::from_name(name)
            .ok_or_else(|| invalid(format!("unknown resource type {}", quote(name))))?;
        (Some(ty), caps.get(2).map_or("", |m| m.as_str()))
    } else if let Some(caps) = UNTYPED_ID.captures(value) {
        (None, caps.get(1).map_or("", |m| m.as_str()))
    } else {
        return Err(invalid("expected TYPE_HEX or a hexadecimal number".to_string()));
    };

    let number = u64::from_str_radix(digits, 16).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => overflow(),
        _ => invalid(e.to_string()),
    })?;
    if width < 64 && number >> width != 0 {
        return Err(overflow());
    }

    Ok(ResourceId::new(resource_type, number))
}

/// Both encodings of one resource id constant plus the value it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedConstant {
    pub name:   String,
    pub symbol: String,
    /// Big-endian byte-array form.
    pub bytes:  Vec<u8>,
    /// The number as a 64-bit hex literal.
    pub literal: String,
    /// The schema's value text, unmodified, for the audit comment.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantGroupTable {
    pub name:      String,
    pub number:    u32,
    pub constants: Vec<EncodedConstant>,
}

/// Macro symbol of a constant: its upper snake name with the group's own name
/// stripped off the front, so `RESOURCE_ID_HUB` in group `ResourceId` is `HUB`.
pub fn constant_symbol(group: &str, constant: &str) -> String {
    let name = macro_case(constant);
    let prefix = format!("{}_", macro_case(group));
    match name.strip_prefix(&prefix) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => name,
    }
}

pub fn encode_constant(
    schema: &Schema,
    unit: &str,
    group: NodeId,
    constant: NodeId,
    width: u32,
) -> Result<EncodedConstant, CompileError> {
    let name = schema.base_name(constant);
    let value = schema
        .constant(constant)
        .map(|c| c.value.as_str())
        .ok_or_else(|| CompileError::integrity(unit, name, "not a constant"))?;

    let id = parse_resource_id(unit, name, value, width)?;
    Ok(EncodedConstant {
        name:    name.to_string(),
        symbol:  constant_symbol(schema.base_name(group), name),
        bytes:   id.to_bytes(),
        literal: id.literal(),
        source:  value.to_string(),
    })
}

/// Encode every constant of every group in `groups`.
///
/// A constant that fails does not stop its siblings; all failures come back
/// together as `ConstantsFailed`. Two constants with the same symbol anywhere
/// in the unit are an `AmbiguousName`.
pub fn encode_constant_groups(
    schema: &Schema,
    unit: &str,
    groups: &[NodeId],
    width: u32,
) -> Result<Vec<ConstantGroupTable>, CompileError> {
    let mut tables = Vec::with_capacity(groups.len());
    let mut errors = Vec::new();
    let mut seen: HashMap<String, String> = HashMap::new();

    for &group in groups {
        let NodeKind::ConstantGroup(g) = &schema.node(group).kind else {
            return Err(CompileError::integrity(unit, schema.base_name(group), "not a constant group"));
        };

        let mut constants = Vec::with_capacity(g.constant_list.len());
        for &constant in &g.constant_list {
            let qualified = format!("{}.{}", schema.base_name(group), schema.base_name(constant));
            let symbol = constant_symbol(schema.base_name(group), schema.base_name(constant));
            if let Some(first) = seen.get(&symbol) {
                return Err(CompileError::AmbiguousName {
                    unit:   unit.to_string(),
                    symbol,
                    first:  first.clone(),
                    second: qualified,
                });
            }
            seen.insert(symbol, qualified);

            match encode_constant(schema, unit, group, constant, width) {
                Ok(encoded) => constants.push(encoded),
                Err(e) => {
                    warn!(unit, constant = %schema.base_name(constant), "{}", e);
                    errors.push(e);
                }
            }
        }

        tables.push(ConstantGroupTable {
            name: schema.base_name(group).to_string(),
            number: schema.node(group).number,
            constants,
        });
    }

    if errors.is_empty() {
        Ok(tables)
    } else {
        Err(CompileError::ConstantsFailed {
            unit: unit.to_string(),
            errors,
        })
    }
}
