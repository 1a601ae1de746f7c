//! Builds a [`Schema`] from the JSON dump the WDL front end writes.
//!
//! ```json
//! {
//!   "traits": [{
//!     "name": "weave.trait.security.BoltLockTrait",
//!     "number": 2, "version": 2,
//!     "state": [{ "name": "state", "number": 1, "type": "enum" }]
//!   }]
//! }
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::{
    error::CompileError,
    types::{DataType, Field, Importance, NodeId, Schema},
    utils::quote,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SchemaDocument {
    pub typespaces: Vec<TypespaceDoc>,
    pub traits:     Vec<TraitDoc>,
    pub structs:    Vec<StructDoc>,
    pub enums:      Vec<EnumDoc>,
}

#[derive(Debug, Deserialize)]
pub struct TypespaceDoc {
    pub name:            String,
    #[serde(default = "default_version")]
    pub version:         u32,
    #[serde(default)]
    pub enums:           Vec<EnumDoc>,
    #[serde(default)]
    pub structs:         Vec<StructDoc>,
    #[serde(default)]
    pub constant_groups: Vec<ConstantGroupDoc>,
}

#[derive(Debug, Deserialize)]
pub struct TraitDoc {
    pub name:            String,
    pub number:          u32,
    #[serde(default)]
    pub vendor:          u16,
    #[serde(default = "default_version")]
    pub version:         u32,
    #[serde(default)]
    pub extends:         Option<String>,
    #[serde(default)]
    pub state:           Vec<FieldDoc>,
    #[serde(default)]
    pub enums:           Vec<EnumDoc>,
    #[serde(default)]
    pub commands:        Vec<CommandDoc>,
    #[serde(default)]
    pub constant_groups: Vec<ConstantGroupDoc>,
    #[serde(default)]
    pub structs:         Vec<StructDoc>,
    #[serde(default)]
    pub events:          Vec<EventDoc>,
}

#[derive(Debug, Deserialize)]
pub struct StructDoc {
    pub name:     String,
    #[serde(default)]
    pub number:   u32,
    #[serde(default)]
    pub standard: bool,
    #[serde(default)]
    pub fields:   Vec<FieldDoc>,
}

#[derive(Debug, Deserialize)]
pub struct EventDoc {
    pub name:       String,
    pub number:     u32,
    #[serde(default = "default_importance")]
    pub importance: Importance,
    #[serde(default)]
    pub fields:     Vec<FieldDoc>,
}

#[derive(Debug, Deserialize)]
pub struct EnumDoc {
    pub name:    String,
    #[serde(default)]
    pub number:  u32,
    #[serde(default)]
    pub bitmask: bool,
    #[serde(default)]
    pub values:  Vec<EnumValueDoc>,
}

#[derive(Debug, Deserialize)]
pub struct EnumValueDoc {
    pub name:   String,
    pub number: u32,
}

#[derive(Debug, Deserialize)]
pub struct CommandDoc {
    pub name:       String,
    pub number:     u32,
    #[serde(default)]
    pub parameters: Vec<FieldDoc>,
    #[serde(default)]
    pub response:   Option<StructDoc>,
}

#[derive(Debug, Deserialize)]
pub struct ConstantGroupDoc {
    pub name:      String,
    #[serde(default)]
    pub number:    u32,
    #[serde(default)]
    pub constants: Vec<ConstantDoc>,
}

#[derive(Debug, Deserialize)]
pub struct ConstantDoc {
    pub name:   String,
    pub number: u32,
    pub value:  String,
}

#[derive(Debug, Deserialize)]
pub struct FieldDoc {
    pub name:      String,
    pub number:    u32,
    #[serde(default, rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub optional:  bool,
    #[serde(default)]
    pub nullable:  bool,
    #[serde(default)]
    pub map:       bool,
    #[serde(default)]
    pub ephemeral: bool,
    #[serde(default)]
    pub array:     bool,
    #[serde(default)]
    pub standard:  bool,
    #[serde(default)]
    pub fields:    Vec<FieldDoc>,
    #[serde(default)]
    pub map_value: Option<Box<FieldDoc>>,
}

fn default_version() -> u32 {
    1
}

fn default_importance() -> Importance {
    Importance::Debug
}

/// Parse a JSON schema document and build the schema tree from it.
pub fn load_schema(text: &str) -> Result<Schema, CompileError> {
    let document: SchemaDocument = serde_json::from_str(text)?;
    build_schema(&document)
}

/// Build the schema tree. Roots come out in document order: typespaces,
/// traits, then standalone structs and enums. `extends` names are resolved
/// against the traits of the same document.
pub fn build_schema(document: &SchemaDocument) -> Result<Schema, CompileError> {
    let mut schema = Schema::new();

    for doc in &document.typespaces {
        let (namespace, name) = split_name(&doc.name);
        let id = schema.add_typespace(namespace, name);
        schema.set_version(id, doc.version)?;
        add_enums(&mut schema, id, &doc.enums)?;
        add_structs(&mut schema, Some(id), &doc.structs)?;
        add_constant_groups(&mut schema, id, &doc.constant_groups)?;
    }

    let mut traits: HashMap<&str, NodeId> = HashMap::new();
    for doc in &document.traits {
        let (namespace, name) = split_name(&doc.name);
        let id = schema.add_trait(namespace, name, doc.number);
        schema.set_version(id, doc.version)?;
        schema.set_vendor(id, doc.vendor)?;
        add_fields(&mut schema, id, &doc.state)?;
        add_enums(&mut schema, id, &doc.enums)?;
        add_commands(&mut schema, id, &doc.commands)?;
        add_constant_groups(&mut schema, id, &doc.constant_groups)?;
        add_structs(&mut schema, Some(id), &doc.structs)?;
        for event in &doc.events {
            let event_id = schema.add_event(id, &event.name, event.number, event.importance)?;
            add_fields(&mut schema, event_id, &event.fields)?;
        }
        traits.insert(doc.name.as_str(), id);
    }

    for doc in &document.traits {
        if let (Some(base), Some(&id)) = (&doc.extends, traits.get(doc.name.as_str())) {
            let base_id = traits.get(base.as_str()).copied().ok_or_else(|| {
                CompileError::integrity(
                    doc.name.clone(),
                    "extends",
                    format!("extends unknown trait {}", quote(base)),
                )
            })?;
            schema.set_extends(id, base_id)?;
        }
    }

    add_structs(&mut schema, None, &document.structs)?;
    for doc in &document.enums {
        let (namespace, name) = split_name(&doc.name);
        let values: Vec<(&str, u32)> = doc.values.iter().map(|v| (v.name.as_str(), v.number)).collect();
        let id = schema.add_enum(None, namespace, name, doc.number, &values)?;
        schema.set_bitmask(id, doc.bitmask)?;
    }

    debug!(nodes = schema.len(), roots = schema.roots().len(), "schema loaded");
    Ok(schema)
}

/// `weave.trait.security.BoltLockTrait` → (`weave.trait.security`, `BoltLockTrait`).
fn split_name(full_name: &str) -> (&str, &str) {
    full_name.rsplit_once('.').unwrap_or(("", full_name))
}

fn add_fields(schema: &mut Schema, parent: NodeId, fields: &[FieldDoc]) -> Result<(), CompileError> {
    for doc in fields {
        let id = schema.add_field(parent, &doc.name, doc.number, field_of(doc))?;
        add_fields(schema, id, &doc.fields)?;
        if let Some(value) = &doc.map_value {
            let value_id = schema.set_map_value(id, &value.name, field_of(value))?;
            add_fields(schema, value_id, &value.fields)?;
        }
    }
    Ok(())
}

fn field_of(doc: &FieldDoc) -> Field {
    Field {
        data_type:    doc.data_type,
        is_optional:  doc.optional,
        is_nullable:  doc.nullable,
        is_map:       doc.map,
        is_ephemeral: doc.ephemeral,
        is_array:     doc.array,
        is_standard:  doc.standard,
        ..Field::default()
    }
}

fn add_structs(schema: &mut Schema, parent: Option<NodeId>, structs: &[StructDoc]) -> Result<(), CompileError> {
    for doc in structs {
        let (namespace, name) = match parent {
            Some(_) => ("", doc.name.as_str()),
            None => split_name(&doc.name),
        };
        let id = schema.add_struct(parent, namespace, name, doc.number)?;
        schema.set_standard(id, doc.standard)?;
        add_fields(schema, id, &doc.fields)?;
    }
    Ok(())
}

fn add_enums(schema: &mut Schema, parent: NodeId, enums: &[EnumDoc]) -> Result<(), CompileError> {
    for doc in enums {
        let values: Vec<(&str, u32)> = doc.values.iter().map(|v| (v.name.as_str(), v.number)).collect();
        let id = schema.add_enum(Some(parent), "", &doc.name, doc.number, &values)?;
        schema.set_bitmask(id, doc.bitmask)?;
    }
    Ok(())
}

fn add_commands(schema: &mut Schema, parent: NodeId, commands: &[CommandDoc]) -> Result<(), CompileError> {
    for doc in commands {
        let id = schema.add_command(parent, &doc.name, doc.number)?;
        add_fields(schema, id, &doc.parameters)?;
        if let Some(response) = &doc.response {
            let response_id = schema.add_response(id, &response.name, response.number)?;
            add_fields(schema, response_id, &response.fields)?;
        }
    }
    Ok(())
}

fn add_constant_groups(
    schema: &mut Schema,
    parent: NodeId,
    groups: &[ConstantGroupDoc],
) -> Result<(), CompileError> {
    for doc in groups {
        let id = schema.add_constant_group(parent, &doc.name, doc.number)?;
        for constant in &doc.constants {
            schema.add_constant(id, &constant.name, constant.number, &constant.value)?;
        }
    }
    Ok(())
}
