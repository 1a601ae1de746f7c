//! wdl-tables
//!
//! Entry point for driving the WDL property table compiler.
//!
//! - Schema model, loader and compiler (re-exported from the compiler crate)
//! - Wire primitives the runtime reads back (re-exported from the schema crate)
//! - `compile_to_json` for the common "schema dump in, tables out" case

pub use wdl_tables_compiler::error::CompileError;
pub use wdl_tables_compiler::{
    classify, compile_schema, compile_unit, load_schema, CompileOptions, Schema, UnitKind,
    UnitTables,
};
pub use wdl_tables_schema::{Bitfield, ResourceId, ResourceType, SchemaVersionRange};

/// Compile a JSON schema document into pretty-printed JSON tables, one entry
/// per unit.
pub fn compile_to_json(text: &str, options: &CompileOptions) -> Result<String, CompileError> {
    let schema = load_schema(text)?;
    let tables = compile_schema(&schema, options)?;
    Ok(serde_json::to_string_pretty(&tables)?)
}

pub mod error {
    pub use wdl_tables_compiler::error::CompileError;
}

pub mod compiler {
    pub use wdl_tables_compiler::*;
}

pub mod schema {
    pub use wdl_tables_schema::*;
}
