//! wdl-tables-compiler
//!
//! This crate implements:
//!  1) An arena schema model for WDL traits, typespaces, structs and enums,
//!     plus a loader for the JSON schema dump,
//!  2) A schema verifier (duplicate numbers, extends cycles, foreign fields, etc.),
//!  3) Property path enumeration and handle assignment (`HandleTable`),
//!  4) Attribute bitfield packing, version/extends resolution and resource id
//!     encoding,
//!  5) Unit compilation (`compile_unit` / `compile_schema` → `UnitTables`),
//!  6) Error types (`CompileError`).

pub mod error;
pub mod types;
pub mod utils;
pub mod loader;
pub mod verifier;
pub mod paths;
pub mod bitfield;
pub mod version;
pub mod resource_id;
pub mod context;
pub mod compiler;

pub use compiler::{classify, compile_schema, compile_unit, CompileOptions};
pub use context::{UnitKind, UnitTables};
pub use error::CompileError;
pub use loader::load_schema;
pub use paths::{enumerate_paths, HandleTable, Path};
pub use types::{Field, NodeId, Schema};
