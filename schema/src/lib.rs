//! Runtime-side wire primitives for WDL property tables.
//!
//! These are the values an embedded data-management engine reads back out of
//! the generated tables: property handles, per-handle attribute bitfields,
//! schema version ranges and resource id encodings. The compiler produces
//! them; this crate is the contract both sides agree on.
//!
//! ```
//! use wdl_tables_schema::*;
//!
//! let optional = Bitfield::pack([false, false, true, false, false]);
//! assert_eq!(optional.as_bytes(), &[0x04]);
//! assert!(optional.get(2));
//! assert_eq!(handle_for_index(2), 4);
//!
//! let id = ResourceId::new(Some(ResourceType::Device), 0x18b4_3000_0000_0001);
//! assert_eq!(id.to_bytes()[..2], [0x00, 0x01]);
//! assert_eq!(id.literal(), "0x18b4300000000001");
//! ```

pub mod bitfield;
pub mod handle;
pub mod resource;

pub use bitfield::*;
pub use handle::*;
pub use resource::*;
