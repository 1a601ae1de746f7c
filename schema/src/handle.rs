/// Handle of the trait's top level. Every top-level property's parent.
pub const ROOT_HANDLE: u32 = 1;

/// Symbol the runtime tables use for [`ROOT_HANDLE`].
pub const ROOT_SYMBOL: &str = "Root";

/// Handle assigned to the first enumerated path.
pub const FIRST_PROPERTY_HANDLE: u32 = 2;

/// Extension offset of a trait that extends nothing: the root handle plus
/// one implicit extension slot.
pub const BASE_EXTENSION_OFFSET: u32 = 2;

/// Handle assigned to the path at `index` in enumeration order.
pub fn handle_for_index(index: usize) -> u32 {
    FIRST_PROPERTY_HANDLE + index as u32
}

/// Inverse of [`handle_for_index`]. Returns `Err(())` for the root handle and
/// the reserved zero handle.
pub fn index_for_handle(handle: u32) -> Result<usize, ()> {
    if handle < FIRST_PROPERTY_HANDLE {
        Err(())
    } else {
        Ok((handle - FIRST_PROPERTY_HANDLE) as usize)
    }
}

/// The last handle of a table holding `path_count` properties. A table with no
/// properties ends at the root.
pub fn last_handle(path_count: usize) -> u32 {
    ROOT_HANDLE + path_count as u32
}

/// Supported data schema version range of a trait, as the runtime's
/// `ConstSchemaVersionRange` carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaVersionRange {
    pub min_version: u32,
    pub max_version: u32,
}

impl SchemaVersionRange {
    /// The range a trait at `version` supports. Version 1 traits carry no
    /// range at all, so this returns `None` for them.
    pub fn for_version(version: u32) -> Option<SchemaVersionRange> {
        if version > 1 {
            Some(SchemaVersionRange {
                min_version: 1,
                max_version: version,
            })
        } else {
            None
        }
    }

    pub fn contains(&self, version: u32) -> bool {
        self.min_version <= version && version <= self.max_version
    }
}

#[test]
fn handles_start_after_root() {
    assert_eq!(handle_for_index(0), 2);
    assert_eq!(handle_for_index(4), 6);
    assert_eq!(index_for_handle(2), Ok(0));
    assert_eq!(index_for_handle(6), Ok(4));
    assert_eq!(index_for_handle(ROOT_HANDLE), Err(()));
    assert_eq!(index_for_handle(0), Err(()));
}

#[test]
fn last_handle_counts_root() {
    assert_eq!(last_handle(0), 1);
    assert_eq!(last_handle(5), 6);
}

#[test]
fn version_range_only_above_one() {
    assert_eq!(SchemaVersionRange::for_version(0), None);
    assert_eq!(SchemaVersionRange::for_version(1), None);

    let range = SchemaVersionRange::for_version(3).unwrap();
    assert_eq!(range.min_version, 1);
    assert_eq!(range.max_version, 3);
    assert!(range.contains(1));
    assert!(range.contains(3));
    assert!(!range.contains(4));
}
