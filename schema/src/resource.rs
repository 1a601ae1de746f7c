use std::fmt;

/// Width in bytes of a resource id's numeric part.
pub const RESOURCE_NUMBER_LEN: usize = 8;

/// Width in bytes of the resource type prefix on typed ids.
pub const RESOURCE_TYPE_LEN: usize = 2;

/// Kind of resource a typed id names. The discriminant is what goes on the
/// wire ahead of the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Device = 1,
    User = 2,
    Account = 3,
    Area = 4,
    Fixture = 5,
    Group = 6,
    Annotation = 7,
    Structure = 8,
    Guest = 9,
}

impl ResourceType {
    pub const ALL: [ResourceType; 9] = [
        ResourceType::Device,
        ResourceType::User,
        ResourceType::Account,
        ResourceType::Area,
        ResourceType::Fixture,
        ResourceType::Group,
        ResourceType::Annotation,
        ResourceType::Structure,
        ResourceType::Guest,
    ];

    /// Look up a type by the upper-case name used in constant values, e.g.
    /// `DEVICE`.
    pub fn from_name(name: &str) -> Option<ResourceType> {
        Self::ALL.iter().copied().find(|ty| ty.name() == name)
    }

    pub fn from_value(value: u16) -> Option<ResourceType> {
        Self::ALL.iter().copied().find(|ty| ty.value() == value)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResourceType::Device => "DEVICE",
            ResourceType::User => "USER",
            ResourceType::Account => "ACCOUNT",
            ResourceType::Area => "AREA",
            ResourceType::Fixture => "FIXTURE",
            ResourceType::Group => "GROUP",
            ResourceType::Annotation => "ANNOTATION",
            ResourceType::Structure => "STRUCTURE",
            ResourceType::Guest => "GUEST",
        }
    }

    pub fn value(&self) -> u16 {
        *self as u16
    }
}

/// A resource id as the runtime stores it: an optional 16-bit type followed
/// by a 64-bit number, both big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId {
    pub resource_type: Option<ResourceType>,
    pub number: u64,
}

impl ResourceId {
    pub fn new(resource_type: Option<ResourceType>, number: u64) -> ResourceId {
        ResourceId {
            resource_type,
            number,
        }
    }

    /// Byte-array form: the type (if any) then the number, most significant
    /// byte first.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(RESOURCE_TYPE_LEN + RESOURCE_NUMBER_LEN);
        if let Some(ty) = self.resource_type {
            out.extend_from_slice(&ty.value().to_be_bytes());
        }
        out.extend_from_slice(&self.number.to_be_bytes());
        out
    }

    /// Just the number, most significant byte first.
    pub fn number_bytes(&self) -> [u8; RESOURCE_NUMBER_LEN] {
        self.number.to_be_bytes()
    }

    /// Integer form: the number as a zero-padded 64-bit hexadecimal literal.
    pub fn literal(&self) -> String {
        format!("0x{:016x}", self.number)
    }

    /// Read back either the 8-byte untyped form or the 10-byte typed form.
    pub fn from_bytes(bytes: &[u8]) -> Result<ResourceId, ()> {
        match bytes.len() {
            RESOURCE_NUMBER_LEN => Ok(ResourceId::new(None, read_u64(bytes)?)),
            len if len == RESOURCE_TYPE_LEN + RESOURCE_NUMBER_LEN => {
                let value = u16::from_be_bytes([bytes[0], bytes[1]]);
                let ty = ResourceType::from_value(value).ok_or(())?;
                Ok(ResourceId::new(Some(ty), read_u64(&bytes[RESOURCE_TYPE_LEN..])?))
            }
            _ => Err(()),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource_type {
            Some(ty) => write!(f, "{}_{:016X}", ty.name(), self.number),
            None => write!(f, "0x{:016X}", self.number),
        }
    }
}

fn read_u64(bytes: &[u8]) -> Result<u64, ()> {
    let array: [u8; RESOURCE_NUMBER_LEN] = bytes.try_into().map_err(|_| ())?;
    Ok(u64::from_be_bytes(array))
}

#[test]
fn typed_id_bytes() {
    let id = ResourceId::new(Some(ResourceType::Device), 0x18b4_3000_0000_0001);
    assert_eq!(
        id.to_bytes(),
        vec![0x00, 0x01, 0x18, 0xb4, 0x30, 0x00, 0x00, 0x00, 0x00, 0x01]
    );
    assert_eq!(id.literal(), "0x18b4300000000001");
    assert_eq!(id.to_string(), "DEVICE_18B4300000000001");
}

#[test]
fn untyped_id_bytes() {
    let id = ResourceId::new(None, 0xbeef);
    assert_eq!(id.to_bytes(), vec![0, 0, 0, 0, 0, 0, 0xbe, 0xef]);
    assert_eq!(id.number_bytes(), [0, 0, 0, 0, 0, 0, 0xbe, 0xef]);
    assert_eq!(id.literal(), "0x000000000000beef");
}

#[test]
fn from_bytes_reads_both_forms() {
    let typed = ResourceId::new(Some(ResourceType::Guest), u64::MAX);
    assert_eq!(ResourceId::from_bytes(&typed.to_bytes()), Ok(typed));

    let untyped = ResourceId::new(None, 42);
    assert_eq!(ResourceId::from_bytes(&untyped.to_bytes()), Ok(untyped));

    assert_eq!(ResourceId::from_bytes(&[0; 9]), Err(()));
    assert_eq!(ResourceId::from_bytes(&[0, 0x0a, 0, 0, 0, 0, 0, 0, 0, 1]), Err(()));
}

#[test]
fn resource_type_names() {
    for ty in ResourceType::ALL {
        assert_eq!(ResourceType::from_name(ty.name()), Some(ty));
        assert_eq!(ResourceType::from_value(ty.value()), Some(ty));
    }
    assert_eq!(ResourceType::from_name("device"), None);
    assert_eq!(ResourceType::Structure.value(), 8);
}
