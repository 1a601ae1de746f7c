/// A packed boolean array with one bit per property handle.
///
/// Bit `i` lives in byte `i / 8` at position `i % 8`, least significant bit
/// first. The byte length is always `ceil(len / 8)`; unused high bits of the
/// last byte are zero.
///
/// ```
/// let bits = wdl_tables_schema::Bitfield::pack([true, false, false, false, false, false, false, false, true]);
/// assert_eq!(bits.as_bytes(), &[0x01, 0x01]);
/// assert_eq!(bits.len(), 9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitfield {
    bytes: Vec<u8>,
    len: usize,
}

impl Bitfield {
    /// Pack the given booleans in order.
    pub fn pack<I>(bits: I) -> Bitfield
    where
        I: IntoIterator<Item = bool>,
    {
        let mut bytes = Vec::new();
        let mut len = 0;

        for bit in bits {
            if len % 8 == 0 {
                bytes.push(0);
            }
            if bit {
                bytes[len / 8] |= 1 << (len % 8);
            }
            len += 1;
        }

        Bitfield { bytes, len }
    }

    /// Wrap bytes read back from a table holding `len` handles. Fails if the
    /// byte count does not match `len` or a bit past `len` is set.
    pub fn from_bytes(bytes: &[u8], len: usize) -> Result<Bitfield, ()> {
        if bytes.len() != byte_len(len) {
            return Err(());
        }
        if len % 8 != 0 {
            if let Some(&last) = bytes.last() {
                if last >> (len % 8) != 0 {
                    return Err(());
                }
            }
        }
        Ok(Bitfield {
            bytes: bytes.to_vec(),
            len,
        })
    }

    /// Number of bits, one per enumerated path.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bit at `index`. Out of range reads are `false`.
    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        (self.bytes[index / 8] >> (index % 8)) & 1 != 0
    }

    /// True when at least one bit is set.
    pub fn any(&self) -> bool {
        self.bytes.iter().any(|&byte| byte != 0)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bytes.iter().map(|byte| byte.count_ones() as usize).sum()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Expand back into one boolean per handle.
    pub fn unpack(&self) -> Vec<bool> {
        (0..self.len).map(|index| self.get(index)).collect()
    }
}

/// Bytes needed to hold `len` bits.
pub fn byte_len(len: usize) -> usize {
    len / 8 + usize::from(len % 8 > 0)
}

#[test]
fn pack_empty() {
    let bits = Bitfield::pack(Vec::<bool>::new());
    assert!(bits.is_empty());
    assert_eq!(bits.as_bytes(), &[] as &[u8]);
    assert!(!bits.any());
}

#[test]
fn pack_is_lsb_first() {
    assert_eq!(Bitfield::pack([true]).as_bytes(), &[0x01]);
    assert_eq!(Bitfield::pack([false, true]).as_bytes(), &[0x02]);
    assert_eq!(Bitfield::pack([false, false, true, false, false]).as_bytes(), &[0x04]);
    assert_eq!(
        Bitfield::pack([false, false, false, false, false, false, false, true]).as_bytes(),
        &[0x80]
    );
}

#[test]
fn pack_spills_into_next_byte() {
    let mut input = vec![false; 17];
    input[0] = true;
    input[9] = true;
    input[16] = true;

    let bits = Bitfield::pack(input.clone());
    assert_eq!(bits.as_bytes(), &[0x01, 0x02, 0x01]);
    assert_eq!(bits.count_ones(), 3);
    assert_eq!(bits.unpack(), input);
}

#[test]
fn all_false_still_packs_zero_bytes() {
    let bits = Bitfield::pack([false; 10]);
    assert_eq!(bits.as_bytes(), &[0x00, 0x00]);
    assert!(!bits.any());
}

#[test]
fn get_out_of_range() {
    let bits = Bitfield::pack([true, true]);
    assert!(bits.get(1));
    assert!(!bits.get(2));
    assert!(!bits.get(100));
}

#[test]
fn from_bytes_checks_length_and_padding() {
    assert_eq!(
        Bitfield::from_bytes(&[0x05], 3).map(|bits| bits.unpack()),
        Ok(vec![true, false, true])
    );
    assert_eq!(Bitfield::from_bytes(&[0x05, 0x00], 3), Err(()));
    assert_eq!(Bitfield::from_bytes(&[0x08], 3), Err(()));
    assert!(Bitfield::from_bytes(&[0xff], 8).is_ok());
    assert_eq!(byte_len(0), 0);
    assert_eq!(byte_len(8), 1);
    assert_eq!(byte_len(9), 2);
}
