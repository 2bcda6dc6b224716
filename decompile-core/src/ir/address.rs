//! Address spaces and addresses ("AddrSpace"/"Address").

use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Tag distinguishing the kind of storage an [`AddrSpace`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceType {
    Constant,
    Ram,
    Register,
    Unique,
    Internal,
    Spacebase,
    Iop,
    Fspec,
    Join,
    Other,
}

/// A named region of storage, process-wide and immutable after setup.
#[derive(Debug, Clone)]
pub struct AddrSpace {
    pub index: u32,
    pub name: Arc<str>,
    pub word_size: u32,
    pub addr_size: u32,
    pub big_endian: bool,
    pub space_type: SpaceType,
    /// For overlay spaces: the space this one shadows.
    pub contains: Option<u32>,
    pub delay: u32,
    pub dead_code_delay: u32,
}

impl AddrSpace {
    pub fn new(
        index: u32,
        name: impl Into<Arc<str>>,
        word_size: u32,
        addr_size: u32,
        big_endian: bool,
        space_type: SpaceType,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            word_size,
            addr_size,
            big_endian,
            space_type,
            contains: None,
            delay: 0,
            dead_code_delay: 0,
        }
    }

    pub fn is_overlay(&self) -> bool {
        self.contains.is_some()
    }
}

/// `(space, offset)`. Total order: by space index, then offset.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub space: u32,
    pub offset: u64,
}

impl Address {
    pub const fn new(space: u32, offset: u64) -> Self {
        Self { space, offset }
    }

    /// Does the span `[self, self+sz)` overlap `[other, other+other_sz)`?
    pub fn overlap(&self, sz: u64, other: &Address, other_sz: u64) -> bool {
        if self.space != other.space {
            return false;
        }
        let (a0, a1) = (self.offset, self.offset.wrapping_add(sz));
        let (b0, b1) = (other.offset, other.offset.wrapping_add(other_sz));
        a0 < b1 && b0 < a1
    }

    /// Does `[self, self+sz)` fully contain `[other, other+other_sz)`?
    pub fn contains(&self, sz: u64, other: &Address, other_sz: u64) -> bool {
        if self.space != other.space {
            return false;
        }
        other.offset >= self.offset && other.offset + other_sz <= self.offset + sz
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> Ordering {
        self.space.cmp(&other.space).then(self.offset.cmp(&other.offset))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:#x}", self.space, self.offset)
    }
}

/// Registry of process-wide address spaces, owned by the architecture object
/// ("Global/process state") and shared read-mostly across function
/// decompilations.
pub struct SpaceManager {
    spaces: Vec<AddrSpace>,
    by_name: FxHashMap<Arc<str>, u32>,
    join_space: Option<u32>,
}

impl SpaceManager {
    pub fn new() -> Self {
        Self {
            spaces: Vec::new(),
            by_name: FxHashMap::default(),
            join_space: None,
        }
    }

    pub fn add_space(&mut self, space: AddrSpace) -> Result<, crate::error::ConfigError> {
        if self.spaces.iter().any(|s| s.index == space.index) {
            return Err(crate::error::ConfigError::DuplicateSpaceIndex(space.index));
        }
        if space.space_type == SpaceType::Join {
            self.join_space = Some(space.index);
        }
        self.by_name.insert(space.name.clone(), space.index);
        self.spaces.push(space);
        Ok(())
    }

    pub fn get_space(&self, index: u32) -> Option<&AddrSpace> {
        self.spaces.iter().find(|s| s.index == index)
    }

    pub fn get_space_by_name(&self, name: &str) -> Option<&AddrSpace> {
        self.by_name.get(name).and_then(|&i| self.get_space(i))
    }

    /// Convert a word-addressed offset to a byte offset for `space`.
    pub fn address_to_byte(&self, off: u64, word_size: u32) -> u64 {
        off.wrapping_mul(word_size.max(1) as u64)
    }

    /// Inverse of [`Self::address_to_byte`].
    pub fn byte_to_address(&self, byte_off: u64, word_size: u32) -> u64 {
        byte_off / word_size.max(1) as u64
    }

    /// Synthesise an address in the JOIN space representing the
    /// concatenation of `hi` (most-significant) and `lo` (least-significant)
    /// storage ranges.
    pub fn construct_join_address(&mut self, hi: (Address, u32), lo: (Address, u32)) -> Address {
        let join = self.join_space.expect("join space must be configured");
        // The join space is a synthetic, infinite encoding space: we pack a
        // stable key out of the two pieces so repeated joins of the same
        // pair collapse to the same address, mirroring how SLEIGH assigns
        // join addresses deterministically from their piece list.
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        use std::hash::{Hash, Hasher};
        (hi.0.space, hi.0.offset, hi.1, lo.0.space, lo.0.offset, lo.1).hash(&mut hasher);
        Address::new(join, hasher.finish())
    }

    /// Climb the overlay chain to find the ultimate containing space.
    pub fn root_space(&self, index: u32) -> u32 {
        let mut cur = index;
        while let Some(s) = self.get_space(cur) {
            match s.contains {
                Some(parent) => cur = parent,
                None => break,
            }
        }
        cur
    }
}

impl Default for SpaceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mgr() -> SpaceManager {
        let mut m = SpaceManager::new();
        m.add_space(AddrSpace::new(0, "const", 1, 8, false, SpaceType::Constant))
            .unwrap();
        m.add_space(AddrSpace::new(1, "ram", 1, 8, false, SpaceType::Ram))
            .unwrap();
        m.add_space(AddrSpace::new(2, "register", 1, 8, false, SpaceType::Register))
            .unwrap();
        m.add_space(AddrSpace::new(3, "unique", 1, 8, false, SpaceType::Unique))
            .unwrap();
        m.add_space(AddrSpace::new(4, "join", 1, 8, false, SpaceType::Join))
            .unwrap();
        m
    }

    #[test]
    fn ordering_is_space_then_offset() {
        let a = Address::new(1, 10);
        let b = Address::new(1, 20);
        let c = Address::new(2, 0);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn overlap_and_contains() {
        let a = Address::new(1, 100);
        let b = Address::new(1, 104);
        assert!(a.overlap(8, &b, 4));
        assert!(!a.overlap(4, &b, 4));
        assert!(a.contains(8, &b, 4));
        assert!(!a.contains(4, &b, 4));
    }

    #[test]
    fn duplicate_space_index_rejected() {
        let mut m = mgr();
        let err = m
            .add_space(AddrSpace::new(1, "ram2", 1, 8, false, SpaceType::Ram))
            .unwrap_err();
        assert!(matches!(err, crate::error::ConfigError::DuplicateSpaceIndex(1)));
    }

    #[test]
    fn join_address_is_stable() {
        let mut m = mgr();
        let hi = (Address::new(2, 0), 4);
        let lo = (Address::new(2, 4), 4);
        let j1 = m.construct_join_address(hi, lo);
        let j2 = m.construct_join_address(hi, lo);
        assert_eq!(j1, j2);
        assert_eq!(j1.space, 4);
    }
}
