//! Varnodes: the storage-coordinate atoms everything else in this crate
//! is built from.

use crate::ir::address::Address;
use crate::ir::entities::{HighId, OpId};
use cranelift_bitset::ScalarBitSet;

/// Per-varnode flags, bit-packed like cranelift-codegen's `MemFlags`
/// (`ir/memflags.rs`) rather than pulled in via the `bitflags` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarnodeFlags(u32);

impl VarnodeFlags {
    pub const INPUT: Self = Self(1 << 0);
    pub const WRITTEN: Self = Self(1 << 1);
    pub const CONSTANT: Self = Self(1 << 2);
    pub const PERSISTENT: Self = Self(1 << 3);
    pub const ADDRESS_TIED: Self = Self(1 << 4);
    pub const IMPLICIT: Self = Self(1 << 5);
    pub const SPACEBASE: Self = Self(1 << 6);
    pub const UNAFFECTED: Self = Self(1 << 7);
    pub const MARK: Self = Self(1 << 8);
    pub const PRECISION_HIGH: Self = Self(1 << 9);
    pub const PRECISION_LOW: Self = Self(1 << 10);
    pub const TYPELOCK: Self = Self(1 << 11);
    pub const NAMELOCK: Self = Self(1 << 12);
    pub const READ_ONLY: Self = Self(1 << 13);
    pub const VOLATILE: Self = Self(1 << 14);
    pub const AUTO_LIVE_HOLD: Self = Self(1 << 15);
    pub const DIRECT_WRITE: Self = Self(1 << 16);
    pub const CONSUME_VACUOUS: Self = Self(1 << 17);
    pub const CONSUME_LIST: Self = Self(1 << 18);
    pub const WRITE_MASK: Self = Self(1 << 19);

    pub const fn empty() -> Self {
        Self(0)
    }
    pub fn set(&mut self, bit: Self) {
        self.0 |= bit.0;
    }
    pub fn clear(&mut self, bit: Self) {
        self.0 &= !bit.0;
    }
    pub fn contains(self, bit: Self) -> bool {
        self.0 & bit.0 == bit.0
    }
}

/// A single static storage coordinate in a function, plus the bookkeeping
/// the data-flow passes attach to it.
#[derive(Debug, Clone)]
pub struct Varnode {
    pub addr: Address,
    pub size: u32,
    pub flags: VarnodeFlags,
    /// The op that writes this varnode, iff `WRITTEN` is set.
    pub def: Option<OpId>,
    /// Ops that read this varnode, kept in sync whenever an op's operand
    /// list changes. Maintained as a plain `Vec`; iteration that mutates
    /// the graph must snapshot first.
    pub descendants: Vec<OpId>,
    /// Which output bits any reader ever uses.
    pub consume: ScalarBitSet<u64>,
    /// Conservative upper bound on which bits may be non-zero.
    pub non_zero: ScalarBitSet<u64>,
    /// The merge group this varnode belongs to, once merge has run.
    pub high: Option<HighId>,
    /// Local type lattice element, set by `crate::types`. Kept as an index
    /// into the function's type pool to avoid cyclic ownership.
    pub local_type: Option<crate::types::datatype::TypeId>,
    /// Set once a propagation edge carried a flow-blocking cast/symbol
    /// binding onto this varnode.
    pub stops_propagation: bool,
}

impl Varnode {
    pub fn new_input(addr: Address, size: u32) -> Self {
        let mut flags = VarnodeFlags::empty();
        flags.set(VarnodeFlags::INPUT);
        Self {
            addr,
            size,
            flags,
            def: None,
            descendants: Vec::new(),
            consume: ScalarBitSet::new(),
            non_zero: ScalarBitSet::new(),
            high: None,
            local_type: None,
            stops_propagation: false,
        }
    }

    pub fn new_written(addr: Address, size: u32, def: OpId) -> Self {
        let mut flags = VarnodeFlags::empty();
        flags.set(VarnodeFlags::WRITTEN);
        Self {
            addr,
            size,
            flags,
            def: Some(def),
            descendants: Vec::new(),
            consume: ScalarBitSet::new(),
            non_zero: ScalarBitSet::new(),
            high: None,
            local_type: None,
            stops_propagation: false,
        }
    }

    pub fn new_constant(size: u32, value: u64) -> Self {
        let mut flags = VarnodeFlags::empty();
        flags.set(VarnodeFlags::CONSTANT);
        let masked = mask_to_size(value, size);
        Self {
            addr: Address::new(0, masked),
            size,
            flags,
            def: None,
            descendants: Vec::new(),
            consume: ScalarBitSet::new(),
            non_zero: from_bits(masked),
            high: None,
            local_type: None,
            stops_propagation: false,
        }
    }

    pub fn is_input(&self) -> bool {
        self.flags.contains(VarnodeFlags::INPUT)
    }
    pub fn is_written(&self) -> bool {
        self.flags.contains(VarnodeFlags::WRITTEN)
    }
    pub fn is_constant(&self) -> bool {
        self.flags.contains(VarnodeFlags::CONSTANT)
    }

    /// The constant value, if this varnode is a constant. Ghidra stores
    /// constants with their value as the "offset" of a constant-space
    /// address; we do the same (see `new_constant`).
    pub fn constant_value(&self) -> Option<u64> {
        self.is_constant().then(|| self.addr.offset)
    }

    /// Snapshot the descendant list so a caller can mutate the graph while
    /// iterating it.
    pub fn descendants_snapshot(&self) -> Vec<OpId> {
        self.descendants.clone()
    }
}

pub fn bit_width(size_bytes: u32) -> u32 {
    (size_bytes.min(8) * 8).max(1)
}

/// A mask with every bit of a `size_bytes`-wide value set (clamped to 64
/// bits, same as `bit_width`). Shared by the consume-mask and non-zero-mask
/// passes, which both need "the widest this varnode could possibly be".
pub fn full_mask(size_bytes: u32) -> ScalarBitSet<u64> {
    let bits = bit_width(size_bytes);
    if bits >= 64 {
        ScalarBitSet(u64::MAX)
    } else {
        ScalarBitSet((1u64 << bits) - 1)
    }
}

/// Bitwise union of two masks. `ScalarBitSet` exposes its backing scalar as
/// a public field, so a plain `|` is the idiomatic way to combine two of
/// them (there is no dedicated set-union method on the bitset crate).
pub fn union_mask(a: ScalarBitSet<u64>, b: ScalarBitSet<u64>) -> ScalarBitSet<u64> {
    ScalarBitSet(a.0 | b.0)
}

pub fn mask_to_size(value: u64, size_bytes: u32) -> u64 {
    let bits = bit_width(size_bytes);
    if bits >= 64 {
        value
    } else {
        value & ((1u64 << bits) - 1)
    }
}

/// A bitset of exactly the bits set in `value`, used to seed a constant
/// varnode's non-zero mask.
fn from_bits(value: u64) -> ScalarBitSet<u64> {
    let mut set = ScalarBitSet::new();
    let mut bits = value;
    let mut i = 0u8;
    while bits != 0 {
        if bits & 1 != 0 {
            set.insert(i);
        }
        bits >>= 1;
        i += 1;
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_masked_to_size() {
        let vn = Varnode::new_constant(1, 0x1FF);
        assert_eq!(vn.constant_value(), Some(0xFF));
    }

    #[test]
    fn flags_roundtrip() {
        let mut f = VarnodeFlags::empty();
        assert!(!f.contains(VarnodeFlags::TYPELOCK));
        f.set(VarnodeFlags::TYPELOCK);
        assert!(f.contains(VarnodeFlags::TYPELOCK));
        f.clear(VarnodeFlags::TYPELOCK);
        assert!(!f.contains(VarnodeFlags::TYPELOCK));
    }

    #[test]
    fn input_and_written_are_distinct_constructors() {
        let input = Varnode::new_input(Address::new(1, 0), 4);
        assert!(input.is_input());
        assert!(!input.is_written());
    }

    /// Bit-width calculations must clamp at 64 bits even for a logical
    /// whole built from two 8-byte halves (a 128-bit varnode).
    #[test]
    fn full_mask_clamps_at_64_bits_for_a_128_bit_whole() {
        assert_eq!(bit_width(16), 64);
        assert_eq!(full_mask(16).0, u64::MAX);
        // union with itself and with a narrower mask must stay within range,
        // never panicking on a shift-overflow.
        let wide = full_mask(16);
        let narrow = full_mask(4);
        assert_eq!(union_mask(wide, narrow).0, u64::MAX);
    }

    proptest::proptest! {
        /// For any byte size a varnode could plausibly report, `bit_width`
        /// never exceeds 64 and `full_mask` never panics.
        #[test]
        fn bit_width_and_full_mask_never_exceed_64_bits(size in 0u32..=256) {
            let bits = bit_width(size);
            proptest::prop_assert!(bits <= 64);
            proptest::prop_assert!(bits >= 1);
            let mask = full_mask(size);
            if bits >= 64 {
                proptest::prop_assert_eq!(mask.0, u64::MAX);
            } else {
                proptest::prop_assert_eq!(mask.0, (1u64 << bits) - 1);
            }
        }

        /// Masking a value to an oversized width is a no-op rather than an
        /// overflowing shift.
        #[test]
        fn mask_to_size_never_panics_on_wide_sizes(value: u64, size in 0u32..=256) {
            let masked = mask_to_size(value, size);
            if bit_width(size) >= 64 {
                proptest::prop_assert_eq!(masked, value);
            } else {
                proptest::prop_assert!(masked <= full_mask(size).0);
            }
        }
    }
}
