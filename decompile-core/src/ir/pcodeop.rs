//! P-code operation nodes ("PcodeOp").

use crate::ir::address::Address;
use crate::ir::entities::{BlockId, OpId, VarnodeId};
use crate::ir::opcode::OpCode;
use smallvec::SmallVec;
use std::cmp::Ordering;

/// `(address, within-address order)`. Defines a total order within each
/// basic block, stable across the entire function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqNum {
    pub addr: Address,
    pub order: u32,
}

impl PartialOrd for SeqNum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for SeqNum {
    fn cmp(&self, other: &Self) -> Ordering {
        self.addr.cmp(&other.addr).then(self.order.cmp(&other.order))
    }
}

/// Op-level flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpFlags(u32);

impl OpFlags {
    pub const DEAD: Self = Self(1 << 0);
    pub const MARKER: Self = Self(1 << 1);
    pub const ASSIGNMENT: Self = Self(1 << 2);
    pub const BOOL_OUTPUT: Self = Self(1 << 3);
    pub const BOOLEAN_FLIP: Self = Self(1 << 4);
    pub const NO_COLLAPSE: Self = Self(1 << 5);
    pub const INDIRECT_SOURCE: Self = Self(1 << 6);
    pub const HALT_TYPE: Self = Self(1 << 7);
    pub const RETURN_COPY: Self = Self(1 << 8);
    pub const STORE_UNMAPPED: Self = Self(1 << 9);
    pub const SPECIAL_PRINT: Self = Self(1 << 10);
    pub const CALCULATED_BOOL: Self = Self(1 << 11);

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

/// An operation node: opcode, ordered inputs, optional output, parent
/// block, sequence number, flags.
#[derive(Debug, Clone)]
pub struct PcodeOp {
    pub opcode: OpCode,
    pub inputs: SmallVec<[VarnodeId; 3]>,
    pub output: Option<VarnodeId>,
    pub parent: BlockId,
    pub seq: SeqNum,
    pub flags: OpFlags,
    /// For `INDIRECT`: the op (call/store/load) this marker is affected by.
    pub indirect_effect: Option<OpId>,
    /// For `CALL`/`CALLIND`: the resolved call-site bookkeeping.
    pub call_spec: Option<crate::ir::entities::CallSpecId>,
}

impl PcodeOp {
    pub fn new(opcode: OpCode, parent: BlockId, seq: SeqNum) -> Self {
        let mut flags = OpFlags::empty();
        if opcode.is_marker() {
            flags.set(OpFlags::MARKER);
        }
        Self {
            opcode,
            inputs: SmallVec::new(),
            output: None,
            parent,
            seq,
            flags,
            indirect_effect: None,
            call_spec: None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.flags.contains(OpFlags::DEAD)
    }

    pub fn is_marker(&self) -> bool {
        self.flags.contains(OpFlags::MARKER)
    }

    pub fn flip_condition(&mut self) {
        debug_assert_eq!(self.opcode, OpCode::CBranch);
        self.flags.set(OpFlags::BOOLEAN_FLIP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seqnum_orders_by_address_then_order() {
        let a = SeqNum { addr: Address::new(1, 0), order: 0 };
        let b = SeqNum { addr: Address::new(1, 0), order: 1 };
        let c = SeqNum { addr: Address::new(1, 1), order: 0 };
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn marker_flag_set_for_phi() {
        let op = PcodeOp::new(OpCode::MultiEqual, BlockId::from_u32(0), SeqNum { addr: Address::new(1, 0), order: 0 });
        assert!(op.is_marker());
    }
}
