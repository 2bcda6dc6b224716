//! The shared harness every split-varnode form matcher builds on: construct
//! a candidate pair, check it's feasible to fuse, then rewrite the graph
//! around the fused whole. Grounded on `cranelift-codegen/src/ir/dfg.rs`'s
//! value-replacement
//! helpers for the rewrite half; the "materialise a whole from two halves"
//! step has no teacher analogue and is written fresh against the join-space
//! concept already present in [`crate::ir::address`].

use crate::ir::entities::{OpId, VarnodeId};
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;

/// A pair of half-width varnodes understood to represent one logical whole.
/// `hi` is the most-significant half, matching `PIECE`'s `(hi, lo)` input
/// order.
#[derive(Debug, Clone, Copy)]
pub struct SplitVarnode {
    pub hi: VarnodeId,
    pub lo: VarnodeId,
}

impl SplitVarnode {
    pub fn new(hi: VarnodeId, lo: VarnodeId) -> Self {
        Self { hi, lo }
    }

    pub fn lo_size(&self, func: &Funcdata) -> u32 {
        func.varnode(self.lo).size
    }
    pub fn hi_size(&self, func: &Funcdata) -> u32 {
        func.varnode(self.hi).size
    }
    pub fn whole_size(&self, func: &Funcdata) -> u32 {
        self.lo_size(func) + self.hi_size(func)
    }

    /// Structural adjacency check: same address space, `hi` immediately
    /// following `lo` in storage.
    pub fn is_adjacent(&self, func: &Funcdata) -> bool {
        let lo_addr = func.varnode(self.lo).addr;
        let hi_addr = func.varnode(self.hi).addr;
        lo_addr.space == hi_addr.space && hi_addr.offset == lo_addr.offset + self.lo_size(func) as u64
    }

    /// Feasibility + rewrite's first half: find an existing `PIECE` already
    /// unifying `hi`/`lo`, or synthesise one immediately before `at`. `at`
    /// is the caller's best-known dominating point for both halves — the
    /// consuming op being fused away.
    pub fn materialize_whole(&self, func: &mut Funcdata, at: OpId) -> VarnodeId {
        for d in func.varnode(self.hi).descendants_snapshot() {
            let pcode = func.op(d);
            if pcode.is_dead() || pcode.opcode != OpCode::Piece {
                continue;
            }
            if pcode.inputs[0] == self.hi && pcode.inputs[1] == self.lo {
                return pcode.output.unwrap();
            }
        }
        let whole_size = self.whole_size(func);
        let (_op, out) = func.build_op_before(at, OpCode::Piece, &[self.hi, self.lo], Some(whole_size));
        out.unwrap()
    }

    /// Rewrite's second half: rebuild `lo`/`hi`-sized pieces of `whole` as
    /// fresh `SUBPIECE`s inserted before `at`.
    pub fn rebuild_as_subpieces(&self, func: &mut Funcdata, whole: VarnodeId, at: OpId) -> (VarnodeId, VarnodeId) {
        let lo_size = self.lo_size(func);
        let hi_size = self.hi_size(func);
        let const_size = func.varnode(self.lo).size.min(4).max(1);
        let zero = func.new_constant(const_size, 0);
        let (_lo_op, new_lo) = func.build_op_before(at, OpCode::SubPiece, &[whole, zero], Some(lo_size));
        let lo_size_const = func.new_constant(const_size, lo_size as u64);
        let (_hi_op, new_hi) = func.build_op_before(at, OpCode::SubPiece, &[whole, lo_size_const], Some(hi_size));
        (new_lo.unwrap(), new_hi.unwrap())
    }
}
