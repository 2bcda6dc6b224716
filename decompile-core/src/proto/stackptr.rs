//! ActionStackPtrFlow ("Stack-pointer flow"). Grounded on
//! `cranelift-codegen/src/dominator_tree.rs`'s fixed-point propagation
//! shape, applied to a scalar offset-equation system instead of dominance.

use crate::ir::entities::{BlockId, VarnodeId};
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use rustc_hash::FxHashMap;

/// Tracks, for each varnode representing the stack pointer at some program
/// point, its offset relative to the function entry's SP: `stack_sp(i) -
/// stack_sp(j)` is constant, solved by propagation starting from entry
/// SP = 0.
#[derive(Debug, Default)]
pub struct StackPtrFlow {
    offsets: FxHashMap<VarnodeId, i64>,
}

impl StackPtrFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset_of(&self, vn: VarnodeId) -> Option<i64> {
        self.offsets.get(&vn).copied()
    }

    /// Count of varnodes the last `solve` resolved an offset for, including
    /// the seeded entry stack pointer.
    pub fn resolved_count(&self) -> usize {
        self.offsets.len()
    }

    /// Propagate offsets forward from `entry_sp` (offset 0) along COPY,
    /// INT_ADD/INT_SUB-by-constant defs, and across CALLIND/CALL edges
    /// where `extrapop_guess` supplies a guessed adjustment when the
    /// callee's prototype is not yet known ("install a guess,
    /// typically +wordsize, and refine if later evidence fixes extrapop").
    pub fn solve(&mut self, func: &Funcdata, entry_sp: VarnodeId, extrapop_guess: i64) {
        self.offsets.clear();
        self.offsets.insert(entry_sp, 0);
        let mut changed = true;
        while changed {
            changed = false;
            for vn in func.varnode_ids() {
                let Some(def) = func.varnode(vn).def else { continue };
                let op = func.op(def);
                let proposed = match op.opcode {
                    OpCode::Copy => self.offsets.get(&op.inputs[0]).copied(),
                    OpCode::IntAdd => {
                        let base = self.offsets.get(&op.inputs[0]).copied();
                        let delta = func.varnode(op.inputs[1]).constant_value();
                        match (base, delta) {
                            (Some(b), Some(d)) => Some(b + d as i64),
                            _ => None,
                        }
                    }
                    OpCode::IntSub => {
                        let base = self.offsets.get(&op.inputs[0]).copied();
                        let delta = func.varnode(op.inputs[1]).constant_value();
                        match (base, delta) {
                            (Some(b), Some(d)) => Some(b - d as i64),
                            _ => None,
                        }
                    }
                    OpCode::CallInd | OpCode::Call => {
                        op.inputs
                            .first()
                            .and_then(|&sp_in| self.offsets.get(&sp_in).copied())
                            .map(|b| b + extrapop_guess)
                    }
                    _ => None,
                };
                if let Some(v) = proposed {
                    if self.offsets.get(&vn) != Some(&v) {
                        self.offsets.insert(vn, v);
                        changed = true;
                    }
                }
            }
        }
    }

    /// Refine a previously-guessed post-call offset once the real
    /// `extrapop` is known, by re-solving with the corrected delta.
    pub fn refine_extrapop(&mut self, func: &Funcdata, entry_sp: VarnodeId, real_extrapop: i64) {
        self.solve(func, entry_sp, real_extrapop);
    }

    pub fn entry_block_offsets(&self, func: &Funcdata, block: BlockId) -> Vec<(VarnodeId, i64)> {
        func.live_ops_in_block(block)
            .filter_map(|op| func.op(op).output)
            .filter_map(|vn| self.offset_of(vn).map(|o| (vn, o)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::address::{AddrSpace, Address, SpaceType};

    fn setup() -> Funcdata {
        let mut f = Funcdata::new("f");
        f.spaces_mut().add_space(AddrSpace::new(0, "const", 1, 8, false, SpaceType::Constant)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(1, "ram", 1, 8, false, SpaceType::Ram)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(2, "unique", 1, 8, false, SpaceType::Unique)).unwrap();
        f
    }

    #[test]
    fn constant_subtraction_propagates_offset() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let sp0 = f.new_varnode(8, Address::new(1, 0x1000));
        let eight = f.new_constant(8, 8);
        let (_op, sp1) =
            f.new_op_with_output(OpCode::IntSub, b0, Address::new(1, 0), &[sp0, eight], 8);
        let mut flow = StackPtrFlow::new();
        flow.solve(&f, sp0, 8);
        assert_eq!(flow.offset_of(sp1), Some(-8));
    }
}
