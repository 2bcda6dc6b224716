//! Piece/subpiece algebra ("Piece/subpiece algebra": Humpty-
//! Dumpty, Dumpty-Hump, shift-subpiece). Byte-addressed throughout, matching
//! `SUBPIECE`'s truncation-count-in-bytes convention.

use crate::ir::entities::OpId;
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use crate::rule::Rule;

/// `PIECE(SUBPIECE(w, k), SUBPIECE(w, 0)) -> w`, when the two subpieces are
/// adjacent, non-overlapping, and together span all of `w` (scenario B:
/// "Humpty-dumpty put back together").
pub struct RuleHumptyDumpty;

impl Rule for RuleHumptyDumpty {
    fn name(&self) -> &'static str {
        "humptydumpty"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::Piece]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(out) = pcode.output else { return 0 };
        let (hi, lo) = (pcode.inputs[0], pcode.inputs[1]);

        let Some(hi_def) = func.varnode(hi).def else { return 0 };
        let Some(lo_def) = func.varnode(lo).def else { return 0 };
        if func.op(hi_def).is_dead() || func.op(lo_def).is_dead() {
            return 0;
        }
        if func.op(hi_def).opcode != OpCode::SubPiece || func.op(lo_def).opcode != OpCode::SubPiece {
            return 0;
        }

        let (w_hi, k_vn) = (func.op(hi_def).inputs[0], func.op(hi_def).inputs[1]);
        let (w_lo, z_vn) = (func.op(lo_def).inputs[0], func.op(lo_def).inputs[1]);
        if w_hi != w_lo {
            return 0;
        }
        let Some(k) = func.varnode(k_vn).constant_value() else { return 0 };
        let Some(z) = func.varnode(z_vn).constant_value() else { return 0 };
        if z != 0 {
            return 0;
        }
        let lo_size = func.varnode(lo).size as u64;
        let hi_size = func.varnode(hi).size as u64;
        let whole_size = func.varnode(w_hi).size as u64;
        if k != lo_size || lo_size + hi_size != whole_size {
            return 0;
        }

        func.total_replace(out, w_hi);
        func.op_destroy(op);
        1
    }
}

/// `SUBPIECE(PIECE(hi, lo), k) -> SUBPIECE(lo, k)` or `SUBPIECE(hi, k -
/// lo.size)`, whichever half `k` falls entirely within. Leaves the op alone
/// when the truncation window straddles both halves.
pub struct RuleDumptyHump;

impl Rule for RuleDumptyHump {
    fn name(&self) -> &'static str {
        "dumptyhump"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::SubPiece]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(out) = pcode.output else { return 0 };
        let (whole, k_vn) = (pcode.inputs[0], pcode.inputs[1]);
        let out_size = func.varnode(out).size as u64;

        let Some(whole_def) = func.varnode(whole).def else { return 0 };
        if func.op(whole_def).is_dead() || func.op(whole_def).opcode != OpCode::Piece {
            return 0;
        }
        let (hi, lo) = (func.op(whole_def).inputs[0], func.op(whole_def).inputs[1]);
        let Some(k) = func.varnode(k_vn).constant_value() else { return 0 };
        let lo_size = func.varnode(lo).size as u64;

        if k + out_size <= lo_size {
            func.op_set_input(op, 0, lo);
            1
        } else if k >= lo_size {
            let new_k = func.new_constant(func.varnode(k_vn).size, k - lo_size);
            func.op_set_input(op, 0, hi);
            func.op_set_input(op, 1, new_k);
            1
        } else {
            0
        }
    }
}

/// `SUBPIECE(INT_LEFT(x, c), k) -> SUBPIECE(x, k - c/8)` when `c` is a
/// whole-byte shift and the truncation window starts at or past the
/// zero-filled low bytes the shift introduced.
pub struct RuleShiftSub;

impl Rule for RuleShiftSub {
    fn name(&self) -> &'static str {
        "shiftsub"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::SubPiece]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let (shifted, k_vn) = (pcode.inputs[0], pcode.inputs[1]);

        let Some(shift_def) = func.varnode(shifted).def else { return 0 };
        if func.op(shift_def).is_dead() || func.op(shift_def).opcode != OpCode::IntLeft {
            return 0;
        }
        let (x, c_vn) = (func.op(shift_def).inputs[0], func.op(shift_def).inputs[1]);
        let Some(c_bits) = func.varnode(c_vn).constant_value() else { return 0 };
        if c_bits % 8 != 0 {
            return 0;
        }
        let c_bytes = c_bits / 8;
        let Some(k) = func.varnode(k_vn).constant_value() else { return 0 };
        if k < c_bytes {
            return 0;
        }

        let new_k = func.new_constant(func.varnode(k_vn).size, k - c_bytes);
        func.op_set_input(op, 0, x);
        func.op_set_input(op, 1, new_k);
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::address::{AddrSpace, Address, SpaceType};
    use crate::rule::RulePool;
    use std::rc::Rc;

    fn setup() -> Funcdata {
        let mut f = Funcdata::new("f");
        f.spaces_mut().add_space(AddrSpace::new(0, "const", 1, 8, false, SpaceType::Constant)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(1, "ram", 1, 8, false, SpaceType::Ram)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(2, "unique", 1, 8, false, SpaceType::Unique)).unwrap();
        f
    }

    #[test]
    fn scenario_b_humpty_dumpty_recombines() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let w = f.new_varnode(8, Address::new(1, 0));
        let z = f.new_constant(4, 0);
        let four = f.new_constant(4, 4);
        let (_lo_op, lo) = f.new_op_with_output(OpCode::SubPiece, b0, Address::new(1, 8), &[w, z], 4);
        let (_hi_op, hi) = f.new_op_with_output(OpCode::SubPiece, b0, Address::new(1, 0xC), &[w, four], 4);
        let (_piece_op, piece_out) =
            f.new_op_with_output(OpCode::Piece, b0, Address::new(1, 0x10), &[hi, lo], 8);
        let (use_op, _u) = f.new_op_with_output(OpCode::Copy, b0, Address::new(1, 0x14), &[piece_out], 8);

        let pool = RulePool::new(vec![Rc::new(RuleHumptyDumpty)]);
        pool.run(&mut f).unwrap();
        assert_eq!(f.op(use_op).inputs[0], w);
    }

    #[test]
    fn dumpty_hump_rewrites_into_low_half() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let hi = f.new_varnode(4, Address::new(1, 0));
        let lo = f.new_varnode(4, Address::new(1, 4));
        let (_piece_op, piece_out) =
            f.new_op_with_output(OpCode::Piece, b0, Address::new(1, 8), &[hi, lo], 8);
        let zero = f.new_constant(4, 0);
        let (sub_op, _out) =
            f.new_op_with_output(OpCode::SubPiece, b0, Address::new(1, 0xC), &[piece_out, zero], 2);

        let pool = RulePool::new(vec![Rc::new(RuleDumptyHump)]);
        pool.run(&mut f).unwrap();
        assert_eq!(f.op(sub_op).inputs[0], lo);
    }
}
