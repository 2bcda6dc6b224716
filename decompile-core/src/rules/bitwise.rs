//! Bitwise identity rules ("Bitwise identities").

use crate::ir::entities::OpId;
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use crate::ir::varnode::{bit_width, full_mask};
use crate::rule::Rule;

/// `x & ~0 -> x`: an `INT_AND` where one operand is the all-ones mask for
/// its size collapses to the other operand.
pub struct RuleAndAllOnes;

impl Rule for RuleAndAllOnes {
    fn name(&self) -> &'static str {
        "andallones"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::IntAnd]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(out) = pcode.output else { return 0 };
        let (a, b) = (pcode.inputs[0], pcode.inputs[1]);
        let size = func.varnode(a).size;
        let all_ones = full_mask(size).0;
        let keep = match (func.varnode(a).constant_value, func.varnode(b).constant_value()) {
            (Some(v), _) if v == all_ones => b,
            (_, Some(v)) if v == all_ones => a,
            _ => return 0,
        };
        func.total_replace(out, keep);
        func.op_destroy(op);
        1
    }
}

/// `x | 0 -> x`.
pub struct RuleOrZero;

impl Rule for RuleOrZero {
    fn name(&self) -> &'static str {
        "orzero"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::IntOr]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(out) = pcode.output else { return 0 };
        let (a, b) = (pcode.inputs[0], pcode.inputs[1]);
        let keep = match (func.varnode(a).constant_value, func.varnode(b).constant_value()) {
            (Some(0), _) => b,
            (_, Some(0)) => a,
            _ => return 0,
        };
        func.total_replace(out, keep);
        func.op_destroy(op);
        1
    }
}

/// `(x << c1) << c2 -> x << (c1 + c2)`, saturating to the constant `0` once
/// the combined shift clears every bit of the result's width.
pub struct RuleShiftShift;

impl Rule for RuleShiftShift {
    fn name(&self) -> &'static str {
        "shiftshift"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::IntLeft]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(out) = pcode.output else { return 0 };
        let (x_outer, c2_vn) = (pcode.inputs[0], pcode.inputs[1]);
        let Some(c2) = func.varnode(c2_vn).constant_value() else { return 0 };
        let Some(inner_def) = func.varnode(x_outer).def else { return 0 };
        let inner = func.op(inner_def);
        if inner.is_dead() || inner.opcode != OpCode::IntLeft {
            return 0;
        }
        let (x, c1_vn) = (inner.inputs[0], inner.inputs[1]);
        let Some(c1) = func.varnode(c1_vn).constant_value() else { return 0 };
        let out_size = func.varnode(out).size;
        let bits = bit_width(out_size) as u64;
        let total = c1.saturating_add(c2);

        if total >= bits {
            func.total_replace_constant(out, 0);
        } else {
            let c = func.new_constant(func.varnode(c2_vn).size, total);
            let (_shift_op, shift_out) =
                func.build_op_before(op, OpCode::IntLeft, &[x, c], Some(out_size));
            func.total_replace(out, shift_out.unwrap());
        }
        func.op_destroy(op);
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
    fn and_all_ones_collapses() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let x = f.new_varnode(4, Address::new(1, 0));
        let ones = f.new_constant(4, 0xFFFF_FFFF);
        let (copy_op, _copy_out) = f.new_op_with_output(OpCode::Copy, b0, Address::new(1, 8), &[x], 4);
        let (_and_op, and_out) =
            f.new_op_with_output(OpCode::IntAnd, b0, Address::new(1, 4), &[x, ones], 4);
        let (use_op, _use_out) =
            f.new_op_with_output(OpCode::Copy, b0, Address::new(1, 0xC), &[and_out], 4);

        let pool = RulePool::new(vec![Rc::new(RuleAndAllOnes)]);
        pool.run(&mut f).unwrap();
        assert_eq!(f.op(use_op).inputs[0], x);
        let _ = copy_op;
    }

    #[test]
    fn shift_shift_collapses_to_sum() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let x = f.new_varnode(4, Address::new(1, 0));
        let c3 = f.new_constant(4, 3);
        let c4 = f.new_constant(4, 4);
        let (_inner_op, inner_out) =
            f.new_op_with_output(OpCode::IntLeft, b0, Address::new(1, 4), &[x, c3], 4);
        let (_outer_op, outer_out) =
            f.new_op_with_output(OpCode::IntLeft, b0, Address::new(1, 8), &[inner_out, c4], 4);
        let (use_op, _use_out) =
            f.new_op_with_output(OpCode::Copy, b0, Address::new(1, 0xC), &[outer_out], 4);

        let pool = RulePool::new(vec![Rc::new(RuleShiftShift)]);
        pool.run(&mut f).unwrap();
        let result_vn = f.op(use_op).inputs[0];
        let def = f.varnode(result_vn).def.unwrap();
        assert_eq!(f.op(def).opcode, OpCode::IntLeft);
        assert_eq!(f.varnode(f.op(def).inputs[1]).constant_value, Some(7));
    }
}
