//! Comparison normalisation rules ("Compare normalisation").
//! Canonicalises each comparison family to a single direction so the rule
//! pool reaches a fixed point instead of flipping a comparison back and
//! forth across sweeps.

use crate::ir::entities::OpId;
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use crate::rule::Rule;

/// `a <= c -> a < c+1` (unsigned), when `c` is constant and doesn't already
/// sit at the representable maximum for its size (where `c+1` would wrap).
/// Only ever rewrites towards `INT_LESS`, so it cannot cycle with a
/// hypothetical inverse rule.
pub struct RuleLessEqualToLess;

impl Rule for RuleLessEqualToLess {
    fn name(&self) -> &'static str {
        "lessequaltoless"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::IntLessEqual]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(out) = pcode.output else { return 0 };
        let (a, b) = (pcode.inputs[0], pcode.inputs[1]);
        let Some(c) = func.varnode(b).constant_value() else { return 0 };
        let size = func.varnode(b).size;
        let max = crate::ir::varnode::mask_to_size(u64::MAX, size);
        if c == max {
            return 0;
        }
        let c_plus_one = func.new_constant(size, c.wrapping_add(1));
        let out_size = func.varnode(out).size;
        let (_new_op, new_out) =
            func.build_op_before(op, OpCode::IntLess, &[a, c_plus_one], Some(out_size));
        func.total_replace(out, new_out.unwrap());
        func.op_destroy(op);
        1
    }
}

/// Canonicalises `(IntEqual|IntNotEqual) const, x -> (same op) x, const`
/// (commutative, so this just moves the constant to slot 1, the form the
/// conditional-constant pass and split-varnode `FormEqual` matcher both
/// expect).
pub struct RuleCanonicalizeEqualOperandOrder;

impl Rule for RuleCanonicalizeEqualOperandOrder {
    fn name(&self) -> &'static str {
        "canonequalorder"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::IntEqual, OpCode::IntNotEqual]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let (a, b) = (pcode.inputs[0], pcode.inputs[1]);
        let a_const = func.varnode(a).constant_value().is_some();
        let b_const = func.varnode(b).constant_value().is_some();
        if !a_const || b_const {
            return 0;
        }
        func.op_set_input(op, 0, b);
        func.op_set_input(op, 1, a);
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
    fn lessequal_rewrites_to_less_of_incremented_constant() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let x = f.new_varnode(4, Address::new(1, 0));
        let c5 = f.new_constant(4, 5);
        let (_op, out) = f.new_op_with_output(OpCode::IntLessEqual, b0, Address::new(1, 4), &[x, c5], 1);
        let (use_op, _u) = f.new_op_with_output(OpCode::Copy, b0, Address::new(1, 8), &[out], 1);

        let pool = RulePool::new(vec![Rc::new(RuleLessEqualToLess)]);
        pool.run(&mut f).unwrap();
        let def = f.varnode(f.op(use_op).inputs[0]).def.unwrap();
        assert_eq!(f.op(def).opcode, OpCode::IntLess);
        assert_eq!(f.varnode(f.op(def).inputs[1]).constant_value, Some(6));
    }

    #[test]
    fn equal_canonicalizes_constant_to_second_slot() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let x = f.new_varnode(4, Address::new(1, 0));
        let c5 = f.new_constant(4, 5);
        let (op, _out) = f.new_op_with_output(OpCode::IntEqual, b0, Address::new(1, 4), &[c5, x], 1);

        let pool = RulePool::new(vec![Rc::new(RuleCanonicalizeEqualOperandOrder)]);
        pool.run(&mut f).unwrap();
        assert_eq!(f.op(op).inputs[0], x);
        assert_eq!(f.varnode(f.op(op).inputs[1]).constant_value, Some(5));
    }
}
