//! Switch recovery normalisation rules. Full jump-table labelling needs a
//! translator-supplied address space and load image and is out of scope
//! here (see `"switchnorm"` in [`crate::actiondatabase`]); these two rules
//! cover the op-local shape switch recovery needs before that stage runs:
//! collapsing an already-resolved single-target indirect branch, and
//! canonicalising the equality-cascade shape a chain of `case` tests
//! presents before a jump table is built from it.

use crate::ir::entities::OpId;
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use crate::rule::Rule;

/// `BRANCHIND addr` where `addr` is a compile-time constant and the block
/// has exactly one successor: the indirect branch has degenerated to a
/// single known target (a switch with one surviving case, or one that
/// never had more than one), so replace it with a direct `BRANCH`.
pub struct RuleSwitchSingleBranch;

impl Rule for RuleSwitchSingleBranch {
    fn name(&self) -> &'static str {
        "switchsinglebranch"
    }
    fn group(&self) -> &'static str {
        "jumptable"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::BranchInd]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let target_vn = pcode.inputs[0];
        if func.varnode(target_vn).constant_value().is_none() {
            return 0;
        }
        let block = pcode.parent;
        if func.block_graph().block(block).out_edges.len() != 1 {
            return 0;
        }
        func.op_set_opcode(op, OpCode::Branch);
        1
    }
}

/// `CBRANCH cond` where `cond = INT_NOTEQUAL(sel, c)` and `c` is constant:
/// flip it to the `INT_EQUAL` form (and the edge it takes) so a cascade of
/// single-value comparisons against the same selector always presents as
/// `INT_EQUAL`, the shape switch recovery scans a block chain for before
/// folding the cascade into a jump table.
pub struct RuleSwitchCascadeNormalize;

impl Rule for RuleSwitchCascadeNormalize {
    fn name(&self) -> &'static str {
        "switchcascadenormalize"
    }
    fn group(&self) -> &'static str {
        "jumptable"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::CBranch]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let cond_vn = pcode.inputs[1];
        let Some(cond_def) = func.varnode(cond_vn).def else { return 0 };
        if func.op(cond_def).is_dead() || func.op(cond_def).opcode != OpCode::IntNotEqual {
            return 0;
        }
        let (sel, c) = (func.op(cond_def).inputs[0], func.op(cond_def).inputs[1]);
        if func.varnode(c).constant_value().is_none() {
            return 0;
        }
        let out_size = func.varnode(cond_vn).size;
        let (_eq_op, eq_out) = func.build_op_before(op, OpCode::IntEqual, &[sel, c], Some(out_size));
        func.op_set_input(op, 1, eq_out.unwrap());
        func.op_flip_condition(op);
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::address::{AddrSpace, Address, SpaceType};
    use crate::ir::block::EdgeKind;
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
    fn single_successor_constant_branchind_becomes_direct_branch() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let b1 = f.block_graph_mut().make_block();
        f.block_graph_mut().add_edge(b0, b1, EdgeKind::Fallthrough);
        let target = f.new_constant(8, 0x4000);
        let branch_op = f.new_op(1, Address::new(1, 0), b0);
        f.op_set_opcode(branch_op, OpCode::BranchInd);
        f.op_set_all_input(branch_op, &[target]);
        f.op_insert_end(b0, branch_op);

        let pool = RulePool::new(vec![Rc::new(RuleSwitchSingleBranch)]);
        pool.run(&mut f).unwrap();
        assert_eq!(f.op(branch_op).opcode, OpCode::Branch);
    }

    #[test]
    fn notequal_cascade_condition_normalizes_to_equal() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let b1 = f.block_graph_mut().make_block();
        let b2 = f.block_graph_mut().make_block();
        f.block_graph_mut().add_edge(b0, b1, EdgeKind::True);
        f.block_graph_mut().add_edge(b0, b2, EdgeKind::False);

        let sel = f.new_varnode(4, Address::new(1, 0));
        let c = f.new_constant(4, 3);
        let (_cmp_op, cmp_out) =
            f.new_op_with_output(OpCode::IntNotEqual, b0, Address::new(1, 4), &[sel, c], 1);
        let target = f.new_constant(8, 0x1000);
        let branch_op = f.new_op(2, Address::new(1, 8), b0);
        f.op_set_opcode(branch_op, OpCode::CBranch);
        f.op_set_all_input(branch_op, &[target, cmp_out]);
        f.op_insert_end(b0, branch_op);

        let pool = RulePool::new(vec![Rc::new(RuleSwitchCascadeNormalize)]);
        pool.run(&mut f).unwrap();

        let new_cond = f.op(branch_op).inputs[1];
        let new_cond_def = f.varnode(new_cond).def.unwrap();
        assert_eq!(f.op(new_cond_def).opcode, OpCode::IntEqual);
        assert_eq!(f.block_graph().block(b0).out_edges[0].kind, EdgeKind::False);
        assert_eq!(f.block_graph().block(b0).out_edges[1].kind, EdgeKind::True);
    }
}
