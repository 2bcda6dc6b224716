//! Conditional constant propagation, ActionConditionalConst:
//! when a `CBRANCH` tests `var == const` (or `!=`) and one successor is
//! reachable only along that edge, `var` is known to equal `const` for the
//! reads in that successor that occur before any redefinition. Grounded on
//! the same worklist-over-CFG shape as `cranelift-codegen`'s constant
//! folding passes, specialised to the single-predecessor-edge case Ghidra's
//! `ActionConditionalConst` documents as its common case.

use crate::ir::block::EdgeKind;
use crate::ir::entities::{BlockId, VarnodeId};
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;

/// One fact proven by a single-predecessor conditional edge: `var` equals
/// the constant varnode `value` for every read in `block` up to its first
/// redefinition. `value` is the literal operand varnode from the
/// comparison itself, reused as-is rather than re-materialised, so the
/// substitution introduces no new varnode identity.
struct Fact {
    block: BlockId,
    var: VarnodeId,
    value: VarnodeId,
}

fn branch_facts(func: &Funcdata) -> Vec<Fact> {
    let mut facts = Vec::new();
    for block in func.block_graph().blocks() {
        let ops: Vec<_> = func.live_ops_in_block(block).collect();
        let Some(&branch) = ops.last() else { continue };
        if func.op(branch).opcode != OpCode::CBranch {
            continue;
        }
        let cond = func.op(branch).inputs[1];
        let Some(def) = func.varnode(cond).def else { continue };
        if func.op(def).is_dead() {
            continue;
        }
        let cmp = func.op(def);
        let lhs_const = func.varnode(cmp.inputs[0]).is_constant();
        let rhs_const = func.varnode(cmp.inputs[1]).is_constant();
        let (var, value, on_true) = match (cmp.opcode, lhs_const, rhs_const) {
            (OpCode::IntEqual, true, false) => (cmp.inputs[1], cmp.inputs[0], true),
            (OpCode::IntEqual, false, true) => (cmp.inputs[0], cmp.inputs[1], true),
            (OpCode::IntNotEqual, true, false) => (cmp.inputs[1], cmp.inputs[0], false),
            (OpCode::IntNotEqual, false, true) => (cmp.inputs[0], cmp.inputs[1], false),
            _ => continue,
        };

        for edge in &func.block(block).out_edges {
            let matches_branch = matches!(
                (edge.kind, on_true),
                (EdgeKind::True, true) | (EdgeKind::False, false)
            );
            if !matches_branch {
                continue;
            }
            if func.block(edge.target).in_edges.len() == 1 {
                facts.push(Fact { block: edge.target, var, value });
            }
        }
    }
    facts
}

/// Apply every provable `var == const` fact to its reachable-only-this-way
/// successor block, substituting the proven constant varnode for each read
/// of `var` until the first op that redefines it. Returns how many reads
/// were rewritten.
pub fn run_conditional_const(func: &mut Funcdata) -> usize {
    let facts = branch_facts(func);
    let mut rewritten = 0;
    for fact in facts {
        let ops: Vec<_> = func.live_ops_in_block(fact.block).collect();
        for op in ops {
            if func.op(op).output == Some(fact.var) {
                break; // fact.var is redefined here: stop substituting
            }
            let slots: Vec<usize> = func
                .op(op)
                .inputs
                .iter()
                .enumerate()
                .filter(|(_, &vn)| vn == fact.var)
                .map(|(i, _)| i)
                .collect();
            for slot in slots {
                func.op_set_input(op, slot, fact.value);
                rewritten += 1;
            }
        }
    }
    rewritten
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
    fn equality_guard_substitutes_in_sole_true_successor() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let b1 = f.block_graph_mut().make_block();
        let b2 = f.block_graph_mut().make_block();
        f.block_graph_mut().add_edge(b0, b1, EdgeKind::True);
        f.block_graph_mut().add_edge(b0, b2, EdgeKind::False);

        let x = f.new_varnode(4, Address::new(1, 0x10));
        let five = f.new_constant(4, 5);
        let (_cmp_op, cmp_out) =
            f.new_op_with_output(OpCode::IntEqual, b0, Address::new(1, 0), &[x, five], 1);
        let target = f.new_constant(8, 0);
        let branch = f.new_op(2, Address::new(1, 4), b0);
        f.op_set_opcode(branch, OpCode::CBranch);
        f.op_set_all_input(branch, &[target, cmp_out]);
        f.op_insert_end(b0, branch);

        let (use_op, _use_out) =
            f.new_op_with_output(OpCode::Copy, b1, Address::new(1, 0), &[x], 4);

        let rewritten = run_conditional_const(&mut f);
        assert_eq!(rewritten, 1);
        assert_eq!(f.op(use_op).inputs[0], five);
    }

    #[test]
    fn shared_successor_is_left_untouched() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let b1 = f.block_graph_mut().make_block();
        let b2 = f.block_graph_mut().make_block();
        let join = f.block_graph_mut().make_block();
        f.block_graph_mut().add_edge(b0, b1, EdgeKind::True);
        f.block_graph_mut().add_edge(b0, b2, EdgeKind::False);
        f.block_graph_mut().add_edge(b1, join, EdgeKind::Fallthrough);
        f.block_graph_mut().add_edge(b2, join, EdgeKind::Fallthrough);

        let x = f.new_varnode(4, Address::new(1, 0x10));
        let five = f.new_constant(4, 5);
        let (_cmp, cmp_out) =
            f.new_op_with_output(OpCode::IntEqual, b0, Address::new(1, 0), &[x, five], 1);
        let target = f.new_constant(8, 0);
        let branch = f.new_op(2, Address::new(1, 4), b0);
        f.op_set_opcode(branch, OpCode::CBranch);
        f.op_set_all_input(branch, &[target, cmp_out]);
        f.op_insert_end(b0, branch);

        let (use_op, _) = f.new_op_with_output(OpCode::Copy, join, Address::new(1, 0), &[x], 4);

        let rewritten = run_conditional_const(&mut f);
        assert_eq!(rewritten, 0); // join has two predecessors, fact doesn't hold there
        assert_eq!(f.op(use_op).inputs[0], x);
    }
}
