//! Call-indirection folding ("Call-indirection folding"; scenario
//! D). Grounded on `cranelift-codegen`'s direct-call recognition during
//! legalisation: an indirect call whose target traces back through copies
//! to a constant, function-pointer-aligned address is rewritten to a
//! direct call.

use crate::ir::entities::OpId;
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use crate::rule::Rule;

/// Walks a chain of `COPY`s back from `vn` to the first non-`COPY`
/// definition, returning its constant value if that definition is itself a
/// constant (or a chain of copies terminating at one).
fn resolve_constant_through_copies(func: &Funcdata, mut vn: crate::ir::entities::VarnodeId) -> Option<u64> {
    for _ in 0..64 {
        if let Some(c) = func.varnode(vn).constant_value() {
            return Some(c);
        }
        let def = func.varnode(vn).def?;
        if func.op(def).is_dead() || func.op(def).opcode != OpCode::Copy {
            return None;
        }
        vn = func.op(def).inputs[0];
    }
    None
}

/// `x = CALLIND fp, args... -> x = CALL &target, args...`, when `fp`
/// resolves (through any chain of copies) to a constant aligned to
/// `funcptr_align` (scenario D: `fp = COPY &func_main` folds the indirect
/// call into a direct one).
pub struct RuleCallIndirectFold {
    funcptr_align: u64,
}

impl RuleCallIndirectFold {
    pub fn new(funcptr_align: u64) -> Self {
        Self { funcptr_align: funcptr_align.max(1) }
    }
}

impl Rule for RuleCallIndirectFold {
    fn name(&self) -> &'static str {
        "callindirectfold"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::CallInd]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let target = func.op(op).inputs[0];
        let Some(addr) = resolve_constant_through_copies(func, target) else { return 0 };
        if addr % self.funcptr_align != 0 {
            return 0;
        }
        let size = func.varnode(target).size;
        let direct = func.new_constant(size, addr);
        func.op_set_input(op, 0, direct);
        func.op_set_opcode(op, OpCode::Call);
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
    fn scenario_d_indirect_call_resolves_to_direct() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let func_main = f.new_constant(8, 0x4000);
        let (_copy_op, fp) = f.new_op_with_output(OpCode::Copy, b0, Address::new(1, 0), &[func_main], 8);
        let arg1 = f.new_varnode(4, Address::new(1, 8));
        let (call_op, _out) =
            f.new_op_with_output(OpCode::CallInd, b0, Address::new(1, 0x10), &[fp, arg1], 4);

        let pool = RulePool::new(vec![Rc::new(RuleCallIndirectFold::new(4))]);
        pool.run(&mut f).unwrap();

        assert_eq!(f.op(call_op).opcode, OpCode::Call);
        assert_eq!(f.varnode(f.op(call_op).inputs[0]).constant_value, Some(0x4000));
    }

    #[test]
    fn misaligned_target_is_left_indirect() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let fp = f.new_constant(8, 0x4001);
        let (call_op, _out) = f.new_op_with_output(OpCode::CallInd, b0, Address::new(1, 0), &[fp], 4);

        let pool = RulePool::new(vec![Rc::new(RuleCallIndirectFold::new(4))]);
        pool.run(&mut f).unwrap();
        assert_eq!(f.op(call_op).opcode, OpCode::CallInd);
    }
}
