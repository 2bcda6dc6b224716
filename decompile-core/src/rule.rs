//! Peephole rules and the opcode-dispatch pool that drives them to a fixed
//! point ("Rule"/"ActionPool"). Grounded on the closed-variant,
//! table-driven dispatch `cranelift-codegen/src/ir/instructions.rs` uses for
//! opcodes, generalised here from "one fixed behavior per opcode" to
//! "an open, opcode-indexed list of independent local rewrites".

use crate::ir::entities::OpId;
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// A single local rewrite, scoped to the opcodes in [`Rule::op_list`]. Rules
/// must be pure with respect to the op graph: no hidden side effects beyond
/// the rewrite they report.
pub trait Rule {
    fn name(&self) -> &'static str;
    /// The action-group tag this rule participates under, e.g.
    /// `"decompile"`, `"jumptable"` — see [`crate::actiondatabase`].
    fn group(&self) -> &'static str;
    fn op_list(&self) -> &'static [OpCode];
    /// Attempt the rewrite at `op`. Returns the number of changes made (0 if
    /// the precondition didn't match — "rule neutrality").
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize;
}

/// How many sweeps [`RulePool::run`] will perform before giving up and
/// reporting non-convergence ("recommended bound: 50").
pub const MAX_SWEEPS: u32 = 50;

/// Opcode-indexed dispatch table over a fixed rule set, run to a stable
/// point over one function ("ActionPool"). Rules are reference
/// counted so a rule interested in several opcodes can be filed under each
/// without duplicating its (stateless) value.
pub struct RulePool {
    by_opcode: FxHashMap<OpCode, Vec<Rc<dyn Rule>>>,
}

impl RulePool {
    pub fn new(rules: Vec<Rc<dyn Rule>>) -> Self {
        let mut by_opcode: FxHashMap<OpCode, Vec<Rc<dyn Rule>>> = FxHashMap::default();
        for rule in rules {
            for &op in rule.op_list() {
                by_opcode.entry(op).or_default().push(rule.clone());
            }
        }
        Self { by_opcode }
    }

    /// Keep only rules whose [`Rule::group`] is in `active`, the
    /// `ActionDatabase` "pruned clone" operation.
    pub fn filtered(rules: Vec<Rc<dyn Rule>>, active: &[&str]) -> Self {
        let kept: Vec<Rc<dyn Rule>> = rules.into_iter().filter(|r| active.contains(&r.group())).collect();
        Self::new(kept)
    }

    /// Run every live op through its registered rules until a sweep makes no
    /// changes, walking blocks in block-list order for determinism. Returns
    /// the total number of changes made across all sweeps, or a
    /// non-convergence error if
    /// [`MAX_SWEEPS`] is exceeded.
    pub fn run(&self, func: &mut Funcdata) -> Result<u32, crate::error::DecompileError> {
        let mut total = 0u32;
        for _ in 0..MAX_SWEEPS {
            let mut changes = 0usize;
            for block in func.block_graph().blocks().collect::<Vec<_>>() {
                for op in func.live_ops_in_block(block).collect::<Vec<_>>() {
                    if func.op(op).is_dead() {
                        continue;
                    }
                    let opcode = func.op(op).opcode;
                    let Some(rules) = self.by_opcode.get(&opcode) else { continue };
                    for rule in rules {
                        if func.op(op).is_dead() {
                            break; // an earlier rule this sweep already retired `op`
                        }
                        changes += rule.apply_op(op, func);
                    }
                }
            }
            total += changes as u32;
            if changes == 0 {
                func.sweep_dead();
                return Ok(total);
            }
        }
        Err(crate::error::DecompileError::PassLimitExceeded("rule pool did not converge".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::address::{AddrSpace, Address, SpaceType};

    struct AddConstFold;
    impl Rule for AddConstFold {
        fn name(&self) -> &'static str {
            "addconstfold"
        }
        fn group(&self) -> &'static str {
            "test"
        }
        fn op_list(&self) -> &'static [OpCode] {
            &[OpCode::IntAdd]
        }
        fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
            let pcode = func.op(op);
            let (Some(a), Some(b)) = (
                func.varnode(pcode.inputs[0]).constant_value,
                func.varnode(pcode.inputs[1]).constant_value,
            ) else {
                return 0;
            };
            let out = pcode.output.unwrap();
            func.total_replace_constant(out, a.wrapping_add(b));
            func.op_destroy(op);
            1
        }
    }

    fn setup() -> Funcdata {
        let mut f = Funcdata::new("f");
        f.spaces_mut().add_space(AddrSpace::new(0, "const", 1, 8, false, SpaceType::Constant)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(1, "ram", 1, 8, false, SpaceType::Ram)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(2, "unique", 1, 8, false, SpaceType::Unique)).unwrap();
        f
    }

    #[test]
    fn pool_converges_and_reports_zero_on_stable_input() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let c1 = f.new_constant(4, 1);
        let c2 = f.new_constant(4, 2);
        f.new_op_with_output(OpCode::IntAdd, b0, Address::new(1, 0), &[c1, c2], 4);
        let pool = RulePool::new(vec![Rc::new(AddConstFold)]);
        let first = pool.run(&mut f).unwrap();
        assert_eq!(first, 1);
        let second = pool.run(&mut f).unwrap();
        assert_eq!(second, 0);
    }
}
