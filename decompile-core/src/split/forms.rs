//! Split-varnode form matchers. Each matcher is a [`Rule`]
//! built on the [`super::splitvarnode::SplitVarnode`] harness, recognising a
//! pair of half-width ops that are really one wide op operating on two
//! halves and fusing them back into the wide op. Covers the
//! Add/Sub/Logical/Equal/LessThreeWay/CopyForce forms; Shift, Mult, Phi and
//! Indirect are deferred (see DESIGN.md) since they need either a
//! cross-block lane-tracking model or a shift-amount-dependent carry chain
//! this crate's simplified precision-flag model doesn't carry enough
//! information to drive safely.

use super::splitvarnode::SplitVarnode;
use crate::ir::address::Address;
use crate::ir::entities::{OpId, VarnodeId};
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use crate::ir::varnode::VarnodeFlags;
use crate::rule::Rule;

fn precision_paired(func: &Funcdata, lo: VarnodeId, hi: VarnodeId) -> bool {
    func.varnode(lo).flags.contains(VarnodeFlags::PRECISION_LOW)
        && func.varnode(hi).flags.contains(VarnodeFlags::PRECISION_HIGH)
}

/// Finds the varnode immediately below `hi` in the same address space,
/// assuming it occupies exactly `lo_size` bytes — the structural half of
/// `SplitVarnode::is_adjacent`'s check, run in reverse to recover a partner
/// this matcher wasn't handed directly.
fn find_lo_partner(func: &Funcdata, hi: VarnodeId, lo_size: u32) -> Option<VarnodeId> {
    let hi_addr = func.varnode(hi).addr;
    if hi_addr.offset < lo_size as u64 {
        return None;
    }
    let lo_addr = Address::new(hi_addr.space, hi_addr.offset - lo_size as u64);
    func.varnodes_in_range(lo_addr, lo_size)
        .into_iter()
        .find(|&vn| func.varnode(vn).addr == lo_addr && func.varnode(vn).size == lo_size)
}

/// `lo = INT_ADD lo1, lo2; c = INT_CARRY lo1, lo2; tmp = INT_ZEXT c;
/// hi = INT_ADD(INT_ADD hi1, hi2, tmp) -> w = INT_ADD w1, w2`, with `lo`/
/// `hi` rebuilt as `SUBPIECE`s of `w`.
pub struct FormAdd;

impl FormAdd {
    fn try_match(
        &self,
        op: OpId,
        func: &mut Funcdata,
        hi_partial_vn: VarnodeId,
        tmp_vn: VarnodeId,
        hi_final_out: VarnodeId,
    ) -> Option<usize> {
        let tmp_def = func.varnode(tmp_vn).def?;
        if func.op(tmp_def).is_dead() || func.op(tmp_def).opcode != OpCode::IntZExt {
            return None;
        }
        let carry_vn = func.op(tmp_def).inputs[0];
        let carry_def = func.varnode(carry_vn).def?;
        if func.op(carry_def).is_dead() || func.op(carry_def).opcode != OpCode::IntCarry {
            return None;
        }
        let (lo1, lo2) = (func.op(carry_def).inputs[0], func.op(carry_def).inputs[1]);

        let hi_partial_def = func.varnode(hi_partial_vn).def?;
        if func.op(hi_partial_def).is_dead() || func.op(hi_partial_def).opcode != OpCode::IntAdd {
            return None;
        }
        let (hi1, hi2) = (func.op(hi_partial_def).inputs[0], func.op(hi_partial_def).inputs[1]);

        if !precision_paired(func, lo1, hi1) || !precision_paired(func, lo2, hi2) {
            return None;
        }

        let lo_op = func.varnode(lo1).descendants_snapshot().into_iter().find(|&d| {
            let p = func.op(d);
            !p.is_dead()
                && p.opcode == OpCode::IntAdd
                && ((p.inputs[0] == lo1 && p.inputs[1] == lo2) || (p.inputs[0] == lo2 && p.inputs[1] == lo1))
        })?;
        let lo_out = func.op(lo_op).output?;

        let split1 = SplitVarnode::new(hi1, lo1);
        let split2 = SplitVarnode::new(hi2, lo2);
        if !split1.is_adjacent(func) || !split2.is_adjacent(func) {
            return None;
        }

        let w1 = split1.materialize_whole(func, op);
        let w2 = split2.materialize_whole(func, op);
        let whole_size = split1.whole_size(func);
        let (_add_op, w_out) = func.build_op_before(op, OpCode::IntAdd, &[w1, w2], Some(whole_size));
        let w = w_out.unwrap();

        let sizing = SplitVarnode::new(hi_final_out, lo_out);
        let (new_lo, new_hi) = sizing.rebuild_as_subpieces(func, w, op);

        func.total_replace(lo_out, new_lo);
        func.total_replace(hi_final_out, new_hi);

        func.op_destroy(lo_op);
        func.op_destroy(carry_def);
        func.op_destroy(tmp_def);
        func.op_destroy(hi_partial_def);
        func.op_destroy(op);
        Some(1)
    }
}

impl Rule for FormAdd {
    fn name(&self) -> &'static str {
        "splitformadd"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::IntAdd]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(hi_final_out) = pcode.output else { return 0 };
        let (a, b) = (pcode.inputs[0], pcode.inputs[1]);
        for &(hi_partial_vn, tmp_vn) in &[(a, b), (b, a)] {
            if let Some(n) = self.try_match(op, func, hi_partial_vn, tmp_vn, hi_final_out) {
                return n;
            }
        }
        0
    }
}

/// `lo = INT_SUB lo1, lo2; borrow = INT_LESS lo1, lo2; tmp = INT_ZEXT
/// borrow; hi = INT_SUB(INT_SUB hi1, hi2, tmp) -> w = INT_SUB w1, w2`. The
/// subtract counterpart of [`FormAdd`]; unlike `INT_ADD`, `INT_SUB` isn't
/// commutative so the hi-partial/tmp operand slots are fixed rather than
/// tried both ways.
pub struct FormSub;

impl Rule for FormSub {
    fn name(&self) -> &'static str {
        "splitformsub"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::IntSub]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(hi_final_out) = pcode.output else { return 0 };
        let (hi_partial_vn, tmp_vn) = (pcode.inputs[0], pcode.inputs[1]);

        let Some(tmp_def) = func.varnode(tmp_vn).def else { return 0 };
        if func.op(tmp_def).is_dead() || func.op(tmp_def).opcode != OpCode::IntZExt {
            return 0;
        }
        let borrow_vn = func.op(tmp_def).inputs[0];
        let Some(borrow_def) = func.varnode(borrow_vn).def else { return 0 };
        if func.op(borrow_def).is_dead() || func.op(borrow_def).opcode != OpCode::IntLess {
            return 0;
        }
        let (lo1, lo2) = (func.op(borrow_def).inputs[0], func.op(borrow_def).inputs[1]);

        let Some(hi_partial_def) = func.varnode(hi_partial_vn).def else { return 0 };
        if func.op(hi_partial_def).is_dead() || func.op(hi_partial_def).opcode != OpCode::IntSub {
            return 0;
        }
        let (hi1, hi2) = (func.op(hi_partial_def).inputs[0], func.op(hi_partial_def).inputs[1]);

        if !precision_paired(func, lo1, hi1) || !precision_paired(func, lo2, hi2) {
            return 0;
        }

        let lo_op = func.varnode(lo1).descendants_snapshot().into_iter().find(|&d| {
            let p = func.op(d);
            !p.is_dead() && p.opcode == OpCode::IntSub && p.inputs[0] == lo1 && p.inputs[1] == lo2
        });
        let Some(lo_op) = lo_op else { return 0 };
        let Some(lo_out) = func.op(lo_op).output else { return 0 };

        let split1 = SplitVarnode::new(hi1, lo1);
        let split2 = SplitVarnode::new(hi2, lo2);
        if !split1.is_adjacent(func) || !split2.is_adjacent(func) {
            return 0;
        }

        let w1 = split1.materialize_whole(func, op);
        let w2 = split2.materialize_whole(func, op);
        let whole_size = split1.whole_size(func);
        let (_sub_op, w_out) = func.build_op_before(op, OpCode::IntSub, &[w1, w2], Some(whole_size));
        let w = w_out.unwrap();

        let sizing = SplitVarnode::new(hi_final_out, lo_out);
        let (new_lo, new_hi) = sizing.rebuild_as_subpieces(func, w, op);
        func.total_replace(lo_out, new_lo);
        func.total_replace(hi_final_out, new_hi);

        func.op_destroy(lo_op);
        func.op_destroy(borrow_def);
        func.op_destroy(tmp_def);
        func.op_destroy(hi_partial_def);
        func.op_destroy(op);
        1
    }
}

/// `hi = OP hi1, hi2` paired with `lo = OP lo1, lo2` for the same bitwise
/// `OP` (`INT_AND`/`INT_OR`/`INT_XOR`, which unlike add/sub carry nothing
/// between halves) -> `w = OP w1, w2`. Triggers on the hi op and locates its
/// lo partner by address rather than by a carry chain, since there's no
/// carry link to derive it from.
pub struct FormLogical;

impl Rule for FormLogical {
    fn name(&self) -> &'static str {
        "splitformlogical"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::IntAnd, OpCode::IntOr, OpCode::IntXor]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let opcode = pcode.opcode;
        let Some(hi_out) = pcode.output else { return 0 };
        let (hi1, hi2) = (pcode.inputs[0], pcode.inputs[1]);
        if !func.varnode(hi1).flags.contains(VarnodeFlags::PRECISION_HIGH)
            || !func.varnode(hi2).flags.contains(VarnodeFlags::PRECISION_HIGH)
        {
            return 0;
        }

        let lo1_size = func.varnode(hi1).size;
        let lo2_size = func.varnode(hi2).size;
        let Some(lo1) = find_lo_partner(func, hi1, lo1_size) else { return 0 };
        let Some(lo2) = find_lo_partner(func, hi2, lo2_size) else { return 0 };
        if !precision_paired(func, lo1, hi1) || !precision_paired(func, lo2, hi2) {
            return 0;
        }

        let lo_op = func.varnode(lo1).descendants_snapshot().into_iter().find(|&d| {
            let p = func.op(d);
            !p.is_dead()
                && p.opcode == opcode
                && ((p.inputs[0] == lo1 && p.inputs[1] == lo2) || (p.inputs[0] == lo2 && p.inputs[1] == lo1))
        });
        let Some(lo_op) = lo_op else { return 0 };
        let Some(lo_out) = func.op(lo_op).output else { return 0 };

        let split1 = SplitVarnode::new(hi1, lo1);
        let split2 = SplitVarnode::new(hi2, lo2);
        if !split1.is_adjacent(func) || !split2.is_adjacent(func) {
            return 0;
        }

        let w1 = split1.materialize_whole(func, op);
        let w2 = split2.materialize_whole(func, op);
        let whole_size = split1.whole_size(func);
        let (_w_op, w_out) = func.build_op_before(op, opcode, &[w1, w2], Some(whole_size));
        let w = w_out.unwrap();

        let sizing = SplitVarnode::new(hi_out, lo_out);
        let (new_lo, new_hi) = sizing.rebuild_as_subpieces(func, w, op);
        func.total_replace(lo_out, new_lo);
        func.total_replace(hi_out, new_hi);

        func.op_destroy(lo_op);
        func.op_destroy(op);
        1
    }
}

/// `BOOL_AND(INT_EQUAL(hi1,hi2), INT_EQUAL(lo1,lo2)) -> INT_EQUAL(w1,w2)`:
/// a wide equality compare decomposed into two half compares ANDed
/// together, fused back into a single whole-width compare.
pub struct FormEqual;

impl Rule for FormEqual {
    fn name(&self) -> &'static str {
        "splitformequal"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::BoolAnd]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(and_out) = pcode.output else { return 0 };
        let (a, b) = (pcode.inputs[0], pcode.inputs[1]);

        let Some(a_def) = func.varnode(a).def else { return 0 };
        let Some(b_def) = func.varnode(b).def else { return 0 };
        if func.op(a_def).is_dead() || func.op(a_def).opcode != OpCode::IntEqual {
            return 0;
        }
        if func.op(b_def).is_dead() || func.op(b_def).opcode != OpCode::IntEqual {
            return 0;
        }

        let (x1, x2) = (func.op(a_def).inputs[0], func.op(a_def).inputs[1]);
        let (y1, y2) = (func.op(b_def).inputs[0], func.op(b_def).inputs[1]);

        let (hi1, hi2, lo1, lo2) = if func.varnode(x1).flags.contains(VarnodeFlags::PRECISION_HIGH) {
            (x1, x2, y1, y2)
        } else if func.varnode(y1).flags.contains(VarnodeFlags::PRECISION_HIGH) {
            (y1, y2, x1, x2)
        } else {
            return 0;
        };
        if !precision_paired(func, lo1, hi1) || !precision_paired(func, lo2, hi2) {
            return 0;
        }

        let split1 = SplitVarnode::new(hi1, lo1);
        let split2 = SplitVarnode::new(hi2, lo2);
        if !split1.is_adjacent(func) || !split2.is_adjacent(func) {
            return 0;
        }

        let w1 = split1.materialize_whole(func, op);
        let w2 = split2.materialize_whole(func, op);
        let out_size = func.varnode(and_out).size;
        let (_eq_op, w_eq) = func.build_op_before(op, OpCode::IntEqual, &[w1, w2], Some(out_size));
        func.total_replace(and_out, w_eq.unwrap());

        func.op_destroy(a_def);
        func.op_destroy(b_def);
        func.op_destroy(op);
        1
    }
}

/// `BOOL_OR(INT_SLESS(hi1,hi2), BOOL_AND(INT_EQUAL(hi1,hi2), INT_LESS(lo1,
/// lo2))) -> INT_SLESS(w1, w2)`: the three-way compare shape a signed
/// multi-precision less-than decomposes into ("hi1 is strictly less, or
/// hi halves are equal and lo1 is (unsigned) less") — collapsed back to a
/// single wide signed compare.
pub struct FormLessThreeWay;

impl Rule for FormLessThreeWay {
    fn name(&self) -> &'static str {
        "splitformlessthreeway"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::BoolOr]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(or_out) = pcode.output else { return 0 };
        let (sless_vn, and_vn) = (pcode.inputs[0], pcode.inputs[1]);

        let Some(sless_def) = func.varnode(sless_vn).def else { return 0 };
        if func.op(sless_def).is_dead() || func.op(sless_def).opcode != OpCode::IntSLess {
            return 0;
        }
        let (hi1, hi2) = (func.op(sless_def).inputs[0], func.op(sless_def).inputs[1]);

        let Some(and_def) = func.varnode(and_vn).def else { return 0 };
        if func.op(and_def).is_dead() || func.op(and_def).opcode != OpCode::BoolAnd {
            return 0;
        }
        let (eq_vn, less_vn) = (func.op(and_def).inputs[0], func.op(and_def).inputs[1]);

        let Some(eq_def) = func.varnode(eq_vn).def else { return 0 };
        if func.op(eq_def).is_dead() || func.op(eq_def).opcode != OpCode::IntEqual {
            return 0;
        }
        let eq_inputs = (func.op(eq_def).inputs[0], func.op(eq_def).inputs[1]);
        if eq_inputs != (hi1, hi2) && eq_inputs != (hi2, hi1) {
            return 0;
        }

        let Some(less_def) = func.varnode(less_vn).def else { return 0 };
        if func.op(less_def).is_dead() || func.op(less_def).opcode != OpCode::IntLess {
            return 0;
        }
        let (lo1, lo2) = (func.op(less_def).inputs[0], func.op(less_def).inputs[1]);

        if !precision_paired(func, lo1, hi1) || !precision_paired(func, lo2, hi2) {
            return 0;
        }

        let split1 = SplitVarnode::new(hi1, lo1);
        let split2 = SplitVarnode::new(hi2, lo2);
        if !split1.is_adjacent(func) || !split2.is_adjacent(func) {
            return 0;
        }

        let w1 = split1.materialize_whole(func, op);
        let w2 = split2.materialize_whole(func, op);
        let out_size = func.varnode(or_out).size;
        let (_cmp_op, w_cmp) = func.build_op_before(op, OpCode::IntSLess, &[w1, w2], Some(out_size));
        func.total_replace(or_out, w_cmp.unwrap());

        func.op_destroy(eq_def);
        func.op_destroy(less_def);
        func.op_destroy(and_def);
        func.op_destroy(sless_def);
        func.op_destroy(op);
        1
    }
}

/// `hi = COPY hi_src; lo = COPY lo_src`, where `(hi_src,lo_src)` and
/// `(hi,lo)` are each adjacent split pairs -> a single wide `COPY` rebuilt
/// into `hi`/`lo` subpieces. The shape a merge pass forces when two split
/// halves need to move together as one value.
pub struct FormCopyForce;

impl Rule for FormCopyForce {
    fn name(&self) -> &'static str {
        "splitformcopyforce"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::Copy]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(hi_out) = pcode.output else { return 0 };
        let hi_src = pcode.inputs[0];
        if !func.varnode(hi_out).flags.contains(VarnodeFlags::PRECISION_HIGH)
            || !func.varnode(hi_src).flags.contains(VarnodeFlags::PRECISION_HIGH)
        {
            return 0;
        }

        let lo_size = func.varnode(hi_out).size;
        let Some(lo_out) = find_lo_partner(func, hi_out, lo_size) else { return 0 };
        let Some(lo_src) = find_lo_partner(func, hi_src, lo_size) else { return 0 };
        if !precision_paired(func, lo_out, hi_out) || !precision_paired(func, lo_src, hi_src) {
            return 0;
        }

        let lo_def = func.varnode(lo_out).def;
        let lo_op = lo_def.filter(|&d| !func.op(d).is_dead() && func.op(d).opcode == OpCode::Copy && func.op(d).inputs[0] == lo_src);
        let Some(lo_op) = lo_op else { return 0 };

        let split_src = SplitVarnode::new(hi_src, lo_src);
        let split_dst = SplitVarnode::new(hi_out, lo_out);
        if !split_src.is_adjacent(func) || !split_dst.is_adjacent(func) {
            return 0;
        }

        let w_src = split_src.materialize_whole(func, op);
        let whole_size = split_dst.whole_size(func);
        let (_copy_op, w_out) = func.build_op_before(op, OpCode::Copy, &[w_src], Some(whole_size));
        let w = w_out.unwrap();

        let (new_lo, new_hi) = split_dst.rebuild_as_subpieces(func, w, op);
        func.total_replace(lo_out, new_lo);
        func.total_replace(hi_out, new_hi);

        func.op_destroy(lo_op);
        func.op_destroy(op);
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::address::{AddrSpace, SpaceType};
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
    fn scenario_e_double_precision_add_fuses_to_one_wide_add() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();

        let lo1 = f.new_varnode(4, Address::new(1, 0));
        f.varnode_mut(lo1).flags.set(VarnodeFlags::PRECISION_LOW);
        let hi1 = f.new_varnode(4, Address::new(1, 4));
        f.varnode_mut(hi1).flags.set(VarnodeFlags::PRECISION_HIGH);
        let lo2 = f.new_varnode(4, Address::new(1, 8));
        f.varnode_mut(lo2).flags.set(VarnodeFlags::PRECISION_LOW);
        let hi2 = f.new_varnode(4, Address::new(1, 0xC));
        f.varnode_mut(hi2).flags.set(VarnodeFlags::PRECISION_HIGH);

        let (_lo_op, lo) = f.new_op_with_output(OpCode::IntAdd, b0, Address::new(2, 0), &[lo1, lo2], 4);
        let (_carry_op, carry) =
            f.new_op_with_output(OpCode::IntCarry, b0, Address::new(2, 4), &[lo1, lo2], 1);
        let (_zext_op, tmp) = f.new_op_with_output(OpCode::IntZExt, b0, Address::new(2, 8), &[carry], 4);
        let (_hip_op, hi_partial) =
            f.new_op_with_output(OpCode::IntAdd, b0, Address::new(2, 0xC), &[hi1, hi2], 4);
        let (hi_op, hi) =
            f.new_op_with_output(OpCode::IntAdd, b0, Address::new(2, 0x10), &[hi_partial, tmp], 4);

        let (use_lo, _u1) = f.new_op_with_output(OpCode::Copy, b0, Address::new(2, 0x14), &[lo], 4);
        let (use_hi, _u2) = f.new_op_with_output(OpCode::Copy, b0, Address::new(2, 0x18), &[hi], 4);

        let pool = RulePool::new(vec![Rc::new(FormAdd)]);
        pool.run(&mut f).unwrap();

        assert!(f.op(hi_op).is_dead());
        let new_lo = f.op(use_lo).inputs[0];
        let new_hi = f.op(use_hi).inputs[0];
        let lo_def = f.varnode(new_lo).def.unwrap();
        let hi_def = f.varnode(new_hi).def.unwrap();
        assert_eq!(f.op(lo_def).opcode, OpCode::SubPiece);
        assert_eq!(f.op(hi_def).opcode, OpCode::SubPiece);
        let whole = f.op(lo_def).inputs[0];
        assert_eq!(whole, f.op(hi_def).inputs[0]);
        let whole_def = f.varnode(whole).def.unwrap();
        assert_eq!(f.op(whole_def).opcode, OpCode::IntAdd);
        assert_eq!(f.varnode(whole).size, 8);
    }

    #[test]
    fn double_precision_sub_fuses_to_one_wide_sub() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();

        let lo1 = f.new_varnode(4, Address::new(1, 0));
        f.varnode_mut(lo1).flags.set(VarnodeFlags::PRECISION_LOW);
        let hi1 = f.new_varnode(4, Address::new(1, 4));
        f.varnode_mut(hi1).flags.set(VarnodeFlags::PRECISION_HIGH);
        let lo2 = f.new_varnode(4, Address::new(1, 8));
        f.varnode_mut(lo2).flags.set(VarnodeFlags::PRECISION_LOW);
        let hi2 = f.new_varnode(4, Address::new(1, 0xC));
        f.varnode_mut(hi2).flags.set(VarnodeFlags::PRECISION_HIGH);

        let (_lo_op, lo) = f.new_op_with_output(OpCode::IntSub, b0, Address::new(2, 0), &[lo1, lo2], 4);
        let (_borrow_op, borrow) =
            f.new_op_with_output(OpCode::IntLess, b0, Address::new(2, 4), &[lo1, lo2], 1);
        let (_zext_op, tmp) = f.new_op_with_output(OpCode::IntZExt, b0, Address::new(2, 8), &[borrow], 4);
        let (_hip_op, hi_partial) =
            f.new_op_with_output(OpCode::IntSub, b0, Address::new(2, 0xC), &[hi1, hi2], 4);
        let (hi_op, hi) =
            f.new_op_with_output(OpCode::IntSub, b0, Address::new(2, 0x10), &[hi_partial, tmp], 4);

        let (use_lo, _u1) = f.new_op_with_output(OpCode::Copy, b0, Address::new(2, 0x14), &[lo], 4);
        let (use_hi, _u2) = f.new_op_with_output(OpCode::Copy, b0, Address::new(2, 0x18), &[hi], 4);

        let pool = RulePool::new(vec![Rc::new(FormSub)]);
        pool.run(&mut f).unwrap();

        assert!(f.op(hi_op).is_dead());
        let new_lo = f.op(use_lo).inputs[0];
        let new_hi = f.op(use_hi).inputs[0];
        let whole = f.op(f.varnode(new_lo).def.unwrap()).inputs[0];
        assert_eq!(whole, f.op(f.varnode(new_hi).def.unwrap()).inputs[0]);
        let whole_def = f.varnode(whole).def.unwrap();
        assert_eq!(f.op(whole_def).opcode, OpCode::IntSub);
    }

    #[test]
    fn double_precision_and_fuses_to_one_wide_and() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();

        let lo1 = f.new_varnode(4, Address::new(1, 0));
        f.varnode_mut(lo1).flags.set(VarnodeFlags::PRECISION_LOW);
        let hi1 = f.new_varnode(4, Address::new(1, 4));
        f.varnode_mut(hi1).flags.set(VarnodeFlags::PRECISION_HIGH);
        let lo2 = f.new_varnode(4, Address::new(1, 8));
        f.varnode_mut(lo2).flags.set(VarnodeFlags::PRECISION_LOW);
        let hi2 = f.new_varnode(4, Address::new(1, 0xC));
        f.varnode_mut(hi2).flags.set(VarnodeFlags::PRECISION_HIGH);

        let (_lo_op, lo) = f.new_op_with_output(OpCode::IntAnd, b0, Address::new(2, 0), &[lo1, lo2], 4);
        let (hi_op, hi) = f.new_op_with_output(OpCode::IntAnd, b0, Address::new(2, 4), &[hi1, hi2], 4);
        let (use_lo, _u1) = f.new_op_with_output(OpCode::Copy, b0, Address::new(2, 8), &[lo], 4);
        let (use_hi, _u2) = f.new_op_with_output(OpCode::Copy, b0, Address::new(2, 0xC), &[hi], 4);

        let pool = RulePool::new(vec![Rc::new(FormLogical)]);
        pool.run(&mut f).unwrap();

        assert!(f.op(hi_op).is_dead());
        let new_lo = f.op(use_lo).inputs[0];
        let new_hi = f.op(use_hi).inputs[0];
        let whole = f.op(f.varnode(new_lo).def.unwrap()).inputs[0];
        assert_eq!(whole, f.op(f.varnode(new_hi).def.unwrap()).inputs[0]);
        assert_eq!(f.op(f.varnode(whole).def.unwrap()).opcode, OpCode::IntAnd);
    }

    #[test]
    fn double_precision_equal_fuses_to_one_wide_equal() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();

        let lo1 = f.new_varnode(4, Address::new(1, 0));
        f.varnode_mut(lo1).flags.set(VarnodeFlags::PRECISION_LOW);
        let hi1 = f.new_varnode(4, Address::new(1, 4));
        f.varnode_mut(hi1).flags.set(VarnodeFlags::PRECISION_HIGH);
        let lo2 = f.new_varnode(4, Address::new(1, 8));
        f.varnode_mut(lo2).flags.set(VarnodeFlags::PRECISION_LOW);
        let hi2 = f.new_varnode(4, Address::new(1, 0xC));
        f.varnode_mut(hi2).flags.set(VarnodeFlags::PRECISION_HIGH);

        let (_hi_eq, hi_eq) = f.new_op_with_output(OpCode::IntEqual, b0, Address::new(2, 0), &[hi1, hi2], 1);
        let (_lo_eq, lo_eq) = f.new_op_with_output(OpCode::IntEqual, b0, Address::new(2, 4), &[lo1, lo2], 1);
        let (and_op, and_out) =
            f.new_op_with_output(OpCode::BoolAnd, b0, Address::new(2, 8), &[hi_eq, lo_eq], 1);
        let (use_op, _u) = f.new_op_with_output(OpCode::Copy, b0, Address::new(2, 0xC), &[and_out], 1);

        let pool = RulePool::new(vec![Rc::new(FormEqual)]);
        pool.run(&mut f).unwrap();

        assert!(f.op(and_op).is_dead());
        let new_cond = f.op(use_op).inputs[0];
        let def = f.varnode(new_cond).def.unwrap();
        assert_eq!(f.op(def).opcode, OpCode::IntEqual);
        let whole_lhs = f.op(def).inputs[0];
        assert_eq!(f.varnode(whole_lhs).size, 8);
    }

    #[test]
    fn three_way_compare_fuses_to_one_wide_signed_less() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();

        let lo1 = f.new_varnode(4, Address::new(1, 0));
        f.varnode_mut(lo1).flags.set(VarnodeFlags::PRECISION_LOW);
        let hi1 = f.new_varnode(4, Address::new(1, 4));
        f.varnode_mut(hi1).flags.set(VarnodeFlags::PRECISION_HIGH);
        let lo2 = f.new_varnode(4, Address::new(1, 8));
        f.varnode_mut(lo2).flags.set(VarnodeFlags::PRECISION_LOW);
        let hi2 = f.new_varnode(4, Address::new(1, 0xC));
        f.varnode_mut(hi2).flags.set(VarnodeFlags::PRECISION_HIGH);

        let (_sless_op, sless_out) =
            f.new_op_with_output(OpCode::IntSLess, b0, Address::new(2, 0), &[hi1, hi2], 1);
        let (_eq_op, eq_out) = f.new_op_with_output(OpCode::IntEqual, b0, Address::new(2, 4), &[hi1, hi2], 1);
        let (_less_op, less_out) =
            f.new_op_with_output(OpCode::IntLess, b0, Address::new(2, 8), &[lo1, lo2], 1);
        let (and_op, and_out) =
            f.new_op_with_output(OpCode::BoolAnd, b0, Address::new(2, 0xC), &[eq_out, less_out], 1);
        let (or_op, or_out) =
            f.new_op_with_output(OpCode::BoolOr, b0, Address::new(2, 0x10), &[sless_out, and_out], 1);
        let (use_op, _u) = f.new_op_with_output(OpCode::Copy, b0, Address::new(2, 0x14), &[or_out], 1);

        let pool = RulePool::new(vec![Rc::new(FormLessThreeWay)]);
        pool.run(&mut f).unwrap();

        assert!(f.op(or_op).is_dead());
        assert!(f.op(and_op).is_dead());
        let new_cond = f.op(use_op).inputs[0];
        let def = f.varnode(new_cond).def.unwrap();
        assert_eq!(f.op(def).opcode, OpCode::IntSLess);
        let lhs = f.op(def).inputs[0];
        assert_eq!(f.varnode(lhs).size, 8);
    }

    #[test]
    fn copy_force_fuses_adjacent_half_copies_into_one_wide_copy() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();

        let lo_src = f.new_varnode(4, Address::new(1, 0));
        f.varnode_mut(lo_src).flags.set(VarnodeFlags::PRECISION_LOW);
        let hi_src = f.new_varnode(4, Address::new(1, 4));
        f.varnode_mut(hi_src).flags.set(VarnodeFlags::PRECISION_HIGH);

        let lo_op = f.new_op(1, Address::new(2, 0), b0);
        f.op_set_opcode(lo_op, OpCode::Copy);
        f.op_set_all_input(lo_op, &[lo_src]);
        let lo_out = f.op_set_output(lo_op, 4, Address::new(1, 0x10));
        f.varnode_mut(lo_out).flags.set(VarnodeFlags::PRECISION_LOW);
        f.op_insert_end(b0, lo_op);

        let hi_op = f.new_op(1, Address::new(2, 4), b0);
        f.op_set_opcode(hi_op, OpCode::Copy);
        f.op_set_all_input(hi_op, &[hi_src]);
        let hi_out = f.op_set_output(hi_op, 4, Address::new(1, 0x14));
        f.varnode_mut(hi_out).flags.set(VarnodeFlags::PRECISION_HIGH);
        f.op_insert_end(b0, hi_op);

        let (use_lo, _u1) = f.new_op_with_output(OpCode::Copy, b0, Address::new(2, 8), &[lo_out], 4);
        let (use_hi, _u2) = f.new_op_with_output(OpCode::Copy, b0, Address::new(2, 0xC), &[hi_out], 4);

        let pool = RulePool::new(vec![Rc::new(FormCopyForce)]);
        pool.run(&mut f).unwrap();

        assert!(f.op(hi_op).is_dead());
        assert!(f.op(lo_op).is_dead());
        let new_lo = f.op(use_lo).inputs[0];
        let new_hi = f.op(use_hi).inputs[0];
        let whole = f.op(f.varnode(new_lo).def.unwrap()).inputs[0];
        assert_eq!(whole, f.op(f.varnode(new_hi).def.unwrap()).inputs[0]);
        assert_eq!(f.op(f.varnode(whole).def.unwrap()).opcode, OpCode::Copy);
    }
}
