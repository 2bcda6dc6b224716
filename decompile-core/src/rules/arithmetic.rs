//! Arithmetic normalisation rules ("Arithmetic normalisation").
//! Grounded on the constant-folding shape of `cranelift-codegen`'s
//! `simple_preopt.rs`, adapted to the opcode-dispatch `Rule` contract
//! instead of a DFG rewrite pass.

use crate::ir::entities::OpId;
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use crate::ir::varnode::{bit_width, mask_to_size};
use crate::rule::Rule;

fn sign_extend(value: u64, size: u32) -> i64 {
    let bits = bit_width(size);
    if bits >= 64 {
        value as i64
    } else {
        let shift = 64 - bits;
        ((value << shift) as i64) >> shift
    }
}

/// Evaluates a binary opcode over constant operands, masked to `out_size`.
/// Returns `None` both for opcodes this fold doesn't cover and for
/// operations this fold deliberately declines to collapse even though
/// both operands are constant (division/remainder by a zero divisor:
/// folding it would turn a runtime trap into a bogus compile-time value,
/// so the op is left alone for whatever later pass handles unreachable
/// code).
fn eval_binary(opcode: OpCode, a: u64, b: u64, in_size: u32, out_size: u32) -> Option<u64> {
    let raw = match opcode {
        OpCode::IntAdd => a.wrapping_add(b),
        OpCode::IntSub => a.wrapping_sub(b),
        OpCode::IntMult => a.wrapping_mul(b),
        OpCode::IntDiv => {
            if b == 0 {
                return None;
            }
            a.wrapping_div(b)
        }
        OpCode::IntSDiv => {
            let (sa, sb) = (sign_extend(a, in_size), sign_extend(b, in_size));
            if sb == 0 {
                return None;
            }
            sa.wrapping_div(sb) as u64
        }
        OpCode::IntRem => {
            if b == 0 {
                return None;
            }
            a.wrapping_rem(b)
        }
        OpCode::IntSRem => {
            let (sa, sb) = (sign_extend(a, in_size), sign_extend(b, in_size));
            if sb == 0 {
                return None;
            }
            sa.wrapping_rem(sb) as u64
        }
        OpCode::IntAnd => a & b,
        OpCode::IntOr => a | b,
        OpCode::IntXor => a ^ b,
        OpCode::IntLeft => {
            if b >= 64 {
                0
            } else {
                a.wrapping_shl(b as u32)
            }
        }
        OpCode::IntRight => {
            if b >= 64 {
                0
            } else {
                a.wrapping_shr(b as u32)
            }
        }
        OpCode::IntSRight => {
            let sa = sign_extend(a, in_size);
            let shift = b.min(63) as u32;
            (sa >> shift) as u64
        }
        OpCode::IntEqual => (a == b) as u64,
        OpCode::IntNotEqual => (a != b) as u64,
        OpCode::IntLess => (a < b) as u64,
        OpCode::IntLessEqual => (a <= b) as u64,
        OpCode::IntSLess => (sign_extend(a, in_size) < sign_extend(b, in_size)) as u64,
        OpCode::IntSLessEqual => (sign_extend(a, in_size) <= sign_extend(b, in_size)) as u64,
        OpCode::IntCarry => {
            let am = mask_to_size(a, in_size);
            let sum = mask_to_size(am.wrapping_add(mask_to_size(b, in_size)), in_size);
            (sum < am) as u64
        }
        OpCode::IntSCarry => {
            let bits = bit_width(in_size);
            let (sa, sb) = (sign_extend(a, in_size), sign_extend(b, in_size));
            let sum = sa.wrapping_add(sb);
            (sum < -(1i64 << (bits - 1)) || sum >= 1i64 << (bits - 1)) as u64
        }
        OpCode::IntSBorrow => {
            let bits = bit_width(in_size);
            let (sa, sb) = (sign_extend(a, in_size), sign_extend(b, in_size));
            let diff = sa.wrapping_sub(sb);
            (diff < -(1i64 << (bits - 1)) || diff >= 1i64 << (bits - 1)) as u64
        }
        OpCode::FloatAdd => (f64::from_bits(a) + f64::from_bits(b)).to_bits(),
        OpCode::FloatSub => (f64::from_bits(a) - f64::from_bits(b)).to_bits(),
        OpCode::FloatMult => (f64::from_bits(a) * f64::from_bits(b)).to_bits(),
        OpCode::FloatDiv => {
            if f64::from_bits(b) == 0.0 {
                return None;
            }
            (f64::from_bits(a) / f64::from_bits(b)).to_bits()
        }
        OpCode::FloatEqual => (f64::from_bits(a) == f64::from_bits(b)) as u64,
        OpCode::FloatNotEqual => (f64::from_bits(a) != f64::from_bits(b)) as u64,
        OpCode::FloatLess => (f64::from_bits(a) < f64::from_bits(b)) as u64,
        OpCode::FloatLessEqual => (f64::from_bits(a) <= f64::from_bits(b)) as u64,
        _ => return None,
    };
    Some(mask_to_size(raw, out_size))
}

fn eval_unary(opcode: OpCode, a: u64, out_size: u32) -> Option<u64> {
    let raw = match opcode {
        OpCode::Int2Comp => 0u64.wrapping_sub(a),
        OpCode::IntNegate => !a,
        OpCode::FloatNeg => (-f64::from_bits(a)).to_bits(),
        OpCode::FloatAbs => f64::from_bits(a).abs().to_bits(),
        OpCode::FloatSqrt => f64::from_bits(a).sqrt().to_bits(),
        OpCode::FloatCeil => f64::from_bits(a).ceil().to_bits(),
        OpCode::FloatFloor => f64::from_bits(a).floor().to_bits(),
        OpCode::FloatRound => f64::from_bits(a).round().to_bits(),
        OpCode::FloatNan => f64::from_bits(a).is_nan() as u64,
        _ => return None,
    };
    Some(mask_to_size(raw, out_size))
}

/// Folds any op in [`op_list`] whose operands are all constant into a single
/// constant-valued replacement ("constant evaluator ... masked to
/// the output size"). Covers scenario A (`t0 = COPY 0x5; t1 = COPY 0x7;
/// r = INT_ADD t0, t1` collapses once `t0`/`t1` are themselves constants).
pub struct RuleConstFold;

const BINARY_OPS: &[OpCode] = &[
    OpCode::IntAdd,
    OpCode::IntSub,
    OpCode::IntMult,
    OpCode::IntDiv,
    OpCode::IntSDiv,
    OpCode::IntRem,
    OpCode::IntSRem,
    OpCode::IntAnd,
    OpCode::IntOr,
    OpCode::IntXor,
    OpCode::IntLeft,
    OpCode::IntRight,
    OpCode::IntSRight,
    OpCode::IntEqual,
    OpCode::IntNotEqual,
    OpCode::IntLess,
    OpCode::IntLessEqual,
    OpCode::IntSLess,
    OpCode::IntSLessEqual,
    OpCode::IntCarry,
    OpCode::IntSCarry,
    OpCode::IntSBorrow,
    OpCode::FloatAdd,
    OpCode::FloatSub,
    OpCode::FloatMult,
    OpCode::FloatDiv,
    OpCode::FloatEqual,
    OpCode::FloatNotEqual,
    OpCode::FloatLess,
    OpCode::FloatLessEqual,
    OpCode::Int2Comp,
    OpCode::IntNegate,
    OpCode::FloatNeg,
    OpCode::FloatAbs,
    OpCode::FloatSqrt,
    OpCode::FloatCeil,
    OpCode::FloatFloor,
    OpCode::FloatRound,
    OpCode::FloatNan,
];

impl Rule for RuleConstFold {
    fn name(&self) -> &'static str {
        "constfold"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        BINARY_OPS
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let out_size = match pcode.output {
            Some(out) => func.varnode(out).size,
            None => return 0,
        };
        let value = if pcode.inputs.len() == 1 {
            let Some(a) = func.varnode(pcode.inputs[0]).constant_value() else { return 0 };
            eval_unary(pcode.opcode, a, out_size)
        } else {
            let (Some(a), Some(b)) = (
                func.varnode(pcode.inputs[0]).constant_value,
                func.varnode(pcode.inputs[1]).constant_value,
            ) else {
                return 0;
            };
            let in_size = func.varnode(pcode.inputs[0]).size;
            eval_binary(pcode.opcode, a, b, in_size, out_size)
        };
        let Some(value) = value else { return 0 };
        let out = pcode.output.unwrap();
        func.total_replace_constant(out, value);
        func.op_destroy(op);
        1
    }
}

/// `2 * x -> x + x` ("`2 * x -> x + x`"). Only fires when exactly
/// one operand is the constant `2`, to avoid re-matching its own output
/// (an `INT_ADD`, not an `INT_MULT`).
pub struct RuleMultByTwo;

impl Rule for RuleMultByTwo {
    fn name(&self) -> &'static str {
        "multbytwo"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::IntMult]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(out) = pcode.output else { return 0 };
        let (a, b) = (pcode.inputs[0], pcode.inputs[1]);
        let out_size = func.varnode(out).size;
        let x = match (func.varnode(a).constant_value, func.varnode(b).constant_value()) {
            (Some(2), None) => b,
            (None, Some(2)) => a,
            _ => return 0,
        };
        let (add_op, add_out) =
            func.build_op_before(op, OpCode::IntAdd, &[x, x], Some(out_size));
        let _ = add_op;
        func.total_replace(out, add_out.unwrap());
        func.op_destroy(op);
        1
    }
}

/// `-(-x) -> x` ("collect/rebalance ... `-x -> 0 - x -> mult by
/// ~0`" family; the double-negation special case of that normalisation).
pub struct RuleDoubleNegate;

impl Rule for RuleDoubleNegate {
    fn name(&self) -> &'static str {
        "doublenegate"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::Int2Comp]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(out) = pcode.output else { return 0 };
        let inner = pcode.inputs[0];
        let Some(inner_def) = func.varnode(inner).def else { return 0 };
        if func.op(inner_def).is_dead() || func.op(inner_def).opcode != OpCode::Int2Comp {
            return 0;
        }
        let x = func.op(inner_def).inputs[0];
        func.total_replace(out, x);
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
    fn scenario_a_single_add_collapse() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let (_t0, t0) = f.new_op_with_output(OpCode::Copy, b0, Address::new(1, 0), &[f.new_constant(4, 5)], 4);
        let c7 = f.new_constant(4, 7);
        let (_t1, t1) = f.new_op_with_output(OpCode::Copy, b0, Address::new(1, 4), &[c7], 4);
        let (_r, r) = f.new_op_with_output(OpCode::IntAdd, b0, Address::new(1, 8), &[t0, t1], 4);

        let pool = RulePool::new(vec![Rc::new(RuleConstFold)]);
        pool.run(&mut f).unwrap();
        assert_eq!(func_value(&f, r), Some(0xC));
    }

    fn func_value(f: &Funcdata, vn: crate::ir::entities::VarnodeId) -> Option<u64> {
        f.varnode(vn).constant_value()
    }

    #[test]
    fn division_by_zero_constant_is_not_folded() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let ten = f.new_constant(4, 10);
        let zero = f.new_constant(4, 0);
        let (div_op, _out) =
            f.new_op_with_output(OpCode::IntDiv, b0, Address::new(1, 0), &[ten, zero], 4);

        let pool = RulePool::new(vec![Rc::new(RuleConstFold)]);
        pool.run(&mut f).unwrap();
        assert!(!f.op(div_op).is_dead());
    }

    #[test]
    fn nonzero_constant_division_folds() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let ten = f.new_constant(4, 10);
        let three = f.new_constant(4, 3);
        let (_div_op, out) =
            f.new_op_with_output(OpCode::IntDiv, b0, Address::new(1, 0), &[ten, three], 4);

        let pool = RulePool::new(vec![Rc::new(RuleConstFold)]);
        pool.run(&mut f).unwrap();
        assert_eq!(func_value(&f, out), Some(3));
    }

    #[test]
    fn double_negate_cancels() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let x = f.new_varnode(4, Address::new(1, 0x10));
        let (_n1, n1) = f.new_op_with_output(OpCode::Int2Comp, b0, Address::new(1, 0), &[x], 4);
        let (use_op, n2) = f.new_op_with_output(OpCode::Int2Comp, b0, Address::new(1, 4), &[n1], 4);
        let (copy_op, _copy_out) = f.new_op_with_output(OpCode::Copy, b0, Address::new(1, 8), &[n2], 4);

        let pool = RulePool::new(vec![Rc::new(RuleDoubleNegate)]);
        pool.run(&mut f).unwrap();
        assert_eq!(f.op(copy_op).inputs[0], x);
        let _ = use_op;
    }
}
