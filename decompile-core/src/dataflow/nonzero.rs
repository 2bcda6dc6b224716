//! Non-zero mask propagation ("Non-zero mask"): a conservative
//! forward abstract interpretation computing, per varnode, an upper bound on
//! which bits may ever be non-zero. Grounded on `cranelift-codegen`'s
//! available-bits/`KnownBits`-style forward dataflow shape
//! (`cranelift-codegen/src/ir/dynamic_type.rs` neighbourhood uses the same
//! "conservative bound, monotone join, fixed point" pattern for range
//! analysis), adapted here to a single bitset lattice instead of a range.

use crate::ir::entities::VarnodeId;
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use crate::ir::varnode::{bit_width, full_mask as full_mask_for, union_mask};
use cranelift_bitset::ScalarBitSet;
use std::collections::VecDeque;

fn intersect_mask(a: ScalarBitSet<u64>, b: ScalarBitSet<u64>) -> ScalarBitSet<u64> {
    ScalarBitSet(a.0 & b.0)
}

/// The non-zero mask `op`'s output may carry, given its inputs' current
/// non-zero masks ("monotone, only ever shrinks the
/// over-approximation").
fn compute_output_mask(func: &Funcdata, op: crate::ir::entities::OpId) -> Option<ScalarBitSet<u64>> {
    let pcode = func.op(op);
    let out = pcode.output?;
    let out_size = func.varnode(out).size;
    let full = full_mask_for(out_size);
    let input_mask = |i: usize| func.varnode(pcode.inputs[i]).non_zero;

    let mask = match pcode.opcode {
        OpCode::Copy | OpCode::Cast => input_mask(0),
        OpCode::IntAnd => intersect_mask(input_mask(0), input_mask(1)),
        OpCode::IntOr | OpCode::IntXor => union_mask(input_mask(0), input_mask(1)),
        OpCode::IntZExt => input_mask(0),
        OpCode::IntSExt => {
            let in_size = func.varnode(pcode.inputs[0]).size;
            let in_bits = bit_width(in_size);
            let m = input_mask(0);
            if in_bits > 0 && m.contains((in_bits - 1) as u8) {
                full // sign bit may be set, so every extended bit may be set
            } else {
                m
            }
        }
        OpCode::IntLeft => {
            if let Some(sa) = func.varnode(pcode.inputs[1]).constant_value() {
                let shifted = shift_left(input_mask(0), sa as u32);
                intersect_mask(shifted, full)
            } else {
                full
            }
        }
        OpCode::IntRight => {
            if let Some(sa) = func.varnode(pcode.inputs[1]).constant_value() {
                shift_right(input_mask(0), sa as u32)
            } else {
                full
            }
        }
        OpCode::MultiEqual => {
            let mut acc = ScalarBitSet::new();
            for &input in &pcode.inputs {
                acc = union_mask(acc, func.varnode(input).non_zero);
            }
            acc
        }
        OpCode::IntEqual | OpCode::IntNotEqual | OpCode::IntLess | OpCode::IntLessEqual
        | OpCode::IntSLess | OpCode::IntSLessEqual | OpCode::BoolAnd | OpCode::BoolOr
        | OpCode::BoolXor | OpCode::BoolNegate | OpCode::IntCarry | OpCode::IntSCarry
        | OpCode::IntSBorrow => {
            let mut s = ScalarBitSet::new();
            s.insert(0);
            s
        }
        OpCode::SubPiece => {
            let trunc_bytes = func.varnode(pcode.inputs[1]).constant_value().unwrap_or(0) as u32;
            shift_right(input_mask(0), 8 * trunc_bytes)
        }
        _ => full,
    };
    Some(intersect_mask(mask, full))
}

fn shift_left(mask: ScalarBitSet<u64>, amount: u32) -> ScalarBitSet<u64> {
    if amount >= 64 {
        ScalarBitSet::new()
    } else {
        ScalarBitSet(mask.0 << amount)
    }
}
fn shift_right(mask: ScalarBitSet<u64>, amount: u32) -> ScalarBitSet<u64> {
    if amount >= 64 {
        ScalarBitSet::new()
    } else {
        ScalarBitSet(mask.0 >> amount)
    }
}

/// Run non-zero-mask propagation to a fixed point. Returns the number of
/// varnodes whose mask changed at least once (for pass-budget accounting).
///
/// Testable property: masks only ever shrink relative to the
/// varnode's static full-width mask, and once a varnode's computed mask
/// stabilises it is never revisited unless an input changes — standard
/// worklist monotonicity.
pub fn run_nonzero(func: &mut Funcdata) -> u32 {
    let mut touched = 0u32;
    let mut queue: VecDeque<VarnodeId> = VecDeque::new();

    for vn in func.varnode_ids() {
        let v = func.varnode(vn);
        if v.is_constant() || v.is_input() {
            continue;
        }
        if v.def.is_some() {
            queue.push_back(vn);
        }
    }

    let mut in_queue: std::collections::HashSet<VarnodeId> = queue.iter().copied().collect();

    while let Some(vn) = queue.pop_front() {
        in_queue.remove(&vn);
        let Some(def) = func.varnode(vn).def else { continue };
        if func.op(def).is_dead() {
            continue;
        }
        let Some(new_mask) = compute_output_mask(func, def) else { continue };
        let cur = func.varnode(vn).non_zero;
        if new_mask != cur {
            func.varnode_mut(vn).non_zero = new_mask;
            touched += 1;
            for reader in func.varnode(vn).descendants_snapshot() {
                if let Some(out) = func.op(reader).output {
                    if in_queue.insert(out) {
                        queue.push_back(out);
                    }
                }
            }
        }
    }
    touched
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
    fn and_with_small_constant_narrows_mask() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let x = f.new_varnode(4, Address::new(1, 0x10));
        f.varnode_mut(x).non_zero = ScalarBitSet(0xFFFF_FFFF);
        let mask_const = f.new_constant(4, 0xFF);
        let (_op, out) = f.new_op_with_output(OpCode::IntAnd, b0, Address::new(1, 0), &[x, mask_const], 4);
        run_nonzero(&mut f);
        assert_eq!(f.varnode(out).non_zero.0 & !0xFFu64, 0);
    }

    #[test]
    fn compare_ops_only_ever_set_bit_zero() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let a = f.new_constant(4, 7);
        let b = f.new_constant(4, 9);
        let (_op, out) = f.new_op_with_output(OpCode::IntLess, b0, Address::new(1, 0), &[a, b], 1);
        run_nonzero(&mut f);
        assert_eq!(f.varnode(out).non_zero.0, 1);
    }
}
