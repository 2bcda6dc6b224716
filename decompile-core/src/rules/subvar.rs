//! Sub-variable extraction rules. Recognises places where a full-width op
//! only ever produces or consumes a narrower logical sub-variable hiding
//! inside it, and makes that sub-variable explicit as a `SUBPIECE`/
//! `INT_ZEXT` pair instead of carrying the full width through an
//! `INT_AND`/`INT_RIGHT`.

use crate::ir::entities::OpId;
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use crate::ir::varnode::full_mask;
use crate::rule::Rule;

/// `out = INT_AND x, mask` where `mask` is exactly the all-ones mask for
/// some byte-aligned width `w` strictly smaller than `x`'s size: the AND
/// is really masking `x` down to its low `w` bytes. Replace it with an
/// explicit `SUBPIECE(x, 0)` of that width widened back out by
/// `INT_ZEXT`, so later passes see the narrow variable directly instead of
/// a full-width mask.
pub struct RuleSubvarAndMask;

impl Rule for RuleSubvarAndMask {
    fn name(&self) -> &'static str {
        "subvarandmask"
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
        let size = func.varnode(out).size;
        let (x, mask) = match (func.varnode(a).constant_value(), func.varnode(b).constant_value()) {
            (None, Some(m)) => (a, m),
            (Some(m), None) => (b, m),
            _ => return 0,
        };
        let Some(sub_size) = (1..size).find(|&w| mask == full_mask(w).0) else { return 0 };

        let zero = func.new_constant(4, 0);
        let (_sub_op, narrow) = func.build_op_before(op, OpCode::SubPiece, &[x, zero], Some(sub_size));
        let (_zext_op, widened) = func.build_op_before(op, OpCode::IntZExt, &[narrow.unwrap()], Some(size));
        func.total_replace(out, widened.unwrap());
        func.op_destroy(op);
        1
    }
}

/// `out = INT_RIGHT x, c` where `c` is a whole-byte shift and `out`'s width
/// still equals `x`'s: the shift is exposing the upper sub-variable of `x`
/// rather than narrowing anything, so make the sub-variable explicit as
/// `SUBPIECE(x, c/8)` widened by `INT_ZEXT`.
pub struct RuleSubvarShiftExtract;

impl Rule for RuleSubvarShiftExtract {
    fn name(&self) -> &'static str {
        "subvarshiftextract"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::IntRight]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(out) = pcode.output else { return 0 };
        let (x, c_vn) = (pcode.inputs[0], pcode.inputs[1]);
        let out_size = func.varnode(out).size;
        let x_size = func.varnode(x).size;
        if out_size != x_size {
            return 0;
        }
        let Some(c_bits) = func.varnode(c_vn).constant_value() else { return 0 };
        if c_bits == 0 || c_bits % 8 != 0 {
            return 0;
        }
        let c_bytes = (c_bits / 8) as u32;
        if c_bytes >= x_size {
            return 0;
        }
        let sub_size = x_size - c_bytes;
        let offset = func.new_constant(4, c_bytes as u64);
        let (_sub_op, narrow) = func.build_op_before(op, OpCode::SubPiece, &[x, offset], Some(sub_size));
        let (_zext_op, widened) = func.build_op_before(op, OpCode::IntZExt, &[narrow.unwrap()], Some(out_size));
        func.total_replace(out, widened.unwrap());
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
    fn and_with_byte_mask_exposes_narrow_subvar() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let x = f.new_varnode(4, Address::new(1, 0));
        let mask = f.new_constant(4, 0xFF);
        let (_and_op, and_out) = f.new_op_with_output(OpCode::IntAnd, b0, Address::new(1, 4), &[x, mask], 4);
        let (use_op, _u) = f.new_op_with_output(OpCode::Copy, b0, Address::new(1, 8), &[and_out], 4);

        let pool = RulePool::new(vec![Rc::new(RuleSubvarAndMask)]);
        pool.run(&mut f).unwrap();

        let widened = f.op(use_op).inputs[0];
        let zext_def = f.varnode(widened).def.unwrap();
        assert_eq!(f.op(zext_def).opcode, OpCode::IntZExt);
        let narrow = f.op(zext_def).inputs[0];
        let sub_def = f.varnode(narrow).def.unwrap();
        assert_eq!(f.op(sub_def).opcode, OpCode::SubPiece);
        assert_eq!(f.varnode(narrow).size, 1);
    }

    #[test]
    fn whole_byte_right_shift_exposes_high_subvar() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let x = f.new_varnode(4, Address::new(1, 0));
        let eight_bits = f.new_constant(4, 8);
        let (_shift_op, shift_out) =
            f.new_op_with_output(OpCode::IntRight, b0, Address::new(1, 4), &[x, eight_bits], 4);
        let (use_op, _u) = f.new_op_with_output(OpCode::Copy, b0, Address::new(1, 8), &[shift_out], 4);

        let pool = RulePool::new(vec![Rc::new(RuleSubvarShiftExtract)]);
        pool.run(&mut f).unwrap();

        let widened = f.op(use_op).inputs[0];
        let zext_def = f.varnode(widened).def.unwrap();
        assert_eq!(f.op(zext_def).opcode, OpCode::IntZExt);
        let narrow = f.op(zext_def).inputs[0];
        assert_eq!(f.varnode(narrow).size, 3);
    }
}
