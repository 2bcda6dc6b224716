//! Pointer-arithmetic lowering ("Ptr-arith lowering": `PtraddUndo`/
//! `PtrsubUndo` run in reverse here — raw `INT_ADD` on a typed pointer is
//! *recognised into* `PTRADD`, the direction scenario C exercises). Grounded
//! on `cranelift-codegen/src/legalizer/mod.rs`'s pattern of consulting a
//! shared type table mid-rewrite; since [`Rule::apply_op`] only carries
//! `(OpId, &mut Funcdata)`, the type store is threaded through as rule
//! state instead, shared with whatever else is running type propagation.

use crate::ir::entities::OpId;
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use crate::rule::Rule;
use crate::types::datatype::{Kind, TypeStore};
use std::cell::RefCell;
use std::rc::Rc;

/// `q = INT_ADD p, c -> q = PTRADD p, c/elemsize, elemsize`, when `p`'s
/// local type is a pointer to a type of size `elemsize` and `c` is a
/// multiple of it (scenario C: `INT_ADD p, 32` over a 16-byte struct
/// becomes `PTRADD p, 2, 16`).
pub struct RulePtrArithAdd {
    types: Rc<RefCell<TypeStore>>,
}

impl RulePtrArithAdd {
    pub fn new(types: Rc<RefCell<TypeStore>>) -> Self {
        Self { types }
    }
}

impl Rule for RulePtrArithAdd {
    fn name(&self) -> &'static str {
        "ptrarithadd"
    }
    fn group(&self) -> &'static str {
        "decompile"
    }
    fn op_list(&self) -> &'static [OpCode] {
        &[OpCode::IntAdd]
    }
    fn apply_op(&self, op: OpId, func: &mut Funcdata) -> usize {
        let pcode = func.op(op);
        let Some(out) = pcode.output else { return 0 };
        let (p, c_vn) = (pcode.inputs[0], pcode.inputs[1]);
        let Some(c) = func.varnode(c_vn).constant_value() else { return 0 };
        if c == 0 {
            return 0;
        }
        let Some(ty) = func.varnode(p).local_type else { return 0 };

        let store = self.types.borrow();
        let Kind::Ptr { to, .. } = store.get(ty).kind else { return 0 };
        let elem_size = store.get(to).size.max(1) as u64;
        drop(store);

        if c % elem_size != 0 {
            return 0;
        }
        let index = c / elem_size;

        let idx_vn = func.new_constant(func.varnode(c_vn).size, index);
        let sz_vn = func.new_constant(func.varnode(c_vn).size, elem_size);
        let out_size = func.varnode(out).size;
        let (new_op, new_out) =
            func.build_op_before(op, OpCode::PtrAdd, &[p, idx_vn, sz_vn], Some(out_size));
        func.varnode_mut(new_out.unwrap()).local_type = Some(ty);
        let _ = new_op;
        func.total_replace(out, new_out.unwrap());
        func.op_destroy(op);
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::address::{AddrSpace, Address, SpaceType};
    use crate::rule::RulePool;
    use crate::types::datatype::Datatype;
    use std::rc::Rc;

    fn setup() -> Funcdata {
        let mut f = Funcdata::new("f");
        f.spaces_mut().add_space(AddrSpace::new(0, "const", 1, 8, false, SpaceType::Constant)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(1, "ram", 1, 8, false, SpaceType::Ram)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(2, "unique", 1, 8, false, SpaceType::Unique)).unwrap();
        f
    }

    #[test]
    fn scenario_c_ptr_arith_recognition() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();

        let mut store = TypeStore::new();
        let s = store.intern(Datatype { name: "S".into(), size: 16, kind: Kind::Struct { fields: vec![] } });
        let p_ty = store.intern(Datatype {
            name: "S*".into(),
            size: 8,
            kind: Kind::Ptr { to: s, word_size: 8 },
        });
        let types = Rc::new(RefCell::new(store));

        let p = f.new_varnode(8, Address::new(1, 0));
        f.varnode_mut(p).local_type = Some(p_ty);
        let c32 = f.new_constant(8, 32);
        let (op, out) = f.new_op_with_output(OpCode::IntAdd, b0, Address::new(1, 8), &[p, c32], 8);
        let (use_op, _u) = f.new_op_with_output(OpCode::Copy, b0, Address::new(1, 0x10), &[out], 8);

        let pool = RulePool::new(vec![Rc::new(RulePtrArithAdd::new(types))]);
        pool.run(&mut f).unwrap();

        let def = f.varnode(f.op(use_op).inputs[0]).def.unwrap();
        assert_eq!(f.op(def).opcode, OpCode::PtrAdd);
        assert_eq!(f.varnode(f.op(def).inputs[1]).constant_value, Some(2));
        assert_eq!(f.varnode(f.op(def).inputs[2]).constant_value, Some(16));
        let _ = op;
    }
}
