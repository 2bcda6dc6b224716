//! Cast insertion (`ActionSetCasts`). Grounded on
//! `cranelift-codegen/src/legalizer/mod.rs`'s single dominator-order walk
//! that rewrites instructions needing type-legal operands, generalised from
//! "make every operand legal for its target's ISA" to "make every operand
//! match the type the consuming opcode expects".

use crate::action::Action;
use crate::arch::CommentDatabase;
use crate::error::DecompileError;
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use crate::types::datatype::{Kind, TypeId, TypeStore};
use std::cell::RefCell;
use std::rc::Rc;

/// The class of type a given input slot is expected to hold, independent of
/// a specific `TypeId`. Stands in for consulting the opcode's
/// `getInputCast`, reduced here to "does the kind class match", which is
/// enough to drive insertion without a full per-opcode type signature
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Pointer,
    Numeric,
    Bool,
    Other,
}

fn classify(kind: &Kind) -> Class {
    match kind {
        Kind::Ptr { .. } | Kind::PtrRel { .. } => Class::Pointer,
        Kind::Int | Kind::UInt | Kind::Float | Kind::Enum { .. } => Class::Numeric,
        Kind::Bool => Class::Bool,
        _ => Class::Other,
    }
}

/// Binary ops whose two inputs are expected to share a type class (the rest
/// of the opcode set either has no type-checked inputs in this crate's
/// model, or is itself a pointer-arithmetic op that legitimately mixes
/// classes).
const CHECKED_BINARY_OPS: &[OpCode] = &[
    OpCode::IntAdd,
    OpCode::IntSub,
    OpCode::IntEqual,
    OpCode::IntNotEqual,
    OpCode::IntLess,
    OpCode::IntLessEqual,
    OpCode::IntSLess,
    OpCode::IntSLessEqual,
];

/// Walks every op in dominator order and inserts a `CAST` (or, where the
/// source is a pointer to exactly the required struct type, a `PTRSUB 0`)
/// at any input slot whose operand's type class doesn't match its sibling
/// operand's. Flags `LOAD`/`STORE` address operands that
/// aren't pointer-typed as warnings instead of guessing a cast.
pub struct ActionSetCasts {
    types: Rc<RefCell<TypeStore>>,
    comments: Rc<RefCell<dyn CommentDatabase>>,
}

impl ActionSetCasts {
    pub fn new(types: Rc<RefCell<TypeStore>>, comments: Rc<RefCell<dyn CommentDatabase>>) -> Self {
        Self { types, comments }
    }

    fn insert_cast(&self, func: &mut Funcdata, op: crate::ir::entities::OpId, slot: usize, required: TypeId) {
        let store = self.types.borrow();
        let src = func.op(op).inputs[slot];
        let Some(src_ty) = func.varnode(src).local_type else { return };
        let src_kind = store.get(src_ty).kind.clone();
        let required_size = store.get(required).size;
        drop(store);

        let new_vn = if let Kind::Ptr { to, .. } = &src_kind {
            let to = *to;
            if to == required {
                let zero = func.new_constant(4, 0);
                let (_op, out) = func.build_op_before(op, OpCode::PtrSub, &[src, zero], Some(required_size));
                out
            } else {
                None
            }
        } else {
            None
        };

        let new_vn = new_vn.unwrap_or_else(|| {
            let (_op, out) = func.build_op_before(op, OpCode::Cast, &[src], Some(required_size));
            out.unwrap()
        });

        func.varnode_mut(new_vn).local_type = Some(required);
        func.op_set_input(op, slot, new_vn);
    }
}

impl Action for ActionSetCasts {
    fn name(&self) -> &'static str {
        "setcasts"
    }
    fn group_tag(&self) -> &'static str {
        "decompile"
    }
    fn apply(&mut self, func: &mut Funcdata) -> Result<u32, DecompileError> {
        func.ensure_domtree();
        let order: Vec<_> = func.domtree.cfg_rpo().to_vec();
        let mut inserted = 0u32;

        for block in order {
            for op in func.live_ops_in_block(block).collect::<Vec<_>>() {
                if func.op(op).is_dead() {
                    continue;
                }
                let opcode = func.op(op).opcode;

                if matches!(opcode, OpCode::Load | OpCode::Store) {
                    let addr_slot = if opcode == OpCode::Load { 0 } else { 0 };
                    let addr_vn = func.op(op).inputs[addr_slot];
                    let is_pointer = func
                        .varnode(addr_vn)
                        .local_type
                        .map(|t| matches!(self.types.borrow().get(t).kind, Kind::Ptr { .. }))
                        .unwrap_or(false);
                    if !is_pointer {
                        let addr = func.op(op).seq.addr;
                        self.comments
                            .borrow_mut()
                            .warning(format!("{:?}: address operand is not pointer-typed", opcode), addr);
                    }
                    continue;
                }

                if !CHECKED_BINARY_OPS.contains(&opcode) {
                    continue;
                }
                let (a, b) = (func.op(op).inputs[0], func.op(op).inputs[1]);
                let (a_ty, b_ty) = (func.varnode(a).local_type, func.varnode(b).local_type);
                let (Some(a_ty), Some(b_ty)) = (a_ty, b_ty) else { continue };
                if a_ty == b_ty {
                    continue;
                }
                let (a_class, b_class) = {
                    let store = self.types.borrow();
                    (classify(&store.get(a_ty).kind), classify(&store.get(b_ty).kind))
                };
                if a_class == b_class {
                    continue;
                }
                let (weak_slot, required) = if a_class == Class::Pointer {
                    (0, b_ty)
                } else if b_class == Class::Pointer {
                    (1, a_ty)
                } else {
                    let store = self.types.borrow();
                    if store.at_least_as_specific(a_ty, b_ty) {
                        (1, a_ty)
                    } else {
                        (0, b_ty)
                    }
                };
                self.insert_cast(func, op, weak_slot, required);
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::InMemoryCommentDatabase;
    use crate::ir::address::{AddrSpace, Address, SpaceType};
    use crate::types::datatype::Datatype;

    fn setup() -> Funcdata {
        let mut f = Funcdata::new("f");
        f.spaces_mut().add_space(AddrSpace::new(0, "const", 1, 8, false, SpaceType::Constant)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(1, "ram", 1, 8, false, SpaceType::Ram)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(2, "unique", 1, 8, false, SpaceType::Unique)).unwrap();
        f
    }

    #[test]
    fn mismatched_pointer_and_int_operand_gets_cast() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();

        let mut store = TypeStore::new();
        let int_ty = store.intern(Datatype { name: "int".into(), size: 4, kind: Kind::Int });
        let ptr_ty = store.intern(Datatype {
            name: "int*".into(),
            size: 4,
            kind: Kind::Ptr { to: int_ty, word_size: 4 },
        });
        let types = Rc::new(RefCell::new(store));
        let comments: Rc<RefCell<dyn CommentDatabase>> = Rc::new(RefCell::new(InMemoryCommentDatabase::new()));

        let p = f.new_varnode(4, Address::new(1, 0));
        f.varnode_mut(p).local_type = Some(ptr_ty);
        let n = f.new_varnode(4, Address::new(1, 4));
        f.varnode_mut(n).local_type = Some(int_ty);
        let (op, _out) = f.new_op_with_output(OpCode::IntAdd, b0, Address::new(1, 8), &[p, n], 4);

        let mut action = ActionSetCasts::new(types, comments);
        let changes = action.apply(&mut f).unwrap();
        assert_eq!(changes, 1);
        let new_a = f.op(op).inputs[0];
        assert_ne!(new_a, p);
        assert_eq!(f.varnode(new_a).local_type, Some(int_ty));

        let second_pass = action.apply(&mut f).unwrap();
        assert_eq!(second_pass, 0);
    }

    #[test]
    fn load_with_non_pointer_address_warns() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let store = TypeStore::new();
        let types = Rc::new(RefCell::new(store));
        let comments = Rc::new(RefCell::new(InMemoryCommentDatabase::new()));

        let addr_vn = f.new_varnode(4, Address::new(1, 0));
        f.new_op_with_output(OpCode::Load, b0, Address::new(1, 4), &[addr_vn], 4);

        let mut action = ActionSetCasts::new(types, comments.clone());
        action.apply(&mut f).unwrap();
        assert_eq!(comments.borrow().comments.len(), 1);
    }
}
