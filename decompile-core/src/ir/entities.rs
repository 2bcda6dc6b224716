//! Entity references into a [`Funcdata`](crate::ir::funcdata::Funcdata).
//!
//! Varnodes, ops and blocks are never referenced by Rust pointer; they are
//! opaque 32-bit indices into the owning container's arenas, exactly the
//! pattern `cranelift-codegen/src/ir/entities.rs` uses for `Value`/`Inst`/
//! `Block`. We depend on `cranelift_entity` directly rather than
//! reimplementing `EntityRef`/`PrimaryMap`. `entity_impl!` supplies
//! `EntityRef`, `Display` and `Debug` (as `<prefix><index>`) for each.

use cranelift_entity::entity_impl;

/// A varnode: a single static storage coordinate in a function.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarnodeId(u32);
entity_impl!(VarnodeId, "vn");

/// A p-code operation node ("PcodeOp").
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(u32);
entity_impl!(OpId, "op");

/// A basic block.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u32);
entity_impl!(BlockId, "block");

/// A `HighVariable` merge group.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HighId(u32);
entity_impl!(HighId, "high");

/// A call site's [`FuncCallSpecs`](crate::proto::callspec::FuncCallSpecs).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallSpecId(u32);
entity_impl!(CallSpecId, "call");

/// A symbol in a [`Scope`](crate::symbol::Scope).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);
entity_impl!(SymbolId, "sym");
