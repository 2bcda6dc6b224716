//! A cursor over a function's op list, modeled on
//! `cranelift-codegen/src/cursor.rs`'s `FuncCursor`. Rules and actions use
//! this instead of indexing `BlockGraph`/`PrimaryMap` directly so that
//! insertion position bookkeeping lives in one place.

use crate::ir::entities::{BlockId, OpId};
use crate::ir::funcdata::Funcdata;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPosition {
    Nowhere,
    At(OpId),
    Before(BlockId),
    After(BlockId),
}

pub struct FuncCursor<'f> {
    pub func: &'f mut Funcdata,
    pos: CursorPosition,
}

impl<'f> FuncCursor<'f> {
    pub fn new(func: &'f mut Funcdata) -> Self {
        Self { func, pos: CursorPosition::Nowhere }
    }

    pub fn position(&self) -> CursorPosition {
        self.pos
    }

    pub fn set_position(&mut self, pos: CursorPosition) {
        self.pos = pos;
    }

    pub fn at_top(mut self, block: BlockId) -> Self {
        self.pos = CursorPosition::Before(block);
        self
    }

    pub fn at_bottom(mut self, block: BlockId) -> Self {
        self.pos = CursorPosition::After(block);
        self
    }

    pub fn at_op(mut self, op: OpId) -> Self {
        self.pos = CursorPosition::At(op);
        self
    }

    fn current_block(&self) -> Option<BlockId> {
        match self.pos {
            CursorPosition::At(op) => Some(self.func.op(op).parent),
            CursorPosition::Before(b) | CursorPosition::After(b) => Some(b),
            CursorPosition::Nowhere => None,
        }
    }

    /// Advance to and return the next op in program order, or `None` at the
    /// end of the block (leaving the cursor `After` it).
    pub fn next_op(&mut self) -> Option<OpId> {
        let block = self.current_block()?;
        let ops = &self.func.block_graph().block(block).ops;
        let next = match self.pos {
            CursorPosition::Before(_) => ops.first().copied(),
            CursorPosition::At(op) => {
                let idx = ops.iter().position(|&o| o == op)?;
                ops.get(idx + 1).copied()
            }
            CursorPosition::After(_) | CursorPosition::Nowhere => None,
        };
        match next {
            Some(op) => {
                self.pos = CursorPosition::At(op);
                Some(op)
            }
            None => {
                self.pos = CursorPosition::After(block);
                None
            }
        }
    }

    /// Step to and return the previous op, or `None` at the top of the
    /// block (leaving the cursor `Before` it). Used by DCE's
    /// bottom-to-top sweep.
    pub fn prev_op(&mut self) -> Option<OpId> {
        let block = self.current_block()?;
        let ops = &self.func.block_graph().block(block).ops;
        let prev = match self.pos {
            CursorPosition::After(_) => ops.last().copied(),
            CursorPosition::At(op) => {
                let idx = ops.iter().position(|&o| o == op)?;
                if idx == 0 {
                    None
                } else {
                    ops.get(idx - 1).copied()
                }
            }
            CursorPosition::Before(_) | CursorPosition::Nowhere => None,
        };
        match prev {
            Some(op) => {
                self.pos = CursorPosition::At(op);
                Some(op)
            }
            None => {
                self.pos = CursorPosition::Before(block);
                None
            }
        }
    }

    /// Remove the op at the cursor, leaving the cursor pointing at the
    /// following op, mirroring Ghidra's `opUninsert`/`opDestroy` pair.
    pub fn remove_op(&mut self) -> OpId {
        let CursorPosition::At(op) = self.pos else {
            panic!("remove_op called with cursor not at an op");
        };
        let block = self.func.op(op).parent;
        self.func.op_uninsert(op);
        let ops = &self.func.block_graph().block(block).ops;
        self.pos = match ops.first() {
            Some(&next) => CursorPosition::At(next),
            None => CursorPosition::After(block),
        };
        op
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::address::{Address, AddrSpace, SpaceType};
    use crate::ir::opcode::OpCode;

    fn sample_func() -> Funcdata {
        let mut f = Funcdata::new("test");
        f.spaces_mut()
            .add_space(AddrSpace::new(0, "const", 1, 8, false, SpaceType::Constant))
            .unwrap();
        f.spaces_mut()
            .add_space(AddrSpace::new(1, "ram", 1, 8, false, SpaceType::Ram))
            .unwrap();
        f.spaces_mut()
            .add_space(AddrSpace::new(2, "unique", 1, 8, false, SpaceType::Unique))
            .unwrap();
        let b0 = f.block_graph_mut().make_block();
        let c1 = f.new_constant(4, 1);
        let c2 = f.new_constant(4, 2);
        let _add = f.new_op_with_output(OpCode::IntAdd, b0, Address::new(1, 0), &[c1, c2], 4);
        f
    }

    #[test]
    fn next_op_walks_block_then_stops() {
        let mut f = sample_func();
        let b0 = f.block_graph().entry().unwrap();
        let mut cur = FuncCursor::new(&mut f).at_top(b0);
        assert!(cur.next_op.is_some());
        assert!(cur.next_op.is_none());
        assert_eq!(cur.position, CursorPosition::After(b0));
    }
}
