//! The function IR container.
//!
//! Owns every varnode, op and block in a function and provides the mutation
//! API that all rules and actions go through; nothing outside this module
//! touches the underlying arenas directly. Modeled on
//! `cranelift-codegen/src/ir/function.rs` + `ir/dfg.rs` combined, since
//! Ghidra's `Funcdata` plays both roles at once.

use crate::ir::address::{Address, SpaceManager};
use crate::ir::block::{BasicBlock, BlockGraph, EdgeKind};
use crate::ir::domtree::DominatorTree;
use crate::ir::entities::{BlockId, CallSpecId, OpId, VarnodeId};
use crate::ir::opcode::OpCode;
use crate::ir::pcodeop::{OpFlags, PcodeOp, SeqNum};
use crate::ir::varnode::Varnode;
use crate::proto::callspec::FuncCallSpecs;
use crate::proto::prototype::ParamTrial;
use crate::symbol::Scope;
use crate::timing::PassTimes;
use cranelift_entity::PrimaryMap;
use std::collections::BTreeMap;

/// Owns all IR memory for one function: varnodes, ops, blocks and the
/// dominator tree, plus call-site and scope bookkeeping.
pub struct Funcdata {
    pub name: String,
    spaces: SpaceManager,
    varnodes: PrimaryMap<VarnodeId, Varnode>,
    ops: PrimaryMap<OpId, PcodeOp>,
    blocks: BlockGraph,
    domtree: DominatorTree,
    /// Location-sorted index for range queries (`beginLocSizeAddr`).
    loc_index: BTreeMap<Address, Vec<VarnodeId>>,
    /// Ops marked dead, awaiting the batch sweep between passes.
    dead_ops: Vec<OpId>,
    /// Per-(op-order-within-address) counter, used to build `SeqNum`s.
    next_order: BTreeMap<Address, u32>,
    pub call_specs: PrimaryMap<CallSpecId, FuncCallSpecs>,
    /// This function's own return-value trials, seeded and refined by
    /// `ActionActiveReturn` from the inputs of every `RETURN` op.
    pub own_return_trials: Vec<ParamTrial>,
    pub local_scope: Scope,
    /// Which address spaces dead-code removal is currently permitted for
    /// ("tracks whether dead-code removal is yet permitted").
    dead_code_allowed: std::collections::HashSet<u32>,
    /// Current heritage pass number.
    pub heritage_pass: u32,
    pub timing: PassTimes,
    pub max_instructions: u64,
    /// Placeholder filling not-yet-bound input slots between `new_op` and
    /// `op_set_input` (`newOp(numInputs, addr)` pre-sizes the
    /// input list before `opSetInput` fills each slot individually).
    null_varnode: VarnodeId,
}

impl Funcdata {
    pub fn new(name: impl Into<String>) -> Self {
        let mut varnodes = PrimaryMap::new();
        let null_varnode = varnodes.push(Varnode::new_constant(1, 0));
        Self {
            name: name.into(),
            spaces: SpaceManager::new(),
            varnodes,
            ops: PrimaryMap::new(),
            blocks: BlockGraph::new(),
            domtree: DominatorTree::new(),
            loc_index: BTreeMap::new(),
            dead_ops: Vec::new(),
            next_order: BTreeMap::new(),
            call_specs: PrimaryMap::new(),
            own_return_trials: Vec::new(),
            local_scope: Scope::new("local"),
            dead_code_allowed: std::collections::HashSet::new(),
            heritage_pass: 0,
            timing: PassTimes::new(),
            max_instructions: 1_000_000,
            null_varnode,
        }
    }

    // -- spaces ---------------------------------------------------------

    pub fn spaces(&self) -> &SpaceManager {
        &self.spaces
    }
    pub fn spaces_mut(&mut self) -> &mut SpaceManager {
        &mut self.spaces
    }

    pub fn allow_dead_code(&mut self, space: u32) {
        self.dead_code_allowed.insert(space);
    }
    pub fn dead_code_allowed(&self, space: u32) -> bool {
        self.dead_code_allowed.contains(&space)
    }

    // -- blocks -----------------------------------------------------------

    pub fn block_graph(&self) -> &BlockGraph {
        &self.blocks
    }
    pub fn block_graph_mut(&mut self) -> &mut BlockGraph {
        self.domtree.invalidate();
        &mut self.blocks
    }
    pub fn domtree(&self) -> &DominatorTree {
        &self.domtree
    }
    pub fn ensure_domtree(&mut self) {
        if !self.domtree.is_valid() {
            let _t = self.timing.start("domtree");
            self.domtree.compute(&self.blocks);
        }
    }

    // -- varnode accessors --------------------------------------------------

    pub fn varnode(&self, id: VarnodeId) -> &Varnode {
        &self.varnodes[id]
    }
    pub fn varnode_mut(&mut self, id: VarnodeId) -> &mut Varnode {
        &mut self.varnodes[id]
    }
    pub fn varnode_ids(&self) -> impl Iterator<Item = VarnodeId> + '_ {
        self.varnodes.keys()
    }

    fn index_varnode(&mut self, id: VarnodeId) {
        let addr = self.varnodes[id].addr;
        self.loc_index.entry(addr).or_default().push(id);
    }

    fn unindex_varnode(&mut self, id: VarnodeId) {
        let addr = self.varnodes[id].addr;
        if let Some(v) = self.loc_index.get_mut(&addr) {
            v.retain(|&x| x != id);
        }
    }

    /// Varnodes whose address range intersects `[addr, addr+size)` in
    /// `addr.space` (`beginLocSizeAddr`).
    pub fn varnodes_in_range(&self, addr: Address, size: u32) -> Vec<VarnodeId> {
        self.loc_index
            .range(..)
            .filter(|(a, _)| a.space == addr.space)
            .filter(|(a, ids)| {
                !ids.is_empty() && a.overlap(self.varnodes[ids[0]].size as u64, &addr, size as u64)
            })
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect()
    }

    /// All varnodes resident in `space` (`beginLocSpace`).
    pub fn varnodes_in_space(&self, space: u32) -> Vec<VarnodeId> {
        self.loc_index
            .range(..)
            .filter(|(a, _)| a.space == space)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect()
    }

    pub fn new_varnode(&mut self, size: u32, addr: Address) -> VarnodeId {
        let id = self.varnodes.push(Varnode::new_input(addr, size));
        self.index_varnode(id);
        id
    }

    pub fn new_constant(&mut self, size: u32, value: u64) -> VarnodeId {
        self.varnodes.push(Varnode::new_constant(size, value))
    }

    pub fn new_unique(&mut self, size: u32) -> VarnodeId {
        let space = self
            .spaces
            .get_space_by_name("unique")
            .map(|s| s.index)
            .expect("a 'unique' space must be registered");
        let off = self.varnodes.len() as u64;
        let id = self.varnodes.push(Varnode::new_input(Address::new(space, off), size));
        self.index_varnode(id);
        id
    }

    pub fn new_unique_out(&mut self, size: u32, op: OpId) -> VarnodeId {
        let vn = self.new_unique(size);
        self.varnodes[vn] = Varnode::new_written(self.varnodes[vn].addr, size, op);
        vn
    }

    pub fn new_varnode_out(&mut self, size: u32, addr: Address, op: OpId) -> VarnodeId {
        let id = self.varnodes.push(Varnode::new_written(addr, size, op));
        self.index_varnode(id);
        id
    }

    pub fn set_input_varnode(&mut self, id: VarnodeId) {
        let v = &mut self.varnodes[id];
        v.def = None;
        v.flags.set(crate::ir::varnode::VarnodeFlags::INPUT);
        v.flags.clear(crate::ir::varnode::VarnodeFlags::WRITTEN);
    }

    /// Replace every use of `old` with `new` across all ops, maintaining
    /// descendant lists (`totalReplace`).
    pub fn total_replace(&mut self, old: VarnodeId, new: VarnodeId) {
        let readers = self.varnodes[old].descendants_snapshot();
        for op in readers {
            for slot in 0..self.ops[op].inputs.len() {
                if self.ops[op].inputs[slot] == old {
                    self.op_set_input(op, slot, new);
                }
            }
        }
    }

    /// Replace `vn` with a fresh constant of the same size, mirroring
    /// Ghidra's `totalReplaceConstant`.
    pub fn total_replace_constant(&mut self, vn: VarnodeId, value: u64) {
        let size = self.varnodes[vn].size;
        let c = self.new_constant(size, value);
        self.total_replace(vn, c);
    }

    // -- op lifecycle --------------------------------------------------

    fn next_seq(&mut self, addr: Address) -> SeqNum {
        let order = self.next_order.entry(addr).or_insert(0);
        let seq = SeqNum { addr, order: *order };
        *order += 1;
        seq
    }

    /// Create a detached op with `num_inputs` unset input slots, mirroring
    /// Ghidra's `newOp`. The op is not yet placed in any block's op list;
    /// use `op_insert_*` to place it.
    pub fn new_op(&mut self, num_inputs: usize, addr: Address, parent: BlockId) -> OpId {
        let seq = self.next_seq(addr);
        let mut op = PcodeOp::new(OpCode::Copy, parent, seq);
        op.inputs.resize(num_inputs, self.null_varnode);
        self.ops.push(op)
    }

    pub fn op(&self, id: OpId) -> &PcodeOp {
        &self.ops[id]
    }
    pub fn op_mut(&mut self, id: OpId) -> &mut PcodeOp {
        &mut self.ops[id]
    }

    pub fn op_set_opcode(&mut self, id: OpId, opcode: OpCode) {
        self.ops[id].opcode = opcode;
        if opcode.is_marker() {
            self.ops[id].flags.set(OpFlags::MARKER);
        }
    }

    pub fn op_set_input(&mut self, id: OpId, slot: usize, vn: VarnodeId) {
        let old = self.ops[id].inputs[slot];
        if old != self.null_varnode {
            if let Some(v) = self.varnodes.get_mut(old) {
                v.descendants.retain(|&o| o != id);
            }
        }
        self.ops[id].inputs[slot] = vn;
        self.varnodes[vn].descendants.push(id);
    }

    pub fn op_set_all_input(&mut self, id: OpId, vns: &[VarnodeId]) {
        for old in self.ops[id].inputs.clone() {
            if old != self.null_varnode {
                self.varnodes[old].descendants.retain(|&o| o != id);
            }
        }
        self.ops[id].inputs = vns.iter().copied().collect();
        for &vn in vns {
            self.varnodes[vn].descendants.push(id);
        }
    }

    pub fn op_remove_input(&mut self, id: OpId, slot: usize) {
        let vn = self.ops[id].inputs.remove(slot);
        self.varnodes[vn].descendants.retain(|&o| o != id);
    }

    pub fn op_insert_input(&mut self, id: OpId, slot: usize, vn: VarnodeId) {
        self.ops[id].inputs.insert(slot, vn);
        self.varnodes[vn].descendants.push(id);
    }

    /// Give `id` a fresh output varnode, mirroring Ghidra's `opSetOutput`.
    /// Overwrites any existing output binding.
    pub fn op_set_output(&mut self, id: OpId, size: u32, addr: Address) -> VarnodeId {
        let vn = self.new_varnode_out(size, addr, id);
        self.ops[id].output = Some(vn);
        vn
    }

    fn insert_at(&mut self, block: BlockId, idx: usize, id: OpId) {
        self.blocks.block_mut(block).ops.insert(idx, id);
        self.ops[id].parent = block;
    }

    pub fn op_insert_begin(&mut self, block: BlockId, id: OpId) {
        self.insert_at(block, 0, id);
    }
    pub fn op_insert_end(&mut self, block: BlockId, id: OpId) {
        let len = self.blocks.block(block).ops.len();
        self.insert_at(block, len, id);
    }
    pub fn op_insert_before(&mut self, before: OpId, id: OpId) {
        let block = self.ops[before].parent;
        let idx = self.blocks.block(block).ops.iter().position(|&o| o == before).unwrap();
        self.insert_at(block, idx, id);
    }
    pub fn op_insert_after(&mut self, after: OpId, id: OpId) {
        let block = self.ops[after].parent;
        let idx = self.blocks.block(block).ops.iter().position(|&o| o == after).unwrap() + 1;
        self.insert_at(block, idx, id);
    }

    /// Remove `id` from its block's op list without destroying it, mirroring
    /// Ghidra's `opUninsert`; the op can be reinserted elsewhere.
    pub fn op_uninsert(&mut self, id: OpId) {
        let block = self.ops[id].parent;
        self.blocks.block_mut(block).ops.retain(|&o| o != id);
    }

    /// Permanently remove `id`: uninsert, clear its descendant
    /// registrations on its inputs, and free its output varnode's `def`
    /// link. Queued for batch purge, mirroring Ghidra's `opDestroy`.
    pub fn op_destroy(&mut self, id: OpId) {
        self.op_uninsert(id);
        let inputs = self.ops[id].inputs.clone();
        for vn in inputs {
            if vn != self.null_varnode {
                if let Some(v) = self.varnodes.get_mut(vn) {
                    v.descendants.retain(|&o| o != id);
                }
            }
        }
        self.ops[id].flags.set(OpFlags::DEAD);
        self.dead_ops.push(id);
    }

    /// Batch-purge ops queued by `op_destroy` between passes. Varnodes with
    /// no remaining def/descendants are swept too.
    pub fn sweep_dead(&mut self) {
        self.dead_ops.clear();
        let candidates: Vec<VarnodeId> = self.varnodes.keys().collect();
        for vn in candidates {
            let v = &self.varnodes[vn];
            if v.def.is_none() && !v.is_input() && !v.is_constant() && v.descendants.is_empty() {
                self.unindex_varnode(vn);
            }
        }
    }

    pub fn mark_indirect_creation(&mut self, id: OpId, possible_out: bool) {
        self.ops[id].flags.set(OpFlags::INDIRECT_SOURCE);
        if possible_out {
            self.ops[id].flags.set(OpFlags::ASSIGNMENT);
        }
    }

    pub fn op_flip_condition(&mut self, id: OpId) {
        self.ops[id].flip_condition();
        let block = self.ops[id].parent;
        let edges = &mut self.blocks.block_mut(block).out_edges;
        for e in edges.iter_mut() {
            e.kind = match e.kind {
                EdgeKind::True => EdgeKind::False,
                EdgeKind::False => EdgeKind::True,
                other => other,
            };
        }
    }

    pub fn op_mark_special_print(&mut self, id: OpId) {
        self.ops[id].flags.set(OpFlags::SPECIAL_PRINT);
    }
    pub fn op_mark_calculated_bool(&mut self, id: OpId) {
        self.ops[id].flags.set(OpFlags::CALCULATED_BOOL);
    }

    // -- convenience wrappers used throughout the rule catalogue -----------

    /// Construct, place (before `at`) and wire up a fully-formed op in one
    /// call. Most rules build replacements this way rather than going
    /// through the raw `new_op`/`op_set_*` sequence by hand.
    pub fn build_op_before(
        &mut self,
        at: OpId,
        opcode: OpCode,
        inputs: &[VarnodeId],
        out_size: Option<u32>,
    ) -> (OpId, Option<VarnodeId>) {
        let addr = self.ops[at].seq.addr;
        let parent = self.ops[at].parent;
        let id = self.new_op(inputs.len(), addr, parent);
        self.op_set_opcode(id, opcode);
        self.op_set_all_input(id, inputs);
        self.op_insert_before(at, id);
        let out = out_size.map(|sz| {
            let space = self.spaces.get_space_by_name("unique").map(|s| s.index).unwrap_or(0);
            let off = self.varnodes.len() as u64;
            let vn = self.op_set_output(id, sz, Address::new(space, off));
            vn
        });
        (id, out)
    }

    pub fn new_op_with_output(
        &mut self,
        opcode: OpCode,
        block: BlockId,
        addr: Address,
        inputs: &[VarnodeId],
        out_size: u32,
    ) -> (OpId, VarnodeId) {
        let id = self.new_op(inputs.len(), addr, block);
        self.op_set_opcode(id, opcode);
        self.op_set_all_input(id, inputs);
        self.op_insert_end(block, id);
        let space = self.spaces.get_space_by_name("unique").map(|s| s.index).unwrap_or(0);
        let off = self.varnodes.len() as u64;
        let out = self.op_set_output(id, out_size, Address::new(space, off));
        (id, out)
    }

    pub fn all_ops(&self) -> impl Iterator<Item = OpId> + '_ {
        self.ops.keys()
    }

    pub fn live_ops_in_block(&self, block: BlockId) -> impl Iterator<Item = OpId> + '_ {
        self.blocks.block(block).ops.iter().copied().filter(move |&o| !self.ops[o].is_dead())
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        self.blocks.block(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::address::{AddrSpace, SpaceType};

    fn setup() -> Funcdata {
        let mut f = Funcdata::new("f");
        f.spaces_mut().add_space(AddrSpace::new(0, "const", 1, 8, false, SpaceType::Constant)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(1, "ram", 1, 8, false, SpaceType::Ram)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(2, "unique", 1, 8, false, SpaceType::Unique)).unwrap();
        f
    }

    #[test]
    fn total_replace_rewires_all_readers() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let c1 = f.new_constant(4, 1);
        let c2 = f.new_constant(4, 2);
        let (add, out) = f.new_op_with_output(OpCode::IntAdd, b0, Address::new(1, 0), &[c1, c2], 4);
        let (_use_op, _use_out) = f.new_op_with_output(OpCode::Copy, b0, Address::new(1, 4), &[out], 4);
        let replacement = f.new_constant(4, 3);
        f.total_replace(out, replacement);
        assert!(f.varnode(out).descendants.is_empty());
        assert_eq!(f.op(_use_op).inputs[0], replacement);
        let _ = add;
    }

    #[test]
    fn op_destroy_clears_descendant_registration() {
        let mut f = setup();
        let b0 = f.block_graph_mut().make_block();
        let c1 = f.new_constant(4, 1);
        let c2 = f.new_constant(4, 2);
        let (add, _out) = f.new_op_with_output(OpCode::IntAdd, b0, Address::new(1, 0), &[c1, c2], 4);
        f.op_destroy(add);
        assert!(f.varnode(c1).descendants.is_empty());
        assert!(f.op(add).is_dead());
    }
}
