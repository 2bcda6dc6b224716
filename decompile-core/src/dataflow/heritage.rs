//! Heritage / SSA construction ("Heritage ... treat as a
//! service"). Grounded on the dominance-frontier placement and
//! dominator-tree-order renaming algorithm standard to SSA-form compilers,
//! driven by [`crate::ir::domtree::DominatorTree`] (itself grounded on
//! `cranelift-codegen/src/dominator_tree.rs`). Cranelift's own IR is always
//! already in SSA form by construction, so there is no teacher file for
//! heritage itself; this module supplies the missing piece cranelift-codegen
//! never needed.

use crate::ir::address::Address;
use crate::ir::entities::{BlockId, VarnodeId};
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// One address-space tier heritage runs over in a given pass.
pub struct HeritageTier {
    pub space: u32,
}

/// Dominance frontiers, computed once per `compute` call over the current
/// `BlockGraph`/`DominatorTree` (standard Cytron/Ferrante/Rosen/Zadeck
/// construction).
fn dominance_frontiers(func: &Funcdata) -> FxHashMap<BlockId, FxHashSet<BlockId>> {
    let mut df: FxHashMap<BlockId, FxHashSet<BlockId>> = FxHashMap::default();
    for b in func.block_graph().blocks() {
        df.entry(b).or_default();
    }
    for b in func.block_graph().blocks() {
        let preds = &func.block(b).in_edges;
        if preds.len() < 2 {
            continue;
        }
        for &p in preds {
            let mut runner = p;
            while Some(runner) != func.domtree.idom(b) {
                df.entry(runner).or_default().insert(b);
                match func.domtree.idom(runner) {
                    Some(next) if next != runner => runner = next,
                    _ => break,
                }
            }
        }
    }
    df
}

/// Run heritage for one storage location `(addr, size)` within `tier`:
/// find every block that writes to this exact location, place MULTIEQUAL
/// markers at the iterated dominance frontier, then rename reads to their
/// reaching definition by a preorder dominator-tree walk. PHIs only ever
/// get placed at block entries.
///
/// Returns the number of MULTIEQUAL ops inserted.
pub fn heritage_location(func: &mut Funcdata, tier: &HeritageTier, addr: Address, size: u32) -> usize {
    debug_assert_eq!(addr.space, tier.space);
    let df = dominance_frontiers(func);

    let mut def_blocks: FxHashSet<BlockId> = FxHashSet::default();
    for op in func.all_ops() {
        if func.op(op).is_dead() {
            continue;
        }
        if let Some(out) = func.op(op).output {
            if func.varnode(out).addr == addr && func.varnode(out).size == size {
                def_blocks.insert(func.op(op).parent);
            }
        }
    }
    if def_blocks.len() <= 1 {
        return 0; // single reaching definition everywhere: no merge needed
    }

    let mut phi_blocks: FxHashSet<BlockId> = FxHashSet::default();
    let mut worklist: VecDeque<BlockId> = def_blocks.iter().copied().collect();
    while let Some(b) = worklist.pop_front() {
        for &frontier_block in df.get(&b).into_iter().flatten() {
            if phi_blocks.insert(frontier_block) {
                worklist.push_back(frontier_block);
            }
        }
    }

    let mut inserted = 0;
    let mut phi_outputs: FxHashMap<BlockId, VarnodeId> = FxHashMap::default();
    for &block in &phi_blocks {
        let num_preds = func.block(block).in_edges.len();
        let phi = func.new_op(num_preds, addr, block);
        func.op_set_opcode(phi, OpCode::MultiEqual);
        func.op_insert_begin(block, phi);
        let out = func.op_set_output(phi, size, addr);
        phi_outputs.insert(block, out);
        inserted += 1;
    }

    rename_reads(func, addr, size, &phi_blocks, &phi_outputs);
    inserted
}

/// Preorder dominator-tree walk maintaining a reaching-definition stack per
/// location, rewriting every read of `(addr, size)` to the current
/// reaching definition and wiring MULTIEQUAL inputs from each predecessor's
/// stack top.
fn rename_reads(
    func: &mut Funcdata,
    addr: Address,
    size: u32,
    phi_blocks: &FxHashSet<BlockId>,
    phi_outputs: &FxHashMap<BlockId, VarnodeId>,
) {
    let rpo = func.domtree.cfg_rpo().to_vec();
    let mut children: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();
    for &b in &rpo {
        if let Some(idom) = func.domtree.idom(b) {
            children.entry(idom).or_default().push(b);
        }
    }
    let Some(entry) = func.block_graph().entry() else { return };

    let mut current: Option<VarnodeId> = None;
    let mut stack = vec![(entry, current)];
    let mut visited = FxHashSet::default();

    while let Some((block, incoming)) = stack.pop() {
        if !visited.insert(block) {
            continue;
        }
        current = incoming;
        if let Some(&phi_out) = phi_outputs.get(&block) {
            current = Some(phi_out);
        }
        for op in func.live_ops_in_block(block).collect::<Vec<_>>() {
            if func.op(op).output == phi_outputs.get(&block).copied() {
                continue; // the phi itself, already seeded above
            }
            let slots: Vec<usize> = func
                .op(op)
                .inputs
                .iter()
                .enumerate()
                .filter(|(_, &vn)| func.varnode(vn).addr == addr && func.varnode(vn).size == size)
                .map(|(i, _)| i)
                .collect();
            for slot in slots {
                if let Some(def) = current {
                    func.op_set_input(op, slot, def);
                }
            }
            if let Some(out) = func.op(op).output {
                if func.varnode(out).addr == addr && func.varnode(out).size == size {
                    current = Some(out);
                }
            }
        }
        for &succ in func.block(block).successors().collect::<Vec<_>>().iter() {
            if phi_blocks.contains(&succ) {
                let pred_idx = func.block(succ).in_edges.iter().position(|&p| p == block);
                if let (Some(idx), Some(&phi_vn)) = (pred_idx, phi_outputs.get(&succ)) {
                    if let Some(def) = current {
                        let phi_op = func.varnode(phi_vn).def.unwrap();
                        func.op_set_input(phi_op, idx, def);
                    }
                }
            }
        }
        for &child in children.get(&block).into_iter().flatten() {
            stack.push((child, current));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::address::{AddrSpace, SpaceType};
    use crate::ir::block::EdgeKind;

    fn setup() -> (Funcdata, BlockId, BlockId, BlockId) {
        let mut f = Funcdata::new("f");
        f.spaces_mut().add_space(AddrSpace::new(0, "const", 1, 8, false, SpaceType::Constant)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(1, "ram", 1, 8, false, SpaceType::Ram)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(2, "unique", 1, 8, false, SpaceType::Unique)).unwrap();
        let b0 = f.block_graph_mut().make_block();
        let b1 = f.block_graph_mut().make_block();
        let b2 = f.block_graph_mut().make_block();
        f.block_graph_mut().add_edge(b0, b1, EdgeKind::True);
        f.block_graph_mut().add_edge(b0, b2, EdgeKind::False);
        (f, b0, b1, b2)
    }

    #[test]
    fn diamond_with_two_defs_gets_no_phi_without_join() {
        let (mut f, b0, b1, b2) = setup();
        f.ensure_domtree();
        let loc = Address::new(1, 0x2000);
        let one = f.new_constant(4, 1);
        let two = f.new_constant(4, 2);
        write_at(&mut f, b1, Address::new(1, 0), loc, one);
        write_at(&mut f, b2, Address::new(1, 4), loc, two);
        let tier = HeritageTier { space: 1 };
        // no join block exists, so dominance frontiers of b1/b2 are empty
        let inserted = heritage_location(&mut f, &tier, loc, 4);
        assert_eq!(inserted, 0);
        let _ = b0;
    }

    #[test]
    fn join_block_gets_phi_for_two_reaching_defs() {
        let (mut f, b0, b1, b2) = setup();
        let b3 = f.block_graph_mut().make_block();
        f.block_graph_mut().add_edge(b1, b3, EdgeKind::Fallthrough);
        f.block_graph_mut().add_edge(b2, b3, EdgeKind::Fallthrough);
        f.ensure_domtree();

        let target = Address::new(1, 0x2000);
        let c1 = f.new_constant(4, 1);
        let c2 = f.new_constant(4, 2);
        write_at(&mut f, b1, Address::new(1, 0), target, c1);
        write_at(&mut f, b2, Address::new(1, 4), target, c2);

        let tier = HeritageTier { space: 1 };
        let inserted = heritage_location(&mut f, &tier, target, 4);
        assert_eq!(inserted, 1);
        let phi = func_first_op(&f, b3);
        assert_eq!(f.op(phi).opcode, OpCode::MultiEqual);
        let _ = b0;
    }

    fn func_first_op(f: &Funcdata, block: BlockId) -> crate::ir::entities::OpId {
        f.block(block).ops[0]
    }

    /// Build a `COPY input -> storage` op at `seq_addr`, writing its output
    /// at `storage` rather than into the unique space (test-only helper;
    /// `new_op_with_output` always targets unique storage).
    fn write_at(
        f: &mut Funcdata,
        block: BlockId,
        seq_addr: Address,
        storage: Address,
        input: VarnodeId,
    ) -> crate::ir::entities::OpId {
        let op = f.new_op(1, seq_addr, block);
        f.op_set_opcode(op, OpCode::Copy);
        f.op_set_all_input(op, &[input]);
        f.op_insert_end(block, op);
        f.op_set_output(op, 4, storage);
        op
    }
}
