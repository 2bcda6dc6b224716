//! Dominator tree. Grounded on
//! `cranelift-codegen/src/dominator_tree.rs`, but computed in one shot with
//! the classic Cooper/Harvey/Kennedy iterative algorithm over reverse
//! postorder rather than an incrementally-maintained version — our pass
//! structure always recomputes on structural change, so the extra
//! bookkeeping an incremental algorithm buys isn't exercised here.

use crate::ir::block::BlockGraph;
use crate::ir::entities::BlockId;
use cranelift_entity::SecondaryMap;
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct DominatorTree {
    idom: SecondaryMap<BlockId, Option<BlockId>>,
    rpo_index: FxHashMap<BlockId, usize>,
    rpo: Vec<BlockId>,
    valid: bool,
}

impl DominatorTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn clear(&mut self) {
        self.idom.clear();
        self.rpo_index.clear();
        self.rpo.clear();
        self.valid = false;
    }

    pub fn cfg_postorder(&self) -> impl Iterator<Item = &BlockId> {
        self.rpo.iter().rev()
    }

    pub fn cfg_rpo(&self) -> &[BlockId] {
        &self.rpo
    }

    /// Recompute from scratch.
    pub fn compute(&mut self, cfg: &BlockGraph) {
        self.clear();
        let Some(entry) = cfg.entry() else {
            self.valid = true;
            return;
        };
        self.rpo = cfg.reverse_postorder();
        for (i, &b) in self.rpo.iter().enumerate() {
            self.rpo_index.insert(b, i);
        }
        self.idom[entry] = Some(entry);

        let mut changed = true;
        while changed {
            changed = false;
            for &block in self.rpo.iter().skip(1) {
                let preds: Vec<BlockId> = cfg.block(block).in_edges.clone();
                let mut new_idom: Option<BlockId> = None;
                for p in preds {
                    if self.idom[p].is_none() {
                        continue;
                    }
                    new_idom = Some(match new_idom {
                        None => p,
                        Some(cur) => self.intersect(cur, p),
                    });
                }
                if self.idom[block] != new_idom {
                    self.idom[block] = new_idom;
                    changed = true;
                }
            }
        }
        self.idom[entry] = None; // entry has no strict dominator
        self.valid = true;
    }

    fn intersect(&self, a: BlockId, b: BlockId) -> BlockId {
        let mut finger1 = a;
        let mut finger2 = b;
        while finger1 != finger2 {
            while self.rpo_index[&finger1] > self.rpo_index[&finger2] {
                finger1 = self.idom[finger1].expect("idom chain reaches entry");
            }
            while self.rpo_index[&finger2] > self.rpo_index[&finger1] {
                finger2 = self.idom[finger2].expect("idom chain reaches entry");
            }
        }
        finger1
    }

    /// Immediate dominator of `block`, or `None` for the entry block.
    pub fn idom(&self, block: BlockId) -> Option<BlockId> {
        self.idom[block]
    }

    /// Does `a` dominate `b` (`a == b` counts as dominating)?
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        let mut cur = b;
        loop {
            if cur == a {
                return true;
            }
            match self.idom[cur] {
                Some(next) if next != cur => cur = next,
                _ => return cur == a,
            }
        }
    }

    /// Nearest common dominator of `a` and `b` ("common dominator
    /// helper").
    pub fn common_dominator(&self, a: BlockId, b: BlockId) -> BlockId {
        self.intersect(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::block::EdgeKind;

    /// Diamond CFG: b0 -> {b1, b2} -> b3.
    fn diamond() -> (BlockGraph, BlockId, BlockId, BlockId, BlockId) {
        let mut g = BlockGraph::new();
        let b0 = g.make_block();
        let b1 = g.make_block();
        let b2 = g.make_block();
        let b3 = g.make_block();
        g.add_edge(b0, b1, EdgeKind::True);
        g.add_edge(b0, b2, EdgeKind::False);
        g.add_edge(b1, b3, EdgeKind::Fallthrough);
        g.add_edge(b2, b3, EdgeKind::Fallthrough);
        (g, b0, b1, b2, b3)
    }

    #[test]
    fn diamond_join_point_dominated_by_head() {
        let (g, b0, b1, b2, b3) = diamond();
        let mut dt = DominatorTree::new();
        dt.compute(&g);
        assert_eq!(dt.idom(b1), Some(b0));
        assert_eq!(dt.idom(b2), Some(b0));
        assert_eq!(dt.idom(b3), Some(b0));
        assert!(dt.dominates(b0, b3));
        assert!(!dt.dominates(b1, b3));
        assert!(!dt.dominates(b2, b3));
    }

    #[test]
    fn common_dominator_of_diamond_arms_is_head() {
        let (g, b0, b1, b2, _b3) = diamond();
        let mut dt = DominatorTree::new();
        dt.compute(&g);
        assert_eq!(dt.common_dominator(b1, b2), b0);
    }

    #[test]
    fn linear_chain_dominates_transitively() {
        let mut g = BlockGraph::new();
        let b0 = g.make_block();
        let b1 = g.make_block();
        let b2 = g.make_block();
        g.add_edge(b0, b1, EdgeKind::Fallthrough);
        g.add_edge(b1, b2, EdgeKind::Fallthrough);
        let mut dt = DominatorTree::new();
        dt.compute(&g);
        assert!(dt.dominates(b0, b2));
        assert!(dt.dominates(b1, b2));
        assert!(!dt.dominates(b2, b0));
    }
}
