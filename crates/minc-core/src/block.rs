//! Basic blocks.
//!
//! A [`Block`] owns an ordered sequence of instruction handles. Layout
//! invariants (enforced by the verifier): all phis precede all other
//! instructions; the terminator, when present, is last and is the only
//! control transfer; `dests` mirrors the terminator's target list in
//! identity and order. `preds`, `idom`, and `dominated` are populated by
//! the CFG post-pass and are non-owning.

use serde::{Deserialize, Serialize};

use crate::id::{BlockId, NodeId};

/// A basic block: an owned instruction sequence plus CFG bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Instruction handles in execution order.
    pub insts: Vec<NodeId>,
    /// The control transfer ending this block. `None` while the block is
    /// under construction or when the function falls off its end.
    pub terminator: Option<NodeId>,
    /// Successor blocks, mirroring the terminator's target order.
    pub dests: Vec<BlockId>,
    /// Predecessor blocks, one entry per incoming CFG edge.
    pub preds: Vec<BlockId>,
    /// Immediate dominator; `None` for the start block and unreachable
    /// blocks.
    pub idom: Option<BlockId>,
    /// Blocks whose immediate dominator is this block.
    pub dominated: Vec<BlockId>,
}

impl Block {
    pub fn new() -> Self {
        Block::default()
    }

    /// Applies the collapse-if-duplicate-else-rename policy to one block
    /// reference list: the first occurrence of `old` is erased when `new`
    /// is already present, renamed otherwise.
    pub(crate) fn rename_or_collapse(list: &mut Vec<BlockId>, old: BlockId, new: BlockId) {
        if let Some(pos) = list.iter().position(|&b| b == old) {
            if list.contains(&new) {
                list.remove(pos);
            } else {
                list[pos] = new;
            }
        }
    }

    /// Rewrites this block's own references (idom, preds, dests,
    /// dominated) from `old` to `new`. Instruction-held references are the
    /// owning function's job.
    pub(crate) fn rename_refs(&mut self, old: BlockId, new: BlockId) {
        if self.idom == Some(old) {
            self.idom = Some(new);
        }
        Self::rename_or_collapse(&mut self.preds, old, new);
        Self::rename_or_collapse(&mut self.dests, old, new);
        Self::rename_or_collapse(&mut self.dominated, old, new);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_when_new_absent() {
        let mut list = vec![BlockId(0), BlockId(1), BlockId(2)];
        Block::rename_or_collapse(&mut list, BlockId(1), BlockId(5));
        assert_eq!(list, vec![BlockId(0), BlockId(5), BlockId(2)]);
    }

    #[test]
    fn collapse_when_new_present() {
        let mut list = vec![BlockId(0), BlockId(1), BlockId(2)];
        Block::rename_or_collapse(&mut list, BlockId(1), BlockId(2));
        assert_eq!(list, vec![BlockId(0), BlockId(2)]);
    }

    #[test]
    fn absent_old_is_a_no_op() {
        let mut list = vec![BlockId(0)];
        Block::rename_or_collapse(&mut list, BlockId(9), BlockId(1));
        assert_eq!(list, vec![BlockId(0)]);
    }

    #[test]
    fn rename_refs_covers_all_lists() {
        let mut block = Block::new();
        block.idom = Some(BlockId(3));
        block.preds = vec![BlockId(3), BlockId(4)];
        block.dests = vec![BlockId(5)];
        block.dominated = vec![BlockId(3)];
        block.rename_refs(BlockId(3), BlockId(7));
        assert_eq!(block.idom, Some(BlockId(7)));
        assert_eq!(block.preds, vec![BlockId(7), BlockId(4)]);
        assert_eq!(block.dests, vec![BlockId(5)]);
        assert_eq!(block.dominated, vec![BlockId(7)]);
    }
}
