//! CFG post-pass: predecessor lists and the dominator tree.
//!
//! Runs over a fully built function: every terminator pushes its source
//! block onto each destination's predecessor list, then dominators are
//! computed over a petgraph view of the block graph
//! ([`petgraph::algo::dominators::simple_fast`], the iterative
//! Cooper/Harvey/Kennedy algorithm over a reverse postorder). Unreachable
//! blocks keep a `None` immediate dominator and are left for later passes
//! to flag.

use std::collections::HashMap;

use petgraph::algo::dominators::simple_fast;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::function::Function;
use crate::id::BlockId;

/// Populates `preds`, `idom`, and `dominated` for every block.
pub fn construct_block_graph(func: &mut Function) {
    let bids = func.block_ids();

    // Predecessors: one entry per incoming edge, in block order.
    for &bid in &bids {
        func.block_mut(bid).preds.clear();
        func.block_mut(bid).idom = None;
        func.block_mut(bid).dominated.clear();
    }
    for &bid in &bids {
        let targets: Vec<BlockId> = match func.block(bid).terminator {
            Some(t) => func.inst(t).targets().to_vec(),
            None => Vec::new(),
        };
        for target in targets {
            func.block_mut(target).preds.push(bid);
        }
    }

    // Dominators over a petgraph view of the block graph.
    let mut graph = DiGraph::<BlockId, ()>::new();
    let mut index: HashMap<BlockId, NodeIndex> = HashMap::with_capacity(bids.len());
    for &bid in &bids {
        index.insert(bid, graph.add_node(bid));
    }
    for &bid in &bids {
        if let Some(t) = func.block(bid).terminator {
            for target in func.inst(t).targets() {
                graph.add_edge(index[&bid], index[&target], ());
            }
        }
    }
    let dominators = simple_fast(&graph, index[&func.start()]);
    for &bid in &bids {
        if bid == func.start() {
            continue;
        }
        if let Some(idom_idx) = dominators.immediate_dominator(index[&bid]) {
            func.block_mut(bid).idom = Some(graph[idom_idx]);
        }
    }
    for &bid in &bids {
        if let Some(idom) = func.block(bid).idom {
            func.block_mut(idom).dominated.push(bid);
        }
    }
}
