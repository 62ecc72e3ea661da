//! The SSA function: instruction arena, block map, and the graph-rewrite
//! primitives later passes build on.
//!
//! Ownership follows the arena-and-handles model: the function owns every
//! instruction in a flat arena and every block in an insertion-ordered
//! map; blocks own their instruction *sequence* by holding handles; all
//! cross-references (operands, phi input blocks, terminator targets,
//! predecessor/dominator links) are plain ids that rewrites redirect.
//! Handles unlinked by a rewrite simply become unreferenced; they are
//! never reused.
//!
//! The rewrite primitives ([`Function::replace_nodes`],
//! [`Function::replace_block`], [`Function::merge_blocks`],
//! [`Function::split_edge`]) leave no partially-rewritten state visible
//! to callers, and [`Function::verify`] checks every block invariant,
//! panicking on violation: a verifier failure is a programmer bug, not a
//! user error.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::id::{BlockId, NodeId, TypeId, VarId};
use crate::inst::{Inst, Op};
use crate::types::{TypeKind, TypeTable};

/// A local variable descriptor. The back-reference to the reserving
/// `AllocA` is the weak side of the pair and may be absent while the
/// declaration is being built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub ty: TypeId,
    pub alloc: Option<NodeId>,
}

/// One entry of a node-replacement map.
///
/// `preexisting` means the replacement already lives in some block, so a
/// replaced instruction must simply disappear from its sequence; otherwise
/// the replacement takes the replaced instruction's slot.
#[derive(Debug, Clone, Copy)]
pub struct Replacement {
    pub node: NodeId,
    pub preexisting: bool,
}

/// A function under construction or transformation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    insts: Vec<Inst>,
    blocks: IndexMap<BlockId, Block>,
    start: BlockId,
    /// Parameter value handles. Empty for the implicit top-level function.
    pub params: Vec<NodeId>,
    /// Return value handle, when the function produces one.
    pub return_value: Option<NodeId>,
    vars: Vec<Variable>,
    next_block: u32,
}

impl Function {
    /// Creates a function with a single empty start block.
    pub fn new() -> Self {
        let mut func = Function {
            insts: Vec::new(),
            blocks: IndexMap::new(),
            start: BlockId(0),
            params: Vec::new(),
            return_value: None,
            vars: Vec::new(),
            next_block: 0,
        };
        let start = func.add_block();
        func.start = start;
        func
    }

    pub fn start(&self) -> BlockId {
        self.start
    }

    // -----------------------------------------------------------------------
    // Blocks
    // -----------------------------------------------------------------------

    /// Appends a fresh empty block and returns its id.
    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        self.blocks.insert(id, Block::new());
        id
    }

    /// Looks up a block. Panics on a dead handle; block ids only come from
    /// this function.
    pub fn block(&self, id: BlockId) -> &Block {
        self.blocks.get(&id).expect("dead block handle")
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        self.blocks.get_mut(&id).expect("dead block handle")
    }

    pub fn contains_block(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    /// Blocks in insertion order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter().map(|(&id, block)| (id, block))
    }

    pub fn block_ids(&self) -> Vec<BlockId> {
        self.blocks.keys().copied().collect()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    // -----------------------------------------------------------------------
    // Instructions
    // -----------------------------------------------------------------------

    /// Adds an instruction to the arena without linking it into a block.
    pub fn add_inst(&mut self, inst: Inst) -> NodeId {
        let id = NodeId(self.insts.len() as u32);
        self.insts.push(inst);
        id
    }

    pub fn inst(&self, id: NodeId) -> &Inst {
        &self.insts[id.0 as usize]
    }

    pub fn inst_mut(&mut self, id: NodeId) -> &mut Inst {
        &mut self.insts[id.0 as usize]
    }

    pub fn inst_count(&self) -> usize {
        self.insts.len()
    }

    /// Adds an instruction and appends it to `block`.
    pub fn append(&mut self, block: BlockId, inst: Inst) -> NodeId {
        let id = self.add_inst(inst);
        self.block_mut(block).insts.push(id);
        id
    }

    /// Adds an instruction at the head of `block`. Used for entry-block
    /// allocas; the entry block never holds phis, so the head is safe.
    pub fn prepend(&mut self, block: BlockId, inst: Inst) -> NodeId {
        let id = self.add_inst(inst);
        self.block_mut(block).insts.insert(0, id);
        id
    }

    /// Adds a control transfer as `block`'s terminator, keeping `dests` in
    /// sync with the instruction's target list.
    pub fn set_terminator(&mut self, block: BlockId, inst: Inst) -> NodeId {
        assert!(inst.is_terminator(), "not a control transfer");
        assert!(
            self.block(block).terminator.is_none(),
            "block {block} already terminated"
        );
        let targets = inst.targets();
        let id = self.add_inst(inst);
        let b = self.block_mut(block);
        b.insts.push(id);
        b.terminator = Some(id);
        b.dests = targets.to_vec();
        id
    }

    // -----------------------------------------------------------------------
    // Variables
    // -----------------------------------------------------------------------

    pub fn add_var(&mut self, name: impl Into<String>, ty: TypeId) -> VarId {
        let id = VarId(self.vars.len() as u32);
        self.vars.push(Variable {
            name: name.into(),
            ty,
            alloc: None,
        });
        id
    }

    pub fn var(&self, id: VarId) -> &Variable {
        &self.vars[id.0 as usize]
    }

    pub fn var_mut(&mut self, id: VarId) -> &mut Variable {
        &mut self.vars[id.0 as usize]
    }

    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    // -----------------------------------------------------------------------
    // Rewrite primitives
    // -----------------------------------------------------------------------

    /// Applies a node-replacement map across the whole function.
    ///
    /// Mapped instructions with a `preexisting` replacement are unlinked
    /// from their sequence; others are overwritten in place. Every
    /// surviving instruction, the terminator fields, the parameter list,
    /// and the return value then redirect their references through the
    /// map.
    pub fn replace_nodes(&mut self, map: &HashMap<NodeId, Replacement>) {
        if let Some(rv) = self.return_value {
            if let Some(r) = map.get(&rv) {
                self.return_value = Some(r.node);
            }
        }
        for param in &mut self.params {
            if let Some(r) = map.get(param) {
                *param = r.node;
            }
        }
        let mut surviving = Vec::new();
        let bids: Vec<BlockId> = self.blocks.keys().copied().collect();
        for bid in bids {
            let block = self.blocks.get_mut(&bid).expect("live block");
            if let Some(t) = block.terminator {
                if let Some(r) = map.get(&t) {
                    block.terminator = Some(r.node);
                }
            }
            let mut kept = Vec::with_capacity(block.insts.len());
            for &id in &block.insts {
                match map.get(&id) {
                    None => {
                        kept.push(id);
                        surviving.push(id);
                    }
                    Some(r) if r.preexisting && r.node != id => {}
                    Some(r) => {
                        kept.push(r.node);
                        surviving.push(r.node);
                    }
                }
            }
            block.insts = kept;
        }
        for id in surviving {
            self.insts[id.0 as usize]
                .map_inputs(|n| map.get(&n).map(|r| r.node).unwrap_or(n));
        }
    }

    /// Redirects every reference to `old` onto `new`: the start pointer,
    /// the block list (collapse-if-duplicate else rename-in-place), and
    /// each remaining block's predecessor/successor/dominator lists and
    /// instruction-held block references.
    pub fn replace_block(&mut self, old: BlockId, new: BlockId) {
        if self.start == old {
            self.start = new;
        }
        if let Some(idx) = self.blocks.get_index_of(&old) {
            if self.blocks.contains_key(&new) {
                self.blocks.shift_remove(&old);
            } else {
                let (_, payload) = self.blocks.shift_remove_index(idx).expect("index just found");
                self.blocks.shift_insert(idx, new, payload);
            }
        }
        let bids: Vec<BlockId> = self.blocks.keys().copied().collect();
        for bid in bids {
            self.rewrite_block_refs(bid, old, new);
        }
    }

    /// Rewrites one block's own reference lists and the block references
    /// held by its instructions.
    fn rewrite_block_refs(&mut self, bid: BlockId, old: BlockId, new: BlockId) {
        let ids = {
            let block = self.blocks.get_mut(&bid).expect("live block");
            block.rename_refs(old, new);
            block.insts.clone()
        };
        for id in ids {
            self.insts[id.0 as usize].rename_block(old, new);
        }
    }

    /// Merges `b` into its unique predecessor `a` (which must have `b` as
    /// its unique successor). Leading phis of `b` collapse to their single
    /// input; `a` adopts `b`'s instruction tail, terminator, and
    /// destinations; every reference to `b` is re-pointed at `a`.
    pub fn merge_blocks(&mut self, a: BlockId, b: BlockId) {
        assert_eq!(self.block(a).dests.len(), 1, "merge source needs a unique successor");
        assert_eq!(self.block(b).preds.len(), 1, "merge target needs a unique predecessor");
        let a_term = self.block(a).terminator.expect("merge source must be terminated");
        assert_eq!(
            self.block(a).insts.last().copied(),
            Some(a_term),
            "terminator must be last"
        );

        loop {
            let Some(&first) = self.block(b).insts.first() else {
                break;
            };
            let phi_input = match &self.inst(first).op {
                Op::Phi { inputs } => {
                    assert_eq!(inputs.len(), 1, "phi in merge target must have one input");
                    assert_eq!(inputs[0].block, a, "phi input must arrive from the merge source");
                    inputs[0].node
                }
                _ => break,
            };
            let mut replacements = HashMap::new();
            replacements.insert(
                first,
                Replacement {
                    node: phi_input,
                    preexisting: true,
                },
            );
            // Unlinks the phi and redirects its uses to the input.
            self.replace_nodes(&replacements);
        }

        let (b_insts, b_term, b_dests) = {
            let bb = self.blocks.get_mut(&b).expect("live block");
            (
                std::mem::take(&mut bb.insts),
                bb.terminator.take(),
                std::mem::take(&mut bb.dests),
            )
        };
        {
            let ab = self.blocks.get_mut(&a).expect("live block");
            ab.insts.pop();
            ab.insts.extend(b_insts);
            ab.terminator = b_term;
        }
        self.replace_block(b, a);
        self.block_mut(a).dests = b_dests;
        if let Some(t) = self.block(a).terminator {
            debug_assert_eq!(self.block(a).insts.last().copied(), Some(t));
        }
    }

    /// Splits the CFG edge `a -> b` with a fresh block holding only an
    /// unconditional jump to `b`. Returns the new block.
    ///
    /// The new block's immediate dominator is `a`; if `b` was immediately
    /// dominated by `a` it moves under the new block instead.
    pub fn split_edge(&mut self, a: BlockId, b: BlockId) -> BlockId {
        assert!(self.block(a).dests.contains(&b), "no edge {a} -> {b}");
        let m = self.add_block();
        let jump = self.add_inst(Inst::new(TypeId::VOID, Op::Jump { target: b }));
        {
            let mb = self.blocks.get_mut(&m).expect("fresh block");
            mb.insts.push(jump);
            mb.terminator = Some(jump);
            mb.dests.push(b);
            mb.preds.push(a);
            mb.idom = Some(a);
        }
        if self.block(b).idom == Some(a) {
            self.block_mut(b).idom = Some(m);
            let ab = self.block_mut(a);
            if let Some(pos) = ab.dominated.iter().position(|&x| x == b) {
                ab.dominated.remove(pos);
            }
            self.block_mut(m).dominated.push(b);
        }
        // Only the two endpoints see the edge: a's successor-side
        // references and b's predecessor-side references (including phi
        // inputs) move to m.
        self.rewrite_block_refs(a, b, m);
        if a != b {
            self.rewrite_block_refs(b, a, m);
        }
        self.block_mut(a).dominated.push(m);
        m
    }

    // -----------------------------------------------------------------------
    // Verifier
    // -----------------------------------------------------------------------

    /// Checks every structural invariant. Panics on violation.
    pub fn verify(&self, types: &TypeTable) {
        assert!(
            self.blocks.contains_key(&self.start),
            "start block is not in the function"
        );
        for (&bid, block) in &self.blocks {
            let mut seen_non_phi = false;
            for &id in &block.insts {
                let inst = self.inst(id);
                self.verify_inst(types, bid, id, inst);
                if inst.is_terminator() {
                    assert_eq!(
                        Some(id),
                        block.terminator,
                        "control transfer {id} in {bid} is not the block terminator"
                    );
                }
                if inst.is_phi() {
                    assert!(!seen_non_phi, "phi {id} after a non-phi in {bid}");
                } else {
                    seen_non_phi = true;
                }
            }
            match block.terminator {
                Some(t) => {
                    assert_eq!(
                        block.insts.last().copied(),
                        Some(t),
                        "terminator is not the last instruction of {bid}"
                    );
                    let targets = self.inst(t).targets();
                    assert_eq!(
                        block.dests,
                        targets.to_vec(),
                        "dest list of {bid} does not match its terminator"
                    );
                    for &dest in &block.dests {
                        assert!(
                            self.blocks.contains_key(&dest),
                            "terminator of {bid} targets dead block {dest}"
                        );
                    }
                }
                None => assert!(
                    block.dests.is_empty(),
                    "unterminated block {bid} has successors"
                ),
            }
        }
    }

    fn verify_inst(&self, types: &TypeTable, bid: BlockId, id: NodeId, inst: &Inst) {
        for input in inst.inputs() {
            assert!(
                (input.0 as usize) < self.insts.len(),
                "{id} in {bid} references dead node {input}"
            );
        }
        match &inst.op {
            Op::AllocA { var } => {
                assert!((var.0 as usize) < self.vars.len(), "{id} references dead {var}");
                assert!(
                    matches!(types.kind(inst.ty), TypeKind::Pointer(_)),
                    "alloca {id} must produce a pointer"
                );
            }
            Op::Compare { .. } => {
                assert_eq!(
                    *types.kind(inst.ty),
                    TypeKind::Boolean,
                    "compare {id} must produce a boolean"
                );
            }
            Op::Load { addr } => {
                assert!(
                    matches!(types.kind(self.inst(*addr).ty), TypeKind::Pointer(_)),
                    "load {id} address is not a pointer"
                );
            }
            Op::Branch { cond, .. } => {
                assert_eq!(
                    *types.kind(self.inst(*cond).ty),
                    TypeKind::Boolean,
                    "branch {id} condition is not a boolean"
                );
            }
            Op::Phi { inputs } => {
                assert!(!inputs.is_empty(), "phi {id} has no inputs");
            }
            _ => {}
        }
    }
}

impl Default for Function {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::construct_block_graph;
    use crate::inst::{CmpOp, PhiInput};
    use crate::types::IntWidth;
    use crate::value::{IntValue, Value};

    fn int_const(types: &mut TypeTable, func: &mut Function, block: BlockId, v: u64) -> NodeId {
        let value = Value::Integer(IntValue::new(false, IntWidth::Native, v));
        let ty = types.integer(false, IntWidth::Native);
        func.append(block, Inst::new(ty, Op::Constant(value)))
    }

    fn bool_const(func: &mut Function, block: BlockId, v: bool) -> NodeId {
        func.append(block, Inst::new(TypeId::BOOL, Op::Constant(Value::Boolean(v))))
    }

    /// A -> {B, C} -> D diamond, with the CFG pass run.
    fn diamond(types: &mut TypeTable) -> (Function, BlockId, BlockId, BlockId, BlockId) {
        let mut func = Function::new();
        let a = func.start();
        let b = func.add_block();
        let c = func.add_block();
        let d = func.add_block();
        let cond = bool_const(&mut func, a, true);
        func.set_terminator(
            a,
            Inst::new(
                TypeId::VOID,
                Op::Branch {
                    cond,
                    on_true: b,
                    on_false: c,
                },
            ),
        );
        func.set_terminator(b, Inst::new(TypeId::VOID, Op::Jump { target: d }));
        func.set_terminator(c, Inst::new(TypeId::VOID, Op::Jump { target: d }));
        construct_block_graph(&mut func);
        func.verify(types);
        (func, a, b, c, d)
    }

    #[test]
    fn new_function_has_start_block() {
        let types = TypeTable::new();
        let func = Function::new();
        assert_eq!(func.block_count(), 1);
        assert!(func.contains_block(func.start()));
        func.verify(&types);
    }

    #[test]
    fn set_terminator_syncs_dests() {
        let mut func = Function::new();
        let a = func.start();
        let b = func.add_block();
        func.set_terminator(a, Inst::new(TypeId::VOID, Op::Jump { target: b }));
        assert_eq!(func.block(a).dests, vec![b]);
        assert_eq!(
            func.block(a).terminator,
            func.block(a).insts.last().copied()
        );
    }

    #[test]
    #[should_panic(expected = "already terminated")]
    fn double_terminator_panics() {
        let mut func = Function::new();
        let a = func.start();
        let b = func.add_block();
        func.set_terminator(a, Inst::new(TypeId::VOID, Op::Jump { target: b }));
        func.set_terminator(a, Inst::new(TypeId::VOID, Op::Jump { target: b }));
    }

    #[test]
    fn replace_nodes_in_place() {
        let mut types = TypeTable::new();
        let mut func = Function::new();
        let a = func.start();
        let c1 = int_const(&mut types, &mut func, a, 1);
        let mv = func.append(a, Inst::new(func.inst(c1).ty, Op::Move { src: c1 }));

        // Swap the constant for a fresh one, in place.
        let ty = func.inst(c1).ty;
        let c2 = func.add_inst(Inst::new(
            ty,
            Op::Constant(Value::Integer(IntValue::new(false, IntWidth::Native, 2))),
        ));
        let mut map = HashMap::new();
        map.insert(
            c1,
            Replacement {
                node: c2,
                preexisting: false,
            },
        );
        func.replace_nodes(&map);

        assert_eq!(func.block(a).insts, vec![c2, mv]);
        assert_eq!(func.inst(mv).inputs().as_slice(), &[c2]);
        func.verify(&types);
    }

    #[test]
    fn replace_nodes_preexisting_unlinks() {
        let mut types = TypeTable::new();
        let mut func = Function::new();
        let a = func.start();
        let c1 = int_const(&mut types, &mut func, a, 1);
        let c2 = int_const(&mut types, &mut func, a, 1);
        let mv = func.append(a, Inst::new(func.inst(c2).ty, Op::Move { src: c2 }));

        // c2 already has an equivalent living in the block: collapse onto c1.
        let mut map = HashMap::new();
        map.insert(
            c2,
            Replacement {
                node: c1,
                preexisting: true,
            },
        );
        func.replace_nodes(&map);

        assert_eq!(func.block(a).insts, vec![c1, mv]);
        assert_eq!(func.inst(mv).inputs().as_slice(), &[c1]);
        func.verify(&types);
    }

    #[test]
    fn replace_nodes_rewrites_terminator_and_return() {
        let mut types = TypeTable::new();
        let mut func = Function::new();
        let a = func.start();
        let b = func.add_block();
        let cond = bool_const(&mut func, a, true);
        let term = func.set_terminator(
            a,
            Inst::new(
                TypeId::VOID,
                Op::Branch {
                    cond,
                    on_true: b,
                    on_false: b,
                },
            ),
        );
        func.return_value = Some(cond);

        let cond2 = func.add_inst(Inst::new(TypeId::BOOL, Op::Constant(Value::Boolean(false))));
        let mut map = HashMap::new();
        map.insert(
            cond,
            Replacement {
                node: cond2,
                preexisting: false,
            },
        );
        func.replace_nodes(&map);
        assert_eq!(func.inst(term).inputs().as_slice(), &[cond2]);
        assert_eq!(func.return_value, Some(cond2));
    }

    #[test]
    fn replace_block_renames_and_collapses() {
        let mut types = TypeTable::new();
        let (mut func, a, b, c, d) = diamond(&mut types);

        // Rename: point everything at c toward b instead.
        func.replace_block(c, b);
        assert!(!func.contains_block(c));
        assert_eq!(func.block(a).dests, vec![b]); // collapsed duplicate
        // d now has both predecessor slots naming b; the duplicate collapses.
        assert_eq!(func.block(d).preds, vec![b]);
    }

    #[test]
    fn merge_straight_line() {
        let mut types = TypeTable::new();
        let mut func = Function::new();
        let a = func.start();
        let b = func.add_block();
        let c = func.add_block();
        let k = int_const(&mut types, &mut func, a, 7);
        func.set_terminator(a, Inst::new(TypeId::VOID, Op::Jump { target: b }));
        let mv = func.append(b, Inst::new(func.inst(k).ty, Op::Move { src: k }));
        func.set_terminator(b, Inst::new(TypeId::VOID, Op::Jump { target: c }));
        func.set_terminator(c, Inst::new(TypeId::VOID, Op::Jump { target: c }));
        construct_block_graph(&mut func);
        func.verify(&types);

        func.merge_blocks(a, b);
        assert!(!func.contains_block(b));
        assert_eq!(func.block(a).dests, vec![c]);
        assert!(func.block(a).insts.contains(&mv));
        construct_block_graph(&mut func);
        func.verify(&types);
    }

    #[test]
    fn merge_collapses_single_input_phi() {
        let mut types = TypeTable::new();
        let mut func = Function::new();
        let a = func.start();
        let b = func.add_block();
        let k = int_const(&mut types, &mut func, a, 3);
        func.set_terminator(a, Inst::new(TypeId::VOID, Op::Jump { target: b }));
        let ty = func.inst(k).ty;
        let phi = func.append(
            b,
            Inst::new(
                ty,
                Op::Phi {
                    inputs: vec![PhiInput { node: k, block: a }],
                },
            ),
        );
        let mv = func.append(b, Inst::new(ty, Op::Move { src: phi }));
        construct_block_graph(&mut func);

        func.merge_blocks(a, b);
        // The phi is gone and its use re-targets the single input.
        assert!(!func.block(a).insts.contains(&phi));
        assert_eq!(func.inst(mv).inputs().as_slice(), &[k]);
        func.verify(&types);
    }

    #[test]
    fn split_edge_on_diamond() {
        let mut types = TypeTable::new();
        let (mut func, a, b, c, _d) = diamond(&mut types);

        let m = func.split_edge(a, b);
        assert_eq!(func.block(a).dests, vec![m, c]);
        assert_eq!(func.block(b).preds, vec![m]);
        assert_eq!(func.block(m).preds, vec![a]);
        assert_eq!(func.block(m).dests, vec![b]);
        assert_eq!(func.block(m).idom, Some(a));
        // b was immediately dominated by a; it moves under m.
        assert_eq!(func.block(b).idom, Some(m));
        assert!(func.block(m).dominated.contains(&b));
        assert!(!func.block(a).dominated.contains(&b));
        assert!(func.block(a).dominated.contains(&m));
        func.verify(&types);
    }

    #[test]
    fn split_then_merge_restores_the_cfg() {
        let mut types = TypeTable::new();
        let mut func = Function::new();
        let a = func.start();
        let b = func.add_block();
        let _k = int_const(&mut types, &mut func, b, 1);
        func.set_terminator(a, Inst::new(TypeId::VOID, Op::Jump { target: b }));
        construct_block_graph(&mut func);
        let before: Vec<(BlockId, Vec<BlockId>, Vec<BlockId>)> = func
            .blocks()
            .map(|(id, blk)| (id, blk.dests.clone(), blk.preds.clone()))
            .collect();

        let m = func.split_edge(a, b);
        func.verify(&types);
        // The split edge makes a -> m the only edge out of a, so the merge
        // precondition holds.
        func.merge_blocks(a, m);
        construct_block_graph(&mut func);
        func.verify(&types);

        let after: Vec<(BlockId, Vec<BlockId>, Vec<BlockId>)> = func
            .blocks()
            .map(|(id, blk)| (id, blk.dests.clone(), blk.preds.clone()))
            .collect();
        assert_eq!(before, after);
        assert_eq!(func.block(b).idom, Some(a));
    }

    #[test]
    fn verify_passes_after_rewrites() {
        let mut types = TypeTable::new();
        let (mut func, a, b, _c, _d) = diamond(&mut types);
        let m = func.split_edge(a, b);
        func.verify(&types);
        func.merge_blocks(m, b);
        construct_block_graph(&mut func);
        func.verify(&types);
    }

    #[test]
    #[should_panic(expected = "phi")]
    fn verify_rejects_phi_after_non_phi() {
        let mut types = TypeTable::new();
        let mut func = Function::new();
        let a = func.start();
        let k = int_const(&mut types, &mut func, a, 1);
        let ty = func.inst(k).ty;
        func.append(
            a,
            Inst::new(
                ty,
                Op::Phi {
                    inputs: vec![PhiInput { node: k, block: a }],
                },
            ),
        );
        func.verify(&types);
    }

    #[test]
    #[should_panic(expected = "dest list")]
    fn verify_rejects_dest_mismatch() {
        let types = TypeTable::new();
        let mut func = Function::new();
        let a = func.start();
        let b = func.add_block();
        func.set_terminator(a, Inst::new(TypeId::VOID, Op::Jump { target: b }));
        func.block_mut(a).dests = vec![a];
        func.verify(&types);
    }

    #[test]
    #[should_panic(expected = "condition is not a boolean")]
    fn verify_rejects_non_boolean_branch() {
        let mut types = TypeTable::new();
        let mut func = Function::new();
        let a = func.start();
        let b = func.add_block();
        let k = int_const(&mut types, &mut func, a, 1);
        func.set_terminator(
            a,
            Inst::new(
                TypeId::VOID,
                Op::Branch {
                    cond: k,
                    on_true: b,
                    on_false: b,
                },
            ),
        );
        func.verify(&types);
    }

    #[test]
    fn compare_terminator_and_layout_verify() {
        let mut types = TypeTable::new();
        let mut func = Function::new();
        let a = func.start();
        let end = func.add_block();
        let x = int_const(&mut types, &mut func, a, 4);
        let y = int_const(&mut types, &mut func, a, 5);
        let cmp = func.append(
            a,
            Inst::new(
                TypeId::BOOL,
                Op::Compare {
                    op: CmpOp::Lt,
                    lhs: x,
                    rhs: y,
                },
            ),
        );
        func.set_terminator(
            a,
            Inst::new(
                TypeId::VOID,
                Op::Branch {
                    cond: cmp,
                    on_true: end,
                    on_false: end,
                },
            ),
        );
        construct_block_graph(&mut func);
        func.verify(&types);
    }

    #[test]
    fn serde_roundtrip() {
        let mut types = TypeTable::new();
        let (func, ..) = diamond(&mut types);
        let json = serde_json::to_string(&func).unwrap();
        let back: Function = serde_json::from_str(&json).unwrap();
        assert_eq!(back.block_count(), func.block_count());
        assert_eq!(back.start(), func.start());
        assert_eq!(back.inst_count(), func.inst_count());
    }
}
