//! SSA instructions.
//!
//! An [`Inst`] is one instruction: a result type, an optional spill hint
//! for the back end, and an [`Op`] payload. Operand references are
//! non-owning [`NodeId`] handles into the owning function's arena; block
//! references ([`BlockId`]) appear only in phi inputs and terminator
//! targets. [`Inst::inputs`] is the single contract dataflow traversals
//! rely on: it lists data predecessors in a fixed per-variant order.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::id::{BlockId, NodeId, TypeId, VarId};
use crate::value::Value;

/// Comparison operator of a [`Op::Compare`] instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    /// Applies the operator to a three-way comparison sign
    /// (negative = less, zero = equal, positive = greater).
    pub fn holds(self, sign: i32) -> bool {
        match self {
            CmpOp::Eq => sign == 0,
            CmpOp::Ne => sign != 0,
            CmpOp::Lt => sign < 0,
            CmpOp::Le => sign <= 0,
            CmpOp::Gt => sign > 0,
            CmpOp::Ge => sign >= 0,
        }
    }

    /// Source-level spelling, used by the dump.
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// One incoming edge of a phi: the value `node` when control arrives from
/// `block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhiInput {
    pub node: NodeId,
    pub block: BlockId,
}

/// The per-variant payload of an instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// A literal value.
    Constant(Value),
    /// Storage reservation for local variable `var`; produces a constant
    /// pointer to that storage.
    AllocA { var: VarId },
    /// Copy of another value.
    Move { src: NodeId },
    /// Memory read through a pointer.
    Load { addr: NodeId },
    /// Memory write through a pointer. Produces no value.
    Store { addr: NodeId, value: NodeId },
    /// Conversion of `arg` to this instruction's result type.
    Cast { arg: NodeId },
    /// Addition at the promoted result type. Pointer + integer offsets the
    /// pointer.
    Add { lhs: NodeId, rhs: NodeId },
    /// Three-way comparison collapsed through `op`; produces a boolean.
    Compare { op: CmpOp, lhs: NodeId, rhs: NodeId },
    /// Join of values flowing in from predecessor blocks.
    Phi { inputs: Vec<PhiInput> },
    /// Unconditional control transfer. Terminator.
    Jump { target: BlockId },
    /// Two-way conditional control transfer. Terminator.
    Branch {
        cond: NodeId,
        on_true: BlockId,
        on_false: BlockId,
    },
}

/// A single SSA instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inst {
    /// Result type; `TypeId::VOID` for side-effect-only instructions.
    pub ty: TypeId,
    /// Back-end spill slot hint. Unused by the front end.
    pub spill: Option<u32>,
    pub op: Op,
}

impl Inst {
    pub fn new(ty: TypeId, op: Op) -> Self {
        Inst {
            ty,
            spill: None,
            op,
        }
    }

    /// Data predecessors in fixed per-variant order. This is the only
    /// contract exposed for dataflow traversal.
    pub fn inputs(&self) -> SmallVec<[NodeId; 2]> {
        match &self.op {
            Op::Constant(_) | Op::AllocA { .. } | Op::Jump { .. } => smallvec![],
            Op::Move { src } => smallvec![*src],
            Op::Load { addr } => smallvec![*addr],
            Op::Store { addr, value } => smallvec![*addr, *value],
            Op::Cast { arg } => smallvec![*arg],
            Op::Add { lhs, rhs } => smallvec![*lhs, *rhs],
            Op::Compare { lhs, rhs, .. } => smallvec![*lhs, *rhs],
            Op::Phi { inputs } => inputs.iter().map(|i| i.node).collect(),
            Op::Branch { cond, .. } => smallvec![*cond],
        }
    }

    /// Control-transfer destinations, in branch order. Empty for
    /// non-terminators.
    pub fn targets(&self) -> SmallVec<[BlockId; 2]> {
        match &self.op {
            Op::Jump { target } => smallvec![*target],
            Op::Branch {
                on_true, on_false, ..
            } => smallvec![*on_true, *on_false],
            _ => smallvec![],
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self.op, Op::Jump { .. } | Op::Branch { .. })
    }

    pub fn is_phi(&self) -> bool {
        matches!(self.op, Op::Phi { .. })
    }

    /// Whether the instruction has effects beyond its result value and so
    /// must survive dead-code elimination.
    pub fn has_side_effects(&self) -> bool {
        matches!(self.op, Op::AllocA { .. } | Op::Store { .. })
    }

    /// Rewrites every operand handle through `map`.
    pub fn map_inputs(&mut self, mut map: impl FnMut(NodeId) -> NodeId) {
        match &mut self.op {
            Op::Constant(_) | Op::AllocA { .. } | Op::Jump { .. } => {}
            Op::Move { src } => *src = map(*src),
            Op::Load { addr } => *addr = map(*addr),
            Op::Store { addr, value } => {
                *addr = map(*addr);
                *value = map(*value);
            }
            Op::Cast { arg } => *arg = map(*arg),
            Op::Add { lhs, rhs } => {
                *lhs = map(*lhs);
                *rhs = map(*rhs);
            }
            Op::Compare { lhs, rhs, .. } => {
                *lhs = map(*lhs);
                *rhs = map(*rhs);
            }
            Op::Phi { inputs } => {
                for input in inputs {
                    input.node = map(input.node);
                }
            }
            Op::Branch { cond, .. } => *cond = map(*cond),
        }
    }

    /// Renames block references (phi input blocks and terminator targets)
    /// from `old` to `new`.
    pub fn rename_block(&mut self, old: BlockId, new: BlockId) {
        match &mut self.op {
            Op::Phi { inputs } => {
                for input in inputs {
                    if input.block == old {
                        input.block = new;
                    }
                }
            }
            Op::Jump { target } => {
                if *target == old {
                    *target = new;
                }
            }
            Op::Branch {
                on_true, on_false, ..
            } => {
                if *on_true == old {
                    *on_true = new;
                }
                if *on_false == old {
                    *on_false = new;
                }
            }
            _ => {}
        }
    }

    /// Removes phi inputs arriving from any of the given blocks. No-op for
    /// other instructions.
    pub fn remove_blocks(&mut self, removed: &[BlockId]) {
        if let Op::Phi { inputs } = &mut self.op {
            inputs.retain(|i| !removed.contains(&i.block));
        }
    }
}
