//! minc-core: the SSA intermediate representation of the minc compiler.
//!
//! The crate holds everything downstream passes operate on: hash-consed
//! types, compile-time values, the instruction/block/function graph with
//! its rewrite primitives and verifier, per-instruction constant
//! evaluation, the CFG post-pass (predecessors + dominators), and the
//! textual dump.

pub mod block;
pub mod cfg;
pub mod dump;
pub mod fold;
pub mod function;
pub mod id;
pub mod inst;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use block::Block;
pub use cfg::construct_block_graph;
pub use dump::{dump, write_dump};
pub use fold::{evaluate, evaluate_targets};
pub use function::{Function, Replacement, Variable};
pub use id::{BlockId, NodeId, TypeId, VarId};
pub use inst::{CmpOp, Inst, Op, PhiInput};
pub use types::{CastKind, CombinedTypes, IntWidth, TypeDesc, TypeKind, TypeTable};
pub use value::{CompareResult, IntValue, Value};
