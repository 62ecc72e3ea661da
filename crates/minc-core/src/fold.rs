//! Per-instruction constant evaluation.
//!
//! [`evaluate`] computes the value an instruction produces given a table
//! of already-known operand values, the building block of sparse
//! conditional constant propagation. A `None` result means "no value
//! known"; [`Value::Unknown`] means "a value exists but cannot be known at
//! compile time". The distinction matters for phi folding, where Unknown
//! is absorbed by a known value but a missing value poisons the result.
//!
//! [`evaluate_targets`] is the control-flow side: it narrows a
//! terminator's destination set under the same value hypothesis.

use std::collections::HashMap;

use smallvec::{smallvec, SmallVec};

use crate::function::Function;
use crate::id::{BlockId, NodeId, TypeId};
use crate::inst::Op;
use crate::types::{TypeKind, TypeTable};
use crate::value::{CompareResult, IntValue, Value};

/// Evaluates one instruction against a table of known operand values.
pub fn evaluate(
    func: &Function,
    types: &TypeTable,
    node: NodeId,
    known: &HashMap<NodeId, Value>,
) -> Option<Value> {
    let inst = func.inst(node);
    match &inst.op {
        Op::Constant(value) => Some(value.clone()),
        Op::Move { src } => known.get(src).cloned(),
        Op::AllocA { var } => Some(Value::VariablePointer {
            var: *var,
            offset: 0,
            pointee: func.var(*var).ty,
        }),
        Op::Load { .. } | Op::Store { .. } => None,
        Op::Jump { .. } | Op::Branch { .. } => None,
        Op::Cast { arg } => {
            let value = known.get(arg)?;
            Some(cast_value(types, value, inst.ty))
        }
        Op::Add { lhs, rhs } => fold_add(known.get(lhs)?, known.get(rhs)?),
        Op::Compare { op, lhs, rhs } => {
            let lhs = known.get(lhs)?;
            let rhs = known.get(rhs)?;
            let sign = match lhs.compare(rhs) {
                CompareResult::Unknown => return None,
                CompareResult::Less => -1,
                CompareResult::Equal => 0,
                CompareResult::Greater => 1,
            };
            Some(Value::Boolean(op.holds(sign)))
        }
        Op::Phi { inputs } => {
            let mut acc = known.get(&inputs[0].node).cloned();
            for input in &inputs[1..] {
                let value = known.get(&input.node).cloned();
                acc = match (acc, value) {
                    // A known value wins over Unknown in either position.
                    (Some(Value::Unknown), value) => value,
                    (acc, Some(Value::Unknown)) => acc,
                    // A missing value poisons the fold.
                    (None, _) | (_, None) => None,
                    (Some(a), Some(b)) => {
                        if a == b {
                            Some(a)
                        } else {
                            None
                        }
                    }
                };
            }
            acc
        }
    }
}

/// Narrows a terminator's destinations under the known-value hypothesis:
/// a decided branch keeps one arm, an `Unknown` condition keeps none (both
/// arms unreachable under the current hypothesis), an undecided one keeps
/// both. Non-terminators transfer control nowhere.
pub fn evaluate_targets(
    func: &Function,
    node: NodeId,
    known: &HashMap<NodeId, Value>,
) -> SmallVec<[BlockId; 2]> {
    match &func.inst(node).op {
        Op::Jump { target } => smallvec![*target],
        Op::Branch {
            cond,
            on_true,
            on_false,
        } => match known.get(cond) {
            Some(Value::Unknown) => smallvec![],
            Some(Value::Boolean(true)) => smallvec![*on_true],
            Some(Value::Boolean(false)) => smallvec![*on_false],
            _ => smallvec![*on_true, *on_false],
        },
        _ => smallvec![],
    }
}

/// Casts a known value to a target type, following the same rules the
/// generated code would apply. Pairs with no compile-time rule produce
/// [`Value::Unknown`].
fn cast_value(types: &TypeTable, value: &Value, to: TypeId) -> Value {
    match types.kind(to) {
        TypeKind::Boolean => match value {
            Value::Boolean(b) => Value::Boolean(*b),
            Value::NullPointer => Value::Boolean(false),
            Value::VariablePointer { .. } => Value::Boolean(true),
            Value::Integer(i) => Value::Boolean(i.as_unsigned() != 0),
            _ => Value::Unknown,
        },
        TypeKind::Integer { unsigned, width } => match value {
            Value::Boolean(b) => Value::Integer(IntValue::new(*unsigned, *width, *b as u64)),
            Value::NullPointer => Value::Integer(IntValue::new(*unsigned, *width, 0)),
            Value::Integer(i) => {
                let bits = if i.unsigned {
                    i.as_unsigned()
                } else {
                    i.as_signed() as u64
                };
                Value::Integer(IntValue::new(*unsigned, *width, bits))
            }
            _ => Value::Unknown,
        },
        TypeKind::Pointer(pointee) => match value {
            Value::Integer(i) if i.as_unsigned() == 0 => Value::NullPointer,
            Value::NullPointer => Value::NullPointer,
            Value::VariablePointer { var, offset, .. } => Value::VariablePointer {
                var: *var,
                offset: *offset,
                pointee: *pointee,
            },
            _ => Value::Unknown,
        },
        TypeKind::Void => Value::Unknown,
    }
}

fn fold_add(lhs: &Value, rhs: &Value) -> Option<Value> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => Some(Value::Integer(a.wrapping_add(b))),
        (
            Value::Integer(i),
            Value::VariablePointer {
                var,
                offset,
                pointee,
            },
        )
        | (
            Value::VariablePointer {
                var,
                offset,
                pointee,
            },
            Value::Integer(i),
        ) => Some(Value::VariablePointer {
            var: *var,
            offset: offset.wrapping_add(i.as_offset()),
            pointee: *pointee,
        }),
        _ => None,
    }
}
