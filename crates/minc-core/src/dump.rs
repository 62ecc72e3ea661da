//! Stable textual rendering of a function.
//!
//! Blocks print in insertion order with their dominator info, then each
//! instruction with operands named by their arena ids; the ids are the
//! stable small integers the rest of the crate already uses, so identical
//! inputs render identically. Values and types print by variant name with
//! payload.

use std::fmt::{self, Write};

use crate::function::Function;
use crate::id::{BlockId, TypeId};
use crate::inst::{Inst, Op};
use crate::types::{IntWidth, TypeTable};
use crate::value::Value;

/// Renders the function into a string.
pub fn dump(func: &Function, types: &TypeTable) -> String {
    let mut out = String::new();
    write_dump(func, types, &mut out).expect("string writer cannot fail");
    out
}

/// Renders the function into any [`fmt::Write`] sink.
pub fn write_dump(func: &Function, types: &TypeTable, out: &mut impl Write) -> fmt::Result {
    write!(out, "function(")?;
    let mut block_sep = "\n";
    for (bid, _) in func.blocks() {
        write!(out, "{block_sep}")?;
        block_sep = ",\n";
        write_block(func, types, bid, out)?;
    }
    write!(out, "\n)")
}

fn write_block(
    func: &Function,
    types: &TypeTable,
    bid: BlockId,
    out: &mut impl Write,
) -> fmt::Result {
    let block = func.block(bid);
    write!(out, "  [{bid}]block(\n    immediateDominator=")?;
    match block.idom {
        Some(idom) => write!(out, "{idom}")?,
        None => write!(out, "<none>")?,
    }
    write!(out, ",\n    dominatedBlocks=[")?;
    let mut sep = "";
    for dominated in &block.dominated {
        write!(out, "{sep}{dominated}")?;
        sep = ",";
    }
    write!(out, "]")?;
    for &id in &block.insts {
        write!(out, ",\n    [{id}]")?;
        write_inst(func, types, func.inst(id), out)?;
    }
    write!(out, "\n  )")
}

fn write_inst(
    func: &Function,
    types: &TypeTable,
    inst: &Inst,
    out: &mut impl Write,
) -> fmt::Result {
    match &inst.op {
        Op::Constant(value) => {
            write!(out, "Constant(value=")?;
            write_value(value, out)?;
            write!(out, ",type=")?;
            write_type(types, inst.ty, out)?;
            write!(out, ")")
        }
        Op::AllocA { var } => {
            write!(out, "AllocA(variableType=")?;
            write_type(types, func.var(*var).ty, out)?;
            write!(out, ",var={var})")
        }
        Op::Move { src } => write!(out, "Move(source={src})"),
        Op::Load { addr } => write!(out, "Load(address={addr})"),
        Op::Store { addr, value } => write!(out, "Store(address={addr},value={value})"),
        Op::Cast { arg } => {
            write!(out, "Cast(arg={arg},type=")?;
            write_type(types, inst.ty, out)?;
            write!(out, ")")
        }
        Op::Add { lhs, rhs } => write!(out, "Add(lhs={lhs},rhs={rhs})"),
        Op::Compare { op, lhs, rhs } => {
            write!(out, "Compare(lhs={lhs},op='{}',rhs={rhs})", op.symbol())
        }
        Op::Phi { inputs } => {
            write!(out, "Phi(")?;
            let mut sep = "";
            for input in inputs {
                write!(out, "{sep}(node={},block={})", input.node, input.block)?;
                sep = ",";
            }
            write!(out, ")")
        }
        Op::Jump { target } => write!(out, "Jump(target={target})"),
        Op::Branch {
            cond,
            on_true,
            on_false,
        } => write!(
            out,
            "Branch(condition={cond},trueTarget={on_true},falseTarget={on_false})"
        ),
    }
}

fn write_value(value: &Value, out: &mut impl Write) -> fmt::Result {
    match value {
        Value::Boolean(b) => write!(out, "Boolean({b})"),
        Value::Integer(i) => {
            if i.unsigned {
                write!(out, "Integer({}:", i.as_unsigned())?;
            } else {
                write!(out, "Integer({}:", i.as_signed())?;
            }
            write!(out, "{})", int_name(i.unsigned, i.width))
        }
        Value::NullPointer => write!(out, "NullPointer()"),
        Value::VariablePointer { var, offset, .. } => {
            write!(out, "VariablePointer(var={var},offset={offset})")
        }
        Value::Unknown => write!(out, "Unknown()"),
    }
}

fn write_type(types: &TypeTable, id: TypeId, out: &mut impl Write) -> fmt::Result {
    let desc = types.get(id);
    if desc.constant {
        write!(out, "constant(")?;
    }
    if desc.volatile {
        write!(out, "volatile(")?;
    }
    match desc.kind {
        crate::types::TypeKind::Void => write!(out, "void")?,
        crate::types::TypeKind::Boolean => write!(out, "boolean")?,
        crate::types::TypeKind::Integer { unsigned, width } => {
            write!(out, "{}", int_name(unsigned, width))?
        }
        crate::types::TypeKind::Pointer(pointee) => {
            write!(out, "pointer(")?;
            write_type(types, pointee, out)?;
            write!(out, ")")?;
        }
    }
    if desc.volatile {
        write!(out, ")")?;
    }
    if desc.constant {
        write!(out, ")")?;
    }
    Ok(())
}

fn int_name(unsigned: bool, width: IntWidth) -> &'static str {
    match (unsigned, width) {
        (false, IntWidth::Int8) => "int8",
        (true, IntWidth::Int8) => "uint8",
        (false, IntWidth::Int16) => "int16",
        (true, IntWidth::Int16) => "uint16",
        (false, IntWidth::Int32) => "int32",
        (true, IntWidth::Int32) => "uint32",
        (false, IntWidth::Int64) => "int64",
        (true, IntWidth::Int64) => "uint64",
        (false, IntWidth::Native) => "int",
        (true, IntWidth::Native) => "uint",
    }
}
