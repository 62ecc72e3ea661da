//! Compile-time values.
//!
//! A [`Value`] is what constant evaluation computes for an instruction:
//! a boolean, a fixed-width integer, the null pointer, a symbolic pointer
//! into a local variable, or `Unknown` (a value exists but is not known at
//! compile time). Equality is structural; [`Value::compare`] is the
//! three-way comparison constant-folded comparisons are built on.

use serde::{Deserialize, Serialize};

use crate::id::{TypeId, VarId};
use crate::types::{IntWidth, TypeTable};

/// A fixed-width two's-complement integer payload.
///
/// The bit pattern is stored truncated to the width, so structural
/// equality compares the value an instruction would actually produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntValue {
    pub unsigned: bool,
    pub width: IntWidth,
    bits: u64,
}

impl IntValue {
    /// Wraps `bits` to the given width.
    pub fn new(unsigned: bool, width: IntWidth, bits: u64) -> Self {
        IntValue {
            unsigned,
            width,
            bits: truncate(bits, width),
        }
    }

    /// The zero-extended payload.
    pub fn as_unsigned(&self) -> u64 {
        self.bits
    }

    /// The sign-extended payload.
    pub fn as_signed(&self) -> i64 {
        let shift = 64 - self.width.bits();
        ((self.bits << shift) as i64) >> shift
    }

    /// Two's-complement addition at this value's width, keeping its
    /// signedness.
    pub fn wrapping_add(&self, rhs: &IntValue) -> IntValue {
        if self.unsigned {
            IntValue::new(
                true,
                self.width,
                self.as_unsigned().wrapping_add(rhs.as_unsigned()),
            )
        } else {
            IntValue::new(
                false,
                self.width,
                self.as_signed().wrapping_add(rhs.as_signed()) as u64,
            )
        }
    }

    /// The offset delta this integer contributes to pointer arithmetic:
    /// sign-extended when signed, zero-extended when unsigned.
    pub fn as_offset(&self) -> i64 {
        if self.unsigned {
            self.as_unsigned() as i64
        } else {
            self.as_signed()
        }
    }
}

fn truncate(bits: u64, width: IntWidth) -> u64 {
    let b = width.bits();
    if b == 64 {
        bits
    } else {
        bits & ((1u64 << b) - 1)
    }
}

/// Result of a three-way value comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareResult {
    Less,
    Equal,
    Greater,
    /// The values are not comparable at compile time.
    Unknown,
}

/// A compile-time value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Integer(IntValue),
    NullPointer,
    /// A pointer into local variable `var`, `offset` bytes in.
    VariablePointer {
        var: VarId,
        offset: i64,
        pointee: TypeId,
    },
    /// A value exists but is not known at compile time.
    Unknown,
}

impl Value {
    /// Three-way comparison. Defined for homogeneous boolean and integer
    /// pairs of matching signedness; pointers compare equal only when they
    /// name the same location; everything else is [`CompareResult::Unknown`].
    pub fn compare(&self, other: &Value) -> CompareResult {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => from_ord(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => {
                if a.unsigned && b.unsigned {
                    from_ord(a.as_unsigned().cmp(&b.as_unsigned()))
                } else if !a.unsigned && !b.unsigned {
                    from_ord(a.as_signed().cmp(&b.as_signed()))
                } else {
                    CompareResult::Unknown
                }
            }
            (Value::NullPointer, Value::NullPointer) => CompareResult::Equal,
            (
                Value::VariablePointer {
                    var: av,
                    offset: ao,
                    ..
                },
                Value::VariablePointer {
                    var: bv,
                    offset: bo,
                    ..
                },
            ) => {
                if av == bv && ao == bo {
                    CompareResult::Equal
                } else {
                    CompareResult::Unknown
                }
            }
            _ => CompareResult::Unknown,
        }
    }

    /// The type carried by this value. The null pointer types as a pointer
    /// to void; `Unknown` carries no value type.
    pub fn type_id(&self, types: &mut TypeTable) -> TypeId {
        match self {
            Value::Boolean(_) => types.boolean(),
            Value::Integer(i) => types.integer(i.unsigned, i.width),
            Value::NullPointer => {
                let void = types.void();
                types.pointer(void)
            }
            Value::VariablePointer { pointee, .. } => types.pointer(*pointee),
            Value::Unknown => types.void(),
        }
    }
}

fn from_ord(ord: std::cmp::Ordering) -> CompareResult {
    match ord {
        std::cmp::Ordering::Less => CompareResult::Less,
        std::cmp::Ordering::Equal => CompareResult::Equal,
        std::cmp::Ordering::Greater => CompareResult::Greater,
    }
}
