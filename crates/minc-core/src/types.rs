//! The minc type lattice.
//!
//! Types are structural descriptors (a variant plus two qualifier flags)
//! hash-consed into a [`TypeTable`] so that within one table every
//! descriptor has exactly one [`TypeId`]. Identity comparison of types is
//! therefore an integer compare, and the qualifier adjusters
//! (`to_constant` and friends) never mutate: they return the canonical id
//! of the adjusted descriptor.
//!
//! The table also owns the combination rules used by the SSA builder:
//! arithmetic promotion for `+`, the shared promotion for comparisons, and
//! cast legality for both implicit coercions and explicit `cast(T, e)`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::TypeId;
use crate::value::{IntValue, Value};

/// Width of an integer type. `Native` is the target's pointer-sized
/// integer; constant evaluation treats it as 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntWidth {
    Int8,
    Int16,
    Int32,
    Int64,
    Native,
}

impl IntWidth {
    /// Bit count used for constant arithmetic at this width.
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::Int8 => 8,
            IntWidth::Int16 => 16,
            IntWidth::Int32 => 32,
            IntWidth::Int64 | IntWidth::Native => 64,
        }
    }
}

/// The variant part of a type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// No value; the result type of stores and control transfers.
    Void,
    /// Two-valued.
    Boolean,
    /// Fixed-width or native-width integer.
    Integer { unsigned: bool, width: IntWidth },
    /// Pointer to another interned type; arbitrary depth by nesting.
    Pointer(TypeId),
}

/// A full structural type descriptor: variant plus qualifier flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDesc {
    pub kind: TypeKind,
    pub constant: bool,
    pub volatile: bool,
}

impl TypeDesc {
    fn unqualified(kind: TypeKind) -> Self {
        TypeDesc {
            kind,
            constant: false,
            volatile: false,
        }
    }
}

/// Whether a cast is an implicit coercion or an explicit `cast(T, e)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    Implicit,
    Explicit,
}

/// Operand and result types produced by a binary-operator combination.
///
/// The caller inserts an explicit cast for either operand whose type
/// differs from its slot here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinedTypes {
    pub lhs: TypeId,
    pub rhs: TypeId,
    pub result: TypeId,
}

/// Pre-registered ids for the two types every compilation touches.
impl TypeId {
    pub const VOID: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
}

/// Hash-consing table of type descriptors.
///
/// `Void` and `Boolean` are pre-registered as [`TypeId::VOID`] and
/// [`TypeId::BOOL`]; everything else is interned on first use.
#[derive(Debug, Clone)]
pub struct TypeTable {
    types: Vec<TypeDesc>,
    interned: HashMap<TypeDesc, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = TypeTable {
            types: Vec::new(),
            interned: HashMap::new(),
        };
        let void = table.intern(TypeDesc::unqualified(TypeKind::Void));
        let boolean = table.intern(TypeDesc::unqualified(TypeKind::Boolean));
        debug_assert_eq!(void, TypeId::VOID);
        debug_assert_eq!(boolean, TypeId::BOOL);
        table
    }

    fn intern(&mut self, desc: TypeDesc) -> TypeId {
        if let Some(&id) = self.interned.get(&desc) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(desc);
        self.interned.insert(desc, id);
        id
    }

    /// Looks up the descriptor for an id. Panics on a dangling id; type ids
    /// are only produced by this table, so that is a programmer error.
    pub fn get(&self, id: TypeId) -> &TypeDesc {
        &self.types[id.0 as usize]
    }

    /// The variant of a type, ignoring qualifiers.
    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.get(id).kind
    }

    /// Number of distinct type nodes interned so far.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    pub fn void(&self) -> TypeId {
        TypeId::VOID
    }

    pub fn boolean(&self) -> TypeId {
        TypeId::BOOL
    }

    pub fn integer(&mut self, unsigned: bool, width: IntWidth) -> TypeId {
        self.intern(TypeDesc::unqualified(TypeKind::Integer { unsigned, width }))
    }

    pub fn pointer(&mut self, pointee: TypeId) -> TypeId {
        self.intern(TypeDesc::unqualified(TypeKind::Pointer(pointee)))
    }

    // -----------------------------------------------------------------------
    // Qualifier adjusters
    // -----------------------------------------------------------------------

    pub fn to_constant(&mut self, id: TypeId) -> TypeId {
        let mut desc = *self.get(id);
        desc.constant = true;
        self.intern(desc)
    }

    pub fn to_volatile(&mut self, id: TypeId) -> TypeId {
        let mut desc = *self.get(id);
        desc.volatile = true;
        self.intern(desc)
    }

    pub fn to_non_constant(&mut self, id: TypeId) -> TypeId {
        let mut desc = *self.get(id);
        desc.constant = false;
        self.intern(desc)
    }

    pub fn to_non_volatile(&mut self, id: TypeId) -> TypeId {
        let mut desc = *self.get(id);
        desc.volatile = false;
        self.intern(desc)
    }

    /// Both qualifier flags cleared.
    pub fn strip_qualifiers(&mut self, id: TypeId) -> TypeId {
        let desc = *self.get(id);
        self.intern(TypeDesc::unqualified(desc.kind))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The pointee of a pointer type; `None` for anything else. Qualifiers
    /// on the pointer itself do not block dereferencing.
    pub fn dereference(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id).kind {
            TypeKind::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    /// The zero value a declaration without initializer stores: `false`,
    /// integer zero, or the null pointer. `None` for `Void`, which cannot
    /// back a variable.
    pub fn default_value(&self, id: TypeId) -> Option<Value> {
        match self.get(id).kind {
            TypeKind::Void => None,
            TypeKind::Boolean => Some(Value::Boolean(false)),
            TypeKind::Integer { unsigned, width } => {
                Some(Value::Integer(IntValue::new(unsigned, width, 0)))
            }
            TypeKind::Pointer(_) => Some(Value::NullPointer),
        }
    }

    // -----------------------------------------------------------------------
    // Binary-operator combination
    // -----------------------------------------------------------------------

    /// Operand/result types for `+`, or `None` when the operands do not
    /// combine. Pointer + integer keeps the pointer side; integer +
    /// integer promotes per [`promote_integers`].
    pub fn arith_combined(&mut self, lhs: TypeId, rhs: TypeId) -> Option<CombinedTypes> {
        let ls = self.strip_qualifiers(lhs);
        let rs = self.strip_qualifiers(rhs);
        match (self.get(ls).kind, self.get(rs).kind) {
            (TypeKind::Pointer(_), TypeKind::Integer { .. }) => Some(CombinedTypes {
                lhs: ls,
                rhs: rs,
                result: ls,
            }),
            (TypeKind::Integer { .. }, TypeKind::Pointer(_)) => Some(CombinedTypes {
                lhs: ls,
                rhs: rs,
                result: rs,
            }),
            (
                TypeKind::Integer {
                    unsigned: lu,
                    width: lw,
                },
                TypeKind::Integer {
                    unsigned: ru,
                    width: rw,
                },
            ) => {
                let (unsigned, width) = promote_integers((lu, lw), (ru, rw));
                let promoted = self.integer(unsigned, width);
                Some(CombinedTypes {
                    lhs: promoted,
                    rhs: promoted,
                    result: promoted,
                })
            }
            _ => None,
        }
    }

    /// Operand types for a comparison, result `Boolean`. Integers use the
    /// same promotion as `+`; booleans compare directly; pointers compare
    /// when their stripped pointees agree.
    pub fn compare_combined(&mut self, lhs: TypeId, rhs: TypeId) -> Option<CombinedTypes> {
        let ls = self.strip_qualifiers(lhs);
        let rs = self.strip_qualifiers(rhs);
        match (self.get(ls).kind, self.get(rs).kind) {
            (TypeKind::Boolean, TypeKind::Boolean) => Some(CombinedTypes {
                lhs: ls,
                rhs: rs,
                result: TypeId::BOOL,
            }),
            (
                TypeKind::Integer {
                    unsigned: lu,
                    width: lw,
                },
                TypeKind::Integer {
                    unsigned: ru,
                    width: rw,
                },
            ) => {
                let (unsigned, width) = promote_integers((lu, lw), (ru, rw));
                let promoted = self.integer(unsigned, width);
                Some(CombinedTypes {
                    lhs: promoted,
                    rhs: promoted,
                    result: TypeId::BOOL,
                })
            }
            (TypeKind::Pointer(lp), TypeKind::Pointer(rp)) => {
                if self.strip_qualifiers(lp) == self.strip_qualifiers(rp) {
                    Some(CombinedTypes {
                        lhs: ls,
                        rhs: rs,
                        result: TypeId::BOOL,
                    })
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Cast legality
    // -----------------------------------------------------------------------

    /// Whether a value of type `from` may be cast to `to`.
    ///
    /// Implicit casts cover qualifier adjustment on the same base type,
    /// integer-to-integer conversion, boolean-to-integer, the null pointer
    /// (typed as pointer-to-void) to any pointer, and pointer-to-pointer
    /// with an identical stripped pointee. Explicit casts additionally
    /// allow integer-pointer conversions in both directions and
    /// pointer/integer to boolean.
    pub fn can_cast(&mut self, from: TypeId, to: TypeId, kind: CastKind) -> bool {
        let fs = self.strip_qualifiers(from);
        let ts = self.strip_qualifiers(to);
        if fs == ts {
            // Same base type; only qualifiers change.
            return true;
        }
        let explicit = kind == CastKind::Explicit;
        match (self.get(fs).kind, self.get(ts).kind) {
            (TypeKind::Integer { .. }, TypeKind::Integer { .. }) => true,
            (TypeKind::Boolean, TypeKind::Integer { .. }) => true,
            (TypeKind::Pointer(fp), TypeKind::Pointer(tp)) => {
                let fp = self.strip_qualifiers(fp);
                let tp = self.strip_qualifiers(tp);
                fp == tp || self.get(fp).kind == TypeKind::Void
            }
            (TypeKind::Integer { .. }, TypeKind::Pointer(_)) => explicit,
            (TypeKind::Pointer(_), TypeKind::Integer { .. }) => explicit,
            (TypeKind::Pointer(_), TypeKind::Boolean) => explicit,
            (TypeKind::Integer { .. }, TypeKind::Boolean) => explicit,
            _ => false,
        }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer promotion for binary arithmetic and comparison.
///
/// Widths below native promote to native; 64-bit operands win over
/// everything; signedness follows the wider operand, with unsignedness
/// sticking only between operands of equal result rank.
pub fn promote_integers(lhs: (bool, IntWidth), rhs: (bool, IntWidth)) -> (bool, IntWidth) {
    use IntWidth::*;
    let (lu, lw) = lhs;
    let (ru, rw) = rhs;
    match lw {
        Int8 | Int16 => match rw {
            Int8 | Int16 => (false, Native),
            Int32 => (ru, Native),
            Int64 | Native => (ru, rw),
        },
        Int32 => match rw {
            Int8 | Int16 => (false, Native),
            Int32 => (lu || ru, Native),
            Int64 | Native => (ru, rw),
        },
        Int64 => match rw {
            Int64 => (lu || ru, Int64),
            _ => (lu, Int64),
        },
        Native => match rw {
            Int8 | Int16 | Int32 => (lu, Native),
            Int64 => (ru, Int64),
            Native => (lu || ru, Native),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn builtins_preregistered() {
        let table = TypeTable::new();
        assert_eq!(table.get(TypeId::VOID).kind, TypeKind::Void);
        assert_eq!(table.get(TypeId::BOOL).kind, TypeKind::Boolean);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn structural_uniquing() {
        let mut table = TypeTable::new();
        let a = table.integer(false, IntWidth::Int32);
        let b = table.integer(false, IntWidth::Int32);
        assert_eq!(a, b);
        let c = table.integer(true, IntWidth::Int32);
        assert_ne!(a, c);

        let pa = table.pointer(a);
        let pb = table.pointer(b);
        assert_eq!(pa, pb);
    }

    #[test]
    fn qualifier_adjusters_are_canonical() {
        let mut table = TypeTable::new();
        let int = table.integer(false, IntWidth::Native);
        let c = table.to_constant(int);
        assert_ne!(int, c);
        assert!(table.get(c).constant);
        // Involution: adjusting twice is the identity.
        assert_eq!(table.to_constant(c), c);
        assert_eq!(table.to_non_constant(c), int);

        let v = table.to_volatile(int);
        let cv = table.to_constant(v);
        let vc = table.to_volatile(c);
        // Qualifier flips commute.
        assert_eq!(cv, vc);
        assert_eq!(table.strip_qualifiers(cv), int);
    }

    #[test]
    fn dereference_only_pointers() {
        let mut table = TypeTable::new();
        let int = table.integer(false, IntWidth::Int32);
        let ptr = table.pointer(int);
        assert_eq!(table.dereference(ptr), Some(int));
        assert_eq!(table.dereference(int), None);
        // A qualified pointer still dereferences to its pointee.
        let cptr = table.to_constant(ptr);
        assert_eq!(table.dereference(cptr), Some(int));
    }

    #[test]
    fn default_values() {
        let mut table = TypeTable::new();
        assert_eq!(table.default_value(TypeId::BOOL), Some(Value::Boolean(false)));
        assert_eq!(table.default_value(TypeId::VOID), None);
        let int8 = table.integer(false, IntWidth::Int8);
        assert_eq!(
            table.default_value(int8),
            Some(Value::Integer(IntValue::new(false, IntWidth::Int8, 0)))
        );
        let ptr = table.pointer(int8);
        assert_eq!(table.default_value(ptr), Some(Value::NullPointer));
    }

    #[test]
    fn pointer_plus_integer_keeps_pointer() {
        let mut table = TypeTable::new();
        let int = table.integer(false, IntWidth::Native);
        let ptr = table.pointer(int);
        let cptr = table.to_constant(ptr);
        let combined = table.arith_combined(cptr, int).unwrap();
        assert_eq!(combined.result, ptr);
        assert_eq!(combined.lhs, ptr);
        assert_eq!(combined.rhs, int);

        let combined = table.arith_combined(int, ptr).unwrap();
        assert_eq!(combined.result, ptr);
    }

    #[test]
    fn narrow_integers_promote_to_native() {
        let mut table = TypeTable::new();
        let i8t = table.integer(false, IntWidth::Int8);
        let u16t = table.integer(true, IntWidth::Int16);
        let combined = table.arith_combined(i8t, u16t).unwrap();
        let native = table.integer(false, IntWidth::Native);
        assert_eq!(combined.result, native);
        assert_eq!(combined.lhs, native);
        assert_eq!(combined.rhs, native);
    }

    #[test]
    fn sixty_four_bit_wins() {
        let mut table = TypeTable::new();
        let i8t = table.integer(false, IntWidth::Int8);
        let u64t = table.integer(true, IntWidth::Int64);
        let combined = table.arith_combined(i8t, u64t).unwrap();
        assert_eq!(combined.result, u64t);

        let i64t = table.integer(false, IntWidth::Int64);
        let native = table.integer(false, IntWidth::Native);
        let combined = table.arith_combined(native, i64t).unwrap();
        assert_eq!(combined.result, i64t);
    }

    #[test]
    fn same_width_unsignedness_sticks() {
        let mut table = TypeTable::new();
        let i32t = table.integer(false, IntWidth::Int32);
        let u32t = table.integer(true, IntWidth::Int32);
        let combined = table.arith_combined(i32t, u32t).unwrap();
        let unative = table.integer(true, IntWidth::Native);
        assert_eq!(combined.result, unative);

        let u64t = table.integer(true, IntWidth::Int64);
        let i64t = table.integer(false, IntWidth::Int64);
        let combined = table.arith_combined(i64t, u64t).unwrap();
        assert_eq!(combined.result, u64t);
    }

    #[test]
    fn incompatible_operands_do_not_combine() {
        let mut table = TypeTable::new();
        let int = table.integer(false, IntWidth::Int32);
        assert!(table.arith_combined(TypeId::BOOL, int).is_none());
        assert!(table.arith_combined(TypeId::VOID, int).is_none());
        let ptr = table.pointer(int);
        let ptr2 = table.pointer(ptr);
        assert!(table.arith_combined(ptr, ptr2).is_none());
    }

    #[test]
    fn compare_combination() {
        let mut table = TypeTable::new();
        assert_eq!(
            table.compare_combined(TypeId::BOOL, TypeId::BOOL).unwrap().result,
            TypeId::BOOL
        );
        let i8t = table.integer(false, IntWidth::Int8);
        let i32t = table.integer(false, IntWidth::Int32);
        let combined = table.compare_combined(i8t, i32t).unwrap();
        let native = table.integer(false, IntWidth::Native);
        assert_eq!(combined.lhs, native);
        assert_eq!(combined.result, TypeId::BOOL);

        let ptr = table.pointer(i32t);
        let cptr = table.to_constant(ptr);
        assert!(table.compare_combined(ptr, cptr).is_some());
        let ptr8 = table.pointer(i8t);
        assert!(table.compare_combined(ptr, ptr8).is_none());
        assert!(table.compare_combined(TypeId::BOOL, i32t).is_none());
    }

    #[test]
    fn implicit_casts() {
        let mut table = TypeTable::new();
        let i8t = table.integer(false, IntWidth::Int8);
        let u64t = table.integer(true, IntWidth::Int64);
        let int = table.integer(false, IntWidth::Native);
        assert!(table.can_cast(i8t, u64t, CastKind::Implicit));
        assert!(table.can_cast(u64t, i8t, CastKind::Implicit));
        assert!(table.can_cast(TypeId::BOOL, int, CastKind::Implicit));

        // Null pointer (pointer to void) coerces to any pointer.
        let null_ty = table.pointer(TypeId::VOID);
        let iptr = table.pointer(int);
        assert!(table.can_cast(null_ty, iptr, CastKind::Implicit));

        // Same stripped pointee, different qualifiers on the pointer.
        let ciptr = table.to_constant(iptr);
        assert!(table.can_cast(iptr, ciptr, CastKind::Implicit));

        // Distinct pointee does not coerce.
        let i8ptr = table.pointer(i8t);
        assert!(!table.can_cast(iptr, i8ptr, CastKind::Implicit));

        // Pointer/integer conversions need an explicit cast.
        assert!(!table.can_cast(iptr, int, CastKind::Implicit));
        assert!(!table.can_cast(int, iptr, CastKind::Implicit));
        assert!(!table.can_cast(iptr, TypeId::BOOL, CastKind::Implicit));
        assert!(!table.can_cast(int, TypeId::BOOL, CastKind::Implicit));
    }

    #[test]
    fn explicit_casts() {
        let mut table = TypeTable::new();
        let int = table.integer(false, IntWidth::Native);
        let iptr = table.pointer(int);
        assert!(table.can_cast(iptr, int, CastKind::Explicit));
        assert!(table.can_cast(int, iptr, CastKind::Explicit));
        assert!(table.can_cast(iptr, TypeId::BOOL, CastKind::Explicit));
        assert!(table.can_cast(int, TypeId::BOOL, CastKind::Explicit));
        // Unrelated pointee types stay illegal even explicitly.
        let i8t = table.integer(false, IntWidth::Int8);
        let i8ptr = table.pointer(i8t);
        assert!(!table.can_cast(iptr, i8ptr, CastKind::Explicit));
        assert!(!table.can_cast(TypeId::VOID, int, CastKind::Explicit));
    }

    // -----------------------------------------------------------------------
    // Property tests
    // -----------------------------------------------------------------------

    fn arb_width() -> impl Strategy<Value = IntWidth> {
        prop_oneof![
            Just(IntWidth::Int8),
            Just(IntWidth::Int16),
            Just(IntWidth::Int32),
            Just(IntWidth::Int64),
            Just(IntWidth::Native),
        ]
    }

    fn arb_kind() -> impl Strategy<Value = TypeKind> {
        prop_oneof![
            Just(TypeKind::Void),
            Just(TypeKind::Boolean),
            (any::<bool>(), arb_width())
                .prop_map(|(unsigned, width)| TypeKind::Integer { unsigned, width }),
        ]
    }

    proptest! {
        #[test]
        fn uniquing_structural_equality_is_identity(
            kind in arb_kind(),
            constant in any::<bool>(),
            volatile in any::<bool>(),
            depth in 0usize..4,
        ) {
            let mut table = TypeTable::new();
            let build = |table: &mut TypeTable| {
                let mut id = table.intern(TypeDesc { kind, constant, volatile });
                for _ in 0..depth {
                    id = table.pointer(id);
                }
                id
            };
            let a = build(&mut table);
            let b = build(&mut table);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn qualifier_flips_commute_and_are_involutive(
            kind in arb_kind(),
        ) {
            let mut table = TypeTable::new();
            let base = table.intern(TypeDesc::unqualified(kind));
            let c = table.to_constant(base);
            prop_assert_eq!(table.to_constant(c), c);
            let nc = table.to_non_constant(c);
            prop_assert_eq!(nc, base);
            let v1 = table.to_volatile(c);
            let vb = table.to_volatile(base);
            let c1 = table.to_constant(vb);
            prop_assert_eq!(v1, c1);
        }

        #[test]
        fn promotion_never_narrows_below_native(
            lu in any::<bool>(), lw in arb_width(),
            ru in any::<bool>(), rw in arb_width(),
        ) {
            let (_, width) = promote_integers((lu, lw), (ru, rw));
            prop_assert!(matches!(width, IntWidth::Int64 | IntWidth::Native));
        }

        #[test]
        fn sixty_four_bit_operand_forces_sixty_four_bit_result(
            lu in any::<bool>(),
            ru in any::<bool>(), rw in arb_width(),
        ) {
            let (_, width) = promote_integers((lu, IntWidth::Int64), (ru, rw));
            prop_assert_eq!(width, IntWidth::Int64);
            let (_, width) = promote_integers((ru, rw), (lu, IntWidth::Int64));
            prop_assert_eq!(width, IntWidth::Int64);
        }
    }
}
