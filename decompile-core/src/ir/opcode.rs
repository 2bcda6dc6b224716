//! The p-code opcode set and its behavior tables.
//!
//! Cranelift encodes its opcode-specific behavior as a closed tagged variant
//! with per-variant tables generated at build time
//! (`cranelift-codegen-meta`/`instructions.rs`). Our opcode set is fixed and
//! an order of magnitude smaller, so we hand-write the table the same way
//! cranelift-codegen hand-writes e.g. `condcodes.rs`, instead of adding a
//! build-time code generator for ~75 entries.

use std::fmt;

/// The p-code opcode set, ~75 entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum OpCode {
    Copy,
    Load,
    Store,
    SubPiece,
    Piece,

    Branch,
    CBranch,
    BranchInd,
    Call,
    CallInd,
    CallOther,
    Return,

    IntAdd,
    IntSub,
    IntMult,
    IntDiv,
    IntSDiv,
    IntRem,
    IntSRem,
    IntAnd,
    IntOr,
    IntXor,
    IntNegate,
    Int2Comp,
    IntLeft,
    IntRight,
    IntSRight,
    IntEqual,
    IntNotEqual,
    IntLess,
    IntLessEqual,
    IntSLess,
    IntSLessEqual,
    IntCarry,
    IntSCarry,
    IntSBorrow,

    IntZExt,
    IntSExt,

    BoolAnd,
    BoolOr,
    BoolXor,
    BoolNegate,

    FloatAdd,
    FloatSub,
    FloatMult,
    FloatDiv,
    FloatNeg,
    FloatAbs,
    FloatSqrt,
    FloatEqual,
    FloatNotEqual,
    FloatLess,
    FloatLessEqual,
    FloatNan,
    Float2Float,
    TruncToInt,
    IntToFloat,
    FloatCeil,
    FloatFloor,
    FloatRound,

    PtrAdd,
    PtrSub,

    MultiEqual,
    Indirect,
    Cast,

    SegmentOp,
    CPoolRef,
    New,
    Insert,
    Extract,
    PopCount,
    LzCount,
}

/// Algebraic/behavioral flags attached to every opcode, hand
/// bit-packed the way `ir/memflags.rs` packs `MemFlags` instead of deriving
/// from the `bitflags` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpFlags(u16);

impl OpFlags {
    pub const COMMUTATIVE: OpFlags = OpFlags(1 << 0);
    pub const UNARY: OpFlags = OpFlags(1 << 1);
    pub const BINARY: OpFlags = OpFlags(1 << 2);
    pub const TERNARY: OpFlags = OpFlags(1 << 3);
    pub const SPECIAL: OpFlags = OpFlags(1 << 4);
    pub const MARKER: OpFlags = OpFlags(1 << 5);
    pub const BOOL_OUTPUT: OpFlags = OpFlags(1 << 6);
    pub const BRANCH: OpFlags = OpFlags(1 << 7);
    pub const CALL: OpFlags = OpFlags(1 << 8);
    pub const ARITHMETIC: OpFlags = OpFlags(1 << 9);
    pub const SHIFT: OpFlags = OpFlags(1 << 10);
    pub const LOGICAL: OpFlags = OpFlags(1 << 11);
    pub const FLOATING_POINT: OpFlags = OpFlags(1 << 12);
    pub const INHERITS_SIGN: OpFlags = OpFlags(1 << 13);
    pub const INHERITS_SIGN_FIRST_PARAM_ONLY: OpFlags = OpFlags(1 << 14);

    pub const fn empty() -> Self {
        OpFlags(0)
    }

    pub const fn union(self, other: Self) -> Self {
        OpFlags(self.0 | other.0)
    }

    pub fn contains(self, bit: Self) -> bool {
        self.0 & bit.0 == bit.0
    }
}

impl std::ops::BitOr for OpFlags {
    type Output = OpFlags;
    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// How many fixed input slots an opcode expects, or `None` for the
/// variable-arity ops (`CALL`, `CALLOTHER`, `BRANCHIND` switch forms,
/// `MULTIEQUAL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(u8),
    Variable,
}

/// Per-opcode static behavior, computed once and looked up by [`OpCode::behavior`].
pub struct Behavior {
    pub flags: OpFlags,
    pub arity: Arity,
    pub has_output: bool,
}

macro_rules! behavior_table {
    ($($op:ident => { flags: $flags:expr, arity: $arity:expr, out: $out:expr $(,)? }),* $(,)?) => {
        impl OpCode {
            /// Static behavior table covering the per-opcode hook bundle,
            /// minus the type-inference/emission hooks, which live in
            /// `crate::types` and the emitter respectively.
            pub fn behavior(self) -> Behavior {
                match self {
                    $(OpCode::$op => Behavior { flags: $flags, arity: $arity, has_output: $out },)*
                }
            }
        }
    };
}

use Arity::*;
use OpFlags as F;

behavior_table! {
    Copy => { flags: F::empty(), arity: Fixed(1), out: true },
    Load => { flags: F::SPECIAL, arity: Fixed(2), out: true },
    Store => { flags: F::SPECIAL, arity: Fixed(3), out: false },
    SubPiece => { flags: F::empty(), arity: Fixed(2), out: true },
    Piece => { flags: F::empty(), arity: Fixed(2), out: true },

    Branch => { flags: F::BRANCH.union(F::SPECIAL), arity: Fixed(1), out: false },
    CBranch => { flags: F::BRANCH.union(F::SPECIAL), arity: Fixed(2), out: false },
    BranchInd => { flags: F::BRANCH.union(F::SPECIAL), arity: Fixed(1), out: false },
    Call => { flags: F::CALL.union(F::SPECIAL), arity: Variable, out: true },
    CallInd => { flags: F::CALL.union(F::SPECIAL), arity: Variable, out: true },
    CallOther => { flags: F::SPECIAL, arity: Variable, out: true },
    Return => { flags: F::SPECIAL, arity: Variable, out: false },

    IntAdd => { flags: F::COMMUTATIVE.union(F::ARITHMETIC), arity: Fixed(2), out: true },
    IntSub => { flags: F::ARITHMETIC, arity: Fixed(2), out: true },
    IntMult => { flags: F::COMMUTATIVE.union(F::ARITHMETIC), arity: Fixed(2), out: true },
    IntDiv => { flags: F::ARITHMETIC, arity: Fixed(2), out: true },
    IntSDiv => { flags: F::ARITHMETIC.union(F::INHERITS_SIGN), arity: Fixed(2), out: true },
    IntRem => { flags: F::ARITHMETIC, arity: Fixed(2), out: true },
    IntSRem => { flags: F::ARITHMETIC.union(F::INHERITS_SIGN), arity: Fixed(2), out: true },
    IntAnd => { flags: F::COMMUTATIVE.union(F::LOGICAL), arity: Fixed(2), out: true },
    IntOr => { flags: F::COMMUTATIVE.union(F::LOGICAL), arity: Fixed(2), out: true },
    IntXor => { flags: F::COMMUTATIVE.union(F::LOGICAL), arity: Fixed(2), out: true },
    IntNegate => { flags: F::LOGICAL, arity: Fixed(1), out: true },
    Int2Comp => { flags: F::ARITHMETIC, arity: Fixed(1), out: true },
    IntLeft => { flags: F::SHIFT, arity: Fixed(2), out: true },
    IntRight => { flags: F::SHIFT, arity: Fixed(2), out: true },
    IntSRight => { flags: F::SHIFT.union(F::INHERITS_SIGN_FIRST_PARAM_ONLY), arity: Fixed(2), out: true },
    IntEqual => { flags: F::COMMUTATIVE.union(F::BOOL_OUTPUT), arity: Fixed(2), out: true },
    IntNotEqual => { flags: F::COMMUTATIVE.union(F::BOOL_OUTPUT), arity: Fixed(2), out: true },
    IntLess => { flags: F::BOOL_OUTPUT, arity: Fixed(2), out: true },
    IntLessEqual => { flags: F::BOOL_OUTPUT, arity: Fixed(2), out: true },
    IntSLess => { flags: F::BOOL_OUTPUT.union(F::INHERITS_SIGN), arity: Fixed(2), out: true },
    IntSLessEqual => { flags: F::BOOL_OUTPUT.union(F::INHERITS_SIGN), arity: Fixed(2), out: true },
    IntCarry => { flags: F::COMMUTATIVE.union(F::BOOL_OUTPUT), arity: Fixed(2), out: true },
    IntSCarry => { flags: F::COMMUTATIVE.union(F::BOOL_OUTPUT), arity: Fixed(2), out: true },
    IntSBorrow => { flags: F::BOOL_OUTPUT, arity: Fixed(2), out: true },

    IntZExt => { flags: F::empty(), arity: Fixed(1), out: true },
    IntSExt => { flags: F::INHERITS_SIGN, arity: Fixed(1), out: true },

    BoolAnd => { flags: F::COMMUTATIVE.union(F::BOOL_OUTPUT), arity: Fixed(2), out: true },
    BoolOr => { flags: F::COMMUTATIVE.union(F::BOOL_OUTPUT), arity: Fixed(2), out: true },
    BoolXor => { flags: F::COMMUTATIVE.union(F::BOOL_OUTPUT), arity: Fixed(2), out: true },
    BoolNegate => { flags: F::BOOL_OUTPUT, arity: Fixed(1), out: true },

    FloatAdd => { flags: F::COMMUTATIVE.union(F::FLOATING_POINT), arity: Fixed(2), out: true },
    FloatSub => { flags: F::FLOATING_POINT, arity: Fixed(2), out: true },
    FloatMult => { flags: F::COMMUTATIVE.union(F::FLOATING_POINT), arity: Fixed(2), out: true },
    FloatDiv => { flags: F::FLOATING_POINT, arity: Fixed(2), out: true },
    FloatNeg => { flags: F::FLOATING_POINT, arity: Fixed(1), out: true },
    FloatAbs => { flags: F::FLOATING_POINT, arity: Fixed(1), out: true },
    FloatSqrt => { flags: F::FLOATING_POINT, arity: Fixed(1), out: true },
    FloatEqual => { flags: F::COMMUTATIVE.union(F::FLOATING_POINT).union(F::BOOL_OUTPUT), arity: Fixed(2), out: true },
    FloatNotEqual => { flags: F::COMMUTATIVE.union(F::FLOATING_POINT).union(F::BOOL_OUTPUT), arity: Fixed(2), out: true },
    FloatLess => { flags: F::FLOATING_POINT.union(F::BOOL_OUTPUT), arity: Fixed(2), out: true },
    FloatLessEqual => { flags: F::FLOATING_POINT.union(F::BOOL_OUTPUT), arity: Fixed(2), out: true },
    FloatNan => { flags: F::FLOATING_POINT.union(F::BOOL_OUTPUT), arity: Fixed(1), out: true },
    Float2Float => { flags: F::FLOATING_POINT, arity: Fixed(1), out: true },
    TruncToInt => { flags: F::FLOATING_POINT, arity: Fixed(1), out: true },
    IntToFloat => { flags: F::FLOATING_POINT, arity: Fixed(1), out: true },
    FloatCeil => { flags: F::FLOATING_POINT, arity: Fixed(1), out: true },
    FloatFloor => { flags: F::FLOATING_POINT, arity: Fixed(1), out: true },
    FloatRound => { flags: F::FLOATING_POINT, arity: Fixed(1), out: true },

    PtrAdd => { flags: F::ARITHMETIC, arity: Fixed(3), out: true },
    PtrSub => { flags: F::ARITHMETIC, arity: Fixed(2), out: true },

    MultiEqual => { flags: F::MARKER, arity: Variable, out: true },
    Indirect => { flags: F::MARKER.union(F::SPECIAL), arity: Fixed(2), out: true },
    Cast => { flags: F::empty(), arity: Fixed(1), out: true },

    SegmentOp => { flags: F::SPECIAL, arity: Fixed(3), out: true },
    CPoolRef => { flags: F::SPECIAL, arity: Variable, out: true },
    New => { flags: F::SPECIAL, arity: Variable, out: true },
    Insert => { flags: F::empty(), arity: Fixed(4), out: true },
    Extract => { flags: F::empty(), arity: Fixed(3), out: true },
    PopCount => { flags: F::empty(), arity: Fixed(1), out: true },
    LzCount => { flags: F::empty(), arity: Fixed(1), out: true },
}

impl OpCode {
    pub fn is_commutative(self) -> bool {
        self.behavior().flags.contains(OpFlags::COMMUTATIVE)
    }
    pub fn is_marker(self) -> bool {
        self.behavior().flags.contains(OpFlags::MARKER)
    }
    pub fn is_branch(self) -> bool {
        self.behavior().flags.contains(OpFlags::BRANCH)
    }
    pub fn is_call(self) -> bool {
        self.behavior().flags.contains(OpFlags::CALL)
    }
    pub fn has_side_effects(self) -> bool {
        self.behavior().flags.contains(OpFlags::SPECIAL)
    }
    pub fn produces_bool(self) -> bool {
        self.behavior().flags.contains(OpFlags::BOOL_OUTPUT)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_add_is_commutative_arithmetic() {
        let b = OpCode::IntAdd.behavior();
        assert!(b.flags.contains(OpFlags::COMMUTATIVE));
        assert!(b.flags.contains(OpFlags::ARITHMETIC));
        assert_eq!(b.arity, Arity::Fixed(2));
    }

    #[test]
    fn int_sub_is_not_commutative() {
        assert!(!OpCode::IntSub.is_commutative());
    }

    #[test]
    fn multiequal_is_marker_with_variable_arity() {
        let b = OpCode::MultiEqual.behavior();
        assert!(b.flags.contains(OpFlags::MARKER));
        assert_eq!(b.arity, Arity::Variable);
    }

    #[test]
    fn call_has_side_effects() {
        assert!(OpCode::Call.has_side_effects());
        assert!(OpCode::CallInd.has_side_effects());
    }
}
