//! FuncProto and the active-trial machinery for parameter recovery.
//! Grounded on `cranelift-codegen/src/ir/function.rs`'s `Signature`/
//! `AbiParam` pair for the "ordered parameter list plus per-param
//! extension/location metadata" shape, generalised to the trial-based
//! recovery process Ghidra runs when a function's true signature isn't
//! known up front, which Cranelift (always given a known signature) never
//! needs.

use crate::ir::address::Address;
use crate::types::datatype::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    None,
    Zero,
    Sign,
}

/// What happens to a storage location across a call: left alone, killed,
/// holding the return address, or needing a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEffect {
    Unaffected,
    Killed,
    ReturnAddress,
    Reload,
}

#[derive(Debug, Clone)]
pub struct EffectRecord {
    pub addr: Address,
    pub size: u32,
    pub effect: CallEffect,
}

#[derive(Debug, Clone)]
pub struct FormalParam {
    pub name: String,
    pub ty: TypeId,
    pub storage: Address,
    pub size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrototypeFlags(u32);

impl PrototypeFlags {
    pub const TYPE_LOCK: Self = Self(1 << 0);
    pub const INPUT_LOCK: Self = Self(1 << 1);
    pub const OUTPUT_LOCK: Self = Self(1 << 2);
    pub const VARARGS: Self = Self(1 << 3);

    pub const fn empty() -> Self {
        Self(0)
    }
    pub fn set(&mut self, bit: Self) {
        self.0 |= bit.0;
    }
    pub fn contains(self, bit: Self) -> bool {
        self.0 & bit.0 == bit.0
    }
}

/// A function's calling-convention-resolved signature.
#[derive(Debug, Clone)]
pub struct FuncProto {
    pub model_name: String,
    pub inputs: Vec<FormalParam>,
    pub output: Option<FormalParam>,
    /// Number of extra stack words the callee pops (x86 `ret N` style).
    pub extrapop: i32,
    pub effects: Vec<EffectRecord>,
    pub flags: PrototypeFlags,
}

impl FuncProto {
    pub fn unknown(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            inputs: Vec::new(),
            output: None,
            extrapop: 0,
            effects: Vec::new(),
            flags: PrototypeFlags::empty(),
        }
    }

    pub fn is_input_locked(&self) -> bool {
        self.flags.contains(PrototypeFlags::INPUT_LOCK)
    }
    pub fn is_output_locked(&self) -> bool {
        self.flags.contains(PrototypeFlags::OUTPUT_LOCK)
    }
}

/// How confident the recovery process is that a trial names a real
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialStatus {
    /// Proposed but not yet observed to be read.
    Proposed,
    /// Reached by a use at the call site.
    Active,
    /// Survived the model's `deriveInputMap`/`deriveOutputMap` filter.
    Used,
    /// Refinement has run long enough that the status is considered final.
    FullyChecked,
}

/// One candidate (address, size) storage location that might carry a
/// parameter at an unresolved or partially-resolved call site.
#[derive(Debug, Clone)]
pub struct ParamTrial {
    pub address: Address,
    pub size: u32,
    pub status: TrialStatus,
    /// Index into the calling model's ordered slot list.
    pub slot: usize,
}

impl ParamTrial {
    pub fn new(address: Address, size: u32, slot: usize) -> Self {
        Self { address, size, status: TrialStatus::Proposed, slot }
    }

    pub fn mark_active(&mut self) {
        if self.status == TrialStatus::Proposed {
            self.status = TrialStatus::Active;
        }
    }
}

/// Backward walk through PHIs verifying a candidate return-storage
/// varnode is plausibly definable on every path reaching the RETURN.
/// `is_plausible_def` decides
/// whether a non-PHI defining op counts as a real definition (as opposed
/// to e.g. an uninitialised read of a caller-saved register).
pub fn ancestor_realistic(
    func: &crate::ir::funcdata::Funcdata,
    start: crate::ir::entities::VarnodeId,
    is_plausible_def: impl Fn(&crate::ir::pcodeop::PcodeOp) -> bool,
) -> bool {
    let mut stack = vec![start];
    let mut seen = std::collections::HashSet::new();
    while let Some(vn) = stack.pop() {
        if !seen.insert(vn) {
            continue;
        }
        match func.varnode(vn).def {
            None => return false, // reaches a bare input with no definition: not realistic
            Some(def) => {
                let op = func.op(def);
                if op.opcode == crate::ir::opcode::OpCode::MultiEqual {
                    stack.extend(op.inputs.iter().copied());
                } else if !is_plausible_def(op) {
                    return false;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_activates_only_from_proposed() {
        let mut t = ParamTrial::new(Address::new(1, 0), 4, 0);
        t.mark_active();
        assert_eq!(t.status, TrialStatus::Active);
        t.status = TrialStatus::FullyChecked;
        t.mark_active();
        assert_eq!(t.status, TrialStatus::FullyChecked);
    }

    #[test]
    fn unknown_proto_has_no_locks() {
        let proto = FuncProto::unknown("default");
        assert!(!proto.is_input_locked());
        assert!(!proto.is_output_locked());
    }
}
