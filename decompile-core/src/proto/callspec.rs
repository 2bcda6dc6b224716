//! FuncCallSpecs: per-call-site recovery state ("FuncCallSpecs").

use crate::ir::address::Address;
use crate::ir::entities::OpId;
use crate::proto::prototype::{FuncProto, ParamTrial};

/// A call site's resolved (or in-progress) prototype, distinguished from
/// `FuncProto::unknown` so call sites can tell "we have a real signature"
/// from "recovery hasn't committed to one yet" ("pointer to
/// resolved prototype, or a model-unknown placeholder").
#[derive(Debug, Clone)]
pub enum ResolvedProto {
    Resolved(FuncProto),
    ModelUnknown(FuncProto),
}

impl ResolvedProto {
    pub fn proto(&self) -> &FuncProto {
        match self {
            ResolvedProto::Resolved(p) | ResolvedProto::ModelUnknown(p) => p,
        }
    }
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolvedProto::Resolved(_))
    }
}

#[derive(Debug, Clone)]
pub struct FuncCallSpecs {
    pub call_op: OpId,
    pub proto: ResolvedProto,
    pub active_trials: Vec<ParamTrial>,
    pub return_trials: Vec<ParamTrial>,
    /// Per-input consumed-byte hint from the callee prototype, indexed like
    /// `active_trials` ("per-input consumed-byte hints").
    pub consumed_hints: Vec<Option<u32>>,
    /// Known spacebase (stack pointer) offset at the call site, once
    /// `ActionStackPtrFlow` has run.
    pub spacebase_offset: Option<i64>,
    pub call_addr: Address,
}

impl FuncCallSpecs {
    pub fn new(call_op: OpId, call_addr: Address, model_name: impl Into<String>) -> Self {
        Self {
            call_op,
            proto: ResolvedProto::ModelUnknown(FuncProto::unknown(model_name)),
            active_trials: Vec::new(),
            return_trials: Vec::new(),
            consumed_hints: Vec::new(),
            spacebase_offset: None,
            call_addr,
        }
    }

    pub fn resolve(&mut self, proto: FuncProto) {
        self.proto = ResolvedProto::Resolved(proto);
    }

    pub fn all_trials_fully_checked(&self) -> bool {
        self.active_trials
            .iter()
            .chain(self.return_trials.iter())
            .all(|t| t.status == crate::proto::prototype::TrialStatus::FullyChecked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cranelift_entity::EntityRef;

    #[test]
    fn new_call_spec_starts_model_unknown() {
        let spec = FuncCallSpecs::new(OpId::new(0), Address::new(1, 0), "default");
        assert!(!spec.proto.is_resolved());
    }

    #[test]
    fn resolve_switches_to_resolved() {
        let mut spec = FuncCallSpecs::new(OpId::new(0), Address::new(1, 0), "default");
        spec.resolve(FuncProto::unknown("default"));
        assert!(spec.proto.is_resolved());
    }
}
