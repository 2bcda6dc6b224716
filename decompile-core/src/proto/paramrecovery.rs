//! ActionActiveParam / ActionActiveReturn and double-parameter detection
//!. Grounded on the trial data carried by
//! [`crate::proto::callspec::FuncCallSpecs`] and the `deriveInputMap`/
//! `deriveOutputMap` contract of [`crate::arch::PrototypeModel`].

use crate::arch::PrototypeModel;
use crate::ir::entities::{OpId, VarnodeId};
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use crate::proto::callspec::FuncCallSpecs;
use crate::proto::prototype::{ParamTrial, TrialStatus};

/// Build the initial trial set for `call` from the model's canonical slot
/// ordering, marking each trial active if a use already reaches it
/// ("a trial is marked active if reached by a use").
pub fn seed_trials(func: &Funcdata, call: OpId, model: &dyn PrototypeModel) -> Vec<ParamTrial> {
    model
        .candidate_input_slots()
        .into_iter()
        .enumerate()
        .map(|(slot, (addr, size))| {
            let mut trial = ParamTrial::new(addr, size, slot);
            let reached = func
                .op(call)
                .inputs
                .iter()
                .any(|&vn| func.varnode(vn).addr == addr && func.varnode(vn).size == size);
            if reached {
                trial.mark_active();
            }
            trial
        })
        .collect()
}

/// Filter trials through the model's `deriveInputMap`, demoting any the
/// model rejects back to not-used, and promoting survivors to `Used`
/// ("used if not eliminated by the model's deriveMap").
pub fn refine_trials(trials: &mut [ParamTrial], model: &dyn PrototypeModel) {
    let kept = model.derive_input_map(trials);
    for (i, trial) in trials.iter_mut().enumerate() {
        if trial.status == TrialStatus::Active {
            trial.status = if kept.contains(&i) { TrialStatus::Used } else { TrialStatus::FullyChecked };
        }
    }
}

/// Once every trial is `FullyChecked`, commit the call's formal parameter
/// list by rewriting its input operands to exactly the `Used` trials, in
/// slot order ("assigns formal parameters, rewriting the CALL op
/// with the chosen inputs").
pub fn commit_call_params(func: &mut Funcdata, spec: &FuncCallSpecs) {
    debug_assert!(spec.all_trials_fully_checked());
    let mut used: Vec<&ParamTrial> =
        spec.active_trials.iter().filter(|t| t.status == TrialStatus::Used).collect();
    used.sort_by_key(|t| t.slot);
    let inputs: Vec<VarnodeId> = used
        .iter()
        .map(|t| {
            func.varnodes_in_range(t.address, t.size)
                .into_iter()
                .next()
                .unwrap_or_else(|| func.new_varnode(t.size, t.address))
        })
        .collect();
    let call_target = func.op(spec.call_op).inputs[0];
    let mut full_inputs = vec![call_target];
    full_inputs.extend(inputs);
    func.op_set_all_input(spec.call_op, &full_inputs);
}

/// Build the initial return-value trial set for the current function from
/// the model's canonical output slots, marking each active if some
/// `RETURN` op's inputs already reach it. Mirrors [`seed_trials`] but reads
/// every `RETURN` op in the function rather than one call site's inputs,
/// since a function's own return value isn't tied to a single op.
pub fn seed_return_trials(func: &Funcdata, model: &dyn PrototypeModel) -> Vec<ParamTrial> {
    let returns: Vec<OpId> = func
        .block_graph()
        .blocks()
        .flat_map(|b| func.live_ops_in_block(b))
        .filter(|&op| func.op(op).opcode == OpCode::Return)
        .collect();
    model
        .candidate_output_slots()
        .into_iter()
        .enumerate()
        .map(|(slot, (addr, size))| {
            let mut trial = ParamTrial::new(addr, size, slot);
            let reached = returns.iter().any(|&op| {
                func.op(op)
                    .inputs
                    .iter()
                    .any(|&vn| func.varnode(vn).addr == addr && func.varnode(vn).size == size)
            });
            if reached {
                trial.mark_active();
            }
            trial
        })
        .collect()
}

/// Filter return trials through the model's `deriveOutputMap`, the output
/// counterpart of [`refine_trials`].
pub fn refine_return_trials(trials: &mut [ParamTrial], model: &dyn PrototypeModel) {
    let kept = model.derive_output_map(trials);
    for (i, trial) in trials.iter_mut().enumerate() {
        if trial.status == TrialStatus::Active {
            trial.status = if kept.contains(&i) { TrialStatus::Used } else { TrialStatus::FullyChecked };
        }
    }
}

/// Double-parameter detection: if a PIECE feeding `call`
/// combines exactly the trials at `lo_slot`/`hi_slot`, merge them into one
/// wide trial occupying `lo_slot`.
pub fn merge_piece_trials(
    func: &Funcdata,
    call: OpId,
    trials: &mut Vec<ParamTrial>,
    lo_slot: usize,
    hi_slot: usize,
) -> bool {
    let piece_input = func
        .op(call)
        .inputs
        .iter()
        .find(|&&vn| {
            func.varnode(vn)
                .def
                .map(|d| func.op(d).opcode == OpCode::Piece)
                .unwrap_or(false)
        })
        .copied();
    let Some(piece_vn) = piece_input else { return false };
    let piece_op = func.op(func.varnode(piece_vn).def.unwrap());
    let (hi_in, lo_in) = (piece_op.inputs[0], piece_op.inputs[1]);
    let lo_trial = trials.iter().find(|t| t.slot == lo_slot);
    let hi_trial = trials.iter().find(|t| t.slot == hi_slot);
    let (Some(lo), Some(hi)) = (lo_trial, hi_trial) else { return false };
    let matches = func.varnode(lo_in).size == lo.size
        && func.varnode(hi_in).size == hi.size
        && func.varnode(lo_in).addr == lo.address
        && func.varnode(hi_in).addr == hi.address;
    if !matches {
        return false;
    }
    let combined_size = lo.size + hi.size;
    let combined_addr = lo.address;
    trials.retain(|t| t.slot != hi_slot);
    if let Some(t) = trials.iter_mut().find(|t| t.slot == lo_slot) {
        t.size = combined_size;
        t.address = combined_addr;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::address::Address;

    #[test]
    fn seed_trial_marks_active_when_reached() {
        let trial = ParamTrial::new(Address::new(1, 0), 4, 0);
        assert_eq!(trial.status, TrialStatus::Proposed);
    }
}
