//! Type propagation. Grounded on cranelift-codegen's worklist-based
//! `egraph`/GVN traversal shape in `cranelift-codegen/src/egraph.rs` for the
//! "visit, project, take iff strictly more specific" pattern, generalised
//! from value-numbering to directional type projection across op edges.

use crate::ir::entities::{OpId, VarnodeId};
use crate::ir::funcdata::Funcdata;
use crate::ir::opcode::OpCode;
use crate::types::datatype::TypeStore;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Per-edge type push, the return value of an opcode's `propagateType`
/// hook ("propagateType(src, op, invn, outvn, inslot, outslot)").
pub fn propagate_type(
    store: &TypeStore,
    func: &Funcdata,
    op: OpId,
    from_slot: Option<usize>,
    to_slot: Option<usize>,
) -> Option<crate::types::datatype::TypeId> {
    let pcode = func.op(op);
    let from_ty = match from_slot {
        Some(slot) => func.varnode(pcode.inputs[slot]).local_type?,
        None => func.varnode(pcode.output?).local_type?,
    };
    match pcode.opcode {
        OpCode::Copy | OpCode::Cast => Some(from_ty),
        OpCode::IntAdd | OpCode::IntSub if to_slot.is_none() => {
            let dt = store.get(from_ty);
            if dt.is_pointer() {
                Some(from_ty)
            } else {
                None
            }
        }
        OpCode::PtrAdd | OpCode::PtrSub => Some(from_ty),
        _ => None,
    }
}

/// Depth-first, both-directions traversal over op edges, reattempting a
/// propagation only while it strictly refines the destination's current
/// type, up to a fixed `max_iterations` budget.
///
/// Returns `Ok(passes_run)` on convergence, `Err(RecoveryExceeded)` if the
/// budget was exhausted — callers still keep whatever types were written so
/// far rather than rolling back.
pub fn run_propagation(
    store: &TypeStore,
    func: &mut Funcdata,
    max_iterations: u32,
) -> Result<u32, crate::error::DecompileError> {
    let mut queue: VecDeque<VarnodeId> = func.varnode_ids().collect();
    let mut queued: FxHashSet<VarnodeId> = queue.iter().copied().collect();
    let mut iterations = 0u32;

    while let Some(vn) = queue.pop_front() {
        queued.remove(&vn);
        iterations += 1;
        if iterations > max_iterations {
            return Err(crate::error::DecompileError::RecoveryExceeded(
                crate::error::RecoveryExceeded { analysis: "type propagation", iterations },
            ));
        }
        if func.varnode(vn).stops_propagation {
            continue;
        }
        let readers = func.varnode(vn).descendants_snapshot();
        for op in readers {
            let slot = func.op(op).inputs.iter().position(|&i| i == vn);
            let Some(slot) = slot else { continue };
            let Some(proposed) = propagate_type(store, func, op, Some(slot), None) else {
                continue;
            };
            if let Some(out) = func.op(op).output {
                let current = func.varnode(out).local_type;
                let accept = match current {
                    None => true,
                    Some(cur) => store.at_least_as_specific(proposed, cur) && cur != proposed,
                };
                if accept {
                    func.varnode_mut(out).local_type = Some(proposed);
                    if !queued.contains(&out) {
                        queue.push_back(out);
                        queued.insert(out);
                    }
                }
            }
        }
        if let Some(def) = func.varnode(vn).def {
            if let Some(proposed) = propagate_type(store, func, def, None, None) {
                for slot in 0..func.op(def).inputs.len() {
                    let input = func.op(def).inputs[slot];
                    let current = func.varnode(input).local_type;
                    let accept = match current {
                        None => true,
                        Some(cur) => store.at_least_as_specific(proposed, cur) && cur != proposed,
                    };
                    if accept && !func.varnode(input).stops_propagation {
                        func.varnode_mut(input).local_type = Some(proposed);
                        if !queued.contains(&input) {
                            queue.push_back(input);
                            queued.insert(input);
                        }
                    }
                }
            }
        }
    }
    Ok(iterations)
}
