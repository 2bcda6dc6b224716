//! Owns the universal action tree and the named subsets carved out of it
//! (`ActionDatabase`). Grounded on the fixed, ordered pipeline
//! `cranelift-codegen/src/context.rs::Context::compile` wires up, but here
//! the pipeline is data (a tree of [`Action`]s) rather than a hard-coded
//! call sequence, since Ghidra's decompiler needs named, prunable subsets
//! (`"decompile"`, `"jumptable"`, `"normalize"`, `"paramid"`, `"register"`,
//! `"firstpass"`).

use crate::action::{Action, ActionFlags, ActionGroup};
use crate::arch::{CommentDatabase, PrototypeModel};
use crate::casts::ActionSetCasts;
use crate::dataflow::{condconst, consume, heritage, nonzero};
use crate::error::DecompileError;
use crate::ir::address::Address;
use crate::ir::entities::VarnodeId;
use crate::ir::funcdata::Funcdata;
use crate::proto::paramrecovery;
use crate::proto::stackptr::StackPtrFlow;
use crate::rule::RulePool;
use crate::types::datatype::TypeStore;
use crate::types::propagate::run_propagation;
use std::cell::RefCell;
use std::rc::Rc;

/// A leaf action wired directly to one of the crate's concrete passes
/// (heritage, consume-mask liveness, non-zero mask, conditional constant
/// propagation). These are the universal tree's real work; the remaining
/// named steps that have no in-scope implementation are filed as
/// [`StructuralPlaceholder`]s so the tree's *shape*, which callers must
/// reproduce faithfully, stays intact even where a step is out of this
/// crate's scope (external block structurer, jump-table labelling, dynamic
/// symbol mapping, and the like; see DESIGN.md).
struct HeritageStep {
    /// Every `(space, addr, size)` storage location heritage should run
    /// over this pass, supplied by the caller (normally every distinct
    /// write location discovered in the current function).
    locations: Vec<(u32, Address, u32)>,
}

impl Action for HeritageStep {
    fn name(&self) -> &'static str {
        "heritage"
    }
    fn group_tag(&self) -> &'static str {
        "decompile"
    }
    fn apply(&mut self, func: &mut Funcdata) -> Result<u32, crate::error::DecompileError> {
        func.ensure_domtree();
        let mut inserted = 0usize;
        for &(space, addr, size) in &self.locations {
            let tier = heritage::HeritageTier { space };
            inserted += heritage::heritage_location(func, &tier, addr, size);
        }
        func.heritage_pass += 1;
        Ok(inserted as u32)
    }
}

struct DeadCodeStep;
impl Action for DeadCodeStep {
    fn name(&self) -> &'static str {
        "deadcode"
    }
    fn group_tag(&self) -> &'static str {
        "decompile"
    }
    fn flags(&self) -> ActionFlags {
        ActionFlags::RESTART_GROUP
    }
    fn apply(&mut self, func: &mut Funcdata) -> Result<u32, crate::error::DecompileError> {
        Ok(consume::run_dead_code(func) as u32)
    }
}

struct NonZeroMaskStep;
impl Action for NonZeroMaskStep {
    fn name(&self) -> &'static str {
        "nonzeromask"
    }
    fn group_tag(&self) -> &'static str {
        "decompile"
    }
    fn apply(&mut self, func: &mut Funcdata) -> Result<u32, crate::error::DecompileError> {
        Ok(nonzero::run_nonzero(func))
    }
}

struct CondConstStep;
impl Action for CondConstStep {
    fn name(&self) -> &'static str {
        "condconst"
    }
    fn group_tag(&self) -> &'static str {
        "decompile"
    }
    fn flags(&self) -> ActionFlags {
        ActionFlags::RESTART_GROUP
    }
    fn apply(&mut self, func: &mut Funcdata) -> Result<u32, crate::error::DecompileError> {
        Ok(condconst::run_conditional_const(func) as u32)
    }
}

/// ActionInferTypes: propagates `TypeStore` facts across copies/casts to a
/// fixed point, wrapping [`run_propagation`].
struct InferTypesStep {
    types: Rc<RefCell<TypeStore>>,
}
impl Action for InferTypesStep {
    fn name(&self) -> &'static str {
        "infertypes"
    }
    fn group_tag(&self) -> &'static str {
        "decompile"
    }
    fn apply(&mut self, func: &mut Funcdata) -> Result<u32, DecompileError> {
        let store = self.types.borrow();
        run_propagation(&store, func, 50)
    }
}

/// ActionStackPtrFlow: solves the stack-pointer offset equation system
/// starting from `entry_sp`, stashing the per-call spacebase offset onto
/// each [`crate::proto::callspec::FuncCallSpecs`] once resolved.
struct StackPtrFlowStep {
    entry_sp: VarnodeId,
    extrapop_guess: i64,
}
impl Action for StackPtrFlowStep {
    fn name(&self) -> &'static str {
        "stackptrflow"
    }
    fn group_tag(&self) -> &'static str {
        "decompile"
    }
    fn apply(&mut self, func: &mut Funcdata) -> Result<u32, DecompileError> {
        let mut flow = StackPtrFlow::new();
        flow.solve(func, self.entry_sp, self.extrapop_guess);
        let resolved = flow.resolved_count();
        let ids: Vec<crate::ir::entities::CallSpecId> = func.call_specs.keys().collect();
        for id in ids {
            let call_op = func.call_specs[id].call_op;
            let sp_in = func.op(call_op).inputs.first().copied();
            if let Some(offset) = sp_in.and_then(|vn| flow.offset_of(vn)) {
                func.call_specs[id].spacebase_offset = Some(offset);
            }
        }
        Ok(resolved as u32)
    }
}

/// ActionActiveParam: seeds and refines each call site's input trials
/// against the architecture's prototype model, then commits the survivors
/// back onto the `CALL`/`CALLIND` op once every trial is fully checked.
struct ActiveParamStep {
    model: Rc<dyn PrototypeModel>,
}
impl Action for ActiveParamStep {
    fn name(&self) -> &'static str {
        "activeparam"
    }
    fn group_tag(&self) -> &'static str {
        "paramid"
    }
    fn apply(&mut self, func: &mut Funcdata) -> Result<u32, DecompileError> {
        let ids: Vec<crate::ir::entities::CallSpecId> = func.call_specs.keys().collect();
        let mut changed = 0u32;
        for id in &ids {
            let call_op = func.call_specs[*id].call_op;
            let mut trials = paramrecovery::seed_trials(func, call_op, self.model.as_ref());
            paramrecovery::refine_trials(&mut trials, self.model.as_ref());
            func.call_specs[*id].active_trials = trials;
            changed += 1;
        }
        for id in &ids {
            if func.call_specs[*id].all_trials_fully_checked() {
                let spec = func.call_specs[*id].clone();
                paramrecovery::commit_call_params(func, &spec);
            }
        }
        Ok(changed)
    }
}

/// ActionActiveReturn: the output-slot counterpart of [`ActiveParamStep`],
/// run against the function's own `RETURN` ops rather than a call site.
struct ReturnRecoveryStep {
    model: Rc<dyn PrototypeModel>,
}
impl Action for ReturnRecoveryStep {
    fn name(&self) -> &'static str {
        "returnrecovery"
    }
    fn group_tag(&self) -> &'static str {
        "paramid"
    }
    fn apply(&mut self, func: &mut Funcdata) -> Result<u32, DecompileError> {
        let mut trials = paramrecovery::seed_return_trials(func, self.model.as_ref());
        paramrecovery::refine_return_trials(&mut trials, self.model.as_ref());
        let changed = trials.len() as u32;
        func.own_return_trials = trials;
        Ok(changed)
    }
}

/// The mega rule pool(s): `oppool1` (general peephole normalisation) and
/// `oppool2` (pointer-arithmetic lowering), run via [`RulePool`].
struct RulePoolStep {
    name: &'static str,
    pool: Rc<RulePool>,
}
impl Action for RulePoolStep {
    fn name(&self) -> &'static str {
        self.name
    }
    fn group_tag(&self) -> &'static str {
        "decompile"
    }
    fn flags(&self) -> ActionFlags {
        ActionFlags::RESTART_GROUP
    }
    fn apply(&mut self, func: &mut Funcdata) -> Result<u32, crate::error::DecompileError> {
        self.pool.run(func)
    }
}

/// A named step in the universal tree with no in-scope implementation
/// (external collaborator, or explicitly out of scope for this crate).
/// Always reports zero changes; kept so the tree's ordering matches
/// Ghidra's universal action tree listing exactly, and so a future
/// implementer has a named slot to fill in rather than a silent gap.
struct StructuralPlaceholder(&'static str, &'static str);
impl Action for StructuralPlaceholder {
    fn name(&self) -> &'static str {
        self.0
    }
    fn group_tag(&self) -> &'static str {
        self.1
    }
    fn apply(&mut self, _func: &mut Funcdata) -> Result<u32, crate::error::DecompileError> {
        Ok(0)
    }
}

fn placeholder(name: &'static str, group: &'static str) -> Box<dyn Action> {
    Box::new(StructuralPlaceholder(name, group))
}

/// Owns the universal tree plus the named-group membership used to prune
/// it (`ActionDatabase`).
pub struct ActionDatabase {
    oppool1: Rc<RulePool>,
    oppool2: Rc<RulePool>,
    types: Rc<RefCell<TypeStore>>,
    comments: Rc<RefCell<dyn CommentDatabase>>,
    /// The architecture's calling-convention model, needed to seed and
    /// refine parameter/return trials. `None` leaves `"activeparam"` and
    /// `"returnrecovery"` as structural placeholders (no model to consult).
    prototype_model: Option<Rc<dyn PrototypeModel>>,
    /// `(entry stack pointer varnode, guessed extrapop)` for
    /// `"stackptrflow"`. `None` leaves it a structural placeholder.
    stack_pointer: Option<(VarnodeId, i64)>,
}

impl ActionDatabase {
    pub fn new(
        oppool1: RulePool,
        oppool2: RulePool,
        types: Rc<RefCell<TypeStore>>,
        comments: Rc<RefCell<dyn CommentDatabase>>,
        prototype_model: Option<Rc<dyn PrototypeModel>>,
        stack_pointer: Option<(VarnodeId, i64)>,
    ) -> Self {
        Self {
            oppool1: Rc::new(oppool1),
            oppool2: Rc::new(oppool2),
            types,
            comments,
            prototype_model,
            stack_pointer,
        }
    }

    /// Build the universal tree matching Ghidra's action listing, with
    /// heritage seeded over `heritage_locations` (normally gathered once raw
    /// p-code is loaded; see `Funcdata::varnodes_in_space` for one way to
    /// enumerate candidates).
    pub fn universal_tree(&self, heritage_locations: Vec<(u32, Address, u32)>) -> ActionGroup {
        let main_loop = ActionGroup::new("mainloop", "decompile", ActionFlags::REPEAT_APPLY).with_children(vec![
            placeholder("unreachable", "decompile"),
            placeholder("varnodeprops", "decompile"),
            Box::new(HeritageStep { locations: heritage_locations }),
            placeholder("paramdouble", "paramid"),
            placeholder("segmentize", "decompile"),
            placeholder("internalstorage", "decompile"),
            placeholder("forcegoto", "decompile"),
            placeholder("directwrite_1", "decompile"),
            placeholder("directwrite_2", "decompile"),
            self.prototype_model.clone().map_or_else(
                || placeholder("activeparam", "paramid"),
                |model| Box::new(ActiveParamStep { model }) as Box<dyn Action>,
            ),
            self.prototype_model.clone().map_or_else(
                || placeholder("returnrecovery", "paramid"),
                |model| Box::new(ReturnRecoveryStep { model }) as Box<dyn Action>,
            ),
            placeholder("restrictlocal", "decompile"),
            Box::new(DeadCodeStep),
            placeholder("dynamicmapping", "decompile"),
            placeholder("restructure_varnode", "decompile"),
            placeholder("spacebase", "decompile"),
            Box::new(NonZeroMaskStep),
            Box::new(InferTypesStep { types: self.types.clone() }),
            ActionGroup::new("stackstall", "decompile", ActionFlags::REPEAT_APPLY)
                .with_children(vec![
                    Box::new(RulePoolStep { name: "oppool1", pool: self.oppool1.clone() }),
                    placeholder("lanedivide", "decompile"),
                    placeholder("multicse", "decompile"),
                    placeholder("shadowvar", "decompile"),
                    placeholder("deindirect", "decompile"),
                    self.stack_pointer.map_or_else(
                        || placeholder("stackptrflow", "decompile"),
                        |(entry_sp, extrapop_guess)| {
                            Box::new(StackPtrFlowStep { entry_sp, extrapop_guess }) as Box<dyn Action>
                        },
                    ),
                ])
                .boxed(),
            placeholder("redundbranch", "decompile"),
            placeholder("blockstructure", "decompile"),
            placeholder("constantptr", "decompile"),
            Box::new(RulePoolStep { name: "oppool2", pool: self.oppool2.clone() }),
            placeholder("determinedbranch", "decompile"),
            placeholder("unreachable2", "decompile"),
            placeholder("nodejoin", "decompile"),
            placeholder("conditionalexe", "decompile"),
            Box::new(CondConstStep),
        ]);

        let full_loop = ActionGroup::new("fullloop", "decompile", ActionFlags::REPEAT_APPLY).with_children(vec![
            main_loop.boxed(),
            placeholder("likelytrash", "decompile"),
            placeholder("directwrite_3", "decompile"),
            placeholder("directwrite_4", "decompile"),
            Box::new(DeadCodeStep),
            placeholder("donothing", "decompile"),
            placeholder("switchnorm", "jumptable"),
            placeholder("returnsplit", "paramid"),
            placeholder("unjustparams", "paramid"),
            placeholder("starttypes", "decompile"),
            placeholder("activereturn", "paramid"),
        ]);

        ActionGroup::new("universal", "decompile", ActionFlags::empty()).with_children(vec![
            placeholder("start", "decompile"),
            placeholder("constbase", "decompile"),
            placeholder("normalizesetup", "normalize"),
            placeholder("defaultparams", "paramid"),
            placeholder("extrapopsetup", "decompile"),
            placeholder("prototypetypes", "decompile"),
            placeholder("funclink", "decompile"),
            placeholder("funclink_outonly", "decompile"),
            full_loop.boxed(),
            placeholder("mapped_local_sync", "decompile"),
            placeholder("startcleanup", "decompile"),
            placeholder("cleanup", "decompile"),
            placeholder("prefercomplement", "decompile"),
            placeholder("structuretransform", "decompile"),
            placeholder("normalizebranches", "normalize"),
            placeholder("assignhigh", "decompile"),
            placeholder("mergerequired", "decompile"),
            placeholder("markexplicit", "decompile"),
            placeholder("markimplied", "decompile"),
            placeholder("mergemultientry", "decompile"),
            placeholder("mergecopy", "decompile"),
            placeholder("dominantcopy", "decompile"),
            placeholder("dynamicsymbols_1", "decompile"),
            placeholder("markindirectonly", "decompile"),
            placeholder("mergeadjacent", "decompile"),
            placeholder("mergetype", "decompile"),
            placeholder("hideshadow", "decompile"),
            placeholder("copymarker", "decompile"),
            placeholder("outputprototype", "paramid"),
            placeholder("inputprototype", "paramid"),
            placeholder("mapglobals", "decompile"),
            placeholder("dynamicsymbols_2", "decompile"),
            placeholder("namevars", "decompile"),
            Box::new(ActionSetCasts::new(self.types.clone(), self.comments.clone())),
            placeholder("finalstructure", "decompile"),
            placeholder("prototypewarnings", "paramid"),
            placeholder("stop", "decompile"),
        ])
    }
}

trait Boxed: Action + Sized + 'static {
    fn boxed(self) -> Box<dyn Action> {
        Box::new(self)
    }
}
impl<T: Action + 'static> Boxed for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::address::{AddrSpace, SpaceType};

    fn setup() -> Funcdata {
        let mut f = Funcdata::new("f");
        f.spaces_mut().add_space(AddrSpace::new(0, "const", 1, 8, false, SpaceType::Constant)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(1, "ram", 1, 8, false, SpaceType::Ram)).unwrap();
        f.spaces_mut().add_space(AddrSpace::new(2, "unique", 1, 8, false, SpaceType::Unique)).unwrap();
        f.block_graph_mut().make_block();
        f
    }

    #[test]
    fn universal_tree_runs_end_to_end_on_an_empty_function() {
        let types = Rc::new(RefCell::new(TypeStore::new()));
        let comments: Rc<RefCell<dyn CommentDatabase>> =
            Rc::new(RefCell::new(crate::arch::InMemoryCommentDatabase::new()));
        let db = ActionDatabase::new(RulePool::new(vec![]), RulePool::new(vec![]), types, comments, None, None);
        let mut tree = db.universal_tree(vec![]);
        let mut f = setup();
        let changes = tree.apply(&mut f).unwrap();
        assert_eq!(changes, 0);
    }
}
