//! The action scheduler: named, flagged, composable transformations driven
//! to a fixed point ("Action"/"ActionGroup"). Grounded on the
//! ordered, persistent `Context` pipeline in
//! `cranelift-codegen/src/context.rs`, generalised from "one fixed sequence
//! of compiler passes" to a nameable, nestable, restart-capable tree.

use crate::error::DecompileError;
use crate::ir::funcdata::Funcdata;
use std::collections::HashSet;

/// Per-action scheduling flags (`Action`), bit-packed like every
/// other flag set in this crate rather than pulled in via `bitflags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionFlags(u8);

impl ActionFlags {
    /// Fire at most once per function, regardless of how many times the
    /// enclosing group restarts.
    pub const ONCE_PER_FUNC: Self = Self(1 << 0);
    /// The enclosing group may re-enter this action on a later pass.
    pub const REPEAT_APPLY: Self = Self(1 << 1);
    /// Changes made by this action force the enclosing group to restart
    /// from its first child.
    pub const RESTART_GROUP: Self = Self(1 << 2);

    pub const fn empty() -> Self {
        Self(0)
    }
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
    pub fn contains(self, bit: Self) -> bool {
        self.0 & bit.0 == bit.0
    }
}

/// How many times an [`ActionGroup`] will re-enter its child list looking
/// for a stable point before it is treated as non-convergent.
pub const MAX_GROUP_PASSES: u32 = 50;

/// A named unit of transformation (`Action`). `apply` returns the
/// number of changes made; the caller (an enclosing [`ActionGroup`])
/// decides whether a non-zero count means "restart" based on
/// [`Action::flags`].
pub trait Action {
    fn name(&self) -> &'static str;
    /// The `ActionDatabase` group tag this action is filed under, e.g.
    /// `"decompile"`, `"jumptable"`, `"normalize"`, `"paramid"`, ...
    fn group_tag(&self) -> &'static str;
    fn flags(&self) -> ActionFlags {
        ActionFlags::empty()
    }
    fn apply(&mut self, func: &mut Funcdata) -> Result<u32, DecompileError>;
}

/// An ordered list of child actions, itself an [`Action`]. With
/// [`ActionFlags::REPEAT_APPLY`] set on the group itself, the whole child
/// list re-enters from the top whenever a pass through it made any change,
/// until a pass makes none — the `"fullloop"`/`"mainloop"` pattern.
pub struct ActionGroup {
    pub name: &'static str,
    pub group_tag: &'static str,
    pub flags: ActionFlags,
    pub children: Vec<Box<dyn Action>>,
}

impl ActionGroup {
    pub fn new(name: &'static str, group_tag: &'static str, flags: ActionFlags) -> Self {
        Self { name, group_tag, flags, children: Vec::new() }
    }

    pub fn with_children(mut self, children: Vec<Box<dyn Action>>) -> Self {
        self.children = children;
        self
    }
}

impl Action for ActionGroup {
    fn name(&self) -> &'static str {
        self.name
    }
    fn group_tag(&self) -> &'static str {
        self.group_tag
    }
    fn flags(&self) -> ActionFlags {
        self.flags
    }

    /// Run the child list once; if [`ActionFlags::REPEAT_APPLY`] is set,
    /// keep re-entering from the first child while any pass makes a change.
    /// Children are invoked in order; any child signalling restart sets
    /// the group's restart flag, and the group re-enters from its first
    /// child.
    fn apply(&mut self, func: &mut Funcdata) -> Result<u32, DecompileError> {
        let mut fired_once: HashSet<&'static str> = HashSet::new();
        let mut total = 0u32;

        for _pass in 0..MAX_GROUP_PASSES {
            let mut pass_changes = 0u32;
            let mut restart = false;

            for child in &mut self.children {
                if child.flags.contains(ActionFlags::ONCE_PER_FUNC) && fired_once.contains(child.name()) {
                    continue;
                }
                let changes = child.apply(func)?;
                fired_once.insert(child.name());
                if changes > 0 {
                    pass_changes += changes;
                    if child.flags.contains(ActionFlags::RESTART_GROUP) {
                        restart = true;
                    }
                }
            }

            total += pass_changes;
            let keep_going = restart || (self.flags.contains(ActionFlags::REPEAT_APPLY) && pass_changes > 0);
            if !keep_going {
                return Ok(total);
            }
        }
        Err(DecompileError::PassLimitExceeded(format!("action group '{}' did not converge", self.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::address::{AddrSpace, SpaceType};

    struct CountToThree(u32);
    impl Action for CountToThree {
        fn name(&self) -> &'static str {
            "count_to_three"
        }
        fn group_tag(&self) -> &'static str {
            "test"
        }
        fn flags(&self) -> ActionFlags {
            ActionFlags::RESTART_GROUP
        }
        fn apply(&mut self, _func: &mut Funcdata) -> Result<u32, DecompileError> {
            if self.0 < 3 {
                self.0 += 1;
                Ok(1)
            } else {
                Ok(0)
            }
        }
    }

    struct RunOnce(std::rc::Rc<std::cell::Cell<u32>>);
    impl Action for RunOnce {
        fn name(&self) -> &'static str {
            "run_once"
        }
        fn group_tag(&self) -> &'static str {
            "test"
        }
        fn flags(&self) -> ActionFlags {
            ActionFlags::ONCE_PER_FUNC
        }
        fn apply(&mut self, _func: &mut Funcdata) -> Result<u32, DecompileError> {
            self.0.set(self.0.get() + 1);
            Ok(1)
        }
    }

    fn setup() -> Funcdata {
        let mut f = Funcdata::new("f");
        f.spaces_mut().add_space(AddrSpace::new(0, "const", 1, 8, false, SpaceType::Constant)).unwrap();
        f
    }

    #[test]
    fn restart_group_reenters_until_stable() {
        let mut f = setup();
        let mut group = ActionGroup::new("g", "test", ActionFlags::empty())
            .with_children(vec![Box::new(CountToThree(0))]);
        let total = group.apply(&mut f).unwrap();
        assert_eq!(total, 3);
    }

    #[test]
    fn once_per_func_fires_a_single_time_across_restarts() {
        let mut f = setup();
        let fire_count = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut group = ActionGroup::new("g", "test", ActionFlags::empty()).with_children(vec![
            Box::new(CountToThree(0)),
            Box::new(RunOnce(fire_count.clone())),
        ]);
        group.apply(&mut f).unwrap();
        // CountToThree restarts the group 3 times (4 passes total), but
        // RunOnce's ONCE_PER_FUNC flag means it only ever applies once.
        assert_eq!(fire_count.get(), 1);
    }
}
