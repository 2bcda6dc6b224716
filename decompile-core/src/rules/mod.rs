//! The peephole rule catalogue, one module per category.

pub mod arithmetic;
pub mod bitwise;
pub mod callind;
pub mod compare;
pub mod piece;
pub mod ptrarith;
pub mod subvar;
pub mod switchrec;

use crate::rule::Rule;
use std::rc::Rc;

/// The rules that need no shared external state (everything but
/// [`ptrarith::RulePtrArithAdd`], which needs a type store, and
/// [`callind::RuleCallIndirectFold`], which needs a target architecture's
/// function-pointer alignment). Callers build those two separately and
/// push them onto this list before handing it to a `RulePool`.
pub fn stateless_rules() -> Vec<Rc<dyn Rule>> {
    vec![
        Rc::new(arithmetic::RuleConstFold),
        Rc::new(arithmetic::RuleMultByTwo),
        Rc::new(arithmetic::RuleDoubleNegate),
        Rc::new(bitwise::RuleAndAllOnes),
        Rc::new(bitwise::RuleOrZero),
        Rc::new(bitwise::RuleShiftShift),
        Rc::new(compare::RuleLessEqualToLess),
        Rc::new(compare::RuleCanonicalizeEqualOperandOrder),
        Rc::new(piece::RuleHumptyDumpty),
        Rc::new(piece::RuleDumptyHump),
        Rc::new(piece::RuleShiftSub),
        Rc::new(subvar::RuleSubvarAndMask),
        Rc::new(subvar::RuleSubvarShiftExtract),
        Rc::new(switchrec::RuleSwitchSingleBranch),
        Rc::new(switchrec::RuleSwitchCascadeNormalize),
        Rc::new(crate::split::forms::FormAdd),
        Rc::new(crate::split::forms::FormSub),
        Rc::new(crate::split::forms::FormLogical),
        Rc::new(crate::split::forms::FormEqual),
        Rc::new(crate::split::forms::FormLessThreeWay),
        Rc::new(crate::split::forms::FormCopyForce),
    ]
}
