//! Flags raw scheduler usage from inside an actor. Timers started through
//! the scheduler capability outlive the actor's restart cycle; the timers
//! mixin ties them to the actor lifecycle.

use crate::classify;
use crate::error::ClippyResult;
use crate::lint::{AnalysisKind, AnalysisUnit, LintCategory, LintContext, LintDescriptor, LintRule};
use crate::syntax::SyntaxKind;

pub static SCHEDULE_TELL: LintDescriptor = LintDescriptor::warning(
    "AC1004",
    "schedule_tell_from_actor",
    LintCategory::Correctness,
    AnalysisKind::Syntactic,
    "actors should schedule messages through the timers mixin rather than the raw scheduler",
    "`{0}` is invoked from inside an actor; implement IWithTimers and use StartSingleTimer / StartPeriodicTimer instead",
);

const SCHEDULE_METHODS: &[&str] = &["ScheduleTellOnce", "ScheduleTellRepeatedly"];

pub struct ScheduleTellRule;

impl LintRule for ScheduleTellRule {
    fn descriptor(&self) -> &'static LintDescriptor {
        &SCHEDULE_TELL
    }

    fn check(&self, unit: &AnalysisUnit<'_>, ctx: &mut LintContext) -> ClippyResult<()> {
        if unit.akka.core.actor_base_type(unit.program).is_none()
            || unit
                .akka
                .core
                .tell_scheduler_interface(unit.program)
                .is_none()
        {
            return Ok(());
        }

        for node in unit.tree.descendants(unit.tree.root()) {
            unit.cancellation.checkpoint()?;

            if unit.tree.kind(node) != SyntaxKind::Invocation {
                continue;
            }
            let Some(callee) = unit.tree.child(node, 0) else {
                continue;
            };
            if unit.tree.kind(callee) != SyntaxKind::MemberAccess {
                continue;
            }
            // This rule is name-keyed: the scheduler surface is extension-
            // heavy, so the receiver's type is what is identity-checked.
            let Some(member) = unit.model.resolve(callee) else {
                continue;
            };
            let name = unit.program.name(member);
            if !SCHEDULE_METHODS.contains(&name) {
                continue;
            }
            let called = name.to_string();

            let Some(class) = unit
                .tree
                .ancestors(node)
                .find(|&a| unit.tree.kind(a) == SyntaxKind::ClassDecl)
            else {
                continue;
            };
            let Some(class_sym) = unit.model.resolve(class) else {
                continue;
            };
            if !classify::is_actor_class(unit.program, unit.akka, class_sym) {
                continue;
            }

            let Some(receiver) = unit.tree.child(callee, 0) else {
                continue;
            };
            let Some(receiver_sym) = unit.model.resolve(receiver) else {
                continue;
            };
            let Some(receiver_ty) = unit.program.value_type_of(receiver_sym) else {
                continue;
            };
            if !classify::implements_tell_scheduler(unit.program, unit.akka, receiver_ty) {
                continue;
            }

            ctx.report(&SCHEDULE_TELL, unit.tree.span(node), vec![called]);
        }
        Ok(())
    }
}
