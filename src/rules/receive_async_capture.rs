//! Sibling of the async-lambda capture rule: the same scan applied to
//! deferred bodies registered through the framework's own asynchronous
//! handler-registration calls (`ReceiveAsync` / `ReceiveAnyAsync`).

use super::util;
use crate::classify;
use crate::diagnostics::Span;
use crate::error::ClippyResult;
use crate::lint::{AnalysisKind, AnalysisUnit, LintCategory, LintContext, LintDescriptor, LintRule};
use crate::syntax::SyntaxKind;
use std::collections::HashSet;

pub static RECEIVE_ASYNC_CAPTURE: LintDescriptor = LintDescriptor::error(
    "AC1001",
    "close_over_context_in_receive_async",
    LintCategory::Correctness,
    AnalysisKind::Syntactic,
    "context-bound accessor read inside an async message-handler body without prior local capture",
    "Context-bound accessor `{0}` is read inside a ReceiveAsync handler; capture it into a local variable at the top of the handler and use the local instead",
);

pub struct ReceiveAsyncCaptureRule;

impl LintRule for ReceiveAsyncCaptureRule {
    fn descriptor(&self) -> &'static LintDescriptor {
        &RECEIVE_ASYNC_CAPTURE
    }

    fn check(&self, unit: &AnalysisUnit<'_>, ctx: &mut LintContext) -> ClippyResult<()> {
        if unit.akka.core.actor_base_type(unit.program).is_none() {
            return Ok(());
        }

        let classes: Vec<_> = unit
            .tree
            .descendants(unit.tree.root())
            .filter(|&n| unit.tree.kind(n) == SyntaxKind::ClassDecl)
            .collect();

        let mut reported: HashSet<Span> = HashSet::new();

        for class in classes {
            let Some(class_sym) = unit.model.resolve(class) else {
                continue;
            };
            if !classify::is_actor_class(unit.program, unit.akka, class_sym) {
                continue;
            }

            for node in unit.tree.descendants(class) {
                unit.cancellation.checkpoint()?;

                let Some(lambda) = util::lambda_of_argument(unit, node) else {
                    continue;
                };
                let Some(method) = util::enclosing_invocation_method(unit, node) else {
                    continue;
                };
                if !classify::is_receive_async_registration(unit.program, unit.akka, method) {
                    continue;
                }
                let Some(body) = unit.tree.child(lambda, 0) else {
                    continue;
                };

                // Deferred arguments of further async calls inside the
                // handler are owned by the async-lambda sibling rule.
                let mut reads = Vec::new();
                let mut visited_routines = HashSet::new();
                util::scan_deferred_body(unit, body, true, &mut visited_routines, &mut reads)?;

                for (span, accessor) in reads {
                    if reported.insert(span) {
                        ctx.report(&RECEIVE_ASYNC_CAPTURE, span, vec![accessor]);
                    }
                }
            }
        }
        Ok(())
    }
}
