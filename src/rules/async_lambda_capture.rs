//! Flags reads of context-bound accessors inside deferred bodies passed
//! across an asynchronous boundary. By the time the deferred body runs, the
//! message-handling stack has unwound and `Self`/`Sender` no longer point at
//! the message being processed.

use super::util;
use crate::classify;
use crate::diagnostics::Span;
use crate::error::ClippyResult;
use crate::lint::{AnalysisKind, AnalysisUnit, LintCategory, LintContext, LintDescriptor, LintRule};
use crate::syntax::SyntaxKind;
use std::collections::HashSet;

pub static ASYNC_LAMBDA_CAPTURE: LintDescriptor = LintDescriptor::error(
    "AC1002",
    "close_over_context_in_async_lambda",
    LintCategory::Correctness,
    AnalysisKind::Syntactic,
    "context-bound accessor read inside a deferred body that outlives the message-handling stack",
    "Context-bound accessor `{0}` is read inside an async lambda; capture it into a local variable before the async boundary and use the local instead",
);

pub struct AsyncLambdaCaptureRule;

impl LintRule for AsyncLambdaCaptureRule {
    fn descriptor(&self) -> &'static LintDescriptor {
        &ASYNC_LAMBDA_CAPTURE
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

        // The same read can be reachable from two scan roots (a nested
        // deferred body inside an already-flagged one); report each distinct
        // read exactly once.
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
                // Handler-registration lambdas are owned by the sibling rule.
                if !util::is_async_deferred_argument(unit, node) {
                    continue;
                }
                let Some(body) = unit.tree.child(lambda, 0) else {
                    continue;
                };

                let mut reads = Vec::new();
                let mut visited_routines = HashSet::new();
                util::scan_deferred_body(unit, body, false, &mut visited_routines, &mut reads)?;

                for (span, accessor) in reads {
                    if reported.insert(span) {
                        ctx.report(&ASYNC_LAMBDA_CAPTURE, span, vec![accessor]);
                    }
                }
            }
        }
        Ok(())
    }
}
