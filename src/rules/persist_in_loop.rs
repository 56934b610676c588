//! Flags single-event persistence calls issued from inside a loop, where the
//! batch-oriented variant persists the whole collection in one call.

use crate::classify;
use crate::error::ClippyResult;
use crate::lint::{AnalysisKind, AnalysisUnit, LintCategory, LintContext, LintDescriptor, LintRule};
use crate::syntax::SyntaxKind;

pub static PERSIST_IN_LOOP: LintDescriptor = LintDescriptor::warning(
    "AC1005",
    "persist_inside_loop",
    LintCategory::Performance,
    AnalysisKind::Syntactic,
    "per-event persistence calls inside loops should use the batch variant",
    "`{0}` is called inside a loop; gather the events into a collection and call `{1}` once instead",
);

const ASYNC_SUFFIX: &str = "Async";

pub struct PersistInLoopRule;

impl LintRule for PersistInLoopRule {
    fn descriptor(&self) -> &'static LintDescriptor {
        &PERSIST_IN_LOOP
    }

    fn check(&self, unit: &AnalysisUnit<'_>, ctx: &mut LintContext) -> ClippyResult<()> {
        // No traversal at all when the persistence sub-area is absent.
        if !unit.akka.persistence.is_present() {
            return Ok(());
        }

        for node in unit.tree.descendants(unit.tree.root()) {
            unit.cancellation.checkpoint()?;

            if unit.tree.kind(node) != SyntaxKind::Invocation {
                continue;
            }
            let Some(sym) = unit.model.resolve(node) else {
                continue;
            };
            if !classify::is_single_event_persist(unit.program, unit.akka, sym) {
                continue;
            }

            let called = unit.program.name(sym).to_string();
            let replacement = if called.ends_with(ASYNC_SUFFIX) {
                "PersistAllAsync"
            } else {
                "PersistAll"
            };

            // One finding per enclosing loop ancestor.
            for ancestor in unit.tree.ancestors(node) {
                if unit.tree.kind(ancestor).is_loop() {
                    ctx.report(
                        &PERSIST_IN_LOOP,
                        unit.tree.span(node),
                        vec![called.clone(), replacement.to_string()],
                    );
                }
            }
        }
        Ok(())
    }
}
