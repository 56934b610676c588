//! Flags execution paths on which the deferred-message buffer's `Stash()`
//! operation can run more than once within one message handling.
//!
//! Per-block call counts are propagated depth-first from the routine's entry
//! block, carrying the total accumulated along the current path. Two calls
//! in mutually exclusive branches never share a path; a call in a branch
//! followed by an unconditional call do.

use crate::cfg::{BasicBlockId, ControlFlowGraph};
use crate::diagnostics::Span;
use crate::error::ClippyResult;
use crate::lint::{AnalysisKind, AnalysisUnit, LintCategory, LintContext, LintDescriptor, LintRule};
use crate::symbol::SymbolId;
use crate::syntax::{NodeId, SyntaxKind};
use std::collections::{HashMap, HashSet};

pub static STASH_ONCE: LintDescriptor = LintDescriptor::error(
    "AC1003",
    "stash_more_than_once_per_handler",
    LintCategory::Correctness,
    AnalysisKind::ControlFlow,
    "the deferred-message buffer must not be re-entered within one message handling",
    "`{0}` may be invoked more than once along this execution path; a message handler must stash the current message at most once",
);

/// Upper bound on block visits per routine. Loop back-edges can revisit
/// blocks through distinct paths; the budget guarantees termination on
/// adversarial graphs.
const TRAVERSAL_BUDGET: usize = 4096;

pub struct StashOnceRule;

impl LintRule for StashOnceRule {
    fn descriptor(&self) -> &'static LintDescriptor {
        &STASH_ONCE
    }

    fn check(&self, unit: &AnalysisUnit<'_>, ctx: &mut LintContext) -> ClippyResult<()> {
        let Some(stash) = unit.akka.core.stash_method(unit.program) else {
            return Ok(());
        };

        let routines: Vec<_> = unit
            .tree
            .descendants(unit.tree.root())
            .filter(|&n| {
                matches!(
                    unit.tree.kind(n),
                    SyntaxKind::MethodDecl | SyntaxKind::CtorDecl
                )
            })
            .collect();

        for routine in routines {
            unit.cancellation.checkpoint()?;
            let Some(body) = unit.tree.child(routine, 0) else {
                continue;
            };

            // Use the host-supplied graph only when it was built for this
            // routine; otherwise derive one from the body.
            let built;
            let cfg = match unit.cfg {
                Some(cfg) if routine == unit.tree.root() => cfg,
                _ => {
                    built = ControlFlowGraph::build(unit.tree, body);
                    &built
                }
            };

            let calls = collect_block_calls(unit, cfg, stash)?;
            if calls.is_empty() {
                continue;
            }

            let mut walk = PathWalk {
                unit,
                cfg,
                calls: &calls,
                on_path: HashSet::new(),
                reported: HashSet::new(),
                budget: TRAVERSAL_BUDGET,
            };
            walk.propagate(cfg.entry(), 0, ctx)?;
        }
        Ok(())
    }
}

/// Per-block spans of direct stash invocations, in operation order.
///
/// Counting does not descend into nested deferred bodies or local routines;
/// a stash call that only runs when such a body executes is a documented
/// false negative of this rule.
fn collect_block_calls(
    unit: &AnalysisUnit<'_>,
    cfg: &ControlFlowGraph,
    stash: SymbolId,
) -> ClippyResult<HashMap<BasicBlockId, Vec<Span>>> {
    let mut calls: HashMap<BasicBlockId, Vec<Span>> = HashMap::new();
    for (id, block) in cfg.blocks() {
        unit.cancellation.checkpoint()?;
        let mut spans = Vec::new();
        for &op in &block.operations {
            collect_stash_calls(unit, op, stash, &mut spans);
        }
        if !spans.is_empty() {
            calls.insert(id, spans);
        }
    }
    Ok(calls)
}

fn collect_stash_calls(unit: &AnalysisUnit<'_>, op: NodeId, stash: SymbolId, out: &mut Vec<Span>) {
    let mut stack = vec![op];
    while let Some(node) = stack.pop() {
        if unit.tree.kind(node).is_deferred_boundary() {
            continue;
        }
        if unit.tree.kind(node) == SyntaxKind::Invocation && unit.model.resolve(node) == Some(stash)
        {
            out.push(unit.tree.span(node));
        }
        stack.extend(unit.tree.children(node).iter().rev().copied());
    }
}

struct PathWalk<'a, 'u> {
    unit: &'a AnalysisUnit<'u>,
    cfg: &'a ControlFlowGraph,
    calls: &'a HashMap<BasicBlockId, Vec<Span>>,
    /// Blocks on the current depth-first path; revisiting one means we
    /// followed a loop back-edge and can stop.
    on_path: HashSet<BasicBlockId>,
    /// Spans already reported for this routine, across all explored paths.
    reported: HashSet<Span>,
    budget: usize,
}

impl PathWalk<'_, '_> {
    fn propagate(
        &mut self,
        block: BasicBlockId,
        total: usize,
        ctx: &mut LintContext,
    ) -> ClippyResult<()> {
        self.unit.cancellation.checkpoint()?;
        if self.budget == 0 || !self.on_path.insert(block) {
            return Ok(());
        }
        self.budget -= 1;

        let mut total = total;
        let mut exceeded = false;
        if let Some(spans) = self.calls.get(&block) {
            for &span in spans {
                total += 1;
                if total > 1 {
                    // Anchor at the call that pushed this path over the
                    // bound; one finding per discovery point.
                    if self.reported.insert(span) {
                        ctx.report(&STASH_ONCE, span, vec!["Stash".to_string()]);
                    }
                    exceeded = true;
                    break;
                }
            }
        }

        if !exceeded {
            if let Some(next) = self.cfg.block(block).conditional {
                self.propagate(next, total, ctx)?;
            }
            if let Some(next) = self.cfg.block(block).fallthrough {
                self.propagate(next, total, ctx)?;
            }
        }

        self.on_path.remove(&block);
        Ok(())
    }
}
