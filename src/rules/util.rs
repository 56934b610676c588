use crate::classify;
use crate::diagnostics::Span;
use crate::error::ClippyResult;
use crate::lint::AnalysisUnit;
use crate::symbol::SymbolId;
use crate::syntax::{NodeId, SyntaxKind};
use std::collections::HashSet;

/// If `node` is an argument wrapping a deferred (lambda) body, return the
/// lambda node.
pub(crate) fn lambda_of_argument(unit: &AnalysisUnit<'_>, node: NodeId) -> Option<NodeId> {
    if unit.tree.kind(node) != SyntaxKind::Argument {
        return None;
    }
    let expr = unit.tree.child(node, 0)?;
    (unit.tree.kind(expr) == SyntaxKind::Lambda).then_some(expr)
}

/// Method symbol of the nearest enclosing invocation, if resolvable.
pub(crate) fn enclosing_invocation_method(
    unit: &AnalysisUnit<'_>,
    node: NodeId,
) -> Option<SymbolId> {
    let invocation = unit
        .tree
        .ancestors(node)
        .find(|&a| unit.tree.kind(a) == SyntaxKind::Invocation)?;
    let sym = unit.model.resolve(invocation)?;
    unit.program.is_method(sym).then_some(sym)
}

/// Is this argument a deferred body handed to an async-boundary call that is
/// not one of the framework's own handler registrations?
pub(crate) fn is_async_deferred_argument(unit: &AnalysisUnit<'_>, arg: NodeId) -> bool {
    let Some(method) = enclosing_invocation_method(unit, arg) else {
        return false;
    };
    !classify::is_receive_async_registration(unit.program, unit.akka, method)
        && classify::is_async_boundary_method(unit.program, unit.akka, method)
}

/// An unsafe read of a context-bound accessor: where it was read and the
/// accessor's name.
pub(crate) type UnsafeRead = (Span, String);

/// Scan one deferred body for reads of the context-bound `Self`/`Sender`
/// accessors.
///
/// Mirrors the shape-by-shape scan of the reference checker: only assignment
/// right-hand sides, initializer elements, member-invocation receivers, and
/// argument expressions are inspected. A read whose immediate use is a local
/// binding declaration is the sanctioned capture pattern and never matches.
///
/// Nested deferred bodies and local routines are descended into. When a
/// local routine declared elsewhere is invoked from the body, its
/// declaration body is scanned as well, guarded against cycles by
/// `visited_routines`. With `skip_nested_async_lambdas`, deferred arguments
/// of non-registration async calls are left to the sibling rule that owns
/// them.
pub(crate) fn scan_deferred_body(
    unit: &AnalysisUnit<'_>,
    body: NodeId,
    skip_nested_async_lambdas: bool,
    visited_routines: &mut HashSet<SymbolId>,
    out: &mut Vec<UnsafeRead>,
) -> ClippyResult<()> {
    let mut stack = vec![body];
    while let Some(node) = stack.pop() {
        unit.cancellation.checkpoint()?;

        if skip_nested_async_lambdas
            && unit.tree.kind(node) == SyntaxKind::Lambda
            && node != body
            && let Some(parent) = unit.tree.parent(node)
            && unit.tree.kind(parent) == SyntaxKind::Argument
            && is_async_deferred_argument(unit, parent)
        {
            continue;
        }

        match unit.tree.kind(node) {
            SyntaxKind::Assignment => {
                if let Some(rhs) = unit.tree.child(node, 1) {
                    check_read(unit, rhs, out);
                }
            }
            SyntaxKind::Initializer => {
                for &expr in unit.tree.children(node) {
                    check_read(unit, expr, out);
                }
            }
            SyntaxKind::Invocation => {
                if let Some(callee) = unit.tree.child(node, 0)
                    && unit.tree.kind(callee) == SyntaxKind::MemberAccess
                    && let Some(receiver) = unit.tree.child(callee, 0)
                {
                    check_read(unit, receiver, out);
                }
                // A local routine invoked from a deferred body may itself
                // read a context-bound accessor; inspect its body too.
                if let Some(sym) = unit.model.resolve(node)
                    && let Some(decl) = unit.model.declaration_of(sym)
                    && unit.tree.kind(decl) == SyntaxKind::LocalFn
                    && visited_routines.insert(sym)
                    && let Some(fn_body) = unit.tree.child(decl, 0)
                {
                    scan_deferred_body(
                        unit,
                        fn_body,
                        skip_nested_async_lambdas,
                        visited_routines,
                        out,
                    )?;
                }
            }
            SyntaxKind::Argument => {
                if let Some(expr) = unit.tree.child(node, 0) {
                    check_read(unit, expr, out);
                }
            }
            _ => {}
        }

        stack.extend(unit.tree.children(node).iter().rev().copied());
    }
    Ok(())
}

/// Does this leaf expression read a context-bound accessor? Either a direct
/// identifier read resolving to `ActorBase.Self`/`Sender`, or a member
/// access resolving to `IActorContext.Self`/`Sender`.
fn check_read(unit: &AnalysisUnit<'_>, expr: NodeId, out: &mut Vec<UnsafeRead>) {
    let matched = match unit.tree.kind(expr) {
        SyntaxKind::Identifier => unit
            .model
            .resolve(expr)
            .filter(|&sym| classify::is_actor_self_or_sender(unit.program, unit.akka, sym)),
        SyntaxKind::MemberAccess => unit
            .model
            .resolve(expr)
            .filter(|&sym| classify::is_context_self_or_sender(unit.program, unit.akka, sym)),
        _ => None,
    };
    if let Some(sym) = matched {
        out.push((unit.tree.span(expr), unit.program.name(sym).to_string()));
    }
}
