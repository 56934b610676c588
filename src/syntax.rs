//! Arena-backed syntax tree supplied by the host front end.
//!
//! The engine never parses source text; the host compiler hands over a
//! finished tree per analyzed unit. Nodes carry a closed kind tag, a source
//! span, and parent/child links. The tree is immutable once built.

use crate::diagnostics::Span;
use id_arena::{Arena, Id};

pub type NodeId = Id<SyntaxNode>;

/// Closed set of syntactic shapes the rules dispatch on.
///
/// Anything the rules do not care about arrives as `Other`; its children are
/// still traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Class (actor) declaration.
    ClassDecl,
    MethodDecl,
    CtorDecl,
    /// Local routine declared inside a method body.
    LocalFn,
    /// Deferred body: lambda or anonymous function value.
    Lambda,
    Block,
    Invocation,
    MemberAccess,
    Identifier,
    Argument,
    Assignment,
    /// Object/collection initializer expression list.
    Initializer,
    /// `var x = ...` style local declaration. The sanctioned capture site.
    LocalBinding,
    If,
    For,
    While,
    DoWhile,
    ForEach,
    Return,
    Other,
}

impl SyntaxKind {
    /// True for iteration constructs the loop-containment rule cares about.
    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            SyntaxKind::For | SyntaxKind::While | SyntaxKind::DoWhile | SyntaxKind::ForEach
        )
    }

    /// True for constructs that package code to run later. Traversals that
    /// must stay within one synchronous activation stop at these.
    pub fn is_deferred_boundary(&self) -> bool {
        matches!(self, SyntaxKind::Lambda | SyntaxKind::LocalFn)
    }
}

#[derive(Debug)]
pub struct SyntaxNode {
    kind: SyntaxKind,
    span: Span,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Immutable syntax tree for one analyzed unit.
#[derive(Debug)]
pub struct SyntaxTree {
    nodes: Arena<SyntaxNode>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.nodes[id].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[id].children.get(index).copied()
    }

    /// Walk outward through enclosing constructs, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&n| self.parent(n))
    }

    /// Preorder traversal of the subtree rooted at `id`, including `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }
}

pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(next).iter().rev().copied());
        Some(next)
    }
}

/// Builder used by the host front end (and test fixtures) to assemble trees
/// bottom-up. Parent links are fixed up as nodes are attached.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Arena<SyntaxNode>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node whose children were built earlier on this builder.
    pub fn node(&mut self, kind: SyntaxKind, span: Span, children: Vec<NodeId>) -> NodeId {
        let id = self.nodes.alloc(SyntaxNode {
            kind,
            span,
            parent: None,
            children: children.clone(),
        });
        for child in children {
            self.nodes[child].parent = Some(id);
        }
        id
    }

    pub fn leaf(&mut self, kind: SyntaxKind, span: Span) -> NodeId {
        self.node(kind, span, Vec::new())
    }

    pub fn finish(self, root: NodeId) -> SyntaxTree {
        SyntaxTree {
            nodes: self.nodes,
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(row: usize) -> Span {
        Span::line(row, 1, 2)
    }

    #[test]
    fn descendants_are_preorder() {
        let mut b = TreeBuilder::new();
        let a = b.leaf(SyntaxKind::Identifier, span(2));
        let c = b.leaf(SyntaxKind::Identifier, span(3));
        let block = b.node(SyntaxKind::Block, span(1), vec![a, c]);
        let root = b.node(SyntaxKind::MethodDecl, span(1), vec![block]);
        let tree = b.finish(root);

        let order: Vec<NodeId> = tree.descendants(root).collect();
        assert_eq!(order, vec![root, block, a, c]);
    }

    #[test]
    fn ancestors_walk_to_root() {
        let mut b = TreeBuilder::new();
        let ident = b.leaf(SyntaxKind::Identifier, span(3));
        let body = b.node(SyntaxKind::Block, span(2), vec![ident]);
        let root = b.node(SyntaxKind::While, span(1), vec![body]);
        let tree = b.finish(root);

        let chain: Vec<NodeId> = tree.ancestors(ident).collect();
        assert_eq!(chain, vec![body, root]);
        assert!(tree.kind(root).is_loop());
    }
}
