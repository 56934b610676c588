//! Control-flow graph over one routine body.
//!
//! The host front end may hand the engine a prebuilt graph; when it does
//! not, `ControlFlowGraph::build` derives one from the routine's syntax
//! subtree. Each basic block carries its statement-level operation nodes in
//! order and at most two successors: a conditional successor (branch taken)
//! and a fallthrough successor. Loop back-edges make the graph cyclic, so
//! consumers must carry a visited guard or an iteration budget.
//!
//! Child conventions assumed by the builder:
//! - `If`:      [condition, then-branch, (else-branch)]
//! - `While`:   [condition, body]
//! - `DoWhile`: [body, condition]
//! - `For`:     [init, condition, update, body]
//! - `ForEach`: [iterable, body]

use crate::syntax::{NodeId, SyntaxKind, SyntaxTree};
use id_arena::{Arena, Id};

pub type BasicBlockId = Id<BasicBlock>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicBlockKind {
    Entry,
    Exit,
    Normal,
    LoopHeader,
    Condition,
}

#[derive(Debug)]
pub struct BasicBlock {
    pub kind: BasicBlockKind,
    /// Statement-level syntax nodes executed in this block, in order.
    pub operations: Vec<NodeId>,
    /// Successor taken when the block's condition holds.
    pub conditional: Option<BasicBlockId>,
    /// Successor taken otherwise (or unconditionally).
    pub fallthrough: Option<BasicBlockId>,
}

#[derive(Debug)]
pub struct ControlFlowGraph {
    blocks: Arena<BasicBlock>,
    entry: BasicBlockId,
}

impl ControlFlowGraph {
    pub fn entry(&self) -> BasicBlockId {
        self.entry
    }

    pub fn block(&self, id: BasicBlockId) -> &BasicBlock {
        &self.blocks[id]
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BasicBlockId, &BasicBlock)> {
        self.blocks.iter()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Build a graph for the subtree rooted at `body` (typically the block
    /// of a method or constructor declaration).
    pub fn build(tree: &SyntaxTree, body: NodeId) -> Self {
        let mut builder = CfgBuilder::new(tree);
        builder.visit(body);
        builder.finish()
    }
}

struct CfgBuilder<'t> {
    tree: &'t SyntaxTree,
    blocks: Arena<BasicBlock>,
    entry: BasicBlockId,
    current: BasicBlockId,
}

impl<'t> CfgBuilder<'t> {
    fn new(tree: &'t SyntaxTree) -> Self {
        let mut blocks = Arena::new();
        let entry = blocks.alloc(BasicBlock {
            kind: BasicBlockKind::Entry,
            operations: Vec::new(),
            conditional: None,
            fallthrough: None,
        });
        let first = blocks.alloc(BasicBlock {
            kind: BasicBlockKind::Normal,
            operations: Vec::new(),
            conditional: None,
            fallthrough: None,
        });
        blocks[entry].fallthrough = Some(first);
        Self {
            tree,
            blocks,
            entry,
            current: first,
        }
    }

    fn new_block(&mut self, kind: BasicBlockKind) -> BasicBlockId {
        self.blocks.alloc(BasicBlock {
            kind,
            operations: Vec::new(),
            conditional: None,
            fallthrough: None,
        })
    }

    fn push_op(&mut self, node: NodeId) {
        self.blocks[self.current].operations.push(node);
    }

    fn visit(&mut self, node: NodeId) {
        match self.tree.kind(node) {
            SyntaxKind::Block => {
                for &child in self.tree.children(node) {
                    self.visit(child);
                }
            }
            SyntaxKind::If => self.visit_if(node),
            SyntaxKind::While => self.visit_while(node),
            SyntaxKind::DoWhile => self.visit_do_while(node),
            SyntaxKind::For => self.visit_for(node),
            SyntaxKind::ForEach => self.visit_for_each(node),
            SyntaxKind::Return => self.visit_return(node),
            _ => self.push_op(node),
        }
    }

    /// A return ends the current path. The node stays in the block (its
    /// operand expression still executes) and the block keeps no
    /// fallthrough; statements after the return, and the join-block wiring
    /// done by the enclosing construct, land in a fresh unreachable block.
    fn visit_return(&mut self, node: NodeId) {
        self.push_op(node);
        self.current = self.new_block(BasicBlockKind::Normal);
    }

    fn visit_if(&mut self, node: NodeId) {
        let children = self.tree.children(node);
        let (cond, then_branch, else_branch) = match *children {
            [cond, then_branch] => (cond, then_branch, None),
            [cond, then_branch, else_branch, ..] => (cond, then_branch, Some(else_branch)),
            _ => return,
        };
        self.push_op(cond);
        let cond_block = self.current;

        let then_start = self.new_block(BasicBlockKind::Normal);
        let join = self.new_block(BasicBlockKind::Normal);
        self.blocks[cond_block].conditional = Some(then_start);

        self.current = then_start;
        self.visit(then_branch);
        self.blocks[self.current].fallthrough = Some(join);

        match else_branch {
            Some(else_node) => {
                let else_start = self.new_block(BasicBlockKind::Normal);
                self.blocks[cond_block].fallthrough = Some(else_start);
                self.current = else_start;
                self.visit(else_node);
                self.blocks[self.current].fallthrough = Some(join);
            }
            None => {
                self.blocks[cond_block].fallthrough = Some(join);
            }
        }

        self.current = join;
    }

    fn visit_while(&mut self, node: NodeId) {
        let children = self.tree.children(node);
        let [cond, body, ..] = *children else {
            return;
        };
        let header = self.new_block(BasicBlockKind::LoopHeader);
        self.blocks[self.current].fallthrough = Some(header);
        self.blocks[header].operations.push(cond);

        let body_start = self.new_block(BasicBlockKind::Normal);
        let exit = self.new_block(BasicBlockKind::Normal);
        self.blocks[header].conditional = Some(body_start);
        self.blocks[header].fallthrough = Some(exit);

        self.current = body_start;
        self.visit(body);
        // Back edge.
        self.blocks[self.current].fallthrough = Some(header);

        self.current = exit;
    }

    fn visit_do_while(&mut self, node: NodeId) {
        let children = self.tree.children(node);
        let [body, cond, ..] = *children else {
            return;
        };
        let body_start = self.new_block(BasicBlockKind::LoopHeader);
        self.blocks[self.current].fallthrough = Some(body_start);

        self.current = body_start;
        self.visit(body);

        let cond_block = self.new_block(BasicBlockKind::Condition);
        self.blocks[self.current].fallthrough = Some(cond_block);
        self.blocks[cond_block].operations.push(cond);

        let exit = self.new_block(BasicBlockKind::Normal);
        // Back edge on the taken branch.
        self.blocks[cond_block].conditional = Some(body_start);
        self.blocks[cond_block].fallthrough = Some(exit);

        self.current = exit;
    }

    fn visit_for(&mut self, node: NodeId) {
        let children = self.tree.children(node);
        let [init, cond, update, body, ..] = *children else {
            return;
        };
        self.push_op(init);

        let header = self.new_block(BasicBlockKind::LoopHeader);
        self.blocks[self.current].fallthrough = Some(header);
        self.blocks[header].operations.push(cond);

        let body_start = self.new_block(BasicBlockKind::Normal);
        let exit = self.new_block(BasicBlockKind::Normal);
        self.blocks[header].conditional = Some(body_start);
        self.blocks[header].fallthrough = Some(exit);

        self.current = body_start;
        self.visit(body);
        self.push_op(update);
        self.blocks[self.current].fallthrough = Some(header);

        self.current = exit;
    }

    fn visit_for_each(&mut self, node: NodeId) {
        let children = self.tree.children(node);
        let [iterable, body, ..] = *children else {
            return;
        };
        self.push_op(iterable);

        let header = self.new_block(BasicBlockKind::LoopHeader);
        self.blocks[self.current].fallthrough = Some(header);

        let body_start = self.new_block(BasicBlockKind::Normal);
        let exit = self.new_block(BasicBlockKind::Normal);
        self.blocks[header].conditional = Some(body_start);
        self.blocks[header].fallthrough = Some(exit);

        self.current = body_start;
        self.visit(body);
        self.blocks[self.current].fallthrough = Some(header);

        self.current = exit;
    }

    fn finish(mut self) -> ControlFlowGraph {
        let exit = self.new_block(BasicBlockKind::Exit);
        if self.blocks[self.current].fallthrough.is_none() {
            self.blocks[self.current].fallthrough = Some(exit);
        }
        ControlFlowGraph {
            blocks: self.blocks,
            entry: self.entry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Span;
    use crate::syntax::{SyntaxKind, TreeBuilder};

    fn span(row: usize) -> Span {
        Span::line(row, 1, 2)
    }

    #[test]
    fn straight_line_statements_share_one_block() {
        let mut b = TreeBuilder::new();
        let s1 = b.leaf(SyntaxKind::Invocation, span(1));
        let s2 = b.leaf(SyntaxKind::Invocation, span(2));
        let body = b.node(SyntaxKind::Block, span(1), vec![s1, s2]);
        let tree = b.finish(body);

        let cfg = ControlFlowGraph::build(&tree, body);
        let first = cfg.block(cfg.entry()).fallthrough.expect("first block");
        assert_eq!(cfg.block(first).operations, vec![s1, s2]);
    }

    #[test]
    fn if_else_forms_a_diamond() {
        let mut b = TreeBuilder::new();
        let cond = b.leaf(SyntaxKind::Identifier, span(1));
        let then_stmt = b.leaf(SyntaxKind::Invocation, span(2));
        let else_stmt = b.leaf(SyntaxKind::Invocation, span(3));
        let if_node = b.node(SyntaxKind::If, span(1), vec![cond, then_stmt, else_stmt]);
        let body = b.node(SyntaxKind::Block, span(1), vec![if_node]);
        let tree = b.finish(body);

        let cfg = ControlFlowGraph::build(&tree, body);
        let cond_block = cfg.block(cfg.entry()).fallthrough.expect("cond block");
        let then_block = cfg.block(cond_block).conditional.expect("then branch");
        let else_block = cfg.block(cond_block).fallthrough.expect("else branch");
        assert_ne!(then_block, else_block);
        // Both branches converge on the same join block.
        assert_eq!(
            cfg.block(then_block).fallthrough,
            cfg.block(else_block).fallthrough
        );
    }

    #[test]
    fn returning_branch_is_not_wired_to_the_join() {
        let mut b = TreeBuilder::new();
        let cond = b.leaf(SyntaxKind::Identifier, span(1));
        let stmt = b.leaf(SyntaxKind::Invocation, span(2));
        let ret = b.leaf(SyntaxKind::Return, span(3));
        let then_block = b.node(SyntaxKind::Block, span(2), vec![stmt, ret]);
        let if_node = b.node(SyntaxKind::If, span(1), vec![cond, then_block]);
        let after = b.leaf(SyntaxKind::Invocation, span(5));
        let body = b.node(SyntaxKind::Block, span(1), vec![if_node, after]);
        let tree = b.finish(body);

        let cfg = ControlFlowGraph::build(&tree, body);
        let cond_block = cfg.block(cfg.entry()).fallthrough.expect("cond block");
        let then_start = cfg.block(cond_block).conditional.expect("then branch");
        assert_eq!(cfg.block(then_start).operations, vec![stmt, ret]);
        // The path leaves the routine at the return.
        assert_eq!(cfg.block(then_start).fallthrough, None);
        let join = cfg.block(cond_block).fallthrough.expect("join");
        assert_eq!(cfg.block(join).operations, vec![after]);
    }

    #[test]
    fn do_while_takes_the_back_edge_on_the_condition_branch() {
        let mut b = TreeBuilder::new();
        let stmt = b.leaf(SyntaxKind::Invocation, span(2));
        let loop_body = b.node(SyntaxKind::Block, span(2), vec![stmt]);
        let cond = b.leaf(SyntaxKind::Identifier, span(3));
        let do_while = b.node(SyntaxKind::DoWhile, span(1), vec![loop_body, cond]);
        let body = b.node(SyntaxKind::Block, span(1), vec![do_while]);
        let tree = b.finish(body);

        let cfg = ControlFlowGraph::build(&tree, body);
        let (body_start, _) = cfg
            .blocks()
            .find(|(_, blk)| blk.kind == BasicBlockKind::LoopHeader)
            .expect("loop body start");
        assert_eq!(cfg.block(body_start).operations, vec![stmt]);
        let (_, cond_blk) = cfg
            .blocks()
            .find(|(_, blk)| blk.kind == BasicBlockKind::Condition)
            .expect("condition block");
        assert_eq!(cond_blk.operations, vec![cond]);
        assert_eq!(cond_blk.conditional, Some(body_start));
        assert!(cond_blk.fallthrough.is_some());
    }

    #[test]
    fn while_loop_has_back_edge_to_header() {
        let mut b = TreeBuilder::new();
        let cond = b.leaf(SyntaxKind::Identifier, span(1));
        let stmt = b.leaf(SyntaxKind::Invocation, span(2));
        let loop_body = b.node(SyntaxKind::Block, span(2), vec![stmt]);
        let while_node = b.node(SyntaxKind::While, span(1), vec![cond, loop_body]);
        let body = b.node(SyntaxKind::Block, span(1), vec![while_node]);
        let tree = b.finish(body);

        let cfg = ControlFlowGraph::build(&tree, body);
        let (header, _) = cfg
            .blocks()
            .find(|(_, blk)| blk.kind == BasicBlockKind::LoopHeader)
            .expect("loop header");
        let body_block = cfg.block(header).conditional.expect("loop body");
        assert_eq!(cfg.block(body_block).fallthrough, Some(header));
    }
}
