//! The result of a parse
//!
//! [`Ast`] owns the node pool and the head of the object list. Dropping it
//! tears the tree down through [`destroy_list`], so a leak shows up as live
//! nodes left in the pool rather than going unnoticed.

use super::destroy::destroy_list;
use super::links::siblings;
use super::node::{Node, NodeList};
use super::pool::{NodeId, NodePool};
use crate::ael::diagnostics::Diagnostic;

/// Walks the tree in source order
///
/// Both methods default to doing nothing; override the ones you need.
pub trait Visitor {
    fn enter(&mut self, _id: NodeId, _node: &Node, _depth: usize) {}
    fn leave(&mut self, _id: NodeId, _node: &Node, _depth: usize) {}
}

#[derive(Debug)]
pub struct Ast {
    pool: NodePool,
    root: NodeList,
    diagnostics: Vec<Diagnostic>,
    errors: usize,
}

impl Ast {
    pub fn new(pool: NodePool, root: NodeList, diagnostics: Vec<Diagnostic>, errors: usize) -> Self {
        Self {
            pool,
            root,
            diagnostics,
            errors,
        }
    }

    /// Head of the top-level object list.
    pub fn root(&self) -> NodeList {
        self.root
    }

    /// Ids of the top-level objects.
    pub fn objects(&self) -> Vec<NodeId> {
        siblings(&self.pool, self.root).collect()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.pool.get(id)
    }

    pub fn pool(&self) -> &NodePool {
        &self.pool
    }

    /// Syntax and lexical errors reported while parsing.
    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The payload lists of `id`, each flattened into sibling ids, in source
    /// order.
    pub fn children(&self, id: NodeId) -> Vec<Vec<NodeId>> {
        self.pool
            .get(id)
            .map(|node| {
                node.kind
                    .child_lists()
                    .into_iter()
                    .map(|list| siblings(&self.pool, list).collect())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.pool.get(id).and_then(Node::parent)
    }

    /// Depth-first walk over every node reachable from the root.
    pub fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.walk_list(self.root, 0, visitor);
    }

    fn walk_list<V: Visitor + ?Sized>(&self, head: NodeList, depth: usize, visitor: &mut V) {
        for id in siblings(&self.pool, head) {
            let Some(node) = self.pool.get(id) else {
                continue;
            };
            visitor.enter(id, node, depth);
            for list in node.kind.child_lists() {
                self.walk_list(list, depth + 1, visitor);
            }
            visitor.leave(id, node, depth);
        }
    }

    /// Take the pool and root out without tearing the tree down.
    pub fn into_parts(mut self) -> (NodePool, NodeList, Vec<Diagnostic>) {
        let pool = std::mem::take(&mut self.pool);
        let root = self.root.take();
        let diagnostics = std::mem::take(&mut self.diagnostics);
        (pool, root, diagnostics)
    }
}

impl Drop for Ast {
    fn drop(&mut self) {
        if let Err(err) = destroy_list(&mut self.pool, self.root.take()) {
            log::error!("tearing down the tree failed: {}", err);
        }
    }
}
