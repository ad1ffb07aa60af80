//! Sibling-list splicing and parent stamping
//!
//! A list is the head node's id. The head caches the id of the current tail in
//! `last`, so appending never walks the chain.

use super::node::NodeList;
use super::pool::{NodeId, NodePool};
use crate::ael::error::PoolError;

/// Append `tail` (itself possibly a list) after `head` and return the head.
pub fn link(pool: &mut NodePool, head: NodeList, tail: NodeList) -> Result<NodeList, PoolError> {
    let Some(head_id) = head else {
        return Ok(tail);
    };
    let Some(tail_id) = tail else {
        return Ok(head);
    };

    let tail_end = pool.node(tail_id)?.last.unwrap_or(tail_id);
    let current_end = pool.node(head_id)?.last.unwrap_or(head_id);
    pool.node_mut(current_end)?.next = Some(tail_id);

    let head_node = pool.node_mut(head_id)?;
    head_node.last = Some(tail_end);
    if tail_id != head_id {
        pool.node_mut(tail_id)?.last = None;
    }
    Ok(head)
}

/// Stamp `parent` on every node of the top-level chain starting at `children`.
pub fn set_dads(pool: &mut NodePool, parent: NodeId, children: NodeList) -> Result<(), PoolError> {
    let mut cursor = children;
    while let Some(id) = cursor {
        let child = pool.node_mut(id)?;
        child.parent = Some(parent);
        cursor = child.next;
    }
    Ok(())
}

/// Iterator over the ids of a sibling chain
pub struct Siblings<'a> {
    pool: &'a NodePool,
    cursor: NodeList,
}

impl<'a> Iterator for Siblings<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cursor?;
        self.cursor = self.pool.get(id).and_then(|node| node.next);
        Some(id)
    }
}

pub fn siblings(pool: &NodePool, head: NodeList) -> Siblings<'_> {
    Siblings { pool, cursor: head }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ael::ast::node::{Node, NodeKind, NodeType};
    use crate::ael::ast::span::Span;

    fn word(pool: &mut NodePool, text: &str) -> NodeId {
        pool.alloc(Node::new(
            NodeType::Word,
            NodeKind::Word {
                text: text.into(),
                args: None,
            },
            Span::default(),
            "t.ael".into(),
        ))
    }

    fn texts(pool: &NodePool, head: NodeList) -> Vec<String> {
        siblings(pool, head)
            .map(|id| pool.node(id).unwrap().word().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_link_empty_head_returns_tail() {
        let mut pool = NodePool::new();
        let a = word(&mut pool, "a");
        assert_eq!(link(&mut pool, None, Some(a)).unwrap(), Some(a));
        assert_eq!(link(&mut pool, Some(a), None).unwrap(), Some(a));
    }

    #[test]
    fn test_link_appends_in_order_and_caches_tail() {
        let mut pool = NodePool::new();
        let mut list = None;
        let mut ids = Vec::new();
        for text in ["a", "b", "c", "d"] {
            let id = word(&mut pool, text);
            ids.push(id);
            list = link(&mut pool, list, Some(id)).unwrap();
        }
        assert_eq!(texts(&pool, list), vec!["a", "b", "c", "d"]);
        assert_eq!(pool.node(ids[0]).unwrap().last, Some(ids[3]));
    }

    #[test]
    fn test_link_splices_whole_lists() {
        let mut pool = NodePool::new();
        let a = word(&mut pool, "a");
        let b = word(&mut pool, "b");
        let c = word(&mut pool, "c");
        let d = word(&mut pool, "d");
        let first = link(&mut pool, Some(a), Some(b)).unwrap();
        let second = link(&mut pool, Some(c), Some(d)).unwrap();
        let joined = link(&mut pool, first, second).unwrap();
        assert_eq!(texts(&pool, joined), vec!["a", "b", "c", "d"]);

        let e = word(&mut pool, "e");
        let joined = link(&mut pool, joined, Some(e)).unwrap();
        assert_eq!(texts(&pool, joined), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_set_dads_only_touches_top_level() {
        let mut pool = NodePool::new();
        let parent = word(&mut pool, "parent");
        let a = word(&mut pool, "a");
        let b = word(&mut pool, "b");
        let nested = word(&mut pool, "nested");
        if let NodeKind::Word { args, .. } = &mut pool.node_mut(a).unwrap().kind {
            *args = Some(nested);
        }
        let list = link(&mut pool, Some(a), Some(b)).unwrap();
        set_dads(&mut pool, parent, list).unwrap();

        assert_eq!(pool.node(a).unwrap().parent(), Some(parent));
        assert_eq!(pool.node(b).unwrap().parent(), Some(parent));
        assert_eq!(pool.node(nested).unwrap().parent(), None);
    }
}
