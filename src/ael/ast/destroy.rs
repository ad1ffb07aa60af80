//! Tree teardown
//!
//! [`destroy_node`] releases one node together with the lists its payload
//! owns. It never follows `next`: siblings belong to whoever owns the chain,
//! and that owner tears them down with [`destroy_list`]. `parent` is never read.

use super::links::siblings;
use super::node::NodeList;
use super::pool::{NodeId, NodePool};
use crate::ael::error::PoolError;

pub fn destroy_node(pool: &mut NodePool, id: NodeId) -> Result<(), PoolError> {
    let owned = match pool.get(id) {
        Some(node) => node.kind.child_lists(),
        None => return pool.release(id).map(|_| ()),
    };
    for list in owned {
        destroy_list(pool, list)?;
    }
    pool.release(id)?;
    Ok(())
}

pub fn destroy_list(pool: &mut NodePool, head: NodeList) -> Result<(), PoolError> {
    let mut cursor = head;
    while let Some(id) = cursor {
        cursor = pool.get(id).and_then(|node| node.next);
        destroy_node(pool, id)?;
    }
    Ok(())
}

/// Number of nodes reachable from `head` through payload lists and `next`.
pub fn count_reachable(pool: &NodePool, head: NodeList) -> usize {
    siblings(pool, head)
        .map(|id| {
            let nested: usize = pool
                .get(id)
                .map(|node| {
                    node.kind
                        .child_lists()
                        .into_iter()
                        .map(|list| count_reachable(pool, list))
                        .sum()
                })
                .unwrap_or(0);
            nested + 1
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ael::ast::links::link;
    use crate::ael::ast::node::{Node, NodeKind, NodeType};
    use crate::ael::ast::span::Span;

    fn alloc(pool: &mut NodePool, node_type: NodeType, kind: NodeKind) -> NodeId {
        pool.alloc(Node::new(node_type, kind, Span::default(), "t.ael".into()))
    }

    fn word(pool: &mut NodePool, text: &str) -> NodeId {
        alloc(
            pool,
            NodeType::Word,
            NodeKind::Word {
                text: text.into(),
                args: None,
            },
        )
    }

    fn block(pool: &mut NodePool, statements: NodeList) -> NodeId {
        alloc(pool, NodeType::StatementBlock, NodeKind::StatementBlock { statements })
    }

    #[test]
    fn test_destroy_node_leaves_siblings_alone() {
        let mut pool = NodePool::new();
        let inner = word(&mut pool, "inner");
        let first = block(&mut pool, Some(inner));
        let second = word(&mut pool, "second");
        let list = link(&mut pool, Some(first), Some(second)).unwrap();

        destroy_node(&mut pool, first).unwrap();
        assert!(!pool.contains(inner));
        assert!(pool.contains(second));
        assert_eq!(pool.live(), 1);
        assert_eq!(list, Some(first));
    }

    #[test]
    fn test_destroy_list_frees_everything() {
        let mut pool = NodePool::new();
        let a = word(&mut pool, "a");
        let b = word(&mut pool, "b");
        let args = link(&mut pool, Some(a), Some(b)).unwrap();
        let call = alloc(
            &mut pool,
            NodeType::ApplicationCall,
            NodeKind::Call {
                name: "Dial".into(),
                args,
            },
        );
        let outer = block(&mut pool, Some(call));
        let tail = word(&mut pool, "tail");
        let list = link(&mut pool, Some(outer), Some(tail)).unwrap();

        assert_eq!(count_reachable(&pool, list), 5);
        destroy_list(&mut pool, list).unwrap();
        assert_eq!(pool.live(), 0);
        assert_eq!(pool.stale_releases(), 0);
    }

    #[test]
    fn test_second_destroy_is_rejected() {
        let mut pool = NodePool::new();
        let a = word(&mut pool, "a");
        destroy_node(&mut pool, a).unwrap();
        assert_eq!(destroy_node(&mut pool, a), Err(PoolError::Stale(a)));
        assert_eq!(pool.stale_releases(), 1);
    }
}
