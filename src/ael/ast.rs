//! Parse tree
//!
//! Nodes live in a [`NodePool`] and refer to each other by [`NodeId`]. A list
//! of children is the id of its first node; the rest hang off `next`.

pub mod destroy;
pub mod links;
pub mod node;
pub mod pool;
pub mod span;
pub mod tree;

pub use destroy::{count_reachable, destroy_list, destroy_node};
pub use links::{link, set_dads, siblings};
pub use node::{Condition, Node, NodeKind, NodeList, NodeType};
pub use pool::{AllocMark, NodeId, NodePool};
pub use span::{Position, Span};
pub use tree::{Ast, Visitor};
