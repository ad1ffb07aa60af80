//! A normalized, owned copy of the tree
//!
//! Serializers work from [`AstSnapshot`] instead of walking the pool
//! themselves. Payload fields that are not child lists end up in
//! `attributes`; when a node owns more than one child list each child is
//! tagged with the `role` of the list it came from.

use crate::ael::ast::{Ast, Condition, Node, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstSnapshot {
    pub node_type: String,
    pub label: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<AstSnapshot>,
}

impl AstSnapshot {
    pub fn new(node_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            label: label.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Names of the child lists of `kind`, parallel to `NodeKind::child_lists`.
fn roles(kind: &NodeKind) -> Vec<&'static str> {
    match kind {
        NodeKind::Macro { .. } => vec!["arg", "statement"],
        NodeKind::Conditional { condition, .. } => match condition {
            Condition::TimeSpec(_) => vec!["time", "then", "else"],
            Condition::Expr(_) => vec!["then", "else"],
        },
        _ => Vec::new(),
    }
}

fn attributes(node: &Node, snapshot: AstSnapshot) -> AstSnapshot {
    let snapshot = snapshot
        .with_attribute("span", node.span.to_string())
        .with_attribute("file", node.filename.to_string());
    match &node.kind {
        NodeKind::Context { abstract_flag, .. } if *abstract_flag != 0 => {
            snapshot.with_attribute("abstract", abstract_flag.to_string())
        }
        NodeKind::VarDec { value, .. } => snapshot.with_attribute("value", value.clone()),
        NodeKind::Extension { regexten, hints, .. } => {
            let snapshot = if *regexten {
                snapshot.with_attribute("regexten", "true")
            } else {
                snapshot
            };
            match hints {
                Some(hints) => snapshot.with_attribute("hints", hints.clone()),
                None => snapshot,
            }
        }
        NodeKind::For {
            init,
            test,
            increment,
            ..
        } => snapshot
            .with_attribute("init", init.clone())
            .with_attribute("test", test.clone())
            .with_attribute("increment", increment.clone()),
        _ => snapshot,
    }
}

pub fn snapshot_node(ast: &Ast, id: NodeId) -> Option<AstSnapshot> {
    let node = ast.node(id)?;
    let base = AstSnapshot::new(node.node_type.name(), node.label().unwrap_or_default());
    let mut snapshot = attributes(node, base);

    let roles = roles(&node.kind);
    for (index, list) in ast.children(id).into_iter().enumerate() {
        for child in list {
            let Some(mut child) = snapshot_node(ast, child) else {
                continue;
            };
            if let Some(role) = roles.get(index) {
                child.attributes.insert("role".to_string(), role.to_string());
            }
            snapshot.children.push(child);
        }
    }
    Some(snapshot)
}

/// Snapshots of every top-level object, in order.
pub fn snapshot_ast(ast: &Ast) -> Vec<AstSnapshot> {
    ast.objects()
        .into_iter()
        .filter_map(|id| snapshot_node(ast, id))
        .collect()
}
