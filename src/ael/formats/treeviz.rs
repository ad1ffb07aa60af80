//! Treeviz: one line per node, nesting drawn with box characters
//!
//!     └─ Context default [1:1-3:1]
//!       └─ Extension s [2:5-2:16]
//!         └─ ApplicationCall NoOp [2:10-2:16]
//!
//! Labels longer than 40 characters are truncated. Children of nodes with
//! several child lists are prefixed with their role (`then:`, `else:`).

use super::snapshot::{snapshot_ast, AstSnapshot};
use crate::ael::ast::Ast;

const MAX_LABEL: usize = 40;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated: String = s.chars().take(max_chars).collect();
        truncated.push('…');
        truncated
    } else {
        s.to_string()
    }
}

pub fn to_treeviz_str(ast: &Ast) -> String {
    let objects = snapshot_ast(ast);
    let mut result = String::new();
    append_children(&mut result, &objects, "");
    result
}

fn append_node(result: &mut String, node: &AstSnapshot, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };
    result.push_str(prefix);
    result.push_str(connector);
    result.push(' ');
    if let Some(role) = node.attribute("role") {
        result.push_str(role);
        result.push_str(": ");
    }
    result.push_str(&node.node_type);
    if !node.label.is_empty() {
        result.push(' ');
        result.push_str(&truncate(&node.label, MAX_LABEL));
    }
    if let Some(span) = node.attribute("span") {
        result.push_str(&format!(" [{}]", span));
    }
    result.push('\n');

    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    append_children(result, &node.children, &child_prefix);
}

fn append_children(result: &mut String, children: &[AstSnapshot], prefix: &str) {
    for (i, child) in children.iter().enumerate() {
        append_node(result, child, prefix, i + 1 == children.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ael::{parse_str, ParseOptions};

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }

    #[test]
    fn test_treeviz_of_small_file() {
        let src = "context incoming {\n    s => Answer();\n};\nglobals { }\n";
        let ast = parse_str(src, "t.ael", &ParseOptions::quiet());
        insta::assert_snapshot!(to_treeviz_str(&ast), @r###"
        ├─ Context incoming [1:1-3:1]
        │ └─ Extension s [2:5-2:18]
        │   └─ ApplicationCall Answer [2:10-2:18]
        └─ Globals [4:1-4:11]
        "###);
    }
}
