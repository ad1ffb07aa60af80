//! Raw captures, spans and includes as seen through the parser

use ael::ael::ast::{NodeKind, Visitor};
use ael::ael::ast::{Node, NodeId};
use ael::ael::testing::assert_tree;
use ael::{parse_file, parse_str, Ast, ParseOptions};
use rstest::rstest;
use std::fs;
use std::path::PathBuf;

fn parse(src: &str) -> Ast {
    let _ = env_logger::builder().is_test(true).try_init();
    parse_str(src, "t.ael", &ParseOptions::quiet())
}

fn first_statement_kind(ast: &Ast) -> NodeKind {
    let ctx = ast.objects()[0];
    let ext = ast.children(ctx)[0][0];
    let stmt = ast.children(ext)[0][0];
    ast.node(stmt).unwrap().kind.clone()
}

#[test]
fn test_for_clauses_are_captured_verbatim() {
    let ast = parse("context c {\n    s => for (x=$[(1+2)*3]; ${x} < f(1;2); x=${x} + (1)) NoOp();\n}\n");
    assert_tree(&ast).no_errors();
    match first_statement_kind(&ast) {
        NodeKind::For {
            init,
            test,
            increment,
            body,
        } => {
            assert_eq!(init, "x=$[(1+2)*3]");
            assert_eq!(test, "${x} < f(1;2)");
            assert_eq!(increment, "x=${x} + (1)");
            assert!(body.is_some());
        }
        other => panic!("expected a for loop, got {:?}", other),
    }
}

#[rstest]
#[case("if (${A} = (1)) NoOp();", "${A} = (1)")]
#[case("if ( \"${CALLERID(num)}\" = \"\" ) NoOp();", "\"${CALLERID(num)}\" = \"\"")]
#[case("while ($[${I} < 10]) NoOp();", "$[${I} < 10]")]
#[case("random (30) NoOp();", "30")]
fn test_conditions_keep_nested_parentheses(#[case] stmt: &str, #[case] expected: &str) {
    let ast = parse(&format!("context c {{ s => {} }}", stmt));
    assert_tree(&ast).no_errors().object(0, |ctx| {
        ctx.child(0, |ext| {
            ext.child(0, |cond| {
                cond.label(expected);
            });
        });
    });
}

#[test]
fn test_call_arguments_split_only_at_top_level() {
    let ast = parse("context c { s => Set(R=${IF($[${X} > 1]?a,b:c)},x); }");
    assert_tree(&ast).no_errors().object(0, |ctx| {
        ctx.child(0, |ext| {
            ext.child(0, |call| {
                call.assert_call().words(0, &["R=${IF($[${X} > 1]?a,b:c)}", "x"]);
            });
        });
    });
}

#[test]
fn test_assignment_value_runs_to_semicolon() {
    let ast = parse("globals { GREETING=Hello, world (really); }");
    assert_tree(&ast).no_errors().object(0, |g| {
        g.child(0, |v| {
            v.assert_vardec().value("Hello, world (really)");
        });
    });
}

#[test]
fn test_mismatched_bracket_is_reported() {
    let ast = parse("context c { s => Set(a=b]); }");
    assert_tree(&ast).diagnostic_containing("Mismatched ']' in expression");
    assert!(ast.errors() >= 1);
}

#[test]
fn test_spans_use_tab_stops() {
    let ast = parse("context c {\n\ts => NoOp();\n}\n");
    assert_tree(&ast).no_errors().object(0, |ctx| {
        ctx.span(1, 1, 3, 1).child(0, |ext| {
            ext.span(2, 9, 2, 20).child(0, |call| {
                call.span(2, 14, 2, 20);
            });
        });
    });
}

struct SpanCheck(Vec<String>);

impl Visitor for SpanCheck {
    fn enter(&mut self, id: NodeId, node: &Node, _depth: usize) {
        if node.span.end < node.span.start {
            self.0.push(format!("{} {} {}", id, node.node_type, node.span));
        }
    }
}

#[test]
fn test_every_span_is_ordered() {
    let src = fs::read_to_string("docs/samples/010-dialplan.ael").unwrap();
    let ast = parse_str(&src, "010-dialplan.ael", &ParseOptions::quiet());
    let mut check = SpanCheck(Vec::new());
    ast.walk(&mut check);
    assert!(check.0.is_empty(), "reversed spans: {:?}", check.0);
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ael-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_included_nodes_carry_their_file() {
    let dir = scratch_dir("include");
    fs::write(dir.join("main.ael"), "context main {\n#include \"exts.ael\"\n}\n").unwrap();
    fs::write(dir.join("exts.ael"), "s => NoOp();\nt => NoOp();\n").unwrap();

    let ast = parse_file(&dir.join("main.ael"), &ParseOptions::quiet()).unwrap();
    assert_tree(&ast).no_errors().no_leaks().object(0, |ctx| {
        ctx.child_count(2);
    });
    let ctx = ast.objects()[0];
    assert!(ast.node(ctx).unwrap().filename.ends_with("main.ael"));
    for ext in &ast.children(ctx)[0] {
        let node = ast.node(*ext).unwrap();
        assert!(node.filename.ends_with("exts.ael"), "{}", node.filename);
    }
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_include_cycle_is_reported() {
    let dir = scratch_dir("cycle");
    fs::write(dir.join("a.ael"), "#include \"b.ael\"\ncontext a { }\n").unwrap();
    fs::write(dir.join("b.ael"), "#include \"a.ael\"\n").unwrap();

    let ast = parse_file(&dir.join("a.ael"), &ParseOptions::quiet()).unwrap();
    assert_tree(&ast)
        .error_count(1)
        .diagnostic_containing("Include loop")
        .object_count(1);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_unreadable_file_is_an_error_value() {
    let result = parse_file(
        std::path::Path::new("/nonexistent/dir/nothing.ael"),
        &ParseOptions::quiet(),
    );
    assert!(result.is_err());
}
