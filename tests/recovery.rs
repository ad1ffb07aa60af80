//! Error reporting and recovery
//!
//! Every case here also checks that recovery never releases a node twice and
//! never leaves unreachable nodes behind.

use ael::ael::config::AelConfig;
use ael::ael::diagnostics::substitute_tokens;
use ael::ael::testing::assert_tree;
use ael::{parse_str, Ast, ParseOptions};
use rstest::rstest;
use std::fs;

fn parse(src: &str) -> Ast {
    let _ = env_logger::builder().is_test(true).try_init();
    parse_str(src, "t.ael", &ParseOptions::quiet())
}

fn messages(ast: &Ast) -> Vec<String> {
    ast.diagnostics().iter().map(|d| d.rendered.clone()).collect()
}

#[test]
fn test_missing_close_brace_drops_everything() {
    let ast = parse("context c {\n    s => NoOp();\n");
    assert_tree(&ast).no_root().no_leaks();
    assert!(ast.errors() >= 1);
    assert_eq!(ast.pool().live(), 0);
}

#[test]
fn test_empty_input_is_an_error() {
    let ast = parse("");
    assert_tree(&ast).no_root().error_count(1);
    assert_eq!(
        messages(&ast),
        vec!["==== File: t.ael, Line 1, Cols: 1-1: Error: syntax error, unexpected $end"]
    );
}

#[test]
fn test_missing_semicolon_after_call() {
    let ast = parse("context c {\n    s => NoOp()\n}\n");
    assert_eq!(
        messages(&ast),
        vec!["==== File: t.ael, Line 3, Cols: 1-1: Error: syntax error, unexpected '}', expecting ';' or '='"]
    );
    assert_tree(&ast).error_count(1).no_leaks().object(0, |ctx| {
        ctx.assert_context().child_count(0);
    });
}

#[test]
fn test_recovery_corpus_sample() {
    let src = fs::read_to_string("docs/samples/020-recovery.ael").unwrap();
    let ast = parse_str(&src, "020-recovery.ael", &ParseOptions::quiet());
    assert_tree(&ast)
        .error_count(1)
        .no_leaks()
        .object_count(3)
        .object(0, |ctx| {
            ctx.label("good").child_count(1);
        })
        .object(1, |ctx| {
            ctx.label("broken").child_count(1).child(0, |ext| {
                ext.assert_extension().label("t");
            });
        })
        .object(2, |ctx| {
            ctx.label("after").child_count(1);
        });
    assert_eq!(
        messages(&ast),
        vec!["==== File: 020-recovery.ael, Line 7, Cols: 5-5: Error: syntax error, unexpected word, expecting ';' or '='"]
    );
}

#[test]
fn test_garbage_between_contexts() {
    let ast = parse("context a { }\n= = =\ncontext b { }\n");
    assert_tree(&ast).error_count(1).no_leaks().object_count(2);
}

#[test]
fn test_bad_statement_in_block_drops_the_block_prefix() {
    let ast = parse("context c {\n    s => {\n        NoOp(1);\n        = ;\n        NoOp(2);\n    }\n}\n");
    assert_tree(&ast).error_count(1).no_leaks().object(0, |ctx| {
        ctx.child(0, |ext| {
            ext.child(0, |block| {
                block.child_count(1).child(0, |call| {
                    call.assert_call().words(0, &["2"]);
                });
            });
        });
    });
}

#[rstest]
#[case("context c { s => ; ")]
#[case("context c { s => { ")]
#[case("macro m( { }")]
#[case("globals { A = ")]
#[case("context c { includes { a; b |")]
#[case("context c { switches { a@")]
#[case("context c { s => if (")]
#[case("context c { s => for (a; b; c) ")]
#[case("context c { s => switch (x) { case 1: NoOp(); ")]
#[case("}}}}")]
fn test_truncated_input_leaves_nothing_behind(#[case] src: &str) {
    let ast = parse(src);
    assert!(ast.errors() >= 1, "no error for {:?}", src);
    assert_tree(&ast).no_root().no_leaks();
    assert_eq!(ast.pool().live(), 0);
}

#[rstest]
#[case("unexpected KW_IF here", "unexpected 'if' here")]
#[case("unexpected KW_IFTIME", "unexpected 'ifTime'")]
#[case("expecting KW_SWITCHES or KW_SWITCH", "expecting 'switches' or 'switch'")]
#[case("unexpected EXTENMARK, expecting EQ", "unexpected '=>', expecting '='")]
#[case("unexpected $end", "unexpected $end")]
fn test_keyword_substitution(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(substitute_tokens(raw), expected);
}

#[test]
fn test_premature_end_inside_condition() {
    let ast = parse("context c {\n    s => if (${A}\n\n");
    let rendered = messages(&ast);
    assert!(ast.errors() >= 1);
    assert!(
        rendered.iter().any(|m| m.contains("Premature end of file inside an expression")),
        "{:?}",
        rendered
    );
}

#[test]
fn test_multiline_error_location() {
    let ast = parse("context c {\n    s => Set(a=(b\n]);\n}\n");
    let rendered = messages(&ast);
    assert!(
        rendered.iter().any(|m| m
            == "==== File: t.ael, Line 2 Col 14  to Line 3 Col 1: Error: Mismatched ']' in expression"),
        "{:?}",
        rendered
    );
}

#[test]
fn test_depth_limit_is_configurable() {
    let mut config = AelConfig::default();
    config.parser.max_depth = 3;
    let options = ParseOptions {
        log_diagnostics: false,
        ..ParseOptions::new(config)
    };
    let ast = parse_str("context c { s => { { { { NoOp(); } } } } }", "t.ael", &options);
    assert_tree(&ast)
        .no_root()
        .no_leaks()
        .diagnostic_containing("memory exhausted");
}
