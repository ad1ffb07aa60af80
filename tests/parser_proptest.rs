//! Property-based tests for the grammar engine
//!
//! Token sequences are generated directly, bypassing the lexer, so the
//! engine sees every kind of terminal in every order. Whatever the input,
//! a parse must finish, must never release a node twice and must leave
//! exactly the nodes reachable from the root alive.

use ael::ael::ast::{count_reachable, Span};
use ael::ael::config::AelConfig;
use ael::ael::diagnostics::NullSink;
use ael::ael::parsing::context::ParseContext;
use ael::ael::parsing::parse;
use ael::ael::token::{Token, TokenKind, TokenQueue};
use ael::{parse_str, ParseOptions};
use proptest::prelude::*;
use std::sync::Arc;

const KINDS: &[TokenKind] = &[
    TokenKind::Context,
    TokenKind::Lc,
    TokenKind::Rc,
    TokenKind::Lp,
    TokenKind::Rp,
    TokenKind::Semi,
    TokenKind::Eq,
    TokenKind::Comma,
    TokenKind::Colon,
    TokenKind::Amper,
    TokenKind::Bar,
    TokenKind::At,
    TokenKind::Macro,
    TokenKind::Globals,
    TokenKind::Ignorepat,
    TokenKind::Switch,
    TokenKind::If,
    TokenKind::IfTime,
    TokenKind::Else,
    TokenKind::Random,
    TokenKind::Abstract,
    TokenKind::Extend,
    TokenKind::ExtenMark,
    TokenKind::Goto,
    TokenKind::Jump,
    TokenKind::Return,
    TokenKind::Break,
    TokenKind::Continue,
    TokenKind::Regexten,
    TokenKind::Hint,
    TokenKind::For,
    TokenKind::While,
    TokenKind::Case,
    TokenKind::Pattern,
    TokenKind::Default,
    TokenKind::Catch,
    TokenKind::Switches,
    TokenKind::ESwitches,
    TokenKind::Includes,
    TokenKind::Word,
];

fn token_kinds() -> impl Strategy<Value = Vec<TokenKind>> {
    // Words and braces are weighted up so that some inputs get deep into
    // the grammar instead of failing on the first token.
    let kind = prop_oneof![
        3 => Just(TokenKind::Word),
        2 => Just(TokenKind::Lc),
        2 => Just(TokenKind::Rc),
        2 => Just(TokenKind::Semi),
        1 => Just(TokenKind::Context),
        1 => Just(TokenKind::ExtenMark),
        4 => prop::sample::select(KINDS),
    ];
    prop::collection::vec(kind, 0..80)
}

fn tokens_for(kinds: &[TokenKind], file: &Arc<str>) -> Vec<Token> {
    kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let span = Span::from_coords(1, i + 1, 1, i + 1);
            if *kind == TokenKind::Word {
                Token::word(format!("w{}", i), span, file.clone())
            } else {
                Token::new(*kind, span, file.clone())
            }
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_pool_matches_tree(kinds in token_kinds()) {
        let file: Arc<str> = Arc::from("prop.ael");
        let mut ctx = ParseContext::new(file.clone(), AelConfig::default().parser)
            .with_sink(Box::new(NullSink));
        let outcome = parse(TokenQueue::new(tokens_for(&kinds, &file), file), &mut ctx);

        prop_assert_eq!(ctx.pool.stale_releases(), 0);
        prop_assert_eq!(ctx.pool.live(), count_reachable(&ctx.pool, outcome.root));
        if outcome.root.is_none() && outcome.errors > 0 {
            prop_assert_eq!(ctx.pool.live(), 0);
        }
    }

    #[test]
    fn prop_prefixed_valid_input_survives(kinds in token_kinds()) {
        // A valid context followed by noise: the context is always kept
        // unless recovery runs into the end of input.
        let file: Arc<str> = Arc::from("prop.ael");
        let mut all = vec![
            TokenKind::Context,
            TokenKind::Word,
            TokenKind::Lc,
            TokenKind::Rc,
        ];
        all.extend(kinds);
        let mut ctx = ParseContext::new(file.clone(), AelConfig::default().parser)
            .with_sink(Box::new(NullSink));
        let outcome = parse(TokenQueue::new(tokens_for(&all, &file), file), &mut ctx);

        prop_assert_eq!(ctx.pool.stale_releases(), 0);
        prop_assert_eq!(ctx.pool.live(), count_reachable(&ctx.pool, outcome.root));
    }

    #[test]
    fn prop_source_text_never_panics(src in "[a-z{}();=>,|:&@ \n\\[\\]$]{0,120}") {
        let ast = parse_str(&src, "prop.ael", &ParseOptions::quiet());
        prop_assert_eq!(ast.pool().stale_releases(), 0);
        prop_assert_eq!(ast.pool().live(), count_reachable(ast.pool(), ast.root()));
    }
}
