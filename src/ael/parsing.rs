//! Grammar engine
//!
//! Turns a [`TokenSource`] into a tree of pooled nodes. The grammar is
//! hand-written recursive descent over one token of lookahead, split by
//! level:
//!
//!     engine.rs      token plumbing, error reporting and recovery
//!     words.rs       word concatenation, hints, goto targets, time specs
//!     objects.rs     contexts, macros, globals and context elements
//!     statements.rs  statements of extension, macro and case bodies
//!
//! Errors never stop the parse early unless recovery runs into the end of
//! input. When the whole file cannot be salvaged the result has no root and
//! every node allocated during the parse has been released.

pub mod context;
mod engine;
mod objects;
mod statements;
mod words;

use crate::ael::ast::node::NodeList;
use crate::ael::token::TokenSource;
use context::ParseContext;
use engine::{Halt, Parser};

/// What a call to [`parse`] produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Head of the object list, or `None` when the file could not be parsed.
    pub root: NodeList,
    /// Errors reported during this call.
    pub errors: usize,
}

/// Parse everything `source` yields into `ctx.pool`.
pub fn parse<S: TokenSource>(source: S, ctx: &mut ParseContext) -> ParseOutcome {
    let errors_before = ctx.syntax_errors;
    let start = ctx.pool.mark();

    let result = {
        let mut parser = Parser::new(source, ctx);
        parser.file()
    };

    let root = match result {
        Ok(root) => root,
        Err(halt) => {
            if let Halt::Pool(err) = &halt {
                log::error!("parse abandoned: {}", err);
            }
            let released = ctx.pool.release_since(start);
            log::debug!("parse failed ({:?}), released {} nodes", halt, released);
            None
        }
    };
    ctx.pool.settle();

    ParseOutcome {
        root,
        errors: ctx.syntax_errors - errors_before,
    }
}
