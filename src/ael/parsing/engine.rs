//! Token plumbing and error recovery for the grammar engine
//!
//!     The grammar is parsed by recursive descent with one token of lookahead.
//!     The lookahead is fetched lazily: after consuming a `(` or `=` the
//!     grammar can still switch the token source into a raw mode before the
//!     next token is produced.
//!
//! Recovery
//!
//!     Recovery follows the classic yacc discipline. A syntax error is reported
//!     only when the recovery status is 0. The error then travels up to the
//!     closest production that has an `error` alternative (a recovery site).
//!     Nodes allocated since the site started the failed item are released,
//!     and some sites also destroy the list they had built. The status is then
//!     set to 3. Each consumed token lowers the status by one. An error at
//!     status 3 drops the offending token without a report, or aborts the
//!     parse when that token is the end of input.

use crate::ael::ast::destroy::destroy_list;
use crate::ael::ast::node::NodeList;
use crate::ael::ast::pool::AllocMark;
use crate::ael::ast::span::Span;
use crate::ael::error::PoolError;
use crate::ael::parsing::context::ParseContext;
use crate::ael::token::{RawMode, Token, TokenKind, TokenSource};
use std::sync::Arc;

/// Why a production stopped
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Halt {
    /// A syntax error, waiting for a recovery site.
    Syntax,
    /// The parse cannot continue.
    Abort,
    /// Internal inconsistency in the node pool.
    Pool(PoolError),
}

impl From<PoolError> for Halt {
    fn from(err: PoolError) -> Self {
        Halt::Pool(err)
    }
}

pub(crate) type Step<T> = Result<T, Halt>;

/// Expected-token lists longer than this are left out of messages.
const MAX_EXPECTED: usize = 4;

pub(crate) struct Parser<'c, S: TokenSource> {
    source: S,
    pub(crate) ctx: &'c mut ParseContext,
    lookahead: Option<Token>,
    /// Span of the last consumed token.
    pub(crate) previous: Span,
    err_status: u8,
    depth: usize,
}

impl<'c, S: TokenSource> Parser<'c, S> {
    pub(crate) fn new(source: S, ctx: &'c mut ParseContext) -> Self {
        Self {
            source,
            ctx,
            lookahead: None,
            previous: Span::default(),
            err_status: 0,
            depth: 0,
        }
    }

    fn fetch(&mut self) -> Token {
        let token = self.source.next_token();
        for issue in self.source.take_issues() {
            self.ctx.report_lexical(issue);
        }
        token
    }

    pub(crate) fn peek(&mut self) -> &Token {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.fetch(),
        };
        self.lookahead.insert(token)
    }

    pub(crate) fn peek_kind(&mut self) -> TokenKind {
        self.peek().kind
    }

    pub(crate) fn at(&mut self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Consume the lookahead.
    pub(crate) fn advance(&mut self) -> Token {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.fetch(),
        };
        if !Arc::ptr_eq(&self.ctx.current_file, &token.file) {
            self.ctx.current_file = token.file.clone();
        }
        self.previous = token.span;
        self.err_status = self.err_status.saturating_sub(1);
        log::trace!("shift {} {:?} at {}", token.kind, token.text, token.span);
        token
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Step<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.syntax_error(&[kind]))
        }
    }

    /// Switch the token source into a raw mode for the next token.
    pub(crate) fn begin_raw(&mut self, mode: RawMode) {
        if let Some(token) = &self.lookahead {
            log::warn!("raw mode {:?} requested with {} already read", mode, token.kind);
        }
        self.source.begin_raw(mode, self.ctx.prev_word.as_deref());
    }

    /// Report an unexpected lookahead (subject to the recovery status) and
    /// return the halt to propagate. An empty `expected` means "too many to
    /// list".
    pub(crate) fn syntax_error(&mut self, expected: &[TokenKind]) -> Halt {
        let token = self.peek().clone();
        if self.err_status == 0 {
            let mut msg = format!("syntax error, unexpected {}", token.kind.internal_name());
            let mut expected = expected.to_vec();
            expected.sort();
            expected.dedup();
            if !expected.is_empty() && expected.len() <= MAX_EXPECTED {
                let names: Vec<&str> = expected.iter().map(TokenKind::internal_name).collect();
                msg.push_str(", expecting ");
                msg.push_str(&names.join(" or "));
            }
            self.ctx.report_error(token.file.clone(), token.span, &msg);
        }
        if self.err_status == 3 {
            if token.is(TokenKind::Eof) {
                log::debug!("end of input while recovering from an error");
                return Halt::Abort;
            }
            log::debug!("discarding {} while recovering", token.kind);
            self.lookahead = None;
        }
        Halt::Syntax
    }

    /// Recovery site that keeps everything built before the failed item.
    pub(crate) fn resume(&mut self, halt: Halt, mark: AllocMark) -> Step<()> {
        match halt {
            Halt::Syntax => {
                let released = self.ctx.pool.release_since(mark);
                log::debug!("recovered from syntax error, released {} nodes", released);
                self.err_status = 3;
                Ok(())
            }
            other => Err(other),
        }
    }

    /// Recovery site that also destroys the list built so far.
    pub(crate) fn resume_discarding(&mut self, halt: Halt, mark: AllocMark, list: &mut NodeList) -> Step<()> {
        self.resume(halt, mark)?;
        destroy_list(&mut self.ctx.pool, list.take())?;
        Ok(())
    }

    /// Run `f` one nesting level deeper; past the configured depth the parse
    /// is aborted.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Step<T>) -> Step<T> {
        if self.depth >= self.ctx.config.max_depth {
            let token = self.peek().clone();
            self.ctx.report_error(token.file, token.span, "memory exhausted");
            return Err(Halt::Abort);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
