//! Word-level productions
//!
//! The lexer splits text at punctuation, so several productions glue words
//! back together. Adjacent words are joined with no separator; `:` , `&`, `@`
//! and spaces are reinserted where the grammar consumed them.

use super::engine::{Parser, Step};
use crate::ael::ast::links::link;
use crate::ael::ast::node::NodeList;
use crate::ael::ast::span::Span;
use crate::ael::token::{TokenKind, TokenSource};

/// A word (or words joined into one) with the span it covers
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fragment {
    pub text: String,
    pub span: Span,
}

impl Fragment {
    pub(crate) fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    fn join(&mut self, separator: &str, other: Fragment) {
        self.text.push_str(separator);
        self.text.push_str(&other.text);
        self.span.extend_to(&other.span);
    }
}

impl<S: TokenSource> Parser<'_, S> {
    pub(crate) fn word(&mut self) -> Step<Fragment> {
        let token = self.expect(TokenKind::Word)?;
        Ok(Fragment::new(token.text.unwrap_or_default(), token.span))
    }

    /// `word | word word`
    pub(crate) fn word_list(&mut self) -> Step<Fragment> {
        let mut first = self.word()?;
        if self.at(TokenKind::Word) {
            let second = self.word()?;
            first.join("", second);
            self.ctx.prev_word = Some(first.text.clone());
        }
        Ok(first)
    }

    /// One to three adjacent words, joined; also returns how many were read.
    pub(crate) fn word3_list(&mut self) -> Step<(Fragment, usize)> {
        let mut joined = self.word()?;
        let mut count = 1;
        while count < 3 && self.at(TokenKind::Word) {
            let next = self.word()?;
            joined.join("", next);
            count += 1;
        }
        if count > 1 {
            self.ctx.prev_word = Some(joined.text.clone());
        }
        Ok((joined, count))
    }

    /// `word | default`
    pub(crate) fn context_name(&mut self) -> Step<Fragment> {
        match self.peek_kind() {
            TokenKind::Word => self.word(),
            TokenKind::Default => {
                let token = self.advance();
                Ok(Fragment::new("default", token.span))
            }
            _ => Err(self.syntax_error(&[TokenKind::Word, TokenKind::Default])),
        }
    }

    /// Words of a hint, joined by a space, `:` or `&` as written.
    pub(crate) fn hint_word(&mut self) -> Step<Fragment> {
        let mut hint = self.word()?;
        loop {
            let separator = match self.peek_kind() {
                TokenKind::Word => " ",
                TokenKind::Colon => ":",
                TokenKind::Amper => "&",
                _ => return Ok(hint),
            };
            if separator != " " {
                self.advance();
            }
            let next = self.word()?;
            hint.join(separator, next);
        }
    }

    /// `word | word word | goto_word : word`
    pub(crate) fn goto_word(&mut self) -> Step<Fragment> {
        let mut target = self.word()?;
        if self.at(TokenKind::Word) {
            let second = self.word()?;
            target.join("", second);
        }
        while self.at(TokenKind::Colon) {
            self.advance();
            let next = self.word()?;
            target.join(":", next);
        }
        Ok(target)
    }

    /// `a:b:c` built from three word groups, or a single word.
    fn timerange(&mut self) -> Step<Fragment> {
        let (mut range, count) = self.word3_list()?;
        if self.at(TokenKind::Colon) {
            self.advance();
            let (minutes, _) = self.word3_list()?;
            range.join(":", minutes);
            self.expect(TokenKind::Colon)?;
            let (rest, _) = self.word3_list()?;
            range.join(":", rest);
        } else if count > 1 {
            return Err(self.syntax_error(&[TokenKind::Colon]));
        }
        Ok(range)
    }

    /// `timerange | dow | dom | month`, as four Word nodes.
    pub(crate) fn timespec(&mut self) -> Step<NodeList> {
        let range = self.timerange()?;
        let mut parts = vec![range];
        for _ in 0..3 {
            self.expect(TokenKind::Bar)?;
            let (part, _) = self.word3_list()?;
            parts.push(part);
        }

        let mut list = None;
        for part in parts {
            let id = self.ctx.word_node(part.text, &part.span);
            list = link(&mut self.ctx.pool, list, Some(id))?;
        }
        Ok(list)
    }
}
