//! Top-level objects and context elements
//!
//! Contexts, macros and globals blocks, and everything that can appear
//! directly inside a context: extensions, assignments, includes, switches
//! and ignore patterns.

use super::engine::{Parser, Step};
use super::words::Fragment;
use crate::ael::ast::links::{link, set_dads};
use crate::ael::ast::node::{NodeKind, NodeList, NodeType};
use crate::ael::ast::pool::NodeId;
use crate::ael::ast::span::Span;
use crate::ael::token::{RawMode, TokenKind, TokenSource};

fn starts_element(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Word
            | TokenKind::Regexten
            | TokenKind::Hint
            | TokenKind::Includes
            | TokenKind::Switches
            | TokenKind::ESwitches
            | TokenKind::Ignorepat
            | TokenKind::Semi
    )
}

impl<S: TokenSource> Parser<'_, S> {
    /// `file: objects`. An empty file is a syntax error.
    pub(crate) fn file(&mut self) -> Step<NodeList> {
        let mut objects = None;
        let mut parsed_any = false;
        loop {
            if parsed_any && self.at(TokenKind::Eof) {
                return Ok(objects);
            }
            let mark = self.ctx.pool.mark();
            match self.object() {
                Ok(object) => {
                    objects = link(&mut self.ctx.pool, objects, object)?;
                    parsed_any = true;
                }
                // `objects error` needs at least one object before it.
                Err(halt) if parsed_any => self.resume(halt, mark)?,
                Err(halt) => return Err(halt),
            }
        }
    }

    fn object(&mut self) -> Step<NodeList> {
        match self.peek_kind() {
            TokenKind::Context | TokenKind::Abstract | TokenKind::Extend => self.context().map(Some),
            TokenKind::Macro => self.macro_definition().map(Some),
            TokenKind::Globals => self.globals().map(Some),
            TokenKind::Semi => {
                self.advance();
                Ok(None)
            }
            _ => Err(self.syntax_error(&[])),
        }
    }

    /// The `abstract`/`extend` prefix of a context.
    fn context_qualifiers(&mut self) -> u8 {
        match self.peek_kind() {
            TokenKind::Abstract => {
                self.advance();
                if self.at(TokenKind::Extend) {
                    self.advance();
                    3
                } else {
                    1
                }
            }
            TokenKind::Extend => {
                self.advance();
                if self.at(TokenKind::Abstract) {
                    self.advance();
                    3
                } else {
                    2
                }
            }
            _ => 0,
        }
    }

    fn context(&mut self) -> Step<NodeId> {
        let first = self.peek().span;
        let abstract_flag = self.context_qualifiers();
        self.expect(TokenKind::Context)?;
        let name = self.context_name()?;
        self.expect(TokenKind::Lc)?;
        let statements = self.elements()?;
        let rc = self.expect(TokenKind::Rc)?;

        let id = self.ctx.node_between(
            NodeType::Context,
            NodeKind::Context {
                name: name.text,
                statements,
                abstract_flag,
            },
            &first,
            &rc.span,
        );
        set_dads(&mut self.ctx.pool, id, statements)?;
        Ok(id)
    }

    fn macro_definition(&mut self) -> Step<NodeId> {
        let kw = self.advance();
        let name = self.word()?;
        self.expect(TokenKind::Lp)?;
        let args = self.arglist()?;
        self.expect(TokenKind::Rp)?;
        self.expect(TokenKind::Lc)?;
        let statements = self.macro_statements()?;
        let rc = self.expect(TokenKind::Rc)?;

        let id = self.ctx.node_between(
            NodeType::Macro,
            NodeKind::Macro {
                name: name.text,
                args,
                statements,
            },
            &kw.span,
            &rc.span,
        );
        set_dads(&mut self.ctx.pool, id, statements)?;
        Ok(id)
    }

    /// Formal parameters of a macro. `arglist error` keeps what was read.
    fn arglist(&mut self) -> Step<NodeList> {
        let mut list = None;
        let mut first = true;
        loop {
            let mark = self.ctx.pool.mark();
            let item = match self.peek_kind() {
                TokenKind::Rp => return Ok(list),
                TokenKind::Word if first => self.word(),
                TokenKind::Comma => {
                    self.advance();
                    self.word()
                }
                _ if first => Err(self.syntax_error(&[TokenKind::Rp, TokenKind::Comma, TokenKind::Word])),
                _ => Err(self.syntax_error(&[TokenKind::Rp, TokenKind::Comma])),
            };
            first = false;
            match item {
                Ok(word) => {
                    let id = self.ctx.word_node(word.text, &word.span);
                    list = link(&mut self.ctx.pool, list, Some(id))?;
                }
                Err(halt) => self.resume(halt, mark)?,
            }
        }
    }

    fn macro_statements(&mut self) -> Step<NodeList> {
        let mut list = None;
        loop {
            let item = match self.peek_kind() {
                TokenKind::Includes => Some(self.includes()?),
                TokenKind::Catch => Some(self.catch_block()?),
                kind if super::statements::starts_statement(kind) => self.statement()?,
                _ => return Ok(list),
            };
            list = link(&mut self.ctx.pool, list, item)?;
        }
    }

    fn catch_block(&mut self) -> Step<NodeId> {
        let kw = self.advance();
        let name = self.word()?;
        self.expect(TokenKind::Lc)?;
        let statements = self.statements(false)?;
        let rc = self.expect(TokenKind::Rc)?;
        let id = self.ctx.node_between(
            NodeType::Catch,
            NodeKind::Catch {
                name: name.text,
                statements,
            },
            &kw.span,
            &rc.span,
        );
        set_dads(&mut self.ctx.pool, id, statements)?;
        Ok(id)
    }

    fn globals(&mut self) -> Step<NodeId> {
        let kw = self.advance();
        self.expect(TokenKind::Lc)?;
        let statements = self.global_statements()?;
        let rc = self.expect(TokenKind::Rc)?;
        let id = self.ctx.node_between(
            NodeType::Globals,
            NodeKind::Globals { statements },
            &kw.span,
            &rc.span,
        );
        set_dads(&mut self.ctx.pool, id, statements)?;
        Ok(id)
    }

    /// Assignments of a globals block. `error global_statements` drops the
    /// assignments read before the error.
    fn global_statements(&mut self) -> Step<NodeList> {
        let mut list = None;
        loop {
            let mark = self.ctx.pool.mark();
            let item = match self.peek_kind() {
                TokenKind::Rc => return Ok(list),
                TokenKind::Word => self.assignment(),
                _ => Err(self.syntax_error(&[TokenKind::Rc, TokenKind::Word])),
            };
            match item {
                Ok(id) => list = link(&mut self.ctx.pool, list, Some(id))?,
                Err(halt) => self.resume_discarding(halt, mark, &mut list)?,
            }
        }
    }

    /// `word = value ;` where the value is captured raw up to the `;`.
    pub(crate) fn assignment(&mut self) -> Step<NodeId> {
        let name = self.word()?;
        self.assignment_value(name)
    }

    pub(crate) fn assignment_value(&mut self, name: Fragment) -> Step<NodeId> {
        self.expect(TokenKind::Eq)?;
        self.begin_raw(RawMode::Semicolon);
        let value = self.word()?;
        let semi = self.expect(TokenKind::Semi)?;
        Ok(self.ctx.node_between(
            NodeType::VarDec,
            NodeKind::VarDec {
                name: name.text,
                value: value.text,
            },
            &name.span,
            &semi.span,
        ))
    }

    /// Body of a context. `error elements` drops the elements read before
    /// the error.
    fn elements(&mut self) -> Step<NodeList> {
        let mut list = None;
        loop {
            let mark = self.ctx.pool.mark();
            let kind = self.peek_kind();
            let item = if kind == TokenKind::Rc {
                return Ok(list);
            } else if starts_element(kind) {
                self.element()
            } else {
                Err(self.syntax_error(&[]))
            };
            match item {
                Ok(element) => list = link(&mut self.ctx.pool, list, element)?,
                Err(halt) => self.resume_discarding(halt, mark, &mut list)?,
            }
        }
    }

    fn element(&mut self) -> Step<NodeList> {
        match self.peek_kind() {
            TokenKind::Word => self.word_element(),
            TokenKind::Regexten | TokenKind::Hint => self.qualified_extension().map(Some),
            TokenKind::Includes => self.includes().map(Some),
            TokenKind::Switches => self.switches(NodeType::Switches).map(Some),
            TokenKind::ESwitches => self.switches(NodeType::ESwitches).map(Some),
            TokenKind::Ignorepat => self.ignorepat().map(Some),
            TokenKind::Semi => {
                self.advance();
                Ok(None)
            }
            _ => Err(self.syntax_error(&[])),
        }
    }

    /// An extension or assignment introduced by a word. Any error after the
    /// word is absorbed here (`word error`) and the element is dropped.
    fn word_element(&mut self) -> Step<NodeList> {
        let mark = self.ctx.pool.mark();
        let name = self.word()?;
        let result = match self.peek_kind() {
            TokenKind::ExtenMark => {
                let first = name.span;
                self.extension_body(first, name, false, None)
            }
            TokenKind::Eq => self.assignment_value(name),
            _ => Err(self.syntax_error(&[TokenKind::Eq, TokenKind::ExtenMark])),
        };
        match result {
            Ok(id) => Ok(Some(id)),
            Err(halt) => {
                self.resume(halt, mark)?;
                Ok(None)
            }
        }
    }

    /// Extensions with `regexten` and/or `hint(...)` in front of the name.
    fn qualified_extension(&mut self) -> Step<NodeId> {
        let first = self.peek().span;
        let regexten = if self.at(TokenKind::Regexten) {
            self.advance();
            true
        } else {
            false
        };
        let hints = if regexten && !self.at(TokenKind::Hint) {
            None
        } else {
            self.expect(TokenKind::Hint)?;
            self.expect(TokenKind::Lp)?;
            let hint = self.hint_word()?;
            self.expect(TokenKind::Rp)?;
            Some(hint.text)
        };
        let name = self.word()?;
        self.extension_body(first, name, regexten, hints)
    }

    fn extension_body(
        &mut self,
        first: Span,
        name: Fragment,
        regexten: bool,
        hints: Option<String>,
    ) -> Step<NodeId> {
        self.expect(TokenKind::ExtenMark)?;
        let statements = self.statement()?;
        let last = self.previous;
        let id = self.ctx.node_between(
            NodeType::Extension,
            NodeKind::Extension {
                name: name.text,
                statements,
                regexten,
                hints,
            },
            &first,
            &last,
        );
        set_dads(&mut self.ctx.pool, id, statements)?;
        Ok(id)
    }

    fn ignorepat(&mut self) -> Step<NodeId> {
        let kw = self.advance();
        self.expect(TokenKind::ExtenMark)?;
        let pattern = self.word()?;
        let semi = self.expect(TokenKind::Semi)?;
        Ok(self.ctx.node_between(
            NodeType::IgnorePat,
            NodeKind::IgnorePat {
                pattern: pattern.text,
            },
            &kw.span,
            &semi.span,
        ))
    }

    /// `switches { ... }` and `eswitches { ... }`.
    fn switches(&mut self, node_type: NodeType) -> Step<NodeId> {
        let kw = self.advance();
        self.expect(TokenKind::Lc)?;
        let words = self.switchlist()?;
        let rc = self.expect(TokenKind::Rc)?;
        let id = self.ctx.node_between(node_type, NodeKind::WordList { words }, &kw.span, &rc.span);
        set_dads(&mut self.ctx.pool, id, words)?;
        Ok(id)
    }

    /// `word ;` and `word @ word ;` entries. `error switchlist` drops the
    /// entries read before the error.
    fn switchlist(&mut self) -> Step<NodeList> {
        let mut list = None;
        loop {
            let mark = self.ctx.pool.mark();
            let item = match self.peek_kind() {
                TokenKind::Rc => return Ok(list),
                TokenKind::Word => self.switch_entry(),
                _ => Err(self.syntax_error(&[TokenKind::Rc, TokenKind::Word])),
            };
            match item {
                Ok(id) => list = link(&mut self.ctx.pool, list, Some(id))?,
                Err(halt) => self.resume_discarding(halt, mark, &mut list)?,
            }
        }
    }

    fn switch_entry(&mut self) -> Step<NodeId> {
        let mut entry = self.word()?;
        if self.at(TokenKind::At) {
            self.advance();
            let host = self.word()?;
            entry.text = format!("{}@{}", entry.text, host.text);
        }
        self.expect(TokenKind::Semi)?;
        Ok(self.ctx.word_node(entry.text, &entry.span))
    }

    pub(crate) fn includes(&mut self) -> Step<NodeId> {
        let kw = self.advance();
        self.expect(TokenKind::Lc)?;
        let words = if self.at(TokenKind::Rc) {
            None
        } else {
            self.includeslist()?
        };
        let rc = self.expect(TokenKind::Rc)?;
        let id = self.ctx.node_between(NodeType::Includes, NodeKind::WordList { words }, &kw.span, &rc.span);
        set_dads(&mut self.ctx.pool, id, words)?;
        Ok(id)
    }

    /// Included context names, each optionally qualified by a time spec.
    /// After the first entry, `includeslist error` keeps what was read.
    fn includeslist(&mut self) -> Step<NodeList> {
        let first = self.included_entry()?;
        self.expect(TokenKind::Semi)?;
        let mut list = Some(first);
        loop {
            let mark = self.ctx.pool.mark();
            let item = match self.peek_kind() {
                TokenKind::Rc => return Ok(list),
                TokenKind::Word | TokenKind::Default => self
                    .included_entry()
                    .and_then(|id| self.expect(TokenKind::Semi).map(|_| id)),
                _ => Err(self.syntax_error(&[TokenKind::Rc, TokenKind::Default, TokenKind::Word])),
            };
            match item {
                Ok(id) => list = link(&mut self.ctx.pool, list, Some(id))?,
                Err(halt) => self.resume(halt, mark)?,
            }
        }
    }

    fn included_entry(&mut self) -> Step<NodeId> {
        let name = self.context_name()?;
        let id = self.ctx.word_node(name.text, &name.span);
        if self.at(TokenKind::Bar) {
            self.advance();
            let timespec = self.timespec()?;
            if let NodeKind::Word { args, .. } = &mut self.ctx.pool.node_mut(id)?.kind {
                *args = timespec;
            }
            self.ctx.prev_word = None;
        }
        Ok(id)
    }
}
