//! Statements
//!
//! Everything that can appear in an extension body, a macro, a block or a
//! case. Statement nesting is bounded by `parser.max_depth`.

use super::engine::{Parser, Step};
use super::words::Fragment;
use crate::ael::ast::destroy::destroy_node;
use crate::ael::ast::links::{link, set_dads, siblings};
use crate::ael::ast::node::{Condition, NodeKind, NodeList, NodeType};
use crate::ael::ast::pool::NodeId;
use crate::ael::ast::span::Span;
use crate::ael::token::{RawMode, TokenKind, TokenSource};

const GOTO_SUGGESTION: &str = "Suggestion: Use the goto statement instead of the Goto() application call in AEL.";

pub(crate) fn starts_statement(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Lc
            | TokenKind::Word
            | TokenKind::Goto
            | TokenKind::Jump
            | TokenKind::For
            | TokenKind::While
            | TokenKind::Switch
            | TokenKind::Amper
            | TokenKind::Break
            | TokenKind::Return
            | TokenKind::Continue
            | TokenKind::If
            | TokenKind::Random
            | TokenKind::IfTime
            | TokenKind::Semi
    )
}

fn ends_case(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Case | TokenKind::Default | TokenKind::Pattern)
}

impl<S: TokenSource> Parser<'_, S> {
    /// Statements up to the closing `}` (or the next case label when
    /// `case_body`). `error statements` drops the statements read before the
    /// error.
    pub(crate) fn statements(&mut self, case_body: bool) -> Step<NodeList> {
        let mut list = None;
        loop {
            let kind = self.peek_kind();
            if kind == TokenKind::Rc || (case_body && ends_case(kind)) {
                return Ok(list);
            }
            let mark = self.ctx.pool.mark();
            let item = if starts_statement(kind) {
                self.statement()
            } else {
                Err(self.syntax_error(&[]))
            };
            match item {
                Ok(statement) => list = link(&mut self.ctx.pool, list, statement)?,
                Err(halt) => self.resume_discarding(halt, mark, &mut list)?,
            }
        }
    }

    pub(crate) fn statement(&mut self) -> Step<NodeList> {
        self.nested(|p| p.statement_inner())
    }

    fn statement_inner(&mut self) -> Step<NodeList> {
        let id = match self.peek_kind() {
            TokenKind::Lc => self.block()?,
            TokenKind::Word => self.word_statement()?,
            TokenKind::Goto => self.goto_statement()?,
            TokenKind::Jump => self.jump_statement()?,
            TokenKind::For => self.for_statement()?,
            TokenKind::While => self.while_statement()?,
            TokenKind::Switch => self.switch_statement()?,
            TokenKind::Amper => self.macro_call_statement()?,
            TokenKind::Break => self.bare(NodeType::Break)?,
            TokenKind::Return => self.bare(NodeType::Return)?,
            TokenKind::Continue => self.bare(NodeType::Continue)?,
            TokenKind::If => self.conditional(NodeType::If)?,
            TokenKind::Random => self.conditional(NodeType::Random)?,
            TokenKind::IfTime => self.conditional(NodeType::IfTime)?,
            TokenKind::Semi => {
                self.advance();
                return Ok(None);
            }
            _ => return Err(self.syntax_error(&[])),
        };
        Ok(Some(id))
    }

    fn block(&mut self) -> Step<NodeId> {
        let lc = self.advance();
        let statements = self.statements(false)?;
        let rc = self.expect(TokenKind::Rc)?;
        let id = self.ctx.node_between(
            NodeType::StatementBlock,
            NodeKind::StatementBlock { statements },
            &lc.span,
            &rc.span,
        );
        set_dads(&mut self.ctx.pool, id, statements)?;
        Ok(id)
    }

    fn bare(&mut self, node_type: NodeType) -> Step<NodeId> {
        let kw = self.advance();
        let semi = self.expect(TokenKind::Semi)?;
        Ok(self.ctx.node_between(node_type, NodeKind::Bare, &kw.span, &semi.span))
    }

    /// Labels, assignments and application calls all start with a word.
    fn word_statement(&mut self) -> Step<NodeId> {
        let name = self.word()?;
        match self.peek_kind() {
            TokenKind::Colon => {
                let colon = self.advance();
                Ok(self.ctx.node_between(
                    NodeType::Label,
                    NodeKind::Label { name: name.text },
                    &name.span,
                    &colon.span,
                ))
            }
            TokenKind::Eq => self.assignment_value(name),
            TokenKind::Semi => {
                let semi = self.advance();
                Ok(self.ctx.node_between(
                    NodeType::ApplicationCall,
                    NodeKind::Call {
                        name: name.text,
                        args: None,
                    },
                    &name.span,
                    &semi.span,
                ))
            }
            TokenKind::Lp => self.application_call(name),
            _ => Err(self.syntax_error(&[TokenKind::Lp, TokenKind::Semi, TokenKind::Eq, TokenKind::Colon])),
        }
    }

    /// `name(args);`, or `name(args) = value;` which assigns to a dialplan
    /// function.
    fn application_call(&mut self, name: Fragment) -> Step<NodeId> {
        self.advance();
        self.begin_raw(RawMode::Args);

        let is_goto = name.text.eq_ignore_ascii_case("goto");
        let call = if is_goto {
            self.ctx.warn(name.span, GOTO_SUGGESTION);
            self.ctx
                .node_at(NodeType::Goto, NodeKind::Goto { target: None }, &name.span)
        } else {
            self.ctx.node_at(
                NodeType::ApplicationCall,
                NodeKind::Call {
                    name: name.text.clone(),
                    args: None,
                },
                &name.span,
            )
        };

        let args = self.call_arguments()?;
        match &mut self.ctx.pool.node_mut(call)?.kind {
            NodeKind::Goto { target } => *target = args,
            NodeKind::Call { args: slot, .. } => *slot = args,
            _ => {}
        }
        let rp = self.previous;
        self.ctx.update_last(call, &rp)?;

        match self.peek_kind() {
            TokenKind::Semi => {
                let semi = self.advance();
                self.ctx.update_last(call, &semi.span)?;
                Ok(call)
            }
            TokenKind::Eq => self.function_assignment(call, name),
            _ => Err(self.syntax_error(&[TokenKind::Semi, TokenKind::Eq])),
        }
    }

    /// Arguments after `(` up to and including `)`.
    fn call_arguments(&mut self) -> Step<NodeList> {
        if self.at(TokenKind::Rp) {
            self.advance();
            return Ok(None);
        }
        let args = self.eval_arglist()?;
        self.expect(TokenKind::Rp)?;
        Ok(args)
    }

    /// Comma separated call arguments; empty arguments become empty words.
    fn eval_arglist(&mut self) -> Step<NodeList> {
        let first = if self.at(TokenKind::Word) {
            self.word_list()?
        } else {
            let at = self.peek().span;
            Fragment::new("", at)
        };
        let id = self.ctx.word_node(first.text, &first.span);
        let mut list = Some(id);

        while self.at(TokenKind::Comma) {
            self.advance();
            let arg = if self.at(TokenKind::Word) {
                self.word()?
            } else {
                Fragment::new("", self.previous)
            };
            let id = self.ctx.word_node(arg.text, &arg.span);
            list = link(&mut self.ctx.pool, list, Some(id))?;
        }
        Ok(list)
    }

    /// Rewrites `Name(a,b) = value;` as an assignment to `Name(a,b)`.
    fn function_assignment(&mut self, call: NodeId, name: Fragment) -> Step<NodeId> {
        self.advance();
        self.begin_raw(RawMode::Semicolon);
        let value = self.word()?;
        let semi = self.expect(TokenKind::Semi)?;

        let node = self.ctx.pool.node(call)?;
        let start = node.span;
        let args = node.kind.child_lists().into_iter().next().flatten();
        let arg_texts: Vec<&str> = siblings(&self.ctx.pool, args)
            .filter_map(|arg| self.ctx.pool.get(arg).and_then(|n| n.word()))
            .collect();
        let function = format!("{}({})", name.text, arg_texts.join(","));

        if self.ctx.config.warn_unknown_functions && !self.ctx.config.is_known_function(&name.text) {
            self.ctx.warn(
                start,
                format!(
                    "Function call? The name {} is not in my internal list of function names",
                    name.text
                ),
            );
        }

        destroy_node(&mut self.ctx.pool, call)?;
        self.ctx.prev_word = None;
        Ok(self.ctx.node_between(
            NodeType::VarDec,
            NodeKind::VarDec {
                name: function,
                value: value.text,
            },
            &start,
            &semi.span,
        ))
    }

    fn separator(&mut self) -> Option<TokenKind> {
        match self.peek_kind() {
            kind @ (TokenKind::Bar | TokenKind::Comma) => {
                self.advance();
                Some(kind)
            }
            _ => None,
        }
    }

    /// `goto [context|]extension|priority;` with `|` or `,` separators.
    fn goto_statement(&mut self) -> Step<NodeId> {
        let kw = self.advance();
        let mut parts = Vec::with_capacity(3);

        if self.at(TokenKind::Default) {
            let default = self.advance();
            parts.push(Fragment::new("default", default.span));
            let Some(sep) = self.separator() else {
                return Err(self.syntax_error(&[TokenKind::Bar, TokenKind::Comma]));
            };
            parts.push(self.goto_word()?);
            self.expect(sep)?;
            parts.push(self.goto_word()?);
        } else {
            parts.push(self.goto_word()?);
            if let Some(sep) = self.separator() {
                parts.push(self.goto_word()?);
                if self.at(sep) {
                    self.advance();
                    parts.push(self.goto_word()?);
                }
            }
        }
        let semi = self.expect(TokenKind::Semi)?;

        let target = self.word_nodes(parts)?;
        let id = self
            .ctx
            .node_between(NodeType::Goto, NodeKind::Goto { target }, &kw.span, &semi.span);
        set_dads(&mut self.ctx.pool, id, target)?;
        Ok(id)
    }

    /// `jump extension[, priority][@context];`, stored like a goto.
    fn jump_statement(&mut self) -> Step<NodeId> {
        let kw = self.advance();
        let extension = self.goto_word()?;
        let priority = if self.at(TokenKind::Comma) {
            self.advance();
            self.word()?
        } else {
            Fragment::new("1", self.previous)
        };
        let parts = if self.at(TokenKind::At) {
            self.advance();
            let context = self.context_name()?;
            vec![context, extension, priority]
        } else {
            vec![extension, priority]
        };
        let semi = self.expect(TokenKind::Semi)?;

        let target = self.word_nodes(parts)?;
        let id = self
            .ctx
            .node_between(NodeType::Goto, NodeKind::Goto { target }, &kw.span, &semi.span);
        set_dads(&mut self.ctx.pool, id, target)?;
        Ok(id)
    }

    fn word_nodes(&mut self, parts: Vec<Fragment>) -> Step<NodeList> {
        let mut list = None;
        for part in parts {
            let id = self.ctx.word_node(part.text, &part.span);
            list = link(&mut self.ctx.pool, list, Some(id))?;
        }
        Ok(list)
    }

    /// Raw text up to the next `;`, then the `;`.
    fn raw_clause(&mut self, mode: RawMode, terminator: TokenKind) -> Step<String> {
        self.begin_raw(mode);
        let text = self.word()?;
        self.expect(terminator)?;
        Ok(text.text)
    }

    fn for_statement(&mut self) -> Step<NodeId> {
        let kw = self.advance();
        self.expect(TokenKind::Lp)?;
        let init = self.raw_clause(RawMode::Semicolon, TokenKind::Semi)?;
        let test = self.raw_clause(RawMode::Semicolon, TokenKind::Semi)?;
        let increment = self.raw_clause(RawMode::Paren, TokenKind::Rp)?;
        let body = self.statement()?;
        let last = self.previous;
        let id = self.ctx.node_between(
            NodeType::For,
            NodeKind::For {
                init,
                test,
                increment,
                body,
            },
            &kw.span,
            &last,
        );
        set_dads(&mut self.ctx.pool, id, body)?;
        Ok(id)
    }

    /// `( expression )` captured raw.
    fn test_expr(&mut self) -> Step<String> {
        self.expect(TokenKind::Lp)?;
        self.begin_raw(RawMode::Paren);
        let expr = self.word_list()?;
        self.expect(TokenKind::Rp)?;
        Ok(expr.text)
    }

    fn while_statement(&mut self) -> Step<NodeId> {
        let kw = self.advance();
        let test = self.test_expr()?;
        let body = self.statement()?;
        let last = self.previous;
        let id = self
            .ctx
            .node_between(NodeType::While, NodeKind::While { test, body }, &kw.span, &last);
        set_dads(&mut self.ctx.pool, id, body)?;
        Ok(id)
    }

    fn switch_statement(&mut self) -> Step<NodeId> {
        let kw = self.advance();
        let test = self.test_expr()?;
        self.expect(TokenKind::Lc)?;
        let cases = self.case_statements()?;
        let rc = self.expect(TokenKind::Rc)?;
        let id = self
            .ctx
            .node_between(NodeType::Switch, NodeKind::Switch { test, cases }, &kw.span, &rc.span);
        set_dads(&mut self.ctx.pool, id, cases)?;
        Ok(id)
    }

    fn case_statements(&mut self) -> Step<NodeList> {
        let mut list = None;
        loop {
            let case = match self.peek_kind() {
                TokenKind::Case => self.case_label(NodeType::Case, true)?,
                TokenKind::Pattern => self.case_label(NodeType::Pattern, true)?,
                TokenKind::Default => self.case_label(NodeType::Default, false)?,
                _ => return Ok(list),
            };
            list = link(&mut self.ctx.pool, list, Some(case))?;
        }
    }

    fn case_label(&mut self, node_type: NodeType, has_value: bool) -> Step<NodeId> {
        let kw = self.advance();
        let value = if has_value {
            self.word()?.text
        } else {
            String::new()
        };
        let colon = self.expect(TokenKind::Colon)?;
        let statements = self.statements(true)?;
        let id = self
            .ctx
            .node_between(node_type, NodeKind::Case { value, statements }, &kw.span, &colon.span);
        set_dads(&mut self.ctx.pool, id, statements)?;
        Ok(id)
    }

    /// `&name(args);`
    fn macro_call_statement(&mut self) -> Step<NodeId> {
        let amper = self.advance();
        let name = self.word()?;
        self.expect(TokenKind::Lp)?;
        self.begin_raw(RawMode::Args);
        let args = self.call_arguments()?;
        let rp = self.previous;
        let id = self.ctx.node_between(
            NodeType::MacroCall,
            NodeKind::Call { name: name.text, args },
            &amper.span,
            &rp,
        );
        let semi = self.expect(TokenKind::Semi)?;
        self.ctx.update_last(id, &semi.span)?;
        Ok(id)
    }

    /// `if`, `random` and `ifTime`, with an optional `else`.
    fn conditional(&mut self, node_type: NodeType) -> Step<NodeId> {
        let kw = self.advance();
        let condition = if node_type == NodeType::IfTime {
            self.expect(TokenKind::Lp)?;
            let words = self.timespec()?;
            self.expect(TokenKind::Rp)?;
            self.ctx.prev_word = None;
            Condition::TimeSpec(words)
        } else {
            Condition::Expr(self.test_expr()?)
        };
        let timespec = match &condition {
            Condition::TimeSpec(words) => *words,
            Condition::Expr(_) => None,
        };

        let id = self.ctx.node_between(
            node_type,
            NodeKind::Conditional {
                condition,
                then_branch: None,
                else_branch: None,
            },
            &kw.span,
            &kw.span,
        );
        set_dads(&mut self.ctx.pool, id, timespec)?;

        let then_branch = self.statement()?;
        let after_then: Span = self.previous;
        self.ctx.update_last(id, &after_then)?;
        let else_branch = if self.at(TokenKind::Else) {
            self.advance();
            let branch = self.statement()?;
            let last = self.previous;
            self.ctx.update_last(id, &last)?;
            branch
        } else {
            None
        };

        if let NodeKind::Conditional {
            then_branch: then_slot,
            else_branch: else_slot,
            ..
        } = &mut self.ctx.pool.node_mut(id)?.kind
        {
            *then_slot = then_branch;
            *else_slot = else_branch;
        }
        set_dads(&mut self.ctx.pool, id, then_branch)?;
        set_dads(&mut self.ctx.pool, id, else_branch)?;
        Ok(id)
    }
}
