//! Per-parse state
//!
//! Everything one parse needs besides the token stream lives here: the node
//! pool, the name of the file being read, the scratch copy of the last
//! concatenated word, the error counter and the diagnostics channel. Each
//! parse owns its own context, so independent parses never share state.

use crate::ael::ast::node::{Node, NodeKind, NodeType};
use crate::ael::ast::pool::{NodeId, NodePool};
use crate::ael::ast::span::Span;
use crate::ael::config::ParserConfig;
use crate::ael::diagnostics::{substitute_tokens, Diagnostic, DiagnosticSink, LogSink};
use crate::ael::error::PoolError;
use crate::ael::token::LexicalIssue;
use std::sync::Arc;

pub struct ParseContext {
    pub pool: NodePool,
    /// Stamped on every node allocated; follows the file of the last token
    /// consumed.
    pub current_file: Arc<str>,
    /// Last word built by concatenating adjacent words; raw captures treat
    /// brackets it left open as already open.
    pub prev_word: Option<String>,
    pub syntax_errors: usize,
    pub config: ParserConfig,
    sink: Box<dyn DiagnosticSink>,
    diagnostics: Vec<Diagnostic>,
}

impl ParseContext {
    pub fn new(file: impl Into<Arc<str>>, config: ParserConfig) -> Self {
        Self {
            pool: NodePool::new(),
            current_file: file.into(),
            prev_word: None,
            syntax_errors: 0,
            config,
            sink: Box::new(LogSink),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Allocate a node over an explicit span.
    pub fn alloc(&mut self, node_type: NodeType, kind: NodeKind, span: Span) -> NodeId {
        let node = Node::new(node_type, kind, span, self.current_file.clone());
        self.pool.alloc(node)
    }

    /// Allocate a node spanning from the start of `first` to the end of `last`.
    pub fn node_between(&mut self, node_type: NodeType, kind: NodeKind, first: &Span, last: &Span) -> NodeId {
        self.alloc(node_type, kind, Span::between(first, last))
    }

    /// Allocate a node covering a single token.
    pub fn node_at(&mut self, node_type: NodeType, kind: NodeKind, at: &Span) -> NodeId {
        self.alloc(node_type, kind, *at)
    }

    /// A Word node with no qualifiers.
    pub fn word_node(&mut self, text: String, at: &Span) -> NodeId {
        self.node_at(NodeType::Word, NodeKind::Word { text, args: None }, at)
    }

    /// Extend the end of `id`'s span to the end of `last`.
    pub fn update_last(&mut self, id: NodeId, last: &Span) -> Result<(), PoolError> {
        self.pool.node_mut(id)?.span.extend_to(last);
        Ok(())
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        self.sink.emit(&diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Report a syntax error. Internal terminal names in `msg` are replaced
    /// by their source spelling.
    pub fn report_error(&mut self, file: Arc<str>, span: Span, msg: &str) {
        self.syntax_errors += 1;
        let diagnostic = Diagnostic::error(file, span, substitute_tokens(msg));
        self.emit(diagnostic);
    }

    /// Report a problem found by the token source.
    pub fn report_lexical(&mut self, issue: LexicalIssue) {
        self.syntax_errors += 1;
        let diagnostic = Diagnostic::error(issue.file, issue.span, issue.message);
        self.emit(diagnostic);
    }

    pub fn warn(&mut self, span: Span, msg: impl Into<String>) {
        let diagnostic = Diagnostic::warning(self.current_file.clone(), span, msg);
        self.emit(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (NodePool, Vec<Diagnostic>, usize) {
        (self.pool, self.diagnostics, self.syntax_errors)
    }
}
