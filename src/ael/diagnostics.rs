//! Positioned diagnostics
//!
//!     Syntax errors come out of the grammar engine naming terminals by their
//!     internal names (`KW_IF`, `AMPER`, ...). [`substitute_tokens`] rewrites
//!     those names into the quoted source spelling before the message is
//!     rendered with its file and span.
//!
//!     Rendered lines look like
//!
//!         ==== File: t.ael, Line 3, Cols: 5-9: Error: syntax error, ...
//!         ==== File: t.ael, Line 3 Col 5  to Line 4 Col 1: Error: ...
//!
//!     Every diagnostic is handed to a [`DiagnosticSink`]. [`LogSink`] forwards
//!     to the `log` facade.

use crate::ael::ast::span::Span;
use std::fmt;
use std::sync::Arc;

/// Internal terminal names and their source spelling. A name must come
/// before any other name that is a prefix of it.
const TOKEN_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("AMPER", "&"),
    ("AT", "@"),
    ("BAR", "|"),
    ("COLON", ":"),
    ("COMMA", ","),
    ("EQ", "="),
    ("EXTENMARK", "=>"),
    ("KW_ABSTRACT", "abstract"),
    ("KW_BREAK", "break"),
    ("KW_CASE", "case"),
    ("KW_CATCH", "catch"),
    ("KW_CONTEXT", "context"),
    ("KW_CONTINUE", "continue"),
    ("KW_DEFAULT", "default"),
    ("KW_ELSE", "else"),
    ("KW_ESWITCHES", "eswitches"),
    ("KW_EXTEND", "extend"),
    ("KW_FOR", "for"),
    ("KW_GLOBALS", "globals"),
    ("KW_GOTO", "goto"),
    ("KW_HINT", "hint"),
    ("KW_IFTIME", "ifTime"),
    ("KW_IF", "if"),
    ("KW_IGNOREPAT", "ignorepat"),
    ("KW_INCLUDES", "includes"),
    ("KW_JUMP", "jump"),
    ("KW_MACRO", "macro"),
    ("KW_PATTERN", "pattern"),
    ("KW_RANDOM", "random"),
    ("KW_REGEXTEN", "regexten"),
    ("KW_RETURN", "return"),
    ("KW_SWITCHES", "switches"),
    ("KW_SWITCH", "switch"),
    ("KW_WHILE", "while"),
    ("LC", "{"),
    ("LP", "("),
    ("RC", "}"),
    ("RP", ")"),
    ("SEMI", ";"),
];

fn scan_substitutions<'m>(msg: &'m str, mut emit: impl FnMut(&'m str, bool)) {
    let mut rest = msg;
    'scan: while let Some(ch) = rest.chars().next() {
        for (name, symbol) in TOKEN_SUBSTITUTIONS {
            if rest.starts_with(name) {
                emit(symbol, true);
                rest = &rest[name.len()..];
                continue 'scan;
            }
        }
        let width = ch.len_utf8();
        emit(&rest[..width], false);
        rest = &rest[width..];
    }
}

/// Replace every internal terminal name in `msg` with its quoted spelling.
pub fn substitute_tokens(msg: &str) -> String {
    let mut len = 0;
    scan_substitutions(msg, |piece, quoted| {
        len += piece.len() + if quoted { 2 } else { 0 };
    });

    let mut out = String::with_capacity(len);
    scan_substitutions(msg, |piece, quoted| {
        if quoted {
            out.push('\'');
            out.push_str(piece);
            out.push('\'');
        } else {
            out.push_str(piece);
        }
    });
    out
}

fn location_prefix(file: &str, span: &Span) -> String {
    if span.is_single_line() {
        format!(
            "==== File: {}, Line {}, Cols: {}-{}",
            file, span.start.line, span.start.column, span.end.column
        )
    } else {
        format!(
            "==== File: {}, Line {} Col {}  to Line {} Col {}",
            file, span.start.line, span.start.column, span.end.line, span.end.column
        )
    }
}

/// Render an error line for `msg` located at `span` in `file`.
pub fn format_error(file: &str, span: &Span, msg: &str) -> String {
    format!("{}: Error: {}", location_prefix(file, span), msg)
}

/// Render a warning line; warnings carry no severity word.
pub fn format_warning(file: &str, span: &Span, msg: &str) -> String {
    format!("{}: {}", location_prefix(file, span), msg)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub file: Arc<str>,
    pub span: Span,
    /// The message after token substitution.
    pub message: String,
    /// The full `==== File: ...` line.
    pub rendered: String,
}

impl Diagnostic {
    pub fn error(file: Arc<str>, span: Span, message: impl Into<String>) -> Self {
        let message = message.into();
        let rendered = format_error(&file, &span, &message);
        Self {
            severity: Severity::Error,
            file,
            span,
            message,
            rendered,
        }
    }

    pub fn warning(file: Arc<str>, span: Span, message: impl Into<String>) -> Self {
        let message = message.into();
        let rendered = format_warning(&file, &span, &message);
        Self {
            severity: Severity::Warning,
            file,
            span,
            message,
            rendered,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Receiver of every diagnostic produced during a parse
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Error => log::error!("{}", diagnostic),
            Severity::Warning => log::warn!("{}", diagnostic),
        }
    }
}

/// Drops everything; the parse result still carries its diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _diagnostic: &Diagnostic) {}
}
