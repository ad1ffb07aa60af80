//! Tokens handed from a token source to the grammar engine
//!
//! [`TokenKind`] is ordered the way the grammar numbers its terminals; that
//! order decides how expected-token lists are printed in syntax errors.
//! [`TokenSource`] is the only thing the engine needs from a lexer: a pull of
//! the next token, and a switch into one of the raw capture modes the grammar
//! requests after specific punctuation.

use crate::ael::ast::span::Span;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    Eof,
    Context,
    Lc,
    Rc,
    Lp,
    Rp,
    Semi,
    Eq,
    Comma,
    Colon,
    Amper,
    Bar,
    At,
    Macro,
    Globals,
    Ignorepat,
    Switch,
    If,
    IfTime,
    Else,
    Random,
    Abstract,
    Extend,
    ExtenMark,
    Goto,
    Jump,
    Return,
    Break,
    Continue,
    Regexten,
    Hint,
    For,
    While,
    Case,
    Pattern,
    Default,
    Catch,
    Switches,
    ESwitches,
    Includes,
    Word,
}

impl TokenKind {
    /// Name used for this terminal in syntax error messages.
    pub fn internal_name(&self) -> &'static str {
        match self {
            TokenKind::Eof => "$end",
            TokenKind::Context => "KW_CONTEXT",
            TokenKind::Lc => "LC",
            TokenKind::Rc => "RC",
            TokenKind::Lp => "LP",
            TokenKind::Rp => "RP",
            TokenKind::Semi => "SEMI",
            TokenKind::Eq => "EQ",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::Amper => "AMPER",
            TokenKind::Bar => "BAR",
            TokenKind::At => "AT",
            TokenKind::Macro => "KW_MACRO",
            TokenKind::Globals => "KW_GLOBALS",
            TokenKind::Ignorepat => "KW_IGNOREPAT",
            TokenKind::Switch => "KW_SWITCH",
            TokenKind::If => "KW_IF",
            TokenKind::IfTime => "KW_IFTIME",
            TokenKind::Else => "KW_ELSE",
            TokenKind::Random => "KW_RANDOM",
            TokenKind::Abstract => "KW_ABSTRACT",
            TokenKind::Extend => "KW_EXTEND",
            TokenKind::ExtenMark => "EXTENMARK",
            TokenKind::Goto => "KW_GOTO",
            TokenKind::Jump => "KW_JUMP",
            TokenKind::Return => "KW_RETURN",
            TokenKind::Break => "KW_BREAK",
            TokenKind::Continue => "KW_CONTINUE",
            TokenKind::Regexten => "KW_REGEXTEN",
            TokenKind::Hint => "KW_HINT",
            TokenKind::For => "KW_FOR",
            TokenKind::While => "KW_WHILE",
            TokenKind::Case => "KW_CASE",
            TokenKind::Pattern => "KW_PATTERN",
            TokenKind::Default => "KW_DEFAULT",
            TokenKind::Catch => "KW_CATCH",
            TokenKind::Switches => "KW_SWITCHES",
            TokenKind::ESwitches => "KW_ESWITCHES",
            TokenKind::Includes => "KW_INCLUDES",
            TokenKind::Word => "word",
        }
    }

    /// Source spelling of keywords and punctuation.
    pub fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            TokenKind::Context => "context",
            TokenKind::Lc => "{",
            TokenKind::Rc => "}",
            TokenKind::Lp => "(",
            TokenKind::Rp => ")",
            TokenKind::Semi => ";",
            TokenKind::Eq => "=",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Amper => "&",
            TokenKind::Bar => "|",
            TokenKind::At => "@",
            TokenKind::Macro => "macro",
            TokenKind::Globals => "globals",
            TokenKind::Ignorepat => "ignorepat",
            TokenKind::Switch => "switch",
            TokenKind::If => "if",
            TokenKind::IfTime => "ifTime",
            TokenKind::Else => "else",
            TokenKind::Random => "random",
            TokenKind::Abstract => "abstract",
            TokenKind::Extend => "extend",
            TokenKind::ExtenMark => "=>",
            TokenKind::Goto => "goto",
            TokenKind::Jump => "jump",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Regexten => "regexten",
            TokenKind::Hint => "hint",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Case => "case",
            TokenKind::Pattern => "pattern",
            TokenKind::Default => "default",
            TokenKind::Catch => "catch",
            TokenKind::Switches => "switches",
            TokenKind::ESwitches => "eswitches",
            TokenKind::Includes => "includes",
            TokenKind::Eof | TokenKind::Word => return None,
        };
        Some(symbol)
    }

    pub fn is_keyword(&self) -> bool {
        self.internal_name().starts_with("KW_")
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.internal_name())
    }
}

/// One token with its payload and location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Present for words; keywords and punctuation carry nothing.
    pub text: Option<String>,
    pub span: Span,
    /// File the token was read from, which may be an included file.
    pub file: Arc<str>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, file: Arc<str>) -> Self {
        Self {
            kind,
            text: None,
            span,
            file,
        }
    }

    pub fn word(text: impl Into<String>, span: Span, file: Arc<str>) -> Self {
        Self {
            kind: TokenKind::Word,
            text: Some(text.into()),
            span,
            file,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Capture modes requested by the grammar right after a token is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawMode {
    /// Everything up to the `)` closing the current group, which is left unread.
    Paren,
    /// Everything up to a `;` outside any bracket, which is left unread.
    Semicolon,
    /// Comma-separated call arguments up to the closing `)`.
    Args,
}

/// A problem found while producing tokens, before the grammar sees them
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalIssue {
    pub file: Arc<str>,
    pub span: Span,
    pub message: String,
}

pub trait TokenSource {
    /// Produce the next token. Once the input is exhausted every call
    /// returns an `Eof` token.
    fn next_token(&mut self) -> Token;

    /// Switch to a raw capture mode before the next token is produced.
    /// `prev_word` is the most recent word seen by the grammar; brackets it
    /// left open count as already open in the capture.
    fn begin_raw(&mut self, mode: RawMode, prev_word: Option<&str>);

    /// Problems found since the last call.
    fn take_issues(&mut self) -> Vec<LexicalIssue> {
        Vec::new()
    }
}

/// A token source over a prepared sequence, for callers that lex elsewhere
#[derive(Debug, Clone)]
pub struct TokenQueue {
    tokens: VecDeque<Token>,
    eof: Token,
}

impl TokenQueue {
    pub fn new(tokens: impl IntoIterator<Item = Token>, file: Arc<str>) -> Self {
        let tokens: VecDeque<Token> = tokens.into_iter().collect();
        let end = tokens.back().map(|t| t.span).unwrap_or_default();
        Self {
            tokens,
            eof: Token::new(TokenKind::Eof, Span::new(end.end, end.end), file),
        }
    }
}

impl TokenSource for TokenQueue {
    fn next_token(&mut self) -> Token {
        self.tokens.pop_front().unwrap_or_else(|| self.eof.clone())
    }

    fn begin_raw(&mut self, _mode: RawMode, _prev_word: Option<&str>) {}
}
