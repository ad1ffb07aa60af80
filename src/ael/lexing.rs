//! Lexer
//!
//!     Turns AEL source into the token stream the grammar engine pulls from.
//!
//!     Normal mode is driven by the logos definitions in [tokens]. Comments
//!     (`// ...` and `/* ... */`) and whitespace are skipped before logos runs.
//!
//!     The grammar switches the lexer into a raw mode ([raw]) after the `(` of a
//!     condition, the `=` of an assignment, or the `(` of a call. A raw mode
//!     captures text verbatim instead of splitting it into words, and falls
//!     back to normal mode once its capture is done.
//!
//! Includes
//!
//!     `#include "file"` pushes a new source frame. Paths resolve against the
//!     directory of the including file. Every token carries the name of the
//!     file it came from, so nodes built from an included file are stamped
//!     with that file's name.

pub mod line_index;
pub mod raw;
pub mod tokens;

use crate::ael::ast::span::Span;
use crate::ael::config::{AelConfig, LexerConfig};
use crate::ael::error::{AelError, IncludeError};
use crate::ael::token::{LexicalIssue, RawMode, Token, TokenKind, TokenSource};
use line_index::LineIndex;
use logos::Logos;
use once_cell::sync::Lazy;
use raw::{RawCapture, RawStop};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokens::RawToken;

static INCLUDE_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^#include[ \t]+"([^"\n]*)"$"#).unwrap());

struct Frame {
    file: Arc<str>,
    path: Option<PathBuf>,
    source: String,
    index: LineIndex,
    offset: usize,
}

impl Frame {
    fn new(file: Arc<str>, path: Option<PathBuf>, source: String, tab_width: usize) -> Self {
        let index = LineIndex::new(&source, tab_width);
        Self {
            file,
            path,
            source,
            index,
            offset: 0,
        }
    }

    fn rest(&self) -> &str {
        &self.source[self.offset..]
    }

    fn span(&self, start: usize, end: usize) -> Span {
        self.index.span(&self.source, start..end)
    }

    fn end_span(&self) -> Span {
        let end = self.source.len();
        let pos = self.index.position(&self.source, end);
        Span::new(pos, pos)
    }

    fn directory(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Normal,
    Raw { mode: RawMode, brackets: Vec<char> },
}

pub struct Lexer {
    frames: Vec<Frame>,
    mode: Mode,
    issues: Vec<LexicalIssue>,
    max_include_depth: usize,
    tab_width: usize,
    base_dir: Option<PathBuf>,
    eof: Option<Token>,
}

impl Lexer {
    pub fn new(source: impl Into<String>, file: impl Into<Arc<str>>) -> Self {
        Self::with_config(source, file, &AelConfig::default().lexer)
    }

    pub fn with_config(source: impl Into<String>, file: impl Into<Arc<str>>, config: &LexerConfig) -> Self {
        let frame = Frame::new(file.into(), None, source.into(), config.tab_width);
        Self {
            frames: vec![frame],
            mode: Mode::Normal,
            issues: Vec::new(),
            max_include_depth: config.max_include_depth,
            tab_width: config.tab_width,
            base_dir: None,
            eof: None,
        }
    }

    /// Open `path` and lex it, resolving includes next to it.
    pub fn from_path(path: &Path, config: &LexerConfig) -> Result<Self, AelError> {
        let source = fs::read_to_string(path).map_err(|source| AelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut lexer = Self::with_config(source, path.display().to_string(), config);
        lexer.frames[0].path = Some(path.to_path_buf());
        Ok(lexer)
    }

    /// Directory used to resolve includes of a source that has no path.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Drain the whole input, ending with the `Eof` token.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut out = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is(TokenKind::Eof);
            out.push(token);
            if done {
                return out;
            }
        }
    }

    fn issue(&mut self, span: Span, message: impl Into<String>) {
        let file = self
            .frames
            .last()
            .map(|f| f.file.clone())
            .unwrap_or_else(|| Arc::from(""));
        let message = message.into();
        log::debug!("lexical issue in {} at {}: {}", file, span, message);
        self.issues.push(LexicalIssue {
            file,
            span,
            message,
        });
    }

    /// Skip whitespace and comments in the current frame.
    fn skip_trivia(&mut self) {
        let mut unterminated = None;
        if let Some(frame) = self.frames.last_mut() {
            loop {
                let whitespace = {
                    let rest = frame.rest();
                    rest.len() - rest.trim_start().len()
                };
                frame.offset += whitespace;

                let rest = frame.rest();
                let skip = if rest.starts_with("//") {
                    rest.find('\n').unwrap_or(rest.len())
                } else if rest.starts_with("/*") {
                    match rest[2..].find("*/") {
                        Some(close) => close + 4,
                        None => {
                            unterminated = Some(frame.span(frame.offset, frame.offset + 2));
                            rest.len()
                        }
                    }
                } else {
                    break;
                };
                frame.offset += skip;
            }
        }
        if let Some(span) = unterminated {
            self.issue(span, "Unterminated comment runs to the end of the file");
        }
    }

    fn next_normal(&mut self) -> Option<Token> {
        self.skip_trivia();
        let frame = self.frames.last_mut()?;
        if frame.offset >= frame.source.len() {
            return None;
        }

        let start = frame.offset;
        let mut lex = RawToken::lexer(frame.rest());
        let result = lex.next();
        let range = lex.span();
        let (begin, end) = (start + range.start, start + range.end);
        frame.offset = end;
        let span = frame.span(begin, end);
        let file = frame.file.clone();
        let slice = frame.source[begin..end].to_string();

        match result {
            Some(Ok(RawToken::Include)) => {
                self.open_include(&slice, span);
                self.next_normal()
            }
            Some(Ok(RawToken::Word)) => Some(Token::word(slice, span, file)),
            Some(Ok(raw)) => raw.kind().map(|kind| Token::new(kind, span, file)),
            Some(Err(())) => {
                self.issue(span, format!("Unrecognized character '{}'", slice));
                self.next_normal()
            }
            None => None,
        }
    }

    fn next_raw(&mut self, mode: RawMode, mut brackets: Vec<char>) -> Token {
        let Some(frame) = self.frames.last_mut() else {
            self.mode = Mode::Normal;
            return self.end_token();
        };

        let start = frame.offset;
        let capture: RawCapture = raw::capture(frame.rest(), mode, &mut brackets);
        let file = frame.file.clone();
        let text_range = start + capture.trimmed.start..start + capture.trimmed.end;
        let text = frame.source[text_range.clone()].to_string();
        let text_span = if text_range.is_empty() {
            frame.span(start + capture.consumed, start + capture.consumed)
        } else {
            frame.span(text_range.start, text_range.end)
        };
        frame.offset = start + capture.consumed;

        match capture.stop {
            RawStop::Terminator(ch) if mode == RawMode::Args && capture.is_empty() => {
                let at = frame.offset;
                frame.offset += 1;
                let span = frame.span(at, at + 1);
                if ch == ',' {
                    self.mode = Mode::Raw { mode, brackets };
                    Token::new(TokenKind::Comma, span, file)
                } else {
                    self.mode = Mode::Normal;
                    Token::new(TokenKind::Rp, span, file)
                }
            }
            RawStop::Terminator(_) => {
                self.mode = if mode == RawMode::Args {
                    Mode::Raw { mode, brackets }
                } else {
                    Mode::Normal
                };
                Token::word(text, text_span, file)
            }
            RawStop::Mismatch(ch) => {
                self.mode = Mode::Normal;
                self.issue(text_span, format!("Mismatched '{}' in expression", ch));
                Token::word(text, text_span, file)
            }
            RawStop::Eof => {
                self.mode = Mode::Normal;
                self.issue(text_span, "Premature end of file inside an expression");
                Token::word(text, text_span, file)
            }
        }
    }

    fn end_token(&mut self) -> Token {
        if let Some(token) = &self.eof {
            return token.clone();
        }
        let token = match self.frames.last() {
            Some(frame) => Token::new(TokenKind::Eof, frame.end_span(), frame.file.clone()),
            None => Token::new(TokenKind::Eof, Span::default(), Arc::from("")),
        };
        self.eof = Some(token.clone());
        token
    }

    fn open_include(&mut self, directive: &str, span: Span) {
        if let Err(err) = self.try_open_include(directive) {
            self.issue(span, err.to_string());
        }
    }

    fn try_open_include(&mut self, directive: &str) -> Result<(), IncludeError> {
        let name = INCLUDE_DIRECTIVE
            .captures(directive)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| IncludeError::Malformed(directive.to_string()))?;

        if self.frames.len() >= self.max_include_depth {
            return Err(IncludeError::TooDeep {
                limit: self.max_include_depth,
            });
        }

        let requested = Path::new(&name);
        let resolved = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            let dir = self
                .frames
                .last()
                .and_then(Frame::directory)
                .map(Path::to_path_buf)
                .or_else(|| self.base_dir.clone())
                .unwrap_or_default();
            dir.join(requested)
        };

        let canonical = fs::canonicalize(&resolved).unwrap_or_else(|_| resolved.clone());
        let open_already = self.frames.iter().any(|frame| {
            frame
                .path
                .as_ref()
                .map(|p| fs::canonicalize(p).unwrap_or_else(|_| p.clone()) == canonical)
                .unwrap_or(false)
        });
        if open_already {
            return Err(IncludeError::Cycle(name));
        }

        let source = fs::read_to_string(&resolved).map_err(|err| IncludeError::Unreadable {
            path: resolved.display().to_string(),
            reason: err.to_string(),
        })?;
        log::debug!("including {}", resolved.display());
        let frame = Frame::new(
            Arc::from(resolved.display().to_string()),
            Some(resolved),
            source,
            self.tab_width,
        );
        self.frames.push(frame);
        Ok(())
    }
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Token {
        loop {
            if let Mode::Raw { mode, brackets } = std::mem::replace(&mut self.mode, Mode::Normal) {
                let token = self.next_raw(mode, brackets);
                log::trace!("raw token {:?}", token);
                return token;
            }
            if let Some(token) = self.next_normal() {
                log::trace!("token {} {:?}", token.kind, token.text);
                return token;
            }
            if self.frames.len() > 1 {
                self.frames.pop();
                continue;
            }
            return self.end_token();
        }
    }

    fn begin_raw(&mut self, mode: RawMode, prev_word: Option<&str>) {
        let brackets = prev_word.map(raw::open_brackets).unwrap_or_default();
        self.mode = Mode::Raw { mode, brackets };
    }

    fn take_issues(&mut self) -> Vec<LexicalIssue> {
        std::mem::take(&mut self.issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src, "t.ael")
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_context_header() {
        assert_eq!(
            kinds("context default { };"),
            vec![
                TokenKind::Context,
                TokenKind::Default,
                TokenKind::Lc,
                TokenKind::Rc,
                TokenKind::Semi,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("// line\ncontext /* block\n more */ x"),
            vec![TokenKind::Context, TokenKind::Word, TokenKind::Eof]
        );
    }

    #[test]
    fn test_trivia_runs_are_skipped_together() {
        let mut lexer = Lexer::new("  // one\n /* two */ /* three\n */\tcontext /* open", "t.ael");
        let token = lexer.next_token();
        assert!(token.is(TokenKind::Context));
        assert_eq!(token.span, Span::from_coords(3, 9, 3, 15));
        assert!(lexer.next_token().is(TokenKind::Eof));
        let issues = lexer.take_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Unterminated comment runs to the end of the file");
        assert_eq!(issues[0].span, Span::from_coords(3, 17, 3, 18));
    }

    #[test]
    fn test_token_spans() {
        let tokens = Lexer::new("context\n\tfoo", "t.ael").tokenize();
        assert_eq!(tokens[0].span, Span::from_coords(1, 1, 1, 7));
        assert_eq!(tokens[1].span, Span::from_coords(2, 9, 2, 11));
        assert_eq!(tokens[1].text.as_deref(), Some("foo"));
    }

    #[test]
    fn test_paren_mode_captures_expression() {
        let mut lexer = Lexer::new("(${a} == (1)) {", "t.ael");
        assert!(lexer.next_token().is(TokenKind::Lp));
        lexer.begin_raw(RawMode::Paren, None);
        let word = lexer.next_token();
        assert_eq!(word.text.as_deref(), Some("${a} == (1)"));
        assert!(lexer.next_token().is(TokenKind::Rp));
        assert!(lexer.next_token().is(TokenKind::Lc));
    }

    #[test]
    fn test_args_mode_emits_words_and_separators() {
        let mut lexer = Lexer::new("Dial(SIP/a&SIP/b,,tT);", "t.ael");
        assert!(lexer.next_token().is(TokenKind::Word));
        assert!(lexer.next_token().is(TokenKind::Lp));
        lexer.begin_raw(RawMode::Args, None);
        let seq: Vec<(TokenKind, Option<String>)> = (0..6)
            .map(|_| {
                let t = lexer.next_token();
                (t.kind, t.text)
            })
            .collect();
        assert_eq!(
            seq,
            vec![
                (TokenKind::Word, Some("SIP/a&SIP/b".into())),
                (TokenKind::Comma, None),
                (TokenKind::Comma, None),
                (TokenKind::Word, Some("tT".into())),
                (TokenKind::Rp, None),
                (TokenKind::Semi, None),
            ]
        );
    }

    #[test]
    fn test_semicolon_mode_value() {
        let mut lexer = Lexer::new("x = ${y} ; z", "t.ael");
        lexer.next_token();
        assert!(lexer.next_token().is(TokenKind::Eq));
        lexer.begin_raw(RawMode::Semicolon, None);
        assert_eq!(lexer.next_token().text.as_deref(), Some("${y}"));
        assert!(lexer.next_token().is(TokenKind::Semi));
    }

    #[test]
    fn test_mismatch_is_an_issue() {
        let mut lexer = Lexer::new("a = b];", "t.ael");
        lexer.next_token();
        lexer.next_token();
        lexer.begin_raw(RawMode::Semicolon, None);
        assert_eq!(lexer.next_token().text.as_deref(), Some("b]"));
        let issues = lexer.take_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "Mismatched ']' in expression");
    }

    #[test]
    fn test_unknown_character_is_skipped() {
        let mut lexer = Lexer::new("a ? b", "t.ael");
        assert_eq!(lexer.next_token().text.as_deref(), Some("a"));
        assert_eq!(lexer.next_token().text.as_deref(), Some("b"));
        assert_eq!(lexer.take_issues().len(), 1);
    }

    #[test]
    fn test_include_pushes_file() {
        let dir = std::env::temp_dir().join(format!("ael-lex-include-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let inner = dir.join("inner.ael");
        let mut f = fs::File::create(&inner).unwrap();
        writeln!(f, "globals {{ }}").unwrap();

        let tokens = Lexer::new("#include \"inner.ael\"\ncontext", "main.ael")
            .with_base_dir(&dir)
            .tokenize();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Globals,
                TokenKind::Lc,
                TokenKind::Rc,
                TokenKind::Context,
                TokenKind::Eof
            ]
        );
        assert!(tokens[0].file.ends_with("inner.ael"));
        assert_eq!(&*tokens[3].file, "main.ael");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_include_is_an_issue() {
        let mut lexer = Lexer::new("#include \"nope.ael\" x", "t.ael")
            .with_base_dir("/nonexistent-ael-dir");
        assert_eq!(lexer.next_token().text.as_deref(), Some("x"));
        let issues = lexer.take_issues();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.starts_with("Couldn't read the include file"));
    }
}
