//! Raw captures for expressions, assignment values and call arguments
//!
//! In a raw mode the text is not split into words: it is captured verbatim up
//! to a terminator that sits outside every bracket. Brackets are tracked on a
//! stack so that `(`, `[` and `{` nest in any combination; a backslash takes
//! the next character literally.

use crate::ael::token::RawMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawStop {
    /// A terminator for the mode was found at `consumed`; it is not part of
    /// the capture.
    Terminator(char),
    /// A closing bracket that matches nothing open; it is part of the capture.
    Mismatch(char),
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCapture {
    /// Bytes read, excluding a terminator.
    pub consumed: usize,
    /// Byte range of the capture with surrounding whitespace removed.
    pub trimmed: std::ops::Range<usize>,
    pub stop: RawStop,
}

impl RawCapture {
    pub fn is_empty(&self) -> bool {
        self.consumed == 0
    }
}

fn opener_of(close: char) -> char {
    match close {
        ')' => '(',
        ']' => '[',
        _ => '{',
    }
}

/// Openers left unclosed in `word`, bottom of the stack first.
pub fn open_brackets(word: &str) -> Vec<char> {
    let mut stack = Vec::new();
    let mut chars = word.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '(' | '[' | '{' => stack.push(ch),
            ')' | ']' | '}' => {
                if stack.last() == Some(&opener_of(ch)) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }
    stack
}

fn is_terminator(mode: RawMode, ch: char) -> bool {
    match mode {
        RawMode::Paren => ch == ')',
        RawMode::Semicolon => ch == ';',
        RawMode::Args => ch == ',' || ch == ')',
    }
}

/// Capture from the start of `text` according to `mode`.
pub fn capture(text: &str, mode: RawMode, brackets: &mut Vec<char>) -> RawCapture {
    let mut chars = text.char_indices();
    while let Some((i, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            _ if brackets.is_empty() && is_terminator(mode, ch) => {
                return finish(text, i, RawStop::Terminator(ch));
            }
            '(' | '[' | '{' => brackets.push(ch),
            ')' | ']' | '}' => {
                if brackets.last() == Some(&opener_of(ch)) {
                    brackets.pop();
                } else {
                    return finish(text, i + ch.len_utf8(), RawStop::Mismatch(ch));
                }
            }
            _ => {}
        }
    }
    finish(text, text.len(), RawStop::Eof)
}

fn finish(text: &str, consumed: usize, stop: RawStop) -> RawCapture {
    let body = &text[..consumed];
    let start = body.len() - body.trim_start().len();
    let end = body.trim_end().len().max(start);
    RawCapture {
        consumed,
        trimmed: start..end,
        stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, mode: RawMode) -> (String, RawStop) {
        let mut brackets = Vec::new();
        let cap = capture(text, mode, &mut brackets);
        (text[cap.trimmed.clone()].to_string(), cap.stop)
    }

    #[test]
    fn test_paren_stops_at_unmatched_close() {
        let (text, stop) = run(" ${x} = (1 + 2) ) {", RawMode::Paren);
        assert_eq!(text, "${x} = (1 + 2)");
        assert_eq!(stop, RawStop::Terminator(')'));
    }

    #[test]
    fn test_semicolon_ignores_nested_semicolons() {
        let (text, stop) = run("$[${a};${b}] ;rest", RawMode::Semicolon);
        assert_eq!(text, "$[${a};${b}]");
        assert_eq!(stop, RawStop::Terminator(';'));
    }

    #[test]
    fn test_args_split_on_top_level_commas() {
        let (text, stop) = run("SIP/${EXTEN},20,tT)", RawMode::Args);
        assert_eq!(text, "SIP/${EXTEN}");
        assert_eq!(stop, RawStop::Terminator(','));

        let (text, stop) = run("fn(a,b),x)", RawMode::Args);
        assert_eq!(text, "fn(a,b)");
        assert_eq!(stop, RawStop::Terminator(','));
    }

    #[test]
    fn test_escaped_terminator_is_literal() {
        let (text, stop) = run(r"a\,b)", RawMode::Args);
        assert_eq!(text, r"a\,b");
        assert_eq!(stop, RawStop::Terminator(')'));
    }

    #[test]
    fn test_mismatch_is_reported() {
        let (text, stop) = run("a(]b;", RawMode::Semicolon);
        assert_eq!(text, "a(]");
        assert_eq!(stop, RawStop::Mismatch(']'));
    }

    #[test]
    fn test_eof_inside_capture() {
        let (text, stop) = run("abc(", RawMode::Paren);
        assert_eq!(text, "abc(");
        assert_eq!(stop, RawStop::Eof);
    }

    #[test]
    fn test_open_brackets_of_previous_word() {
        assert_eq!(open_brackets("${a"), vec!['{']);
        assert_eq!(open_brackets("x(y[1]"), vec!['(']);
        assert!(open_brackets(r"a\(").is_empty());
    }

    #[test]
    fn test_seeded_brackets_delay_the_terminator() {
        let mut brackets = vec!['('];
        let cap = capture("a) b)", RawMode::Paren, &mut brackets);
        assert_eq!(cap.consumed, 4);
        assert!(brackets.is_empty());
    }
}
