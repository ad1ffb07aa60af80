//! Normal-mode token definitions
//!
//! Keywords, punctuation and words, defined with the logos derive macro.
//! Comments are stripped by the caller before logos sees the input.
use crate::ael::token::TokenKind;
use logos::Logos;

#[derive(Logos, Debug, PartialEq, Clone, Copy)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum RawToken {
    #[token("context")]
    Context,
    #[token("abstract")]
    Abstract,
    #[token("extend")]
    Extend,
    #[token("macro")]
    Macro,
    #[token("globals")]
    Globals,
    #[token("ignorepat")]
    Ignorepat,
    #[token("switch")]
    Switch,
    #[token("if")]
    If,
    #[token("ifTime")]
    IfTime,
    #[token("else")]
    Else,
    #[token("random")]
    Random,
    #[token("goto")]
    Goto,
    #[token("jump")]
    Jump,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("regexten")]
    Regexten,
    #[token("hint")]
    Hint,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("case")]
    Case,
    #[token("pattern")]
    Pattern,
    #[token("default")]
    Default,
    #[token("catch")]
    Catch,
    #[token("switches")]
    Switches,
    #[token("eswitches")]
    ESwitches,
    #[token("includes")]
    Includes,

    #[token("{")]
    Lc,
    #[token("}")]
    Rc,
    #[token("(")]
    Lp,
    #[token(")")]
    Rp,
    #[token(";")]
    Semi,
    #[token("=>")]
    ExtenMark,
    #[token("=")]
    Eq,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("&")]
    Amper,
    #[token("|")]
    Bar,
    #[token("@")]
    At,

    #[regex(r#"#include[ \t]+"[^"\n]*""#)]
    Include,

    // Variable references such as `${EXTEN:1}` and `$[ 1 + 2 ]` are kept
    // whole, spaces included; see `extend_word`.
    #[regex(r#"([-a-zA-Z0-9'"_/.<>*+!$#\[\]]|[^\x00-\x7F]|\\[^\n])+"#, extend_word)]
    Word,
}

impl RawToken {
    /// The grammar terminal for this token; `Include` has none.
    pub fn kind(&self) -> Option<TokenKind> {
        let kind = match self {
            RawToken::Context => TokenKind::Context,
            RawToken::Abstract => TokenKind::Abstract,
            RawToken::Extend => TokenKind::Extend,
            RawToken::Macro => TokenKind::Macro,
            RawToken::Globals => TokenKind::Globals,
            RawToken::Ignorepat => TokenKind::Ignorepat,
            RawToken::Switch => TokenKind::Switch,
            RawToken::If => TokenKind::If,
            RawToken::IfTime => TokenKind::IfTime,
            RawToken::Else => TokenKind::Else,
            RawToken::Random => TokenKind::Random,
            RawToken::Goto => TokenKind::Goto,
            RawToken::Jump => TokenKind::Jump,
            RawToken::Return => TokenKind::Return,
            RawToken::Break => TokenKind::Break,
            RawToken::Continue => TokenKind::Continue,
            RawToken::Regexten => TokenKind::Regexten,
            RawToken::Hint => TokenKind::Hint,
            RawToken::For => TokenKind::For,
            RawToken::While => TokenKind::While,
            RawToken::Case => TokenKind::Case,
            RawToken::Pattern => TokenKind::Pattern,
            RawToken::Default => TokenKind::Default,
            RawToken::Catch => TokenKind::Catch,
            RawToken::Switches => TokenKind::Switches,
            RawToken::ESwitches => TokenKind::ESwitches,
            RawToken::Includes => TokenKind::Includes,
            RawToken::Lc => TokenKind::Lc,
            RawToken::Rc => TokenKind::Rc,
            RawToken::Lp => TokenKind::Lp,
            RawToken::Rp => TokenKind::Rp,
            RawToken::Semi => TokenKind::Semi,
            RawToken::ExtenMark => TokenKind::ExtenMark,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Amper => TokenKind::Amper,
            RawToken::Bar => TokenKind::Bar,
            RawToken::At => TokenKind::At,
            RawToken::Word => TokenKind::Word,
            RawToken::Include => return None,
        };
        Some(kind)
    }
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "-'\"_/.<>*+!$#[]".contains(ch) || !ch.is_ascii()
}

fn closer_for(open: char) -> Option<char> {
    match open {
        '{' => Some('}'),
        '[' => Some(']'),
        '(' => Some(')'),
        _ => None,
    }
}

/// End offset of the word starting at `start`, absorbing `${...}`, `$[...]`
/// and `$(...)` groups even when they contain spaces or punctuation. A group
/// left open at the end of the line is not absorbed.
pub(crate) fn scan_word(source: &str, start: usize) -> Option<usize> {
    let mut closers: Vec<char> = Vec::new();
    let mut chars = source[start..].char_indices().peekable();
    let mut end = start;

    while let Some((i, ch)) = chars.next() {
        if closers.is_empty() {
            if ch == '$' {
                if let Some(closer) = chars.peek().and_then(|&(_, next)| closer_for(next)) {
                    chars.next();
                    closers.push(closer);
                    continue;
                }
            }
            if ch == '\\' {
                match chars.next() {
                    Some((j, escaped)) if escaped != '\n' => {
                        end = start + j + escaped.len_utf8();
                        continue;
                    }
                    _ => break,
                }
            }
            if !is_word_char(ch) {
                break;
            }
            end = start + i + ch.len_utf8();
        } else {
            match ch {
                '\n' => return None,
                '\\' => {
                    chars.next();
                }
                _ if Some(&ch) == closers.last() => {
                    closers.pop();
                    if closers.is_empty() {
                        end = start + i + 1;
                    }
                }
                _ => {
                    if let Some(closer) = closer_for(ch) {
                        closers.push(closer);
                    }
                }
            }
        }
    }

    if closers.is_empty() {
        Some(end)
    } else {
        None
    }
}

fn extend_word(lex: &mut logos::Lexer<RawToken>) {
    let span = lex.span();
    if let Some(end) = scan_word(lex.source(), span.start) {
        if end > span.end {
            lex.bump(end - span.end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(input: &str) -> Vec<(RawToken, String)> {
        let mut lexer = RawToken::lexer(input);
        let mut out = Vec::new();
        while let Some(token) = lexer.next() {
            out.push((token.expect("valid token"), lexer.slice().to_string()));
        }
        out
    }

    #[test]
    fn test_keywords_and_words() {
        let tokens = lex_all("context contexts ifTime if");
        assert_eq!(
            tokens,
            vec![
                (RawToken::Context, "context".into()),
                (RawToken::Word, "contexts".into()),
                (RawToken::IfTime, "ifTime".into()),
                (RawToken::If, "if".into()),
            ]
        );
    }

    #[test]
    fn test_extenmark_beats_eq() {
        let kinds: Vec<_> = lex_all("_X. => =").into_iter().map(|(t, _)| t).collect();
        assert_eq!(kinds, vec![RawToken::Word, RawToken::ExtenMark, RawToken::Eq]);
    }

    #[test]
    fn test_variable_references_stay_whole() {
        let tokens = lex_all("${EXTEN:1} $[ ${x} + 1 ];");
        assert_eq!(tokens[0], (RawToken::Word, "${EXTEN:1}".into()));
        assert_eq!(tokens[1], (RawToken::Word, "$[ ${x} + 1 ]".into()));
        assert_eq!(tokens[2].0, RawToken::Semi);
    }

    #[test]
    fn test_unclosed_reference_is_not_absorbed() {
        let tokens = lex_all("a${b\nc");
        assert_eq!(tokens[0], (RawToken::Word, "a$".into()));
    }

    #[test]
    fn test_include_directive() {
        let tokens = lex_all("#include \"other.ael\"");
        assert_eq!(tokens, vec![(RawToken::Include, "#include \"other.ael\"".into())]);
    }

    #[test]
    fn test_punctuation_splits_words() {
        let kinds: Vec<_> = lex_all("s@ctx|1,2").into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            kinds,
            vec![
                RawToken::Word,
                RawToken::At,
                RawToken::Word,
                RawToken::Bar,
                RawToken::Word,
                RawToken::Comma,
                RawToken::Word
            ]
        );
    }
}
