//! Builds [Token]s out of base tokens.
//!
//!     Quoted content is unescaped and stripped of its quotes, raw strings and macro
//!     calls lose their delimiters, and TEXT pieces that touch each other (text around
//!     a lone `<`) are folded into one TEXT token.

use super::super::base_tokenization::BaseToken;
use crate::wml::token::{Token, TokenKind};
use std::ops::Range;

pub fn build_tokens(source: &str, base: Vec<(BaseToken, Range<usize>)>) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::with_capacity(base.len());

    for (base_token, span) in base {
        let slice = &source[span.clone()];
        let (kind, content) = match base_token {
            BaseToken::Comment => (TokenKind::Comment, slice.to_string()),
            BaseToken::EndOfLine => (TokenKind::EndOfLine, slice.to_string()),
            BaseToken::Whitespace => (TokenKind::Whitespace, slice.to_string()),
            BaseToken::Quoted => (TokenKind::Quoted, unquote(slice)),
            BaseToken::RawQuoted => (TokenKind::RawQuoted, unwrap_raw(slice).to_string()),
            BaseToken::MacroCall => (TokenKind::MacroCall, unwrap_call(slice).to_string()),
            BaseToken::LoneAngle | BaseToken::Text => (TokenKind::Text, slice.to_string()),
        };

        match tokens.last_mut() {
            Some(last)
                if kind == TokenKind::Text
                    && last.kind == TokenKind::Text
                    && last.span.end == span.start =>
            {
                last.content.push_str(&content);
                last.span.end = span.end;
            }
            _ => tokens.push(Token::new(kind, content, span)),
        }
    }

    tokens
}

/// Strips the quotes of a `"..."` slice, collapsing `""` into `"`.
///
/// A single `"` ends the string; an unterminated string keeps everything after the
/// opening quote.
pub fn unquote(slice: &str) -> String {
    let inner = slice.strip_prefix('"').unwrap_or(slice);
    let mut content = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '"' {
            content.push(ch);
        } else if chars.peek() == Some(&'"') {
            chars.next();
            content.push('"');
        } else {
            break;
        }
    }

    content
}

fn unwrap_raw(slice: &str) -> &str {
    let inner = slice.strip_prefix("<<").unwrap_or(slice);
    inner.strip_suffix(">>").unwrap_or(inner)
}

fn unwrap_call(slice: &str) -> &str {
    let inner = slice.strip_prefix('{').unwrap_or(slice);
    inner.strip_suffix('}').unwrap_or(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquote_collapses_doubled_quotes() {
        assert_eq!(unquote(r#""say ""hi""""#), r#"say "hi""#);
        assert_eq!(unquote(r#""""#), "");
        assert_eq!(unquote(r#""open"#), "open");
    }

    #[test]
    fn raw_keeps_content_untouched() {
        assert_eq!(unwrap_raw("<<a\"\"b>>"), "a\"\"b");
        assert_eq!(unwrap_raw("<<>>"), "");
        assert_eq!(unwrap_raw("<<"), "");
    }

    #[test]
    fn call_loses_braces() {
        assert_eq!(unwrap_call("{NAME a b}"), "NAME a b");
        assert_eq!(unwrap_call("{NAME"), "NAME");
    }
}
