//! Token types shared across the lexer, the preprocessing engine and tooling.
//!
//!     A token is a kind, the content the kind carries and the byte range of the
//!     source it was read from. For QUOTED tokens the content is already unescaped
//!     (`""` collapsed to `"`) and excludes the delimiters; for RAW_QUOTED the
//!     delimiters are stripped and nothing else changes; for MACRO_CALL the braces
//!     are stripped. Every other kind stores its source slice as is.

use serde::Serialize;
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Text,
    Whitespace,
    EndOfLine,
    Comment,
    Quoted,
    RawQuoted,
    MacroCall,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Text => "TEXT",
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::EndOfLine => "END_OF_LINE",
            TokenKind::Comment => "COMMENT",
            TokenKind::Quoted => "QUOTED",
            TokenKind::RawQuoted => "RAW_QUOTED",
            TokenKind::MacroCall => "MACRO_CALL",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub content: String,
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, content: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            content: content.into(),
            span,
        }
    }

    /// A bare `+` between concatenation operands.
    pub fn is_plus(&self) -> bool {
        self.kind == TokenKind::Text && self.content == "+"
    }

    pub fn is_blank(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    /// Renders the token back into markup text.
    ///
    /// QUOTED content is re-escaped and RAW_QUOTED/MACRO_CALL get their delimiters
    /// back, so `detokenize(lex(s))` is equivalent markup even where it is not
    /// byte-identical to `s`.
    pub fn to_wml_string(&self) -> String {
        match self.kind {
            TokenKind::Quoted => format!("\"{}\"", self.content.replace('"', "\"\"")),
            TokenKind::RawQuoted => format!("<<{}>>", self.content),
            TokenKind::MacroCall => format!("{{{}}}", self.content),
            _ => self.content.clone(),
        }
    }
}

/// Converts a stream of tokens back into markup text.
pub fn detokenize(tokens: &[Token]) -> String {
    tokens.iter().map(Token::to_wml_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_content_is_reescaped() {
        let token = Token::new(TokenKind::Quoted, "say \"hi\"", 0..0);
        assert_eq!(token.to_wml_string(), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn delimiters_are_restored() {
        let tokens = vec![
            Token::new(TokenKind::Text, "a=", 0..2),
            Token::new(TokenKind::RawQuoted, "x \"y\"", 2..11),
            Token::new(TokenKind::Whitespace, " ", 11..12),
            Token::new(TokenKind::MacroCall, "NAME arg", 12..22),
        ];
        assert_eq!(detokenize(&tokens), "a=<<x \"y\">> {NAME arg}");
    }

    #[test]
    fn kind_names_match_serialized_form() {
        let json = serde_json::to_string(&TokenKind::EndOfLine).unwrap();
        assert_eq!(json, format!("\"{}\"", TokenKind::EndOfLine));
    }
}
