//! Base tokenization
//!
//!     The logos lexer. It knows nothing about directives, macros or concatenation;
//!     it only cuts the input into runs that later stages interpret. The patterns
//!     are disjoint, so every character ends up in exactly one token and the slices
//!     of the output concatenate back to the input.

use logos::Logos;
use std::ops::Range;

/// All raw token shapes of WML source.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseToken {
    /// `#` up to (not including) the line break.
    #[regex(r"#[^\r\n\x{2028}\x{2029}]*")]
    Comment,

    #[regex(r"\r\n|[\r\n\x{2028}\x{2029}]")]
    EndOfLine,

    #[regex(r"[\t\x0B\x0C \x{85}\x{A0}\x{1680}\x{2000}-\x{200A}\x{202F}\x{205F}\x{3000}]+")]
    Whitespace,

    /// `"..."` with `""` standing for a literal quote. The closing quote is optional.
    #[regex(r#""([^"]|"")*"?"#)]
    Quoted,

    /// `<<...>>`, closed by the first `>>` if any.
    #[regex(r"<<([^>]|>[^>])*(>>|>)?")]
    RawQuoted,

    /// `{...}`, closed by the first `}` if any.
    #[regex(r"\{[^}]*\}?")]
    MacroCall,

    /// A `<` that does not open a raw string.
    #[token("<")]
    LoneAngle,

    #[regex(r#"[^\t\x0B\x0C \x{85}\x{A0}\x{1680}\x{2000}-\x{200A}\x{202F}\x{205F}\x{3000}\r\n\x{2028}\x{2029}#"<{]+"#)]
    Text,
}

/// Runs logos over the source, pairing each token with its byte range.
///
/// Slices logos cannot classify are reported as [BaseToken::Text].
pub fn tokenize(source: &str) -> Vec<(BaseToken, Range<usize>)> {
    let mut lexer = BaseToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let token = result.unwrap_or(BaseToken::Text);
        tokens.push((token, lexer.span()));
    }

    tokens
}
