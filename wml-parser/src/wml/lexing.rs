//! Lexer
//!
//!     This module orchestrates the tokenization pipeline. Lexing runs transformations
//!     over tokens: logos produces the base tokens with their byte ranges, then each
//!     transformation receives a token vector and returns a token vector.
//!
//! The Lexing Pipeline
//!
//!     The pipeline consists of:
//!         1. Core tokenization using logos. See [base_tokenization].
//!            Every character of the input lands in exactly one base token. Quoted,
//!            raw-quoted and macro-call forms are recognized whole, unterminated ones
//!            run to end of input.
//!
//!         2. Token building. See [transformations::unescaping].
//!            Base tokens become [Token]s: quoted content is unescaped, delimiters are
//!            stripped, and a lone `<` is folded into its neighbouring text.
//!
//!         3. Concatenation. See [transformations::concatenation].
//!            `A + B` chains of TEXT/QUOTED operands are merged into one token.
//!
//!     [tokenize] stops after step 2 and is lossless for input without quoted forms
//!     or macro calls. [lex] runs the full pipeline and is what the preprocessor uses.
//!
//! Line Structure
//!
//!     Comments run to the end of their line and never swallow the line break, so
//!     the END_OF_LINE tokens describe the line structure of the source exactly. Byte
//!     ranges are preserved through every stage; merged tokens span their whole chain.

pub mod base_tokenization;
pub mod transformations;

pub use crate::wml::token::{detokenize, Token, TokenKind};

/// Tokenizes without the concatenation pass.
pub fn tokenize(source: &str) -> Vec<Token> {
    let base = base_tokenization::tokenize(source);
    transformations::unescaping::build_tokens(source, base)
}

/// Runs the full lexing pipeline.
pub fn lex(source: &str) -> Vec<Token> {
    transformations::concatenation::merge_concatenations(tokenize(source))
}
