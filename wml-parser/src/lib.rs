//! # wml-parser
//!
//! Lexer, macro preprocessor and record extractor for WML, the line-oriented
//! `[tag]` / `key=value` markup with a C-preprocessor-like macro layer.
//!
//! File Layout
//!
//!     src/wml
//!       ├── token            Token kinds shared by every stage
//!       ├── lexing           logos base tokenization plus transformation passes
//!       ├── macros           Macro definitions and the macro table
//!       ├── paths            Path resolution (relative, user data, asset buckets)
//!       ├── preprocessing    Directive interpretation and macro expansion
//!       ├── records          Generic record tree built from preprocessed output
//!       └── sanitize         Comment normalization for source trees
//!
//!     Data flows left to right: source text is lexed into tokens, the tokens become
//!     a small node list the engine evaluates against a Session, and the flat output
//!     can be handed to the record extractor.

pub mod wml;

pub use wml::lexing::{lex, tokenize};
pub use wml::macros::{MacroDefinition, MacroTable};
pub use wml::paths::PathResolver;
pub use wml::preprocessing::{PreprocessError, Preprocessor, PreprocessorOptions, Session};
pub use wml::records::{AttributeValue, RecordNode};
pub use wml::token::{Token, TokenKind};
