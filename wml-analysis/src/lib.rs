//! Editor queries over a preprocessed macro table.
//!
//!     Every query here is a plain function of a [MacroTable](wml_parser::MacroTable)
//!     and, where a cursor is involved, the text of the document the cursor is in.
//!     Nothing here talks the protocol: the language server converts the results.
//!
//!         word          the identifier-ish word under a cursor
//!         hover         Markdown help for the macro under the cursor
//!         definition    where the macro under the cursor was defined
//!         completion    directive keywords and macro names
//!         diagnostics   preprocessing errors as editor diagnostics

pub mod completion;
pub mod definition;
pub mod diagnostics;
pub mod hover;
pub mod word;

pub use completion::{completion_items, CompletionCandidate, CompletionTrigger};
pub use definition::{goto_definition, DefinitionTarget};
pub use diagnostics::{error_diagnostic, ErrorDiagnostic};
pub use hover::{hover, HoverResult};
pub use word::{word_at_position, Word};

#[cfg(test)]
pub(crate) mod test_support;
