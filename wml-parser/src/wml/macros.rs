//! Macros
//!
//!     A macro is a named text template introduced by `#define` and closed by
//!     `#enddef`. [MacroDefinition] holds one such template together with where it
//!     was defined; [MacroTable] is the store the preprocessor and the editor
//!     tooling share.

pub mod definition;
pub mod table;

pub use definition::MacroDefinition;
pub use table::MacroTable;
