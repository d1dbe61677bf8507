//! Preprocessing
//!
//!     Turns WML source into flat WML: directives are interpreted, macro calls are
//!     expanded and included files are spliced in. The output keeps the line layout
//!     of the emitted content; directive lines and comments do not appear in it.
//!
//! Evaluation
//!
//!     Each source (a file, an in-memory text, or a substituted macro body) goes
//!     through the same steps:
//!         1. [lex](crate::wml::lexing::lex) it.
//!         2. Build nodes. See [nodes]. This pairs `#define`/`#enddef` and collects
//!            documentation, but evaluates nothing.
//!         3. Evaluate the nodes in order against the [Session]. See [engine].
//!
//!     Evaluation is sequential: `#ifdef X` sees the definitions made before it and
//!     nothing after. Content under an inactive conditional is skipped entirely,
//!     including nested directives apart from the bookkeeping needed to find the
//!     matching `#endif`.
//!
//! Undefined Macros
//!
//!     A call naming no macro is first tried as a path (`{~add-ons/Pack/utils}`,
//!     `{core/macros}`); if nothing exists there the configured
//!     [UndefinedMacroPolicy] decides between failing and emitting the call as is.

pub mod call;
pub mod conditional;
pub mod directive;
pub mod engine;
pub mod error;
pub mod nodes;
pub mod options;
pub mod output;
pub mod session;
pub mod version;

pub use call::{CallArgument, MacroCall};
pub use conditional::{ConditionalFrame, ConditionalKind};
pub use directive::{parse_directive, Directive, DirectiveKind};
pub use engine::Preprocessor;
pub use error::PreprocessError;
pub use options::{PreprocessorOptions, UndefinedMacroPolicy};
pub use session::Session;
pub use version::{Version, VersionError, VersionOp};
