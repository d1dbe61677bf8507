//! Language server for WML macros
//!
//!     The server keeps one macro table for the whole workspace. It is built by
//!     preprocessing the configured include paths followed by the input file, and
//!     rebuilt every time a document is saved. Editor queries read that table:
//!
//!         - Hover (textDocument/hover): signature, documentation and textdomain of the
//!           macro under the cursor.
//!         - Go to Definition (textDocument/definition): the `#define` line of the most
//!           recent definition.
//!         - Completion (textDocument/completion): directive keywords after `#`, macro
//!           names after `{`, both when invoked explicitly.
//!
//!     A failed parse keeps the previous table. The error is shown to the user and
//!     published as a diagnostic on the file that caused it.
//!
//! Configuration
//!
//!     The binary loads `wml.toml` from the working directory when present (see
//!     `wml-config`). The client's `initializationOptions` override the paths, see
//!     [settings].
//!
//! Testing
//!
//!     The server is generic over [server::LspClient] and [server::FeatureProvider] so
//!     tests can record what is sent to the client and substitute the analysis layer.

pub mod server;
pub mod settings;

pub use server::WmlLanguageServer;
pub use settings::{parse_workspace, InitializationOptions, ServerSettings};
