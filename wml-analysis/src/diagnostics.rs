//! Preprocessing errors as editor diagnostics.

use lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range, Url};
use wml_parser::wml::location::SourceSite;
use wml_parser::PreprocessError;

/// A diagnostic and the document it belongs to. `uri` is `None` when the error
/// did not come from a file on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDiagnostic {
    pub uri: Option<Url>,
    pub diagnostic: Diagnostic,
}

pub fn error_diagnostic(error: &PreprocessError) -> ErrorDiagnostic {
    let line = error.site().map_or(0, |site| site.line) as u32;
    let uri = error
        .file()
        .and_then(|file| SourceSite::new(Some(file), 0).uri());

    ErrorDiagnostic {
        uri,
        diagnostic: Diagnostic {
            range: Range::new(Position::new(line, 0), Position::new(line + 1, 0)),
            severity: Some(DiagnosticSeverity::ERROR),
            source: Some("wml".to_string()),
            message: message_without_site(error),
            ..Diagnostic::default()
        },
    }
}

/// The diagnostic already points at the line, so the `file:line: ` prefix goes.
fn message_without_site(error: &PreprocessError) -> String {
    let text = error.to_string();
    let prefix = error.site().map(|site| format!("{}: ", site));
    match prefix.as_deref().and_then(|prefix| text.strip_prefix(prefix)) {
        Some(rest) => rest.to_string(),
        None => text.clone(),
    }
}
