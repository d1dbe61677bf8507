use super::conditional::ConditionalKind;
use super::directive::DirectiveKind;
use super::version::VersionError;
use crate::wml::location::SourceSite;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort preprocessing of the current file.
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("{site}: unterminated #define of macro '{name}'")]
    UnterminatedDefine { name: String, site: SourceSite },

    #[error("{site}: {directive} without a matching opening directive")]
    StrayDirective {
        directive: DirectiveKind,
        site: SourceSite,
    },

    #[error("{site}: {kind} is never closed by #endif")]
    UnterminatedConditional {
        kind: ConditionalKind,
        site: SourceSite,
    },

    #[error("{site}: {directive} {expected}")]
    InvalidDirective {
        directive: DirectiveKind,
        expected: &'static str,
        site: SourceSite,
    },

    #[error(
        "{site}: Wrong number of arguments supplied to macro '{name}'. Expected {expected} but got {found}."
    )]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
        site: SourceSite,
    },

    #[error("{site}: undefined macro '{name}'")]
    UndefinedMacro { name: String, site: SourceSite },

    #[error("{site}: expanding '{name}' exceeded the nesting limit of {limit}")]
    ExpansionDepthExceeded {
        name: String,
        limit: usize,
        site: SourceSite,
    },

    #[error("{site}: {} includes itself", path.display())]
    IncludeCycle { path: PathBuf, site: SourceSite },

    #[error("{site}: {source}")]
    InvalidVersion {
        #[source]
        source: VersionError,
        site: SourceSite,
    },

    #[error("{site}: #error {message}")]
    UserError { message: String, site: SourceSite },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

impl PreprocessError {
    /// The source line the error points at, when there is one.
    pub fn site(&self) -> Option<&SourceSite> {
        match self {
            PreprocessError::UnterminatedDefine { site, .. }
            | PreprocessError::StrayDirective { site, .. }
            | PreprocessError::UnterminatedConditional { site, .. }
            | PreprocessError::InvalidDirective { site, .. }
            | PreprocessError::ArgumentCountMismatch { site, .. }
            | PreprocessError::UndefinedMacro { site, .. }
            | PreprocessError::ExpansionDepthExceeded { site, .. }
            | PreprocessError::IncludeCycle { site, .. }
            | PreprocessError::InvalidVersion { site, .. }
            | PreprocessError::UserError { site, .. } => Some(site),
            PreprocessError::Io { .. } | PreprocessError::Walk { .. } => None,
        }
    }

    /// The file the error is about.
    pub fn file(&self) -> Option<&std::path::Path> {
        match self {
            PreprocessError::Io { path, .. } | PreprocessError::Walk { path, .. } => Some(path),
            other => other.site().and_then(|site| site.file.as_deref()),
        }
    }
}
