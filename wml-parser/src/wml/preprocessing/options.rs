use super::version::Version;
use serde::{Deserialize, Serialize};

/// What to do with `{NAME}` when `NAME` is neither a macro nor an existing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UndefinedMacroPolicy {
    /// Fail with [UndefinedMacro](super::PreprocessError::UndefinedMacro).
    #[default]
    Error,
    /// Emit the call unchanged and log a warning.
    Passthrough,
}

#[derive(Debug, Clone)]
pub struct PreprocessorOptions {
    /// Ceiling on nested macro expansions and file inclusions.
    pub max_depth: usize,
    pub undefined_macro: UndefinedMacroPolicy,
    /// Version `#ifver OP VERSION` compares against.
    pub reference_version: Version,
    /// File extensions picked up when a directory is included. Empty means all files.
    pub include_extensions: Vec<String>,
    /// Whether top-level runs extract records from their output.
    pub extract_records: bool,
}

impl Default for PreprocessorOptions {
    fn default() -> Self {
        Self {
            max_depth: 100,
            undefined_macro: UndefinedMacroPolicy::Error,
            reference_version: Version::new(vec![1, 18, 0]),
            include_extensions: vec!["cfg".to_string()],
            extract_records: true,
        }
    }
}
