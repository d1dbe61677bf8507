use super::conditional::ConditionalStack;
use crate::wml::macros::MacroTable;
use crate::wml::records::RecordNode;
use std::path::{Path, PathBuf};

/// State shared by every file and expansion of one preprocessing run.
///
/// Nested inclusions see the same session, so macros defined by earlier files are
/// visible to later ones. An editor keeps a session alive across reparses and
/// reseeds its table with [Session::set_defines].
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) defines: MacroTable,
    pub(crate) binary_paths: Vec<PathBuf>,
    pub(crate) records: Vec<RecordNode>,
    pub(crate) textdomain: Option<String>,
    pub(crate) conditionals: ConditionalStack,
    pub(crate) include_stack: Vec<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defines(defines: MacroTable) -> Self {
        Self {
            defines,
            ..Self::default()
        }
    }

    pub fn defines(&self) -> &MacroTable {
        &self.defines
    }

    pub fn defines_mut(&mut self) -> &mut MacroTable {
        &mut self.defines
    }

    pub fn set_defines(&mut self, defines: MacroTable) {
        self.defines = defines;
    }

    pub fn take_defines(&mut self) -> MacroTable {
        std::mem::take(&mut self.defines)
    }

    pub fn binary_paths(&self) -> &[PathBuf] {
        &self.binary_paths
    }

    /// Appends a binary path root unless it is already known.
    pub fn add_binary_path(&mut self, path: PathBuf) {
        if !self.binary_paths.contains(&path) {
            self.binary_paths.push(path);
        }
    }

    pub fn extracted_records(&self) -> &[RecordNode] {
        &self.records
    }

    pub fn textdomain(&self) -> Option<&str> {
        self.textdomain.as_deref()
    }

    /// The innermost file being processed.
    pub fn current_file(&self) -> Option<&Path> {
        self.include_stack.last().map(PathBuf::as_path)
    }
}
