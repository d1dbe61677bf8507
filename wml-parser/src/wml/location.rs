//! Byte offset to line/column conversion.
//!
//!     Tokens carry byte ranges; directives, macro definitions and errors report
//!     0-based lines. Line breaks follow the lexer: `\n`, `\r`, `\r\n` and the Unicode
//!     line and paragraph separators each end one line.

use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Represents a position in source code (line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Line start table for one source text.
#[derive(Debug, Clone)]
pub struct SourceLocation {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl SourceLocation {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut chars = source.char_indices().peekable();

        while let Some((byte_pos, ch)) = chars.next() {
            match ch {
                '\r' => {
                    if let Some(&(next_pos, '\n')) = chars.peek() {
                        chars.next();
                        line_starts.push(next_pos + 1);
                    } else {
                        line_starts.push(byte_pos + 1);
                    }
                }
                '\n' | '\u{2028}' | '\u{2029}' => line_starts.push(byte_pos + ch.len_utf8()),
                _ => {}
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a line/column position
    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);

        Position::new(line, byte_offset - self.line_starts[line])
    }

    pub fn line_of(&self, byte_offset: usize) -> usize {
        self.byte_to_position(byte_offset).line
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// A line in a source file. `line` is 0-based; `Display` shows it 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceSite {
    pub file: Option<PathBuf>,
    pub line: usize,
}

impl SourceSite {
    pub fn new(file: Option<&Path>, line: usize) -> Self {
        Self {
            file: file.map(Path::to_path_buf),
            line,
        }
    }

    /// `file://` URI of the file, for sites that are on disk.
    pub fn uri(&self) -> Option<Url> {
        let file = self.file.as_ref()?;
        let absolute = std::path::absolute(file).ok()?;
        Url::from_file_path(absolute).ok()
    }
}

impl fmt::Display for SourceSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}", file.display(), self.line + 1),
            None => write!(f, "<input>:{}", self.line + 1),
        }
    }
}
