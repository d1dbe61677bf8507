//! Output buffer of a preprocessing run.
//!
//!     Everything the engine emits goes through [Output], which watches completed
//!     lines for `[binary_path]` blocks so their `path` can feed path resolution
//!     while the run is still going.

use crate::wml::lexing::transformations::unescaping::unquote;
use crate::wml::token::{Token, TokenKind};
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct Output {
    text: String,
    line_start: usize,
    tracker: BinaryPathTracker,
    found: Vec<PathBuf>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_token(&mut self, token: &Token) {
        match token.kind {
            TokenKind::Comment => {}
            TokenKind::EndOfLine => self.write_str("\n"),
            _ => self.write_str(&token.to_wml_string()),
        }
    }

    pub fn write_str(&mut self, text: &str) {
        self.text.push_str(text);
        while let Some(offset) = self.text[self.line_start..].find('\n') {
            let end = self.line_start + offset;
            if let Some(path) = self.tracker.feed(&self.text[self.line_start..end]) {
                self.found.push(path);
            }
            self.line_start = end + 1;
        }
    }

    /// Binary paths completed since the last call.
    pub fn take_binary_paths(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.found)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Line-level recognizer for `[binary_path] path=... [/binary_path]`.
#[derive(Debug, Default)]
struct BinaryPathTracker {
    inside: bool,
    nested: usize,
    path: Option<String>,
}

impl BinaryPathTracker {
    fn feed(&mut self, line: &str) -> Option<PathBuf> {
        let line = line.trim();
        if !self.inside {
            if line == "[binary_path]" {
                self.inside = true;
                self.nested = 0;
                self.path = None;
            }
            return None;
        }

        if line.starts_with("[/") {
            if self.nested == 0 {
                self.inside = false;
                return self.path.take().filter(|p| !p.is_empty()).map(PathBuf::from);
            }
            self.nested -= 1;
        } else if line.starts_with('[') {
            self.nested += 1;
        } else if self.nested == 0 {
            if let Some((key, value)) = line.split_once('=') {
                if key.trim() == "path" {
                    let value = value.trim();
                    let value = if value.starts_with('"') {
                        unquote(value)
                    } else {
                        value.to_string()
                    };
                    self.path = Some(value);
                }
            }
        }
        None
    }
}
