//! Comment normalization.
//!
//!     Rewrites comment lines such as `#TODO fix` to `# TODO fix` so that they can
//!     never be mistaken for a directive. Directive lines and lines whose comment
//!     already starts with whitespace or another `#` are left alone.

use crate::wml::preprocessing::parse_directive;
use ignore::WalkBuilder;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("failed to access {}: {source}", path.display())]
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

/// Returns the rewritten text, or `None` when nothing needed a change.
pub fn sanitize_comments(source: &str) -> Option<String> {
    let mut changed = false;
    let mut sanitized = String::with_capacity(source.len() + 16);

    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let needs_space = trimmed.starts_with('#')
            && parse_directive(trimmed.trim_end()).is_none()
            && trimmed[1..]
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace() && c != '#');

        if needs_space {
            let hash = line.len() - trimmed.len();
            sanitized.push_str(&line[..=hash]);
            sanitized.push(' ');
            sanitized.push_str(&line[hash + 1..]);
            changed = true;
        } else {
            sanitized.push_str(line);
        }
    }

    changed.then_some(sanitized)
}

/// Sanitizes a file, or every file with one of `extensions` below a directory
/// (all files when `extensions` is empty). Returns the files that were rewritten.
pub fn sanitize_path(path: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, SanitizeError> {
    let mut changed = Vec::new();
    for file in files_under(path, extensions)? {
        let io_error = |source| SanitizeError::Io {
            path: file.clone(),
            source,
        };
        let source = fs::read_to_string(&file).map_err(io_error)?;
        if let Some(sanitized) = sanitize_comments(&source) {
            fs::write(&file, sanitized).map_err(io_error)?;
            debug!(file = %file.display(), "sanitized");
            changed.push(file);
        }
    }
    Ok(changed)
}

fn files_under(path: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, SanitizeError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    let walker = WalkBuilder::new(path)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();
    for entry in walker {
        let entry = entry.map_err(|source| SanitizeError::Walk {
            path: path.to_path_buf(),
            source,
        })?;
        let wanted = extensions.is_empty()
            || entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|w| w.eq_ignore_ascii_case(ext)));
        if wanted && entry.file_type().is_some_and(|t| t.is_file()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
