//! The word under a cursor.
//!
//!     Words are runs of identifier characters plus `: + - / ~`, which covers macro
//!     names as well as `~add-ons/...` style paths. Columns count characters. A cursor
//!     resting just past a word (on the following space or brace) still selects it.

use wml_parser::wml::location::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub line: usize,
    /// First character of the word.
    pub start: usize,
    /// One past the last character.
    pub end: usize,
}

pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | ':' | '+' | '-' | '/' | '~')
}

pub fn word_at_position(source: &str, position: Position) -> Option<Word> {
    let line = line_text(source, position.line)?;
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return None;
    }

    let mut index = position.column.min(chars.len() - 1);
    if !is_word_char(chars[index]) && index > 0 {
        index -= 1;
    }
    if !is_word_char(chars[index]) {
        return None;
    }

    let start = chars[..index]
        .iter()
        .rposition(|c| !is_word_char(*c))
        .map_or(0, |i| i + 1);
    let end = chars[index..]
        .iter()
        .position(|c| !is_word_char(*c))
        .map_or(chars.len(), |i| index + i);

    Some(Word {
        text: chars[start..end].iter().collect(),
        line: position.line,
        start,
        end,
    })
}

fn line_text(source: &str, line: usize) -> Option<&str> {
    source
        .split('\n')
        .nth(line)
        .map(|text| text.strip_suffix('\r').unwrap_or(text))
}
