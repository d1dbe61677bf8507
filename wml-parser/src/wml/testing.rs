//! Testing utilities
//!
//!     Shared helpers for unit and integration tests: token projections that ignore
//!     byte ranges, and a small set of curated WML samples. Tests reuse these samples
//!     instead of inventing ad-hoc snippets, so a change in the markup conventions is
//!     fixed in one place.

use crate::wml::token::{Token, TokenKind};
use std::fs;
use std::io;
use std::path::Path;

/// Projects tokens onto `(kind, content)`, dropping spans.
pub fn kinds_and_contents(tokens: &[Token]) -> Vec<(TokenKind, String)> {
    tokens
        .iter()
        .map(|token| (token.kind, token.content.clone()))
        .collect()
}

/// A macro library with positional, default and documented macros.
pub const MACRO_LIBRARY: &str = "\
#textdomain wesnoth-help
# Greets someone by name.
#define GREET name
Hello {name}!
#enddef

# Places a rectangle of the given size.
#define RECT W H
    width={W}
    height={H}
#enddef

#define SIZED
    #arg SIZE
medium
    #endarg
size={SIZE}
#enddef
";

/// Two unit types the way a preprocessed unit tree looks.
pub const UNIT_TYPES: &str = "\
[units]
    [unit_type]
        id=Elvish Fighter
        name= _ \"Elvish Fighter\"
        race=elf
        hitpoints=33
        movement=5
        level=1
        [attack]
            name=sword
            damage=5
        [/attack]
    [/unit_type]
    [unit_type]
        id=Orcish Grunt
        name= _ \"Orcish Grunt\"
        race=orc
        hitpoints=38
        level=1
        description=\"Big, \"\"green\"\", and
strong\"
    [/unit_type]
[/units]
";

/// Writes `contents` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &str) -> io::Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}
