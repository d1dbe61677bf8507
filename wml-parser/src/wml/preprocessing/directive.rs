//! Directive recognition.
//!
//!     A directive is a comment whose text starts with `#` immediately followed by a
//!     known keyword and then whitespace or the end of the line. `# define` and
//!     `#defined` are plain comments.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Define,
    Enddef,
    Undef,
    Ifdef,
    Ifndef,
    Ifhave,
    Ifnhave,
    Ifver,
    Ifnver,
    Else,
    Endif,
    Arg,
    Endarg,
    Textdomain,
    Error,
    Warning,
    Deprecated,
}

impl DirectiveKind {
    pub const ALL: [DirectiveKind; 17] = [
        DirectiveKind::Define,
        DirectiveKind::Enddef,
        DirectiveKind::Undef,
        DirectiveKind::Ifdef,
        DirectiveKind::Ifndef,
        DirectiveKind::Ifhave,
        DirectiveKind::Ifnhave,
        DirectiveKind::Ifver,
        DirectiveKind::Ifnver,
        DirectiveKind::Else,
        DirectiveKind::Endif,
        DirectiveKind::Arg,
        DirectiveKind::Endarg,
        DirectiveKind::Textdomain,
        DirectiveKind::Error,
        DirectiveKind::Warning,
        DirectiveKind::Deprecated,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            DirectiveKind::Define => "define",
            DirectiveKind::Enddef => "enddef",
            DirectiveKind::Undef => "undef",
            DirectiveKind::Ifdef => "ifdef",
            DirectiveKind::Ifndef => "ifndef",
            DirectiveKind::Ifhave => "ifhave",
            DirectiveKind::Ifnhave => "ifnhave",
            DirectiveKind::Ifver => "ifver",
            DirectiveKind::Ifnver => "ifnver",
            DirectiveKind::Else => "else",
            DirectiveKind::Endif => "endif",
            DirectiveKind::Arg => "arg",
            DirectiveKind::Endarg => "endarg",
            DirectiveKind::Textdomain => "textdomain",
            DirectiveKind::Error => "error",
            DirectiveKind::Warning => "warning",
            DirectiveKind::Deprecated => "deprecated",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub args: Vec<String>,
    /// Everything after the keyword, trimmed. Used by `#error` and friends.
    pub rest: String,
}

impl Directive {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

/// Parses the text of a COMMENT token (including its `#`).
pub fn parse_directive(comment: &str) -> Option<Directive> {
    let body = comment.strip_prefix('#')?;
    let keyword_end = body.find(char::is_whitespace).unwrap_or(body.len());
    let kind = DirectiveKind::from_keyword(&body[..keyword_end])?;
    let rest = body[keyword_end..].trim();

    Some(Directive {
        kind,
        args: rest.split_whitespace().map(str::to_string).collect(),
        rest: rest.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keyword_and_arguments() {
        let directive = parse_directive("#define RECT W H  KIND=box").unwrap();
        assert_eq!(directive.kind, DirectiveKind::Define);
        assert_eq!(directive.args, vec!["RECT", "W", "H", "KIND=box"]);
        assert_eq!(directive.rest, "RECT W H  KIND=box");
    }

    #[test]
    fn bare_keyword_has_no_arguments() {
        let directive = parse_directive("#endif").unwrap();
        assert_eq!(directive.kind, DirectiveKind::Endif);
        assert!(directive.args.is_empty());
    }

    #[test]
    fn plain_comments_are_not_directives() {
        assert!(parse_directive("# define X").is_none());
        assert!(parse_directive("#defined X").is_none());
        assert!(parse_directive("#po: translator note").is_none());
        assert!(parse_directive("#").is_none());
    }

    #[test]
    fn keywords_round_trip() {
        for kind in DirectiveKind::ALL {
            assert_eq!(DirectiveKind::from_keyword(kind.keyword()), Some(kind));
        }
    }
}
