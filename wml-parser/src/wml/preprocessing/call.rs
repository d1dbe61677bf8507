//! Macro call parsing.
//!
//!     `{NAME arg1 "arg two" (arg three) key=value}` splits on whitespace into a name
//!     and arguments. A quoted segment, a `<<raw>>` segment or a parenthesized group
//!     keeps its whitespace and counts as one argument. Quotes and parentheses that
//!     wrap a whole argument are removed from its value.

use crate::wml::lexing::transformations::unescaping::unquote;
use crate::wml::macros::MacroDefinition;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static KEYWORD_ARGUMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^([A-Za-z_][A-Za-z0-9_]*)=(.*)$").expect("keyword argument pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArgument {
    /// The argument as written at the call site.
    pub raw: String,
    /// The value passed when the argument is positional.
    pub value: String,
    /// `key` and value when the argument has the `key=value` shape.
    pub keyword: Option<(String, String)>,
}

impl CallArgument {
    pub fn from_raw(raw: &str) -> Self {
        let keyword = KEYWORD_ARGUMENT
            .captures(raw)
            .map(|caps| (caps[1].to_string(), strip_wrapping(&caps[2])));
        Self {
            raw: raw.to_string(),
            value: strip_wrapping(raw),
            keyword,
        }
    }
}

fn strip_wrapping(text: &str) -> String {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return unquote(text);
    }
    if let Some(inner) = text.strip_prefix("<<").and_then(|t| t.strip_suffix(">>")) {
        return inner.to_string();
    }
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        return inner.to_string();
    }
    text.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCall {
    pub name: String,
    pub args: Vec<CallArgument>,
}

/// Positional values and keyword values of a call, bound against a definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundArguments {
    pub positional: Vec<String>,
    pub keywords: IndexMap<String, String>,
}

impl MacroCall {
    pub fn parse(content: &str) -> Self {
        let mut pieces = split_arguments(content).into_iter();
        let name = pieces.next().unwrap_or_default();
        Self {
            name,
            args: pieces.map(|raw| CallArgument::from_raw(&raw)).collect(),
        }
    }

    /// `key=value` arguments whose key is one of the definition's keyword
    /// parameters bind by name, everything else binds by position.
    pub fn bind(&self, definition: &MacroDefinition) -> BoundArguments {
        let mut bound = BoundArguments::default();
        for arg in &self.args {
            match &arg.keyword {
                Some((key, value)) if definition.defaults.contains_key(key) => {
                    bound.keywords.insert(key.clone(), value.clone());
                }
                _ => bound.positional.push(arg.value.clone()),
            }
        }
        bound
    }
}

fn split_arguments(content: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_raw = false;
    let mut parens = 0usize;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_raw {
            current.push(ch);
            if ch == '>' && chars.peek() == Some(&'>') {
                current.push('>');
                chars.next();
                in_raw = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '<' if !in_quotes && chars.peek() == Some(&'<') => {
                chars.next();
                current.push_str("<<");
                in_raw = true;
            }
            '(' if !in_quotes => {
                parens += 1;
                current.push(ch);
            }
            ')' if !in_quotes && parens > 0 => {
                parens -= 1;
                current.push(ch);
            }
            c if c.is_whitespace() && !in_quotes && parens == 0 => {
                if !current.is_empty() {
                    pieces.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(call: &MacroCall) -> Vec<&str> {
        call.args.iter().map(|a| a.value.as_str()).collect()
    }

    #[test]
    fn splits_name_and_arguments() {
        let call = MacroCall::parse("RECT 3  4\n5");
        assert_eq!(call.name, "RECT");
        assert_eq!(values(&call), vec!["3", "4", "5"]);
    }

    #[test]
    fn quoted_segments_are_one_argument() {
        let call = MacroCall::parse(r#"GREET "Big ""World""" x"#);
        assert_eq!(values(&call), vec![r#"Big "World""#, "x"]);
        assert_eq!(call.args[0].raw, r#""Big ""World""""#);
    }

    #[test]
    fn parentheses_group_and_are_stripped() {
        let call = MacroCall::parse("WRAP ([tag]\n    a=1\n[/tag]) (f(x) y)");
        assert_eq!(values(&call), vec!["[tag]\n    a=1\n[/tag]", "f(x) y"]);
    }

    #[test]
    fn raw_segments_are_one_argument() {
        let call = MacroCall::parse("LUA <<local a = b>> z");
        assert_eq!(values(&call), vec!["local a = b", "z"]);
    }

    #[test]
    fn keyword_shape_is_recognized() {
        let call = MacroCall::parse(r#"SIZED SIZE="very large" x=1=2"#);
        assert_eq!(
            call.args[0].keyword,
            Some(("SIZE".to_string(), "very large".to_string()))
        );
        assert_eq!(call.args[1].keyword, Some(("x".to_string(), "1=2".to_string())));
    }

    #[test]
    fn binding_uses_declared_keywords_only() {
        let definition = MacroDefinition::new("M", "")
            .with_params(["a"])
            .with_default("SIZE", "medium");
        let call = MacroCall::parse("M id=foo SIZE=large");
        let bound = call.bind(&definition);
        assert_eq!(bound.positional, vec!["id=foo"]);
        assert_eq!(bound.keywords.get("SIZE").map(String::as_str), Some("large"));
    }

    #[test]
    fn empty_call_has_empty_name() {
        let call = MacroCall::parse("   ");
        assert!(call.name.is_empty());
        assert!(call.args.is_empty());
    }
}
