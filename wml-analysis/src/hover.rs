//! Hover help for macro calls.

use crate::word::{word_at_position, Word};
use wml_parser::wml::location::Position;
use wml_parser::{MacroDefinition, MacroTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverResult {
    /// The hovered word, for highlighting.
    pub word: Word,
    /// Markdown.
    pub contents: String,
}

/// Help for the macro named by the word under the cursor, if it is defined.
pub fn hover(defines: &MacroTable, source: &str, position: Position) -> Option<HoverResult> {
    let word = word_at_position(source, position)?;
    let definition = defines.lookup(&word.text)?;
    Some(HoverResult {
        contents: hover_markdown(definition),
        word,
    })
}

/// The signature in bold, then the doc comment and textdomain when present.
pub fn hover_markdown(definition: &MacroDefinition) -> String {
    let mut sections = vec![format!("**{}**", definition.signature())];
    if let Some(doc) = definition.doc.as_deref().filter(|doc| !doc.is_empty()) {
        sections.push(doc.to_string());
    }
    if let Some(domain) = &definition.textdomain {
        sections.push(format!("textdomain: `{}`", domain));
    }
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_table, DOCUMENT};

    #[test]
    fn documented_macro() {
        let result = hover(&sample_table(), DOCUMENT, Position::new(1, 7)).expect("hover");
        assert_eq!(
            result.contents,
            "**GREET[name]**\n\nGreets someone by name.\n\ntextdomain: `wesnoth-help`"
        );
        assert_eq!((result.word.start, result.word.end), (5, 10));
    }

    #[test]
    fn undocumented_macro_shows_its_defaults() {
        let result = hover(&sample_table(), DOCUMENT, Position::new(3, 6)).expect("hover");
        assert_eq!(
            result.contents,
            "**SIZED[SIZE=medium]**\n\ntextdomain: `wesnoth-help`"
        );
    }

    #[test]
    fn nothing_for_unknown_words() {
        let table = sample_table();
        assert!(hover(&table, DOCUMENT, Position::new(4, 6)).is_none());
        assert!(hover(&table, DOCUMENT, Position::new(0, 2)).is_none());
        assert!(hover(&table, DOCUMENT, Position::new(40, 0)).is_none());
    }

    #[test]
    fn plain_definition_is_just_the_name() {
        let definition = MacroDefinition::new("PLAIN", "x");
        assert_eq!(hover_markdown(&definition), "**PLAIN**");
    }
}
