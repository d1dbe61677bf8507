//! Go-to-definition for macro calls.

use crate::word::word_at_position;
use lsp_types::Url;
use wml_parser::wml::location::Position;
use wml_parser::MacroTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionTarget {
    pub uri: Url,
    /// Line of the `#define`, 0-based.
    pub line: usize,
}

/// Where the macro under the cursor was defined. Macros defined from in-memory
/// text have no file and therefore no target.
pub fn goto_definition(
    defines: &MacroTable,
    source: &str,
    position: Position,
) -> Option<DefinitionTarget> {
    let word = word_at_position(source, position)?;
    let definition = defines.lookup(&word.text)?;
    Some(DefinitionTarget {
        uri: definition.site.uri()?,
        line: definition.site.line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_table, DOCUMENT, LIBRARY_PATH};
    use wml_parser::MacroDefinition;

    #[test]
    fn jumps_to_the_define_line() {
        let table = sample_table();

        let greet = goto_definition(&table, DOCUMENT, Position::new(1, 6)).expect("target");
        assert!(greet.uri.path().ends_with(LIBRARY_PATH));
        assert_eq!(greet.line, 2);

        let rect = goto_definition(&table, DOCUMENT, Position::new(2, 6)).expect("target");
        assert_eq!(rect.line, 7);
    }

    #[test]
    fn redefinitions_point_at_the_latest_row() {
        let mut table = sample_table();
        let mut moved = table.lookup("GREET").expect("greet").site.clone();
        moved.line = 40;
        table.define(MacroDefinition::new("GREET", "Hi").with_site(moved));

        let target = goto_definition(&table, DOCUMENT, Position::new(1, 6)).expect("target");
        assert_eq!(target.line, 40);
    }

    #[test]
    fn no_target_without_a_file() {
        let table: MacroTable = [MacroDefinition::new("GREET", "")].into_iter().collect();
        assert!(goto_definition(&table, DOCUMENT, Position::new(1, 6)).is_none());
        assert!(goto_definition(&table, DOCUMENT, Position::new(4, 6)).is_none());
    }
}
