use std::path::Path;
use wml_parser::wml::testing::MACRO_LIBRARY;
use wml_parser::{MacroTable, PathResolver, Preprocessor, PreprocessorOptions};

pub(crate) const LIBRARY_PATH: &str = "core/macros.cfg";

/// A document using the library macros, one call per line.
pub(crate) const DOCUMENT: &str = "\
[unit]
    {GREET you}
    {RECT 1 2}
    {SIZED}
    {UNKNOWN}
[/unit]
";

pub(crate) fn sample_table() -> MacroTable {
    let mut preprocessor =
        Preprocessor::new(PathResolver::default(), PreprocessorOptions::default());
    preprocessor
        .preprocess_str(MACRO_LIBRARY, Some(Path::new(LIBRARY_PATH)))
        .expect("macro library preprocesses");
    preprocessor.take_defines()
}
