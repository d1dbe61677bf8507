use lsp_types::CompletionItemKind;
use wml_parser::wml::preprocessing::DirectiveKind;
use wml_parser::MacroTable;

/// Characters that open a completion session: `#` for directives, `{` for macros.
pub const TRIGGER_CHARACTERS: [&str; 2] = ["#", "{"];

/// Describes a semantic completion candidate that can be translated into protocol specific items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub label: String,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    pub kind: CompletionItemKind,
    pub insert_text: Option<String>,
}

impl CompletionCandidate {
    fn new(label: impl Into<String>, kind: CompletionItemKind) -> Self {
        Self {
            label: label.into(),
            detail: None,
            documentation: None,
            kind,
            insert_text: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    fn with_insert_text(mut self, text: impl Into<String>) -> Self {
        self.insert_text = Some(text.into());
        self
    }
}

/// How the completion request came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionTrigger {
    Directive,
    Macro,
    /// Explicitly requested by the user.
    Invoked,
}

impl CompletionTrigger {
    /// `None` for trigger characters that offer nothing.
    pub fn from_character(character: Option<&str>) -> Option<Self> {
        match character {
            None => Some(CompletionTrigger::Invoked),
            Some("#") => Some(CompletionTrigger::Directive),
            Some("{") => Some(CompletionTrigger::Macro),
            Some(_) => None,
        }
    }
}

/// Produce completion candidates for the given trigger.
pub fn completion_items(defines: &MacroTable, trigger: CompletionTrigger) -> Vec<CompletionCandidate> {
    match trigger {
        CompletionTrigger::Directive => directive_completions(),
        CompletionTrigger::Macro => macro_completions(defines),
        CompletionTrigger::Invoked => {
            let mut items = directive_completions();
            items.extend(macro_completions(defines));
            items
        }
    }
}

fn directive_completions() -> Vec<CompletionCandidate> {
    DirectiveKind::ALL
        .iter()
        .map(|kind| {
            CompletionCandidate::new(kind.keyword(), CompletionItemKind::KEYWORD)
                .with_documentation(directive_doc(*kind))
                .with_insert_text(format!("{} ", kind.keyword()))
        })
        .collect()
}

/// One candidate per macro name, describing its current definition.
fn macro_completions(defines: &MacroTable) -> Vec<CompletionCandidate> {
    defines
        .names()
        .into_iter()
        .filter_map(|name| defines.lookup(name))
        .map(|definition| {
            let mut candidate =
                CompletionCandidate::new(definition.signature(), CompletionItemKind::METHOD)
                    .with_insert_text(definition.name.clone());
            if definition.site.file.is_some() {
                candidate = candidate.with_detail(definition.site.to_string());
            }
            if let Some(doc) = &definition.doc {
                candidate = candidate.with_documentation(doc.clone());
            }
            candidate
        })
        .collect()
}

pub fn directive_doc(kind: DirectiveKind) -> &'static str {
    match kind {
        DirectiveKind::Define => "Define a macro",
        DirectiveKind::Enddef => "End macro definition",
        DirectiveKind::Undef => "Remove every definition of a macro",
        DirectiveKind::Ifdef => "Do if macro defined",
        DirectiveKind::Ifndef => "Do if macro not defined",
        DirectiveKind::Ifhave => "Do if file exists",
        DirectiveKind::Ifnhave => "Do if file does not exist",
        DirectiveKind::Ifver => "Do if wesnoth version matches condition",
        DirectiveKind::Ifnver => "Do if wesnoth version does not match condition",
        DirectiveKind::Else => "Switch to the other branch of a conditional",
        DirectiveKind::Endif => "End if directives block",
        DirectiveKind::Arg => "Start optional argument in macro definition",
        DirectiveKind::Endarg => "End optional argument in macro definition",
        DirectiveKind::Textdomain => "Define Textdomain",
        DirectiveKind::Error => "Stop preprocessing with an error message",
        DirectiveKind::Warning => "Print a warning message",
        DirectiveKind::Deprecated => "Print a deprecation notice",
    }
}
