//! Node building
//!
//!     The engine does not walk tokens directly. A source text is first turned into
//!     a flat list of nodes: tokens to emit, macro calls, directives, and whole
//!     `#define` blocks. Building is purely structural: it matches `#define` with
//!     `#enddef`, cuts `#arg` blocks out of bodies and collects documentation
//!     comments, but evaluates nothing.
//!
//! Line Rules
//!
//!     Directives are recognized on lines holding only indentation and the
//!     directive. Those lines, and lines holding only a comment, produce no output
//!     at all; other comments are dropped from their line. The exception is
//!     `#enddef`/`#endarg`, which close a body wherever they appear, as in
//!     `72#enddef`. Comment-only lines directly above a `#define` become its doc.

use super::call::MacroCall;
use super::directive::{parse_directive, Directive, DirectiveKind};
use crate::wml::lexing::lex;
use crate::wml::location::SourceLocation;
use crate::wml::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Token(Token),
    Call { call: MacroCall, raw: String, line: usize },
    Directive { directive: Directive, line: usize },
    Define(DefineBlock),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineBlock {
    pub header: Directive,
    pub body: String,
    /// `#arg NAME ... #endarg` blocks, in order.
    pub arg_defaults: Vec<(String, String)>,
    pub doc: Option<String>,
    pub line: usize,
}

/// Structural problems found while building nodes. Lines are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    UnterminatedDefine { name: String, line: usize },
    MissingArgName { line: usize },
}

pub fn build_nodes(source: &str) -> Result<Vec<Node>, BuildError> {
    NodeBuilder::new(source).build()
}

struct NodeBuilder<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    location: SourceLocation,
    nodes: Vec<Node>,
    docs: Vec<String>,
    index: usize,
}

impl<'s> NodeBuilder<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            tokens: lex(source),
            location: SourceLocation::new(source),
            nodes: Vec::new(),
            docs: Vec::new(),
            index: 0,
        }
    }

    fn build(mut self) -> Result<Vec<Node>, BuildError> {
        while self.index < self.tokens.len() {
            let first = self.first_non_blank(self.index);
            match self.tokens.get(first).map(|t| t.kind) {
                Some(TokenKind::Comment) => self.comment_line(first)?,
                _ => {
                    self.docs.clear();
                    self.emit_line();
                }
            }
        }
        Ok(self.nodes)
    }

    fn first_non_blank(&self, from: usize) -> usize {
        let mut index = from;
        while self.tokens.get(index).is_some_and(Token::is_blank) {
            index += 1;
        }
        index
    }

    /// Byte offset of the token at the cursor, or the end of the source.
    fn offset_here(&self) -> usize {
        self.tokens
            .get(self.index)
            .map_or(self.source.len(), |t| t.span.start)
    }

    fn skip_line_break(&mut self) {
        if self
            .tokens
            .get(self.index)
            .is_some_and(|t| t.kind == TokenKind::EndOfLine)
        {
            self.index += 1;
        }
    }

    fn comment_line(&mut self, comment: usize) -> Result<(), BuildError> {
        let token = &self.tokens[comment];
        let line = self.location.line_of(token.span.start);
        let directive = parse_directive(&token.content);
        let doc = doc_text(&token.content);

        self.index = comment + 1;
        self.skip_line_break();

        match directive {
            Some(header) if header.kind == DirectiveKind::Define => {
                let block = self.capture_define(header, line)?;
                self.nodes.push(Node::Define(block));
            }
            Some(directive) => {
                self.docs.clear();
                self.nodes.push(Node::Directive { directive, line });
            }
            None => self.docs.push(doc),
        }
        Ok(())
    }

    /// Emits tokens up to and including the next line break.
    fn emit_line(&mut self) {
        while let Some(token) = self.tokens.get(self.index) {
            self.index += 1;
            match token.kind {
                TokenKind::Comment => {}
                TokenKind::MacroCall => self.nodes.push(Node::Call {
                    call: MacroCall::parse(&token.content),
                    raw: token.content.clone(),
                    line: self.location.line_of(token.span.start),
                }),
                TokenKind::EndOfLine => {
                    self.nodes.push(Node::Token(token.clone()));
                    return;
                }
                _ => self.nodes.push(Node::Token(token.clone())),
            }
        }
    }

    /// Captures a body up to the matching `#enddef`. The cursor sits just past the
    /// header line.
    fn capture_define(&mut self, header: Directive, line: usize) -> Result<DefineBlock, BuildError> {
        let doc = (!self.docs.is_empty()).then(|| std::mem::take(&mut self.docs).join("\n"));
        let mut body = String::new();
        let mut arg_defaults = Vec::new();
        let mut open_arg: Option<(String, usize)> = None;
        let mut cursor = self.offset_here();
        let mut line_begin = cursor;
        let mut at_line_start = true;
        let mut depth = 1usize;

        while let Some(token) = self.tokens.get(self.index) {
            match token.kind {
                TokenKind::EndOfLine => {
                    at_line_start = true;
                    line_begin = token.span.end;
                    self.index += 1;
                    continue;
                }
                TokenKind::Whitespace => {
                    self.index += 1;
                    continue;
                }
                TokenKind::Comment => {
                    let cut = if at_line_start {
                        line_begin
                    } else {
                        token.span.start
                    };
                    let directive_line = self.location.line_of(token.span.start);
                    match parse_directive(&token.content) {
                        Some(d) if d.kind == DirectiveKind::Define && at_line_start => depth += 1,
                        Some(d) if d.kind == DirectiveKind::Enddef => {
                            depth -= 1;
                            if depth == 0 {
                                match open_arg.take() {
                                    Some((name, start)) => {
                                        arg_defaults.push((name, arg_value(&self.source[start..cut])))
                                    }
                                    None => body.push_str(&self.source[cursor..cut]),
                                }
                                self.index += 1;
                                self.skip_line_break();
                                return Ok(DefineBlock {
                                    header,
                                    body,
                                    arg_defaults,
                                    doc,
                                    line,
                                });
                            }
                        }
                        Some(d)
                            if d.kind == DirectiveKind::Arg
                                && at_line_start
                                && depth == 1
                                && open_arg.is_none() =>
                        {
                            let name = d
                                .arg(0)
                                .ok_or(BuildError::MissingArgName {
                                    line: directive_line,
                                })?
                                .to_string();
                            body.push_str(&self.source[cursor..cut]);
                            self.index += 1;
                            self.skip_line_break();
                            open_arg = Some((name, self.offset_here()));
                            line_begin = self.offset_here();
                            at_line_start = true;
                            continue;
                        }
                        Some(d) if d.kind == DirectiveKind::Endarg && depth == 1 => {
                            if let Some((name, start)) = open_arg.take() {
                                arg_defaults.push((name, arg_value(&self.source[start..cut])));
                                self.index += 1;
                                self.skip_line_break();
                                cursor = self.offset_here();
                                line_begin = cursor;
                                at_line_start = true;
                                continue;
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
            at_line_start = false;
            self.index += 1;
        }

        Err(BuildError::UnterminatedDefine {
            name: header.arg(0).unwrap_or_default().to_string(),
            line,
        })
    }
}

fn doc_text(comment: &str) -> String {
    comment.trim_start_matches('#').trim().to_string()
}

fn arg_value(text: &str) -> String {
    ["\r\n", "\n", "\r", "\u{2028}", "\u{2029}"]
        .iter()
        .find_map(|eol| text.strip_suffix(eol))
        .unwrap_or(text)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wml::testing::MACRO_LIBRARY;

    fn defines(nodes: &[Node]) -> Vec<&DefineBlock> {
        nodes
            .iter()
            .filter_map(|n| match n {
                Node::Define(block) => Some(block),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn captures_library_definitions() {
        let nodes = build_nodes(MACRO_LIBRARY).unwrap();
        let blocks = defines(&nodes);
        assert_eq!(blocks.len(), 3);

        let greet = blocks[0];
        assert_eq!(greet.header.args, vec!["GREET", "name"]);
        assert_eq!(greet.body, "Hello {name}!\n");
        assert_eq!(greet.doc.as_deref(), Some("Greets someone by name."));
        assert_eq!(greet.line, 2);

        let sized = blocks[2];
        assert_eq!(sized.body, "size={SIZE}\n");
        assert_eq!(
            sized.arg_defaults,
            vec![("SIZE".to_string(), "medium".to_string())]
        );
        assert!(sized.doc.is_none());
    }

    #[test]
    fn definitions_leave_no_output_lines() {
        let nodes = build_nodes(MACRO_LIBRARY).unwrap();
        let emitted: Vec<_> = nodes
            .iter()
            .filter_map(|n| match n {
                Node::Token(t) => Some(t.kind),
                _ => None,
            })
            .collect();
        // only the blank separator lines remain
        assert_eq!(emitted, vec![TokenKind::EndOfLine, TokenKind::EndOfLine]);
    }

    #[test]
    fn nested_define_closes_its_own_block() {
        let source = "#define OUTER\n#define INNER\ni\n#enddef\no\n#enddef\nafter\n";
        let nodes = build_nodes(source).unwrap();
        let blocks = defines(&nodes);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body, "#define INNER\ni\n#enddef\no\n");
        assert!(matches!(nodes.last(), Some(Node::Token(t)) if t.kind == TokenKind::EndOfLine));
    }

    #[test]
    fn enddef_may_follow_text() {
        let nodes = build_nodes("#define WIDTH\n72#enddef\nw={WIDTH}\n").unwrap();
        assert_eq!(defines(&nodes)[0].body, "72");
        assert!(nodes.iter().any(|n| matches!(n, Node::Call { call, .. } if call.name == "WIDTH")));
    }

    #[test]
    fn unterminated_define_is_reported() {
        let err = build_nodes("a\n#define BROKEN x\nbody\n").unwrap_err();
        assert_eq!(
            err,
            BuildError::UnterminatedDefine {
                name: "BROKEN".to_string(),
                line: 1
            }
        );
    }

    #[test]
    fn trailing_comments_are_dropped() {
        let nodes = build_nodes("a=1 # note\n").unwrap();
        let kinds: Vec<_> = nodes
            .iter()
            .map(|n| match n {
                Node::Token(t) => t.kind,
                _ => TokenKind::MacroCall,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Text, TokenKind::Whitespace, TokenKind::EndOfLine]
        );
    }

    #[test]
    fn blank_line_separates_doc_from_define() {
        let nodes = build_nodes("# stray\n\n#define X\n#enddef\n").unwrap();
        assert!(defines(&nodes)[0].doc.is_none());
    }

    #[test]
    fn directives_carry_their_line() {
        let nodes = build_nodes("x\n  #ifdef DEBUG\ny\n#endif\n").unwrap();
        let lines: Vec<_> = nodes
            .iter()
            .filter_map(|n| match n {
                Node::Directive { directive, line } => Some((directive.kind, *line)),
                _ => None,
            })
            .collect();
        assert_eq!(
            lines,
            vec![(DirectiveKind::Ifdef, 1), (DirectiveKind::Endif, 3)]
        );
    }
}
